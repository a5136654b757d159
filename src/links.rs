use std::sync::LazyLock;

use regex::Regex;

/// Twitter/X status links. The query string is not part of the match.
static TWITTER_STATUS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"https?://(?:www\.)?(?:twitter|x)\.com/([A-Za-z0-9_]+)/status/([0-9]+)")
        .expect("hardcoded regex")
});

/// Reddit comment threads, consuming an optional trailing slug, slash and query.
static REDDIT_COMMENTS: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"https?://(?:www\.|old\.)?reddit\.com/r/([A-Za-z0-9_]+)/comments/([A-Za-z0-9_]+)(?:(?:/[^\s/]+)?/?(?:\?\S*)?)?",
    )
    .expect("hardcoded regex")
});

/// Literal host fragments checked before any pattern runs
const DOMAIN_HINTS: &[&str] = &["twitter.com", "x.com", "reddit.com"];

/// Platforms whose links get rewritten, in matching priority order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    Twitter,
    Reddit,
}

impl Platform {
    pub const ALL: [Platform; 2] = [Platform::Twitter, Platform::Reddit];

    /// Mirror domain that renders rich previews for this platform
    pub fn alternate_domain(&self) -> &'static str {
        match self {
            Platform::Twitter => "vxtwitter.com",
            Platform::Reddit => "www.vxreddit.com",
        }
    }

    fn pattern(&self) -> &'static Regex {
        match self {
            Platform::Twitter => &*TWITTER_STATUS,
            Platform::Reddit => &*REDDIT_COMMENTS,
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Platform::Twitter => write!(f, "twitter"),
            Platform::Reddit => write!(f, "reddit"),
        }
    }
}

/// A supported link found in message text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkMatch {
    pub platform: Platform,
    /// The full substring that matched
    pub matched: String,
    /// Twitter handle or subreddit name
    pub owner: String,
    /// Status id or post id
    pub id: String,
}

impl LinkMatch {
    /// Rebuild the link on the platform's mirror domain from the captured segments only.
    pub fn rewritten(&self) -> String {
        let domain = self.platform.alternate_domain();
        match self.platform {
            Platform::Twitter => format!("https://{}/{}/status/{}", domain, self.owner, self.id),
            Platform::Reddit => format!("https://{}/r/{}/comments/{}", domain, self.owner, self.id),
        }
    }
}

/// Cheap substring test so most chatter never reaches the regexes.
pub fn mentions_supported_domain(text: &str) -> bool {
    DOMAIN_HINTS.iter().any(|hint| text.contains(hint))
}

/// Every supported link in `text`: all Twitter/X matches in text order, then all Reddit matches.
pub fn find_links(text: &str) -> Vec<LinkMatch> {
    Platform::ALL
        .iter()
        .flat_map(|&platform| {
            platform.pattern().captures_iter(text).map(move |caps| LinkMatch {
                platform,
                matched: caps[0].to_string(),
                owner: caps[1].to_string(),
                id: caps[2].to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_twitter_link_rewritten() {
        let links = find_links("check this out https://twitter.com/alice/status/12345");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].platform, Platform::Twitter);
        assert_eq!(links[0].owner, "alice");
        assert_eq!(links[0].id, "12345");
        assert_eq!(links[0].rewritten(), "https://vxtwitter.com/alice/status/12345");
    }

    #[test]
    fn test_x_and_www_hosts() {
        let links = find_links("https://x.com/bob_1/status/99 and http://www.twitter.com/c/status/7");
        let urls: Vec<String> = links.iter().map(LinkMatch::rewritten).collect();
        assert_eq!(
            urls,
            vec![
                "https://vxtwitter.com/bob_1/status/99",
                "https://vxtwitter.com/c/status/7",
            ]
        );
    }

    #[test]
    fn test_twitter_query_not_matched() {
        let links = find_links("https://x.com/alice/status/12345?s=20&t=abc");
        assert_eq!(links[0].matched, "https://x.com/alice/status/12345");
        assert_eq!(links[0].rewritten(), "https://vxtwitter.com/alice/status/12345");
    }

    #[test]
    fn test_reddit_slug_dropped() {
        let links = find_links("https://old.reddit.com/r/funny/comments/abcde/some_title/");
        assert_eq!(links.len(), 1);
        assert_eq!(links[0].platform, Platform::Reddit);
        assert_eq!(
            links[0].matched,
            "https://old.reddit.com/r/funny/comments/abcde/some_title/"
        );
        assert_eq!(
            links[0].rewritten(),
            "https://www.vxreddit.com/r/funny/comments/abcde"
        );
    }

    #[test]
    fn test_reddit_query_consumed() {
        let links = find_links("see https://www.reddit.com/r/rust/comments/1x2y3z/?utm_source=share ok");
        assert_eq!(
            links[0].matched,
            "https://www.reddit.com/r/rust/comments/1x2y3z/?utm_source=share"
        );
        assert_eq!(
            links[0].rewritten(),
            "https://www.vxreddit.com/r/rust/comments/1x2y3z"
        );
    }

    #[test]
    fn test_mirror_domains_not_matched() {
        let text = "https://vxtwitter.com/alice/status/1 \
                    https://fxtwitter.com/alice/status/2 \
                    https://www.vxreddit.com/r/funny/comments/abc";
        assert!(mentions_supported_domain(text));
        assert!(find_links(text).is_empty());
    }

    #[test]
    fn test_twitter_listed_before_reddit() {
        let text = "https://reddit.com/r/a/comments/b then https://twitter.com/c/status/1";
        let platforms: Vec<Platform> = find_links(text).iter().map(|l| l.platform).collect();
        assert_eq!(platforms, vec![Platform::Twitter, Platform::Reddit]);
    }

    #[test]
    fn test_profile_links_ignored() {
        assert!(find_links("https://twitter.com/alice").is_empty());
        assert!(find_links("https://reddit.com/r/funny").is_empty());
    }

    #[test]
    fn test_domain_hints() {
        assert!(!mentions_supported_domain("hello world"));
        assert!(mentions_supported_domain("x.com"));
        assert!(mentions_supported_domain("go to reddit.com"));
    }
}
