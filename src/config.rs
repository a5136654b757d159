use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;

/// Environment variable holding the bot token
pub const TOKEN_ENV_VAR: &str = "DISCORD_BOT_TOKEN";

const DEFAULT_EMBED_COLOR: u32 = 0x4C4C54;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct Config {
    #[serde(default)]
    pub discord: DiscordConfig,
    #[serde(default)]
    pub relay: RelayConfig,
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct DiscordConfig {
    /// Used only when the environment variable is unset
    #[serde(default)]
    pub bot_token: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RelayConfig {
    /// Accent colour of the reposted card, as "#RRGGBB"
    #[serde(default = "default_embed_color")]
    pub embed_color: String,
    /// Tell the author in-channel when their link could not be fixed
    #[serde(default = "default_apology")]
    pub apology: bool,
}

impl Default for RelayConfig {
    fn default() -> Self {
        Self {
            embed_color: default_embed_color(),
            apology: default_apology(),
        }
    }
}

impl RelayConfig {
    /// Parsed accent colour; falls back to the default grey on malformed input.
    pub fn embed_color_value(&self) -> u32 {
        parse_hex_color(&self.embed_color).unwrap_or(DEFAULT_EMBED_COLOR)
    }
}

fn default_embed_color() -> String {
    "#4C4C54".to_string()
}

fn default_apology() -> bool {
    true
}

/// Parse "#RRGGBB" or "RRGGBB" into a 24-bit colour.
pub fn parse_hex_color(value: &str) -> Option<u32> {
    let hex = value.trim().trim_start_matches('#');
    if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}

impl Config {
    /// Load from `path` if it exists. A missing file is only an error when `required` is set.
    pub fn load(path: &Path, required: bool) -> Result<Self> {
        if !path.exists() {
            if required {
                anyhow::bail!("Config file not found: {}", path.display());
            }
            return Ok(Config::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::parse(&content)
    }

    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse config file")
    }

    /// Resolve the bot token: the environment wins over the file, blank values count as absent.
    pub fn bot_token(&self, env_value: Option<String>) -> Result<String> {
        env_value
            .filter(|t| !t.trim().is_empty())
            .or_else(|| {
                self.discord
                    .bot_token
                    .clone()
                    .filter(|t| !t.trim().is_empty())
            })
            .map(|t| t.trim().to_string())
            .with_context(|| format!("{} not found in environment or config file", TOKEN_ENV_VAR))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config = Config::parse("").unwrap();
        assert!(config.discord.bot_token.is_none());
        assert_eq!(config.relay.embed_color_value(), 0x4C4C54);
        assert!(config.relay.apology);
    }

    #[test]
    fn test_relay_section() {
        let config = Config::parse(
            r##"
[relay]
embed_color = "#ff0000"
apology = false
"##,
        )
        .unwrap();
        assert_eq!(config.relay.embed_color_value(), 0xFF0000);
        assert!(!config.relay.apology);
    }

    #[test]
    fn test_env_token_wins() {
        let config = Config::parse("[discord]\nbot_token = \"from-file\"").unwrap();
        assert_eq!(
            config.bot_token(Some("from-env".to_string())).unwrap(),
            "from-env"
        );
        assert_eq!(config.bot_token(None).unwrap(), "from-file");
    }

    #[test]
    fn test_blank_token_rejected() {
        let config = Config::parse("[discord]\nbot_token = \"  \"").unwrap();
        assert!(config.bot_token(Some(String::new())).is_err());
        assert!(config.bot_token(None).is_err());
    }

    #[test]
    fn test_parse_hex_color() {
        assert_eq!(parse_hex_color("#4C4C54"), Some(0x4C4C54));
        assert_eq!(parse_hex_color("00ff00"), Some(0x00FF00));
        assert_eq!(parse_hex_color("#fff"), None);
        assert_eq!(parse_hex_color("#zzzzzz"), None);
    }

    #[test]
    fn test_missing_optional_file() {
        let config = Config::load(Path::new("/nonexistent/vxrelay.toml"), false).unwrap();
        assert!(config.relay.apology);
        assert!(Config::load(Path::new("/nonexistent/vxrelay.toml"), true).is_err());
    }
}
