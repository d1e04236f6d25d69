use crate::engine::Color;
use crate::engine::history::DEFAULT_CAPACITY;

/// Driver configuration parsed from environment variables.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Maximum number of plies kept for take-back.
    pub history_capacity: usize,
    /// Which colour the person at the terminal plays.
    pub player_side: Color,
    /// Fallback log filter when `RUST_LOG` is unset.
    pub log_filter: String,
}

impl AppConfig {
    /// Load configuration from environment variables with defaults.
    pub fn from_env() -> Self {
        let defaults = AppConfig::default();
        AppConfig {
            history_capacity: std::env::var("CHESS_HISTORY_CAPACITY")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|&cap| cap > 0)
                .unwrap_or(defaults.history_capacity),
            player_side: std::env::var("CHESS_PLAYER_SIDE")
                .ok()
                .and_then(|v| Color::from_str_loose(&v))
                .unwrap_or(defaults.player_side),
            log_filter: std::env::var("CHESS_LOG").unwrap_or(defaults.log_filter),
        }
    }
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            history_capacity: DEFAULT_CAPACITY,
            player_side: Color::White,
            log_filter: "mailbox_chess=info".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config() {
        let config = AppConfig::default();
        assert_eq!(config.history_capacity, 400);
        assert_eq!(config.player_side, Color::White);
        assert_eq!(config.log_filter, "mailbox_chess=info");
    }

    #[test]
    fn from_env_defaults() {
        // Without setting env vars, should fall back to defaults
        let config = AppConfig::from_env();
        if std::env::var("CHESS_HISTORY_CAPACITY").is_err() {
            assert_eq!(config.history_capacity, 400);
        }
        if std::env::var("CHESS_PLAYER_SIDE").is_err() {
            assert_eq!(config.player_side, Color::White);
        }
    }
}
