use std::env;

#[derive(Debug, PartialEq, Eq)]
pub enum ConfigError {
    Missing(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Missing(name) => {
                write!(f, "{} environment variable must be set", name)
            }
        }
    }
}

impl std::error::Error for ConfigError {}

/// Deployment settings, read once at startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub games_table: String,
    pub rounds_table: String,
    pub player_games_table: String,
    pub jwt_secret: String,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let require = |name: &str| {
            lookup(name)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| ConfigError::Missing(name.to_string()))
        };

        Ok(Config {
            games_table: require("GAMES_TABLE")?,
            rounds_table: require("ROUNDS_TABLE")?,
            player_games_table: require("PLAYER_GAMES_TABLE")?,
            jwt_secret: require("JWT_SECRET")?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let values: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| values.get(name).cloned()
    }

    #[test]
    fn test_from_lookup_reads_all_values() {
        let config = Config::from_lookup(lookup_from(&[
            ("GAMES_TABLE", "games"),
            ("ROUNDS_TABLE", "rounds"),
            ("PLAYER_GAMES_TABLE", "player-games"),
            ("JWT_SECRET", "secret"),
        ]))
        .unwrap();

        assert_eq!(config.games_table, "games");
        assert_eq!(config.rounds_table, "rounds");
        assert_eq!(config.player_games_table, "player-games");
        assert_eq!(config.jwt_secret, "secret");
    }

    #[test]
    fn test_from_lookup_reports_missing_variable() {
        let result = Config::from_lookup(lookup_from(&[
            ("GAMES_TABLE", "games"),
            ("JWT_SECRET", "secret"),
        ]));

        assert_eq!(
            result.unwrap_err(),
            ConfigError::Missing("ROUNDS_TABLE".to_string())
        );
    }

    #[test]
    fn test_empty_value_counts_as_missing() {
        let result = Config::from_lookup(lookup_from(&[
            ("GAMES_TABLE", ""),
            ("ROUNDS_TABLE", "rounds"),
            ("JWT_SECRET", "secret"),
        ]));

        assert_eq!(
            result.unwrap_err(),
            ConfigError::Missing("GAMES_TABLE".to_string())
        );
    }
}
