use std::time::Duration;
use tracing::warn;

/// Settings applied uniformly to every key a cache repository handles.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RepositoryConfig {
    pub sliding_expiration: Duration,
    pub data_dir: String,
}

impl RepositoryConfig {
    pub const DEFAULT_SLIDING_EXPIRATION: Duration = Duration::from_secs(5 * 60);
    const DEFAULT_DATA_DIR: &str = "./data";

    pub fn from_env() -> Self {
        let sliding_expiration = match std::env::var("CACHE_REPOSITORY_SLIDING_EXPIRATION_SECS") {
            Ok(raw) => Self::parse_expiration(&raw).unwrap_or_else(|| {
                warn!(
                    value = %raw,
                    "CACHE_REPOSITORY_SLIDING_EXPIRATION_SECS is not a positive number of seconds, using default"
                );
                Self::DEFAULT_SLIDING_EXPIRATION
            }),
            Err(_) => Self::DEFAULT_SLIDING_EXPIRATION,
        };

        Self {
            sliding_expiration,
            data_dir: std::env::var("CACHE_REPOSITORY_DATA_DIR")
                .unwrap_or_else(|_| Self::DEFAULT_DATA_DIR.to_string()),
        }
    }

    pub fn with_sliding_expiration(mut self, sliding_expiration: Duration) -> Self {
        self.sliding_expiration = sliding_expiration;
        self
    }

    fn parse_expiration(raw: &str) -> Option<Duration> {
        match raw.trim().parse::<u64>() {
            Ok(0) | Err(_) => None,
            Ok(secs) => Some(Duration::from_secs(secs)),
        }
    }
}

impl Default for RepositoryConfig {
    fn default() -> Self {
        Self {
            sliding_expiration: Self::DEFAULT_SLIDING_EXPIRATION,
            data_dir: Self::DEFAULT_DATA_DIR.to_string(),
        }
    }
}
