// region:    --- Imports
use crate::error::ConfigError;
use std::str::FromStr;
use std::time::Duration;

// endregion: --- Imports

// region:    --- Config
/// 환경 변수 기반 설정
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: Option<String>,
    pub database_max_connections: u32,
    pub listen_addr: String,
    pub kafka_brokers: String,
    pub auction_topic: String,
    pub search_group_id: String,
    pub mongodb_url: String,
    pub mongodb_database: String,
    pub default_seller: String,
    pub outbox_poll_interval: Duration,
    pub retry: RetryPolicy,
}

/// 컨슈머 재시도 정책
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub backoff: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff: Duration::from_millis(200),
        }
    }
}

impl Config {
    /// 환경 변수에서 설정 로드
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 임의의 조회 함수로 설정 로드
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let max_attempts: u32 = parse(&lookup, "CONSUMER_MAX_ATTEMPTS", 3)?;
        if max_attempts == 0 {
            return Err(ConfigError::Invalid {
                key: "CONSUMER_MAX_ATTEMPTS".to_string(),
                value: "0".to_string(),
            });
        }

        Ok(Self {
            database_url: lookup("DATABASE_URL"),
            database_max_connections: parse(&lookup, "DATABASE_MAX_CONNECTIONS", 5)?,
            listen_addr: text("LISTEN_ADDR", "0.0.0.0:3000"),
            kafka_brokers: text("KAFKA_BROKERS", "localhost:9092"),
            auction_topic: text("AUCTION_TOPIC", "auctions"),
            search_group_id: text("SEARCH_GROUP_ID", "search-service"),
            mongodb_url: text("MONGODB_URL", "mongodb://localhost:27017"),
            mongodb_database: text("MONGODB_DATABASE", "SearchDb"),
            default_seller: text("DEFAULT_SELLER", "test"),
            outbox_poll_interval: Duration::from_secs(parse(
                &lookup,
                "OUTBOX_POLL_INTERVAL_SECS",
                5,
            )?),
            retry: RetryPolicy {
                max_attempts,
                backoff: Duration::from_millis(parse(&lookup, "CONSUMER_RETRY_BACKOFF_MS", 200)?),
            },
        })
    }

    /// DATABASE_URL 필수 확인
    pub fn require_database_url(&self) -> Result<&str, ConfigError> {
        self.database_url
            .as_deref()
            .ok_or_else(|| ConfigError::Missing("DATABASE_URL".to_string()))
    }

    /// 데드레터 토픽 이름
    pub fn dead_letter_topic(&self) -> String {
        format!("{}-error", self.auction_topic)
    }
}

fn parse<F, T>(lookup: &F, key: &str, default: T) -> Result<T, ConfigError>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid {
            key: key.to_string(),
            value,
        }),
    }
}

// endregion: --- Config
