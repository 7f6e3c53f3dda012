use std::{path::PathBuf, str::FromStr, time::Duration};

use crate::{error::ConfigError, models::track::Track};

const DEFAULT_API_BASE_URL: &str = "https://vps.kodub.com:43273";
const DEFAULT_API_VERSION: &str = "0.5.0";
const DEFAULT_USER_TOKEN_HASH: &str =
    "89b15d5cb1d07073894030b58ece6140fc3f357ad7dacf7ecbbe5a78440bf6f9";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub history_dir: PathBuf,
    pub static_dir: PathBuf,
    pub api_base_url: String,
    pub api_version: String,
    pub user_token_hash: String,
    pub fetch_amount: u32,
    pub poll_interval: Duration,
    pub request_timeout: Duration,
    pub fetch_retries: u32,
    pub retry_base_delay: Duration,
    pub tracks: Vec<Track>,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        let tracks = match std::env::var("TRACKS_FILE") {
            Ok(path) => load_tracks(PathBuf::from(path))?,
            Err(_) => default_tracks(),
        };
        if tracks.is_empty() {
            return Err(ConfigError::NoTracks);
        }

        Ok(Config {
            host: env_or("HOST", "0.0.0.0"),
            port: parse_env("PORT", 8080)?,
            history_dir: PathBuf::from(env_or("HISTORY_DIR", "history")),
            static_dir: PathBuf::from(env_or("STATIC_DIR", "static")),
            api_base_url: env_or("API_BASE_URL", DEFAULT_API_BASE_URL),
            api_version: env_or("API_VERSION", DEFAULT_API_VERSION),
            user_token_hash: env_or("USER_TOKEN_HASH", DEFAULT_USER_TOKEN_HASH),
            fetch_amount: parse_env("FETCH_AMOUNT", 500)?,
            poll_interval: nonzero_secs("POLL_INTERVAL_SECS", 300)?,
            request_timeout: nonzero_secs("REQUEST_TIMEOUT_SECS", 10)?,
            fetch_retries: parse_env::<u32>("FETCH_RETRIES", 3)?.max(1),
            retry_base_delay: Duration::from_millis(parse_env("RETRY_BASE_DELAY_MS", 500)?),
            tracks,
        })
    }

    pub fn track(&self, index: usize) -> Option<&Track> {
        self.tracks.get(index)
    }
}

fn env_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn parse_env<T: FromStr>(name: &'static str, default: T) -> Result<T, ConfigError> {
    match std::env::var(name) {
        Ok(value) => value
            .trim()
            .parse()
            .map_err(|_| ConfigError::InvalidVar { name, value }),
        Err(_) => Ok(default),
    }
}

/// A zero period would make the poller's interval panic, so it is rejected.
fn nonzero_secs(name: &'static str, default: u64) -> Result<Duration, ConfigError> {
    match parse_env(name, default)? {
        0 => Err(ConfigError::InvalidVar {
            name,
            value: "0".to_string(),
        }),
        secs => Ok(Duration::from_secs(secs)),
    }
}

fn load_tracks(path: PathBuf) -> Result<Vec<Track>, ConfigError> {
    let raw = std::fs::read_to_string(&path).map_err(|source| ConfigError::TracksIo {
        path: path.clone(),
        source,
    })?;
    serde_json::from_str(&raw).map_err(|source| ConfigError::TracksFormat { path, source })
}

pub fn default_tracks() -> Vec<Track> {
    vec![
        Track {
            name: "Test Leaderboard Track #1".to_string(),
            id: "9612eb2b9b37a7b053a86f55323e43a58ade7577122daa6d97ff9fec1e6c7038".to_string(),
            code: "PolyTrack14pdFK3tCDCCGAA9ZSoB1lezpiWNyZ14zLXYNxeHEjq90P6c9BLz4VxmivcRqmwr1kgNvXfVTe8k3Bxywp8s6kdrxX8Bcef1fiLCSMJjuKGbNb4M8EpsdQ1JCaJaEDokPDesoFl4oboDB10bJnqq93HjPmANTZ7pWSHdSbsDbEZQrpGbLcEdXx20S4wvzVjHMDQLXD4CffgZVkzP".to_string(),
        },
        Track {
            name: "Test Leaderboard Track #2".to_string(),
            id: "f231be762a3ff2930817c9458f17618f014305da03cb018335c9cc5953738c84".to_string(),
            code: "PolyTrack14pdBBntlDBDAAA9XiiJxjas0oLxWK6bckEtpoB1kxXf5eWfaXx1oZEy3PM0dIdhmeX0ZFNTOlHqEXI2iXELN7EuBI9Df09kmTZz54Br1LD9tf6I3BvrsY33WVmmGfZzyBe2hmNguAwG3ZJwyqkSeWcA1zuAygZ57i5a7lOEHepUV0Io0ftIkozr9kZjcOd1oyTfR8txsxeuSNnQOwLzgaMOpHok7cPNwGG9uud6j8e4AffGk2FXYmOTjGEOJeUTVv8PefAr3WJ2A".to_string(),
        },
    ]
}
