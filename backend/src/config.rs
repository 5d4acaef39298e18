use std::{fs, net::SocketAddr, time::Duration};

use chrono::TimeDelta;
use clap::{crate_description, crate_name, crate_version, Parser};
use serde::{Deserialize, Serialize};

use crate::constants::{
    AUCTION_DURATION, CONFIG_PATH_ENV, DEFAULT_FRONTEND_URL, DEFAULT_LISTEN_ADDR,
    MAX_AUCTION_DURATION, OUTBOUND_BUFFER, SWEEP_INTERVAL,
};

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Command line and environment overrides. Anything left unset keeps the
/// value from the config file, or the built-in default.
#[derive(Parser, Clone, Debug, Default)]
#[command(name = crate_name!())]
#[command(about = crate_description!())]
#[command(version = crate_version!())]
pub struct Options {
    /// YAML file with server settings.
    #[arg(long = "config")]
    #[arg(env = CONFIG_PATH_ENV)]
    pub config: Option<String>,
    /// Address and port the server will bind to.
    #[arg(long = "listen-addr")]
    #[arg(env = "LISTEN_ADDR")]
    pub listen_addr: Option<SocketAddr>,
    /// Port only, applied after the listen address.
    #[arg(long = "port")]
    #[arg(env = "PORT")]
    pub port: Option<u16>,
    /// Public URL of the bidder front end.
    #[arg(long = "frontend-url")]
    #[arg(env = "FRONTEND_URL")]
    pub frontend_url: Option<String>,
    #[arg(long = "auction-duration-secs")]
    #[arg(env = "AUCTION_DURATION_SECS")]
    pub auction_duration_secs: Option<u64>,
    #[arg(long = "outbound-buffer")]
    #[arg(env = "OUTBOUND_BUFFER")]
    pub outbound_buffer: Option<usize>,
    /// Finish auctions automatically once their end time passes.
    #[arg(long = "auto-finish")]
    #[arg(env = "AUTO_FINISH")]
    pub auto_finish: Option<bool>,
    #[arg(long = "sweep-interval-secs")]
    #[arg(env = "SWEEP_INTERVAL_SECS")]
    pub sweep_interval_secs: Option<u64>,
}

/// Server settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Config {
    pub listen_addr: SocketAddr,
    /// Used to build join links.
    pub frontend_url: String,
    /// Seconds between start and advertised end of an auction.
    pub auction_duration_secs: u64,
    /// Per-connection outbound queue capacity.
    pub outbound_buffer: usize,
    pub auto_finish: bool,
    pub sweep_interval_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            listen_addr: DEFAULT_LISTEN_ADDR
                .parse()
                .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], 5001))),
            frontend_url: DEFAULT_FRONTEND_URL.to_string(),
            auction_duration_secs: AUCTION_DURATION.num_seconds().unsigned_abs(),
            outbound_buffer: OUTBOUND_BUFFER,
            auto_finish: false,
            sweep_interval_secs: SWEEP_INTERVAL.as_secs(),
        }
    }
}

impl Config {
    pub fn load(options: &Options) -> Result<Self, ConfigError> {
        let mut config = match &options.config {
            Some(path) => Self::from_file(path)?,
            None => Self::default(),
        };
        config.apply(options);
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(path: &str, content: &str) -> Result<Self, ConfigError> {
        serde_yaml::from_str(content).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })
    }

    fn from_file(path: &str) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        Self::from_yaml(path, &content)
    }

    pub fn apply(&mut self, options: &Options) {
        if let Some(addr) = options.listen_addr {
            self.listen_addr = addr;
        }
        if let Some(port) = options.port {
            self.listen_addr.set_port(port);
        }
        if let Some(url) = &options.frontend_url {
            self.frontend_url.clone_from(url);
        }
        if let Some(secs) = options.auction_duration_secs {
            self.auction_duration_secs = secs;
        }
        if let Some(buffer) = options.outbound_buffer {
            self.outbound_buffer = buffer;
        }
        if let Some(auto_finish) = options.auto_finish {
            self.auto_finish = auto_finish;
        }
        if let Some(secs) = options.sweep_interval_secs {
            self.sweep_interval_secs = secs;
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.outbound_buffer == 0 {
            return Err(ConfigError::Invalid(
                "outboundBuffer must be at least 1".to_string(),
            ));
        }
        if self.sweep_interval_secs == 0 {
            return Err(ConfigError::Invalid(
                "sweepIntervalSecs must be at least 1".to_string(),
            ));
        }
        let max_secs = MAX_AUCTION_DURATION.num_seconds().unsigned_abs();
        if self.auction_duration_secs > max_secs {
            return Err(ConfigError::Invalid(format!(
                "auctionDurationSecs must be at most {}",
                max_secs
            )));
        }
        Ok(())
    }

    pub fn auction_duration(&self) -> TimeDelta {
        TimeDelta::from_std(Duration::from_secs(self.auction_duration_secs))
            .map_or(AUCTION_DURATION, |d| d.min(MAX_AUCTION_DURATION))
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs.max(1))
    }
}
