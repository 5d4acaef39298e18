use std::time::Duration;

use chrono::TimeDelta;

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5001";
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";

/// How long an auction runs once started.
pub const AUCTION_DURATION: TimeDelta = TimeDelta::minutes(5);
pub const MAX_AUCTION_DURATION: TimeDelta = TimeDelta::days(365);

/// Capacity of each connection's outbound queue.
pub const OUTBOUND_BUFFER: usize = 256;

pub const SWEEP_INTERVAL: Duration = Duration::from_secs(1);

pub const CONFIG_PATH_ENV: &str = "AUCTION_CONFIG";

pub const NOT_FOUND_MESSAGE: &str = "auction not found";
pub const INVALID_BID_MESSAGE: &str = "invalid bid";
pub const INVALID_TRANSITION_MESSAGE: &str = "invalid transition";
pub const MALFORMED_MESSAGE: &str = "malformed message";
pub const LAGGED_MESSAGE: &str = "connection lagged";
pub const INTERNAL_MESSAGE: &str = "internal error";
