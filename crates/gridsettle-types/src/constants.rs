//! System-wide constants for the GridSettle market.

/// Default width of an accounting interval, in seconds (one hour).
pub const DEFAULT_INTERVAL_DURATION_SECS: u64 = 3600;

/// Default maximum age of an oracle reading before it is considered stale.
pub const DEFAULT_SETTLEMENT_STALENESS_SECS: u64 = 3600;

/// Largest decimal scale an oracle reading may carry (limit of `Decimal`).
pub const MAX_PRICE_DECIMALS: u32 = 28;

/// First profile id handed out by a fresh registry.
pub const FIRST_PROFILE_ID: u64 = 1;

/// Snapshot format version written by this build.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Version string.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name.
pub const ENGINE_NAME: &str = "GridSettle";
