//! Fixed protocol parameters and the clock used for request timestamps.

use chrono::{DateTime, FixedOffset, Offset, Utc};

/// API version sent with every request.
pub const API_VERSION: &str = "2009-08-15";

/// Signature scheme version.
pub const SIGNATURE_VERSION: &str = "2";

/// Signature algorithm name.
pub const SIGNATURE_METHOD: &str = "HmacSHA256";

/// China Standard Time, the zone the endpoint expects timestamps in.
pub const DEFAULT_UTC_OFFSET_SECS: i32 = 8 * 3600;

/// Action prefixes allowed on a read-only client.
pub const READ_ONLY_PREFIXES: [&str; 3] = ["Get", "List", "Describe"];

/// Protocol constants injected into the dispatcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProtocolConfig {
    pub version: String,
    pub signature_version: String,
    pub signature_method: String,
    /// Offset applied to the clock before formatting `Timestamp`.
    pub utc_offset_secs: i32,
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            version: API_VERSION.to_string(),
            signature_version: SIGNATURE_VERSION.to_string(),
            signature_method: SIGNATURE_METHOD.to_string(),
            utc_offset_secs: DEFAULT_UTC_OFFSET_SECS,
        }
    }
}

impl ProtocolConfig {
    /// Formats `now` as `YYYY-MM-DDThh:mm:ss.000Z` in the configured zone.
    ///
    /// The trailing `Z` is literal: the endpoint reads the wall-clock digits
    /// as local time despite the suffix.
    /// Sub-second precision is truncated, so the fraction is always `.000`.
    pub fn format_timestamp(&self, now: DateTime<Utc>) -> String {
        let offset = FixedOffset::east_opt(self.utc_offset_secs).unwrap_or_else(|| Utc.fix());
        now.with_timezone(&offset).format("%Y-%m-%dT%H:%M:%S.000Z").to_string()
    }
}

/// Whether `action` only reads state.
pub fn is_read_only_action(action: &str) -> bool {
    READ_ONLY_PREFIXES.iter().any(|prefix| action.starts_with(prefix))
}

/// Source of the current time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<Utc>;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

/// Clock frozen at one instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.0
    }
}
