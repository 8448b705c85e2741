//! Human-facing tracking codes issued when a booking is paid.

use chrono::{DateTime, Utc};
use rand::Rng;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Literal prefix of every tracking code.
pub const TRACKING_PREFIX: &str = "SD";

/// Tracking code of the form `SD-<yyyymmddHHMMSS>-<1000..=9999>`.
///
/// Uniqueness is not guaranteed: two codes drawn in the same second collide
/// with probability 1/9000.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
pub struct TrackingId(String);

impl TrackingId {
    /// Draws a new tracking code from the wall clock and the thread RNG.
    pub fn generate() -> Self {
        Self::generate_at(Utc::now(), &mut rand::rng())
    }

    /// Draws a tracking code for a given instant and random source.
    pub fn generate_at<R: Rng + ?Sized>(now: DateTime<Utc>, rng: &mut R) -> Self {
        let suffix: u16 = rng.random_range(1000..=9999);
        Self(format!(
            "{}-{}-{}",
            TRACKING_PREFIX,
            now.format("%Y%m%d%H%M%S"),
            suffix
        ))
    }

    /// Wraps a previously issued code (e.g. loaded from storage).
    pub fn from_string(value: String) -> Self {
        Self(value)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if the value has the `SD-<14 digits>-<4 digits>` shape
    /// with a suffix in `1000..=9999`.
    pub fn is_well_formed(value: &str) -> bool {
        let mut parts = value.split('-');
        let (Some(prefix), Some(stamp), Some(suffix), None) =
            (parts.next(), parts.next(), parts.next(), parts.next())
        else {
            return false;
        };

        prefix == TRACKING_PREFIX
            && stamp.len() == 14
            && stamp.bytes().all(|b| b.is_ascii_digit())
            && suffix.len() == 4
            && suffix
                .parse::<u16>()
                .is_ok_and(|n| (1000..=9999).contains(&n))
    }
}

impl std::fmt::Display for TrackingId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
