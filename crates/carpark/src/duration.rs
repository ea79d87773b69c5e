//! Rounding of requested stays to bookable slots.

use crate::config::Config;
use crate::error::{Error, Result};

/// How requested stays are turned into booked minutes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StayPolicy {
    /// Stays are booked in multiples of this many minutes.
    pub slot_minutes: u32,
    /// Shortest bookable stay.
    pub min_minutes: u32,
}

impl Default for StayPolicy {
    fn default() -> Self {
        Self {
            slot_minutes: 15,
            min_minutes: 15,
        }
    }
}

impl StayPolicy {
    /// Build the policy from configuration.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        Self {
            slot_minutes: config.parking.slot_minutes,
            min_minutes: config.parking.min_duration_minutes,
        }
    }

    /// Round a requested stay to the nearest slot, never below the minimum.
    ///
    /// # Errors
    ///
    /// Returns an error if the rounded stay does not fit in `u32` minutes.
    pub fn round(&self, requested: i64) -> Result<u32> {
        round_to_slot(requested, self.slot_minutes, self.min_minutes)
    }
}

/// Round `minutes` to the nearest multiple of `slot` (halves round up),
/// then clamp to at least `min`.
///
/// # Errors
///
/// Returns an error if the result does not fit in `u32` minutes.
pub fn round_to_slot(minutes: i64, slot: u32, min: u32) -> Result<u32> {
    let slot = i64::from(slot.max(1));
    let rounded = if minutes <= 0 {
        0
    } else {
        minutes.saturating_add(slot / 2) / slot * slot
    };
    let rounded = u32::try_from(rounded)
        .map_err(|_| Error::invalid_duration(format!("{minutes} minutes is too long")))?;
    Ok(rounded.max(min))
}

/// Parse a duration typed at the prompt.
///
/// # Errors
///
/// Returns [`Error::InvalidDuration`] if the input is not a whole number.
pub fn parse_minutes(input: &str) -> Result<i64> {
    input
        .trim()
        .parse()
        .map_err(|_| Error::invalid_duration("Please enter a number."))
}
