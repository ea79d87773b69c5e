//! Core record types for carpark.
//!
//! This module defines the three tables the car park keeps: parking spaces,
//! registered cars, and the records of cars currently parked.

use std::str::FromStr;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::error::Error;

/// The category of a space, and the entitlement of a car.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SpaceType {
    /// An ordinary bay.
    Standard,
    /// A bay reserved for disabled badge holders.
    Disabled,
    /// A bay with an electric vehicle charger.
    #[serde(rename = "EV")]
    Ev,
}

impl SpaceType {
    /// Every space type, in display order.
    pub const ALL: [SpaceType; 3] = [Self::Standard, Self::Disabled, Self::Ev];

    /// The canonical file and display spelling.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Standard => "Standard",
            Self::Disabled => "Disabled",
            Self::Ev => "EV",
        }
    }
}

impl std::fmt::Display for SpaceType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SpaceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "standard" => Ok(Self::Standard),
            "disabled" => Ok(Self::Disabled),
            "ev" => Ok(Self::Ev),
            _ => Err(Error::UnknownSpaceType(s.trim().to_string())),
        }
    }
}

/// Normalise a registration or space ID for storage and lookup.
#[must_use]
pub fn normalize_id(raw: &str) -> String {
    raw.trim().to_uppercase()
}

/// A single parking bay.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkingSpace {
    /// Space identifier, e.g. `S001`.
    pub id: String,
    /// Human-readable location.
    pub location: String,
    /// What kind of bay this is.
    #[serde(rename = "type")]
    pub space_type: SpaceType,
    /// Whether a car is currently in the bay.
    pub occupied: bool,
}

impl ParkingSpace {
    /// Create a new, unoccupied space.
    #[must_use]
    pub fn new(id: &str, location: impl Into<String>, space_type: SpaceType) -> Self {
        Self {
            id: normalize_id(id),
            location: location.into(),
            space_type,
            occupied: false,
        }
    }

    /// Check if the space is free.
    #[must_use]
    pub fn is_free(&self) -> bool {
        !self.occupied
    }
}

/// A car known to the car park.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredCar {
    /// Registration plate, upper case.
    pub registration: String,
    /// Owner's name.
    pub owner: String,
    /// Owner's contact details.
    pub contact: String,
    /// Which spaces the car may use.
    pub entitlement: SpaceType,
}

impl RegisteredCar {
    /// Create a new registered car.
    #[must_use]
    pub fn new(
        registration: &str,
        owner: impl Into<String>,
        contact: impl Into<String>,
        entitlement: SpaceType,
    ) -> Self {
        Self {
            registration: normalize_id(registration),
            owner: owner.into(),
            contact: contact.into(),
            entitlement,
        }
    }
}

/// A car currently occupying a space.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParkedRecord {
    /// The occupied space.
    pub space_id: String,
    /// The parked car.
    pub registration: String,
    /// When the car arrived.
    pub time_in: NaiveDateTime,
    /// When the car is expected to leave.
    pub expected_time_out: NaiveDateTime,
}

impl ParkedRecord {
    /// Check whether the car has stayed past its expected time out.
    #[must_use]
    pub fn is_overdue(&self, now: NaiveDateTime) -> bool {
        self.expected_time_out < now
    }
}
