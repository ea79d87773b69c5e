//! In-memory car park tables and the operations over them.
//!
//! [`CarPark`] owns the spaces, registered cars and parked records, and keeps
//! them consistent: every parked record points at an existing space, and that
//! space is the only one marked occupied for it.

use std::collections::BTreeMap;

use chrono::{Duration, NaiveDateTime, SubsecRound};
use regex::Regex;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::model::{normalize_id, ParkedRecord, ParkingSpace, RegisteredCar, SpaceType};
use crate::storage::Storage;

/// Allocation and input rules.
#[derive(Debug, Clone)]
pub struct Rules {
    /// Let disabled badge holders use a standard bay when no disabled bay is free.
    pub disabled_may_use_standard: bool,
    /// Pattern an unregistered plate is checked against, to tell typos from
    /// unknown cars.
    registration: Option<Regex>,
}

impl Default for Rules {
    fn default() -> Self {
        Self {
            disabled_may_use_standard: true,
            registration: None,
        }
    }
}

impl Rules {
    /// Build rules from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the registration pattern is not a valid regex.
    pub fn from_config(config: &Config) -> Result<Self> {
        Ok(Self {
            disabled_may_use_standard: config.parking.disabled_may_use_standard,
            registration: config.registration_regex()?,
        })
    }

    /// Check registrations against `pattern`.
    #[must_use]
    pub fn with_registration_pattern(mut self, pattern: Regex) -> Self {
        self.registration = Some(pattern);
        self
    }

    /// Check whether a car with `entitlement` may use a `space_type` bay.
    #[must_use]
    pub fn can_use(&self, entitlement: SpaceType, space_type: SpaceType) -> bool {
        entitlement == space_type
            || (self.disabled_may_use_standard
                && entitlement == SpaceType::Disabled
                && space_type == SpaceType::Standard)
    }

    fn is_well_formed(&self, registration: &str) -> bool {
        self.registration
            .as_ref()
            .map_or(true, |pattern| pattern.is_match(registration))
    }
}

/// The result of a successful park.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ParkReceipt {
    /// The new parked record.
    pub record: ParkedRecord,
    /// Location of the allocated space.
    pub location: String,
    /// Type of the allocated space.
    pub space_type: SpaceType,
}

impl std::fmt::Display for ParkReceipt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Car {} parked successfully in {} ({})",
            self.record.registration, self.record.space_id, self.location
        )
    }
}

/// Free and total counts for one space type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TypeOccupancy {
    /// The space type.
    #[serde(rename = "type")]
    pub space_type: SpaceType,
    /// Number of spaces of this type.
    pub total: usize,
    /// Number of those that are free.
    pub free: usize,
}

/// Summary of how full the car park is.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Occupancy {
    /// Number of spaces.
    pub total: usize,
    /// Number of occupied spaces.
    pub occupied: usize,
    /// Number of free spaces.
    pub free: usize,
    /// Number of registered cars.
    pub registered_cars: usize,
    /// Breakdown by space type, in [`SpaceType::ALL`] order.
    pub by_type: Vec<TypeOccupancy>,
}

/// A loaded car park and anything worth telling the user about the load.
#[derive(Debug)]
pub struct LoadReport {
    /// The loaded tables.
    pub car_park: CarPark,
    /// Human-readable warnings, e.g. missing data files.
    pub warnings: Vec<String>,
}

/// The car park: spaces, registered cars and parked records.
#[derive(Debug, Clone, Default)]
pub struct CarPark {
    /// Spaces in file order.
    spaces: Vec<ParkingSpace>,
    /// Registered cars keyed by registration.
    cars: BTreeMap<String, RegisteredCar>,
    /// Parked records keyed by registration.
    parked: BTreeMap<String, ParkedRecord>,
    /// Allocation rules.
    rules: Rules,
}

impl CarPark {
    /// Create a car park with every space free.
    #[must_use]
    pub fn new(
        spaces: impl IntoIterator<Item = ParkingSpace>,
        cars: impl IntoIterator<Item = RegisteredCar>,
        rules: Rules,
    ) -> Self {
        let spaces = spaces
            .into_iter()
            .map(|mut space| {
                space.occupied = false;
                space
            })
            .collect();
        let cars = cars
            .into_iter()
            .map(|car| (car.registration.clone(), car))
            .collect();
        Self {
            spaces,
            cars,
            parked: BTreeMap::new(),
            rules,
        }
    }

    /// Load all three tables from storage.
    ///
    /// A missing spaces or cars file leaves that table empty and adds a
    /// warning to the report; a missing parked file means nothing is parked.
    ///
    /// # Errors
    ///
    /// Returns an error if a file exists but cannot be read.
    pub fn load(storage: &Storage, rules: Rules) -> Result<LoadReport> {
        let mut warnings = Vec::new();

        let spaces = storage.load_spaces().or_else(|e| {
            if e.is_not_found() {
                warn!("{}", e);
                warnings.push(format!("Warning: {e}. No spaces loaded."));
                Ok(Vec::new())
            } else {
                Err(e)
            }
        })?;
        let cars = storage.load_cars().or_else(|e| {
            if e.is_not_found() {
                warn!("{}", e);
                warnings.push(format!("Warning: {e}. No cars loaded."));
                Ok(Vec::new())
            } else {
                Err(e)
            }
        })?;

        let mut car_park = Self::new(spaces, cars, rules);
        let skipped = car_park.restore(storage.load_parked()?);
        if skipped > 0 {
            warnings.push(format!(
                "Warning: {skipped} parked record(s) in {} were inconsistent and ignored.",
                storage.parked_path().display()
            ));
        }

        info!(
            "Loaded {} spaces, {} cars, {} parked cars",
            car_park.spaces.len(),
            car_park.cars.len(),
            car_park.parked.len()
        );
        Ok(LoadReport { car_park, warnings })
    }

    /// Reinstate parked records read from storage.
    ///
    /// Records for unknown spaces, already occupied spaces, or cars already
    /// parked are dropped. Returns how many were dropped.
    pub fn restore(&mut self, records: impl IntoIterator<Item = ParkedRecord>) -> usize {
        let mut skipped = 0;
        for record in records {
            if self.parked.contains_key(&record.registration) {
                warn!(
                    "{} is recorded as parked twice, keeping the first record",
                    record.registration
                );
                skipped += 1;
                continue;
            }
            let Some(space) = self.spaces.iter_mut().find(|s| s.id == record.space_id) else {
                warn!(
                    "{} is parked in unknown space {}, ignoring",
                    record.registration, record.space_id
                );
                skipped += 1;
                continue;
            };
            if space.occupied {
                warn!(
                    "Space {} is recorded as holding two cars, ignoring {}",
                    space.id, record.registration
                );
                skipped += 1;
                continue;
            }
            if !self.cars.contains_key(&record.registration) {
                warn!(
                    "Parked car {} is not a registered car",
                    record.registration
                );
            }
            space.occupied = true;
            self.parked.insert(record.registration.clone(), record);
        }
        skipped
    }

    /// All spaces, in file order.
    #[must_use]
    pub fn spaces(&self) -> &[ParkingSpace] {
        &self.spaces
    }

    /// Look up a space by ID.
    #[must_use]
    pub fn space(&self, id: &str) -> Option<&ParkingSpace> {
        let id = normalize_id(id);
        self.spaces.iter().find(|s| s.id == id)
    }

    /// All registered cars, ordered by registration.
    pub fn cars(&self) -> impl Iterator<Item = &RegisteredCar> {
        self.cars.values()
    }

    /// Look up a registered car.
    #[must_use]
    pub fn car(&self, registration: &str) -> Option<&RegisteredCar> {
        self.cars.get(&normalize_id(registration))
    }

    /// The allocation rules in force.
    #[must_use]
    pub fn rules(&self) -> &Rules {
        &self.rules
    }

    /// Look up where a car is parked.
    #[must_use]
    pub fn parked_record(&self, registration: &str) -> Option<&ParkedRecord> {
        self.parked.get(&normalize_id(registration))
    }

    /// Parked records, ordered by registration.
    #[must_use]
    pub fn parked_records(&self) -> Vec<&ParkedRecord> {
        self.parked.values().collect()
    }

    /// Number of parked cars.
    #[must_use]
    pub fn parked_count(&self) -> usize {
        self.parked.len()
    }

    /// Free spaces, ordered by space ID.
    #[must_use]
    pub fn free_spaces(&self) -> Vec<&ParkingSpace> {
        let mut free: Vec<_> = self.spaces.iter().filter(|s| s.is_free()).collect();
        free.sort_by(|a, b| a.id.cmp(&b.id));
        free
    }

    /// Free spaces a car with `entitlement` may use.
    ///
    /// Spaces of the car's own type come first, each group in file order.
    #[must_use]
    pub fn available_spaces(&self, entitlement: SpaceType) -> Vec<&ParkingSpace> {
        let free = || self.spaces.iter().filter(|s| s.is_free());
        free()
            .filter(|s| s.space_type == entitlement)
            .chain(free().filter(|s| {
                s.space_type != entitlement && self.rules.can_use(entitlement, s.space_type)
            }))
            .collect()
    }

    /// The space a car with `entitlement` would be given, if any.
    #[must_use]
    pub fn find_available_space(&self, entitlement: SpaceType) -> Option<&ParkingSpace> {
        self.available_spaces(entitlement).into_iter().next()
    }

    /// Park a registered car in the first suitable free space.
    ///
    /// `duration_minutes` should already be rounded; see [`crate::duration`].
    ///
    /// # Errors
    ///
    /// Returns an error if the car is unknown, already parked, no suitable
    /// space is free, or the stay overflows the calendar.
    pub fn park(
        &mut self,
        registration: &str,
        duration_minutes: u32,
        now: NaiveDateTime,
    ) -> Result<ParkReceipt> {
        let car = self.parkable_car(registration)?;
        let entitlement = car.entitlement;
        let registration = car.registration.clone();

        let space_id = self
            .find_available_space(entitlement)
            .map(|s| s.id.clone())
            .ok_or(Error::NoFreeSpace(entitlement))?;

        self.occupy(registration, &space_id, duration_minutes, now)
    }

    /// Park a registered car in a chosen space.
    ///
    /// # Errors
    ///
    /// Returns an error if the car is unknown or already parked, or the
    /// space does not exist, is occupied, or is the wrong type.
    pub fn park_in(
        &mut self,
        registration: &str,
        space_id: &str,
        duration_minutes: u32,
        now: NaiveDateTime,
    ) -> Result<ParkReceipt> {
        let car = self.parkable_car(registration)?;
        let entitlement = car.entitlement;
        let registration = car.registration.clone();

        let space = self
            .space(space_id)
            .ok_or_else(|| Error::UnknownSpace(normalize_id(space_id)))?;
        if space.occupied || !self.rules.can_use(entitlement, space.space_type) {
            return Err(Error::SpaceUnavailable {
                space_id: space.id.clone(),
                entitlement,
            });
        }
        let space_id = space.id.clone();

        self.occupy(registration, &space_id, duration_minutes, now)
    }

    /// Remove a car by registration or by the space it occupies.
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotParked`] if nothing matches.
    pub fn leave(&mut self, identifier: &str) -> Result<ParkedRecord> {
        let identifier = normalize_id(identifier);

        let registration = if self.parked.contains_key(&identifier) {
            identifier
        } else {
            self.parked
                .values()
                .find(|r| r.space_id == identifier)
                .map(|r| r.registration.clone())
                .ok_or(Error::NotParked(identifier))?
        };

        let record = self
            .parked
            .remove(&registration)
            .ok_or_else(|| Error::NotParked(registration.clone()))?;
        if let Some(space) = self.spaces.iter_mut().find(|s| s.id == record.space_id) {
            space.occupied = false;
        }

        info!("{} left space {}", record.registration, record.space_id);
        Ok(record)
    }

    /// Parked records whose expected time out has passed, ordered by registration.
    #[must_use]
    pub fn overdue(&self, now: NaiveDateTime) -> Vec<&ParkedRecord> {
        self.parked.values().filter(|r| r.is_overdue(now)).collect()
    }

    /// One-line count of what was loaded, shown when a session starts.
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "Loaded {} spaces, {} cars, {} parked cars.",
            self.spaces.len(),
            self.cars.len(),
            self.parked.len()
        )
    }

    /// Count spaces by state and type.
    #[must_use]
    pub fn occupancy(&self) -> Occupancy {
        let by_type = SpaceType::ALL
            .iter()
            .map(|&space_type| {
                let of_type = self.spaces.iter().filter(|s| s.space_type == space_type);
                TypeOccupancy {
                    space_type,
                    total: of_type.clone().count(),
                    free: of_type.filter(|s| s.is_free()).count(),
                }
            })
            .collect();
        let occupied = self.spaces.iter().filter(|s| s.occupied).count();

        Occupancy {
            total: self.spaces.len(),
            occupied,
            free: self.spaces.len() - occupied,
            registered_cars: self.cars.len(),
            by_type,
        }
    }

    fn parkable_car(&self, registration: &str) -> Result<&RegisteredCar> {
        let registration = normalize_id(registration);
        let Some(car) = self.cars.get(&registration) else {
            if !self.rules.is_well_formed(&registration) {
                return Err(Error::InvalidRegistration(registration));
            }
            return Err(Error::UnknownRegistration(registration));
        };
        if let Some(record) = self.parked.get(&registration) {
            return Err(Error::AlreadyParked {
                registration,
                space_id: record.space_id.clone(),
            });
        }
        Ok(car)
    }

    fn occupy(
        &mut self,
        registration: String,
        space_id: &str,
        duration_minutes: u32,
        now: NaiveDateTime,
    ) -> Result<ParkReceipt> {
        // The parked file stores whole seconds.
        let now = now.trunc_subsecs(0);
        let expected_time_out = Duration::try_minutes(i64::from(duration_minutes))
            .and_then(|stay| now.checked_add_signed(stay))
            .ok_or_else(|| {
                Error::invalid_duration(format!("{duration_minutes} minutes is too long"))
            })?;

        let space = self
            .spaces
            .iter_mut()
            .find(|s| s.id == space_id)
            .ok_or_else(|| Error::UnknownSpace(space_id.to_string()))?;
        space.occupied = true;

        let record = ParkedRecord {
            space_id: space.id.clone(),
            registration: registration.clone(),
            time_in: now,
            expected_time_out,
        };
        let receipt = ParkReceipt {
            record: record.clone(),
            location: space.location.clone(),
            space_type: space.space_type,
        };
        self.parked.insert(registration, record);

        debug!(
            "Parked {} in {} until {}",
            receipt.record.registration, receipt.record.space_id, expected_time_out
        );
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, 30)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    fn spaces() -> Vec<ParkingSpace> {
        vec![
            ParkingSpace::new("S001", "Level 1 - Bay 01", SpaceType::Standard),
            ParkingSpace::new("S002", "Level 1 - Bay 02", SpaceType::Standard),
            ParkingSpace::new("S003", "Level 1 - Bay 03", SpaceType::Disabled),
            ParkingSpace::new("S004", "Level 1 - Bay 04", SpaceType::Ev),
            ParkingSpace::new("S005", "Level 2 - Bay 01", SpaceType::Standard),
            ParkingSpace::new("S006", "Level 2 - Bay 02", SpaceType::Standard),
        ]
    }

    fn cars() -> Vec<RegisteredCar> {
        vec![
            RegisteredCar::new("AB12CDE", "Jane Doe", "07700 900001", SpaceType::Standard),
            RegisteredCar::new("CD34EFG", "Sam Patel", "07700 900002", SpaceType::Ev),
            RegisteredCar::new("EF56GHI", "Alex Kim", "07700 900003", SpaceType::Disabled),
            RegisteredCar::new("GH78IJK", "Chris Lee", "07700 900004", SpaceType::Standard),
            RegisteredCar::new("IJ90KLM", "Pat Jones", "07700 900005", SpaceType::Disabled),
        ]
    }

    fn create_test_car_park() -> CarPark {
        CarPark::new(spaces(), cars(), Rules::default())
    }

    fn record(space: &str, reg: &str) -> ParkedRecord {
        ParkedRecord {
            space_id: space.to_string(),
            registration: reg.to_string(),
            time_in: at(9, 15),
            expected_time_out: at(17, 0),
        }
    }

    #[test]
    fn test_new_car_park_is_empty() {
        let car_park = create_test_car_park();
        assert_eq!(car_park.spaces().len(), 6);
        assert_eq!(car_park.cars().count(), 5);
        assert_eq!(car_park.parked_count(), 0);
        assert_eq!(car_park.free_spaces().len(), 6);
    }

    #[test]
    fn test_park_occupies_one_matching_space() {
        let mut car_park = create_test_car_park();

        let receipt = car_park.park("ab12cde", 120, at(9, 0)).unwrap();
        assert_eq!(receipt.record.space_id, "S001");
        assert_eq!(receipt.record.registration, "AB12CDE");
        assert_eq!(receipt.record.expected_time_out, at(11, 0));
        assert_eq!(receipt.space_type, SpaceType::Standard);
        assert_eq!(
            receipt.to_string(),
            "Car AB12CDE parked successfully in S001 (Level 1 - Bay 01)"
        );

        let free = car_park.free_spaces();
        assert_eq!(free.len(), 5);
        assert!(free.iter().all(|s| s.id != "S001"));
        assert_eq!(car_park.occupancy().occupied, 1);
    }

    #[test]
    fn test_park_ev_uses_ev_space_only() {
        let mut car_park = create_test_car_park();

        let receipt = car_park.park("CD34EFG", 60, at(8, 0)).unwrap();
        assert_eq!(receipt.record.space_id, "S004");

        // With the only EV bay taken, free standard bays don't help
        let mut other = create_test_car_park();
        other.restore(vec![record("S004", "GH78IJK")]);
        assert!(matches!(
            other.park("CD34EFG", 60, at(8, 0)),
            Err(Error::NoFreeSpace(SpaceType::Ev))
        ));
        assert_eq!(other.free_spaces().len(), 5);
    }

    #[test]
    fn test_park_disabled_prefers_disabled_space() {
        let mut car_park = create_test_car_park();
        let receipt = car_park.park("EF56GHI", 30, at(10, 0)).unwrap();
        assert_eq!(receipt.record.space_id, "S003");
    }

    #[test]
    fn test_park_disabled_falls_back_to_standard() {
        let mut car_park = create_test_car_park();
        car_park.park("EF56GHI", 30, at(10, 0)).unwrap();

        let receipt = car_park.park("IJ90KLM", 30, at(10, 0)).unwrap();
        assert_eq!(receipt.record.space_id, "S001");
        assert_eq!(receipt.space_type, SpaceType::Standard);
    }

    #[test]
    fn test_park_disabled_without_fallback() {
        let rules = Rules {
            disabled_may_use_standard: false,
            ..Rules::default()
        };
        let mut car_park = CarPark::new(spaces(), cars(), rules);
        car_park.park("EF56GHI", 30, at(10, 0)).unwrap();

        assert!(matches!(
            car_park.park("IJ90KLM", 30, at(10, 0)),
            Err(Error::NoFreeSpace(SpaceType::Disabled))
        ));
    }

    #[test]
    fn test_standard_never_uses_other_types() {
        let car_park = create_test_car_park();
        let available = car_park.available_spaces(SpaceType::Standard);
        assert_eq!(available.len(), 4);
        assert!(available.iter().all(|s| s.space_type == SpaceType::Standard));
    }

    #[test]
    fn test_available_spaces_lists_exact_type_first() {
        let car_park = create_test_car_park();
        let ids: Vec<_> = car_park
            .available_spaces(SpaceType::Disabled)
            .iter()
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(ids, vec!["S003", "S001", "S002", "S005", "S006"]);
    }

    #[test]
    fn test_park_unknown_registration() {
        let mut car_park = create_test_car_park();
        let err = car_park.park("FAKE123", 60, at(9, 0)).unwrap_err();
        assert!(matches!(err, Error::UnknownRegistration(ref r) if r == "FAKE123"));
        assert_eq!(car_park.parked_count(), 0);
    }

    #[test]
    fn test_park_malformed_registration() {
        let rules = Rules::default().with_registration_pattern(Regex::new("^[A-Z0-9]+$").unwrap());
        let mut car_park = CarPark::new(spaces(), cars(), rules);

        let err = car_park.park("AB-12", 60, at(9, 0)).unwrap_err();
        assert!(matches!(err, Error::InvalidRegistration(_)));
        // A registered car is never rejected by the pattern
        assert!(car_park.park("AB12CDE", 60, at(9, 0)).is_ok());
    }

    #[test]
    fn test_park_twice_is_rejected() {
        let mut car_park = create_test_car_park();
        car_park.park("AB12CDE", 60, at(9, 0)).unwrap();

        let err = car_park.park("AB12CDE", 60, at(9, 30)).unwrap_err();
        assert!(matches!(
            err,
            Error::AlreadyParked { ref space_id, .. } if space_id == "S001"
        ));
        assert_eq!(car_park.parked_count(), 1);
    }

    #[test]
    fn test_park_in_chosen_space() {
        let mut car_park = create_test_car_park();
        let receipt = car_park.park_in("AB12CDE", "s005", 45, at(9, 0)).unwrap();
        assert_eq!(receipt.record.space_id, "S005");
        assert_eq!(receipt.location, "Level 2 - Bay 01");
        assert!(car_park.space("S005").unwrap().occupied);
    }

    #[test]
    fn test_park_in_rejects_wrong_type_and_occupied() {
        let mut car_park = create_test_car_park();

        assert!(matches!(
            car_park.park_in("AB12CDE", "S004", 45, at(9, 0)),
            Err(Error::SpaceUnavailable { .. })
        ));
        assert!(matches!(
            car_park.park_in("AB12CDE", "S999", 45, at(9, 0)),
            Err(Error::UnknownSpace(_))
        ));

        car_park.park_in("GH78IJK", "S002", 45, at(9, 0)).unwrap();
        assert!(matches!(
            car_park.park_in("AB12CDE", "S002", 45, at(9, 0)),
            Err(Error::SpaceUnavailable { .. })
        ));
    }

    #[test]
    fn test_leave_by_registration_frees_space() {
        let mut car_park = create_test_car_park();
        car_park.park("AB12CDE", 60, at(9, 0)).unwrap();

        let record = car_park.leave("ab12cde").unwrap();
        assert_eq!(record.space_id, "S001");
        assert!(car_park.space("S001").unwrap().is_free());
        assert_eq!(car_park.free_spaces().len(), 6);
        assert!(car_park.parked_record("AB12CDE").is_none());
    }

    #[test]
    fn test_leave_by_space_id() {
        let mut car_park = create_test_car_park();
        car_park.park("CD34EFG", 60, at(9, 0)).unwrap();

        let record = car_park.leave("s004").unwrap();
        assert_eq!(record.registration, "CD34EFG");
        assert!(car_park.space("S004").unwrap().is_free());
    }

    #[test]
    fn test_leave_unknown_identifier() {
        let mut car_park = create_test_car_park();
        let err = car_park.leave("S001").unwrap_err();
        assert!(matches!(err, Error::NotParked(ref id) if id == "S001"));
    }

    #[test]
    fn test_restore_marks_spaces_occupied() {
        let mut car_park = create_test_car_park();
        let skipped = car_park.restore(vec![record("S001", "AB12CDE"), record("S004", "CD34EFG")]);

        assert_eq!(skipped, 0);
        assert_eq!(car_park.parked_count(), 2);
        let occupied: Vec<_> = car_park
            .spaces()
            .iter()
            .filter(|s| s.occupied)
            .map(|s| s.id.as_str())
            .collect();
        assert_eq!(occupied, vec!["S001", "S004"]);
        assert_eq!(car_park.free_spaces().len(), 4);
    }

    #[test]
    fn test_restore_skips_inconsistent_records() {
        let mut car_park = create_test_car_park();
        let skipped = car_park.restore(vec![
            record("S001", "AB12CDE"),
            record("S999", "CD34EFG"),
            record("S001", "GH78IJK"),
            record("S002", "AB12CDE"),
        ]);

        assert_eq!(skipped, 3);
        assert_eq!(car_park.parked_count(), 1);
    }

    #[test]
    fn test_restore_keeps_unregistered_car() {
        let mut car_park = create_test_car_park();
        let skipped = car_park.restore(vec![record("S002", "ZZ99ZZZ")]);

        assert_eq!(skipped, 0);
        assert!(car_park.parked_record("ZZ99ZZZ").is_some());
        assert!(car_park.car("ZZ99ZZZ").is_none());
    }

    #[test]
    fn test_parked_records_sorted_by_registration() {
        let mut car_park = create_test_car_park();
        car_park.park("GH78IJK", 60, at(9, 0)).unwrap();
        car_park.park("AB12CDE", 60, at(9, 0)).unwrap();

        let regs: Vec<_> = car_park
            .parked_records()
            .iter()
            .map(|r| r.registration.as_str())
            .collect();
        assert_eq!(regs, vec!["AB12CDE", "GH78IJK"]);
    }

    #[test]
    fn test_overdue() {
        let mut car_park = create_test_car_park();
        car_park.park("AB12CDE", 60, at(9, 0)).unwrap();
        car_park.park("GH78IJK", 180, at(9, 0)).unwrap();

        assert!(car_park.overdue(at(9, 30)).is_empty());
        let overdue = car_park.overdue(at(11, 0));
        assert_eq!(overdue.len(), 1);
        assert_eq!(overdue[0].registration, "AB12CDE");
    }

    #[test]
    fn test_summary_counts_tables() {
        let mut car_park = create_test_car_park();
        assert_eq!(car_park.summary(), "Loaded 6 spaces, 5 cars, 0 parked cars.");

        car_park.park("AB12CDE", 30, at(9, 0)).unwrap();
        assert_eq!(car_park.summary(), "Loaded 6 spaces, 5 cars, 1 parked cars.");
    }

    #[test]
    fn test_occupancy_by_type() {
        let mut car_park = create_test_car_park();
        car_park.park("CD34EFG", 60, at(9, 0)).unwrap();

        let occupancy = car_park.occupancy();
        assert_eq!(occupancy.total, 6);
        assert_eq!(occupancy.occupied, 1);
        assert_eq!(occupancy.free, 5);
        assert_eq!(occupancy.registered_cars, 5);
        assert_eq!(
            occupancy.by_type,
            vec![
                TypeOccupancy {
                    space_type: SpaceType::Standard,
                    total: 4,
                    free: 4
                },
                TypeOccupancy {
                    space_type: SpaceType::Disabled,
                    total: 1,
                    free: 1
                },
                TypeOccupancy {
                    space_type: SpaceType::Ev,
                    total: 1,
                    free: 0
                },
            ]
        );
    }

    #[test]
    fn test_park_overflowing_duration() {
        let mut car_park = create_test_car_park();
        let near_end = NaiveDateTime::MAX - Duration::try_minutes(10).unwrap();

        let err = car_park.park("AB12CDE", 60, near_end).unwrap_err();
        assert!(matches!(err, Error::InvalidDuration(_)));
        assert!(car_park.space("S001").unwrap().is_free());
    }
}
