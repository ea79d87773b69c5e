//! Text and JSON views of the car park.
//!
//! The table views are [`std::fmt::Display`] wrappers so they can be written
//! straight to any output.

use std::fmt;

use chrono::NaiveDateTime;
use serde::Serialize;

use crate::carpark::{CarPark, Occupancy};
use crate::error::Result;
use crate::model::{ParkingSpace, SpaceType};

const WIDTH: usize = 80;

/// Owner shown for a parked car that is not in the car table.
pub const UNKNOWN_OWNER: &str = "Unknown";

fn rule(f: &mut fmt::Formatter<'_>, ch: char) -> fmt::Result {
    writeln!(f, "{}", ch.to_string().repeat(WIDTH))
}

/// Table of currently parked cars, ordered by registration.
#[derive(Debug, Clone, Copy)]
pub struct ParkedTable<'a> {
    car_park: &'a CarPark,
    time_format: &'a str,
    now: NaiveDateTime,
}

impl<'a> ParkedTable<'a> {
    /// Create the view. Rows whose expected time out is before `now` are
    /// flagged as overdue.
    #[must_use]
    pub fn new(car_park: &'a CarPark, time_format: &'a str, now: NaiveDateTime) -> Self {
        Self {
            car_park,
            time_format,
            now,
        }
    }
}

impl fmt::Display for ParkedTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let records = self.car_park.parked_records();
        if records.is_empty() {
            return writeln!(f, "No cars currently parked.");
        }

        rule(f, '=')?;
        writeln!(f, "CURRENTLY PARKED CARS")?;
        rule(f, '=')?;
        writeln!(
            f,
            "{:<12} {:<15} {:<20} {:<20} {:<20}",
            "Space ID", "Registration", "Owner", "Time In", "Expected Out"
        )?;
        rule(f, '-')?;

        let mut any_overdue = false;
        for record in records {
            let owner = self
                .car_park
                .car(&record.registration)
                .map_or(UNKNOWN_OWNER, |car| car.owner.as_str());
            let overdue = record.is_overdue(self.now);
            any_overdue |= overdue;
            writeln!(
                f,
                "{:<12} {:<15} {:<20} {:<20} {:<20}{}",
                record.space_id,
                record.registration,
                owner,
                record.time_in.format(self.time_format).to_string(),
                record.expected_time_out.format(self.time_format).to_string(),
                if overdue { " *" } else { "" }
            )?;
        }

        rule(f, '=')?;
        if any_overdue {
            writeln!(f, "* overdue")?;
        }
        Ok(())
    }
}

/// Table of free spaces, in the order given.
#[derive(Debug, Clone)]
pub struct FreeSpacesTable<'a> {
    spaces: Vec<&'a ParkingSpace>,
}

impl<'a> FreeSpacesTable<'a> {
    /// Create the view over a list of spaces.
    #[must_use]
    pub fn new(spaces: Vec<&'a ParkingSpace>) -> Self {
        Self { spaces }
    }
}

impl fmt::Display for FreeSpacesTable<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.spaces.is_empty() {
            return writeln!(f, "No free spaces available.");
        }

        rule(f, '=')?;
        writeln!(f, "FREE SPACES")?;
        rule(f, '=')?;
        writeln!(f, "{:<12} {:<25} {:<15}", "Space ID", "Location", "Type")?;
        rule(f, '-')?;
        for space in &self.spaces {
            writeln!(
                f,
                "{:<12} {:<25} {:<15}",
                space.id,
                space.location,
                space.space_type.as_str()
            )?;
        }
        rule(f, '=')
    }
}

/// Occupancy summary with an overdue count.
#[derive(Debug, Clone)]
pub struct StatusSummary {
    occupancy: Occupancy,
    overdue: usize,
}

impl StatusSummary {
    /// Build the summary for `car_park` as of `now`.
    #[must_use]
    pub fn new(car_park: &CarPark, now: NaiveDateTime) -> Self {
        Self {
            occupancy: car_park.occupancy(),
            overdue: car_park.overdue(now).len(),
        }
    }

    /// Render as pretty JSON.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String> {
        let value = serde_json::json!({
            "total": self.occupancy.total,
            "occupied": self.occupancy.occupied,
            "free": self.occupancy.free,
            "registered_cars": self.occupancy.registered_cars,
            "overdue": self.overdue,
            "by_type": self.occupancy.by_type,
        });
        Ok(serde_json::to_string_pretty(&value)?)
    }
}

impl fmt::Display for StatusSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let o = &self.occupancy;
        writeln!(f, "Car park status")?;
        writeln!(f, "---------------")?;
        writeln!(f, "Spaces:          {}", o.total)?;
        writeln!(f, "Occupied:        {}", o.occupied)?;
        writeln!(f, "Free:            {}", o.free)?;
        writeln!(f, "Registered cars: {}", o.registered_cars)?;
        writeln!(f, "Overdue:         {}", self.overdue)?;
        writeln!(f)?;
        writeln!(f, "{:<10} {:>6} {:>6}", "Type", "Total", "Free")?;
        for t in &o.by_type {
            writeln!(f, "{:<10} {:>6} {:>6}", t.space_type.as_str(), t.total, t.free)?;
        }
        Ok(())
    }
}

#[derive(Debug, Serialize)]
struct ParkedRow<'a> {
    space_id: &'a str,
    registration: &'a str,
    owner: &'a str,
    time_in: String,
    expected_time_out: String,
    overdue: bool,
}

/// Render the parked cars as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn parked_json(car_park: &CarPark, time_format: &str, now: NaiveDateTime) -> Result<String> {
    let rows: Vec<ParkedRow<'_>> = car_park
        .parked_records()
        .into_iter()
        .map(|record| ParkedRow {
            space_id: &record.space_id,
            registration: &record.registration,
            owner: car_park
                .car(&record.registration)
                .map_or(UNKNOWN_OWNER, |car| car.owner.as_str()),
            time_in: record.time_in.format(time_format).to_string(),
            expected_time_out: record.expected_time_out.format(time_format).to_string(),
            overdue: record.is_overdue(now),
        })
        .collect();
    Ok(serde_json::to_string_pretty(&rows)?)
}

/// Render spaces as pretty JSON.
///
/// # Errors
///
/// Returns an error if serialization fails.
pub fn spaces_json(spaces: &[&ParkingSpace]) -> Result<String> {
    Ok(serde_json::to_string_pretty(spaces)?)
}

/// Free spaces, optionally only those usable by `entitlement`.
#[must_use]
pub fn free_spaces_for(car_park: &CarPark, entitlement: Option<SpaceType>) -> Vec<&ParkingSpace> {
    match entitlement {
        Some(entitlement) => car_park.available_spaces(entitlement),
        None => car_park.free_spaces(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::carpark::Rules;
    use crate::config::DEFAULT_TIME_FORMAT;
    use crate::model::{ParkedRecord, RegisteredCar};
    use chrono::NaiveDate;

    fn at(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 9, 30)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    fn create_test_car_park() -> CarPark {
        CarPark::new(
            vec![
                ParkingSpace::new("S002", "Level 1 - Bay 02", SpaceType::Standard),
                ParkingSpace::new("S001", "Level 1 - Bay 01", SpaceType::Standard),
                ParkingSpace::new("S004", "Level 1 - Bay 04", SpaceType::Ev),
            ],
            vec![RegisteredCar::new(
                "AB12CDE",
                "Jane Doe",
                "07700 900001",
                SpaceType::Standard,
            )],
            Rules::default(),
        )
    }

    #[test]
    fn test_parked_table_empty() {
        let car_park = create_test_car_park();
        let out = ParkedTable::new(&car_park, DEFAULT_TIME_FORMAT, at(9, 0)).to_string();
        assert_eq!(out, "No cars currently parked.\n");
    }

    #[test]
    fn test_parked_table_rows() {
        let mut car_park = create_test_car_park();
        car_park.park("AB12CDE", 60, at(9, 0)).unwrap();
        car_park.restore(vec![ParkedRecord {
            space_id: "S004".to_string(),
            registration: "ZZ99ZZZ".to_string(),
            time_in: at(8, 0),
            expected_time_out: at(8, 30),
        }]);

        let out = ParkedTable::new(&car_park, DEFAULT_TIME_FORMAT, at(9, 15)).to_string();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[0], "=".repeat(80));
        assert_eq!(lines[1], "CURRENTLY PARKED CARS");
        assert!(lines[3].starts_with("Space ID     Registration    Owner"));
        assert_eq!(lines[4], "-".repeat(80));
        assert!(lines[5].starts_with("S002         AB12CDE         Jane Doe"));
        assert!(lines[5].contains("2025-09-30 09:00:00"));
        assert!(!lines[5].ends_with('*'));
        assert!(lines[6].starts_with("S004         ZZ99ZZZ         Unknown"));
        assert!(lines[6].ends_with(" *"));
        assert_eq!(lines[8], "* overdue");
    }

    #[test]
    fn test_free_spaces_table_sorted() {
        let car_park = create_test_car_park();
        let out = FreeSpacesTable::new(car_park.free_spaces()).to_string();
        let lines: Vec<&str> = out.lines().collect();

        assert_eq!(lines[1], "FREE SPACES");
        assert_eq!(
            lines[3].trim_end(),
            "Space ID     Location                  Type"
        );
        assert!(lines[5].starts_with("S001         Level 1 - Bay 01"));
        assert!(lines[6].starts_with("S002"));
        assert!(lines[7].starts_with("S004"));
        assert!(lines[7].contains("EV"));
    }

    #[test]
    fn test_free_spaces_table_empty() {
        let out = FreeSpacesTable::new(Vec::new()).to_string();
        assert_eq!(out, "No free spaces available.\n");
    }

    #[test]
    fn test_free_spaces_for_entitlement() {
        let car_park = create_test_car_park();
        let ev = free_spaces_for(&car_park, Some(SpaceType::Ev));
        assert_eq!(ev.len(), 1);
        assert_eq!(free_spaces_for(&car_park, None).len(), 3);
    }

    #[test]
    fn test_status_summary_text_and_json() {
        let mut car_park = create_test_car_park();
        car_park.park("AB12CDE", 15, at(9, 0)).unwrap();

        let summary = StatusSummary::new(&car_park, at(10, 0));
        let text = summary.to_string();
        assert!(text.contains("Occupied:        1"));
        assert!(text.contains("Overdue:         1"));

        let json: serde_json::Value = serde_json::from_str(&summary.to_json().unwrap()).unwrap();
        assert_eq!(json["free"], 2);
        assert_eq!(json["overdue"], 1);
        assert_eq!(json["by_type"][2]["type"], "EV");
    }

    #[test]
    fn test_parked_json() {
        let mut car_park = create_test_car_park();
        car_park.park("AB12CDE", 60, at(9, 0)).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&parked_json(&car_park, DEFAULT_TIME_FORMAT, at(9, 30)).unwrap())
                .unwrap();
        assert_eq!(json[0]["registration"], "AB12CDE");
        assert_eq!(json[0]["owner"], "Jane Doe");
        assert_eq!(json[0]["expected_time_out"], "2025-09-30 10:00:00");
        assert_eq!(json[0]["overdue"], false);
    }

    #[test]
    fn test_spaces_json() {
        let car_park = create_test_car_park();
        let json: serde_json::Value =
            serde_json::from_str(&spaces_json(&car_park.free_spaces()).unwrap()).unwrap();
        assert_eq!(json.as_array().unwrap().len(), 3);
        assert_eq!(json[0]["id"], "S001");
    }
}
