//! Delimited text format for the data files.
//!
//! Each file is line oriented: one record per line, fields separated by
//! commas and trimmed, `#` lines and blank lines ignored.

use chrono::NaiveDateTime;
use thiserror::Error;
use tracing::warn;

use crate::model::{normalize_id, ParkedRecord, ParkingSpace, RegisteredCar, SpaceType};

/// Header comment written at the top of the parked file.
pub const PARKED_HEADER: &str = "#Space ID, Registration, Time In, Expected Time Out";

/// Time layouts accepted when reading, besides the configured one.
const FALLBACK_TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"];

/// Why a single line was rejected.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LineError {
    /// Fewer fields than the record needs.
    #[error("expected at least {expected} fields, found {found}")]
    TooFewFields {
        /// Minimum number of fields.
        expected: usize,
        /// Number of fields on the line.
        found: usize,
    },

    /// A required field is blank.
    #[error("{0} is empty")]
    EmptyField(&'static str),

    /// The space type column is not a known type.
    #[error("unknown space type '{0}'")]
    UnknownSpaceType(String),

    /// A time column did not parse.
    #[error("unreadable time '{0}'")]
    BadTime(String),
}

/// A non-comment line, split into trimmed fields.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLine<'a> {
    /// One-based line number in the file.
    pub number: usize,
    /// The comma-separated fields, trimmed.
    pub fields: Vec<&'a str>,
}

/// Iterate over the data lines of a file, skipping blanks and comments.
pub fn data_lines(content: &str) -> impl Iterator<Item = DataLine<'_>> {
    content.lines().enumerate().filter_map(|(idx, line)| {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            return None;
        }
        Some(DataLine {
            number: idx + 1,
            fields: line.split(',').map(str::trim).collect(),
        })
    })
}

fn require(fields: &[&str], expected: usize) -> Result<(), LineError> {
    if fields.len() < expected {
        return Err(LineError::TooFewFields {
            expected,
            found: fields.len(),
        });
    }
    Ok(())
}

fn non_empty<'a>(value: &'a str, name: &'static str) -> Result<&'a str, LineError> {
    if value.is_empty() {
        Err(LineError::EmptyField(name))
    } else {
        Ok(value)
    }
}

/// Parse `SpaceID, Location, Type`.
///
/// # Errors
///
/// Returns an error if fields are missing or the type is unknown.
pub fn parse_space(fields: &[&str]) -> Result<ParkingSpace, LineError> {
    require(fields, 3)?;
    let id = non_empty(fields[0], "space ID")?;
    let space_type: SpaceType = fields[2]
        .parse()
        .map_err(|_| LineError::UnknownSpaceType(fields[2].to_string()))?;
    Ok(ParkingSpace::new(id, fields[1], space_type))
}

/// Parse `Registration, Owner, Contact[, Entitlement]`.
///
/// A missing entitlement means `Standard`; an unrecognised one is logged and
/// also treated as `Standard`.
///
/// # Errors
///
/// Returns an error if fields are missing.
pub fn parse_car(fields: &[&str]) -> Result<RegisteredCar, LineError> {
    require(fields, 3)?;
    let registration = non_empty(fields[0], "registration")?;
    let entitlement = match fields.get(3).copied() {
        None | Some("") => SpaceType::Standard,
        Some(raw) => raw.parse().unwrap_or_else(|_| {
            warn!(
                "Unknown entitlement '{}' for {}, using Standard",
                raw, registration
            );
            SpaceType::Standard
        }),
    };
    Ok(RegisteredCar::new(
        registration,
        fields[1],
        fields[2],
        entitlement,
    ))
}

/// Parse `SpaceID, Registration, TimeIn, ExpectedTimeOut`.
///
/// # Errors
///
/// Returns an error if fields are missing or a time does not parse.
pub fn parse_parked(fields: &[&str], time_format: &str) -> Result<ParkedRecord, LineError> {
    require(fields, 4)?;
    let space_id = non_empty(fields[0], "space ID")?;
    let registration = non_empty(fields[1], "registration")?;
    let time_in =
        parse_time(fields[2], time_format).ok_or_else(|| LineError::BadTime(fields[2].into()))?;
    let expected_time_out =
        parse_time(fields[3], time_format).ok_or_else(|| LineError::BadTime(fields[3].into()))?;
    Ok(ParkedRecord {
        space_id: normalize_id(space_id),
        registration: normalize_id(registration),
        time_in,
        expected_time_out,
    })
}

/// Parse a time in the configured format or one of the common layouts.
#[must_use]
pub fn parse_time(value: &str, time_format: &str) -> Option<NaiveDateTime> {
    std::iter::once(time_format)
        .chain(FALLBACK_TIME_FORMATS.iter().copied())
        .find_map(|format| NaiveDateTime::parse_from_str(value, format).ok())
}

/// Render a parked record as a file line (without the newline).
#[must_use]
pub fn format_parked(record: &ParkedRecord, time_format: &str) -> String {
    format!(
        "{},{},{},{}",
        record.space_id,
        record.registration,
        record.time_in.format(time_format),
        record.expected_time_out.format(time_format)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_TIME_FORMAT;
    use chrono::NaiveDate;

    #[test]
    fn test_data_lines_skip_comments_and_blanks() {
        let content = "# header\n\nS001, Level 1, Standard\n   \n  # indented comment\nS002,Level 2,EV\n";
        let lines: Vec<_> = data_lines(content).collect();

        assert_eq!(lines.len(), 2);
        assert_eq!(lines[0].number, 3);
        assert_eq!(lines[0].fields, vec!["S001", "Level 1", "Standard"]);
        assert_eq!(lines[1].number, 6);
        assert_eq!(lines[1].fields, vec!["S002", "Level 2", "EV"]);
    }

    #[test]
    fn test_parse_space() {
        let space = parse_space(&["s003", "Level 1 - Bay 03", "Disabled"]).unwrap();
        assert_eq!(space.id, "S003");
        assert_eq!(space.location, "Level 1 - Bay 03");
        assert_eq!(space.space_type, SpaceType::Disabled);
        assert!(!space.occupied);
    }

    #[test]
    fn test_parse_space_ignores_extra_fields() {
        let space = parse_space(&["S001", "Level 1", "Standard", "ignored"]).unwrap();
        assert_eq!(space.space_type, SpaceType::Standard);
    }

    #[test]
    fn test_parse_space_too_few_fields() {
        assert_eq!(
            parse_space(&["S001", "Level 1"]),
            Err(LineError::TooFewFields {
                expected: 3,
                found: 2
            })
        );
    }

    #[test]
    fn test_parse_space_unknown_type() {
        assert_eq!(
            parse_space(&["S001", "Level 1", "Motorbike"]),
            Err(LineError::UnknownSpaceType("Motorbike".to_string()))
        );
    }

    #[test]
    fn test_parse_space_empty_id() {
        assert_eq!(
            parse_space(&["", "Level 1", "Standard"]),
            Err(LineError::EmptyField("space ID"))
        );
    }

    #[test]
    fn test_parse_car_with_entitlement() {
        let car = parse_car(&["cd34efg", "Sam Patel", "07700 900456", "EV"]).unwrap();
        assert_eq!(car.registration, "CD34EFG");
        assert_eq!(car.owner, "Sam Patel");
        assert_eq!(car.contact, "07700 900456");
        assert_eq!(car.entitlement, SpaceType::Ev);
    }

    #[test]
    fn test_parse_car_missing_entitlement_defaults_to_standard() {
        let car = parse_car(&["AB12CDE", "Jane Doe", "jane@example.com"]).unwrap();
        assert_eq!(car.entitlement, SpaceType::Standard);
    }

    #[test]
    fn test_parse_car_unknown_entitlement_defaults_to_standard() {
        let car = parse_car(&["AB12CDE", "Jane Doe", "jane@example.com", "Gold"]).unwrap();
        assert_eq!(car.entitlement, SpaceType::Standard);
    }

    #[test]
    fn test_parse_parked() {
        let record = parse_parked(
            &["s001", "ab12cde", "2025-09-30 09:15:00", "2025-09-30 17:00:00"],
            DEFAULT_TIME_FORMAT,
        )
        .unwrap();
        assert_eq!(record.space_id, "S001");
        assert_eq!(record.registration, "AB12CDE");
        assert_eq!(
            record.time_in,
            NaiveDate::from_ymd_opt(2025, 9, 30)
                .unwrap()
                .and_hms_opt(9, 15, 0)
                .unwrap()
        );
    }

    #[test]
    fn test_parse_parked_accepts_minutes_only() {
        let record = parse_parked(
            &["S001", "AB12CDE", "2025-09-30 09:15", "2025-09-30 17:00"],
            DEFAULT_TIME_FORMAT,
        )
        .unwrap();
        assert_eq!(record.expected_time_out.format("%H:%M").to_string(), "17:00");
    }

    #[test]
    fn test_parse_parked_bad_time() {
        assert_eq!(
            parse_parked(
                &["S001", "AB12CDE", "yesterday", "2025-09-30 17:00"],
                DEFAULT_TIME_FORMAT
            ),
            Err(LineError::BadTime("yesterday".to_string()))
        );
    }

    #[test]
    fn test_parse_time_custom_format() {
        let time = parse_time("30/09/2025 08:00", "%d/%m/%Y %H:%M").unwrap();
        assert_eq!(time.format("%Y-%m-%d").to_string(), "2025-09-30");
    }

    #[test]
    fn test_format_parked_reads_back() {
        let line = "S004,CD34EFG,2025-09-30 08:00:00,2025-09-30 12:30:00";
        let fields: Vec<&str> = line.split(',').collect();
        let record = parse_parked(&fields, DEFAULT_TIME_FORMAT).unwrap();

        assert_eq!(format_parked(&record, DEFAULT_TIME_FORMAT), line);
    }
}
