//! `carpark` - A record keeper for a small car park
//!
//! This library holds the parking spaces, registered cars and currently parked
//! cars, reads and writes them as plain comma-delimited text files, and drives
//! the numbered console menu used to park cars and record departures.

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

pub mod carpark;
pub mod cli;
pub mod config;
pub mod duration;
pub mod error;
pub mod logging;
pub mod menu;
pub mod model;
pub mod report;
pub mod storage;

pub use carpark::{CarPark, LoadReport, Occupancy, ParkReceipt, Rules};
pub use config::Config;
pub use duration::{round_to_slot, StayPolicy};
pub use error::{Error, Result};
pub use logging::init_logging;
pub use menu::{Menu, SessionEnd};
pub use model::{ParkedRecord, ParkingSpace, RegisteredCar, SpaceType};
pub use storage::Storage;
