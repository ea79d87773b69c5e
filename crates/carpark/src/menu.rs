//! The numbered interactive menu.
//!
//! [`Menu`] reads choices line by line from any [`BufRead`] and writes
//! prompts, messages and tables to any [`Write`], so the binary drives it with
//! the terminal and tests drive it with in-memory buffers.

use std::io::{BufRead, Write};
use std::str::FromStr;

use chrono::{Local, NaiveDateTime};
use tracing::{debug, error};

use crate::carpark::CarPark;
use crate::duration::{parse_minutes, StayPolicy};
use crate::error::{Error, Result};
use crate::report::{FreeSpacesTable, ParkedTable};
use crate::storage::Storage;

/// Message printed when input ends or the user interrupts.
pub const TERMINATED_MESSAGE: &str = "Program terminated by user.";

const INVALID_DURATION_MESSAGE: &str = "Invalid duration. Please enter a number.";

/// A menu entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MenuChoice {
    /// 1. Park a car
    Park,
    /// 2. Leave carpark
    Leave,
    /// 3. View parked cars
    ViewParked,
    /// 4. View free spaces
    ViewFree,
    /// 5. Exit
    Exit,
}

impl FromStr for MenuChoice {
    type Err = ();

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim() {
            "1" => Ok(Self::Park),
            "2" => Ok(Self::Leave),
            "3" => Ok(Self::ViewParked),
            "4" => Ok(Self::ViewFree),
            "5" => Ok(Self::Exit),
            _ => Err(()),
        }
    }
}

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    /// The user chose Exit; `saved` says whether the parked table was written.
    Exited {
        /// Whether saving succeeded.
        saved: bool,
    },
    /// Input ran out before Exit was chosen. Nothing was saved.
    EndOfInput,
}

enum Flow {
    Continue,
    Quit,
}

/// An interactive session over a loaded car park.
#[derive(Debug)]
pub struct Menu<R, W> {
    car_park: CarPark,
    storage: Storage,
    stay: StayPolicy,
    clock: fn() -> NaiveDateTime,
    input: R,
    output: W,
}

fn local_now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl<R: BufRead, W: Write> Menu<R, W> {
    /// Create a session reading from `input` and writing to `output`.
    pub fn new(car_park: CarPark, storage: Storage, stay: StayPolicy, input: R, output: W) -> Self {
        Self {
            car_park,
            storage,
            stay,
            clock: local_now,
            input,
            output,
        }
    }

    /// Use a different clock for arrival times.
    #[must_use]
    pub fn with_clock(mut self, clock: fn() -> NaiveDateTime) -> Self {
        self.clock = clock;
        self
    }

    /// The car park as it stands.
    pub fn car_park(&self) -> &CarPark {
        &self.car_park
    }

    /// Consume the session, returning the car park and the output.
    pub fn into_parts(self) -> (CarPark, W) {
        (self.car_park, self.output)
    }

    /// Run the menu until the user exits or input ends.
    ///
    /// Operation failures are printed and the loop carries on; only console
    /// I/O failures are returned.
    ///
    /// # Errors
    ///
    /// Returns an error if reading input or writing output fails.
    pub fn run(&mut self) -> Result<SessionEnd> {
        loop {
            self.show_menu()?;
            let Some(choice) = self.prompt("\nEnter your choice (1-5): ")? else {
                return self.end_of_input();
            };
            debug!("Menu choice {:?}", choice);

            let flow = match choice.parse::<MenuChoice>() {
                Ok(MenuChoice::Park) => self.park()?,
                Ok(MenuChoice::Leave) => self.leave()?,
                Ok(MenuChoice::ViewParked) => {
                    let table = ParkedTable::new(
                        &self.car_park,
                        self.storage.time_format(),
                        (self.clock)(),
                    );
                    write!(self.output, "\n{table}")?;
                    Flow::Continue
                }
                Ok(MenuChoice::ViewFree) => {
                    let table = FreeSpacesTable::new(self.car_park.free_spaces());
                    write!(self.output, "\n{table}")?;
                    Flow::Continue
                }
                Ok(MenuChoice::Exit) => return self.exit(),
                Err(()) => {
                    writeln!(self.output, "Invalid choice. Please enter 1-5.")?;
                    Flow::Continue
                }
            };

            if let Flow::Quit = flow {
                return self.end_of_input();
            }
        }
    }

    fn show_menu(&mut self) -> Result<()> {
        let rule = "=".repeat(50);
        writeln!(self.output, "\n{rule}")?;
        writeln!(self.output, "CAR PARK MANAGEMENT SYSTEM")?;
        writeln!(self.output, "{rule}")?;
        writeln!(self.output, "1. Park a car")?;
        writeln!(self.output, "2. Leave carpark")?;
        writeln!(self.output, "3. View parked cars")?;
        writeln!(self.output, "4. View free spaces")?;
        writeln!(self.output, "5. Exit")?;
        writeln!(self.output, "{rule}")?;
        Ok(())
    }

    /// Write a prompt and read one line. `None` means input has ended.
    fn prompt(&mut self, text: &str) -> Result<Option<String>> {
        write!(self.output, "{text}")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim().to_string()))
    }

    fn park(&mut self) -> Result<Flow> {
        let Some(registration) = self.prompt("Enter car registration: ")? else {
            return Ok(Flow::Quit);
        };
        let Some(duration) = self.prompt("Enter parking duration in minutes: ")? else {
            return Ok(Flow::Quit);
        };

        let Ok(requested) = parse_minutes(&duration) else {
            writeln!(self.output, "{INVALID_DURATION_MESSAGE}")?;
            return Ok(Flow::Continue);
        };
        let minutes = match self.stay.round(requested) {
            Ok(minutes) => minutes,
            Err(e) => {
                writeln!(self.output, "{e}")?;
                return Ok(Flow::Continue);
            }
        };
        writeln!(
            self.output,
            "Rounded to nearest {} minutes: {} minutes",
            self.stay.slot_minutes, minutes
        )?;

        match self.car_park.park(&registration, minutes, (self.clock)()) {
            Ok(receipt) => writeln!(self.output, "{receipt}")?,
            Err(e) => self.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    fn leave(&mut self) -> Result<Flow> {
        let Some(identifier) = self.prompt("Enter car registration or space ID: ")? else {
            return Ok(Flow::Quit);
        };

        match self.car_park.leave(&identifier) {
            Ok(record) => writeln!(
                self.output,
                "Car {} has left space {}",
                record.registration, record.space_id
            )?,
            Err(e) => self.report(&e)?,
        }
        Ok(Flow::Continue)
    }

    fn exit(&mut self) -> Result<SessionEnd> {
        let name = self
            .storage
            .parked_path()
            .file_name()
            .map_or_else(|| "the parked file".into(), |n| n.to_string_lossy());
        writeln!(self.output, "\nSaving parked cars to {name}...")?;

        let saved = match self.storage.save_parked(self.car_park.parked_records()) {
            Ok(_) => {
                writeln!(self.output, "Data saved successfully.")?;
                true
            }
            Err(e) => {
                error!("{}", e);
                writeln!(self.output, "Error saving data: {e}")?;
                false
            }
        };
        writeln!(self.output, "Exiting program. Goodbye!")?;
        Ok(SessionEnd::Exited { saved })
    }

    fn end_of_input(&mut self) -> Result<SessionEnd> {
        writeln!(self.output, "\n{TERMINATED_MESSAGE}")?;
        Ok(SessionEnd::EndOfInput)
    }

    fn report(&mut self, err: &Error) -> Result<()> {
        if !err.is_rejection() {
            error!("{}", err);
        }
        writeln!(self.output, "{err}")?;
        Ok(())
    }
}
