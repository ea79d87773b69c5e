//! `carpark` - CLI for the car park record keeper
//!
//! With no subcommand this runs the interactive menu; the subcommands give
//! one-shot access to the same operations for scripts.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use tracing::{debug, warn};

use carpark::cli::{
    Cli, Command, ConfigCommand, FreeCommand, LeaveCommand, OutputFormat, ParkCommand,
    ParkedCommand,
};
use carpark::menu::TERMINATED_MESSAGE;
use carpark::report::{self, FreeSpacesTable, ParkedTable, StatusSummary};
use carpark::{init_logging, CarPark, Config, LoadReport, Menu, Rules, SessionEnd, StayPolicy, Storage};

fn main() -> anyhow::Result<ExitCode> {
    let cli = Cli::parse();

    // Initialize logging based on verbosity
    init_logging(cli.verbosity());

    match cli.command.unwrap_or(Command::Menu) {
        Command::Menu => {
            let (car_park, storage, stay) = open(cli.config, cli.data_dir)?;
            println!("{}", car_park.summary());
            run_menu(car_park, storage, stay)
        }
        Command::Park(cmd) => {
            let (car_park, storage, stay) = open(cli.config, cli.data_dir)?;
            handle_park(car_park, &storage, stay, &cmd)
        }
        Command::Leave(cmd) => {
            let (car_park, storage, _) = open(cli.config, cli.data_dir)?;
            handle_leave(car_park, &storage, &cmd)
        }
        Command::Parked(cmd) => {
            let (car_park, storage, _) = open(cli.config, cli.data_dir)?;
            handle_parked(&car_park, &storage, &cmd)
        }
        Command::Free(cmd) => {
            let (car_park, _, _) = open(cli.config, cli.data_dir)?;
            handle_free(&car_park, &cmd)
        }
        Command::Status(cmd) => {
            let (car_park, _, _) = open(cli.config, cli.data_dir)?;
            let summary = StatusSummary::new(&car_park, Local::now().naive_local());
            if cmd.json {
                println!("{}", summary.to_json()?);
            } else {
                print!("{summary}");
            }
            Ok(ExitCode::SUCCESS)
        }
        Command::Config(cmd) => handle_config(cli.config, cli.data_dir, cmd),
    }
}

/// Load configuration and the three data files.
///
/// Load warnings (a missing spaces or cars file, inconsistent parked
/// records) go to stderr and loading carries on.
fn open(
    config_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
) -> anyhow::Result<(CarPark, Storage, StayPolicy)> {
    let mut config = Config::load_from(config_path).context("loading configuration")?;
    if let Some(dir) = data_dir {
        config.files.data_dir = Some(dir);
    }
    debug!("Data directory: {}", config.data_dir().display());

    let storage = Storage::from_config(&config);
    let rules = Rules::from_config(&config)?;
    let stay = StayPolicy::from_config(&config);

    let LoadReport { car_park, warnings } = CarPark::load(&storage, rules)?;
    for warning in &warnings {
        eprintln!("{warning}");
    }
    Ok((car_park, storage, stay))
}

/// Run the menu on a blocking thread, racing it against ctrl-c.
fn run_menu(car_park: CarPark, storage: Storage, stay: StayPolicy) -> anyhow::Result<ExitCode> {
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("starting runtime")?;

    let finished = runtime.block_on(async {
        let session = tokio::task::spawn_blocking(move || {
            let mut menu = Menu::new(car_park, storage, stay, io::stdin().lock(), io::stdout());
            menu.run()
        });

        let interrupted = async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!("Cannot listen for ctrl-c: {}", e);
                std::future::pending::<()>().await;
            }
        };

        tokio::select! {
            joined = session => Some(joined),
            () = interrupted => None,
        }
    });

    let Some(joined) = finished else {
        println!("\n{TERMINATED_MESSAGE}");
        // The menu thread is blocked on stdin; don't wait for it.
        runtime.shutdown_background();
        return Ok(ExitCode::SUCCESS);
    };

    match joined.context("menu thread panicked")?? {
        SessionEnd::Exited { saved: false } => Ok(ExitCode::FAILURE),
        SessionEnd::Exited { saved: true } | SessionEnd::EndOfInput => Ok(ExitCode::SUCCESS),
    }
}

fn handle_park(
    mut car_park: CarPark,
    storage: &Storage,
    stay: StayPolicy,
    cmd: &ParkCommand,
) -> anyhow::Result<ExitCode> {
    let minutes = match stay.round(cmd.minutes) {
        Ok(minutes) => minutes,
        Err(e) => {
            eprintln!("{e}");
            return Ok(ExitCode::FAILURE);
        }
    };
    println!(
        "Rounded to nearest {} minutes: {} minutes",
        stay.slot_minutes, minutes
    );

    let now = Local::now().naive_local();
    let parked = match &cmd.space {
        Some(space) => car_park.park_in(&cmd.registration, space, minutes, now),
        None => car_park.park(&cmd.registration, minutes, now),
    };
    match parked {
        Ok(receipt) => println!("{receipt}"),
        Err(e) => {
            eprintln!("{e}");
            return Ok(ExitCode::FAILURE);
        }
    }

    storage.save_parked(car_park.parked_records())?;
    Ok(ExitCode::SUCCESS)
}

fn handle_leave(
    mut car_park: CarPark,
    storage: &Storage,
    cmd: &LeaveCommand,
) -> anyhow::Result<ExitCode> {
    match car_park.leave(&cmd.identifier) {
        Ok(record) => println!(
            "Car {} has left space {}",
            record.registration, record.space_id
        ),
        Err(e) => {
            eprintln!("{e}");
            return Ok(ExitCode::FAILURE);
        }
    }

    storage.save_parked(car_park.parked_records())?;
    Ok(ExitCode::SUCCESS)
}

fn handle_parked(
    car_park: &CarPark,
    storage: &Storage,
    cmd: &ParkedCommand,
) -> anyhow::Result<ExitCode> {
    let now = Local::now().naive_local();
    match cmd.format {
        OutputFormat::Table => print!("{}", ParkedTable::new(car_park, storage.time_format(), now)),
        OutputFormat::Json => println!(
            "{}",
            report::parked_json(car_park, storage.time_format(), now)?
        ),
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_free(car_park: &CarPark, cmd: &FreeCommand) -> anyhow::Result<ExitCode> {
    let spaces = report::free_spaces_for(car_park, cmd.space_type.map(Into::into));
    match cmd.format {
        OutputFormat::Table => print!("{}", FreeSpacesTable::new(spaces)),
        OutputFormat::Json => println!("{}", report::spaces_json(&spaces)?),
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_config(
    config_path: Option<PathBuf>,
    data_dir: Option<PathBuf>,
    cmd: ConfigCommand,
) -> anyhow::Result<ExitCode> {
    match cmd {
        ConfigCommand::Show { json } => {
            let mut config = Config::load_from(config_path).context("loading configuration")?;
            if let Some(dir) = data_dir {
                config.files.data_dir = Some(dir);
            }
            if json {
                println!("{}", serde_json::to_string_pretty(&config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Files]");
                println!("  Data directory:     {}", config.data_dir().display());
                println!("  Spaces:             {}", config.spaces_path().display());
                println!("  Cars:               {}", config.cars_path().display());
                println!("  Parked:             {}", config.parked_path().display());
                println!();
                println!("[Parking]");
                println!("  Slot (minutes):     {}", config.parking.slot_minutes);
                println!(
                    "  Minimum (minutes):  {}",
                    config.parking.min_duration_minutes
                );
                println!("  Time format:        {}", config.parking.time_format);
                println!(
                    "  Disabled may use standard: {}",
                    config.parking.disabled_may_use_standard
                );
                println!();
                println!("[Validation]");
                println!(
                    "  Registration pattern: {}",
                    config
                        .validation
                        .registration_pattern
                        .as_deref()
                        .unwrap_or("(any)")
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file
                .or(config_path)
                .unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            match Config::load_from(Some(path)) {
                Ok(_) => println!("Configuration is valid."),
                Err(e) => {
                    println!("Configuration error: {e}");
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
    }
    Ok(ExitCode::SUCCESS)
}
