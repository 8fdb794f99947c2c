//! Command-line front end over `CoreState`.

use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use thiserror::Error;
use uuid::Uuid;

use crate::config::{self, OcrConfig};
use crate::core_state::{CaptureOutcome, CheckOutcome, CoreError, CoreState};
use crate::db::{self, DatabaseError};
use crate::pipeline::extraction::{self, ExtractionError, OcrSpaceClient};

const EXIT_OK: u8 = 0;
/// Exit code when no plate could be read from the input.
const EXIT_NOT_RECOGNIZED: u8 = 2;
/// Exit code when `check` finds no saved plate.
const EXIT_NOT_KNOWN: u8 = 3;

#[derive(Parser, Debug)]
#[command(name = "platescan")]
#[command(about = "Read vehicle plates from photos and check them against a saved list")]
#[command(version)]
pub struct Cli {
    /// Plate database (default: ~/PlateScan/plates.db or $PLATESCAN_DATA_DIR/plates.db)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Send a photo to the OCR provider and extract the plate
    Scan {
        image: PathBuf,
        /// Save the recognized plate
        #[arg(long)]
        save: bool,
    },
    /// Extract a plate from raw OCR text
    Text { raw: String },
    /// Check whether a plate is already saved
    Check { plate: String },
    /// Save a plate
    Add {
        plate: String,
        #[arg(long)]
        image: Option<String>,
    },
    /// Change the number of a saved plate
    Edit { id: String, plate: String },
    /// Delete a saved plate
    Delete { id: String },
    /// List saved plates, newest first
    List,
    /// Insert the demo plates into an empty database
    Seed,
}

#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Core(#[from] CoreError),
    #[error(transparent)]
    Database(#[from] DatabaseError),
    #[error(transparent)]
    Extraction(#[from] ExtractionError),
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
    #[error("Invalid plate id: {0}")]
    InvalidId(String),
}

pub fn run_from_args() -> Result<ExitCode, CliError> {
    let cli = Cli::parse();
    let db_path = cli.db.clone().unwrap_or_else(config::database_path);
    let conn = db::open_database(&db_path)?;

    let mut state = CoreState::new(conn);
    if matches!(cli.command, Command::Scan { .. }) {
        state = state.with_ocr(Box::new(OcrSpaceClient::new(&OcrConfig::from_env())?));
    }

    let stdout = io::stdout();
    let code = execute(cli.command, &state, &mut stdout.lock())?;
    Ok(ExitCode::from(code))
}

/// User-typed plates go through the same normalization as OCR text.
fn canonical_input(plate: &str) -> String {
    extraction::normalize_text(plate).into_string()
}

fn parse_id(raw: &str) -> Result<Uuid, CliError> {
    Uuid::parse_str(raw.trim()).map_err(|_| CliError::InvalidId(raw.to_string()))
}

fn report_check(state: &CoreState, out: &mut impl Write) -> Result<CheckOutcome, CliError> {
    let outcome = state.check_current()?;
    match outcome {
        CheckOutcome::Exists => writeln!(out, "already saved")?,
        CheckOutcome::NotFound => writeln!(out, "not saved")?,
    }
    Ok(outcome)
}

/// Run one command against `state`, writing user-facing output to `out`.
/// Returns the process exit code.
pub fn execute(command: Command, state: &CoreState, out: &mut impl Write) -> Result<u8, CliError> {
    match command {
        Command::Scan { image, save } => {
            let bytes = std::fs::read(&image)?;
            let image_ref = Some(image.display().to_string());
            match state.capture(&bytes, image_ref)? {
                CaptureOutcome::Recognized(plate) => {
                    writeln!(out, "{plate}")?;
                    report_check(state, out)?;
                    if save {
                        if let Some(saved) = state.submit()? {
                            writeln!(out, "saved {}", saved.id)?;
                        }
                    }
                    Ok(EXIT_OK)
                }
                CaptureOutcome::NotRecognized => {
                    writeln!(out, "could not recognize plate")?;
                    Ok(EXIT_NOT_RECOGNIZED)
                }
            }
        }
        Command::Text { raw } => match extraction::process(&raw) {
            Some(candidate) => {
                writeln!(out, "{candidate}")?;
                Ok(EXIT_OK)
            }
            None => {
                writeln!(out, "could not recognize plate")?;
                Ok(EXIT_NOT_RECOGNIZED)
            }
        },
        Command::Check { plate } => {
            state.set_plate_input(&canonical_input(&plate))?;
            Ok(match report_check(state, out)? {
                CheckOutcome::Exists => EXIT_OK,
                CheckOutcome::NotFound => EXIT_NOT_KNOWN,
            })
        }
        Command::Add { plate, image } => {
            state.set_plate_input(&canonical_input(&plate))?;
            state.set_image_input(image)?;
            match state.submit()? {
                Some(saved) => writeln!(out, "saved {}", saved.id)?,
                None => writeln!(out, "nothing to save")?,
            }
            Ok(EXIT_OK)
        }
        Command::Edit { id, plate } => {
            let id = parse_id(&id)?;
            state.edit(&id)?;
            state.set_plate_input(&canonical_input(&plate))?;
            match state.submit()? {
                Some(saved) => writeln!(out, "updated {} -> {}", saved.id, saved.number)?,
                None => writeln!(out, "nothing to save")?,
            }
            Ok(EXIT_OK)
        }
        Command::Delete { id } => {
            let id = parse_id(&id)?;
            state.delete(&id)?;
            writeln!(out, "deleted {id}")?;
            Ok(EXIT_OK)
        }
        Command::List => {
            for plate in state.plates()? {
                writeln!(
                    out,
                    "{}\t{}\t{}",
                    plate.id,
                    plate.number,
                    plate.created_at.format("%Y-%m-%d %H:%M:%S")
                )?;
            }
            Ok(EXIT_OK)
        }
        Command::Seed => {
            let added = state.seed_samples()?;
            writeln!(out, "seeded {added} plates")?;
            Ok(EXIT_OK)
        }
    }
}
