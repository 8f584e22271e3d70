//! CLI interface and argument parsing
//!
//! This module provides the command-line interface for edgehr using clap.

pub mod commands;
pub mod render;
pub mod session;

use clap::{Parser, Subcommand};

/// edgehr - Heart-rate observation gateway for FHIR R4 servers
#[derive(Parser, Debug)]
#[command(name = "edgehr")]
#[command(version, about, long_about = None)]
#[command(author = "Edge Gateway Contributors")]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, default_value = "edgehr.toml", env = "EDGEHR_CONFIG")]
    pub config: String,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, env = "EDGEHR_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List roster patients, or show one patient's fields locally or from the server
    Patients(commands::patients::PatientsArgs),

    /// Print the bundle a post would send
    Preview(commands::preview::PreviewArgs),

    /// Send observations to the FHIR server
    Post(commands::post::PostArgs),

    /// Write observation series files for every roster patient
    GenerateSeries(commands::generate::GenerateSeriesArgs),

    /// Interactive menu
    Menu(commands::menu::MenuArgs),

    /// Validate configuration file
    ValidateConfig(commands::validate::ValidateArgs),

    /// Initialize a new configuration file
    Init(commands::init::InitArgs),
}
