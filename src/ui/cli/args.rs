// Sat Oct 17 2026 - Alex

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "casts-table")]
#[command(author = "Alex")]
#[command(version = "1.0.0")]
#[command(about = "Generates upcast tables for C++ class hierarchies exposed over FFI", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true, default_value = "info")]
    pub log_level: String,

    /// Shorthand for --log-level debug.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[arg(long, global = true)]
    pub no_color: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Scan a binary and write its casts table as JSON.
    Generate(GenerateArgs),
    /// Print the known-types regular expression of a hierarchy declaration.
    KnownTypes(KnownTypesArgs),
    /// List the code-section symbols of a binary.
    Symbols(SymbolsArgs),
}

#[derive(Parser, Debug)]
pub struct GenerateArgs {
    /// Hierarchy declaration (JSON).
    #[arg(long)]
    pub hierarchy: PathBuf,

    /// Binary to scan. Defaults to `artifact` from the config file.
    #[arg(short, long)]
    pub binary: Option<PathBuf>,

    #[arg(short, long)]
    pub output: Option<PathBuf>,

    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Code sections to read, in order of preference.
    #[arg(long = "section")]
    pub sections: Vec<String>,

    #[arg(long)]
    pub upcast_function: Option<String>,

    #[arg(long)]
    pub compact: bool,

    #[arg(long)]
    pub no_progress: bool,
}

impl GenerateArgs {
    pub fn validate(&self) -> Result<(), String> {
        if !self.hierarchy.exists() {
            return Err(format!("Hierarchy declaration does not exist: {:?}", self.hierarchy));
        }
        if let Some(binary) = &self.binary {
            if !binary.exists() {
                return Err(format!("Binary does not exist: {:?}", binary));
            }
        }
        if let Some(config) = &self.config {
            if !config.exists() {
                return Err(format!("Config file does not exist: {:?}", config));
            }
        }
        Ok(())
    }
}

#[derive(Parser, Debug)]
pub struct KnownTypesArgs {
    #[arg(long)]
    pub hierarchy: PathBuf,

    /// Print one type name per line instead of the regular expression.
    #[arg(long)]
    pub list: bool,
}

#[derive(Parser, Debug)]
pub struct SymbolsArgs {
    #[arg(short, long)]
    pub binary: PathBuf,

    #[arg(long = "section")]
    pub sections: Vec<String>,

    #[arg(long)]
    pub demangle: bool,

    /// Only print symbols whose (demangled) name contains this text.
    #[arg(long)]
    pub filter: Option<String>,
}
