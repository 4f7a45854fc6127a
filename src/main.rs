//! prepr - Pretty representation builder
//!
//! CLI entry point rendering the showcase graph.

// Allow multiple crate versions from dependencies (can't easily control)
#![allow(clippy::multiple_crate_versions)]

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use clap::Parser;
use colored::Colorize;

use prepr::settings;
use prepr::style::Palette;

/// Pretty representation printer
///
/// Renders a showcase object graph as reconstruction pseudo code under the
/// selected layout profile and palette. The rendered text goes to stdout;
/// the banner goes to stderr so stdout stays clean for piping.
#[derive(Parser, Debug)]
#[command(name = "prepr", version, about)]
struct Cli {
    /// Palette name: rgbfull, rgb256, rgb8 or none
    #[arg(long, default_value = "rgbfull")]
    palette: String,

    /// Use the minimal single-line layout profile
    #[arg(long)]
    minimal: bool,

    /// Path to a TOML settings profile, applied on top of the other flags
    #[arg(long)]
    profile: Option<PathBuf>,
}

/// Install the settings the flags describe: profile, then palette, then the
/// optional TOML override.
fn apply_cli_settings(cli: &Cli) -> Result<()> {
    let Some(palette) = Palette::by_name(&cli.palette) else {
        bail!(
            "Unknown palette '{}'. Available palettes: {}",
            cli.palette,
            Palette::known_names()
        );
    };

    if cli.minimal {
        settings::apply_minimal();
    } else {
        settings::apply_default();
    }
    settings::set_palette(palette);

    if let Some(path) = &cli.profile {
        settings::load_from_path(path)
            .with_context(|| format!("Failed to apply profile '{}'", path.display()))?;
    }
    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    apply_cli_settings(&cli)?;

    eprintln!(
        "{} {}",
        "===".bold().cyan(),
        "prepr showcase".bold().cyan()
    );
    println!("{}", prepr::demo::sample());
    Ok(())
}
