//! Command-line flags.

use anyhow::{anyhow, bail, Result};
use match_core::{Difficulty, Side};
use std::path::PathBuf;

pub fn print_usage() {
    println!("Chess terminal: play a match against a UCI engine");
    println!();
    println!("Usage:");
    println!("  chess_terminal [--config FILE] [--engine PATH] [--side white|black]");
    println!("                 [--difficulty standard|master] [--json]");
    println!();
    println!("Options:");
    println!("  --config, -c      TOML match configuration");
    println!("  --engine, -e      UCI engine executable (overrides the config)");
    println!("  --side, -s        Start a match at once, playing this side");
    println!("  --difficulty, -d  Engine strength (default: standard)");
    println!("  --json            Print match snapshots as JSON");
    println!();
    println!("Examples:");
    println!("  chess_terminal --engine /usr/games/stockfish --side black");
    println!("  RUST_LOG=match_core=debug chess_terminal -c match.toml");
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Options {
    pub config: Option<PathBuf>,
    pub engine: Option<PathBuf>,
    pub side: Option<Side>,
    pub difficulty: Difficulty,
    pub json: bool,
}

/// Returns `None` when help was requested.
pub fn parse_args(args: &[String]) -> Result<Option<Options>> {
    let mut options = Options::default();

    let mut i = 0;
    while i < args.len() {
        let flag = args[i].as_str();
        match flag {
            "--help" | "-h" => return Ok(None),
            "--json" => options.json = true,
            "--config" | "-c" | "--engine" | "-e" | "--side" | "-s" | "--difficulty" | "-d" => {
                let value = args
                    .get(i + 1)
                    .ok_or_else(|| anyhow!("{flag} needs a value"))?;
                match flag {
                    "--config" | "-c" => options.config = Some(PathBuf::from(value)),
                    "--engine" | "-e" => options.engine = Some(PathBuf::from(value)),
                    "--side" | "-s" => options.side = Some(value.parse().map_err(|e: String| anyhow!(e))?),
                    _ => options.difficulty = value.parse().map_err(|e: String| anyhow!(e))?,
                }
                i += 1;
            }
            other => bail!("unknown argument: {other}"),
        }
        i += 1;
    }
    Ok(Some(options))
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod options_tests;
