use clap::Parser;
use depsheet_core::CellName;
use depsheet_engine::engine::is_valid_name;
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "depsheet")]
#[command(about = "Dependency-tracked spreadsheet (headless)")]
#[command(version)]
#[command(after_help = "\
Examples:
  depsheet -s A1=5 -s 'B1==A1*2' -g B1
  depsheet budget.json -s A3=1200 -o budget.json
  depsheet budget.json")]
pub struct Cli {
    /// Spreadsheet file to open (JSON)
    pub file: Option<PathBuf>,

    /// Set a cell, e.g. `A1=5` or `B1==A1+2` (can be repeated)
    #[arg(short = 's', long = "set", value_name = "NAME=CONTENT", value_parser = parse_assignment)]
    pub set: Vec<Assignment>,

    /// Print a cell's value (can be repeated); default prints every non-empty cell
    #[arg(short = 'g', long = "get", value_name = "NAME")]
    pub get: Vec<CellName>,

    /// Save the spreadsheet to this file
    #[arg(short = 'o', long = "output", value_name = "FILE")]
    pub output: Option<PathBuf>,

    /// Config file (default: config.toml in the user config dir)
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Save indented JSON
    #[arg(long)]
    pub pretty: bool,
}

/// One `--set NAME=CONTENT` argument.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Assignment {
    pub name: String,
    pub content: String,
}

fn parse_assignment(arg: &str) -> Result<Assignment, String> {
    let Some((name, content)) = arg.split_once('=') else {
        return Err(format!("expected NAME=CONTENT, got '{}'", arg));
    };
    let name = name.trim();
    if !is_valid_name(name) {
        return Err(format!("invalid cell name '{}'", name));
    }
    Ok(Assignment {
        name: name.to_string(),
        content: content.to_string(),
    })
}
