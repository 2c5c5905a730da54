// SPDX-License-Identifier: MIT

use clap::ValueEnum;
use serde::Serialize;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Print `rows` either as one line per entry (via `format_row`) or as a
/// single JSON array, depending on `format`.
pub fn print_rows<T: Serialize>(rows: &[T], format: OutputFormat, format_row: impl Fn(&T) -> String) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            for row in rows {
                println!("{}", format_row(row));
            }
            Ok(())
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(rows)?);
            Ok(())
        }
    }
}

pub fn print_value<T: Serialize>(value: &T, format: OutputFormat, format_text: impl FnOnce(&T) -> String) -> anyhow::Result<()> {
    match format {
        OutputFormat::Text => {
            println!("{}", format_text(value));
            Ok(())
        }
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(value)?);
            Ok(())
        }
    }
}
