// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Shared output formatting: every command can render its result as either
//! a human-readable summary or a JSON blob, picked by `--format`.

use clap::ValueEnum;
use serde::Serialize;

#[cfg(test)]
#[path = "output_tests.rs"]
mod tests;

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Render `value` per `format`: pretty JSON, or `text(value)` for humans.
///
/// Every command result implements `Serialize`, so JSON output is never
/// bespoke — only the text rendering differs per command.
pub fn emit<T: Serialize>(format: OutputFormat, value: &T, text: impl FnOnce(&T) -> String) -> anyhow::Result<()> {
    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(value)?),
        OutputFormat::Text => println!("{}", text(value)),
    }
    Ok(())
}

/// Render a yes/no field as a colored glyph, dimmed when `false`.
pub fn flag(value: bool) -> String {
    if value {
        crate::color::good("yes")
    } else {
        crate::color::muted("no")
    }
}
