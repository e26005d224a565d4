//! Shared helpers for command handlers.

use std::io::{self, BufRead, IsTerminal};
use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};
use secrecy::SecretString;

use loomap_core::{FacilityId, GeoPosition};

use crate::cli::GlobalOpts;
use crate::error::CliError;

/// Parse a toilet identifier as given on the command line.
///
/// Only backend ids are addressable here; local placeholders do not
/// outlive the process that created them.
pub fn parse_facility_id(raw: &str) -> Result<FacilityId, CliError> {
    raw.trim()
        .parse::<i64>()
        .map(FacilityId::from)
        .map_err(|_| CliError::Validation {
            field: "id".into(),
            reason: format!("expected a numeric toilet id, got '{raw}'"),
        })
}

pub fn parse_position(field: &str, raw: &str) -> Result<GeoPosition, CliError> {
    raw.parse().map_err(|e: loomap_core::InvalidPoint| CliError::Validation {
        field: field.into(),
        reason: e.to_string(),
    })
}

/// Prompt for confirmation, auto-approving if `--yes` was passed.
pub fn confirm(message: &str, global: &GlobalOpts, action: &str) -> Result<bool, CliError> {
    if global.yes {
        return Ok(true);
    }
    if !io::stdin().is_terminal() {
        return Err(CliError::NonInteractiveRequiresYes {
            action: action.into(),
        });
    }
    dialoguer::Confirm::new()
        .with_prompt(message)
        .default(false)
        .interact()
        .map_err(prompt_err)
}

/// Map a dialoguer / interactive I/O failure into CliError.
pub fn prompt_err(e: impl std::fmt::Display) -> CliError {
    CliError::Validation {
        field: "interactive".into(),
        reason: format!("prompt failed: {e}"),
    }
}

/// Read a password from the terminal, or the first line of stdin.
pub fn read_password(from_stdin: bool) -> Result<SecretString, CliError> {
    let raw = if from_stdin {
        let mut line = String::new();
        io::stdin().lock().read_line(&mut line)?;
        line.trim_end_matches(['\r', '\n']).to_owned()
    } else {
        rpassword::prompt_password("Password: ").map_err(prompt_err)?
    };
    Ok(SecretString::from(raw))
}

/// Spinner on stderr while a slow lookup runs. Hidden when quiet or
/// when stderr is not a terminal.
pub fn spinner(message: &'static str, global: &GlobalOpts) -> ProgressBar {
    if global.quiet || !io::stderr().is_terminal() {
        return ProgressBar::hidden();
    }
    let bar = ProgressBar::new_spinner().with_message(message);
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg}") {
        bar.set_style(style);
    }
    bar.enable_steady_tick(Duration::from_millis(80));
    bar
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn facility_ids_are_numeric() {
        assert_eq!(parse_facility_id(" 42 ").unwrap(), FacilityId::Server(42));
        assert!(matches!(
            parse_facility_id("local-1234"),
            Err(CliError::Validation { .. })
        ));
    }

    #[test]
    fn positions_need_both_coordinates() {
        assert_eq!(
            parse_position("at", "55.75,37.61").unwrap(),
            GeoPosition::new(55.75, 37.61)
        );
        assert!(parse_position("at", "55.75").is_err());
    }
}
