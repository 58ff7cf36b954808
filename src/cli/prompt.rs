use std::io;

use dialoguer::{theme::ColorfulTheme, Confirm};

use crate::errors::ExpenseError;

/// Prompt the user for confirmation with a yes/no question.
pub fn confirm_action(prompt: &str, default: bool) -> Result<bool, ExpenseError> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(default)
        .interact()
        .map_err(|err| ExpenseError::Io(io::Error::new(io::ErrorKind::Other, err.to_string())))
}
