use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::{Signal, remember};

/// Whether a form is creating a new record or editing an existing one.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Mode {
    #[default]
    Add,
    Edit,
}

impl Mode {
    pub fn is_add(self) -> bool {
        self == Mode::Add
    }

    pub fn is_edit(self) -> bool {
        self == Mode::Edit
    }

    pub fn toggle(self) -> Mode {
        match self {
            Mode::Add => Mode::Edit,
            Mode::Edit => Mode::Add,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Mode::Add => "Add",
            Mode::Edit => "Edit",
        })
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown mode '{0}', expected 'Add' or 'Edit'")]
pub struct ParseModeError(String);

impl FromStr for Mode {
    type Err = ParseModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("add") {
            Ok(Mode::Add)
        } else if s.eq_ignore_ascii_case("edit") {
            Ok(Mode::Edit)
        } else {
            Err(ParseModeError(s.to_string()))
        }
    }
}

/// Remembered Add/Edit mode. `None` starts in [`Mode::Add`].
pub fn remember_mode(initial: Option<Mode>) -> Signal<Mode> {
    (*remember(|| Signal::new(initial.unwrap_or_default()))).clone()
}

/// Remembered optional value. `None` is the explicit "nothing yet" state.
pub fn remember_nullable<T: 'static>(data: Option<T>) -> Signal<Option<T>> {
    (*remember(|| Signal::new(data))).clone()
}
