//! `workspace/executeCommand` surface
//!
//! Positional arguments:
//!
//! | command                          | arguments                             |
//! |----------------------------------|---------------------------------------|
//! | `versionLens.refresh`            | none                                  |
//! | `versionLens.openPicker`         | uri, line, character                  |
//! | `versionLens.selectionChanged`   | uri, line, character, origin          |
//! | `versionLens.applyVersion`       | uri, line, character, version         |
//! | `versionLens.pickerClosed`       | uri                                   |

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use tower_lsp::lsp_types::{Position, Url};

use crate::lsp::interaction::SelectionOrigin;

pub const REFRESH: &str = "versionLens.refresh";
pub const OPEN_PICKER: &str = "versionLens.openPicker";
pub const SELECTION_CHANGED: &str = "versionLens.selectionChanged";
pub const APPLY_VERSION: &str = "versionLens.applyVersion";
pub const PICKER_CLOSED: &str = "versionLens.pickerClosed";

pub const ALL: [&str; 5] = [
    REFRESH,
    OPEN_PICKER,
    SELECTION_CHANGED,
    APPLY_VERSION,
    PICKER_CLOSED,
];

#[derive(Debug, Error)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),

    #[error("Missing argument {index} for {command}")]
    MissingArgument { command: &'static str, index: usize },

    #[error("Invalid argument {index} for {command}: {source}")]
    InvalidArgument {
        command: &'static str,
        index: usize,
        #[source]
        source: serde_json::Error,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum LensCommand {
    /// Drop cached metadata and re-render every open document
    Refresh,
    OpenPicker {
        uri: Url,
        position: Position,
    },
    SelectionChanged {
        uri: Url,
        position: Position,
        origin: SelectionOrigin,
    },
    ApplyVersion {
        uri: Url,
        position: Position,
        version: String,
    },
    PickerClosed {
        uri: Url,
    },
}

impl LensCommand {
    pub fn parse(command: &str, arguments: &[Value]) -> Result<Self, CommandError> {
        match command {
            REFRESH => Ok(LensCommand::Refresh),
            OPEN_PICKER => {
                let args = Arguments::new(OPEN_PICKER, arguments);
                Ok(LensCommand::OpenPicker {
                    uri: args.get(0)?,
                    position: args.position(1)?,
                })
            }
            SELECTION_CHANGED => {
                let args = Arguments::new(SELECTION_CHANGED, arguments);
                Ok(LensCommand::SelectionChanged {
                    uri: args.get(0)?,
                    position: args.position(1)?,
                    origin: args.get(3)?,
                })
            }
            APPLY_VERSION => {
                let args = Arguments::new(APPLY_VERSION, arguments);
                Ok(LensCommand::ApplyVersion {
                    uri: args.get(0)?,
                    position: args.position(1)?,
                    version: args.get(3)?,
                })
            }
            PICKER_CLOSED => {
                let args = Arguments::new(PICKER_CLOSED, arguments);
                Ok(LensCommand::PickerClosed { uri: args.get(0)? })
            }
            other => Err(CommandError::Unknown(other.to_string())),
        }
    }
}

struct Arguments<'a> {
    command: &'static str,
    values: &'a [Value],
}

impl<'a> Arguments<'a> {
    fn new(command: &'static str, values: &'a [Value]) -> Self {
        Self { command, values }
    }

    fn get<T: DeserializeOwned>(&self, index: usize) -> Result<T, CommandError> {
        let value = self
            .values
            .get(index)
            .ok_or(CommandError::MissingArgument {
                command: self.command,
                index,
            })?;

        serde_json::from_value(value.clone()).map_err(|source| CommandError::InvalidArgument {
            command: self.command,
            index,
            source,
        })
    }

    fn position(&self, index: usize) -> Result<Position, CommandError> {
        Ok(Position {
            line: self.get(index)?,
            character: self.get(index + 1)?,
        })
    }
}
