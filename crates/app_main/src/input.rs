//! Input line parsing and keybinding resolution

use app_core::{Command, CommandId};
use std::collections::HashMap;
use thiserror::Error;

/// What one input line asks for
#[derive(Debug, Clone, PartialEq)]
pub enum Input {
    Command(Command),
    Status,
    Help,
    Quit,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum InputError {
    #[error("Unknown command: {0} (type help for a list)")]
    UnknownAlias(String),

    #[error("Invalid argument for {alias}: {arg:?}")]
    BadArgument { alias: String, arg: String },
}

/// Maps typed aliases to commands
pub struct InputMap {
    /// alias -> command ID
    bindings: HashMap<String, String>,
}

impl InputMap {
    pub fn new(bindings: &HashMap<String, Vec<String>>) -> Self {
        // Invert the bindings map: command -> aliases becomes alias -> command
        let mut alias_to_command = HashMap::new();

        for (command, aliases) in bindings {
            for alias in aliases {
                alias_to_command.insert(alias.to_lowercase(), command.clone());
            }
        }

        Self {
            bindings: alias_to_command,
        }
    }

    /// Parse `line` as `<alias> [argument...]`. Blank lines give `Ok(None)`.
    pub fn parse(&self, line: &str) -> Result<Option<Input>, InputError> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(None);
        }

        let (alias, arg) = match line.split_once(char::is_whitespace) {
            Some((alias, arg)) => (alias, arg.trim()),
            None => (line, ""),
        };

        let id = self
            .bindings
            .get(&alias.to_lowercase())
            .ok_or_else(|| InputError::UnknownAlias(alias.to_string()))?;

        tracing::debug!("Input {:?} -> {}", alias, id);

        let input = match id.as_str() {
            CommandId::APP_STATUS => Input::Status,
            CommandId::APP_HELP => Input::Help,
            CommandId::APP_QUIT => Input::Quit,
            _ => Command::from_id(id, arg)
                .map(Input::Command)
                .ok_or_else(|| InputError::BadArgument {
                    alias: alias.to_string(),
                    arg: arg.to_string(),
                })?,
        };
        Ok(Some(input))
    }

    /// Aliases grouped per command, sorted for display
    pub fn help_lines(&self) -> Vec<String> {
        let mut per_command: HashMap<&str, Vec<&str>> = HashMap::new();
        for (alias, id) in &self.bindings {
            per_command.entry(id.as_str()).or_default().push(alias.as_str());
        }

        let mut lines: Vec<String> = per_command
            .into_iter()
            .map(|(id, mut aliases)| {
                aliases.sort_unstable();
                format!("{:<24} {}", id, aliases.join(", "))
            })
            .collect();
        lines.sort();
        lines
    }
}
