//! Message parser - Turns raw message text into a command

use crate::application::errors::DispatchError;
use crate::domain::entities::ParsedCommand;

/// Default reserved command prefix
pub const DEFAULT_PREFIX: char = '!';

/// Parses incoming text into structured commands
#[derive(Debug, Clone)]
pub struct MessageParser {
    command_prefix: char,
}

impl MessageParser {
    pub fn new(prefix: char) -> Self {
        Self {
            command_prefix: prefix,
        }
    }

    pub fn prefix(&self) -> char {
        self.command_prefix
    }

    /// Check that the text looks like a command at all
    pub fn validate(&self, text: &str) -> Result<(), DispatchError> {
        if text.starts_with(self.command_prefix) {
            Ok(())
        } else {
            Err(DispatchError::MalformedCommand {
                prefix: self.command_prefix,
                text: text.to_string(),
            })
        }
    }

    /// Split a command line on spaces. The first token (prefix included) is
    /// the command name, the rest are arguments.
    pub fn parse(&self, text: &str) -> Result<ParsedCommand, DispatchError> {
        self.validate(text)?;

        let mut tokens = text.split(' ').filter(|t| !t.is_empty());
        let name = tokens.next().unwrap_or_default().to_string();
        let args = tokens.map(str::to_string).collect();

        Ok(ParsedCommand::new(name, args))
    }
}

impl Default for MessageParser {
    fn default() -> Self {
        Self::new(DEFAULT_PREFIX)
    }
}
