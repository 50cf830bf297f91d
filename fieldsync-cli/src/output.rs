//! JSON output formatting.

use anyhow::Result;
use serde::Serialize;

/// Renders command results as JSON.
#[derive(Debug, Clone, Copy)]
pub struct JsonFormatter {
    pretty: bool,
}

impl JsonFormatter {
    /// Creates a formatter.
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }

    /// Formats `value`.
    pub fn format<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let text = if self.pretty {
            serde_json::to_string_pretty(value)?
        } else {
            serde_json::to_string(value)?
        };
        Ok(text)
    }

    /// Formats `value` and writes it to stdout.
    pub fn print<T: Serialize + ?Sized>(&self, value: &T) -> Result<()> {
        println!("{}", self.format(value)?);
        Ok(())
    }
}
