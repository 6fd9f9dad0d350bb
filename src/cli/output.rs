// Output formatting for CLI

use clap::ValueEnum;
use std::io::Write;

use super::CliResult;

/// Output format options
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Pretty-printed JSON
    #[default]
    Pretty,
    /// Compact JSON
    Json,
    /// Flattened key-value pairs
    KeyValue,
    /// Aligned table
    Table,
}

/// Format and output data
pub struct OutputFormatter {
    format: OutputFormat,
    quiet: bool,
}

impl OutputFormatter {
    pub fn new(format: OutputFormat, quiet: bool) -> Self {
        Self { format, quiet }
    }

    /// Output one record
    pub fn output_value(&self, value: &serde_json::Value, writer: &mut dyn Write) -> CliResult<()> {
        match self.format {
            OutputFormat::Pretty => {
                writeln!(writer, "{}", serde_json::to_string_pretty(value)?)?;
            }
            OutputFormat::Json => {
                writeln!(writer, "{}", serde_json::to_string(value)?)?;
            }
            OutputFormat::KeyValue => {
                let mut items = Vec::new();
                flatten("", value, &mut items);
                for (key, value) in items {
                    writeln!(writer, "{}: {}", key, value)?;
                }
            }
            OutputFormat::Table => {
                let mut items = Vec::new();
                flatten("", value, &mut items);
                let max_key_len = items.iter().map(|(k, _)| k.len()).max().unwrap_or(0);

                writeln!(writer, "{}", "=".repeat(max_key_len + 30))?;
                for (key, value) in items {
                    writeln!(writer, "{:<width$}  {}", key, value, width = max_key_len)?;
                }
                writeln!(writer, "{}", "=".repeat(max_key_len + 30))?;
            }
        }
        Ok(())
    }

    /// Print success message
    pub fn print_success(&self, message: &str) {
        if !self.quiet {
            println!("✓ {}", message);
        }
    }

    /// Print error message
    pub fn print_error(&self, message: &str) {
        eprintln!("✗ {}", message);
    }

    /// Print info message
    pub fn print_info(&self, message: &str) {
        if !self.quiet {
            println!("  {}", message);
        }
    }
}

/// Flatten nested objects and arrays into dotted keys
fn flatten(prefix: &str, value: &serde_json::Value, out: &mut Vec<(String, String)>) {
    let key = |k: &str| {
        if prefix.is_empty() {
            k.to_string()
        } else {
            format!("{}.{}", prefix, k)
        }
    };
    match value {
        serde_json::Value::Object(obj) => {
            for (k, v) in obj {
                flatten(&key(k), v, out);
            }
        }
        serde_json::Value::Array(arr) => {
            for (i, v) in arr.iter().enumerate() {
                flatten(&key(&i.to_string()), v, out);
            }
        }
        other => out.push((prefix.to_string(), format_value(other))),
    }
}

/// Format a scalar JSON value for display
fn format_value(value: &serde_json::Value) -> String {
    match value {
        serde_json::Value::String(s) => s.clone(),
        serde_json::Value::Null => "(null)".to_string(),
        other => other.to_string(),
    }
}
