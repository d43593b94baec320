//! Text output formatting with colors.

use chrono::SecondsFormat;
use datanozzle_core::Entry;
use serde_json::Value;

// ============================================================================
// ANSI Colors
// ============================================================================

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";

/// Meta fields shown in place of the raw body, in order of preference.
const SUMMARY_FIELDS: &[&str] = &["subtitle", "title"];

/// Text formatter with optional colors.
pub struct TextFormatter {
    use_colors: bool,
}

impl TextFormatter {
    /// Creates a new text formatter.
    pub fn new(use_colors: bool) -> Self {
        Self { use_colors }
    }

    /// Formats one entry as a header line plus an indented summary line.
    pub fn format_entry(&self, entry: &Entry) -> String {
        let header = format!(
            "{} {} {}",
            self.dim(&entry.timestamp().to_rfc3339_opts(SecondsFormat::Secs, true)),
            self.bold(entry.topic()),
            self.cyan(&format!("#{}", entry.index())),
        );

        format!("{header}\n    {}", Self::summary(entry))
    }

    /// Message printed when a query matched nothing.
    pub fn format_empty(&self) -> String {
        self.dim("No messages matched.")
    }

    /// Formats an error message.
    pub fn format_error(&self, error: &str) -> String {
        format!("{}: {error}", self.red("Error"))
    }

    /// Human summary from meta if the server attached one, else the compact body.
    fn summary(entry: &Entry) -> String {
        SUMMARY_FIELDS
            .iter()
            .find_map(|field| entry.meta().get(*field).and_then(Value::as_str))
            .map_or_else(
                || Value::Object(entry.message().clone()).to_string(),
                str::to_string,
            )
    }

    // ========================================================================
    // Color/style helpers
    // ========================================================================

    fn paint(&self, code: &str, text: &str) -> String {
        if self.use_colors {
            format!("{code}{text}{RESET}")
        } else {
            text.to_string()
        }
    }

    fn bold(&self, text: &str) -> String {
        self.paint(BOLD, text)
    }

    fn dim(&self, text: &str) -> String {
        self.paint(DIM, text)
    }

    fn red(&self, text: &str) -> String {
        self.paint(RED, text)
    }

    fn cyan(&self, text: &str) -> String {
        self.paint(CYAN, text)
    }
}
