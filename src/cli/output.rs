//! Output formatting for CLI commands

use serde::Serialize;

/// Output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Writes command results to stdout
pub struct Output {
    format: OutputFormat,
}

impl Output {
    pub fn new(format: OutputFormat) -> Self {
        Self { format }
    }

    /// Prints a success message, with `details` merged into the JSON form
    pub fn success<T: Serialize>(&self, message: &str, details: &T) {
        println!("{}", self.render_success(message, details));
    }

    fn render_success<T: Serialize>(&self, message: &str, details: &T) -> String {
        match self.format {
            OutputFormat::Text => message.to_string(),
            OutputFormat::Json => {
                let mut body = serde_json::Map::new();
                body.insert("success".into(), true.into());
                body.insert("message".into(), message.into());
                if let Ok(serde_json::Value::Object(extra)) = serde_json::to_value(details) {
                    body.extend(extra);
                }
                serde_json::Value::Object(body).to_string()
            }
        }
    }

    pub fn is_json(&self) -> bool {
        self.format == OutputFormat::Json
    }
}
