//! Subprocess runner for external recognition tools
//!
//! Tools are configured as a command line (split with shell rules) and are
//! expected to print a JSON document on stdout. Markdown code fences and
//! surrounding chatter are tolerated.

use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::de::DeserializeOwned;
use tracing::debug;

use plategate_types::{Error, Result};

static SCRATCH_COUNTER: AtomicUsize = AtomicUsize::new(0);

/// Parsed external command line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    program: String,
    args: Vec<String>,
}

impl ExternalCommand {
    pub fn parse(command_line: &str) -> Result<Self> {
        let mut parts = shell_words::split(command_line)
            .map_err(|e| Error::InvalidInput(format!("invalid command '{}': {}", command_line, e)))?;
        if parts.is_empty() {
            return Err(Error::InvalidInput("command line is empty".to_string()));
        }
        let program = parts.remove(0);
        Ok(Self {
            program,
            args: parts,
        })
    }

    pub fn program(&self) -> &str {
        &self.program
    }

    /// Run with extra arguments appended and return stdout
    pub fn run(&self, extra_args: &[OsString]) -> Result<String> {
        debug!(program = %self.program, args = ?self.args, extra = ?extra_args, "running external command");

        let output = Command::new(&self.program)
            .args(&self.args)
            .args(extra_args)
            .output()
            .map_err(|e| Error::ExternalCommand(format!("{}: {}", self.program, e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(Error::ExternalCommand(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }

    /// Run and parse the JSON document printed on stdout
    pub fn run_json<T: DeserializeOwned>(&self, extra_args: &[OsString]) -> Result<T> {
        let stdout = self.run(extra_args)?;
        if stdout.trim().is_empty() {
            return Err(Error::ExternalCommand(format!("{} printed nothing", self.program)));
        }
        let json_str = extract_json_from_response(&stdout);
        Ok(serde_json::from_str(&json_str)?)
    }
}

/// Unique scratch file path under the system temp directory
pub fn scratch_path(prefix: &str, extension: &str) -> PathBuf {
    let n = SCRATCH_COUNTER.fetch_add(1, Ordering::Relaxed);
    std::env::temp_dir().join(format!("{}_{}_{}.{}", prefix, std::process::id(), n, extension))
}

/// Extract JSON from a tool response that may wrap it in markdown or prose
pub fn extract_json_from_response(response: &str) -> String {
    let response = response.trim();

    // Check for markdown code block
    if response.starts_with("```") {
        if let Some(end) = response.rfind("```") {
            let start = response.find('\n').map(|i| i + 1).unwrap_or(3);
            if start < end {
                return response[start..end].trim().to_string();
            }
        }
    }

    // Try to find a JSON object or array directly
    if let Some(start) = response.find(['{', '[']) {
        let close = if response[start..].starts_with('{') { '}' } else { ']' };
        if let Some(end) = response.rfind(close) {
            if start < end {
                return response[start..=end].to_string();
            }
        }
    }

    response.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_command_line() {
        let cmd = ExternalCommand::parse("python3 'ocr tool.py' --gpu").unwrap();
        assert_eq!(cmd.program(), "python3");
        assert_eq!(cmd.args, vec!["ocr tool.py", "--gpu"]);
    }

    #[test]
    fn test_parse_rejects_empty() {
        assert!(ExternalCommand::parse("   ").is_err());
        assert!(ExternalCommand::parse("python3 'unterminated").is_err());
    }

    #[test]
    fn test_extract_from_fenced_block() {
        let response = "```json\n{\"label\": \"Red\"}\n```";
        assert_eq!(extract_json_from_response(response), "{\"label\": \"Red\"}");
    }

    #[test]
    fn test_extract_from_chatter() {
        let response = "loading model...\n{\"detected\": false}\ndone";
        assert_eq!(extract_json_from_response(response), "{\"detected\": false}");
    }

    #[test]
    fn test_extract_array() {
        let response = "[{\"text\": \"AB\", \"confidence\": 0.5}]";
        assert_eq!(extract_json_from_response(response), response);
    }

    #[test]
    fn test_scratch_paths_are_unique() {
        assert_ne!(scratch_path("ocr", "png"), scratch_path("ocr", "png"));
    }
}
