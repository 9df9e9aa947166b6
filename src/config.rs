//! Configuration types.

use std::path::PathBuf;

use crate::error::ConfigError;
use crate::wizard::Tool;

/// How the final report is written.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    /// Markdown-style text.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "text" | "markdown" | "md" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            other => Err(format!("unknown format '{other}', expected text or json")),
        }
    }
}

/// Runtime settings for one invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CheckConfig {
    /// Tool to run. `None` shows the tool menu.
    pub tool: Option<Tool>,
    pub format: OutputFormat,
    /// Evaluate this profile file instead of running the wizard.
    pub profile_path: Option<PathBuf>,
    /// Print the built-in reference cases and exit.
    pub print_cases: bool,
}

impl CheckConfig {
    /// Read `DELAY_CHECK_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; empty values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        let invalid = |key: &str, message: String| ConfigError::InvalidValue {
            key: key.to_string(),
            message,
        };

        let tool = get("DELAY_CHECK_TOOL")
            .map(|v| v.parse::<Tool>())
            .transpose()
            .map_err(|e| invalid("DELAY_CHECK_TOOL", e))?;

        let format = get("DELAY_CHECK_FORMAT")
            .map(|v| v.parse::<OutputFormat>())
            .transpose()
            .map_err(|e| invalid("DELAY_CHECK_FORMAT", e))?
            .unwrap_or_default();

        let print_cases = match get("DELAY_CHECK_CASES").as_deref().map(str::trim) {
            None | Some("0") | Some("false") => false,
            Some("1") | Some("true") => true,
            Some(other) => {
                return Err(invalid(
                    "DELAY_CHECK_CASES",
                    format!("expected 1 or 0, got '{other}'"),
                ));
            }
        };

        Ok(Self {
            tool,
            format,
            profile_path: get("DELAY_CHECK_PROFILE").map(PathBuf::from),
            print_cases,
        })
    }

    /// Apply the first positional argument, which names the tool.
    pub fn with_tool_arg(mut self, arg: Option<&str>) -> Result<Self, ConfigError> {
        if let Some(arg) = arg {
            let tool = arg.parse::<Tool>().map_err(|message| ConfigError::InvalidValue {
                key: "tool argument".to_string(),
                message,
            })?;
            self.tool = Some(tool);
        }
        Ok(self)
    }
}
