//! Configuration settings
//!
//! Settings are loaded from `laminate.toml`:
//!
//! ```toml
//! [toolchain]
//! program = "xelatex"
//! timeout_secs = 60
//!
//! [document]
//! main_font = "PT Sans"
//!
//! [defaults]
//! title = "CHECKLIST"
//! subtitle = "(Print and laminate for use)"
//! ```

use std::time::Duration;

use laminate_model::{DEFAULT_SUBTITLE, DEFAULT_TITLE};
use laminate_tex::{GeneratorConfig, Toolchain, DEFAULT_PROGRAM, DEFAULT_TIMEOUT};
use serde::{Deserialize, Serialize};

/// Top-level settings structure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Settings {
    /// External compiler settings
    pub toolchain: ToolchainSettings,
    /// Document appearance
    pub document: DocumentSettings,
    /// Fallback text for blank titles
    pub defaults: DefaultSettings,
}

impl Settings {
    /// Parse settings from a TOML string
    pub fn from_toml_str(toml_str: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(toml_str)
    }

    /// The toolchain these settings describe
    pub fn toolchain(&self) -> Toolchain {
        Toolchain::with_program(&self.toolchain.program)
            .with_timeout(Duration::from_secs(self.toolchain.timeout_secs))
    }

    /// Generator configuration derived from the document settings
    pub fn generator_config(&self) -> GeneratorConfig {
        GeneratorConfig {
            main_font: self.document.main_font.clone(),
        }
    }
}

/// External compiler configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolchainSettings {
    /// Compiler name or path
    pub program: String,
    /// Wall-clock limit per pass, in seconds
    pub timeout_secs: u64,
}

impl Default for ToolchainSettings {
    fn default() -> Self {
        Self {
            program: DEFAULT_PROGRAM.to_string(),
            timeout_secs: DEFAULT_TIMEOUT.as_secs(),
        }
    }
}

/// Document appearance configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct DocumentSettings {
    /// System font for the whole document
    pub main_font: Option<String>,
}

/// Text used when the checklist leaves title or subtitle blank
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefaultSettings {
    pub title: String,
    pub subtitle: String,
}

impl Default for DefaultSettings {
    fn default() -> Self {
        Self {
            title: DEFAULT_TITLE.to_string(),
            subtitle: DEFAULT_SUBTITLE.to_string(),
        }
    }
}
