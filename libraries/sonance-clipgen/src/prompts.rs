//! Prompt lists loaded from TOML.
//!
//! ```toml
//! [defaults]
//! duration_seconds = 10.0
//! prompt_influence = 0.3
//!
//! [[prompt]]
//! name = "inhale_violin"
//! text = "Soft bowed violin note ..."
//! duration_seconds = 4.0
//! ```

use crate::error::{ClipError, Result};
use serde::Deserialize;
use std::path::Path;

/// Clip length used when neither the prompt nor `[defaults]` sets one
pub const DEFAULT_DURATION_SECONDS: f64 = 10.0;

/// Prompt adherence used when neither the prompt nor `[defaults]` sets one
pub const DEFAULT_PROMPT_INFLUENCE: f64 = 0.30;

const MIN_DURATION_SECONDS: f64 = 0.5;
const MAX_DURATION_SECONDS: f64 = 22.0;

/// One clip to generate, with defaults already applied.
#[derive(Debug, Clone, PartialEq)]
pub struct PromptSpec {
    /// Base name of the output files
    pub name: String,
    pub text: String,
    pub duration_seconds: f64,
    /// 0.0 (loose) to 1.0 (literal)
    pub prompt_influence: f64,
}

/// Ordered list of prompts.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptList {
    prompts: Vec<PromptSpec>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PromptFile {
    #[serde(default)]
    defaults: PromptDefaults,
    #[serde(default, rename = "prompt")]
    prompts: Vec<PromptEntry>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct PromptDefaults {
    duration_seconds: Option<f64>,
    prompt_influence: Option<f64>,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct PromptEntry {
    name: String,
    text: String,
    duration_seconds: Option<f64>,
    prompt_influence: Option<f64>,
}

impl PromptList {
    /// Read and validate a prompt file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|e| {
            ClipError::config(format!("Cannot read prompt file {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&contents)
    }

    /// Parse and validate prompt TOML.
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let file: PromptFile = toml::from_str(contents)?;

        let default_duration = file
            .defaults
            .duration_seconds
            .unwrap_or(DEFAULT_DURATION_SECONDS);
        let default_influence = file
            .defaults
            .prompt_influence
            .unwrap_or(DEFAULT_PROMPT_INFLUENCE);

        let prompts = file
            .prompts
            .into_iter()
            .map(|entry| PromptSpec {
                name: entry.name,
                text: entry.text,
                duration_seconds: entry.duration_seconds.unwrap_or(default_duration),
                prompt_influence: entry.prompt_influence.unwrap_or(default_influence),
            })
            .collect();

        let list = Self { prompts };
        list.validate()?;
        Ok(list)
    }

    pub fn from_prompts(prompts: Vec<PromptSpec>) -> Result<Self> {
        let list = Self { prompts };
        list.validate()?;
        Ok(list)
    }

    fn validate(&self) -> Result<()> {
        let mut seen = std::collections::HashSet::new();

        for prompt in &self.prompts {
            let name = prompt.name.trim();
            if name.is_empty() {
                return Err(ClipError::config("Prompt name cannot be empty"));
            }
            if name.contains(['/', '\\']) || name == "." || name == ".." {
                return Err(ClipError::config(format!(
                    "Prompt name {:?} must be a plain file stem",
                    prompt.name
                )));
            }
            if !seen.insert(name) {
                return Err(ClipError::config(format!(
                    "Duplicate prompt name {:?}",
                    prompt.name
                )));
            }
            if prompt.text.trim().is_empty() {
                return Err(ClipError::config(format!(
                    "Prompt {:?} has empty text",
                    prompt.name
                )));
            }
            if !(MIN_DURATION_SECONDS..=MAX_DURATION_SECONDS).contains(&prompt.duration_seconds) {
                return Err(ClipError::config(format!(
                    "Prompt {:?}: duration {}s outside {}..={}s",
                    prompt.name, prompt.duration_seconds, MIN_DURATION_SECONDS, MAX_DURATION_SECONDS
                )));
            }
            if !(0.0..=1.0).contains(&prompt.prompt_influence) {
                return Err(ClipError::config(format!(
                    "Prompt {:?}: prompt_influence {} outside 0..=1",
                    prompt.name, prompt.prompt_influence
                )));
            }
        }

        Ok(())
    }

    pub fn iter(&self) -> impl Iterator<Item = &PromptSpec> {
        self.prompts.iter()
    }

    pub fn len(&self) -> usize {
        self.prompts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.prompts.is_empty()
    }
}
