//! # Editor Configuration
//!
//! Loaded from a JSON file; every field is optional.
//!
//! ```json
//! {
//!   "page_width": 800,
//!   "font_family": "Noto Sans",
//!   "line_spacing": 1.5,
//!   "line_spacing_policy": "relative",
//!   "title_levels": [
//!     { "name": "Body", "font": { "family": "Noto Sans", "size": 12 }, "tag": "p" },
//!     { "name": "H1", "font": { "family": "Noto Sans", "size": 20, "weight": 700 }, "tag": "h1" }
//!   ],
//!   "render": { "pretty": true, "indent": "  " }
//! }
//! ```

use std::path::Path;
use std::sync::Arc;

use scribe_parser::ast::{DEFAULT_FAMILY, DEFAULT_LINE_SPACING, DEFAULT_WIDTH};
use scribe_parser::{
    Format, LineSpacingPolicy, ModelError, RenderOptions, TitleLevel, TitleLevelRegistry,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::context::EditingContext;
use crate::EditorError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Rendering width of new documents, in pixels
    pub page_width: u32,
    /// Family of the standard title levels
    pub font_family: String,
    pub line_spacing: f32,
    pub line_spacing_policy: LineSpacingPolicy,
    /// Custom title levels; the standard set when absent
    pub title_levels: Option<Vec<TitleLevel>>,
    pub render: RenderOptions,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            page_width: DEFAULT_WIDTH,
            font_family: DEFAULT_FAMILY.to_string(),
            line_spacing: DEFAULT_LINE_SPACING,
            line_spacing_policy: LineSpacingPolicy::default(),
            title_levels: None,
            render: RenderOptions::default(),
        }
    }
}

impl EditorConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, EditorError> {
        let path = path.as_ref();
        debug!(path = %path.display(), "Loading editor config");
        let json = std::fs::read_to_string(path)?;
        Self::from_json(&json)
    }

    pub fn from_json(json: &str) -> Result<Self, EditorError> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ModelError> {
        if self.page_width == 0 {
            return Err(ModelError::invalid_value("page width", "must be positive"));
        }
        if !self.line_spacing.is_finite() || self.line_spacing <= 0.0 {
            return Err(ModelError::invalid_value(
                "line spacing",
                format!("must be a positive number, got {}", self.line_spacing),
            ));
        }
        if self.font_family.trim().is_empty() {
            return Err(ModelError::invalid_value("font family", "must not be empty"));
        }
        Ok(())
    }

    /// Build the title level registry this config describes
    pub fn registry(&self) -> Result<Arc<TitleLevelRegistry>, EditorError> {
        let registry = match &self.title_levels {
            Some(levels) => TitleLevelRegistry::new(levels.clone())?,
            None => TitleLevelRegistry::standard(&self.font_family),
        };
        Ok(Arc::new(registry))
    }

    /// Starting format: body text with the configured line spacing
    pub fn format(&self, registry: &TitleLevelRegistry) -> Format {
        let mut format = Format::body(registry);
        format.block.line_spacing = self.line_spacing;
        format.block.line_spacing_policy = self.line_spacing_policy;
        format
    }

    pub fn context(&self, registry: &TitleLevelRegistry) -> EditingContext {
        EditingContext::new(self.format(registry))
    }
}
