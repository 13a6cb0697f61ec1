//! # Format Commands
//!
//! Formatting operations as data. A [`Command`] is what a toolbar sends; it
//! is resolved against the current [`EditingContext`] into a concrete
//! [`FormatChange`] before anything is touched.
//!
//! ## Propagation
//!
//! - With selected spans, the change goes to every span in selection order
//! - Otherwise it goes to the block (or run) holding the caret
//! - Toggles without a value negate the *context's* value, never the
//!   target's, so a mixed selection ends up uniform
//!
//! Resolution fails (and nothing changes) for unknown title levels, unknown
//! line spacing policies and out-of-range numbers.

use scribe_parser::{
    Block, Color, Font, FontWeight, LineSpacingPolicy, ModelError, Run, RunFormat, TitleLevelId,
    TitleLevelRegistry,
};
use serde::{Deserialize, Serialize};

use crate::context::EditingContext;
use crate::notifications::FormatKind;

const MAX_WEIGHT: u16 = 1000;

/// Formatting command as issued by a caller
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum Command {
    /// Replace the whole font at once
    SetFont { font: Font },

    SetFontFamily { family: String },

    /// Point size
    SetFontSize { size: u32 },

    /// `None` toggles
    SetFontItalic { italic: Option<bool> },

    /// `None` toggles bold
    SetFontWeight { weight: Option<FontWeight> },

    SetTextColor { color: Color },

    /// `None` clears the background
    SetBackgroundColor { color: Option<Color> },

    /// Title level by registry name
    SetTitleLevel { level: String },

    SetLineSpacing { spacing: f32 },

    /// `"absolute"` or `"relative"`; `None` toggles
    SetLineSpacingPolicy { policy: Option<String> },
}

impl Command {
    /// Check arguments and turn toggles into explicit values
    pub fn resolve(
        &self,
        ctx: &EditingContext,
        registry: &TitleLevelRegistry,
    ) -> Result<FormatChange, ModelError> {
        match self {
            Command::SetFont { font } => {
                check_family(&font.family)?;
                check_size(font.size)?;
                check_weight(font.weight)?;
                let mut font = font.clone();
                font.family = font.family.trim().to_string();
                Ok(FormatChange::Font(font))
            }

            Command::SetFontFamily { family } => {
                check_family(family)?;
                Ok(FormatChange::FontFamily(family.trim().to_string()))
            }

            Command::SetFontSize { size } => {
                check_size(*size)?;
                Ok(FormatChange::FontSize(*size))
            }

            Command::SetFontItalic { italic } => Ok(FormatChange::FontItalic(
                italic.unwrap_or(!ctx.font().italic),
            )),

            Command::SetFontWeight { weight } => {
                let weight = weight.unwrap_or_else(|| ctx.font().weight.toggled());
                check_weight(weight)?;
                Ok(FormatChange::FontWeight(weight))
            }

            Command::SetTextColor { color } => Ok(FormatChange::TextColor(*color)),

            Command::SetBackgroundColor { color } => Ok(FormatChange::BackgroundColor(*color)),

            Command::SetTitleLevel { level } => registry
                .by_name(level)
                .map(FormatChange::TitleLevel)
                .ok_or_else(|| ModelError::UnknownTitleLevel(level.clone())),

            Command::SetLineSpacing { spacing } => {
                if !spacing.is_finite() || *spacing <= 0.0 {
                    return Err(ModelError::invalid_value(
                        "line spacing",
                        format!("must be a positive number, got {}", spacing),
                    ));
                }
                Ok(FormatChange::LineSpacing(*spacing))
            }

            Command::SetLineSpacingPolicy { policy } => {
                let policy = match policy {
                    Some(text) => text.parse()?,
                    None => ctx.block_format().line_spacing_policy.toggled(),
                };
                Ok(FormatChange::LineSpacingPolicy(policy))
            }
        }
    }
}

fn check_family(family: &str) -> Result<(), ModelError> {
    if family.trim().is_empty() {
        return Err(ModelError::invalid_value("font family", "must not be empty"));
    }
    Ok(())
}

fn check_size(size: u32) -> Result<(), ModelError> {
    if size == 0 {
        return Err(ModelError::invalid_value("font size", "must be at least 1pt"));
    }
    Ok(())
}

fn check_weight(weight: FontWeight) -> Result<(), ModelError> {
    if weight.0 == 0 || weight.0 > MAX_WEIGHT {
        return Err(ModelError::invalid_value(
            "font weight",
            format!("must be in 1..={}, got {}", MAX_WEIGHT, weight.0),
        ));
    }
    Ok(())
}

/// What a change applies to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Block,
    Run,
}

/// Something a change can be applied to
#[derive(Debug)]
pub enum Target<'a> {
    Block(&'a mut Block),
    Run(&'a mut Run),
}

/// A resolved command: one attribute, one concrete value
#[derive(Debug, Clone, PartialEq)]
pub enum FormatChange {
    Font(Font),
    FontFamily(String),
    FontSize(u32),
    FontItalic(bool),
    FontWeight(FontWeight),
    TextColor(Color),
    BackgroundColor(Option<Color>),
    TitleLevel(TitleLevelId),
    LineSpacing(f32),
    LineSpacingPolicy(LineSpacingPolicy),
}

impl FormatChange {
    pub fn scope(&self) -> Scope {
        match self {
            FormatChange::TitleLevel(_)
            | FormatChange::LineSpacing(_)
            | FormatChange::LineSpacingPolicy(_) => Scope::Block,
            _ => Scope::Run,
        }
    }

    pub fn kind(&self) -> FormatKind {
        match self {
            FormatChange::Font(_) => FormatKind::Font,
            FormatChange::FontFamily(_) => FormatKind::FontFamily,
            FormatChange::FontSize(_) => FormatKind::FontSize,
            FormatChange::FontItalic(_) => FormatKind::FontItalic,
            FormatChange::FontWeight(_) => FormatKind::FontWeight,
            FormatChange::TextColor(_) => FormatKind::TextColor,
            FormatChange::BackgroundColor(_) => FormatKind::BackgroundColor,
            FormatChange::TitleLevel(_) => FormatKind::TitleLevel,
            FormatChange::LineSpacing(_) => FormatKind::LineSpacing,
            FormatChange::LineSpacingPolicy(_) => FormatKind::LineSpacingPolicy,
        }
    }

    /// Apply to a block or a single run.
    ///
    /// A run change on a block reaches all of its runs; a block change on a
    /// run does nothing.
    pub fn apply_to(&self, target: Target<'_>) {
        match target {
            Target::Block(block) => match self.scope() {
                Scope::Block => self.apply_to_block(block),
                Scope::Run => {
                    for run in block.runs_mut() {
                        self.apply_to_run_format(&mut run.format);
                    }
                }
            },
            Target::Run(run) => {
                if self.scope() == Scope::Run {
                    self.apply_to_run_format(&mut run.format);
                }
            }
        }
    }

    /// Record the change as the current format
    pub fn apply_to_context(&self, ctx: &mut EditingContext) {
        let format = ctx.format_mut();
        match self {
            FormatChange::TitleLevel(level) => format.block.title_level = *level,
            FormatChange::LineSpacing(spacing) => format.block.line_spacing = *spacing,
            FormatChange::LineSpacingPolicy(policy) => format.block.line_spacing_policy = *policy,
            _ => self.apply_to_run_format(&mut format.run),
        }
    }

    fn apply_to_block(&self, block: &mut Block) {
        match self {
            FormatChange::TitleLevel(level) => block.set_title_level(*level),
            FormatChange::LineSpacing(spacing) => block.set_line_spacing(*spacing),
            FormatChange::LineSpacingPolicy(policy) => block.set_line_spacing_policy(*policy),
            _ => {}
        }
    }

    fn apply_to_run_format(&self, format: &mut RunFormat) {
        match self {
            FormatChange::Font(font) => format.font = font.clone(),
            FormatChange::FontFamily(family) => format.font.family = family.clone(),
            FormatChange::FontSize(size) => format.font.size = *size,
            FormatChange::FontItalic(italic) => format.font.italic = *italic,
            FormatChange::FontWeight(weight) => format.font.weight = *weight,
            FormatChange::TextColor(color) => format.color = *color,
            FormatChange::BackgroundColor(color) => format.background = *color,
            _ => {}
        }
    }
}
