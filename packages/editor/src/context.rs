//! # Editing Context
//!
//! The "current format": what newly typed text gets, and what toggles
//! negate. Owned by the caller and passed to every command explicitly.

use scribe_parser::{Block, BlockFormat, Font, Format, ModelError, RunFormat, TitleLevelRegistry};

#[derive(Debug, Clone, PartialEq)]
pub struct EditingContext {
    format: Format,
}

impl EditingContext {
    pub fn new(format: Format) -> Self {
        Self { format }
    }

    /// Body text as the registry defines it
    pub fn body(registry: &TitleLevelRegistry) -> Self {
        Self::new(Format::body(registry))
    }

    pub fn format(&self) -> &Format {
        &self.format
    }

    pub fn run_format(&self) -> &RunFormat {
        &self.format.run
    }

    pub fn block_format(&self) -> &BlockFormat {
        &self.format.block
    }

    pub fn font(&self) -> &Font {
        &self.format.run.font
    }

    pub(crate) fn format_mut(&mut self) -> &mut Format {
        &mut self.format
    }

    /// Pick up the formatting under a caret at `offset` in `block`
    pub fn follow(&mut self, block: &Block, offset: usize) -> Result<(), ModelError> {
        let run = block.run_at(offset)?;
        self.format = Format {
            run: run.format.clone(),
            block: block.format(),
        };
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_parser::{Color, Document, FontWeight};
    use std::sync::Arc;

    #[test]
    fn test_follow_takes_run_before_caret() {
        let registry = Arc::new(TitleLevelRegistry::standard("Sans"));
        let mut doc = Document::new(registry.clone());
        let id = doc.first_block().id();

        let mut red = RunFormat::new(Font::new("Serif", 14).with_weight(FontWeight::BOLD));
        red.color = Color::rgb(255, 0, 0);
        {
            let block = doc.block_mut(id).unwrap();
            block.add_run("plain", RunFormat::new(Font::new("Sans", 12)));
            block.add_run("red", red.clone());
        }

        let mut ctx = EditingContext::body(&registry);
        let block = doc.block(id).unwrap();

        ctx.follow(block, 5).unwrap();
        assert_eq!(ctx.font(), &Font::new("Sans", 12));

        ctx.follow(block, 6).unwrap();
        assert_eq!(ctx.run_format(), &red);

        assert!(ctx.follow(block, 9).is_err());
    }
}
