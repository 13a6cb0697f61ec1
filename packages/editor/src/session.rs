//! # Edit Session Management
//!
//! One user's view of a document: the document itself, the selection and
//! the observers waiting for format notifications. The "current format"
//! lives outside, in an [`EditingContext`] the caller threads through every
//! call that reads or updates it.

use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use scribe_parser::{Block, BlockId, Color, Font, FontWeight, ModelError, TitleLevelRegistry};
use tracing::{debug, info, instrument};

use crate::commands::{Command, FormatChange, Scope, Target};
use crate::config::EditorConfig;
use crate::context::EditingContext;
use crate::notifications::{FormatChanged, FormatObserver, Notifier};
use crate::selection::{Caret, SelectedSpan, Selection};
use crate::{Document, EditorError};

/// Single edit session
#[derive(Debug)]
pub struct EditSession {
    /// Document being edited
    pub document: Document,

    selection: Selection,
    notifier: Notifier,
}

impl EditSession {
    /// Create new edit session, caret at the start
    pub fn new(document: Document) -> Self {
        let selection = Selection::at_start(document.model());
        Self {
            document,
            selection,
            notifier: Notifier::new(),
        }
    }

    /// Blank document set up from `config`, with its starting context
    pub fn from_config(config: &EditorConfig) -> Result<(Self, EditingContext), EditorError> {
        let registry = config.registry()?;
        let ctx = config.context(&registry);

        let mut model = scribe_parser::Document::with_format(registry, ctx.format());
        model.width = config.page_width;
        let document = Document::from_model(model).with_render_options(config.render.clone());

        Ok((Self::new(document), ctx))
    }

    /// Open a file-backed document
    pub fn open(path: impl AsRef<Path>, registry: Arc<TitleLevelRegistry>) -> Result<Self, EditorError> {
        Ok(Self::new(Document::load(path, registry)?))
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn caret(&self) -> Caret {
        self.selection.caret()
    }

    pub fn subscribe(&mut self, observer: impl FormatObserver + 'static) {
        self.notifier.subscribe(observer);
    }

    pub fn save(&mut self) -> Result<(), EditorError> {
        self.document.save()
    }

    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<(), EditorError> {
        self.document.save_as(path)
    }

    // --- selection -------------------------------------------------------

    /// Move the caret and pick up the formatting under it
    pub fn move_caret(&mut self, ctx: &mut EditingContext, caret: Caret) -> Result<(), EditorError> {
        let selection = Selection::new(caret);
        selection.validate(self.document.model())?;

        let block = self.block(caret.block)?;
        ctx.follow(block, caret.offset)?;
        self.selection = selection;
        Ok(())
    }

    /// Replace the selected spans, keeping the caret
    pub fn select(&mut self, spans: Vec<SelectedSpan>) -> Result<(), EditorError> {
        let mut selection = self.selection.clone();
        selection.select(spans);
        selection.validate(self.document.model())?;
        self.selection = selection;
        Ok(())
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
    }

    // --- formatting ------------------------------------------------------

    /// Apply a formatting command.
    ///
    /// Goes to every selected span in order, or to the caret's block or run
    /// when nothing is selected. Updates `ctx` and notifies observers. On
    /// error neither the document nor `ctx` has changed.
    #[instrument(skip(self, ctx), fields(version = self.document.version))]
    pub fn apply(&mut self, ctx: &mut EditingContext, command: Command) -> Result<FormatChanged, EditorError> {
        let registry = self.document.model().registry().clone();
        let change = command.resolve(ctx, &registry)?;
        self.selection.validate(self.document.model())?;

        let model = self.document.model_mut();
        if self.selection.has_spans() {
            for span in self.selection.spans() {
                let block = model
                    .block_mut(span.block)
                    .ok_or_else(|| ModelError::NotFound(span.block.to_string()))?;
                apply_to_span(&change, block, span.range.clone())?;
            }
        } else {
            let caret = self.selection.caret();
            let block = model
                .block_mut(caret.block)
                .ok_or_else(|| ModelError::NotFound(caret.block.to_string()))?;
            apply_at_caret(&change, block, caret.offset)?;
        }

        change.apply_to_context(ctx);

        let event = FormatChanged {
            kind: change.kind(),
            format: ctx.format().clone(),
        };
        info!(kind = ?event.kind, spans = self.selection.spans().len(), "Format applied");
        self.notifier.notify(&event);
        Ok(event)
    }

    pub fn set_font(&mut self, ctx: &mut EditingContext, font: Font) -> Result<FormatChanged, EditorError> {
        self.apply(ctx, Command::SetFont { font })
    }

    pub fn set_font_family(
        &mut self,
        ctx: &mut EditingContext,
        family: impl Into<String>,
    ) -> Result<FormatChanged, EditorError> {
        self.apply(ctx, Command::SetFontFamily { family: family.into() })
    }

    pub fn set_font_size(&mut self, ctx: &mut EditingContext, size: u32) -> Result<FormatChanged, EditorError> {
        self.apply(ctx, Command::SetFontSize { size })
    }

    /// `None` toggles italic
    pub fn set_font_italic(
        &mut self,
        ctx: &mut EditingContext,
        italic: Option<bool>,
    ) -> Result<FormatChanged, EditorError> {
        self.apply(ctx, Command::SetFontItalic { italic })
    }

    /// `None` toggles bold
    pub fn set_font_weight(
        &mut self,
        ctx: &mut EditingContext,
        weight: Option<FontWeight>,
    ) -> Result<FormatChanged, EditorError> {
        self.apply(ctx, Command::SetFontWeight { weight })
    }

    pub fn set_text_color(&mut self, ctx: &mut EditingContext, color: Color) -> Result<FormatChanged, EditorError> {
        self.apply(ctx, Command::SetTextColor { color })
    }

    pub fn set_background_color(
        &mut self,
        ctx: &mut EditingContext,
        color: Option<Color>,
    ) -> Result<FormatChanged, EditorError> {
        self.apply(ctx, Command::SetBackgroundColor { color })
    }

    pub fn set_title_level(&mut self, ctx: &mut EditingContext, level: &str) -> Result<FormatChanged, EditorError> {
        self.apply(ctx, Command::SetTitleLevel { level: level.to_string() })
    }

    pub fn set_line_spacing(&mut self, ctx: &mut EditingContext, spacing: f32) -> Result<FormatChanged, EditorError> {
        self.apply(ctx, Command::SetLineSpacing { spacing })
    }

    /// `None` toggles between absolute and relative
    pub fn set_line_spacing_policy(
        &mut self,
        ctx: &mut EditingContext,
        policy: Option<&str>,
    ) -> Result<FormatChanged, EditorError> {
        self.apply(
            ctx,
            Command::SetLineSpacingPolicy {
                policy: policy.map(str::to_string),
            },
        )
    }

    // --- text and structure ----------------------------------------------

    /// Type `text` at the caret in the current format. Newlines start new
    /// paragraphs.
    pub fn insert_text(&mut self, ctx: &EditingContext, text: &str) -> Result<(), EditorError> {
        self.selection.validate(self.document.model())?;

        for (index, line) in text.split('\n').enumerate() {
            if index > 0 {
                self.split_at_caret()?;
            }
            if line.is_empty() {
                continue;
            }

            let caret = self.selection.caret();
            let block = self.block_mut(caret.block)?;
            block.insert_run(caret.offset, line, ctx.run_format().clone())?;
            block.normalize();
            self.selection
                .set_caret(Caret::new(caret.block, caret.offset + line.chars().count()));
        }

        debug!(chars = text.chars().count(), "Text inserted");
        Ok(())
    }

    /// Enter: split the caret's block, the new block keeping its title level
    pub fn new_paragraph(&mut self) -> Result<BlockId, EditorError> {
        self.selection.validate(self.document.model())?;
        self.split_at_caret()
    }

    /// Backspace: delete the character before the caret, or join the block
    /// onto the previous one at its start.
    pub fn delete_backward(&mut self, ctx: &mut EditingContext) -> Result<(), EditorError> {
        self.selection.validate(self.document.model())?;
        let caret = self.selection.caret();

        let caret = if caret.offset > 0 {
            let block = self.block_mut(caret.block)?;
            block.delete_range(caret.offset - 1..caret.offset)?;
            block.normalize();
            Caret::new(caret.block, caret.offset - 1)
        } else {
            match self.document.model_mut().merge_with_previous(caret.block)? {
                Some((previous, join)) => {
                    self.block_mut(previous)?.normalize();
                    Caret::new(previous, join)
                }
                None => {
                    self.selection.clear();
                    return Ok(());
                }
            }
        };

        self.selection.set_caret(caret);
        ctx.follow(self.block(caret.block)?, caret.offset)?;
        Ok(())
    }

    /// Append an empty block in the current format
    pub fn add_block(&mut self, ctx: &EditingContext) -> BlockId {
        self.selection.clear();
        self.document.model_mut().add_block(ctx.format())
    }

    /// Remove a block; a caret inside it moves to the start of the document
    pub fn remove_block(&mut self, id: BlockId) -> Result<(), EditorError> {
        self.document.model_mut().remove_block(id)?;

        if self.selection.caret().block == id {
            self.selection = Selection::at_start(self.document.model());
        } else {
            self.selection.clear();
        }
        Ok(())
    }

    fn split_at_caret(&mut self) -> Result<BlockId, EditorError> {
        let caret = self.selection.caret();
        let id = self.document.model_mut().split_block(caret.block, caret.offset)?;
        self.selection.set_caret(Caret::new(id, 0));
        Ok(id)
    }

    fn block(&self, id: BlockId) -> Result<&Block, ModelError> {
        self.document
            .model()
            .block(id)
            .ok_or_else(|| ModelError::NotFound(id.to_string()))
    }

    fn block_mut(&mut self, id: BlockId) -> Result<&mut Block, ModelError> {
        self.document
            .model_mut()
            .block_mut(id)
            .ok_or_else(|| ModelError::NotFound(id.to_string()))
    }
}

/// Run changes over a character range split runs at its ends first
fn apply_to_span(change: &FormatChange, block: &mut Block, range: Option<Range<usize>>) -> Result<(), ModelError> {
    match (change.scope(), range) {
        (Scope::Run, Some(range)) => {
            for id in block.isolate(range)? {
                if let Some(run) = block.run_mut(id) {
                    change.apply_to(Target::Run(run));
                }
            }
        }
        _ => change.apply_to(Target::Block(&mut *block)),
    }
    block.normalize();
    Ok(())
}

fn apply_at_caret(change: &FormatChange, block: &mut Block, offset: usize) -> Result<(), ModelError> {
    match change.scope() {
        Scope::Block => change.apply_to(Target::Block(block)),
        Scope::Run => {
            let id = block.run_at(offset)?.id();
            if let Some(run) = block.run_mut(id) {
                change.apply_to(Target::Run(run));
            }
            block.normalize();
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use scribe_parser::RunFormat;

    fn session() -> (EditSession, EditingContext) {
        EditSession::from_config(&EditorConfig::default()).unwrap()
    }

    #[test]
    fn test_session_creation() {
        let (session, ctx) = session();

        assert_eq!(session.document.version, 0);
        assert!(!session.selection().has_spans());
        assert_eq!(session.caret().offset, 0);
        assert_eq!(ctx.font(), &Font::new("Sans", 12));
    }

    #[test]
    fn test_insert_text_uses_current_format() {
        let (mut session, ctx) = session();
        session.insert_text(&ctx, "plain ").unwrap();

        let mut bold = ctx.clone();
        bold.format_mut().run.font.weight = FontWeight::BOLD;
        session.insert_text(&bold, "bold").unwrap();

        let block = session.document.model().first_block();
        assert_eq!(block.text(), "plain bold");
        assert_eq!(session.caret().offset, 10);
        assert_eq!(block.runs().len(), 2);
        assert!(block.runs()[1].format.font.weight.is_bold());
    }

    #[test]
    fn test_caret_change_targets_run_before_caret() {
        let (mut session, mut ctx) = session();
        let id = session.caret().block;
        {
            let block = session.document.model_mut().block_mut(id).unwrap();
            block.add_run("one", RunFormat::new(Font::new("Sans", 12)));
            block.add_run("two", RunFormat::new(Font::new("Serif", 12)));
        }

        session.move_caret(&mut ctx, Caret::new(id, 2)).unwrap();
        session.set_font_size(&mut ctx, 30).unwrap();

        let block = session.document.model().block(id).unwrap();
        assert_eq!(block.runs()[0].format.font.size, 30);
        assert_eq!(block.runs()[1].format.font.size, 12);
    }

    #[test]
    fn test_newline_splits_paragraphs() {
        let (mut session, ctx) = session();
        session.insert_text(&ctx, "first\nsecond").unwrap();

        let model = session.document.model();
        assert_eq!(model.blocks().len(), 2);
        assert_eq!(model.text(), "first\nsecond");
        assert_eq!(session.caret(), Caret::new(model.blocks()[1].id(), 6));
    }

    #[test]
    fn test_backspace_joins_blocks() {
        let (mut session, mut ctx) = session();
        session.insert_text(&ctx, "ab\ncd").unwrap();
        let second = session.caret().block;

        session.move_caret(&mut ctx, Caret::new(second, 0)).unwrap();
        session.delete_backward(&mut ctx).unwrap();

        let model = session.document.model();
        assert_eq!(model.blocks().len(), 1);
        assert_eq!(model.text(), "abcd");
        assert_eq!(session.caret().offset, 2);

        session.delete_backward(&mut ctx).unwrap();
        assert_eq!(session.document.model().text(), "acd");
        assert_eq!(session.caret().offset, 1);
    }
}
