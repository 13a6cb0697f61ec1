//! # Selection Tracking
//!
//! A caret plus an optional ordered list of selected spans. The selection
//! never owns blocks; it names them by id and is checked against the
//! document before every command touches anything.

use std::ops::Range;

use scribe_parser::{BlockId, Document, ModelError};

/// Insertion point: a block and a character offset inside it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Caret {
    pub block: BlockId,
    pub offset: usize,
}

impl Caret {
    pub fn new(block: BlockId, offset: usize) -> Self {
        Self { block, offset }
    }
}

/// One selected block; `range: None` selects the whole block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedSpan {
    pub block: BlockId,
    pub range: Option<Range<usize>>,
}

impl SelectedSpan {
    pub fn whole(block: BlockId) -> Self {
        Self { block, range: None }
    }

    pub fn range(block: BlockId, range: Range<usize>) -> Self {
        Self {
            block,
            range: Some(range),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    caret: Caret,
    spans: Vec<SelectedSpan>,
}

impl Selection {
    pub fn new(caret: Caret) -> Self {
        Self {
            caret,
            spans: Vec::new(),
        }
    }

    /// Caret at the start of the first block
    pub fn at_start(doc: &Document) -> Self {
        Self::new(Caret::new(doc.first_block().id(), 0))
    }

    pub fn caret(&self) -> Caret {
        self.caret
    }

    /// Move the caret; any span selection is dropped
    pub fn set_caret(&mut self, caret: Caret) {
        self.caret = caret;
        self.spans.clear();
    }

    pub fn select(&mut self, spans: Vec<SelectedSpan>) {
        self.spans = spans;
    }

    pub fn add_span(&mut self, span: SelectedSpan) {
        self.spans.push(span);
    }

    /// Forget the spans, keeping the caret
    pub fn clear(&mut self) {
        self.spans.clear();
    }

    pub fn spans(&self) -> &[SelectedSpan] {
        &self.spans
    }

    pub fn has_spans(&self) -> bool {
        !self.spans.is_empty()
    }

    /// Check the caret and every span still point into `doc`
    pub fn validate(&self, doc: &Document) -> Result<(), ModelError> {
        let block = doc
            .block(self.caret.block)
            .ok_or_else(|| ModelError::NotFound(self.caret.block.to_string()))?;
        if self.caret.offset > block.char_len() {
            return Err(ModelError::out_of_range(self.caret.offset, block.char_len()));
        }

        for span in &self.spans {
            let block = doc
                .block(span.block)
                .ok_or_else(|| ModelError::NotFound(span.block.to_string()))?;
            if let Some(range) = &span.range {
                let len = block.char_len();
                if range.start > range.end {
                    return Err(ModelError::out_of_range(range.start, range.end));
                }
                if range.end > len {
                    return Err(ModelError::out_of_range(range.end, len));
                }
            }
        }
        Ok(())
    }
}
