//! # Document model
//!
//! A [`Document`] is an ordered list of [`Block`]s (paragraphs and headings),
//! each an ordered list of [`Run`]s (text sharing one font and color).
//!
//! Invariants kept by every operation here:
//! - a document always has at least one block
//! - a block always has at least one run (an empty block holds one
//!   zero-length run carrying the insertion format)
//!
//! Offsets are counted in characters, not bytes.

use std::fmt;
use std::ops::Range;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::title_level::{TitleLevelId, TitleLevelRegistry};

pub const DEFAULT_FAMILY: &str = "Sans";
pub const DEFAULT_WIDTH: u32 = 800;
pub const DEFAULT_LINE_SPACING: f32 = 1.0;

/// Numeric font weight (CSS scale)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FontWeight(pub u16);

impl FontWeight {
    pub const NORMAL: FontWeight = FontWeight(400);
    pub const BOLD: FontWeight = FontWeight(700);

    pub fn is_bold(self) -> bool {
        self.0 >= 600
    }

    /// Weight a bold toggle turns this weight into
    pub fn toggled(self) -> Self {
        if self.is_bold() {
            Self::NORMAL
        } else {
            Self::BOLD
        }
    }
}

impl Default for FontWeight {
    fn default() -> Self {
        Self::NORMAL
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Font {
    pub family: String,
    /// Point size
    pub size: u32,
    #[serde(default)]
    pub weight: FontWeight,
    #[serde(default)]
    pub italic: bool,
}

impl Font {
    pub fn new(family: impl Into<String>, size: u32) -> Self {
        Self {
            family: family.into(),
            size,
            weight: FontWeight::NORMAL,
            italic: false,
        }
    }

    pub fn with_weight(mut self, weight: FontWeight) -> Self {
        self.weight = weight;
        self
    }

    pub fn with_italic(mut self, italic: bool) -> Self {
        self.italic = italic;
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Color {
    pub const BLACK: Color = Color::rgb(0, 0, 0);
    pub const WHITE: Color = Color::rgb(255, 255, 255);

    pub const fn rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self::rgba(r, g, b, 255)
    }
}

/// Character-level formatting of a run
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RunFormat {
    pub font: Font,
    pub color: Color,
    /// `None` means transparent (inherit)
    pub background: Option<Color>,
}

impl RunFormat {
    pub fn new(font: Font) -> Self {
        Self {
            font,
            color: Color::BLACK,
            background: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineSpacingPolicy {
    /// Spacing is a length in points
    Absolute,
    /// Spacing is a multiple of the line height
    #[default]
    Relative,
}

impl LineSpacingPolicy {
    pub fn as_str(self) -> &'static str {
        match self {
            LineSpacingPolicy::Absolute => "absolute",
            LineSpacingPolicy::Relative => "relative",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            LineSpacingPolicy::Absolute => LineSpacingPolicy::Relative,
            LineSpacingPolicy::Relative => LineSpacingPolicy::Absolute,
        }
    }
}

impl FromStr for LineSpacingPolicy {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "absolute" => Ok(LineSpacingPolicy::Absolute),
            "relative" => Ok(LineSpacingPolicy::Relative),
            _ => Err(ModelError::InvalidPolicy(s.to_string())),
        }
    }
}

impl fmt::Display for LineSpacingPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Paragraph-level formatting of a block
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockFormat {
    pub title_level: TitleLevelId,
    pub line_spacing: f32,
    pub line_spacing_policy: LineSpacingPolicy,
}

/// Combined run and block formatting, the shape of the "current format"
#[derive(Debug, Clone, PartialEq)]
pub struct Format {
    pub run: RunFormat,
    pub block: BlockFormat,
}

impl Format {
    /// Plain body text as defined by the registry
    pub fn body(registry: &TitleLevelRegistry) -> Self {
        Self {
            run: RunFormat::new(registry.body_level().font.clone()),
            block: BlockFormat {
                title_level: registry.body(),
                line_spacing: DEFAULT_LINE_SPACING,
                line_spacing_policy: LineSpacingPolicy::default(),
            },
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RunId(u32);

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "run-{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct BlockId(u64);

impl fmt::Display for BlockId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "block-{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Run {
    id: RunId,
    pub text: String,
    pub format: RunFormat,
}

impl Run {
    pub fn id(&self) -> RunId {
        self.id
    }

    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

/// Byte index of the `chars`-th character (or the end of the string)
fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Block {
    id: BlockId,
    runs: Vec<Run>,
    title_level: TitleLevelId,
    line_spacing: f32,
    line_spacing_policy: LineSpacingPolicy,
    next_run_id: u32,
}

impl Block {
    pub(crate) fn new(id: BlockId, format: &Format) -> Self {
        let mut block = Self {
            id,
            runs: Vec::new(),
            title_level: format.block.title_level,
            line_spacing: format.block.line_spacing,
            line_spacing_policy: format.block.line_spacing_policy,
            next_run_id: 0,
        };
        let run_id = block.allocate_run_id();
        block.runs.push(Run {
            id: run_id,
            text: String::new(),
            format: format.run.clone(),
        });
        block
    }

    pub fn id(&self) -> BlockId {
        self.id
    }

    pub fn runs(&self) -> &[Run] {
        &self.runs
    }

    pub fn runs_mut(&mut self) -> impl Iterator<Item = &mut Run> {
        self.runs.iter_mut()
    }

    pub fn run(&self, id: RunId) -> Option<&Run> {
        self.runs.iter().find(|run| run.id == id)
    }

    pub fn run_mut(&mut self, id: RunId) -> Option<&mut Run> {
        self.runs.iter_mut().find(|run| run.id == id)
    }

    pub fn title_level(&self) -> TitleLevelId {
        self.title_level
    }

    pub fn line_spacing(&self) -> f32 {
        self.line_spacing
    }

    pub fn line_spacing_policy(&self) -> LineSpacingPolicy {
        self.line_spacing_policy
    }

    pub fn format(&self) -> BlockFormat {
        BlockFormat {
            title_level: self.title_level,
            line_spacing: self.line_spacing,
            line_spacing_policy: self.line_spacing_policy,
        }
    }

    pub fn set_title_level(&mut self, level: TitleLevelId) {
        self.title_level = level;
    }

    pub fn set_line_spacing(&mut self, spacing: f32) {
        self.line_spacing = spacing;
    }

    /// Policies coming in as text go through `LineSpacingPolicy::from_str`,
    /// which rejects anything but the two known values.
    pub fn set_line_spacing_policy(&mut self, policy: LineSpacingPolicy) {
        self.line_spacing_policy = policy;
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|run| run.text.as_str()).collect()
    }

    pub fn char_len(&self) -> usize {
        self.runs.iter().map(Run::char_len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.runs.iter().all(|run| run.text.is_empty())
    }

    /// Append text at the end of the block.
    ///
    /// Absorbs the placeholder run of an empty block and extends the last run
    /// when the format matches.
    pub fn add_run(&mut self, text: impl Into<String>, format: RunFormat) -> RunId {
        let text = text.into();

        if let [only] = self.runs.as_mut_slice() {
            if only.text.is_empty() {
                only.text = text;
                only.format = format;
                return only.id;
            }
        }

        if let Some(last) = self.runs.last_mut() {
            if last.format == format {
                last.text.push_str(&text);
                return last.id;
            }
        }

        let id = self.allocate_run_id();
        self.runs.push(Run { id, text, format });
        id
    }

    /// Insert text at a character offset
    pub fn insert_run(
        &mut self,
        offset: usize,
        text: impl Into<String>,
        format: RunFormat,
    ) -> Result<RunId, ModelError> {
        let len = self.char_len();
        if offset > len {
            return Err(ModelError::out_of_range(offset, len));
        }
        if offset == len {
            return Ok(self.add_run(text, format));
        }

        let text = text.into();
        let index = self.boundary(offset)?;

        if index > 0 && self.runs[index - 1].format == format {
            self.runs[index - 1].text.push_str(&text);
            return Ok(self.runs[index - 1].id);
        }
        if self.runs[index].format == format {
            self.runs[index].text.insert_str(0, &text);
            return Ok(self.runs[index].id);
        }

        let id = self.allocate_run_id();
        self.runs.insert(index, Run { id, text, format });
        Ok(id)
    }

    /// Split a run in two at a character offset, both halves keeping its
    /// format. Returns the id of the second half.
    pub fn split_at(&mut self, run: RunId, offset: usize) -> Result<RunId, ModelError> {
        let index = self.position(run)?;
        let len = self.runs[index].char_len();
        if offset > len {
            return Err(ModelError::out_of_range(offset, len));
        }

        let at = byte_offset(&self.runs[index].text, offset);
        let tail = self.runs[index].text.split_off(at);
        let format = self.runs[index].format.clone();

        let id = self.allocate_run_id();
        self.runs.insert(index + 1, Run { id, text: tail, format });
        Ok(id)
    }

    /// Make run boundaries fall on both ends of `range` and return the runs
    /// covering it, in order.
    pub fn isolate(&mut self, range: Range<usize>) -> Result<Vec<RunId>, ModelError> {
        self.check_range(&range)?;
        if range.is_empty() {
            return Ok(Vec::new());
        }

        let start = self.boundary(range.start)?;
        let end = self.boundary(range.end)?;
        Ok(self.runs[start..end].iter().map(|run| run.id).collect())
    }

    /// Remove the characters in `range`
    pub fn delete_range(&mut self, range: Range<usize>) -> Result<(), ModelError> {
        self.check_range(&range)?;
        if range.is_empty() {
            return Ok(());
        }

        let carried = self.run_at(range.start)?.format.clone();
        let start = self.boundary(range.start)?;
        let end = self.boundary(range.end)?;
        self.runs.drain(start..end);

        if self.runs.is_empty() {
            let id = self.allocate_run_id();
            self.runs.push(Run {
                id,
                text: String::new(),
                format: carried,
            });
        }
        Ok(())
    }

    /// The run whose text ends at or spans `offset`; offset 0 is the first run
    pub fn run_at(&self, offset: usize) -> Result<&Run, ModelError> {
        let len = self.char_len();
        if offset > len {
            return Err(ModelError::out_of_range(offset, len));
        }

        let mut start = 0;
        for run in &self.runs {
            let end = start + run.char_len();
            if offset > start && offset <= end {
                return Ok(run);
            }
            start = end;
        }
        Ok(&self.runs[0])
    }

    /// Merge neighbours with identical formats and drop empty runs, keeping
    /// at least one run.
    pub fn normalize(&mut self) {
        if self.runs.iter().any(|run| !run.text.is_empty()) {
            self.runs.retain(|run| !run.text.is_empty());
        } else {
            self.runs.truncate(1);
        }

        let mut merged: Vec<Run> = Vec::with_capacity(self.runs.len());
        for run in self.runs.drain(..) {
            match merged.last_mut() {
                Some(last) if last.format == run.format => last.text.push_str(&run.text),
                _ => merged.push(run),
            }
        }
        self.runs = merged;
    }

    /// Replace all runs, keeping the placeholder when `runs` is empty
    pub(crate) fn replace_runs(&mut self, runs: Vec<(String, RunFormat)>) {
        if runs.is_empty() {
            return;
        }
        self.runs.clear();
        for (text, format) in runs {
            let id = self.allocate_run_id();
            self.runs.push(Run { id, text, format });
        }
    }

    /// Cut the block at `offset`, moving everything after it into a new block
    /// with the same paragraph format.
    pub(crate) fn split_off(&mut self, offset: usize, id: BlockId) -> Result<Block, ModelError> {
        let len = self.char_len();
        if offset > len {
            return Err(ModelError::out_of_range(offset, len));
        }

        let carried = self.run_at(offset)?.format.clone();
        let index = self.boundary(offset)?;
        let tail_runs = self.runs.split_off(index);

        if self.runs.is_empty() {
            let run_id = self.allocate_run_id();
            self.runs.push(Run {
                id: run_id,
                text: String::new(),
                format: carried.clone(),
            });
        }

        let mut tail = Block::new(
            id,
            &Format {
                run: carried,
                block: self.format(),
            },
        );
        tail.replace_runs(
            tail_runs
                .into_iter()
                .map(|run| (run.text, run.format))
                .collect(),
        );
        Ok(tail)
    }

    fn check_range(&self, range: &Range<usize>) -> Result<(), ModelError> {
        let len = self.char_len();
        if range.end > len {
            return Err(ModelError::out_of_range(range.end, len));
        }
        if range.start > range.end {
            return Err(ModelError::out_of_range(range.start, range.end));
        }
        Ok(())
    }

    /// Index of the run starting exactly at `offset`, splitting if needed.
    /// Equal to `runs.len()` when `offset` is the end of the block.
    fn boundary(&mut self, offset: usize) -> Result<usize, ModelError> {
        let mut start = 0;
        for index in 0..self.runs.len() {
            if offset == start {
                return Ok(index);
            }
            let len = self.runs[index].char_len();
            if offset < start + len {
                let id = self.runs[index].id;
                self.split_at(id, offset - start)?;
                return Ok(index + 1);
            }
            start += len;
        }

        if offset == start {
            Ok(self.runs.len())
        } else {
            Err(ModelError::out_of_range(offset, start))
        }
    }

    fn position(&self, run: RunId) -> Result<usize, ModelError> {
        self.runs
            .iter()
            .position(|r| r.id == run)
            .ok_or_else(|| ModelError::NotFound(format!("{} in {}", run, self.id)))
    }

    fn allocate_run_id(&mut self) -> RunId {
        let id = RunId(self.next_run_id);
        self.next_run_id += 1;
        id
    }
}

/// A rich-text document
#[derive(Debug, Clone)]
pub struct Document {
    blocks: Vec<Block>,

    /// Document title (unset until named or saved)
    pub title: Option<String>,

    /// Backing file; `None` means never saved
    pub path: Option<PathBuf>,

    /// Rendering width in pixels
    pub width: u32,

    registry: Arc<TitleLevelRegistry>,
    next_block_id: u64,
}

impl Document {
    /// New document with one empty body block
    pub fn new(registry: Arc<TitleLevelRegistry>) -> Self {
        let format = Format::body(&registry);
        Self::with_format(registry, &format)
    }

    /// New document whose first block starts in `format`
    pub fn with_format(registry: Arc<TitleLevelRegistry>, format: &Format) -> Self {
        let mut doc = Self::without_blocks(registry);
        doc.add_block(format);
        doc
    }

    /// Temporarily empty; the parser adds blocks before handing it out
    pub(crate) fn without_blocks(registry: Arc<TitleLevelRegistry>) -> Self {
        Self {
            blocks: Vec::new(),
            title: None,
            path: None,
            width: DEFAULT_WIDTH,
            registry,
            next_block_id: 0,
        }
    }

    pub fn registry(&self) -> &Arc<TitleLevelRegistry> {
        &self.registry
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn blocks_mut(&mut self) -> &mut [Block] {
        &mut self.blocks
    }

    pub fn block(&self, id: BlockId) -> Option<&Block> {
        self.blocks.iter().find(|block| block.id == id)
    }

    pub fn block_mut(&mut self, id: BlockId) -> Option<&mut Block> {
        self.blocks.iter_mut().find(|block| block.id == id)
    }

    pub fn block_index(&self, id: BlockId) -> Option<usize> {
        self.blocks.iter().position(|block| block.id == id)
    }

    pub fn first_block(&self) -> &Block {
        &self.blocks[0]
    }

    /// Append a block seeded with one empty run in `format`
    pub fn add_block(&mut self, format: &Format) -> BlockId {
        let id = self.allocate_block_id();
        self.blocks.push(Block::new(id, format));
        id
    }

    pub fn insert_block_after(&mut self, after: BlockId, format: &Format) -> Result<BlockId, ModelError> {
        let index = self.index_of(after)?;
        let id = self.allocate_block_id();
        self.blocks.insert(index + 1, Block::new(id, format));
        Ok(id)
    }

    /// Remove a block; removing the last one leaves a fresh empty body block
    pub fn remove_block(&mut self, id: BlockId) -> Result<(), ModelError> {
        let index = self.index_of(id)?;
        self.blocks.remove(index);

        if self.blocks.is_empty() {
            let format = Format::body(&self.registry);
            self.add_block(&format);
        }
        Ok(())
    }

    /// Split a block at a character offset (paragraph break). Returns the id
    /// of the new block holding the text after the offset.
    pub fn split_block(&mut self, id: BlockId, offset: usize) -> Result<BlockId, ModelError> {
        let index = self.index_of(id)?;
        let len = self.blocks[index].char_len();
        if offset > len {
            return Err(ModelError::out_of_range(offset, len));
        }

        let new_id = self.allocate_block_id();
        let tail = self.blocks[index].split_off(offset, new_id)?;
        self.blocks.insert(index + 1, tail);
        Ok(new_id)
    }

    /// Join a block onto the end of the one before it. Returns the previous
    /// block and the offset where the joined text starts, or `None` when `id`
    /// is the first block.
    pub fn merge_with_previous(&mut self, id: BlockId) -> Result<Option<(BlockId, usize)>, ModelError> {
        let index = self.index_of(id)?;
        if index == 0 {
            return Ok(None);
        }

        let removed = self.blocks.remove(index);
        let previous = &mut self.blocks[index - 1];
        let join = previous.char_len();

        for run in removed.runs.into_iter().filter(|run| !run.text.is_empty()) {
            previous.add_run(run.text, run.format);
        }
        Ok(Some((previous.id, join)))
    }

    /// Plain text, one line per block
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(Block::text)
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Render to markup
    pub fn serialize(&self) -> String {
        crate::serializer::serialize(self)
    }

    /// Build a document from markup
    pub fn parse(source: &str, registry: Arc<TitleLevelRegistry>) -> crate::error::ParseResult<Self> {
        crate::parser::parse(source, registry)
    }

    pub(crate) fn push_block(&mut self, format: &Format) -> &mut Block {
        self.add_block(format);
        let last = self.blocks.len() - 1;
        &mut self.blocks[last]
    }

    fn index_of(&self, id: BlockId) -> Result<usize, ModelError> {
        self.block_index(id)
            .ok_or_else(|| ModelError::NotFound(id.to_string()))
    }

    fn allocate_block_id(&mut self) -> BlockId {
        let id = BlockId(self.next_block_id);
        self.next_block_id += 1;
        id
    }
}
