//! # Scribe Parser
//!
//! Document model and markup codec for Scribe rich-text documents.
//!
//! ```text
//! markup text ── tokenizer ──▶ events ── parser ──▶ Document
//! Document ── serializer ──▶ markup text
//! ```
//!
//! The title level registry is built once and shared (`Arc`) by every
//! document and by the codec.

pub mod ast;
pub mod error;
pub mod parser;
pub mod serializer;
pub mod style;
pub mod title_level;
pub mod tokenizer;

#[cfg(test)]
mod tests_serializer;

pub use ast::{
    Block, BlockFormat, BlockId, Color, Document, Font, FontWeight, Format, LineSpacingPolicy, Run,
    RunFormat, RunId,
};
pub use error::{ModelError, ParseError, ParseResult, RegistryError};
pub use parser::{parse, Parser};
pub use serializer::{serialize, RenderOptions, Serializer};
pub use title_level::{TitleLevel, TitleLevelId, TitleLevelRegistry};
pub use tokenizer::{tokenize, Event, Token};

#[cfg(feature = "pretty-errors")]
pub use error::format_error;
