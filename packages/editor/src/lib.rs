//! # Scribe Editor
//!
//! Editing core for Scribe rich-text documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ parser: markup ⇄ Document / Block / Run     │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ editor: EditSession                         │
//! │  - Load/save documents                      │
//! │  - Caret and span selection                 │
//! │  - Format commands with validation          │
//! │  - Text insertion, Enter, Backspace         │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ observers: FormatChanged notifications      │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Core Principles
//!
//! 1. **Model is source of truth**: markup is a derived view
//! 2. **Explicit current format**: an `EditingContext` is passed to every
//!    command instead of living in global state
//! 3. **All or nothing**: commands validate before mutating
//!
//! ## Usage
//!
//! ```rust,ignore
//! use scribe_editor::{EditSession, EditorConfig, SelectedSpan};
//!
//! let (mut session, mut ctx) = EditSession::from_config(&EditorConfig::default())?;
//! session.insert_text(&ctx, "Hello")?;
//!
//! let block = session.caret().block;
//! session.select(vec![SelectedSpan::range(block, 0..5)])?;
//! session.set_font_weight(&mut ctx, None)?;
//!
//! session.save_as("hello.html")?;
//! ```

mod commands;
mod config;
mod context;
mod document;
mod errors;
mod notifications;
mod selection;
mod session;

pub use commands::{Command, FormatChange, Scope, Target};
pub use config::EditorConfig;
pub use context::EditingContext;
pub use document::Document;
pub use errors::EditorError;
pub use notifications::{FormatChanged, FormatKind, FormatObserver, Notifier};
pub use selection::{Caret, SelectedSpan, Selection};
pub use session::EditSession;

// Re-export common types for convenience
pub use scribe_parser::Document as DocumentModel;
pub use scribe_parser::{
    Block, BlockId, Color, Font, FontWeight, Format, LineSpacingPolicy, ModelError, Run, RunFormat,
    TitleLevelRegistry,
};
