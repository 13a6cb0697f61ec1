//! # Format Notifications
//!
//! Every applied formatting command emits one [`FormatChanged`] to the
//! registered observers. Toolbars use `kind` to dismiss the matching picker
//! and `format` to refresh their display.

use scribe_parser::Format;
use serde::{Deserialize, Serialize};

/// Which attribute a command changed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatKind {
    Font,
    FontFamily,
    FontSize,
    FontItalic,
    FontWeight,
    TextColor,
    BackgroundColor,
    TitleLevel,
    LineSpacing,
    LineSpacingPolicy,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FormatChanged {
    pub kind: FormatKind,
    /// Current format after the change
    pub format: Format,
}

/// Receives format change notifications
pub trait FormatObserver {
    fn format_changed(&mut self, event: &FormatChanged);
}

impl<F> FormatObserver for F
where
    F: FnMut(&FormatChanged),
{
    fn format_changed(&mut self, event: &FormatChanged) {
        self(event)
    }
}

/// Fans a notification out to every observer, in registration order
#[derive(Default)]
pub struct Notifier {
    observers: Vec<Box<dyn FormatObserver>>,
}

impl Notifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, observer: impl FormatObserver + 'static) {
        self.observers.push(Box::new(observer));
    }

    pub fn notify(&mut self, event: &FormatChanged) {
        for observer in &mut self.observers {
            observer.format_changed(event);
        }
    }

    pub fn len(&self) -> usize {
        self.observers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.is_empty()
    }
}

impl std::fmt::Debug for Notifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Notifier")
            .field("observers", &self.observers.len())
            .finish()
    }
}
