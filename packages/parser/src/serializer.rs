use serde::{Deserialize, Serialize};
use tracing::{instrument, warn};

use crate::ast::*;
use crate::style;
use crate::title_level::BODY_TAG;

/// Options for markup rendering
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderOptions {
    /// One element per line with nesting indentation
    pub pretty: bool,
    /// Indentation string
    pub indent: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            pretty: true,
            indent: "  ".to_string(),
        }
    }
}

/// Serializer converts a document to markup
///
/// Every run becomes an inline-styled `span` inside the element named by its
/// block's title level. The parser reads this output back without loss of
/// block levels, text, fonts or colors. Line spacing is not written.
pub struct Serializer {
    options: RenderOptions,
    depth: usize,
    output: String,
}

impl Serializer {
    pub fn new() -> Self {
        Self::with_options(RenderOptions::default())
    }

    pub fn with_options(options: RenderOptions) -> Self {
        Self {
            options,
            depth: 0,
            output: String::new(),
        }
    }

    /// Serialize a Document to markup
    #[instrument(skip_all, fields(blocks = doc.blocks().len()))]
    pub fn serialize(mut self, doc: &Document) -> String {
        self.line("<!DOCTYPE html>");
        self.line("<html>");
        self.depth += 1;

        self.line("<head>");
        self.depth += 1;
        self.line("<meta charset=\"UTF-8\">");
        if let Some(title) = &doc.title {
            let title = format!("<title>{}</title>", style::escape_text(title));
            self.line(&title);
        }
        self.depth -= 1;
        self.line("</head>");

        let body = format!(
            "<body style=\"width:{}\">",
            style::encode_length(doc.width, "px")
        );
        self.line(&body);
        self.depth += 1;

        for block in doc.blocks() {
            self.serialize_block(doc, block);
        }

        self.depth -= 1;
        self.line("</body>");
        self.depth -= 1;
        self.line("</html>");

        self.output
    }

    fn serialize_block(&mut self, doc: &Document, block: &Block) {
        let tag = match doc.registry().get(block.title_level()) {
            Some(level) => level.tag.clone(),
            None => {
                warn!(block = %block.id(), "Title level not in registry, writing as body text");
                BODY_TAG.to_string()
            }
        };

        self.line(&format!("<{}>", tag));
        self.depth += 1;
        for run in block.runs() {
            let span = format!(
                "<span style=\"{}\">{}</span>",
                Self::run_style(&run.format),
                style::escape_text(&run.text)
            );
            self.line(&span);
        }
        self.depth -= 1;
        self.line(&format!("</{}>", tag));
    }

    /// Inline style attribute for a run
    pub fn run_style(format: &RunFormat) -> String {
        format!(
            "font-family:{};font-size:{};font-weight:{};font-style:{};color:{};background-color:{}",
            style::encode_family(&format.font.family),
            style::encode_length(format.font.size, "pt"),
            style::encode_weight(format.font.weight),
            style::encode_italic(format.font.italic),
            style::encode_color(format.color),
            style::encode_background(format.background),
        )
    }

    fn line(&mut self, text: &str) {
        if self.options.pretty {
            for _ in 0..self.depth {
                self.output.push_str(&self.options.indent);
            }
        }
        self.output.push_str(text);
        if self.options.pretty {
            self.output.push('\n');
        }
    }
}

impl Default for Serializer {
    fn default() -> Self {
        Self::new()
    }
}

/// Convenience function to serialize a document with default options
pub fn serialize(doc: &Document) -> String {
    Serializer::new().serialize(doc)
}
