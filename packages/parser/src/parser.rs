//! Markup → document builder
//!
//! Consumes the tokenizer's event stream with a small state machine:
//!
//! ```text
//! <body style="width:..">   → document width
//! <title>text</title>       → document title
//! <p> / <h1>..<h4>          → new block at the level whose tag matches
//!   text                    → run in the level's default font
//!   <span style="..">text   → run with the decoded inline style
//! anything else             → ignored
//! ```
//!
//! Only the subset the serializer writes is guaranteed to read back. Errors
//! abort the whole parse; no partial document is returned.

use std::sync::Arc;

use tracing::{debug, info, instrument};

use crate::ast::{Document, Font, Format, RunFormat};
use crate::error::{ParseError, ParseResult};
use crate::style::{self, InlineStyle};
use crate::title_level::{TitleLevelId, TitleLevelRegistry};
use crate::tokenizer::{tokenize, Event};

/// Parse markup into a new document
pub fn parse(source: &str, registry: Arc<TitleLevelRegistry>) -> ParseResult<Document> {
    Parser::new(source, registry).parse()
}

/// Where the scanner is relative to the elements it cares about
#[derive(Debug)]
enum Scope {
    Outside,
    Title,
    Block,
    Run { text: String, format: RunFormat },
}

/// Block being filled; runs are committed in one go when it ends
#[derive(Debug)]
struct OpenBlock {
    index: usize,
    level: TitleLevelId,
    runs: Vec<(String, RunFormat)>,
}

pub struct Parser<'src> {
    source: &'src str,
    registry: Arc<TitleLevelRegistry>,
    document: Document,
    scope: Scope,
    block: Option<OpenBlock>,
}

impl<'src> Parser<'src> {
    pub fn new(source: &'src str, registry: Arc<TitleLevelRegistry>) -> Self {
        Self {
            source,
            document: Document::without_blocks(registry.clone()),
            registry,
            scope: Scope::Outside,
            block: None,
        }
    }

    #[instrument(skip(self), fields(len = self.source.len()))]
    pub fn parse(mut self) -> ParseResult<Document> {
        for event in tokenize(self.source) {
            match event {
                Event::Open { name, style, pos } => self.open(name, style, pos)?,
                Event::Close { name, .. } => self.close(name),
                Event::Text { text, .. } => self.text(text),
            }
        }

        self.finish_run();
        self.commit_block();

        if self.document.blocks().is_empty() {
            debug!("No blocks in markup, seeding an empty body block");
            let format = Format::body(&self.registry);
            self.document.add_block(&format);
        }

        info!(
            blocks = self.document.blocks().len(),
            title = ?self.document.title,
            width = self.document.width,
            "Markup parsed"
        );
        Ok(self.document)
    }

    fn open(&mut self, name: &str, style: Option<&str>, pos: usize) -> ParseResult<()> {
        if name.eq_ignore_ascii_case("body") {
            if let Some(style) = style {
                self.document.width = self.width(style, pos)?;
            }
        } else if name.eq_ignore_ascii_case("title") {
            self.document.title = Some(String::new());
            self.scope = Scope::Title;
        } else if name.eq_ignore_ascii_case("span") {
            self.finish_run();
            if self.block.is_none() {
                return Err(ParseError::orphan_run(pos));
            }
            let style = style.ok_or_else(|| {
                ParseError::malformed_attribute(pos, "style", "run has no style attribute")
            })?;
            let format = self.run_format(style, pos)?;
            self.scope = Scope::Run {
                text: String::new(),
                format,
            };
        } else if let Some(level) = self.registry.by_tag(name) {
            self.finish_run();
            self.commit_block();
            self.start_block(level);
        }
        Ok(())
    }

    fn close(&mut self, name: &str) {
        if name.eq_ignore_ascii_case("span") {
            self.finish_run();
        } else if name.eq_ignore_ascii_case("title") {
            if matches!(self.scope, Scope::Title) {
                self.scope = Scope::Outside;
            }
        } else if self.registry.by_tag(name).is_some() {
            self.finish_run();
            self.scope = Scope::Outside;
        }
    }

    fn text(&mut self, text: &str) {
        match &mut self.scope {
            Scope::Title => {
                if let Some(title) = self.document.title.as_mut() {
                    title.push_str(&style::unescape_text(text));
                }
            }
            Scope::Run { text: run, .. } => run.push_str(&style::unescape_text(text)),
            Scope::Block => {
                if text.trim().is_empty() {
                    return;
                }
                let text = strip_layout(text);
                if let Some(block) = self.block.as_mut() {
                    let font = self
                        .registry
                        .get(block.level)
                        .map(|level| level.font.clone())
                        .unwrap_or_else(|| self.registry.body_level().font.clone());
                    block
                        .runs
                        .push((style::unescape_text(text).into_owned(), RunFormat::new(font)));
                }
            }
            Scope::Outside => {}
        }
    }

    fn start_block(&mut self, level: TitleLevelId) {
        let mut format = Format::body(&self.registry);
        format.block.title_level = level;
        if let Some(title_level) = self.registry.get(level) {
            format.run = RunFormat::new(title_level.font.clone());
        }

        self.document.push_block(&format);
        debug!(level = level.index(), "Block opened");

        self.block = Some(OpenBlock {
            index: self.document.blocks().len() - 1,
            level,
            runs: Vec::new(),
        });
        self.scope = Scope::Block;
    }

    fn commit_block(&mut self) {
        if let Some(open) = self.block.take() {
            if let Some(block) = self.document.blocks_mut().get_mut(open.index) {
                block.replace_runs(open.runs);
            }
        }
    }

    fn finish_run(&mut self) {
        if !matches!(self.scope, Scope::Run { .. }) {
            return;
        }
        // a run scope only exists inside a block
        if let Scope::Run { text, format } = std::mem::replace(&mut self.scope, Scope::Block) {
            if let Some(block) = self.block.as_mut() {
                block.runs.push((text, format));
            }
        }
    }

    fn width(&self, style: &str, pos: usize) -> ParseResult<u32> {
        let style = self.inline_style(style, pos)?;
        let value = required(&style, "width", pos)?;
        style::decode_length(value)
            .ok_or_else(|| ParseError::malformed_attribute(pos, "width", format!("not a length: {}", value)))
    }

    fn run_format(&self, style: &str, pos: usize) -> ParseResult<RunFormat> {
        let style = self.inline_style(style, pos)?;

        let family_value = required(&style, "font-family", pos)?;
        let family = style::decode_family(family_value).ok_or_else(|| {
            ParseError::malformed_attribute(pos, "font-family", format!("bad escape in: {}", family_value))
        })?;
        if family.trim().is_empty() {
            return Err(ParseError::malformed_attribute(pos, "font-family", "empty family name"));
        }

        let size_value = required(&style, "font-size", pos)?;
        let size = style::decode_length(size_value)
            .filter(|size| *size > 0)
            .ok_or_else(|| {
                ParseError::malformed_attribute(pos, "font-size", format!("not a point size: {}", size_value))
            })?;

        let mut font = Font::new(family, size);

        if let Some(value) = style.get("font-weight") {
            font.weight = style::decode_weight(value).ok_or_else(|| {
                ParseError::malformed_attribute(pos, "font-weight", format!("unknown weight: {}", value))
            })?;
        }
        if let Some(value) = style.get("font-style") {
            font.italic = style::decode_italic(value).ok_or_else(|| {
                ParseError::malformed_attribute(pos, "font-style", format!("unknown style: {}", value))
            })?;
        }

        let color_value = required(&style, "color", pos)?;
        let color = style::decode_color(color_value).ok_or_else(|| {
            ParseError::malformed_attribute(pos, "color", format!("not an rgba color: {}", color_value))
        })?;

        let background_value = required(&style, "background-color", pos)?;
        let background = style::decode_background(background_value).ok_or_else(|| {
            ParseError::malformed_attribute(
                pos,
                "background-color",
                format!("not an rgba color or `none`: {}", background_value),
            )
        })?;

        Ok(RunFormat {
            font,
            color,
            background,
        })
    }

    fn inline_style<'a>(&self, style: &'a str, pos: usize) -> ParseResult<InlineStyle<'a>> {
        InlineStyle::parse(style).map_err(|segment| {
            ParseError::malformed_attribute(pos, segment.trim(), "expected `key:value`")
        })
    }
}

fn required<'a>(style: &InlineStyle<'a>, key: &str, pos: usize) -> ParseResult<&'a str> {
    style
        .get(key)
        .ok_or_else(|| ParseError::malformed_attribute(pos, key, "missing"))
}

/// Drops indentation around heading text that sits on its own lines,
/// keeping spaces that share a line with the tags.
fn strip_layout(text: &str) -> &str {
    let start = text.trim_start();
    let text = if text[..text.len() - start.len()].contains('\n') { start } else { text };
    let end = text.trim_end();
    if text[end.len()..].contains('\n') {
        end
    } else {
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ast::Color;

    fn registry() -> Arc<TitleLevelRegistry> {
        Arc::new(TitleLevelRegistry::standard("Sans"))
    }

    const RUN: &str = r#"<span style="font-family:Serif;font-size:14pt;color:rgba(255,0,0,1);background-color:none">red</span>"#;

    #[test]
    fn test_parse_paragraph_with_run() {
        let source = format!("<body style=\"width:640px\">\n<p>\n{}\n</p>\n</body>", RUN);
        let doc = parse(&source, registry()).unwrap();

        assert_eq!(doc.width, 640);
        assert_eq!(doc.blocks().len(), 1);
        let run = &doc.first_block().runs()[0];
        assert_eq!(run.text, "red");
        assert_eq!(run.format.font, Font::new("Serif", 14));
        assert_eq!(run.format.color, Color::rgb(255, 0, 0));
        assert_eq!(run.format.background, None);
    }

    #[test]
    fn test_heading_inner_text_uses_level_font() {
        let registry = registry();
        let doc = parse("<h3>Section</h3>", registry.clone()).unwrap();
        let block = doc.first_block();
        let h3 = registry.by_tag("h3").unwrap();

        assert_eq!(block.title_level(), h3);
        assert_eq!(block.text(), "Section");
        assert_eq!(block.runs()[0].format.font, registry.get(h3).unwrap().font);
    }

    #[test]
    fn test_heading_text_keeps_inline_spaces() {
        let doc = parse("<h1> Hi </h1>", registry()).unwrap();
        assert_eq!(doc.first_block().text(), " Hi ");

        let doc = parse("<h2>\n    Indented\n</h2>", registry()).unwrap();
        assert_eq!(doc.first_block().text(), "Indented");
    }

    #[test]
    fn test_escaped_family_is_decoded() {
        let source = r#"<p><span style="font-family:AT%26T%3B Sans;font-size:12pt;color:rgba(0,0,0,1);background-color:none">x</span></p>"#;
        let doc = parse(source, registry()).unwrap();
        assert_eq!(doc.first_block().runs()[0].format.font.family, "AT&T; Sans");
    }

    #[test]
    fn test_family_with_broken_escape_is_malformed() {
        let source = r#"<p><span style="font-family:%FF;font-size:12pt;color:rgba(0,0,0,1);background-color:none">x</span></p>"#;
        let err = parse(source, registry()).unwrap_err();
        assert!(matches!(err, ParseError::MalformedAttribute { ref key, .. } if key == "font-family"));
    }

    #[test]
    fn test_run_before_block_is_orphan() {
        let source = format!("<body style=\"width:800px\">\n{}\n<p>\n</p>", RUN);
        let err = parse(&source, registry()).unwrap_err();
        assert_eq!(err, ParseError::orphan_run(27));
    }

    #[test]
    fn test_missing_key_is_malformed() {
        let source = r#"<p><span style="font-family:Sans;color:rgba(0,0,0,1);background-color:none">x</span></p>"#;
        let err = parse(source, registry()).unwrap_err();
        assert!(matches!(err, ParseError::MalformedAttribute { ref key, .. } if key == "font-size"));
    }

    #[test]
    fn test_unknown_elements_are_ignored() {
        let source = format!("<div>\n<p>{}</p>\n<h6>ignored</h6>\n</div>", RUN);
        let doc = parse(&source, registry()).unwrap();
        assert_eq!(doc.blocks().len(), 1);
        assert_eq!(doc.text(), "red");
    }

    #[test]
    fn test_empty_markup_still_has_a_block() {
        let doc = parse("", registry()).unwrap();
        assert_eq!(doc.blocks().len(), 1);
        assert_eq!(doc.first_block().runs().len(), 1);
        assert_eq!(doc.title, None);
    }
}
