//! Markup tokenizer using logos
//!
//! The grammar is deliberately small: opening tags, closing tags, and text
//! between them. Declarations (`<!DOCTYPE ...>`, comments) are skipped.
//! Tag internals are decoded by hand into [`Event`]s for the builder.

use logos::Logos;
use tracing::debug;

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"<![^>]*>")]
pub enum Token<'src> {
    // `</name>`
    #[regex(r"</[a-zA-Z][a-zA-Z0-9]*[ \t\r\n]*>", |lex| {
        let s = lex.slice();
        s[2..s.len() - 1].trim()
    })]
    Close(&'src str),

    // `<name attr="...">`, kept whole
    #[regex(r"<[a-zA-Z][^<>]*>", |lex| lex.slice())]
    Open(&'src str),

    #[regex(r"[^<]+", |lex| lex.slice())]
    Text(&'src str),
}

/// Typed markup event, `pos` being the byte offset of the token
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event<'src> {
    Open {
        name: &'src str,
        style: Option<&'src str>,
        pos: usize,
    },
    Close {
        name: &'src str,
        pos: usize,
    },
    Text {
        text: &'src str,
        pos: usize,
    },
}

/// Tokenize markup into events. Stray `<` characters are skipped.
pub fn tokenize(source: &str) -> Vec<Event<'_>> {
    let mut events = Vec::new();
    let mut lexer = Token::lexer(source);

    while let Some(token) = lexer.next() {
        let pos = lexer.span().start;
        match token {
            Ok(Token::Open(raw)) => events.push(Event::Open {
                name: tag_name(raw),
                style: attribute(raw, "style"),
                pos,
            }),
            Ok(Token::Close(name)) => events.push(Event::Close { name, pos }),
            Ok(Token::Text(text)) => events.push(Event::Text { text, pos }),
            Err(()) => debug!(pos, "Skipping unrecognized markup"),
        }
    }

    events
}

/// Element name of an opening tag (`<h2 class="x">` → `h2`)
fn tag_name(raw: &str) -> &str {
    let inner = &raw[1..];
    let end = inner
        .find(|c: char| !c.is_ascii_alphanumeric())
        .unwrap_or(inner.len());
    &inner[..end]
}

/// Double-quoted attribute value inside an opening tag
fn attribute<'src>(raw: &'src str, name: &str) -> Option<&'src str> {
    let mut search = 0;
    while let Some(found) = raw[search..].find(name) {
        let start = search + found;
        let after = &raw[start + name.len()..];
        let preceded_by_space = raw[..start].ends_with(|c: char| c.is_whitespace());

        if preceded_by_space {
            if let Some(value) = after.trim_start().strip_prefix('=') {
                let value = value.trim_start().strip_prefix('"')?;
                return value.find('"').map(|end| &value[..end]);
            }
        }
        search = start + name.len();
    }
    None
}
