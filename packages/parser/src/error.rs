use thiserror::Error;

pub type ParseResult<T> = Result<T, ParseError>;

/// Errors raised while reading markup back into a document.
///
/// Positions are byte offsets into the source text.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Malformed attribute `{key}` at {pos}: {message}")]
    MalformedAttribute {
        pos: usize,
        key: String,
        message: String,
    },

    #[error("Run at {pos} appears before any block")]
    OrphanRun { pos: usize },
}

impl ParseError {
    pub fn malformed_attribute(pos: usize, key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::MalformedAttribute {
            pos,
            key: key.into(),
            message: message.into(),
        }
    }

    pub fn orphan_run(pos: usize) -> Self {
        Self::OrphanRun { pos }
    }

    /// Byte offset the error was raised at
    pub fn pos(&self) -> usize {
        match self {
            ParseError::MalformedAttribute { pos, .. } | ParseError::OrphanRun { pos } => *pos,
        }
    }
}

/// Errors raised by structural edits on the document model.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Offset {offset} out of range (length {len})")]
    OutOfRange { offset: usize, len: usize },

    #[error("Invalid line spacing policy: {0}")]
    InvalidPolicy(String),

    #[error("Unknown title level: {0}")]
    UnknownTitleLevel(String),

    #[error("Invalid value for {field}: {message}")]
    InvalidValue { field: &'static str, message: String },
}

impl ModelError {
    pub fn out_of_range(offset: usize, len: usize) -> Self {
        Self::OutOfRange { offset, len }
    }

    pub fn invalid_value(field: &'static str, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            field,
            message: message.into(),
        }
    }
}

/// Errors raised when building a title level registry.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RegistryError {
    #[error("Registry has no title levels")]
    Empty,

    #[error("Duplicate title level name: {0}")]
    DuplicateName(String),

    #[error("Duplicate output tag: {0}")]
    DuplicateTag(String),

    #[error("Invalid output tag: {0}")]
    InvalidTag(String),

    #[error("Title level {0} has a zero point size")]
    InvalidFont(String),

    #[error("Registry needs exactly one body level (tag `p`), found {0}")]
    BodyLevel(usize),
}

/// Pretty-print a parse error with source context using ariadne
#[cfg(feature = "pretty-errors")]
pub fn format_error(source: &str, filename: &str, error: &ParseError) -> String {
    use ariadne::{Color, Label, Report, ReportKind, Source};

    let start = error.pos().min(source.len());
    let Some(rest) = source.get(start..) else {
        return error.to_string();
    };
    let end = rest.find('>').map(|i| start + i + 1).unwrap_or(source.len());

    // ariadne counts characters, positions are bytes
    let start = source[..start].chars().count();
    let end = source[..end].chars().count();

    let label = match error {
        ParseError::MalformedAttribute { key, message, .. } => format!("`{}`: {}", key, message),
        ParseError::OrphanRun { .. } => "no paragraph or heading opened before this run".to_string(),
    };

    let mut output = Vec::new();
    let report = Report::build(ReportKind::Error, filename, start)
        .with_message(error.to_string())
        .with_label(
            Label::new((filename, start..end))
                .with_color(Color::Red)
                .with_message(label),
        )
        .finish();

    if report.write((filename, Source::from(source)), &mut output).is_err() {
        return error.to_string();
    }

    String::from_utf8(output).unwrap_or_else(|_| error.to_string())
}
