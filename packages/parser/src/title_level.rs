//! # Title levels
//!
//! Named paragraph styles ("Body", "H1", ...). Each level carries the font new
//! text in that level starts with and the element name the serializer writes
//! for blocks at that level.
//!
//! The registry is built once at startup and shared read-only (`Arc`) by every
//! document and by the codec.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};

use crate::ast::{Font, FontWeight};
use crate::error::RegistryError;

/// Output tag of the body level
pub const BODY_TAG: &str = "p";

/// Element names the codec uses for its own structure
const RESERVED_TAGS: &[&str] = &["html", "head", "title", "meta", "body", "span"];

/// Handle to a level inside the registry that issued it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TitleLevelId(usize);

impl TitleLevelId {
    pub fn index(self) -> usize {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleLevel {
    pub name: String,
    pub font: Font,
    pub tag: String,
}

impl TitleLevel {
    pub fn new(name: impl Into<String>, font: Font, tag: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            font,
            tag: tag.into(),
        }
    }

    pub fn is_body(&self) -> bool {
        self.tag.eq_ignore_ascii_case(BODY_TAG)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TitleLevelRegistry {
    levels: Vec<TitleLevel>,
    body: TitleLevelId,
}

impl TitleLevelRegistry {
    /// Build a registry, validating names, tags and the single body level
    pub fn new(levels: Vec<TitleLevel>) -> Result<Self, RegistryError> {
        if levels.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut names = HashSet::new();
        let mut tags = HashSet::new();

        for level in &levels {
            if !names.insert(level.name.as_str()) {
                return Err(RegistryError::DuplicateName(level.name.clone()));
            }

            let tag = level.tag.to_ascii_lowercase();
            let well_formed = tag.chars().next().is_some_and(|c| c.is_ascii_alphabetic())
                && tag.chars().all(|c| c.is_ascii_alphanumeric());
            if !well_formed || RESERVED_TAGS.contains(&tag.as_str()) {
                return Err(RegistryError::InvalidTag(level.tag.clone()));
            }
            if !tags.insert(tag) {
                return Err(RegistryError::DuplicateTag(level.tag.clone()));
            }

            if level.font.size == 0 {
                return Err(RegistryError::InvalidFont(level.name.clone()));
            }
        }

        let bodies: Vec<usize> = levels
            .iter()
            .enumerate()
            .filter(|(_, level)| level.is_body())
            .map(|(index, _)| index)
            .collect();

        match bodies.as_slice() {
            [body] => Ok(Self {
                body: TitleLevelId(*body),
                levels,
            }),
            _ => Err(RegistryError::BodyLevel(bodies.len())),
        }
    }

    /// Body text plus four heading levels, all in `family`
    pub fn standard(family: &str) -> Self {
        let level = |name: &str, size: u32, weight: FontWeight, tag: &str| {
            TitleLevel::new(name, Font::new(family, size).with_weight(weight), tag)
        };

        Self {
            levels: vec![
                level("Body", 12, FontWeight::NORMAL, BODY_TAG),
                level("H1", 20, FontWeight::BOLD, "h1"),
                level("H2", 16, FontWeight::BOLD, "h2"),
                level("H3", 14, FontWeight::BOLD, "h3"),
                level("H4", 12, FontWeight::BOLD, "h4"),
            ],
            body: TitleLevelId(0),
        }
    }

    pub fn body(&self) -> TitleLevelId {
        self.body
    }

    pub fn body_level(&self) -> &TitleLevel {
        &self.levels[self.body.0]
    }

    pub fn get(&self, id: TitleLevelId) -> Option<&TitleLevel> {
        self.levels.get(id.0)
    }

    pub fn by_name(&self, name: &str) -> Option<TitleLevelId> {
        self.levels
            .iter()
            .position(|level| level.name == name)
            .map(TitleLevelId)
    }

    /// Case-insensitive lookup by output tag
    pub fn by_tag(&self, tag: &str) -> Option<TitleLevelId> {
        self.levels
            .iter()
            .position(|level| level.tag.eq_ignore_ascii_case(tag))
            .map(TitleLevelId)
    }

    pub fn iter(&self) -> impl Iterator<Item = (TitleLevelId, &TitleLevel)> {
        self.levels
            .iter()
            .enumerate()
            .map(|(index, level)| (TitleLevelId(index), level))
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }
}

impl Default for TitleLevelRegistry {
    fn default() -> Self {
        Self::standard(crate::ast::DEFAULT_FAMILY)
    }
}
