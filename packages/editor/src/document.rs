//! # Document Handle
//!
//! A loaded document plus its editing state.
//! Documents can be:
//! - **Memory-backed**: never saved, `save` needs `save_as` first
//! - **File-backed**: has a path, `save` writes the markup back
//!
//! ## Lifecycle
//!
//! ```text
//! Load → Parse → Edit → Render → Save
//!   ↓      ↓       ↓       ↓       ↓
//! File  Model  Commands  Markup   File
//! ```

use std::path::{Path, PathBuf};
use std::sync::Arc;

use scribe_parser::{Document as DocumentModel, RenderOptions, Serializer, TitleLevelRegistry};
use tracing::{info, instrument};

use crate::EditorError;

/// Editable document
#[derive(Debug, Clone)]
pub struct Document {
    model: DocumentModel,

    /// Current version number (increments on each edit)
    pub version: u64,

    dirty: bool,
    render: RenderOptions,
}

impl Document {
    /// Empty memory-backed document
    pub fn new(registry: Arc<TitleLevelRegistry>) -> Self {
        Self::from_model(DocumentModel::new(registry))
    }

    pub fn from_model(model: DocumentModel) -> Self {
        Self {
            model,
            version: 0,
            dirty: false,
            render: RenderOptions::default(),
        }
    }

    /// Create document from markup (memory-backed)
    pub fn from_source(source: &str, registry: Arc<TitleLevelRegistry>) -> Result<Self, EditorError> {
        let model = DocumentModel::parse(source, registry)?;
        Ok(Self::from_model(model))
    }

    /// Load document from file (file-backed)
    #[instrument(skip_all, fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>, registry: Arc<TitleLevelRegistry>) -> Result<Self, EditorError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path)?;
        let mut model = DocumentModel::parse(&source, registry)?;
        model.path = Some(path.to_path_buf());

        info!(blocks = model.blocks().len(), "Document loaded");
        Ok(Self::from_model(model))
    }

    pub fn with_render_options(mut self, render: RenderOptions) -> Self {
        self.render = render;
        self
    }

    pub fn model(&self) -> &DocumentModel {
        &self.model
    }

    /// Mutable model access; the document counts as edited afterwards
    pub fn model_mut(&mut self) -> &mut DocumentModel {
        self.touch();
        &mut self.model
    }

    pub(crate) fn touch(&mut self) {
        self.version += 1;
        self.dirty = true;
    }

    /// Check if document has unsaved changes
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_file_backed(&self) -> bool {
        self.model.path.is_some()
    }

    pub fn path(&self) -> Option<&Path> {
        self.model.path.as_deref()
    }

    /// Current markup
    pub fn source(&self) -> String {
        Serializer::with_options(self.render.clone()).serialize(&self.model)
    }

    /// Save document to disk (if file-backed)
    pub fn save(&mut self) -> Result<(), EditorError> {
        let path = self.model.path.clone().ok_or(EditorError::NotFileBacked)?;
        let source = self.source();
        self.write(&path, &source)
    }

    /// Save under a new path, which becomes the document's path. An unset
    /// title is taken from the file name. Nothing changes if the write fails.
    pub fn save_as(&mut self, path: impl Into<PathBuf>) -> Result<(), EditorError> {
        let path = path.into();
        let derived_title = match self.model.title {
            Some(_) => None,
            None => title_from_path(&path),
        };

        let source = match &derived_title {
            Some(title) => {
                let mut model = self.model.clone();
                model.title = Some(title.clone());
                Serializer::with_options(self.render.clone()).serialize(&model)
            }
            None => self.source(),
        };
        self.write(&path, &source)?;

        if derived_title.is_some() {
            self.model.title = derived_title;
        }
        self.model.path = Some(path);
        Ok(())
    }

    #[instrument(skip_all, fields(path = %path.display(), version = self.version))]
    fn write(&mut self, path: &Path, source: &str) -> Result<(), EditorError> {
        std::fs::write(path, source)?;
        self.dirty = false;
        info!("Document saved");
        Ok(())
    }
}

/// File name up to its first dot
fn title_from_path(path: &Path) -> Option<String> {
    let name = path.file_name()?.to_str()?;
    let stem = name.split('.').next().unwrap_or(name);
    (!stem.is_empty()).then(|| stem.to_string())
}
