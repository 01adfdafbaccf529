//! Presentation state
//!
//! Everything the front-end needs between two user actions: where in the
//! catalog the user is, the verdict store, whether a file operation is
//! running, and which image request is current.

use crate::services::FetchedImage;
use smashpass_common::csv_codec::{self, ImportOptions, ImportSummary};
use smashpass_common::{Catalog, Entity, Error, Result, Tally, Verdict, VerdictStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info};

/// File operation currently holding the I/O flag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IoKind {
    Import,
    Export,
}

impl std::fmt::Display for IoKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IoKind::Import => write!(f, "import"),
            IoKind::Export => write!(f, "export"),
        }
    }
}

/// Image fetch to start on a background task
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRequest {
    pub generation: u64,
    pub entity_id: String,
    pub url: String,
}

/// Completed fetch, sent back to the input loop
#[derive(Debug)]
pub struct ImageResult {
    pub generation: u64,
    pub entity_id: String,
    pub outcome: Result<FetchedImage>,
}

/// What the image area currently shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageState {
    Idle,
    Loading { entity_id: String },
    Ready {
        entity_id: String,
        bytes: usize,
        content_type: Option<String>,
    },
    Failed { entity_id: String, reason: String },
}

/// Single-owner UI state, mutated only from the input loop
#[derive(Debug)]
pub struct Session {
    catalog: Arc<Catalog>,
    store: VerdictStore,
    /// Not clamped by next/previous; out-of-range shows no entity
    position: i64,
    import_options: ImportOptions,
    io_in_flight: Option<IoKind>,
    image_generation: u64,
    image: ImageState,
    default_export_name: String,
}

impl Session {
    pub fn new(catalog: Arc<Catalog>, store: VerdictStore, import_options: ImportOptions) -> Self {
        Self {
            catalog,
            store,
            position: 0,
            import_options,
            io_in_flight: None,
            image_generation: 0,
            image: ImageState::Idle,
            default_export_name: smashpass_common::config::DEFAULT_EXPORT_NAME.to_string(),
        }
    }

    pub fn with_default_export_name(mut self, name: impl Into<String>) -> Self {
        self.default_export_name = name.into();
        self
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn store(&self) -> &VerdictStore {
        &self.store
    }

    pub fn position(&self) -> i64 {
        self.position
    }

    pub fn default_export_name(&self) -> &str {
        &self.default_export_name
    }

    /// Entity at the current position, if the position is in range
    pub fn current_entity(&self) -> Option<&Entity> {
        usize::try_from(self.position)
            .ok()
            .and_then(|p| self.catalog.get(p))
    }

    pub fn next(&mut self) {
        self.position += 1;
    }

    pub fn previous(&mut self) {
        self.position -= 1;
    }

    /// Jump to a 0-based position, clamped to `0..=len` like the slider
    pub fn seek(&mut self, position: i64) {
        let len = i64::try_from(self.catalog.len()).unwrap_or(i64::MAX);
        self.position = position.clamp(0, len);
    }

    /// Press a verdict button for `character` on the displayed entity
    pub fn toggle(&mut self, character: &str, candidate: Verdict) -> Result<Verdict> {
        let entity_id = self
            .current_entity()
            .map(|e| e.id.clone())
            .ok_or_else(|| Error::InvalidInput("no entity at this position".to_string()))?;
        self.store.toggle_verdict(character, &entity_id, candidate)
    }

    pub fn add_character(&mut self, name: &str) -> Result<()> {
        self.store.add_character(name)
    }

    pub fn remove_character(&mut self, name: &str) -> Result<()> {
        self.store.remove_character(name).map(|_| ())
    }

    /// Literal per-character counts, in roster order
    pub fn tallies(&self) -> Vec<(String, Tally)> {
        self.store
            .characters()
            .iter()
            .map(|c| (c.name().to_string(), c.tally()))
            .collect()
    }

    /// Take the I/O flag; fails if another import/export holds it
    pub fn begin_io(&mut self, kind: IoKind) -> Result<()> {
        if let Some(running) = self.io_in_flight {
            return Err(Error::Busy(format!("{} already in progress", running)));
        }
        self.io_in_flight = Some(kind);
        Ok(())
    }

    pub fn finish_io(&mut self) {
        self.io_in_flight = None;
    }

    pub fn io_in_flight(&self) -> Option<IoKind> {
        self.io_in_flight
    }

    /// Write the store to `path` (or the default export name)
    pub fn export(&mut self, path: Option<&Path>) -> Result<PathBuf> {
        self.begin_io(IoKind::Export)?;
        let target = path
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(&self.default_export_name));
        let result = csv_codec::export_to_file(&target, &self.store, &self.catalog);
        self.finish_io();
        result
    }

    /// Replace the store's contents from a CSV file
    pub fn import(&mut self, path: &Path) -> Result<ImportSummary> {
        self.begin_io(IoKind::Import)?;
        let result =
            csv_codec::import_from_file(path, &self.catalog, &mut self.store, self.import_options);
        self.finish_io();
        result
    }

    /// Handle a file dropped onto the window
    ///
    /// Only `.csv` paths are imported; anything else is ignored (`Ok(None)`).
    pub fn drop_file(&mut self, path: &Path) -> Result<Option<ImportSummary>> {
        if !csv_codec::is_csv_path(path) {
            info!(path = %path.display(), "Ignoring dropped non-CSV file");
            return Ok(None);
        }
        self.import(path).map(Some)
    }

    pub fn image(&self) -> &ImageState {
        &self.image
    }

    /// Start a new image request for the displayed entity
    ///
    /// Bumps the generation so any request still in flight becomes stale.
    /// Returns `None` when no entity is displayed.
    pub fn request_image(&mut self) -> Option<ImageRequest> {
        self.image_generation += 1;

        let Some(entity) = self.current_entity() else {
            self.image = ImageState::Idle;
            return None;
        };
        let request = ImageRequest {
            generation: self.image_generation,
            entity_id: entity.id.clone(),
            url: entity.image_url.clone(),
        };

        self.image = ImageState::Loading {
            entity_id: request.entity_id.clone(),
        };
        Some(request)
    }

    /// Store a fetch result if it belongs to the latest request
    ///
    /// Returns `false` when the result was stale and dropped.
    pub fn apply_image(&mut self, result: ImageResult) -> bool {
        if result.generation != self.image_generation {
            debug!(
                entity_id = %result.entity_id,
                generation = result.generation,
                current = self.image_generation,
                "Discarding stale image"
            );
            return false;
        }

        self.image = match result.outcome {
            Ok(image) => ImageState::Ready {
                entity_id: result.entity_id,
                bytes: image.bytes.len(),
                content_type: image.content_type,
            },
            Err(e) => ImageState::Failed {
                entity_id: result.entity_id,
                reason: e.to_string(),
            },
        };
        true
    }
}
