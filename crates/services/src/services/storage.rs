//! On-disk layout of the permanent image tree.
//!
//! One directory per gallery under a configured root, holding the full-size
//! files plus `thumbnails/` and `previews/` subdirectories keyed by the same
//! generated filename token.

use std::path::{Path, PathBuf};

use tracing::debug;
use uuid::Uuid;

pub const THUMBNAILS_DIR: &str = "thumbnails";
pub const PREVIEWS_DIR: &str = "previews";

/// Directory name used for entries not yet assigned to a gallery.
pub const UNASSIGNED_DIR: &str = "unassigned";

/// Longest extension we bother preserving; anything odder is dropped.
const MAX_EXTENSION_LEN: usize = 10;

/// Assign a fresh random filename token, preserving the original extension.
///
/// Returns the bare token and the complete file name. Collisions are
/// negligible (v4 UUID, 128 random bits).
pub fn assign_filename(original_name: &str) -> (String, String) {
    let token = Uuid::new_v4().to_string();
    match extension_of(original_name) {
        Some(ext) => {
            let file_name = format!("{token}.{ext}");
            (token, file_name)
        }
        None => (token.clone(), token),
    }
}

fn extension_of(original_name: &str) -> Option<String> {
    let ext = original_name.rsplit('.').next()?;
    if ext.is_empty() || ext.len() > MAX_EXTENSION_LEN || ext == original_name {
        return None;
    }
    if !ext.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[derive(Debug, Clone)]
pub struct ImageStorage {
    root: PathBuf,
}

impl ImageStorage {
    pub fn new(root: PathBuf) -> Self {
        Self { root }
    }

    /// Storage configured from the environment (`GALLERIA_STORAGE_DIR`).
    pub fn from_env() -> Self {
        Self::new(utils::assets::storage_dir())
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn gallery_dir(&self, gallery_id: Option<Uuid>) -> PathBuf {
        match gallery_id {
            Some(id) => self.root.join(id.to_string()),
            None => self.root.join(UNASSIGNED_DIR),
        }
    }

    pub fn full_size_path(&self, gallery_id: Option<Uuid>, file_name: &str) -> PathBuf {
        self.gallery_dir(gallery_id).join(file_name)
    }

    pub fn thumbnail_path(&self, gallery_id: Option<Uuid>, file_name: &str) -> PathBuf {
        self.gallery_dir(gallery_id).join(THUMBNAILS_DIR).join(file_name)
    }

    pub fn preview_path(&self, gallery_id: Option<Uuid>, file_name: &str) -> PathBuf {
        self.gallery_dir(gallery_id).join(PREVIEWS_DIR).join(file_name)
    }

    /// Create the gallery's directory tree. Idempotent; concurrent first
    /// uploads to a brand-new gallery may race here and that is fine.
    pub async fn ensure_gallery_dirs(&self, gallery_id: Option<Uuid>) -> std::io::Result<()> {
        let dir = self.gallery_dir(gallery_id);
        tokio::fs::create_dir_all(dir.join(THUMBNAILS_DIR)).await?;
        tokio::fs::create_dir_all(dir.join(PREVIEWS_DIR)).await?;
        Ok(())
    }

    /// Move a staged upload into its permanent full-size location.
    ///
    /// Rename first; temp dirs can live on another filesystem, in which case
    /// fall back to copy + remove.
    pub async fn place_full_size(
        &self,
        staged: &Path,
        gallery_id: Option<Uuid>,
        file_name: &str,
    ) -> std::io::Result<PathBuf> {
        self.ensure_gallery_dirs(gallery_id).await?;
        let dest = self.full_size_path(gallery_id, file_name);

        match tokio::fs::rename(staged, &dest).await {
            Ok(()) => {}
            Err(rename_err) => {
                debug!(error = %rename_err, "Rename failed, copying instead");
                tokio::fs::copy(staged, &dest).await?;
                tokio::fs::remove_file(staged).await?;
            }
        }

        Ok(dest)
    }
}
