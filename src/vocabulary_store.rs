//! File-backed persistence for the personal vocabulary list
//!
//! The list lives in a single pretty-printed JSON file. A missing file reads
//! as an empty list.

use anyhow::{Context, Result};
use lecture_core::VocabularyList;
use std::path::{Path, PathBuf};
use tokio::fs;
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct VocabularyStore {
    path: PathBuf,
}

impl VocabularyStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub async fn load(&self) -> Result<VocabularyList> {
        if !fs::try_exists(&self.path).await.unwrap_or(false) {
            debug!("No vocabulary file at {}, starting empty", self.path.display());
            return Ok(VocabularyList::new());
        }

        let content = fs::read_to_string(&self.path)
            .await
            .with_context(|| format!("Failed to read vocabulary file {}", self.path.display()))?;
        let list: VocabularyList = serde_json::from_str(&content)
            .with_context(|| format!("Invalid vocabulary file {}", self.path.display()))?;
        debug!("📖 Loaded {} vocabulary entries", list.len());
        Ok(list)
    }

    pub async fn save(&self, list: &VocabularyList) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let json_content = serde_json::to_string_pretty(list)?;
        fs::write(&self.path, json_content)
            .await
            .with_context(|| format!("Failed to write vocabulary file {}", self.path.display()))?;
        info!("💾 Saved {} vocabulary entries to {}", list.len(), self.path.display());
        Ok(())
    }
}
