//! Blackboard photos attached to a lesson day

use serde::{Deserialize, Serialize};
use url::Url;

/// A photographed blackboard image as listed by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhotoAsset {
    pub key: String,

    /// Path fragment relative to the API origin
    pub url: String,
}

impl PhotoAsset {
    /// Full image URL for this photo
    pub fn resolve_url(&self, origin: &str) -> String {
        resolve_url(origin, &self.url)
    }
}

/// Join a relative fragment onto the API origin. Fragments that are already
/// absolute URLs are returned unchanged.
pub fn resolve_url(origin: &str, fragment: &str) -> String {
    if Url::parse(fragment).is_ok() {
        return fragment.to_string();
    }
    format!(
        "{}/{}",
        origin.trim_end_matches('/'),
        fragment.trim_start_matches('/')
    )
}

/// The six-character date prefix photos are grouped by
pub fn date_prefix(lesson_id: &str) -> Option<&str> {
    lesson_id.get(0..6)
}

/// Ordered photo list with a cursor that wraps at both ends
#[derive(Debug, Clone, Default)]
pub struct PhotoCarousel {
    photos: Vec<PhotoAsset>,
    index: usize,
}

impl PhotoCarousel {
    pub fn new(photos: Vec<PhotoAsset>) -> Self {
        Self { photos, index: 0 }
    }

    pub fn photos(&self) -> &[PhotoAsset] {
        &self.photos
    }

    pub fn len(&self) -> usize {
        self.photos.len()
    }

    pub fn is_empty(&self) -> bool {
        self.photos.is_empty()
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn current(&self) -> Option<&PhotoAsset> {
        self.photos.get(self.index)
    }

    pub fn next(&mut self) -> Option<&PhotoAsset> {
        if !self.photos.is_empty() {
            self.index = (self.index + 1) % self.photos.len();
        }
        self.current()
    }

    pub fn prev(&mut self) -> Option<&PhotoAsset> {
        if !self.photos.is_empty() {
            self.index = (self.index + self.photos.len() - 1) % self.photos.len();
        }
        self.current()
    }

    /// "Photo i of n", or `None` when there is nothing to show
    pub fn position_label(&self) -> Option<String> {
        if self.photos.is_empty() {
            return None;
        }
        Some(format!("Photo {} of {}", self.index + 1, self.photos.len()))
    }
}
