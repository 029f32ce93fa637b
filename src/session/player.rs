//! Player session for a single lesson
//!
//! Holds the subtitle timeline, blackboard photos and transport for the
//! selected lesson. Every fetch captures the request generation; results
//! that arrive after the selection changed are discarded.

use lecture_core::photos::date_prefix;
use lecture_core::{InsertRejected, PhotoAsset, PhotoCarousel, SubtitleEntry, SubtitleId, SubtitleTimeline};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info, warn};
use url::Url;

use super::generation::{Generation, GenerationToken};
use crate::api::{ApiError, ApiResult, LectureApi, SubtitleUpload};
use crate::clock::{PlaybackClock, TransportClock};
use crate::config::Config;
use crate::sampler::{ActiveSubtitle, SamplerHandle, SubtitleSampler};

/// Player settings taken from the configuration
#[derive(Debug, Clone)]
pub struct PlayerSettings {
    pub language: String,
    pub sample_interval: Duration,
    pub provisional_window: f64,
    pub rewind_seconds: f64,
    /// Origin relative photo URLs are resolved against
    pub origin: String,
}

impl From<&Config> for PlayerSettings {
    fn from(config: &Config) -> Self {
        Self {
            language: config.api.language.clone(),
            sample_interval: config.playback.sample_interval(),
            provisional_window: config.playback.provisional_window_seconds,
            rewind_seconds: config.playback.rewind_seconds,
            origin: origin_of(&config.api.base_url),
        }
    }
}

/// Scheme, host and port of the API base URL; photo URLs are rooted there
fn origin_of(base_url: &str) -> String {
    match Url::parse(base_url) {
        Ok(url) if url.origin().is_tuple() => url.origin().ascii_serialization(),
        _ => base_url.trim_end_matches('/').to_string(),
    }
}

impl Default for PlayerSettings {
    fn default() -> Self {
        Self::from(&Config::default())
    }
}

/// Subtitle authoring failures
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// Nothing was inserted
    #[error("Subtitle not added: {0}")]
    Rejected(#[from] InsertRejected),

    /// The entry was inserted locally but the server did not accept it.
    /// The local entry is kept.
    #[error("Subtitle kept locally but upload failed: {source}")]
    Upload {
        entry: SubtitleEntry,
        #[source]
        source: ApiError,
    },

    /// The server refused the delete; the local entry is kept
    #[error("Subtitle delete failed: {0}")]
    Delete(#[source] ApiError),
}

/// Result of a fetch issued by a player session
#[derive(Debug)]
pub struct Fetched<T> {
    token: GenerationToken,
    lesson_id: String,
    result: ApiResult<T>,
}

/// Descriptor for a fetch; run it against the API and hand the result back
/// to [`PlayerSession::apply_subtitles`] or [`PlayerSession::apply_photos`]
#[derive(Debug, Clone)]
pub struct FetchRequest {
    token: GenerationToken,
    lesson_id: String,
    language: String,
}

impl FetchRequest {
    pub fn lesson_id(&self) -> &str {
        &self.lesson_id
    }

    pub async fn subtitles(self, api: &dyn LectureApi) -> Fetched<Vec<SubtitleEntry>> {
        let result = api.get_subtitles(&self.lesson_id, &self.language).await;
        Fetched {
            token: self.token,
            lesson_id: self.lesson_id,
            result,
        }
    }

    pub async fn photos(self, api: &dyn LectureApi) -> Fetched<Vec<PhotoAsset>> {
        let result = match date_prefix(&self.lesson_id) {
            Some(date) => api.photos_by_date(date).await,
            None => Ok(Vec::new()),
        };
        Fetched {
            token: self.token,
            lesson_id: self.lesson_id,
            result,
        }
    }
}

pub struct PlayerSession {
    api: Arc<dyn LectureApi>,
    settings: PlayerSettings,
    lesson_id: String,
    generation: Generation,
    timeline: SubtitleTimeline,
    photos: PhotoCarousel,
    clock: Arc<TransportClock>,
    sampler: Option<SamplerHandle>,
    pending_uploads: HashSet<SubtitleId>,
    last_error: Option<String>,
    photo_error: Option<String>,
}

impl PlayerSession {
    pub fn new(api: Arc<dyn LectureApi>, settings: PlayerSettings, lesson_id: impl Into<String>) -> Self {
        let timeline = SubtitleTimeline::default().with_window(settings.provisional_window);
        Self {
            api,
            settings,
            lesson_id: lesson_id.into(),
            generation: Generation::new(),
            timeline,
            photos: PhotoCarousel::default(),
            clock: Arc::new(TransportClock::new()),
            sampler: None,
            pending_uploads: HashSet::new(),
            last_error: None,
            photo_error: None,
        }
    }

    pub fn lesson_id(&self) -> &str {
        &self.lesson_id
    }

    pub fn subtitles(&self) -> &[SubtitleEntry] {
        self.timeline.entries()
    }

    pub fn photos(&self) -> &PhotoCarousel {
        &self.photos
    }

    pub fn photos_mut(&mut self) -> &mut PhotoCarousel {
        &mut self.photos
    }

    /// Absolute URL of the photo on display
    pub fn current_photo_url(&self) -> Option<String> {
        self.photos.current().map(|photo| photo.resolve_url(&self.settings.origin))
    }

    pub fn clock(&self) -> Arc<TransportClock> {
        self.clock.clone()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Why the photo carousel is empty after a failed photo fetch
    pub fn photo_error(&self) -> Option<&str> {
        self.photo_error.as_deref()
    }

    /// Switch to another lesson. Outstanding fetches for the previous one
    /// become stale and local state is cleared.
    pub fn select(&mut self, lesson_id: impl Into<String>) {
        self.lesson_id = lesson_id.into();
        self.generation.advance();
        self.timeline = SubtitleTimeline::default().with_window(self.settings.provisional_window);
        self.photos = PhotoCarousel::default();
        self.pending_uploads.clear();
        self.last_error = None;
        self.photo_error = None;
        self.clock.unload();
        self.restart_sampler();
        info!("🎧 Selected lesson {}", self.lesson_id);
    }

    /// Describe a fetch for the current selection
    pub fn fetch_request(&self) -> FetchRequest {
        FetchRequest {
            token: self.generation.token(),
            lesson_id: self.lesson_id.clone(),
            language: self.settings.language.clone(),
        }
    }

    /// `Ok(None)` when the fetch belongs to an earlier selection
    fn accept<T>(&self, fetched: Fetched<T>, what: &str) -> ApiResult<Option<T>> {
        if !self.generation.is_current(fetched.token) {
            debug!("Discarding stale {} for {}", what, fetched.lesson_id);
            return Ok(None);
        }
        match fetched.result {
            Ok(value) => Ok(Some(value)),
            Err(e) => {
                warn!("Failed to fetch {} for {}: {}", what, fetched.lesson_id, e);
                Err(e)
            }
        }
    }

    /// Apply a subtitle fetch. `Ok(false)` means it was stale and ignored.
    pub fn apply_subtitles(&mut self, fetched: Fetched<Vec<SubtitleEntry>>) -> ApiResult<bool> {
        let server = match self.accept(fetched, "subtitles") {
            Ok(Some(server)) => server,
            Ok(None) => return Ok(false),
            Err(e) => {
                self.last_error = Some(e.user_message());
                return Err(e);
            }
        };
        let pending = &self.pending_uploads;
        self.timeline.replace_with_server(server, |id| pending.contains(id));
        self.restart_sampler();
        Ok(true)
    }

    /// Apply a photo fetch. `Ok(false)` means it was stale and ignored.
    /// A failure empties the carousel and is kept in [`Self::photo_error`].
    pub fn apply_photos(&mut self, fetched: Fetched<Vec<PhotoAsset>>) -> ApiResult<bool> {
        match self.accept(fetched, "photos") {
            Ok(Some(photos)) => {
                self.photos = PhotoCarousel::new(photos);
                self.photo_error = None;
                Ok(true)
            }
            Ok(None) => Ok(false),
            Err(e) => {
                self.photos = PhotoCarousel::default();
                self.photo_error = Some(e.user_message());
                Err(e)
            }
        }
    }

    /// Fetch subtitles and photos for the current lesson concurrently.
    /// A photo failure leaves the carousel empty without failing the load;
    /// a subtitle failure is returned.
    pub async fn load(&mut self) -> ApiResult<()> {
        self.last_error = None;
        self.photo_error = None;
        let api = self.api.clone();
        let (subtitles, photos) = tokio::join!(
            self.fetch_request().subtitles(api.as_ref()),
            self.fetch_request().photos(api.as_ref())
        );

        // Reported through photo_error
        let _ = self.apply_photos(photos);
        self.apply_subtitles(subtitles)?;

        info!(
            "Loaded lesson {}: {} subtitles, {} photos",
            self.lesson_id,
            self.timeline.len(),
            self.photos.len()
        );
        Ok(())
    }

    /// Refetch subtitles and reconcile with the server copy
    pub async fn refresh_subtitles(&mut self) -> ApiResult<bool> {
        let api = self.api.clone();
        let fetched = self.fetch_request().subtitles(api.as_ref()).await;
        self.apply_subtitles(fetched)
    }

    /// Download the lesson audio
    pub async fn download_audio(&self) -> ApiResult<Vec<u8>> {
        self.api.get_audio(&self.lesson_id).await
    }

    /// Start the periodic subtitle sampler
    pub fn start_sampling(&mut self) {
        self.sampler = Some(self.spawn_sampler());
    }

    pub fn stop_sampling(&mut self) {
        if let Some(sampler) = self.sampler.take() {
            sampler.stop();
        }
    }

    pub fn is_sampling(&self) -> bool {
        self.sampler.is_some()
    }

    /// Receiver for active subtitle changes, while sampling
    pub fn subscribe(&self) -> Option<tokio::sync::watch::Receiver<Option<ActiveSubtitle>>> {
        self.sampler.as_ref().map(SamplerHandle::subscribe)
    }

    fn spawn_sampler(&self) -> SamplerHandle {
        let snapshot: Arc<[SubtitleEntry]> = self.timeline.entries().to_vec().into();
        let clock: Arc<dyn PlaybackClock> = self.clock.clone();
        SubtitleSampler::spawn(snapshot, clock, self.settings.sample_interval)
    }

    /// Replace a running sampler after the list changed
    fn restart_sampler(&mut self) {
        if let Some(old) = self.sampler.take() {
            old.stop();
            self.sampler = Some(self.spawn_sampler());
        }
    }

    /// Subtitle at the current playback position, computed directly
    pub fn current_subtitle(&self) -> Option<&SubtitleEntry> {
        self.clock.position().and_then(|position| self.timeline.current(position))
    }

    /// Jump playback to a subtitle's start and play
    pub fn play_from(&self, id: &SubtitleId) -> bool {
        self.timeline
            .get(id)
            .map_or(false, |entry| self.clock.seek_to_subtitle(entry))
    }

    pub fn toggle_playback(&self) -> bool {
        self.clock.toggle()
    }

    pub fn rewind(&self) {
        self.clock.rewind(self.settings.rewind_seconds);
    }

    /// Insert a subtitle ending at the playback position, then upload it.
    ///
    /// The local insert happens first and is not rolled back when the upload
    /// fails; the entry disappears on the next refresh instead.
    pub async fn add_subtitle(&mut self, text: &str) -> Result<SubtitleEntry, SubtitleError> {
        let entry = self.timeline.insert(text, self.clock.position())?;
        self.pending_uploads.insert(entry.id.clone());
        self.restart_sampler();

        let upload = SubtitleUpload {
            video_id: self.lesson_id.clone(),
            language: self.settings.language.clone(),
            text: entry.text.clone(),
            start_time: entry.start_time,
            end_time: entry.end_time,
        };
        let result = self.api.upload_subtitle(&upload).await;
        self.pending_uploads.remove(&entry.id);

        match result {
            Ok(()) => Ok(entry),
            Err(source) => {
                self.last_error = Some(source.user_message());
                Err(SubtitleError::Upload { entry, source })
            }
        }
    }

    /// Delete a subtitle. Persisted entries are removed locally once the
    /// server confirms; provisional ones only exist here and go immediately.
    /// Deleting an unknown id is not an error.
    pub async fn delete_subtitle(&mut self, id: &SubtitleId) -> Result<bool, SubtitleError> {
        if let Some(server_id) = id.server_id() {
            if let Err(e) = self.api.delete_subtitle(server_id).await {
                self.last_error = Some(e.user_message());
                return Err(SubtitleError::Delete(e));
            }
        }

        let removed = self.timeline.remove(id);
        if removed {
            self.restart_sampler();
        }
        Ok(removed)
    }
}

impl Drop for PlayerSession {
    fn drop(&mut self) {
        self.stop_sampling();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigBuilder;

    #[test]
    fn test_origin_drops_base_path() {
        let config = ConfigBuilder::new().with_base_url("https://host.example.com/v1/").build();
        assert_eq!(PlayerSettings::from(&config).origin, "https://host.example.com");

        let config = ConfigBuilder::new().with_base_url("http://127.0.0.1:8787/api").build();
        assert_eq!(PlayerSettings::from(&config).origin, "http://127.0.0.1:8787");
    }

    #[test]
    fn test_origin_falls_back_to_trimmed_base_url() {
        assert_eq!(origin_of("not a url/"), "not a url");
        assert_eq!(origin_of("https://lessons.example.com/"), "https://lessons.example.com");
    }
}
