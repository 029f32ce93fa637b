//! Client side of the remote lessons API
//!
//! All persistence lives behind a third-party HTTP API. [`LectureApi`] is the
//! seam the view sessions talk to; [`HttpLectureApi`] is the reqwest-backed
//! implementation.

use async_trait::async_trait;
use lecture_core::{LessonRecord, PhotoAsset, Recording, SubtitleEntry};

pub mod client;
pub mod error;
pub mod models;

pub use client::HttpLectureApi;
pub use error::{ApiError, ApiResult};
pub use models::{ApiBody, LessonLookup, SubtitleUpload};

/// Operations offered by the lessons API
#[async_trait]
pub trait LectureApi: Send + Sync {
    /// All uploaded recordings
    async fn list_recordings(&self) -> ApiResult<Vec<Recording>>;

    /// All lesson records
    async fn list_lessons(&self) -> ApiResult<Vec<LessonRecord>>;

    /// One lesson record, or [`LessonLookup::NotFound`]
    async fn get_lesson(&self, video_id: &str) -> ApiResult<LessonLookup>;

    async fn create_lesson(&self, lesson: &LessonRecord) -> ApiResult<ApiBody>;

    async fn update_lesson(&self, lesson: &LessonRecord) -> ApiResult<ApiBody>;

    async fn delete_lesson(&self, video_id: &str) -> ApiResult<ApiBody>;

    /// Raw audio bytes for a recording
    async fn get_audio(&self, file: &str) -> ApiResult<Vec<u8>>;

    async fn get_subtitles(&self, video_id: &str, language: &str) -> ApiResult<Vec<SubtitleEntry>>;

    async fn upload_subtitle(&self, upload: &SubtitleUpload) -> ApiResult<()>;

    async fn delete_subtitle(&self, id: &str) -> ApiResult<()>;

    /// Photos for a six-character date prefix
    async fn photos_by_date(&self, date: &str) -> ApiResult<Vec<PhotoAsset>>;
}
