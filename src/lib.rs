//! Lecture Viewer
//!
//! Client for a remote lessons API: lists recorded audio lessons, plays them
//! back with synchronized subtitles, shows blackboard photos for the lesson
//! day and keeps lesson metadata and a personal vocabulary list.

pub mod api;
pub mod clock;
pub mod config;
pub mod sampler;
pub mod session;
pub mod vocabulary_store;

// Re-export main types for easy access
pub use crate::api::{ApiBody, ApiError, ApiResult, HttpLectureApi, LectureApi, LessonLookup, SubtitleUpload};
pub use crate::clock::{PlaybackClock, TransportClock};
pub use crate::config::{Config, ConfigBuilder};
pub use crate::sampler::{ActiveSubtitle, SamplerHandle, SubtitleSampler, DEFAULT_SAMPLE_INTERVAL};
pub use crate::session::{
    CatalogListing, CatalogState, CatalogView, EditorError, EditorMode, LessonEditor, PlayerSession,
    PlayerSettings, SubtitleError,
};
pub use crate::vocabulary_store::VocabularyStore;
