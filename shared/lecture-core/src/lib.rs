//! Lecture Core - subtitle timeline matching, catalog classification and
//! the small value types shared by every lecture viewer front end.
//!
//! Everything in this crate is synchronous and free of I/O. Callers feed in
//! explicit inputs (subtitle lists, playback positions, raw feeds) and get
//! plain values back.

pub mod catalog;
pub mod lesson;
pub mod photos;
pub mod srt;
pub mod subtitle;
pub mod timeline;
pub mod vocabulary;

pub use catalog::{
    available_years, classify, derive_date, filter, CatalogEntry, Classified, EntryStatus,
    MonthYear, Recording,
};
pub use lesson::{LessonForm, LessonRecord};
pub use photos::{PhotoAsset, PhotoCarousel};
pub use subtitle::{SubtitleEntry, SubtitleId};
pub use timeline::{
    current_index, current_subtitle, insert_provisional, reconcile, remove_by_id, InsertRejected,
    SubtitleTimeline, PROVISIONAL_WINDOW_SECONDS,
};
pub use vocabulary::{Familiarity, VocabularyEntry, VocabularyList};

/// Result type for Lecture Core operations
pub type Result<T> = std::result::Result<T, LectureCoreError>;

/// Error types for Lecture Core operations
#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LectureCoreError {
    #[error("Invalid value {value:?} for field {field}: {reason}")]
    InvalidField {
        field: &'static str,
        value: String,
        reason: String,
    },

    #[error("Month must be between 1 and 12, got {0}")]
    InvalidMonth(u32),

    #[error("SRT parse error at line {line}: {reason}")]
    SrtParse { line: usize, reason: String },

    #[error("Vocabulary word must not be empty")]
    EmptyWord,
}
