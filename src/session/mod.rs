//! View state machines driven by the CLI
//!
//! Each session owns the state one screen of the viewer needs: the catalog
//! listing, the player for a single lesson, or the lesson metadata editor.
//! Network failures never escape as panics; each session records a message
//! and moves to its own error state.

pub mod catalog;
pub mod generation;
pub mod lesson_editor;
pub mod player;

pub use catalog::{CatalogListing, CatalogState, CatalogView};
pub use generation::{Generation, GenerationToken};
pub use lesson_editor::{EditorError, EditorMode, LessonEditor};
pub use player::{PlayerSession, PlayerSettings, SubtitleError};
