//! Lesson metadata editor
//!
//! Loads the record for one recording, or starts a blank form when the API
//! reports that no record exists yet. Saving creates or updates depending on
//! which of the two it started as.

use lecture_core::{LectureCoreError, LessonForm};
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::api::{ApiBody, ApiError, LectureApi, LessonLookup};

const CREATED_MESSAGE: &str = "Lesson created";
const UPDATED_MESSAGE: &str = "Lesson updated";
const DELETED_MESSAGE: &str = "Lesson deleted";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode {
    Loading,
    /// A record exists on the server; saving updates it
    Existing,
    /// No record yet; saving creates one
    New,
}

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Invalid lesson form: {0}")]
    Invalid(#[from] LectureCoreError),

    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("There is no saved lesson to delete")]
    NothingToDelete,
}

impl EditorError {
    pub fn user_message(&self) -> String {
        match self {
            EditorError::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

pub struct LessonEditor {
    api: Arc<dyn LectureApi>,
    video_id: String,
    mode: EditorMode,
    form: LessonForm,
    last_message: Option<String>,
}

impl LessonEditor {
    pub fn new(api: Arc<dyn LectureApi>, video_id: impl Into<String>) -> Self {
        let video_id = video_id.into();
        Self {
            api,
            form: LessonForm::blank(video_id.clone()),
            video_id,
            mode: EditorMode::Loading,
            last_message: None,
        }
    }

    pub fn video_id(&self) -> &str {
        &self.video_id
    }

    pub fn mode(&self) -> EditorMode {
        self.mode
    }

    pub fn form(&self) -> &LessonForm {
        &self.form
    }

    pub fn form_mut(&mut self) -> &mut LessonForm {
        &mut self.form
    }

    /// Outcome of the last save or delete, for display
    pub fn last_message(&self) -> Option<&str> {
        self.last_message.as_deref()
    }

    /// Fetch the record. A missing record switches to create mode.
    pub async fn load(&mut self) -> Result<EditorMode, EditorError> {
        self.mode = EditorMode::Loading;
        match self.api.get_lesson(&self.video_id).await? {
            LessonLookup::Found(record) => {
                self.form = LessonForm::from(record);
                self.form.video_id = self.video_id.clone();
                self.mode = EditorMode::Existing;
            }
            LessonLookup::NotFound => {
                info!("📝 No record for {}, starting a new one", self.video_id);
                self.form = LessonForm::blank(self.video_id.clone());
                self.mode = EditorMode::New;
            }
        }
        Ok(self.mode)
    }

    /// Create or update the record, then reload it from the server
    pub async fn save(&mut self) -> Result<String, EditorError> {
        let record = self.form.to_record()?;

        let (body, fallback) = match self.mode {
            EditorMode::Existing => (self.api.update_lesson(&record).await, UPDATED_MESSAGE),
            EditorMode::New | EditorMode::Loading => (self.api.create_lesson(&record).await, CREATED_MESSAGE),
        };
        let message = outcome_message(body.map_err(|e| self.record_failure(e))?, fallback);
        info!("💾 {}: {}", self.video_id, message);

        self.load().await?;
        self.last_message = Some(message.clone());
        Ok(message)
    }

    /// Delete the record and reset to a blank form in create mode
    pub async fn delete(&mut self) -> Result<String, EditorError> {
        if self.mode != EditorMode::Existing {
            return Err(EditorError::NothingToDelete);
        }

        let body = self
            .api
            .delete_lesson(&self.video_id)
            .await
            .map_err(|e| self.record_failure(e))?;
        let message = outcome_message(body, DELETED_MESSAGE);
        info!("🗑️ {}: {}", self.video_id, message);

        self.form = LessonForm::blank(self.video_id.clone());
        self.mode = EditorMode::New;
        self.last_message = Some(message.clone());
        Ok(message)
    }

    fn record_failure(&mut self, error: ApiError) -> EditorError {
        warn!("Lesson request for {} failed: {}", self.video_id, error);
        self.last_message = Some(error.user_message());
        EditorError::Api(error)
    }
}

fn outcome_message(body: ApiBody, fallback: &str) -> String {
    body.message().unwrap_or_else(|| fallback.to_string())
}
