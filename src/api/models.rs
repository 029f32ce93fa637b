//! API data models

use lecture_core::LessonRecord;
use serde_json::Value;

/// Literal body the API sends when a lesson record does not exist
pub const LESSON_NOT_FOUND: &str = "Lesson not found";

/// A response body that may be JSON or plain text, resolved once on arrival
#[derive(Debug, Clone, PartialEq)]
pub enum ApiBody {
    Json(Value),
    Text(String),
}

impl ApiBody {
    /// Try JSON first, keep the raw text otherwise
    pub fn from_text(text: String) -> Self {
        match serde_json::from_str::<Value>(&text) {
            Ok(value) => ApiBody::Json(value),
            Err(_) => ApiBody::Text(text),
        }
    }

    /// Human-readable message carried by the body, if any
    pub fn message(&self) -> Option<String> {
        let message = match self {
            ApiBody::Json(Value::Object(map)) => map.get("message").and_then(Value::as_str).map(str::to_string),
            ApiBody::Json(Value::String(s)) => Some(s.clone()),
            ApiBody::Json(_) => None,
            ApiBody::Text(text) => Some(text.trim().to_string()),
        };
        message.filter(|m| !m.is_empty())
    }

    pub fn as_json(&self) -> Option<&Value> {
        match self {
            ApiBody::Json(value) => Some(value),
            ApiBody::Text(_) => None,
        }
    }

    pub fn is_lesson_not_found(&self) -> bool {
        matches!(self, ApiBody::Text(text) if text.trim() == LESSON_NOT_FOUND)
    }
}

/// Outcome of looking up a single lesson record
#[derive(Debug, Clone, PartialEq)]
pub enum LessonLookup {
    Found(LessonRecord),
    NotFound,
}

/// Fields of the multipart subtitle upload
#[derive(Debug, Clone, PartialEq)]
pub struct SubtitleUpload {
    pub video_id: String,
    pub language: String,
    pub text: String,
    pub start_time: f64,
    pub end_time: f64,
}
