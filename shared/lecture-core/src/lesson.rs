//! Lesson records and the editable form they are built from

use crate::{LectureCoreError, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

/// Persisted metadata for a processed recording, in wire form
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonRecord {
    #[serde(default, deserialize_with = "null_as_empty")]
    pub video_id: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub title: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub teacher_name: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub description: String,

    /// Comma-joined keyword list
    #[serde(default, deserialize_with = "null_as_empty")]
    pub keywords: String,

    /// JSON-encoded section outline, kept opaque
    #[serde(default, deserialize_with = "null_as_empty")]
    pub sections: String,

    #[serde(default, deserialize_with = "null_as_empty")]
    pub notes_link: String,

    /// Comma-joined tag list
    #[serde(default, deserialize_with = "null_as_empty")]
    pub tags: String,

    /// 1 when subtitles are complete, 0 otherwise
    #[serde(default, deserialize_with = "lenient_number")]
    pub subtitles_status: u8,

    /// Self-assessed comprehension, 0-100
    #[serde(default, deserialize_with = "lenient_number")]
    pub comprehension_level: u8,
}

impl LessonRecord {
    pub fn keyword_list(&self) -> Vec<String> {
        split_list(&self.keywords)
    }

    pub fn tag_list(&self) -> Vec<String> {
        split_list(&self.tags)
    }

    pub fn subtitles_complete(&self) -> bool {
        self.subtitles_status == 1
    }
}

/// Editable lesson form. Every field is text, as typed by the user; numbers
/// are only coerced when the record is built for transmission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LessonForm {
    pub video_id: String,
    pub title: String,
    pub teacher_name: String,
    pub description: String,
    pub keywords: String,
    pub sections: String,
    pub notes_link: String,
    pub tags: String,
    pub subtitles_status: String,
    pub comprehension_level: String,
}

impl LessonForm {
    /// Empty form for a lesson that does not exist yet
    pub fn blank(video_id: impl Into<String>) -> Self {
        Self {
            video_id: video_id.into(),
            subtitles_status: "0".to_string(),
            comprehension_level: "0".to_string(),
            ..Self::default()
        }
    }

    /// Coerce the form into a record ready to send
    pub fn to_record(&self) -> Result<LessonRecord> {
        let subtitles_status = coerce_number("subtitles_status", &self.subtitles_status, 1)?;
        let comprehension_level = coerce_number("comprehension_level", &self.comprehension_level, 100)?;

        Ok(LessonRecord {
            video_id: self.video_id.clone(),
            title: self.title.clone(),
            teacher_name: self.teacher_name.clone(),
            description: self.description.clone(),
            keywords: self.keywords.clone(),
            sections: self.sections.clone(),
            notes_link: self.notes_link.clone(),
            tags: self.tags.clone(),
            subtitles_status,
            comprehension_level,
        })
    }

    /// Set a field by its wire name. Returns false for unknown names.
    pub fn set_field(&mut self, name: &str, value: impl Into<String>) -> bool {
        let slot = match name {
            "title" => &mut self.title,
            "teacher_name" => &mut self.teacher_name,
            "description" => &mut self.description,
            "keywords" => &mut self.keywords,
            "sections" => &mut self.sections,
            "notes_link" => &mut self.notes_link,
            "tags" => &mut self.tags,
            "subtitles_status" => &mut self.subtitles_status,
            "comprehension_level" => &mut self.comprehension_level,
            _ => return false,
        };
        *slot = value.into();
        true
    }
}

impl From<LessonRecord> for LessonForm {
    fn from(record: LessonRecord) -> Self {
        Self {
            video_id: record.video_id,
            title: record.title,
            teacher_name: record.teacher_name,
            description: record.description,
            keywords: record.keywords,
            sections: record.sections,
            notes_link: record.notes_link,
            tags: record.tags,
            subtitles_status: record.subtitles_status.to_string(),
            comprehension_level: record.comprehension_level.to_string(),
        }
    }
}

fn coerce_number(field: &'static str, raw: &str, max: u8) -> Result<u8> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(0);
    }

    let invalid = |reason: String| LectureCoreError::InvalidField {
        field,
        value: raw.to_string(),
        reason,
    };

    let value: i64 = trimmed
        .parse()
        .map_err(|_| invalid("not an integer".to_string()))?;
    if value < 0 || value > i64::from(max) {
        return Err(invalid(format!("must be between 0 and {}", max)));
    }
    Ok(value as u8)
}

fn split_list(joined: &str) -> Vec<String> {
    joined
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect()
}

fn null_as_empty<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<String, D::Error> {
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_number<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u8, D::Error> {
    let value = Value::deserialize(deserializer)?;
    let number = match value {
        Value::Number(n) => n.as_f64().unwrap_or(0.0),
        Value::String(s) => s.trim().parse().unwrap_or(0.0),
        _ => 0.0,
    };
    Ok(number.clamp(0.0, f64::from(u8::MAX)) as u8)
}
