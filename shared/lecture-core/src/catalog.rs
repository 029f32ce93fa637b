//! Catalog classification and filtering
//!
//! Recording keys start with the upload date as `YYMMDD` (e.g. `240426.wav`).
//! A recording counts as processed once a lesson record with the same
//! identifier exists.

use crate::lesson::LessonRecord;
use crate::{LectureCoreError, Result};
use chrono::{Datelike, Duration, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet};

/// Number of years kept on each side of the current year in the year picker
const YEAR_WINDOW: i32 = 5;

/// A raw uploaded audio file as listed by the API
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Recording {
    pub key: String,
}

impl Recording {
    pub fn new(key: impl Into<String>) -> Self {
        Self { key: key.into() }
    }
}

/// Whether a catalog entry already has a lesson record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EntryStatus {
    Processed,
    Unprocessed,
}

/// Display-ready catalog row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub key: String,
    pub title: Option<String>,
    pub teacher_name: Option<String>,
    pub upload_date: Option<NaiveDate>,
    pub status: EntryStatus,
}

impl CatalogEntry {
    /// Title when present, raw identifier otherwise
    pub fn display_name(&self) -> &str {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => title,
            _ => &self.key,
        }
    }

    fn matches_query(&self, needle: &str) -> bool {
        match self.title.as_deref() {
            Some(title) if !title.is_empty() => {
                title.to_lowercase().contains(needle)
                    || self
                        .teacher_name
                        .as_deref()
                        .map_or(false, |teacher| teacher.to_lowercase().contains(needle))
            }
            _ => self.key.to_lowercase().contains(needle),
        }
    }
}

/// Result of splitting the catalog into processed and unprocessed entries
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classified {
    pub processed: Vec<CatalogEntry>,
    pub unprocessed: Vec<CatalogEntry>,
}

/// Calendar month selected in the date filter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthYear {
    year: i32,
    month: u32,
}

impl MonthYear {
    /// Create a month/year pair; `month` is 1-based
    pub fn new(year: i32, month: u32) -> Result<Self> {
        if !(1..=12).contains(&month) {
            return Err(LectureCoreError::InvalidMonth(month));
        }
        Ok(Self { year, month })
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    pub fn year(&self) -> i32 {
        self.year
    }

    pub fn month(&self) -> u32 {
        self.month
    }

    pub fn with_year(self, year: i32) -> Self {
        Self { year, ..self }
    }

    pub fn with_month(self, month: u32) -> Result<Self> {
        Self::new(self.year, month)
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

/// Derive the upload date encoded in a recording or lesson identifier.
///
/// Uses the part before the first `.`: two-digit year (read as `20YY`, so
/// `99` is 2099), month, day. Returns `None` when fewer than six digits are
/// available.
///
/// Out of range parts carry over into the next unit: month `13` is January
/// of the following year, `240230` is 2024-03-01, and a `00` month or day
/// steps back to the previous one.
pub fn derive_date(identifier: &str) -> Option<NaiveDate> {
    let stem = identifier.split('.').next().unwrap_or_default();
    let digits = stem.get(0..6)?;
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    let year: i32 = format!("20{}", &digits[0..2]).parse().ok()?;
    let month: u32 = digits[2..4].parse().ok()?;
    let day: i64 = digits[4..6].parse().ok()?;

    let january = NaiveDate::from_ymd_opt(year, 1, 1)?;
    let month_start = match month {
        0 => january.checked_sub_months(Months::new(1))?,
        m => january.checked_add_months(Months::new(m - 1))?,
    };
    month_start.checked_add_signed(Duration::days(day - 1))
}

/// Split the catalog into processed lessons and recordings still waiting
/// for a lesson record. Identifiers are compared exactly.
pub fn classify(recordings: &[Recording], lessons: &[LessonRecord]) -> Classified {
    let lesson_ids: HashSet<&str> = lessons.iter().map(|lesson| lesson.video_id.as_str()).collect();

    let processed = lessons
        .iter()
        .map(|lesson| CatalogEntry {
            key: lesson.video_id.clone(),
            title: Some(lesson.title.clone()),
            teacher_name: Some(lesson.teacher_name.clone()),
            upload_date: derive_date(&lesson.video_id),
            status: EntryStatus::Processed,
        })
        .collect();

    let unprocessed = recordings
        .iter()
        .filter(|recording| !lesson_ids.contains(recording.key.as_str()))
        .map(|recording| CatalogEntry {
            key: recording.key.clone(),
            title: None,
            teacher_name: None,
            upload_date: derive_date(&recording.key),
            status: EntryStatus::Unprocessed,
        })
        .collect();

    Classified { processed, unprocessed }
}

/// Filter entries for display.
///
/// A query that is non-empty after trimming switches to search mode, which
/// ignores `month_year`. Otherwise only entries uploaded in `month_year`
/// are kept; entries without a valid date are dropped.
pub fn filter(entries: &[CatalogEntry], query: &str, month_year: MonthYear) -> Vec<CatalogEntry> {
    if !query.trim().is_empty() {
        let needle = query.to_lowercase();
        return entries
            .iter()
            .filter(|entry| entry.matches_query(&needle))
            .cloned()
            .collect();
    }

    entries
        .iter()
        .filter(|entry| entry.upload_date.map_or(false, |date| month_year.contains(date)))
        .cloned()
        .collect()
}

/// Years offered by the year picker: every year found in the catalog plus a
/// window around `now_year`, ascending and without duplicates.
pub fn available_years(recordings: &[Recording], lessons: &[LessonRecord], now_year: i32) -> Vec<i32> {
    let mut years: BTreeSet<i32> = recordings
        .iter()
        .map(|recording| recording.key.as_str())
        .chain(lessons.iter().map(|lesson| lesson.video_id.as_str()))
        .filter_map(derive_date)
        .map(|date| date.year())
        .collect();

    years.extend(now_year - YEAR_WINDOW..=now_year + YEAR_WINDOW);
    years.into_iter().collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lesson(id: &str, title: &str, teacher: &str) -> LessonRecord {
        LessonRecord {
            video_id: id.to_string(),
            title: title.to_string(),
            teacher_name: teacher.to_string(),
            ..LessonRecord::default()
        }
    }

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn test_derive_date() {
        assert_eq!(derive_date("240426.wav"), Some(ymd(2024, 4, 26)));
        assert_eq!(derive_date("991231"), Some(ymd(2099, 12, 31)));
        assert_eq!(derive_date("240426_extra.mp3"), Some(ymd(2024, 4, 26)));
    }

    #[test]
    fn test_derive_date_rolls_over_impossible_dates() {
        assert_eq!(derive_date("240230"), Some(ymd(2024, 3, 1)));
        assert_eq!(derive_date("241345.wav"), Some(ymd(2025, 2, 14)));
        assert_eq!(derive_date("240431"), Some(ymd(2024, 5, 1)));
        assert_eq!(derive_date("230229"), Some(ymd(2023, 3, 1)));
        assert_eq!(derive_date("240100"), Some(ymd(2023, 12, 31)));
        assert_eq!(derive_date("240015"), Some(ymd(2023, 12, 15)));
        assert_eq!(derive_date("240000"), Some(ymd(2023, 11, 30)));
        assert_eq!(derive_date("999999"), Some(ymd(2107, 6, 7)));
    }

    #[test]
    fn test_available_years_include_rolled_over_dates() {
        let recordings = vec![Recording::new("241345.wav"), Recording::new("240100.wav")];
        let years = available_years(&recordings, &[], 2040);
        assert!(years.contains(&2025));
        assert!(years.contains(&2023));
    }

    #[test]
    fn test_derive_date_invalid_inputs() {
        assert_eq!(derive_date(""), None);
        assert_eq!(derive_date("2404.wav"), None);
        assert_eq!(derive_date("24ab26"), None);
        assert_eq!(derive_date("2404é6"), None);
        assert_eq!(derive_date("notes.240426"), None);
    }

    #[test]
    fn test_classify_splits_by_exact_identifier() {
        let recordings = vec![Recording::new("A"), Recording::new("B"), Recording::new("a")];
        let lessons = vec![lesson("A", "Intro", "Ana")];

        let classified = classify(&recordings, &lessons);

        let processed: Vec<&str> = classified.processed.iter().map(|e| e.key.as_str()).collect();
        let unprocessed: Vec<&str> = classified.unprocessed.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(processed, vec!["A"]);
        assert_eq!(unprocessed, vec!["B", "a"]);
        assert_eq!(classified.processed[0].title.as_deref(), Some("Intro"));
        assert_eq!(classified.unprocessed[0].title, None);
    }

    #[test]
    fn test_classify_carries_derived_dates() {
        let classified = classify(
            &[Recording::new("240101.wav"), Recording::new("240426.wav")],
            &[lesson("240426.wav", "Verbos", "Luis")],
        );

        assert_eq!(classified.processed[0].upload_date, Some(ymd(2024, 4, 26)));
        assert_eq!(classified.unprocessed[0].upload_date, Some(ymd(2024, 1, 1)));
        assert_eq!(classified.processed[0].status, EntryStatus::Processed);
        assert_eq!(classified.unprocessed[0].status, EntryStatus::Unprocessed);
    }

    #[test]
    fn test_search_mode_ignores_month_and_case() {
        let classified = classify(
            &[Recording::new("230115.wav")],
            &[lesson("240426.wav", "Subjuntivo Avanzado", "María"), lesson("240501.wav", "Historia", "Pedro")],
        );
        let december_1999 = MonthYear::new(1999, 12).unwrap();

        let found = filter(&classified.processed, "SUBJUNTIVO", december_1999);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].key, "240426.wav");

        let by_teacher = filter(&classified.processed, "pedro", december_1999);
        assert_eq!(by_teacher[0].key, "240501.wav");

        let by_key = filter(&classified.unprocessed, "2301", december_1999);
        assert_eq!(by_key.len(), 1);
    }

    #[test]
    fn test_search_uses_key_when_title_is_empty() {
        let entries = classify(&[], &[lesson("240426.wav", "", "Ana")]).processed;
        let month = MonthYear::new(2024, 4).unwrap();

        assert!(filter(&entries, "ana", month).is_empty());
        assert_eq!(filter(&entries, "0426", month).len(), 1);
    }

    #[test]
    fn test_date_mode_drops_unparseable_identifiers() {
        let entries = classify(
            &[Recording::new("240426.wav"), Recording::new("240410.wav"), Recording::new("x.wav"), Recording::new("240526.wav")],
            &[],
        )
        .unprocessed;

        let april = filter(&entries, "   ", MonthYear::new(2024, 4).unwrap());
        let keys: Vec<&str> = april.iter().map(|e| e.key.as_str()).collect();
        assert_eq!(keys, vec!["240426.wav", "240410.wav"]);

        let april_2023 = filter(&entries, "", MonthYear::new(2023, 4).unwrap());
        assert!(april_2023.is_empty());
    }

    #[test]
    fn test_available_years_includes_window_and_catalog_years() {
        let years = available_years(
            &[Recording::new("991231.wav"), Recording::new("junk"), Recording::new("240101.wav")],
            &[lesson("100101.wav", "Old", "T")],
            2026,
        );

        assert!(years.contains(&2026));
        assert!(years.contains(&2021));
        assert!(years.contains(&2031));
        assert!(years.contains(&2099));
        assert!(years.contains(&2010));
        assert!(years.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(years.iter().filter(|&&y| y == 2024).count(), 1);
    }

    #[test]
    fn test_month_year_validation() {
        assert_eq!(MonthYear::new(2024, 13), Err(LectureCoreError::InvalidMonth(13)));
        assert!(MonthYear::new(2024, 0).is_err());

        let april = MonthYear::from_date(ymd(2024, 4, 26));
        assert_eq!((april.year(), april.month()), (2024, 4));
        assert_eq!(april.with_year(2025).year(), 2025);
        assert_eq!(april.with_month(5).unwrap().month(), 5);
    }
}
