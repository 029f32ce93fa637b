//! Personal vocabulary list kept alongside a lesson

use crate::{LectureCoreError, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How well a word is known
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Familiarity {
    #[default]
    NotLearned,
    PartiallyLearned,
    Mastered,
}

impl Familiarity {
    pub const ALL: [Familiarity; 3] = [
        Familiarity::NotLearned,
        Familiarity::PartiallyLearned,
        Familiarity::Mastered,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Familiarity::NotLearned => "not learned",
            Familiarity::PartiallyLearned => "partially learned",
            Familiarity::Mastered => "mastered",
        }
    }
}

impl fmt::Display for Familiarity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Familiarity {
    type Err = LectureCoreError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().replace(['-', '_'], " ").as_str() {
            "not learned" | "new" => Ok(Familiarity::NotLearned),
            "partially learned" | "partial" => Ok(Familiarity::PartiallyLearned),
            "mastered" => Ok(Familiarity::Mastered),
            _ => Err(LectureCoreError::InvalidField {
                field: "familiarity",
                value: s.to_string(),
                reason: "expected not-learned, partially-learned or mastered".to_string(),
            }),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyEntry {
    /// Millisecond timestamp of creation, unique within a list
    pub id: i64,
    pub word: String,
    pub translation: String,
    pub familiarity: Familiarity,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VocabularyList {
    entries: Vec<VocabularyEntry>,
}

impl VocabularyList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn entries(&self) -> &[VocabularyEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Add a word stamped with the current time
    pub fn add(&mut self, word: &str, translation: &str, familiarity: Familiarity) -> Result<&VocabularyEntry> {
        self.add_at(word, translation, familiarity, chrono::Utc::now().timestamp_millis())
    }

    /// Add a word stamped with `now_millis`. Ids stay strictly increasing even
    /// when two words land in the same millisecond.
    pub fn add_at(
        &mut self,
        word: &str,
        translation: &str,
        familiarity: Familiarity,
        now_millis: i64,
    ) -> Result<&VocabularyEntry> {
        let word = word.trim();
        if word.is_empty() {
            return Err(LectureCoreError::EmptyWord);
        }

        let id = match self.entries.iter().map(|entry| entry.id).max() {
            Some(last) if last >= now_millis => last + 1,
            _ => now_millis,
        };

        self.entries.push(VocabularyEntry {
            id,
            word: word.to_string(),
            translation: translation.trim().to_string(),
            familiarity,
        });
        Ok(&self.entries[self.entries.len() - 1])
    }

    /// Remove by id; removing an unknown id is not an error
    pub fn remove(&mut self, id: i64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|entry| entry.id != id);
        self.entries.len() != before
    }

    pub fn by_familiarity(&self, familiarity: Familiarity) -> impl Iterator<Item = &VocabularyEntry> {
        self.entries.iter().filter(move |entry| entry.familiarity == familiarity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_add_and_remove() {
        let mut list = VocabularyList::new();
        let id = list.add_at("madrugar", "to get up early", Familiarity::default(), 1_000).unwrap().id;

        assert_eq!(id, 1_000);
        assert_eq!(list.entries()[0].familiarity, Familiarity::NotLearned);
        assert!(list.remove(id));
        assert!(!list.remove(id));
        assert!(list.is_empty());
    }

    #[test]
    fn test_ids_stay_unique_within_same_millisecond() {
        let mut list = VocabularyList::new();
        let a = list.add_at("uno", "one", Familiarity::Mastered, 5).unwrap().id;
        let b = list.add_at("dos", "two", Familiarity::Mastered, 5).unwrap().id;
        let c = list.add_at("tres", "three", Familiarity::Mastered, 3).unwrap().id;

        assert_eq!((a, b, c), (5, 6, 7));
    }

    #[test]
    fn test_empty_word_rejected() {
        let mut list = VocabularyList::new();
        assert_eq!(list.add("  ", "x", Familiarity::Mastered).unwrap_err(), LectureCoreError::EmptyWord);
    }

    #[test]
    fn test_familiarity_parsing_and_filter() {
        assert_eq!("partially-learned".parse::<Familiarity>().unwrap(), Familiarity::PartiallyLearned);
        assert_eq!("Mastered".parse::<Familiarity>().unwrap(), Familiarity::Mastered);
        assert_eq!("not_learned".parse::<Familiarity>().unwrap(), Familiarity::NotLearned);
        assert!("maybe".parse::<Familiarity>().is_err());

        let mut list = VocabularyList::new();
        list.add_at("a", "", Familiarity::Mastered, 1).unwrap();
        list.add_at("b", "", Familiarity::NotLearned, 2).unwrap();
        assert_eq!(list.by_familiarity(Familiarity::Mastered).count(), 1);
    }
}
