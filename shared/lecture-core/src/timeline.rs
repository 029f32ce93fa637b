//! Timeline matching: which subtitle is active at a playback position, and
//! how locally authored subtitles enter and leave the list.
//!
//! Subtitle lists are neither sorted nor disjoint. Every lookup scans in list
//! order and the first containing interval wins, so overlapping captions show
//! the earliest-created one.

use crate::subtitle::{SubtitleEntry, SubtitleId};
use thiserror::Error;
use tracing::debug;

/// Length of the window a provisional subtitle covers, ending at the position
pub const PROVISIONAL_WINDOW_SECONDS: f64 = 5.0;

/// Why a provisional insert was refused. The list is left untouched.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InsertRejected {
    #[error("subtitle text is empty")]
    EmptyText,

    #[error("playback clock is unavailable")]
    ClockUnavailable,
}

/// First entry whose interval contains `position`
pub fn current_subtitle(subtitles: &[SubtitleEntry], position: f64) -> Option<&SubtitleEntry> {
    current_index(subtitles, position).map(|index| &subtitles[index])
}

/// Index of the first entry whose interval contains `position`
pub fn current_index(subtitles: &[SubtitleEntry], position: f64) -> Option<usize> {
    if position.is_nan() {
        return None;
    }
    subtitles.iter().position(|entry| entry.contains(position))
}

/// Append a provisional subtitle covering `[position - 5, position]`.
///
/// The start is not clamped: inserting at 3s yields a start of -2s.
pub fn insert_provisional(
    subtitles: &[SubtitleEntry],
    new_text: &str,
    position: Option<f64>,
) -> Result<(Vec<SubtitleEntry>, SubtitleEntry), InsertRejected> {
    let entry = provisional_entry(new_text, position, PROVISIONAL_WINDOW_SECONDS)?;
    let mut updated = subtitles.to_vec();
    updated.push(entry.clone());
    Ok((updated, entry))
}

/// Remove the first entry with identifier `id`. Absent ids leave the list as is.
pub fn remove_by_id(subtitles: &[SubtitleEntry], id: &SubtitleId) -> Vec<SubtitleEntry> {
    let mut updated = subtitles.to_vec();
    if let Some(index) = updated.iter().position(|entry| &entry.id == id) {
        updated.remove(index);
    }
    updated
}

/// Replace a local list with a fresh server copy.
///
/// Provisional entries are dropped unless `keep_pending` says their upload is
/// still in flight, in which case they stay after the server entries.
pub fn reconcile<F>(local: &[SubtitleEntry], server: Vec<SubtitleEntry>, keep_pending: F) -> Vec<SubtitleEntry>
where
    F: Fn(&SubtitleId) -> bool,
{
    let mut merged = server;
    merged.extend(
        local
            .iter()
            .filter(|entry| entry.is_provisional() && keep_pending(&entry.id))
            .cloned(),
    );
    merged
}

fn provisional_entry(text: &str, position: Option<f64>, window: f64) -> Result<SubtitleEntry, InsertRejected> {
    let text = text.trim();
    if text.is_empty() {
        return Err(InsertRejected::EmptyText);
    }
    let position = match position {
        Some(p) if p.is_finite() => p,
        _ => return Err(InsertRejected::ClockUnavailable),
    };

    Ok(SubtitleEntry::new(
        SubtitleId::provisional(),
        position - window,
        position,
        text,
    ))
}

/// Owning subtitle list for a single lesson
#[derive(Debug, Clone)]
pub struct SubtitleTimeline {
    entries: Vec<SubtitleEntry>,
    window: f64,
}

impl SubtitleTimeline {
    pub fn new(entries: Vec<SubtitleEntry>) -> Self {
        Self {
            entries,
            window: PROVISIONAL_WINDOW_SECONDS,
        }
    }

    /// Use a different provisional window length
    pub fn with_window(mut self, window: f64) -> Self {
        self.window = window;
        self
    }

    pub fn entries(&self) -> &[SubtitleEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: &SubtitleId) -> Option<&SubtitleEntry> {
        self.entries.iter().find(|entry| &entry.id == id)
    }

    pub fn current(&self, position: f64) -> Option<&SubtitleEntry> {
        current_subtitle(&self.entries, position)
    }

    pub fn current_index(&self, position: f64) -> Option<usize> {
        current_index(&self.entries, position)
    }

    /// Append a provisional entry ending at `position`
    pub fn insert(&mut self, text: &str, position: Option<f64>) -> Result<SubtitleEntry, InsertRejected> {
        let entry = provisional_entry(text, position, self.window)?;
        debug!(
            "Provisional subtitle {} at [{:.2}, {:.2}]",
            entry.id, entry.start_time, entry.end_time
        );
        self.entries.push(entry.clone());
        Ok(entry)
    }

    /// Remove an entry, returning whether anything was removed
    pub fn remove(&mut self, id: &SubtitleId) -> bool {
        match self.entries.iter().position(|entry| &entry.id == id) {
            Some(index) => {
                self.entries.remove(index);
                true
            }
            None => false,
        }
    }

    /// Take the server copy, keeping provisional entries still awaiting upload
    pub fn replace_with_server<F>(&mut self, server: Vec<SubtitleEntry>, keep_pending: F)
    where
        F: Fn(&SubtitleId) -> bool,
    {
        self.entries = reconcile(&self.entries, server, keep_pending);
    }

    pub fn provisional_count(&self) -> usize {
        self.entries.iter().filter(|entry| entry.is_provisional()).count()
    }
}

impl Default for SubtitleTimeline {
    fn default() -> Self {
        Self::new(Vec::new())
    }
}
