//! Playback position sources
//!
//! The timeline matcher never reads a shared player handle itself; whatever
//! drives sampling asks a [`PlaybackClock`] for the position and passes it in.

use lecture_core::SubtitleEntry;
use std::sync::Mutex;
use tokio::time::Instant;
use tracing::debug;

/// Source of the current playback position, in seconds
pub trait PlaybackClock: Send + Sync {
    /// `None` while no media is loaded
    fn position(&self) -> Option<f64>;
}

#[derive(Debug)]
struct TransportState {
    loaded: bool,
    /// Position at the moment playback last started or was seeked
    anchor: f64,
    playing_since: Option<Instant>,
    duration: Option<f64>,
}

impl TransportState {
    fn position_at(&self, now: Instant) -> f64 {
        let position = match self.playing_since {
            Some(since) => self.anchor + now.duration_since(since).as_secs_f64(),
            None => self.anchor,
        };
        match self.duration {
            Some(duration) => position.min(duration),
            None => position,
        }
    }
}

/// Wall-clock driven transport with play, pause and seek.
///
/// Built on `tokio::time::Instant`, so tests running with paused time see a
/// deterministic position.
#[derive(Debug)]
pub struct TransportClock {
    state: Mutex<TransportState>,
}

impl TransportClock {
    /// A transport with nothing loaded yet
    pub fn new() -> Self {
        Self {
            state: Mutex::new(TransportState {
                loaded: false,
                anchor: 0.0,
                playing_since: None,
                duration: None,
            }),
        }
    }

    /// A paused transport already loaded at `position`
    pub fn loaded_at(position: f64) -> Self {
        let clock = Self::new();
        clock.load(None);
        clock.seek(position);
        clock
    }

    fn with_state<R>(&self, f: impl FnOnce(&mut TransportState) -> R) -> R {
        let mut state = match self.state.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        f(&mut state)
    }

    /// Mark media as loaded, paused at the start
    pub fn load(&self, duration: Option<f64>) {
        self.with_state(|state| {
            state.loaded = true;
            state.anchor = 0.0;
            state.playing_since = None;
            state.duration = duration.filter(|d| d.is_finite() && *d >= 0.0);
        });
    }

    pub fn unload(&self) {
        self.with_state(|state| {
            state.loaded = false;
            state.anchor = 0.0;
            state.playing_since = None;
            state.duration = None;
        });
    }

    pub fn is_loaded(&self) -> bool {
        self.with_state(|state| state.loaded)
    }

    pub fn is_playing(&self) -> bool {
        self.with_state(|state| state.playing_since.is_some())
    }

    pub fn play(&self) {
        self.with_state(|state| {
            if state.loaded && state.playing_since.is_none() {
                state.playing_since = Some(Instant::now());
            }
        });
    }

    pub fn pause(&self) {
        self.with_state(|state| {
            let now = Instant::now();
            state.anchor = state.position_at(now);
            state.playing_since = None;
        });
    }

    /// Flip between playing and paused; returns whether it is now playing
    pub fn toggle(&self) -> bool {
        if self.is_playing() {
            self.pause();
            false
        } else {
            self.play();
            self.is_playing()
        }
    }

    /// Jump to `position`, clamped to the media bounds
    pub fn seek(&self, position: f64) {
        self.with_state(|state| {
            let mut target = if position.is_finite() { position.max(0.0) } else { 0.0 };
            if let Some(duration) = state.duration {
                target = target.min(duration);
            }
            state.anchor = target;
            if state.playing_since.is_some() {
                state.playing_since = Some(Instant::now());
            }
            debug!("Seek to {:.2}s", target);
        });
    }

    /// Jump to a subtitle's start and play. Entries without a usable start
    /// time are ignored.
    pub fn seek_to_subtitle(&self, entry: &SubtitleEntry) -> bool {
        if !entry.start_time.is_finite() || !self.is_loaded() {
            return false;
        }
        self.seek(entry.start_time);
        self.play();
        true
    }

    /// Step back by `seconds`, never before the start
    pub fn rewind(&self, seconds: f64) {
        if let Some(position) = self.position() {
            self.seek((position - seconds).max(0.0));
        }
    }
}

impl Default for TransportClock {
    fn default() -> Self {
        Self::new()
    }
}

impl PlaybackClock for TransportClock {
    fn position(&self) -> Option<f64> {
        self.with_state(|state| state.loaded.then(|| state.position_at(Instant::now())))
    }
}
