//! Periodic subtitle sampling
//!
//! The active subtitle is recomputed on a fixed cadence against the playback
//! clock rather than on player events, accepting up to one period of display
//! lag. Each sampler is a tokio task owned by a [`SamplerHandle`]; dropping
//! the handle stops the task.

use lecture_core::{current_index, SubtitleEntry};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tracing::{debug, trace};

use crate::clock::PlaybackClock;

/// Default sampling period
pub const DEFAULT_SAMPLE_INTERVAL: Duration = Duration::from_millis(100);

/// The subtitle currently on screen and its row in the list
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveSubtitle {
    pub index: usize,
    pub entry: SubtitleEntry,
}

/// Spawns sampling tasks
pub struct SubtitleSampler;

impl SubtitleSampler {
    /// Start sampling `subtitles` against `clock` every `period`.
    ///
    /// The snapshot is fixed for the life of the task; when the list or the
    /// clock is replaced, stop this sampler and spawn a new one.
    pub fn spawn(
        subtitles: Arc<[SubtitleEntry]>,
        clock: Arc<dyn PlaybackClock>,
        period: Duration,
    ) -> SamplerHandle {
        let (sender, receiver) = watch::channel(None);
        debug!("Starting subtitle sampler over {} entries every {:?}", subtitles.len(), period);

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

            loop {
                ticker.tick().await;

                // Keep showing the last subtitle while the clock is unavailable
                let Some(position) = clock.position() else {
                    continue;
                };

                let next = current_index(&subtitles, position).map(|index| ActiveSubtitle {
                    index,
                    entry: subtitles[index].clone(),
                });

                sender.send_if_modified(|current| {
                    if *current == next {
                        false
                    } else {
                        trace!("Active subtitle at {:.2}s: {:?}", position, next.as_ref().map(|a| a.index));
                        *current = next;
                        true
                    }
                });

                if sender.is_closed() {
                    break;
                }
            }
        });

        SamplerHandle { task, receiver }
    }
}

/// Owner of a running sampler
#[derive(Debug)]
pub struct SamplerHandle {
    task: JoinHandle<()>,
    receiver: watch::Receiver<Option<ActiveSubtitle>>,
}

impl SamplerHandle {
    /// Latest sampled subtitle
    pub fn current(&self) -> Option<ActiveSubtitle> {
        self.receiver.borrow().clone()
    }

    /// Receiver notified whenever the active subtitle changes
    pub fn subscribe(&self) -> watch::Receiver<Option<ActiveSubtitle>> {
        self.receiver.clone()
    }

    pub fn is_running(&self) -> bool {
        !self.task.is_finished()
    }

    /// Stop sampling
    pub fn stop(self) {
        // Drop aborts the task
    }
}

impl Drop for SamplerHandle {
    fn drop(&mut self) {
        self.task.abort();
    }
}
