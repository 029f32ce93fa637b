//! Catalog view: recordings and lesson records, filtered for display

use chrono::NaiveDate;
use lecture_core::{available_years, classify, filter, CatalogEntry, LessonRecord, MonthYear, Recording};
use std::sync::Arc;
use tracing::{error, info};

use crate::api::LectureApi;

/// Load state of the catalog
#[derive(Debug, Clone, PartialEq)]
pub enum CatalogState {
    Loading,
    Ready {
        recordings: Vec<Recording>,
        lessons: Vec<LessonRecord>,
    },
    Failed(String),
}

/// Entries currently visible, split the way the catalog screen shows them
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CatalogListing {
    pub unprocessed: Vec<CatalogEntry>,
    pub processed: Vec<CatalogEntry>,
}

impl CatalogListing {
    pub fn is_empty(&self) -> bool {
        self.unprocessed.is_empty() && self.processed.is_empty()
    }
}

pub struct CatalogView {
    api: Arc<dyn LectureApi>,
    state: CatalogState,
    query: String,
    month_year: MonthYear,
}

impl CatalogView {
    /// A catalog showing the month containing `today`
    pub fn new(api: Arc<dyn LectureApi>, today: NaiveDate) -> Self {
        Self {
            api,
            state: CatalogState::Loading,
            query: String::new(),
            month_year: MonthYear::from_date(today),
        }
    }

    pub fn state(&self) -> &CatalogState {
        &self.state
    }

    pub fn query(&self) -> &str {
        &self.query
    }

    pub fn month_year(&self) -> MonthYear {
        self.month_year
    }

    /// Fetch both feeds concurrently. Either failing fails the whole view.
    pub async fn load(&mut self) -> &CatalogState {
        self.state = CatalogState::Loading;

        let fetched = tokio::try_join!(self.api.list_recordings(), self.api.list_lessons());
        self.state = match fetched {
            Ok((recordings, lessons)) => {
                info!(
                    "📚 Catalog loaded: {} recordings, {} lessons",
                    recordings.len(),
                    lessons.len()
                );
                CatalogState::Ready { recordings, lessons }
            }
            Err(e) => {
                error!("Failed to load catalog: {}", e);
                CatalogState::Failed(e.user_message())
            }
        };
        &self.state
    }

    /// Manual retry after a failure
    pub async fn retry(&mut self) -> &CatalogState {
        self.load().await
    }

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.query = query.into();
    }

    pub fn clear_query(&mut self) {
        self.query.clear();
    }

    /// Pick a month (1-12). A non-blank search is cleared so the date filter applies.
    pub fn set_month(&mut self, month: u32) -> lecture_core::Result<()> {
        self.month_year = self.month_year.with_month(month)?;
        self.reset_search();
        Ok(())
    }

    /// Pick a year. A non-blank search is cleared so the date filter applies.
    pub fn set_year(&mut self, year: i32) {
        self.month_year = self.month_year.with_year(year);
        self.reset_search();
    }

    fn reset_search(&mut self) {
        if !self.query.trim().is_empty() {
            self.query.clear();
        }
    }

    /// Filtered entries, or `None` until the catalog is loaded
    pub fn visible(&self) -> Option<CatalogListing> {
        let CatalogState::Ready { recordings, lessons } = &self.state else {
            return None;
        };

        let classified = classify(recordings, lessons);
        Some(CatalogListing {
            unprocessed: filter(&classified.unprocessed, &self.query, self.month_year),
            processed: filter(&classified.processed, &self.query, self.month_year),
        })
    }

    /// Years for the year picker
    pub fn years(&self, now_year: i32) -> Vec<i32> {
        match &self.state {
            CatalogState::Ready { recordings, lessons } => available_years(recordings, lessons, now_year),
            _ => available_years(&[], &[], now_year),
        }
    }
}
