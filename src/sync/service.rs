use async_trait::async_trait;

use crate::core::date_key::DateKey;
use crate::core::day_detail::{DayDetail, DaySummary};
use crate::core::note::NoteId;

/// Failure of a round-trip to the planner service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RemoteError {
    #[error("request failed: {0}")]
    Transport(String),
    #[error("service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("unreadable response: {0}")]
    Decode(String),
    #[error("service rejected the call: {0}")]
    Rejected(String),
}

/// The remote source of truth for notes and on-this-day facts.
///
/// Dates travel in their wire form (`2024-2-15`).
#[async_trait]
pub trait PlannerService: Send + Sync {
    /// Day summaries covering exactly the requested month.
    async fn get_month_data(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<(DateKey, DaySummary)>, RemoteError>;

    /// Zero or one record; an empty list means the day has no record yet.
    async fn get_day_data(&self, date: DateKey) -> Result<Vec<DayDetail>, RemoteError>;

    async fn add_note(&self, date: DateKey, content: &str) -> Result<(), RemoteError>;

    async fn complete_note(&self, date: DateKey, note_id: &NoteId) -> Result<(), RemoteError>;

    /// Fetch the external fact for `date` and store it server-side. Safe to repeat.
    async fn fetch_and_store_on_this_day(&self, date: DateKey) -> Result<(), RemoteError>;
}
