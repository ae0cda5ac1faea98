use std::collections::{BTreeMap, HashMap};
use std::sync::{Mutex, MutexGuard};

use async_trait::async_trait;
use uuid::Uuid;

use super::service::{PlannerService, RemoteError};
use crate::core::date_key::DateKey;
use crate::core::day_detail::{DayDetail, DaySummary, OnThisDayFact};
use crate::core::note::{Note, NoteId};

/// A call received by [`InMemoryService`], in arrival order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ServiceCall {
    GetMonthData { year: i32, month: u32 },
    GetDayData(DateKey),
    AddNote { date: DateKey, content: String },
    CompleteNote { date: DateKey, note_id: NoteId },
    FetchOnThisDay(DateKey),
}

#[derive(Default)]
struct State {
    days: BTreeMap<DateKey, DayDetail>,
    /// Facts the "internet" knows about, keyed by (month, day).
    facts: HashMap<(u32, u32), OnThisDayFact>,
    calls: Vec<ServiceCall>,
    fail_next: Option<RemoteError>,
}

/// In-process planner service.
#[derive(Default)]
pub struct InMemoryService {
    state: Mutex<State>,
}

impl InMemoryService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make `fact` available to `fetch_and_store_on_this_day` for every year's `month`/`day`.
    pub fn with_fact(self, month: u32, day: u32, fact: OnThisDayFact) -> Self {
        self.lock().facts.insert((month, day), fact);
        self
    }

    pub fn with_day(self, date: DateKey, detail: DayDetail) -> Self {
        self.lock().days.insert(date, detail);
        self
    }

    /// The next call, whatever it is, fails with `error`.
    pub fn fail_next(&self, error: RemoteError) {
        self.lock().fail_next = Some(error);
    }

    pub fn calls(&self) -> Vec<ServiceCall> {
        self.lock().calls.clone()
    }

    pub fn clear_calls(&self) {
        self.lock().calls.clear();
    }

    pub fn stored_day(&self, date: DateKey) -> Option<DayDetail> {
        self.lock().days.get(&date).cloned()
    }

    fn lock(&self) -> MutexGuard<'_, State> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Record `call` and consume any injected failure.
    fn enter(&self, call: ServiceCall) -> Result<MutexGuard<'_, State>, RemoteError> {
        let mut state = self.lock();
        state.calls.push(call);
        match state.fail_next.take() {
            Some(err) => Err(err),
            None => Ok(state),
        }
    }
}

#[async_trait]
impl PlannerService for InMemoryService {
    async fn get_month_data(
        &self,
        year: i32,
        month: u32,
    ) -> Result<Vec<(DateKey, DaySummary)>, RemoteError> {
        let state = self.enter(ServiceCall::GetMonthData { year, month })?;
        Ok(state
            .days
            .iter()
            .filter(|(date, _)| date.year() == year && date.month() == month)
            .map(|(date, detail)| {
                (
                    *date,
                    DaySummary {
                        notes: detail.notes.clone(),
                    },
                )
            })
            .collect())
    }

    async fn get_day_data(&self, date: DateKey) -> Result<Vec<DayDetail>, RemoteError> {
        let state = self.enter(ServiceCall::GetDayData(date))?;
        Ok(state.days.get(&date).cloned().into_iter().collect())
    }

    async fn add_note(&self, date: DateKey, content: &str) -> Result<(), RemoteError> {
        let mut state = self.enter(ServiceCall::AddNote {
            date,
            content: content.to_string(),
        })?;
        let note = Note::new(NoteId::Text(Uuid::new_v4().to_string()), content);
        state.days.entry(date).or_default().notes.push(note);
        Ok(())
    }

    async fn complete_note(&self, date: DateKey, note_id: &NoteId) -> Result<(), RemoteError> {
        let mut state = self.enter(ServiceCall::CompleteNote {
            date,
            note_id: note_id.clone(),
        })?;
        let note = state
            .days
            .get_mut(&date)
            .and_then(|day| day.notes.iter_mut().find(|n| &n.id == note_id))
            .ok_or_else(|| RemoteError::Rejected(format!("no note {} on {}", note_id, date)))?;
        note.is_completed = true;
        Ok(())
    }

    async fn fetch_and_store_on_this_day(&self, date: DateKey) -> Result<(), RemoteError> {
        let mut state = self.enter(ServiceCall::FetchOnThisDay(date))?;
        if state.days.get(&date).is_some_and(DayDetail::has_on_this_day) {
            return Ok(());
        }
        let fact = state
            .facts
            .get(&(date.month(), date.day()))
            .cloned()
            .ok_or_else(|| RemoteError::Rejected(format!("no historical event for {}", date)))?;
        state.days.entry(date).or_default().on_this_day = Some(fact);
        Ok(())
    }
}
