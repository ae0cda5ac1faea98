use crate::config::Theme;
use crate::core::date_key::{DateKey, YearMonth};
use crate::core::day_detail::{DayDetail, DaySummary};
use crate::core::note::NoteId;
use crate::sync::service::RemoteError;

/// Remote mutations, named after the service operation they call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mutation {
    AddNote,
    CompleteNote,
    FetchOnThisDay,
}

impl Mutation {
    pub fn operation(&self) -> &'static str {
        match self {
            Self::AddNote => "add_note",
            Self::CompleteNote => "complete_note",
            Self::FetchOnThisDay => "fetch_and_store_on_this_day",
        }
    }

    /// Whether success can change a day's open-note count.
    pub fn refreshes_month(&self) -> bool {
        match self {
            Self::AddNote | Self::CompleteNote => true,
            Self::FetchOnThisDay => false,
        }
    }
}

#[derive(Debug, Clone)]
pub enum Message {
    // Navigation
    SelectMonth(YearMonth),
    NextMonth,
    PrevMonth,
    SelectDate(DateKey),
    GoToToday,
    Refresh,

    // Mutations on the selected day
    AddNote(String),
    CompleteNote(NoteId),
    FetchOnThisDay,

    // Theme
    SetTheme(Theme),
    ToggleTheme,

    // Remote completions
    MonthLoaded {
        seq: u64,
        month: YearMonth,
        result: Result<Vec<(DateKey, DaySummary)>, RemoteError>,
    },
    DayLoaded {
        seq: u64,
        date: DateKey,
        result: Result<Vec<DayDetail>, RemoteError>,
    },
    MutationFinished {
        mutation: Mutation,
        date: DateKey,
        result: Result<(), RemoteError>,
    },
}

/// Work requested by [`crate::planner::Planner::update`] for the runtime to carry out.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    LoadMonth { seq: u64, month: YearMonth },
    LoadDay { seq: u64, date: DateKey },
    AddNote { date: DateKey, content: String },
    CompleteNote { date: DateKey, note_id: NoteId },
    FetchOnThisDay { date: DateKey },
    PersistTheme(Theme),
}

impl Effect {
    /// Remote effects count towards the loading indicator until their
    /// completion message comes back.
    pub fn is_remote(&self) -> bool {
        !matches!(self, Self::PersistTheme(_))
    }
}
