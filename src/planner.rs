use crate::config::Theme;
use crate::core::calendar_grid::{DayCell, build_grid};
use crate::core::date_key::{DateKey, YearMonth};
use crate::core::day_detail::{DayDetail, DaySummary};
use crate::core::month_aggregate::MonthAggregate;
use crate::message::{Effect, Message, Mutation};
use crate::sync::service::RemoteError;

/// Why a note was refused before reaching the service.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NoteRejection {
    #[error("note is empty")]
    Empty,
    #[error("cannot add notes to {date}, it is before {today}")]
    Backdated { date: DateKey, today: DateKey },
}

/// Trim `content` and check it may be added to `date`.
pub fn validate_note(content: &str, date: DateKey, today: DateKey) -> Result<String, NoteRejection> {
    let content = content.trim();
    if content.is_empty() {
        return Err(NoteRejection::Empty);
    }
    if date < today {
        return Err(NoteRejection::Backdated { date, today });
    }
    Ok(content.to_string())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SelectionState {
    pub displayed_month: YearMonth,
    pub selected_date: DateKey,
    pub theme: Theme,
}

/// Where "today" comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Clock {
    Local,
    Fixed(DateKey),
}

impl Clock {
    pub fn today(&self) -> DateKey {
        match self {
            Self::Local => DateKey::today(),
            Self::Fixed(date) => *date,
        }
    }
}

/// Monotonic request counter for one cache target.
#[derive(Debug, Clone, Copy, Default)]
struct RequestSeq {
    latest: u64,
}

impl RequestSeq {
    fn issue(&mut self) -> u64 {
        self.latest += 1;
        self.latest
    }

    fn is_current(&self, seq: u64) -> bool {
        seq == self.latest
    }
}

/// Client state for the planner: selection, both caches, and in-flight bookkeeping.
///
/// [`Planner::update`] is the only way state changes. It never performs I/O;
/// it returns the [`Effect`]s the runtime must carry out, and remote results
/// come back as messages. For each cache the newest request wins: a response
/// older than the latest request for the same target is dropped.
#[derive(Debug, Clone)]
pub struct Planner {
    selection: SelectionState,
    month: MonthAggregate,
    day: Option<DayDetail>,
    in_flight: usize,
    month_seq: RequestSeq,
    day_seq: RequestSeq,
    clock: Clock,
}

impl Planner {
    /// Display and select today.
    pub fn new(theme: Theme) -> Self {
        Self::with_clock(Clock::Local, theme)
    }

    pub fn with_clock(clock: Clock, theme: Theme) -> Self {
        let today = clock.today();
        Self {
            selection: SelectionState {
                displayed_month: today.year_month(),
                selected_date: today,
                theme,
            },
            month: MonthAggregate::empty(today.year_month()),
            day: None,
            in_flight: 0,
            month_seq: RequestSeq::default(),
            day_seq: RequestSeq::default(),
            clock,
        }
    }

    /// Start on `date` instead of today.
    pub fn on_date(mut self, date: DateKey) -> Self {
        self.selection.displayed_month = date.year_month();
        self.selection.selected_date = date;
        self.month = MonthAggregate::empty(date.year_month());
        self.day = None;
        self
    }

    /// Initial loads for the starting selection.
    pub fn start(&mut self) -> Vec<Effect> {
        let effects = vec![self.load_month(), self.load_day()];
        self.track(&effects);
        effects
    }

    pub fn selection(&self) -> &SelectionState {
        &self.selection
    }

    pub fn theme(&self) -> Theme {
        self.selection.theme
    }

    pub fn month_aggregate(&self) -> &MonthAggregate {
        &self.month
    }

    /// Detail for the selected date; `None` until its load resolves.
    pub fn day_detail(&self) -> Option<&DayDetail> {
        self.day.as_ref()
    }

    pub fn is_loading(&self) -> bool {
        self.in_flight > 0
    }

    pub fn in_flight(&self) -> usize {
        self.in_flight
    }

    pub fn today(&self) -> DateKey {
        self.clock.today()
    }

    /// Past days are read-only.
    pub fn can_add_note(&self) -> bool {
        self.selection.selected_date >= self.today()
    }

    pub fn grid(&self) -> Vec<DayCell> {
        build_grid(
            self.selection.displayed_month,
            self.selection.selected_date,
            &self.month,
            self.today(),
        )
    }

    pub fn update(&mut self, message: Message) -> Vec<Effect> {
        let effects = self.react(message);
        self.track(&effects);
        effects
    }

    fn react(&mut self, message: Message) -> Vec<Effect> {
        match message {
            Message::SelectMonth(month) => self.select_month(month),
            Message::NextMonth => self.select_month(self.selection.displayed_month.succ()),
            Message::PrevMonth => self.select_month(self.selection.displayed_month.pred()),
            Message::SelectDate(date) => self.select_date(date),

            Message::GoToToday => {
                let today = self.today();
                self.selection.displayed_month = today.year_month();
                self.set_selected_date(today);
                vec![self.load_month(), self.load_day()]
            }

            Message::Refresh => vec![self.load_month(), self.load_day()],

            Message::AddNote(content) => {
                let date = self.selection.selected_date;
                match validate_note(&content, date, self.today()) {
                    Ok(content) => vec![Effect::AddNote { date, content }],
                    Err(reason) => {
                        log::debug!("Not adding note: {}", reason);
                        Vec::new()
                    }
                }
            }

            Message::CompleteNote(note_id) => vec![Effect::CompleteNote {
                date: self.selection.selected_date,
                note_id,
            }],

            Message::FetchOnThisDay => vec![Effect::FetchOnThisDay {
                date: self.selection.selected_date,
            }],

            Message::SetTheme(theme) => self.set_theme(theme),
            Message::ToggleTheme => self.set_theme(self.selection.theme.toggled()),

            Message::MonthLoaded { seq, month, result } => {
                self.month_loaded(seq, month, result);
                Vec::new()
            }
            Message::DayLoaded { seq, date, result } => {
                self.day_loaded(seq, date, result);
                Vec::new()
            }
            Message::MutationFinished {
                mutation,
                date,
                result,
            } => self.mutation_finished(mutation, date, result),
        }
    }

    fn select_month(&mut self, month: YearMonth) -> Vec<Effect> {
        if month == self.selection.displayed_month {
            return Vec::new();
        }
        self.selection.displayed_month = month;
        vec![self.load_month()]
    }

    fn select_date(&mut self, date: DateKey) -> Vec<Effect> {
        if date == self.selection.selected_date {
            return Vec::new();
        }
        self.set_selected_date(date);
        vec![self.load_day()]
    }

    /// The day detail belongs to the old date, so it goes with it.
    fn set_selected_date(&mut self, date: DateKey) {
        if date != self.selection.selected_date {
            self.selection.selected_date = date;
            self.day = None;
        }
    }

    fn set_theme(&mut self, theme: Theme) -> Vec<Effect> {
        if theme == self.selection.theme {
            return Vec::new();
        }
        self.selection.theme = theme;
        vec![Effect::PersistTheme(theme)]
    }

    /// Every remote effect holds the loading flag until its completion message.
    fn track(&mut self, effects: &[Effect]) {
        self.in_flight += effects.iter().filter(|e| e.is_remote()).count();
    }

    fn load_month(&mut self) -> Effect {
        Effect::LoadMonth {
            seq: self.month_seq.issue(),
            month: self.selection.displayed_month,
        }
    }

    fn load_day(&mut self) -> Effect {
        Effect::LoadDay {
            seq: self.day_seq.issue(),
            date: self.selection.selected_date,
        }
    }

    fn finish(&mut self) {
        self.in_flight = self.in_flight.saturating_sub(1);
    }

    fn month_loaded(
        &mut self,
        seq: u64,
        month: YearMonth,
        result: Result<Vec<(DateKey, DaySummary)>, RemoteError>,
    ) {
        self.finish();
        if !self.month_seq.is_current(seq) {
            log::debug!("Discarding superseded month data for {}-{}", month.year(), month.month());
            return;
        }
        match result {
            Ok(entries) => {
                self.month = MonthAggregate::from_entries(month, entries);
                log::debug!(
                    "Loaded {}-{}: {} days with notes",
                    month.year(),
                    month.month(),
                    self.month.len()
                );
            }
            // The previous aggregate stays; it is keyed by full date so it
            // cannot light up cells of the newly displayed month.
            Err(e) => log::error!("get_month_data failed for {}-{}: {}", month.year(), month.month(), e),
        }
    }

    fn day_loaded(&mut self, seq: u64, date: DateKey, result: Result<Vec<DayDetail>, RemoteError>) {
        self.finish();
        if !self.day_seq.is_current(seq) {
            log::debug!("Discarding superseded day data for {}", date);
            return;
        }
        match result {
            Ok(records) => self.day = Some(DayDetail::from_records(records)),
            Err(e) => {
                log::error!("get_day_data failed for {}: {}", date, e);
                self.day = Some(DayDetail::empty());
            }
        }
    }

    fn mutation_finished(
        &mut self,
        mutation: Mutation,
        date: DateKey,
        result: Result<(), RemoteError>,
    ) -> Vec<Effect> {
        self.finish();
        if let Err(e) = result {
            log::error!("{} failed for {}: {}", mutation.operation(), date, e);
            return Vec::new();
        }

        log::info!("{} succeeded for {}", mutation.operation(), date);
        let mut effects = vec![self.load_day()];
        if mutation.refreshes_month() {
            effects.push(self.load_month());
        }
        effects
    }
}
