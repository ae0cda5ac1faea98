use super::date_key::{DateKey, YearMonth};
use super::month_aggregate::MonthAggregate;

pub const WEEKDAY_LABELS: [&str; 7] = ["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"];

/// One cell of the month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayCell {
    /// Leading blank before the 1st; carries no day and cannot be selected.
    Padding,
    Day {
        day: u32,
        date: DateKey,
        is_today: bool,
        is_selected: bool,
        is_past: bool,
        indicator_count: usize,
    },
}

impl DayCell {
    pub fn date(&self) -> Option<DateKey> {
        match self {
            Self::Padding => None,
            Self::Day { date, .. } => Some(*date),
        }
    }

    pub fn is_selectable(&self) -> bool {
        matches!(self, Self::Day { .. })
    }
}

/// Lay out `month` Sunday-first against `cache`.
///
/// Pure: the result depends only on the arguments, `today` included.
pub fn build_grid(
    month: YearMonth,
    selected: DateKey,
    cache: &MonthAggregate,
    today: DateKey,
) -> Vec<DayCell> {
    let padding = month.first_day().weekday_from_sunday() as usize;
    let mut cells = Vec::with_capacity(padding + month.days() as usize);
    cells.extend(std::iter::repeat_n(DayCell::Padding, padding));

    for date in month.iter_days() {
        cells.push(DayCell::Day {
            day: date.day(),
            date,
            is_today: date == today,
            is_selected: date == selected,
            is_past: date < today,
            indicator_count: cache.indicator_count(date),
        });
    }

    cells
}

/// Split cells into rows of seven; the last row may be short.
pub fn weeks(cells: &[DayCell]) -> impl Iterator<Item = &[DayCell]> {
    cells.chunks(7)
}
