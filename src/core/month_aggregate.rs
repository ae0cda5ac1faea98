use std::collections::HashMap;

use super::date_key::{DateKey, YearMonth};
use super::day_detail::DaySummary;
use super::note::{Note, open_count};

/// Note summaries for every day of one month, keyed by day.
///
/// Always replaced as a whole value so readers never see a half-applied load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MonthAggregate {
    month: YearMonth,
    days: HashMap<DateKey, Vec<Note>>,
}

impl MonthAggregate {
    pub fn empty(month: YearMonth) -> Self {
        Self {
            month,
            days: HashMap::new(),
        }
    }

    /// Build from a `get_month_data` response. Entries outside `month` are dropped.
    pub fn from_entries(month: YearMonth, entries: Vec<(DateKey, DaySummary)>) -> Self {
        let mut days = HashMap::with_capacity(entries.len());
        for (date, summary) in entries {
            if !month.contains(date) {
                log::warn!(
                    "Dropping {} from month data for {}-{}",
                    date,
                    month.year(),
                    month.month()
                );
                continue;
            }
            days.entry(date)
                .or_insert_with(Vec::new)
                .extend(summary.notes);
        }
        Self { month, days }
    }

    pub fn month(&self) -> YearMonth {
        self.month
    }

    pub fn notes_for(&self, date: DateKey) -> &[Note] {
        self.days.get(&date).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Open notes on `date`; 0 for days without an entry.
    pub fn indicator_count(&self, date: DateKey) -> usize {
        open_count(self.notes_for(date))
    }

    /// Days with at least one open note, in calendar order.
    pub fn busy_days(&self) -> Vec<DateKey> {
        let mut days: Vec<DateKey> = self
            .days
            .iter()
            .filter(|(_, notes)| open_count(notes) > 0)
            .map(|(date, _)| *date)
            .collect();
        days.sort();
        days
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> DateKey {
        DateKey::new(2024, 2, d).unwrap()
    }

    fn feb_2024() -> MonthAggregate {
        let month = YearMonth::new(2024, 2).unwrap();
        MonthAggregate::from_entries(
            month,
            vec![(
                day(15),
                DaySummary {
                    notes: vec![Note::new(1, "Dentist"), Note::new(2, "Taxes").completed()],
                },
            )],
        )
    }

    #[test]
    fn leap_february_indicator_counts() {
        let cache = feb_2024();
        assert_eq!(cache.indicator_count(day(15)), 1);
        for d in (1..=29).filter(|d| *d != 15) {
            assert_eq!(cache.indicator_count(day(d)), 0, "day {}", d);
        }
    }

    #[test]
    fn adjoining_month_days_count_zero() {
        let cache = feb_2024();
        assert_eq!(cache.indicator_count(DateKey::new(2024, 1, 31).unwrap()), 0);
        assert_eq!(cache.indicator_count(DateKey::new(2024, 3, 15).unwrap()), 0);
    }

    #[test]
    fn out_of_month_entries_are_dropped() {
        let month = YearMonth::new(2024, 2).unwrap();
        let cache = MonthAggregate::from_entries(
            month,
            vec![
                (DateKey::new(2024, 3, 1).unwrap(), DaySummary { notes: vec![Note::new(9, "x")] }),
                (day(1), DaySummary { notes: vec![Note::new(1, "y")] }),
            ],
        );
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.indicator_count(DateKey::new(2024, 3, 1).unwrap()), 0);
        assert_eq!(cache.busy_days(), vec![day(1)]);

        let only_outside = MonthAggregate::from_entries(
            month,
            vec![(DateKey::new(2024, 1, 31).unwrap(), DaySummary { notes: vec![Note::new(2, "z")] })],
        );
        assert!(only_outside.is_empty());
    }

    #[test]
    fn fully_completed_day_is_not_busy() {
        let month = YearMonth::new(2024, 2).unwrap();
        let cache = MonthAggregate::from_entries(
            month,
            vec![(day(3), DaySummary { notes: vec![Note::new(1, "done").completed()] })],
        );
        assert_eq!(cache.notes_for(day(3)).len(), 1);
        assert!(cache.busy_days().is_empty());
    }
}
