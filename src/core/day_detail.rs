use serde::{Deserialize, Deserializer, Serialize};

use super::note::{Note, open_count};

/// A historical event the service fetched for a calendar day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OnThisDayFact {
    pub title: String,
    pub year: i32,
    pub wiki_link: String,
}

/// Everything shown for the selected day.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayDetail {
    #[serde(default)]
    pub notes: Vec<Note>,
    #[serde(default, deserialize_with = "optional_fact")]
    pub on_this_day: Option<OnThisDayFact>,
}

impl DayDetail {
    /// The state for a day with no record, and the state after a failed load.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.notes.is_empty() && self.on_this_day.is_none()
    }

    pub fn has_on_this_day(&self) -> bool {
        self.on_this_day.is_some()
    }

    pub fn open_notes(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter().filter(|n| !n.is_completed)
    }

    pub fn completed_notes(&self) -> impl Iterator<Item = &Note> {
        self.notes.iter().filter(|n| n.is_completed)
    }

    pub fn open_count(&self) -> usize {
        open_count(&self.notes)
    }

    /// Collapse a `get_day_data` response, where an empty list means "no record yet".
    pub fn from_records(records: Vec<DayDetail>) -> Self {
        records.into_iter().next().unwrap_or_default()
    }
}

/// Per-day value of a month aggregate response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DaySummary {
    #[serde(default)]
    pub notes: Vec<Note>,
}

/// Accepts `null`, a bare object, `[]` or `[object]`; the service encodes
/// optional values as zero-or-one element arrays.
fn optional_fact<'de, D>(deserializer: D) -> Result<Option<OnThisDayFact>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Wire {
        One(OnThisDayFact),
        Many(Vec<OnThisDayFact>),
    }

    Ok(match Option::<Wire>::deserialize(deserializer)? {
        None => None,
        Some(Wire::One(fact)) => Some(fact),
        Some(Wire::Many(facts)) => facts.into_iter().next(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const FACT: &str =
        r#"{"title": "Leap day", "year": 1288, "wiki_link": "https://en.wikipedia.org/wiki/February_29"}"#;

    #[test]
    fn no_record_is_empty_detail() {
        let detail = DayDetail::from_records(Vec::new());
        assert_eq!(detail, DayDetail::empty());
        assert!(detail.notes.is_empty());
        assert!(detail.on_this_day.is_none());
    }

    #[test]
    fn on_this_day_accepts_every_optional_encoding() {
        let null: DayDetail = serde_json::from_str(r#"{"notes": [], "on_this_day": null}"#).unwrap();
        let missing: DayDetail = serde_json::from_str(r#"{"notes": []}"#).unwrap();
        let empty: DayDetail = serde_json::from_str(r#"{"notes": [], "on_this_day": []}"#).unwrap();
        assert!(null.on_this_day.is_none());
        assert!(missing.on_this_day.is_none());
        assert!(empty.on_this_day.is_none());

        let bare: DayDetail =
            serde_json::from_str(&format!(r#"{{"notes": [], "on_this_day": {}}}"#, FACT)).unwrap();
        let wrapped: DayDetail =
            serde_json::from_str(&format!(r#"{{"notes": [], "on_this_day": [{}]}}"#, FACT)).unwrap();
        assert_eq!(bare.on_this_day, wrapped.on_this_day);
        assert_eq!(bare.on_this_day.unwrap().year, 1288);
    }

    #[test]
    fn open_and_completed_split() {
        let detail = DayDetail {
            notes: vec![Note::new(1, "a"), Note::new(2, "b").completed()],
            on_this_day: None,
        };
        assert_eq!(detail.open_count(), 1);
        assert_eq!(detail.open_notes().count(), 1);
        assert_eq!(detail.completed_notes().next().unwrap().content, "b");
    }
}
