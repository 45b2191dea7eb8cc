use chrono::{Days, NaiveDateTime, NaiveTime};

use super::{
    Address, AttendanceRecord, DisciplinaryAction, HealthSafetyRecord, StudentBehavior, Term,
};

/// Returns the calendar day containing `now` as a half-open window
/// `[00:00, next day 00:00)`.
///
/// The upper bound is exclusive so no instant of the day, sub-millisecond
/// ones included, falls between two windows.
pub fn day_window(now: NaiveDateTime) -> (NaiveDateTime, NaiveDateTime) {
    let start = now.date().and_time(NaiveTime::MIN);
    let end = start
        .checked_add_days(Days::new(1))
        .unwrap_or(NaiveDateTime::MAX);
    (start, end)
}

/// Case-insensitive substring match.
pub fn contains_ignore_case(haystack: &str, needle: &str) -> bool {
    haystack.to_lowercase().contains(&needle.to_lowercase())
}

/// Records that can be matched by a free-text list search.
///
/// A record matches when any of its searchable fields contains the needle.
pub trait Searchable {
    /// Text fields inspected by a search.
    fn search_fields(&self) -> Vec<&str>;

    fn matches_search(&self, needle: &str) -> bool {
        self.search_fields()
            .into_iter()
            .any(|field| contains_ignore_case(field, needle))
    }
}

impl Searchable for AttendanceRecord {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.status.as_str()];
        fields.extend(self.absence_reason.as_deref());
        fields
    }
}

impl Searchable for HealthSafetyRecord {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.emergency_contact_name.as_str()];
        fields.extend(self.allergies.iter().map(String::as_str));
        fields.extend(self.medical_conditions.iter().map(String::as_str));
        fields.extend(self.notes.as_deref());
        fields
    }
}

impl Searchable for DisciplinaryAction {
    fn search_fields(&self) -> Vec<&str> {
        let mut fields = vec![self.action.as_str(), self.reason.as_str(), self.status.as_str()];
        fields.extend(self.remarks.as_deref());
        fields
    }
}

impl Searchable for StudentBehavior {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.behavior_type.as_str(), self.description.as_str()]
    }
}

impl Searchable for Term {
    fn search_fields(&self) -> Vec<&str> {
        vec![self.name.as_str()]
    }
}

impl Searchable for Address {
    fn search_fields(&self) -> Vec<&str> {
        vec![
            self.street.as_str(),
            self.city.as_str(),
            self.state.as_str(),
            self.country.as_str(),
        ]
    }
}
