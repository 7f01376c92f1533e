use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use skylane_shared::location_name;

use crate::ValidationError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DateRange {
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl DateRange {
    pub fn single(date: NaiveDate) -> Self {
        Self { start: Some(date), end: Some(date) }
    }

    pub fn label(&self) -> String {
        match (self.start, self.end) {
            (None, None) => "Select dates".to_string(),
            (Some(start), None) => format!("From {}", start),
            (None, Some(end)) => format!("Until {}", end),
            (Some(start), Some(end)) => format!("{} - {}", start, end),
        }
    }
}

/// Origin/destination filter for the flight search. Origin and destination hold what the
/// user typed or picked (canonical display strings are fine); the search terms sent to
/// the API are extracted from them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchQuery {
    pub origin: String,
    pub destination: String,
    #[serde(default)]
    pub date_range: DateRange,
}

impl SearchQuery {
    pub fn new(origin: impl Into<String>, destination: impl Into<String>) -> Self {
        Self {
            origin: origin.into(),
            destination: destination.into(),
            date_range: DateRange::default(),
        }
    }

    pub fn with_dates(mut self, start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        self.date_range = DateRange { start, end };
        self
    }

    pub fn origin_term(&self) -> &str {
        location_name(&self.origin)
    }

    pub fn destination_term(&self) -> &str {
        location_name(&self.destination)
    }

    /// Local checks run before any request is issued
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.origin_term().is_empty() {
            return Err(ValidationError::missing("origin"));
        }
        if self.destination_term().is_empty() {
            return Err(ValidationError::missing("destination"));
        }
        if self.origin_term().eq_ignore_ascii_case(self.destination_term()) {
            return Err(ValidationError::new(
                "destination",
                "Departure and arrival cities cannot be the same.",
            ));
        }
        if let (Some(start), Some(end)) = (self.date_range.start, self.date_range.end) {
            if start > end {
                return Err(ValidationError::new(
                    "date_range",
                    "The start date must not be after the end date.",
                ));
            }
        }
        Ok(())
    }
}

/// 1-based page cursor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRequest {
    pub page: u32,
    pub page_size: u32,
}

impl PageRequest {
    pub fn first(page_size: u32) -> Self {
        Self { page: 1, page_size }
    }

    pub fn next(self) -> Self {
        Self { page: self.page + 1, ..self }
    }
}
