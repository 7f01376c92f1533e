use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    City,
    Airport,
}

/// Cities are keyed by a numeric id, airports by their IATA code
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LocationId {
    Numeric(i64),
    Code(String),
}

/// Ranked autocomplete entry from the location search endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationSuggestion {
    #[serde(rename = "type")]
    pub kind: LocationKind,
    pub id: LocationId,
    pub name: String,
    pub display_name: String,
    #[serde(default)]
    pub country: Option<String>,
    #[serde(default)]
    pub country_code: Option<String>,
    #[serde(default)]
    pub iata_code: Option<String>,
    #[serde(default)]
    pub city: Option<String>,
}

impl LocationSuggestion {
    pub fn search_name(&self) -> &str {
        location_name(&self.display_name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationResults {
    pub results: Vec<LocationSuggestion>,
}

/// Reduce a canonical display string to the term the flight search matches on:
/// `"Heathrow Airport (LHR)"` becomes `"Heathrow Airport"`, `"Paris, France"` becomes `"Paris"`.
pub fn location_name(display: &str) -> &str {
    let before_paren = display.split('(').next().unwrap_or(display);
    before_paren.split(',').next().unwrap_or(before_paren).trim()
}
