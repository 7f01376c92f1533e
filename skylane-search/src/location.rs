use skylane_core::{DateRange, FlightApi, SearchQuery};
use skylane_shared::LocationSuggestion;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, warn};

use crate::sequence::{RequestSequence, SequenceToken};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocationField {
    Origin,
    Destination,
}

#[derive(Debug, Clone)]
pub struct LocationSearchSettings {
    pub debounce: Duration,
    /// Trimmed inputs shorter than this clear the list instead of querying
    pub min_query_chars: usize,
}

impl Default for LocationSearchSettings {
    fn default() -> Self {
        Self {
            debounce: Duration::from_millis(300),
            min_query_chars: 2,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LookupOutcome {
    /// Suggestions replaced with this many entries
    Applied(usize),
    Cleared,
    /// A newer input (or a selection) took over before this lookup finished
    Superseded,
    Failed(String),
}

#[derive(Default)]
struct FieldState {
    text: String,
    suggestions: Vec<LocationSuggestion>,
    sequence: RequestSequence,
}

#[derive(Default)]
struct State {
    origin: FieldState,
    destination: FieldState,
}

impl State {
    fn field(&self, field: LocationField) -> &FieldState {
        match field {
            LocationField::Origin => &self.origin,
            LocationField::Destination => &self.destination,
        }
    }

    fn field_mut(&mut self, field: LocationField) -> &mut FieldState {
        match field {
            LocationField::Origin => &mut self.origin,
            LocationField::Destination => &mut self.destination,
        }
    }
}

/// Debounced origin/destination autocomplete.
///
/// Each keystroke issues a sequence token for its field. A lookup only runs if its token
/// is still current after the debounce window, and its result is only displayed if the
/// token is still current when the response arrives, so a slow older query can never
/// overwrite a newer one.
pub struct LocationSearch {
    api: Arc<dyn FlightApi>,
    settings: LocationSearchSettings,
    state: Mutex<State>,
}

impl LocationSearch {
    pub fn new(api: Arc<dyn FlightApi>, settings: LocationSearchSettings) -> Self {
        Self {
            api,
            settings,
            state: Mutex::new(State::default()),
        }
    }

    /// Handle a text change on `field`. Resolves once the lookup for this input has
    /// finished or been superseded.
    pub async fn input(&self, field: LocationField, text: &str) -> LookupOutcome {
        let token = {
            let mut state = self.state.lock().await;
            let slot = state.field_mut(field);
            slot.text = text.to_string();
            slot.sequence.issue()
        };

        let term = text.trim();
        if term.chars().count() < self.settings.min_query_chars {
            let mut state = self.state.lock().await;
            let slot = state.field_mut(field);
            if slot.sequence.is_current(token) {
                slot.suggestions.clear();
            }
            return LookupOutcome::Cleared;
        }

        tokio::time::sleep(self.settings.debounce).await;
        if !self.is_current(field, token).await {
            return LookupOutcome::Superseded;
        }

        let result = self.api.search_locations(term).await;

        let mut state = self.state.lock().await;
        let slot = state.field_mut(field);
        if !slot.sequence.is_current(token) {
            debug!("Discarding stale {:?} suggestions for '{}'", field, term);
            return LookupOutcome::Superseded;
        }

        match result {
            Ok(suggestions) => {
                let count = suggestions.len();
                slot.suggestions = suggestions;
                LookupOutcome::Applied(count)
            }
            Err(e) => {
                warn!("Location lookup for '{}' failed: {}", term, e);
                slot.suggestions.clear();
                LookupOutcome::Failed(e.user_message())
            }
        }
    }

    /// Replace the input with the suggestion's canonical display string
    pub async fn select(&self, field: LocationField, suggestion: &LocationSuggestion) {
        let mut state = self.state.lock().await;
        let slot = state.field_mut(field);
        slot.text = suggestion.display_name.clone();
        slot.suggestions.clear();
        slot.sequence.invalidate();
    }

    pub async fn swap(&self) {
        let mut state = self.state.lock().await;
        let State { origin, destination } = &mut *state;
        std::mem::swap(&mut origin.text, &mut destination.text);
        for slot in [origin, destination] {
            slot.suggestions.clear();
            slot.sequence.invalidate();
        }
    }

    pub async fn clear(&self, field: LocationField) {
        let mut state = self.state.lock().await;
        let slot = state.field_mut(field);
        slot.text.clear();
        slot.suggestions.clear();
        slot.sequence.invalidate();
    }

    pub async fn text(&self, field: LocationField) -> String {
        self.state.lock().await.field(field).text.clone()
    }

    pub async fn suggestions(&self, field: LocationField) -> Vec<LocationSuggestion> {
        self.state.lock().await.field(field).suggestions.clone()
    }

    /// Build the flight search query from the current inputs
    pub async fn query(&self, date_range: DateRange) -> SearchQuery {
        let state = self.state.lock().await;
        SearchQuery {
            origin: state.origin.text.clone(),
            destination: state.destination.text.clone(),
            date_range,
        }
    }

    async fn is_current(&self, field: LocationField, token: SequenceToken) -> bool {
        self.state.lock().await.field(field).sequence.is_current(token)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::MockFlightApi;

    fn search_with(api: MockFlightApi) -> (Arc<LocationSearch>, Arc<MockFlightApi>) {
        let api = Arc::new(api);
        let search = Arc::new(LocationSearch::new(api.clone(), LocationSearchSettings::default()));
        (search, api)
    }

    #[tokio::test(start_paused = true)]
    async fn test_late_stale_response_does_not_overwrite_newer_query() {
        let (search, api) = search_with(
            MockFlightApi::new()
                .location_delay("Lon", Duration::from_millis(500))
                .location_delay("Lond", Duration::from_millis(10)),
        );

        let first = {
            let s = search.clone();
            tokio::spawn(async move { s.input(LocationField::Origin, "Lon").await })
        };
        // Let the first lookup get past its debounce and onto the wire
        tokio::time::sleep(Duration::from_millis(350)).await;
        let second = {
            let s = search.clone();
            tokio::spawn(async move { s.input(LocationField::Origin, "Lond").await })
        };

        assert_eq!(second.await.unwrap(), LookupOutcome::Applied(1));
        assert_eq!(first.await.unwrap(), LookupOutcome::Superseded);

        // Both requests really overlapped
        assert_eq!(*api.location_calls.lock().unwrap(), vec!["Lon", "Lond"]);
        let shown = search.suggestions(LocationField::Origin).await;
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].name, "Lond");
    }

    #[tokio::test(start_paused = true)]
    async fn test_debounce_coalesces_rapid_typing() {
        let (search, api) = search_with(MockFlightApi::new());

        let mut handles = Vec::new();
        for text in ["Pa", "Par", "Pari"] {
            let s = search.clone();
            handles.push(tokio::spawn(async move { s.input(LocationField::Destination, text).await }));
            tokio::time::sleep(Duration::from_millis(100)).await;
        }

        let mut outcomes = Vec::new();
        for handle in handles {
            outcomes.push(handle.await.unwrap());
        }

        assert_eq!(
            outcomes,
            vec![LookupOutcome::Superseded, LookupOutcome::Superseded, LookupOutcome::Applied(1)]
        );
        assert_eq!(*api.location_calls.lock().unwrap(), vec!["Pari"]);
    }

    #[tokio::test(start_paused = true)]
    async fn test_short_input_clears_without_request() {
        let (search, api) = search_with(MockFlightApi::new());
        assert_eq!(search.input(LocationField::Origin, "Rome").await, LookupOutcome::Applied(1));

        assert_eq!(search.input(LocationField::Origin, " R ").await, LookupOutcome::Cleared);
        assert!(search.suggestions(LocationField::Origin).await.is_empty());
        assert_eq!(api.location_calls.lock().unwrap().len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_selection_wins_over_in_flight_lookup() {
        let (search, _api) = search_with(
            MockFlightApi::new().location_delay("Ber", Duration::from_millis(200)),
        );
        assert_eq!(search.input(LocationField::Origin, "Berl").await, LookupOutcome::Applied(1));
        let picked = search.suggestions(LocationField::Origin).await[0].clone();

        let pending = {
            let s = search.clone();
            tokio::spawn(async move { s.input(LocationField::Origin, "Ber").await })
        };
        tokio::time::sleep(Duration::from_millis(400)).await;
        search.select(LocationField::Origin, &picked).await;

        assert_eq!(pending.await.unwrap(), LookupOutcome::Superseded);
        assert_eq!(search.text(LocationField::Origin).await, "Berl, Testland");
        assert!(search.suggestions(LocationField::Origin).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_lookup_clears_suggestions() {
        let (search, _api) = search_with(MockFlightApi::new().failing_term("Osl"));
        search.input(LocationField::Origin, "Oslo").await;
        assert_eq!(search.suggestions(LocationField::Origin).await.len(), 1);

        let outcome = search.input(LocationField::Origin, "Osl").await;
        assert!(matches!(outcome, LookupOutcome::Failed(_)));
        assert!(search.suggestions(LocationField::Origin).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_swap_and_query() {
        let (search, _api) = search_with(MockFlightApi::new());
        search.input(LocationField::Origin, "Madrid").await;
        search.input(LocationField::Destination, "Lisbon").await;

        search.swap().await;
        assert!(search.suggestions(LocationField::Origin).await.is_empty());

        let query = search.query(DateRange::default()).await;
        assert_eq!(query.origin, "Lisbon");
        assert_eq!(query.destination, "Madrid");
    }
}
