use async_trait::async_trait;
use chrono::NaiveDate;
use skylane_core::{ApiError, ApiResult, FlightApi, PageRequest, SearchQuery};
use skylane_shared::{
    FlightMenu, FlightPage, FlightStatus, FlightSummary, LocationId, LocationKind, LocationSuggestion,
    PriceTiers,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicI64, AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

pub(crate) fn flight(id: i64) -> FlightSummary {
    FlightSummary {
        id: Some(id),
        flight_number: format!("SK{}", id),
        airline: Some("Skylane".to_string()),
        origin_airport: "JFK".to_string(),
        destination_airport: "LAX".to_string(),
        origin_city: None,
        destination_city: None,
        date: NaiveDate::from_ymd_opt(2025, 6, 1),
        scheduled_departure: None,
        scheduled_arrival: None,
        status: FlightStatus::Scheduled,
        gate_number: None,
        prices: PriceTiers::default(),
    }
}

fn suggestion_for(term: &str) -> LocationSuggestion {
    LocationSuggestion {
        kind: LocationKind::City,
        id: LocationId::Numeric(term.len() as i64),
        name: term.to_string(),
        display_name: format!("{}, Testland", term),
        country: Some("Testland".to_string()),
        country_code: Some("TST".to_string()),
        iata_code: None,
        city: None,
    }
}

/// Scriptable flight API with per-call delays, for exercising ordering under paused time
#[derive(Default)]
pub(crate) struct MockFlightApi {
    location_delays: HashMap<String, Duration>,
    failing_terms: Vec<String>,
    pub location_calls: Mutex<Vec<String>>,
    search_pages: Mutex<VecDeque<FlightPage>>,
    pub search_calls: Mutex<Vec<(SearchQuery, PageRequest)>>,
    pub random_calls: AtomicUsize,
    pub listing_calls: AtomicUsize,
    random_delay: Duration,
    search_delay: Duration,
    random_batch: usize,
    next_id: AtomicI64,
}

impl MockFlightApi {
    pub fn new() -> Self {
        Self { random_batch: 3, next_id: AtomicI64::new(1), ..Default::default() }
    }

    pub fn location_delay(mut self, term: &str, delay: Duration) -> Self {
        self.location_delays.insert(term.to_string(), delay);
        self
    }

    pub fn failing_term(mut self, term: &str) -> Self {
        self.failing_terms.push(term.to_string());
        self
    }

    pub fn search_page(self, ids: &[i64], has_next: bool) -> Self {
        self.search_pages.lock().unwrap().push_back(FlightPage {
            results: ids.iter().map(|id| flight(*id)).collect(),
            has_next,
            page: None,
            total: None,
        });
        self
    }

    pub fn random_batch(mut self, size: usize) -> Self {
        self.random_batch = size;
        self
    }

    pub fn random_delay(mut self, delay: Duration) -> Self {
        self.random_delay = delay;
        self
    }

    pub fn search_delay(mut self, delay: Duration) -> Self {
        self.search_delay = delay;
        self
    }

    pub fn search_call_count(&self) -> usize {
        self.search_calls.lock().unwrap().len()
    }
}

#[async_trait]
impl FlightApi for MockFlightApi {
    async fn flight_menu(&self) -> ApiResult<FlightMenu> {
        Err(ApiError::Server { status: 501 })
    }

    async fn list_flights(&self, _date: NaiveDate, _departure: &str, _arrival: &str) -> ApiResult<Vec<FlightSummary>> {
        self.listing_calls.fetch_add(1, Ordering::SeqCst);
        Ok(vec![flight(900)])
    }

    async fn flight_detail(&self, flight_id: i64) -> ApiResult<FlightSummary> {
        Ok(flight(flight_id))
    }

    async fn search_locations(&self, term: &str) -> ApiResult<Vec<LocationSuggestion>> {
        self.location_calls.lock().unwrap().push(term.to_string());
        if let Some(delay) = self.location_delays.get(term) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing_terms.iter().any(|t| t == term) {
            return Err(ApiError::Transport("connection reset".to_string()));
        }
        Ok(vec![suggestion_for(term)])
    }

    async fn search_flights(&self, query: &SearchQuery, page: PageRequest) -> ApiResult<FlightPage> {
        self.search_calls.lock().unwrap().push((query.clone(), page));
        tokio::time::sleep(self.search_delay).await;
        Ok(self.search_pages.lock().unwrap().pop_front().unwrap_or_default())
    }

    async fn random_flights(&self, page_size: u32) -> ApiResult<Vec<FlightSummary>> {
        self.random_calls.fetch_add(1, Ordering::SeqCst);
        tokio::time::sleep(self.random_delay).await;
        let count = self.random_batch.min(page_size as usize);
        Ok((0..count)
            .map(|_| flight(1000 + self.next_id.fetch_add(1, Ordering::SeqCst)))
            .collect())
    }
}
