use chrono::NaiveDate;
use skylane_core::{ApiError, FlightApi, PageRequest, SearchQuery, ValidationError};
use skylane_shared::{FlightPage, FlightSummary};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::sequence::RequestSequence;

#[derive(Debug, Clone)]
pub struct FeedSettings {
    pub page_size: u32,
    /// Distance from the bottom of the list, in pixels, at which the next page is fetched
    pub scroll_threshold_px: u32,
}

impl Default for FeedSettings {
    fn default() -> Self {
        Self {
            page_size: 10,
            scroll_threshold_px: 1000,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedMode {
    Discovery,
    Search(SearchQuery),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FeedNotice {
    NoFlightsFound,
    EndOfResults,
    Validation(String),
    Error(String),
}

impl FeedNotice {
    /// Informational notices are styled differently from failures
    pub fn is_error(&self) -> bool {
        matches!(self, FeedNotice::Validation(_) | FeedNotice::Error(_))
    }

    pub fn message(&self) -> &str {
        match self {
            FeedNotice::NoFlightsFound => "No flights found for your search.",
            FeedNotice::EndOfResults => "You've reached the end of the results.",
            FeedNotice::Validation(m) | FeedNotice::Error(m) => m,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    Loaded(usize),
    /// A fetch was already running or there is nothing more to fetch
    Skipped,
    /// The feed was reset while this fetch was running; its result was dropped
    Stale,
    Failed(String),
}

#[derive(Debug, Clone, Copy, Default)]
pub struct ScrollMetrics {
    pub scroll_top: u32,
    pub viewport_height: u32,
    pub content_height: u32,
}

impl ScrollMetrics {
    pub fn near_bottom(&self, threshold_px: u32) -> bool {
        let reached = u64::from(self.scroll_top) + u64::from(self.viewport_height) + u64::from(threshold_px);
        reached >= u64::from(self.content_height)
    }
}

#[derive(Debug, Error)]
pub enum FeedError {
    #[error(transparent)]
    Validation(#[from] ValidationError),
    #[error(transparent)]
    Api(#[from] ApiError),
}

impl FeedError {
    pub fn user_message(&self) -> String {
        match self {
            FeedError::Validation(e) => e.message.clone(),
            FeedError::Api(e) => e.user_message(),
        }
    }
}

struct FeedState {
    mode: FeedMode,
    flights: Vec<FlightSummary>,
    cursor: PageRequest,
    has_more: bool,
    in_flight: bool,
    sequence: RequestSequence,
    notice: Option<FeedNotice>,
}

impl FeedState {
    fn fresh(mode: FeedMode, page_size: u32) -> Self {
        Self {
            mode,
            flights: Vec::new(),
            cursor: PageRequest::first(page_size),
            has_more: true,
            in_flight: false,
            sequence: RequestSequence::new(),
            notice: None,
        }
    }

    /// Switch modes, dropping whatever the previous mode had loaded or had in flight
    fn reset(&mut self, mode: FeedMode, page_size: u32) {
        self.mode = mode;
        self.flights.clear();
        self.cursor = PageRequest::first(page_size);
        self.has_more = true;
        self.in_flight = false;
        self.sequence.invalidate();
        self.notice = None;
    }
}

/// Infinite-scroll flight list, either a random discovery feed or paged search results
pub struct FlightResultsFeed {
    api: Arc<dyn FlightApi>,
    settings: FeedSettings,
    state: Mutex<FeedState>,
}

impl FlightResultsFeed {
    /// Starts in discovery mode with nothing loaded
    pub fn new(api: Arc<dyn FlightApi>, settings: FeedSettings) -> Self {
        let state = FeedState::fresh(FeedMode::Discovery, settings.page_size);
        Self {
            api,
            settings,
            state: Mutex::new(state),
        }
    }

    /// Fetch the next page for the current mode. At most one fetch runs at a time.
    pub async fn load_more(&self) -> LoadOutcome {
        let (token, mode, page) = {
            let mut state = self.state.lock().await;
            if state.in_flight || !state.has_more {
                return LoadOutcome::Skipped;
            }
            state.in_flight = true;
            (state.sequence.issue(), state.mode.clone(), state.cursor)
        };

        let result = match &mode {
            FeedMode::Discovery => self.api.random_flights(page.page_size).await.map(|results| FlightPage {
                has_next: !results.is_empty(),
                results,
                page: None,
                total: None,
            }),
            FeedMode::Search(query) => self.api.search_flights(query, page).await,
        };

        let mut state = self.state.lock().await;
        if !state.sequence.is_current(token) {
            debug!("Dropping page {} fetched for a previous feed mode", page.page);
            return LoadOutcome::Stale;
        }
        state.in_flight = false;

        match result {
            Ok(fetched) => {
                let count = fetched.results.len();
                state.flights.extend(fetched.results);
                state.has_more = fetched.has_next;
                state.cursor = page.next();
                state.notice = if state.flights.is_empty() {
                    Some(FeedNotice::NoFlightsFound)
                } else if !state.has_more && matches!(state.mode, FeedMode::Search(_)) {
                    Some(FeedNotice::EndOfResults)
                } else {
                    None
                };
                info!("Loaded {} flights (page {}), {} shown", count, page.page, state.flights.len());
                LoadOutcome::Loaded(count)
            }
            Err(e) => {
                warn!("Failed to load flights page {}: {}", page.page, e);
                let message = e.user_message();
                state.notice = Some(FeedNotice::Error(message.clone()));
                LoadOutcome::Failed(message)
            }
        }
    }

    /// Switch to search mode and fetch the first page. Invalid queries never reach the API.
    pub async fn search(&self, query: SearchQuery) -> Result<LoadOutcome, FeedError> {
        if let Err(e) = query.validate() {
            self.state.lock().await.notice = Some(FeedNotice::Validation(e.message.clone()));
            return Err(e.into());
        }

        info!("Searching flights {} -> {}", query.origin_term(), query.destination_term());
        self.state
            .lock()
            .await
            .reset(FeedMode::Search(query), self.settings.page_size);
        Ok(self.load_more().await)
    }

    /// Go back to the random feed. Nothing is fetched until the next `load_more`.
    pub async fn reset_to_discovery(&self) {
        self.state
            .lock()
            .await
            .reset(FeedMode::Discovery, self.settings.page_size);
    }

    /// Fetch the next page if the viewport is close enough to the bottom
    pub async fn on_scroll(&self, metrics: ScrollMetrics) -> Option<LoadOutcome> {
        if !metrics.near_bottom(self.settings.scroll_threshold_px) {
            return None;
        }
        Some(self.load_more().await)
    }

    pub async fn flights(&self) -> Vec<FlightSummary> {
        self.state.lock().await.flights.clone()
    }

    pub async fn notice(&self) -> Option<FeedNotice> {
        self.state.lock().await.notice.clone()
    }

    pub async fn mode(&self) -> FeedMode {
        self.state.lock().await.mode.clone()
    }

    pub async fn has_more(&self) -> bool {
        self.state.lock().await.has_more
    }

    pub async fn is_loading(&self) -> bool {
        self.state.lock().await.in_flight
    }
}

/// Flights on a single date between two locations, validated like a search
pub async fn list_flights_on(
    api: &dyn FlightApi,
    date: NaiveDate,
    departure: &str,
    arrival: &str,
) -> Result<Vec<FlightSummary>, FeedError> {
    let query = SearchQuery::new(departure, arrival).with_dates(Some(date), Some(date));
    query.validate()?;
    let flights = api
        .list_flights(date, query.origin_term(), query.destination_term())
        .await?;
    info!("{} flights on {} from {} to {}", flights.len(), date, query.origin_term(), query.destination_term());
    Ok(flights)
}
