use skylane_booking::{BookingController, BookingSettings, TicketDesk};
use skylane_client::app_config::{BookingConfig, SearchConfig};
use skylane_client::{AppConfig, FileTokenStore, HttpApiClient};
use skylane_core::{FlightApi, SessionContext, TokenHandle};
use skylane_search::{FeedSettings, FlightResultsFeed, LocationSearch, LocationSearchSettings};
use std::sync::Arc;
use std::time::Duration;

/// Everything a command needs, built once from configuration
pub struct AppState {
    pub config: AppConfig,
    pub client: Arc<HttpApiClient>,
    pub session: Arc<SessionContext>,
}

impl AppState {
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let token = TokenHandle::new();
        let client = Arc::new(HttpApiClient::new(&config.api, token.clone())?);
        let store = Arc::new(FileTokenStore::new(&config.session.token_path));
        let session = Arc::new(SessionContext::new(client.clone(), store, token));

        Ok(Self { config, client, session })
    }

    pub fn flights(&self) -> Arc<dyn FlightApi> {
        self.client.clone()
    }

    pub fn location_search(&self) -> LocationSearch {
        LocationSearch::new(self.flights(), location_settings(&self.config.search))
    }

    pub fn results_feed(&self) -> FlightResultsFeed {
        FlightResultsFeed::new(self.flights(), feed_settings(&self.config.search))
    }

    pub fn booking(&self) -> BookingController {
        BookingController::new(self.client.clone(), booking_settings(&self.config.booking))
    }

    pub fn ticket_desk(&self) -> TicketDesk {
        TicketDesk::new(self.client.clone(), self.session.clone())
    }
}

fn location_settings(config: &SearchConfig) -> LocationSearchSettings {
    LocationSearchSettings {
        debounce: Duration::from_millis(config.debounce_ms),
        min_query_chars: config.min_query_chars,
    }
}

fn feed_settings(config: &SearchConfig) -> FeedSettings {
    FeedSettings {
        page_size: config.page_size,
        scroll_threshold_px: config.scroll_threshold_px,
    }
}

fn booking_settings(config: &BookingConfig) -> BookingSettings {
    BookingSettings {
        submit_timeout: Duration::from_millis(config.submit_timeout_ms),
        redirect_delay: Duration::from_millis(config.redirect_delay_ms),
        default_area_code: config.default_area_code.clone(),
    }
}
