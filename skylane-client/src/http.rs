use async_trait::async_trait;
use chrono::NaiveDate;
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde_json::Value;
use skylane_core::{
    ApiError, ApiResult, AuthApi, FlightApi, PageRequest, SearchQuery, TicketApi, TokenHandle,
};
use skylane_shared::{
    ActionReceipt, AuthTokens, CreateTicketRequest, FlightMenu, FlightPage, FlightSummary,
    LocationResults, LocationSuggestion, LoginRequest, PaymentRequest, ProfileUpdate, TicketRecord,
    UserProfile,
};
use tracing::{debug, info, warn};

use crate::app_config::ApiConfig;
use crate::ClientError;

/// REST transport for the airline API. Attaches the session's bearer token to every
/// request when one is present.
#[derive(Clone)]
pub struct HttpApiClient {
    client: Client,
    base: Url,
    token: TokenHandle,
    timeout_ms: u64,
}

impl HttpApiClient {
    pub fn new(config: &ApiConfig, token: TokenHandle) -> Result<Self, ClientError> {
        let base = Url::parse(&config.base_url)
            .ok()
            .filter(|url| matches!(url.scheme(), "http" | "https") && !url.cannot_be_a_base())
            .ok_or_else(|| ClientError::InvalidBaseUrl(config.base_url.clone()))?;

        let client = Client::builder()
            .timeout(config.request_timeout())
            .build()
            .map_err(|e| ClientError::Build(e.to_string()))?;

        Ok(Self {
            client,
            base,
            token,
            timeout_ms: config.request_timeout_ms,
        })
    }

    /// Path under the base URL with a trailing slash. Segments are percent-encoded, so
    /// caller-supplied identifiers cannot escape their position in the route.
    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.base.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments).push("");
        }
        url
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> ApiResult<T> {
        let request = match self.token.get().await {
            Some(token) => request.bearer_auth(token),
            None => request,
        };

        let response = request.send().await.map_err(|e| {
            if e.is_timeout() {
                ApiError::Timeout(self.timeout_ms)
            } else {
                ApiError::Transport(e.to_string())
            }
        })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| ApiError::Transport(e.to_string()))?;
        debug!("{} {}", status.as_u16(), response_preview(&body));

        if status.is_success() {
            // Action endpoints may answer 204 with no body
            let payload = if body.trim().is_empty() { "{}" } else { body.as_str() };
            return serde_json::from_str(payload).map_err(|e| ApiError::Decode(e.to_string()));
        }

        Err(map_status(status, &body))
    }

    async fn get<T: DeserializeOwned>(&self, url: Url, query: &[(&str, String)]) -> ApiResult<T> {
        debug!("GET {}", url);
        self.send(self.client.get(url).query(query)).await
    }

    async fn post<B: serde::Serialize + ?Sized, T: DeserializeOwned>(&self, url: Url, body: &B) -> ApiResult<T> {
        debug!("POST {}", url);
        self.send(self.client.post(url).json(body)).await
    }
}

fn map_status(status: StatusCode, body: &str) -> ApiError {
    match status {
        StatusCode::UNAUTHORIZED => ApiError::Unauthorized,
        s if s.is_client_error() => ApiError::Rejected {
            status: s.as_u16(),
            message: server_message(body),
        },
        s if s.is_server_error() => {
            warn!("Server error {}: {}", s.as_u16(), response_preview(body));
            ApiError::Server { status: s.as_u16() }
        }
        s => ApiError::Decode(format!("unexpected status {}", s.as_u16())),
    }
}

/// Pull a human-readable reason out of an error body: `detail`, `error` or `message`
/// keys first, then the first per-field message.
fn server_message(body: &str) -> Option<String> {
    let value: Value = serde_json::from_str(body).ok()?;
    let object = value.as_object()?;

    for key in ["detail", "error", "message"] {
        if let Some(text) = object.get(key).and_then(Value::as_str) {
            return Some(text.to_string());
        }
    }

    object.iter().find_map(|(field, v)| {
        let first = v.as_array()?.first()?.as_str()?;
        if field == "non_field_errors" {
            Some(first.to_string())
        } else {
            Some(format!("{}: {}", field, first))
        }
    })
}

fn response_preview(body: &str) -> &str {
    match body.char_indices().nth(200) {
        Some((idx, _)) => &body[..idx],
        None => body,
    }
}

fn search_params(query: &SearchQuery, page: PageRequest) -> Vec<(&'static str, String)> {
    let mut params = vec![
        ("origin", query.origin_term().to_string()),
        ("destination", query.destination_term().to_string()),
        ("page", page.page.to_string()),
        ("page_size", page.page_size.to_string()),
    ];
    if let Some(start) = query.date_range.start {
        params.push(("start_date", start.format("%Y-%m-%d").to_string()));
    }
    if let Some(end) = query.date_range.end {
        params.push(("end_date", end.format("%Y-%m-%d").to_string()));
    }
    params
}

#[async_trait]
impl FlightApi for HttpApiClient {
    async fn flight_menu(&self) -> ApiResult<FlightMenu> {
        self.get(self.endpoint(&["flights", "menu"]), &[]).await
    }

    async fn list_flights(
        &self,
        date: NaiveDate,
        departure: &str,
        arrival: &str,
    ) -> ApiResult<Vec<FlightSummary>> {
        let params = [
            ("date", date.format("%Y-%m-%d").to_string()),
            ("departure", departure.to_string()),
            ("arrival", arrival.to_string()),
        ];
        self.get(self.endpoint(&["flights"]), &params).await
    }

    async fn flight_detail(&self, flight_id: i64) -> ApiResult<FlightSummary> {
        let id = flight_id.to_string();
        self.get(self.endpoint(&["flights", id.as_str()]), &[]).await
    }

    async fn search_locations(&self, term: &str) -> ApiResult<Vec<LocationSuggestion>> {
        let results: LocationResults = self
            .get(self.endpoint(&["flights", "search-locations"]), &[("search", term.to_string())])
            .await?;
        Ok(results.results)
    }

    async fn search_flights(&self, query: &SearchQuery, page: PageRequest) -> ApiResult<FlightPage> {
        self.get(self.endpoint(&["flights", "search-flights"]), &search_params(query, page)).await
    }

    async fn random_flights(&self, page_size: u32) -> ApiResult<Vec<FlightSummary>> {
        let page: FlightPage = self
            .get(self.endpoint(&["flights", "random-flights"]), &[("page_size", page_size.to_string())])
            .await?;
        Ok(page.results)
    }
}

#[async_trait]
impl TicketApi for HttpApiClient {
    async fn create_ticket(&self, request: &CreateTicketRequest) -> ApiResult<TicketRecord> {
        let ticket: TicketRecord = self.post(self.endpoint(&["tickets"]), request).await?;
        info!("Ticket {} created (PNR {})", ticket.ticket_number, ticket.pnr);
        Ok(ticket)
    }

    async fn pay_ticket(&self, ticket_number: &str, request: &PaymentRequest) -> ApiResult<ActionReceipt> {
        self.post(self.endpoint(&["tickets", ticket_number, "pay"]), request).await
    }

    async fn list_tickets(&self) -> ApiResult<Vec<TicketRecord>> {
        self.get(self.endpoint(&["tickets"]), &[]).await
    }

    async fn get_ticket(&self, ticket_number: &str) -> ApiResult<TicketRecord> {
        self.get(self.endpoint(&["tickets", ticket_number]), &[]).await
    }

    async fn check_in(&self, ticket_number: &str) -> ApiResult<ActionReceipt> {
        self.post(self.endpoint(&["tickets", ticket_number, "checkin"]), &Value::Object(Default::default()))
            .await
    }

    async fn cancel_ticket(&self, ticket_number: &str) -> ApiResult<ActionReceipt> {
        self.post(self.endpoint(&["tickets", ticket_number, "cancel"]), &Value::Object(Default::default()))
            .await
    }
}

#[async_trait]
impl AuthApi for HttpApiClient {
    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthTokens> {
        self.post(self.endpoint(&["auth", "login"]), request).await
    }

    async fn fetch_profile(&self) -> ApiResult<UserProfile> {
        self.get(self.endpoint(&["auth", "profile"]), &[]).await
    }

    async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<UserProfile> {
        let url = self.endpoint(&["auth", "profile"]);
        debug!("PATCH {}", url);
        self.send(self.client.patch(url).json(update)).await
    }
}
