use async_trait::async_trait;
use chrono::NaiveDate;
use skylane_shared::{
    ActionReceipt, AuthTokens, CreateTicketRequest, FlightMenu, FlightPage, FlightSummary,
    LocationSuggestion, LoginRequest, PaymentRequest, ProfileUpdate, TicketRecord, UserProfile,
};

use crate::search::{PageRequest, SearchQuery};
use crate::ApiResult;

/// Read access to flights and locations
#[async_trait]
pub trait FlightApi: Send + Sync {
    async fn flight_menu(&self) -> ApiResult<FlightMenu>;

    /// Flights departing on `date` between two airports
    async fn list_flights(
        &self,
        date: NaiveDate,
        departure: &str,
        arrival: &str,
    ) -> ApiResult<Vec<FlightSummary>>;

    async fn flight_detail(&self, flight_id: i64) -> ApiResult<FlightSummary>;

    /// Ranked city and airport suggestions for autocomplete
    async fn search_locations(&self, term: &str) -> ApiResult<Vec<LocationSuggestion>>;

    async fn search_flights(&self, query: &SearchQuery, page: PageRequest) -> ApiResult<FlightPage>;

    /// Randomized sample for the discovery feed
    async fn random_flights(&self, page_size: u32) -> ApiResult<Vec<FlightSummary>>;
}

/// Ticket lifecycle on the remote service
#[async_trait]
pub trait TicketApi: Send + Sync {
    async fn create_ticket(&self, request: &CreateTicketRequest) -> ApiResult<TicketRecord>;

    async fn pay_ticket(&self, ticket_number: &str, request: &PaymentRequest) -> ApiResult<ActionReceipt>;

    /// Tickets of the authenticated user
    async fn list_tickets(&self) -> ApiResult<Vec<TicketRecord>>;

    async fn get_ticket(&self, ticket_number: &str) -> ApiResult<TicketRecord>;

    async fn check_in(&self, ticket_number: &str) -> ApiResult<ActionReceipt>;

    async fn cancel_ticket(&self, ticket_number: &str) -> ApiResult<ActionReceipt>;
}

/// Authentication collaborator. Calls that need a bearer token read it from the
/// shared [`crate::TokenHandle`] the implementation was built with.
#[async_trait]
pub trait AuthApi: Send + Sync {
    async fn login(&self, request: &LoginRequest) -> ApiResult<AuthTokens>;

    async fn fetch_profile(&self) -> ApiResult<UserProfile>;

    async fn update_profile(&self, update: &ProfileUpdate) -> ApiResult<UserProfile>;
}
