use async_trait::async_trait;
use skylane_core::{ApiError, ApiResult, AuthApi, MemoryTokenStore, SessionContext, TicketApi, TokenHandle};
use skylane_shared::{
    ActionReceipt, AuthTokens, CreateTicketRequest, LoginRequest, PaymentRequest, ProfileUpdate, TicketRecord,
    UserProfile,
};
use std::sync::{Arc, Mutex};
use std::time::Duration;

pub(crate) fn ticket(number: &str, checkin: &str, paid_cash: &str) -> TicketRecord {
    serde_json::from_value(serde_json::json!({
        "ticket_number": number,
        "PNR_number": format!("PNR{}", number),
        "seat_number": "12A",
        "checkin_status": checkin,
        "flight_instance": 42,
        "payment": {"total": "199.00", "paid_cash": paid_cash, "paid_points": 0}
    }))
    .unwrap()
}

/// In-memory ticket service recording every call
#[derive(Default)]
pub(crate) struct MockTicketApi {
    pub create_delay: Duration,
    /// Errors handed out by successive `create_ticket` calls before it starts succeeding
    pub create_failures: Mutex<Vec<ApiError>>,
    pub created: Mutex<Vec<CreateTicketRequest>>,
    pub tickets: Mutex<Vec<TicketRecord>>,
    pub payments: Mutex<Vec<(String, PaymentRequest)>>,
    pub actions: Mutex<Vec<(&'static str, String)>>,
    pub reject_token: bool,
}

impl MockTicketApi {
    pub fn with_tickets(tickets: Vec<TicketRecord>) -> Self {
        Self { tickets: Mutex::new(tickets), ..Default::default() }
    }

    fn guard(&self) -> ApiResult<()> {
        if self.reject_token {
            return Err(ApiError::Unauthorized);
        }
        Ok(())
    }

    fn find(&self, ticket_number: &str) -> ApiResult<TicketRecord> {
        self.tickets
            .lock()
            .unwrap()
            .iter()
            .find(|t| t.ticket_number == ticket_number)
            .cloned()
            .ok_or(ApiError::Rejected { status: 404, message: Some("Not found.".to_string()) })
    }
}

#[async_trait]
impl TicketApi for MockTicketApi {
    async fn create_ticket(&self, request: &CreateTicketRequest) -> ApiResult<TicketRecord> {
        self.created.lock().unwrap().push(request.clone());
        tokio::time::sleep(self.create_delay).await;

        let failure = {
            let mut failures = self.create_failures.lock().unwrap();
            if failures.is_empty() { None } else { Some(failures.remove(0)) }
        };
        if let Some(e) = failure {
            return Err(e);
        }

        let number = format!("{}", 5000 + self.created.lock().unwrap().len());
        Ok(ticket(&number, "not_checked_in", "199.00"))
    }

    async fn pay_ticket(&self, ticket_number: &str, request: &PaymentRequest) -> ApiResult<ActionReceipt> {
        self.guard()?;
        self.payments.lock().unwrap().push((ticket_number.to_string(), request.clone()));
        Ok(ActionReceipt { message: Some("Payment processed successfully.".to_string()) })
    }

    async fn list_tickets(&self) -> ApiResult<Vec<TicketRecord>> {
        self.guard()?;
        Ok(self.tickets.lock().unwrap().clone())
    }

    async fn get_ticket(&self, ticket_number: &str) -> ApiResult<TicketRecord> {
        self.guard()?;
        self.find(ticket_number)
    }

    async fn check_in(&self, ticket_number: &str) -> ApiResult<ActionReceipt> {
        self.guard()?;
        self.actions.lock().unwrap().push(("checkin", ticket_number.to_string()));
        Ok(ActionReceipt { message: Some("Check-in successful.".to_string()) })
    }

    async fn cancel_ticket(&self, ticket_number: &str) -> ApiResult<ActionReceipt> {
        self.guard()?;
        self.actions.lock().unwrap().push(("cancel", ticket_number.to_string()));
        Ok(ActionReceipt { message: Some("Ticket cancelled.".to_string()) })
    }
}

/// Auth collaborator that never accepts anything; sessions in tests are seeded via the token handle
pub(crate) struct RejectingAuthApi;

#[async_trait]
impl AuthApi for RejectingAuthApi {
    async fn login(&self, _request: &LoginRequest) -> ApiResult<AuthTokens> {
        Err(ApiError::Unauthorized)
    }

    async fn fetch_profile(&self) -> ApiResult<UserProfile> {
        Err(ApiError::Unauthorized)
    }

    async fn update_profile(&self, _update: &ProfileUpdate) -> ApiResult<UserProfile> {
        Err(ApiError::Unauthorized)
    }
}

pub(crate) async fn session(signed_in: bool) -> Arc<SessionContext> {
    let token = TokenHandle::new();
    if signed_in {
        token.set("test-token".into()).await;
    }
    Arc::new(SessionContext::new(
        Arc::new(RejectingAuthApi),
        Arc::new(MemoryTokenStore::new()),
        token,
    ))
}
