use skylane_core::{ApiError, SessionContext, TicketApi};
use skylane_shared::{ActionReceipt, PaymentRequest, PaymentStatus, TicketRecord};
use std::sync::Arc;
use tracing::{info, warn};

pub use skylane_shared::PaymentMethod;

/// Post-booking ticket actions for the signed-in traveller
pub struct TicketDesk {
    api: Arc<dyn TicketApi>,
    session: Arc<SessionContext>,
}

impl TicketDesk {
    pub fn new(api: Arc<dyn TicketApi>, session: Arc<SessionContext>) -> Self {
        Self { api, session }
    }

    pub async fn list(&self) -> Result<Vec<TicketRecord>, TicketDeskError> {
        self.require_session().await?;
        let tickets = self.api.list_tickets().await.map_err(|e| self.api_error(e))?;
        info!("Fetched {} tickets", tickets.len());
        Ok(tickets)
    }

    pub async fn get(&self, ticket_number: &str) -> Result<TicketRecord, TicketDeskError> {
        self.require_session().await?;
        self.api.get_ticket(ticket_number).await.map_err(|e| self.api_error(e))
    }

    /// Settle the outstanding balance of a ticket. Payment closes at check-in.
    pub async fn pay(&self, ticket_number: &str, method: PaymentMethod) -> Result<ActionReceipt, TicketDeskError> {
        let ticket = self.get(ticket_number).await?;
        let total = match (&ticket.payment, ticket.payment_status()) {
            (_, PaymentStatus::Paid) => return Err(TicketDeskError::AlreadyPaid(ticket.ticket_number)),
            _ if ticket.is_checked_in() => return Err(TicketDeskError::PaymentClosed(ticket.ticket_number)),
            (Some(payment), _) => payment.total,
            (None, _) => return Err(TicketDeskError::NoPaymentDue(ticket.ticket_number)),
        };

        let request = PaymentRequest::new(method, total);
        let receipt = self
            .api
            .pay_ticket(&ticket.ticket_number, &request)
            .await
            .map_err(|e| self.api_error(e))?;
        info!("Ticket {} paid ({:?}, total {})", ticket.ticket_number, method, total);
        Ok(receipt)
    }

    pub async fn check_in(&self, ticket_number: &str) -> Result<ActionReceipt, TicketDeskError> {
        let ticket = self.get(ticket_number).await?;
        if ticket.is_checked_in() {
            return Err(TicketDeskError::AlreadyCheckedIn(ticket.ticket_number));
        }

        let receipt = self
            .api
            .check_in(&ticket.ticket_number)
            .await
            .map_err(|e| self.api_error(e))?;
        info!("Checked in ticket {}", ticket.ticket_number);
        Ok(receipt)
    }

    /// Cancel a ticket. Not possible once the passenger has checked in.
    pub async fn cancel(&self, ticket_number: &str) -> Result<ActionReceipt, TicketDeskError> {
        let ticket = self.get(ticket_number).await?;
        if ticket.is_checked_in() {
            return Err(TicketDeskError::CheckedIn(ticket.ticket_number));
        }

        let receipt = self
            .api
            .cancel_ticket(&ticket.ticket_number)
            .await
            .map_err(|e| self.api_error(e))?;
        info!("Cancelled ticket {}", ticket.ticket_number);
        Ok(receipt)
    }

    async fn require_session(&self) -> Result<(), TicketDeskError> {
        if self.session.is_authenticated().await {
            Ok(())
        } else {
            Err(TicketDeskError::NotAuthenticated)
        }
    }

    fn api_error(&self, e: ApiError) -> TicketDeskError {
        match e {
            ApiError::Unauthorized => {
                warn!("Ticket request rejected the session token");
                TicketDeskError::NotAuthenticated
            }
            other => TicketDeskError::Api(other),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TicketDeskError {
    #[error("Not logged in")]
    NotAuthenticated,

    #[error("Ticket {0} is already paid")]
    AlreadyPaid(String),

    #[error("Ticket {0} is checked in and can no longer be paid")]
    PaymentClosed(String),

    #[error("Ticket {0} has no payment due")]
    NoPaymentDue(String),

    #[error("Ticket {0} is already checked in")]
    AlreadyCheckedIn(String),

    #[error("Ticket {0} cannot be cancelled after check-in")]
    CheckedIn(String),

    #[error(transparent)]
    Api(#[from] ApiError),
}

impl TicketDeskError {
    pub fn user_message(&self) -> String {
        match self {
            TicketDeskError::NotAuthenticated => "Please log in to see your tickets.".to_string(),
            TicketDeskError::Api(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}
