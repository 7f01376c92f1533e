use skylane_core::{ApiError, TicketApi};
use skylane_shared::{CreateTicketRequest, TicketRecord};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::workflow::{BookingError, BookingState, BookingWorkflow, SubmitGate};

#[derive(Debug, Clone)]
pub struct BookingSettings {
    pub submit_timeout: Duration,
    /// How long the confirmation stays on screen before moving on
    pub redirect_delay: Duration,
    pub default_area_code: String,
}

impl Default for BookingSettings {
    fn default() -> Self {
        Self {
            submit_timeout: Duration::from_secs(15),
            redirect_delay: Duration::from_secs(2),
            default_area_code: "+1".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmissionOutcome {
    Confirmed { ticket: TicketRecord, redirect_after: Duration },
    /// Back in payment entry with the draft intact
    Failed { message: String },
    /// Another submission was already running
    Ignored,
}

/// Drives ticket creation for a shared booking workflow
pub struct BookingController {
    workflow: Arc<Mutex<BookingWorkflow>>,
    tickets: Arc<dyn TicketApi>,
    settings: BookingSettings,
}

impl BookingController {
    pub fn new(tickets: Arc<dyn TicketApi>, settings: BookingSettings) -> Self {
        let workflow = BookingWorkflow::new(settings.default_area_code.clone());
        Self {
            workflow: Arc::new(Mutex::new(workflow)),
            tickets,
            settings,
        }
    }

    /// Shared handle for the form steps that edit the draft
    pub fn workflow(&self) -> Arc<Mutex<BookingWorkflow>> {
        self.workflow.clone()
    }

    pub async fn state(&self) -> BookingState {
        self.workflow.lock().await.state().clone()
    }

    /// Submit the current draft. Local validation errors are returned as `Err` without
    /// leaving payment entry; remote failures come back as `Failed`.
    ///
    /// The request runs on its own task and always settles the workflow, even when the
    /// caller stops waiting.
    pub async fn submit(&self) -> Result<SubmissionOutcome, BookingError> {
        let request = match self.workflow.lock().await.begin_submission()? {
            SubmitGate::Proceed(request) => request,
            SubmitGate::AlreadySubmitting => {
                debug!("Submission already in progress, ignoring");
                return Ok(SubmissionOutcome::Ignored);
            }
        };

        let attempt = Uuid::new_v4();
        info!("Submitting booking {} for flight {} ({})", attempt, request.flight_instance, request.flight_class);

        let settle = tokio::spawn(settle_submission(
            self.workflow.clone(),
            self.tickets.clone(),
            request,
            attempt,
            self.settings.clone(),
        ));

        match settle.await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!("Booking {} did not settle: {}", attempt, e);
                let message = ApiError::Transport(e.to_string()).user_message();
                let mut workflow = self.workflow.lock().await;
                if workflow.is_submitting() {
                    workflow.complete_submission(Err(message.clone()))?;
                }
                Ok(SubmissionOutcome::Failed { message })
            }
        }
    }
}

async fn settle_submission(
    workflow: Arc<Mutex<BookingWorkflow>>,
    tickets: Arc<dyn TicketApi>,
    request: CreateTicketRequest,
    attempt: Uuid,
    settings: BookingSettings,
) -> Result<SubmissionOutcome, BookingError> {
    let timeout_ms = settings.submit_timeout.as_millis() as u64;
    let result = match tokio::time::timeout(settings.submit_timeout, tickets.create_ticket(&request)).await {
        Ok(result) => result,
        Err(_) => Err(ApiError::Timeout(timeout_ms)),
    };

    let mut workflow = workflow.lock().await;
    match result {
        Ok(ticket) => {
            info!("Booking {} confirmed as ticket {}", attempt, ticket.ticket_number);
            workflow.complete_submission(Ok(ticket.clone()))?;
            Ok(SubmissionOutcome::Confirmed {
                ticket,
                redirect_after: settings.redirect_delay,
            })
        }
        Err(e) => {
            warn!("Booking {} failed: {}", attempt, e);
            let message = e.user_message();
            workflow.complete_submission(Err(message.clone()))?;
            Ok(SubmissionOutcome::Failed { message })
        }
    }
}
