use skylane_core::ValidationError;
use skylane_shared::{CreateTicketRequest, FlightClass, FlightSummary, TicketRecord, UserProfile};
use tracing::info;

use crate::models::{BookingDraft, PassengerDetails, PaymentDetails};
use crate::payload::{ticket_request, MISSING_FLIGHT_MESSAGE};

/// Where the traveller is in the booking flow
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookingState {
    SelectingFlight,
    EnteringPassengerInfo,
    /// `failure` carries the message of the last failed submission, if any
    EnteringPayment { failure: Option<String> },
    Submitting,
    Confirmed(TicketRecord),
}

impl BookingState {
    pub fn name(&self) -> &'static str {
        match self {
            BookingState::SelectingFlight => "SELECTING_FLIGHT",
            BookingState::EnteringPassengerInfo => "ENTERING_PASSENGER_INFO",
            BookingState::EnteringPayment { .. } => "ENTERING_PAYMENT",
            BookingState::Submitting => "SUBMITTING",
            BookingState::Confirmed(_) => "CONFIRMED",
        }
    }
}

/// Result of asking to submit
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitGate {
    /// Now `Submitting`; send this body
    Proceed(CreateTicketRequest),
    /// A submission is already running; nothing to do
    AlreadySubmitting,
}

/// Booking flow state machine. Holds the draft; every transition either succeeds or
/// leaves both state and draft untouched.
#[derive(Debug, Clone)]
pub struct BookingWorkflow {
    state: BookingState,
    draft: BookingDraft,
    default_area_code: String,
}

impl BookingWorkflow {
    pub fn new(default_area_code: impl Into<String>) -> Self {
        Self {
            state: BookingState::SelectingFlight,
            draft: BookingDraft::default(),
            default_area_code: default_area_code.into(),
        }
    }

    pub fn state(&self) -> &BookingState {
        &self.state
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn is_submitting(&self) -> bool {
        self.state == BookingState::Submitting
    }

    /// Transition: SelectingFlight → EnteringPassengerInfo. A confirmed booking may start over.
    pub fn select_flight(&mut self, flight: FlightSummary, class: FlightClass) -> Result<(), BookingError> {
        if !matches!(self.state, BookingState::SelectingFlight | BookingState::Confirmed(_)) {
            return Err(self.invalid("ENTERING_PASSENGER_INFO"));
        }
        if flight.bookable_id().is_none() {
            return Err(ValidationError::new("flight", MISSING_FLIGHT_MESSAGE).into());
        }

        info!("Flight {} selected ({})", flight.flight_number, class);
        self.draft.flight = Some(flight);
        self.draft.flight_class = class;
        self.state = BookingState::EnteringPassengerInfo;
        Ok(())
    }

    /// Transition: EnteringPassengerInfo → EnteringPayment, once every required passenger field is set
    pub fn continue_to_payment(&mut self) -> Result<(), BookingError> {
        if self.state != BookingState::EnteringPassengerInfo {
            return Err(self.invalid("ENTERING_PAYMENT"));
        }
        self.draft.passenger.validate()?;

        self.state = BookingState::EnteringPayment { failure: None };
        Ok(())
    }

    /// Transition: EnteringPayment → EnteringPassengerInfo
    pub fn back_to_passenger_info(&mut self) -> Result<(), BookingError> {
        if !matches!(self.state, BookingState::EnteringPayment { .. }) {
            return Err(self.invalid("ENTERING_PASSENGER_INFO"));
        }
        self.state = BookingState::EnteringPassengerInfo;
        Ok(())
    }

    /// Transition: EnteringPassengerInfo → SelectingFlight. The entered details are kept.
    pub fn back_to_flight_selection(&mut self) -> Result<(), BookingError> {
        if self.state != BookingState::EnteringPassengerInfo {
            return Err(self.invalid("SELECTING_FLIGHT"));
        }
        self.state = BookingState::SelectingFlight;
        Ok(())
    }

    /// Transition: EnteringPayment → Submitting. Re-entrant calls while submitting are ignored.
    pub fn begin_submission(&mut self) -> Result<SubmitGate, BookingError> {
        if self.is_submitting() {
            return Ok(SubmitGate::AlreadySubmitting);
        }
        if !matches!(self.state, BookingState::EnteringPayment { .. }) {
            return Err(self.invalid("SUBMITTING"));
        }

        self.draft.payment.validate()?;
        let request = ticket_request(&self.draft, &self.default_area_code)?;

        self.state = BookingState::Submitting;
        Ok(SubmitGate::Proceed(request))
    }

    /// Transition: Submitting → Confirmed on success (draft discarded) or back to
    /// EnteringPayment with the message attached (draft kept as is).
    pub fn complete_submission(&mut self, outcome: Result<TicketRecord, String>) -> Result<(), BookingError> {
        if !self.is_submitting() {
            return Err(self.invalid("CONFIRMED"));
        }

        match outcome {
            Ok(ticket) => {
                info!("Booking confirmed: ticket {} PNR {}", ticket.ticket_number, ticket.pnr);
                self.draft = BookingDraft::default();
                self.state = BookingState::Confirmed(ticket);
            }
            Err(message) => {
                self.state = BookingState::EnteringPayment { failure: Some(message) };
            }
        }
        Ok(())
    }

    pub fn passenger_mut(&mut self) -> Result<&mut PassengerDetails, BookingError> {
        self.ensure_editable()?;
        Ok(&mut self.draft.passenger)
    }

    pub fn payment_mut(&mut self) -> Result<&mut PaymentDetails, BookingError> {
        self.ensure_editable()?;
        Ok(&mut self.draft.payment)
    }

    /// Copy profile details into blank passenger fields. Anything already typed is kept.
    pub fn prefill_from(&mut self, profile: &UserProfile) -> Result<(), BookingError> {
        self.ensure_editable()?;
        let passenger = &mut self.draft.passenger;

        fill_blank(&mut passenger.first_name, &profile.first_name);
        fill_blank(&mut passenger.last_name, &profile.last_name);
        fill_blank(&mut passenger.email, &profile.email);
        if let Some(phone) = &profile.phone_number {
            fill_blank(&mut passenger.phone_number, phone);
        }
        if passenger.birthdate.is_none() {
            passenger.birthdate = profile.date_of_birth;
        }
        Ok(())
    }

    fn ensure_editable(&self) -> Result<(), BookingError> {
        match self.state {
            BookingState::Submitting => Err(BookingError::Locked),
            _ => Ok(()),
        }
    }

    fn invalid(&self, to: &str) -> BookingError {
        BookingError::InvalidTransition {
            from: self.state.name().to_string(),
            to: to.to_string(),
        }
    }
}

fn fill_blank(slot: &mut String, value: &str) {
    if slot.trim().is_empty() && !value.trim().is_empty() {
        *slot = value.to_string();
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BookingError {
    #[error("Invalid state transition from {from} to {to}")]
    InvalidTransition { from: String, to: String },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("The booking cannot be changed while it is being submitted")]
    Locked,
}

impl BookingError {
    pub fn user_message(&self) -> String {
        match self {
            BookingError::Validation(e) => e.message.clone(),
            other => other.to_string(),
        }
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::models::IdType;
    use chrono::NaiveDate;
    use proptest::prelude::*;
    use skylane_shared::{FlightStatus, Masked, PriceTiers};

    pub(crate) fn flight(id: Option<i64>) -> FlightSummary {
        FlightSummary {
            id,
            flight_number: "SK100".to_string(),
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

    pub(crate) fn complete_passenger() -> PassengerDetails {
        PassengerDetails {
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            email: "ada@example.com".to_string(),
            phone_number: "5550100".to_string(),
            area_code: String::new(),
            id_type: IdType::Passport,
            id_number: "X123".to_string(),
            birthdate: NaiveDate::from_ymd_opt(1990, 12, 10),
        }
    }

    pub(crate) fn complete_payment() -> PaymentDetails {
        PaymentDetails {
            cardholder_name: "Ada Lovelace".to_string(),
            card_number: Masked::from("4242424242424242"),
            expiry: "12/29".to_string(),
            cvc: Masked::from("123"),
        }
    }

    /// Workflow sitting in EnteringPayment with a complete draft for flight 42
    pub(crate) fn ready_workflow() -> BookingWorkflow {
        let mut workflow = BookingWorkflow::new("+1");
        workflow.select_flight(flight(Some(42)), FlightClass::Economy).unwrap();
        *workflow.passenger_mut().unwrap() = complete_passenger();
        workflow.continue_to_payment().unwrap();
        *workflow.payment_mut().unwrap() = complete_payment();
        workflow
    }

    fn ticket() -> TicketRecord {
        serde_json::from_str(r#"{"ticket_number": 5001, "PNR_number": "ZX81QA", "seat_number": "3A"}"#).unwrap()
    }

    #[test]
    fn test_booking_lifecycle() {
        let mut workflow = ready_workflow();

        // EnteringPayment → Submitting
        let request = match workflow.begin_submission().unwrap() {
            SubmitGate::Proceed(request) => request,
            other => panic!("unexpected gate {:?}", other),
        };
        assert_eq!(request.flight_instance, 42);
        assert_eq!(workflow.state(), &BookingState::Submitting);

        // Submitting → Confirmed
        workflow.complete_submission(Ok(ticket())).unwrap();
        assert!(matches!(workflow.state(), BookingState::Confirmed(t) if t.pnr == "ZX81QA"));
        assert_eq!(workflow.draft(), &BookingDraft::default());
    }

    #[test]
    fn test_flight_without_id_is_rejected() {
        let mut workflow = BookingWorkflow::new("+1");
        let err = workflow.select_flight(flight(None), FlightClass::Economy).unwrap_err();
        assert_eq!(err.user_message(), MISSING_FLIGHT_MESSAGE);
        assert_eq!(workflow.state(), &BookingState::SelectingFlight);

        assert!(workflow.select_flight(flight(Some(0)), FlightClass::Economy).is_err());
    }

    #[test]
    fn test_second_submit_is_ignored() {
        let mut workflow = ready_workflow();
        assert!(matches!(workflow.begin_submission().unwrap(), SubmitGate::Proceed(_)));
        assert_eq!(workflow.begin_submission().unwrap(), SubmitGate::AlreadySubmitting);
        assert_eq!(workflow.passenger_mut().unwrap_err(), BookingError::Locked);
    }

    #[test]
    fn test_failure_returns_to_payment_with_draft() {
        let mut workflow = ready_workflow();
        let before = workflow.draft().clone();
        workflow.begin_submission().unwrap();

        workflow.complete_submission(Err("Seat map unavailable".to_string())).unwrap();
        assert_eq!(
            workflow.state(),
            &BookingState::EnteringPayment { failure: Some("Seat map unavailable".to_string()) }
        );
        assert_eq!(workflow.draft(), &before);
    }

    #[test]
    fn test_missing_card_field_blocks_submission() {
        let mut workflow = ready_workflow();
        workflow.payment_mut().unwrap().expiry.clear();

        let err = workflow.begin_submission().unwrap_err();
        assert_eq!(err.user_message(), "Please fill in the expiry");
        assert!(matches!(workflow.state(), BookingState::EnteringPayment { .. }));
    }

    #[test]
    fn test_backward_transitions_keep_draft() {
        let mut workflow = ready_workflow();
        let before = workflow.draft().clone();

        workflow.back_to_passenger_info().unwrap();
        workflow.back_to_flight_selection().unwrap();
        assert_eq!(workflow.state(), &BookingState::SelectingFlight);
        assert_eq!(workflow.draft(), &before);

        // Skipping steps is not allowed
        assert!(matches!(
            workflow.begin_submission(),
            Err(BookingError::InvalidTransition { .. })
        ));
    }

    #[test]
    fn test_prefill_only_fills_blanks() {
        let mut workflow = BookingWorkflow::new("+1");
        workflow.passenger_mut().unwrap().first_name = "Augusta".to_string();

        let profile = UserProfile {
            id: Some(7),
            email: "ada@example.com".to_string(),
            first_name: "Ada".to_string(),
            last_name: "Lovelace".to_string(),
            phone_number: Some("5550100".to_string()),
            date_of_birth: NaiveDate::from_ymd_opt(1990, 12, 10),
        };
        workflow.prefill_from(&profile).unwrap();

        let passenger = &workflow.draft().passenger;
        assert_eq!(passenger.first_name, "Augusta");
        assert_eq!(passenger.last_name, "Lovelace");
        assert_eq!(passenger.phone_number, "5550100");
        assert_eq!(passenger.birthdate, profile.date_of_birth);
        assert!(passenger.id_number.is_empty());
    }

    fn arb_text() -> impl Strategy<Value = String> {
        prop_oneof![Just(String::new()), Just("  ".to_string()), "[A-Za-z]{1,8}"]
    }

    fn arb_passenger() -> impl Strategy<Value = PassengerDetails> {
        (
            arb_text(),
            arb_text(),
            prop_oneof![Just(String::new()), "[a-z]{1,6}@example\\.com"],
            arb_text(),
            arb_text(),
            any::<bool>(),
        )
            .prop_map(|(first_name, last_name, email, phone_number, id_number, has_birthdate)| {
                PassengerDetails {
                    first_name,
                    last_name,
                    email,
                    phone_number,
                    area_code: String::new(),
                    id_type: IdType::Passport,
                    id_number,
                    birthdate: if has_birthdate { NaiveDate::from_ymd_opt(1990, 1, 1) } else { None },
                }
            })
    }

    proptest! {
        #[test]
        fn incomplete_passenger_never_reaches_payment(passenger in arb_passenger()) {
            prop_assume!(passenger.first_missing().is_some());

            let mut workflow = BookingWorkflow::new("+1");
            workflow.select_flight(flight(Some(42)), FlightClass::Economy).unwrap();
            *workflow.passenger_mut().unwrap() = passenger;
            let before = workflow.draft().clone();

            prop_assert!(workflow.continue_to_payment().is_err());
            prop_assert_eq!(workflow.state(), &BookingState::EnteringPassengerInfo);
            prop_assert_eq!(workflow.draft(), &before);
        }

        #[test]
        fn failed_submission_preserves_draft(message in "[a-zA-Z ]{1,40}", id_number in "[A-Z0-9]{3,10}") {
            let mut workflow = ready_workflow();
            workflow.passenger_mut().unwrap().id_number = id_number;
            let before = workflow.draft().clone();

            let first = workflow.begin_submission().unwrap();
            workflow.complete_submission(Err(message.clone())).unwrap();
            prop_assert_eq!(workflow.state(), &BookingState::EnteringPayment { failure: Some(message) });
            prop_assert_eq!(workflow.draft(), &before);

            // Retrying unchanged data sends the identical body
            let retry = workflow.begin_submission().unwrap();
            prop_assert_eq!(first, retry);
        }
    }
}
