pub mod controller;
pub mod models;
pub mod payload;
pub mod tickets;
pub mod workflow;

#[cfg(test)]
mod testing;

pub use controller::{BookingController, BookingSettings, SubmissionOutcome};
pub use models::{BookingDraft, IdType, PassengerDetails, PassengerField, PaymentDetails, PaymentField};
pub use payload::ticket_request;
pub use tickets::{PaymentMethod, TicketDesk, TicketDeskError};
pub use workflow::{BookingError, BookingState, BookingWorkflow, SubmitGate};
