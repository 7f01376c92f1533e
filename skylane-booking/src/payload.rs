use skylane_core::ValidationError;
use skylane_shared::{CreateTicketRequest, PassengerData};

use crate::models::{BookingDraft, PassengerField};

pub const MISSING_FLIGHT_MESSAGE: &str = "Flight instance ID is missing. Please select a flight again.";

/// Build the ticket creation body from a draft.
///
/// The result depends only on the draft and `default_area_code`: no timestamps or
/// client-side identifiers, so resubmitting an unchanged draft sends the same body.
pub fn ticket_request(draft: &BookingDraft, default_area_code: &str) -> Result<CreateTicketRequest, ValidationError> {
    let flight_instance = draft
        .flight_id()
        .ok_or_else(|| ValidationError::new("flight", MISSING_FLIGHT_MESSAGE))?;

    let passenger = &draft.passenger;
    passenger.validate()?;
    let birthdate = passenger
        .birthdate
        .ok_or_else(|| ValidationError::missing(PassengerField::Birthdate.key()))?;

    let area_code = match passenger.area_code.trim() {
        "" => default_area_code.to_string(),
        code => code.to_string(),
    };
    let id_number = passenger.id_number.trim().to_string();

    Ok(CreateTicketRequest {
        flight_instance,
        flight_class: draft.flight_class,
        quoted_total: draft
            .flight
            .as_ref()
            .and_then(|f| f.price_for(draft.flight_class)),
        passenger_data: PassengerData {
            first_name: passenger.first_name.trim().to_string(),
            last_name: passenger.last_name.trim().to_string(),
            email: passenger.email.trim().to_string(),
            phone_number: passenger.phone_number.trim().to_string(),
            area_code,
            id_type: passenger.id_type.wire_name().to_string(),
            id_document: format!("{}: {}", passenger.id_type.label(), id_number),
            id_number,
            birthdate,
        },
    })
}
