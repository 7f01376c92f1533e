use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use skylane_core::ValidationError;
use skylane_shared::{FlightClass, FlightSummary, Masked};
use std::fmt;

/// Identity document presented at booking
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdType {
    #[default]
    Passport,
    NationalId,
    DriversLicense,
}

impl IdType {
    /// Value of the `id_type` field on the wire
    pub fn wire_name(&self) -> &'static str {
        match self {
            IdType::Passport => "passport",
            IdType::NationalId => "national_id",
            IdType::DriversLicense => "drivers_license",
        }
    }

    /// Prefix of the combined `id_document` string
    pub fn label(&self) -> &'static str {
        match self {
            IdType::Passport => "PASSPORT",
            IdType::NationalId => "NATIONAL_ID",
            IdType::DriversLicense => "DRIVERS_LICENSE",
        }
    }
}

impl std::str::FromStr for IdType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace(['-', ' '], "_").as_str() {
            "passport" => Ok(IdType::Passport),
            "national_id" | "id_card" => Ok(IdType::NationalId),
            "drivers_license" | "driver_license" => Ok(IdType::DriversLicense),
            other => Err(format!("Unknown ID type: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassengerField {
    FirstName,
    LastName,
    Email,
    PhoneNumber,
    IdNumber,
    Birthdate,
}

impl PassengerField {
    pub const REQUIRED: [PassengerField; 6] = [
        PassengerField::FirstName,
        PassengerField::LastName,
        PassengerField::Email,
        PassengerField::PhoneNumber,
        PassengerField::IdNumber,
        PassengerField::Birthdate,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            PassengerField::FirstName => "first_name",
            PassengerField::LastName => "last_name",
            PassengerField::Email => "email",
            PassengerField::PhoneNumber => "phone_number",
            PassengerField::IdNumber => "id_number",
            PassengerField::Birthdate => "birthdate",
        }
    }
}

impl fmt::Display for PassengerField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentField {
    CardholderName,
    CardNumber,
    Expiry,
    Cvc,
}

impl PaymentField {
    pub const REQUIRED: [PaymentField; 4] = [
        PaymentField::CardholderName,
        PaymentField::CardNumber,
        PaymentField::Expiry,
        PaymentField::Cvc,
    ];

    pub fn key(&self) -> &'static str {
        match self {
            PaymentField::CardholderName => "cardholder_name",
            PaymentField::CardNumber => "card_number",
            PaymentField::Expiry => "expiry",
            PaymentField::Cvc => "cvc",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PassengerDetails {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    /// Empty means the configured default
    pub area_code: String,
    pub id_type: IdType,
    pub id_number: String,
    pub birthdate: Option<NaiveDate>,
}

impl PassengerDetails {
    pub fn is_filled(&self, field: PassengerField) -> bool {
        match field {
            PassengerField::FirstName => !self.first_name.trim().is_empty(),
            PassengerField::LastName => !self.last_name.trim().is_empty(),
            PassengerField::Email => !self.email.trim().is_empty(),
            PassengerField::PhoneNumber => !self.phone_number.trim().is_empty(),
            PassengerField::IdNumber => !self.id_number.trim().is_empty(),
            PassengerField::Birthdate => self.birthdate.is_some(),
        }
    }

    /// First required field left blank, in form order
    pub fn first_missing(&self) -> Option<PassengerField> {
        PassengerField::REQUIRED.into_iter().find(|f| !self.is_filled(*f))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if let Some(field) = self.first_missing() {
            return Err(ValidationError::missing(field.key()));
        }
        if !self.email.contains('@') {
            return Err(ValidationError::new("email", "Please enter a valid email address"));
        }
        Ok(())
    }
}

/// Card details. Only checked locally for completeness; they are never part of the ticket payload.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PaymentDetails {
    pub cardholder_name: String,
    pub card_number: Masked<String>,
    pub expiry: String,
    pub cvc: Masked<String>,
}

impl PaymentDetails {
    pub fn first_missing(&self) -> Option<PaymentField> {
        PaymentField::REQUIRED.into_iter().find(|field| match field {
            PaymentField::CardholderName => self.cardholder_name.trim().is_empty(),
            PaymentField::CardNumber => self.card_number.is_blank(),
            PaymentField::Expiry => self.expiry.trim().is_empty(),
            PaymentField::Cvc => self.cvc.is_blank(),
        })
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        match self.first_missing() {
            Some(field) => Err(ValidationError::missing(field.key())),
            None => Ok(()),
        }
    }
}

/// Everything the traveller has entered so far
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BookingDraft {
    pub flight: Option<FlightSummary>,
    pub flight_class: FlightClass,
    pub passenger: PassengerDetails,
    pub payment: PaymentDetails,
}

impl BookingDraft {
    pub fn flight_id(&self) -> Option<i64> {
        self.flight.as_ref().and_then(FlightSummary::bookable_id)
    }
}
