use chrono::{DateTime, NaiveDate, Utc};
use serde::{de, Deserialize, Deserializer, Serialize};
use std::fmt;

use super::flight::FlightClass;
use super::money::Money;

/// Check-in progress of a ticket. Older API versions report a plain boolean.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CheckinStatus {
    #[default]
    NotCheckedIn,
    CheckedIn,
    Boarded,
}

impl<'de> Deserialize<'de> for CheckinStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        struct StatusVisitor;

        impl<'de> de::Visitor<'de> for StatusVisitor {
            type Value = CheckinStatus;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a check-in status string or boolean")
            }

            fn visit_bool<E: de::Error>(self, v: bool) -> Result<CheckinStatus, E> {
                Ok(if v { CheckinStatus::CheckedIn } else { CheckinStatus::NotCheckedIn })
            }

            fn visit_str<E: de::Error>(self, v: &str) -> Result<CheckinStatus, E> {
                match v {
                    "not_checked_in" => Ok(CheckinStatus::NotCheckedIn),
                    "checked_in" => Ok(CheckinStatus::CheckedIn),
                    "boarded" => Ok(CheckinStatus::Boarded),
                    other => Err(E::unknown_variant(other, &["not_checked_in", "checked_in", "boarded"])),
                }
            }
        }

        deserializer.deserialize_any(StatusVisitor)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PaymentStatus {
    Paid,
    Unpaid,
    Unknown,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    #[serde(default)]
    pub payment_number: Option<i64>,
    pub total: Money,
    #[serde(default)]
    pub paid_cash: Money,
    #[serde(default)]
    pub paid_points: i64,
}

/// Server-confirmed ticket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TicketRecord {
    #[serde(deserialize_with = "string_or_number")]
    pub ticket_number: String,
    #[serde(rename = "PNR_number", alias = "pnr")]
    pub pnr: String,
    #[serde(default)]
    pub seat_number: Option<String>,
    #[serde(default)]
    pub gate_number: Option<String>,
    #[serde(default)]
    pub checkin_status: CheckinStatus,
    #[serde(default)]
    pub flight_instance: Option<i64>,
    #[serde(default, alias = "class_type")]
    pub flight_class: Option<String>,
    #[serde(default)]
    pub ticketing_timestamp: Option<DateTime<Utc>>,
    #[serde(default)]
    pub payment: Option<PaymentRecord>,
}

impl TicketRecord {
    /// Points are redeemed one per whole currency unit; a points payment waives the fraction.
    pub fn payment_status(&self) -> PaymentStatus {
        match &self.payment {
            None => PaymentStatus::Unknown,
            Some(p) => {
                let covered = p.paid_cash.cents() + p.paid_points.saturating_mul(100);
                let points_cover = p.paid_points > 0 && p.paid_points >= p.total.whole_units();
                if covered >= p.total.cents() || points_cover {
                    PaymentStatus::Paid
                } else {
                    PaymentStatus::Unpaid
                }
            }
        }
    }

    pub fn is_checked_in(&self) -> bool {
        self.checkin_status != CheckinStatus::NotCheckedIn
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(i64),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(s) => s,
        Raw::Number(n) => n.to_string(),
    })
}

/// Passenger block of the ticket creation payload
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PassengerData {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone_number: String,
    pub area_code: String,
    pub id_type: String,
    pub id_number: String,
    pub id_document: String,
    pub birthdate: NaiveDate,
}

/// Body of `POST /tickets/`. Ticket number, PNR and seat are allocated by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreateTicketRequest {
    pub flight_instance: i64,
    pub flight_class: FlightClass,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quoted_total: Option<Money>,
    pub passenger_data: PassengerData,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    #[default]
    Cash,
    Points,
}

/// Body of `POST /tickets/{id}/pay/`. The server settles by `method`; the amounts
/// mirror what it will record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRequest {
    pub method: PaymentMethod,
    pub paid_cash: Money,
    pub paid_points: i64,
    pub total: Money,
}

impl PaymentRequest {
    pub fn new(method: PaymentMethod, total: Money) -> Self {
        match method {
            PaymentMethod::Cash => Self::cash(total),
            PaymentMethod::Points => Self::points(total),
        }
    }

    pub fn cash(total: Money) -> Self {
        Self { method: PaymentMethod::Cash, paid_cash: total, paid_points: 0, total }
    }

    pub fn points(total: Money) -> Self {
        Self {
            method: PaymentMethod::Points,
            paid_cash: Money::ZERO,
            paid_points: total.whole_units(),
            total,
        }
    }
}

/// Plain acknowledgement returned by ticket actions
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionReceipt {
    #[serde(default, alias = "detail")]
    pub message: Option<String>,
}
