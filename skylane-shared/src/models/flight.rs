use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::money::Money;

/// Cabin class offered on a flight instance
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FlightClass {
    #[default]
    Economy,
    Business,
    First,
}

impl FlightClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlightClass::Economy => "Economy",
            FlightClass::Business => "Business",
            FlightClass::First => "First",
        }
    }
}

impl fmt::Display for FlightClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FlightClass {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "economy" => Ok(FlightClass::Economy),
            "business" => Ok(FlightClass::Business),
            "first" => Ok(FlightClass::First),
            other => Err(format!("unknown flight class: {}", other)),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlightStatus {
    #[default]
    Scheduled,
    Boarding,
    Delayed,
    Departed,
    Arrived,
    Cancelled,
    #[serde(other)]
    Unknown,
}

/// Per-class fares as quoted by the API. Pricing is computed server-side; these are
/// display snapshots only.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceTiers {
    #[serde(default, rename = "economy_price")]
    pub economy: Option<Money>,
    #[serde(default, rename = "business_price")]
    pub business: Option<Money>,
    #[serde(default, rename = "first_price")]
    pub first: Option<Money>,
}

/// Read-only projection of a flight instance as returned by search and detail endpoints
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "WireFlight")]
pub struct FlightSummary {
    /// Flight instance id. Listing payloads omit it, so it stays optional here and
    /// booking refuses flights without one.
    pub id: Option<i64>,
    pub flight_number: String,
    pub airline: Option<String>,
    pub origin_airport: String,
    pub destination_airport: String,
    pub origin_city: Option<String>,
    pub destination_city: Option<String>,
    pub date: Option<NaiveDate>,
    pub scheduled_departure: Option<DateTime<Utc>>,
    pub scheduled_arrival: Option<DateTime<Utc>>,
    pub status: FlightStatus,
    pub gate_number: Option<String>,
    #[serde(flatten)]
    pub prices: PriceTiers,
}

/// Route block nested under `flight_details` in flight instance payloads
#[derive(Debug, Default, Deserialize)]
struct FlightDetails {
    #[serde(default)]
    fnum: Option<String>,
    #[serde(default)]
    origin: Option<String>,
    #[serde(default)]
    destination: Option<String>,
    #[serde(default)]
    origin_city: Option<String>,
    #[serde(default)]
    destination_city: Option<String>,
}

/// Accepts both the nested instance shape and the flat shape this crate serializes
#[derive(Debug, Deserialize)]
struct WireFlight {
    #[serde(default)]
    id: Option<i64>,
    /// Flight number of the parent flight, referenced by key
    #[serde(default)]
    flight: Option<String>,
    #[serde(default)]
    flight_details: Option<FlightDetails>,
    #[serde(default, alias = "fnum")]
    flight_number: Option<String>,
    #[serde(default)]
    airline: Option<String>,
    #[serde(default, alias = "origin")]
    origin_airport: Option<String>,
    #[serde(default, alias = "destination")]
    destination_airport: Option<String>,
    #[serde(default)]
    origin_city: Option<String>,
    #[serde(default)]
    destination_city: Option<String>,
    #[serde(default)]
    date: Option<NaiveDate>,
    #[serde(default)]
    scheduled_departure: Option<DateTime<Utc>>,
    #[serde(default)]
    scheduled_arrival: Option<DateTime<Utc>>,
    #[serde(default)]
    status: FlightStatus,
    #[serde(default)]
    gate_number: Option<String>,
    #[serde(flatten)]
    prices: PriceTiers,
}

impl TryFrom<WireFlight> for FlightSummary {
    type Error = String;

    fn try_from(wire: WireFlight) -> Result<Self, Self::Error> {
        let details = wire.flight_details.unwrap_or_default();
        let flight_number = details
            .fnum
            .or(wire.flight_number)
            .or(wire.flight)
            .ok_or("missing flight number")?;
        let origin_airport = details.origin.or(wire.origin_airport).ok_or("missing origin airport")?;
        let destination_airport = details
            .destination
            .or(wire.destination_airport)
            .ok_or("missing destination airport")?;

        Ok(Self {
            id: wire.id,
            flight_number,
            airline: wire.airline,
            origin_airport,
            destination_airport,
            origin_city: details.origin_city.or(wire.origin_city),
            destination_city: details.destination_city.or(wire.destination_city),
            date: wire.date,
            scheduled_departure: wire.scheduled_departure,
            scheduled_arrival: wire.scheduled_arrival,
            status: wire.status,
            gate_number: wire.gate_number,
            prices: wire.prices,
        })
    }
}

impl FlightSummary {
    /// The id usable for booking: present and positive.
    pub fn bookable_id(&self) -> Option<i64> {
        self.id.filter(|id| *id > 0)
    }

    pub fn price_for(&self, class: FlightClass) -> Option<Money> {
        match class {
            FlightClass::Economy => self.prices.economy,
            FlightClass::Business => self.prices.business,
            FlightClass::First => self.prices.first,
        }
    }

    pub fn route_label(&self) -> String {
        format!("{} → {}", self.origin_airport, self.destination_airport)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirportRef {
    #[serde(alias = "code")]
    pub iata_code: String,
    pub name: String,
    #[serde(default, alias = "city_name")]
    pub city: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AirlineRef {
    pub code: String,
    pub name: String,
}

/// Dropdown data for the date-based flight listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightMenu {
    #[serde(default)]
    pub airports: Vec<AirportRef>,
    #[serde(default)]
    pub airlines: Vec<AirlineRef>,
    pub today: NaiveDate,
}

/// One page of flight results
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightPage {
    pub results: Vec<FlightSummary>,
    #[serde(default)]
    pub has_next: bool,
    #[serde(default)]
    pub page: Option<u32>,
    #[serde(default)]
    pub total: Option<u64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flight_summary_deserialization() {
        let json = r#"
            {
                "id": 42,
                "flight_number": "SK101",
                "airline": "Skylane",
                "origin_airport": "JFK",
                "destination_airport": "LAX",
                "date": "2025-06-01",
                "scheduled_departure": "2025-06-01T08:30:00Z",
                "status": "delayed",
                "economy_price": "199.90",
                "business_price": "540.00"
            }
        "#;
        let flight: FlightSummary = serde_json::from_str(json).expect("Failed to deserialize");
        assert_eq!(flight.bookable_id(), Some(42));
        assert_eq!(flight.status, FlightStatus::Delayed);
        assert_eq!(flight.price_for(FlightClass::Economy), Some(Money::from_cents(19990)));
        assert_eq!(flight.price_for(FlightClass::First), None);
        assert_eq!(flight.route_label(), "JFK → LAX");
    }

    #[test]
    fn test_flight_without_id_is_not_bookable() {
        let json = r#"{"fnum": "SK7", "origin": "CDG", "destination": "FCO", "status": "on_time"}"#;
        let flight: FlightSummary = serde_json::from_str(json).unwrap();
        assert_eq!(flight.bookable_id(), None);
        assert_eq!(flight.flight_number, "SK7");
        assert_eq!(flight.status, FlightStatus::Unknown);
    }

    #[test]
    fn test_flight_instance_with_nested_details() {
        let json = r#"
            {
                "results": [
                    {
                        "flight": "SK101",
                        "date": "2025-06-01",
                        "gate_number": "B12",
                        "price_base_multiplier": "1.20",
                        "aircraft": 3,
                        "flight_details": {
                            "fnum": "SK101",
                            "duration": "05:30:00",
                            "origin": "JFK",
                            "destination": "LAX",
                            "origin_name": "John F. Kennedy International",
                            "destination_name": "Los Angeles International",
                            "origin_city": "New York",
                            "destination_city": "Los Angeles"
                        },
                        "aircraft_details": {"aircraft_id": 3, "model": "A320", "capacity": 180},
                        "economy_price": "199.00",
                        "business_price": "540.00",
                        "first_price": "1200.00"
                    }
                ],
                "page": 1,
                "page_size": 10,
                "total": 1,
                "is_random": true
            }
        "#;
        let page: FlightPage = serde_json::from_str(json).unwrap();
        let flight = &page.results[0];
        assert_eq!(flight.flight_number, "SK101");
        assert_eq!(flight.route_label(), "JFK → LAX");
        assert_eq!(flight.origin_city.as_deref(), Some("New York"));
        assert_eq!(flight.gate_number.as_deref(), Some("B12"));
        assert_eq!(flight.price_for(FlightClass::First), Some(Money::from_cents(120000)));
        assert_eq!(flight.bookable_id(), None);
        assert_eq!(page.total, Some(1));
    }

    #[test]
    fn test_flight_number_falls_back_to_flight_key() {
        let json = r#"{"id": 9, "flight": "SK22", "origin": "CDG", "destination": "FCO"}"#;
        let flight: FlightSummary = serde_json::from_str(json).unwrap();
        assert_eq!(flight.flight_number, "SK22");
        assert_eq!(flight.bookable_id(), Some(9));
    }

    #[test]
    fn test_flight_without_route_is_rejected() {
        let err = serde_json::from_str::<FlightSummary>(r#"{"flight": "SK22"}"#).unwrap_err();
        assert!(err.to_string().contains("missing origin airport"));
    }

    #[test]
    fn test_page_defaults() {
        let page: FlightPage = serde_json::from_str(r#"{"results": []}"#).unwrap();
        assert!(!page.has_next);
        assert!(page.results.is_empty());
    }

    #[test]
    fn test_flight_class_parsing() {
        assert_eq!("business".parse::<FlightClass>().unwrap(), FlightClass::Business);
        assert_eq!(" First ".parse::<FlightClass>().unwrap(), FlightClass::First);
        assert!("premium".parse::<FlightClass>().is_err());
    }
}
