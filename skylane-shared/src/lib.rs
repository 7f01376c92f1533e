pub mod models;
pub mod pii;

pub use models::flight::{
    AirlineRef, AirportRef, FlightClass, FlightMenu, FlightPage, FlightStatus, FlightSummary, PriceTiers,
};
pub use models::location::{location_name, LocationId, LocationKind, LocationResults, LocationSuggestion};
pub use models::money::Money;
pub use models::ticket::{
    ActionReceipt, CheckinStatus, CreateTicketRequest, PassengerData, PaymentMethod, PaymentRecord,
    PaymentRequest, PaymentStatus, TicketRecord,
};
pub use models::user::{AuthTokens, LoginRequest, ProfileUpdate, UserProfile};
pub use pii::Masked;
