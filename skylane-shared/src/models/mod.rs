pub mod flight;
pub mod location;
pub mod money;
pub mod ticket;
pub mod user;
