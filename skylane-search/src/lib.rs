pub mod feed;
pub mod location;
pub mod sequence;

#[cfg(test)]
mod testing;

pub use feed::{list_flights_on, FeedError, FeedMode, FeedNotice, FeedSettings, FlightResultsFeed, LoadOutcome, ScrollMetrics};
pub use location::{LocationField, LocationSearch, LocationSearchSettings, LookupOutcome};
pub use sequence::{RequestSequence, SequenceToken};
