//! # Flight Offers Library
//!
//! A Rust client for searching flight offers against a flight-data provider's
//! REST API (Amadeus-compatible). Given a destination city name, the client
//! performs an OAuth2 client-credentials exchange, resolves the city to an
//! IATA airport code, issues a flight-offers search and normalizes each raw
//! offer into a flat, display-ready record.
//!
//! Reference-data lookups (airport codes, airline names) are cached for the
//! lifetime of the client, and lookup failures degrade to static fallback
//! tables rather than surfacing as errors.

pub mod client;
pub mod config;
pub mod fallback;
pub mod format;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;

// Re-export main types for convenience
pub use client::OffersClient;
pub use config::ClientConfig;

/// Error types for the flight-offers library
#[derive(Error, Debug)]
pub enum OffersError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("token exchange rejected with status {status}")]
    Auth { status: u16 },

    #[error("configuration error: {0}")]
    Config(String),
}

/// A flight-offers search request.
///
/// Only the destination city is required; the origin defaults to a fixed
/// pairing keyed off the resolved destination, and the departure date
/// defaults to seven days from today.
#[derive(Debug, Clone)]
pub struct SearchQuery {
    /// Destination city name (free text, e.g. "Paris")
    pub city: String,
    /// Origin airport code, if the caller knows it
    pub origin: Option<String>,
    /// Departure date; defaults to local today + 7 days
    pub departure_date: Option<NaiveDate>,
}

impl SearchQuery {
    /// Search for flights to a destination city with all defaults.
    pub fn to_city(city: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            origin: None,
            departure_date: None,
        }
    }
}

/// One display-ready flight offer, flattened from the provider's nested
/// itinerary/segment/price schema.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FlightOffer {
    pub id: String,
    pub airline: String,
    pub carrier_code: String,
    pub airline_logo_url: String,
    pub departure_time: String,
    pub arrival_time: String,
    pub duration: String,
    pub price: f64,
    pub currency: String,
    pub booking_url: String,
    pub stops: u32,
    pub departure_airport: String,
    pub arrival_airport: String,
    pub cabin_class: String,
}

/// Outcome of a flight-offers search.
///
/// Distinguishes "the upstream confirmed there are no offers" from "the
/// upstream could not be reached", so UI callers are not forced to render
/// both as the same empty list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum SearchOutcome {
    /// At least one normalized offer, in upstream order
    Offers(Vec<FlightOffer>),
    /// The search succeeded but returned no offers
    Empty,
    /// The search request failed; the reason is for logging/display only
    Unavailable(String),
}

impl SearchOutcome {
    /// Collapse the outcome into a plain offer list, treating both an empty
    /// result and an unavailable upstream as "no offers".
    pub fn into_offers(self) -> Vec<FlightOffer> {
        match self {
            SearchOutcome::Offers(offers) => offers,
            SearchOutcome::Empty | SearchOutcome::Unavailable(_) => Vec::new(),
        }
    }

    pub fn is_unavailable(&self) -> bool {
        matches!(self, SearchOutcome::Unavailable(_))
    }
}

/// Convenience function: build a client from environment configuration and
/// run a single search.
///
/// Constructs a fresh client per call, so reference-data caches do not carry
/// over between calls. Hold an [`OffersClient`] instead when issuing several
/// searches in one session.
pub async fn search_flights(query: SearchQuery) -> Result<SearchOutcome, OffersError> {
    let client = OffersClient::from_env()?;
    client.search_flights(query).await
}
