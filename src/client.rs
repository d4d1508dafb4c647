//! HTTP client for the flight-data provider
//!
//! One client owns one HTTP connection pool, one cached bearer token and the
//! reference-data caches. Construct it once per session; each cache lives as
//! long as the client and is never invalidated (airport and carrier identity
//! is effectively static).

use crate::config::ClientConfig;
use crate::fallback;
use crate::format;
use crate::{FlightOffer, OffersError, SearchOutcome, SearchQuery};
use chrono::{Days, Local, NaiveDate};
use dashmap::DashMap;
use futures::future::join_all;
use reqwest::Client;
use serde::Deserialize;
use serde_json::json;
use std::time::{Duration, Instant};
use tokio::sync::Mutex;
use tracing::{debug, info, instrument, warn};

/// Refresh the token this long before the server-reported expiry.
const TOKEN_EXPIRY_MARGIN: Duration = Duration::from_secs(60);

/// Never request more offers than the UI will display.
const MAX_OFFERS: usize = 3;

struct CachedToken {
    token: String,
    expires_at: Instant,
}

/// Main client for searching flight offers.
pub struct OffersClient {
    http: Client,
    config: ClientConfig,
    token: Mutex<Option<CachedToken>>,
    airport_cache: DashMap<String, String>,
    airline_cache: DashMap<String, String>,
}

impl OffersClient {
    /// Create a new client with the given configuration.
    ///
    /// Every request issued by this client carries the configured timeout, so
    /// a hung upstream fails the call instead of hanging the caller.
    pub fn new(config: ClientConfig) -> Result<Self, OffersError> {
        debug!(base_url = %config.base_url, "creating offers client");
        let http = Client::builder()
            .user_agent(concat!("flight-offers/", env!("CARGO_PKG_VERSION")))
            .timeout(config.timeout)
            .build()?;

        Ok(Self {
            http,
            config,
            token: Mutex::new(None),
            airport_cache: DashMap::new(),
            airline_cache: DashMap::new(),
        })
    }

    /// Create a client from environment configuration.
    pub fn from_env() -> Result<Self, OffersError> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Return a valid bearer token, performing a client-credentials exchange
    /// when none is cached or the cached one is about to expire.
    ///
    /// A rejected exchange is a hard error; there is no fallback for
    /// authentication. The lock is held across the exchange so concurrent
    /// callers share one refresh instead of racing.
    pub async fn access_token(&self) -> Result<String, OffersError> {
        let mut slot = self.token.lock().await;

        if let Some(cached) = slot.as_ref() {
            if Instant::now() < cached.expires_at {
                debug!("reusing cached access token");
                return Ok(cached.token.clone());
            }
        }

        info!("requesting new access token");
        let response = self
            .http
            .post(format!("{}/v1/security/oauth2/token", self.config.base_url))
            .form(&[
                ("grant_type", "client_credentials"),
                ("client_id", self.config.client_id.as_str()),
                ("client_secret", self.config.client_secret.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(OffersError::Auth {
                status: status.as_u16(),
            });
        }

        let body: TokenResponse = response.json().await?;
        let lifetime = Duration::from_secs(body.expires_in).saturating_sub(TOKEN_EXPIRY_MARGIN);
        info!(expires_in = body.expires_in, "access token obtained");

        *slot = Some(CachedToken {
            token: body.access_token.clone(),
            expires_at: Instant::now() + lifetime,
        });
        Ok(body.access_token)
    }

    /// Resolve a city name to an IATA airport code.
    ///
    /// Infallible by contract: a failed or empty locations lookup falls back
    /// to the static city table, then to [`fallback::DEFAULT_AIRPORT`].
    /// Whatever value results is cached for the life of the client.
    pub async fn resolve_airport_code(&self, city: &str, token: &str) -> String {
        if let Some(code) = self.airport_cache.get(city) {
            debug!(city, code = %code.value(), "airport cache hit");
            return code.clone();
        }

        let code = match self.fetch_airport_code(city, token).await {
            Some(code) => code,
            None => {
                let code = fallback::airport_code(city).unwrap_or(fallback::DEFAULT_AIRPORT);
                warn!(city, code, "locations lookup failed, using fallback");
                code.to_string()
            }
        };

        debug!(city, code = %code, "airport code resolved");
        self.airport_cache.insert(city.to_string(), code.clone());
        code
    }

    async fn fetch_airport_code(&self, city: &str, token: &str) -> Option<String> {
        let response = self
            .http
            .get(format!(
                "{}/v1/reference-data/locations",
                self.config.base_url
            ))
            .query(&[("keyword", city), ("subType", "AIRPORT"), ("page[limit]", "1")])
            .bearer_auth(token)
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            return None;
        }

        let body: LocationsResponse = response.json().await.ok()?;
        body.data.into_iter().next()?.iata_code
    }

    /// Resolve a carrier code to an airline display name.
    ///
    /// Same shape as [`resolve_airport_code`](Self::resolve_airport_code):
    /// falls back to the static carrier table, then to the code itself, and
    /// caches whatever it resolves to.
    pub async fn resolve_airline_name(&self, carrier_code: &str, token: &str) -> String {
        if let Some(name) = self.airline_cache.get(carrier_code) {
            debug!(carrier_code, name = %name.value(), "airline cache hit");
            return name.clone();
        }

        let name = match self.fetch_airline_name(carrier_code, token).await {
            Some(name) => name,
            None => {
                let name = fallback::airline_name(carrier_code).unwrap_or(carrier_code);
                warn!(carrier_code, name, "airlines lookup failed, using fallback");
                name.to_string()
            }
        };

        self.airline_cache
            .insert(carrier_code.to_string(), name.clone());
        name
    }

    async fn fetch_airline_name(&self, carrier_code: &str, token: &str) -> Option<String> {
        let response = self
            .http
            .get(format!(
                "{}/v1/reference-data/airlines",
                self.config.base_url
            ))
            .query(&[("airlineCodes", carrier_code)])
            .bearer_auth(token)
            .send()
            .await
            .ok()?;

        if !response.status().is_success() {
            return None;
        }

        let body: AirlinesResponse = response.json().await.ok()?;
        body.data.into_iter().next()?.business_name
    }

    /// Search for flight offers to a destination city.
    ///
    /// Token acquisition, destination resolution and origin selection run
    /// strictly in sequence; per-offer normalizations run concurrently but
    /// the returned list preserves upstream order. Only an authentication
    /// failure surfaces as `Err` — a failed or empty search degrades to
    /// [`SearchOutcome::Unavailable`] / [`SearchOutcome::Empty`].
    #[instrument(level = "info", skip(self, query), fields(city = %query.city))]
    pub async fn search_flights(&self, query: SearchQuery) -> Result<SearchOutcome, OffersError> {
        let token = self.access_token().await?;

        let destination = self.resolve_airport_code(&query.city, &token).await;
        let origin = query
            .origin
            .unwrap_or_else(|| fallback::default_origin(&destination).to_string());
        let origin = fallback::disambiguate_origin(&origin, &destination);

        let departure_date = query.departure_date.unwrap_or_else(default_departure_date);
        let date_str = departure_date.format("%Y-%m-%d").to_string();

        info!(
            origin = %origin,
            destination = %destination,
            date = %date_str,
            "searching flight offers"
        );

        let body = json!({
            "currencyCode": "EUR",
            "originDestinations": [{
                "id": "1",
                "originLocationCode": origin,
                "destinationLocationCode": destination,
                "departureDateTimeRange": { "date": date_str }
            }],
            "travelers": [{ "id": "1", "travelerType": "ADULT" }],
            "sources": ["GDS"],
            "searchCriteria": { "maxFlightOffers": MAX_OFFERS }
        });

        let start = Instant::now();
        let response = match self
            .http
            .post(format!("{}/v2/shopping/flight-offers", self.config.base_url))
            .bearer_auth(&token)
            .json(&body)
            .header("Content-Type", "application/vnd.amadeus+json")
            .send()
            .await
        {
            Ok(response) => response,
            Err(e) => {
                warn!(error = %e, "offer search request failed");
                return Ok(SearchOutcome::Unavailable(format!("request failed: {}", e)));
            }
        };

        let status = response.status();
        info!(
            status = %status,
            duration_ms = start.elapsed().as_millis(),
            "offer search completed"
        );

        if !status.is_success() {
            warn!(status = %status, "offer search returned non-success status");
            return Ok(SearchOutcome::Unavailable(format!("status {}", status)));
        }

        let offers: OffersResponse = match response.json().await {
            Ok(offers) => offers,
            Err(e) => {
                warn!(error = %e, "offer search response did not decode");
                return Ok(SearchOutcome::Unavailable(format!(
                    "undecodable response: {}",
                    e
                )));
            }
        };

        if offers.data.is_empty() {
            info!("no offers returned for search");
            return Ok(SearchOutcome::Empty);
        }

        let raw: Vec<RawOffer> = offers.data.into_iter().take(MAX_OFFERS).collect();
        let normalizations = raw
            .into_iter()
            .map(|offer| self.normalize_offer(offer, &token, departure_date));
        let normalized: Vec<FlightOffer> = join_all(normalizations)
            .await
            .into_iter()
            .flatten()
            .collect();

        info!(offers = normalized.len(), "offers normalized");
        if normalized.is_empty() {
            return Ok(SearchOutcome::Empty);
        }
        Ok(SearchOutcome::Offers(normalized))
    }

    /// Flatten one raw offer into a display-ready record.
    ///
    /// Returns `None` only when the offer carries no itinerary or no segment,
    /// which the upstream schema does not normally produce; every other
    /// missing field takes a documented default.
    async fn normalize_offer(
        &self,
        offer: RawOffer,
        token: &str,
        departure_date: NaiveDate,
    ) -> Option<FlightOffer> {
        let itinerary = offer.itineraries.first()?;
        let first_segment = itinerary.segments.first()?;
        let last_segment = itinerary.segments.last()?;

        let carrier_code = first_segment.carrier_code.clone();
        let airline = self.resolve_airline_name(&carrier_code, token).await;
        let airline_logo_url = format!("https://images.kiwi.com/airlines/64/{}.png", carrier_code);

        let cabin = offer
            .traveler_pricings
            .first()
            .and_then(|tp| tp.fare_details_by_segment.first())
            .and_then(|fd| fd.cabin.as_deref())
            .unwrap_or("ECONOMY");
        let cabin_class = title_case(cabin);

        let booking_url = format::booking_url(
            &first_segment.departure.iata_code,
            &last_segment.arrival.iata_code,
            departure_date,
        );

        Some(FlightOffer {
            id: offer.id,
            airline,
            carrier_code,
            airline_logo_url,
            departure_time: first_segment.departure.at.clone(),
            arrival_time: last_segment.arrival.at.clone(),
            duration: format::parse_duration(&itinerary.duration),
            price: offer.price.total.parse().unwrap_or(0.0),
            currency: offer.price.currency.clone(),
            booking_url,
            stops: (itinerary.segments.len() - 1) as u32,
            departure_airport: first_segment.departure.iata_code.clone(),
            arrival_airport: last_segment.arrival.iata_code.clone(),
            cabin_class,
        })
    }
}

fn default_departure_date() -> NaiveDate {
    Local::now().date_naive() + Days::new(7)
}

/// First letter upper, the rest lower, as the upstream cabin names are
/// all-caps (`ECONOMY` -> `Economy`).
fn title_case(raw: &str) -> String {
    let mut chars = raw.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(|c| c.to_lowercase())).collect(),
        None => String::new(),
    }
}

// Provider wire types; only the fields the normalizer reads.

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Debug, Deserialize)]
struct LocationsResponse {
    #[serde(default)]
    data: Vec<LocationEntry>,
}

#[derive(Debug, Deserialize)]
struct LocationEntry {
    #[serde(rename = "iataCode")]
    iata_code: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AirlinesResponse {
    #[serde(default)]
    data: Vec<AirlineEntry>,
}

#[derive(Debug, Deserialize)]
struct AirlineEntry {
    #[serde(rename = "businessName")]
    business_name: Option<String>,
}

#[derive(Debug, Deserialize)]
struct OffersResponse {
    #[serde(default)]
    data: Vec<RawOffer>,
}

#[derive(Debug, Deserialize)]
struct RawOffer {
    id: String,
    #[serde(default)]
    itineraries: Vec<RawItinerary>,
    price: RawPrice,
    #[serde(rename = "travelerPricings", default)]
    traveler_pricings: Vec<RawTravelerPricing>,
}

#[derive(Debug, Deserialize)]
struct RawItinerary {
    duration: String,
    #[serde(default)]
    segments: Vec<RawSegment>,
}

#[derive(Debug, Deserialize)]
struct RawSegment {
    departure: RawEndpoint,
    arrival: RawEndpoint,
    #[serde(rename = "carrierCode")]
    carrier_code: String,
}

#[derive(Debug, Deserialize)]
struct RawEndpoint {
    #[serde(rename = "iataCode")]
    iata_code: String,
    at: String,
}

#[derive(Debug, Deserialize)]
struct RawPrice {
    total: String,
    currency: String,
}

#[derive(Debug, Deserialize)]
struct RawTravelerPricing {
    #[serde(rename = "fareDetailsBySegment", default)]
    fare_details_by_segment: Vec<RawFareDetail>,
}

#[derive(Debug, Deserialize)]
struct RawFareDetail {
    cabin: Option<String>,
}
