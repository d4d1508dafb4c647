//! Integration tests against a stub upstream
//!
//! Every test mounts its own mock provider, so nothing here touches the
//! network. The stubs speak just enough of the provider's wire format to
//! exercise token caching, reference-data fallbacks and offer normalization.

use chrono::NaiveDate;
use flight_offers::{ClientConfig, OffersClient, OffersError, SearchOutcome, SearchQuery};
use serde_json::json;
use wiremock::matchers::{body_string_contains, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer) -> OffersClient {
    OffersClient::new(ClientConfig::new("test-id", "test-secret").with_base_url(server.uri()))
        .expect("client builds")
}

async fn mount_token(server: &MockServer) {
    Mock::given(method("POST"))
        .and(path("/v1/security/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "token_type": "Bearer",
            "expires_in": 1799
        })))
        .mount(server)
        .await;
}

async fn mount_airport(server: &MockServer, city: &str, code: &str) {
    Mock::given(method("GET"))
        .and(path("/v1/reference-data/locations"))
        .and(query_param("keyword", city))
        .and(query_param("subType", "AIRPORT"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "iataCode": code, "name": city }]
        })))
        .mount(server)
        .await;
}

/// One offer: AF, cabin ECONOMY, two segments JFK->KEF->CDG, PT9H15M.
fn sample_offer() -> serde_json::Value {
    json!({
        "id": "1",
        "itineraries": [{
            "duration": "PT9H15M",
            "segments": [
                {
                    "departure": { "iataCode": "JFK", "at": "2025-09-05T18:00:00" },
                    "arrival": { "iataCode": "KEF", "at": "2025-09-06T04:10:00" },
                    "carrierCode": "AF",
                    "number": "613"
                },
                {
                    "departure": { "iataCode": "KEF", "at": "2025-09-06T05:20:00" },
                    "arrival": { "iataCode": "CDG", "at": "2025-09-06T09:15:00" },
                    "carrierCode": "AF",
                    "number": "615"
                }
            ]
        }],
        "price": { "total": "412.30", "currency": "EUR" },
        "travelerPricings": [{
            "fareDetailsBySegment": [{ "cabin": "ECONOMY" }]
        }]
    })
}

#[tokio::test]
async fn token_is_cached_between_calls() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/security/oauth2/token"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "access_token": "test-token",
            "token_type": "Bearer",
            "expires_in": 1799
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let first = client.access_token().await.unwrap();
    let second = client.access_token().await.unwrap();
    assert_eq!(first, "test-token");
    assert_eq!(first, second);
}

#[tokio::test]
async fn rejected_token_exchange_is_a_hard_error() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/v1/security/oauth2/token"))
        .respond_with(ResponseTemplate::new(401))
        .mount(&server)
        .await;

    let client = test_client(&server);
    match client.access_token().await {
        Err(OffersError::Auth { status }) => assert_eq!(status, 401),
        other => panic!("expected auth error, got {:?}", other.map(|_| ())),
    }
}

#[tokio::test]
async fn city_is_resolved_over_the_network_exactly_once() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/reference-data/locations"))
        .and(query_param("keyword", "Reykjavik"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "iataCode": "KEF" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let token = client.access_token().await.unwrap();
    assert_eq!(client.resolve_airport_code("Reykjavik", &token).await, "KEF");
    // Second resolution is a cache hit; expect(1) verifies on drop
    assert_eq!(client.resolve_airport_code("Reykjavik", &token).await, "KEF");
}

#[tokio::test]
async fn failed_locations_lookup_falls_back_to_static_table() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/reference-data/locations"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let token = client.access_token().await.unwrap();
    // Known city comes from the static table
    assert_eq!(client.resolve_airport_code("Rome", &token).await, "FCO");
    // Unknown city falls through to the fixed default
    assert_eq!(client.resolve_airport_code("Atlantis", &token).await, "CDG");
}

#[tokio::test]
async fn paris_defaults_to_jfk_origin() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_airport(&server, "Paris", "CDG").await;
    Mock::given(method("POST"))
        .and(path("/v2/shopping/flight-offers"))
        .and(body_string_contains("\"originLocationCode\":\"JFK\""))
        .and(body_string_contains("\"destinationLocationCode\":\"CDG\""))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": [sample_offer()] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let outcome = client
        .search_flights(SearchQuery::to_city("Paris"))
        .await
        .unwrap();
    assert_eq!(outcome.into_offers().len(), 1);
}

#[tokio::test]
async fn non_paris_destination_defaults_to_cdg_origin() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_airport(&server, "New York", "JFK").await;
    Mock::given(method("POST"))
        .and(path("/v2/shopping/flight-offers"))
        .and(body_string_contains("\"originLocationCode\":\"CDG\""))
        .and(body_string_contains("\"destinationLocationCode\":\"JFK\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let outcome = client
        .search_flights(SearchQuery::to_city("New York"))
        .await
        .unwrap();
    assert!(matches!(outcome, SearchOutcome::Empty));
}

#[tokio::test]
async fn colliding_origin_is_swapped_to_the_alternate() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_airport(&server, "Paris", "CDG").await;
    Mock::given(method("POST"))
        .and(path("/v2/shopping/flight-offers"))
        .and(body_string_contains("\"originLocationCode\":\"JFK\""))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    // Caller asks for CDG -> CDG; the request must carry JFK instead
    let query = SearchQuery {
        city: "Paris".to_string(),
        origin: Some("CDG".to_string()),
        departure_date: None,
    };
    client.search_flights(query).await.unwrap();
}

#[tokio::test]
async fn failed_search_degrades_to_unavailable_not_error() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_airport(&server, "Paris", "CDG").await;
    Mock::given(method("POST"))
        .and(path("/v2/shopping/flight-offers"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let outcome = client
        .search_flights(SearchQuery::to_city("Paris"))
        .await
        .unwrap();
    assert!(outcome.is_unavailable());
    assert!(outcome.into_offers().is_empty());
}

#[tokio::test]
async fn empty_result_is_distinguishable_from_unavailable() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_airport(&server, "Paris", "CDG").await;
    Mock::given(method("POST"))
        .and(path("/v2/shopping/flight-offers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let outcome = client
        .search_flights(SearchQuery::to_city("Paris"))
        .await
        .unwrap();
    assert!(matches!(outcome, SearchOutcome::Empty));
    assert!(!outcome.is_unavailable());
}

#[tokio::test]
async fn offer_is_normalized_with_airline_fallback() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    mount_airport(&server, "Paris", "CDG").await;
    // Airline lookup is down; the static carrier table must cover AF
    Mock::given(method("GET"))
        .and(path("/v1/reference-data/airlines"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(path("/v2/shopping/flight-offers"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "data": [sample_offer()] })),
        )
        .mount(&server)
        .await;

    let client = test_client(&server);
    let query = SearchQuery {
        city: "Paris".to_string(),
        origin: Some("JFK".to_string()),
        departure_date: NaiveDate::from_ymd_opt(2025, 9, 5),
    };
    let offers = client.search_flights(query).await.unwrap().into_offers();
    assert_eq!(offers.len(), 1);

    let offer = &offers[0];
    assert_eq!(offer.airline, "Air France");
    assert_eq!(offer.carrier_code, "AF");
    assert_eq!(offer.stops, 1);
    assert_eq!(offer.cabin_class, "Economy");
    assert_eq!(offer.duration, "9h 15m");
    assert_eq!(offer.departure_airport, "JFK");
    assert_eq!(offer.arrival_airport, "CDG");
    assert_eq!(offer.departure_time, "2025-09-05T18:00:00");
    assert_eq!(offer.arrival_time, "2025-09-06T09:15:00");
    assert_eq!(offer.price, 412.30);
    assert_eq!(offer.currency, "EUR");
    assert_eq!(
        offer.booking_url,
        "https://www.skyscanner.com/transport/flights/JFK/CDG/250905/"
    );
    assert_eq!(
        offer.airline_logo_url,
        "https://images.kiwi.com/airlines/64/AF.png"
    );
}

#[tokio::test]
async fn airline_name_comes_from_lookup_when_available() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/reference-data/airlines"))
        .and(query_param("airlineCodes", "FI"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "data": [{ "businessName": "ICELANDAIR", "iataCode": "FI" }]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let token = client.access_token().await.unwrap();
    assert_eq!(client.resolve_airline_name("FI", &token).await, "ICELANDAIR");
    // Cached thereafter
    assert_eq!(client.resolve_airline_name("FI", &token).await, "ICELANDAIR");
}

#[tokio::test]
async fn unknown_carrier_falls_back_to_its_code() {
    let server = MockServer::start().await;
    mount_token(&server).await;
    Mock::given(method("GET"))
        .and(path("/v1/reference-data/airlines"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "data": [] })))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let token = client.access_token().await.unwrap();
    assert_eq!(client.resolve_airline_name("ZZ", &token).await, "ZZ");
}
