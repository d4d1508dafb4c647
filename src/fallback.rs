//! Static reference-data fallbacks
//!
//! Consulted when the provider's reference-data endpoints fail or return
//! nothing. Airport and carrier identity is effectively static, so a small
//! built-in table covers the destinations the application cares about.

/// Airport code used when a city resolves to nothing at all.
pub const DEFAULT_AIRPORT: &str = "CDG";

/// Alternate origin used when origin and destination collide.
pub const ALTERNATE_ORIGIN: &str = "JFK";

/// City name to IATA airport code.
pub fn airport_code(city: &str) -> Option<&'static str> {
    let code = match city {
        "Paris" => "CDG",
        "Rome" => "FCO",
        "London" => "LHR",
        "New York" => "JFK",
        "San Francisco" => "SFO",
        "Agra" => "AGR",
        "Sydney" => "SYD",
        "Rio de Janeiro" => "GIG",
        "Cairo" => "CAI",
        "Athens" => "ATH",
        "Barcelona" => "BCN",
        "Munich" => "MUC",
        "Beijing" => "PEK",
        "Amman" => "AMM",
        "Lima" => "LIM",
        "Delhi" => "DEL",
        "Istanbul" => "IST",
        _ => return None,
    };
    Some(code)
}

/// Carrier code to airline display name.
pub fn airline_name(carrier_code: &str) -> Option<&'static str> {
    let name = match carrier_code {
        "AF" => "Air France",
        "BA" => "British Airways",
        "LH" => "Lufthansa",
        "EK" => "Emirates",
        "QR" => "Qatar Airways",
        "AA" => "American Airlines",
        "DL" => "Delta Air Lines",
        "UA" => "United Airlines",
        "IB" => "Iberia",
        "KL" => "KLM",
        "TK" => "Turkish Airlines",
        _ => return None,
    };
    Some(name)
}

/// Pick a default origin for a destination when the caller supplied none.
///
/// A two-entry pairing, not a geolocation policy: Paris destinations depart
/// from New York, everything else departs from Paris.
pub fn default_origin(destination_code: &str) -> &'static str {
    if destination_code == "CDG" {
        "JFK"
    } else {
        "CDG"
    }
}

/// Guarantee a non-degenerate origin/destination pair by swapping to the
/// fixed alternate when the two collide.
pub fn disambiguate_origin(origin_code: &str, destination_code: &str) -> String {
    if origin_code != destination_code {
        return origin_code.to_string();
    }
    if origin_code == "CDG" {
        ALTERNATE_ORIGIN.to_string()
    } else {
        "CDG".to_string()
    }
}
