//! CLI interface for flight-offers

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use flight_offers::{format, OffersClient, SearchOutcome, SearchQuery};
use std::fs;

#[derive(Parser)]
#[command(name = "flight-offers")]
#[command(about = "Search flight offers to a destination city")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Search for flight offers
    Search {
        /// Destination city name (e.g. "Paris")
        #[arg(short, long)]
        city: String,
        /// Origin airport code (auto-selected if omitted)
        #[arg(short, long)]
        origin: Option<String>,
        /// Departure date (YYYY-MM-DD, defaults to 7 days from now)
        #[arg(short, long)]
        date: Option<NaiveDate>,
        /// Output file for JSON results
        #[arg(long)]
        output: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Search {
            city,
            origin,
            date,
            output,
        } => {
            let client = OffersClient::from_env()?;
            let query = SearchQuery {
                city: city.clone(),
                origin,
                departure_date: date,
            };

            println!("Searching flights to {}...", city);
            match client.search_flights(query).await {
                Ok(outcome) => {
                    let json = serde_json::to_string_pretty(&outcome)?;

                    if let Some(output_file) = output {
                        fs::write(&output_file, &json)?;
                        println!("Results saved to {}", output_file);
                    } else {
                        println!("{}", json);
                    }

                    match outcome {
                        SearchOutcome::Offers(offers) => {
                            println!("\nFound {} offers", offers.len());
                            for offer in &offers {
                                println!(
                                    "{} {} -> {}  {}  {}",
                                    offer.airline,
                                    offer.departure_airport,
                                    offer.arrival_airport,
                                    offer.duration,
                                    format::format_price(offer.price, &offer.currency)
                                );
                            }
                        }
                        SearchOutcome::Empty => println!("\nNo offers found"),
                        SearchOutcome::Unavailable(reason) => {
                            println!("\nFlight search unavailable: {}", reason)
                        }
                    }
                }
                Err(e) => {
                    eprintln!("Error searching flights: {}", e);
                    std::process::exit(1);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::try_parse_from([
            "flight-offers",
            "search",
            "--city",
            "Paris",
            "--date",
            "2025-09-05",
        ]);

        assert!(cli.is_ok());

        if let Ok(Cli {
            command: Commands::Search { city, date, .. },
        }) = cli
        {
            assert_eq!(city, "Paris");
            assert_eq!(date, NaiveDate::from_ymd_opt(2025, 9, 5));
        }
    }
}
