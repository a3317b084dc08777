use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use uuid::Uuid;

use crate::application::BookingService;
use crate::config::Config;
use crate::domain::{ServiceCategory, format_dollars};
use crate::io::{ExportFormat, ExportType};
use crate::logging::Verbosity;
use crate::storage::LedgerFormat;

/// flightbook - Flight seat booking ledger
#[derive(Debug, Parser)]
#[command(name = "flightbook")]
#[command(about = "Book, list and cancel flight seats stored in flat text files")]
#[command(version)]
pub struct Cli {
    /// Configuration file (defaults to ./flightbook.toml if present)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Flight inventory file (overrides configuration)
    #[arg(long, global = true, value_name = "FILE")]
    pub flights: Option<PathBuf>,

    /// Booking ledger file (overrides configuration)
    #[arg(long, global = true, value_name = "FILE")]
    pub bookings: Option<PathBuf>,

    /// Booking ledger format: text, jsonl (overrides configuration)
    #[arg(long, global = true, value_name = "FORMAT")]
    pub ledger_format: Option<LedgerFormat>,

    /// Increase log output (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List flights and how many seats are left
    Flights,

    /// Show the available seats on a flight
    Seats {
        /// Flight number
        flight: String,
    },

    /// List the in-flight service menus
    Services,

    /// Book a seat, optionally with in-flight services
    Book {
        /// Flight number
        flight: String,

        /// Seat code (e.g. 12A)
        seat: String,

        /// Food code (defaults to F0 when another service is chosen)
        #[arg(long)]
        food: Option<String>,

        /// Drink code (defaults to D0 when another service is chosen)
        #[arg(long)]
        drink: Option<String>,

        /// Comfort code (defaults to C0 when another service is chosen)
        #[arg(long)]
        comfort: Option<String>,
    },

    /// List booked seats
    Bookings,

    /// Cancel a booking and release its seat
    Cancel {
        /// Booking number as shown by `bookings`
        #[arg(required_unless_present = "id", conflicts_with = "id")]
        number: Option<usize>,

        /// Booking id (jsonl ledgers only)
        #[arg(long)]
        id: Option<String>,
    },

    /// Change the services on an existing booking
    Amend {
        /// Booking number as shown by `bookings`
        number: usize,

        /// Food code
        #[arg(long)]
        food: Option<String>,

        /// Drink code
        #[arg(long)]
        drink: Option<String>,

        /// Comfort code
        #[arg(long)]
        comfort: Option<String>,

        /// Remove all services from the booking
        #[arg(long, conflicts_with_all = ["food", "drink", "comfort"])]
        clear: bool,
    },

    /// Verify that the inventory and the ledger agree
    Check,

    /// Export data to CSV or JSON
    Export {
        /// What to export: bookings, flights
        export_type: ExportType,

        /// Output file (stdout if omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Format: csv, json
        #[arg(short, long, default_value = "csv")]
        format: ExportFormat,
    },
}

impl Cli {
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }

    /// Load configuration and apply command-line overrides.
    pub fn load_config(&self) -> Result<Config> {
        let mut config = Config::load_from(self.config.as_deref())?;

        if let Some(flights) = &self.flights {
            config.storage.flights_file = flights.clone();
        }
        if let Some(bookings) = &self.bookings {
            config.storage.bookings_file = bookings.clone();
        }
        if let Some(format) = self.ledger_format {
            config.storage.ledger_format = format;
        }

        config.validate()?;
        Ok(config)
    }

    pub async fn run(self) -> Result<()> {
        let config = self.load_config()?;
        let service = BookingService::from_config(&config);

        match self.command {
            Commands::Flights => run_flights_command(&service).await?,

            Commands::Seats { flight } => {
                let flight = service.get_flight(&flight).await?;
                if flight.seats.is_empty() {
                    println!("No seats available on {}.", flight.number);
                } else {
                    println!(
                        "Seats available on {} ({}): {}",
                        flight.number,
                        flight.destination,
                        flight.seats.join(", ")
                    );
                }
            }

            Commands::Services => run_services_command(&service),

            Commands::Book {
                flight,
                seat,
                food,
                drink,
                comfort,
            } => {
                let services =
                    service.select_services(food.as_deref(), drink.as_deref(), comfort.as_deref())?;
                let result = service.book_seat(&flight, &seat, services).await?;
                let booking = &result.booking;

                println!(
                    "Seat {} booked on {} to {} (booking #{})",
                    booking.seat,
                    booking.flight_number,
                    booking.destination,
                    result.position + 1
                );
                if let Some(names) = service.describe_services(booking) {
                    println!("  Services: {}", names);
                }
                if let Some(cost) = booking.cost_cents() {
                    println!("  Additional cost: {}", format_dollars(cost));
                }
                if let Some(id) = booking.id {
                    println!("  Booking id: {}", id);
                }
            }

            Commands::Bookings => run_bookings_command(&service).await?,

            Commands::Cancel { number, id } => {
                let result = match (number, id) {
                    (_, Some(id)) => {
                        let id = Uuid::parse_str(&id)
                            .context("Invalid booking id format (expected UUID)")?;
                        service.cancel_booking_by_id(id).await?
                    }
                    (Some(number), None) => service.cancel_booking(position_of(number)?).await?,
                    (None, None) => bail!("Give a booking number or --id"),
                };

                let booking = &result.booking;
                println!(
                    "Cancelled booking #{}: seat {} on {}",
                    result.position + 1,
                    booking.seat,
                    booking.flight_number
                );
                if !result.seat_restored {
                    println!("  Seat was not returned to the flight (see log for details).");
                }
            }

            Commands::Amend {
                number,
                food,
                drink,
                comfort,
                clear,
            } => {
                let selection = if clear {
                    None
                } else {
                    match service.select_services(
                        food.as_deref(),
                        drink.as_deref(),
                        comfort.as_deref(),
                    )? {
                        Some(selection) => Some(selection),
                        None => bail!("Choose at least one of --food, --drink, --comfort or --clear"),
                    }
                };

                let booking = service
                    .update_services(position_of(number)?, selection)
                    .await?;
                match service.describe_services(&booking) {
                    Some(names) => println!(
                        "Booking #{} services: {} ({})",
                        number,
                        names,
                        format_dollars(booking.cost_cents().unwrap_or(0))
                    ),
                    None => println!("Booking #{} services removed", number),
                }
            }

            Commands::Check => run_check_command(&service).await?,

            Commands::Export {
                export_type,
                output,
                format,
            } => run_export_command(&service, export_type, output, format).await?,
        }

        Ok(())
    }
}

/// Convert a 1-based booking number into a ledger position.
fn position_of(number: usize) -> Result<usize> {
    if number == 0 {
        bail!("Booking numbers start at 1");
    }
    Ok(number - 1)
}

async fn run_flights_command(service: &BookingService) -> Result<()> {
    let flights = service.list_flights().await?;
    if flights.is_empty() {
        println!("No flights available.");
        return Ok(());
    }

    println!("{:<10} {:<24} {:>10}", "FLIGHT", "DESTINATION", "SEATS LEFT");
    println!("{}", "-".repeat(46));
    for flight in flights {
        println!(
            "{:<10} {:<24} {:>10}",
            flight.number,
            flight.destination,
            flight.seats_left()
        );
    }
    Ok(())
}

fn run_services_command(service: &BookingService) {
    let catalog = service.catalog();
    for category in ServiceCategory::ALL {
        println!("{}", category.as_str().to_uppercase());
        for item in catalog.menu(category) {
            println!(
                "  {:<4} {:<20} {:>8}",
                item.code,
                item.name,
                format_dollars(item.price_cents)
            );
        }
    }
}

async fn run_bookings_command(service: &BookingService) -> Result<()> {
    let entries = service.list_bookings().await?;
    if entries.is_empty() {
        println!("No booked flights yet.");
        return Ok(());
    }

    println!(
        "{:<4} {:<8} {:<20} {:<5} {:<32} {:>8}",
        "#", "FLIGHT", "DESTINATION", "SEAT", "SERVICES", "COST"
    );
    println!("{}", "-".repeat(82));
    for entry in entries {
        let number = entry.position + 1;
        let Some(booking) = &entry.booking else {
            println!("{:<4} (unreadable) {}", number, entry.line);
            continue;
        };

        println!(
            "{:<4} {:<8} {:<20} {:<5} {:<32} {:>8}",
            number,
            booking.flight_number,
            booking.destination,
            booking.seat,
            service
                .describe_services(booking)
                .unwrap_or_else(|| "-".to_string()),
            booking
                .cost_cents()
                .map(format_dollars)
                .unwrap_or_else(|| "-".to_string())
        );
        if let Some(id) = booking.id {
            println!("     id: {}", id);
        }
    }
    Ok(())
}

async fn run_check_command(service: &BookingService) -> Result<()> {
    println!("Checking bookings against flight inventory...\n");

    let report = service.check_integrity().await?;

    println!("Flights:         {}", report.flight_count);
    println!("Available seats: {}", report.available_seats);
    println!("Bookings:        {}", report.booking_count);
    println!();

    let warnings: Vec<_> = report.warnings().collect();
    if !warnings.is_empty() {
        println!("Warnings:");
        for warning in warnings {
            println!("  - {}", warning);
        }
        println!();
    }

    if report.is_healthy() {
        println!("Inventory and ledger are consistent.");
    } else {
        println!("Issues found:");
        for issue in report.errors() {
            println!("  - {}", issue);
        }
        bail!("Integrity check failed");
    }

    Ok(())
}

async fn run_export_command(
    service: &BookingService,
    export_type: ExportType,
    output: Option<PathBuf>,
    format: ExportFormat,
) -> Result<()> {
    use crate::io::Exporter;
    use std::fs::File;
    use std::io::{Write, stdout};

    let exporter = Exporter::new(service);

    let writer: Box<dyn Write> = match &output {
        Some(path) => {
            let file = File::create(path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            Box::new(file)
        }
        None => Box::new(stdout()),
    };

    let count = match (export_type, format) {
        (ExportType::Bookings, ExportFormat::Csv) => exporter.export_bookings_csv(writer).await?,
        (ExportType::Bookings, ExportFormat::Json) => exporter.export_bookings_json(writer).await?,
        (ExportType::Flights, ExportFormat::Csv) => exporter.export_flights_csv(writer).await?,
        (ExportType::Flights, ExportFormat::Json) => exporter.export_flights_json(writer).await?,
    };

    if output.is_some() {
        eprintln!("Exported {} {}", count, export_type.as_str());
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_book_with_services() {
        let cli = Cli::parse_from([
            "flightbook", "book", "aa100", "12a", "--food", "F2", "--drink", "D4",
        ]);

        match cli.command {
            Commands::Book {
                flight,
                seat,
                food,
                drink,
                comfort,
            } => {
                assert_eq!(flight, "aa100");
                assert_eq!(seat, "12a");
                assert_eq!(food.as_deref(), Some("F2"));
                assert_eq!(drink.as_deref(), Some("D4"));
                assert!(comfort.is_none());
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_parse_global_overrides() {
        let cli = Cli::parse_from([
            "flightbook",
            "bookings",
            "--bookings",
            "ledger.jsonl",
            "--ledger-format",
            "jsonl",
            "-vv",
        ]);

        assert_eq!(cli.bookings, Some(PathBuf::from("ledger.jsonl")));
        assert_eq!(cli.ledger_format, Some(LedgerFormat::Jsonl));
        assert_eq!(cli.verbosity(), Verbosity::Debug);
    }

    #[test]
    fn test_cancel_requires_number_or_id() {
        assert!(Cli::try_parse_from(["flightbook", "cancel"]).is_err());
        assert!(Cli::try_parse_from(["flightbook", "cancel", "2"]).is_ok());
        assert!(
            Cli::try_parse_from(["flightbook", "cancel", "2", "--id", "x"]).is_err()
        );
    }

    #[test]
    fn test_amend_clear_conflicts_with_codes() {
        assert!(
            Cli::try_parse_from(["flightbook", "amend", "1", "--clear", "--food", "F1"]).is_err()
        );
    }

    #[test]
    fn test_unknown_export_type_is_rejected_before_output() {
        let dir = tempfile::TempDir::new().unwrap();
        let out = dir.path().join("out.csv");
        std::fs::write(&out, "keep me").unwrap();

        let result = Cli::try_parse_from([
            "flightbook",
            "export",
            "bogus",
            "-o",
            out.to_str().unwrap(),
        ]);

        assert!(result.is_err());
        assert_eq!(std::fs::read_to_string(&out).unwrap(), "keep me");

        let cli = Cli::parse_from(["flightbook", "export", "flights", "-f", "json"]);
        match cli.command {
            Commands::Export {
                export_type,
                format,
                ..
            } => {
                assert_eq!(export_type, ExportType::Flights);
                assert_eq!(format, ExportFormat::Json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_position_of() {
        assert_eq!(position_of(1).unwrap(), 0);
        assert!(position_of(0).is_err());
    }

    #[test]
    fn test_load_config_applies_overrides() {
        let dir = tempfile::TempDir::new().unwrap();
        let config_path = dir.path().join("flightbook.toml");
        std::fs::write(&config_path, "[storage]\nflights_file = \"inventory.txt\"\n").unwrap();

        let cli = Cli::parse_from([
            "flightbook",
            "flights",
            "--config",
            config_path.to_str().unwrap(),
            "--bookings",
            "ledger.txt",
        ]);
        let config = cli.load_config().unwrap();

        assert_eq!(config.storage.flights_file, PathBuf::from("inventory.txt"));
        assert_eq!(config.storage.bookings_file, PathBuf::from("ledger.txt"));
    }
}
