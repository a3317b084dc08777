// Allow dead_code because these helpers are used across different test files
// which are compiled separately
#![allow(dead_code)]

use std::path::PathBuf;

use anyhow::Result;
use flightbook::application::BookingService;
use flightbook::domain::ServiceCatalog;
use flightbook::storage::{BookingLedger, FlightStore, LedgerFormat};
use tempfile::TempDir;

/// Standard inventory used by most tests
pub const INVENTORY: &str = "\
AA100 - New York: [12A, 12B, 14C]
BA200 - London: [1A, 1B]
CC300 - Paris: []
";

pub fn flights_path(dir: &TempDir) -> PathBuf {
    dir.path().join("Flights.txt")
}

pub fn bookings_path(dir: &TempDir) -> PathBuf {
    dir.path().join("BookedFlights.txt")
}

/// Helper to build a service over files in `dir`
pub fn service_in(dir: &TempDir, format: LedgerFormat) -> BookingService {
    BookingService::new(
        FlightStore::new(flights_path(dir)),
        BookingLedger::new(bookings_path(dir), format),
        ServiceCatalog::default(),
    )
}

/// Helper to create a text-ledger service over the standard inventory
pub fn test_service() -> Result<(BookingService, TempDir)> {
    test_service_with(LedgerFormat::Text)
}

/// Helper to create a service over the standard inventory with the given ledger format
pub fn test_service_with(format: LedgerFormat) -> Result<(BookingService, TempDir)> {
    let temp_dir = TempDir::new()?;
    std::fs::write(flights_path(&temp_dir), INVENTORY)?;
    let service = service_in(&temp_dir, format);
    Ok((service, temp_dir))
}

/// Helper to create a service with no flight file at all
pub fn empty_service() -> Result<(BookingService, TempDir)> {
    let temp_dir = TempDir::new()?;
    let service = service_in(&temp_dir, LedgerFormat::Text);
    Ok((service, temp_dir))
}

pub fn read_flights(dir: &TempDir) -> String {
    std::fs::read_to_string(flights_path(dir)).unwrap()
}

pub fn read_bookings(dir: &TempDir) -> String {
    std::fs::read_to_string(bookings_path(dir)).unwrap_or_default()
}

pub fn seats(codes: &[&str]) -> Vec<String> {
    codes.iter().map(|s| s.to_string()).collect()
}
