use tokio::sync::Mutex;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::domain::{
    BookedServices, Booking, BookingId, Flight, IntegrityReport, LedgerEntry, ServiceCatalog,
    ServiceSelection, UNREADABLE_SERVICES, build_integrity_report, normalize_code,
};
use crate::storage::{BookingLedger, FlightStore, LedgerFormat};

use super::AppError;

/// Application service providing the booking workflows.
/// This is the interface every client (CLI, tests) goes through.
///
/// Each workflow runs a full load-modify-save cycle over both files while
/// holding one lock, so calls through the same service never interleave.
/// Separate processes writing the same files are not coordinated.
#[derive(Debug)]
pub struct BookingService {
    flights: FlightStore,
    ledger: BookingLedger,
    catalog: ServiceCatalog,
    lock: Mutex<()>,
}

/// Result of booking a seat
#[derive(Debug, Clone)]
pub struct BookingResult {
    /// Zero-based ledger position of the new booking
    pub position: usize,
    pub booking: Booking,
}

/// Result of cancelling a booking
#[derive(Debug, Clone)]
pub struct CancellationResult {
    pub position: usize,
    pub booking: Booking,
    /// False when the seat could not be put back, because the flight no
    /// longer exists or the seat was already listed as available.
    pub seat_restored: bool,
}

impl BookingService {
    /// Create a service over the given stores. The catalog is expected to be
    /// valid (see [`ServiceCatalog::validate`]).
    pub fn new(flights: FlightStore, ledger: BookingLedger, catalog: ServiceCatalog) -> Self {
        Self {
            flights,
            ledger,
            catalog,
            lock: Mutex::new(()),
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            FlightStore::new(&config.storage.flights_file),
            BookingLedger::new(&config.storage.bookings_file, config.storage.ledger_format),
            config.catalog.clone(),
        )
    }

    pub fn catalog(&self) -> &ServiceCatalog {
        &self.catalog
    }

    pub fn ledger_format(&self) -> LedgerFormat {
        self.ledger.format()
    }

    // ========================
    // Flight operations
    // ========================

    /// List all flights with their available seats.
    pub async fn list_flights(&self) -> Result<Vec<Flight>, AppError> {
        let _guard = self.lock.lock().await;
        let inventory = self.flights.load().await?;
        Ok(inventory.flights().to_vec())
    }

    /// Get a single flight.
    pub async fn get_flight(&self, number: &str) -> Result<Flight, AppError> {
        let number = normalize_code(number);
        let _guard = self.lock.lock().await;
        let inventory = self.flights.load().await?;
        inventory
            .get(&number)
            .cloned()
            .ok_or(AppError::FlightNotFound(number))
    }

    // ========================
    // Services
    // ========================

    /// Turn optional per-category choices into a selection.
    /// Returns `None` when nothing was chosen at all.
    pub fn select_services(
        &self,
        food: Option<&str>,
        drink: Option<&str>,
        comfort: Option<&str>,
    ) -> Result<Option<ServiceSelection>, AppError> {
        if food.is_none() && drink.is_none() && comfort.is_none() {
            return Ok(None);
        }
        Ok(Some(self.catalog.select(food, drink, comfort)?))
    }

    /// Display text for a booking's services: names from the catalog, or a
    /// placeholder when they cannot be read. `None` if the booking has none.
    pub fn describe_services(&self, booking: &Booking) -> Option<String> {
        match &booking.services {
            None => None,
            Some(BookedServices::Selected { selection, .. }) => Some(
                self.catalog
                    .describe(selection)
                    .unwrap_or_else(|| UNREADABLE_SERVICES.to_string()),
            ),
            Some(BookedServices::Unreadable(_)) => Some(UNREADABLE_SERVICES.to_string()),
        }
    }

    // ========================
    // Booking operations
    // ========================

    /// Reserve `seat` on `flight` and record the booking.
    ///
    /// Nothing is written when the flight, seat or a service code is invalid.
    /// If the ledger append fails the seat is put back.
    pub async fn book_seat(
        &self,
        flight: &str,
        seat: &str,
        services: Option<ServiceSelection>,
    ) -> Result<BookingResult, AppError> {
        let flight_number = normalize_code(flight);
        let seat = normalize_code(seat);

        let cost = services
            .as_ref()
            .map(|selection| self.catalog.compute_cost(selection))
            .transpose()?;

        let _guard = self.lock.lock().await;
        let mut inventory = self.flights.load().await?;

        let destination = inventory
            .get(&flight_number)
            .map(|f| f.destination.clone())
            .ok_or_else(|| AppError::FlightNotFound(flight_number.clone()))?;

        inventory.reserve_seat(&flight_number, &seat)?;
        self.flights.save(&inventory).await?;

        let mut booking = Booking::new(&flight_number, destination, &seat);
        if let (Some(selection), Some(cost)) = (services, cost) {
            booking = booking.with_services(selection, cost);
        }
        if self.ledger.format().stores_ids() {
            booking = booking.identified();
        }

        match self.ledger.append(&booking).await {
            Ok(entry) => {
                info!(
                    flight = %flight_number,
                    seat = %seat,
                    position = entry.position,
                    "Seat booked"
                );
                Ok(BookingResult {
                    position: entry.position,
                    booking,
                })
            }
            Err(e) => {
                warn!(flight = %flight_number, seat = %seat, "Booking not recorded, releasing seat");
                let rolled_back = inventory.release_seat(&flight_number, &seat).is_ok()
                    && self.flights.save(&inventory).await.is_ok();
                if !rolled_back {
                    error!(
                        flight = %flight_number,
                        seat = %seat,
                        "Seat removed from inventory but no booking recorded"
                    );
                }
                Err(e.into())
            }
        }
    }

    /// List every ledger entry in file order.
    pub async fn list_bookings(&self) -> Result<Vec<LedgerEntry>, AppError> {
        let _guard = self.lock.lock().await;
        Ok(self.ledger.load_all().await?)
    }

    /// Get the ledger entry at a zero-based position.
    pub async fn get_booking(&self, position: usize) -> Result<LedgerEntry, AppError> {
        let _guard = self.lock.lock().await;
        self.entry_at(position).await
    }

    async fn entry_at(&self, position: usize) -> Result<LedgerEntry, AppError> {
        self.ledger
            .load_all()
            .await?
            .into_iter()
            .nth(position)
            .ok_or_else(|| AppError::BookingNotFound(format!("#{}", position + 1)))
    }

    /// Cancel the booking at a zero-based ledger position.
    pub async fn cancel_booking(&self, position: usize) -> Result<CancellationResult, AppError> {
        let _guard = self.lock.lock().await;
        let entry = self.entry_at(position).await?;
        self.cancel_entry(entry).await
    }

    /// Cancel a booking by its stable id (jsonl ledgers only).
    pub async fn cancel_booking_by_id(
        &self,
        id: BookingId,
    ) -> Result<CancellationResult, AppError> {
        if !self.ledger.format().stores_ids() {
            return Err(AppError::BookingIdsUnsupported);
        }

        let _guard = self.lock.lock().await;
        let entry = self
            .ledger
            .find_by_id(id)
            .await?
            .ok_or_else(|| AppError::BookingNotFound(id.to_string()))?;
        self.cancel_entry(entry).await
    }

    /// Put the seat back, then drop the ledger line. Must hold the lock.
    async fn cancel_entry(&self, entry: LedgerEntry) -> Result<CancellationResult, AppError> {
        let position = entry.position;
        let booking = entry
            .booking
            .ok_or(AppError::UnreadableBooking(position))?;

        let mut inventory = self.flights.load().await?;
        let seat_restored = match inventory.release_seat(&booking.flight_number, &booking.seat) {
            Ok(true) => {
                self.flights.save(&inventory).await?;
                true
            }
            Ok(false) => {
                warn!(
                    flight = %booking.flight_number,
                    seat = %booking.seat,
                    "Cancelled seat was already available"
                );
                false
            }
            Err(e) => {
                warn!(error = %e, "Cancelled seat cannot be restored");
                false
            }
        };

        if let Err(e) = self.ledger.remove_at(position).await {
            if seat_restored {
                let compensated = inventory
                    .reserve_seat(&booking.flight_number, &booking.seat)
                    .is_ok()
                    && self.flights.save(&inventory).await.is_ok();
                if !compensated {
                    error!(
                        flight = %booking.flight_number,
                        seat = %booking.seat,
                        position,
                        "Seat restored but booking still in ledger"
                    );
                }
            }
            return Err(e.into());
        }

        info!(
            flight = %booking.flight_number,
            seat = %booking.seat,
            position,
            "Booking cancelled"
        );
        Ok(CancellationResult {
            position,
            booking,
            seat_restored,
        })
    }

    /// Replace the services on an existing booking. `None` removes them.
    pub async fn update_services(
        &self,
        position: usize,
        selection: Option<ServiceSelection>,
    ) -> Result<Booking, AppError> {
        let cost = selection
            .as_ref()
            .map(|s| self.catalog.compute_cost(s))
            .transpose()?;

        let _guard = self.lock.lock().await;
        let entry = self.entry_at(position).await?;
        let mut booking = entry
            .booking
            .ok_or(AppError::UnreadableBooking(position))?;

        booking.services = selection.map(|selection| BookedServices::Selected {
            selection,
            cost_cents: cost,
        });

        let line = self.ledger.format_line(&booking)?;
        self.ledger.replace_at(position, line).await?;

        info!(
            flight = %booking.flight_number,
            seat = %booking.seat,
            position,
            "Booking services updated"
        );
        Ok(booking)
    }

    // ========================
    // Integrity
    // ========================

    /// Cross-check the inventory against the ledger.
    pub async fn check_integrity(&self) -> Result<IntegrityReport, AppError> {
        let _guard = self.lock.lock().await;
        let inventory = self.flights.load().await?;
        let entries = self.ledger.load_all().await?;
        Ok(build_integrity_report(&inventory, &entries))
    }
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    fn service(dir: &TempDir) -> BookingService {
        BookingService::new(
            FlightStore::new(dir.path().join("Flights.txt")),
            BookingLedger::new(dir.path().join("BookedFlights.txt"), LedgerFormat::Text),
            ServiceCatalog::default(),
        )
    }

    #[test]
    fn test_select_services_none_when_nothing_chosen() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        assert_eq!(service.select_services(None, None, None).unwrap(), None);
        assert_eq!(
            service.select_services(None, Some("d4"), None).unwrap(),
            Some(ServiceSelection::new("F0", "D4", "C0"))
        );
    }

    #[test]
    fn test_describe_services() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        let plain = Booking::new("AA100", "New York", "12A");
        assert_eq!(service.describe_services(&plain), None);

        let with = plain
            .clone()
            .with_services(ServiceSelection::new("F2", "D4", "C0"), 1150);
        assert_eq!(
            service.describe_services(&with).as_deref(),
            Some("Hot meal, Water, No comfort")
        );

        let unknown = plain.with_services(ServiceSelection::new("F9", "D4", "C0"), 0);
        assert_eq!(
            service.describe_services(&unknown).as_deref(),
            Some(UNREADABLE_SERVICES)
        );
    }

    #[tokio::test]
    async fn test_cancel_by_id_requires_jsonl() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir);

        let result = service.cancel_booking_by_id(uuid::Uuid::new_v4()).await;
        assert!(matches!(result, Err(AppError::BookingIdsUnsupported)));
    }
}
