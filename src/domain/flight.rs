use serde::{Deserialize, Serialize};

/// A flight and the seats still available on it.
/// A seat is bookable exactly when its code is present in `seats`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flight {
    pub number: String,
    pub destination: String,
    pub seats: Vec<String>,
}

impl Flight {
    pub fn new(
        number: impl Into<String>,
        destination: impl Into<String>,
        seats: Vec<String>,
    ) -> Self {
        Self {
            number: number.into(),
            destination: destination.into(),
            seats,
        }
    }

    pub fn has_seat(&self, seat: &str) -> bool {
        self.seats.iter().any(|s| s == seat)
    }

    pub fn seats_left(&self) -> usize {
        self.seats.len()
    }
}

/// Normalize user input for flight numbers and seat codes: trimmed, upper-case.
pub fn normalize_code(input: &str) -> String {
    input.trim().to_uppercase()
}

/// The full flight inventory, in file order.
///
/// Order matters: saving writes flights back in the order they were loaded so
/// an untouched inventory file round-trips unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlightInventory {
    flights: Vec<Flight>,
}

impl FlightInventory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a flight. A flight with the same number is replaced in place.
    /// Returns true if an existing flight was replaced.
    pub fn insert(&mut self, flight: Flight) -> bool {
        match self.flights.iter_mut().find(|f| f.number == flight.number) {
            Some(existing) => {
                *existing = flight;
                true
            }
            None => {
                self.flights.push(flight);
                false
            }
        }
    }

    pub fn flights(&self) -> &[Flight] {
        &self.flights
    }

    pub fn get(&self, number: &str) -> Option<&Flight> {
        self.flights.iter().find(|f| f.number == number)
    }

    pub fn is_empty(&self) -> bool {
        self.flights.is_empty()
    }

    pub fn len(&self) -> usize {
        self.flights.len()
    }

    /// Total number of available seats across all flights.
    pub fn available_seats(&self) -> usize {
        self.flights.iter().map(Flight::seats_left).sum()
    }

    /// Remove `seat` from the flight's available list.
    /// Nothing is mutated when the flight or seat is unknown.
    pub fn reserve_seat(&mut self, number: &str, seat: &str) -> Result<(), SeatError> {
        let flight = self
            .flights
            .iter_mut()
            .find(|f| f.number == number)
            .ok_or_else(|| SeatError::FlightNotFound(number.to_string()))?;

        let index = flight
            .seats
            .iter()
            .position(|s| s == seat)
            .ok_or_else(|| SeatError::SeatUnavailable {
                flight: number.to_string(),
                seat: seat.to_string(),
            })?;

        flight.seats.remove(index);
        Ok(())
    }

    /// Put `seat` back on the flight and re-sort the seat list.
    ///
    /// Returns `Ok(false)` when the seat was already listed, in which case the
    /// list is left as it was.
    pub fn release_seat(&mut self, number: &str, seat: &str) -> Result<bool, SeatError> {
        let flight = self
            .flights
            .iter_mut()
            .find(|f| f.number == number)
            .ok_or_else(|| SeatError::FlightNotFound(number.to_string()))?;

        if flight.has_seat(seat) {
            return Ok(false);
        }

        flight.seats.push(seat.to_string());
        flight.seats.sort();
        Ok(true)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SeatError {
    FlightNotFound(String),
    SeatUnavailable { flight: String, seat: String },
}

impl std::fmt::Display for SeatError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SeatError::FlightNotFound(number) => write!(f, "Invalid flight number: {}", number),
            SeatError::SeatUnavailable { flight, seat } => {
                write!(f, "Seat {} is not available on flight {}", seat, flight)
            }
        }
    }
}

impl std::error::Error for SeatError {}
