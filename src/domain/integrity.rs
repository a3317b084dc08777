use std::collections::HashMap;
use std::fmt;

use super::{BookedServices, FlightInventory, LedgerEntry};

/// A consistency problem between the flight inventory and the booking ledger.
/// Positions are zero-based ledger positions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IntegrityIssue {
    /// A booked seat is still listed as available.
    SeatBookedAndAvailable {
        position: usize,
        flight: String,
        seat: String,
    },
    /// Two bookings hold the same seat.
    DuplicateBooking {
        first: usize,
        second: usize,
        flight: String,
        seat: String,
    },
    /// A booking refers to a flight missing from the inventory.
    UnknownFlight { position: usize, flight: String },
    /// A ledger line could not be read as a booking at all.
    UnreadableEntry { position: usize },
    /// A booking's services part could not be read.
    UnreadableServices { position: usize },
    /// The destination recorded on the booking differs from the flight's
    /// current destination.
    DestinationDrift {
        position: usize,
        flight: String,
        booked: String,
        current: String,
    },
}

impl IntegrityIssue {
    /// Warnings are reported but do not make the ledger unhealthy.
    pub fn is_warning(&self) -> bool {
        matches!(
            self,
            IntegrityIssue::UnreadableServices { .. } | IntegrityIssue::DestinationDrift { .. }
        )
    }
}

impl fmt::Display for IntegrityIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            IntegrityIssue::SeatBookedAndAvailable {
                position,
                flight,
                seat,
            } => write!(
                f,
                "booking #{}: seat {} on {} is booked but still listed as available",
                position + 1,
                seat,
                flight
            ),
            IntegrityIssue::DuplicateBooking {
                first,
                second,
                flight,
                seat,
            } => write!(
                f,
                "bookings #{} and #{} both hold seat {} on {}",
                first + 1,
                second + 1,
                seat,
                flight
            ),
            IntegrityIssue::UnknownFlight { position, flight } => {
                write!(f, "booking #{}: flight {} does not exist", position + 1, flight)
            }
            IntegrityIssue::UnreadableEntry { position } => {
                write!(f, "booking #{}: line could not be read", position + 1)
            }
            IntegrityIssue::UnreadableServices { position } => {
                write!(f, "booking #{}: services could not be read", position + 1)
            }
            IntegrityIssue::DestinationDrift {
                position,
                flight,
                booked,
                current,
            } => write!(
                f,
                "booking #{}: booked to '{}' but flight {} now goes to '{}'",
                position + 1,
                booked,
                flight,
                current
            ),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IntegrityReport {
    pub flight_count: usize,
    pub available_seats: usize,
    pub booking_count: usize,
    pub issues: Vec<IntegrityIssue>,
}

impl IntegrityReport {
    pub fn is_healthy(&self) -> bool {
        self.issues.iter().all(IntegrityIssue::is_warning)
    }

    pub fn errors(&self) -> impl Iterator<Item = &IntegrityIssue> {
        self.issues.iter().filter(|issue| !issue.is_warning())
    }

    pub fn warnings(&self) -> impl Iterator<Item = &IntegrityIssue> {
        self.issues.iter().filter(|issue| issue.is_warning())
    }
}

/// Check that available and booked seats partition each flight's seats and
/// flag everything else that looks off in the ledger.
pub fn build_integrity_report(
    inventory: &FlightInventory,
    entries: &[LedgerEntry],
) -> IntegrityReport {
    let mut issues = Vec::new();
    let mut holders: HashMap<(&str, &str), usize> = HashMap::new();
    let mut booking_count = 0;

    for entry in entries {
        let Some(booking) = &entry.booking else {
            issues.push(IntegrityIssue::UnreadableEntry {
                position: entry.position,
            });
            continue;
        };
        booking_count += 1;

        if matches!(booking.services, Some(BookedServices::Unreadable(_))) {
            issues.push(IntegrityIssue::UnreadableServices {
                position: entry.position,
            });
        }

        let key = (booking.flight_number.as_str(), booking.seat.as_str());
        if let Some(&first) = holders.get(&key) {
            issues.push(IntegrityIssue::DuplicateBooking {
                first,
                second: entry.position,
                flight: booking.flight_number.clone(),
                seat: booking.seat.clone(),
            });
        } else {
            holders.insert(key, entry.position);
        }

        match inventory.get(&booking.flight_number) {
            None => issues.push(IntegrityIssue::UnknownFlight {
                position: entry.position,
                flight: booking.flight_number.clone(),
            }),
            Some(flight) => {
                if flight.has_seat(&booking.seat) {
                    issues.push(IntegrityIssue::SeatBookedAndAvailable {
                        position: entry.position,
                        flight: booking.flight_number.clone(),
                        seat: booking.seat.clone(),
                    });
                }
                if flight.destination != booking.destination {
                    issues.push(IntegrityIssue::DestinationDrift {
                        position: entry.position,
                        flight: booking.flight_number.clone(),
                        booked: booking.destination.clone(),
                        current: flight.destination.clone(),
                    });
                }
            }
        }
    }

    IntegrityReport {
        flight_count: inventory.len(),
        available_seats: inventory.available_seats(),
        booking_count,
        issues,
    }
}
