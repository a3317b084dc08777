use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Cents, ServiceSelection};

pub type BookingId = Uuid;

/// Shown instead of service names when a record's services cannot be read.
pub const UNREADABLE_SERVICES: &str = "error parsing services";

/// Add-ons attached to a booking, as read back from the ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BookedServices {
    Selected {
        selection: ServiceSelection,
        /// Total add-on cost. Older records may carry services without a cost.
        cost_cents: Option<Cents>,
    },
    /// The services part of the record exists but could not be parsed.
    /// Holds the raw text so it can be reported.
    Unreadable(String),
}

/// A seat held on a flight.
///
/// `destination` is copied from the flight at booking time and is not kept in
/// sync afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Booking {
    /// Stable identifier. Only records written in the structured ledger
    /// format have one; otherwise the ledger position is the identity.
    pub id: Option<BookingId>,
    pub flight_number: String,
    pub destination: String,
    pub seat: String,
    pub services: Option<BookedServices>,
    pub booked_at: Option<DateTime<Utc>>,
}

impl Booking {
    pub fn new(
        flight_number: impl Into<String>,
        destination: impl Into<String>,
        seat: impl Into<String>,
    ) -> Self {
        Self {
            id: None,
            flight_number: flight_number.into(),
            destination: destination.into(),
            seat: seat.into(),
            services: None,
            booked_at: None,
        }
    }

    pub fn with_services(mut self, selection: ServiceSelection, cost_cents: Cents) -> Self {
        self.services = Some(BookedServices::Selected {
            selection,
            cost_cents: Some(cost_cents),
        });
        self
    }

    /// Assign a fresh id and timestamp.
    pub fn identified(mut self) -> Self {
        self.id = Some(Uuid::new_v4());
        self.booked_at = Some(Utc::now());
        self
    }

    pub fn selection(&self) -> Option<&ServiceSelection> {
        match &self.services {
            Some(BookedServices::Selected { selection, .. }) => Some(selection),
            _ => None,
        }
    }

    pub fn cost_cents(&self) -> Option<Cents> {
        match &self.services {
            Some(BookedServices::Selected { cost_cents, .. }) => *cost_cents,
            _ => None,
        }
    }
}

/// One non-blank line of the booking ledger.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    /// Zero-based position among the ledger's non-blank lines.
    pub position: usize,
    /// The line exactly as stored, without its line terminator.
    pub line: String,
    /// `None` when the line is not a readable booking.
    pub booking: Option<Booking>,
}

impl LedgerEntry {
    pub fn is_readable(&self) -> bool {
        self.booking.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_booking_has_no_services() {
        let booking = Booking::new("AA100", "New York", "12A");

        assert!(booking.id.is_none());
        assert!(booking.selection().is_none());
        assert_eq!(booking.cost_cents(), None);
    }

    #[test]
    fn test_with_services() {
        let booking = Booking::new("AA100", "New York", "12A")
            .with_services(ServiceSelection::new("F2", "D4", "C0"), 1150);

        assert_eq!(booking.selection().unwrap().food, "F2");
        assert_eq!(booking.cost_cents(), Some(1150));
    }

    #[test]
    fn test_unreadable_services_expose_nothing() {
        let mut booking = Booking::new("AA100", "New York", "12A");
        booking.services = Some(BookedServices::Unreadable("SERVICES:F2".into()));

        assert!(booking.selection().is_none());
        assert_eq!(booking.cost_cents(), None);
    }

    #[test]
    fn test_identified_assigns_id_and_time() {
        let booking = Booking::new("AA100", "New York", "12A").identified();

        assert!(booking.id.is_some());
        assert!(booking.booked_at.is_some());
    }
}
