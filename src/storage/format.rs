//! Line formats for the flight inventory and booking ledger files.
//!
//! Inventory lines look like `AA100 - New York: [12A, 12B]`.
//! Text ledger lines look like `AA100 - New York: 12A`, optionally followed by
//! `| SERVICES:F2,D4,C0 | COST:$11.50`. JSON ledger lines hold one
//! [`LedgerRecord`] each.

use anyhow::{Result, anyhow, bail};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use uuid::Uuid;

use crate::domain::{
    BookedServices, Booking, BookingId, Cents, Flight, FlightInventory, ServiceSelection,
    format_dollars, parse_cents,
};

const SERVICES_PREFIX: &str = "SERVICES:";
const COST_PREFIX: &str = "COST:";

// ========================
// Flight inventory
// ========================

/// Parse one inventory line.
/// Lines without a `:` are not flight lines and yield `Ok(None)`.
pub fn parse_flight_line(line: &str) -> Result<Option<Flight>> {
    let line = line.trim();
    let Some((info, seats)) = line.rsplit_once(':') else {
        return Ok(None);
    };
    // Booking lines use '|' to separate services, so it cannot appear in a flight.
    if line.contains('|') {
        bail!("'|' is not allowed in flight lines");
    }

    let (number, destination) = info
        .split_once(" - ")
        .ok_or_else(|| anyhow!("expected '<flight> - <destination>' before ':'"))?;
    let number = number.trim();
    let destination = destination.trim();
    if number.is_empty() {
        bail!("missing flight number");
    }

    let seats = seats.trim();
    let inner = seats
        .strip_prefix('[')
        .and_then(|s| s.strip_suffix(']'))
        .ok_or_else(|| anyhow!("seat list must be enclosed in [ ]"))?;

    let mut seats: Vec<String> = Vec::new();
    for seat in inner.split(',').map(str::trim).filter(|s| !s.is_empty()) {
        if seats.iter().any(|s| s == seat) {
            warn!(flight = %number, seat = %seat, "Duplicate seat in inventory, keeping one");
        } else {
            seats.push(seat.to_string());
        }
    }

    Ok(Some(Flight::new(number, destination, seats)))
}

pub fn format_flight_line(flight: &Flight) -> String {
    format!(
        "{} - {}: [{}]",
        flight.number,
        flight.destination,
        flight.seats.join(", ")
    )
}

/// Parse a whole inventory file. Bad lines are logged and skipped.
pub fn parse_inventory(content: &str) -> FlightInventory {
    let mut inventory = FlightInventory::new();

    for (index, line) in content.lines().enumerate() {
        match parse_flight_line(line) {
            Ok(Some(flight)) => {
                let number = flight.number.clone();
                if inventory.insert(flight) {
                    warn!(line = index + 1, flight = %number, "Duplicate flight entry, keeping the later one");
                }
            }
            Ok(None) => {}
            Err(e) => warn!(line = index + 1, error = %e, "Skipping malformed flight line"),
        }
    }

    inventory
}

pub fn format_inventory(inventory: &FlightInventory) -> String {
    inventory
        .flights()
        .iter()
        .map(|flight| format_flight_line(flight) + "\n")
        .collect()
}

// ========================
// Text ledger
// ========================

pub fn format_booking_line(booking: &Booking) -> String {
    let mut line = format!(
        "{} - {}: {}",
        booking.flight_number, booking.destination, booking.seat
    );

    match &booking.services {
        None => {}
        Some(BookedServices::Selected {
            selection,
            cost_cents,
        }) => {
            line.push_str(&format!(
                " | {}{},{},{}",
                SERVICES_PREFIX, selection.food, selection.drink, selection.comfort
            ));
            if let Some(cost) = cost_cents {
                line.push_str(&format!(" | {}{}", COST_PREFIX, format_dollars(*cost)));
            }
        }
        Some(BookedServices::Unreadable(raw)) => {
            line.push_str(" | ");
            line.push_str(raw);
        }
    }

    line
}

/// Parse a text ledger line. `None` when the booking part itself is unreadable;
/// a readable booking with broken services degrades to
/// [`BookedServices::Unreadable`].
pub fn parse_booking_line(line: &str) -> Option<Booking> {
    let mut segments = line.split('|');
    let base = segments.next()?.trim();

    let (info, seat) = base.rsplit_once(':')?;
    let (number, destination) = info.split_once(" - ")?;
    let number = number.trim();
    let seat = seat.trim();
    if number.is_empty() || seat.is_empty() {
        return None;
    }

    let rest: Vec<&str> = segments.map(str::trim).collect();
    let mut booking = Booking::new(number, destination.trim(), seat);
    if !rest.is_empty() {
        booking.services = Some(parse_services(&rest));
    }
    Some(booking)
}

fn parse_services(segments: &[&str]) -> BookedServices {
    let unreadable = || BookedServices::Unreadable(segments.join(" | "));

    let mut selection = None;
    let mut cost_cents = None;

    for segment in segments {
        if let Some(codes) = segment.strip_prefix(SERVICES_PREFIX) {
            match parse_codes(codes) {
                Some(parsed) if selection.is_none() => selection = Some(parsed),
                _ => return unreadable(),
            }
        } else if let Some(cost) = segment.strip_prefix(COST_PREFIX) {
            match parse_cents(cost) {
                Ok(parsed) if cost_cents.is_none() => cost_cents = Some(parsed),
                _ => return unreadable(),
            }
        } else {
            return unreadable();
        }
    }

    match selection {
        Some(selection) => BookedServices::Selected {
            selection,
            cost_cents,
        },
        None => unreadable(),
    }
}

fn parse_codes(codes: &str) -> Option<ServiceSelection> {
    let codes: Vec<&str> = codes.split(',').map(str::trim).collect();
    match codes.as_slice() {
        [food, drink, comfort]
            if !food.is_empty() && !drink.is_empty() && !comfort.is_empty() =>
        {
            Some(ServiceSelection::new(*food, *drink, *comfort))
        }
        _ => None,
    }
}

// ========================
// JSON-lines ledger
// ========================

/// One booking as stored in the JSON-lines ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LedgerRecord {
    pub id: BookingId,
    pub flight_number: String,
    pub destination: String,
    pub seat: String,
    /// Kept as a raw value so a damaged services object degrades instead of
    /// making the whole record unreadable.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub services: Option<serde_json::Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cost_cents: Option<Cents>,
    pub booked_at: DateTime<Utc>,
}

impl From<&Booking> for LedgerRecord {
    fn from(booking: &Booking) -> Self {
        let (services, cost_cents) = match &booking.services {
            None => (None, None),
            Some(BookedServices::Selected {
                selection,
                cost_cents,
            }) => (serde_json::to_value(selection).ok(), *cost_cents),
            Some(BookedServices::Unreadable(raw)) => {
                (Some(serde_json::Value::String(raw.clone())), None)
            }
        };

        Self {
            id: booking.id.unwrap_or_else(Uuid::new_v4),
            flight_number: booking.flight_number.clone(),
            destination: booking.destination.clone(),
            seat: booking.seat.clone(),
            services,
            cost_cents,
            booked_at: booking.booked_at.unwrap_or_else(Utc::now),
        }
    }
}

impl From<LedgerRecord> for Booking {
    fn from(record: LedgerRecord) -> Self {
        let services = record.services.map(|value| {
            match serde_json::from_value::<ServiceSelection>(value.clone()) {
                Ok(selection) => BookedServices::Selected {
                    selection,
                    cost_cents: record.cost_cents,
                },
                Err(_) => BookedServices::Unreadable(value.to_string()),
            }
        });

        Booking {
            id: Some(record.id),
            flight_number: record.flight_number,
            destination: record.destination,
            seat: record.seat,
            services,
            booked_at: Some(record.booked_at),
        }
    }
}

pub fn format_booking_json(booking: &Booking) -> Result<String> {
    Ok(serde_json::to_string(&LedgerRecord::from(booking))?)
}

pub fn parse_booking_json(line: &str) -> Option<Booking> {
    serde_json::from_str::<LedgerRecord>(line)
        .ok()
        .map(Booking::from)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_flight_line() {
        let flight = parse_flight_line("AA100 - New York: [12A, 12B, 14C]")
            .unwrap()
            .unwrap();

        assert_eq!(flight.number, "AA100");
        assert_eq!(flight.destination, "New York");
        assert_eq!(flight.seats, vec!["12A", "12B", "14C"]);
    }

    #[test]
    fn test_parse_flight_line_without_seats() {
        let flight = parse_flight_line("BA200 - London: []").unwrap().unwrap();
        assert!(flight.seats.is_empty());
    }

    #[test]
    fn test_parse_flight_line_destination_with_colon() {
        let flight = parse_flight_line("CC300 - Paris: CDG: [1A]").unwrap().unwrap();
        assert_eq!(flight.destination, "Paris: CDG");
        assert_eq!(flight.seats, vec!["1A"]);
    }

    #[test]
    fn test_parse_flight_line_skips_non_flight_lines() {
        assert!(parse_flight_line("").unwrap().is_none());
        assert!(parse_flight_line("# inventory").unwrap().is_none());
    }

    #[test]
    fn test_parse_flight_line_rejects_malformed() {
        assert!(parse_flight_line("AA100 New York: [1A]").is_err());
        assert!(parse_flight_line("AA100 - New York: 1A, 1B").is_err());
        assert!(parse_flight_line(" - New York: [1A]").is_err());
    }

    #[test]
    fn test_parse_flight_line_rejects_pipe() {
        assert!(parse_flight_line("AA100 - New York | JFK: [1A]").is_err());
        assert!(parse_flight_line("AA100 - New York: [1A, 1|B]").is_err());
    }

    #[test]
    fn test_parse_flight_line_drops_duplicate_seats() {
        let flight = parse_flight_line("AA100 - New York: [1A, 1B, 1A]")
            .unwrap()
            .unwrap();

        assert_eq!(flight.seats, vec!["1A", "1B"]);
    }

    #[test]
    fn test_inventory_round_trip_is_byte_exact() {
        let content = "AA100 - New York: [12A, 12B]\nBA200 - London: []\n";
        let inventory = parse_inventory(content);

        assert_eq!(inventory.len(), 2);
        assert_eq!(format_inventory(&inventory), content);
    }

    #[test]
    fn test_parse_inventory_skips_bad_lines() {
        let content = "AA100 - New York: [12A]\nthis is not: valid\nBA200 - London: [1A]\n";
        let inventory = parse_inventory(content);

        assert_eq!(inventory.len(), 2);
        assert!(inventory.get("BA200").is_some());
    }

    #[test]
    fn test_booking_line_without_services() {
        let booking = Booking::new("AA100", "New York", "12A");
        let line = format_booking_line(&booking);

        assert_eq!(line, "AA100 - New York: 12A");
        assert!(!line.contains('|'));
        assert_eq!(parse_booking_line(&line), Some(booking));
    }

    #[test]
    fn test_booking_line_with_services() {
        let booking = Booking::new("AA100", "New York", "12A")
            .with_services(ServiceSelection::new("F2", "D4", "C0"), 1150);
        let line = format_booking_line(&booking);

        assert_eq!(
            line,
            "AA100 - New York: 12A | SERVICES:F2,D4,C0 | COST:$11.50"
        );
        assert_eq!(parse_booking_line(&line), Some(booking));
    }

    #[test]
    fn test_booking_line_services_without_cost() {
        let booking = parse_booking_line("AA100 - New York: 12A | SERVICES:F1,D0,C0").unwrap();

        assert_eq!(booking.selection().unwrap().food, "F1");
        assert_eq!(booking.cost_cents(), None);
    }

    #[test]
    fn test_booking_line_with_broken_services_degrades() {
        let booking = parse_booking_line("AA100 - New York: 12A | SERVICES:F2 | COST:$11.50")
            .unwrap();

        assert_eq!(booking.seat, "12A");
        assert_eq!(
            booking.services,
            Some(BookedServices::Unreadable(
                "SERVICES:F2 | COST:$11.50".into()
            ))
        );
    }

    #[test]
    fn test_booking_line_with_broken_cost_degrades() {
        let booking =
            parse_booking_line("AA100 - New York: 12A | SERVICES:F2,D4,C0 | COST:lots").unwrap();
        assert!(matches!(
            booking.services,
            Some(BookedServices::Unreadable(_))
        ));
    }

    #[test]
    fn test_unreadable_booking_line() {
        assert!(parse_booking_line("garbage").is_none());
        assert!(parse_booking_line("AA100 - New York:").is_none());
        assert!(parse_booking_line("AA100: 12A").is_none());
    }

    #[test]
    fn test_booking_json_round_trip() {
        let booking = Booking::new("AA100", "New York", "12A")
            .with_services(ServiceSelection::new("F2", "D4", "C0"), 1150)
            .identified();
        let line = format_booking_json(&booking).unwrap();

        assert!(!line.contains('\n'));
        assert_eq!(parse_booking_json(&line), Some(booking));
    }

    #[test]
    fn test_booking_json_with_broken_services_degrades() {
        let line = r#"{"id":"7d3f1f3e-8a53-4b0e-9d0c-2f0c8b4a9f11","flight_number":"AA100","destination":"New York","seat":"12A","services":{"food":"F2"},"booked_at":"2024-05-01T10:00:00Z"}"#;
        let booking = parse_booking_json(line).unwrap();

        assert!(booking.id.is_some());
        assert!(matches!(
            booking.services,
            Some(BookedServices::Unreadable(_))
        ));
    }

    #[test]
    fn test_unreadable_booking_json() {
        assert!(parse_booking_json("AA100 - New York: 12A").is_none());
        assert!(parse_booking_json(r#"{"flight_number":"AA100"}"#).is_none());
    }
}
