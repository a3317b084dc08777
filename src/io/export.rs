use anyhow::Result;
use serde::Serialize;
use std::io::Write;

use crate::application::BookingService;
use crate::domain::{Cents, format_cents};

/// One booking as exported. `number` is the 1-based ledger position.
#[derive(Debug, Clone, Serialize)]
pub struct BookingExport {
    pub number: usize,
    pub id: Option<String>,
    pub flight_number: Option<String>,
    pub destination: Option<String>,
    pub seat: Option<String>,
    pub food: Option<String>,
    pub drink: Option<String>,
    pub comfort: Option<String>,
    pub services: Option<String>,
    pub cost_cents: Option<Cents>,
    pub booked_at: Option<String>,
    /// Set only for lines that could not be read as a booking.
    pub unreadable_line: Option<String>,
}

/// Exporter for bookings and flights
pub struct Exporter<'a> {
    service: &'a BookingService,
}

impl<'a> Exporter<'a> {
    pub fn new(service: &'a BookingService) -> Self {
        Self { service }
    }

    async fn booking_rows(&self) -> Result<Vec<BookingExport>> {
        let entries = self.service.list_bookings().await?;

        Ok(entries
            .into_iter()
            .map(|entry| match &entry.booking {
                Some(booking) => {
                    let selection = booking.selection();
                    BookingExport {
                        number: entry.position + 1,
                        id: booking.id.map(|id| id.to_string()),
                        flight_number: Some(booking.flight_number.clone()),
                        destination: Some(booking.destination.clone()),
                        seat: Some(booking.seat.clone()),
                        food: selection.map(|s| s.food.clone()),
                        drink: selection.map(|s| s.drink.clone()),
                        comfort: selection.map(|s| s.comfort.clone()),
                        services: self.service.describe_services(booking),
                        cost_cents: booking.cost_cents(),
                        booked_at: booking.booked_at.map(|t| t.to_rfc3339()),
                        unreadable_line: None,
                    }
                }
                None => BookingExport {
                    number: entry.position + 1,
                    id: None,
                    flight_number: None,
                    destination: None,
                    seat: None,
                    food: None,
                    drink: None,
                    comfort: None,
                    services: None,
                    cost_cents: None,
                    booked_at: None,
                    unreadable_line: Some(entry.line.clone()),
                },
            })
            .collect())
    }

    /// Export bookings to CSV format
    pub async fn export_bookings_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let rows = self.booking_rows().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record([
            "number",
            "id",
            "flight_number",
            "destination",
            "seat",
            "food",
            "drink",
            "comfort",
            "services",
            "cost",
            "booked_at",
            "unreadable_line",
        ])?;

        for row in &rows {
            csv_writer.write_record([
                row.number.to_string(),
                row.id.clone().unwrap_or_default(),
                row.flight_number.clone().unwrap_or_default(),
                row.destination.clone().unwrap_or_default(),
                row.seat.clone().unwrap_or_default(),
                row.food.clone().unwrap_or_default(),
                row.drink.clone().unwrap_or_default(),
                row.comfort.clone().unwrap_or_default(),
                row.services.clone().unwrap_or_default(),
                row.cost_cents.map(format_cents).unwrap_or_default(),
                row.booked_at.clone().unwrap_or_default(),
                row.unreadable_line.clone().unwrap_or_default(),
            ])?;
        }

        csv_writer.flush()?;
        Ok(rows.len())
    }

    /// Export bookings as a pretty-printed JSON array
    pub async fn export_bookings_json<W: Write>(&self, mut writer: W) -> Result<usize> {
        let rows = self.booking_rows().await?;
        serde_json::to_writer_pretty(&mut writer, &rows)?;
        writeln!(writer)?;
        Ok(rows.len())
    }

    /// Export flights to CSV format. Seats are `;`-separated.
    pub async fn export_flights_csv<W: Write>(&self, writer: W) -> Result<usize> {
        let flights = self.service.list_flights().await?;
        let mut csv_writer = csv::Writer::from_writer(writer);

        csv_writer.write_record(["flight_number", "destination", "seats_left", "seats"])?;
        for flight in &flights {
            csv_writer.write_record([
                flight.number.clone(),
                flight.destination.clone(),
                flight.seats_left().to_string(),
                flight.seats.join(";"),
            ])?;
        }

        csv_writer.flush()?;
        Ok(flights.len())
    }

    /// Export flights as a pretty-printed JSON array
    pub async fn export_flights_json<W: Write>(&self, mut writer: W) -> Result<usize> {
        let flights = self.service.list_flights().await?;
        serde_json::to_writer_pretty(&mut writer, &flights)?;
        writeln!(writer)?;
        Ok(flights.len())
    }
}
