pub mod export;

pub use export::{BookingExport, Exporter};

/// What an export writes out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportType {
    Bookings,
    Flights,
}

impl ExportType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExportType::Bookings => "bookings",
            ExportType::Flights => "flights",
        }
    }
}

impl std::str::FromStr for ExportType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "bookings" => Ok(ExportType::Bookings),
            "flights" => Ok(ExportType::Flights),
            other => Err(format!(
                "unknown export type '{}' (expected 'bookings' or 'flights')",
                other
            )),
        }
    }
}

/// Output format for exports.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Json,
}

impl std::str::FromStr for ExportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "csv" => Ok(ExportFormat::Csv),
            "json" => Ok(ExportFormat::Json),
            other => Err(format!(
                "unknown export format '{}' (expected 'csv' or 'json')",
                other
            )),
        }
    }
}
