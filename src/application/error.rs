use thiserror::Error;

use crate::domain::{CatalogError, SeatError, ServiceCategory};

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid flight number: {0}")]
    FlightNotFound(String),

    #[error("Seat {seat} is not available on flight {flight}")]
    SeatUnavailable { flight: String, seat: String },

    #[error("Unknown {category} service code: {code}")]
    UnknownServiceCode {
        category: ServiceCategory,
        code: String,
    },

    #[error("Invalid service catalog: {0}")]
    InvalidCatalog(String),

    #[error("Booking not found: {0}")]
    BookingNotFound(String),

    #[error("Booking #{} could not be read and cannot be changed", .0 + 1)]
    UnreadableBooking(usize),

    #[error("Booking ids are only stored by the jsonl ledger format")]
    BookingIdsUnsupported,

    #[error("Storage error: {0:#}")]
    Storage(#[from] anyhow::Error),
}

impl From<SeatError> for AppError {
    fn from(err: SeatError) -> Self {
        match err {
            SeatError::FlightNotFound(number) => AppError::FlightNotFound(number),
            SeatError::SeatUnavailable { flight, seat } => {
                AppError::SeatUnavailable { flight, seat }
            }
        }
    }
}

impl From<CatalogError> for AppError {
    fn from(err: CatalogError) -> Self {
        match err {
            CatalogError::UnknownCode { category, code } => {
                AppError::UnknownServiceCode { category, code }
            }
            CatalogError::Invalid(message) => AppError::InvalidCatalog(message),
        }
    }
}
