// Application layer: the booking workflows on top of the flight store and
// booking ledger.

pub mod error;
mod service;

pub use error::*;
pub use service::*;
