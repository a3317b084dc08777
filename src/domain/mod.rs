mod booking;
mod catalog;
mod flight;
mod integrity;
mod money;

pub use booking::*;
pub use catalog::*;
pub use flight::*;
pub use integrity::*;
pub use money::*;
