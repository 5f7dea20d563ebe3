//! API request handlers

pub mod escrow;
pub mod progress;
pub mod stages;

pub use escrow::*;
pub use progress::*;
pub use stages::*;
