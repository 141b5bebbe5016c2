pub mod observation;
pub mod price_point;

// Re-export for easier access
pub use observation::{Observation, ObservationSequence};
pub use price_point::PricePoint;
