// Biological tuning: fixed thresholds and base rate constants.

pub mod rates;
pub mod thresholds;

pub use rates::RateTuning;
