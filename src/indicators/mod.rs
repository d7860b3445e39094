// Technical indicators module
// Moving averages and crossover detection over close-price sequences

pub mod crossover;
pub mod moving_average;

pub use crossover::{crossovers, has_crossover_within, is_crossover_at};
pub use moving_average::{ema_series, mean, sma_series};
