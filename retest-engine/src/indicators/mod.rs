pub mod extrema;

pub use extrema::{rolling_max, rolling_min};
