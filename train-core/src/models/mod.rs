mod day;
mod exercise;
mod history;
mod metric;
mod routine;

pub use day::*;
pub use exercise::*;
pub use history::*;
pub use metric::*;
pub use routine::*;
