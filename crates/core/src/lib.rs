#![forbid(unsafe_code)]

pub mod day;
pub mod model;
pub mod time;

pub use day::StudyDay;
pub use time::Clock;
