//! Timestamp discretization and the canonical timeslot vocabulary.

pub mod grid;
pub mod vocab;

pub use grid::{CalendarGrid, TimeSlot};
pub use vocab::hourly_vocabulary;
