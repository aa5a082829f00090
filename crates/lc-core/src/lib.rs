//! Latent calendar core.
//!
//! Turns timestamped events into weekly timeslot histograms and wraps a
//! mixture model over them.
//!
//! - `calendar`: grid, discretizer, canonical vocabulary
//! - `events`: the event table the aggregator reads
//! - `aggregate`: events to wide matrices or long frames
//! - `frame`: wide/long representations and conversions
//! - `summary`, `segments`: normalizations and reductions
//! - `model`: the latent component wrapper and reference collaborators
//! - `logging`: tracing setup for applications embedding the core

pub mod aggregate;
pub mod calendar;
pub mod events;
pub mod frame;
pub mod logging;
pub mod model;
pub mod segments;
pub mod summary;

pub use aggregate::{aggregate, Aggregated, AggregationReport, EventAggregator, Shaped};
pub use calendar::{CalendarGrid, TimeSlot};
pub use events::{Cell, EventFrame};
pub use frame::{
    dataframe_to_long_format, wide_to_long, widen, widen_with_groups, CellValue, LongFrame,
    LongRow, WideMatrix,
};
pub use model::{LatentCalendar, MarginalModel, PretrainedMixture, TopicModel};

pub use lc_common::{Error, GroupKey, KeyPart, Result, WeekStart};
pub use lc_config::{CalendarConfig, EmptyGroups};
