mod block;
mod course;
mod faculty;
mod ids;
mod payload;
mod program;
mod room;
mod settings;
mod snapshot;
pub mod time;

pub use block::*;
pub use course::*;
pub use faculty::*;
pub use ids::*;
pub use payload::*;
pub use program::*;
pub use room::*;
pub use settings::*;
pub use snapshot::*;
pub use time::{
    default_working_hours, minutes_to_time, parse_time_to_minutes, BreakWindow, Day,
    SchedulePolicy, SlotSegment, WorkingHoursEntry,
};
