use super::{Day, RoomId};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoomKind {
    Lecture,
    Seminar,
    Lab,
}

/// A physical room. Capacity is the hard ceiling; kind gates lab/non-lab placement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Room {
    pub id: RoomId,
    pub name: String,
    pub capacity: u32,
    pub kind: RoomKind,
    /// Per-day windows when the room is available; empty = fully available on working days.
    #[serde(default)]
    pub availability_windows: HashMap<Day, Vec<(u32, u32)>>,
}

impl Room {
    pub fn is_available(&self, day: Day, start_min: u32, end_min: u32) -> bool {
        match self.availability_windows.get(&day) {
            None => true,
            Some(windows) if windows.is_empty() => true,
            Some(windows) => windows
                .iter()
                .any(|&(w_start, w_end)| start_min >= w_start && end_min <= w_end),
        }
    }
}
