use super::{Day, FacultyId};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A faculty member: workload caps, availability, and subject preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Faculty {
    pub id: FacultyId,
    pub name: String,
    pub max_hours: u32,
    pub workload_target_hours: u32,
    #[serde(default = "super::time::default_working_hours_set")]
    pub availability_days: HashSet<Day>,
    #[serde(default)]
    pub availability_windows: HashMap<Day, Vec<(u32, u32)>>,
    #[serde(default)]
    pub preferred_subject_codes: HashSet<String>,
    /// term_number -> extra preferred subject codes for that term.
    #[serde(default)]
    pub semester_preferences: HashMap<u32, HashSet<String>>,
}

impl Faculty {
    pub fn allows_day(&self, day: Day) -> bool {
        self.availability_days.is_empty() || self.availability_days.contains(&day)
    }

    pub fn is_available(&self, day: Day, start_min: u32, end_min: u32) -> bool {
        if !self.allows_day(day) {
            return false;
        }
        match self.availability_windows.get(&day) {
            None => true,
            Some(windows) if windows.is_empty() => true,
            Some(windows) => windows
                .iter()
                .any(|&(w_start, w_end)| start_min >= w_start && end_min <= w_end),
        }
    }

    pub fn max_minutes(&self) -> u32 {
        self.max_hours * 60
    }

    pub fn target_minutes(&self) -> u32 {
        self.workload_target_hours * 60
    }

    /// Preferred subject codes applicable to a given term (base preferences plus
    /// whatever the faculty has additionally flagged for that term).
    pub fn preference_codes_for_term(&self, term_number: u32) -> HashSet<String> {
        let mut codes: HashSet<String> = self
            .preferred_subject_codes
            .iter()
            .map(|c| c.trim().to_uppercase())
            .filter(|c| !c.is_empty())
            .collect();
        if let Some(term_codes) = self.semester_preferences.get(&term_number) {
            codes.extend(term_codes.iter().map(|c| c.trim().to_uppercase()).filter(|c| !c.is_empty()));
        }
        codes
    }
}
