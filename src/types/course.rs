use super::{CourseId, FacultyId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CourseKind {
    Theory,
    Lab,
    Elective,
}

/// A course offering: its weekly hour split and (for labs) contiguity requirement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub code: String,
    pub name: String,
    pub kind: CourseKind,
    pub credits: u32,
    pub theory_h: u32,
    pub lab_h: u32,
    pub tutorial_h: u32,
    pub hours_per_week: u32,
    #[serde(default = "default_lab_contiguous_slots")]
    pub lab_contiguous_slots: usize,
    #[serde(default)]
    pub assigned_faculty_id: Option<FacultyId>,
}

fn default_lab_contiguous_slots() -> usize {
    2
}

impl Course {
    /// `theory_h + lab_h + tutorial_h == hours_per_week`, lab courses carry no
    /// theory/tutorial hours, and lab hours divide evenly into contiguous blocks.
    pub fn validate_hour_split(&self) -> Result<(), String> {
        if self.theory_h + self.lab_h + self.tutorial_h != self.hours_per_week {
            return Err(format!(
                "course '{}': theory_h({}) + lab_h({}) + tutorial_h({}) != hours_per_week({})",
                self.code, self.theory_h, self.lab_h, self.tutorial_h, self.hours_per_week
            ));
        }
        if self.kind == CourseKind::Lab && (self.theory_h != 0 || self.tutorial_h != 0) {
            return Err(format!(
                "course '{}': lab course must have theory_h = tutorial_h = 0",
                self.code
            ));
        }
        if self.lab_contiguous_slots == 0 {
            return Err(format!(
                "course '{}': lab_contiguous_slots must be positive",
                self.code
            ));
        }
        if self.lab_h as usize % self.lab_contiguous_slots != 0 {
            return Err(format!(
                "course '{}': lab_h({}) not divisible by lab_contiguous_slots({})",
                self.code, self.lab_h, self.lab_contiguous_slots
            ));
        }
        Ok(())
    }

    pub fn is_lab(&self) -> bool {
        self.kind == CourseKind::Lab
    }

    pub fn lab_block_count(&self) -> usize {
        if self.lab_contiguous_slots == 0 {
            0
        } else {
            self.lab_h as usize / self.lab_contiguous_slots
        }
    }
}
