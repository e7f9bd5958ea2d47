use crate::types::{OfficialTimetablePayload, PlacedSlot, Snapshot};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

/// A single hard-constraint violation found by the publish gate.
#[derive(Debug, Clone)]
pub struct Violation {
    pub constraint: String,
    pub message: String,
    pub severity: Severity,
}

fn overlaps(a: &PlacedSlot, b: &PlacedSlot) -> bool {
    a.day == b.day && a.start_min < b.end_min && b.start_min < a.end_min
}

fn sections_collide(a: &PlacedSlot, b: &PlacedSlot) -> bool {
    if a.section != b.section {
        return false;
    }
    match (&a.batch, &b.batch) {
        (None, _) | (_, None) => true,
        (Some(ba), Some(bb)) => ba == bb,
    }
}

pub fn check_room_conflicts(payload: &OfficialTimetablePayload) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (i, a) in payload.slots.iter().enumerate() {
        for b in &payload.slots[i + 1..] {
            if a.room_id == b.room_id && overlaps(a, b) {
                violations.push(Violation {
                    constraint: "room_conflict".to_string(),
                    message: format!("room '{}' double-booked by slots '{}' and '{}'", a.room_id, a.id, b.id),
                    severity: Severity::Error,
                });
            }
        }
    }
    violations
}

pub fn check_faculty_conflicts(payload: &OfficialTimetablePayload) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (i, a) in payload.slots.iter().enumerate() {
        for b in &payload.slots[i + 1..] {
            if a.faculty_id == b.faculty_id && overlaps(a, b) {
                violations.push(Violation {
                    constraint: "faculty_conflict".to_string(),
                    message: format!("faculty '{}' double-booked by slots '{}' and '{}'", a.faculty_id, a.id, b.id),
                    severity: Severity::Error,
                });
            }
        }
    }
    violations
}

pub fn check_section_conflicts(payload: &OfficialTimetablePayload) -> Vec<Violation> {
    let mut violations = Vec::new();
    for (i, a) in payload.slots.iter().enumerate() {
        for b in &payload.slots[i + 1..] {
            if overlaps(a, b) && sections_collide(a, b) {
                violations.push(Violation {
                    constraint: "section_conflict".to_string(),
                    message: format!("section '{}' double-booked by slots '{}' and '{}'", a.section, a.id, b.id),
                    severity: Severity::Error,
                });
            }
        }
    }
    violations
}

pub fn check_capacity_and_room_type(payload: &OfficialTimetablePayload, snapshot: &Snapshot) -> Vec<Violation> {
    let mut violations = Vec::new();
    for slot in &payload.slots {
        let Some(room) = snapshot.room(&slot.room_id) else {
            violations.push(Violation {
                constraint: "room_capacity".to_string(),
                message: format!("slot '{}' references unknown room '{}'", slot.id, slot.room_id),
                severity: Severity::Error,
            });
            continue;
        };
        if room.capacity < slot.student_count {
            violations.push(Violation {
                constraint: "room_capacity".to_string(),
                message: format!(
                    "slot '{}' needs {} seats but room '{}' holds {}",
                    slot.id, slot.student_count, room.name, room.capacity
                ),
                severity: Severity::Error,
            });
        }
        let expects_lab = slot.session_type == crate::types::SessionType::Lab;
        let is_lab_room = room.kind == crate::types::RoomKind::Lab;
        if expects_lab != is_lab_room {
            violations.push(Violation {
                constraint: "room_type".to_string(),
                message: format!("slot '{}' placed in a room of the wrong kind ('{}')", slot.id, room.name),
                severity: Severity::Error,
            });
        }
        if !room.is_available(slot.day, slot.start_min, slot.end_min) {
            violations.push(Violation {
                constraint: "room_availability".to_string(),
                message: format!("room '{}' is not open at the time of slot '{}'", room.name, slot.id),
                severity: Severity::Error,
            });
        }
    }
    violations
}

pub fn check_faculty_availability(payload: &OfficialTimetablePayload, snapshot: &Snapshot) -> Vec<Violation> {
    let mut violations = Vec::new();
    for slot in &payload.slots {
        let Some(faculty) = snapshot.faculty_member(&slot.faculty_id) else {
            violations.push(Violation {
                constraint: "faculty_availability".to_string(),
                message: format!("slot '{}' references unknown faculty '{}'", slot.id, slot.faculty_id),
                severity: Severity::Error,
            });
            continue;
        };
        if !faculty.is_available(slot.day, slot.start_min, slot.end_min) {
            violations.push(Violation {
                constraint: "faculty_availability".to_string(),
                message: format!("faculty '{}' is unavailable at the time of slot '{}'", faculty.name, slot.id),
                severity: Severity::Error,
            });
        }
    }
    violations
}

pub fn check_locked_slots(payload: &OfficialTimetablePayload, snapshot: &Snapshot) -> Vec<Violation> {
    let mut violations = Vec::new();
    for lock in snapshot.slot_locks.iter().filter(|l| l.active && l.term_number == payload.term_number) {
        let honored = payload.slots.iter().any(|slot| {
            slot.course_id == lock.course_id
                && slot.section == lock.section
                && slot.batch == lock.batch
                && slot.day == lock.day
                && slot.start_min == lock.start_min
                && slot.end_min == lock.end_min
                && lock.room_id.as_ref().map(|r| &slot.room_id == r).unwrap_or(true)
                && lock.faculty_id.as_ref().map(|f| &slot.faculty_id == f).unwrap_or(true)
        });
        if !honored {
            violations.push(Violation {
                constraint: "locked_slot".to_string(),
                message: format!("locked placement for course '{}' section '{}' was not honored", lock.course_id, lock.section),
                severity: Severity::Error,
            });
        }
    }
    violations
}

pub fn check_semester_limits(payload: &OfficialTimetablePayload, snapshot: &Snapshot) -> Vec<Violation> {
    let mut violations = Vec::new();
    let Some(sem) = &snapshot.semester_constraint else {
        return violations;
    };

    let mut per_day: HashMap<(crate::types::SectionName, crate::types::Day), u32> = HashMap::new();
    let mut per_week: HashMap<crate::types::SectionName, u32> = HashMap::new();

    for slot in &payload.slots {
        if slot.start_min < sem.earliest_start_min || slot.end_min > sem.latest_end_min {
            violations.push(Violation {
                constraint: "semester_limit".to_string(),
                message: format!("slot '{}' falls outside the semester's allowed teaching window", slot.id),
                severity: Severity::Error,
            });
        }
        let minutes = slot.end_min - slot.start_min;
        *per_day.entry((slot.section.clone(), slot.day)).or_insert(0) += minutes;
        *per_week.entry(slot.section.clone()).or_insert(0) += minutes;
    }

    for ((section, day), minutes) in &per_day {
        if *minutes > sem.max_per_day_min {
            violations.push(Violation {
                constraint: "semester_limit".to_string(),
                message: format!("section '{}' exceeds the daily teaching cap on {}", section, day),
                severity: Severity::Error,
            });
        }
    }
    for (section, minutes) in &per_week {
        if *minutes > sem.max_per_week_min {
            violations.push(Violation {
                constraint: "semester_limit".to_string(),
                message: format!("section '{}' exceeds the weekly teaching cap", section),
                severity: Severity::Error,
            });
        }
    }

    violations
}

/// Checks every slot falls within the institution's working-hours grid and
/// does not intersect a named break window (e.g. the lunch break).
pub fn check_schedule_bounds(payload: &OfficialTimetablePayload, snapshot: &Snapshot) -> Vec<Violation> {
    let mut violations = Vec::new();
    for slot in &payload.slots {
        let day_slots = snapshot.working_day_slots(slot.day);
        if day_slots.is_empty() {
            violations.push(Violation {
                constraint: "working_hours".to_string(),
                message: format!("slot '{}' falls on a non-working day ({})", slot.id, slot.day),
                severity: Severity::Error,
            });
            continue;
        }
        let starts_on_period = day_slots.iter().any(|seg| seg.start_min == slot.start_min);
        let ends_on_period = day_slots.iter().any(|seg| seg.end_min == slot.end_min);
        if !starts_on_period || !ends_on_period {
            violations.push(Violation {
                constraint: "period_alignment".to_string(),
                message: format!("slot '{}' does not align with the institution's teaching periods", slot.id),
                severity: Severity::Error,
            });
        }
        for brk in &snapshot.schedule_policy.breaks {
            if brk.overlaps(slot.start_min, slot.end_min) {
                violations.push(Violation {
                    constraint: "break_overlap".to_string(),
                    message: format!("slot '{}' overlaps the '{}' window", slot.id, brk.name),
                    severity: Severity::Error,
                });
            }
        }
    }
    violations
}

pub fn check_elective_overlap(payload: &OfficialTimetablePayload, snapshot: &Snapshot) -> Vec<Violation> {
    let mut violations = Vec::new();
    for group in snapshot
        .elective_overlap_groups
        .iter()
        .filter(|g| g.term_number == payload.term_number && g.policy == crate::types::OverlapPolicy::NoOverlap)
    {
        let members: Vec<&PlacedSlot> = payload.slots.iter().filter(|s| group.course_ids.contains(&s.course_id)).collect();
        for (i, a) in members.iter().enumerate() {
            for b in &members[i + 1..] {
                if overlaps(a, b) {
                    violations.push(Violation {
                        constraint: "semester_limit".to_string(),
                        message: format!("elective overlap group has conflicting slots '{}' and '{}'", a.id, b.id),
                        severity: Severity::Error,
                    });
                }
            }
        }
    }
    violations
}

/// Checks each (course, section, batch, session_type) group's total placed
/// minutes against the course's declared weekly hour split. A batch carries
/// the full lab allocation; theory and tutorial hours are per-section.
pub fn check_block_durations(payload: &OfficialTimetablePayload, snapshot: &Snapshot) -> Vec<Violation> {
    let mut violations = Vec::new();
    let period = snapshot.schedule_policy.period_minutes;

    let mut totals: HashMap<(crate::types::CourseId, crate::types::SectionName, Option<String>, crate::types::SessionType), u32> = HashMap::new();
    for slot in &payload.slots {
        *totals
            .entry((slot.course_id.clone(), slot.section.clone(), slot.batch.clone(), slot.session_type))
            .or_insert(0) += slot.end_min - slot.start_min;
    }

    for ((course_id, section, batch, session_type), minutes) in &totals {
        let Some(course) = snapshot.course(course_id) else { continue };
        let expected = match session_type {
            crate::types::SessionType::Theory => course.theory_h * period,
            crate::types::SessionType::Tutorial => course.tutorial_h * period,
            crate::types::SessionType::Lab => course.lab_h * period,
        };
        if expected > 0 && *minutes != expected {
            violations.push(Violation {
                constraint: "block_duration".to_string(),
                message: format!(
                    "course '{}' section '{}'{} carries {} min of {:?} but expected {}",
                    course_id,
                    section,
                    batch.as_ref().map(|b| format!(" batch '{b}'")).unwrap_or_default(),
                    minutes,
                    session_type,
                    expected
                ),
                severity: Severity::Error,
            });
        }
    }
    violations
}

/// Checks that every lab slot spans exactly the course's declared contiguous
/// block length, i.e. it was not split into smaller fragments.
pub fn check_lab_contiguity(payload: &OfficialTimetablePayload, snapshot: &Snapshot) -> Vec<Violation> {
    let mut violations = Vec::new();
    let period = snapshot.schedule_policy.period_minutes;
    for slot in &payload.slots {
        if slot.session_type != crate::types::SessionType::Lab {
            continue;
        }
        let Some(course) = snapshot.course(&slot.course_id) else { continue };
        let expected = course.lab_contiguous_slots as u32 * period;
        if slot.end_min - slot.start_min != expected {
            violations.push(Violation {
                constraint: "lab_contiguity".to_string(),
                message: format!(
                    "lab slot '{}' for course '{}' spans {} min but must be a contiguous {} min block",
                    slot.id,
                    slot.course_id,
                    slot.end_min - slot.start_min,
                    expected
                ),
                severity: Severity::Error,
            });
        }
    }
    violations
}

/// Checks that every non-lab (course, section) group is taught by a single
/// faculty member; lab batches may diverge since they are separate audiences.
pub fn check_single_faculty_per_section(payload: &OfficialTimetablePayload) -> Vec<Violation> {
    let mut violations = Vec::new();
    let mut by_group: HashMap<(crate::types::CourseId, crate::types::SectionName), Vec<&PlacedSlot>> = HashMap::new();
    for slot in &payload.slots {
        if slot.session_type == crate::types::SessionType::Lab {
            continue;
        }
        by_group.entry((slot.course_id.clone(), slot.section.clone())).or_default().push(slot);
    }
    for ((course_id, section), slots) in &by_group {
        for (i, a) in slots.iter().enumerate() {
            for b in &slots[i + 1..] {
                if a.faculty_id != b.faculty_id {
                    violations.push(Violation {
                        constraint: "faculty_conflict".to_string(),
                        message: format!(
                            "course '{}' section '{}' is split across faculty '{}' and '{}'",
                            course_id, section, a.faculty_id, b.faculty_id
                        ),
                        severity: Severity::Error,
                    });
                }
            }
        }
    }
    violations
}

/// Checks that every required program course for this (program, term) is
/// actually present in the published payload.
pub fn check_program_credit_coverage(payload: &OfficialTimetablePayload, snapshot: &Snapshot) -> Vec<Violation> {
    let mut violations = Vec::new();
    for pc in snapshot
        .program_courses
        .iter()
        .filter(|pc| pc.program_id == payload.program_id && pc.term_number == payload.term_number && pc.is_required)
    {
        let covered = payload.slots.iter().any(|s| s.course_id == pc.course_id);
        if !covered {
            let course_label = snapshot.course(&pc.course_id).map(|c| c.code.as_str()).unwrap_or(pc.course_id.0.as_str());
            violations.push(Violation {
                constraint: "program_coverage".to_string(),
                message: format!("required course '{}' has no placed slots in the published payload", course_label),
                severity: Severity::Error,
            });
        }
    }
    violations
}

/// Re-checks, at publish time, that every course's prerequisites still map to
/// a strictly earlier term within the same program — catching a snapshot
/// whose program plan was edited after the generation run that produced this
/// payload.
pub fn check_prerequisites_satisfied(payload: &OfficialTimetablePayload, snapshot: &Snapshot) -> Vec<Violation> {
    let mut violations = Vec::new();
    let by_course: HashMap<&crate::types::CourseId, &crate::types::ProgramCourse> =
        snapshot.program_courses.iter().filter(|pc| pc.program_id == payload.program_id).map(|pc| (&pc.course_id, pc)).collect();

    for pc in snapshot
        .program_courses
        .iter()
        .filter(|pc| pc.program_id == payload.program_id && pc.term_number == payload.term_number)
    {
        for prereq_id in &pc.prerequisite_course_ids {
            match by_course.get(prereq_id) {
                None => violations.push(Violation {
                    constraint: "prerequisite_missing".to_string(),
                    message: format!("course '{}' prerequisite '{}' is no longer part of the program", pc.course_id, prereq_id),
                    severity: Severity::Error,
                }),
                Some(prereq_pc) if prereq_pc.term_number >= pc.term_number => violations.push(Violation {
                    constraint: "prerequisite_missing".to_string(),
                    message: format!(
                        "course '{}' prerequisite '{}' is no longer in a strictly earlier term (now term {})",
                        pc.course_id, prereq_id, prereq_pc.term_number
                    ),
                    severity: Severity::Error,
                }),
                Some(_) => {}
            }
        }
    }
    violations
}

pub fn check_shared_lecture_sync(payload: &OfficialTimetablePayload, snapshot: &Snapshot) -> Vec<Violation> {
    let mut violations = Vec::new();
    for group in snapshot.shared_lecture_groups.iter().filter(|g| g.term_number == payload.term_number) {
        let members: Vec<&PlacedSlot> = payload
            .slots
            .iter()
            .filter(|s| s.course_id == group.course_id && group.section_names.contains(&s.section) && s.session_type == crate::types::SessionType::Theory)
            .collect();
        if let Some(reference) = members.first() {
            for other in &members[1..] {
                if (reference.day, reference.start_min, reference.end_min, &reference.room_id, &reference.faculty_id)
                    != (other.day, other.start_min, other.end_min, &other.room_id, &other.faculty_id)
                {
                    violations.push(Violation {
                        constraint: "section_conflict".to_string(),
                        message: format!("shared lecture for course '{}' is not synchronized across sections", group.course_id),
                        severity: Severity::Error,
                    });
                }
            }
        }
    }
    violations
}
