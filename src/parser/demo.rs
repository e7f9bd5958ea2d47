use crate::scheduler::grid::build_day_slots;
use crate::types::*;
use std::collections::{HashMap, HashSet};

/// A small but representative snapshot used by the crate's own test suite and
/// by `demo` CLI invocations that need a working input without a data
/// directory: one lecture course, one lab course split across two batches,
/// two faculty (one with a matching subject preference), one lecture room,
/// one lab room, and a single active slot lock on the course's first block.
pub fn demo_snapshot() -> Snapshot {
    let program_id = ProgramId::from("CS");
    let term_number = 1;

    let working_hours = default_working_hours();
    let schedule_policy = SchedulePolicy::default();
    let day_slots = build_day_slots(&working_hours, &schedule_policy);

    let lecture_course = Course {
        id: CourseId::from("CS101"),
        code: "CS101".to_string(),
        name: "Introduction to Programming".to_string(),
        kind: CourseKind::Theory,
        credits: 3,
        theory_h: 3,
        lab_h: 0,
        tutorial_h: 0,
        hours_per_week: 3,
        lab_contiguous_slots: 2,
        assigned_faculty_id: None,
    };
    let lab_course = Course {
        id: CourseId::from("CS102L"),
        code: "CS102L".to_string(),
        name: "Programming Lab".to_string(),
        kind: CourseKind::Lab,
        credits: 1,
        theory_h: 0,
        lab_h: 4,
        tutorial_h: 0,
        hours_per_week: 4,
        lab_contiguous_slots: 2,
        assigned_faculty_id: None,
    };

    let mut courses = HashMap::new();
    courses.insert(lecture_course.id.clone(), lecture_course.clone());
    courses.insert(lab_course.id.clone(), lab_course.clone());

    let mut alice_prefs = HashSet::new();
    alice_prefs.insert("CS101".to_string());
    let alice = Faculty {
        id: FacultyId::from("F1"),
        name: "Alice Nakamura".to_string(),
        max_hours: 20,
        workload_target_hours: 12,
        availability_days: HashSet::new(),
        availability_windows: HashMap::new(),
        preferred_subject_codes: alice_prefs,
        semester_preferences: HashMap::new(),
    };
    let mut bob_prefs = HashSet::new();
    bob_prefs.insert("CS102L".to_string());
    let bob = Faculty {
        id: FacultyId::from("F2"),
        name: "Bob Okafor".to_string(),
        max_hours: 20,
        workload_target_hours: 12,
        availability_days: HashSet::new(),
        availability_windows: HashMap::new(),
        preferred_subject_codes: bob_prefs,
        semester_preferences: HashMap::new(),
    };

    let mut faculty = HashMap::new();
    faculty.insert(alice.id.clone(), alice.clone());
    faculty.insert(bob.id.clone(), bob.clone());

    let lecture_room = Room {
        id: RoomId::from("R1"),
        name: "Lecture Hall A".to_string(),
        capacity: 60,
        kind: RoomKind::Lecture,
        availability_windows: HashMap::new(),
    };
    let lab_room = Room {
        id: RoomId::from("R2"),
        name: "Computer Lab 1".to_string(),
        capacity: 25,
        kind: RoomKind::Lab,
        availability_windows: HashMap::new(),
    };

    let mut rooms = HashMap::new();
    rooms.insert(lecture_room.id.clone(), lecture_room.clone());
    rooms.insert(lab_room.id.clone(), lab_room.clone());

    let program_courses = vec![
        ProgramCourse {
            program_id: program_id.clone(),
            term_number,
            course_id: lecture_course.id.clone(),
            is_required: true,
            lab_batch_count: 0,
            allow_parallel_batches: false,
            prerequisite_course_ids: vec![],
        },
        ProgramCourse {
            program_id: program_id.clone(),
            term_number,
            course_id: lab_course.id.clone(),
            is_required: true,
            lab_batch_count: 2,
            allow_parallel_batches: true,
            prerequisite_course_ids: vec![],
        },
    ];

    let sections = vec![ProgramSection {
        program_id: program_id.clone(),
        term_number,
        name: SectionName::from("A"),
        capacity: 40,
    }];

    let semester_constraint = Some(SemesterConstraint {
        term_number,
        earliest_start_min: 8 * 60 + 50,
        latest_end_min: 16 * 60 + 35,
        max_per_day_min: 300,
        max_per_week_min: 1500,
        min_break_min: 10,
        max_consecutive_min: 180,
    });

    let first_slot = day_slots[&Day::Mon][0];
    let slot_locks = vec![SlotLock {
        program_id: program_id.clone(),
        term_number,
        section: SectionName::from("A"),
        batch: None,
        course_id: lecture_course.id.clone(),
        day: Day::Mon,
        start_min: first_slot.start_min,
        end_min: first_slot.end_min,
        room_id: Some(lecture_room.id.clone()),
        faculty_id: Some(alice.id.clone()),
        active: true,
    }];

    Snapshot {
        program_id,
        term_number,
        working_hours,
        schedule_policy,
        day_slots,
        courses,
        program_courses,
        sections,
        rooms,
        faculty,
        elective_overlap_groups: vec![],
        shared_lecture_groups: vec![],
        semester_constraint,
        slot_locks,
        reserved_resource_slots: vec![],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn demo_snapshot_has_one_theory_and_one_lab_course() {
        let snapshot = demo_snapshot();
        assert_eq!(snapshot.courses.len(), 2);
        assert_eq!(snapshot.program_courses.len(), 2);
        assert!(snapshot.day_slots.contains_key(&Day::Mon));
    }

    #[test]
    fn demo_snapshot_lock_targets_the_first_monday_slot() {
        let snapshot = demo_snapshot();
        let lock = &snapshot.slot_locks[0];
        assert_eq!(lock.day, Day::Mon);
        assert!(lock.active);
    }
}
