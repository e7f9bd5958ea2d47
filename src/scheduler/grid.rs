use crate::types::{BreakWindow, Day, SchedulePolicy, SlotSegment, WorkingHoursEntry};
use std::collections::HashMap;

/// Build the per-day slot grid: period-aligned `SlotSegment`s that never
/// straddle a break. A cursor scans from `day_start`; if the next period-length
/// window would overlap a break, it jumps to the break's end instead of
/// scanning minute by minute.
pub fn build_day_slots(
    working_hours: &[WorkingHoursEntry],
    policy: &SchedulePolicy,
) -> HashMap<Day, Vec<SlotSegment>> {
    let mut day_slots = HashMap::new();
    let period = policy.period_minutes;

    for entry in working_hours {
        if !entry.enabled {
            continue;
        }
        let mut slots = Vec::new();
        let mut cursor = entry.start_min;
        while cursor + period <= entry.end_min {
            let end = cursor + period;
            if let Some(br) = first_overlapping_break(cursor, end, &policy.breaks) {
                cursor = (cursor + 1).max(br.end_min);
                continue;
            }
            slots.push(SlotSegment::new(cursor, end));
            cursor = end;
        }
        if !slots.is_empty() {
            day_slots.insert(entry.day, slots);
        }
    }
    day_slots
}

fn first_overlapping_break<'a>(start: u32, end: u32, breaks: &'a [BreakWindow]) -> Option<&'a BreakWindow> {
    breaks.iter().find(|b| b.overlaps(start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slots_never_straddle_a_break() {
        let hours = vec![WorkingHoursEntry {
            day: Day::Mon,
            enabled: true,
            start_min: 8 * 60 + 50,
            end_min: 16 * 60 + 35,
        }];
        let policy = SchedulePolicy::default();
        let grid = build_day_slots(&hours, &policy);
        let slots = &grid[&Day::Mon];

        for slot in slots {
            for brk in &policy.breaks {
                assert!(!brk.overlaps(slot.start_min, slot.end_min));
            }
        }
    }

    #[test]
    fn slots_are_period_aligned_and_abut() {
        let hours = vec![WorkingHoursEntry {
            day: Day::Mon,
            enabled: true,
            start_min: 8 * 60 + 50,
            end_min: 16 * 60 + 35,
        }];
        let policy = SchedulePolicy::default();
        let grid = build_day_slots(&hours, &policy);
        let slots = &grid[&Day::Mon];

        for slot in slots {
            assert_eq!(slot.len_min(), policy.period_minutes);
        }
        for window in slots.windows(2) {
            // Either abutting, or separated by exactly one break (the gap we jumped over).
            let gap = window[1].start_min - window[0].end_min;
            assert!(gap == 0 || policy.breaks.iter().any(|b| b.start_min >= window[0].end_min && b.end_min <= window[1].start_min));
        }
    }

    #[test]
    fn disabled_day_has_no_slots() {
        let hours = vec![WorkingHoursEntry {
            day: Day::Sat,
            enabled: false,
            start_min: 0,
            end_min: 600,
        }];
        let grid = build_day_slots(&hours, &SchedulePolicy::default());
        assert!(grid.get(&Day::Sat).is_none());
    }
}
