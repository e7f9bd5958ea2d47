use crate::error::SchedulerError;
use crate::scheduler::context::SolverContext;
use crate::scheduler::evaluator::evaluate;
use crate::scheduler::expansion::build_solver_context;
use crate::scheduler::repair::{faculty_only_repair, room_only_repair, local_repair};
use crate::types::{Conflict, ConflictKind, ConflictResolution, GenerationSettings, OfficialTimetablePayload, PlacedSlot, Snapshot};
use crate::Result;

fn overlaps(a: &PlacedSlot, b: &PlacedSlot) -> bool {
    a.day == b.day && a.start_min < b.end_min && b.start_min < a.end_min
}

/// Scans a payload for room/faculty overlaps and assigns each a stable,
/// human-referenceable ID so an operator can target one with `resolve`.
pub fn detect_conflicts(payload: &OfficialTimetablePayload) -> Vec<Conflict> {
    let mut conflicts = Vec::new();
    for (i, a) in payload.slots.iter().enumerate() {
        for b in &payload.slots[i + 1..] {
            if !overlaps(a, b) {
                continue;
            }
            if a.room_id == b.room_id {
                conflicts.push(Conflict {
                    conflict_id: format!("room-{}-{}", a.id, b.id),
                    kind: ConflictKind::RoomOverlap,
                    slot_ids: vec![a.id.clone(), b.id.clone()],
                    room_id: Some(a.room_id.clone()),
                    faculty_id: None,
                    message: format!("room '{}' double-booked by '{}' and '{}'", a.room_id, a.id, b.id),
                });
            }
            if a.faculty_id == b.faculty_id {
                conflicts.push(Conflict {
                    conflict_id: format!("faculty-{}-{}", a.id, b.id),
                    kind: ConflictKind::FacultyOverlap,
                    slot_ids: vec![a.id.clone(), b.id.clone()],
                    room_id: None,
                    faculty_id: Some(a.faculty_id.clone()),
                    message: format!("faculty '{}' double-booked by '{}' and '{}'", a.faculty_id, a.id, b.id),
                });
            }
        }
    }
    conflicts
}

/// Finds the minimal edit that eliminates one named conflict: room swap first,
/// then faculty swap, then (last resort) a full time move. Every candidate
/// edit is re-checked with the same evaluator the solver uses, so the
/// resolver can never "fix" one conflict by silently introducing another of
/// equal or greater weight.
pub fn resolve_conflict(payload: &OfficialTimetablePayload, snapshot: &Snapshot, conflict: &Conflict) -> Result<ConflictResolution> {
    let settings = GenerationSettings::default();
    let ctx = build_solver_context(snapshot, &settings)?;

    let mut genotype = payload_to_genotype(&ctx, payload)?;
    let before = evaluate(&ctx, &genotype);

    let request_ids = request_ids_for_slots(&ctx, payload, &conflict.slot_ids);
    if request_ids.is_empty() {
        return Err(SchedulerError::ResolverFailed {
            message: format!("conflict '{}' does not name any slot present in this payload", conflict.conflict_id),
        }
        .into());
    }

    let mut resolved = false;
    for &request_id in &request_ids {
        if room_only_repair(&ctx, &mut genotype, request_id) {
            let after = evaluate(&ctx, &genotype);
            if after.hard_conflicts < before.hard_conflicts {
                resolved = true;
                break;
            }
        }
        if faculty_only_repair(&ctx, &mut genotype, request_id) {
            let after = evaluate(&ctx, &genotype);
            if after.hard_conflicts < before.hard_conflicts {
                resolved = true;
                break;
            }
        }
    }

    if !resolved {
        local_repair(&ctx, &mut genotype, 3);
        let after = evaluate(&ctx, &genotype);
        resolved = after.hard_conflicts < before.hard_conflicts;
    }

    let after = evaluate(&ctx, &genotype);
    if !resolved || after.hard_conflicts >= before.hard_conflicts {
        return Ok(ConflictResolution {
            resolved: false,
            message: format!(
                "no edit reduced hard conflicts below {} for conflict '{}'",
                before.hard_conflicts, conflict.conflict_id
            ),
            new_payload: None,
            version_label: None,
        });
    }

    let new_payload = genotype_to_payload(&ctx, payload, &genotype);
    Ok(ConflictResolution {
        resolved: true,
        message: format!(
            "conflict '{}' resolved: hard conflicts {} -> {}",
            conflict.conflict_id, before.hard_conflicts, after.hard_conflicts
        ),
        new_payload: Some(new_payload),
        version_label: Some(format!("resolved-{}", conflict.conflict_id)),
    })
}

/// Reconstructs the nearest genotype consistent with a (possibly hand-edited)
/// payload, matching each `BlockRequest` to the slot with the same course,
/// section, and batch and snapping it to its closest enumerated option.
fn payload_to_genotype(ctx: &SolverContext, payload: &OfficialTimetablePayload) -> Result<Vec<usize>> {
    let mut genotype = vec![0usize; ctx.request_count()];
    for request_id in 0..ctx.request_count() {
        let req = &ctx.block_requests[request_id];
        let matching = payload
            .slots
            .iter()
            .find(|s| s.course_id == req.course_id && s.section == req.section && s.batch == req.batch);

        let Some(slot) = matching else {
            continue;
        };

        let option_index = (0..req.options.len()).find(|&idx| {
            let (day, start_min, end_min) = ctx.option_bounds(request_id, idx);
            day == slot.day && start_min == slot.start_min && end_min == slot.end_min
        });

        genotype[request_id] = option_index.unwrap_or(0);
    }
    Ok(genotype)
}

fn request_ids_for_slots(ctx: &SolverContext, payload: &OfficialTimetablePayload, slot_ids: &[String]) -> Vec<usize> {
    let mut ids = Vec::new();
    for slot_id in slot_ids {
        if let Some(slot) = payload.slots.iter().find(|s| &s.id == slot_id) {
            if let Some(request_id) = ctx
                .block_requests
                .iter()
                .position(|r| r.course_id == slot.course_id && r.section == slot.section && r.batch == slot.batch)
            {
                ids.push(request_id);
            }
        }
    }
    ids
}

fn genotype_to_payload(ctx: &SolverContext, original: &OfficialTimetablePayload, genotype: &[usize]) -> OfficialTimetablePayload {
    let slots = genotype
        .iter()
        .enumerate()
        .map(|(request_id, &gene)| {
            let req = &ctx.block_requests[request_id];
            let opt = &req.options[gene];
            let (day, start_min, end_min) = ctx.option_bounds(request_id, gene);
            PlacedSlot {
                id: format!("{}-{}", req.course_code, request_id),
                day,
                start_min,
                end_min,
                course_id: req.course_id.clone(),
                room_id: req.room_id(opt).clone(),
                faculty_id: req.faculty_id(opt).clone(),
                section: req.section.clone(),
                batch: req.batch.clone(),
                student_count: req.student_count,
                session_type: req.session_type,
            }
        })
        .collect();
    OfficialTimetablePayload {
        program_id: original.program_id.clone(),
        term_number: original.term_number,
        slots,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::demo::demo_snapshot;
    use crate::scheduler::run_generation;
    use crate::types::{ConflictKind, GenerateTimetableRequest, ProgramId};

    #[test]
    fn resolving_a_conflict_that_does_not_exist_in_the_payload_fails_cleanly() {
        let snapshot = demo_snapshot();
        let request = GenerateTimetableRequest {
            program_id: ProgramId::from("CS"),
            term_number: snapshot.term_number,
            alternative_count: 1,
            persist_official: false,
            settings_override: None,
            already_placed: vec![],
        };
        let response = run_generation(&snapshot, &request).unwrap();
        let payload = &response.alternatives[0].payload;

        let bogus_conflict = Conflict {
            conflict_id: "bogus".to_string(),
            kind: ConflictKind::RoomOverlap,
            slot_ids: vec!["does-not-exist".to_string()],
            room_id: None,
            faculty_id: None,
            message: "synthetic".to_string(),
        };
        let outcome = resolve_conflict(payload, &snapshot, &bogus_conflict);
        assert!(outcome.is_err());
    }
}
