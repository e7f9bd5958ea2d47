pub mod constructor;
pub mod context;
pub mod drivers;
pub mod evaluator;
pub mod expansion;
pub mod grid;
pub mod hashing;
pub mod repair;

use crate::types::{
    CycleRequest, CycleResponse, GenerateTimetableRequest, GenerateTimetableResponse,
    GeneratedAlternative, OfficialTimetablePayload, PlacedSlot, ReservedResourceSlot, Snapshot,
};
use crate::Result;
use context::SolverContext;
use rand::SeedableRng;
use std::time::Instant;

/// Runs one (program, term) generation request end to end: block expansion,
/// the auto-composed solver, and payload assembly. Does not persist anything;
/// `persist_official` is read by the caller (the CLI / API layer) to decide
/// whether to write `alternatives[0]` as the official timetable.
pub fn run_generation(snapshot: &Snapshot, request: &GenerateTimetableRequest) -> Result<GenerateTimetableResponse> {
    let settings = request.settings_override.unwrap_or_default();

    let mut working_snapshot = snapshot.clone();
    working_snapshot.reserved_resource_slots.extend(request.already_placed.iter().cloned());

    let ctx = expansion::build_solver_context(&working_snapshot, &settings)?;
    let mut rng = rand::rngs::StdRng::seed_from_u64(settings.random_seed);

    let started = Instant::now();
    let alternatives = drivers::auto::run(&ctx, &mut rng, request.alternative_count.max(1));
    let runtime_ms = started.elapsed().as_millis() as u64;

    let mut publish_warning = None;
    let alternatives: Vec<GeneratedAlternative> = alternatives
        .into_iter()
        .enumerate()
        .map(|(rank, scored)| {
            if rank == 0 && scored.result.hard_conflicts > 0 && publish_warning.is_none() {
                publish_warning = Some(format!(
                    "best alternative still has {} hard conflict(s); the publish gate will reject it",
                    scored.result.hard_conflicts
                ));
            }
            GeneratedAlternative {
                rank: rank + 1,
                fitness: scored.result.fitness,
                hard_conflicts: scored.result.hard_conflicts,
                soft_penalty: scored.result.soft_penalty,
                payload: genotype_to_payload(&working_snapshot, &ctx, &scored.genotype),
            }
        })
        .collect();

    Ok(GenerateTimetableResponse {
        alternatives,
        settings_used: settings,
        runtime_ms,
        publish_warning,
        generated_at: chrono::Utc::now().to_rfc3339(),
    })
}

/// Runs a sequence of per-term generations, carrying each term's best
/// alternative forward as reserved resource slots for the next so that a
/// shared faculty member (or a shared lab room) can't be double-booked across
/// terms scheduled together in one cycle.
pub fn run_cycle(snapshots: &[Snapshot], request: &CycleRequest) -> Result<CycleResponse> {
    let mut per_term = Vec::with_capacity(request.term_numbers.len());
    let mut pareto_front = Vec::with_capacity(request.term_numbers.len());
    let mut carried: Vec<ReservedResourceSlot> = Vec::new();

    for (&term_number, snapshot) in request.term_numbers.iter().zip(snapshots.iter()) {
        let generation_request = GenerateTimetableRequest {
            program_id: request.program_id.clone(),
            term_number,
            alternative_count: request.alternative_count,
            persist_official: false,
            settings_override: request.settings_override,
            already_placed: carried.clone(),
        };
        let response = run_generation(snapshot, &generation_request)?;

        if let Some(best) = response.alternatives.first() {
            pareto_front.push((term_number, best.hard_conflicts, best.soft_penalty));
            carried.extend(best.payload.slots.iter().map(|s| ReservedResourceSlot {
                day: s.day,
                start_min: s.start_min,
                end_min: s.end_min,
                room_id: Some(s.room_id.clone()),
                faculty_id: Some(s.faculty_id.clone()),
            }));
        }
        per_term.push((term_number, response));
    }

    Ok(CycleResponse { per_term, pareto_front })
}

fn genotype_to_payload(snapshot: &Snapshot, ctx: &SolverContext, genotype: &[usize]) -> OfficialTimetablePayload {
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
        program_id: snapshot.program_id.clone(),
        term_number: snapshot.term_number,
        slots,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::demo::demo_snapshot;
    use crate::types::ProgramId;

    #[test]
    fn run_generation_returns_requested_alternative_count_or_fewer() {
        let snapshot = demo_snapshot();
        let request = GenerateTimetableRequest {
            program_id: ProgramId::from("CS"),
            term_number: snapshot.term_number,
            alternative_count: 3,
            persist_official: false,
            settings_override: None,
            already_placed: vec![],
        };
        let response = run_generation(&snapshot, &request).unwrap();
        assert!(!response.alternatives.is_empty());
        assert!(response.alternatives.len() <= 3);
    }
}
