//! Academic timetable generator - evolutionary/construction/local-search solver.
//!
//! Given a curriculum, an enrolled population, and a resource pool, produces a
//! weekly assignment of every required teaching block to a (day, slot, room,
//! faculty) tuple that satisfies the hard constraints and minimises a weighted
//! sum of soft penalties.
//!
//! # Pipeline
//!
//! 1. **Input snapshot loader** ([`parser`]): reads curriculum, sections,
//!    faculty, rooms, working-hours grid, and constraint profile.
//! 2. **Block expansion** ([`scheduler::expansion`]): explodes each
//!    (course, section, batch) into `BlockRequest`s with enumerated placement
//!    options.
//! 3. **Evaluator** ([`scheduler::evaluator`]): scores a genotype's hard
//!    conflicts and soft penalty.
//! 4. **Constructor / repair / drivers** ([`scheduler::constructor`],
//!    [`scheduler::repair`], [`scheduler::drivers`]): build and improve
//!    candidate genotypes.
//! 5. **Verifier / publish gate** ([`validator`]): re-checks any payload
//!    against the full hard-constraint set before persistence.
//! 6. **Conflict auto-resolver** ([`resolver`]): finds a minimal edit that
//!    eliminates one named conflict.
//!
//! # Example
//!
//! ```no_run
//! use academic_timetabler::parser::load_snapshot_from_dir;
//! use academic_timetabler::scheduler::run_generation;
//! use academic_timetabler::types::{GenerateTimetableRequest, ProgramId};
//! use std::path::Path;
//!
//! let snapshot = load_snapshot_from_dir(Path::new("./data/demo"), &ProgramId::from("CS"), 1).unwrap();
//! let request = GenerateTimetableRequest {
//!     program_id: ProgramId::from("CS"),
//!     term_number: 1,
//!     alternative_count: 3,
//!     persist_official: false,
//!     settings_override: None,
//!     already_placed: vec![],
//! };
//! let response = run_generation(&snapshot, &request).unwrap();
//! println!("alternatives: {}", response.alternatives.len());
//! ```

pub mod error;
pub mod parser;
pub mod reporter;
pub mod resolver;
pub mod scheduler;
pub mod types;
pub mod validator;

pub use error::{Result, SchedulerError};
