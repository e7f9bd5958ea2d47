use academic_timetabler::parser::{demo::demo_snapshot, load_snapshot_from_dir};
use academic_timetabler::reporter::{generate_reports, generate_faculty_schedule, generate_section_schedule, print_summary, OutputFormat};
use academic_timetabler::resolver::{detect_conflicts, resolve_conflict};
use academic_timetabler::scheduler::{run_cycle, run_generation};
use academic_timetabler::types::{
    ConflictDecision, CycleRequest, FacultyId, GenerateTimetableRequest, GenerationSettings, OfficialTimetablePayload, ProgramId, SectionName, Snapshot,
};
use academic_timetabler::validator::validate_payload;
use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "academic-timetabler")]
#[command(about = "Evolutionary/construction/local-search academic timetable generator")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a timetable for a single (program, term) snapshot
    Generate {
        #[arg(long)]
        program: String,
        #[arg(long)]
        term: u32,
        #[arg(long, default_value_t = 3)]
        alternatives: usize,
        #[arg(long, default_value = "auto")]
        strategy: String,
        #[arg(long)]
        persist: bool,
        #[arg(long)]
        seed: Option<u64>,
        #[arg(long)]
        settings: Option<PathBuf>,
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long, default_value = "./output")]
        output: PathBuf,
    },

    /// Generate a sequence of per-term timetables, carrying resource reservations forward
    Cycle {
        #[arg(long)]
        program: String,
        #[arg(long, value_delimiter = ',')]
        terms: Vec<u32>,
        #[arg(long, default_value = "auto")]
        strategy: String,
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long, default_value = "./output")]
        output: PathBuf,
    },

    /// Re-validate a payload against the full hard-constraint set
    Verify {
        #[arg(long)]
        payload: PathBuf,
        #[arg(long)]
        data: Option<PathBuf>,
        /// Report score even if hard violations are present, instead of exiting nonzero
        #[arg(long)]
        force: bool,
    },

    /// Detect and optionally fix one named conflict in a payload
    Resolve {
        #[arg(long)]
        payload: PathBuf,
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long)]
        conflict: Option<String>,
        #[arg(long, default_value = "yes")]
        decision: String,
        #[arg(long)]
        note: Option<String>,
    },

    /// Run against a small in-memory sample snapshot, no --data directory needed
    Demo {
        #[arg(long, default_value_t = 1)]
        alternatives: usize,
    },

    /// Render a report from a previously generated payload
    Report {
        #[arg(long)]
        payload: PathBuf,
        #[arg(long)]
        data: Option<PathBuf>,
        #[arg(long, default_value = "markdown")]
        format: String,
        #[arg(long)]
        faculty: Option<String>,
        #[arg(long)]
        section: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Generate {
            program,
            term,
            alternatives,
            strategy,
            persist,
            seed,
            settings,
            data,
            output,
        } => run_generate(&program, term, alternatives, &strategy, persist, seed, settings.as_deref(), data.as_deref(), &output),
        Commands::Cycle {
            program,
            terms,
            strategy,
            data,
            output,
        } => run_cycle_command(&program, &terms, &strategy, data.as_deref(), &output),
        Commands::Verify { payload, data, force } => run_verify(&payload, data.as_deref(), force),
        Commands::Resolve {
            payload,
            data,
            conflict,
            decision,
            note,
        } => run_resolve(&payload, data.as_deref(), conflict, &decision, note),
        Commands::Demo { alternatives } => run_demo(alternatives),
        Commands::Report {
            payload,
            data,
            format,
            faculty,
            section,
        } => run_report(&payload, data.as_deref(), &format, faculty, section),
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}").unwrap());
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    pb
}

fn load_snapshot(data: Option<&Path>, program_id: &ProgramId, term: u32) -> Result<Snapshot> {
    match data {
        Some(dir) => load_snapshot_from_dir(dir, program_id, term).context("failed to load input snapshot"),
        None => Ok(demo_snapshot()),
    }
}

fn parse_strategy(strategy: &str) -> Result<academic_timetabler::types::SolverStrategy> {
    use academic_timetabler::types::SolverStrategy::*;
    Ok(match strategy.to_lowercase().as_str() {
        "auto" => Auto,
        "fast" => Fast,
        "hybrid" => Hybrid,
        "annealing" | "simulated_annealing" => SimulatedAnnealing,
        "genetic" => Genetic,
        other => bail!("unknown strategy '{other}' (expected auto|fast|hybrid|annealing|genetic)"),
    })
}

fn load_settings(path: Option<&Path>, strategy: &str, seed: Option<u64>) -> Result<GenerationSettings> {
    let mut settings = match path {
        Some(p) => {
            let content = std::fs::read_to_string(p).with_context(|| format!("failed to read settings file '{}'", p.display()))?;
            toml::from_str(&content).with_context(|| format!("failed to parse settings file '{}'", p.display()))?
        }
        None => GenerationSettings::default(),
    };
    settings.solver_strategy = parse_strategy(strategy)?;
    if let Some(seed) = seed {
        settings.random_seed = seed;
    }
    Ok(settings)
}

#[allow(clippy::too_many_arguments)]
fn run_generate(
    program: &str,
    term: u32,
    alternatives: usize,
    strategy: &str,
    persist: bool,
    seed: Option<u64>,
    settings_path: Option<&Path>,
    data: Option<&Path>,
    output: &Path,
) -> Result<()> {
    let program_id = ProgramId::from(program);
    let snapshot = load_snapshot(data, &program_id, term)?;
    let settings = load_settings(settings_path, strategy, seed)?;

    let request = GenerateTimetableRequest {
        program_id: program_id.clone(),
        term_number: term,
        alternative_count: alternatives.max(1),
        persist_official: persist,
        settings_override: Some(settings),
        already_placed: vec![],
    };

    let pb = spinner("Generating timetable...");
    let response = run_generation(&snapshot, &request)?;
    pb.finish_and_clear();

    if let Some(warning) = &response.publish_warning {
        println!("{} {}", "Warning:".yellow(), warning);
    }

    let Some(best) = response.alternatives.first() else {
        bail!("solver returned no alternatives");
    };
    let validation = validate_payload(&best.payload, &snapshot);
    print_summary(&best.payload, &validation, response.runtime_ms);

    if persist && !validation.is_valid {
        bail!("refusing to persist: payload has {} hard violation(s)", validation.hard_violations.len());
    }

    std::fs::create_dir_all(output)?;
    for (i, alt) in response.alternatives.iter().enumerate() {
        let path = output.join(format!("alternative-{}.json", i + 1));
        std::fs::write(&path, serde_json::to_string_pretty(&alt.payload)?)?;
    }
    println!("Wrote {} alternative(s) to {}", response.alternatives.len(), output.display().to_string().green());

    Ok(())
}

fn run_cycle_command(program: &str, terms: &[u32], strategy: &str, data: Option<&Path>, output: &Path) -> Result<()> {
    if terms.is_empty() {
        bail!("--terms must list at least one term number");
    }
    let program_id = ProgramId::from(program);
    let settings = load_settings(None, strategy, None)?;

    let snapshots: Result<Vec<Snapshot>> = terms.iter().map(|&t| load_snapshot(data, &program_id, t)).collect();
    let snapshots = snapshots?;

    let request = CycleRequest {
        program_id,
        term_numbers: terms.to_vec(),
        alternative_count: 1,
        settings_override: Some(settings),
    };

    let pb = spinner("Running cycle...");
    let response = run_cycle(&snapshots, &request)?;
    pb.finish_and_clear();

    std::fs::create_dir_all(output)?;
    for (term_number, term_response) in &response.per_term {
        if let Some(best) = term_response.alternatives.first() {
            let path = output.join(format!("term-{term_number}.json"));
            std::fs::write(&path, serde_json::to_string_pretty(&best.payload)?)?;
        }
    }
    for (term_number, hard, soft) in &response.pareto_front {
        println!("  term {term_number}: hard={hard} soft={soft:.1}");
    }
    println!("Cycle complete, reports written to {}", output.display().to_string().green());

    Ok(())
}

fn load_payload(path: &Path) -> Result<OfficialTimetablePayload> {
    let content = std::fs::read_to_string(path).with_context(|| format!("failed to read payload '{}'", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("failed to parse payload '{}'", path.display()))
}

fn run_verify(payload_path: &Path, data: Option<&Path>, force: bool) -> Result<()> {
    let payload = load_payload(payload_path)?;
    let snapshot = load_snapshot(data, &payload.program_id, payload.term_number)?;

    let validation = validate_payload(&payload, &snapshot);
    if validation.is_valid {
        println!("{}", "Payload is valid".green().bold());
    } else {
        println!("{}", "Payload has hard violations".red().bold());
        for v in &validation.hard_violations {
            println!("  - {}: {}", v.constraint.red(), v.message);
        }
        if !force {
            bail!("verification failed with {} hard violation(s)", validation.hard_violations.len());
        }
    }
    println!("Score: {:.1}/100", validation.total_score);
    Ok(())
}

fn run_resolve(payload_path: &Path, data: Option<&Path>, conflict_id: Option<String>, decision: &str, note: Option<String>) -> Result<()> {
    let payload = load_payload(payload_path)?;
    let snapshot = load_snapshot(data, &payload.program_id, payload.term_number)?;

    let conflicts = detect_conflicts(&payload);
    let Some(conflict_id) = conflict_id else {
        if conflicts.is_empty() {
            println!("{}", "No room/faculty overlaps detected".green());
        } else {
            println!("Detected {} conflict(s):", conflicts.len());
            for c in &conflicts {
                println!("  [{}] {:?}: {}", c.conflict_id, c.kind, c.message);
            }
        }
        return Ok(());
    };

    let Some(conflict) = conflicts.iter().find(|c| c.conflict_id == conflict_id) else {
        bail!("conflict '{conflict_id}' not found in payload");
    };

    let decision = match decision.to_lowercase().as_str() {
        "yes" | "y" => ConflictDecision::Yes,
        "no" | "n" => ConflictDecision::No,
        other => bail!("unknown decision '{other}' (expected yes|no)"),
    };
    if let Some(note) = &note {
        println!("note: {note}");
    }
    if decision == ConflictDecision::No {
        println!("Skipped resolving conflict '{conflict_id}'");
        return Ok(());
    }

    let resolution = resolve_conflict(&payload, &snapshot, conflict)?;
    println!("{}", resolution.message);
    if resolution.resolved {
        if let Some(new_payload) = &resolution.new_payload {
            std::fs::write(payload_path, serde_json::to_string_pretty(new_payload)?)?;
            println!("Updated payload written to {}", payload_path.display().to_string().green());
        }
    } else {
        bail!("manual action required: {}", resolution.message);
    }
    Ok(())
}

fn run_demo(alternatives: usize) -> Result<()> {
    println!("{}", "Academic Timetabler Demo".bold().cyan());
    println!("{}", "-".repeat(40));

    let snapshot = demo_snapshot();
    let request = GenerateTimetableRequest {
        program_id: snapshot.program_id.clone(),
        term_number: snapshot.term_number,
        alternative_count: alternatives.max(1),
        persist_official: false,
        settings_override: None,
        already_placed: vec![],
    };

    let pb = spinner("Generating demo timetable...");
    let response = run_generation(&snapshot, &request)?;
    pb.finish_and_clear();

    let Some(best) = response.alternatives.first() else {
        bail!("solver returned no alternatives");
    };
    let validation = validate_payload(&best.payload, &snapshot);
    print_summary(&best.payload, &validation, response.runtime_ms);

    let output = PathBuf::from("./output");
    generate_reports(&best.payload, &snapshot, &validation, &output, &[OutputFormat::Json, OutputFormat::Markdown, OutputFormat::Text])?;
    println!("Reports written to: {}", output.display().to_string().green());

    Ok(())
}

fn run_report(payload_path: &Path, data: Option<&Path>, format: &str, faculty: Option<String>, section: Option<String>) -> Result<()> {
    let payload = load_payload(payload_path)?;
    let snapshot = load_snapshot(data, &payload.program_id, payload.term_number)?;

    if let Some(faculty_id) = faculty {
        match generate_faculty_schedule(&payload, &snapshot, &FacultyId::from(faculty_id.as_str())) {
            Some(report) => println!("{report}"),
            None => println!("Faculty member not found"),
        }
    } else if let Some(section_name) = section {
        match generate_section_schedule(&payload, &snapshot, &SectionName::from(section_name.as_str())) {
            Some(report) => println!("{report}"),
            None => println!("Section not found"),
        }
    } else {
        let validation = validate_payload(&payload, &snapshot);
        let formats = parse_formats(format)?;
        let output = PathBuf::from("./output");
        generate_reports(&payload, &snapshot, &validation, &output, &formats)?;
        print_summary(&payload, &validation, 0);
        println!("Reports written to: {}", output.display().to_string().green());
    }

    Ok(())
}

fn parse_formats(format: &str) -> Result<Vec<OutputFormat>> {
    if format == "all" {
        return Ok(vec![OutputFormat::Json, OutputFormat::Markdown, OutputFormat::Text]);
    }
    match format.to_lowercase().as_str() {
        "json" => Ok(vec![OutputFormat::Json]),
        "markdown" | "md" => Ok(vec![OutputFormat::Markdown]),
        "text" | "txt" => Ok(vec![OutputFormat::Text]),
        other => bail!("unknown format '{other}' (expected json|markdown|text|all)"),
    }
}
