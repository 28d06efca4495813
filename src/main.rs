use std::{io::Write, time::Instant};

use log::info;

use pci_core::{
    AlwaysVisible, Cell, PciDomain, PciOptimizer, PlannerOptions, Result, RunMode,
    analyze_conflicts, logging, open_output, read_cells, shutdown, suggest_pci, validate_cells,
    write_cells, write_conflicts, write_suggestions,
};

fn main() -> Result<()> {
    let now = Instant::now();
    let options = PlannerOptions::from_args()?;
    logging::init_logger(&options)?;
    let cells = read_cells(options.input_path())?;

    info!("input: cells={}", cells.len());
    info!("options: {options}");

    let mut out = open_output(options.output_path())?;
    let written = match options.mode {
        RunMode::Analyze => analyze(&cells, &options, &mut out)?,
        RunMode::Optimize => optimize(&cells, &options, &mut out)?,
        RunMode::Suggest => suggest(&cells, &options, &mut out)?,
    };

    info!(
        "output: mode={} n={written} time={:.2}s",
        options.mode,
        now.elapsed().as_secs_f32()
    );

    Ok(())
}

fn analyze(cells: &[Cell], options: &PlannerOptions, out: &mut dyn Write) -> Result<usize> {
    validate_cells(cells, PciDomain::full())?;
    let analysis = analyze_conflicts(cells, &options.classifier_tuning(), &AlwaysVisible);

    info!(
        "analysis: cells={} rate={:.1}/100 {}",
        analysis.total_cells, analysis.conflict_rate, analysis.stats
    );
    for note in &analysis.recommendations {
        info!("analysis: {note}");
    }

    write_conflicts(out, cells, &analysis.conflicts)?;
    Ok(analysis.conflicts.len())
}

fn optimize(cells: &[Cell], options: &PlannerOptions, out: &mut dyn Write) -> Result<usize> {
    let result = PciOptimizer::new(options.to_optimizer_options())
        .stop_flag(shutdown::interrupt_flag()?)
        .run(cells)?;

    for change in &result.change_log {
        info!("change: {change}");
    }
    info!(
        "optimize: termination={} iterations={} shakeups={} conflicts={}->{} reduction={:.1}% changed={}",
        result.termination,
        result.iterations,
        result.shakeups,
        result.original_conflict_count,
        result.final_conflict_count,
        result.conflict_reduction_percent(),
        result.changed_cells().count()
    );
    if !result.termination.is_success() {
        log::warn!(
            "optimize: stopped before a clean plan termination={} score={}",
            result.termination,
            result.final_score
        );
    }

    write_cells(out, &result.final_assignment)?;
    Ok(result.final_assignment.len())
}

fn suggest(cells: &[Cell], options: &PlannerOptions, out: &mut dyn Write) -> Result<usize> {
    let domain = options.to_optimizer_options().domain()?;
    validate_cells(cells, PciDomain::full())?;
    let suggestions = suggest_pci(cells, domain, options.suggestions);
    if suggestions.is_empty() {
        log::warn!("suggest: no PCI in {domain} avoids every modulus residue in use");
    }

    write_suggestions(out, &suggestions)?;
    Ok(suggestions.len())
}
