use std::{
    sync::atomic::{AtomicBool, Ordering},
    time::{Duration, Instant},
};

use pci_derive::KvDisplay;
use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::{
    Cell, Error, PciDomain, Result,
    algo::classifier::{AlwaysVisible, ClassifierTuning, LineOfSight, detect_conflicts_with},
    cell::{DEFAULT_PCI_MIN, MAX_LTE_PCI},
    conflict::{Conflict, ConflictStats},
    result::{IterationRecord, OptimizationResult, PciChange, Termination},
    spatial::NeighborIndex,
    validation::validate_cells,
};

mod candidate;
mod score;

use candidate::{CandidateSearch, hotspot_counts, pick_cell};
pub(crate) use score::only_low_significance;
pub use score::Score;

pub const DEFAULT_SEED: u64 = 12_345;
const SHAKEUP_REASON: &str = "shakeup";

const ERR_ZERO_BATCH: &str = "batch_size must be > 0";
const ERR_BATCH_ORDER: &str = "max_batch_size must be >= batch_size";
const ERR_RADIUS: &str = "interference_radius_m must be finite and > 0";

/// Knobs of one optimizer run.
#[derive(Clone, Debug, PartialEq, KvDisplay)]
pub struct OptimizerOptions {
    pub pci_min: u16,
    pub pci_max: u16,
    pub max_iterations: usize,
    /// Non-improving iterations tolerated before a shakeup.
    pub stagnation_limit: usize,
    pub max_shakeups: usize,
    pub seed: u64,
    /// Conflicts handled per iteration; grows by one for every two rollbacks.
    pub batch_size: usize,
    pub max_batch_size: usize,
    pub interference_radius_m: f64,
    /// Equal-cost candidates sampled from when picking a PCI.
    pub tie_pool: usize,
    /// Wall-clock bound checked between iterations; 0 disables it.
    pub time_limit_secs: u64,
    #[kv(fmt = "debug")]
    pub classifier: ClassifierTuning,
}

impl Default for OptimizerOptions {
    fn default() -> Self {
        Self {
            pci_min: DEFAULT_PCI_MIN,
            pci_max: MAX_LTE_PCI,
            max_iterations: 200,
            stagnation_limit: 8,
            max_shakeups: 5,
            seed: DEFAULT_SEED,
            batch_size: 3,
            max_batch_size: 12,
            interference_radius_m: 15_000.0,
            tie_pool: 3,
            time_limit_secs: 0,
            classifier: ClassifierTuning::default(),
        }
    }
}

impl OptimizerOptions {
    pub fn domain(&self) -> Result<PciDomain> {
        Ok(PciDomain::new(self.pci_min, self.pci_max)?)
    }

    pub fn with_domain(mut self, domain: PciDomain) -> Self {
        self.pci_min = domain.min();
        self.pci_max = domain.max();
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    fn validate(&self) -> Result<PciDomain> {
        if self.batch_size == 0 {
            return Err(Error::invalid_input(ERR_ZERO_BATCH));
        }
        if self.max_batch_size < self.batch_size {
            return Err(Error::invalid_input(ERR_BATCH_ORDER));
        }
        if !(self.interference_radius_m.is_finite() && self.interference_radius_m > 0.0) {
            return Err(Error::invalid_input(ERR_RADIUS));
        }
        self.domain()
    }

    fn time_limit(&self) -> Option<Duration> {
        (self.time_limit_secs > 0).then(|| Duration::from_secs(self.time_limit_secs))
    }
}

/// Optimizes with the default generator seeded from `options.seed` and no terrain data.
pub fn optimize(cells: &[Cell], options: &OptimizerOptions) -> Result<OptimizationResult> {
    PciOptimizer::new(options.clone()).run(cells)
}

/// Iterative local search over PCI assignments with rollback and random shakeups.
pub struct PciOptimizer<'a> {
    options: OptimizerOptions,
    los: &'a dyn LineOfSight,
    stop: Option<&'a AtomicBool>,
    deadline: Option<Instant>,
}

#[derive(Clone, Debug)]
struct Snapshot {
    cells: Vec<Cell>,
    score: Score,
    conflict_count: usize,
    log_len: usize,
}

impl<'a> PciOptimizer<'a> {
    pub fn new(options: OptimizerOptions) -> Self {
        Self {
            options,
            los: &AlwaysVisible,
            stop: None,
            deadline: None,
        }
    }

    pub fn line_of_sight(mut self, los: &'a dyn LineOfSight) -> Self {
        self.los = los;
        self
    }

    /// Checked between iterations; raising it ends the run with the best snapshot.
    pub fn stop_flag(mut self, stop: &'a AtomicBool) -> Self {
        self.stop = Some(stop);
        self
    }

    /// Wall-clock bound; takes precedence over `time_limit_secs`.
    pub fn deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn options(&self) -> &OptimizerOptions {
        &self.options
    }

    pub fn run(&self, cells: &[Cell]) -> Result<OptimizationResult> {
        let mut rng = StdRng::seed_from_u64(self.options.seed);
        self.run_with_rng(cells, &mut rng)
    }

    /// Every random decision of the run is drawn from `rng`.
    #[pci_derive::timer("optimizer.run")]
    pub fn run_with_rng<R: Rng + ?Sized>(
        &self,
        cells: &[Cell],
        rng: &mut R,
    ) -> Result<OptimizationResult> {
        let domain = self.options.validate()?;
        validate_cells(cells, domain)?;
        log::debug!("optimizer: options{}", self.options);
        Ok(self.search(cells, domain, rng))
    }

    fn classify(&self, cells: &[Cell]) -> Vec<Conflict> {
        detect_conflicts_with(cells, &self.options.classifier, self.los)
    }

    fn stop_requested(&self) -> bool {
        self.stop.is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    fn search<R: Rng + ?Sized>(
        &self,
        cells: &[Cell],
        domain: PciDomain,
        rng: &mut R,
    ) -> OptimizationResult {
        let options = &self.options;
        let deadline = self
            .deadline
            .or_else(|| options.time_limit().map(|limit| Instant::now() + limit));
        let index = NeighborIndex::new(cells);
        let candidates = CandidateSearch {
            domain,
            radius_m: options.interference_radius_m,
            guard_mhz: options.classifier.adjacent_guard_mhz,
            tie_pool: options.tie_pool,
        };

        let mut working = cells.to_vec();
        let mut conflicts = self.classify(&working);
        let mut score = Score::of(&conflicts);
        let original_conflict_count = conflicts.len();
        let mut change_log: Vec<PciChange> = Vec::new();
        let mut best = Snapshot {
            cells: working.clone(),
            score,
            conflict_count: original_conflict_count,
            log_len: 0,
        };
        let mut history = vec![IterationRecord {
            iteration: 0,
            stats: ConflictStats::from_conflicts(&conflicts),
            score,
            best_score: score,
            accepted: true,
            changes: 0,
            shakeup: false,
            stagnation: 0,
        }];

        log::info!(
            "optimizer: start cells={} conflicts={} domain={} {}",
            cells.len(),
            original_conflict_count,
            domain,
            score
        );

        let mut iterations = 0;
        let mut stagnation = 0;
        let mut rollbacks = 0;
        let mut shakeups = 0;

        let termination = loop {
            if conflicts.is_empty() {
                break Termination::Converged;
            }
            if only_low_significance(&conflicts) {
                break Termination::OnlyLowSignificance;
            }
            if self.stop_requested() {
                break Termination::Interrupted;
            }
            if deadline.is_some_and(|deadline| Instant::now() >= deadline) {
                break Termination::TimeLimit;
            }
            if iterations >= options.max_iterations {
                break Termination::IterationCap;
            }
            iterations += 1;

            let before = working.clone();
            let batch_len = (options.batch_size + rollbacks / 2).min(options.max_batch_size);
            let counts = hotspot_counts(working.len(), &conflicts);
            let mut touched = vec![false; working.len()];
            let mut changes: Vec<PciChange> = Vec::new();

            for conflict in conflicts.iter().take(batch_len) {
                let Some(idx) = pick_cell(conflict, &counts, &working, &touched) else {
                    continue;
                };
                let neighbors = index.within(&working, idx, options.interference_radius_m);
                let Some(new_pci) = candidates.choose(rng, &working, idx, &neighbors) else {
                    continue;
                };
                touched[idx] = true;
                changes.push(PciChange {
                    cell_id: working[idx].id.clone(),
                    old_pci: working[idx].pci,
                    new_pci,
                    reason: format!("{} {}", conflict.severity, conflict.kind),
                });
                working[idx].pci = new_pci;
            }

            let next_conflicts = self.classify(&working);
            let next_score = Score::of(&next_conflicts);
            let accepted = !changes.is_empty() && next_score <= score;
            let change_count = changes.len();

            if accepted {
                if next_score < score {
                    stagnation = 0;
                } else {
                    stagnation += 1;
                }
                change_log.extend(changes);
                conflicts = next_conflicts;
                score = next_score;
            } else {
                working = before;
                stagnation += 1;
                rollbacks += 1;
            }

            log::debug!(
                "optimizer.iter: iteration={} accepted={} changes={} batch={} {} stagnation={}",
                iterations,
                accepted,
                change_count,
                batch_len,
                score,
                stagnation
            );

            let stagnation_seen = stagnation;
            let mut shook = false;
            if stagnation >= options.stagnation_limit {
                if shakeups >= options.max_shakeups {
                    update_best(
                        &mut best,
                        &working,
                        score,
                        conflicts.len(),
                        &change_log,
                        original_conflict_count,
                    );
                    history.push(IterationRecord {
                        iteration: iterations,
                        stats: ConflictStats::from_conflicts(&conflicts),
                        score,
                        best_score: best.score,
                        accepted,
                        changes: change_count,
                        shakeup: false,
                        stagnation: stagnation_seen,
                    });
                    break Termination::ShakeupsExhausted;
                }

                shakeups += 1;
                let shaken = shake_up(rng, &mut working, &conflicts, domain, &mut change_log);
                conflicts = self.classify(&working);
                score = Score::of(&conflicts);
                stagnation = 0;
                rollbacks = 0;
                shook = true;
                log::info!(
                    "optimizer.shakeup: count={} cells={} {}",
                    shakeups,
                    shaken,
                    score
                );
            }

            update_best(
                &mut best,
                &working,
                score,
                conflicts.len(),
                &change_log,
                original_conflict_count,
            );
            history.push(IterationRecord {
                iteration: iterations,
                stats: ConflictStats::from_conflicts(&conflicts),
                score,
                best_score: best.score,
                accepted,
                changes: change_count,
                shakeup: shook,
                stagnation: stagnation_seen,
            });
        };

        change_log.truncate(best.log_len);
        log::info!(
            "optimizer: done termination={} iterations={} shakeups={} conflicts={}->{} changes={}",
            termination,
            iterations,
            shakeups,
            original_conflict_count,
            best.conflict_count,
            change_log.len()
        );

        OptimizationResult {
            original_assignment: cells.to_vec(),
            final_assignment: best.cells,
            iterations,
            original_conflict_count,
            final_conflict_count: best.conflict_count,
            final_score: best.score,
            change_log,
            convergence_history: history,
            termination,
            shakeups,
        }
    }
}

/// Keeps the snapshot when strictly better and no worse than the input in conflict count.
fn update_best(
    best: &mut Snapshot,
    working: &[Cell],
    score: Score,
    conflict_count: usize,
    change_log: &[PciChange],
    original_conflict_count: usize,
) {
    if score < best.score && conflict_count <= original_conflict_count {
        *best = Snapshot {
            cells: working.to_vec(),
            score,
            conflict_count,
            log_len: change_log.len(),
        };
    }
}

/// Gives every conflicting cell a uniformly random in-domain PCI. Returns how many moved.
fn shake_up<R: Rng + ?Sized>(
    rng: &mut R,
    working: &mut [Cell],
    conflicts: &[Conflict],
    domain: PciDomain,
    change_log: &mut Vec<PciChange>,
) -> usize {
    let mut involved = vec![false; working.len()];
    for conflict in conflicts {
        involved[conflict.cell_a] = true;
        involved[conflict.cell_b] = true;
    }

    let mut moved = 0;
    for (cell, _) in working
        .iter_mut()
        .zip(involved)
        .filter(|(_, involved)| *involved)
    {
        let new_pci = rng.random_range(domain.min()..=domain.max());
        if new_pci == cell.pci {
            continue;
        }
        change_log.push(PciChange {
            cell_id: cell.id.clone(),
            old_pci: cell.pci,
            new_pci,
            reason: String::from(SHAKEUP_REASON),
        });
        cell.pci = new_pci;
        moved += 1;
    }
    moved
}

#[cfg(test)]
mod tests {
    use std::{sync::atomic::AtomicBool, time::Instant};

    use rand::{SeedableRng, rngs::StdRng};

    use super::{OptimizerOptions, PciOptimizer, optimize};
    use crate::{
        Cell, Error, PciDomain, ValidationError,
        algo::classifier::detect_conflicts,
        result::{OptimizationResult, Termination},
    };

    fn at(id: &str, site: &str, sector: u32, pci: u16, lat: f64, lng: f64) -> Cell {
        Cell::new(id, site, sector, pci, lat, lng)
            .with_frequency(2_110.0)
            .with_rs_power(15.0)
    }

    /// Co-channel cells packed well inside the critical distance of each other.
    fn dense_cluster(count: usize, pci: u16) -> Vec<Cell> {
        (0..count)
            .map(|k| {
                at(
                    &format!("c{k}"),
                    &format!("site-{k}"),
                    1,
                    pci,
                    40.0 + 0.001 * k as f64,
                    -75.0,
                )
            })
            .collect()
    }

    fn replay(result: &OptimizationResult) -> Vec<Cell> {
        let mut cells = result.original_assignment.clone();
        for change in &result.change_log {
            let cell = cells
                .iter_mut()
                .find(|cell| cell.id == change.cell_id)
                .expect("logged cell exists");
            assert_eq!(cell.pci, change.old_pci);
            cell.pci = change.new_pci;
        }
        cells
    }

    #[test]
    fn conflict_free_input_is_returned_untouched() {
        let cells = vec![
            at("a", "s1", 1, 31, 40.0, -75.0),
            at("b", "s2", 1, 35, 40.2, -75.0),
        ];
        assert!(detect_conflicts(&cells).is_empty());

        let result = optimize(&cells, &OptimizerOptions::default()).expect("optimize");
        assert_eq!(result.final_assignment, cells);
        assert_eq!(result.iterations, 0);
        assert!(result.change_log.is_empty());
        assert_eq!(result.convergence_history.len(), 1);
        assert_eq!(result.termination, Termination::Converged);
    }

    #[test]
    fn same_site_collision_is_separated_by_mod3() {
        let cells = vec![
            at("a1", "site-a", 1, 45, 40.0, -75.0).with_azimuth(0.0),
            at("a2", "site-a", 2, 45, 40.0, -75.0).with_azimuth(120.0),
        ];
        let result = optimize(&cells, &OptimizerOptions::default()).expect("optimize");

        let (a, b) = (&result.final_assignment[0], &result.final_assignment[1]);
        assert_ne!(a.pci, b.pci);
        assert_ne!(a.pci % 3, b.pci % 3);
        assert_eq!(result.final_conflict_count, 0);
        assert_eq!(result.termination, Termination::Converged);
        assert_eq!(result.original_assignment, cells);
    }

    #[test]
    fn cross_site_mod3_conflict_is_resolved() {
        let cells = vec![
            at("a", "s1", 1, 10, 40.0, -75.0),
            at("b", "s2", 1, 13, 40.0072, -75.0),
        ];
        let options = OptimizerOptions::default().with_domain(PciDomain::full());
        let result = optimize(&cells, &options).expect("optimize");

        let (a, b) = (&result.final_assignment[0], &result.final_assignment[1]);
        assert_ne!(a.pci % 3, b.pci % 3);
        assert_eq!(result.original_conflict_count, 1);
        assert_eq!(result.final_conflict_count, 0);
        assert_eq!(result.resolved_conflicts(), 1);
    }

    #[test]
    fn runs_are_reproducible_for_a_seed() {
        let cells = dense_cluster(9, 60);
        let options = OptimizerOptions::default().with_seed(99);
        let first = optimize(&cells, &options).expect("first run");
        let second = optimize(&cells, &options).expect("second run");
        assert_eq!(first.change_log, second.change_log);
        assert_eq!(first.final_assignment, second.final_assignment);
        assert_eq!(first.convergence_history, second.convergence_history);
    }

    #[test]
    fn injected_rng_drives_the_run() {
        let cells = dense_cluster(6, 60);
        let optimizer = PciOptimizer::new(OptimizerOptions::default());
        let a = optimizer
            .run_with_rng(&cells, &mut StdRng::seed_from_u64(5))
            .expect("run a");
        let b = optimizer
            .run_with_rng(&cells, &mut StdRng::seed_from_u64(5))
            .expect("run b");
        assert_eq!(a.change_log, b.change_log);
    }

    #[test]
    fn best_score_never_regresses_and_final_stays_in_domain() {
        let cells = dense_cluster(12, 70);
        let options = OptimizerOptions {
            pci_min: 60,
            pci_max: 80,
            ..OptimizerOptions::default()
        };
        let domain = options.domain().expect("domain");
        let result = optimize(&cells, &options).expect("optimize");

        for pair in result.convergence_history.windows(2) {
            assert!(pair[1].best_score <= pair[0].best_score);
        }
        assert!(result.final_conflict_count <= result.original_conflict_count);
        assert!(result.final_assignment.iter().all(|cell| domain.contains(cell.pci)));
        assert_eq!(
            detect_conflicts(&result.final_assignment).len(),
            result.final_conflict_count
        );
    }

    #[test]
    fn change_log_replays_to_final_assignment() {
        let cells = dense_cluster(10, 60);
        let result = optimize(&cells, &OptimizerOptions::default()).expect("optimize");
        assert!(!result.change_log.is_empty());
        assert_eq!(replay(&result), result.final_assignment);
    }

    #[test]
    fn unsolvable_cluster_triggers_shakeups_until_exhausted() {
        // Four co-channel cells and three PCIs: some pair always shares a PCI.
        let cells = dense_cluster(4, 30);
        let options = OptimizerOptions {
            pci_min: 30,
            pci_max: 32,
            stagnation_limit: 3,
            max_shakeups: 2,
            ..OptimizerOptions::default()
        };
        let result = optimize(&cells, &options).expect("optimize");

        assert_eq!(result.termination, Termination::ShakeupsExhausted);
        assert_eq!(result.shakeups, 2);
        let first_shakeup = result
            .convergence_history
            .iter()
            .find(|record| record.shakeup)
            .expect("a shakeup was recorded");
        assert_eq!(first_shakeup.stagnation, options.stagnation_limit);
        assert!(result.final_conflict_count > 0);
        assert!(result.final_conflict_count <= result.original_conflict_count);
        assert_eq!(replay(&result), result.final_assignment);
    }

    #[test]
    fn iteration_cap_stops_the_run() {
        let cells = dense_cluster(4, 30);
        let options = OptimizerOptions {
            pci_min: 30,
            pci_max: 32,
            max_iterations: 2,
            ..OptimizerOptions::default()
        };
        let result = optimize(&cells, &options).expect("optimize");
        assert_eq!(result.termination, Termination::IterationCap);
        assert_eq!(result.iterations, 2);
        assert_eq!(result.convergence_history.len(), 3);
    }

    #[test]
    fn raised_stop_flag_returns_input_snapshot() {
        let cells = dense_cluster(4, 60);
        let stop = AtomicBool::new(true);
        let result = PciOptimizer::new(OptimizerOptions::default())
            .stop_flag(&stop)
            .run(&cells)
            .expect("run");
        assert_eq!(result.termination, Termination::Interrupted);
        assert_eq!(result.iterations, 0);
        assert_eq!(result.final_assignment, cells);
    }

    #[test]
    fn expired_deadline_returns_input_snapshot() {
        let cells = dense_cluster(4, 60);
        let result = PciOptimizer::new(OptimizerOptions::default())
            .deadline(Instant::now())
            .run(&cells)
            .expect("run");
        assert_eq!(result.termination, Termination::TimeLimit);
        assert!(!result.termination.is_success());
        assert_eq!(result.iterations, 0);
        assert_eq!(result.final_assignment, cells);
        assert_eq!(result.final_conflict_count, result.original_conflict_count);
    }

    #[test]
    fn distant_mod30_pair_is_left_as_low_significance() {
        // About 5 km apart on one channel: every residue match is low severity.
        let cells = vec![
            at("a", "s1", 1, 40, 40.0, -75.0),
            at("b", "s2", 1, 70, 40.045, -75.0),
        ];
        assert!(!detect_conflicts(&cells).is_empty());

        let result = optimize(&cells, &OptimizerOptions::default()).expect("optimize");
        assert_eq!(result.termination, Termination::OnlyLowSignificance);
        assert!(result.termination.is_success());
        assert_eq!(result.iterations, 0);
        assert!(result.final_conflict_count > 0);
        assert_eq!(result.final_assignment, cells);
        assert!(result.change_log.is_empty());
    }

    #[test]
    fn medium_mod3_behind_a_mod30_match_is_resolved() {
        let cells = vec![
            at("a", "s1", 1, 40, 40.0, -75.0),
            at("b", "s2", 1, 70, 40.02, -75.0),
        ];
        let result = optimize(&cells, &OptimizerOptions::default()).expect("optimize");

        let (a, b) = (&result.final_assignment[0], &result.final_assignment[1]);
        assert_ne!(a.pci % 3, b.pci % 3);
        assert!(result.iterations > 0);
        assert!(result.termination.is_success());
        assert!(result.final_conflict_count < result.original_conflict_count);
    }

    #[test]
    fn hidden_pairs_still_get_optimized() {
        let cells = dense_cluster(3, 60);
        let hidden = |_: &Cell, _: &Cell| false;
        let result = PciOptimizer::new(OptimizerOptions::default())
            .line_of_sight(&hidden)
            .run(&cells)
            .expect("run");
        assert!(result.final_conflict_count < result.original_conflict_count);
    }

    #[test]
    fn malformed_input_is_rejected_before_the_run() {
        let cells = vec![at("a", "s1", 1, 12, 40.0, -75.0)];
        let err = optimize(&cells, &OptimizerOptions::default()).expect_err("out of domain");
        assert!(matches!(
            err.as_validation(),
            Some(ValidationError::PciOutOfDomain { pci: 12, .. })
        ));

        let options = OptimizerOptions {
            batch_size: 0,
            ..OptimizerOptions::default()
        };
        let err = optimize(&[], &options).expect_err("zero batch");
        assert!(matches!(err, Error::InvalidInput(_)));

        let options = OptimizerOptions {
            pci_min: 90,
            pci_max: 80,
            ..OptimizerOptions::default()
        };
        assert!(matches!(
            optimize(&[], &options),
            Err(Error::Validation(ValidationError::InvalidDomain { .. }))
        ));
    }
}
