//! LTE physical cell identity planning: pairwise conflict classification across
//! exact, co-channel, adjacent-channel and modulus 3/6/12/30 collisions, and an
//! iterative optimizer that reassigns PCIs until the plan is clean or stagnates.

mod algo;
mod analysis;
mod cell;
mod conflict;
mod error;
mod geo;
mod io;
pub mod logging;
mod result;
pub mod rf;
pub mod shutdown;
mod validation;

pub(crate) use geo::spatial;
pub(crate) use io::options;

pub use algo::classifier::{
    AlwaysVisible, ClassifierTuning, LineOfSight, detect_conflicts, detect_conflicts_with,
};
pub use algo::optimizer::{OptimizerOptions, PciOptimizer, Score, optimize};
pub use algo::suggest::{DEFAULT_SUGGESTION_COUNT, suggest_pci};
pub use analysis::{ConflictAnalysis, analyze_conflicts};
pub use cell::{Cell, MAX_LTE_PCI, PciDomain, TowerConfiguration};
pub use conflict::{Conflict, ConflictKind, ConflictStats, Severity};
pub use error::{Error, Result, ValidationError};
pub use geo::geometry;
pub use io::input::{parse_cells, read_cells};
pub use io::options::{LogFormat, LogLevel, PlannerOptions, RunMode};
pub use io::output::{open_output, write_cells, write_conflicts, write_suggestions};
pub use result::{IterationRecord, OptimizationResult, PciChange, Termination};
pub use validation::validate_cells;
