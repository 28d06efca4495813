use crate::{
    Cell, TowerConfiguration,
    algo::classifier::{ClassifierTuning, LineOfSight, detect_conflicts_with},
    conflict::{Conflict, ConflictKind, ConflictStats, Severity},
};

const CLOSE_RANGE_M: f64 = 1_000.0;

/// An audit of a plan without changing it.
#[derive(Clone, Debug, PartialEq)]
pub struct ConflictAnalysis {
    pub conflicts: Vec<Conflict>,
    pub total_cells: usize,
    /// Conflicts per 100 cells.
    pub conflict_rate: f64,
    pub stats: ConflictStats,
    pub recommendations: Vec<String>,
}

pub fn analyze_conflicts(
    cells: &[Cell],
    tuning: &ClassifierTuning,
    los: &dyn LineOfSight,
) -> ConflictAnalysis {
    let conflicts = detect_conflicts_with(cells, tuning, los);
    let conflict_rate = if cells.is_empty() {
        0.0
    } else {
        conflicts.len() as f64 * 100.0 / cells.len() as f64
    };
    let stats = ConflictStats::from_conflicts(&conflicts);
    let recommendations = recommendations(cells, &conflicts, &stats);

    ConflictAnalysis {
        conflicts,
        total_cells: cells.len(),
        conflict_rate,
        stats,
        recommendations,
    }
}

#[derive(Clone, Copy)]
enum Band {
    Low,
    Mid,
    CBand,
}

impl Band {
    fn contains(self, frequency_mhz: f64) -> bool {
        match self {
            Self::Low => frequency_mhz > 0.0 && frequency_mhz < 1_000.0,
            Self::Mid => (1_700.0..=2_600.0).contains(&frequency_mhz),
            Self::CBand => (3_300.0..=3_800.0).contains(&frequency_mhz),
        }
    }

    fn note(self, count: usize) -> String {
        match self {
            Self::Low => {
                format!("{count} conflicts in low-band (600-900 MHz); propagation range up to 30 km")
            }
            Self::Mid => {
                format!("{count} conflicts in mid-band (1700-2600 MHz); propagation range 3-10 km")
            }
            Self::CBand => format!(
                "{count} conflicts in CBRS/C-band (3300-3800 MHz); propagation range 1-3 km"
            ),
        }
    }
}

fn recommendations(cells: &[Cell], conflicts: &[Conflict], stats: &ConflictStats) -> Vec<String> {
    if conflicts.is_empty() {
        return vec![
            String::from("No PCI conflicts detected."),
            String::from("Cells beyond their frequency's propagation range are treated as separate networks."),
        ];
    }

    let mut out = Vec::new();
    let critical = stats.severity(Severity::Critical);
    if critical > 0 {
        out.push(format!(
            "URGENT: {critical} critical PCI conflicts require immediate attention."
        ));
    }
    let high = stats.severity(Severity::High);
    if high > 0 {
        out.push(format!("{high} high-priority PCI conflicts should be resolved soon."));
    }

    let involving = |tower: TowerConfiguration| {
        conflicts
            .iter()
            .filter(|conflict| {
                let (a, b) = conflict.cells(cells);
                a.tower_configuration == tower || b.tower_configuration == tower
            })
            .count()
    };
    let three_sector = involving(TowerConfiguration::ThreeSector);
    if three_sector > 0 {
        out.push(format!(
            "{three_sector} conflicts involve 3-sector towers (120 degree separation); verify sector azimuths."
        ));
    }
    let four_sector = involving(TowerConfiguration::FourSector);
    if four_sector > 0 {
        out.push(format!(
            "{four_sector} conflicts involve 4-sector towers (90 degree separation); verify sector alignment."
        ));
    }

    if stats.kind(ConflictKind::Modulus3) > 0 {
        out.push(String::from(
            "Mod-3 conflicts detected: reference signals collide; reassign PCIs or separate frequencies.",
        ));
    }
    if stats.kind(ConflictKind::Modulus6) > 0 {
        out.push(String::from("Mod-6 conflicts detected: review PBCH configuration."));
    }

    let close = conflicts
        .iter()
        .filter(|conflict| conflict.distance_m < CLOSE_RANGE_M)
        .count();
    if close > 0 {
        out.push(format!(
            "{close} conflicts occur within 1 km; review site locations."
        ));
    }
    if three_sector > 0 && four_sector > 0 {
        out.push(String::from(
            "Mixed 3-sector and 4-sector deployment: use separate PCI pools.",
        ));
    }

    for band in [Band::Low, Band::Mid, Band::CBand] {
        let count = conflicts
            .iter()
            .filter(|conflict| {
                let (a, b) = conflict.cells(cells);
                band.contains(a.frequency_mhz()) || band.contains(b.frequency_mhz())
            })
            .count();
        if count > 0 {
            out.push(band.note(count));
        }
    }
    out
}
