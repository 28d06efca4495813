use std::fmt;

use crate::Cell;

#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum Severity {
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    pub const ALL: [Self; 4] = [Self::Critical, Self::High, Self::Medium, Self::Low];

    /// One level milder; `Low` stays `Low`.
    pub fn demoted(self) -> Self {
        match self {
            Self::Critical => Self::High,
            Self::High => Self::Medium,
            Self::Medium | Self::Low => Self::Low,
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Critical => "critical",
        })
    }
}

/// What kind of receiver ambiguity a pair of cells produces.
///
/// PCI mod 3 selects the PSS sequence and the CRS frequency shift, so it is the
/// most destructive collision; mod 30 (SSS/PRS) is the mildest.
#[derive(Clone, Copy, Debug, Eq, Hash, Ord, PartialEq, PartialOrd)]
pub enum ConflictKind {
    ExactCollision,
    CoChannelFrequency,
    AdjacentChannel,
    Modulus3,
    Modulus6,
    Modulus12,
    Modulus30,
}

impl ConflictKind {
    pub const ALL: [Self; 7] = [
        Self::ExactCollision,
        Self::CoChannelFrequency,
        Self::AdjacentChannel,
        Self::Modulus3,
        Self::Modulus6,
        Self::Modulus12,
        Self::Modulus30,
    ];

    /// Modulus kinds in order of physical significance.
    pub const MODULI: [Self; 4] = [Self::Modulus3, Self::Modulus6, Self::Modulus12, Self::Modulus30];

    pub fn modulus(self) -> Option<u16> {
        match self {
            Self::Modulus3 => Some(3),
            Self::Modulus6 => Some(6),
            Self::Modulus12 => Some(12),
            Self::Modulus30 => Some(30),
            _ => None,
        }
    }

    /// Key used in the one-line stats summary.
    fn stat_key(self) -> &'static str {
        match self {
            Self::ExactCollision => "exact",
            Self::CoChannelFrequency => "co_channel",
            Self::AdjacentChannel => "adjacent",
            Self::Modulus3 => "mod3",
            Self::Modulus6 => "mod6",
            Self::Modulus12 => "mod12",
            Self::Modulus30 => "mod30",
        }
    }

    /// Penalty of one remaining non-critical conflict; falls as the colliding modulus grows.
    pub fn modulus_penalty(self) -> u64 {
        match self {
            Self::ExactCollision | Self::CoChannelFrequency => 60,
            Self::AdjacentChannel => 20,
            kind => kind.modulus().map_or(0, |m| 60 / u64::from(m)),
        }
    }
}

impl fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::ExactCollision => "exact-collision",
            Self::CoChannelFrequency => "co-channel-frequency",
            Self::AdjacentChannel => "adjacent-channel",
            Self::Modulus3 => "modulus-3",
            Self::Modulus6 => "modulus-6",
            Self::Modulus12 => "modulus-12",
            Self::Modulus30 => "modulus-30",
        })
    }
}

/// A pairwise conflict. `cell_a < cell_b` index into the slice that was classified.
#[derive(Clone, Debug, PartialEq)]
pub struct Conflict {
    pub cell_a: usize,
    pub cell_b: usize,
    pub kind: ConflictKind,
    pub severity: Severity,
    pub distance_m: f64,
    pub frequency_overlap: bool,
    pub channel_separation_mhz: f64,
}

impl Conflict {
    pub fn cells<'a>(&self, cells: &'a [Cell]) -> (&'a Cell, &'a Cell) {
        (&cells[self.cell_a], &cells[self.cell_b])
    }

    /// `severity,kind,cell_a,cell_b,distance_m,frequency_overlap,separation_mhz`
    pub fn to_line(&self, cells: &[Cell]) -> String {
        let (a, b) = self.cells(cells);
        format!(
            "{},{},{},{},{:.0},{},{:.1}",
            self.severity,
            self.kind,
            a.id,
            b.id,
            self.distance_m,
            self.frequency_overlap,
            self.channel_separation_mhz
        )
    }
}

/// Conflict counts per severity and per kind.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ConflictStats {
    pub total: usize,
    by_severity: [usize; 4],
    by_kind: [usize; 7],
}

impl ConflictStats {
    pub fn from_conflicts(conflicts: &[Conflict]) -> Self {
        let mut stats = Self {
            total: conflicts.len(),
            ..Self::default()
        };
        for conflict in conflicts {
            stats.by_severity[conflict.severity as usize] += 1;
            stats.by_kind[conflict.kind as usize] += 1;
        }
        stats
    }

    pub fn severity(&self, severity: Severity) -> usize {
        self.by_severity[severity as usize]
    }

    pub fn kind(&self, kind: ConflictKind) -> usize {
        self.by_kind[kind as usize]
    }
}

impl fmt::Display for ConflictStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "total={}", self.total)?;
        for severity in Severity::ALL {
            write!(f, " {severity}={}", self.severity(severity))?;
        }
        for kind in ConflictKind::ALL {
            write!(f, " {}={}", kind.stat_key(), self.kind(kind))?;
        }
        Ok(())
    }
}
