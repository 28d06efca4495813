use std::fmt;

use crate::Cell;

/// Extra spacing beyond the touching-edges point that still counts as adjacent.
pub const DEFAULT_ADJACENT_GUARD_MHZ: f64 = 5.0;
/// Centre frequencies closer than this are the same channel.
pub const SAME_CENTER_TOLERANCE_MHZ: f64 = 0.1;

#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum ChannelRelation {
    /// The occupied bandwidths intersect.
    CoChannel,
    /// No spectral overlap, but within the guard of the band edges.
    Adjacent,
    Separated,
}

impl fmt::Display for ChannelRelation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::CoChannel => "co-channel",
            Self::Adjacent => "adjacent",
            Self::Separated => "separated",
        })
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrequencyOverlap {
    pub relation: ChannelRelation,
    /// Absolute distance between the centre frequencies.
    pub separation_mhz: f64,
}

impl FrequencyOverlap {
    pub fn overlaps(&self) -> bool {
        self.relation == ChannelRelation::CoChannel
    }

    /// Same channel, not merely overlapping.
    pub fn same_center(&self) -> bool {
        self.overlaps() && self.separation_mhz < SAME_CENTER_TOLERANCE_MHZ
    }
}

/// Compares the `centre ± bandwidth / 2` windows of two cells.
pub fn frequency_overlap(a: &Cell, b: &Cell, guard_mhz: f64) -> FrequencyOverlap {
    let (freq_a, freq_b) = (a.frequency_mhz(), b.frequency_mhz());
    if !(freq_a > 0.0 && freq_b > 0.0 && freq_a.is_finite() && freq_b.is_finite()) {
        return FrequencyOverlap {
            relation: ChannelRelation::Separated,
            separation_mhz: 0.0,
        };
    }

    let separation_mhz = (freq_a - freq_b).abs();
    let touching = (a.channel_bandwidth_mhz + b.channel_bandwidth_mhz) / 2.0;

    let relation = if separation_mhz < touching {
        ChannelRelation::CoChannel
    } else if separation_mhz < touching + guard_mhz {
        ChannelRelation::Adjacent
    } else {
        ChannelRelation::Separated
    };

    FrequencyOverlap {
        relation,
        separation_mhz,
    }
}
