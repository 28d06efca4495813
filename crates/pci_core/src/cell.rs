use std::fmt;

use pci_derive::CliValue;

use crate::{ValidationError, geometry, rf::earfcn};

/// Highest PCI in the LTE identity space (168 groups x 3 identities).
pub const MAX_LTE_PCI: u16 = 503;
/// Values below this are left for third-party reuse by default.
pub const DEFAULT_PCI_MIN: u16 = 30;
pub const DEFAULT_BANDWIDTH_MHZ: f64 = 20.0;

const NINETY: f64 = 90.0;
const ONE_EIGHTY: f64 = NINETY * 2.0;
const THREE_SECTOR_AZIMUTHS: [f64; 3] = [0.0, 120.0, 240.0];
const FOUR_SECTOR_AZIMUTHS: [f64; 4] = [0.0, 90.0, 180.0, 270.0];

#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, CliValue)]
#[cli_value(option = "tower")]
pub enum TowerConfiguration {
    #[default]
    #[cli(alias = "3-sector", alias = "3")]
    ThreeSector,
    #[cli(alias = "4-sector", alias = "4")]
    FourSector,
}

impl TowerConfiguration {
    /// Boresight spacing of a correctly aimed site.
    pub fn expected_azimuth_separation(self) -> f64 {
        match self {
            Self::ThreeSector => 120.0,
            Self::FourSector => 90.0,
        }
    }

    pub fn default_beamwidth(self) -> f64 {
        match self {
            Self::ThreeSector => 65.0,
            Self::FourSector => 45.0,
        }
    }

    /// Nominal azimuth for a 1-based sector index.
    pub fn default_azimuth(self, sector_index: u32) -> f64 {
        let slot = sector_index.saturating_sub(1) as usize;
        match self {
            Self::ThreeSector => THREE_SECTOR_AZIMUTHS[slot % THREE_SECTOR_AZIMUTHS.len()],
            Self::FourSector => FOUR_SECTOR_AZIMUTHS[slot % FOUR_SECTOR_AZIMUTHS.len()],
        }
    }
}

/// Inclusive range of PCI values the planner may assign.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub struct PciDomain {
    min: u16,
    max: u16,
}

impl Default for PciDomain {
    fn default() -> Self {
        Self {
            min: DEFAULT_PCI_MIN,
            max: MAX_LTE_PCI,
        }
    }
}

impl PciDomain {
    pub fn new(min: u16, max: u16) -> Result<Self, ValidationError> {
        if min > max || max > MAX_LTE_PCI {
            return Err(ValidationError::InvalidDomain { min, max });
        }
        Ok(Self { min, max })
    }

    /// The whole LTE space, 0..=503.
    pub fn full() -> Self {
        Self {
            min: 0,
            max: MAX_LTE_PCI,
        }
    }

    pub fn min(self) -> u16 {
        self.min
    }

    pub fn max(self) -> u16 {
        self.max
    }

    pub fn contains(self, pci: u16) -> bool {
        (self.min..=self.max).contains(&pci)
    }

    pub fn len(self) -> usize {
        usize::from(self.max - self.min) + 1
    }

    pub fn is_empty(self) -> bool {
        false
    }

    /// `start + offset`, wrapped back into the domain.
    pub fn wrapping_offset(self, start: u16, offset: usize) -> u16 {
        let span = self.len();
        let base = usize::from(start.clamp(self.min, self.max) - self.min);
        self.min + ((base + offset) % span) as u16
    }

    pub fn iter(self) -> impl Iterator<Item = u16> {
        self.min..=self.max
    }
}

impl fmt::Display for PciDomain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {}]", self.min, self.max)
    }
}

/// One LTE sector, flattened with the coordinates of the site it sits on.
#[derive(Clone, Debug, PartialEq)]
pub struct Cell {
    pub id: String,
    /// Groups co-located sectors (tower / eNodeB).
    pub site_id: String,
    /// 1-based sector number on the site.
    pub sector_index: u32,
    pub pci: u16,
    pub latitude: f64,
    pub longitude: f64,
    /// Used when `earfcn` is absent or outside the known band plan.
    pub center_frequency_mhz: f64,
    pub earfcn: Option<u32>,
    pub channel_bandwidth_mhz: f64,
    pub azimuth_degrees: Option<f64>,
    pub beamwidth_degrees: Option<f64>,
    pub tower_configuration: TowerConfiguration,
    pub reference_signal_power_dbm: f64,
}

impl Cell {
    pub fn new(
        id: impl Into<String>,
        site_id: impl Into<String>,
        sector_index: u32,
        pci: u16,
        latitude: f64,
        longitude: f64,
    ) -> Self {
        Self {
            id: id.into(),
            site_id: site_id.into(),
            sector_index,
            pci,
            latitude,
            longitude,
            center_frequency_mhz: 0.0,
            earfcn: None,
            channel_bandwidth_mhz: DEFAULT_BANDWIDTH_MHZ,
            azimuth_degrees: None,
            beamwidth_degrees: None,
            tower_configuration: TowerConfiguration::default(),
            reference_signal_power_dbm: 0.0,
        }
    }

    pub fn with_frequency(mut self, center_frequency_mhz: f64) -> Self {
        self.center_frequency_mhz = center_frequency_mhz;
        self
    }

    pub fn with_earfcn(mut self, earfcn: u32) -> Self {
        self.earfcn = Some(earfcn);
        self
    }

    pub fn with_bandwidth(mut self, channel_bandwidth_mhz: f64) -> Self {
        self.channel_bandwidth_mhz = channel_bandwidth_mhz;
        self
    }

    pub fn with_azimuth(mut self, azimuth_degrees: f64) -> Self {
        self.azimuth_degrees = Some(azimuth_degrees);
        self
    }

    pub fn with_beamwidth(mut self, beamwidth_degrees: f64) -> Self {
        self.beamwidth_degrees = Some(beamwidth_degrees);
        self
    }

    pub fn with_tower(mut self, tower_configuration: TowerConfiguration) -> Self {
        self.tower_configuration = tower_configuration;
        self
    }

    pub fn with_rs_power(mut self, reference_signal_power_dbm: f64) -> Self {
        self.reference_signal_power_dbm = reference_signal_power_dbm;
        self
    }

    /// Downlink centre frequency: derived from the EARFCN when it maps to a known band.
    pub fn frequency_mhz(&self) -> f64 {
        self.earfcn
            .and_then(earfcn::downlink_frequency_mhz)
            .unwrap_or(self.center_frequency_mhz)
    }

    pub fn azimuth(&self) -> f64 {
        self.azimuth_degrees.unwrap_or_else(|| {
            self.tower_configuration
                .default_azimuth(self.sector_index)
        })
    }

    pub fn beamwidth(&self) -> f64 {
        self.beamwidth_degrees
            .unwrap_or_else(|| self.tower_configuration.default_beamwidth())
    }

    pub fn is_co_located(&self, other: &Self) -> bool {
        self.site_id == other.site_id
    }

    pub fn distance_m(&self, other: &Self) -> f64 {
        geometry::distance_meters(self, other)
    }

    pub(crate) fn has_valid_position(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && (-NINETY..=NINETY).contains(&self.latitude)
            && (-ONE_EIGHTY..=ONE_EIGHTY).contains(&self.longitude)
    }
}

/// Same column order as the text input format, so output can be fed back in.
impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut lat = ryu::Buffer::new();
        let mut lng = ryu::Buffer::new();
        let mut freq = ryu::Buffer::new();
        let mut bw = ryu::Buffer::new();
        let mut rs = ryu::Buffer::new();
        write!(
            f,
            "{},{},{},{},{},{},{},",
            self.id,
            self.site_id,
            self.sector_index,
            self.pci,
            lat.format(self.latitude),
            lng.format(self.longitude),
            freq.format(self.center_frequency_mhz),
        )?;
        if let Some(earfcn) = self.earfcn {
            write!(f, "{earfcn}")?;
        }
        write!(f, ",{},", bw.format(self.channel_bandwidth_mhz))?;
        if let Some(azimuth) = self.azimuth_degrees {
            write!(f, "{}", ryu::Buffer::new().format(azimuth))?;
        }
        f.write_str(",")?;
        if let Some(beamwidth) = self.beamwidth_degrees {
            write!(f, "{}", ryu::Buffer::new().format(beamwidth))?;
        }
        write!(
            f,
            ",{},{}",
            self.tower_configuration,
            rs.format(self.reference_signal_power_dbm)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Cell, PciDomain, TowerConfiguration};
    use crate::ValidationError;

    #[test]
    fn default_domain_excludes_reserved_band() {
        let domain = PciDomain::default();
        assert!(!domain.contains(29));
        assert!(domain.contains(30));
        assert!(domain.contains(503));
        assert_eq!(domain.len(), 474);
    }

    #[test]
    fn domain_rejects_inverted_or_oversized_bounds() {
        assert_eq!(
            PciDomain::new(40, 39),
            Err(ValidationError::InvalidDomain { min: 40, max: 39 })
        );
        assert!(PciDomain::new(0, 504).is_err());
        assert!(PciDomain::new(7, 7).is_ok());
    }

    #[test]
    fn wrapping_offset_stays_inside_domain() {
        let domain = PciDomain::new(30, 503).expect("domain");
        assert_eq!(domain.wrapping_offset(45, 4), 49);
        assert_eq!(domain.wrapping_offset(501, 4), 31);
        assert_eq!(domain.wrapping_offset(503, 0), 503);
        assert_eq!(domain.wrapping_offset(10, 0), 30);
    }

    #[test]
    fn default_azimuth_follows_sector_slots() {
        assert_eq!(TowerConfiguration::ThreeSector.default_azimuth(1), 0.0);
        assert_eq!(TowerConfiguration::ThreeSector.default_azimuth(3), 240.0);
        assert_eq!(TowerConfiguration::ThreeSector.default_azimuth(4), 0.0);
        assert_eq!(TowerConfiguration::FourSector.default_azimuth(2), 90.0);
        assert_eq!(TowerConfiguration::FourSector.default_azimuth(0), 0.0);
    }

    #[test]
    fn tower_configuration_parses_aliases() {
        assert_eq!(
            TowerConfiguration::parse("3-sector").expect("parse"),
            TowerConfiguration::ThreeSector
        );
        assert_eq!(
            TowerConfiguration::parse("Four-Sector").expect("parse"),
            TowerConfiguration::FourSector
        );
        assert!(TowerConfiguration::parse("six").is_err());
    }

    #[test]
    fn earfcn_overrides_center_frequency() {
        let cell = Cell::new("a", "s1", 1, 40, 0.0, 0.0)
            .with_frequency(1_900.0)
            .with_earfcn(300);
        assert!((cell.frequency_mhz() - 2_140.0).abs() < 1e-9);

        let unknown_band = Cell::new("b", "s1", 1, 40, 0.0, 0.0)
            .with_frequency(1_900.0)
            .with_earfcn(70_000);
        assert_eq!(unknown_band.frequency_mhz(), 1_900.0);
    }

    #[test]
    fn missing_beam_parameters_use_tower_defaults() {
        let cell = Cell::new("a", "s1", 2, 40, 0.0, 0.0).with_tower(TowerConfiguration::FourSector);
        assert_eq!(cell.azimuth(), 90.0);
        assert_eq!(cell.beamwidth(), 45.0);
    }

    #[test]
    fn invalid_positions_are_detected() {
        assert!(Cell::new("a", "s", 1, 40, 90.0, 180.0).has_valid_position());
        assert!(!Cell::new("a", "s", 1, 40, 91.0, 0.0).has_valid_position());
        assert!(!Cell::new("a", "s", 1, 40, f64::NAN, 0.0).has_valid_position());
    }

    #[test]
    fn display_matches_input_columns() {
        let cell = Cell::new("c1", "site-9", 2, 77, 1.5, -2.25)
            .with_frequency(2_110.0)
            .with_azimuth(120.0)
            .with_rs_power(15.0);
        assert_eq!(
            cell.to_string(),
            "c1,site-9,2,77,1.5,-2.25,2110.0,,20.0,120.0,,three-sector,15.0"
        );
    }
}
