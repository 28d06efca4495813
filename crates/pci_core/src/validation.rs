use std::collections::HashSet;

use crate::{Cell, PciDomain, ValidationError};

/// Rejects malformed cells before any classification or optimization work.
///
/// The first problem found, in input order, is returned.
pub fn validate_cells(cells: &[Cell], domain: PciDomain) -> Result<(), ValidationError> {
    let mut seen: HashSet<&str> = HashSet::with_capacity(cells.len());

    for (index, cell) in cells.iter().enumerate() {
        if cell.id.trim().is_empty() {
            return Err(ValidationError::EmptyId { index });
        }
        if !seen.insert(cell.id.as_str()) {
            return Err(ValidationError::DuplicateId {
                id: cell.id.clone(),
            });
        }
        if !cell.has_valid_position() {
            return Err(ValidationError::InvalidCoordinates {
                id: cell.id.clone(),
                latitude: cell.latitude,
                longitude: cell.longitude,
            });
        }
        if !domain.contains(cell.pci) {
            return Err(ValidationError::PciOutOfDomain {
                id: cell.id.clone(),
                pci: cell.pci,
                min: domain.min(),
                max: domain.max(),
            });
        }
        if let Some(reason) = radio_problem(cell) {
            return Err(ValidationError::InvalidRadio {
                id: cell.id.clone(),
                reason,
            });
        }
    }

    Ok(())
}

fn radio_problem(cell: &Cell) -> Option<String> {
    let freq = cell.frequency_mhz();
    if !freq.is_finite() || freq < 0.0 {
        return Some(format!("invalid center frequency {freq} MHz"));
    }
    if !cell.channel_bandwidth_mhz.is_finite() || cell.channel_bandwidth_mhz <= 0.0 {
        return Some(format!(
            "invalid channel bandwidth {} MHz",
            cell.channel_bandwidth_mhz
        ));
    }
    if let Some(azimuth) = cell.azimuth_degrees
        && !(azimuth.is_finite() && (0.0..360.0).contains(&azimuth))
    {
        return Some(format!("azimuth {azimuth} outside [0, 360)"));
    }
    if let Some(beamwidth) = cell.beamwidth_degrees
        && !(beamwidth.is_finite() && beamwidth > 0.0 && beamwidth <= 360.0)
    {
        return Some(format!("beamwidth {beamwidth} outside (0, 360]"));
    }
    if !cell.reference_signal_power_dbm.is_finite() {
        return Some(String::from("reference signal power is not finite"));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::validate_cells;
    use crate::{Cell, PciDomain, ValidationError};

    fn cell(id: &str, pci: u16) -> Cell {
        Cell::new(id, "s1", 1, pci, 40.0, -75.0).with_frequency(2_110.0)
    }

    #[test]
    fn accepts_well_formed_cells() {
        let cells = vec![cell("a", 40), cell("b", 503)];
        assert_eq!(validate_cells(&cells, PciDomain::default()), Ok(()));
        assert_eq!(validate_cells(&[], PciDomain::default()), Ok(()));
    }

    #[test]
    fn rejects_out_of_domain_pci() {
        let err = validate_cells(&[cell("a", 12)], PciDomain::default()).expect_err("reserved pci");
        assert_eq!(
            err,
            ValidationError::PciOutOfDomain {
                id: String::from("a"),
                pci: 12,
                min: 30,
                max: 503,
            }
        );
        assert!(validate_cells(&[cell("a", 12)], PciDomain::full()).is_ok());
    }

    #[test]
    fn rejects_duplicate_and_empty_ids() {
        let err = validate_cells(&[cell("a", 40), cell("a", 41)], PciDomain::default())
            .expect_err("duplicate");
        assert_eq!(
            err,
            ValidationError::DuplicateId {
                id: String::from("a")
            }
        );

        let err = validate_cells(&[cell("a", 40), cell(" ", 41)], PciDomain::default())
            .expect_err("empty id");
        assert_eq!(err, ValidationError::EmptyId { index: 1 });
    }

    #[test]
    fn rejects_non_finite_coordinates() {
        let mut bad = cell("a", 40);
        bad.longitude = f64::INFINITY;
        assert!(matches!(
            validate_cells(&[bad], PciDomain::default()),
            Err(ValidationError::InvalidCoordinates { .. })
        ));
    }

    #[test]
    fn rejects_bad_radio_parameters() {
        let cases = [
            cell("a", 40).with_bandwidth(0.0),
            cell("a", 40).with_azimuth(360.0),
            cell("a", 40).with_beamwidth(-5.0),
            cell("a", 40).with_frequency(f64::NAN),
            cell("a", 40).with_rs_power(f64::NEG_INFINITY),
        ];
        for case in cases {
            assert!(matches!(
                validate_cells(&[case], PciDomain::default()),
                Err(ValidationError::InvalidRadio { .. })
            ));
        }
    }
}
