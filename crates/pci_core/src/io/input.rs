use std::{fs, io::Read, path::Path};

use crate::{Cell, Error, Result, TowerConfiguration};

const COLUMNS: [&str; 13] = [
    "id",
    "site_id",
    "sector",
    "pci",
    "latitude",
    "longitude",
    "frequency_mhz",
    "earfcn",
    "bandwidth_mhz",
    "azimuth",
    "beamwidth",
    "tower",
    "rs_power_dbm",
];
const REQUIRED_COLUMNS: usize = 6;

/// Reads cells from `path`, or from stdin when `path` is `None`.
pub fn read_cells(path: Option<&Path>) -> Result<Vec<Cell>> {
    let text = match path {
        Some(path) => fs::read_to_string(path).map_err(|e| {
            Error::other(format!("failed to read cells from {}: {e}", path.display()))
        })?,
        None => {
            let mut text = String::new();
            std::io::stdin().read_to_string(&mut text)?;
            text
        }
    };
    let cells = parse_cells(&text)?;
    log::debug!("input: parsed cells n={}", cells.len());
    Ok(cells)
}

/// Parses one cell per line. Blank lines and `#` comments are skipped; columns after
/// `longitude` may be empty or missing.
pub fn parse_cells(input: &str) -> Result<Vec<Cell>> {
    let mut cells = Vec::new();
    for (idx, line) in input.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        cells.push(parse_line(idx + 1, line)?);
    }

    if cells.is_empty() {
        return Err(Error::invalid_input("No cells provided."));
    }
    Ok(cells)
}

fn parse_line(line_no: usize, line: &str) -> Result<Cell> {
    let fields: Vec<&str> = line.split(',').map(str::trim).collect();
    if fields.len() < REQUIRED_COLUMNS {
        return Err(Error::invalid_input(format!(
            "Line {line_no}: expected at least {REQUIRED_COLUMNS} fields ({}) but got {}",
            COLUMNS[..REQUIRED_COLUMNS].join(","),
            fields.len()
        )));
    }
    if fields.len() > COLUMNS.len() {
        return Err(Error::invalid_input(format!(
            "Line {line_no}: expected at most {} fields but got {}: {line}",
            COLUMNS.len(),
            fields.len()
        )));
    }
    let field = |col: usize| fields.get(col).copied().unwrap_or("");

    let mut cell = Cell::new(
        field(0),
        field(1),
        required(line_no, 2, field(2))?,
        required(line_no, 3, field(3))?,
        required(line_no, 4, field(4))?,
        required(line_no, 5, field(5))?,
    );

    let frequency: Option<f64> = optional(line_no, 6, field(6))?;
    cell.earfcn = optional(line_no, 7, field(7))?;
    if frequency.is_none() && cell.earfcn.is_none() {
        return Err(Error::invalid_input(format!(
            "Line {line_no}: either frequency_mhz or earfcn is required"
        )));
    }
    cell.center_frequency_mhz = frequency.unwrap_or_default();
    if let Some(bandwidth) = optional(line_no, 8, field(8))? {
        cell.channel_bandwidth_mhz = bandwidth;
    }
    cell.azimuth_degrees = optional(line_no, 9, field(9))?;
    cell.beamwidth_degrees = optional(line_no, 10, field(10))?;
    if !field(11).is_empty() {
        cell.tower_configuration = TowerConfiguration::parse(field(11))
            .map_err(|e| Error::invalid_input(format!("Line {line_no}: {e}")))?;
    }
    if let Some(power) = optional(line_no, 12, field(12))? {
        cell.reference_signal_power_dbm = power;
    }

    Ok(cell)
}

fn required<T: std::str::FromStr>(line_no: usize, col: usize, raw: &str) -> Result<T> {
    optional(line_no, col, raw)?.ok_or_else(|| {
        Error::invalid_input(format!("Line {line_no}: missing {}", COLUMNS[col]))
    })
}

fn optional<T: std::str::FromStr>(line_no: usize, col: usize, raw: &str) -> Result<Option<T>> {
    if raw.is_empty() {
        return Ok(None);
    }
    raw.parse().map(Some).map_err(|_| {
        Error::invalid_input(format!("Line {line_no}: invalid {}: {raw}", COLUMNS[col]))
    })
}

#[cfg(test)]
mod tests {
    use super::parse_cells;
    use crate::TowerConfiguration;

    #[test]
    fn parse_cells_reads_full_and_sparse_lines() {
        let cells = parse_cells(
            "# id,site,...\n\
             a,s1,1,40,40.0,-75.0,2110,,10,120,65,four-sector,15.5\n\
             \n\
             b,s1,2,44,40.0,-75.0,,300\n",
        )
        .expect("parse cells");

        assert_eq!(cells.len(), 2);
        let a = &cells[0];
        assert_eq!(a.id, "a");
        assert_eq!(a.pci, 40);
        assert_eq!(a.center_frequency_mhz, 2_110.0);
        assert_eq!(a.channel_bandwidth_mhz, 10.0);
        assert_eq!(a.azimuth_degrees, Some(120.0));
        assert_eq!(a.beamwidth_degrees, Some(65.0));
        assert_eq!(a.tower_configuration, TowerConfiguration::FourSector);
        assert_eq!(a.reference_signal_power_dbm, 15.5);

        let b = &cells[1];
        assert_eq!(b.sector_index, 2);
        assert_eq!(b.earfcn, Some(300));
        assert_eq!(b.channel_bandwidth_mhz, 20.0);
        assert_eq!(b.azimuth_degrees, None);
        assert_eq!(b.tower_configuration, TowerConfiguration::ThreeSector);
        assert!((b.frequency_mhz() - 2_140.0).abs() < 1e-9);
    }

    #[test]
    fn display_output_parses_back() {
        let text = "c1,site-9,2,77,1.5,-2.25,2110.0,,20.0,120.0,,three-sector,15.0";
        let cells = parse_cells(text).expect("parse cells");
        assert_eq!(cells[0].to_string(), text);
    }

    #[test]
    fn parse_cells_rejects_empty_input() {
        let err = parse_cells(" \n# only a comment\n").expect_err("empty input should fail");
        assert!(err.to_string().contains("No cells provided."));
    }

    #[test]
    fn parse_cells_reports_line_numbers() {
        let err = parse_cells("a,s1,1,40,40.0,-75.0,2110\nb,s1,2,x,40.0,-75.0,2110")
            .expect_err("bad pci should fail");
        assert!(err.to_string().contains("Line 2: invalid pci: x"));
    }

    #[test]
    fn parse_cells_rejects_short_and_long_lines() {
        let err = parse_cells("a,s1,1,40").expect_err("short line");
        assert!(err.to_string().contains("expected at least 6 fields"));

        let err = parse_cells("a,s1,1,40,0,0,2110,,20,0,65,three-sector,0,extra")
            .expect_err("long line");
        assert!(err.to_string().contains("expected at most 13 fields"));
    }

    #[test]
    fn parse_cells_requires_a_frequency_source() {
        let err = parse_cells("a,s1,1,40,40.0,-75.0").expect_err("no frequency");
        assert!(err.to_string().contains("either frequency_mhz or earfcn"));
    }

    #[test]
    fn parse_cells_rejects_unknown_tower() {
        let err = parse_cells("a,s1,1,40,40.0,-75.0,2110,,,,,six-sector")
            .expect_err("bad tower");
        assert!(err.to_string().contains("Line 1:"));
        assert!(err.to_string().contains("three-sector|four-sector"));
    }
}
