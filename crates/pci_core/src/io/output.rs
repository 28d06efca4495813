use std::{
    fs::File,
    io::{self, BufWriter, Write},
    path::Path,
};

use crate::{Cell, Conflict, Error, Result};

/// Buffered writer to `path`, or to stdout when `path` is `None`.
pub fn open_output(path: Option<&Path>) -> Result<Box<dyn Write>> {
    match path {
        Some(path) => {
            let file = File::create(path).map_err(|e| {
                Error::other(format!("failed to create output file {}: {e}", path.display()))
            })?;
            Ok(Box::new(BufWriter::new(file)))
        }
        None => Ok(Box::new(BufWriter::new(io::stdout().lock()))),
    }
}

/// `severity,kind,cell_a,cell_b,distance_m,frequency_overlap,separation_mhz` per line.
pub fn write_conflicts<W: Write + ?Sized>(
    out: &mut W,
    cells: &[Cell],
    conflicts: &[Conflict],
) -> Result<()> {
    for conflict in conflicts {
        writeln!(out, "{}", conflict.to_line(cells))?;
    }
    out.flush()?;
    Ok(())
}

/// Cells in the input column order.
pub fn write_cells<W: Write + ?Sized>(out: &mut W, cells: &[Cell]) -> Result<()> {
    for cell in cells {
        writeln!(out, "{cell}")?;
    }
    out.flush()?;
    Ok(())
}

pub fn write_suggestions<W: Write + ?Sized>(out: &mut W, suggestions: &[u16]) -> Result<()> {
    for pci in suggestions {
        writeln!(out, "{pci}")?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::{write_cells, write_conflicts, write_suggestions};
    use crate::{Cell, detect_conflicts};

    #[test]
    fn conflicts_are_written_one_per_line() {
        let cells = vec![
            Cell::new("a", "s1", 1, 10, 40.0, -75.0).with_frequency(2_110.0),
            Cell::new("b", "s2", 1, 13, 40.0072, -75.0).with_frequency(2_110.0),
        ];
        let conflicts = detect_conflicts(&cells);
        let mut out = Vec::new();
        write_conflicts(&mut out, &cells, &conflicts).expect("write conflicts");
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text.lines().count(), conflicts.len());
        assert!(text.starts_with("critical,modulus-3,a,b,"));
    }

    #[test]
    fn cells_and_suggestions_use_plain_lines() {
        let cells = vec![Cell::new("c1", "site-9", 2, 77, 1.5, -2.25).with_frequency(2_110.0)];
        let mut out = Vec::new();
        write_cells(&mut out, &cells).expect("write cells");
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "c1,site-9,2,77,1.5,-2.25,2110.0,,20.0,,,three-sector,0.0\n"
        );

        let mut out = Vec::new();
        write_suggestions(&mut out, &[32, 35]).expect("write suggestions");
        assert_eq!(String::from_utf8(out).expect("utf8"), "32\n35\n");
    }
}
