use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use eyre::{bail, ensure, Context, Result};

use gblock_core_rs::loc::{ExonMap, Position, Strand};

fn bounds(line: &str) -> Result<(Position, Position)> {
    let mut parts = line.split_whitespace();
    let (start, end) = match (parts.next(), parts.next()) {
        (Some(start), Some(end)) => (start, end),
        _ => bail!("Exon must have both start and end"),
    };
    ensure!(parts.next().is_none(), "Exon has too many fields");

    let start = start
        .parse::<Position>()
        .wrap_err_with(|| format!("Invalid exon start: {start}"))?;
    let end = end
        .parse::<Position>()
        .wrap_err_with(|| format!("Invalid exon end: {end}"))?;
    Ok((start, end))
}

/// Parse an exon table: one `start end` pair of closed plus-strand coordinates per line, in
/// ascending order. Lines starting with `#` and blank lines are ignored.
pub fn parse(reader: impl BufRead, strand: Strand) -> Result<ExonMap> {
    let mut exons = Vec::new();
    for (ind, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let exon = bounds(line).wrap_err_with(|| format!("Failed to parse exon line {}", ind + 1))?;
        exons.push(exon);
    }
    ExonMap::from_bounds(exons, strand)
}

/// Read the exon table at the given path.
pub fn read(path: impl AsRef<Path>, strand: Strand) -> Result<ExonMap> {
    let path = path.as_ref();
    let file = File::open(path)
        .wrap_err_with(|| format!("Failed to open exon table {}", path.display()))?;
    let exons = parse(BufReader::new(file), strand)
        .wrap_err_with(|| format!("Invalid exon table {}", path.display()))?;

    log::info!(
        "Read {} exons ({} bp, strand {}) from {}",
        exons.len(),
        exons.total_length(),
        exons.strand(),
        path.display()
    );
    Ok(exons)
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use super::*;

    #[test]
    fn test_parse() {
        let table = "# start\tend\n100\t199\n\n300 399\n";
        let exons = parse(Cursor::new(table), Strand::Reverse).unwrap();
        assert_eq!(exons.len(), 2);
        assert_eq!(exons.total_length(), 200);
        assert_eq!(exons.strand(), Strand::Reverse);
    }

    #[test]
    fn test_parse_fails() {
        // Missing end
        assert!(parse(Cursor::new("100\n"), Strand::Forward).is_err());
        // Not a number
        assert!(parse(Cursor::new("100\tabc\n"), Strand::Forward).is_err());
        // Too many fields
        assert!(parse(Cursor::new("100\t199\t1\n"), Strand::Forward).is_err());
        // Start after end
        assert!(parse(Cursor::new("199\t100\n"), Strand::Forward).is_err());
        // Overlapping exons
        assert!(parse(Cursor::new("100\t199\n150\t250\n"), Strand::Forward).is_err());
    }

    #[test]
    fn test_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "1000\t1099").unwrap();
        writeln!(file, "2000\t2049").unwrap();

        let exons = read(file.path(), Strand::Forward).unwrap();
        assert_eq!(exons.total_length(), 150);
    }
}
