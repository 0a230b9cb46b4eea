//! Reader for ChopChop result tables.
//!
//! The table has one header line followed by whitespace-separated records with the columns
//! `Rank, Target sequence, Genomic location, Exon, Strand, GC content, Self-complementarity,
//! MM0, MM1, MM2, MM3, Efficiency`. Only the sequence, location, exon, strand, and mismatch
//! counts are used. GC content is recomputed from the sequence.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use eyre::{ensure, Context, OptionExt, Result};

use gblock_core_rs::loc::{Position, Strand};
use gblock_pairing_rs::TargetSite;

pub mod parse {
    use super::*;

    /// Genomic location given either as `chrN:POS` or as a bare integer.
    pub fn location(value: &str) -> Result<Position> {
        let position = match value.split_once(':') {
            Some((_, position)) => position,
            None => value,
        };
        position
            .trim()
            .parse::<Position>()
            .wrap_err_with(|| format!("Invalid genomic location: {value}"))
    }

    pub fn exon(value: &str) -> Result<u32> {
        value
            .parse::<u32>()
            .wrap_err_with(|| format!("Invalid exon number: {value}"))
    }

    pub fn strand(value: &str) -> Result<Strand> {
        Strand::try_from(value)
    }

    pub fn off_targets<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Result<[u32; 4]> {
        let mut counts = [0; 4];
        for (mismatches, count) in counts.iter_mut().enumerate() {
            let value = parts
                .next()
                .ok_or_else(|| eyre::eyre!("Missing MM{mismatches} off-target count"))?;
            *count = value
                .parse::<u32>()
                .wrap_err_with(|| format!("Invalid MM{mismatches} off-target count: {value}"))?;
        }
        Ok(counts)
    }

    pub fn record<'a>(parts: &mut impl Iterator<Item = &'a str>) -> Result<TargetSite> {
        let _rank = parts.next().ok_or_eyre("Missing rank")?;
        let sequence = parts.next().ok_or_eyre("Missing target sequence")?;
        let loc = location(parts.next().ok_or_eyre("Missing genomic location")?)?;
        let exon = exon(parts.next().ok_or_eyre("Missing exon number")?)?;
        let strand = strand(parts.next().ok_or_eyre("Missing strand")?)?;
        // GC content and self-complementarity
        let _ = parts.nth(1).ok_or_eyre("Missing self-complementarity")?;
        let off_targets = off_targets(parts)?;

        Ok(TargetSite::new(sequence, loc, exon, strand, off_targets)?)
    }
}

pub struct Reader<R> {
    reader: R,
    buffer: String,
    line: usize,
}

impl<R: BufRead> Reader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            buffer: String::new(),
            line: 0,
        }
    }

    fn read_line(&mut self) -> Result<Option<&str>> {
        self.buffer.clear();
        if self.reader.read_line(&mut self.buffer)? == 0 {
            return Ok(None);
        }
        self.line += 1;
        Ok(Some(self.buffer.trim_end_matches(['\n', '\r'])))
    }

    /// Parse the next target site. Returns None once the table is exhausted.
    /// The header line and blank lines are skipped.
    pub fn read_record(&mut self) -> Result<Option<TargetSite>> {
        loop {
            let line = self.line;
            let Some(record) = self.read_line()? else {
                return Ok(None);
            };
            // The first line is a text header
            if line == 0 || record.trim().is_empty() {
                continue;
            }

            let record = record.to_owned();
            let site = parse::record(&mut record.split_whitespace())
                .wrap_err_with(|| format!("Failed to parse ChopChop line {}: {record}", line + 1))?;
            return Ok(Some(site));
        }
    }

    /// Read all remaining target sites into the given vector. Returns the number of sites read.
    pub fn read_to_end(&mut self, into: &mut Vec<TargetSite>) -> Result<usize> {
        let mut total = 0;
        while let Some(site) = self.read_record()? {
            into.push(site);
            total += 1;
        }
        Ok(total)
    }
}

impl Reader<BufReader<File>> {
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        ensure!(path.exists(), "File {} does not exist", path.display());
        let file = File::open(path)
            .wrap_err_with(|| format!("Failed to open ChopChop results {}", path.display()))?;
        Ok(Self::new(BufReader::new(file)))
    }
}

/// Read every target site from a ChopChop results file.
pub fn read(path: impl AsRef<Path>) -> Result<Vec<TargetSite>> {
    let path = path.as_ref();
    let mut sites = Vec::new();
    Reader::from_path(path)?.read_to_end(&mut sites)?;
    log::info!("Read {} target sites from {}", sites.len(), path.display());
    Ok(sites)
}
