use std::fs::File;
use std::io::Write;
use std::path::Path;

use eyre::{Context, Result};
use itertools::Itertools;
use serde::Serialize;

use gblock_core_rs::loc::Position;
use gblock_pairing_rs::{GuidePair, TargetSite};

use crate::construct::ConstructTemplate;

pub const HEADER: [&str; 21] = [
    "gRNA 1",
    "genomic loc 1",
    "gene loc frac 1",
    "exon 1",
    "strand 1",
    "GC% 1",
    "off-targets 1",
    "",
    "gRNA 2",
    "genomic loc 2",
    "gene loc frac 2",
    "exon 2",
    "strand 2",
    "GC% 2",
    "off-targets 2",
    "",
    "gRNA separation (bp)",
    "del count (bp)",
    "del%",
    "",
    "full construct",
];

#[derive(Serialize)]
struct SiteColumns<'a> {
    sequence: &'a str,
    genomic_location: Position,
    gene_location_fraction: Option<f64>,
    exon: u32,
    strand: char,
    gc_content: u8,
    off_targets: String,
}

impl<'a> From<&'a TargetSite> for SiteColumns<'a> {
    fn from(site: &'a TargetSite) -> Self {
        Self {
            sequence: site.sequence(),
            genomic_location: site.genomic_location(),
            gene_location_fraction: site.gene_location_fraction(),
            exon: site.exon_number(),
            strand: site.strand().symbol(),
            gc_content: site.gc_content(),
            off_targets: site.off_targets().iter().join("/"),
        }
    }
}

// Columns are written in declaration order, the blank fields separate the column groups
#[derive(Serialize)]
struct Row<'a> {
    upstream: SiteColumns<'a>,
    gap1: &'static str,
    downstream: SiteColumns<'a>,
    gap2: &'static str,
    separation: Position,
    deletion_count: Option<Position>,
    deletion_percent: Option<u32>,
    gap3: &'static str,
    construct: String,
}

impl<'a> Row<'a> {
    fn new(pair: &'a GuidePair, template: Option<&ConstructTemplate>) -> Self {
        Self {
            upstream: SiteColumns::from(pair.upstream().as_ref()),
            gap1: "",
            downstream: SiteColumns::from(pair.downstream().as_ref()),
            gap2: "",
            separation: pair.separation(),
            deletion_count: pair.deletion_count(),
            deletion_percent: pair.deletion_percent(),
            gap3: "",
            construct: template.map(|x| x.assemble(pair)).unwrap_or_default(),
        }
    }
}

/// Write ranked guide pairs as CSV. The construct column stays empty without a template.
pub fn write<W: Write>(
    writer: W,
    pairs: &[GuidePair],
    template: Option<&ConstructTemplate>,
) -> Result<()> {
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(writer);

    writer.write_record(HEADER)?;
    for pair in pairs {
        writer.serialize(Row::new(pair, template))?;
    }
    writer.flush()?;
    Ok(())
}

/// Write the report to the given path, replacing any existing file.
pub fn write_to_path(
    path: impl AsRef<Path>,
    pairs: &[GuidePair],
    template: Option<&ConstructTemplate>,
) -> Result<()> {
    let path = path.as_ref();
    let file =
        File::create(path).wrap_err_with(|| format!("Failed to create {}", path.display()))?;
    write(file, pairs, template)
        .wrap_err_with(|| format!("Failed to write guide pairs to {}", path.display()))?;

    log::info!("Wrote {} guide pairs to {}", pairs.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use gblock_core_rs::loc::{ExonMap, Strand};

    fn pair() -> GuidePair {
        let exons = ExonMap::from_bounds([(100, 199), (300, 399)], Strand::Forward).unwrap();
        let mut up =
            TargetSite::new("GACGTACGTACGTACGTACGAGG", 131, 1, Strand::Forward, [0, 0, 1, 0])
                .unwrap();
        up.set_gene_location_fraction(&exons).unwrap();
        let mut down =
            TargetSite::new("TTGACCTGAAGTCGATCGCATGG", 345, 2, Strand::Reverse, [0; 4]).unwrap();
        down.set_gene_location_fraction(&exons).unwrap();

        GuidePair::new(Arc::new(down), Arc::new(up), Some(&exons)).unwrap()
    }

    fn render(pairs: &[GuidePair], template: Option<&ConstructTemplate>) -> String {
        let mut buffer = Vec::new();
        write(&mut buffer, pairs, template).unwrap();
        String::from_utf8(buffer).unwrap()
    }

    #[test]
    fn test_header() {
        let text = render(&[], None);
        assert_eq!(
            text,
            "gRNA 1,genomic loc 1,gene loc frac 1,exon 1,strand 1,GC% 1,off-targets 1,,\
             gRNA 2,genomic loc 2,gene loc frac 2,exon 2,strand 2,GC% 2,off-targets 2,,\
             gRNA separation (bp),del count (bp),del%,,full construct\n"
        );
    }

    #[test]
    fn test_rows() {
        let template = ConstructTemplate::new("AAAA", "CCCC", "GGGG", "TTTT");
        let text = render(&[pair()], Some(&template));
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        // Cut sites 150 and 350: 49 + 51 deleted bases out of 200
        assert_eq!(
            lines[1],
            "GACGTACGTACGTACGTACGAGG,131,0.255,1,+,57,0/0/1/0,,\
             TTGACCTGAAGTCGATCGCATGG,345,0.755,2,-,52,0/0/0/0,,\
             200,100,50,,\
             AAAAGACGTACGTACGTACGTACGAGGCCCCGGGGTTGACCTGAAGTCGATCGCATGGTTTT"
        );

        let text = render(&[pair()], None);
        assert!(text.lines().nth(1).unwrap().ends_with(",200,100,50,,"));
    }

    #[test]
    fn test_write_to_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("constructs.csv");
        write_to_path(&path, &[pair(), pair()], None).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert_eq!(text.lines().count(), 3);
    }
}
