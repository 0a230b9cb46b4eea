use std::collections::HashMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use derive_getters::Getters;
use eyre::{eyre, Context, Result};

use gblock_pairing_rs::GuidePair;

pub const U6_PROMOTER_ARM: &str = "u6prom__cln_hom_arm";
pub const SCAFFOLD_2: &str = "crispr_scaff_2";
pub const CSY4_CLEAVAGE: &str = "csy4_clvg";
pub const SCAFFOLD_1_ARM: &str = "crispr_scaff_1__cln_hom_arm";

/// Fixed parts of the gene block that flank and separate the two guides:
///
/// `U6 promoter + guide 1 + scaffold 2 + Csy4 site + guide 2 + scaffold 1`
#[derive(Clone, PartialEq, Eq, Debug, Getters)]
pub struct ConstructTemplate {
    u6_promoter_arm: String,
    scaffold_2: String,
    csy4_cleavage: String,
    scaffold_1_arm: String,
}

impl ConstructTemplate {
    pub fn new(
        u6_promoter_arm: impl Into<String>,
        scaffold_2: impl Into<String>,
        csy4_cleavage: impl Into<String>,
        scaffold_1_arm: impl Into<String>,
    ) -> Self {
        Self {
            u6_promoter_arm: u6_promoter_arm.into(),
            scaffold_2: scaffold_2.into(),
            csy4_cleavage: csy4_cleavage.into(),
            scaffold_1_arm: scaffold_1_arm.into(),
        }
    }

    /// Full gene block sequence for the pair, upstream guide first.
    pub fn assemble(&self, pair: &GuidePair) -> String {
        [
            self.u6_promoter_arm.as_str(),
            pair.upstream().sequence(),
            self.scaffold_2.as_str(),
            self.csy4_cleavage.as_str(),
            pair.downstream().sequence(),
            self.scaffold_1_arm.as_str(),
        ]
        .concat()
    }
}

/// Parse `name sequence` lines. All four construct parts are required; other names are ignored.
pub fn parse(reader: impl BufRead) -> Result<ConstructTemplate> {
    let mut parts = HashMap::new();
    for line in reader.lines() {
        let line = line?;
        let mut tokens = line.split_whitespace();
        let (Some(name), Some(sequence)) = (tokens.next(), tokens.next()) else {
            continue;
        };
        if name.starts_with('#') {
            continue;
        }
        parts.insert(name.to_owned(), sequence.to_owned());
    }

    let mut take = |name: &str| {
        parts
            .remove(name)
            .ok_or_else(|| eyre!("Construct template is missing {name}"))
    };
    Ok(ConstructTemplate::new(
        take(U6_PROMOTER_ARM)?,
        take(SCAFFOLD_2)?,
        take(CSY4_CLEAVAGE)?,
        take(SCAFFOLD_1_ARM)?,
    ))
}

pub fn read(path: impl AsRef<Path>) -> Result<ConstructTemplate> {
    let path = path.as_ref();
    let file = File::open(path)
        .wrap_err_with(|| format!("Failed to open construct template {}", path.display()))?;
    parse(BufReader::new(file))
        .wrap_err_with(|| format!("Invalid construct template {}", path.display()))
}
