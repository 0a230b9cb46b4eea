//! Reader for `key value` settings files.
//!
//! ```text
//! # Comment lines start with a hash mark
//! input_file          NM_005308_results.txt
//! exon_file           NM_005308_exons.tsv
//! gene_strand         -
//! gRNA2_start_G       yes
//! separation_limit    10
//! latest_gRNA2        0.5
//! min_exon_deletion   0
//! max_offtargets      0 0 0 0
//! sort_by             del_count
//! ```
//!
//! Keys are case-insensitive. `separation_limit` is given in kbp.

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use std::str::FromStr;

use derive_getters::Getters;
use eyre::{eyre, Context, OptionExt, Result};

use gblock_core_rs::loc::Strand;
use gblock_pairing_rs::{Config, ConfigBuilder, SortKey};

/// Suffix appended to the input file stem when no output file is configured.
pub const OUTPUT_SUFFIX: &str = "_constructs.csv";

/// Paths and parameters of a single run.
#[derive(Clone, PartialEq, Debug, Getters)]
pub struct Settings {
    input_file: PathBuf,
    output_file: PathBuf,
    ccds_id: Option<String>,
    exon_file: Option<PathBuf>,
    gene_strand: Option<Strand>,
    constants_file: Option<PathBuf>,
    config: Config,
}

impl Settings {
    pub fn set_output_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.output_file = path.into();
        self
    }

    pub fn set_exon_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.exon_file = Some(path.into());
        self
    }

    pub fn set_gene_strand(&mut self, strand: Strand) -> &mut Self {
        self.gene_strand = Some(strand);
        self
    }

    pub fn set_constants_file(&mut self, path: impl Into<PathBuf>) -> &mut Self {
        self.constants_file = Some(path.into());
        self
    }

    /// Default report path: next to the input file, named after its stem.
    pub fn default_output_file(input_file: &Path) -> PathBuf {
        let stem = input_file
            .file_stem()
            .map(|x| x.to_string_lossy().into_owned())
            .unwrap_or_default();
        input_file.with_file_name(format!("{stem}{OUTPUT_SUFFIX}"))
    }
}

// Accepted spellings of boolean flags
fn flag(value: &str) -> Option<bool> {
    match value.to_ascii_lowercase().as_str() {
        "t" | "true" | "1" | "y" | "yes" => Some(true),
        "f" | "false" | "0" | "n" | "no" => Some(false),
        _ => None,
    }
}

fn number<T>(key: &str, value: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    value
        .parse::<T>()
        .wrap_err_with(|| format!("Invalid value for {key}: {value}"))
}

#[derive(Default)]
struct Collector {
    input_file: Option<PathBuf>,
    output_file: Option<PathBuf>,
    ccds_id: Option<String>,
    exon_file: Option<PathBuf>,
    gene_strand: Option<Strand>,
    constants_file: Option<PathBuf>,
    config: ConfigBuilder,
}

impl Collector {
    fn apply(&mut self, key: &str, values: &[&str]) -> Result<()> {
        let value = values[0];
        match key.to_ascii_lowercase().as_str() {
            "input_file" => self.input_file = Some(value.into()),
            "output_file" => self.output_file = Some(value.into()),
            "ccds_id" => self.ccds_id = Some(value.to_owned()),
            "exon_file" => self.exon_file = Some(value.into()),
            "constants_file" => self.constants_file = Some(value.into()),
            "gene_strand" => {
                let strand = Strand::try_from(value).wrap_err("Invalid value for gene_strand")?;
                self.gene_strand = Some(strand);
            }
            "grna2_start_g" => match flag(value) {
                Some(require) => {
                    self.config.set_require_downstream_g_start(require);
                }
                None => log::warn!("Value for {key} must be true or false, got {value}"),
            },
            "separation_limit" => {
                let kbp: u64 = number(key, value)?;
                let limit = kbp
                    .checked_mul(1000)
                    .ok_or_eyre(format!("{key} of {kbp} kbp is out of range"))?;
                self.config.set_separation_limit(limit)?;
            }
            "latest_grna2" => {
                self.config.set_latest_fraction(number(key, value)?)?;
            }
            "min_exon_deletion" => {
                self.config.set_min_exon_deletion(number(key, value)?);
            }
            "max_offtargets" => {
                // Values past the fourth are ignored
                let counts = values
                    .iter()
                    .take(4)
                    .map(|x| number::<u32>(key, x))
                    .collect::<Result<Vec<_>>>()?;
                match <[u32; 4]>::try_from(counts) {
                    Ok(counts) => {
                        self.config.set_max_off_targets(counts);
                    }
                    Err(counts) => log::warn!(
                        "{key} needs 4 off-target limits (0-3 mismatches), got {}",
                        counts.len()
                    ),
                }
            }
            "sort_by" => match value.parse::<SortKey>() {
                Ok(sort_key) => {
                    self.config.set_sort_key(sort_key);
                }
                Err(err) => log::warn!("{err}, keeping {}", self.config.build().sort_key()),
            },
            _ => log::warn!("Invalid settings key: {key}"),
        }
        Ok(())
    }

    fn finish(self) -> Result<Settings> {
        let input_file = self
            .input_file
            .ok_or_else(|| eyre!("Settings must define the input_file"))?;
        let output_file = self
            .output_file
            .unwrap_or_else(|| Settings::default_output_file(&input_file));

        Ok(Settings {
            input_file,
            output_file,
            ccds_id: self.ccds_id,
            exon_file: self.exon_file,
            gene_strand: self.gene_strand,
            constants_file: self.constants_file,
            config: self.config.build(),
        })
    }
}

/// Parse settings from a reader.
pub fn parse(reader: impl BufRead) -> Result<Settings> {
    let mut collector = Collector::default();
    for (ind, line) in reader.lines().enumerate() {
        let line = line?;
        if line.starts_with('#') {
            continue;
        }

        let tokens: Vec<_> = line.split_whitespace().collect();
        let Some((key, values)) = tokens.split_first() else {
            continue;
        };
        if values.is_empty() {
            log::warn!("No value for {key}");
            continue;
        }
        collector
            .apply(key, values)
            .wrap_err_with(|| format!("Failed to parse settings line {}", ind + 1))?;
    }
    collector.finish()
}

/// Read settings from the given file.
pub fn read(path: impl AsRef<Path>) -> Result<Settings> {
    let path = path.as_ref();
    let file =
        File::open(path).wrap_err_with(|| format!("Failed to open settings {}", path.display()))?;
    log::info!("Reading settings from {}", path.display());
    parse(BufReader::new(file)).wrap_err_with(|| format!("Invalid settings {}", path.display()))
}

#[cfg(test)]
mod tests {
    use std::io::{Cursor, Write};

    use super::*;

    fn parse_str(text: &str) -> Result<Settings> {
        parse(Cursor::new(text))
    }

    #[test]
    fn test_parse_all_keys() {
        let settings = parse_str(
            "# Test run\n\
             input_file data/NM_005308_results.txt\n\
             OUTPUT_FILE out.csv\n\
             ccds_id CCDS4375.1\n\
             exon_file exons.tsv\n\
             gene_strand -\n\
             constants_file gene_block_constants.dat\n\
             gRNA2_start_G no\n\
             separation_limit 5\n\
             latest_gRNA2 0.3\n\
             min_exon_deletion 20\n\
             max_offtargets 0 1 2 3\n\
             sort_by gen_sep\n",
        )
        .unwrap();

        assert_eq!(settings.input_file(), Path::new("data/NM_005308_results.txt"));
        assert_eq!(settings.output_file(), Path::new("out.csv"));
        assert_eq!(settings.ccds_id().as_deref(), Some("CCDS4375.1"));
        assert_eq!(settings.exon_file().as_deref(), Some(Path::new("exons.tsv")));
        assert_eq!(settings.gene_strand(), &Some(Strand::Reverse));
        assert_eq!(
            settings.constants_file().as_deref(),
            Some(Path::new("gene_block_constants.dat"))
        );

        let config = settings.config();
        assert!(!config.require_downstream_g_start());
        assert_eq!(*config.separation_limit(), 5000);
        assert_eq!(*config.latest_fraction(), 0.3);
        assert_eq!(*config.min_exon_deletion(), 20);
        assert_eq!(config.max_off_targets(), &[0, 1, 2, 3]);
        assert_eq!(*config.sort_key(), SortKey::Separation);
    }

    #[test]
    fn test_defaults() {
        let settings = parse_str("input_file data/NM_005308_results.txt\n").unwrap();
        assert_eq!(
            settings.output_file(),
            Path::new("data/NM_005308_results_constructs.csv")
        );
        assert_eq!(settings.config(), &Config::default());
        assert!(settings.exon_file().is_none());
        assert!(settings.gene_strand().is_none());
    }

    #[test]
    fn test_tolerated_problems() {
        let settings = parse_str(
            "input_file results.txt\n\
             unknown_key 1\n\
             min_exon_deletion\n\
             \n\
             gRNA2_start_G maybe\n\
             max_offtargets 0 0 1\n\
             sort_by efficiency\n",
        )
        .unwrap();
        assert_eq!(settings.config(), &Config::default());
    }

    #[test]
    fn test_extra_off_target_limits() {
        let settings = parse_str("input_file a.txt\nmax_offtargets 1 2 3 4 5 6\n").unwrap();
        assert_eq!(settings.config().max_off_targets(), &[1, 2, 3, 4]);
    }

    #[test]
    fn test_invalid_values() {
        assert!(parse_str("input_file a.txt\nseparation_limit ten\n").is_err());
        assert!(parse_str("input_file a.txt\nseparation_limit 0\n").is_err());
        // Overflows once converted to bp
        assert!(parse_str("input_file a.txt\nseparation_limit 18446744073709552\n").is_err());
        assert!(parse_str("input_file a.txt\nlatest_gRNA2 1.5\n").is_err());
        assert!(parse_str("input_file a.txt\nmax_offtargets 0 0 x 0\n").is_err());
        assert!(parse_str("input_file a.txt\ngene_strand *\n").is_err());
        // No input file
        assert!(parse_str("separation_limit 10\n").is_err());
    }

    #[test]
    fn test_read() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "input_file results.txt").unwrap();
        writeln!(file, "latest_gRNA2 0.75").unwrap();

        let settings = read(file.path()).unwrap();
        assert_eq!(*settings.config().latest_fraction(), 0.75);
        assert!(read(file.path().with_extension("missing")).is_err());
    }
}
