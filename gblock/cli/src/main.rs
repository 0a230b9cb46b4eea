use std::path::{Path, PathBuf};

use clap::Parser;
use eyre::{bail, eyre, Result, WrapErr};
use tracing_subscriber::EnvFilter;

use gblock_core_rs::loc::Strand;
use gblock_io_rs::{chopchop, construct, exons, report, settings, Settings};
use gblock_pairing_rs::GuideDesigner;

/// Settings files looked up in the working directory when none is given.
const DEFAULT_SETTINGS: [&str; 2] = ["gene_block_settings.inp", "settings.inp"];
/// Construct template used when the settings don't name one and the file exists.
const DEFAULT_CONSTANTS: &str = "gene_block_constants.dat";

/// Design pairs of CRISPR guides that excise coding exons and assemble their gene blocks.
#[derive(Debug, Parser)]
#[command(name = "gblock", version, about)]
struct Args {
    /// Settings file [default: gene_block_settings.inp or settings.inp]
    #[arg(value_name = "SETTINGS")]
    settings: Option<PathBuf>,

    /// Exon table with `start end` lines, overrides `exon_file`
    #[arg(long, value_name = "FILE")]
    exons: Option<PathBuf>,

    /// Strand of the gene (+ or -), overrides `gene_strand`
    #[arg(long, value_name = "STRAND", allow_hyphen_values = true)]
    strand: Option<Strand>,

    /// Construct template, overrides `constants_file`
    #[arg(long, value_name = "FILE")]
    constants: Option<PathBuf>,

    /// Report path, overrides `output_file`
    #[arg(short, long, value_name = "FILE")]
    output: Option<PathBuf>,
}

fn resolve_settings(explicit: Option<PathBuf>, workdir: &Path) -> Result<PathBuf> {
    if let Some(path) = explicit {
        return Ok(path);
    }
    DEFAULT_SETTINGS
        .iter()
        .map(|name| workdir.join(name))
        .find(|path| path.is_file())
        .ok_or_else(|| {
            eyre!(
                "No settings file given and none of {} found in {}",
                DEFAULT_SETTINGS.join(", "),
                workdir.display()
            )
        })
}

fn load_settings(args: &Args, workdir: &Path) -> Result<Settings> {
    let path = resolve_settings(args.settings.clone(), workdir)?;
    let mut settings = settings::read(&path)?;

    if let Some(exons) = &args.exons {
        settings.set_exon_file(exons);
    }
    if let Some(strand) = args.strand {
        settings.set_gene_strand(strand);
    }
    if let Some(constants) = &args.constants {
        settings.set_constants_file(constants);
    }
    if let Some(output) = &args.output {
        settings.set_output_file(output);
    }
    Ok(settings)
}

fn run(settings: &Settings) -> Result<usize> {
    let exon_file = match (settings.exon_file(), settings.ccds_id()) {
        (Some(path), _) => path,
        (None, Some(ccds)) => bail!(
            "Exons of {ccds} must be provided as a local exon table: set exon_file or pass --exons"
        ),
        (None, None) => bail!("No exon table: set exon_file or pass --exons"),
    };
    let strand = settings
        .gene_strand()
        .ok_or_else(|| eyre!("Gene strand is unknown: set gene_strand or pass --strand"))?;

    let exons = exons::read(exon_file, strand)?;
    let sites = chopchop::read(settings.input_file())?;

    let pairs = GuideDesigner::new(settings.config().clone())
        .with_exons(exons)
        .design(sites)
        .wrap_err("Failed to design guide pairs")?;

    let constants = settings.constants_file().clone().or_else(|| {
        let fallback = PathBuf::from(DEFAULT_CONSTANTS);
        fallback.is_file().then_some(fallback)
    });
    let template = match constants {
        Some(path) => Some(construct::read(path)?),
        None => {
            log::warn!("No construct template, the full construct column will be empty");
            None
        }
    };

    report::write_to_path(settings.output_file(), &pairs, template.as_ref())?;
    Ok(pairs.len())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let workdir = std::env::current_dir()?;
    log::info!("Building constructs in {}", workdir.display());

    let settings = load_settings(&args, &workdir)?;
    let designed = run(&settings)?;
    log::info!("Designed {designed} guide pairs");
    Ok(())
}
