use std::sync::Arc;

use eyre::Result;

use gblock_core_rs::loc::{ExonMap, Position, Strand};
use gblock_pairing_rs::{
    deletion, pipeline, rank, Config, GuideDesigner, GuidePair, PairSynthesizer, SortKey,
    TargetSite,
};

const SEQ: &str = "GACGTACGTACGTACGTACGAGG";

fn site_with_cut(cut: Position, off_targets: [u32; 4]) -> Result<TargetSite> {
    Ok(TargetSite::new(SEQ, cut - 19, 1, Strand::Forward, off_targets)?)
}

#[test]
fn deletion_across_an_intron() -> Result<()> {
    let exons = ExonMap::from_bounds([(100, 199), (300, 399)], Strand::Forward)?;
    let stats = deletion::compute(150, 350, &exons)?;
    assert_eq!(stats.count(), 100);
    assert_eq!(stats.fraction(), 0.5);
    Ok(())
}

#[test]
fn deletion_within_an_exon() -> Result<()> {
    let exons = ExonMap::from_bounds([(0, 99)], Strand::Forward)?;
    let stats = deletion::compute(10, 90, &exons)?;
    assert_eq!(stats.count(), 80);
    assert_eq!(stats.fraction(), 0.8);
    Ok(())
}

#[test]
fn off_target_filter() -> Result<()> {
    let clean = site_with_cut(100, [0, 0, 0, 0])?;
    let promiscuous = site_with_cut(200, [0, 1, 0, 0])?;

    let kept = pipeline::filter_by_off_targets(vec![clean.clone(), promiscuous], &[0, 0, 0, 0]);
    assert_eq!(kept, vec![clean]);
    Ok(())
}

#[test]
fn start_variants_respect_gc_bounds() -> Result<()> {
    let site = Arc::new(TargetSite::new(SEQ, 0, 1, Strand::Forward, [0; 4])?);
    let variants = site.find_start_variants();
    assert_eq!(variants.len(), 1);
    assert_eq!(variants[0].sequence(), SEQ);

    let at_rich = Arc::new(TargetSite::new(
        "GACATTAGCATATCATTACTAGG",
        0,
        1,
        Strand::Forward,
        [0; 4],
    )?);
    assert_eq!(at_rich.gc_content(), 35);
    assert!(at_rich.find_start_variants().is_empty());
    Ok(())
}

#[test]
fn separation_limit_blocks_distant_pairs() -> Result<()> {
    let exons = ExonMap::from_bounds([(0, 999)], Strand::Forward)?;
    let mut builder = Config::builder();
    builder.set_separation_limit(10)?;

    let sites = vec![
        Arc::new(site_with_cut(100, [0; 4])?),
        Arc::new(site_with_cut(115, [0; 4])?),
    ];
    let pairs = PairSynthesizer::new(&builder.build()).run(&sites, Some(&exons))?;
    assert!(pairs.is_empty());
    Ok(())
}

fn check_pair_invariants(pairs: &[GuidePair], exons: &ExonMap) {
    for pair in pairs {
        assert!(pair.upstream().cut_site() < pair.downstream().cut_site());

        let count = pair.deletion_count().unwrap_or(-1);
        assert!(count >= 0 && count <= exons.total_length());
        assert_eq!(
            pair.deletion_fraction(),
            Some(count as f64 / exons.total_length() as f64)
        );
    }
}

#[test]
fn full_design_on_a_reverse_strand_gene() -> Result<()> {
    let exons = ExonMap::from_bounds(
        [(1000, 1199), (1500, 1649), (2000, 2099)],
        Strand::Reverse,
    )?;
    let sites = [1020, 1100, 1150, 1180, 1300, 1520, 1600, 1640, 2010, 2050, 2090]
        .into_iter()
        .map(|cut| site_with_cut(cut, [0; 4]))
        .collect::<Result<Vec<_>>>()?;

    let mut builder = Config::builder();
    builder
        .set_separation_limit(600)?
        .set_latest_fraction(0.6)?
        .set_sort_key(SortKey::GenomicLocation);
    let designer = GuideDesigner::new(builder.build()).with_exons(exons.clone());

    let pairs = designer.design(sites.clone())?;
    assert!(!pairs.is_empty());
    check_pair_invariants(&pairs, &exons);

    // Reverse-strand genes are listed from the highest upstream cut site
    assert!(pairs
        .windows(2)
        .all(|x| x[0].upstream().cut_site() >= x[1].upstream().cut_site()));
    for pair in &pairs {
        assert!(pair.separation() <= 600);
    }

    // Fractions in transcription order: 1180 -> 269/450, 1150 -> 299/450. The pass stops after
    // 1150, so 1100 and 1020 are never paired. On the reverse strand the later guide in
    // transcription order has the lower cut site.
    assert!(pairs.iter().all(|x| x.upstream().cut_site() >= 1150));
    assert!(pairs.iter().any(|x| x.upstream().cut_site() == 1150));

    // Same inputs, same ranked list
    assert_eq!(designer.design(sites)?, pairs);
    Ok(())
}

#[test]
fn unknown_sort_key_keeps_discovery_order() -> Result<()> {
    let exons = ExonMap::from_bounds([(0, 999)], Strand::Forward)?;
    let sites = [100, 200, 300]
        .into_iter()
        .map(|cut| site_with_cut(cut, [0; 4]).map(Arc::new))
        .collect::<Result<Vec<_>>>()?;

    let mut builder = Config::builder();
    builder.set_latest_fraction(1.0)?;
    let mut pairs = PairSynthesizer::new(&builder.build()).run(&sites, Some(&exons))?;
    let discovered = pairs.clone();

    rank::rank_by_name(&mut pairs, "off_target_score", Strand::Forward);
    assert_eq!(pairs, discovered);
    Ok(())
}
