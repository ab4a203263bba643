use super::*;
use clap::Parser;

#[test]
fn crawl_parses_overrides_and_extractor_command() {
    let cli = Cli::try_parse_from([
        "sawari",
        "crawl",
        "--urls",
        "urls.txt",
        "--brand",
        "Tata",
        "--model",
        "Punch",
        "--workers",
        "3",
        "--timeout-secs",
        "30",
        "--max-retries",
        "1",
        "--",
        "scrapy",
        "crawl",
        "variants",
        "-a",
        "url={url}",
    ])
    .unwrap();

    let CliCommand::Crawl {
        brand,
        model,
        workers,
        timeout_secs,
        max_retries,
        extractor,
        output_root,
        ..
    } = cli.command
    else {
        panic!("expected crawl");
    };
    assert_eq!(brand, "Tata");
    assert_eq!(model, "Punch");
    assert_eq!(workers, Some(3));
    assert_eq!(timeout_secs, Some(30));
    assert_eq!(max_retries, Some(1));
    assert_eq!(extractor[0], "scrapy");
    assert_eq!(extractor.last().unwrap(), "url={url}");
    assert_eq!(output_root, std::path::PathBuf::from("Output"));
}

#[test]
fn crawl_requires_an_extractor_command() {
    let result = Cli::try_parse_from([
        "sawari", "crawl", "--urls", "urls.txt", "--brand", "Tata", "--model", "Punch",
    ]);
    assert!(result.is_err());
}

#[test]
fn map_variants_has_default_threshold() {
    let cli = Cli::try_parse_from([
        "sawari",
        "map-variants",
        "Variants.csv",
        "Specifications.csv",
        "mapping.json",
    ])
    .unwrap();
    let CliCommand::MapVariants {
        threshold,
        source_column,
        ..
    } = cli.command
    else {
        panic!("expected map-variants");
    };
    assert!((threshold - 0.5).abs() < 1e-9);
    assert!(source_column.is_none());
}

#[test]
fn audit_defaults_to_variant_name_column() {
    let cli = Cli::try_parse_from(["sawari", "audit", "Variants.csv"]).unwrap();
    let CliCommand::Audit { column, .. } = cli.command else {
        panic!("expected audit");
    };
    assert_eq!(column, "variantName");
}

#[test]
fn verify_exits_with_error_on_mismatch() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(
        dir.path().join("Variants.csv"),
        "variantName\nPure MT\nAdventure AMT\n",
    )
    .unwrap();
    std::fs::write(
        dir.path().join("Specifications.csv"),
        "variantName\nPure MT\n",
    )
    .unwrap();
    assert!(commands::run_verify(dir.path()).is_err());
}

#[test]
fn map_variants_writes_the_mapping_file() {
    let dir = tempfile::tempdir().unwrap();
    let source = dir.path().join("source.txt");
    let target = dir.path().join("target.txt");
    let output = dir.path().join("mapping.json");
    std::fs::write(&source, "Punch Adventure AMT\n").unwrap();
    std::fs::write(&target, "Punch Adventure AMT\nPunch Adventure MT\n").unwrap();

    commands::run_map_variants(&source, &target, &output, 0.5, None, None).unwrap();

    let json: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    assert_eq!(
        json["mapping"]["Punch Adventure AMT"]["target"],
        "Punch Adventure AMT"
    );
}
