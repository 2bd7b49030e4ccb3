use std::io;
use clap::Parser;
use music_sorter::{
    audio::scan::scan_directory,
    analyzers::layout::{DEFAULT_FORBIDDEN_CHARS, LEGACY_FORBIDDEN_CHARS},
    cli::commands::{confirm, resolve_directories, Cli},
    config::{available_classifiers, select_classifiers, DEFAULT_EXTENSIONS},
    utils::reporting::Reporter,
    MetadataExtractor, Pipeline, ReferenceCatalog, Result, SortConfig,
};

fn main() {
    env_logger::init();

    let cli = Cli::parse();
    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<()> {
    let (in_dir, out_dir) = resolve_directories(&cli.in_dir, &cli.out_dir)?;

    let available = available_classifiers(cli.classifiers.as_deref())?;
    let classifiers = select_classifiers(&available, &cli.filters)?;
    let catalog = cli
        .ref_artists
        .as_deref()
        .map(ReferenceCatalog::from_path)
        .transpose()?;

    let extensions: Vec<String> = if cli.extensions.is_empty() {
        DEFAULT_EXTENSIONS.iter().map(|e| e.to_string()).collect()
    } else {
        cli.extensions.clone()
    };

    let config = SortConfig {
        blank_name: cli.blank_name.clone(),
        failure_dirname: cli.failure_dirname.clone(),
        capitalize: cli.capitalize,
        include_album: cli.keep_album,
        forbidden_chars: if cli.legacy_sanitize {
            LEGACY_FORBIDDEN_CHARS.to_string()
        } else {
            DEFAULT_FORBIDDEN_CHARS.to_string()
        },
        classifiers,
    };
    let pipeline = Pipeline::new(MetadataExtractor, catalog, config)?;

    println!("=== Sorting Music Library ===");
    println!("Input directory: {}", in_dir.display());
    println!("Output directory: {}", out_dir.display());
    println!("Include album in path: {}", cli.keep_album);
    if !cli.filters.is_empty() {
        println!("Filters (in precedence order): {}", cli.filters.join(", "));
    }

    println!("\nScanning for audio files...");
    let scan = scan_directory(&in_dir, &extensions, Some(&out_dir));
    if scan.total == 0 {
        println!("No audio files found to sort.");
        return Ok(());
    }

    println!("\nReading tags...");
    let output = pipeline.run(scan.paths().collect(), &out_dir);
    Reporter::new().print_summary(&output.summary);

    if cli.dry_run {
        println!("Dry run - no files were copied.");
        return Ok(());
    }

    println!(
        "Please note that this tool is likely to generate an extensive directory structure from music file tags, \
         and this may clash with an existing directory structure. \
         It is recommended that the output directory is empty to start with."
    );
    if out_dir.is_dir() && !cli.yes {
        println!("\nCAUTION: THE DIRECTORY '{}' ALREADY EXISTS.\n", out_dir.display());
        let prompt = format!(
            "Please confirm that you are happy to carry on backing up music files to '{}'. Continue?",
            out_dir.display()
        );
        if !confirm(&prompt, io::stdin().lock(), io::stdout())? {
            println!("Nothing was copied.");
            return Ok(());
        }
    }

    let stats = pipeline.backup(&output, &out_dir)?;
    println!(
        "\nCopied {} files, {} already present, {} failed",
        stats.copied, stats.skipped, stats.failed
    );

    if cli.keep_data {
        pipeline.write_manifests(&output, &out_dir)?;
        println!("Records saved to: {}", out_dir.display());
    }

    println!("\n=== Sorting Complete ===");
    Ok(())
}
