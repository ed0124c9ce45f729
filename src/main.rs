use anyhow::{Context, Result};
use clap::Parser;
use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use chart_ocr::pipeline::collect_images;
use chart_ocr::{ChartConfig, ChartExtraction, ChartExtractor, TesseractCli};

#[derive(Debug, Parser)]
#[command(author, version, about = "Extract gland/hormone tables from chart images")]
struct Args {
    /// Image file or directory of images (prompted for when omitted)
    image: Option<PathBuf>,

    /// Path to configuration JSON file
    #[arg(long)]
    config: Option<PathBuf>,

    /// Grid rows
    #[arg(long)]
    rows: Option<u32>,

    /// Grid columns
    #[arg(long)]
    cols: Option<u32>,

    /// Tesseract language
    #[arg(long)]
    lang: Option<String>,

    /// Tesseract executable
    #[arg(long)]
    tesseract: Option<String>,

    /// Print results as JSON
    #[arg(long, default_value = "false")]
    json: bool,
}

fn main() -> Result<()> {
    // Logs go to stderr, the report to stdout
    tracing_subscriber::fmt()
        .with_writer(io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    let config = build_config(&args)?;
    info!("Configuration: {}", config);

    let engine = TesseractCli::new(config.ocr.clone());
    if !engine.is_available() {
        warn!("Tesseract binary {:?} did not respond to --version", config.ocr.binary);
    }
    let extractor = ChartExtractor::new(engine, config)?;

    let input = match args.image.clone() {
        Some(path) => path,
        None => prompt_path()?,
    };

    let images = if input.is_dir() {
        let images = collect_images(&input)?;
        if images.is_empty() {
            anyhow::bail!("No image files found in {:?}", input);
        }
        images
    } else {
        vec![input]
    };

    let show_path = images.len() > 1;
    for path in &images {
        if args.json {
            let extraction = extractor.extract_path(path)?;
            print_json(path, &extraction)?;
            continue;
        }

        if show_path {
            println!("=== {} ===", path.display());
        }
        // Each patch is printed as soon as it is recognized
        let extraction = extractor.extract_path_with(path, |n, fragment| {
            println!("Extracted Text from Patch {}:\n{}\n", n, fragment.raw);
        })?;
        print_report(&extraction);
    }

    Ok(())
}

fn build_config(args: &Args) -> Result<ChartConfig> {
    let mut config = match &args.config {
        Some(path) => {
            info!("Loading configuration from: {:?}", path);
            ChartConfig::load(path)?
        }
        None => ChartConfig::default(),
    };

    if let Some(rows) = args.rows {
        config.grid.rows = rows;
    }
    if let Some(cols) = args.cols {
        config.grid.cols = cols;
    }
    if let Some(lang) = &args.lang {
        config.ocr.lang = lang.clone();
    }
    if let Some(binary) = &args.tesseract {
        config.ocr.binary = binary.clone();
    }

    Ok(config)
}

fn prompt_path() -> Result<PathBuf> {
    print!("Enter Image Path: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("Failed to read image path from stdin")?;

    let path = line.trim();
    if path.is_empty() {
        anyhow::bail!("No image path given");
    }
    Ok(PathBuf::from(path))
}

fn print_report(extraction: &ChartExtraction) {
    println!("\nFull Extracted Text:\n {}", extraction.full_text);
    println!("\nCategorized Dictionary:\n {}", extraction.record);
}

fn print_json(path: &Path, extraction: &ChartExtraction) -> Result<()> {
    let json_line = serde_json::json!({
        "image": path.display().to_string(),
        "fragments": extraction.fragments,
        "full_text": extraction.full_text,
        "record": extraction.record,
    });
    println!("{}", serde_json::to_string_pretty(&json_line)?);
    Ok(())
}
