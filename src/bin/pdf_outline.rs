//! CLI tool for extracting a title and heading outline from PDFs

use clap::Parser;
use pdf_outline::{extract_outline_with_config, JsonFormat, OutlineConfig, PdfError};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;

#[derive(Parser)]
#[command(name = "pdf-outline")]
#[command(version)]
#[command(about = "Extract the title and H1-H3 headings of a PDF as JSON", long_about = None)]
struct Cli {
    /// Input PDF file, or a directory of PDFs
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output file (stdout if not specified), or output directory for a directory input
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,

    /// Output compact JSON
    #[arg(long)]
    compact: bool,

    /// JSON file with threshold overrides
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Titles must be strictly larger than this font size
    #[arg(long)]
    title_min_font_size: Option<f32>,

    /// Maximum words in a title
    #[arg(long)]
    title_max_words: Option<usize>,

    /// Headings smaller than this font size are discarded
    #[arg(long)]
    heading_min_font_size: Option<f32>,

    /// Maximum words in a heading
    #[arg(long)]
    heading_max_words: Option<usize>,

    /// Number of heading levels
    #[arg(long)]
    max_levels: Option<usize>,
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    match run(&cli) {
        Ok(true) => {}
        Ok(false) => process::exit(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

/// Returns `Ok(false)` when some files of a batch failed
fn run(cli: &Cli) -> Result<bool, PdfError> {
    let config = build_config(cli)?;
    let format = if cli.compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    };

    if cli.input.is_dir() {
        let output_dir = cli.output.clone().unwrap_or_else(|| cli.input.clone());
        run_batch(&cli.input, &output_dir, &config, format)
    } else {
        let json = extract_outline_with_config(&cli.input, &config)?.to_json(format)?;
        match &cli.output {
            Some(path) => fs::write(path, json + "\n")?,
            None => println!("{}", json),
        }
        Ok(true)
    }
}

fn build_config(cli: &Cli) -> Result<OutlineConfig, PdfError> {
    let mut config = match &cli.config {
        Some(path) => OutlineConfig::from_file(path)?,
        None => OutlineConfig::default(),
    };

    if let Some(size) = cli.title_min_font_size {
        config = config.with_title_min_font_size(size);
    }
    if let Some(words) = cli.title_max_words {
        config = config.with_title_max_words(words);
    }
    if let Some(size) = cli.heading_min_font_size {
        config = config.with_heading_min_font_size(size);
    }
    if let Some(words) = cli.heading_max_words {
        config = config.with_heading_max_words(words);
    }
    if let Some(levels) = cli.max_levels {
        config = config.with_max_levels(levels);
    }

    config.validate()?;
    Ok(config)
}

/// Write `<stem>.json` for every PDF in `input_dir`, continuing past failures
fn run_batch(
    input_dir: &Path,
    output_dir: &Path,
    config: &OutlineConfig,
    format: JsonFormat,
) -> Result<bool, PdfError> {
    fs::create_dir_all(output_dir)?;

    let mut inputs: Vec<PathBuf> = fs::read_dir(input_dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_pdf_path(path))
        .collect();
    inputs.sort();

    let mut all_ok = true;
    for input in &inputs {
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "outline".to_string());
        let output = output_dir.join(format!("{}.json", stem));

        let result = extract_outline_with_config(input, config)
            .and_then(|outline| outline.to_json(format))
            .and_then(|json| fs::write(&output, json + "\n").map_err(PdfError::from));

        match result {
            Ok(()) => eprintln!("{} -> {}", input.display(), output.display()),
            Err(e) => {
                eprintln!("Error: {}: {}", input.display(), e);
                all_ok = false;
            }
        }
    }

    log::info!("Processed {} PDFs from {}", inputs.len(), input_dir.display());
    Ok(all_ok)
}

fn is_pdf_path(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.to_string_lossy().eq_ignore_ascii_case("pdf"))
}
