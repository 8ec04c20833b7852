use clap::Parser;
use pdf_outline::{extract_layout, harvest_blocks, BlockClass, Classifier, OutlineConfig};

/// Dump harvested blocks and how each one is classified
#[derive(Parser)]
#[command(name = "debug_blocks")]
struct Args {
    /// PDF file to inspect
    pdf_path: String,

    /// Page range: "max_page" or "min-max"
    #[arg(default_value = "1-3")]
    range: String,
}

fn main() {
    env_logger::init();

    let args = Args::parse();
    let (min_page, max_page) = if let Some((a, b)) = args.range.split_once('-') {
        (a.parse().unwrap_or(1), b.parse().unwrap_or(3))
    } else {
        (1, args.range.parse().unwrap_or(3))
    };

    let pages = match extract_layout(&args.pdf_path) {
        Ok(pages) => pages,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    let config = OutlineConfig::default();
    let mut classifier = Classifier::new(&config);

    // Classify every block so title state matches a full run
    let blocks = harvest_blocks(&pages);
    let mut current_page = 0;
    for block in &blocks {
        let class = classifier.classify(block);
        if block.page < min_page || block.page > max_page {
            continue;
        }
        if block.page != current_page {
            current_page = block.page;
            let count = blocks.iter().filter(|b| b.page == current_page).count();
            println!("=== PAGE {} ({} blocks) ===", current_page, count);
        }
        let verdict = match class {
            BlockClass::Title(_) => "TITLE".to_string(),
            BlockClass::Heading(_) => "heading".to_string(),
            BlockClass::Discarded(reason) => format!("discarded: {}", reason),
        };
        println!(
            "  x0={:7.1} x1={:7.1} y0={:7.1} fs={:5.1} b={} i={} [{}] text={:?}",
            block.bbox.x0,
            block.bbox.x1,
            block.bbox.y0,
            block.font_size,
            block.bold as u8,
            block.italic as u8,
            verdict,
            block.text
        );
    }
    println!();
    println!("Title: {}", classifier.title());
}
