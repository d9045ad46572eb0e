use std::path::PathBuf;
use std::process;

use clap::{Parser, ValueEnum};
use pagewright_pdf::report::{ReportInput, build_report};
use pagewright_pdf::{Error, LayoutOptions, Options, PageGeometry, RenderOptions, StandardMetrics};

#[derive(Clone, Copy, ValueEnum)]
enum PageSize {
    A4,
    Letter,
}

#[derive(Parser)]
#[command(about = "Render a sensor test report (JSON) to a paginated PDF")]
struct Cli {
    /// Report description in JSON
    input: PathBuf,

    /// Output PDF path (defaults to the input path with a .pdf extension)
    #[arg(short, long)]
    output: Option<PathBuf>,

    #[arg(long, value_enum, default_value_t = PageSize::A4)]
    page_size: PageSize,

    /// Page margin in points
    #[arg(long, default_value_t = 36.0)]
    margin: f32,

    /// Gap between blocks in points
    #[arg(long, default_value_t = 6.0)]
    spacing: f32,

    /// Print "Page N of M" in the bottom margin
    #[arg(long)]
    page_numbers: bool,
}

fn run(cli: &Cli) -> Result<PathBuf, Error> {
    let raw = std::fs::read_to_string(&cli.input)?;
    let input: ReportInput =
        serde_json::from_str(&raw).map_err(|e| Error::Input(format!("{}: {e}", cli.input.display())))?;

    let geometry = match cli.page_size {
        PageSize::A4 => PageGeometry::A4,
        PageSize::Letter => PageGeometry::LETTER,
    }
    .with_margin(cli.margin);

    let options = Options {
        layout: LayoutOptions {
            block_spacing: cli.spacing,
            ..LayoutOptions::default()
        },
        render: RenderOptions {
            page_numbers: cli.page_numbers,
            title: Some(
                input
                    .title
                    .clone()
                    .unwrap_or_else(|| "Sensor Test Report".to_string()),
            ),
            author: None,
        },
    };

    let content = build_report(&input)?;
    let generated =
        pagewright_pdf::generate_with(content, geometry, &StandardMetrics::new(), &options)?;
    for warning in &generated.warnings {
        log::warn!("{warning}");
    }

    let output = cli
        .output
        .clone()
        .unwrap_or_else(|| cli.input.with_extension("pdf"));
    std::fs::write(&output, &generated.bytes)?;
    log::info!("{} pages written", generated.page_count);
    Ok(output)
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match run(&cli) {
        Ok(output) => println!("Converted: {}", output.display()),
        Err(e) => {
            eprintln!("Error: {e}");
            process::exit(1);
        }
    }
}
