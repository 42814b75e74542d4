use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use streetslip::ocr::OcrBridge;
use streetslip::parser::{KnownStreets, ParseOptions};
use streetslip::pipeline::{
    build_known_streets, combine_page, extract_slips_file, parse_column_file, prepare_page_file,
    recognize_column_file, split_page_file, survey, PipelineConfig,
};

#[derive(Parser, Debug)]
#[command(name = "streetslip")]
#[command(version, about = "Address-directory page segmentation and street/address-pair reconstruction", long_about = None)]
struct Cli {
    /// Log stage progress
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log per-row and per-angle details
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Deskew a scanned page and crop it below the top rules
    Prepare {
        /// Scanned page image
        page: PathBuf,

        /// Output image (usually page-crop.png)
        output: PathBuf,

        /// Ignore a page-handcrop.png next to the page
        #[arg(short, long)]
        force: bool,
    },

    /// Split a prepared page into five column images
    Split {
        /// Prepared page image
        page: PathBuf,

        /// Output directory (default: the page's directory)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Run the recognition engine over a column image
    Recognize {
        /// Column image
        image: PathBuf,

        /// Output token stream (column-N-raw.csv)
        output: PathBuf,

        /// Recognition engine executable
        #[arg(long, default_value = "tesseract")]
        binary: PathBuf,

        /// Directory holding the trained model
        #[arg(long)]
        tessdata_dir: Option<PathBuf>,

        /// Trained model name
        #[arg(long, default_value = "1909")]
        model: String,

        /// Page segmentation mode
        #[arg(long, default_value_t = 6)]
        psm: u32,
    },

    /// Reconstruct streets and address pairs from a column token stream
    Parse {
        /// Token stream (column-N-raw.csv)
        input: PathBuf,

        /// Output records (column-N-ocr.csv)
        output: PathBuf,

        /// Write rejected rows here
        #[arg(short, long)]
        errors: Option<PathBuf>,

        /// Street-name dictionary used to correct headings
        #[arg(short, long)]
        known_streets: Option<PathBuf>,

        /// Keep going when too many rows are rejected
        #[arg(short, long)]
        force: bool,
    },

    /// Cut a column image into per-row new/old slip images
    Slips {
        /// Column image
        column: PathBuf,

        /// Output directory (default: the column's directory)
        #[arg(short, long)]
        out_dir: Option<PathBuf>,
    },

    /// Concatenate a page directory's column records into page.csv
    Combine {
        /// Page directory
        page_dir: PathBuf,
    },

    /// Build a street-name dictionary from a record file
    KnownStreets {
        /// Record file (page.csv or a concatenation of them)
        records: PathBuf,

        /// Output JSON dictionary
        output: PathBuf,
    },

    /// List page directories stuck at each stage
    Status {
        /// Working directory holding one directory per page
        working_dir: PathBuf,
    },
}

fn init_tracing(cli: &Cli) {
    let level = if cli.debug {
        "debug"
    } else if cli.verbose {
        "info"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level)))
        .with_writer(std::io::stderr)
        .init();
}

fn parent_dir(path: &std::path::Path) -> PathBuf {
    path.parent()
        .map(|p| p.to_path_buf())
        .unwrap_or_else(|| PathBuf::from("."))
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(&cli);
    let config = PipelineConfig::default();

    match cli.command {
        Commands::Prepare {
            page,
            output,
            force,
        } => prepare_page_file(&page, &output, force, &config.deskew),
        Commands::Split { page, out_dir } => {
            let out_dir = out_dir.unwrap_or_else(|| parent_dir(&page));
            let paths = split_page_file(&page, &out_dir, &config.deskew)?;
            for path in paths {
                println!("{}", path.display());
            }
            Ok(())
        }
        Commands::Recognize {
            image,
            output,
            binary,
            tessdata_dir,
            model,
            psm,
        } => {
            let mut bridge = OcrBridge::new()
                .with_binary(binary)
                .with_model(model)
                .with_psm(psm);
            if let Some(dir) = tessdata_dir {
                bridge = bridge.with_tessdata_dir(dir);
            }
            let count = recognize_column_file(&bridge, &image, &output)?;
            println!("[+] {count} tokens written to {}", output.display());
            Ok(())
        }
        Commands::Parse {
            input,
            output,
            errors,
            known_streets,
            force,
        } => {
            let known_streets = known_streets
                .map(|path| {
                    KnownStreets::load(&path)
                        .with_context(|| format!("Failed to load street names: {}", path.display()))
                })
                .transpose()?;
            let options = ParseOptions {
                force,
                known_streets,
                ..config.parse
            };
            let column = parse_column_file(&input, &output, errors.as_deref(), &options)?;
            println!(
                "[+] {} records in {} streets written to {}",
                column.records().len(),
                column.streets.len(),
                output.display()
            );
            Ok(())
        }
        Commands::Slips { column, out_dir } => {
            let out_dir = out_dir.unwrap_or_else(|| parent_dir(&column));
            let count = extract_slips_file(&column, &out_dir)?;
            println!("[+] {count} slips written to {}", out_dir.display());
            Ok(())
        }
        Commands::Combine { page_dir } => {
            let count = combine_page(&page_dir)?;
            println!("[+] {count} records combined in {}", page_dir.display());
            Ok(())
        }
        Commands::KnownStreets { records, output } => {
            let known = build_known_streets(&records, &output)?;
            println!("[+] {} street names written to {}", known.len(), output.display());
            Ok(())
        }
        Commands::Status { working_dir } => {
            let report = survey(&working_dir)?;
            if !report.uncropped.is_empty() {
                println!(
                    "failed to auto-crop ({} pages): {}",
                    report.uncropped.len(),
                    report.uncropped.join(", ")
                );
                println!("\tconsider cropping these pages by hand and saving as 'page-handcrop.png'");
            }
            if !report.unsplit.is_empty() {
                println!(
                    "failed to split into columns ({} pages): {}",
                    report.unsplit.len(),
                    report.unsplit.join(", ")
                );
                println!("\tconsider cleaning up these pages and saving as 'page-handcrop.png'");
            }
            if !report.unrecognized.is_empty() {
                println!(
                    "failed to OCR ({} pages): {}",
                    report.unrecognized.len(),
                    report.unrecognized.join(", ")
                );
                println!("\tusually no street name was found; consider splitting columns by hand");
            }
            if report.is_clean() {
                println!("[✓] all pages complete");
            }
            Ok(())
        }
    }
}
