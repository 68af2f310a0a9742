//! docextract CLI - structure extraction for DOCX, PDF and spreadsheets

use std::fs;
use std::path::{Path, PathBuf};

use clap::{Args, Parser, Subcommand};
use colored::Colorize;
use indicatif::{ProgressBar, ProgressStyle};

use docextract::batch::{run_batch_with_progress, BatchOptions};
use docextract::render::{self, JsonFormat};
use docextract::{
    extract, extract_document, extract_pdf, extract_spreadsheet, ExtractionResult, PdfOptions,
    TableSettings, TextTolerance,
};

#[derive(Parser)]
#[command(name = "docextract")]
#[command(version)]
#[command(about = "Extract paragraphs, tables and sheets from DOCX, PDF and spreadsheet files to JSON", long_about = None)]
struct Cli {
    /// Input file (kind detected from its contents)
    #[arg(value_name = "FILE")]
    input: Option<PathBuf>,

    /// Output directory
    #[arg(value_name = "OUTPUT")]
    output: Option<PathBuf>,

    #[command(flatten)]
    pdf: PdfArgs,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract paragraphs and tables of a .docx file
    Docx {
        /// Input .docx file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Print document statistics instead of JSON
        #[arg(long)]
        stats: bool,
    },

    /// Extract page text and ruled tables of a PDF
    Pdf {
        /// Input PDF file
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        /// Print page texts instead of JSON
        #[arg(long)]
        text: bool,

        #[command(flatten)]
        pdf: PdfArgs,
    },

    /// Extract every sheet of a workbook
    #[command(alias = "xlsx")]
    Sheet {
        /// Input workbook (.xlsx, .xlsm, .xls, .ods)
        #[arg(value_name = "FILE")]
        input: PathBuf,

        /// Output directory
        #[arg(short, long, value_name = "DIR", env = "DOCEXTRACT_OUTPUT_DIR")]
        output: Option<PathBuf>,

        /// Also write one JSON file and a text preview per sheet
        #[arg(long)]
        split: bool,
    },

    /// Process every supported file under a directory
    Batch {
        /// Input directory
        #[arg(value_name = "DIR")]
        input: PathBuf,

        /// Output directory (receives docx/, pdf/ and excel/ subfolders)
        #[arg(short, long, value_name = "DIR", env = "DOCEXTRACT_OUTPUT_DIR")]
        output: Option<PathBuf>,

        /// Also write per-sheet artifacts for workbooks
        #[arg(long)]
        split_sheets: bool,

        /// Output compact JSON
        #[arg(long)]
        compact: bool,

        #[command(flatten)]
        pdf: PdfArgs,
    },

    /// Show version information
    Version,
}

/// PDF tolerances.
#[derive(Args, Clone, Copy)]
struct PdfArgs {
    /// Horizontal page text tolerance
    #[arg(long, default_value_t = 1.0, env = "DOCEXTRACT_TEXT_X_TOLERANCE")]
    text_x_tolerance: f64,

    /// Vertical page text tolerance
    #[arg(long, default_value_t = 1.0, env = "DOCEXTRACT_TEXT_Y_TOLERANCE")]
    text_y_tolerance: f64,

    /// Snap tolerance for table edges
    #[arg(long, default_value_t = 5.0, env = "DOCEXTRACT_SNAP_TOLERANCE")]
    snap_tolerance: f64,

    /// Join tolerance for table edges
    #[arg(long, default_value_t = 5.0, env = "DOCEXTRACT_JOIN_TOLERANCE")]
    join_tolerance: f64,

    /// Intersection tolerance for table edges
    #[arg(long, default_value_t = 3.0, env = "DOCEXTRACT_INTERSECTION_TOLERANCE")]
    intersection_tolerance: f64,

    /// Text tolerance inside table cells
    #[arg(long, default_value_t = 5.0, env = "DOCEXTRACT_CELL_TEXT_TOLERANCE")]
    cell_text_tolerance: f64,
}

impl From<PdfArgs> for PdfOptions {
    fn from(args: PdfArgs) -> Self {
        PdfOptions::new()
            .with_text_tolerance(TextTolerance::new(
                args.text_x_tolerance,
                args.text_y_tolerance,
            ))
            .with_table_settings(
                TableSettings::new()
                    .with_snap_tolerance(args.snap_tolerance)
                    .with_join_tolerance(args.join_tolerance)
                    .with_intersection_tolerance(args.intersection_tolerance)
                    .with_text_tolerance(args.cell_text_tolerance),
            )
    }
}

fn json_format(compact: bool) -> JsonFormat {
    if compact {
        JsonFormat::Compact
    } else {
        JsonFormat::Pretty
    }
}

fn main() {
    env_logger::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Some(Commands::Docx {
            input,
            output,
            compact,
            stats,
        }) => cmd_docx(&input, output.as_deref(), compact, stats),
        Some(Commands::Pdf {
            input,
            output,
            compact,
            text,
            pdf,
        }) => cmd_pdf(&input, output.as_deref(), compact, text, pdf.into()),
        Some(Commands::Sheet {
            input,
            output,
            split,
        }) => cmd_sheet(&input, output.as_deref(), split),
        Some(Commands::Batch {
            input,
            output,
            split_sheets,
            compact,
            pdf,
        }) => cmd_batch(&input, output.as_deref(), split_sheets, compact, pdf.into()),
        Some(Commands::Version) => {
            cmd_version();
            Ok(())
        }
        None => {
            // Default behavior: extract if input is provided
            if let Some(input) = cli.input {
                cmd_extract(&input, cli.output.as_deref(), cli.pdf.into())
            } else {
                println!("{}", "Usage: docextract <FILE> [OUTPUT]".yellow());
                println!("       docextract --help for more information");
                Ok(())
            }
        }
    };

    if let Err(e) = result {
        eprintln!("{}: {}", "Error".red().bold(), e);
        std::process::exit(1);
    }
}

fn spinner(message: &str) -> Result<ProgressBar, Box<dyn std::error::Error>> {
    let pb = ProgressBar::new_spinner();
    pb.set_style(ProgressStyle::default_spinner().template("{spinner:.green} {msg}")?);
    pb.set_message(message.to_string());
    pb.enable_steady_tick(std::time::Duration::from_millis(100));
    Ok(pb)
}

fn emit(content: &str, output: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(path) = output {
        fs::write(path, content)?;
        println!("{} {}", "Saved to".green(), path.display());
    } else {
        println!("{}", content);
    }
    Ok(())
}

fn print_degradations(result: &ExtractionResult) {
    for degradation in result.degradations() {
        eprintln!("{}: {}", "Warning".yellow().bold(), degradation);
    }
}

fn cmd_extract(
    input: &Path,
    output: Option<&Path>,
    options: PdfOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));

    let pb = spinner("Extracting...")?;
    let result = extract(input, &options)?;
    pb.set_message("Writing JSON...");
    let path = render::write_artifact(&result, input, &output_dir, JsonFormat::Pretty)?;
    pb.finish_and_clear();

    println!("{} ({})", "Done!".green().bold(), result.kind());
    println!("{}", render::summary(&result));
    println!("\n{} {}", "Output:".green().bold(), path.display());
    Ok(())
}

fn cmd_docx(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    stats: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let result: ExtractionResult = extract_document(input)?.into();

    if stats {
        println!("{}", "Document Statistics".cyan().bold());
        println!("{}", "─".repeat(40).dimmed());
        println!("{}", render::summary(&result));
        return Ok(());
    }

    let json = render::to_json(&result, json_format(compact))?;
    emit(&json, output)
}

fn cmd_pdf(
    input: &Path,
    output: Option<&Path>,
    compact: bool,
    text: bool,
    options: PdfOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let pdf = extract_pdf(input, &options)?;

    if text {
        let texts = render::page_texts(&pdf);
        print_degradations(&pdf.clone().into());
        return emit(&texts, output);
    }

    let result: ExtractionResult = pdf.into();
    print_degradations(&result);
    let json = render::to_json(&result, json_format(compact))?;
    emit(&json, output)
}

fn cmd_sheet(
    input: &Path,
    output: Option<&Path>,
    split: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output.map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));
    let workbook = extract_spreadsheet(input)?;

    let sheet_paths = if split {
        render::write_sheet_artifacts(&workbook, input, &output_dir)?
    } else {
        Vec::new()
    };

    let result: ExtractionResult = workbook.into();
    print_degradations(&result);
    let path = render::write_artifact(&result, input, &output_dir, JsonFormat::Pretty)?;

    println!("{}", render::summary(&result));
    println!("\n{}", "Output files:".green().bold());
    println!("  {} {}", "├─".dimmed(), path.display());
    for (i, sheet) in sheet_paths.iter().enumerate() {
        let branch = if i + 1 == sheet_paths.len() { "└─" } else { "├─" };
        println!("  {} {}", branch.dimmed(), sheet.display());
    }
    Ok(())
}

fn cmd_batch(
    input: &Path,
    output: Option<&Path>,
    split_sheets: bool,
    compact: bool,
    pdf_options: PdfOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let output_dir = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| input.join("output"));
    let options = BatchOptions::new(&output_dir)
        .with_format(json_format(compact))
        .with_split_sheets(split_sheets)
        .with_pdf_options(pdf_options);

    let pb = ProgressBar::new(0);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")?
            .progress_chars("#>-"),
    );

    let report = run_batch_with_progress(
        input,
        &options,
        |total| pb.set_length(total as u64),
        |path| {
            if let Some(name) = path.file_name() {
                pb.set_message(name.to_string_lossy().into_owned());
            }
            pb.inc(1);
        },
    )?;
    pb.finish_and_clear();
    log::debug!("Batch finished: {} files", report.total());

    for success in &report.succeeded {
        let name = success.input.file_name().unwrap_or_default().to_string_lossy();
        println!(
            "{} {} -> {} ({:.2}s)",
            "✓".green().bold(),
            name.bright_white(),
            success.outputs[0].display().to_string().bright_black(),
            success.elapsed_secs
        );
        if success.degradations > 0 {
            println!(
                "  {} {} pages or sheets degraded",
                "!".yellow().bold(),
                success.degradations
            );
        }
    }
    for failure in &report.failed {
        let name = failure.input.file_name().unwrap_or_default().to_string_lossy();
        eprintln!("{} {}: {}", "✗".red().bold(), name, failure.error);
    }

    println!(
        "\n{} {} succeeded, {} failed ({} docx, {} pdf, {} spreadsheets)",
        "Done!".green().bold(),
        report.succeeded.len(),
        report.failed.len(),
        report.count_of(docextract::DocumentKind::Docx),
        report.count_of(docextract::DocumentKind::Pdf),
        report.count_of(docextract::DocumentKind::Spreadsheet),
    );
    println!("{} {}", "Output:".green().bold(), output_dir.display());

    if report.is_success() {
        Ok(())
    } else {
        Err(format!("{} files failed", report.failed.len()).into())
    }
}

fn cmd_version() {
    println!("{} {}", "docextract".cyan().bold(), env!("CARGO_PKG_VERSION"));
    println!("DOCX, PDF and spreadsheet structure extraction tool");
    println!();
    println!("Supported inputs: docx, pdf, xlsx, xlsm, xls, ods");
    println!("License: MIT");
}
