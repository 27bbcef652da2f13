//! PDF TOC CLI tool
//!
//! A command-line tool that turns a PDF's bookmarks into table-of-contents
//! pages at the front of the document.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use std::process;

use pdf_toc::pdf::metadata::document_metadata;
use pdf_toc::pdf::toc::{page_count_estimate, page_label};
use pdf_toc::pdf::{extract_bookmarks, load_document, OffsetStrategy, TocOptions};
use pdf_toc::pipeline::{generate_pdf_with_toc, with_default_extension, TocRequest};

/// PDF TOC - Prepend a table of contents built from bookmarks
#[derive(Parser)]
#[command(name = "pdf-toc")]
#[command(author, version, about, long_about = None)]
#[command(after_help = "EXAMPLES:
    # Add a TOC page in front of a book
    pdf-toc generate book.pdf -o book-with-toc.pdf

    # Keep every bookmark and compute page labels from the real TOC length
    pdf-toc generate book.pdf -o book-with-toc.pdf --skip 0 --exact-offset

    # Preview the entries the TOC will contain
    pdf-toc outline book.pdf")]
struct Cli {
    /// Show debug logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate the TOC and save the combined PDF
    Generate {
        /// Input PDF file with bookmarks
        input: PathBuf,

        /// Output PDF file path (".pdf" is added when no extension is given)
        #[arg(short, long)]
        output: PathBuf,

        /// Heading on the first TOC page
        #[arg(long, default_value = "Table of Contents")]
        title: String,

        /// Number of leading page-sorted bookmarks to leave out of the TOC
        #[arg(long, default_value_t = pdf_toc::pdf::toc::FRONT_MATTER_BOOKMARKS_TO_SKIP)]
        skip: usize,

        /// Lines per page assumed when estimating the TOC length
        #[arg(long, default_value_t = pdf_toc::pdf::toc::ESTIMATED_LINES_PER_PAGE)]
        lines_per_page: usize,

        /// Re-render until page labels match the real number of TOC pages
        #[arg(long)]
        exact_offset: bool,

        /// Open the output file after creation
        #[arg(long)]
        open: bool,
    },

    /// List the bookmarks the TOC would contain
    Outline {
        /// PDF file to inspect
        input: PathBuf,

        /// Number of leading page-sorted bookmarks to mark as skipped
        #[arg(long, default_value_t = pdf_toc::pdf::toc::FRONT_MATTER_BOOKMARKS_TO_SKIP)]
        skip: usize,

        /// Lines per page assumed when estimating the TOC length
        #[arg(long, default_value_t = pdf_toc::pdf::toc::ESTIMATED_LINES_PER_PAGE)]
        lines_per_page: usize,
    },
}

fn main() {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    let result = match cli.command {
        Commands::Generate {
            input, output, title, skip, lines_per_page, exact_offset, open,
        } => {
            cmd_generate(input, output, title, skip, lines_per_page, exact_offset, open)
        }
        Commands::Outline { input, skip, lines_per_page } => {
            cmd_outline(&input, skip, lines_per_page)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {:#}", e);
        process::exit(1);
    }
}

/// Open a file with the system default application
fn open_file(path: &Path) -> Result<()> {
    #[cfg(target_os = "macos")]
    {
        std::process::Command::new("open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "linux")]
    {
        std::process::Command::new("xdg-open")
            .arg(path)
            .spawn()?;
    }
    #[cfg(target_os = "windows")]
    {
        std::process::Command::new("cmd")
            .args(["/C", "start", "", &path.display().to_string()])
            .spawn()?;
    }
    Ok(())
}

/// Generate the TOC and write the combined PDF
fn cmd_generate(
    input: PathBuf,
    output: PathBuf,
    title: String,
    skip: usize,
    lines_per_page: usize,
    exact_offset: bool,
    open: bool,
) -> Result<()> {
    let output = with_default_extension(&output);

    let request = TocRequest {
        input_path: input,
        output_path: output.clone(),
        options: TocOptions {
            title,
            front_matter_to_skip: skip,
            lines_per_page,
            offset_strategy: if exact_offset {
                OffsetStrategy::Converge
            } else {
                OffsetStrategy::Estimate
            },
            ..Default::default()
        },
    };

    let report = generate_pdf_with_toc(&request)
        .with_context(|| format!("Failed to add a TOC to {}", request.input_path.display()))?;

    println!("PDF created successfully!");
    log::info!(
        "Output: {} ({} TOC pages + {} source pages, {} entries)",
        output.display(),
        report.toc_pages,
        report.source_pages,
        report.entry_count
    );

    // The run already succeeded; a viewer that fails to launch is not an error
    if open {
        if let Err(e) = open_file(&output) {
            log::warn!("Could not open {}: {}", output.display(), e);
        }
    }

    Ok(())
}

/// Show the page-sorted bookmarks with the labels they would get
fn cmd_outline(input: &Path, skip: usize, lines_per_page: usize) -> Result<()> {
    let doc = load_document(input)
        .with_context(|| format!("Failed to open {}", input.display()))?;
    let metadata = document_metadata(&doc);
    let bookmarks = extract_bookmarks(&doc)
        .with_context(|| format!("Failed to read bookmarks of {}", input.display()))?;
    let offset = page_count_estimate(bookmarks.len(), lines_per_page);

    println!("File: {}", input.display());
    if let Some(title) = metadata.title {
        println!("Title: {}", title);
    }
    if let Some(author) = metadata.author {
        println!("Author: {}", author);
    }
    println!("Pages: {}", metadata.page_count);
    println!("Bookmarks: {}", bookmarks.len());
    println!("Estimated TOC pages: {}", offset);
    println!();

    for (i, bookmark) in bookmarks.iter().enumerate() {
        let marker = if i < skip { "-" } else { " " };
        println!(
            "{} {:>5}  {}{}",
            marker,
            page_label(bookmark.page, offset),
            "  ".repeat(bookmark.depth),
            bookmark.title
        );
    }

    Ok(())
}
