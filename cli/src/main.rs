//! papermill CLI - structure paper layouts into markdown and chunks

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;

use papermill::chunk::{split_and_link, ChunkOptions, Tokenizer};
use papermill::ingest::paper_id_for;
use papermill::{layout_to_markdown, structure_layout, DocumentLayout};

#[derive(Parser)]
#[command(name = "papermill")]
#[command(version)]
#[command(about = "Structure a paper layout into markdown and linked retrieval chunks", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Render a layout JSON file to markdown
    #[command(alias = "md")]
    Markdown {
        /// Input layout JSON file
        #[arg(value_name = "LAYOUT")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
    },

    /// Split a layout into linked chunks, printed as JSON
    Chunks {
        /// Input layout JSON file
        #[arg(value_name = "LAYOUT")]
        input: PathBuf,

        /// Output file (stdout if not specified)
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,

        /// Paper id; defaults to the content hash of the layout file
        #[arg(long)]
        paper_id: Option<String>,

        /// Token budget per chunk
        #[arg(long, default_value = "512")]
        chunk_size: usize,

        /// Overlap fraction of the budget (0.0..1.0)
        #[arg(long, default_value = "0.1")]
        overlap: f32,

        /// Prefix chunks with their chapter heading
        #[arg(long)]
        section_titles: bool,
    },

    /// Print paper front matter extracted from a layout
    Info {
        /// Input layout JSON file
        #[arg(value_name = "LAYOUT")]
        input: PathBuf,
    },
}

/// Whitespace word counter standing in for a model tokenizer.
///
/// Library consumers inject the embedding model's real tokenizer; for
/// offline CLI use a word count is a workable budget proxy.
struct WhitespaceTokenizer;

impl Tokenizer for WhitespaceTokenizer {
    fn count_tokens(&self, text: &str) -> usize {
        text.split_whitespace().count()
    }

    fn max_sequence_length(&self) -> Option<usize> {
        None
    }
}

fn main() -> ExitCode {
    env_logger::init();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> papermill::Result<()> {
    match cli.command {
        Commands::Markdown { input, output } => {
            let layout = read_layout(&input)?;
            let markdown = layout_to_markdown(&layout)?;
            write_output(output.as_deref(), &markdown)?;
            if output.is_some() {
                eprintln!("{} wrote markdown", "done:".green().bold());
            }
            Ok(())
        }
        Commands::Chunks {
            input,
            output,
            paper_id,
            chunk_size,
            overlap,
            section_titles,
        } => {
            let bytes = fs::read(&input)?;
            let paper_id = paper_id.unwrap_or_else(|| paper_id_for(&bytes));
            let layout: DocumentLayout = serde_json::from_slice(&bytes)?;

            let markdown = layout_to_markdown(&layout)?;
            let options = ChunkOptions::new()
                .with_chunk_size(chunk_size)
                .with_overlap_percent(overlap)
                .with_section_titles(section_titles);
            let split = split_and_link(&markdown, &paper_id, &WhitespaceTokenizer, &options)?;

            let json = serde_json::to_string_pretty(&split.chunks)
                .map_err(|e| papermill::Error::Render(e.to_string()))?;
            write_output(output.as_deref(), &json)?;
            eprintln!(
                "{} {} chunk(s) for paper {}",
                "done:".green().bold(),
                split.chunks.len(),
                paper_id
            );
            Ok(())
        }
        Commands::Info { input } => {
            let layout = read_layout(&input)?;
            let paper = structure_layout(&layout)?;
            println!("{} {}", "title:".cyan().bold(), paper.paper_info.title);
            println!("{} {}", "authors:".cyan().bold(), paper.paper_info.authors);
            println!("{} {}", "keywords:".cyan().bold(), paper.paper_info.keywords);
            println!(
                "{} {} body row(s), {} figure(s)",
                "layout:".cyan().bold(),
                paper.body.rows.len(),
                paper.figures.len()
            );
            Ok(())
        }
    }
}

fn read_layout(path: &std::path::Path) -> papermill::Result<DocumentLayout> {
    let bytes = fs::read(path)?;
    let layout: DocumentLayout = serde_json::from_slice(&bytes)?;
    log::debug!("read layout with {} page(s)", layout.page_count());
    Ok(layout)
}

fn write_output(path: Option<&std::path::Path>, content: &str) -> papermill::Result<()> {
    match path {
        Some(path) => fs::write(path, content)?,
        None => println!("{}", content),
    }
    Ok(())
}
