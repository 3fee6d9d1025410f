//! memory-graph CLI: build episodic memory graphs from narrative text.

use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use miette::Result;

use memory_graph::config::{ConfigFile, PipelineConfig};
use memory_graph::data::read_book_text;
use memory_graph::extract::llm::ChatCompletionClient;
use memory_graph::graph::MemoryGraph;
use memory_graph::pipeline::{Pipeline, PipelineReport, R_GRAPH_TITLE};
use memory_graph::render::{LabelGrouping, graph_summary, summarize_l, visualize_r};

#[derive(Parser)]
#[command(
    name = "memory-graph",
    version,
    about = "Build an episodic memory graph from narrative text"
)]
struct Cli {
    /// TOML settings file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Env file holding OPENAI_API_KEY and friends.
    #[arg(short, long, global = true, default_value = ".env")]
    env_file: PathBuf,

    /// Where to write the memory graph JSON.
    #[arg(short = 'j', long, global = true)]
    output_json: Option<PathBuf>,

    /// Directory for rendered graph images.
    #[arg(short, long, global = true)]
    output_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Build a memory graph from a book or a piece of text.
    Run {
        /// Path to a plain text file, or a JSON book document.
        #[arg(short = 'f', long, conflicts_with = "book_content", required_unless_present = "book_content")]
        book_file: Option<PathBuf>,

        /// Text given directly on the command line.
        #[arg(short = 'c', long)]
        book_content: Option<String>,
    },

    /// Build a memory graph from a benchmark data directory.
    Process {
        /// Directory holding events.json and meta_events.json.
        #[arg(long, default_value = "data")]
        data_dir: PathBuf,
    },

    /// Summarize and re-render a saved memory graph. Needs no API key.
    Show {
        /// Memory graph JSON written by `run` or `process`.
        graph: PathBuf,

        /// Group the L listing by entity or by time.
        #[arg(long)]
        group_by: Option<LabelGrouping>,
    },
}

fn main() -> Result<()> {
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(3)
                .build(),
        )
    }))
    .ok(); // Ignore error if hook already set (e.g., in tests)

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            ref book_file,
            ref book_content,
        } => {
            let text = match (book_file, book_content) {
                (Some(path), _) => read_book_text(path)?,
                (None, Some(text)) => text.clone(),
                (None, None) => miette::bail!("one of --book-file or --book-content is required"),
            };
            let pipeline = pipeline(&cli)?;
            let report = pipeline.run(&text)?;
            print_report(&report, pipeline.config().label_grouping);
        }

        Commands::Process { ref data_dir } => {
            let pipeline = pipeline(&cli)?;
            let report = pipeline.process_data(data_dir)?;
            if let Some(stats) = &report.answer_stats {
                println!("{stats}\n");
            }
            print_report(&report, pipeline.config().label_grouping);
        }

        Commands::Show {
            ref graph,
            group_by,
        } => {
            let file = ConfigFile::load_or_default(cli.config.as_deref())?;
            let image_dir = cli.output_dir.clone().unwrap_or(file.image_dir);
            let grouping = group_by.unwrap_or(file.label_grouping);

            let memory = MemoryGraph::load_json(graph)?;
            println!("{}\n", graph_summary(&memory));
            print!("{}", summarize_l(memory.labels(), grouping));
            show_rendered(&memory, &image_dir);
        }
    }

    Ok(())
}

/// Resolve configuration and wire the HTTP client into a pipeline.
fn pipeline(cli: &Cli) -> Result<Pipeline<ChatCompletionClient>> {
    let mut config = PipelineConfig::resolve(cli.config.as_deref(), Some(&cli.env_file))?;
    if let Some(path) = &cli.output_json {
        config.output_json = path.clone();
    }
    if let Some(dir) = &cli.output_dir {
        config.image_dir = dir.clone();
    }
    tracing::info!(model = %config.llm.model, "using chat completions backend");
    let client = ChatCompletionClient::new(config.llm.clone());
    Ok(Pipeline::new(config, client))
}

fn print_report(report: &PipelineReport, grouping: LabelGrouping) {
    println!("{}\n", report.summary);
    print!("{}", summarize_l(report.graph.labels(), grouping));
    println!("\nMemory graph saved to {}", report.output_json.display());
    match (&report.rendered, &report.render_error) {
        (Some(rendered), _) => println!("Graph image saved to {}", rendered.svg.display()),
        (None, Some(err)) => println!("Graph image not rendered: {err}"),
        (None, None) => {}
    }
}

fn show_rendered(memory: &MemoryGraph, image_dir: &Path) {
    match visualize_r(memory, image_dir, R_GRAPH_TITLE) {
        Ok(rendered) => println!("\nGraph image saved to {}", rendered.svg.display()),
        Err(e) => tracing::warn!(error = %e, "graph rendering failed"),
    }
}
