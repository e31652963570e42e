use clap::{Parser, ValueEnum};
use empath::prelude::*;
use empath::source::is_file_excluded;
use std::fs;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

/// Define a CLI-specific enum for clap to parse.
#[derive(Debug, Clone, Copy, ValueEnum)]
enum NameScopeCli {
    Board,
    Document,
}

/// Builds and validates an EmPath dialogue document
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Path to the EmPath document JSON file
    document_path: String,

    /// Scope in which node names must be unique
    #[arg(long, value_enum, default_value = "board")]
    name_scope: NameScopeCli,

    /// Module id used when the document has an empty conversationID
    #[arg(long)]
    module_id: Option<String>,

    /// Require at least one module exit node in the document
    #[arg(long)]
    require_module_exit: bool,

    /// Flexible subtype of the node that completes the module; at least one
    /// connected node of this subtype is required
    #[arg(long)]
    completion_subtype: Option<String>,

    /// Name of the board the module starts on; checked after the build
    #[arg(long)]
    start_board: Option<String>,

    /// Only read the document header
    #[arg(long)]
    shallow: bool,

    /// Write a Graphviz description of the document to this path
    #[arg(long)]
    dot: Option<String>,

    /// Increase log verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    run(cli);
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn run(cli: Cli) {
    let total_start = Instant::now();
    let path = Path::new(&cli.document_path);

    match is_file_excluded(path) {
        Ok(true) => {
            println!("Document '{}' is marked as excluded, nothing to build.", path.display());
            return;
        }
        Ok(false) => {}
        Err(e) => exit_with_error(&e.to_string()),
    }

    // --- 1. Loading ---
    let mut cache = MemoryCache::new();
    let mut builder = Compiler::from_file(path, &mut cache)
        .unwrap_or_else(|e| exit_with_error(&e.to_string()))
        .with_name_scope(match cli.name_scope {
            NameScopeCli::Board => NameScope::Board,
            NameScopeCli::Document => NameScope::Document,
        })
        .shallow(cli.shallow);
    if let Some(module_id) = &cli.module_id {
        builder = builder.with_module_id(module_id.clone());
    }
    if cli.require_module_exit {
        builder = builder.with_exit_requirement(ExitRequirement::Kind(ExitKind::Module));
    }
    if let Some(subtype) = &cli.completion_subtype {
        builder = builder.with_completion_subtype(subtype.clone());
    }

    // --- 2. Build ---
    println!("\nBuilding '{}'...", path.display());
    let build_start = Instant::now();
    let document = builder
        .build()
        .compile()
        .unwrap_or_else(|e| exit_with_error(&format!("Build failed: {}", e)));
    let build_duration = build_start.elapsed();

    if let Some(name) = &cli.start_board {
        let board = document
            .start_board(name)
            .unwrap_or_else(|e| exit_with_error(&e.to_string()));
        println!("Start board: '{}' ({})", board.name(), board.uuid());
    }

    // --- 3. Summary ---
    println!("\nDocument '{}' (version {})", document.name, document.version);
    println!("Conversation:  {}", document.conversation_id);
    if document.uses_explicit_exits {
        println!("Exits:         explicit exit nodes");
    } else {
        println!("Exits:         legacy '{}'", document.legacy_exit_code);
    }

    if !cli.shallow {
        println!("\n--- Boards ---");
        for board in document.boards() {
            println!(
                "[{:>3}] {:<30} {:>4} node(s) {:>4} connection(s) {:>3} topic(s){}",
                board.board().order,
                board.name(),
                board.elements().count(),
                board.connections().count(),
                board.topic_clusters().len(),
                if board.has_intro() { "" } else { "  (no intro, not validated)" }
            );
        }
        for excluded in document.excluded_boards() {
            println!("[ --] {:<30} excluded", excluded.name);
        }

        let templates = document.dependent_template_uuids();
        if !templates.is_empty() {
            println!("\nTemplates used: {}", templates.join(", "));
        }
    }

    // --- 4. Export ---
    if let Some(dot_path) = &cli.dot {
        fs::write(dot_path, to_dot(&document))
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to write '{}': {}", dot_path, e)));
        println!("\nGraph written to '{}'", dot_path);
    }

    println!("\n--- Performance Summary ---");
    println!("Build:                {:?}", build_duration);
    println!("Total Execution:      {:?}", total_start.elapsed());
    println!();
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
