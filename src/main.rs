//! CLI wrapper (spec §6) — the external collaborator around the core
//! engine: argument parsing, file I/O, exit codes. Continues the teacher's
//! `main.rs` shape (load a file, optionally dump the AST, optionally drop
//! into a `reedline` REPL) but replaces hand-parsed `sys.argv`-style flags
//! with a `clap` derive parser, in the style of
//! `unicitynetwork-unicity-orchestrator`'s `Cli`/`Parser` struct.

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use bumpalo::Bump;
use clap::Parser;

use expert_system::ast::parse;
use expert_system::graph::export_dot;
use expert_system::lexer::tokenize;
use expert_system::report::report;
use expert_system::repl;
use expert_system::session::Session;

/// A backward-chaining expert system for propositional logic.
#[derive(Parser, Debug)]
#[command(name = "expert-system", about)]
struct Cli {
    /// Path to the source file.
    file: PathBuf,

    /// Pretty-print the parsed items before resolving queries.
    #[arg(short = 'p', long = "print-ast")]
    print_ast: bool,

    /// Enter interactive mode after processing the file.
    #[arg(short = 'i', long = "interactive")]
    interactive: bool,

    /// Write a Graphviz DOT dependency graph to this path instead of
    /// opening a GUI window.
    #[arg(short = 'g', long = "graph", value_name = "PATH")]
    graph: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let source = fs::read_to_string(&cli.file)
        .with_context(|| format!("failed to read {}", cli.file.display()))?;

    let arena = Bump::new();
    let mut session = Session::new();

    let tokens = tokenize(&source)?;
    let items = parse(&tokens, &arena)?;

    if cli.print_ast {
        println!("--- AST ---");
        for item in &items {
            println!("{item:#?}");
        }
        println!("-----------");
    }

    let (queries, diagnostics) = session.load_items(items);
    session.checkpoint();

    for diagnostic in &diagnostics {
        eprintln!("{diagnostic}");
    }

    let stdout = std::io::stdout();
    let mut handle = stdout.lock();
    report(&mut session, &queries, &mut handle)?;
    drop(handle);

    // Exported after resolving the batch queries above, not before: the DOT
    // file records the resolution trace left by `report`'s `resolve` calls,
    // the same way the original only ever draws its graph in the
    // non-interactive branch, after `backwards_chain` has run.
    if let Some(graph_path) = &cli.graph {
        let mut file = fs::File::create(graph_path)
            .with_context(|| format!("failed to create {}", graph_path.display()))?;
        export_dot(&session, &mut file)
            .with_context(|| format!("failed to write {}", graph_path.display()))?;
    }

    if cli.interactive {
        repl::run(&arena, &mut session);
    }

    Ok(())
}
