pub mod cli;
pub mod error;
pub mod model;
pub mod parser;
pub mod processor;
pub mod writer;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use processor::validator::{Decline, ValueResolver};

pub fn run() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    init_logging(args.verbose);

    // 1. ── Parse ──────────────────────────────────────────────────────
    let lines = parser::load_script(&args.input)
        .with_context(|| format!("Reading {}", args.input.display()))?;
    let rules = parser::load_rules_file(&args.rules)
        .with_context(|| format!("Loading rule set {}", args.rules.display()))?;

    // 2. ── Compile ────────────────────────────────────────────────────
    let mut decline = Decline;
    let mut prompt;
    let resolver: &mut dyn ValueResolver = if args.no_prompt {
        &mut decline
    } else {
        prompt = cli::Prompt::new(std::io::stdin().lock(), std::io::stderr());
        &mut prompt
    };
    let compiled = processor::compile(&lines, &rules, resolver)
        .with_context(|| format!("Compiling {}", args.input.display()))?;

    // 3. ── Write outputs ──────────────────────────────────────────────
    if let Some(path) = &args.verified {
        writer::script::emit(&compiled.entries, path)
            .with_context(|| format!("Writing {}", path.display()))?;
        info!("verified script written to {}", path.display());
    }
    writer::json::emit(&compiled.plan, &args.output)
        .with_context(|| format!("Writing {}", args.output.display()))?;
    info!("mission plan written to {}", args.output.display());

    Ok(())
}

fn init_logging(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}
