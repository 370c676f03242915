use std::io::{self, BufRead, Write};
use std::sync::Arc;

use clap::{Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use triage_core::config::Config;
use triage_core::{Context, Embedder, RouteOutcome};
use triage_embed::get_default_embedder;
use triage_generate::TemplateGenerator;
use triage_hybrid::HybridRouter;

#[derive(Parser)]
#[command(name = "triage", version, about = "Route customer queries to a support category")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Interactive loop; type `exit` or `quit` to leave
    Chat {
        #[arg(long, default_value = "Alex")]
        name: String,
    },
    /// Route a single query and print the decision
    Classify {
        text: String,
        #[arg(long)]
        name: Option<String>,
    },
    /// Generate distinct candidate replies for a chosen category
    Candidates {
        category: String,
        text: String,
        #[arg(short, default_value_t = 3)]
        n: usize,
        #[arg(long)]
        name: Option<String>,
    },
}

fn context_for(name: Option<String>) -> Context {
    let mut context = Context::new();
    if let Some(name) = name {
        context.insert("user_name".to_string(), name);
    }
    context
}

fn build_router() -> anyhow::Result<HybridRouter> {
    let config = Config::load()?;
    let settings = config.settings()?;
    let embedder: Arc<dyn Embedder> = Arc::from(get_default_embedder(&settings.embedding)?);
    let generator = Arc::new(TemplateGenerator::from_settings(&settings.generation));
    Ok(HybridRouter::from_settings(&settings, embedder, generator)?)
}

fn print_outcome(outcome: &RouteOutcome) {
    let category = outcome.category.as_deref().unwrap_or("-");
    match outcome.distance {
        Some(d) => println!("[{:?}] {} (distance {:.4})", outcome.tier, category, d),
        None => println!("[{:?}] {}", outcome.tier, category),
    }
    println!("{}", outcome.response);
}

fn chat(router: &HybridRouter, context: &Context) -> anyhow::Result<()> {
    println!("Support bot is running. Type 'exit' to quit.");
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("\nUser: ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let line = line?;
        let input = line.trim();
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            println!("Bot: Goodbye!");
            break;
        }
        let outcome = router.route(input, context)?;
        println!("Bot: {}", outcome.response);
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    let router = build_router()?;
    info!(categories = router.tree().categories().len(), "router built");

    match cli.command {
        Command::Chat { name } => chat(&router, &context_for(Some(name)))?,
        Command::Classify { text, name } => {
            let outcome = router.route(&text, &context_for(name))?;
            print_outcome(&outcome);
        }
        Command::Candidates { category, text, n, name } => {
            for (i, reply) in router.candidates(&category, &text, &context_for(name), n)?.iter().enumerate() {
                println!("{}. {}", i + 1, reply);
            }
        }
    }
    Ok(())
}
