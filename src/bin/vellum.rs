use clap::{command, Parser};
use std::{path::PathBuf, sync::Arc};
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;
use vellum::{EngineConfig, EngineError, Engine, MethodRegistry, TemplateContext};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Template file to render
    #[arg(short, long)]
    template: PathBuf,

    /// JSON object whose fields become template variables
    #[arg(short = 'x', long)]
    context: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Enable debug mode
    #[arg(short, long)]
    verbose: bool,
}

fn run(cli: &Cli) -> Result<String, EngineError> {
    let config = match &cli.config {
        Some(path) => EngineConfig::from_file(path)?,
        None => EngineConfig::default(),
    };
    info!("config loaded.");
    debug!("config: {:?}", config);

    let mut context = match &cli.context {
        Some(path) => {
            let content = std::fs::read_to_string(path)?;
            match serde_json::from_str(&content) {
                Ok(serde_json::Value::Object(entries)) => TemplateContext::from(entries),
                Ok(_) => return Err(EngineError::config("context file must hold a JSON object")),
                Err(e) => {
                    return Err(EngineError::config(format!(
                        "Failed to parse context file: {}",
                        e
                    )))
                }
            }
        }
        None => TemplateContext::new(),
    };

    let source = std::fs::read_to_string(&cli.template)?;
    let label = cli.template.display().to_string();
    debug!("Rendering template: {}", label);

    let engine = Engine::new(config, Arc::new(MethodRegistry::with_builtins()))?;
    let mut out = String::new();
    engine.try_evaluate(&mut context, &mut out, &label, &source)?;
    Ok(out)
}

fn main() {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(output) => print!("{}", output),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    }
}
