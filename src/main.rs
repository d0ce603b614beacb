//! Command-line interface for modelxsd

#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};

#[cfg(feature = "cli")]
use std::fs;
#[cfg(feature = "cli")]
use std::path::PathBuf;

#[cfg(feature = "cli")]
use modelxsd::names::ModelNames;
#[cfg(feature = "cli")]
use modelxsd::{Customization, GenerateOptions, ModelCatalog, QualifiedName, XsdGenerator};

#[cfg(feature = "cli")]
#[derive(Parser, Debug)]
#[command(name = "modelxsd")]
#[command(author, version, about = "Generate XML Schemas from model metadata", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[cfg(feature = "cli")]
#[derive(Subcommand, Debug)]
enum Commands {
    /// Generate the XSD of one model
    Generate {
        /// Path to the JSON model catalog
        #[arg(short, long, value_name = "CATALOG")]
        models: PathBuf,

        /// Qualified name of the root model (e.g. Shop::Order)
        #[arg(long)]
        model: String,

        /// JSON customization tree replacing the one in the catalog
        #[arg(short, long)]
        customization: Option<PathBuf>,

        /// JSON generation options
        #[arg(long)]
        options: Option<PathBuf>,

        /// Output file (defaults to stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// List the models of a catalog
    List {
        /// Path to the JSON model catalog
        #[arg(short, long, value_name = "CATALOG")]
        models: PathBuf,
    },
}

#[cfg(feature = "cli")]
fn main() {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Generate {
            models,
            model,
            customization,
            options,
            output,
        } => cmd_generate(models, model, customization, options, output),
        Commands::List { models } => cmd_list(models),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(feature = "cli")]
fn cmd_generate(
    models: PathBuf,
    model: String,
    customization: Option<PathBuf>,
    options: Option<PathBuf>,
    output: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = ModelCatalog::from_file(&models)?;

    let customization = match customization {
        Some(path) => {
            let value: serde_json::Value = serde_json::from_str(&fs::read_to_string(path)?)?;
            Some(Customization::from_json(&value)?)
        }
        None => None,
    };

    let options = match options {
        Some(path) => serde_json::from_str::<GenerateOptions>(&fs::read_to_string(path)?)?,
        None => GenerateOptions::default(),
    };

    let xsd = XsdGenerator::new(&catalog).generate(
        &QualifiedName::parse(&model),
        customization.as_ref(),
        &options,
    )?;

    match output {
        Some(path) => fs::write(path, xsd)?,
        None => print!("{}", xsd),
    }
    Ok(())
}

#[cfg(feature = "cli")]
fn cmd_list(models: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let catalog = ModelCatalog::from_file(&models)?;

    for model in catalog.models() {
        let names = ModelNames::resolve(&model.name);
        println!("{} : {} ({})", model.name, names.type_name, names.collection_element);
    }
    Ok(())
}

#[cfg(not(feature = "cli"))]
fn main() {
    eprintln!("CLI feature not enabled. Rebuild with --features cli");
    std::process::exit(1);
}
