//! Section Cascade CLI
//!
//! Entry point for the `section-cascade` command-line tool.

use clap::{Parser, Subcommand};
use section_cascade::declare::DEFAULT_PATH;
use section_cascade::report::hierarchy_listing;
use section_cascade::{
    DeclarationFile, DeclarationSource, DefinitionRegistry, ExplainOutput, ProviderTable,
    ResolvedContext,
};
use std::path::PathBuf;
use std::process;

#[derive(Parser)]
#[command(name = "section-cascade")]
#[command(about = "Resolve layout sections from a declaration file", version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve a definition into its render context
    Resolve {
        /// Definition to resolve
        definition: String,

        /// Path to declaration file (default: sections.toml)
        #[arg(long, short = 'd')]
        declarations: Option<PathBuf>,

        /// Output in human-readable format instead of JSON
        #[arg(long)]
        human: bool,

        /// Write the JSON report to this file instead of stdout
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,
    },

    /// Print the ordered hierarchy of a definition, root first
    Hierarchy {
        /// Definition to walk
        definition: String,

        /// Path to declaration file (default: sections.toml)
        #[arg(long, short = 'd')]
        declarations: Option<PathBuf>,
    },

    /// Show which definition supplied each section, option and layout key
    Explain {
        /// Definition to explain
        definition: String,

        /// Path to declaration file (default: sections.toml)
        #[arg(long, short = 'd')]
        declarations: Option<PathBuf>,

        /// Output in human-readable format instead of JSON
        #[arg(long)]
        human: bool,
    },

    /// Verify the declaration file
    Verify {
        /// Path to declaration file (default: sections.toml)
        #[arg(long, short = 'd')]
        declarations: Option<PathBuf>,
    },
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Commands::Resolve {
            definition,
            declarations,
            human,
            output,
        } => {
            run_resolve(&definition, declarations, human, output);
        }
        Commands::Hierarchy {
            definition,
            declarations,
        } => {
            run_hierarchy(&definition, declarations);
        }
        Commands::Explain {
            definition,
            declarations,
            human,
        } => {
            run_explain(&definition, declarations, human);
        }
        Commands::Verify { declarations } => {
            run_verify(declarations);
        }
    }
}

fn run_resolve(definition: &str, declarations: Option<PathBuf>, human: bool, output: Option<PathBuf>) {
    let (registry, source) = load_registry(declarations);

    let instance = match registry.instance(definition) {
        Ok(i) => i,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let report = match ResolvedContext::resolve(&instance, Some(source)) {
        Ok(r) => r,
        Err(e) => {
            eprintln!("Error resolving '{}': {}", definition, e);
            process::exit(1);
        }
    };

    if let Some(path) = output {
        if let Err(e) = report.write_to_file(&path) {
            eprintln!("Error writing {}: {}", path.display(), e);
            process::exit(1);
        }
        eprintln!("Wrote: {}", path.display());
        return;
    }

    if human {
        println!("{}", report.to_human());
    } else {
        match report.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    }
}

fn run_hierarchy(definition: &str, declarations: Option<PathBuf>) {
    let (registry, _) = load_registry(declarations);

    match registry.instance(definition) {
        Ok(instance) => {
            print!("{}", hierarchy_listing(&instance.hierarchy().names()));
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn run_explain(definition: &str, declarations: Option<PathBuf>, human: bool) {
    let (registry, _) = load_registry(declarations);

    let instance = match registry.instance(definition) {
        Ok(i) => i,
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    };

    let explanation = ExplainOutput::build(&instance);

    if human {
        print!("{}", explanation.to_human());
    } else {
        match explanation.to_json() {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error serializing output: {}", e);
                process::exit(1);
            }
        }
    }
}

fn run_verify(declarations: Option<PathBuf>) {
    let (registry, source) = load_registry(declarations);

    println!("Declarations valid: {}", source.path);
    println!();
    println!("  Digest: {}", source.digest);
    println!("  Definitions: {}", registry.len());
    for name in registry.names() {
        let Some(definition) = registry.get(name) else {
            continue;
        };
        let bases: Vec<&str> = definition.bases().iter().map(|b| b.name()).collect();
        if bases.is_empty() {
            println!("    {}", name);
        } else {
            println!("    {} (extends {})", name, bases.join(", "));
        }
    }
}

/// Load and build the declaration file, exiting on error.
fn load_registry(declarations: Option<PathBuf>) -> (DefinitionRegistry, DeclarationSource) {
    let path = declarations.unwrap_or_else(|| PathBuf::from(DEFAULT_PATH));

    let (file, source) = match DeclarationFile::load(&path) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("Error loading declarations: {}", e);
            process::exit(1);
        }
    };

    match file.into_registry(&ProviderTable::new()) {
        Ok(registry) => (registry, source),
        Err(e) => {
            eprintln!("Declaration error: {}", e);
            process::exit(1);
        }
    }
}
