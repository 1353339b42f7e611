//! soapbind CLI - tools for working with service definitions
//!
//! Commands:
//!   soapbind check <service>                     - Load and validate a service definition
//!   soapbind methods <service>                   - List method signatures
//!   soapbind bind <service> <method> <document>  - Bind a JSON wire document to the inputs
//!   soapbind echo <service> <method> <document>  - Bind, then flatten inputs as the response

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use soapbind::document::{render_bound_message, render_wire_message, WireDocument};
use soapbind::{BoundValue, MessageBinder, ResolvedType, ResponseBinder, Service};

#[derive(Parser)]
#[command(name = "soapbind")]
#[command(about = "Tools for working with SOAP service definitions", long_about = None)]
struct Cli {
    /// Log binding decisions (overridden by RUST_LOG)
    #[arg(long, short = 'v', global = true)]
    verbose: bool,

    /// Print JSON on a single line
    #[arg(long, global = true)]
    compact: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Load a service definition and check every type reference
    Check {
        /// Path to the service definition (JSON)
        service: PathBuf,
    },

    /// List the methods of a service
    Methods {
        /// Path to the service definition (JSON)
        service: PathBuf,
    },

    /// Bind a wire document to a method's inputs
    Bind {
        /// Path to the service definition (JSON)
        service: PathBuf,
        /// Method to bind against
        method: String,
        /// Path to the wire document (JSON)
        document: PathBuf,
    },

    /// Bind a wire document, then flatten the inputs named like outputs
    Echo {
        /// Path to the service definition (JSON)
        service: PathBuf,
        /// Method to bind against
        method: String,
        /// Path to the wire document (JSON)
        document: PathBuf,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match cli.command {
        Commands::Check { service } => check_command(&service),
        Commands::Methods { service } => methods_command(&service),
        Commands::Bind {
            service,
            method,
            document,
        } => bind_command(&service, &method, &document, cli.compact),
        Commands::Echo {
            service,
            method,
            document,
        } => echo_command(&service, &method, &document, cli.compact),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn load_service(path: &Path) -> anyhow::Result<Service> {
    Service::load(path).with_context(|| format!("Failed to load service {}", path.display()))
}

fn load_document(path: &Path) -> anyhow::Result<WireDocument> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    WireDocument::from_json_str(&json)
        .with_context(|| format!("Failed to parse wire document {}", path.display()))
}

fn check_command(path: &Path) -> anyhow::Result<()> {
    let service = load_service(path)?;
    let complex_types = service.repository.complex_types();

    println!(
        "service '{}' ({}): {} complex types, {} methods",
        service.name,
        service.binding,
        complex_types.len(),
        service.methods.len()
    );

    for ty in complex_types {
        if ty.name() == ty.original_name() {
            println!("  {}", ty.name());
        } else {
            println!("  {} ({})", ty.name(), ty.original_name());
        }
        for property in ty.properties() {
            let wire_type = match service.repository.resolve(&property.ty)? {
                ResolvedType::Scalar { .. } => service
                    .repository
                    .expand_wire_type(property.ty.name())
                    .unwrap_or_default(),
                ResolvedType::Complex(target) => target.name().to_string(),
            };
            let nillable = if property.nillable { " nillable" } else { "" };
            let array = if property.ty.is_array() { "[]" } else { "" };
            println!("    {}: {}{}{}", property.name, wire_type, array, nillable);
        }
    }

    Ok(())
}

fn methods_command(path: &Path) -> anyhow::Result<()> {
    let service = load_service(path)?;
    for method in &service.methods {
        println!("{}", method);
    }
    Ok(())
}

fn bind_command(
    service: &Path,
    method: &str,
    document: &Path,
    compact: bool,
) -> anyhow::Result<()> {
    let service = load_service(service)?;
    let method = service
        .method(method)
        .ok_or_else(|| {
            anyhow::anyhow!("Method '{}' not found in service '{}'", method, service.name)
        })?;
    let document = load_document(document)?;

    let bound = service
        .request_binder()
        .process_message(method, &document.graph, &document.arguments, &service.repository)
        .map_err(|e| anyhow::anyhow!("{}", e.fault()))?;

    print_json(&render_bound_message(&bound), compact)
}

fn echo_command(
    service: &Path,
    method: &str,
    document: &Path,
    compact: bool,
) -> anyhow::Result<()> {
    let service = load_service(service)?;
    let method = service
        .method(method)
        .ok_or_else(|| {
            anyhow::anyhow!("Method '{}' not found in service '{}'", method, service.name)
        })?;
    let document = load_document(document)?;

    let bound = service
        .request_binder()
        .process_message(method, &document.graph, &document.arguments, &service.repository)
        .map_err(|e| anyhow::anyhow!("{}", e.fault()))?;

    let values: Vec<BoundValue> = method
        .outputs()
        .iter()
        .map(|output| bound.get(&output.name).cloned().unwrap_or(BoundValue::Null))
        .collect();

    let response = service
        .response_binder()
        .process_response(method, bound.objects(), &values, &service.repository)
        .map_err(|e| anyhow::anyhow!("{}", e.fault()))?;

    print_json(&render_wire_message(&response), compact)
}

fn print_json(json: &serde_json::Value, compact: bool) -> anyhow::Result<()> {
    let rendered = if compact {
        serde_json::to_string(json)?
    } else {
        serde_json::to_string_pretty(json)?
    };
    println!("{}", rendered);
    Ok(())
}
