//! book-catalog CLI: manage the catalog file directly or serve it over HTTP.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use miette::{IntoDiagnostic, Result};
use serde::Serialize;

use book_catalog::catalog::{Catalog, parse_book_id};
use book_catalog::config::CatalogConfig;
use book_catalog::validate::Record;

#[derive(Parser)]
#[command(name = "book-catalog", version, about = "Flat-file book catalog")]
struct Cli {
    /// TOML config file.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// JSON data file (overrides config and environment).
    #[arg(long, global = true)]
    data_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List every book.
    List,

    /// Show one book by id.
    Show { id: String },

    /// Search titles (case-insensitive substring).
    Search { title: String },

    /// Add a book from a JSON object, e.g. '{"title":"Dune",...}'.
    Add { json: String },

    /// Update a book with a partial JSON object.
    Update { id: String, json: String },

    /// Delete one book.
    Delete { id: String },

    /// Delete several books at once.
    DeleteMany {
        #[arg(required = true)]
        ids: Vec<u64>,
    },

    /// Serve the HTTP API.
    #[cfg(feature = "server")]
    Serve {
        /// Bind address.
        #[arg(long)]
        bind: Option<String>,

        /// Port number.
        #[arg(long)]
        port: Option<u16>,
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
    .ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let mut config = CatalogConfig::resolve(cli.config.as_deref())?;
    if let Some(data_file) = cli.data_file {
        config.data_file = data_file;
    }
    let catalog = Catalog::new(&config);

    match cli.command {
        Commands::List => print_json(&catalog.list()?)?,

        Commands::Show { id } => {
            let id = parse_book_id(&id)?;
            match catalog.find(id) {
                Some(book) => print_json(&book)?,
                None => miette::bail!("Book not found!"),
            }
        }

        Commands::Search { title } => print_json(&catalog.search(&title)?)?,

        Commands::Add { json } => {
            let record = parse_record(&json)?;
            print_json(&catalog.create(&record)?)?;
        }

        Commands::Update { id, json } => {
            let patch = parse_record(&json)?;
            print_json(&catalog.update(&id, &patch)?)?;
        }

        Commands::Delete { id } => print_json(&catalog.delete(&id)?)?,

        Commands::DeleteMany { ids } => {
            let ids: Vec<serde_json::Value> = ids.into_iter().map(Into::into).collect();
            let deleted = catalog.delete_many(&ids)?;
            println!("{deleted} book/s were successfully deleted.");
        }

        #[cfg(feature = "server")]
        Commands::Serve { bind, port } => {
            if let Some(bind) = bind {
                config.server.bind = bind;
            }
            if let Some(port) = port {
                config.server.port = port;
            }
            tracing::info!(data_file = %catalog.store().path().display(), "starting server");

            let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
            runtime
                .block_on(book_catalog::server::serve(
                    std::sync::Arc::new(catalog),
                    &config.server.addr(),
                ))
                .into_diagnostic()?;
        }
    }

    Ok(())
}

fn parse_record(json: &str) -> Result<Record> {
    match serde_json::from_str(json).into_diagnostic()? {
        serde_json::Value::Object(map) => Ok(map),
        _ => miette::bail!("expected a JSON object"),
    }
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value).into_diagnostic()?);
    Ok(())
}
