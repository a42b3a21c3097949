//! pagesumm CLI - webpage summarisation
//!
//! The application logic is contained in lib.rs, and this file is responsible
//! for parsing arguments and handling top-level errors.

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use pagesumm::{export, logging, ui, web, Config, Pipeline, RunRequest, SummaryStyle};
use std::net::ToSocketAddrs;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "pagesumm")]
#[command(author, version, about = "Summarise webpages with an LLM", long_about = None)]
struct Cli {
    /// Path to a pagesumm.toml config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Mirror log output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summarise a webpage by URL
    Summarise {
        /// URL to summarise
        url: String,
        /// Summary style
        #[arg(long, value_enum, default_value_t = SummaryStyle::Default)]
        style: SummaryStyle,
        /// Model identifier (defaults to the configured model)
        #[arg(long)]
        model: Option<String>,
        /// Save the summary as a Word document
        #[arg(long)]
        export: bool,
        /// Show raw extracted text instead of summary
        #[arg(long)]
        raw: bool,
        /// Fetch timeout in seconds (0 waits indefinitely)
        #[arg(long)]
        timeout: Option<u64>,
    },
    /// Run the web form
    Serve {
        /// Address to bind
        #[arg(long)]
        host: Option<String>,
        /// Port to bind
        #[arg(long)]
        port: Option<u16>,
    },
    /// Print an exported summary document
    Show {
        /// Path to a .docx file produced by pagesumm
        file: PathBuf,
    },
    /// Generate shell completions
    Completions {
        /// Target shell
        shell: Shell,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if let Some(Commands::Completions { shell }) = &cli.command {
        clap_complete::generate(*shell, &mut Cli::command(), "pagesumm", &mut std::io::stdout());
        return Ok(());
    }

    let mut config = Config::load(cli.config.as_deref()).context("failed to load configuration")?;
    let log_guard = logging::init(&config.log.file, cli.verbose)?;

    match cli.command {
        Some(Commands::Summarise {
            url,
            style,
            model,
            export,
            raw,
            timeout,
        }) => {
            if let Some(secs) = timeout {
                config.fetch.timeout_secs = Some(secs);
            }
            let pipeline = Pipeline::new(&config)?;

            let outcome = if raw {
                // Just show raw extracted text
                pipeline.extract_only(&url).await.map(|text| {
                    println!("{}", text);
                    println!("\n--- Extracted {} characters ---", text.len());
                })
            } else {
                let mut request = RunRequest::new(url.as_str()).style(style).export(export);
                if let Some(model) = model {
                    request = request.model(model);
                }
                pipeline.run(&request).await.map(|report| ui::print_report(&report))
            };

            if let Err(e) = outcome {
                ui::print_error(&url, &e);
                // Flush the log file before exiting
                drop(log_guard);
                std::process::exit(1);
            }
        }
        Some(Commands::Serve { host, port }) => {
            if let Some(host) = host {
                config.server.host = host;
            }
            if let Some(port) = port {
                config.server.port = port;
            }

            let addr = (config.server.host.as_str(), config.server.port)
                .to_socket_addrs()?
                .next()
                .with_context(|| format!("cannot resolve {}", config.server.host))?;

            let pipeline = Pipeline::new(&config)?;
            web::serve(pipeline, addr).await?;
        }
        Some(Commands::Show { file }) => {
            let contents = export::read_document(&file)
                .with_context(|| format!("failed to read {}", file.display()))?;
            ui::print_document(&contents);
        }
        // Handled before the config is loaded
        Some(Commands::Completions { .. }) => {}
        None => {
            // Default: interactive prompt
            let pipeline = Pipeline::new(&config)?;
            ui::prompt(&pipeline).await?;
        }
    }

    Ok(())
}
