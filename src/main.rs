//! CLI entry point for `mailjson`.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};

use mailjson::config::Config;
use mailjson::error::MailJsonError;
use mailjson::fetch::HttpFetcher;
use mailjson::model::mail::Message;
use mailjson::resolve::{links, literal, Engine};
use mailjson::source::{self, SourceRef};

#[derive(Parser)]
#[command(
    name = "mailjson",
    version,
    about = "Extract the JSON payload carried by an email",
    long_about = "Extract the JSON payload carried by an email.\n\n\
        Sources are tried in order: a JSON attachment, a {...} literal in the text body, \
        a body link to a .json file, and a body link to a page that links to a .json file."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Email file path or http(s) URL to resolve
    #[arg(value_name = "SOURCE")]
    source: Option<String>,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Per-request timeout in seconds (0 disables)
    #[arg(long, value_name = "SECS", env = "MAILJSON_TIMEOUT", global = true)]
    timeout: Option<u64>,

    /// Overall resolution deadline in seconds (0 disables)
    #[arg(long, value_name = "SECS", env = "MAILJSON_DEADLINE", global = true)]
    deadline: Option<u64>,
}

#[derive(Subcommand)]
enum Commands {
    /// Resolve and print the JSON payload
    Resolve {
        source: String,
        /// Print on a single line
        #[arg(long)]
        compact: bool,
        /// Wrap the value with the tier and candidate that produced it
        #[arg(long)]
        provenance: bool,
    },
    /// Dump the raw message bytes
    Raw {
        source: String,
        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show what the resolver would look at, without following links
    Inspect {
        source: String,
        #[arg(long)]
        json: bool,
    },
    /// Generate shell completions
    Completions {
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
    /// Generate a man page
    Manpage,
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut config = mailjson::config::load_config();
    if let Some(secs) = cli.timeout {
        config.fetch.timeout_secs = secs;
    }
    if let Some(secs) = cli.deadline {
        config.resolve.deadline_secs = secs;
    }

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    match cli.command {
        Some(Commands::Resolve {
            source,
            compact,
            provenance,
        }) => cmd_resolve(&config, &source, compact, provenance),
        Some(Commands::Raw { source, output }) => cmd_raw(&config, &source, output.as_deref()),
        Some(Commands::Inspect { source, json }) => cmd_inspect(&config, &source, json),
        Some(Commands::Completions { shell }) => cmd_completions(shell),
        Some(Commands::Manpage) => cmd_manpage(),
        None => match cli.source {
            Some(source) => cmd_resolve(&config, &source, false, false),
            None => Err(MailJsonError::InvalidInput(
                "an email path or URL is required (see --help)".into(),
            )
            .into()),
        },
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = mailjson::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mailjson.log");
        let file_layer = tracing_subscriber::fmt::layer()
            .with_ansi(false)
            .with_writer(file_appender);

        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .with(file_layer)
            .init();
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(stderr_layer)
            .init();
    }
}

fn build_engine(config: &Config) -> Engine<HttpFetcher> {
    Engine::new(HttpFetcher::new(&config.fetch)).with_deadline(config.resolve.deadline())
}

/// Resolve the JSON payload and print it to stdout.
fn cmd_resolve(config: &Config, reference: &str, compact: bool, provenance: bool) -> anyhow::Result<()> {
    let engine = build_engine(config);
    let resolution = source::parse_email_file_detailed(reference, &engine)
        .with_context(|| format!("Failed to parse email '{reference}'"))?;

    let output = if provenance {
        serde_json::to_value(&resolution)?
    } else {
        resolution.into_value()
    };

    let text = if compact {
        serde_json::to_string(&output)?
    } else {
        serde_json::to_string_pretty(&output)?
    };
    println!("{text}");
    Ok(())
}

/// Write the raw message bytes to stdout or a file.
fn cmd_raw(config: &Config, reference: &str, output: Option<&Path>) -> anyhow::Result<()> {
    let source_ref = SourceRef::parse(reference)?;
    let raw = source::load_raw(&source_ref, &HttpFetcher::new(&config.fetch))?;

    match output {
        Some(path) => {
            std::fs::write(path, &raw).map_err(|e| MailJsonError::io(path, e))?;
            eprintln!("  Wrote {} byte(s) to {}", raw.len(), path.display());
        }
        None => {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(&raw)?;
            stdout.flush()?;
        }
    }
    Ok(())
}

/// Print the candidates each tier would consider.
fn cmd_inspect(config: &Config, reference: &str, json: bool) -> anyhow::Result<()> {
    let source_ref = SourceRef::parse(reference)?;
    let message = source::load_message(&source_ref, &HttpFetcher::new(&config.fetch))?;

    if json {
        print_inspect_json(&source_ref, &message)
    } else {
        print_inspect_table(&source_ref, &message);
        Ok(())
    }
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mailjson", &mut std::io::stdout());
    Ok(())
}

/// Generate a man page and print to stdout.
fn cmd_manpage() -> anyhow::Result<()> {
    let cmd = Cli::command();
    let man = clap_mangen::Man::new(cmd);
    let mut buf = Vec::new();
    man.render(&mut buf)?;
    std::io::stdout().write_all(&buf)?;
    Ok(())
}

/// Print the inspection summary as a human-readable table.
fn print_inspect_table(source: &SourceRef, message: &Message) {
    use humansize::{format_size, BINARY};

    println!();
    println!("  {:<20} {}", "Source", source);
    println!("  {:<20} {}", "Subject", message.subject.as_deref().unwrap_or("(none)"));
    println!(
        "  {:<20} {}",
        "Text body",
        message
            .text_body
            .as_ref()
            .map(|t| format_size(t.len(), BINARY))
            .unwrap_or_else(|| "(none)".into())
    );
    println!(
        "  {:<20} {}",
        "HTML body",
        message
            .html_body
            .as_ref()
            .map(|h| format_size(h.len(), BINARY))
            .unwrap_or_else(|| "(none)".into())
    );

    println!();
    println!("  Attachments: {}", message.attachments.len());
    for (i, att) in message.attachments.iter().enumerate() {
        println!(
            "    {} {:<3} {:<30} {:<28} {:>10}",
            if att.looks_like_json() { "*" } else { " " },
            i,
            att.filename.as_deref().unwrap_or("(unnamed)"),
            att.content_type.as_deref().unwrap_or("(no type)"),
            format_size(att.size(), BINARY)
        );
    }

    println!();
    match literal::find_brace_span(message.text()) {
        Some(span) => {
            let snippet: String = message.text()[span.clone()].chars().take(60).collect();
            let valid = literal::parse_json(&message.text()[span], "body").is_ok();
            println!(
                "  {:<20} {} ({})",
                "Body literal",
                snippet,
                if valid { "valid JSON" } else { "not JSON" }
            );
        }
        None => println!("  {:<20} (none)", "Body literal"),
    }

    let body_links = links::extract_links(message.html());
    println!();
    println!("  Links: {}", body_links.len());
    for link in &body_links {
        let marker = if links::is_json_link(link) { "*" } else { " " };
        println!("    {marker} {link}");
    }
    println!();
}

/// Print the inspection summary as JSON.
fn print_inspect_json(source: &SourceRef, message: &Message) -> anyhow::Result<()> {
    let attachments: Vec<serde_json::Value> = message
        .attachments
        .iter()
        .map(|att| {
            serde_json::json!({
                "filename": att.filename,
                "content_type": att.content_type,
                "size": att.size(),
                "json_candidate": att.looks_like_json(),
            })
        })
        .collect();

    let literal_span = literal::find_brace_span(message.text()).map(|span| {
        serde_json::json!({
            "start": span.start,
            "end": span.end,
            "valid_json": literal::parse_json(&message.text()[span], "body").is_ok(),
        })
    });

    let body_links: Vec<serde_json::Value> = links::extract_links(message.html())
        .into_iter()
        .map(|url| {
            serde_json::json!({
                "json_candidate": links::is_json_link(&url),
                "url": url,
            })
        })
        .collect();

    let output = serde_json::json!({
        "source": source.to_string(),
        "subject": message.subject,
        "text_body_size": message.text_body.as_ref().map(String::len),
        "html_body_size": message.html_body.as_ref().map(String::len),
        "attachments": attachments,
        "body_literal": literal_span,
        "links": body_links,
    });

    println!("{}", serde_json::to_string_pretty(&output)?);
    Ok(())
}
