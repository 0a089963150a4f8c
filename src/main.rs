//! Zentinel header formatter compatibility CLI.
//!
//! Rewrites deprecated directives in header values, either from a
//! configuration file or from the command line.

use anyhow::{bail, Context, Result};
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};
use zentinel_header_compat::{
    DirectivePatterns, DirectiveTranslator, HeaderRewriteConfig, HeaderValueTranslator,
};

#[derive(Parser, Debug)]
#[command(name = "zentinel-header-compat")]
#[command(
    author,
    version,
    about = "Translate deprecated header formatter directives for Zentinel"
)]
struct Args {
    /// Configuration file path (YAML or JSON)
    #[arg(short, long, env = "HEADER_COMPAT_CONFIG")]
    config: Option<PathBuf>,

    /// Header value to translate (repeatable)
    #[arg(long)]
    value: Vec<String>,

    /// Output format for the translated configuration
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    output: OutputFormat,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Print example configuration and exit.
    #[arg(long)]
    example_config: bool,

    /// Validate configuration and exit.
    #[arg(long)]
    validate: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum OutputFormat {
    Yaml,
    Json,
}

fn print_example_config() {
    let example = r#"# Header Compatibility Configuration Example
version: "1"

request_headers:
  add:
    # Deprecated JSON form, rewritten to %UPSTREAM_METADATA(envoy.lb:host)%
    - name: "x-upstream-host"
      value: '%UPSTREAM_METADATA(["envoy.lb", "host"])%'
    # Deprecated JSON form, rewritten to %DYNAMIC_METADATA(com.example:tenant)%
    - name: "x-tenant"
      value: '%DYNAMIC_METADATA(["com.example", "tenant"])%'
  remove:
    - "x-debug"

response_headers:
  set:
    # Deprecated, rewritten to %FILTER_STATE(session.id:PLAIN)%
    - name: "x-session"
      value: "%PER_REQUEST_STATE(session.id)%"
"#;
    println!("{}", example);
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize logging
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    if args.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    // Print example config if requested
    if args.example_config {
        print_example_config();
        return Ok(());
    }

    if args.config.is_none() && args.value.is_empty() {
        bail!("Nothing to translate: pass --config or --value");
    }

    let patterns = DirectivePatterns::shared();
    let translator = HeaderValueTranslator::new(patterns);

    for value in &args.value {
        let translation = translator.translate(value);
        if !translation.is_complete() {
            warn!(
                translator = translator.name(),
                value = %value,
                outcome = ?translation.outcome,
                "Header value not fully translated"
            );
        }
        if !args.validate {
            println!("{}", translation.value);
        }
    }

    let Some(config_path) = &args.config else {
        return Ok(());
    };

    let config = HeaderRewriteConfig::from_path(config_path)
        .with_context(|| format!("Failed to load config file: {}", config_path.display()))?;

    let (translated, report) = config.translated(&translator);

    if args.validate {
        info!(
            config = %config_path.display(),
            values_changed = report.values_changed,
            malformed = ?report.malformed,
            "Configuration is valid"
        );
        return Ok(());
    }

    let rendered = match args.output {
        OutputFormat::Yaml => serde_yaml::to_string(&translated)
            .context("Failed to render translated configuration as YAML")?,
        OutputFormat::Json => serde_json::to_string_pretty(&translated)
            .context("Failed to render translated configuration as JSON")?,
    };
    println!("{}", rendered);

    Ok(())
}
