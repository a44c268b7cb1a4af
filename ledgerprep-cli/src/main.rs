use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ledgerprep_core::{CsvSink, JsonSink, RecordSink, default_output_name};
use ledgerprep_ingest::{IngestError, ParserRegistry};
use std::fs::File;
use std::io::{BufWriter, Write, stderr};
use std::path::{Path, PathBuf};
use tracing::info;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{Layer, fmt};

mod config;
mod state;

use config::Config;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("LEDGERPREP_BUILD_SHA"),
    ")"
);

#[derive(Parser, Debug)]
#[command(
    name = "ledgerprep",
    version,
    long_version = LONG_VERSION,
    about = "Turn bank statement exports into ledger import rows"
)]
struct Cli {
    /// error, warn, info, debug or trace (logs go to stderr)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    /// Config file (default: ~/.ledgerprep/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Print which parser would handle a statement file
    Classify {
        file: PathBuf,

        /// Free-text bank name; overrides detection when recognised
        #[arg(long)]
        bank: Option<String>,
    },

    /// Parse a statement file into canonical rows
    Parse {
        file: PathBuf,

        /// Free-text bank name; overrides detection when recognised
        #[arg(long)]
        bank: Option<String>,

        /// Write to this path instead of stdout
        #[arg(long, conflicts_with = "auto_name")]
        out: Option<PathBuf>,

        /// Write next to the input as <stem>_<TOKEN>.csv
        #[arg(long)]
        auto_name: bool,

        /// Emit a JSON array instead of CSV
        #[arg(long)]
        json: bool,
    },

    /// Show every detector's verdict for a file, in priority order
    Detect { file: PathBuf },

    /// Manage the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write the default config if none exists
    Init,
    /// Print the effective config
    Show,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = parse_log_level(&cli.log_level).unwrap_or_else(|| {
        eprintln!("unknown log level {:?}; using warn", cli.log_level);
        LevelFilter::WARN
    });
    setup_logging(level);

    let config_path = config::config_path(cli.config.as_deref())?;

    match cli.command {
        Command::Classify { file, bank } => {
            let cfg = config::load_config(&config_path)?;
            let registry = ParserRegistry::new(cfg.detection);
            let parser = registry.resolve(bank.as_deref(), &file)?;
            println!("{}\t{}", parser.display_name(), parser.short_token());
        }

        Command::Parse {
            file,
            bank,
            out,
            auto_name,
            json,
        } => {
            let cfg = config::load_config(&config_path)?;
            let request = ParseRequest {
                file: &file,
                bank: bank.as_deref(),
                out,
                auto_name,
                json,
            };
            run_parse(&cfg, &request)?;
        }

        Command::Detect { file } => {
            let cfg = config::load_config(&config_path)?;
            run_detect(&cfg, &file)?;
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => config::init_config(&config_path)?,
            ConfigCommand::Show => config::show_config(&config_path)?,
        },
    }

    Ok(())
}

struct ParseRequest<'a> {
    file: &'a Path,
    bank: Option<&'a str>,
    out: Option<PathBuf>,
    auto_name: bool,
    json: bool,
}

impl ParseRequest<'_> {
    /// Where records go; `None` is stdout.
    fn destination(&self, short_token: &str) -> Option<PathBuf> {
        match (&self.out, self.auto_name) {
            (Some(path), _) => Some(path.clone()),
            (None, true) => Some(default_output_name(self.file, short_token)),
            (None, false) => None,
        }
    }
}

fn run_parse(cfg: &Config, req: &ParseRequest<'_>) -> Result<()> {
    let registry = ParserRegistry::new(cfg.detection);
    let parser = registry.resolve(req.bank, req.file)?;
    let records = parser
        .parse(req.file)?
        .into_records(parser.display_name(), req.file)?;

    let destination = req.destination(parser.short_token());
    let writer: Box<dyn Write> = match &destination {
        Some(path) => {
            let file = File::create(path).with_context(|| format!("create {}", path.display()))?;
            Box::new(BufWriter::new(file))
        }
        None => Box::new(std::io::stdout().lock()),
    };

    let mut sink: Box<dyn RecordSink> = if req.json {
        Box::new(JsonSink::new(writer))
    } else {
        Box::new(CsvSink::with_options(
            writer,
            cfg.output.delimiter_byte()?,
            cfg.output.include_header,
        ))
    };
    sink.write_records(&records)?;

    let target = destination
        .as_ref()
        .map_or_else(|| "stdout".to_string(), |p| p.display().to_string());
    info!(parser = parser.short_token(), rows = records.len(), %target, "parse finished");
    eprintln!(
        "{} rows from {} ({}) -> {}",
        records.len(),
        req.file.display(),
        parser.display_name(),
        target
    );
    Ok(())
}

fn run_detect(cfg: &Config, file: &Path) -> Result<()> {
    if !file.exists() {
        return Err(IngestError::FileNotFound(file.to_path_buf()).into());
    }

    let registry = ParserRegistry::new(cfg.detection);
    for parser in registry.parsers() {
        let verdict = if parser.is_match(file) { "match" } else { "-" };
        println!(
            "{:<20} {:<5} {}",
            parser.display_name(),
            parser.short_token(),
            verdict
        );
    }

    let selected = registry.resolve(None, file)?;
    println!("selected: {} ({})", selected.display_name(), selected.short_token());
    Ok(())
}

fn parse_log_level(level: &str) -> Option<LevelFilter> {
    match level.to_lowercase().as_str() {
        "trace" => Some(LevelFilter::TRACE),
        "debug" => Some(LevelFilter::DEBUG),
        "info" => Some(LevelFilter::INFO),
        "warn" | "warning" => Some(LevelFilter::WARN),
        "error" => Some(LevelFilter::ERROR),
        "off" => Some(LevelFilter::OFF),
        _ => None,
    }
}

fn setup_logging(level: LevelFilter) {
    let terminal_log = fmt::layer()
        .with_target(false)
        .with_writer(stderr)
        .with_filter(level);

    tracing_subscriber::registry().with(terminal_log).init();
}
