//! CLI entry point for `mailsift`.

use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{CommandFactory, Parser, Subcommand};

use mailsift::config::Config;
use mailsift::extract::{BatchSummary, Extractor};
use mailsift::parser::ContainerFormat;
use mailsift::report::{JsonReport, ReportSink, TextReport};

#[derive(Parser)]
#[command(
    name = "mailsift",
    version,
    about = "Extract headers, body, attachments and PDF text from .msg and .eml files",
    after_help = "Without a subcommand, the .msg and .eml files named in the [inputs] \
                  section of the config file are processed (default: \"test email.msg\" \
                  and \"test email.eml\")."
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Directory receiving attachments (default: ./attachments)
    #[arg(short, long, global = true, value_name = "DIR", env = "MAILSIFT_OUTPUT")]
    output: Option<PathBuf>,

    /// Print one JSON object per input instead of the text report
    #[arg(long, global = true)]
    json: bool,

    /// Verbose logging (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Extract Outlook .msg items
    Msg {
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
    },
    /// Extract RFC 5322 .eml messages
    Eml {
        #[arg(required = true, value_name = "FILE")]
        files: Vec<PathBuf>,
    },
    /// Print the text of a PDF file
    Pdf {
        #[arg(value_name = "FILE")]
        file: PathBuf,
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

    let config = mailsift::config::load_config();

    let log_level = match cli.verbose {
        0 => config.general.log_level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    setup_logging(log_level, &config);

    let extractor = build_extractor(cli.output.as_deref(), &config);

    match cli.command {
        Some(Commands::Msg { files }) => {
            let inputs: Vec<_> = files
                .iter()
                .map(|f| (ContainerFormat::Msg, f.as_path()))
                .collect();
            cmd_extract(&extractor, &inputs, cli.json, &config)
        }
        Some(Commands::Eml { files }) => {
            let inputs: Vec<_> = files
                .iter()
                .map(|f| (ContainerFormat::Eml, f.as_path()))
                .collect();
            cmd_extract(&extractor, &inputs, cli.json, &config)
        }
        Some(Commands::Pdf { file }) => cmd_pdf(&file),
        Some(Commands::Completions { shell }) => cmd_completions(shell),
        Some(Commands::Manpage) => cmd_manpage(),
        None => {
            let inputs = [
                (ContainerFormat::Msg, config.inputs.msg_file.as_path()),
                (ContainerFormat::Eml, config.inputs.eml_file.as_path()),
            ];
            cmd_extract(&extractor, &inputs, cli.json, &config)
        }
    }
}

/// Set up tracing with stderr output and optional file logging.
fn setup_logging(level: &str, config: &Config) {
    use tracing_subscriber::layer::SubscriberExt;
    use tracing_subscriber::util::SubscriberInitExt;

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    let stderr_layer = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);

    let log_dir = mailsift::config::cache_dir(config);
    if std::fs::create_dir_all(&log_dir).is_ok() {
        let file_appender = tracing_appender::rolling::never(&log_dir, "mailsift.log");
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

/// Command-line output directory wins over the config file.
fn build_extractor(output: Option<&Path>, config: &Config) -> Extractor {
    let output_dir = output.unwrap_or(config.extract.output_dir.as_path());
    Extractor::new(output_dir).with_pdf_extension(config.extract.pdf_extension.as_str())
}

/// Run every input through the extractor, reporting to stdout.
///
/// Failed inputs are reported in the output and do not change the exit status.
fn cmd_extract(
    extractor: &Extractor,
    inputs: &[(ContainerFormat, &Path)],
    json: bool,
    config: &Config,
) -> anyhow::Result<()> {
    let stdout = std::io::stdout().lock();
    let mut sink: Box<dyn ReportSink> = if json {
        Box::new(JsonReport::new(stdout))
    } else {
        Box::new(TextReport::new(stdout).with_date_format(config.general.date_format.as_str()))
    };

    let summary = extractor.extract_all(inputs.iter().copied(), sink.as_mut());
    log_summary(&summary);
    Ok(())
}

fn log_summary(summary: &BatchSummary) {
    if summary.failed.is_empty() {
        tracing::info!(succeeded = summary.succeeded, "All inputs processed");
    } else {
        tracing::warn!(
            succeeded = summary.succeeded,
            failed = summary.failed.len(),
            "Some inputs could not be processed"
        );
    }
}

/// Print the text of a single PDF.
fn cmd_pdf(file: &Path) -> anyhow::Result<()> {
    let text = mailsift::pdf::extract_pdf_text(file)
        .with_context(|| format!("Error reading PDF {}", file.display()))?;
    let mut stdout = std::io::stdout().lock();
    stdout.write_all(text.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

/// Generate shell completions and print to stdout.
fn cmd_completions(shell: clap_complete::Shell) -> anyhow::Result<()> {
    let mut cmd = Cli::command();
    clap_complete::generate(shell, &mut cmd, "mailsift", &mut std::io::stdout());
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
