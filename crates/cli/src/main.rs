// bomsync CLI - reconcile incoming BOMs against a master BOM

mod clean;
mod exit_codes;
mod recon;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use bomsync_recon::{ReconConfig, ReconError};
use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use exit_codes::{recon_exit_code, EXIT_CONFIG, EXIT_ERROR, EXIT_PERSIST, EXIT_SUCCESS, EXIT_USAGE};

/// Config file picked up from the current directory when --config is absent.
const DEFAULT_CONFIG_FILE: &str = "bomsync.toml";

/// Env var holding the log filter (tracing-subscriber EnvFilter syntax).
const LOG_ENV: &str = "BOMSYNC_LOG";

#[derive(Parser)]
#[command(name = "bomsync")]
#[command(about = "Reconcile incoming BOM files against a master BOM")]
#[command(long_version = long_version())]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug). BOMSYNC_LOG overrides.
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Reconcile a working BOM against the master and write the results
    #[command(after_help = "\
Examples:
  bomsync run incoming.xlsx --master master.xlsx
  bomsync run incoming.csv --master master.csv --output-dir out --format csv
  bomsync run incoming.xlsx --master master.xlsx --master-out master.new.xlsx --commit-new
  bomsync run incoming.xlsx --master master.xlsx --json | jq .summary.counts")]
    Run {
        /// Working (incoming) BOM file
        working: PathBuf,

        /// Master (reference) BOM file
        #[arg(long, short = 'm')]
        master: PathBuf,

        /// Config file (defaults to ./bomsync.toml when present)
        #[arg(long, short = 'c', env = "BOMSYNC_CONFIG")]
        config: Option<PathBuf>,

        /// Sheet to read from an Excel working file (first sheet by default)
        #[arg(long)]
        sheet: Option<String>,

        /// Sheet to read from an Excel master file (first sheet by default)
        #[arg(long)]
        master_sheet: Option<String>,

        /// Directory receiving Update_<ts> and Rapport_Modifications_<ts>
        #[arg(long, short = 'o', default_value = ".")]
        output_dir: PathBuf,

        /// Output format for the update and report files
        #[arg(long, value_enum, default_value_t = OutputFormat::Xlsx)]
        format: OutputFormat,

        /// Write the updated master here instead of over --master
        #[arg(long)]
        master_out: Option<PathBuf>,

        /// Leave the master file untouched
        #[arg(long, conflicts_with = "master_out")]
        no_master_write: bool,

        /// Append part numbers absent from the master before saving it
        #[arg(long)]
        commit_new: bool,

        /// Print the run summary as JSON to stdout
        #[arg(long)]
        json: bool,
    },

    /// Clean a raw BOM: trim cells, normalize part numbers, drop empty ones
    #[command(after_help = "\
Examples:
  bomsync clean raw.xlsx -o cleaned.xlsx
  bomsync clean master_raw.csv -o master.csv --dedupe")]
    Clean {
        /// Input file
        input: PathBuf,

        /// Output file (format from extension)
        #[arg(long, short = 'o')]
        output: PathBuf,

        /// Keep only the first row per part number
        #[arg(long)]
        dedupe: bool,

        /// Config file (defaults to ./bomsync.toml when present)
        #[arg(long, short = 'c', env = "BOMSYNC_CONFIG")]
        config: Option<PathBuf>,

        /// Sheet to read from Excel inputs
        #[arg(long)]
        sheet: Option<String>,
    },

    /// Print the status the master holds for one part number
    #[command(after_help = "\
Examples:
  bomsync lookup PN-002 --master master.xlsx
  bomsync lookup PN004 --master master.xlsx --project PROJ_A --json")]
    Lookup {
        /// Part number (normalized before lookup)
        part: String,

        /// Master (reference) BOM file
        #[arg(long, short = 'm')]
        master: PathBuf,

        /// Restrict matches to this project
        #[arg(long, short = 'p')]
        project: Option<String>,

        /// Config file (defaults to ./bomsync.toml when present)
        #[arg(long, short = 'c', env = "BOMSYNC_CONFIG")]
        config: Option<PathBuf>,

        /// Sheet to read from Excel inputs
        #[arg(long)]
        sheet: Option<String>,

        /// Output JSON instead of the bare status token
        #[arg(long)]
        json: bool,
    },

    /// Check a config file without running anything
    #[command(after_help = "\
Examples:
  bomsync validate bomsync.toml
  bomsync validate bomsync.toml --print")]
    Validate {
        /// Config file
        config: PathBuf,

        /// Print the effective config (defaults filled in) as TOML
        #[arg(long)]
        print: bool,
    },
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Xlsx,
    Csv,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Xlsx => "xlsx",
            OutputFormat::Csv => "csv",
        }
    }
}

fn long_version() -> &'static str {
    concat!(
        env!("CARGO_PKG_VERSION"),
        " (", env!("GIT_COMMIT_HASH"), ")",
        "\nengine:  bomsync-recon ", env!("CARGO_PKG_VERSION"),
        "\ntarget:  ", env!("TARGET"),
    )
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let result = match cli.command {
        Commands::Run {
            working,
            master,
            config,
            sheet,
            master_sheet,
            output_dir,
            format,
            master_out,
            no_master_write,
            commit_new,
            json,
        } => recon::cmd_run(recon::RunArgs {
            working,
            master,
            config,
            sheet,
            master_sheet,
            output_dir,
            format,
            master_out,
            no_master_write,
            commit_new,
            json,
        }),
        Commands::Clean { input, output, dedupe, config, sheet } => {
            clean::cmd_clean(input, output, dedupe, config, sheet)
        }
        Commands::Lookup { part, master, project, config, sheet, json } => {
            recon::cmd_lookup(part, master, project, config, sheet, json)
        }
        Commands::Validate { config, print } => cmd_validate(config, print),
    };

    match result {
        Ok(()) => ExitCode::from(EXIT_SUCCESS),
        Err(e) => {
            eprintln!("error: {}", e.message);
            if let Some(hint) = &e.hint {
                eprintln!("hint: {}", hint);
            }
            ExitCode::from(e.code)
        }
    }
}

/// Install the stderr subscriber. `log` records from the engine and io
/// crates are forwarded through tracing-subscriber's log bridge.
fn init_logging(verbose: u8) {
    let default = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter = tracing_subscriber::EnvFilter::try_from_env(LOG_ENV)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug)]
pub struct CliError {
    pub code: u8,
    pub message: String,
    pub hint: Option<String>,
}

impl CliError {
    /// Failures that fit no other exit code.
    pub fn general(msg: impl Into<String>) -> Self {
        Self { code: EXIT_ERROR, message: msg.into(), hint: None }
    }

    pub fn usage(msg: impl Into<String>) -> Self {
        Self { code: EXIT_USAGE, message: msg.into(), hint: None }
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self { code: EXIT_CONFIG, message: msg.into(), hint: None }
    }

    /// Import/export failures from bomsync-io.
    pub fn persist(msg: impl Into<String>) -> Self {
        Self { code: EXIT_PERSIST, message: msg.into(), hint: None }
    }

    /// Create error from an engine error with the matching exit code.
    pub fn recon(err: ReconError) -> Self {
        let hint = match &err {
            ReconError::MissingColumn { role, .. } => {
                Some(format!("add a header matching one of the '{}' aliases, or extend [columns] in the config", role))
            }
            ReconError::ConfigParse(_) | ReconError::ConfigValidation(_) => {
                Some("run `bomsync validate <config>` for details".to_string())
            }
            ReconError::RaggedRow { .. } => None,
        };
        Self { code: recon_exit_code(&err), message: err.to_string(), hint }
    }

    /// Add a hint to an existing error.
    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hint = Some(hint.into());
        self
    }
}

// ============================================================================
// Shared helpers
// ============================================================================

/// Resolve the config: explicit path, else ./bomsync.toml, else defaults.
pub fn load_config(path: Option<&Path>) -> Result<ReconConfig, CliError> {
    let path = match path {
        Some(p) => {
            if !p.exists() {
                return Err(CliError::usage(format!("config file not found: {}", p.display())));
            }
            p.to_path_buf()
        }
        None => {
            let local = PathBuf::from(DEFAULT_CONFIG_FILE);
            if !local.exists() {
                log::debug!("no {} in current directory, using defaults", DEFAULT_CONFIG_FILE);
                return Ok(ReconConfig::default());
            }
            local
        }
    };

    let text = std::fs::read_to_string(&path)
        .map_err(|e| CliError::config(format!("cannot read {}: {}", path.display(), e)))?;
    let config = ReconConfig::from_toml(&text).map_err(|e| {
        CliError::recon(e).with_hint(format!("fix {} or pass another --config", path.display()))
    })?;
    log::info!("loaded config from {}", path.display());
    Ok(config)
}

/// Import a table, reporting a missing file as a usage error.
pub fn read_table(path: &Path, sheet: Option<&str>) -> Result<bomsync_recon::Table, CliError> {
    if !path.exists() {
        return Err(CliError::usage(format!("file not found: {}", path.display())));
    }
    bomsync_io::import(path, sheet).map_err(CliError::persist)
}

// ============================================================================
// validate
// ============================================================================

fn cmd_validate(path: PathBuf, print: bool) -> Result<(), CliError> {
    let text = std::fs::read_to_string(&path)
        .map_err(|e| CliError::usage(format!("cannot read {}: {}", path.display(), e)))?;
    let config = ReconConfig::from_toml(&text).map_err(CliError::recon)?;

    if print {
        let rendered = toml::to_string_pretty(&config)
            .map_err(|e| CliError::config(format!("cannot render config: {}", e)))?;
        print!("{}", rendered);
    }

    eprintln!(
        "{}: ok ({} part number aliases, min part number length {})",
        path.display(),
        config.columns.part_number.len(),
        config.validation.min_part_number_length,
    );
    Ok(())
}
