// crates/chart-controls-cli/src/main.rs
// ============================================================================
// Module: Chart Controls CLI
// Description: Command-line entry point for control resolution and merging.
// Purpose: Resolve chart panels and inspect merged schemas from the shell.
// Dependencies: clap, chart-controls-config, chart-controls-core, tracing
// ============================================================================

//! ## Overview
//! The `chart-controls` binary loads a registry from TOML and resolves every
//! control a visualization renders against saved form data and attached
//! datasource schemas. It also prints the columns and metrics shared by a set
//! of datasources and validates registry files.
//!
//! Inputs are read with explicit size limits and failures exit non-zero with
//! a single-line message on stderr. Logs go to stderr so stdout stays JSON.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fs::File;
use std::io::Read;
use std::io::Write;
use std::path::Path;
use std::path::PathBuf;
use std::process::ExitCode;

use chart_controls_config::ChartControlsConfig;
use chart_controls_config::FunctionCatalog;
use chart_controls_core::AmbientState;
use chart_controls_core::ColumnSpec;
use chart_controls_core::ControlResolver;
use chart_controls_core::DataSourceSchema;
use chart_controls_core::DatasourceType;
use chart_controls_core::merge_columns;
use chart_controls_core::merge_metrics;
use chart_controls_core::to_form_data;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;
use tracing::info;
use tracing_subscriber::EnvFilter;


// ============================================================================
// SECTION: Limits
// ============================================================================

/// Maximum size of a datasource or form-data JSON input.
const MAX_JSON_INPUT_BYTES: usize = 1024 * 1024;

/// Log filter used when no other source provides one.
const DEFAULT_LOG_LEVEL: &str = "warn";

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI arguments.
#[derive(Parser, Debug)]
#[command(
    name = "chart-controls",
    about = "Resolve chart control panels from a static registry.",
    disable_help_subcommand = true
)]
struct Cli {
    /// Log filter directive, overriding `RUST_LOG` and the config file.
    #[arg(long, global = true, value_name = "LEVEL")]
    log_level: Option<String>,
    /// Selected command.
    #[command(subcommand)]
    command: Commands,
}

/// Top-level commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Resolve every control a visualization renders.
    Resolve(ResolveCommand),
    /// Print fields shared by every attached datasource.
    Merge {
        /// Selected merge subcommand.
        #[command(subcommand)]
        command: MergeCommand,
    },
    /// Registry configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

/// Arguments for `resolve`.
#[derive(Args, Debug)]
struct ResolveCommand {
    /// Registry config path (defaults to `CHART_CONTROLS_CONFIG` or `chart-controls.toml`).
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Visualization type to resolve.
    #[arg(long, value_name = "VIZ")]
    viz_type: String,
    /// Datasource type used to filter sections.
    #[arg(long, value_enum, value_name = "TYPE")]
    datasource_type: Option<DatasourceTypeArg>,
    /// Datasource schema JSON file (repeatable, in attachment order).
    #[arg(long = "datasource", value_name = "PATH")]
    datasources: Vec<PathBuf>,
    /// Saved form data JSON object.
    #[arg(long, value_name = "PATH")]
    form_data: Option<PathBuf>,
    /// Output shape.
    #[arg(long, value_enum, default_value_t = ResolveOutput::State)]
    output: ResolveOutput,
}

/// Merge subcommands.
#[derive(Subcommand, Debug)]
enum MergeCommand {
    /// Columns shared by every datasource.
    Columns(MergeColumnsCommand),
    /// Metrics shared by every datasource.
    Metrics(MergeMetricsCommand),
}

/// Arguments for `merge columns`.
#[derive(Args, Debug)]
struct MergeColumnsCommand {
    /// Datasource schema JSON file (repeatable, in attachment order).
    #[arg(long = "datasource", value_name = "PATH", required = true)]
    datasources: Vec<PathBuf>,
    /// Column filter applied before intersecting.
    #[arg(long, value_enum, default_value_t = ColumnFilterArg::All)]
    filter: ColumnFilterArg,
}

/// Arguments for `merge metrics`.
#[derive(Args, Debug)]
struct MergeMetricsCommand {
    /// Datasource schema JSON file (repeatable, in attachment order).
    #[arg(long = "datasource", value_name = "PATH", required = true)]
    datasources: Vec<PathBuf>,
    /// Datasource type deciding metric equality (defaults to the first datasource).
    #[arg(long, value_enum, value_name = "TYPE")]
    datasource_type: Option<DatasourceTypeArg>,
}

/// Config subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Validate a registry config and bind its functions.
    Check {
        /// Registry config path.
        #[arg(long, value_name = "PATH")]
        config: Option<PathBuf>,
    },
}

/// Datasource type selector.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum DatasourceTypeArg {
    /// SQL table-like source.
    Table,
    /// Druid source.
    Druid,
}

impl From<DatasourceTypeArg> for DatasourceType {
    fn from(value: DatasourceTypeArg) -> Self {
        match value {
            DatasourceTypeArg::Table => Self::Table,
            DatasourceTypeArg::Druid => Self::Druid,
        }
    }
}

/// Output shape for `resolve`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ResolveOutput {
    /// Full control states keyed by control name.
    State,
    /// Control values only.
    FormData,
}

/// Column filters for `merge columns`.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum ColumnFilterArg {
    /// Every column.
    All,
    /// Columns usable in group by.
    Groupby,
    /// Columns usable in filters.
    Filterable,
    /// Temporal columns.
    Time,
}

impl ColumnFilterArg {
    /// Returns whether `column` passes this filter.
    const fn accepts(self, column: &ColumnSpec) -> bool {
        match self {
            Self::All => true,
            Self::Groupby => column.groupby,
            Self::Filterable => column.filterable,
            Self::Time => column.is_dttm,
        }
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper with a rendered message.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Rendered message.
    message: String,
}

impl CliError {
    /// Creates a CLI error from a message.
    const fn new(message: String) -> Self {
        Self { message }
    }
}

/// Result alias for CLI operations.
type CliResult<T> = Result<T, CliError>;

/// Failures while reading bounded input files.
#[derive(Debug)]
enum ReadLimitError {
    /// Underlying I/O failure.
    Io(std::io::Error),
    /// Input exceeded the configured limit.
    TooLarge {
        /// Observed size in bytes.
        size: u64,
        /// Allowed size in bytes.
        limit: usize,
    },
}

// ============================================================================
// SECTION: Entry Point
// ============================================================================

fn main() -> ExitCode {
    match run() {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Parses arguments and dispatches the selected command.
fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    let config = match config_path(&cli.command) {
        Some(path) => Some(
            ChartControlsConfig::load(path.as_deref())
                .map_err(|err| CliError::new(err.to_string()))?,
        ),
        None => None,
    };
    let env_level = std::env::var("RUST_LOG").ok();
    let directive = log_directive(
        cli.log_level.as_deref(),
        env_level.as_deref(),
        config.as_ref().map(|config| config.logging.level.as_str()),
    );
    init_tracing(directive)?;

    match cli.command {
        Commands::Resolve(command) => command_resolve(&command, config.as_ref()),
        Commands::Merge {
            command,
        } => match command {
            MergeCommand::Columns(command) => command_merge_columns(&command),
            MergeCommand::Metrics(command) => command_merge_metrics(&command),
        },
        Commands::Config {
            command: ConfigCommand::Check {
                ..
            },
        } => command_config_check(config.as_ref()),
    }
}

/// Returns the config path argument for commands that load a registry.
const fn config_path(command: &Commands) -> Option<&Option<PathBuf>> {
    match command {
        Commands::Resolve(command) => Some(&command.config),
        Commands::Config {
            command: ConfigCommand::Check {
                config,
            },
        } => Some(config),
        Commands::Merge {
            ..
        } => None,
    }
}

// ============================================================================
// SECTION: Logging
// ============================================================================

/// Picks the first available log filter: flag, environment, config, default.
fn log_directive<'a>(
    cli_level: Option<&'a str>,
    env_level: Option<&'a str>,
    config_level: Option<&'a str>,
) -> &'a str {
    cli_level
        .or(env_level.filter(|level| !level.trim().is_empty()))
        .or(config_level)
        .unwrap_or(DEFAULT_LOG_LEVEL)
}

/// Installs the stderr tracing subscriber.
fn init_tracing(directive: &str) -> CliResult<()> {
    let filter = EnvFilter::try_new(directive)
        .map_err(|err| CliError::new(format!("invalid log level `{directive}`: {err}")))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init()
        .map_err(|err| CliError::new(format!("failed to initialize logging: {err}")))
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes `resolve`.
fn command_resolve(
    command: &ResolveCommand,
    config: Option<&ChartControlsConfig>,
) -> CliResult<ExitCode> {
    let config = config.ok_or_else(|| CliError::new("registry config not loaded".to_string()))?;
    let registry = config
        .build_registry(&FunctionCatalog::builtin())
        .map_err(|err| CliError::new(err.to_string()))?;
    let datasources = read_datasources(&command.datasources)?;
    let datasource_type = command
        .datasource_type
        .map(DatasourceType::from)
        .or_else(|| datasources.first().map(|ds| ds.kind))
        .unwrap_or(DatasourceType::Table);
    let ambient = (!datasources.is_empty()).then(|| AmbientState {
        datasources,
        datasource_type: Some(datasource_type),
        extra: Map::new(),
    });
    let saved: Map<String, Value> = match &command.form_data {
        Some(path) => read_json(path, "form data")?,
        None => Map::new(),
    };
    debug!(
        viz_type = %command.viz_type,
        datasource_type = %datasource_type,
        saved = saved.len(),
        "resolving controls"
    );
    let states = ControlResolver::new(&registry)
        .all_controls_state(&command.viz_type, datasource_type, ambient.as_ref(), &saved)
        .map_err(|err| CliError::new(err.to_string()))?;
    match command.output {
        ResolveOutput::State => write_json(&states)?,
        ResolveOutput::FormData => write_json(&to_form_data(&states))?,
    }
    Ok(ExitCode::SUCCESS)
}

/// Executes `merge columns`.
fn command_merge_columns(command: &MergeColumnsCommand) -> CliResult<ExitCode> {
    let datasources = read_datasources(&command.datasources)?;
    let filter = command.filter;
    let merged = merge_columns(&datasources, |column| filter.accepts(column));
    info!(datasources = datasources.len(), columns = merged.len(), "merged columns");
    write_json(&merged)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `merge metrics`.
fn command_merge_metrics(command: &MergeMetricsCommand) -> CliResult<ExitCode> {
    let datasources = read_datasources(&command.datasources)?;
    let datasource_type = command
        .datasource_type
        .map(DatasourceType::from)
        .or_else(|| datasources.first().map(|ds| ds.kind))
        .unwrap_or(DatasourceType::Table);
    let merged = merge_metrics(&datasources, datasource_type);
    info!(datasources = datasources.len(), metrics = merged.len(), "merged metrics");
    write_json(&merged)?;
    Ok(ExitCode::SUCCESS)
}

/// Executes `config check`.
fn command_config_check(config: Option<&ChartControlsConfig>) -> CliResult<ExitCode> {
    let config = config.ok_or_else(|| CliError::new("registry config not loaded".to_string()))?;
    let registry = config
        .build_registry(&FunctionCatalog::builtin())
        .map_err(|err| CliError::new(err.to_string()))?;
    let message = format!(
        "config ok: {} controls, {} visualizations",
        registry.control_names().count(),
        registry.viz_types().count()
    );
    write_stdout_line(&message).map_err(|err| CliError::new(output_error("stdout", &err)))?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Input
// ============================================================================

/// Reads every datasource schema in order.
fn read_datasources(paths: &[PathBuf]) -> CliResult<Vec<DataSourceSchema>> {
    paths.iter().map(|path| read_json(path, "datasource")).collect()
}

/// Reads and decodes a bounded JSON input file.
fn read_json<T: DeserializeOwned>(path: &Path, kind: &str) -> CliResult<T> {
    let bytes = read_bytes_with_limit(path, MAX_JSON_INPUT_BYTES).map_err(|err| match err {
        ReadLimitError::Io(err) => {
            CliError::new(format!("failed to read {kind} {}: {err}", path.display()))
        }
        ReadLimitError::TooLarge {
            size,
            limit,
        } => CliError::new(format!(
            "{kind} {} exceeds size limit ({size} bytes > {limit} bytes)",
            path.display()
        )),
    })?;
    serde_json::from_slice(&bytes)
        .map_err(|err| CliError::new(format!("invalid {kind} {}: {err}", path.display())))
}

/// Reads a file while refusing inputs larger than `max_bytes`.
fn read_bytes_with_limit(path: &Path, max_bytes: usize) -> Result<Vec<u8>, ReadLimitError> {
    let file = File::open(path).map_err(ReadLimitError::Io)?;
    let size = file.metadata().map_err(ReadLimitError::Io)?.len();
    let limit = u64::try_from(max_bytes).unwrap_or(u64::MAX);
    if size > limit {
        return Err(ReadLimitError::TooLarge {
            size,
            limit: max_bytes,
        });
    }
    let mut bytes = Vec::new();
    file.take(limit.saturating_add(1)).read_to_end(&mut bytes).map_err(ReadLimitError::Io)?;
    if bytes.len() > max_bytes {
        return Err(ReadLimitError::TooLarge {
            size: u64::try_from(bytes.len()).unwrap_or(u64::MAX),
            limit: max_bytes,
        });
    }
    Ok(bytes)
}

// ============================================================================
// SECTION: Output
// ============================================================================

/// Writes `value` to stdout as pretty JSON.
fn write_json<T: Serialize + ?Sized>(value: &T) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("failed to render output: {err}")))?;
    write_stdout_line(&rendered).map_err(|err| CliError::new(output_error("stdout", &err)))
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> std::io::Result<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Renders an output stream failure.
fn output_error(stream: &str, error: &std::io::Error) -> String {
    format!("failed to write {stream}: {error}")
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
