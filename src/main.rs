use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use sheetquery::config::parse_max_searches;
use sheetquery::sink::{self, DEFAULT_OUTPUT_FILE};
use sheetquery::source::{self, GoogleSheetSourceBuilder};
use sheetquery::{
    BatchEvent, BatchReport, BatchSearch, Config, ConfigError, QueryTemplate, SearchClientBuilder,
    SourceError, Table, TemplateError, queries_for,
};

/// sheetquery - bulk web lookups for a spreadsheet column
#[derive(Parser)]
#[command(name = "sheetquery")]
#[command(about = "Search the web for an attribute of every entity in a spreadsheet column")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Available commands
#[derive(Subcommand)]
enum Commands {
    /// Show a table's columns and first rows
    Columns(ColumnsCommand),
    /// Run one search per row and save the results as CSV
    Search(SearchCommand),
}

/// Where the records come from
#[derive(Args)]
struct SourceArgs {
    #[command(flatten)]
    input: InputArgs,

    /// Worksheet id within the Google Sheet (the `gid` in its URL)
    #[arg(long, value_name = "GID", requires = "sheet")]
    gid: Option<u64>,
}

#[derive(Args)]
#[group(required = true, multiple = false)]
struct InputArgs {
    /// CSV or XLSX file to read
    #[arg(long, value_name = "PATH")]
    file: Option<PathBuf>,

    /// Google Sheet key (the id in the sheet's URL)
    #[arg(long, value_name = "KEY")]
    sheet: Option<String>,
}

/// Preview a table
#[derive(Parser)]
struct ColumnsCommand {
    #[command(flatten)]
    source: SourceArgs,

    /// Number of records to show
    #[arg(long, default_value_t = 5)]
    rows: usize,
}

/// Search for an attribute of each entity
#[derive(Parser)]
struct SearchCommand {
    #[command(flatten)]
    source: SourceArgs,

    /// Column holding the entity names
    #[arg(short, long, value_name = "COLUMN")]
    column: String,

    /// What to look up for each entity (e.g. email, address)
    #[arg(short, long, value_name = "ATTRIBUTE", required_unless_present = "template")]
    field: Option<String>,

    /// Custom query text containing {entity}
    #[arg(short, long, value_name = "TEMPLATE")]
    template: Option<String>,

    /// Output CSV path, or - for stdout
    #[arg(short, long, value_name = "PATH", default_value = DEFAULT_OUTPUT_FILE)]
    output: PathBuf,

    /// Maximum number of searches for this run
    #[arg(long, value_name = "N", value_parser = parse_max_searches)]
    max_searches: Option<usize>,
}

fn main() {
    let _ = dotenvy::dotenv();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();

    let result = match &cli.command {
        Commands::Columns(cmd) => handle_columns(cmd),
        Commands::Search(cmd) => handle_search(cmd),
    };

    if let Err(e) = result {
        // Determine exit code based on error type
        let exit_code = if is_user_error(&e) { 1 } else { 2 };
        eprintln!("Error: {e:#}");
        std::process::exit(exit_code);
    }
}

/// Determines if an error is a user error (vs internal error).
///
/// User errors are missing configuration, unreadable input, unknown columns and
/// bad templates. Everything else (failing to write output, etc.) is internal.
fn is_user_error(error: &anyhow::Error) -> bool {
    error.chain().any(|cause| {
        cause.is::<ConfigError>() || cause.is::<SourceError>() || cause.is::<TemplateError>()
    })
}

fn load_config() -> Result<Config> {
    Config::from_env().context("API keys not found")
}

/// Loads records from the file or Google Sheet named on the command line.
fn load_table(args: &SourceArgs, config: &Config) -> Result<Table> {
    if let Some(path) = &args.input.file {
        return source::load_file(path)
            .with_context(|| format!("Failed to load {}", path.display()));
    }

    let key = args.input.sheet.as_deref().unwrap_or_default();
    let sheets = GoogleSheetSourceBuilder::new()
        .token(config.sheets_token())
        .build()?;
    sheets
        .fetch(key, args.gid)
        .context("Error connecting to Google Sheet")
}

/// Handles the columns command by printing a data preview.
fn handle_columns(cmd: &ColumnsCommand) -> Result<()> {
    let config = load_config()?;
    let table = load_table(&cmd.source, &config)?;
    print!("{}", format_preview(&table, cmd.rows));
    Ok(())
}

/// Renders the column list and the first `rows` records as tab-separated text.
fn format_preview(table: &Table, rows: usize) -> String {
    let mut out = format!(
        "{} records; columns: {}\n",
        table.len(),
        table.columns().join(", ")
    );
    out.push_str(&table.columns().join("\t"));
    out.push('\n');
    for record in table.preview(rows) {
        let values: Vec<String> = record.values().map(ToString::to_string).collect();
        out.push_str(&values.join("\t"));
        out.push('\n');
    }
    out
}

/// Handles the search command: load, search, save.
fn handle_search(cmd: &SearchCommand) -> Result<()> {
    let mut config = load_config()?;
    if let Some(max_searches) = cmd.max_searches {
        config = config.with_max_searches(max_searches);
    }

    let template = build_template(cmd.field.as_deref(), cmd.template.as_deref())?;
    let table = load_table(&cmd.source, &config)?;

    let client = SearchClientBuilder::from_config(&config)
        .build()
        .context("Failed to create search client")?;
    let batch = BatchSearch::from_config(Arc::new(client), &config);

    eprintln!(
        "Searching with \"{}\" over column '{}'...",
        template.as_str(),
        cmd.column
    );
    let report = execute_search(&table, &cmd.column, &template, &batch)?;

    let failed = report.failures().count();
    let rows = report.into_rows();
    eprintln!("Collected {} results ({} failed searches)", rows.len(), failed);

    save_results(&rows, &cmd.output)
}

/// Picks the custom template if given, otherwise the default sentence for `field`.
fn build_template(field: Option<&str>, template: Option<&str>) -> Result<QueryTemplate> {
    match (template, field) {
        (Some(text), _) => Ok(QueryTemplate::parse(text)?),
        (None, Some(field)) if !field.trim().is_empty() => Ok(QueryTemplate::for_attribute(field)),
        (None, _) => Err(TemplateError::EmptyAttribute.into()),
    }
}

/// Executes the batch over one column of `table`, printing progress to stderr.
///
/// This function is separated from `handle_search` to allow testing with a mock client.
fn execute_search(
    table: &Table,
    column: &str,
    template: &QueryTemplate,
    batch: &BatchSearch,
) -> Result<BatchReport> {
    let queries = queries_for(table, column, template)?;
    Ok(batch.run_with_progress(queries, print_progress))
}

fn print_progress(event: BatchEvent<'_>) {
    match event {
        BatchEvent::QueryStarted { query, .. } => eprintln!("Searching for: {}", query),
        BatchEvent::ResultFound { row, .. } => {
            eprintln!("  Title: {}", row.title());
            eprintln!("  Link: {}", row.link());
            eprintln!("  Snippet: {}", row.snippet());
        }
        BatchEvent::NoResults { query } => eprintln!("No results found for {}.", query),
        BatchEvent::QueryFailed { query, error } => eprintln!(
            "Error occurred while fetching search results for {}: {}",
            query, error
        ),
        BatchEvent::CapReached { limit } => {
            eprintln!("Reached the maximum number of searches ({})!", limit)
        }
    }
}

/// Writes results to `output`, or to stdout when it is `-`.
fn save_results(rows: &[sheetquery::ResultRow], output: &Path) -> Result<()> {
    if output == Path::new("-") {
        let stdout = std::io::stdout();
        let mut handle = sink::write_rows(rows, stdout.lock())?;
        handle.flush().context("Failed to flush stdout")?;
        return Ok(());
    }

    let path = sink::write_to_path(rows, output)
        .with_context(|| format!("Failed to save results to {}", output.display()))?;
    eprintln!("Saved search results to {}", path.display());
    Ok(())
}
