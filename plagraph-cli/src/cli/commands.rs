//! Command implementations and argument parsing for the plagraph CLI.

use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, Parser, Subcommand, ValueEnum};
use plagraph_core::{
    ClusterGraphConfig, DEFAULT_COMPARISON_TIMEOUT, DEFAULT_THRESHOLD, Graph, GraphError,
    Submission,
};
use plagraph_providers_http::{
    DEFAULT_BASE_URL, DEFAULT_REQUEST_TIMEOUT, HttpScorer, HttpScorerConfig, HttpScorerError,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{Span, field, info, instrument};

/// Message reported when fewer than two submissions were loaded.
pub const NOT_ENOUGH_SUBMISSIONS: &str = "Not enough submissions to build a graph.";

/// Message reported alongside a built graph.
pub const SUCCESS_MESSAGE: &str = "Plagiarism graph generated successfully";

/// Top-level CLI options parsed by [`clap`].
#[derive(Debug, Parser, Clone)]
#[command(
    name = "plagraph",
    about = "Build similarity graphs over code submissions."
)]
pub struct Cli {
    /// Output format for the rendered graph.
    #[arg(long, value_enum, default_value_t = OutputFormat::Human, global = true)]
    pub format: OutputFormat,

    /// Command to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Supported CLI commands.
#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Score submission pairs and emit the similarity graph.
    Graph(GraphCommand),
}

/// Options accepted by the `graph` command.
#[derive(Debug, Args, Clone)]
pub struct GraphCommand {
    /// JSON file holding an array of `{id, test_id?, name, code}` records.
    pub path: PathBuf,

    /// Keep only the submissions recorded against this test.
    #[arg(long = "test-id")]
    pub test_id: Option<String>,

    /// Base URL of the similarity service.
    #[arg(long = "scorer-url", env = "PLAGRAPH_SCORER_URL", default_value = DEFAULT_BASE_URL)]
    pub scorer_url: String,

    /// Similarity percentage at which two submissions are linked.
    #[arg(long, env = "PLAGRAPH_THRESHOLD", default_value_t = DEFAULT_THRESHOLD)]
    pub threshold: f64,

    /// Seconds allowed for one comparison; `0` waits indefinitely.
    #[arg(
        long = "comparison-timeout-secs",
        default_value_t = DEFAULT_COMPARISON_TIMEOUT.as_secs(),
    )]
    pub comparison_timeout_secs: u64,

    /// Seconds allowed for the whole build.
    #[arg(long = "deadline-secs", value_parser = clap::value_parser!(u64).range(1..))]
    pub deadline_secs: Option<u64>,

    /// Seconds allowed for one HTTP exchange with the service.
    #[arg(
        long = "request-timeout-secs",
        default_value_t = DEFAULT_REQUEST_TIMEOUT.as_secs(),
        value_parser = clap::value_parser!(u64).range(1..),
    )]
    pub request_timeout_secs: u64,
}

/// Rendering styles for [`render_summary`].
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Plain-text listing of nodes, edges and clusters.
    #[default]
    Human,
    /// `{message, nodes, edges, clusters}` as JSON.
    Json,
}

/// One stored submission as it appears in the input file.
///
/// Field names also accept the document-store spelling (`_id`, `testId`,
/// `userName`), so an exported submissions collection loads as is.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SubmissionRecord {
    /// Submission identifier.
    #[serde(alias = "_id")]
    pub id: String,
    /// Test the submission was made against.
    #[serde(default, alias = "testId")]
    pub test_id: Option<String>,
    /// Author name.
    #[serde(alias = "userName")]
    pub name: String,
    /// Submitted source code.
    pub code: String,
}

impl From<SubmissionRecord> for Submission {
    fn from(record: SubmissionRecord) -> Self {
        Submission::new(record.id, record.name, record.code)
    }
}

/// Errors surfaced while executing CLI commands.
#[derive(Debug, Error)]
pub enum CliError {
    /// The submissions file could not be opened.
    #[error("failed to open `{path}`: {source}")]
    Io {
        /// Path that triggered the failure.
        path: PathBuf,
        /// Underlying operating system error.
        #[source]
        source: io::Error,
    },
    /// The submissions file was not a JSON array of submission records.
    #[error("failed to decode submissions from `{path}`: {source}")]
    Decode {
        /// Path of the offending file.
        path: PathBuf,
        /// Underlying decoding error.
        #[source]
        source: serde_json::Error,
    },
    /// The HTTP scorer could not be constructed.
    #[error(transparent)]
    Scorer(#[from] HttpScorerError),
    /// The async runtime driving the scorer could not start.
    #[error("failed to start async runtime: {0}")]
    Runtime(#[source] io::Error),
    /// Graph construction failed.
    #[error(transparent)]
    Core(#[from] GraphError),
}

/// Outcome of executing a CLI command.
#[derive(Debug, Clone, Serialize)]
pub struct ExecutionSummary {
    /// Status line shown to the user.
    pub message: String,
    /// Graph produced by the build.
    #[serde(flatten)]
    pub graph: Graph,
}

impl ExecutionSummary {
    fn from_graph(graph: Graph) -> Self {
        let message = if graph.nodes().len() < 2 {
            NOT_ENOUGH_SUBMISSIONS
        } else {
            SUCCESS_MESSAGE
        };
        Self {
            message: message.to_owned(),
            graph,
        }
    }
}

/// Executes the CLI command represented by `cli`.
///
/// # Errors
/// Returns [`CliError`] when loading, scoring, or graph construction fails.
#[instrument(
    name = "cli.run",
    err,
    skip(cli),
    fields(command = field::Empty),
)]
pub fn run_cli(cli: Cli) -> Result<ExecutionSummary, CliError> {
    match cli.command {
        Command::Graph(graph) => {
            Span::current().record("command", field::display("graph"));
            run_graph(graph)
        }
    }
}

#[instrument(
    name = "cli.graph",
    err,
    skip(command),
    fields(
        path = field::Empty,
        test_id = field::Empty,
        scorer_url = field::Empty,
        threshold = command.threshold,
    ),
)]
pub(super) fn run_graph(command: GraphCommand) -> Result<ExecutionSummary, CliError> {
    let span = Span::current();
    span.record("path", field::display(command.path.display()));
    span.record(
        "test_id",
        field::display(command.test_id.as_deref().unwrap_or("<all>")),
    );
    span.record("scorer_url", field::display(&command.scorer_url));

    let builder = graph_config(&command).into_builder()?;
    let scorer = HttpScorer::new(
        &HttpScorerConfig::new(command.scorer_url.as_str())
            .with_request_timeout(Duration::from_secs(command.request_timeout_secs)),
    )?;
    let submissions = load_submissions(&command.path, command.test_id.as_deref())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(CliError::Runtime)?;
    let graph = runtime.block_on(builder.build(&submissions, &scorer))?;

    info!(
        nodes = graph.nodes().len(),
        edges = graph.edges().len(),
        clusters = graph.clusters().len(),
        "command completed"
    );
    Ok(ExecutionSummary::from_graph(graph))
}

pub(super) fn graph_config(command: &GraphCommand) -> ClusterGraphConfig {
    let comparison_timeout =
        Some(Duration::from_secs(command.comparison_timeout_secs)).filter(|limit| !limit.is_zero());
    ClusterGraphConfig::new()
        .with_threshold(command.threshold)
        .with_comparison_timeout(comparison_timeout)
        .with_deadline(command.deadline_secs.map(Duration::from_secs))
}

#[instrument(
    name = "cli.load_submissions",
    err,
    fields(path = field::Empty, loaded = field::Empty),
)]
pub(super) fn load_submissions(
    path: &Path,
    test_id: Option<&str>,
) -> Result<Vec<Submission>, CliError> {
    let span = Span::current();
    span.record("path", field::display(path.display()));
    let file = File::open(path).map_err(|source| CliError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let records: Vec<SubmissionRecord> =
        serde_json::from_reader(BufReader::new(file)).map_err(|source| CliError::Decode {
            path: path.to_path_buf(),
            source,
        })?;

    let submissions: Vec<Submission> = records
        .into_iter()
        .filter(|record| test_id.is_none_or(|wanted| record.test_id.as_deref() == Some(wanted)))
        .map(Submission::from)
        .collect();
    span.record("loaded", submissions.len());
    Ok(submissions)
}

/// Renders `summary` to `writer` in the requested `format`.
///
/// # Errors
/// Returns [`io::Error`] if writing fails or the summary cannot be encoded.
///
/// # Examples
/// ```
/// # use std::error::Error;
/// # use plagraph_cli::cli::{ExecutionSummary, OutputFormat, render_summary};
/// # use plagraph_core::Graph;
/// #
/// # fn main() -> Result<(), Box<dyn Error>> {
/// let summary = ExecutionSummary {
///     message: "Not enough submissions to build a graph.".into(),
///     graph: Graph::default(),
/// };
/// let mut buffer = Vec::new();
/// render_summary(&summary, OutputFormat::Json, &mut buffer)?;
/// assert_eq!(
///     String::from_utf8(buffer)?,
///     "{\"message\":\"Not enough submissions to build a graph.\",\"nodes\":[],\"edges\":[],\"clusters\":[]}\n",
/// );
/// # Ok(())
/// # }
/// ```
pub fn render_summary(
    summary: &ExecutionSummary,
    format: OutputFormat,
    mut writer: impl Write,
) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            serde_json::to_writer(&mut writer, summary)?;
            writeln!(writer)
        }
        OutputFormat::Human => render_human(summary, writer),
    }
}

fn render_human(summary: &ExecutionSummary, mut writer: impl Write) -> io::Result<()> {
    let graph = &summary.graph;
    writeln!(writer, "{}", summary.message)?;
    writeln!(writer, "nodes: {}", graph.nodes().len())?;
    for node in graph.nodes() {
        writeln!(writer, "  {}\t{}", node.id, node.label)?;
    }
    writeln!(writer, "edges: {}", graph.edges().len())?;
    for edge in graph.edges() {
        writeln!(writer, "  {} -- {}\t{:.2}%", edge.from, edge.to, edge.similarity)?;
    }
    writeln!(writer, "clusters: {}", graph.clusters().len())?;
    for (index, cluster) in graph.clusters().iter().enumerate() {
        let members: Vec<String> = cluster
            .iter()
            .map(|member| format!("{} ({})", member.id, member.name))
            .collect();
        writeln!(writer, "  {index}\t{}", members.join(", "))?;
    }
    Ok(())
}
