//! Command-line interface orchestration for plagraph.
//!
//! The `graph` command loads submissions from a JSON file, scores every
//! unresolved pair through the remote similarity service, and renders the
//! resulting graph.

mod commands;

pub use commands::{
    Cli, CliError, Command, ExecutionSummary, GraphCommand, NOT_ENOUGH_SUBMISSIONS,
    OutputFormat, SubmissionRecord, SUCCESS_MESSAGE, render_summary, run_cli,
};

#[cfg(test)]
mod test_helpers;
#[cfg(test)]
mod tests;
