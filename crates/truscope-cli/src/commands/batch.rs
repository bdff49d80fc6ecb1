//! Batch command implementation.

use crate::cli::BatchArgs;
use crate::error::{CliError, Result};
use crate::output::Formatter;
use crate::session::Session;
use std::fs;

/// Execute the batch command.
pub async fn execute_batch(args: BatchArgs, session: &Session, formatter: &Formatter) -> Result<()> {
    let contents = fs::read_to_string(&args.file)?;
    let claims = parse_claims(&contents);

    if claims.is_empty() {
        return Err(CliError::InvalidInput(format!("No claims found in {}", args.file)));
    }

    let reports = session.orchestrator().check_batch(&claims).await;
    println!("{}", formatter.format_reports(&reports)?);
    Ok(())
}

/// One claim per line; blank lines and `#` comments are skipped.
fn parse_claims(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
