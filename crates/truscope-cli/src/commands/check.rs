//! Check command implementation.

use crate::cli::CheckArgs;
use crate::error::Result;
use crate::output::Formatter;
use crate::session::Session;

/// Execute the check command.
pub async fn execute_check(args: CheckArgs, session: &Session, formatter: &Formatter) -> Result<()> {
    let report = session
        .orchestrator()
        .perform_tiered_check(&args.claim, args.context.as_deref())
        .await;

    println!("{}", formatter.format_report(&report)?);
    Ok(())
}
