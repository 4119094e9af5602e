//! Invocation pipeline: parse → connect → dispatch → disconnect → print.

use crate::VERSION;
use crate::cli::{self, Invocation};
use crate::config::OutputFormat;
use crate::db::with_session;
use crate::error::{DbError, DbResult, EXIT_FAILURE, EXIT_SUCCESS};
use crate::tools::{OperationDispatcher, Outcome, write_error, write_outcome};
use std::ffi::OsString;
use std::io::Write;
use tracing::error;

/// Line printed for `-version`.
pub fn version_line() -> String {
    format!("mlongo version v{}", VERSION)
}

/// Route `args` and execute the resulting invocation, writing to `out`.
///
/// Returns the process exit status.
pub async fn run<I, T, W>(args: I, out: &mut W) -> u8
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
    W: Write,
{
    execute(cli::route(args), out).await
}

/// Execute an already routed invocation.
pub async fn execute<W: Write>(invocation: DbResult<Invocation>, out: &mut W) -> u8 {
    let (config, command) = match invocation {
        Ok(Invocation::Run { config, command }) => (config, command),
        Ok(Invocation::Version) => return print_text(out, &(version_line() + "\n")),
        Ok(Invocation::Help(text)) => return print_text(out, &text),
        Err(err) => return report(out, Err(err), OutputFormat::Text),
    };

    let max_time = config.max_time_duration();
    let result = with_session(&config, async |session| {
        OperationDispatcher::new(session, max_time)
            .dispatch(&command)
            .await
    })
    .await;

    report(out, result, config.format)
}

/// Print a command result and map it to an exit status.
pub fn report<W: Write>(out: &mut W, result: DbResult<Outcome>, format: OutputFormat) -> u8 {
    let (written, code) = match &result {
        Ok(outcome) => (write_outcome(out, outcome, format), EXIT_SUCCESS),
        Err(err) => {
            error!(kind = err.kind(), error = %err, "Command failed");
            (write_error(out, err, format), err.exit_code())
        }
    };

    match written {
        Ok(()) => code,
        Err(io_err) => {
            let err = DbError::from(io_err);
            error!(error = %err, "Could not write result");
            EXIT_FAILURE
        }
    }
}

fn print_text<W: Write>(out: &mut W, text: &str) -> u8 {
    match out.write_all(text.as_bytes()).and_then(|_| out.flush()) {
        Ok(()) => EXIT_SUCCESS,
        Err(io_err) => {
            error!(error = %io_err, "Could not write output");
            EXIT_FAILURE
        }
    }
}
