//! Output formatting for command results.
//!
//! Text output is one human-readable line per item; JSON output is a single
//! document per invocation.

use crate::config::OutputFormat;
use crate::error::DbError;
use crate::tools::Outcome;
use serde_json::json;
use std::io::{self, Write};

pub fn format_outcome(outcome: &Outcome, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => format_outcome_text(outcome),
        OutputFormat::Json => serde_json::to_string_pretty(outcome).unwrap_or_default() + "\n",
    }
}

pub fn format_error(err: &DbError, format: OutputFormat) -> String {
    match format {
        OutputFormat::Text => {
            let mut output = format!("error: {}\n", err);
            if let Some(suggestion) = err.suggestion() {
                output.push_str(&format!("hint: {}\n", suggestion));
            }
            output
        }
        OutputFormat::Json => {
            let body = json!({
                "error": {
                    "kind": err.kind(),
                    "message": err.to_string(),
                    "suggestion": err.suggestion(),
                }
            });
            serde_json::to_string_pretty(&body).unwrap_or_default() + "\n"
        }
    }
}

pub fn write_outcome<W: Write>(
    out: &mut W,
    outcome: &Outcome,
    format: OutputFormat,
) -> io::Result<()> {
    out.write_all(format_outcome(outcome, format).as_bytes())?;
    out.flush()
}

pub fn write_error<W: Write>(out: &mut W, err: &DbError, format: OutputFormat) -> io::Result<()> {
    out.write_all(format_error(err, format).as_bytes())?;
    out.flush()
}

fn format_outcome_text(outcome: &Outcome) -> String {
    let mut output = String::new();

    match outcome {
        Outcome::Databases { databases } => {
            output.push_str("databases:\n");
            push_names(&mut output, databases);
        }
        Outcome::Collections {
            database,
            collections,
        } => {
            output.push_str(&format!("collections in database {}:\n", database));
            push_names(&mut output, collections);
        }
        Outcome::Indexes { collections, .. } => {
            let blocks: Vec<String> = collections
                .iter()
                .map(|entry| {
                    let mut block = format!("indexes on collection {}:\n", entry.collection);
                    for index in &entry.indexes {
                        block.push_str(&format!(
                            "- {} | unique = {}\n",
                            index.name, index.unique
                        ));
                    }
                    block
                })
                .collect();
            output.push_str(&blocks.join("\n"));
        }
        Outcome::IndexCreated { name, .. } => {
            output.push_str(&format!("index created: {}\n", name));
        }
        Outcome::IndexDropped {
            collection, name, ..
        } => {
            output.push_str(&format!(
                "index dropped: {} (collection {})\n",
                name, collection
            ));
        }
    }

    output
}

fn push_names(output: &mut String, names: &[String]) {
    for name in names {
        output.push_str(&format!("- {}\n", name));
    }
}
