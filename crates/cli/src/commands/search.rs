//! Search command implementation.
//!
//! Responsibilities:
//! - Submit a search job and drive it to completion through a `ScopedSearch`.
//! - Stream items as NDJSON, or print one JSON document at the end.
//! - Report progress on stderr unless `--quiet`.
//!
//! Does NOT handle:
//! - Polling, retries or job deletion (handled by the client crate).
//!
//! Invariants:
//! - The job is deleted on every exit path: completion, error and Ctrl+C.
//! - Ctrl+C is observed even while a request is in flight; the pending batch
//!   is abandoned and the job closed.

use std::io::Write;

use anyhow::{Context, Result};
use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use serde_json::{Map, Value};
use sumo_client::{
    AutoParsingMode, CancellationToken, ClientError, Field, JobState, ResultKind, ScopedSearch,
    SearchParams, SumoClient,
};
use tracing::{info, warn};

use crate::args::OutputFormat;

/// Arguments of `sumo-cli search`.
#[derive(Debug, Clone)]
pub struct SearchArgs {
    pub query: String,
    pub from: DateTime<FixedOffset>,
    pub to: DateTime<FixedOffset>,
    pub records: bool,
    pub by_receipt_time: bool,
    pub search_timezone: Option<String>,
    pub auto_parsing_mode: Option<AutoParsingMode>,
    pub output: OutputFormat,
}

impl SearchArgs {
    fn params(&self) -> SearchParams {
        let mut params = SearchParams::new(self.query.clone(), self.from, self.to)
            .with_by_receipt_time(self.by_receipt_time);
        if let Some(tz) = &self.search_timezone {
            params = params.with_time_zone(tz.clone());
        }
        if let Some(mode) = self.auto_parsing_mode {
            params = params.with_auto_parsing_mode(mode);
        }
        params
    }

    fn kind(&self) -> ResultKind {
        if self.records {
            ResultKind::Records
        } else {
            ResultKind::Messages
        }
    }
}

/// Document printed by `--output json`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SearchOutput {
    job_id: Option<String>,
    state: Option<JobState>,
    fields: Vec<Field>,
    items: Vec<Map<String, Value>>,
}

pub async fn run(
    client: SumoClient,
    args: SearchArgs,
    quiet: bool,
    cancel: &CancellationToken,
) -> Result<()> {
    let kind = args.kind();
    info!(
        query_len = args.query.len(),
        kind = kind.as_str(),
        "Starting search"
    );

    let poller = client
        .search(args.params(), kind)
        .with_cancellation(cancel.clone());
    let mut search = ScopedSearch::new(poller);

    let mut output = SearchOutput {
        job_id: None,
        state: None,
        fields: Vec::new(),
        items: Vec::new(),
    };

    loop {
        let next = tokio::select! {
            res = search.next_batch() => res,
            _ = cancel.cancelled() => {
                info!("Search interrupted, deleting job");
                if let Err(close_err) = search.close().await {
                    warn!(error = %close_err, "Failed to delete search job after Ctrl+C");
                }
                return Err(ClientError::SearchCanceled).context("Search failed");
            }
        };

        let batch = match next {
            Ok(Some(batch)) => batch,
            Ok(None) => break,
            Err(e) => {
                // The poller already deleted the job when the search was cancelled
                if !e.is_cancellation()
                    && let Err(close_err) = search.close().await
                {
                    warn!(error = %close_err, "Failed to delete search job after error");
                }
                return Err(e).context("Search failed");
            }
        };

        if !quiet {
            let job_id = search.poller().job_id().unwrap_or("-");
            let received = batch.offset + batch.page.len() as u64;
            eprintln!(
                "job {}: {} ({} of {} {})",
                job_id,
                batch.state.state,
                received,
                batch.state.total(kind),
                kind.as_str()
            );
        }

        match args.output {
            OutputFormat::Ndjson => write_ndjson(&batch.page.items)?,
            OutputFormat::Json => {
                if !batch.page.fields.is_empty() {
                    output.fields = batch.page.fields;
                }
                output.items.extend(batch.page.items.into_iter().map(|item| item.map));
                output.state = Some(batch.state);
            }
        }
    }

    if args.output == OutputFormat::Json {
        output.job_id = search.poller().job_id().map(str::to_string);
        let json = serde_json::to_string_pretty(&output)?;
        println!("{}", json);
    }

    Ok(())
}

fn write_ndjson(items: &[sumo_client::ResultItem]) -> Result<()> {
    let mut stdout = std::io::stdout().lock();
    for item in items {
        serde_json::to_writer(&mut stdout, &item.map)?;
        stdout.write_all(b"\n")?;
    }
    stdout.flush()?;
    Ok(())
}
