// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier

use log::{info, warn};

use crate::blast::client::{BlastService, SearchClient};
use crate::blast::request::{SearchParams, SearchRequest};
use crate::errors::HomologyError;
use crate::report::Report;
use crate::seq::fasta::read_fasta_file;

/// Searches every sequence of `fasta_path`, one at a time and in file order, and collects the
/// outcomes into a report. A failed search is recorded in the report and the run goes on; only
/// problems reading the input file are returned as errors.
pub fn homology_search<S: BlastService>(
    fasta_path: &str,
    params: &SearchParams,
    client: &SearchClient<S>,
) -> Result<Report, HomologyError> {
    let records = read_fasta_file(fasta_path)?;
    info!("Read {} sequence(s) from {}", records.len(), fasta_path);

    let mut report = Report::new(fasta_path, params);
    for (i, record) in records.iter().enumerate() {
        info!("Query {}/{}: {}", i + 1, records.len(), record.id);
        let outcome = client.search(&SearchRequest::new(params, record));
        match &outcome {
            Ok(result) => info!("{}: {} alignment(s)", record.id, result.alignments.len()),
            Err(e) => warn!("{}: {}", record.id, e),
        }
        report.add_query(&record.id, &outcome);
    }
    Ok(report)
}
