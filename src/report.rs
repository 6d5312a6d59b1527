// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier

use std::fs;
use std::path::Path;

use crate::blast::client::SearchOutcome;
use crate::blast::request::SearchParams;
use crate::errors::HomologyError;

// Rewrites a Rust exponent (`1.23e-5`, `1e16`) as signed and at least two digits (`1.23e-05`,
// `1e+16`).
fn pad_exponent(s: String) -> String {
    match s.split_once('e') {
        Some((mantissa, exp)) => match exp.parse::<i32>() {
            Ok(exp) => format!(
                "{}e{}{:02}",
                mantissa,
                if exp < 0 { '-' } else { '+' },
                exp.abs()
            ),
            Err(_) => s,
        },
        // plain decimals; inf, NaN
        None => s.to_lowercase(),
    }
}

/// Scientific notation with two decimals and an explicitly signed, at least two-digit exponent,
/// e.g. `1.23e-05`.
pub fn format_evalue(evalue: f64) -> String {
    pad_exponent(format!("{:.2e}", evalue))
}

/// Shortest round-tripping form of the threshold: plain decimal from 1e-4 up to 1e16, otherwise
/// scientific with the exponent written as in `format_evalue` (`0.001`, `10.0`, `1e-05`).
pub fn format_threshold(threshold: f64) -> String {
    pad_exponent(format!("{:?}", threshold))
}

/// The plain-text report, built up one query at a time in input order and written once.
#[derive(Debug)]
pub struct Report {
    text: String,
    num_queries: usize,
}

impl Report {
    pub fn new(fasta_path: &str, params: &SearchParams) -> Self {
        let text = format!(
            "Homology Search Report for: {}\nBLAST Program: {}\nE-value Threshold: {}\nDatabase: {}\n\n",
            fasta_path,
            params.program,
            format_threshold(params.threshold),
            params.database
        );
        Report {
            text,
            num_queries: 0,
        }
    }

    pub fn add_query(&mut self, query_id: &str, outcome: &SearchOutcome) {
        self.num_queries += 1;
        self.text.push_str(&format!("**Query Sequence ID: {}**\n", query_id));
        match outcome {
            Ok(result) if result.is_empty() => {
                self.text.push_str("\tNo significant hits found for this query.\n\n");
            }
            Ok(result) => {
                for aln in &result.alignments {
                    self.text.push_str(&format!(
                        "\tHit ID: {}\n\tE-value: {}\n\t**Alignment:**\n{}\n\n",
                        aln.hit_id,
                        format_evalue(aln.expect_value),
                        aln.alignment_text
                    ));
                }
            }
            Err(e) => {
                self.text.push_str(&format!("\tError: {}\n\n", e));
            }
        }
    }

    pub fn num_queries(&self) -> usize {
        self.num_queries
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P) -> Result<(), HomologyError> {
        fs::write(path, &self.text)?;
        Ok(())
    }
}
