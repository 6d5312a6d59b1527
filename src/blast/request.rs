// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier

use std::fmt;

use clap::ValueEnum;

use crate::seq::record::SequenceRecord;

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum BlastProgram {
    #[clap(name = "blastn")]
    Blastn,
    #[clap(name = "blastp")]
    Blastp,
    #[clap(name = "blastx")]
    Blastx,
    #[clap(name = "tblastn")]
    Tblastn,
    #[clap(name = "tblastx")]
    Tblastx,
}

impl fmt::Display for BlastProgram {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            BlastProgram::Blastn => "blastn",
            BlastProgram::Blastp => "blastp",
            BlastProgram::Blastx => "blastx",
            BlastProgram::Tblastn => "tblastn",
            BlastProgram::Tblastx => "tblastx",
        };
        write!(f, "{}", s)
    }
}

/// Result document format requested from the service. Only XML (BLAST outfmt 5) is parsed.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Xml,
}

impl OutputFormat {
    /// BLAST+ `-outfmt` code.
    pub fn code(&self) -> u8 {
        match self {
            OutputFormat::Xml => 5,
        }
    }

    /// Value of the URL API's `FORMAT_TYPE` parameter.
    pub fn format_type(&self) -> &'static str {
        match self {
            OutputFormat::Xml => "XML",
        }
    }
}

/// Search parameters shared by every query of a run.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchParams {
    pub program: BlastProgram,
    pub threshold: f64,
    pub database: String,
    pub output_format: OutputFormat,
}

/// One query, as sent to the service.
#[derive(Clone, Debug, PartialEq)]
pub struct SearchRequest<'a> {
    pub program: BlastProgram,
    pub query: &'a str,
    pub threshold: f64,
    pub database: &'a str,
    pub output_format: OutputFormat,
}

impl<'a> SearchRequest<'a> {
    pub fn new(params: &'a SearchParams, record: &'a SequenceRecord) -> Self {
        SearchRequest {
            program: params.program,
            query: &record.symbols,
            threshold: params.threshold,
            database: &params.database,
            output_format: params.output_format,
        }
    }
}
