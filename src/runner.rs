// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier

use std::path::PathBuf;

use clap::Parser;
use log::info;

use crate::blast::client::SearchClient;
use crate::blast::qblast::QBlast;
use crate::blast::request::{BlastProgram, OutputFormat, SearchParams};
use crate::config::load_config;
use crate::errors::HomologyError;
use crate::search::homology_search;

#[derive(Debug, Parser)]
#[command(version, about = "Homology search of FastA sequences against NCBI BLAST", long_about = None)]
pub(crate) struct Cli {
    /// Path to the FastA file
    #[arg(short, long)]
    fasta: String,

    /// BLAST program
    #[arg(short, long, default_value_t = BlastProgram::Blastn)]
    program: BlastProgram,

    /// E-value threshold
    #[arg(short, long, default_value_t = 0.001)]
    evalue: f64,

    /// BLAST database
    #[arg(short, long, default_value = "nt")]
    database: String,

    /// Output report filename
    #[arg(short, long, default_value = "homology_report.txt")]
    output: String,

    /// Service config file (JSON); default: ~/.homsearchconfig or ./.homsearchconfig
    #[arg(short, long)]
    config: Option<PathBuf>,
}

impl Cli {
    fn search_params(&self) -> SearchParams {
        SearchParams {
            program: self.program,
            threshold: self.evalue,
            database: self.database.clone(),
            output_format: OutputFormat::Xml,
        }
    }
}

pub fn run() -> Result<(), HomologyError> {
    env_logger::init();
    info!("Starting log");

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;
    let params = cli.search_params();
    info!(
        "{} against {} (E <= {}), service {}",
        params.program, params.database, params.threshold, config.service_url
    );

    let staging = config.staging_file.clone();
    let client = SearchClient::new(QBlast::new(config), staging);
    let report = homology_search(&cli.fasta, &params, &client)?;
    report.write_to(&cli.output)?;

    println!("Homology search results saved to: {}", cli.output);
    Ok(())
}
