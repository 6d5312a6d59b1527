// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier

use std::{
    cell::RefCell,
    collections::HashMap,
    fs::File,
    io::{self, Write},
    path::PathBuf,
};

use homsearch::{
    blast::{
        client::BlastService,
        request::{BlastProgram, OutputFormat, SearchParams, SearchRequest},
    },
    errors::HomologyError,
};

pub enum Reply {
    Document(&'static str),
    Failure(&'static str),
}

// Stands in for the remote service: replies are looked up by query sequence, and every query is
// recorded in the order it was submitted.
pub struct MockService {
    replies: HashMap<String, Reply>,
    pub queries: RefCell<Vec<String>>,
}

impl MockService {
    pub fn new() -> Self {
        MockService {
            replies: HashMap::new(),
            queries: RefCell::new(Vec::new()),
        }
    }

    pub fn reply(mut self, query: &str, reply: Reply) -> Self {
        self.replies.insert(query.to_string(), reply);
        self
    }
}

impl BlastService for &MockService {
    fn submit(&self, request: &SearchRequest, out: &mut dyn Write) -> Result<u64, HomologyError> {
        self.queries.borrow_mut().push(request.query.to_string());
        match self.replies.get(request.query) {
            Some(Reply::Document(path)) => Ok(io::copy(&mut File::open(path)?, out)?),
            Some(Reply::Failure(msg)) => Err(HomologyError::Service(msg.to_string())),
            None => Err(HomologyError::Service(format!(
                "no canned reply for {}",
                request.query
            ))),
        }
    }
}

#[allow(dead_code)]
pub fn default_params() -> SearchParams {
    SearchParams {
        program: BlastProgram::Blastn,
        threshold: 0.001,
        database: String::from("nt"),
        output_format: OutputFormat::Xml,
    }
}

// Per-test scratch file name, so that tests may run in parallel.
#[allow(dead_code)]
pub fn scratch_path(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!("homsearch-it-{}-{}", std::process::id(), name))
}

// Splits a report into its per-query sections (header block excluded).
#[allow(dead_code)]
pub fn sections(report: &str) -> Vec<&str> {
    report.split("**Query Sequence ID: ").skip(1).collect()
}
