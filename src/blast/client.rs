// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::debug;

use crate::blast::request::SearchRequest;
use crate::blast::result::SearchResult;
use crate::blast::xml::read_blast_xml_file;
use crate::errors::HomologyError;

/// A homology search service: runs one search and writes the raw result document to `out`,
/// returning the number of bytes written.
pub trait BlastService {
    fn submit(&self, request: &SearchRequest, out: &mut dyn Write) -> Result<u64, HomologyError>;
}

/// Either the alignments found for a query, or why the search failed.
pub type SearchOutcome = Result<SearchResult, HomologyError>;

pub struct SearchClient<S> {
    service: S,
    staging_path: PathBuf,
}

impl<S: BlastService> SearchClient<S> {
    pub fn new<P: AsRef<Path>>(service: S, staging_path: P) -> Self {
        SearchClient {
            service,
            staging_path: staging_path.as_ref().to_path_buf(),
        }
    }

    pub fn staging_path(&self) -> &Path {
        &self.staging_path
    }

    /// Runs one search. The result document is streamed to a local file, overwriting the
    /// previous query's, and parsed back from there.
    pub fn search(&self, request: &SearchRequest) -> SearchOutcome {
        let mut staged = BufWriter::new(File::create(&self.staging_path)?);
        let len = self.service.submit(request, &mut staged)?;
        staged.flush()?;
        drop(staged);
        debug!("Staged {} bytes to {}", len, self.staging_path.display());
        let hits = read_blast_xml_file(&self.staging_path)?;
        Ok(SearchResult::from_hits(&hits))
    }
}
