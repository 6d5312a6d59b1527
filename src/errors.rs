// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier

use std::{fmt, io};

#[derive(Debug)]
pub enum HomologyError {
    Io(io::Error),
    Format(String),
    Xml(quick_xml::Error),
    Http(Box<ureq::Error>),
    Service(String),
    Parse(String),
}

// These allow conversion to HomologyError, required for main() to return Result<()> and for '?'
// to work.

impl From<io::Error> for HomologyError {
    fn from(e: io::Error) -> Self {
        HomologyError::Io(e)
    }
}

impl From<quick_xml::Error> for HomologyError {
    fn from(e: quick_xml::Error) -> Self {
        HomologyError::Xml(e)
    }
}

impl From<ureq::Error> for HomologyError {
    fn from(e: ureq::Error) -> Self {
        HomologyError::Http(Box::new(e))
    }
}

impl From<serde_json::Error> for HomologyError {
    fn from(e: serde_json::Error) -> Self {
        HomologyError::Format(format!("invalid config: {}", e))
    }
}

impl fmt::Display for HomologyError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HomologyError::Io(e) => write!(f, "I/O error: {}", e),
            HomologyError::Format(msg) => write!(f, "Format error: {}", msg),
            HomologyError::Xml(e) => write!(f, "XML error: {}", e),
            HomologyError::Http(e) => write!(f, "HTTP error: {}", e),
            HomologyError::Service(msg) => write!(f, "BLAST service error: {}", msg),
            HomologyError::Parse(msg) => write!(f, "Malformed BLAST result: {}", msg),
        }
    }
}
