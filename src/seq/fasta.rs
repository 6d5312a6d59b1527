// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier

use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use crate::errors::HomologyError;
use crate::seq::file::SeqFile;
use crate::seq::record::SequenceRecord;

pub fn read_fasta_file<P: AsRef<Path>>(path: P) -> Result<SeqFile, HomologyError> {
    let file = File::open(path)?;
    read_fasta(BufReader::new(file))
}

pub fn read_fasta<R: BufRead>(reader: R) -> Result<SeqFile, HomologyError> {
    let mut result: SeqFile = Vec::new();
    let mut current_record: Option<SequenceRecord> = None;

    for (lineno, line) in reader.lines().enumerate() {
        let l: String = line?;
        if let Some(hdr) = l.strip_prefix('>') {
            if let Some(rec) = current_record.take() {
                result.push(rec);
            }
            current_record = Some(SequenceRecord::from_header(hdr));
        } else {
            let chunk = l.trim();
            match current_record.as_mut() {
                // append line to current record's sequence
                Some(rec) => rec.symbols.push_str(chunk),
                None if chunk.is_empty() => {}
                None => {
                    return Err(HomologyError::Format(format!(
                        "line {}: expected a '>' header, not FastA?",
                        lineno + 1
                    )))
                }
            }
        }
    }
    if let Some(rec) = current_record {
        result.push(rec);
    }
    Ok(result)
}
