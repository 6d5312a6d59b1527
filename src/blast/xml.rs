// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier

// Reader for BLAST XML (outfmt 5). Only the first iteration is read: the service is queried one
// sequence at a time.

use std::io::BufRead;
use std::path::Path;
use std::str::FromStr;

use quick_xml::events::Event;
use quick_xml::reader::Reader;

use crate::blast::result::{Hit, Hsp};
use crate::errors::HomologyError;

pub fn read_blast_xml_file<P: AsRef<Path>>(path: P) -> Result<Vec<Hit>, HomologyError> {
    let mut reader = Reader::from_file(path)?;
    read_hits(&mut reader)
}

pub fn read_blast_xml_str(xml: &str) -> Result<Vec<Hit>, HomologyError> {
    let mut reader = Reader::from_reader(xml.as_bytes());
    read_hits(&mut reader)
}

fn field<T: FromStr>(tag: &[u8], text: &str) -> Result<T, HomologyError> {
    text.trim().parse().map_err(|_| {
        HomologyError::Parse(format!(
            "bad <{}> value '{}'",
            String::from_utf8_lossy(tag),
            text.trim()
        ))
    })
}

fn set_hsp_field(hsp: &mut Hsp, tag: &[u8], text: &str) -> Result<(), HomologyError> {
    match tag {
        b"Hsp_evalue" => hsp.evalue = field(tag, text)?,
        b"Hsp_query-from" => hsp.query_from = field(tag, text)?,
        b"Hsp_query-to" => hsp.query_to = field(tag, text)?,
        b"Hsp_hit-from" => hsp.hit_from = field(tag, text)?,
        b"Hsp_hit-to" => hsp.hit_to = field(tag, text)?,
        b"Hsp_qseq" => hsp.qseq = text.trim().to_string(),
        b"Hsp_hseq" => hsp.hseq = text.trim().to_string(),
        // Spaces are significant in the midline (mismatch columns).
        b"Hsp_midline" => hsp.midline = text.to_string(),
        _ => {}
    }
    Ok(())
}

fn set_hit_field(hit: &mut Hit, tag: &[u8], text: &str) {
    match tag {
        b"Hit_id" => hit.id = text.trim().to_string(),
        b"Hit_def" => hit.def = text.trim().to_string(),
        b"Hit_accession" => hit.accession = text.trim().to_string(),
        _ => {}
    }
}

fn read_hits<R: BufRead>(reader: &mut Reader<R>) -> Result<Vec<Hit>, HomologyError> {
    let mut buf: Vec<u8> = Vec::new();
    let mut text = String::new();
    let mut root_open = false;
    let mut root_closed = false;
    let mut iterations = 0_usize;
    let mut hits: Vec<Hit> = Vec::new();
    let mut hit: Option<Hit> = None;
    let mut hsp: Option<Hsp> = None;

    loop {
        match reader.read_event_into(&mut buf)? {
            Event::Start(element) => {
                text.clear();
                match element.name().as_ref() {
                    b"BlastOutput" => root_open = true,
                    b"Iteration" => iterations += 1,
                    b"Hit" if iterations == 1 => hit = Some(Hit::default()),
                    b"Hsp" if hit.is_some() => hsp = Some(Hsp::default()),
                    _ => {}
                }
            }
            Event::Empty(element) => {
                if element.name().as_ref() == b"Iteration" {
                    iterations += 1;
                }
            }
            Event::Text(t) => text.push_str(&t.unescape()?),
            Event::End(element) => {
                match element.name().as_ref() {
                    b"BlastOutput" => root_closed = true,
                    b"Hsp" => {
                        if let (Some(p), Some(h)) = (hsp.take(), hit.as_mut()) {
                            h.hsps.push(p);
                        }
                    }
                    b"Hit" => {
                        if let Some(h) = hit.take() {
                            hits.push(h);
                        }
                    }
                    tag => {
                        if let Some(p) = hsp.as_mut() {
                            set_hsp_field(p, tag, &text)?;
                        } else if let Some(h) = hit.as_mut() {
                            set_hit_field(h, tag, &text);
                        }
                    }
                }
                text.clear();
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    if !root_open {
        return Err(HomologyError::Parse(String::from(
            "no <BlastOutput> element (empty or non-XML response)",
        )));
    }
    if !root_closed {
        return Err(HomologyError::Parse(String::from("truncated document")));
    }
    if iterations == 0 {
        return Err(HomologyError::Parse(String::from("no <Iteration> in BLAST output")));
    }
    Ok(hits)
}
