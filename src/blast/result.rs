// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier

use itertools::{izip, Itertools};

// Columns per alignment block, as in NCBI's pairwise text output.
const LINE_WIDTH: usize = 60;

// Hit ids the service assigns to databases without their own ids; the real id is then the first
// word of the definition line.
const LOCAL_ID_PREFIX: &str = "gnl|BL_ORD_ID|";

/// A high-scoring segment pair, as found in the XML result document.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Hsp {
    pub evalue: f64,
    pub query_from: i64,
    pub query_to: i64,
    pub hit_from: i64,
    pub hit_to: i64,
    pub qseq: String,
    pub midline: String,
    pub hseq: String,
}

/// A database sequence matched by the query, with its HSPs in service order.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct Hit {
    pub id: String,
    pub def: String,
    pub accession: String,
    pub hsps: Vec<Hsp>,
}

impl Hit {
    pub fn display_id(&self) -> &str {
        if self.id.is_empty() || self.id.starts_with(LOCAL_ID_PREFIX) {
            match self.def.split_whitespace().next() {
                Some(word) => word,
                None if self.id.is_empty() => self.accession.as_str(),
                None => self.id.as_str(),
            }
        } else {
            self.id.as_str()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Alignment {
    pub hit_id: String,
    pub expect_value: f64,
    pub alignment_text: String,
}

/// Alignments for one query, in the order the service returned them. Empty means no
/// significant hits.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct SearchResult {
    pub alignments: Vec<Alignment>,
}

impl SearchResult {
    /// One alignment per hit, built from the hit's first (best) HSP. Hits without HSPs are
    /// dropped.
    pub fn from_hits(hits: &[Hit]) -> Self {
        let alignments = hits
            .iter()
            .filter_map(|hit| {
                let hsp = hit.hsps.first()?;
                Some(Alignment {
                    hit_id: hit.display_id().to_string(),
                    expect_value: hsp.evalue,
                    alignment_text: render_hsp(hsp),
                })
            })
            .collect();
        SearchResult { alignments }
    }

    pub fn is_empty(&self) -> bool {
        self.alignments.is_empty()
    }
}

fn residues(seq: &[u8]) -> i64 {
    seq.iter().filter(|&&c| c != b'-').count() as i64
}

// Coordinate increment per residue: negative on a reversed range, 3 when the coordinates are in
// nucleotides but the sequence was translated (blastx query, tblastn subject, tblastx).
fn step(from: i64, to: i64, seq: &[u8]) -> i64 {
    let span = (to - from).abs() + 1;
    let n = residues(seq);
    let scale = if n > 0 && span >= 3 * n { 3 } else { 1 };
    if from <= to {
        scale
    } else {
        -scale
    }
}

// Returns the first and last coordinates of a block and moves `pos` past it.
fn advance(pos: &mut i64, step: i64, chunk: &[u8]) -> (i64, i64) {
    let start = *pos;
    let n = residues(chunk);
    if n == 0 {
        return (start, start);
    }
    let end = start + step * (n - 1) + (step.signum() * (step.abs() - 1));
    *pos = end + step.signum();
    (start, end)
}

/// Renders an HSP as NCBI-style pairwise blocks (Query / midline / Sbjct).
pub fn render_hsp(hsp: &Hsp) -> String {
    let q_step = step(hsp.query_from, hsp.query_to, hsp.qseq.as_bytes());
    let s_step = step(hsp.hit_from, hsp.hit_to, hsp.hseq.as_bytes());
    let w = [hsp.query_from, hsp.query_to, hsp.hit_from, hsp.hit_to]
        .iter()
        .map(|n| n.to_string().len())
        .max()
        .unwrap_or(1);
    let mut q_pos = hsp.query_from;
    let mut s_pos = hsp.hit_from;

    izip!(
        hsp.qseq.as_bytes().chunks(LINE_WIDTH),
        hsp.midline.as_bytes().chunks(LINE_WIDTH),
        hsp.hseq.as_bytes().chunks(LINE_WIDTH)
    )
    .map(|(q, m, s)| {
        let (q_start, q_end) = advance(&mut q_pos, q_step, q);
        let (s_start, s_end) = advance(&mut s_pos, s_step, s);
        format!(
            "Query  {:<w$}  {}  {}\n{:pad$}{}\nSbjct  {:<w$}  {}  {}",
            q_start,
            String::from_utf8_lossy(q),
            q_end,
            "",
            String::from_utf8_lossy(m),
            s_start,
            String::from_utf8_lossy(s),
            s_end,
            w = w,
            pad = 7 + w + 2,
        )
    })
    .join("\n\n")
}
