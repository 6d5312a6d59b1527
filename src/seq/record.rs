// A record for query sequences: the FastA id (first word of the header) and the raw sequence.
// The rest of the header line is not kept. The alphabet is not checked.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceRecord {
    pub id: String,
    pub symbols: String,
}

impl SequenceRecord {
    pub fn from_header(header: &str) -> Self {
        let id = header.split_whitespace().next().unwrap_or("");
        SequenceRecord {
            id: id.to_string(),
            symbols: String::new(),
        }
    }
}
