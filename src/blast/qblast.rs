// SPDX-License-Identifier: MIT
// Copyright (c) 2025 Thomas Junier

// Client for the NCBI BLAST URL API ("QBlast"): submit with CMD=Put, poll CMD=Get with
// FORMAT_OBJECT=SearchInfo until the request is ready, then fetch the result document.
// Polling follows NCBI's usage guidelines: at most one status request per RID per poll interval,
// and never more than one request every 10 seconds.

use std::{
    io::{self, Write},
    thread,
    time::{Duration, Instant},
};

use itertools::Itertools;
use log::{debug, info};
use regex::Regex;

use crate::blast::client::BlastService;
use crate::blast::request::SearchRequest;
use crate::config::ServiceConfig;
use crate::errors::HomologyError;

pub const MIN_POLL_INTERVAL_SECS: u64 = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchStatus {
    Waiting,
    Ready,
    Failed,
    Unknown,
}

fn capture(pattern: &str, text: &str) -> Option<String> {
    let re = Regex::new(pattern).ok()?;
    let caps = re.captures(text)?;
    Some(caps.get(1)?.as_str().trim().to_string())
}

// Text of an HTML fragment on one line: tags dropped, runs of whitespace collapsed.
fn plain_text(fragment: &str) -> Option<String> {
    let tags = Regex::new(r"<[^>]*>").ok()?;
    let text = tags.replace_all(fragment, " ").split_whitespace().join(" ");
    (!text.is_empty()).then_some(text)
}

/// Extracts the request id and the estimated time to completion (seconds) from the reply to a
/// CMD=Put request.
pub fn parse_put_reply(page: &str) -> Result<(String, u64), HomologyError> {
    let Some(rid) = capture(r"RID = (\S+)", page) else {
        let msg = capture(r#"(?s)<div class="error msInf">(.*?)</div>"#, page)
            .or_else(|| capture(r#"(?s)<p class="error">(.*?)</p>"#, page))
            .and_then(|fragment| plain_text(&fragment))
            .unwrap_or_else(|| String::from("no RID in reply"));
        return Err(HomologyError::Service(msg));
    };
    let rtoe = capture(r"RTOE = (\d+)", page)
        .and_then(|s| s.parse().ok())
        .unwrap_or(0);
    Ok((rid, rtoe))
}

/// Reads the `Status=` line of a SearchInfo page, if there is one.
pub fn parse_search_info(page: &str) -> Option<SearchStatus> {
    let status = capture(r"Status=(\w+)", page)?;
    Some(match status.as_str() {
        "WAITING" => SearchStatus::Waiting,
        "READY" => SearchStatus::Ready,
        "FAILED" => SearchStatus::Failed,
        _ => SearchStatus::Unknown,
    })
}

/// The HTTP round trips QBlast needs. Pairs are sent as form fields (POST) or as the query
/// string (GET).
pub trait Transport {
    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<String, HomologyError>;
    fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, HomologyError>;
    /// Streams the response body to `out`, returning its length.
    fn get_into(
        &self,
        url: &str,
        query: &[(&str, &str)],
        out: &mut dyn Write,
    ) -> Result<u64, HomologyError>;
}

pub struct HttpTransport {
    agent: ureq::Agent,
}

impl HttpTransport {
    pub fn new(user_agent: &str) -> Self {
        let agent = ureq::AgentBuilder::new().user_agent(user_agent).build();
        HttpTransport { agent }
    }

    fn get(&self, url: &str, query: &[(&str, &str)]) -> ureq::Request {
        query
            .iter()
            .fold(self.agent.get(url), |req, (key, value)| req.query(key, value))
    }
}

impl Transport for HttpTransport {
    fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<String, HomologyError> {
        Ok(self.agent.post(url).send_form(form)?.into_string()?)
    }

    fn get_text(&self, url: &str, query: &[(&str, &str)]) -> Result<String, HomologyError> {
        Ok(self.get(url, query).call()?.into_string()?)
    }

    fn get_into(
        &self,
        url: &str,
        query: &[(&str, &str)],
        out: &mut dyn Write,
    ) -> Result<u64, HomologyError> {
        let mut body = self.get(url, query).call()?.into_reader();
        Ok(io::copy(&mut body, out)?)
    }
}

pub struct QBlast<T = HttpTransport> {
    transport: T,
    config: ServiceConfig,
    poll_floor: Duration,
}

impl QBlast<HttpTransport> {
    pub fn new(config: ServiceConfig) -> Self {
        let user_agent = format!("{}/{}", config.tool, env!("CARGO_PKG_VERSION"));
        QBlast::with_transport(HttpTransport::new(&user_agent), config)
    }
}

impl<T: Transport> QBlast<T> {
    pub fn with_transport(transport: T, config: ServiceConfig) -> Self {
        QBlast {
            transport,
            config,
            poll_floor: Duration::from_secs(MIN_POLL_INTERVAL_SECS),
        }
    }

    fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.config.poll_interval_secs).max(self.poll_floor)
    }

    fn put(&self, request: &SearchRequest) -> Result<(String, u64), HomologyError> {
        let program = request.program.to_string();
        let expect = request.threshold.to_string();
        let hitlist = self.config.hitlist_size.to_string();
        let mut form: Vec<(&str, &str)> = vec![
            ("CMD", "Put"),
            ("PROGRAM", program.as_str()),
            ("DATABASE", request.database),
            ("QUERY", request.query),
            ("EXPECT", expect.as_str()),
            ("FORMAT_TYPE", request.output_format.format_type()),
            ("HITLIST_SIZE", hitlist.as_str()),
            ("TOOL", self.config.tool.as_str()),
        ];
        if let Some(email) = &self.config.email {
            form.push(("EMAIL", email.as_str()));
        }
        let page = self.transport.post_form(&self.config.service_url, &form)?;
        parse_put_reply(&page)
    }

    fn wait_until_ready(&self, rid: &str, rtoe: u64) -> Result<(), HomologyError> {
        let started = Instant::now();
        let poll = self.poll_interval();
        let mut pause = Duration::from_secs(rtoe).max(self.poll_floor).min(poll);
        loop {
            if let Some(max) = self.config.max_wait_secs {
                if started.elapsed() + pause >= Duration::from_secs(max) {
                    return Err(HomologyError::Service(format!(
                        "gave up waiting for RID {} after {} s",
                        rid, max
                    )));
                }
            }
            debug!("RID {}: sleeping {:?}", rid, pause);
            thread::sleep(pause);
            pause = poll;

            let query = [("CMD", "Get"), ("FORMAT_OBJECT", "SearchInfo"), ("RID", rid)];
            let page = self.transport.get_text(&self.config.service_url, &query)?;
            match parse_search_info(&page) {
                Some(SearchStatus::Waiting) => continue,
                Some(SearchStatus::Ready) => return Ok(()),
                Some(SearchStatus::Failed) => {
                    return Err(HomologyError::Service(format!("search {} failed", rid)))
                }
                Some(SearchStatus::Unknown) => {
                    return Err(HomologyError::Service(format!(
                        "search {} expired or unknown",
                        rid
                    )))
                }
                None => {
                    debug!("RID {}: no status in SearchInfo page, fetching results", rid);
                    return Ok(());
                }
            }
        }
    }
}

impl<T: Transport> BlastService for QBlast<T> {
    fn submit(&self, request: &SearchRequest, out: &mut dyn Write) -> Result<u64, HomologyError> {
        let (rid, rtoe) = self.put(request)?;
        info!("Submitted {} search, RID {} (estimated {} s)", request.program, rid, rtoe);
        self.wait_until_ready(&rid, rtoe)?;
        let query = [
            ("CMD", "Get"),
            ("FORMAT_TYPE", request.output_format.format_type()),
            ("RID", rid.as_str()),
        ];
        let len = self
            .transport
            .get_into(&self.config.service_url, &query, out)?;
        debug!("RID {}: {} bytes of results", rid, len);
        Ok(len)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::blast::request::{BlastProgram, OutputFormat, SearchParams};
    use crate::seq::record::SequenceRecord;
    use std::cell::RefCell;
    use std::collections::VecDeque;

    const PUT_REPLY: &str = r#"<html><body>
<!--QBlastInfoBegin
    RID = 7XK3YF8M013
    RTOE = 27
QBlastInfoEnd
--></body></html>"#;

    const DOCUMENT: &str = "<?xml version=\"1.0\"?>\n<BlastOutput></BlastOutput>\n";

    type Pairs = Vec<(String, String)>;

    // Answers every round trip from canned pages and records what was sent, in order.
    struct CannedTransport {
        put_reply: &'static str,
        status_pages: RefCell<VecDeque<&'static str>>,
        sent: RefCell<Vec<(&'static str, Pairs)>>,
    }

    impl CannedTransport {
        fn new(put_reply: &'static str, status_pages: &[&'static str]) -> Self {
            CannedTransport {
                put_reply,
                status_pages: RefCell::new(status_pages.iter().copied().collect()),
                sent: RefCell::new(Vec::new()),
            }
        }

        fn record(&self, method: &'static str, pairs: &[(&str, &str)]) {
            let pairs = pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect();
            self.sent.borrow_mut().push((method, pairs));
        }
    }

    impl Transport for CannedTransport {
        fn post_form(&self, url: &str, form: &[(&str, &str)]) -> Result<String, HomologyError> {
            assert_eq!(url, "https://blast.example.org/Blast.cgi");
            self.record("POST", form);
            Ok(self.put_reply.to_string())
        }

        fn get_text(&self, _url: &str, query: &[(&str, &str)]) -> Result<String, HomologyError> {
            self.record("GET", query);
            match self.status_pages.borrow_mut().pop_front() {
                Some(page) => Ok(page.to_string()),
                None => Err(HomologyError::Service(String::from("polled too often"))),
            }
        }

        fn get_into(
            &self,
            _url: &str,
            query: &[(&str, &str)],
            out: &mut dyn Write,
        ) -> Result<u64, HomologyError> {
            self.record("GET", query);
            out.write_all(DOCUMENT.as_bytes())?;
            Ok(DOCUMENT.len() as u64)
        }
    }

    fn config() -> ServiceConfig {
        ServiceConfig {
            service_url: String::from("https://blast.example.org/Blast.cgi"),
            poll_interval_secs: 0,
            ..Default::default()
        }
    }

    fn qblast(transport: CannedTransport, config: ServiceConfig) -> QBlast<CannedTransport> {
        let mut qblast = QBlast::with_transport(transport, config);
        qblast.poll_floor = Duration::ZERO;
        qblast
    }

    fn submit(qblast: &QBlast<CannedTransport>) -> (Result<u64, HomologyError>, Vec<u8>) {
        let params = SearchParams {
            program: BlastProgram::Blastp,
            threshold: 0.01,
            database: String::from("swissprot"),
            output_format: OutputFormat::Xml,
        };
        let mut rec = SequenceRecord::from_header("q1");
        rec.symbols.push_str("MKVLAA");
        let mut out = Vec::new();
        let res = qblast.submit(&SearchRequest::new(&params, &rec), &mut out);
        (res, out)
    }

    fn value<'a>(pairs: &'a Pairs, key: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn test_parse_put_reply() {
        let (rid, rtoe) = parse_put_reply(PUT_REPLY).unwrap();
        assert_eq!(rid, "7XK3YF8M013");
        assert_eq!(rtoe, 27);
    }

    #[test]
    fn test_parse_put_reply_without_rtoe() {
        let (rid, rtoe) = parse_put_reply("QBlastInfoBegin\n RID = ABC\nQBlastInfoEnd").unwrap();
        assert_eq!(rid, "ABC");
        assert_eq!(rtoe, 0);
    }

    #[test]
    fn test_parse_put_reply_error_message() {
        let page = concat!(
            r#"<html><div class="error msInf">"#,
            r#"Message ID#24 Error: Database "zz" not found</div></html>"#
        );
        match parse_put_reply(page) {
            Err(HomologyError::Service(msg)) => {
                assert_eq!(msg, r#"Message ID#24 Error: Database "zz" not found"#)
            }
            other => panic!("expected service error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_put_reply_multiline_error_markup() {
        let page = "<html><div class=\"error msInf\">\n  <b>Message ID#29 Error:</b>\n\
                    \tQuery contains   no sequence data\n</div></html>";
        match parse_put_reply(page) {
            Err(HomologyError::Service(msg)) => {
                assert_eq!(msg, "Message ID#29 Error: Query contains no sequence data")
            }
            other => panic!("expected service error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_put_reply_empty_error_markup() {
        match parse_put_reply("<p class=\"error\"> <br/> </p>") {
            Err(HomologyError::Service(msg)) => assert_eq!(msg, "no RID in reply"),
            other => panic!("expected service error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_put_reply_no_rid() {
        match parse_put_reply("<html>Server busy</html>") {
            Err(HomologyError::Service(msg)) => assert_eq!(msg, "no RID in reply"),
            other => panic!("expected service error, got {:?}", other),
        }
    }

    #[test]
    fn test_parse_search_info() {
        let page = "QBlastInfoBegin\n\tStatus=WAITING\nQBlastInfoEnd";
        assert_eq!(parse_search_info(page), Some(SearchStatus::Waiting));
        let page = "QBlastInfoBegin\n\tStatus=READY\nQBlastInfoEnd\n\
                    QBlastInfoBegin\n\tThereAreHits=yes\nQBlastInfoEnd";
        assert_eq!(parse_search_info(page), Some(SearchStatus::Ready));
        assert_eq!(parse_search_info("Status=FAILED"), Some(SearchStatus::Failed));
        assert_eq!(parse_search_info("Status=UNKNOWN"), Some(SearchStatus::Unknown));
        assert_eq!(parse_search_info("<html></html>"), None);
    }

    #[test]
    fn test_poll_interval_floor() {
        let config = ServiceConfig {
            poll_interval_secs: 1,
            ..Default::default()
        };
        let qblast = QBlast::new(config);
        assert_eq!(qblast.poll_interval(), Duration::from_secs(MIN_POLL_INTERVAL_SECS));
    }

    #[test]
    fn test_submit_waits_then_fetches_document() {
        let transport = CannedTransport::new(PUT_REPLY, &["Status=WAITING", "Status=READY"]);
        let qblast = qblast(transport, config());
        let (res, out) = submit(&qblast);
        assert_eq!(res.unwrap(), DOCUMENT.len() as u64);
        assert_eq!(String::from_utf8(out).unwrap(), DOCUMENT);

        let sent = qblast.transport.sent.borrow();
        assert_eq!(sent.len(), 4);
        assert_eq!(sent[0].0, "POST");
        assert_eq!(value(&sent[0].1, "CMD"), Some("Put"));
        for (method, pairs) in &sent[1..3] {
            assert_eq!(*method, "GET");
            assert_eq!(value(pairs, "CMD"), Some("Get"));
            assert_eq!(value(pairs, "FORMAT_OBJECT"), Some("SearchInfo"));
            assert_eq!(value(pairs, "RID"), Some("7XK3YF8M013"));
        }
        assert_eq!(value(&sent[3].1, "CMD"), Some("Get"));
        assert_eq!(value(&sent[3].1, "FORMAT_TYPE"), Some("XML"));
        assert_eq!(value(&sent[3].1, "RID"), Some("7XK3YF8M013"));
        assert_eq!(value(&sent[3].1, "FORMAT_OBJECT"), None);
    }

    #[test]
    fn test_submit_put_form_fields() {
        let config = ServiceConfig {
            email: Some(String::from("someone@example.org")),
            tool: String::from("homsearch-tests"),
            hitlist_size: 20,
            ..config()
        };
        let qblast = qblast(CannedTransport::new(PUT_REPLY, &["Status=READY"]), config);
        let (res, _) = submit(&qblast);
        assert!(res.is_ok());

        let sent = qblast.transport.sent.borrow();
        let form = &sent[0].1;
        assert_eq!(value(form, "CMD"), Some("Put"));
        assert_eq!(value(form, "PROGRAM"), Some("blastp"));
        assert_eq!(value(form, "DATABASE"), Some("swissprot"));
        assert_eq!(value(form, "QUERY"), Some("MKVLAA"));
        assert_eq!(value(form, "EXPECT"), Some("0.01"));
        assert_eq!(value(form, "FORMAT_TYPE"), Some("XML"));
        assert_eq!(value(form, "HITLIST_SIZE"), Some("20"));
        assert_eq!(value(form, "TOOL"), Some("homsearch-tests"));
        assert_eq!(value(form, "EMAIL"), Some("someone@example.org"));
    }

    #[test]
    fn test_submit_put_form_without_email() {
        let qblast = qblast(CannedTransport::new(PUT_REPLY, &["Status=READY"]), config());
        let (res, _) = submit(&qblast);
        assert!(res.is_ok());
        let sent = qblast.transport.sent.borrow();
        assert_eq!(value(&sent[0].1, "EMAIL"), None);
    }

    #[test]
    fn test_submit_failed_search() {
        let transport = CannedTransport::new(PUT_REPLY, &["Status=WAITING", "Status=FAILED"]);
        let qblast = qblast(transport, config());
        let (res, out) = submit(&qblast);
        match res {
            Err(HomologyError::Service(msg)) => assert_eq!(msg, "search 7XK3YF8M013 failed"),
            other => panic!("expected service error, got {:?}", other),
        }
        assert!(out.is_empty());
        // no fetch after a failure
        assert_eq!(qblast.transport.sent.borrow().len(), 3);
    }

    #[test]
    fn test_submit_unknown_search() {
        let qblast = qblast(CannedTransport::new(PUT_REPLY, &["Status=UNKNOWN"]), config());
        let (res, out) = submit(&qblast);
        match res {
            Err(HomologyError::Service(msg)) => {
                assert_eq!(msg, "search 7XK3YF8M013 expired or unknown")
            }
            other => panic!("expected service error, got {:?}", other),
        }
        assert!(out.is_empty());
    }

    #[test]
    fn test_submit_gives_up_after_max_wait() {
        let config = ServiceConfig {
            max_wait_secs: Some(0),
            ..config()
        };
        let qblast = qblast(CannedTransport::new(PUT_REPLY, &["Status=READY"]), config);
        let (res, out) = submit(&qblast);
        match res {
            Err(HomologyError::Service(msg)) => {
                assert_eq!(msg, "gave up waiting for RID 7XK3YF8M013 after 0 s")
            }
            other => panic!("expected service error, got {:?}", other),
        }
        assert!(out.is_empty());
        // only the Put went out
        assert_eq!(qblast.transport.sent.borrow().len(), 1);
    }

    #[test]
    fn test_submit_rejected_put() {
        let page = r#"<div class="error msInf">Database "zz" not found</div>"#;
        let qblast = qblast(CannedTransport::new(page, &[]), config());
        let (res, _) = submit(&qblast);
        match res {
            Err(HomologyError::Service(msg)) => assert_eq!(msg, r#"Database "zz" not found"#),
            other => panic!("expected service error, got {:?}", other),
        }
        assert_eq!(qblast.transport.sent.borrow().len(), 1);
    }
}
