//! Tests for reply reading
//!
//! These tests verify:
//! - Single-reply framing and bookkeeping removal
//! - Event collection with and without a filter
//! - Timeout and end-of-stream handling
//! - Raw mode

use std::io::{self, BufRead, BufReader, Cursor, Read};

use amiwire::protocol::{read_reply, ExchangeOptions, Outcome, Record};
use amiwire::AmiError;

// =============================================================================
// Helper Functions
// =============================================================================

/// Serves its data, then reports a read timeout forever
struct StallingReader {
    data: Cursor<Vec<u8>>,
}

impl Read for StallingReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = self.data.read(buf)?;
        if n == 0 {
            return Err(io::Error::new(io::ErrorKind::WouldBlock, "timed out"));
        }
        Ok(n)
    }
}

fn stalling(text: &str) -> BufReader<StallingReader> {
    BufReader::new(StallingReader {
        data: Cursor::new(text.as_bytes().to_vec()),
    })
}

fn cursor(text: &str) -> Cursor<Vec<u8>> {
    Cursor::new(text.as_bytes().to_vec())
}

fn remaining<R: BufRead>(reader: &mut R) -> String {
    let mut rest = String::new();
    let _ = reader.read_to_string(&mut rest);
    rest
}

fn record(pairs: &[(&str, &str)]) -> Record {
    pairs.iter().copied().collect()
}

const PEER_LIST: &str = "Response: Success\r\n\
ActionID: x-1\r\n\
EventList: start\r\n\
Message: Peer status list will follow\r\n\
\r\n\
Event: PeerEntry\r\n\
ActionID: x-1\r\n\
ObjectName: 1000\r\n\
Status: OK (5 ms)\r\n\
\r\n\
Event: PeerEntry\r\n\
ActionID: x-1\r\n\
ObjectName: 1001\r\n\
Status: UNKNOWN\r\n\
\r\n\
Event: PeerlistComplete\r\n\
EventList: Complete\r\n\
ListItems: 2\r\n\
ActionID: x-1\r\n\
\r\n";

// =============================================================================
// Single Reply Tests
// =============================================================================

#[test]
fn test_single_reply_strips_bookkeeping() {
    let mut reader = cursor(
        "Response: Success\r\nActionID: x-1\r\nPeer: 1000\r\nStatus: OK\r\n\r\n",
    );
    let reply = read_reply(&mut reader, &ExchangeOptions::single()).unwrap();

    assert_eq!(
        reply.outcome,
        Outcome::Record(record(&[("peer", "1000"), ("status", "OK")]))
    );
    assert_eq!(reply.response.as_deref(), Some("Success"));
}

#[test]
fn test_single_reply_stops_at_first_blank_line() {
    let mut reader = cursor("Response: Success\r\nPing: Pong\r\n\r\nEvent: Next\r\n\r\n");
    let reply = read_reply(&mut reader, &ExchangeOptions::single()).unwrap();

    assert_eq!(reply.outcome, Outcome::Record(record(&[("ping", "Pong")])));
    assert_eq!(remaining(&mut reader), "Event: Next\r\n\r\n");
}

#[test]
fn test_single_reply_without_response_field() {
    let mut reader = cursor("Message: hello\r\n\r\n");
    let reply = read_reply(&mut reader, &ExchangeOptions::single()).unwrap();

    assert_eq!(reply.outcome, Outcome::Record(record(&[("message", "hello")])));
    assert_eq!(reply.response, None);
}

#[test]
fn test_end_of_stream_is_best_effort() {
    let mut reader = cursor("Response: Success\r\nMessage: cut");
    let reply = read_reply(&mut reader, &ExchangeOptions::single()).unwrap();

    assert_eq!(reply.outcome, Outcome::Record(record(&[("message", "cut")])));
}

#[test]
fn test_end_of_stream_before_any_byte_is_an_error() {
    let mut reader = cursor("");
    match read_reply(&mut reader, &ExchangeOptions::single()) {
        Err(AmiError::Io(e)) => assert_eq!(e.kind(), io::ErrorKind::UnexpectedEof),
        other => panic!("Expected an end-of-stream error, got {:?}", other),
    }

    let mut reader = cursor("");
    let options = ExchangeOptions::until("--END COMMAND--").raw();
    assert!(read_reply(&mut reader, &options).is_err());
}

#[test]
fn test_timeout_with_no_data_yields_empty_record() {
    let mut reader = stalling("");
    let reply = read_reply(&mut reader, &ExchangeOptions::single()).unwrap();

    assert_eq!(reply.outcome, Outcome::Record(Record::new()));
    assert_eq!(reply.outcome.len(), 0);
    assert!(reply.outcome.is_empty());
}

#[test]
fn test_outcome_counts_only_what_arrived() {
    let mut reader = stalling("");
    let options = ExchangeOptions::single().raw();
    let outcome = read_reply(&mut reader, &options).unwrap().outcome;
    assert_eq!(outcome, Outcome::Raw(String::new()));
    assert!(outcome.is_empty());

    let mut reader = cursor("Response: Success\r\nPing: Pong\r\n\r\n");
    let outcome = read_reply(&mut reader, &ExchangeOptions::single()).unwrap().outcome;
    assert_eq!(outcome.len(), 1);
}

#[test]
fn test_timeout_keeps_partial_line() {
    let mut reader = stalling("Response: Success\r\nPeer: 1000\r\nStatus: O");
    let reply = read_reply(&mut reader, &ExchangeOptions::single()).unwrap();

    assert_eq!(
        reply.outcome,
        Outcome::Record(record(&[("peer", "1000"), ("status", "O")]))
    );
}

#[test]
fn test_other_io_errors_propagate() {
    struct Broken;
    impl Read for Broken {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::ConnectionReset, "reset"))
        }
    }

    let mut reader = BufReader::new(Broken);
    assert!(read_reply(&mut reader, &ExchangeOptions::single()).is_err());
}

// =============================================================================
// Event Collection Tests
// =============================================================================

#[test]
fn test_unfiltered_collection_keeps_every_block() {
    let mut reader = cursor(PEER_LIST);
    let options = ExchangeOptions::until("Event: PeerlistComplete");
    let records = match read_reply(&mut reader, &options).unwrap().outcome {
        Outcome::Records(records) => records,
        other => panic!("Expected records, got {:?}", other),
    };

    // The leading status block is kept, not trimmed as "informational"
    assert_eq!(records.len(), 3);
    assert_eq!(records[0].get("message"), Some("Peer status list will follow"));
    assert_eq!(records[1].get("objectname"), Some("1000"));
    assert_eq!(records[2].get("objectname"), Some("1001"));
}

#[test]
fn test_filtered_collection_keeps_matching_events_in_order() {
    let mut reader = cursor(PEER_LIST);
    let options = ExchangeOptions::until("Event: PeerlistComplete").filter_event("PeerEntry");
    let records = read_reply(&mut reader, &options).unwrap().outcome.into_records();

    let names: Vec<&str> = records.iter().filter_map(|r| r.get("objectname")).collect();
    assert_eq!(names, vec!["1000", "1001"]);
    // Collected records keep their event and bookkeeping fields
    assert_eq!(records[0].event(), Some("PeerEntry"));
    assert_eq!(records[0].get("actionid"), Some("x-1"));
}

#[test]
fn test_empty_filter_means_no_filter() {
    let mut reader = cursor(PEER_LIST);
    let options = ExchangeOptions::until("Event: PeerlistComplete").filter_event("");
    assert_eq!(options.event_filter(), None);
    assert_eq!(read_reply(&mut reader, &options).unwrap().outcome.len(), 3);
}

#[test]
fn test_filter_matches_event_value_exactly() {
    let mut reader = cursor(PEER_LIST);
    let options = ExchangeOptions::until("Event: PeerlistComplete").filter_event("peerentry");
    let reply = read_reply(&mut reader, &options).unwrap();

    // Nothing kept: falls back to the (empty) trailing buffer
    assert_eq!(reply.outcome, Outcome::Record(Record::new()));
}

#[test]
fn test_terminator_packet_is_drained() {
    let text = format!("{}Response: Success\r\nPing: Pong\r\n\r\n", PEER_LIST);
    let mut reader = cursor(&text);
    let options = ExchangeOptions::until("Event: PeerlistComplete");
    read_reply(&mut reader, &options).unwrap();

    assert_eq!(remaining(&mut reader), "Response: Success\r\nPing: Pong\r\n\r\n");
}

#[test]
fn test_terminator_must_match_whole_line() {
    let text = "Event: A\r\n\r\nEvent: PeerlistCompleteish\r\n\r\nEvent: PeerlistComplete\r\n\r\n";
    let mut reader = cursor(text);
    let options = ExchangeOptions::until("Event: PeerlistComplete");
    let records = read_reply(&mut reader, &options).unwrap().outcome.into_records();

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].event(), Some("PeerlistCompleteish"));
}

#[test]
fn test_consecutive_blank_lines_are_not_packets() {
    let text = "Event: A\r\n\r\n\r\n\r\nEvent: B\r\n\r\nEvent: Done\r\n\r\n";
    let mut reader = cursor(text);
    let options = ExchangeOptions::until("Event: Done");
    assert_eq!(read_reply(&mut reader, &options).unwrap().outcome.len(), 2);
}

#[test]
fn test_timeout_mid_stream_returns_collected_blocks() {
    let text = "Event: QueueParams\r\nQueue: sales\r\n\r\n\
Event: QueueMember\r\nQueue: sales\r\nName: Alice\r\n\r\n\
Event: QueueMember\r\nQueue: sa";
    let mut reader = stalling(text);
    let options = ExchangeOptions::until("Event: QueueStatusComplete");
    let records = match read_reply(&mut reader, &options).unwrap().outcome {
        Outcome::Records(records) => records,
        other => panic!("Expected records, got {:?}", other),
    };

    assert_eq!(records.len(), 2);
    assert_eq!(records[1].get("name"), Some("Alice"));
}

#[test]
fn test_unterminated_collection_without_blocks_is_single_record() {
    let mut reader = stalling("Response: Error\r\nMessage: Database entry not found\r\n");
    let options = ExchangeOptions::until("Event: DBGetComplete").filter_event("DBGetResponse");
    let reply = read_reply(&mut reader, &options).unwrap();

    assert_eq!(
        reply.outcome,
        Outcome::Record(record(&[("message", "Database entry not found")]))
    );
    assert_eq!(reply.response.as_deref(), Some("Error"));
}

// =============================================================================
// Raw Mode Tests
// =============================================================================

#[test]
fn test_raw_single_reply() {
    let mut reader = cursor("Response: Success\r\nPing: Pong\r\n\r\n");
    let reply = read_reply(&mut reader, &ExchangeOptions::single().raw()).unwrap();

    assert_eq!(
        reply.outcome,
        Outcome::Raw("Response: Success\r\nPing: Pong\r\n".to_string())
    );
}

#[test]
fn test_raw_until_end_marker() {
    let text = "Response: Follows\r\nPrivilege: Command\r\n\
Asterisk 18.0.0 built by root\n--END COMMAND--\r\n\r\n";
    let mut reader = cursor(text);
    let options = ExchangeOptions::until("--END COMMAND--").raw();

    assert_eq!(
        read_reply(&mut reader, &options).unwrap().outcome,
        Outcome::Raw(
            "Response: Follows\r\nPrivilege: Command\r\nAsterisk 18.0.0 built by root\n"
                .to_string()
        )
    );
    assert_eq!(remaining(&mut reader), "");
}

#[test]
fn test_terminator_closes_trailing_packet_of_a_sequence() {
    let text = "first\r\n\r\nsecond\r\n--END COMMAND--\r\n\r\n";
    let mut reader = cursor(text);
    let options = ExchangeOptions::until("--END COMMAND--").raw();

    assert_eq!(
        read_reply(&mut reader, &options).unwrap().outcome,
        Outcome::RawBlocks(vec!["first\r\n\r\n".to_string(), "second\r\n".to_string()])
    );
}

#[test]
fn test_raw_blocks_with_filter() {
    let text = "Response: Success\r\n\r\nEvent: DBGetResponse\r\nVal: 42\r\n\r\nEvent: DBGetComplete\r\n\r\n";
    let mut reader = cursor(text);
    let options = ExchangeOptions::until("Event: DBGetComplete")
        .filter_event("DBGetResponse")
        .raw();

    assert_eq!(
        read_reply(&mut reader, &options).unwrap().outcome,
        Outcome::RawBlocks(vec!["Event: DBGetResponse\r\nVal: 42\r\n\r\n".to_string()])
    );
}

#[test]
fn test_raw_blocks_keep_blank_line_runs_verbatim() {
    let output = "Response: Follows\r\nPrivilege: Command\r\nline a\n\n\nline b\n";
    let text = format!("{}--END COMMAND--\r\n\r\n", output);
    let mut reader = cursor(&text);
    let options = ExchangeOptions::until("--END COMMAND--").raw();

    let blocks = match read_reply(&mut reader, &options).unwrap().outcome {
        Outcome::RawBlocks(blocks) => blocks,
        other => panic!("Expected raw blocks, got {:?}", other),
    };
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks.concat(), output);
    assert_eq!(remaining(&mut reader), "");
}

#[test]
fn test_raw_blank_lines_before_terminator_are_kept() {
    let output = "first\r\n\r\nsecond\n\n\n";
    let text = format!("{}--END COMMAND--\r\n\r\n", output);
    let mut reader = cursor(&text);
    let options = ExchangeOptions::until("--END COMMAND--").raw();

    match read_reply(&mut reader, &options).unwrap().outcome {
        Outcome::RawBlocks(blocks) => assert_eq!(blocks.concat(), output),
        other => panic!("Expected raw blocks, got {:?}", other),
    }
}

#[test]
fn test_invalid_utf8_does_not_fail() {
    let mut bytes = b"Response: Success\r\nCallerIDName: ".to_vec();
    bytes.extend_from_slice(&[0xff, 0xfe]);
    bytes.extend_from_slice(b"\r\n\r\n");
    let mut reader = Cursor::new(bytes);

    let reply = read_reply(&mut reader, &ExchangeOptions::single()).unwrap();
    assert!(reply.outcome.as_record().unwrap().contains_key("calleridname"));
}
