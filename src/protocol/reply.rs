//! Reply reading
//!
//! The receive half of an exchange: pulls lines off a reader until the reply
//! is over and shapes what arrived into an [`Outcome`].
//!
//! Three knobs drive termination:
//! - the terminator line, which ends the whole exchange (default: blank line)
//! - the blank line, which ends one packet whenever the terminator is
//!   something else
//! - the optional event filter, which decides per packet whether to keep it
//!
//! A read timeout also ends the exchange; whatever has been gathered by then
//! is the result. So does end of stream once part of the reply has arrived.
//! End of stream before the first byte means the server hung up, and is an
//! error.

use std::io::{self, BufRead};

use super::codec::parse_packet;
use super::Record;
use crate::error::Result;

/// How to read the reply to one command
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExchangeOptions {
    terminator: String,
    event_filter: Option<String>,
    raw: bool,
}

impl ExchangeOptions {
    /// Request/response: read until the first blank line
    pub fn single() -> Self {
        Self::default()
    }

    /// Event collection: read blank-line separated packets until `terminator`
    pub fn until(terminator: impl Into<String>) -> Self {
        Self {
            terminator: terminator.into(),
            ..Self::default()
        }
    }

    /// Keep only packets whose `event` field equals `event`
    pub fn filter_event(mut self, event: impl Into<String>) -> Self {
        let event = event.into();
        self.event_filter = (!event.is_empty()).then_some(event);
        self
    }

    /// Return unparsed text instead of records
    pub fn raw(mut self) -> Self {
        self.raw = true;
        self
    }

    pub fn terminator(&self) -> &str {
        &self.terminator
    }

    pub fn event_filter(&self) -> Option<&str> {
        self.event_filter.as_deref()
    }

    pub fn is_raw(&self) -> bool {
        self.raw
    }

    /// True when the blank line both ends a packet and ends the exchange
    pub fn ends_on_blank_line(&self) -> bool {
        self.terminator.is_empty()
    }
}

/// What one exchange produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// A single reply, transport fields removed
    Record(Record),

    /// Packets collected before the terminator, in receipt order
    Records(Vec<Record>),

    /// A single reply as unparsed text
    Raw(String),

    /// Raw text of each collected packet, in receipt order. Each block keeps
    /// the blank line(s) that followed it, so concatenating the blocks gives
    /// back the text as received.
    RawBlocks(Vec<String>),
}

impl Outcome {
    pub fn as_record(&self) -> Option<&Record> {
        match self {
            Outcome::Record(record) => Some(record),
            _ => None,
        }
    }

    pub fn into_records(self) -> Vec<Record> {
        match self {
            Outcome::Record(record) => vec![record],
            Outcome::Records(records) => records,
            Outcome::Raw(_) | Outcome::RawBlocks(_) => Vec::new(),
        }
    }

    /// Number of records or raw blocks carried; an empty single reply
    /// counts as none
    pub fn len(&self) -> usize {
        match self {
            Outcome::Record(record) => usize::from(!record.is_empty()),
            Outcome::Raw(text) => usize::from(!text.is_empty()),
            Outcome::Records(records) => records.len(),
            Outcome::RawBlocks(blocks) => blocks.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// An outcome plus the `Response:` status stripped from a single reply
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reply {
    pub outcome: Outcome,

    /// `Success`, `Error`, `Follows`, ... when the outcome is a single record
    pub response: Option<String>,
}

/// Read one reply from `reader`
///
/// Timeouts are not errors here; they end the reply, as does end of stream
/// after part of the reply was read. End of stream before any byte of the
/// reply arrived is an `UnexpectedEof` I/O error. Any other I/O failure is
/// returned.
pub fn read_reply<R: BufRead>(reader: &mut R, options: &ExchangeOptions) -> Result<Reply> {
    let mut collector = Collector::new(options);
    let mut received = false;

    loop {
        let (line, end) = read_line(reader)?;

        if end == Some(StreamEnd::Closed) && !received && line.is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "manager closed the connection",
            )
            .into());
        }
        received |= !line.is_empty();

        let content = line.trim_end_matches(['\r', '\n']);

        if let Some(end) = end {
            if options.ends_on_blank_line() || content != options.terminator() {
                collector.push(&line);
            }
            tracing::trace!("Reply ended by {:?}", end);
            break;
        }

        if content == options.terminator() {
            if !options.ends_on_blank_line() {
                collector.finish_trailing_packet();
                drain_block(reader)?;
            }
            break;
        }

        if content.is_empty() {
            collector.blank_line(&line);
        } else {
            collector.push(&line);
        }
    }

    Ok(collector.into_reply())
}

// =============================================================================
// Internals
// =============================================================================

/// Why reading stopped without a terminator
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StreamEnd {
    TimedOut,
    Closed,
}

/// Read one line, including its terminator. A partial line that was cut
/// short by a timeout or end of stream is returned alongside the reason.
fn read_line<R: BufRead>(reader: &mut R) -> Result<(String, Option<StreamEnd>)> {
    let mut bytes = Vec::new();
    let end = match reader.read_until(b'\n', &mut bytes) {
        Ok(0) => Some(StreamEnd::Closed),
        Ok(_) if !bytes.ends_with(b"\n") => Some(StreamEnd::Closed),
        Ok(_) => None,
        Err(e) if is_timeout(&e) => Some(StreamEnd::TimedOut),
        Err(e) => return Err(e.into()),
    };
    Ok((String::from_utf8_lossy(&bytes).into_owned(), end))
}

/// Discard the rest of the terminator's packet so it cannot be mistaken for
/// the reply to the next command.
fn drain_block<R: BufRead>(reader: &mut R) -> Result<()> {
    let mut discarded = 0usize;
    loop {
        let (line, end) = read_line(reader)?;
        if end.is_some() || line.trim_end_matches(['\r', '\n']).is_empty() {
            break;
        }
        discarded += 1;
    }
    if discarded > 0 {
        tracing::trace!("Drained {} trailing line(s) after terminator", discarded);
    }
    Ok(())
}

pub(crate) fn is_timeout(e: &io::Error) -> bool {
    // Unix reports WouldBlock, Windows reports TimedOut
    matches!(
        e.kind(),
        io::ErrorKind::WouldBlock | io::ErrorKind::TimedOut
    )
}

/// Accumulates the current packet and the packets kept so far
struct Collector<'a> {
    options: &'a ExchangeOptions,
    buffer: String,
    /// Whether `buffer` holds anything besides blank lines
    has_content: bool,
    records: Vec<Record>,
    blocks: Vec<String>,
}

impl<'a> Collector<'a> {
    fn new(options: &'a ExchangeOptions) -> Self {
        Self {
            options,
            buffer: String::new(),
            has_content: false,
            records: Vec::new(),
            blocks: Vec::new(),
        }
    }

    fn push(&mut self, line: &str) {
        self.buffer.push_str(line);
        self.has_content |= !line.trim_end_matches(['\r', '\n']).is_empty();
    }

    /// A blank line inside an event-collection reply closes the packet.
    /// Raw mode keeps the blank line itself as the tail of the block; a run
    /// of blank lines with no packet before it leads the next block.
    fn blank_line(&mut self, line: &str) {
        if self.options.is_raw() {
            self.buffer.push_str(line);
        }
        self.finish_packet();
    }

    fn finish_packet(&mut self) {
        if !self.has_content {
            return;
        }
        self.has_content = false;
        let text = std::mem::take(&mut self.buffer);
        if self.options.is_raw() && self.options.event_filter().is_none() {
            self.blocks.push(text);
            return;
        }

        let record = parse_packet(&text);
        if let Some(wanted) = self.options.event_filter() {
            if record.event() != Some(wanted) {
                tracing::trace!("Skipping packet with event {:?}", record.event());
                return;
            }
        }

        if self.options.is_raw() {
            self.blocks.push(text);
        } else {
            self.records.push(record);
        }
    }

    /// A terminator without a preceding blank line closes the packet in
    /// progress, but only when a sequence is already being collected.
    /// Otherwise the buffer is the whole (single) reply.
    fn finish_trailing_packet(&mut self) {
        if self.records.is_empty() && self.blocks.is_empty() {
            return;
        }
        if self.has_content {
            self.finish_packet();
        } else if let Some(last) = self.blocks.last_mut() {
            last.push_str(&std::mem::take(&mut self.buffer));
        }
    }

    fn into_reply(self) -> Reply {
        if !self.blocks.is_empty() {
            return Reply {
                outcome: Outcome::RawBlocks(self.blocks),
                response: None,
            };
        }
        if !self.records.is_empty() {
            return Reply {
                outcome: Outcome::Records(self.records),
                response: None,
            };
        }
        if self.options.is_raw() {
            return Reply {
                outcome: Outcome::Raw(self.buffer),
                response: None,
            };
        }

        let mut record = parse_packet(&self.buffer);
        let response = record.take("response");
        record.take("actionid");
        Reply {
            outcome: Outcome::Record(record),
            response,
        }
    }
}
