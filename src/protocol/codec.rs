//! Protocol codec
//!
//! Encoding of requests and parsing of reply blocks.
//!
//! ## Wire Format
//!
//! ### Request
//! ```text
//! Action: SIPShowPeer\r\n
//! Peer: 1000\r\n
//! ActionID: 6f1c0a9e2b3d4-1718000000\r\n
//! \r\n
//! ```
//!
//! ### Reply
//! ```text
//! Response: Success\r\n
//! ActionID: 6f1c0a9e2b3d4-1718000000\r\n
//! Peer: 1000\r\n
//! \r\n
//! ```

use std::io::Write;
use std::sync::LazyLock;

use regex::Regex;

use super::{ActionIdGenerator, Command, Record, ACTION_ID};
use crate::error::Result;

/// Protocol line terminator
pub const LINE_END: &str = "\r\n";

/// A reply line: a key of letters, digits and whitespace, a colon, anything.
static FIELD_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([A-Za-z0-9\s]+):(.*)$").expect("constant regex pattern is valid")
});

// =============================================================================
// Reply Parsing
// =============================================================================

/// Parse a block of reply text into a record
///
/// Lenient by contract: lines that are not `Key: Value` shaped are skipped,
/// never reported. Repeated keys keep the last value.
pub fn parse_packet(text: &str) -> Record {
    let mut record = Record::new();

    for line in text.lines() {
        let Some(caps) = FIELD_LINE.captures(line) else {
            continue;
        };
        let key = caps[1].trim();
        if key.is_empty() {
            continue;
        }
        record.insert(key, &caps[2]);
    }

    record
}

// =============================================================================
// Command Encoding
// =============================================================================

/// Encode a command to bytes
///
/// Parameters go out in insertion order. When the command carries no
/// ActionID, one is taken from `ids` and appended last.
pub fn encode_command(command: &Command, ids: &mut ActionIdGenerator) -> Result<Vec<u8>> {
    command.validate()?;

    let mut block = String::new();
    for (name, value) in command.params() {
        push_line(&mut block, name, value);
    }
    if command.action_id().is_none() {
        push_line(&mut block, ACTION_ID, &ids.next_id());
    }
    block.push_str(LINE_END);

    Ok(block.into_bytes())
}

/// Write a command to a stream
pub fn write_command<W: Write>(
    writer: &mut W,
    command: &Command,
    ids: &mut ActionIdGenerator,
) -> Result<()> {
    let bytes = encode_command(command, ids)?;
    writer.write_all(&bytes)?;
    writer.flush()?;
    Ok(())
}

fn push_line(block: &mut String, name: &str, value: &str) {
    block.push_str(name);
    block.push_str(": ");
    block.push_str(value);
    block.push_str(LINE_END);
}
