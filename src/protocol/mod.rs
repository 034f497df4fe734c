//! Protocol Module
//!
//! Defines the manager wire protocol: `Key: Value` lines, blocks ended by a
//! blank line.
//!
//! ## Request
//! ```text
//! Action: <name>\r\n
//! <Param>: <value>\r\n
//! ActionID: <prefix>-<counter>\r\n
//! \r\n
//! ```
//!
//! ## Replies
//! - Request/response: one block, ended by a blank line.
//! - Event collection: several blocks separated by blank lines, ended by a
//!   sentinel line such as `Event: PeerlistComplete` (or by read timeout).
//!
//! Keys are lowercased on receipt; on transmission they keep the caller's
//! casing (the server matches them case-insensitively).

mod codec;
mod command;
mod record;
mod reply;

pub use codec::{encode_command, parse_packet, write_command, LINE_END};
pub use command::{ActionIdGenerator, Command, ACTION, ACTION_ID};
pub use record::{Record, TRANSPORT_FIELDS};
pub use reply::{read_reply, ExchangeOptions, Outcome, Reply};

pub(crate) use reply::is_timeout;
