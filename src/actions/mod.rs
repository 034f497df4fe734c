//! Actions Module
//!
//! Named manager operations. Each one is a single [`Session::exchange`]
//! with a fixed action and parameter set, followed by reshaping the generic
//! result into a domain type.
//!
//! | Operation      | Action      | Termination                  | Filter        |
//! |----------------|-------------|------------------------------|---------------|
//! | `sip_peer`     | SIPShowPeer | blank line                   | -             |
//! | `sip_peers`    | Sippeers    | `Event: PeerlistComplete`    | PeerEntry     |
//! | `queue_status` | QueueStatus | `Event: QueueStatusComplete` | -             |
//! | `db_get`       | DBGet       | `Event: DBGetComplete`       | DBGetResponse |
//! | `db_put`       | DBPut       | blank line                   | -             |
//! | `db_del`       | DBDel       | blank line                   | -             |
//! | `command`      | Command     | `--END COMMAND--`            | - (raw)       |
//! | `ping`         | Ping        | blank line                   | -             |
//!
//! [`Session::exchange`]: crate::Session::exchange

mod database;
mod queue;
mod sip;
mod system;

pub use queue::Queue;

use crate::error::{AmiError, Result};
use crate::protocol::{Record, TRANSPORT_FIELDS};

/// Fields dropped from event records before they are handed to callers
pub(crate) const EVENT_BOOKKEEPING: [&str; 3] = ["event", TRANSPORT_FIELDS[0], TRANSPORT_FIELDS[1]];

/// Succeed if the reply's message contains `expected` (case-insensitive)
pub(crate) fn expect_message(action: &str, record: Option<&Record>, expected: &str) -> Result<()> {
    let message = record.and_then(|r| r.get("message")).unwrap_or_default();
    if message.to_lowercase().contains(expected) {
        return Ok(());
    }
    Err(AmiError::ActionFailed {
        action: action.to_string(),
        message: if message.is_empty() {
            "no message in reply".to_string()
        } else {
            message.to_string()
        },
    })
}
