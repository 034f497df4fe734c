//! Queue status with nested members
//!
//! `QueueStatus` streams one `QueueParams` event per queue, then its
//! `QueueMember` and `QueueEntry` events, all tagged with a `Queue` field.
//! They are grouped here under their queue.

use std::collections::BTreeMap;

use super::EVENT_BOOKKEEPING;
use crate::error::Result;
use crate::protocol::{Command, ExchangeOptions, Record};
use crate::session::Session;

/// One queue: its parameters, members by name, and waiting callers
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Queue {
    /// The `QueueParams` record (strategy, calls, holdtime, ...)
    pub params: Record,

    /// Members keyed by member name, sorted
    pub members: BTreeMap<String, Record>,

    /// Waiting callers in queue position order
    pub entries: Vec<Record>,
}

impl Queue {
    pub fn name(&self) -> Option<&str> {
        self.params.get("queue")
    }
}

/// Queues under construction; members may arrive for a queue whose params
/// were never seen, so parents are tracked separately.
#[derive(Default)]
struct Grouping {
    params: BTreeMap<String, Record>,
    members: BTreeMap<String, BTreeMap<String, Record>>,
    entries: BTreeMap<String, Vec<Record>>,
}

impl Grouping {
    fn add(&mut self, record: Record) {
        let Some(queue) = record.get("queue").map(str::to_string) else {
            return;
        };
        let event = record.event().unwrap_or_default().to_string();
        let record = record.without(&EVENT_BOOKKEEPING);

        match event.as_str() {
            "QueueParams" => {
                self.params.insert(queue, record);
            }
            "QueueMember" => {
                let name = member_name(&record);
                self.members.entry(queue).or_default().insert(name, record);
            }
            "QueueEntry" => {
                self.entries.entry(queue).or_default().push(record);
            }
            other => tracing::trace!("Ignoring {} event for queue {}", other, queue),
        }
    }

    /// Only queues with a params record are emitted
    fn finish(mut self) -> BTreeMap<String, Queue> {
        let mut queues = BTreeMap::new();
        for (name, params) in self.params {
            let members = self.members.remove(&name).unwrap_or_default();
            let mut entries = self.entries.remove(&name).unwrap_or_default();
            entries.sort_by_key(position);
            queues.insert(
                name,
                Queue {
                    params,
                    members,
                    entries,
                },
            );
        }

        for orphan in self.members.keys().chain(self.entries.keys()) {
            tracing::debug!("Dropping members of queue {} with no QueueParams", orphan);
        }
        queues
    }
}

fn member_name(record: &Record) -> String {
    record
        .get("name")
        .or_else(|| record.get("membername"))
        .or_else(|| record.get("location"))
        .unwrap_or_default()
        .to_string()
}

fn position(record: &Record) -> u64 {
    record
        .get("position")
        .and_then(|p| p.parse().ok())
        .unwrap_or(u64::MAX)
}

impl Session {
    /// All queues with their members and waiting callers, keyed by queue name
    pub fn queue_status(&mut self) -> Result<BTreeMap<String, Queue>> {
        let command = Command::new("QueueStatus");
        let options = ExchangeOptions::until("Event: QueueStatusComplete");
        let outcome = self.exchange(&command, &options)?;

        let mut grouping = Grouping::default();
        for record in outcome.into_records() {
            grouping.add(record);
        }
        Ok(grouping.finish())
    }
}
