//! SIP peer lookups

use std::collections::BTreeMap;

use super::EVENT_BOOKKEEPING;
use crate::error::Result;
use crate::protocol::{Command, ExchangeOptions, Outcome, Record};
use crate::session::Session;

impl Session {
    /// Details of one SIP peer, or `None` if the server does not know it
    pub fn sip_peer(&mut self, peer: &str) -> Result<Option<Record>> {
        let command = Command::new("SIPShowPeer").param("Peer", peer);
        let reply = self.exchange_reply(&command, &ExchangeOptions::single())?;

        if reply
            .response
            .as_deref()
            .is_some_and(|status| status.eq_ignore_ascii_case("error"))
        {
            tracing::debug!("SIP peer {} not found", peer);
            return Ok(None);
        }

        match reply.outcome {
            Outcome::Record(record) if !record.is_empty() => Ok(Some(record)),
            _ => Ok(None),
        }
    }

    /// All SIP peers keyed by object name (as sent by the server), sorted
    pub fn sip_peers(&mut self) -> Result<BTreeMap<String, Record>> {
        let command = Command::new("Sippeers");
        let options = ExchangeOptions::until("Event: PeerlistComplete").filter_event("PeerEntry");
        let outcome = self.exchange(&command, &options)?;

        let mut peers = BTreeMap::new();
        for record in outcome.into_records() {
            // A lone status reply (no PeerEntry kept) has no object name
            let Some(name) = record.get("objectname").map(str::to_string) else {
                continue;
            };
            peers.insert(name, record.without(&EVENT_BOOKKEEPING));
        }
        Ok(peers)
    }
}
