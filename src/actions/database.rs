//! AstDB family/key storage

use crate::error::Result;
use crate::protocol::{Command, ExchangeOptions, Outcome};
use crate::session::Session;

impl Session {
    /// Value stored under `family/key`, or `None` if there is none
    pub fn db_get(&mut self, family: &str, key: &str) -> Result<Option<String>> {
        let command = Command::new("DBGet")
            .param("Family", family)
            .param("Key", key);
        let options = ExchangeOptions::until("Event: DBGetComplete").filter_event("DBGetResponse");

        // A missing entry yields an error reply and no DBGetResponse, which
        // arrives here as a single (non-event) record.
        match self.exchange(&command, &options)? {
            Outcome::Records(records) => Ok(records
                .first()
                .and_then(|record| record.get("val"))
                .map(str::to_string)),
            _ => Ok(None),
        }
    }

    /// Store `value` under `family/key`
    pub fn db_put(&mut self, family: &str, key: &str, value: &str) -> Result<()> {
        let command = Command::new("DBPut")
            .param("Family", family)
            .param("Key", key)
            .param("Val", value);
        let outcome = self.exchange(&command, &ExchangeOptions::single())?;
        super::expect_message("DBPut", outcome.as_record(), "updated database successfully")
    }

    /// Remove `family/key`
    pub fn db_del(&mut self, family: &str, key: &str) -> Result<()> {
        let command = Command::new("DBDel")
            .param("Family", family)
            .param("Key", key);
        let outcome = self.exchange(&command, &ExchangeOptions::single())?;
        super::expect_message("DBDel", outcome.as_record(), "key deleted successfully")
    }
}
