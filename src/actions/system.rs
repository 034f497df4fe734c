//! CLI passthrough and liveness

use crate::error::{AmiError, Result};
use crate::protocol::{Command, ExchangeOptions, Outcome};
use crate::session::Session;

/// Line that ends the output of a `Command` action
pub const END_COMMAND: &str = "--END COMMAND--";

impl Session {
    /// Run a CLI command on the server and return its raw output
    pub fn command(&mut self, cli: &str) -> Result<String> {
        let command = Command::new("Command").param("Command", cli);
        let options = ExchangeOptions::until(END_COMMAND).raw();

        match self.exchange(&command, &options)? {
            Outcome::Raw(text) => Ok(text),
            // Blank lines inside the output split it into blocks that keep them
            Outcome::RawBlocks(blocks) => Ok(blocks.concat()),
            other => Err(AmiError::transport(format!(
                "unexpected reply shape for Command: {:?}",
                other
            ))),
        }
    }

    /// Check that the server answers
    pub fn ping(&mut self) -> Result<()> {
        let reply = self.exchange_reply(&Command::new("Ping"), &ExchangeOptions::single())?;

        let pong = reply
            .outcome
            .as_record()
            .and_then(|record| record.get("ping"))
            .is_some_and(|value| value.eq_ignore_ascii_case("pong"));
        let success = reply
            .response
            .as_deref()
            .is_some_and(|status| status.eq_ignore_ascii_case("success"));

        if pong || success {
            return Ok(());
        }
        Err(AmiError::ActionFailed {
            action: "Ping".to_string(),
            message: reply
                .outcome
                .as_record()
                .and_then(|record| record.get("message"))
                .unwrap_or("no pong in reply")
                .to_string(),
        })
    }
}
