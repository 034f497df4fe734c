//! Session Module
//!
//! The protocol session engine: one authenticated connection and the
//! generic send/receive exchange every action is built on.
//!
//! ## Responsibilities
//! - Connect and log in; a session that fails to log in is closed
//! - Tag each command with a per-session ActionID
//! - Read the reply with the caller's termination, filter and raw settings
//! - Release the socket and wipe credentials on every exit path

use crate::config::Config;
use crate::error::{AmiError, Result};
use crate::network::Connection;
use crate::protocol::{
    encode_command, read_reply, ActionIdGenerator, Command, ExchangeOptions, Outcome, Reply,
};

/// Message fragment the server sends on a successful login
const AUTH_ACCEPTED: &str = "authentication accepted";

/// A manager session
///
/// ## Concurrency Model: one exchange at a time
///
/// There is no demultiplexing of interleaved replies, so only one command may
/// be outstanding. `exchange` takes `&mut self`, which makes a second,
/// overlapping exchange on the same session impossible to express.
pub struct Session {
    /// Endpoint, timeouts and credentials
    config: Config,

    /// `None` once closed or after a failed login
    connection: Option<Connection>,

    /// ActionID source for commands that carry none
    ids: ActionIdGenerator,

    /// Whether Login succeeded (controls the Logoff on close)
    authenticated: bool,

    /// Outcome of the most recent exchange (diagnostics)
    last_result: Option<Outcome>,

    /// `Response:` value of the most recent single-record reply
    last_response: Option<String>,
}

impl Session {
    /// Connect and log in
    ///
    /// Fails with a connect error if the socket cannot be opened, and with
    /// an auth error if the login is not accepted.
    pub fn connect(config: Config) -> Result<Self> {
        let mut session = Self::open(config)?;
        session.authenticate()?;
        Ok(session)
    }

    /// Open the connection without logging in
    fn open(config: Config) -> Result<Self> {
        config.validate()?;
        tracing::debug!("Opening manager session to {}", config.addr());
        let connection = Connection::open(&config)?;

        Ok(Self {
            config,
            connection: Some(connection),
            ids: ActionIdGenerator::new(),
            authenticated: false,
            last_result: None,
            last_response: None,
        })
    }

    /// Log in with the configured credentials, events off
    ///
    /// Any failure closes the connection.
    fn authenticate(&mut self) -> Result<()> {
        let command = Command::new("Login")
            .param("Username", self.config.username.as_str())
            .param("Secret", self.config.secret.as_str())
            .param("Events", "off");

        let reply = match self.exchange_reply(&command, &ExchangeOptions::single()) {
            Ok(reply) => reply,
            Err(e) => {
                self.close();
                return Err(AmiError::Auth(format!("login exchange failed: {}", e)));
            }
        };

        let message = reply
            .outcome
            .as_record()
            .and_then(|record| record.get("message"))
            .map(str::to_string);

        match message {
            Some(message) if message.to_lowercase().contains(AUTH_ACCEPTED) => {
                self.authenticated = true;
                tracing::info!(
                    "Logged in to {} as {}",
                    self.config.addr(),
                    self.config.username
                );
                Ok(())
            }
            other => {
                self.close();
                let reason = other.unwrap_or_else(|| "no message in login reply".to_string());
                tracing::warn!("Login to {} rejected: {}", self.config.addr(), reason);
                Err(AmiError::Auth(reason))
            }
        }
    }

    /// Send one command and read its reply
    pub fn exchange(&mut self, command: &Command, options: &ExchangeOptions) -> Result<Outcome> {
        self.exchange_reply(command, options).map(|reply| reply.outcome)
    }

    /// Like [`Session::exchange`], also returning the stripped `Response:`
    /// status of a single-record reply
    ///
    /// An I/O failure while sending or reading, including the server hanging
    /// up before replying, closes the connection; later calls fail fast with
    /// a transport error.
    pub fn exchange_reply(&mut self, command: &Command, options: &ExchangeOptions) -> Result<Reply> {
        let connection = self
            .connection
            .as_mut()
            .ok_or_else(|| AmiError::transport("no open manager connection"))?;

        let bytes = encode_command(command, &mut self.ids)?;

        tracing::debug!(
            "Sending {} to {} (terminator {:?}, filter {:?}, raw {})",
            command.action(),
            connection.peer_addr(),
            options.terminator(),
            options.event_filter(),
            options.is_raw()
        );
        let received = connection
            .send(&bytes)
            .and_then(|()| read_reply(connection.reader(), options));
        let reply = match received {
            Ok(reply) => reply,
            Err(e @ AmiError::Io(_)) => {
                self.drop_connection(&e);
                return Err(e);
            }
            Err(e) => return Err(e),
        };
        tracing::trace!("{} reply: {} item(s)", command.action(), reply.outcome.len());

        self.last_result = Some(reply.outcome.clone());
        self.last_response = reply.response.clone();
        Ok(reply)
    }

    /// Outcome of the most recent exchange
    pub fn last_result(&self) -> Option<&Outcome> {
        self.last_result.as_ref()
    }

    /// `Response:` status of the most recent single-record reply
    pub fn last_response(&self) -> Option<&str> {
        self.last_response.as_deref()
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated && self.connection.is_some()
    }

    /// Greeting line the server sent on connect
    pub fn banner(&self) -> Option<&str> {
        self.connection.as_ref().and_then(Connection::banner)
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Close the connection; logs off first if logged in. Idempotent.
    pub fn close(&mut self) {
        let Some(mut connection) = self.connection.take() else {
            return;
        };

        if self.authenticated {
            let logoff = Command::new("Logoff");
            match encode_command(&logoff, &mut self.ids) {
                Ok(bytes) => {
                    if let Err(e) = connection.send(&bytes) {
                        tracing::debug!("Logoff to {} not delivered: {}", connection.peer_addr(), e);
                    }
                }
                Err(e) => tracing::debug!("Logoff not encoded: {}", e),
            }
        }

        connection.shutdown();
        self.authenticated = false;
        tracing::debug!("Closed manager session to {}", self.config.addr());
    }

    /// Forget a connection that failed mid-exchange; no Logoff is attempted
    fn drop_connection(&mut self, cause: &AmiError) {
        if let Some(mut connection) = self.connection.take() {
            tracing::warn!(
                "Lost manager connection to {}: {}",
                connection.peer_addr(),
                cause
            );
            connection.shutdown();
        }
        self.authenticated = false;
    }
}

impl Drop for Session {
    fn drop(&mut self) {
        self.close();
        self.config.clear_credentials();
    }
}
