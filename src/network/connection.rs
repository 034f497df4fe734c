//! Manager Connection
//!
//! Owns the TCP stream to one manager endpoint.

use std::io::{BufRead, BufReader, BufWriter, Write};
use std::net::{Shutdown, SocketAddr, TcpStream, ToSocketAddrs};
use std::time::Duration;

use crate::config::Config;
use crate::error::{AmiError, Result};
use crate::protocol::is_timeout;

/// A connected manager socket
pub struct Connection {
    /// TCP stream reader (buffered for line reads)
    reader: BufReader<TcpStream>,

    /// TCP stream writer (buffered so a request goes out in one write)
    writer: BufWriter<TcpStream>,

    /// Peer address for logging
    peer_addr: String,

    /// Greeting line sent by the server on connect, if any
    banner: Option<String>,
}

impl Connection {
    /// Connect to the configured endpoint
    ///
    /// Tries every address `host:port` resolves to, each bounded by the
    /// connect timeout. On success applies the read/write timeouts and
    /// consumes the greeting banner.
    pub fn open(config: &Config) -> Result<Self> {
        let addr = config.addr();
        let stream = connect_any(&addr, config.connect_timeout())?;

        let peer_addr = stream
            .peer_addr()
            .map(|a| a.to_string())
            .unwrap_or_else(|_| addr.clone());

        // Disable Nagle's algorithm; requests are small and latency bound
        stream.set_nodelay(true)?;

        let read_stream = stream.try_clone()?;
        let write_stream = stream;

        let mut connection = Self {
            reader: BufReader::new(read_stream),
            writer: BufWriter::new(write_stream),
            peer_addr,
            banner: None,
        };
        connection.set_timeouts(config.read_timeout(), config.write_timeout())?;
        connection.banner = connection.read_banner()?;

        tracing::debug!(
            "Connected to {} ({})",
            connection.peer_addr,
            connection.banner.as_deref().unwrap_or("no banner")
        );
        Ok(connection)
    }

    /// Configure connection timeouts. A zero duration leaves that
    /// direction blocking.
    pub fn set_timeouts(&mut self, read: Duration, write: Duration) -> Result<()> {
        if !read.is_zero() {
            self.reader.get_ref().set_read_timeout(Some(read))?;
        }
        if !write.is_zero() {
            self.writer.get_ref().set_write_timeout(Some(write))?;
        }
        Ok(())
    }

    /// Write bytes and flush them to the socket
    pub fn send(&mut self, bytes: &[u8]) -> Result<()> {
        self.writer.write_all(bytes)?;
        self.writer.flush()?;
        Ok(())
    }

    /// The buffered read side, for reply reading
    pub fn reader(&mut self) -> &mut BufReader<TcpStream> {
        &mut self.reader
    }

    /// Get the peer address string
    pub fn peer_addr(&self) -> &str {
        &self.peer_addr
    }

    pub fn banner(&self) -> Option<&str> {
        self.banner.as_deref()
    }

    /// Close both directions of the socket
    pub fn shutdown(&mut self) {
        let _ = self.writer.flush();
        if let Err(e) = self.writer.get_ref().shutdown(Shutdown::Both) {
            tracing::trace!("Shutdown of {} reported: {}", self.peer_addr, e);
        }
    }

    /// The server announces itself with one line, e.g.
    /// `Asterisk Call Manager/5.0.1`
    fn read_banner(&mut self) -> Result<Option<String>> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(_) => {}
            Err(e) if is_timeout(&e) => {
                tracing::debug!("No banner from {} within read timeout", self.peer_addr);
            }
            Err(e) => return Err(e.into()),
        }
        let line = line.trim();
        Ok((!line.is_empty()).then(|| line.to_string()))
    }
}

fn connect_any(addr: &str, timeout: Duration) -> Result<TcpStream> {
    let candidates: Vec<SocketAddr> = addr
        .to_socket_addrs()
        .map_err(|source| AmiError::Connect {
            addr: addr.to_string(),
            source,
        })?
        .collect();

    let mut last_error = None;
    for candidate in candidates {
        match TcpStream::connect_timeout(&candidate, timeout) {
            Ok(stream) => return Ok(stream),
            Err(e) => {
                tracing::debug!("Connect to {} failed: {}", candidate, e);
                last_error = Some(e);
            }
        }
    }

    Err(AmiError::Connect {
        addr: addr.to_string(),
        source: last_error.unwrap_or_else(|| {
            std::io::Error::new(
                std::io::ErrorKind::AddrNotAvailable,
                "host resolved to no addresses",
            )
        }),
    })
}
