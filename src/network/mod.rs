//! Network Module
//!
//! TCP connection handling for the manager socket.
//!
//! ## Model
//! - One blocking stream per session
//! - Every read bounded by the configured read timeout
//! - No background threads

mod connection;

pub use connection::Connection;
