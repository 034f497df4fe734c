//! # amiwire
//!
//! A blocking client for the Asterisk Manager Interface (AMI):
//! - Connect with a bounded timeout and log in (events off)
//! - Send `Key: Value` commands tagged with a per-session ActionID
//! - Read single replies or collect event streams up to a sentinel line
//! - Normalize replies into case-folded records
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                        Actions                               │
//! │     sip_peer / sip_peers / queue_status / db_* / command     │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//! ┌─────────────────────▼───────────────────────────────────────┐
//! │                        Session                               │
//! │          (login, exchange, one command in flight)            │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │   Encoder   │          │ ReplyReader │
//!   │  (Command)  │          │  (Outcome)  │
//!   └──────┬──────┘          └──────┬──────┘
//!          │                        │
//!          ▼                        ▼
//!   ┌─────────────────────────────────────┐
//!   │        Connection (TcpStream)       │
//!   └─────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use amiwire::{Config, Session};
//!
//! let config = Config::builder()
//!     .host("pbx.example.net")
//!     .credentials("admin", "secret")
//!     .build();
//! let mut session = Session::connect(config)?;
//! for (name, peer) in session.sip_peers()? {
//!     println!("{}: {}", name, peer.get("status").unwrap_or("?"));
//! }
//! # Ok::<(), amiwire::AmiError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod protocol;
pub mod network;
pub mod session;
pub mod actions;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{AmiError, Result};
pub use config::Config;
pub use protocol::{Command, ExchangeOptions, Outcome, Record};
pub use session::Session;
pub use actions::Queue;

// =============================================================================
// Version Info
// =============================================================================

/// Current version of amiwire
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
