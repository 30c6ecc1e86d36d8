//! TCP server for portal clients.
//!
//! This module provides the network layer that accepts client connections
//! and walks each one through login and its role's menu.
//!
//! ## Architecture
//!
//! ```text
//! +--------+
//! | Server |  <- Accepts TCP connections, caps concurrent sessions
//! +--------+
//!      |
//!      v
//! +---------+     +-------+
//! | Session | --> | Login |  <- Role, username and password exchange
//! +---------+     +-------+
//!      |
//!      v
//! +-------------+
//! | LineChannel |  <- Newline-delimited text, cancellable reads
//! +-------------+
//!      |
//!      v
//! +----------+
//! | Registry |  <- Active sessions, cancelled on shutdown
//! +----------+
//! ```
//!
//! ## Terminology
//!
//! - **Server**: TCP listener that spawns sessions
//! - **Session**: Per-client menu loop calling into the portal
//! - **Login**: The exchange that turns a connection into an identity
//! - **Registry**: Tracks active sessions for graceful shutdown

pub mod channel;
pub mod error;
pub mod listener;
pub mod login;
pub mod registry;
pub mod session;

pub use error::SessionError;
pub use listener::Server;
