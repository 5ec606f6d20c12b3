//! Database engine collaborators
//!
//! The engine binary and its client tools are black boxes driven through
//! their command-line contracts:
//! - `help`: effective configuration from the verbose help dump
//! - `server`: data-dir initialization and the temporary server lifecycle
//! - `client`: SQL batches over the server socket
//! - `passfile`: credentials passed through an anonymous descriptor
//! - `codec`: external decompressors for compressed SQL

mod client;
mod codec;
mod errors;
mod help;
mod passfile;
mod server;
mod state;

pub use client::{Access, MysqlClient, SqlInput, SqlSession};
pub use codec::Codec;
pub use errors::{EngineError, EngineResult};
pub use help::{introspect, introspect_builtin, HelpDump, DATADIR, SOCKET};
pub use passfile::Passfile;
pub use server::{reconcile_socket, TemporaryServer};
pub use state::ServerRunState;

#[cfg(test)]
pub(crate) use client::RecordingSession;
