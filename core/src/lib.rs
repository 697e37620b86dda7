//! Synchronous client for the Kea control agent.
//!
//! # Overview
//! Three layers, built bottom-up:
//! - the Transaction Layer (`context`, `protocol`, `http`): one
//!   `TransactionContext` per agent connection, funnelling every command
//!   through `execute_transaction`;
//! - the Command Surface (`command`, `commands`): typed methods for lease,
//!   subnet, reservation, class, statistic, cache, config and daemon
//!   commands;
//! - the Configuration Document Builder (`types`, `builder`): assembles
//!   `Dhcp4`/`Dhcp6` documents for `config_set` and `config_test`.
//!
//! # Design
//! - Failures are values: every call returns `Result`, and the context also
//!   keeps a bounded last-error message for callers behind a C boundary.
//! - No retries and no hidden global state. Several contexts can live in one
//!   process; a single context is used through `&mut`.
//! - The `Transport` trait separates the HTTP exchange from request building
//!   and response validation, so both can be tested without sockets.

pub mod builder;
pub mod command;
pub mod commands;
pub mod config;
pub mod context;
pub mod error;
pub mod http;
pub mod protocol;
pub mod types;

#[cfg(test)]
mod testing;

pub use builder::{build_dhcp4_config, build_dhcp6_config};
pub use command::{Command, DHCP4, DHCP6};
pub use config::{ClientConfig, DEFAULT_ENDPOINT};
pub use context::{TransactionContext, MAX_ERROR_SIZE, NO_ERROR};
pub use error::{BuildError, CtrlError, ErrorKind, Result};
pub use http::{HttpRequest, Transport, UreqTransport};
pub use protocol::{CommandRequest, CommandResponse, ResponseEntry};
pub use types::ConfigData;
