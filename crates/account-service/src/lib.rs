//! HTTP service exposing the chain account operations.
//!
//! This crate wires the configured chain adaptors into a registry and serves
//! the operation set over HTTP. It is the entry point for running the account
//! service as a standalone process.
//!
//! # Components
//!
//! - `api`: JSON endpoints, one per account operation
//! - `cli`: command-line interface
//! - `server`: adaptor construction from configuration and server lifecycle

pub mod api;
pub mod cli;
pub mod server;
