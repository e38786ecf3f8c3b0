// ABOUTME: Library root for iics-promote - exposes the client and supporting types.
// ABOUTME: The main binary is in main.rs.

pub mod client;
pub mod config;
pub mod diagnostics;
pub mod error;
pub mod output;
pub mod types;
