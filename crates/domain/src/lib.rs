//! `ob-domain` - shared configuration, error and trace types for the
//! Odoo MCP bridge crates.

pub mod config;
pub mod error;
pub mod trace;
