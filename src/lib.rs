//! tinyserve - minimal static file server
//!
//! Core library for request parsing, range-aware file responses and the
//! accept loop.

pub mod config;
pub mod http;
pub mod server;
