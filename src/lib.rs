//! elFinder Connector Library
//!
//! Serves configured directories ("volumes") to the elFinder web file manager
//! through its JSON command protocol.

pub mod config;
pub mod connector;
pub mod server;
pub mod storage;
