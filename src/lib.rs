//! ATEM switcher library - query switchers and upload media pool stills
//! through the `atem_bridge` native library.
//!
//! This library exposes the core functionality of the `atem` CLI for use in
//! tests and other applications.
//!
//! # Modules
//!
//! - `bridge`: The native bridge contract, its libloading adapter and a mock
//! - `switcher`: Connection session and switcher queries
//! - `upload`: Still upload pipeline
//! - `image_ops`: Image decoding and BGRA conversion
//! - `still`: Media pool still records
//! - `error`: Error types with user-recoverable hints
//! - `config`: Configuration file handling

pub mod bridge;
pub mod cli;
pub mod config;
pub mod error;
pub mod image_ops;
pub mod logging;
pub mod still;
pub mod switcher;
pub mod upload;
