//! `adsign` - advertisement management and signage rotation backend
//!
//! This crate provides the core of an advertisement-management system:
//! businesses register, submit advertisements with a display window, and an
//! external signage display is fed a rotating view of the currently active
//! content. Persistence is a filesystem-backed document store emulating a
//! small subset of document-database query semantics; a timer-driven
//! scheduler derives "what should be showing right now" and pushes changes
//! to the display API exactly once per change.

// Deny the most critical lints that could lead to bugs or security issues
#![deny(
    // Security and correctness
    unsafe_code,
    unsafe_op_in_unsafe_fn,

    // Code quality - things that are almost always bugs
    unreachable_code,
    unreachable_patterns,
    unused_must_use,

    // Documentation - broken links are bugs
    rustdoc::broken_intra_doc_links,
    rustdoc::private_intra_doc_links,
)]
// Warn on things that should be fixed but aren't necessarily bugs
#![warn(
    missing_docs,

    // Clippy categories for overall code quality
    clippy::all,
    clippy::pedantic,

    // Performance
    clippy::inefficient_to_string,
    clippy::needless_pass_by_value,

    // Correctness
    clippy::clone_on_ref_ptr,
    clippy::dbg_macro,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::unwrap_used,

    // Style consistency
    clippy::inconsistent_struct_constructor,
    clippy::must_use_candidate,
    clippy::semicolon_if_nothing_returned,
    clippy::wildcard_imports,

    // Future compatibility
    future_incompatible,
    rust_2018_idioms,
)]
// Allow some pedantic lints that are too noisy or not applicable
#![allow(
    clippy::module_name_repetitions,  // Common pattern in Rust
    clippy::missing_errors_doc,        // Will add gradually
    clippy::missing_panics_doc,        // Will add gradually
)]

/// Configuration loading for storage and the display endpoint
pub mod config;
/// Domain repositories and rotation logic
pub mod core;
/// External display push client and payload types
pub mod display;
/// Unified error types and result handling
pub mod errors;
/// Persisted document types
pub mod models;
/// In-memory query engine (filters, sort, projection, population)
pub mod query;
/// Timer loop driving rotation ticks
pub mod scheduler;
/// Filesystem-backed collection store
pub mod store;

#[cfg(test)]
pub mod test_utils;
