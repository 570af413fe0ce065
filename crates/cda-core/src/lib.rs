//! CDA Core - Core types shared by the debugging agent components
//!
//! This crate provides the narrow interface types exchanged between the
//! debugging pipeline and the action-selection engine.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod types;
pub mod util;

pub use error::{CDAError, Result};
pub use types::*;
