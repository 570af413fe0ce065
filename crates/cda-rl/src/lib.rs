//! CDA RL - Reinforcement learning action selection for the debugging agent
//!
//! This crate picks a discrete debugging action from a continuous state
//! vector and learns from the reward the pipeline reports back. It combines
//! a first-fit block allocator, a replay store, a pair of value tables, an
//! Adam optimizer, and an epsilon-greedy policy.

// Clippy pedantic allows - these are intentional design choices
#![allow(clippy::doc_markdown)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::return_self_not_must_use)]
#![allow(clippy::cast_precision_loss)]
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::float_cmp)]
#![allow(clippy::similar_names)]

pub mod allocator;
pub mod config;
pub mod error;
pub mod estimator;
pub mod experience;
pub mod optimizer;
pub mod selector;
pub mod service;

pub use allocator::BlockAllocator;
pub use config::EngineConfig;
pub use error::{RLError, Result};
pub use estimator::ValueEstimator;
pub use experience::ExperienceStore;
pub use optimizer::{AdamConfig, AdamOptimizer};
pub use selector::{ActionSelector, SelectorStats, UpdateOutcome};
pub use service::{ActionService, ServiceStats};

pub use cda_core::{Action, Reward, SelectionMode, Transition};
