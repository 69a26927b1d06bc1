//! Event types emitted by engine systems.
//!
//! - [`flipbook`] – one-shot clip completion

pub mod flipbook;
