//! Socratis - Socratic tutoring sessions backed by a generative-language
//! service
//!
//! One in-memory session per process: a pure state machine decides, a
//! runtime executes its effects against the tutor gateway, and frontends
//! (HTTP + SSE, terminal) render a shared view model.

pub mod api;
pub mod attachment;
pub mod catalog;
pub mod llm;
pub mod runtime;
pub mod state_machine;
pub mod tutor;
pub mod view;
