//! Document-aware chat core: bounded PDF extraction, windowed context
//! assembly, and dispatch to an OpenAI-compatible completion endpoint.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`docs`] | PDF validation and bounded text extraction |
//! | [`chat`] | Conversation turns, context assembly, dispatch |
//! | [`llm`] | Completion endpoint client |
//! | [`state`] | Session owning the conversation |
//! | [`config`] | Environment configuration and limits |
//! | [`error`] | Failure kinds |

pub mod chat;
pub mod config;
pub mod docs;
pub mod error;
pub mod llm;
pub mod state;
