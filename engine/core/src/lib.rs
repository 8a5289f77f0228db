//! Docdesk Engine - Client-Side Interaction Engine for docdesk
//!
//! This crate holds everything a docdesk client does between the user and the
//! document assistant service, independent of how it is drawn: chatting with
//! the assistant, managing uploaded documents, and running semantic searches
//! over indexed sections. A terminal UI, a web view, or a test harness can
//! all drive it the same way.
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                          UI Surface                              │
//! │        renders RenderedLine / DocumentRecord / SearchResult      │
//! │        implements Notifier + ConfirmPrompt                       │
//! └───────────────────────────────┬──────────────────────────────────┘
//!                                 │
//! ┌───────────────────────────────┼──────────────────────────────────┐
//! │                          ENGINE                                  │
//! │  ┌──────────────────┐  ┌──────────────────┐  ┌────────────────┐  │
//! │  │ Conversation     │  │ Document         │  │ Search         │  │
//! │  │ Session          │  │ Catalog          │  │ Session        │  │
//! │  │  (chat)          │  │  (list/upload/   │  │  (search)      │  │
//! │  │                  │  │   delete)        │  │                │  │
//! │  └────────┬─────────┘  └────────┬─────────┘  └───────┬────────┘  │
//! │           │     RequestController per session        │           │
//! │           └─────────────────────┼────────────────────┘           │
//! │                                 │                                │
//! │                        AssistantApi (trait)                      │
//! └─────────────────────────────────┼────────────────────────────────┘
//!                                   │
//!                       HttpBackend (reqwest)
//!                                   │
//!                        assistant service
//! ```
//!
//! Every remote operation goes through a [`RequestController`]: one
//! operation in flight per channel, a second start on a busy channel is
//! rejected, and the outcome is reconciled into session state by handlers
//! the session binds for that call.
//!
//! # Key Types
//!
//! - [`Engine`]: Wires a transport into the three sessions
//! - [`ConversationSession`]: Chat transcript with provisional user messages
//! - [`DocumentCatalog`]: Server-ordered document list, upload and delete
//! - [`SearchSession`]: Query, last results, and display ordering
//! - [`RequestController`]: Per-channel request lifecycle state machine
//! - [`AssistantApi`]: The transport capability, implemented by [`HttpBackend`]
//!
//! # Quick Start
//!
//! ```ignore
//! use std::sync::Arc;
//! use docdesk_engine::{config, AutoConfirm, Engine};
//! use tokio::sync::mpsc;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     docdesk_engine::logging::init_tracing()?;
//!
//!     let config = config::load_config()?;
//!     let (tx, mut notifications) = mpsc::unbounded_channel();
//!     let engine = Engine::from_config(&config, Arc::new(tx), Arc::new(AutoConfirm(true)))?;
//!
//!     engine.start().await;
//!     engine.conversation().submit("What is my notice period?").await;
//!
//!     for message in engine.conversation().render() {
//!         // Draw message.lines
//!     }
//!     while let Ok(n) = notifications.try_recv() {
//!         // Show n.message
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Module Overview
//!
//! - [`markup`]: Numbered lists and bold runs in assistant text
//! - [`lifecycle`]: Request lifecycle controller
//! - [`backend`]: Transport trait, wire types, HTTP implementation
//! - [`conversation`]: Chat session
//! - [`catalog`]: Document catalog
//! - [`search`]: Semantic search session
//! - [`contacts`]: Contact directory and thread invitations
//! - [`surface`]: Notification and confirmation capabilities
//! - [`config`]: Configuration loading
//! - [`logging`]: Subscriber setup for host applications
//! - [`engine`]: Top-level wiring

#![deny(missing_docs)]
#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod backend;
pub mod catalog;
pub mod config;
pub mod contacts;
pub mod conversation;
pub mod engine;
pub mod lifecycle;
pub mod logging;
pub mod markup;
pub mod search;
pub mod surface;

// Re-exports for convenience
pub use backend::{
    ApiError, AssistantApi, DocumentId, DocumentRecord, DocumentUpload, HttpBackend,
    SearchResult,
};
pub use catalog::{CatalogChannel, DocumentCatalog, UploadRejection};
pub use config::{ConfigError, ConfigOverrides, ConfigSource, EngineConfig};
pub use contacts::{Contact, InviteSelection};
pub use conversation::{
    ConversationSession, Message, MessageRole, RenderedMessage, SubmitOutcome,
};
pub use engine::Engine;
pub use lifecycle::{Failure, OperationState, RequestController, StartOutcome};
pub use markup::{LineKind, RenderedLine, Span};
pub use search::{SearchChannel, SearchSession};
pub use surface::{
    AutoConfirm, ConfirmPrompt, Notification, Notifier, NotifyLevel, TracingNotifier,
};
