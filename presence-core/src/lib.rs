//! # Presence Core
//!
//! Answers "is device X currently in radio range?" for a set of identifiers
//! and lets interested reactions run when the answer is known.
//!
//! - [`reaction`]: the callback capability invoked with `(identifier, present)`
//! - [`probe`]: the presence probe capability plus the `hcitool` backend
//! - [`registry`]: identifier to reaction mapping
//! - [`scan`]: concurrent scan cycles and the periodic loop
//! - [`engine`]: the [`Presence`] facade tying them together
//!
//! ## Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use presence_core::{CancellationToken, HciTool, Presence};
//!
//! # async fn run() -> presence_core::Result<()> {
//! let presence = Presence::new(Arc::new(HciTool::new()?));
//! presence.register_fn("AA:BB:CC:DD:EE:FF", |mac, present| {
//!     println!("{mac} found: {present}");
//! });
//!
//! let outcome = presence.scan(&CancellationToken::new()).await;
//! println!("{} of {} present", outcome.present, outcome.dispatched);
//! # Ok(())
//! # }
//! ```

#![cfg_attr(docsrs, feature(doc_cfg))]
#![allow(missing_docs)]

pub mod engine;
pub mod error;
pub mod probe;
pub mod reaction;
pub mod registry;
pub mod scan;

pub use engine::Presence;
pub use error::{PresenceError, ProbeError, Result};
pub use probe::{HciTool, PresenceProbe};
pub use reaction::{LogReaction, Reaction, ReactionFn, SharedReaction, reaction_fn};
pub use registry::{ReactionRegistry, RegistryEntry};
pub use scan::{ScanOutcome, ScanStatus};
pub use tokio_util::sync::CancellationToken;
