//! # clipsync-core
//!
//! Step-clip cache and edit synchronizer for a sequencer controller. Keeps a
//! sparse local copy of a host clip's steps, forwards edits to the host, and
//! protects steps under active edit from stale host notifications.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use clipsync_core::config::Config;
//! use clipsync_core::engine::ClipSync;
//! use clipsync_core::runtime::SyncRuntime;
//! use clipsync_types::StepPosition;
//!
//! // 1. Build the engine from config against a host adapter
//! let config = Config::load();
//! let engine = ClipSync::new(Box::new(host), config.sync_settings());
//!
//! // 2. Let a worker thread drain host notifications and run timers
//! let runtime = SyncRuntime::start(engine, config.poll_resolution());
//!
//! // 3. Edit through the engine
//! let p = StepPosition::new(0, 4, 60);
//! runtime.with(|sync| {
//!     sync.start_edit([p]);
//!     sync.update_step_velocity(p, 0.9);
//! });
//! // ... knob released
//! runtime.with(|sync| sync.stop_edit());
//! ```
//!
//! ## Module Overview
//!
//! - [`grid`]: sparse lane/column/row store of `StepAttributes`
//! - [`engine`]: `ClipSync`, edit sessions, two-phase writes, clip operations
//! - [`host`]: `HostClip` adapter trait, `HostEvent` notifications, `TestHost`
//! - [`clip`]: mirror of clip-level parameters
//! - [`runtime`]: background thread driving an engine
//! - [`config`]: TOML configuration (embedded defaults + user overrides)
//! - [`clock`], [`error`]

pub mod clip;
pub mod clock;
pub mod config;
pub mod engine;
pub mod error;
pub mod grid;
pub mod host;
pub mod runtime;

pub use clip::ClipParams;
pub use engine::{ClipSync, SyncSettings};
pub use error::{ConfigError, GridError, HostError, HostResult};
pub use grid::StepGrid;
pub use host::{ClipEvent, HostClip, HostEvent};
pub use runtime::SyncRuntime;

pub use clipsync_types as types;
