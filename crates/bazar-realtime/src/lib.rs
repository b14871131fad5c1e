// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Realtime delivery core: connection registry, delivery watcher index,
//! outbound broadcast surface, and the status-change pipelines.
//!
//! Registry and watcher mutations are in-memory map operations that
//! never suspend; only the pipelines touch storage.

pub mod broadcast;
pub mod pipeline;
pub mod registry;
pub mod watchers;

pub use broadcast::Broadcaster;
pub use pipeline::{StatusPipeline, UpdateOutcome};
pub use registry::{ConnectionHandle, ConnectionRegistry};
pub use watchers::DeliveryWatcherIndex;
