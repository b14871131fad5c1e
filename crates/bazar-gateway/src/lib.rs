// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP/WebSocket gateway for the Bazar realtime core.
//!
//! Single ingress point: authenticates connections with HS256 tokens,
//! registers them in the connection registry, dispatches typed WebSocket
//! messages, and exposes the REST surface for status updates,
//! notifications, and recommendations.

pub mod auth;
pub mod handlers;
pub mod server;
pub mod ws;

pub use auth::{AuthState, TokenVerifier};
pub use server::{build_router, start_server, GatewayState, ServerConfig};
