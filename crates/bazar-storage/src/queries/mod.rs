// SPDX-FileCopyrightText: 2026 Bazar Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Typed query modules, one per entity.

pub mod deliveries;
pub mod events;
pub mod items;
pub mod notifications;
pub mod orders;
pub mod recommendations;
pub mod users;
pub mod wishlists;
