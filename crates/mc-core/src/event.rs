// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Instance lifecycle/log events.

use serde::{Deserialize, Serialize};

/// The kind of an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventType {
    /// A single raw output line from the instance's stdout (no trailing
    /// newline).
    Log,
    /// The instance has begun a graceful shutdown.
    ShuttingDown,
    /// The instance has fully stopped; no further events follow.
    Stopped,
}

/// An event published by an [`crate`]-level instance to its subscribers.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Discriminates the payload.
    pub event_type: EventType,
    /// Raw payload bytes. For `Log`, this is the UTF-8 line without a
    /// trailing newline. Empty for `ShuttingDown`/`Stopped`.
    pub payload: Vec<u8>,
}

impl Event {
    /// Build a `LOG` event from a line of text.
    pub fn log(line: impl Into<Vec<u8>>) -> Self {
        Event {
            event_type: EventType::Log,
            payload: line.into(),
        }
    }

    /// Build a `SHUTTING_DOWN` event.
    pub fn shutting_down() -> Self {
        Event {
            event_type: EventType::ShuttingDown,
            payload: Vec::new(),
        }
    }

    /// Build a `STOPPED` event.
    pub fn stopped() -> Self {
        Event {
            event_type: EventType::Stopped,
            payload: Vec::new(),
        }
    }
}
