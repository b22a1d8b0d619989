// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! Shared domain types for the mc-manager control plane.
//!
//! This crate has no network or persistence dependencies; it is the common
//! vocabulary shared by the resolver, runtime adapter, manager, proxy and
//! API crates.

#![deny(missing_docs)]

/// Error-kind vocabulary shared across the workspace.
pub mod error;
/// Instance lifecycle/log events.
pub mod event;
/// Distribution metadata, instance limits/config, Java-LTS normalization.
pub mod model;
/// 64-bit time-ordered identifiers.
pub mod snowflake;

pub use error::ErrorKind;
pub use event::{Event, EventType};
pub use model::{
    Distribution, DistributionVersion, HashType, InstanceConfig, InstanceCreateData,
    InstanceLimits, InstanceState, JAVA_LTS_BUCKETS, normalize_java_lts,
};
pub use snowflake::Snowflake;
