// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! A test double for [`super::RuntimeAdapter`], generalized from the
//! teacher's `MockRunner` pattern.

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use mc_core::{Event, InstanceState};

use crate::error::{Result, RunnerError};
use crate::instance::Instance;
use crate::runtime::RuntimeAdapter;

/// Tracks how many times each lifecycle step was invoked, and can be
/// configured to fail any one of them - used to drive the Manager
/// rollback scenarios (`spec.md` §8, S1-S3).
pub struct MockRuntimeAdapter {
    fail_create: bool,
    fail_launch: bool,
    fail_stop: bool,
    creates: AtomicUsize,
    launches: AtomicUsize,
    stops: AtomicUsize,
}

impl MockRuntimeAdapter {
    /// A well-behaved adapter: every step succeeds.
    pub fn new() -> Self {
        MockRuntimeAdapter {
            fail_create: false,
            fail_launch: false,
            fail_stop: false,
            creates: AtomicUsize::new(0),
            launches: AtomicUsize::new(0),
            stops: AtomicUsize::new(0),
        }
    }

    /// `create` returns an error.
    pub fn failing_create(mut self) -> Self {
        self.fail_create = true;
        self
    }

    /// `launch` returns an error.
    pub fn failing_launch(mut self) -> Self {
        self.fail_launch = true;
        self
    }

    /// `stop` returns an error.
    pub fn failing_stop(mut self) -> Self {
        self.fail_stop = true;
        self
    }

    /// Number of `create` calls observed so far.
    pub fn create_count(&self) -> usize {
        self.creates.load(Ordering::SeqCst)
    }

    /// Number of `launch` calls observed so far.
    pub fn launch_count(&self) -> usize {
        self.launches.load(Ordering::SeqCst)
    }
}

impl Default for MockRuntimeAdapter {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl RuntimeAdapter for MockRuntimeAdapter {
    async fn create(&self, instance: &Arc<Instance>) -> Result<()> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        if self.fail_create {
            return Err(RunnerError::InstanceCreate("mock failure".into()));
        }
        instance.set_container_id(format!("mock-{}", instance.id)).await;
        Ok(())
    }

    async fn launch(&self, instance: &Arc<Instance>) -> Result<()> {
        self.launches.fetch_add(1, Ordering::SeqCst);
        if self.fail_launch {
            return Err(RunnerError::InstanceLaunch("mock failure".into()));
        }
        let (_tx, rx) = tokio::io::duplex(4096);
        let (reader, writer) = tokio::io::split(rx);
        drop(reader);
        instance.attach_stdin(Box::new(writer)).await;
        instance.set_state(InstanceState::Starting);
        Ok(())
    }

    async fn stop(&self, instance: &Arc<Instance>) -> Result<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        instance.send_event(Event::shutting_down()).await;
        instance.set_state(InstanceState::ShuttingDown);

        if self.fail_stop {
            return Err(RunnerError::InstanceStop("mock failure".into()));
        }

        instance.set_state(InstanceState::Offline);
        instance.send_event(Event::stopped()).await;
        instance.close().await;
        Ok(())
    }
}

/// Convenience constructor used by doctest-adjacent call sites: an
/// [`Arc`]-wrapped well-behaved mock.
pub fn shared() -> Arc<dyn RuntimeAdapter> {
    Arc::new(MockRuntimeAdapter::new())
}
