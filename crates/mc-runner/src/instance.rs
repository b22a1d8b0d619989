// Copyright (C) 2025 SyncMyOrders Sp. z o.o.
// SPDX-License-Identifier: AGPL-3.0-or-later
//! The per-server live object (`spec.md` §4.4).
//!
//! An `Instance` owns its subscriber set, its stdin handle and the
//! background task that reads the attached container stream. Subscribers
//! hold a channel, never a reference back to the instance; the instance
//! holds channels, never references to subscribers (`spec.md` §9).

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering};
use std::time::Duration;

use mc_core::{DistributionVersion, Event, InstanceConfig, InstanceCreateData, InstanceLimits, InstanceState, Snowflake};
use tokio::io::AsyncWrite;
use tokio::sync::{Mutex, mpsc};
use tracing::info;

use crate::error::{Result, RunnerError};

/// The maximum time `send_event`/`close` will wait for any single
/// subscriber to accept an event before dropping it for that subscriber
/// only (`spec.md` §4.4, §5).
pub const SUBSCRIBER_SEND_TIMEOUT: Duration = Duration::from_millis(10);

/// Default channel capacity for a subscriber that does not request one
/// explicitly. `tokio::sync::mpsc` has no zero-capacity variant, so this is
/// the smallest value that still lets `send_event` exercise real
/// backpressure against an unread channel.
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 1;

/// A handle returned by [`Instance::attach_listener`]; pass it back to
/// [`Instance::detach_listener`] to unregister, and poll
/// [`Subscriber::recv`] for events.
pub struct Subscriber {
    id: u64,
    rx: mpsc::Receiver<Event>,
}

impl Subscriber {
    /// Receive the next event, or `None` once the instance has closed this
    /// channel.
    pub async fn recv(&mut self) -> Option<Event> {
        self.rx.recv().await
    }

    /// The opaque id used to detach this subscriber.
    pub fn id(&self) -> u64 {
        self.id
    }
}

struct SubscriberState {
    listeners: HashMap<u64, mpsc::Sender<Event>>,
    stdin: Option<Box<dyn AsyncWrite + Send + Unpin>>,
    closed: bool,
}

/// A single live game-server instance on this node.
pub struct Instance {
    /// Caller-assigned identity.
    pub id: Snowflake,
    /// Display name; also used as the `server.properties` `motd`.
    pub name: String,
    /// When the instance object was constructed.
    pub launched_at: chrono::DateTime<chrono::Utc>,
    /// Resolved distribution version.
    pub version: DistributionVersion,
    /// Resource limits.
    pub limits: InstanceLimits,
    /// Server configuration.
    pub config: InstanceConfig,

    /// Opaque container id, populated by the runtime adapter's `create`.
    container_id: Mutex<Option<String>>,
    /// Informational player count.
    players: AtomicI32,
    /// Becomes true once stdio has been attached by `launch`.
    launched: AtomicBool,
    state: AtomicI32,
    next_subscriber_id: AtomicU64,

    inner: Mutex<SubscriberState>,
}

impl Instance {
    /// Construct a new instance from validated create data. Does not touch
    /// the container runtime; that is the Manager's job.
    pub(crate) fn new(data: InstanceCreateData) -> Result<Self> {
        data.validate().map_err(RunnerError::InvalidCreateData)?;

        Ok(Instance {
            id: data.id,
            name: data.name,
            launched_at: chrono::Utc::now(),
            version: data.version,
            limits: data.limits,
            config: data.config.with_defaults(),
            container_id: Mutex::new(None),
            players: AtomicI32::new(0),
            launched: AtomicBool::new(false),
            state: AtomicI32::new(InstanceState::Offline as i32),
            next_subscriber_id: AtomicU64::new(1),
            inner: Mutex::new(SubscriberState {
                listeners: HashMap::new(),
                stdin: None,
                closed: false,
            }),
        })
    }

    /// The container id assigned by the runtime adapter's `create`, if any.
    pub async fn container_id(&self) -> Option<String> {
        self.container_id.lock().await.clone()
    }

    /// Store the container id returned by `create` (runtime-adapter only).
    pub(crate) async fn set_container_id(&self, id: String) {
        *self.container_id.lock().await = Some(id);
    }

    /// Current lifecycle state. Lock-free.
    pub fn get_state(&self) -> InstanceState {
        match self.state.load(Ordering::SeqCst) {
            0 => InstanceState::Offline,
            1 => InstanceState::Starting,
            2 => InstanceState::Running,
            _ => InstanceState::ShuttingDown,
        }
    }

    /// Set the lifecycle state. Lock-free.
    pub fn set_state(&self, state: InstanceState) {
        self.state.store(state as i32, Ordering::SeqCst);
    }

    /// Informational player count.
    pub fn players(&self) -> i32 {
        self.players.load(Ordering::Relaxed)
    }

    /// Update the informational player count.
    pub fn set_players(&self, players: i32) {
        self.players.store(players, Ordering::Relaxed);
    }

    /// Whether stdio has been attached (`launch` has run to completion).
    pub fn is_launched(&self) -> bool {
        self.launched.load(Ordering::SeqCst)
    }

    /// Attach the hijacked stdin half and mark the instance launched. Called
    /// by the runtime adapter once the container stream is attached; does
    /// not itself start the background log reader (the adapter drives that
    /// from the stdout half, which it owns).
    pub(crate) async fn attach_stdin(&self, stdin: Box<dyn AsyncWrite + Send + Unpin>) {
        let mut inner = self.inner.lock().await;
        inner.stdin = Some(stdin);
        drop(inner);
        self.launched.store(true, Ordering::SeqCst);
    }

    /// Append a line to the container's stdin. Appends `\n` if absent.
    /// Fails if the instance has not reached `launched == true`. One
    /// command at a time per instance (serialized by the instance mutex).
    pub async fn send_command(&self, line: &str) -> Result<()> {
        if !self.is_launched() {
            return Err(RunnerError::SendCommand("instance not launched yet".into()));
        }
        if line.is_empty() {
            return Ok(());
        }

        let mut inner = self.inner.lock().await;
        let stdin = inner
            .stdin
            .as_mut()
            .ok_or_else(|| RunnerError::SendCommand("instance not launched yet".into()))?;

        let mut buf = line.as_bytes().to_vec();
        if buf.last() != Some(&b'\n') {
            buf.push(b'\n');
        }

        use tokio::io::AsyncWriteExt;
        stdin
            .write_all(&buf)
            .await
            .map_err(|e| RunnerError::SendCommand(e.to_string()))?;
        stdin
            .flush()
            .await
            .map_err(|e| RunnerError::SendCommand(e.to_string()))
    }

    /// Register a new event channel with the given buffer capacity
    /// (minimum [`DEFAULT_SUBSCRIBER_CAPACITY`]) and return a handle to it.
    pub async fn attach_listener(&self, capacity: usize) -> Subscriber {
        let capacity = capacity.max(DEFAULT_SUBSCRIBER_CAPACITY);
        let (tx, rx) = mpsc::channel(capacity);
        let id = self.next_subscriber_id.fetch_add(1, Ordering::SeqCst);

        let mut inner = self.inner.lock().await;
        inner.listeners.insert(id, tx);

        Subscriber { id, rx }
    }

    /// Remove a subscriber; returns whether it was present.
    pub async fn detach_listener(&self, subscriber: &Subscriber) -> bool {
        let mut inner = self.inner.lock().await;
        inner.listeners.remove(&subscriber.id).is_some()
    }

    /// Broadcast an event to all subscribers under the instance mutex. Each
    /// subscriber gets at most [`SUBSCRIBER_SEND_TIMEOUT`] to accept it;
    /// slow consumers never stall the producer or other consumers
    /// (`spec.md` §5). No-op once `close()` has run.
    pub async fn send_event(&self, event: Event) {
        let inner = self.inner.lock().await;
        if inner.closed {
            return;
        }
        Self::broadcast(&inner.listeners, &event).await;
    }

    async fn broadcast(listeners: &HashMap<u64, mpsc::Sender<Event>>, event: &Event) {
        for tx in listeners.values() {
            let _ = tokio::time::timeout(SUBSCRIBER_SEND_TIMEOUT, tx.send(event.clone())).await;
        }
    }

    /// Emit `STOPPED` to every subscriber (same per-subscriber bound as
    /// `send_event`), then close their channels. Idempotent only in the
    /// sense that a second call is a no-op; callers (the Manager/runtime
    /// adapter) must not invoke it twice for the same instance.
    pub async fn close(&self) {
        let mut inner = self.inner.lock().await;
        if inner.closed {
            return;
        }
        Self::broadcast(&inner.listeners, &Event::stopped()).await;
        inner.listeners.clear();
        inner.closed = true;
        info!(instance_id = %self.id, "instance closed");
    }
}
