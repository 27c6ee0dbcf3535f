//! Reachability oracle consulted before every request.
//!
//! # Design
//! `NetworkMonitor` keeps the last reported state behind a `RwLock` so any
//! number of in-flight calls can read it concurrently. The platform layer
//! pushes reachability changes through `update`; registered callbacks run
//! after the lock has been released so they may read the monitor again.

use std::sync::{Arc, Mutex, PoisonError, RwLock};

use log::debug;

/// Kind of link the device is currently using.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionType {
    Wifi,
    Cellular,
    Ethernet,
    Unknown,
}

/// Reports whether requests can currently be sent.
pub trait ConnectivityMonitor: Send + Sync {
    fn is_connected(&self) -> bool;

    fn connection_type(&self) -> ConnectionType {
        ConnectionType::Unknown
    }
}

type ChangeCallback = Arc<dyn Fn(bool, ConnectionType) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Status {
    connected: bool,
    connection_type: ConnectionType,
}

/// Monitor fed by platform reachability notifications.
pub struct NetworkMonitor {
    status: RwLock<Status>,
    callbacks: Mutex<Vec<ChangeCallback>>,
}

impl NetworkMonitor {
    /// A monitor that starts out connected over an unknown link.
    pub fn new() -> Self {
        Self::with_status(true, ConnectionType::Unknown)
    }

    /// A monitor that starts out disconnected.
    pub fn offline() -> Self {
        Self::with_status(false, ConnectionType::Unknown)
    }

    pub fn with_status(connected: bool, connection_type: ConnectionType) -> Self {
        Self {
            status: RwLock::new(Status {
                connected,
                connection_type,
            }),
            callbacks: Mutex::new(Vec::new()),
        }
    }

    /// Register a callback fired after every state change.
    pub fn on_change<F>(&self, callback: F)
    where
        F: Fn(bool, ConnectionType) + Send + Sync + 'static,
    {
        self.callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Arc::new(callback));
    }

    /// Record a reachability notification. Callbacks only run when the state
    /// actually changed.
    pub fn update(&self, connected: bool, connection_type: ConnectionType) {
        let next = Status {
            connected,
            connection_type,
        };
        {
            let mut status = self.status.write().unwrap_or_else(PoisonError::into_inner);
            if *status == next {
                return;
            }
            *status = next;
        }
        debug!("connectivity changed: connected={connected} type={connection_type:?}");

        let callbacks = self
            .callbacks
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        for callback in callbacks {
            callback(connected, connection_type);
        }
    }

    fn status(&self) -> Status {
        *self.status.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for NetworkMonitor {
    fn default() -> Self {
        Self::new()
    }
}

impl ConnectivityMonitor for NetworkMonitor {
    fn is_connected(&self) -> bool {
        self.status().connected
    }

    fn connection_type(&self) -> ConnectionType {
        self.status().connection_type
    }
}

impl std::fmt::Debug for NetworkMonitor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let status = self.status();
        f.debug_struct("NetworkMonitor")
            .field("connected", &status.connected)
            .field("connection_type", &status.connection_type)
            .finish()
    }
}
