use tokio::sync::{Mutex, broadcast};
use uuid::Uuid;

use crate::dto::sse::ServerEvent;

/// SSE-specific sub-state carved out from [`super::AppState`].
pub struct SseState {
    clock: SseHub,
    controller: ControllerSseState,
    display: DisplaySlot,
}

impl SseState {
    /// Build the SSE sub-tree with per-stream channel capacities.
    pub fn new(clock_capacity: usize, controller_capacity: usize) -> Self {
        Self {
            clock: SseHub::new(clock_capacity),
            controller: ControllerSseState::new(controller_capacity),
            display: DisplaySlot::new(),
        }
    }

    /// Hub fanning out clock ticks and phase changes to every window.
    pub fn clock(&self) -> &SseHub {
        &self.clock
    }

    /// Controller-only state bundle (hub plus control token).
    pub fn controller(&self) -> &ControllerSseState {
        &self.controller
    }

    /// Single-occupancy slot tracking the attached spectator display.
    pub fn display(&self) -> &DisplaySlot {
        &self.display
    }
}

/// State bundle holding the controller SSE hub and its coordinating token.
///
/// The token enforces the single-writer discipline: whichever window holds it
/// is the master controller, and mutating endpoints require it.
pub struct ControllerSseState {
    hub: SseHub,
    token: Mutex<Option<String>>,
}

impl ControllerSseState {
    fn new(capacity: usize) -> Self {
        Self {
            hub: SseHub::new(capacity),
            token: Mutex::new(None),
        }
    }

    /// Borrow the broadcast hub used for controller-only events.
    pub fn hub(&self) -> &SseHub {
        &self.hub
    }

    /// Borrow the token mutex that coordinates the single controller.
    pub fn token(&self) -> &Mutex<Option<String>> {
        &self.token
    }
}

/// Slot recording the identity of the attached display stream, if any.
///
/// Display liveness is the SSE connection itself: claiming the slot happens
/// when the stream connects and the forwarder teardown releases it, so no
/// window-handle polling is involved.
pub struct DisplaySlot {
    occupant: Mutex<Option<Uuid>>,
}

impl DisplaySlot {
    fn new() -> Self {
        Self {
            occupant: Mutex::new(None),
        }
    }

    /// Borrow the mutex guarding the current occupant.
    pub fn occupant(&self) -> &Mutex<Option<Uuid>> {
        &self.occupant
    }
}

/// Simple broadcast hub wrapper used by the SSE services.
pub struct SseHub {
    sender: broadcast::Sender<ServerEvent>,
}

impl SseHub {
    /// Construct a new hub backed by a Tokio broadcast channel with the given capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _receiver) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Register a new subscriber that will receive subsequent events.
    pub fn subscribe(&self) -> broadcast::Receiver<ServerEvent> {
        self.sender.subscribe()
    }

    /// Send an event to all current subscribers, ignoring delivery errors.
    pub fn broadcast(&self, event: ServerEvent) {
        let _ = self.sender.send(event);
    }
}
