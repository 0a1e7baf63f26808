use thiserror::Error;

/// Role of the operator window relative to the clock.
///
/// Exactly one logical writer drives the clock at a time; write access is
/// enforced by the controller token, displays never hold one. While a
/// spectator display is attached the operator window renders as a passive
/// mirror of broadcast state; when the display goes away it reconciles back
/// to master.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClockRole {
    /// Authoritative controller; start/pause/navigation are accepted.
    Master,
    /// Passive view while a display window is attached.
    Mirror,
}

/// Events that move the role state machine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoleEvent {
    /// A spectator display claimed the display slot.
    DisplayAttached,
    /// The display slot was released (stream teardown or explicit close).
    DisplayDetached,
}

/// Error returned when a role event cannot be applied.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("role event {event:?} cannot be applied while {from:?}")]
pub struct InvalidRoleTransition {
    /// Role when the invalid event arrived.
    pub from: ClockRole,
    /// The rejected event.
    pub event: RoleEvent,
}

impl ClockRole {
    /// Compute the role after `event`, rejecting transitions that would let a
    /// second display claim an occupied slot or detach a phantom display.
    pub fn apply(self, event: RoleEvent) -> Result<ClockRole, InvalidRoleTransition> {
        match (self, event) {
            (ClockRole::Master, RoleEvent::DisplayAttached) => Ok(ClockRole::Mirror),
            (ClockRole::Mirror, RoleEvent::DisplayDetached) => Ok(ClockRole::Master),
            (from, event) => Err(InvalidRoleTransition { from, event }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn attach_then_detach_round_trips() {
        let role = ClockRole::Master;
        let role = role.apply(RoleEvent::DisplayAttached).unwrap();
        assert_eq!(role, ClockRole::Mirror);
        let role = role.apply(RoleEvent::DisplayDetached).unwrap();
        assert_eq!(role, ClockRole::Master);
    }

    #[test]
    fn second_display_is_rejected() {
        let role = ClockRole::Mirror;
        let err = role.apply(RoleEvent::DisplayAttached).unwrap_err();
        assert_eq!(err.from, ClockRole::Mirror);
        assert_eq!(err.event, RoleEvent::DisplayAttached);
    }

    #[test]
    fn detach_without_display_is_rejected() {
        assert!(ClockRole::Master.apply(RoleEvent::DisplayDetached).is_err());
    }
}
