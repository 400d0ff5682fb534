use thiserror::Error;

use crate::dao::models::SessionStatus;

/// Lifecycle events applied to a session's status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    /// Start (or resume) scoring.
    Activate,
    /// Pause scoring while keeping the live board visible.
    Suspend,
    /// Close the session for good.
    End,
}

/// Error returned when an event cannot be applied from the current status.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while {from:?}")]
pub struct InvalidTransition {
    /// Status the session was in when the invalid event was received.
    pub from: SessionStatus,
    /// The rejected event.
    pub event: SessionEvent,
}

/// Compute the status an event moves a session to.
///
/// Self-loops exist so that every lifecycle operation can be retried to
/// completion after a partial dual-store failure: re-activating an active
/// session, re-suspending a suspended one, and re-ending an ended one all
/// succeed and re-apply the same fields. `Ended` accepts no other event;
/// attempts to activate or suspend an ended session are rejected rather
/// than ignored.
pub fn next_status(
    current: SessionStatus,
    event: SessionEvent,
) -> Result<SessionStatus, InvalidTransition> {
    use SessionEvent::*;
    use SessionStatus::*;

    let next = match (current, event) {
        (Created, Activate) => Active,
        (Active, Activate) => Active,
        (Suspended, Activate) => Active,
        (Active, Suspend) => Suspended,
        (Suspended, Suspend) => Suspended,
        (Active, End) => Ended,
        (Ended, End) => Ended,
        (from, event) => return Err(InvalidTransition { from, event }),
    };

    Ok(next)
}
