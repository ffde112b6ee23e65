use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};

/// Logical actions that each get their own in-flight slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ActionKind {
    Create,
    Transition,
    Delete,
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ActionKind::Create => f.write_str("creating a reservation"),
            ActionKind::Transition => f.write_str("updating a reservation"),
            ActionKind::Delete => f.write_str("deleting a reservation"),
        }
    }
}

/// Single-slot busy flag. A second caller is turned away while the slot is
/// taken; nothing is queued.
#[derive(Debug)]
pub struct InFlight {
    kind: ActionKind,
    busy: AtomicBool,
}

impl InFlight {
    pub fn new(kind: ActionKind) -> Self {
        Self {
            kind,
            busy: AtomicBool::new(false),
        }
    }

    pub fn kind(&self) -> ActionKind {
        self.kind
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }

    /// Take the slot. The returned ticket frees it on drop.
    pub fn try_begin(&self) -> Option<InFlightTicket<'_>> {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| InFlightTicket { slot: self })
    }
}

#[derive(Debug)]
pub struct InFlightTicket<'a> {
    slot: &'a InFlight,
}

impl Drop for InFlightTicket<'_> {
    fn drop(&mut self) {
        self.slot.busy.store(false, Ordering::Release);
    }
}
