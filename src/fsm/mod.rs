//! Door status model and function-pointer transition table.
//!
//! The door is never *driven* into a status; the status is whatever the two
//! reed switches say.  The engine therefore has no `on_update` step: each
//! tick it is handed the freshly sensed [`DoorStatus`], the
//! [`StatusTracker`] decides whether that is a change, and on a change the
//! `on_enter` handler of the new status runs against the shared
//! [`FsmContext`].
//!
//! ```text
//! ┌───────────────────────────────────────────────────┐
//! │  StatusTable                                      │
//! │  ┌─────────────────┬───────────────────────────┐  │
//! │  │ DoorStatus      │ on_enter                  │  │
//! │  ├─────────────────┼───────────────────────────┤  │
//! │  │ External        │ announce source=external  │  │
//! │  │ Open            │ announce open, settle LEDs│  │
//! │  │ Closed          │ announce closed, settle   │  │
//! │  │ MovingOrStopped │ announce stopped          │  │
//! │  └─────────────────┴───────────────────────────┘  │
//! └───────────────────────────────────────────────────┘
//! ```

pub mod context;
pub mod states;

use context::FsmContext;
use log::info;

// ---------------------------------------------------------------------------
// Door status
// ---------------------------------------------------------------------------

/// Coarse door position derived from the two reed switches.
/// Must stay in sync with the table built in [`states::build_status_table`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum DoorStatus {
    /// Neither switch active: somewhere between the end positions, or the
    /// door was moved by something other than this controller.
    External = 0,
    Open = 1,
    Closed = 2,
    /// Both switches active.  The drive signals this while travelling or
    /// when it stalls.
    MovingOrStopped = 3,
}

impl DoorStatus {
    /// Total number of statuses: used to size the table array.
    pub const COUNT: usize = 4;

    /// Map the (door-is-open, door-is-closed) input pair to a status.
    /// Total over all four combinations.
    pub const fn from_sensors(open_active: bool, closed_active: bool) -> Self {
        match (open_active, closed_active) {
            (false, false) => Self::External,
            (true, false) => Self::Open,
            (false, true) => Self::Closed,
            (true, true) => Self::MovingOrStopped,
        }
    }

    /// Convert a table index back to `DoorStatus`.  Out-of-range indices
    /// trip a debug assertion and fall back to `External`.
    pub fn from_index(idx: usize) -> Self {
        match idx {
            0 => Self::External,
            1 => Self::Open,
            2 => Self::Closed,
            3 => Self::MovingOrStopped,
            _ => {
                debug_assert!(false, "invalid status index: {idx}");
                Self::External
            }
        }
    }
}

// ---------------------------------------------------------------------------
// Change detection
// ---------------------------------------------------------------------------

/// A reported status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusChange {
    pub old: DoorStatus,
    pub new: DoorStatus,
}

/// Two-slot history of sensed statuses.  Both slots start at `External`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusTracker {
    previous: DoorStatus,
    current: DoorStatus,
}

impl Default for StatusTracker {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusTracker {
    pub const fn new() -> Self {
        Self {
            previous: DoorStatus::External,
            current: DoorStatus::External,
        }
    }

    /// Shift `current` into `previous`, store `sensed`, and report the
    /// pair only if they differ.
    ///
    /// Fires exactly once per change.  Several flips between two polls
    /// collapse into one report from the last polled value to the final one.
    pub fn poll(&mut self, sensed: DoorStatus) -> Option<StatusChange> {
        self.previous = self.current;
        self.current = sensed;
        (self.previous != self.current).then_some(StatusChange {
            old: self.previous,
            new: self.current,
        })
    }

    pub fn previous(&self) -> DoorStatus {
        self.previous
    }

    pub fn current(&self) -> DoorStatus {
        self.current
    }
}

// ---------------------------------------------------------------------------
// Function-pointer table
// ---------------------------------------------------------------------------

/// Signature for `on_enter` actions.  Runs exactly once per transition.
pub type StatusActionFn = fn(&mut FsmContext);

/// Static descriptor for a single door status.
/// Stored in a fixed-size array: no heap, no `dyn`.
pub struct StatusDescriptor {
    pub id: DoorStatus,
    pub name: &'static str,
    pub on_enter: Option<StatusActionFn>,
}

// ---------------------------------------------------------------------------
// FSM engine
// ---------------------------------------------------------------------------

/// Runs transition handlers for sensed status changes.
pub struct Fsm {
    /// Fixed-size table indexed by `DoorStatus as usize`.
    table: [StatusDescriptor; DoorStatus::COUNT],
    tracker: StatusTracker,
    transitions: u32,
}

impl Fsm {
    /// Panics if a row is out of place; `update` indexes by discriminant.
    pub fn new(table: [StatusDescriptor; DoorStatus::COUNT]) -> Self {
        for (i, row) in table.iter().enumerate() {
            assert_eq!(row.id as usize, i, "status table row {} holds {}", i, row.name);
        }
        Self {
            table,
            tracker: StatusTracker::new(),
            transitions: 0,
        }
    }

    /// Feed one sensed status.  On a change, runs the new status's
    /// `on_enter` and returns the change.
    pub fn update(&mut self, sensed: DoorStatus, ctx: &mut FsmContext) -> Option<StatusChange> {
        let change = self.tracker.poll(sensed)?;
        self.transitions = self.transitions.wrapping_add(1);

        info!(
            "DOOR | {} -> {}",
            self.table[change.old as usize].name, self.table[change.new as usize].name
        );

        if let Some(enter) = self.table[change.new as usize].on_enter {
            enter(ctx);
        }
        Some(change)
    }

    pub fn current_status(&self) -> DoorStatus {
        self.tracker.current()
    }

    pub fn previous_status(&self) -> DoorStatus {
        self.tracker.previous()
    }

    /// Number of transitions seen since start (wraps).
    pub fn transition_count(&self) -> u32 {
        self.transitions
    }
}
