//! Transition handlers and table builder.
//!
//! Each status is defined by a plain `fn` pointer run on entry: no
//! closures, no dynamic dispatch, no heap.
//!
//! ```text
//!              ┌──────── MOVING_OR_STOPPED ────────┐
//!              ▼                                   ▼
//!            OPEN ◀──────── EXTERNAL ────────▶ CLOSED
//! ```
//!
//! Any status can follow any other; the reed switches decide.  Open and
//! Closed announce themselves only when no door output is pulsing, so the
//! controller's own command does not produce a second completion report
//! while the drive is still settling.

use log::{debug, info};

use super::context::FsmContext;
use super::{DoorStatus, StatusDescriptor};
use crate::app::commands::CommandSource;
use crate::app::events::{AppEvent, ReportedState};

// ═══════════════════════════════════════════════════════════════════════════
//  Table builder
// ═══════════════════════════════════════════════════════════════════════════

/// Build the static status table.  Called once at startup.
pub fn build_status_table() -> [StatusDescriptor; DoorStatus::COUNT] {
    [
        // Index 0: External
        StatusDescriptor {
            id: DoorStatus::External,
            name: "External",
            on_enter: Some(external_enter),
        },
        // Index 1: Open
        StatusDescriptor {
            id: DoorStatus::Open,
            name: "Open",
            on_enter: Some(open_enter),
        },
        // Index 2: Closed
        StatusDescriptor {
            id: DoorStatus::Closed,
            name: "Closed",
            on_enter: Some(closed_enter),
        },
        // Index 3: MovingOrStopped
        StatusDescriptor {
            id: DoorStatus::MovingOrStopped,
            name: "MovingOrStopped",
            on_enter: Some(moving_enter),
        },
    ]
}

// ═══════════════════════════════════════════════════════════════════════════
//  EXTERNAL: neither end switch made
// ═══════════════════════════════════════════════════════════════════════════

fn external_enter(ctx: &mut FsmContext) {
    ctx.last_source = Some(CommandSource::External);
    ctx.publish(AppEvent::CommandSource(CommandSource::External));
    info!("DOOR | moved without a local or remote command");
}

// ═══════════════════════════════════════════════════════════════════════════
//  OPEN / CLOSED: end positions
// ═══════════════════════════════════════════════════════════════════════════

fn open_enter(ctx: &mut FsmContext) {
    if ctx.pulse_active {
        ctx.suppressed_announcements = ctx.suppressed_announcements.wrapping_add(1);
        debug!("DOOR | open while output pulsing, not announced");
        return;
    }
    ctx.publish(AppEvent::CurrentState(ReportedState::Open));
    ctx.annunciation.settle_open();
    info!("DOOR | door is open");
}

fn closed_enter(ctx: &mut FsmContext) {
    if ctx.pulse_active {
        ctx.suppressed_announcements = ctx.suppressed_announcements.wrapping_add(1);
        debug!("DOOR | closed while output pulsing, not announced");
        return;
    }
    ctx.publish(AppEvent::CurrentState(ReportedState::Closed));
    ctx.annunciation.settle_closed();
    info!("DOOR | door is closed");
}

// ═══════════════════════════════════════════════════════════════════════════
//  MOVING_OR_STOPPED: both switches made
// ═══════════════════════════════════════════════════════════════════════════

fn moving_enter(ctx: &mut FsmContext) {
    // Transient: LEDs keep whatever the last command set.
    ctx.publish(AppEvent::CurrentState(ReportedState::Stopped));
    info!("DOOR | moving or stopped between end positions");
}
