//! Integration tests for the sense → detect → arbitrate → pulse pipeline.
//!
//! These run on the host (x86_64) and drive [`AppService`] tick by tick
//! through mock door I/O, panel and bus adapters.

use crate::mock_hw::{LedCall, MockBus, MockDoorIo, MockHmi, OutputWrite};

use gdc::app::commands::{CommandSource, DoorCommand};
use gdc::app::events::{AppEvent, ReportedState};
use gdc::app::ports::{ButtonId, LedId};
use gdc::app::service::AppService;
use gdc::config::SystemConfig;
use gdc::fsm::DoorStatus;
use gdc::fsm::context::AnnunciationState;

struct Rig {
    app: AppService,
    io: MockDoorIo,
    hmi: MockHmi,
    bus: MockBus,
}

impl Rig {
    fn new(config: &SystemConfig) -> Self {
        let mut rig = Self {
            app: AppService::new(config),
            io: MockDoorIo::new(),
            hmi: MockHmi::new(),
            bus: MockBus::new(),
        };
        rig.app.start(&mut rig.bus);
        rig
    }

    fn tick(&mut self, now_ms: u32) {
        self.app.tick(now_ms, &mut self.io, &mut self.hmi, &mut self.bus);
    }

    /// Door resting closed, start-up chatter drained.
    fn closed() -> Self {
        let mut rig = Self::new(&SystemConfig::default());
        rig.io.set_closed();
        rig.tick(0);
        rig.bus.drain();
        rig.hmi.led_calls.clear();
        rig
    }
}

// ── Start-up ──────────────────────────────────────────────────

#[test]
fn first_sensed_position_is_announced() {
    let mut rig = Rig::new(&SystemConfig::default());
    rig.io.set_closed();
    rig.tick(0);

    assert_eq!(
        rig.bus.drain(),
        vec![
            AppEvent::CurrentState(ReportedState::Unknown),
            AppEvent::CurrentState(ReportedState::Closed),
        ]
    );
    assert_eq!(rig.hmi.last_level(LedId::DoorClosed), Some(true));
    assert_eq!(rig.app.status(), DoorStatus::Closed);
}

#[test]
fn idle_ticks_are_silent() {
    let mut rig = Rig::closed();
    for now in (10..1000).step_by(10) {
        rig.tick(now);
    }
    assert!(rig.bus.events.is_empty());
    assert!(rig.io.writes.is_empty());
    assert!(rig.hmi.led_calls.is_empty());
    assert_eq!(rig.app.tick_count(), 100);
}

// ── Local command ─────────────────────────────────────────────

#[test]
fn open_button_announces_then_pulses() {
    let mut rig = Rig::closed();
    rig.hmi.press(ButtonId::Open);
    rig.tick(10);

    assert_eq!(
        rig.bus.drain(),
        vec![
            AppEvent::RequestedState(DoorCommand::Open),
            AppEvent::CurrentState(ReportedState::Opening),
            AppEvent::CommandSource(CommandSource::Local),
        ]
    );
    assert_eq!(
        rig.io.writes,
        vec![OutputWrite {
            output: DoorCommand::Open,
            high: true
        }]
    );
    assert_eq!(
        rig.hmi.led_calls,
        vec![
            LedCall::Blink(LedId::DoorOpen, true),
            LedCall::Level(LedId::DoorClosed, false),
        ]
    );
    assert_eq!(rig.app.last_source(), Some(CommandSource::Local));
}

#[test]
fn pulse_ends_after_configured_duration() {
    let mut rig = Rig::closed();
    rig.hmi.press(ButtonId::Open);
    rig.tick(10);

    rig.tick(509);
    assert!(rig.io.output_high(DoorCommand::Open));
    assert!(rig.app.is_pulse_active());

    rig.tick(510);
    assert!(!rig.io.output_high(DoorCommand::Open));
    assert!(!rig.app.is_pulse_active());
    assert_eq!(rig.io.writes.len(), 2);
}

#[test]
fn info_button_never_reaches_the_door() {
    let mut rig = Rig::closed();
    rig.hmi.press(ButtonId::Info);
    rig.tick(10);

    assert_eq!(rig.hmi.info_pages, 1);
    assert!(rig.io.writes.is_empty());
    assert!(rig.bus.events.is_empty());
}

// ── Announcement suppression ──────────────────────────────────

#[test]
fn end_position_during_own_pulse_is_not_announced() {
    let mut rig = Rig::closed();
    rig.hmi.press(ButtonId::Open);
    rig.tick(10);
    rig.bus.drain();
    rig.hmi.led_calls.clear();

    // Fast door: open switch made while the output is still HIGH.
    rig.io.set_open();
    rig.tick(100);
    assert!(rig.bus.events.is_empty());
    assert_eq!(rig.app.suppressed_announcements(), 1);
    assert!(rig.app.annunciation().open_blinking);

    // No further transition once the pulse is over, so still quiet.
    rig.tick(600);
    rig.tick(700);
    assert!(rig.bus.events.is_empty());
}

#[test]
fn end_position_after_pulse_settles_leds() {
    let mut rig = Rig::closed();
    rig.hmi.press(ButtonId::Open);
    rig.tick(10);
    rig.tick(510);
    rig.bus.drain();
    rig.hmi.led_calls.clear();

    rig.io.set_both();
    rig.tick(1000);
    assert_eq!(
        rig.bus.drain(),
        vec![AppEvent::CurrentState(ReportedState::Stopped)]
    );
    assert!(rig.hmi.led_calls.is_empty());

    rig.io.set_open();
    rig.tick(2000);
    assert_eq!(
        rig.bus.drain(),
        vec![AppEvent::CurrentState(ReportedState::Open)]
    );
    assert_eq!(
        rig.hmi.led_calls,
        vec![
            LedCall::Blink(LedId::DoorOpen, false),
            LedCall::Level(LedId::DoorOpen, true),
        ]
    );
    let leds = rig.app.annunciation();
    assert!(leds.open_lit && !leds.open_blinking);
    assert!(!leds.closed_lit && !leds.closed_blinking);
}

#[test]
fn close_round_trip_settles_on_closed() {
    let mut rig = Rig::new(&SystemConfig::default());
    rig.io.set_open();
    rig.tick(0);
    rig.bus.drain();
    rig.hmi.led_calls.clear();

    rig.hmi.press(ButtonId::Close);
    rig.tick(10);
    // Door leaves the open switch while the output is still HIGH.
    rig.io.set_released();
    rig.tick(100);
    rig.tick(510);
    assert!(!rig.app.is_pulse_active());
    rig.io.set_closed();
    rig.tick(1000);
    rig.tick(1100);

    let events = rig.bus.drain();
    assert_eq!(
        events,
        vec![
            AppEvent::RequestedState(DoorCommand::Close),
            AppEvent::CurrentState(ReportedState::Closing),
            AppEvent::CommandSource(CommandSource::Local),
            AppEvent::CommandSource(CommandSource::External),
            AppEvent::CurrentState(ReportedState::Closed),
        ]
    );
    let closed_announcements = events
        .iter()
        .filter(|e| **e == AppEvent::CurrentState(ReportedState::Closed))
        .count();
    assert_eq!(closed_announcements, 1);

    assert_eq!(
        rig.hmi.led_calls,
        vec![
            LedCall::Level(LedId::DoorOpen, false),
            LedCall::Blink(LedId::DoorClosed, true),
            LedCall::Blink(LedId::DoorClosed, false),
            LedCall::Level(LedId::DoorClosed, true),
        ]
    );
    assert_eq!(
        rig.app.annunciation(),
        AnnunciationState {
            open_lit: false,
            open_blinking: false,
            closed_lit: true,
            closed_blinking: false,
        }
    );
    assert_eq!(rig.app.status(), DoorStatus::Closed);
}

// ── Remote command ────────────────────────────────────────────

#[test]
fn remote_close_from_open() {
    let mut rig = Rig::new(&SystemConfig::default());
    rig.io.set_open();
    rig.tick(0);
    rig.bus.drain();

    rig.bus.deliver("close");
    rig.tick(10);

    assert_eq!(
        rig.bus.drain(),
        vec![
            AppEvent::RequestedState(DoorCommand::Close),
            AppEvent::CurrentState(ReportedState::Closing),
            AppEvent::CommandSource(CommandSource::Remote),
        ]
    );
    assert!(rig.io.output_high(DoorCommand::Close));
    assert!(!rig.io.output_high(DoorCommand::Open));
    assert_eq!(rig.app.accepted_commands(), 1);
}

#[test]
fn unknown_payload_has_no_side_effects() {
    let mut rig = Rig::closed();
    rig.bus.deliver("toggle");
    rig.tick(10);

    assert!(rig.io.writes.is_empty());
    assert!(rig.bus.events.is_empty());
    assert!(rig.hmi.led_calls.is_empty());
    assert_eq!(rig.app.rejected_commands(), 1);
    assert_eq!(rig.app.accepted_commands(), 0);
}

#[test]
fn repeated_command_does_not_retrigger_output() {
    let mut rig = Rig::closed();
    rig.hmi.press(ButtonId::Open);
    rig.tick(10);
    rig.bus.deliver("open");
    rig.tick(300);

    let highs = rig
        .io
        .writes
        .iter()
        .filter(|w| w.output == DoorCommand::Open && w.high)
        .count();
    assert_eq!(highs, 1);

    // The pulse still ends relative to the first request.
    rig.tick(510);
    assert!(!rig.io.output_high(DoorCommand::Open));
}

#[test]
fn button_and_bus_in_same_tick_both_arbitrate() {
    let mut rig = Rig::closed();
    rig.hmi.press(ButtonId::Open);
    rig.bus.deliver("close");
    rig.tick(10);

    let events = rig.bus.drain();
    assert_eq!(events.len(), 6);
    assert_eq!(events[2], AppEvent::CommandSource(CommandSource::Local));
    assert_eq!(events[5], AppEvent::CommandSource(CommandSource::Remote));
    assert!(rig.io.output_high(DoorCommand::Open));
    assert!(rig.io.output_high(DoorCommand::Close));
    assert_eq!(rig.app.last_source(), Some(CommandSource::Remote));
}

#[test]
fn interlock_refuses_opposite_command() {
    let config = SystemConfig {
        interlock_outputs: true,
        ..SystemConfig::default()
    };
    let mut rig = Rig::new(&config);
    rig.io.set_closed();
    rig.tick(0);
    rig.bus.drain();

    rig.hmi.press(ButtonId::Open);
    rig.tick(10);
    rig.bus.deliver("close");
    rig.tick(20);

    assert!(!rig.io.output_high(DoorCommand::Close));
    assert_eq!(rig.app.rejected_commands(), 1);
    assert_eq!(rig.bus.drain().len(), 3);

    // Accepted again once the open pulse has ended.
    rig.tick(510);
    rig.bus.deliver("close");
    rig.tick(520);
    assert!(rig.io.output_high(DoorCommand::Close));
}

// ── External movement ─────────────────────────────────────────

#[test]
fn manual_movement_is_attributed_to_external() {
    let mut rig = Rig::closed();
    rig.io.set_released();
    rig.tick(100);

    assert_eq!(
        rig.bus.drain(),
        vec![AppEvent::CommandSource(CommandSource::External)]
    );
    assert_eq!(rig.app.last_source(), Some(CommandSource::External));
    assert_eq!(rig.app.status(), DoorStatus::External);
    assert!(rig.io.writes.is_empty());
}

#[test]
fn pulse_timing_survives_counter_wrap() {
    let mut rig = Rig::new(&SystemConfig::default());
    let start = u32::MAX - 200;
    rig.hmi.press(ButtonId::Close);
    rig.tick(start);
    assert!(rig.io.output_high(DoorCommand::Close));

    rig.tick(start.wrapping_add(499));
    assert!(rig.io.output_high(DoorCommand::Close));
    rig.tick(start.wrapping_add(500));
    assert!(!rig.io.output_high(DoorCommand::Close));
}
