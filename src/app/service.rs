//! Application service: the hexagonal core.
//!
//! [`AppService`] is the command arbitrator.  It owns the status table,
//! the pulse actuator and the shared context, and runs one cooperative
//! control tick at a time.  All I/O flows through port traits injected at
//! call sites, so the whole controller is testable with mock adapters.
//!
//! ```text
//!  DoorIoPort ──▶ ┌──────────────────────────┐ ──▶ EventSink
//!                 │        AppService        │
//!     HmiPort ◀──▶│  Sensing · FSM · Pulses  │◀── CommandPort
//!                 └──────────────────────────┘
//! ```

use log::{info, warn};

use crate::config::SystemConfig;
use crate::drivers::pulse::PulseActuator;
use crate::fsm::context::{AnnunciationState, FsmContext};
use crate::fsm::states::build_status_table;
use crate::fsm::{DoorStatus, Fsm};
use crate::sensors::DoorPositionSensor;

use super::commands::{CommandError, CommandSource, DoorCommand};
use super::events::{AppEvent, ReportedState};
use super::ports::{ButtonId, CommandPort, DoorIoPort, EventSink, HmiPort, LedId};

// ───────────────────────────────────────────────────────────────
// AppService
// ───────────────────────────────────────────────────────────────

/// The application service orchestrates all door logic.
pub struct AppService {
    fsm: Fsm,
    ctx: FsmContext,
    sensor: DoorPositionSensor,
    pulses: PulseActuator,
    pulse_duration_ms: u32,
    interlock_outputs: bool,
    tick_count: u64,
    accepted_commands: u32,
    rejected_commands: u32,
}

impl AppService {
    /// Construct the service from configuration.
    pub fn new(config: &SystemConfig) -> Self {
        Self {
            fsm: Fsm::new(build_status_table()),
            ctx: FsmContext::new(),
            sensor: DoorPositionSensor::new(),
            pulses: PulseActuator::new(),
            pulse_duration_ms: config.pulse_duration_ms,
            interlock_outputs: config.interlock_outputs,
            tick_count: 0,
            accepted_commands: 0,
            rejected_commands: 0,
        }
    }

    // ── Lifecycle ─────────────────────────────────────────────

    /// Announce `unknown` so subscribers have a defined state until the
    /// first sensed transition.
    pub fn start(&mut self, sink: &mut impl EventSink) {
        sink.emit(&AppEvent::CurrentState(ReportedState::Unknown));
        info!(
            "AppService started (pulse={}ms, interlock={})",
            self.pulse_duration_ms, self.interlock_outputs
        );
    }

    // ── Per-tick orchestration ────────────────────────────────

    /// Run one control cycle: sense → detect → arbitrate → commit pulses.
    ///
    /// `now_ms` is sampled once by the caller and used for every timing
    /// decision in this tick.  The `bus` parameter satisfies **both**
    /// [`CommandPort`] and [`EventSink`].
    pub fn tick(
        &mut self,
        now_ms: u32,
        io: &mut impl DoorIoPort,
        hmi: &mut impl HmiPort,
        bus: &mut (impl CommandPort + EventSink),
    ) -> AnnunciationState {
        self.tick_count += 1;

        // 1. Sense the end switches
        let sensed = self.sensor.sense(io);

        // 2. Transition handlers see whether our own pulse is in flight
        self.ctx.pulse_active = self.pulses.is_any_active();
        let before = self.ctx.annunciation;
        self.fsm.update(sensed, &mut self.ctx);
        self.flush(before, hmi, bus);

        // 3. Panel button
        match hmi.poll_button() {
            Some(ButtonId::Open) => {
                self.arbitrate(DoorCommand::Open, CommandSource::Local, now_ms, io, hmi, bus);
            }
            Some(ButtonId::Close) => {
                self.arbitrate(DoorCommand::Close, CommandSource::Local, now_ms, io, hmi, bus);
            }
            Some(ButtonId::Info) => hmi.show_info_page(),
            None => {}
        }

        // 4. Bus command
        if let Some(payload) = bus.take_command() {
            match DoorCommand::from_payload(&payload) {
                Ok(command) => {
                    self.arbitrate(command, CommandSource::Remote, now_ms, io, hmi, bus);
                }
                Err(e) => {
                    self.rejected_commands = self.rejected_commands.wrapping_add(1);
                    warn!("Remote command {:?} rejected: {}", payload.as_str(), e);
                }
            }
        }

        // 5. Commit: end pulses whose time is up
        self.pulses.tick(now_ms, self.pulse_duration_ms, io);

        self.ctx.annunciation
    }

    // ── Queries ───────────────────────────────────────────────

    /// Last sensed door status.
    pub fn status(&self) -> DoorStatus {
        self.fsm.current_status()
    }

    pub fn last_source(&self) -> Option<CommandSource> {
        self.ctx.last_source
    }

    pub fn annunciation(&self) -> AnnunciationState {
        self.ctx.annunciation
    }

    pub fn is_pulse_active(&self) -> bool {
        self.pulses.is_any_active()
    }

    pub fn is_output_active(&self, command: DoorCommand) -> bool {
        self.pulses.is_active(command)
    }

    /// Total control ticks executed since startup.
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    pub fn accepted_commands(&self) -> u32 {
        self.accepted_commands
    }

    /// Bus payloads and interlocked commands refused since startup.
    pub fn rejected_commands(&self) -> u32 {
        self.rejected_commands
    }

    /// End-position announcements skipped because an output was pulsing.
    pub fn suppressed_announcements(&self) -> u32 {
        self.ctx.suppressed_announcements
    }

    // ── Internal ──────────────────────────────────────────────

    /// Accept or refuse one command and apply its side effects.
    fn arbitrate(
        &mut self,
        command: DoorCommand,
        source: CommandSource,
        now_ms: u32,
        io: &mut impl DoorIoPort,
        hmi: &mut impl HmiPort,
        bus: &mut impl EventSink,
    ) {
        if self.interlock_outputs && self.pulses.is_active(command.opposite()) {
            self.rejected_commands = self.rejected_commands.wrapping_add(1);
            warn!(
                "{} command from {} rejected: {}",
                command.as_str(),
                source.as_str(),
                CommandError::Interlocked
            );
            return;
        }

        info!("Command {} from {}", command.as_str(), source.as_str());
        self.accepted_commands = self.accepted_commands.wrapping_add(1);
        self.ctx.last_source = Some(source);

        self.ctx.publish(AppEvent::RequestedState(command));
        self.ctx
            .publish(AppEvent::CurrentState(ReportedState::moving_towards(command)));
        self.ctx.publish(AppEvent::CommandSource(source));

        let before = self.ctx.annunciation;
        self.ctx.annunciation.start_motion(command);
        self.flush_events(bus);
        self.pulses.request(command, now_ms, io);
        self.apply_leds(before, hmi);
    }

    fn flush(&mut self, before: AnnunciationState, hmi: &mut impl HmiPort, sink: &mut impl EventSink) {
        self.flush_events(sink);
        self.apply_leds(before, hmi);
    }

    fn flush_events(&mut self, sink: &mut impl EventSink) {
        for event in &self.ctx.take_outbox() {
            sink.emit(event);
        }
    }

    /// Translate the LED intent delta into HMI calls.
    fn apply_leds(&self, before: AnnunciationState, hmi: &mut impl HmiPort) {
        let after = self.ctx.annunciation;
        for led in [LedId::DoorOpen, LedId::DoorClosed] {
            let blinking = after.is_blinking(led);
            let blink_changed = blinking != before.is_blinking(led);
            if blink_changed {
                hmi.set_led_blink(led, blinking);
            }
            // Stopping a blink leaves the LED off.
            let level_from = if blink_changed { false } else { before.is_lit(led) };
            if !blinking && after.is_lit(led) != level_from {
                hmi.set_led(led, after.is_lit(led));
            }
        }
    }
}
