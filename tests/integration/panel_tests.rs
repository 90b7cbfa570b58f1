//! Front panel end to end: expander levels in, LED levels out, with the
//! real [`HmiAdapter`] between the panel and the controller.

use crate::mock_hw::{MockBus, MockDoorIo, MockPanel};

use gdc::adapters::hmi::HmiAdapter;
use gdc::app::commands::{CommandSource, DoorCommand};
use gdc::app::events::AppEvent;
use gdc::app::ports::LedId;
use gdc::app::service::AppService;
use gdc::config::SystemConfig;

struct Bench {
    app: AppService,
    io: MockDoorIo,
    hmi: HmiAdapter<MockPanel>,
    bus: MockBus,
}

impl Bench {
    fn new() -> Self {
        let config = SystemConfig::default();
        let mut bench = Self {
            app: AppService::new(&config),
            io: MockDoorIo::new(),
            hmi: HmiAdapter::new(MockPanel::default(), &config),
            bus: MockBus::new(),
        };
        bench.app.start(&mut bench.bus);
        bench
    }

    /// One main-loop iteration: panel first, then the controller.
    fn tick(&mut self, now_ms: u32) {
        self.hmi.tick(now_ms);
        self.app.tick(now_ms, &mut self.io, &mut self.hmi, &mut self.bus);
    }

    fn run(&mut self, from_ms: u32, to_ms: u32) {
        for now in (from_ms..to_ms).step_by(10) {
            self.tick(now);
        }
    }

    fn panel(&mut self) -> &mut MockPanel {
        self.hmi.panel_mut()
    }
}

#[test]
fn held_button_issues_one_command() {
    let mut bench = Bench::new();
    bench.io.set_closed();
    bench.tick(0);

    bench.panel().buttons.open = true;
    bench.run(10, 1_000);
    bench.panel().buttons.open = false;
    bench.run(1_000, 1_200);

    let requests = bench
        .bus
        .events
        .iter()
        .filter(|e| matches!(e, AppEvent::RequestedState(DoorCommand::Open)))
        .count();
    assert_eq!(requests, 1);
    assert_eq!(bench.app.last_source(), Some(CommandSource::Local));
}

#[test]
fn command_blinks_target_led_until_position_reached() {
    let mut bench = Bench::new();
    bench.io.set_closed();
    bench.tick(0);
    assert!(bench.hmi.panel().led(LedId::DoorClosed));

    bench.panel().buttons.open = true;
    bench.tick(100);
    bench.panel().buttons.open = false;
    assert!(bench.hmi.is_blinking(LedId::DoorOpen));
    assert!(!bench.hmi.panel().led(LedId::DoorClosed));

    // Blink toggles on the panel while travelling.
    let mut seen = [false; 2];
    for now in (110..1_500).step_by(10) {
        bench.tick(now);
        seen[bench.hmi.panel().led(LedId::DoorOpen) as usize] = true;
    }
    assert_eq!(seen, [true, true]);

    bench.io.set_open();
    bench.tick(1_500);
    assert!(!bench.hmi.is_blinking(LedId::DoorOpen));
    assert!(bench.hmi.panel().led(LedId::DoorOpen));
    assert!(!bench.hmi.panel().led(LedId::DoorClosed));
}

#[test]
fn info_button_lights_info_led_and_opens_page() {
    let mut bench = Bench::new();
    bench.panel().buttons.info = true;
    bench.tick(0);

    assert!(bench.hmi.panel().led(LedId::SystemInfo));
    assert_eq!(bench.hmi.info_requests(), 1);
    assert!(bench.io.writes.is_empty());

    bench.panel().buttons.info = false;
    bench.tick(100);
    assert!(!bench.hmi.panel().led(LedId::SystemInfo));
}

#[test]
fn dead_expander_leaves_door_logic_running() {
    let mut bench = Bench::new();
    bench.panel().fail = true;
    bench.io.set_closed();
    bench.run(0, 500);
    assert!(bench.hmi.io_errors() > 0);
    assert!(bench.hmi.io_errors() <= 5);

    bench.bus.deliver("open");
    bench.tick(500);
    assert!(bench.io.output_high(DoorCommand::Open));
}
