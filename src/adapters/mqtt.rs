//! MQTT adapter: implements [`CommandPort`] and [`EventSink`] over a broker
//! connection.
//!
//! ## Topics
//!
//! All topics live under the configured prefix (`gdc` by default):
//!
//! | Suffix                        | Dir | Retained | Payload                    |
//! |-------------------------------|-----|----------|----------------------------|
//! | `control/setnewdoorstate`     | in  |          | `open` / `close`           |
//! | `control/getnewdoorstate`     | out | no       | `open` / `close`           |
//! | `control/getcurrentdoorstate` | out | no       | reported door state        |
//! | `control/commandsource`       | out | no       | `local`/`remote`/`external`|
//! | `system/status`               | out | yes      | `online`, LWT `offline`    |
//! | `system/uptime`               | out | no       | seconds since boot         |
//! | `system/info`                 | out | yes      | JSON identity              |
//! | `system/restart`              | in  |          | `restart`                  |
//!
//! ## Threading
//!
//! The client library delivers inbound messages on its own event thread.
//! That thread only ever touches the shared [`CommandSlot`]; everything
//! else runs on the control loop.  The slot holds one payload: a newer
//! command overwrites one that has not been taken yet.

use core::fmt::Write as _;
use core::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use heapless::String;
use log::{debug, info, warn};
use serde::Serialize;

use crate::app::commands::{CommandPayload, payload_from_bytes};
use crate::app::events::{AppEvent, ReportedState};
use crate::app::ports::{CommandPort, EventSink};
use crate::config::{IdentityConfig, MAX_TOPIC_PREFIX_LEN, SystemConfig};
use crate::error::BusError;

pub const MAX_TOPIC_LEN: usize = 64;

pub type TopicPath = String<MAX_TOPIC_LEN>;

pub const RESTART_PAYLOAD: &str = "restart";
pub const ONLINE: &str = "online";
pub const OFFLINE: &str = "offline";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Topic {
    SetNewDoorState,
    GetNewDoorState,
    GetCurrentDoorState,
    CommandSource,
    SystemStatus,
    SystemUptime,
    SystemInfo,
    SystemRestart,
}

impl Topic {
    pub const ALL: [Self; 8] = [
        Self::SetNewDoorState,
        Self::GetNewDoorState,
        Self::GetCurrentDoorState,
        Self::CommandSource,
        Self::SystemStatus,
        Self::SystemUptime,
        Self::SystemInfo,
        Self::SystemRestart,
    ];

    /// Topics subscribed on every new connection.
    pub const INBOUND: [Self; 2] = [Self::SetNewDoorState, Self::SystemRestart];

    pub const fn suffix(self) -> &'static str {
        match self {
            Self::SetNewDoorState => "control/setnewdoorstate",
            Self::GetNewDoorState => "control/getnewdoorstate",
            Self::GetCurrentDoorState => "control/getcurrentdoorstate",
            Self::CommandSource => "control/commandsource",
            Self::SystemStatus => "system/status",
            Self::SystemUptime => "system/uptime",
            Self::SystemInfo => "system/info",
            Self::SystemRestart => "system/restart",
        }
    }

    /// Full topic path under `prefix`.
    pub fn path(self, prefix: &str) -> Result<TopicPath, BusError> {
        let mut path = TopicPath::new();
        write!(path, "{}/{}", prefix, self.suffix()).map_err(|_| BusError::TopicTooLong)?;
        Ok(path)
    }

    /// Reverse of [`Topic::path`].
    pub fn from_path(prefix: &str, path: &str) -> Option<Self> {
        let suffix = path.strip_prefix(prefix)?.strip_prefix('/')?;
        Self::ALL.into_iter().find(|t| t.suffix() == suffix)
    }
}

/// Map an application event to its outbound topic and payload.
pub fn marshal(event: &AppEvent) -> (Topic, &'static str) {
    match *event {
        AppEvent::RequestedState(command) => (Topic::GetNewDoorState, command.as_str()),
        AppEvent::CurrentState(state) => (Topic::GetCurrentDoorState, state.as_str()),
        AppEvent::CommandSource(source) => (Topic::CommandSource, source.as_str()),
    }
}

// ───────────────────────────────────────────────────────────────
// Transport seam
// ───────────────────────────────────────────────────────────────

/// Minimal broker client surface the adapter needs.
pub trait MqttTransport {
    fn is_connected(&self) -> bool;
    fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), BusError>;
    fn subscribe(&mut self, topic: &str) -> Result<(), BusError>;
}

// ───────────────────────────────────────────────────────────────
// Inbound slot (shared with the client event thread)
// ───────────────────────────────────────────────────────────────

pub struct CommandSlot {
    prefix: String<MAX_TOPIC_PREFIX_LEN>,
    command: Signal<CriticalSectionRawMutex, CommandPayload>,
    restart: AtomicBool,
    received: AtomicU32,
}

impl CommandSlot {
    pub fn new(prefix: &str) -> Self {
        Self {
            prefix: crate::config::fixed_str(prefix),
            command: Signal::new(),
            restart: AtomicBool::new(false),
            received: AtomicU32::new(0),
        }
    }

    /// Route one inbound message.  Called from the client event thread.
    pub fn on_message(&self, topic: &str, data: &[u8]) {
        self.received.fetch_add(1, Ordering::Relaxed);

        match Topic::from_path(&self.prefix, topic) {
            Some(Topic::SetNewDoorState) => match payload_from_bytes(data) {
                Some(payload) => {
                    debug!("MQTT | command payload {:?}", payload.as_str());
                    self.command.signal(payload);
                }
                None => warn!(
                    "MQTT | dropped {} byte payload on {} (not UTF-8 or too long)",
                    data.len(),
                    topic
                ),
            },
            Some(Topic::SystemRestart) => {
                if data == RESTART_PAYLOAD.as_bytes() {
                    warn!("MQTT | restart requested");
                    self.restart.store(true, Ordering::SeqCst);
                } else {
                    warn!("MQTT | ignoring restart topic payload ({} bytes)", data.len());
                }
            }
            _ => debug!("MQTT | ignoring message on {}", topic),
        }
    }

    /// Take the pending command payload, leaving the slot empty.
    pub fn take(&self) -> Option<CommandPayload> {
        self.command.try_take()
    }

    pub fn restart_requested(&self) -> bool {
        self.restart.load(Ordering::SeqCst)
    }

    pub fn packets_received(&self) -> u32 {
        self.received.load(Ordering::Relaxed)
    }
}

// ───────────────────────────────────────────────────────────────
// Adapter
// ───────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct SystemInfo<'a> {
    application: &'a str,
    version: &'a str,
    author: &'a str,
}

pub struct MqttAdapter<T> {
    transport: T,
    slot: Arc<CommandSlot>,
    prefix: String<MAX_TOPIC_PREFIX_LEN>,
    identity: IdentityConfig,
    status_interval_ms: u32,
    session_up: bool,
    last_status_ms: Option<u32>,
    last_state: Option<ReportedState>,
    packets_sent: u32,
    publish_failures: u32,
}

impl<T: MqttTransport> MqttAdapter<T> {
    pub fn new(transport: T, slot: Arc<CommandSlot>, config: &SystemConfig) -> Self {
        Self {
            transport,
            slot,
            prefix: config.mqtt.topic_prefix.clone(),
            identity: config.identity.clone(),
            status_interval_ms: config.mqtt.status_interval_ms,
            session_up: false,
            last_status_ms: None,
            last_state: None,
            packets_sent: 0,
            publish_failures: 0,
        }
    }

    /// Connection bookkeeping and periodic status.  Runs once per loop
    /// iteration after the controller tick.
    pub fn tick(&mut self, now_ms: u32, uptime_secs: u64) {
        let connected = self.transport.is_connected();
        let was_up = core::mem::replace(&mut self.session_up, connected);
        if connected && !was_up {
            self.on_connected();
            self.last_status_ms = None;
        } else if !connected && was_up {
            warn!("MQTT | broker connection lost");
        }

        if !connected {
            return;
        }

        let due = self
            .last_status_ms
            .is_none_or(|last| now_ms.wrapping_sub(last) >= self.status_interval_ms);
        if due {
            self.last_status_ms = Some(now_ms);
            self.publish_status(uptime_secs);
        }
    }

    /// Publish `payload` on `topic` under the configured prefix.  Fails
    /// with `NotConnected` until [`MqttAdapter::tick`] has seen the session
    /// come up; the last door state is replayed at that point.
    pub fn publish(&mut self, topic: Topic, payload: &[u8], retain: bool) -> Result<(), BusError> {
        if !(self.session_up && self.transport.is_connected()) {
            return Err(BusError::NotConnected);
        }
        let path = topic.path(&self.prefix)?;
        self.transport.publish(&path, payload, retain)?;
        self.packets_sent = self.packets_sent.wrapping_add(1);
        Ok(())
    }

    pub fn is_restart_requested(&self) -> bool {
        self.slot.restart_requested()
    }

    pub fn packets_sent(&self) -> u32 {
        self.packets_sent
    }

    pub fn packets_received(&self) -> u32 {
        self.slot.packets_received()
    }

    pub fn publish_failures(&self) -> u32 {
        self.publish_failures
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    fn on_connected(&mut self) {
        info!("MQTT | connected, subscribing under '{}'", self.prefix);

        for topic in Topic::INBOUND {
            let result = topic
                .path(&self.prefix)
                .and_then(|path| self.transport.subscribe(&path));
            if let Err(e) = result {
                warn!("MQTT | subscribe to {} failed: {}", topic.suffix(), e);
            }
        }

        match self.info_json() {
            Some(json) => self.publish_logged(Topic::SystemInfo, json.as_bytes(), true),
            None => warn!("MQTT | system info serialisation failed"),
        }
        self.publish_logged(Topic::SystemStatus, ONLINE.as_bytes(), true);

        if let Some(state) = self.last_state {
            self.publish_logged(Topic::GetCurrentDoorState, state.as_str().as_bytes(), false);
        }
    }

    fn publish_status(&mut self, uptime_secs: u64) {
        let mut uptime: String<20> = String::new();
        // u64::MAX is 20 digits.
        let _ = write!(uptime, "{}", uptime_secs);
        self.publish_logged(Topic::SystemUptime, uptime.as_bytes(), false);
        self.publish_logged(Topic::SystemStatus, ONLINE.as_bytes(), true);
    }

    fn info_json(&self) -> Option<std::string::String> {
        serde_json::to_string(&SystemInfo {
            application: &self.identity.application,
            version: env!("CARGO_PKG_VERSION"),
            author: &self.identity.author,
        })
        .ok()
    }

    fn publish_logged(&mut self, topic: Topic, payload: &[u8], retain: bool) {
        if let Err(e) = self.publish(topic, payload, retain) {
            self.publish_failures = self.publish_failures.wrapping_add(1);
            if e == BusError::NotConnected {
                debug!("MQTT | {} dropped, not connected", topic.suffix());
            } else {
                warn!("MQTT | publish to {} failed: {}", topic.suffix(), e);
            }
        }
    }
}

// ── Port implementations ──────────────────────────────────────

impl<T: MqttTransport> CommandPort for MqttAdapter<T> {
    fn take_command(&mut self) -> Option<CommandPayload> {
        self.slot.take()
    }
}

impl<T: MqttTransport> EventSink for MqttAdapter<T> {
    fn emit(&mut self, event: &AppEvent) {
        if let AppEvent::CurrentState(state) = *event {
            self.last_state = Some(state);
        }
        let (topic, payload) = marshal(event);
        debug!("MQTT | {} <- {}", topic.suffix(), payload);
        self.publish_logged(topic, payload.as_bytes(), false);
    }
}

// ───────────────────────────────────────────────────────────────
// ESP-IDF client
// ───────────────────────────────────────────────────────────────

#[cfg(target_os = "espidf")]
pub use esp::EspMqttTransport;

#[cfg(target_os = "espidf")]
mod esp {
    use core::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Arc;
    use std::time::Duration;

    use esp_idf_svc::mqtt::client::{
        EspMqttClient, EventPayload, LwtConfiguration, MqttClientConfiguration, QoS,
    };
    use log::{error, info, warn};

    use super::{CommandSlot, MqttTransport, OFFLINE, Topic};
    use crate::config::SystemConfig;
    use crate::error::{BusError, Error};

    const EVENT_THREAD_STACK: usize = 6 * 1024;

    fn non_empty(s: &str) -> Option<&str> {
        (!s.is_empty()).then_some(s)
    }

    pub struct EspMqttTransport {
        client: EspMqttClient<'static>,
        connected: Arc<AtomicBool>,
    }

    impl EspMqttTransport {
        /// Create the client and start its event thread.  The broker
        /// connection itself comes up asynchronously.
        pub fn connect(config: &SystemConfig, slot: Arc<CommandSlot>) -> anyhow::Result<Self> {
            let mqtt = &config.mqtt;
            let lwt_topic = Topic::SystemStatus
                .path(&mqtt.topic_prefix)
                .map_err(Error::from)?;

            let conf = MqttClientConfiguration {
                client_id: Some(mqtt.client_id.as_str()),
                username: non_empty(&mqtt.username),
                password: non_empty(&mqtt.password),
                keep_alive_interval: Some(Duration::from_secs(u64::from(mqtt.keep_alive_secs))),
                lwt: Some(LwtConfiguration {
                    topic: lwt_topic.as_str(),
                    payload: OFFLINE.as_bytes(),
                    qos: QoS::AtLeastOnce,
                    retain: true,
                }),
                ..Default::default()
            };

            info!("MQTT | broker {}", mqtt.broker_url);
            let (client, mut connection) = EspMqttClient::new(&mqtt.broker_url, &conf)?;

            let connected = Arc::new(AtomicBool::new(false));
            let flag = connected.clone();

            std::thread::Builder::new()
                .name("mqtt-events".into())
                .stack_size(EVENT_THREAD_STACK)
                .spawn(move || {
                    while let Ok(event) = connection.next() {
                        match event.payload() {
                            EventPayload::Connected(_) => {
                                info!("MQTT | session up");
                                flag.store(true, Ordering::SeqCst);
                            }
                            EventPayload::Disconnected => {
                                warn!("MQTT | session down, client will retry");
                                flag.store(false, Ordering::SeqCst);
                            }
                            EventPayload::Received {
                                topic: Some(topic),
                                data,
                                ..
                            } => slot.on_message(topic, data),
                            EventPayload::Error(e) => error!("MQTT | {:?}", e),
                            _ => {}
                        }
                    }
                    warn!("MQTT | event loop ended");
                    flag.store(false, Ordering::SeqCst);
                })?;

            Ok(Self { client, connected })
        }
    }

    impl MqttTransport for EspMqttTransport {
        fn is_connected(&self) -> bool {
            self.connected.load(Ordering::SeqCst)
        }

        fn publish(&mut self, topic: &str, payload: &[u8], retain: bool) -> Result<(), BusError> {
            self.client
                .enqueue(topic, QoS::AtMostOnce, retain, payload)
                .map(|_| ())
                .map_err(|_| BusError::PublishFailed)
        }

        fn subscribe(&mut self, topic: &str) -> Result<(), BusError> {
            self.client
                .subscribe(topic, QoS::AtMostOnce)
                .map(|_| ())
                .map_err(|_| BusError::SubscribeFailed)
        }
    }
}
