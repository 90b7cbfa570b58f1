//! Task Watchdog Timer (TWDT) guard for the control loop.
//!
//! The loop task subscribes once at bring-up and feeds the TWDT at the end
//! of every iteration, after the controller, panel and bus have all run.
//! A loop that stalls past `timeout_ms` panics into a reset, and the reset
//! drops both door outputs back to LOW, so a hung tick can never hold a
//! pulse HIGH.
//!
//! Each feed also records the gap since the previous one.  A gap past half
//! the timeout is logged, so a slow tick shows up before it trips the reset.
//! On the host the TWDT calls compile out and only the gap bookkeeping runs.

#[cfg(target_os = "espidf")]
use esp_idf_sys::{ESP_OK, esp_task_wdt_add, esp_task_wdt_config_t, esp_task_wdt_reconfigure, esp_task_wdt_reset};

use log::{info, warn};

pub struct Watchdog {
    timeout_ms: u32,
    last_feed_ms: Option<u32>,
    worst_gap_ms: u32,
    late_feeds: u32,
    #[cfg(target_os = "espidf")]
    subscribed: bool,
}

impl Watchdog {
    /// Subscribe the calling task to the TWDT with `timeout_ms`.
    pub fn new(timeout_ms: u32) -> Self {
        #[cfg(target_os = "espidf")]
        let subscribed = unsafe {
            let cfg = esp_task_wdt_config_t {
                timeout_ms,
                idle_core_mask: 0,
                trigger_panic: true,
            };
            let ret = esp_task_wdt_reconfigure(&cfg);
            if ret != ESP_OK {
                warn!("WDT | reconfigure returned {} (already running?)", ret);
            }
            let ret = esp_task_wdt_add(core::ptr::null_mut());
            if ret != ESP_OK {
                warn!("WDT | loop task not subscribed ({}), outputs rely on pulse expiry only", ret);
            }
            ret == ESP_OK
        };

        info!("WDT | control loop guarded, {}ms timeout", timeout_ms);

        Self {
            timeout_ms,
            last_feed_ms: None,
            worst_gap_ms: 0,
            late_feeds: 0,
            #[cfg(target_os = "espidf")]
            subscribed,
        }
    }

    pub fn timeout_ms(&self) -> u32 {
        self.timeout_ms
    }

    /// Feed once per loop iteration with that iteration's clock reading.
    pub fn feed(&mut self, now_ms: u32) {
        if let Some(last) = self.last_feed_ms {
            let gap = now_ms.wrapping_sub(last);
            self.worst_gap_ms = self.worst_gap_ms.max(gap);
            if gap > self.timeout_ms / 2 {
                self.late_feeds = self.late_feeds.wrapping_add(1);
                warn!("WDT | loop iteration took {}ms (timeout {}ms)", gap, self.timeout_ms);
            }
        }
        self.last_feed_ms = Some(now_ms);

        #[cfg(target_os = "espidf")]
        if self.subscribed {
            unsafe {
                esp_task_wdt_reset();
            }
        }
    }

    /// Longest gap between two feeds since start.
    pub fn worst_gap_ms(&self) -> u32 {
        self.worst_gap_ms
    }

    /// Feeds that arrived past half the timeout.
    pub fn late_feeds(&self) -> u32 {
        self.late_feeds
    }
}
