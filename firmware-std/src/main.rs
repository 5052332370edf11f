//! stationwatch ESP-IDF std firmware
//!
//! The radio runs in promiscuous mode and feeds every captured management
//! frame into the station tracker. The processor and purger run on their own
//! FreeRTOS threads; a hop thread cycles the 2.4 GHz channels, and the main
//! thread logs pipeline counters until the processor stops.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use stationwatch::defaults::{DEFAULT_DWELL_MS, WIFI_CHANNELS};
use stationwatch::protocol::VERSION;
use stationwatch::report::epoch_of;
use stationwatch::{
    FrameIngress, IdentityFilter, LogReporter, StationTracker, TickClock, TrackerConfig,
};

use esp_idf_svc::hal::peripherals::Peripherals;
use esp_idf_svc::sys::{
    configTICK_RATE_HZ, esp, esp_get_free_heap_size, esp_wifi_set_channel,
    esp_wifi_set_promiscuous, esp_wifi_set_promiscuous_rx_cb, wifi_promiscuous_pkt_t,
    wifi_promiscuous_pkt_type_t, wifi_second_chan_t_WIFI_SECOND_CHAN_NONE, xTaskGetTickCount,
};
use esp_idf_svc::wifi::{BlockingWifi, EspWifi};
use esp_idf_svc::{eventloop::EspSystemEventLoop, nvs::EspDefaultNvsPartition};

/// Tracker config baked in at build time, e.g.
/// `STATIONWATCH_CONFIG='{"max_age_ms":60000,"purge_period_ms":90000}'`.
const CONFIG_JSON: Option<&str> = option_env!("STATIONWATCH_CONFIG");

const STATS_INTERVAL: Duration = Duration::from_secs(30);

// ── Promiscuous callback ingress ─────────────────────────────────────

static INGRESS: Mutex<Option<FrameIngress>> = Mutex::new(None);

/// WiFi promiscuous mode callback.
///
/// Runs in the WiFi driver task context and must not block: frames that do
/// not fit in the queue are dropped and counted by the tracker.
unsafe extern "C" fn promisc_rx_cb(
    buf: *mut std::ffi::c_void,
    _pkt_type: wifi_promiscuous_pkt_type_t,
) {
    let pkt = unsafe { &*(buf as *const wifi_promiscuous_pkt_t) };
    let rssi = pkt.rx_ctrl.rssi() as i8;
    let channel = pkt.rx_ctrl.channel() as u8;
    let sig_len = pkt.rx_ctrl.sig_len() as usize;

    if sig_len == 0 {
        return;
    }

    // Safety: payload is `sig_len` bytes starting at pkt.payload
    let payload = unsafe { std::slice::from_raw_parts(pkt.payload.as_ptr(), sig_len) };

    if let Ok(guard) = INGRESS.try_lock() {
        if let Some(ref ingress) = *guard {
            ingress.offer_frame(payload, rssi, channel);
        }
    }
}

fn load_config() -> anyhow::Result<TrackerConfig> {
    match CONFIG_JSON {
        Some(json) => Ok(TrackerConfig::from_json(json.as_bytes())?),
        None => Ok(TrackerConfig::default()),
    }
}

fn main() -> anyhow::Result<()> {
    // Bind the ESP-IDF logger to the `log` facade
    esp_idf_svc::log::EspLogger::initialize_default();

    log::info!("stationwatch v{} starting (std)", VERSION);

    let config = load_config()?;
    let filter = IdentityFilter::with_defaults();
    log::info!("Exclusion list loaded: {} prefixes", filter.len());

    // FreeRTOS tick counter, widened past its 32-bit wrap
    let clock = Arc::new(TickClock::new(
        || unsafe { xTaskGetTickCount() },
        configTICK_RATE_HZ,
    ));

    // Dump lines carry wall-clock dates once the system time is set (SNTP/RTC)
    let reporter = LogReporter::with_epoch(epoch_of(&*clock));

    let tracker = StationTracker::with_clock(config, filter, clock)?;
    let handle = tracker.spawn(Some(Arc::new(reporter)))?;

    *INGRESS.lock().unwrap() = Some(tracker.ingress());

    // ── WiFi sniffer ─────────────────────────────────────────────────

    let peripherals = Peripherals::take()?;
    let sys_loop = EspSystemEventLoop::take()?;
    let nvs = EspDefaultNvsPartition::take()?;

    let mut wifi = BlockingWifi::wrap(
        EspWifi::new(peripherals.modem, sys_loop.clone(), Some(nvs))?,
        sys_loop,
    )?;
    wifi.set_configuration(&esp_idf_svc::wifi::Configuration::Client(Default::default()))?;
    wifi.start()?;

    unsafe {
        esp!(esp_wifi_set_promiscuous(true))?;
        esp!(esp_wifi_set_promiscuous_rx_cb(Some(promisc_rx_cb)))?;
    }
    log::info!("WiFi sniffer initialized in promiscuous mode");

    // ── Channel hop thread ───────────────────────────────────────────

    thread::Builder::new()
        .name("chanhop".into())
        .stack_size(2048)
        .spawn(channel_hop_thread)?;
    log::info!("Channel hop thread spawned");

    // ── Stats loop ───────────────────────────────────────────────────

    while !handle.processor_finished() {
        thread::sleep(STATS_INTERVAL);

        let stats = tracker.stats();
        let heap_free = unsafe { esp_get_free_heap_size() };
        log::info!(
            "{} stations, {} frames ({} excluded, {} dropped), heap {} bytes",
            tracker.count(),
            stats.processed,
            stats.excluded,
            stats.dropped,
            heap_free
        );
    }

    // Processor only exits on its own when the registry cannot grow
    unsafe {
        esp!(esp_wifi_set_promiscuous(false))?;
    }
    INGRESS.lock().unwrap().take();
    handle.shutdown()?;
    Ok(())
}

// ── Channel hopping ──────────────────────────────────────────────────

fn channel_hop_thread() {
    loop {
        for &ch in WIFI_CHANNELS {
            unsafe {
                esp_wifi_set_channel(ch, wifi_second_chan_t_WIFI_SECOND_CHAN_NONE);
            }
            thread::sleep(Duration::from_millis(DEFAULT_DWELL_MS));
        }
    }
}
