//! Fire-and-forget attempt analytics.
//!
//! Events are pushed onto a bounded queue drained by a dedicated thread;
//! delivery failure or a full queue drops the event. Scheduling never waits
//! on this module.

use crate::actions::ActionType;
use crate::executor::ActionOutcome;
use serde_json::Value;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::{sync_channel, SyncSender, TrySendError};
use std::sync::{Mutex, OnceLock};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

const DEFAULT_ANALYTICS_QUEUE_CAPACITY: usize = 512;
const DEFAULT_ANALYTICS_HTTP_TIMEOUT_MS: u64 = 2_000;

#[derive(Clone, Copy, Debug)]
pub enum AnalyticsLevel {
    Info,
    Attempt,
    Critical,
}

#[derive(Clone, Debug)]
struct AnalyticsEvent {
    ts_ms: u64,
    level: AnalyticsLevel,
    kind: String,
    message: String,
    details: Option<Value>,
}

#[derive(Clone, Debug)]
struct AnalyticsConfig {
    webhook_url: Option<String>,
    telegram_bot_token: Option<String>,
    telegram_chat_id: Option<String>,
    timeout_ms: u64,
}

static ANALYTICS_SENDER: OnceLock<SyncSender<AnalyticsEvent>> = OnceLock::new();
static ANALYTICS_INIT_GUARD: OnceLock<Mutex<()>> = OnceLock::new();
static LAST_ANALYTICS_NOW_MS: AtomicU64 = AtomicU64::new(1);

fn now_ms() -> u64 {
    let sample = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .ok()
        .map(|d| d.as_millis() as u64);
    let mut prev = LAST_ANALYTICS_NOW_MS.load(Ordering::Relaxed);
    loop {
        let normalized = sample.unwrap_or(prev).max(prev).max(1);
        match LAST_ANALYTICS_NOW_MS.compare_exchange_weak(
            prev,
            normalized,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => return normalized,
            Err(actual) => prev = actual,
        }
    }
}

fn load_queue_capacity() -> usize {
    std::env::var("ANALYTICS_QUEUE_CAPACITY")
        .ok()
        .and_then(|raw| raw.trim().parse::<usize>().ok())
        .map(|v| v.clamp(64, 16_384))
        .unwrap_or(DEFAULT_ANALYTICS_QUEUE_CAPACITY)
}

fn load_timeout_ms() -> u64 {
    std::env::var("ANALYTICS_HTTP_TIMEOUT_MS")
        .ok()
        .and_then(|raw| raw.trim().parse::<u64>().ok())
        .map(|v| v.clamp(250, 15_000))
        .unwrap_or(DEFAULT_ANALYTICS_HTTP_TIMEOUT_MS)
}

fn load_config() -> AnalyticsConfig {
    AnalyticsConfig {
        webhook_url: std::env::var("FLEET_WEBHOOK_URL").ok(),
        telegram_bot_token: std::env::var("TELEGRAM_BOT_TOKEN").ok(),
        telegram_chat_id: std::env::var("TELEGRAM_CHAT_ID").ok(),
        timeout_ms: load_timeout_ms(),
    }
}

fn config_enabled(cfg: &AnalyticsConfig) -> bool {
    cfg.webhook_url
        .as_deref()
        .is_some_and(|v| !v.trim().is_empty())
        || (cfg
            .telegram_bot_token
            .as_deref()
            .is_some_and(|v| !v.trim().is_empty())
            && cfg
                .telegram_chat_id
                .as_deref()
                .is_some_and(|v| !v.trim().is_empty()))
}

fn fmt_level(level: AnalyticsLevel) -> &'static str {
    match level {
        AnalyticsLevel::Info => "INFO",
        AnalyticsLevel::Attempt => "ATTEMPT",
        AnalyticsLevel::Critical => "CRITICAL",
    }
}

fn render_message(event: &AnalyticsEvent) -> String {
    let mut msg = format!(
        "[{}][ts_ms={}] {}: {}",
        fmt_level(event.level),
        event.ts_ms,
        event.kind,
        event.message
    );
    if let Some(details) = &event.details {
        msg.push_str(" | details=");
        msg.push_str(&details.to_string());
    }
    msg
}

fn send_webhook(client: &reqwest::blocking::Client, webhook_url: &str, event: &AnalyticsEvent) {
    let payload = serde_json::json!({
        "content": render_message(event),
    });
    let _ = client.post(webhook_url).json(&payload).send();
}

fn send_telegram(
    client: &reqwest::blocking::Client,
    bot_token: &str,
    chat_id: &str,
    event: &AnalyticsEvent,
) {
    let url = format!("https://api.telegram.org/bot{bot_token}/sendMessage");
    let payload = serde_json::json!({
        "chat_id": chat_id,
        "text": render_message(event),
        "disable_web_page_preview": true,
    });
    let _ = client.post(url).json(&payload).send();
}

fn spawn_worker(cfg: AnalyticsConfig) -> SyncSender<AnalyticsEvent> {
    let (tx, rx) = sync_channel::<AnalyticsEvent>(load_queue_capacity());
    std::thread::spawn(move || {
        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_millis(cfg.timeout_ms))
            .build()
            .unwrap_or_else(|_| reqwest::blocking::Client::new());
        while let Ok(event) = rx.recv() {
            if let Some(url) = cfg.webhook_url.as_deref() {
                send_webhook(&client, url, &event);
            }
            if let (Some(token), Some(chat_id)) = (
                cfg.telegram_bot_token.as_deref(),
                cfg.telegram_chat_id.as_deref(),
            ) {
                send_telegram(&client, token, chat_id, &event);
            }
        }
    });
    tx
}

pub fn init_analytics() {
    if ANALYTICS_SENDER.get().is_some() {
        return;
    }
    let guard = ANALYTICS_INIT_GUARD.get_or_init(|| Mutex::new(()));
    let lock = guard.lock();
    let _guard = match lock {
        Ok(g) => g,
        Err(p) => p.into_inner(),
    };
    if ANALYTICS_SENDER.get().is_some() {
        return;
    }
    let cfg = load_config();
    if !config_enabled(&cfg) {
        return;
    }
    let tx = spawn_worker(cfg);
    let _ = ANALYTICS_SENDER.set(tx);
}

pub fn emit(level: AnalyticsLevel, kind: impl Into<String>, message: impl Into<String>) {
    emit_with_details(level, kind, message, None);
}

pub fn emit_with_details(
    level: AnalyticsLevel,
    kind: impl Into<String>,
    message: impl Into<String>,
    details: Option<Value>,
) {
    if ANALYTICS_SENDER.get().is_none() {
        init_analytics();
    }
    let Some(sender) = ANALYTICS_SENDER.get() else {
        return;
    };

    let event = AnalyticsEvent {
        ts_ms: now_ms(),
        level,
        kind: kind.into(),
        message: message.into(),
        details,
    };
    match sender.try_send(event) {
        Ok(_) => {}
        Err(TrySendError::Full(_)) => {}
        Err(TrySendError::Disconnected(_)) => {}
    }
}

/// One event per settled execution attempt.
pub fn emit_attempt(wallet: &str, chain: &str, action: ActionType, outcome: &ActionOutcome) {
    emit_with_details(
        AnalyticsLevel::Attempt,
        "attempt",
        format!("{wallet}/{chain}/{action}"),
        Some(serde_json::json!({
            "wallet": wallet,
            "chain": chain,
            "action": action.as_str(),
            "success": outcome.succeeded,
            "classification": outcome.class.as_str(),
        })),
    );
}

pub fn emit_critical(kind: impl Into<String>, message: impl Into<String>) {
    emit(AnalyticsLevel::Critical, kind, message);
}
