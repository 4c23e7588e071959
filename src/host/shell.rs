//! Terminal-backed host.
//!
//! Answers app-info requests, rings the bell on `show-app`, and drives the
//! terminal's taskbar progress indicator through the OSC 9;4 sequence.

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

use super::{AppInfo, BusSender, HostMessage, LocalBus, MessageBus, Subscription, Topic};
use crate::types::ProgressReport;

/// Bell written to ask the terminal for attention.
pub const ATTENTION_BELL: &str = "\x07";

type SharedWriter = Arc<Mutex<Box<dyn Write + Send>>>;

/// Returns the OSC 9;4 sequence for a progress report.
///
/// A fraction sets the indicator to the rounded percentage; `Clear` removes it.
pub fn progress_sequence(report: ProgressReport) -> String {
    match report {
        ProgressReport::Fraction(f) => {
            let percent = (f.clamp(0.0, 1.0) * 100.0).round() as u8;
            format!("\x1b]9;4;1;{percent}\x1b\\")
        }
        ProgressReport::Clear => "\x1b]9;4;0;0\x1b\\".to_string(),
    }
}

/// Host side of the bus for a terminal window.
///
/// Handlers stay registered for as long as the host is alive.
pub struct TerminalHost {
    info: AppInfo,
    _subscriptions: Vec<Subscription>,
}

impl TerminalHost {
    /// Registers the host handlers on `bus`, writing escape sequences to
    /// `writer`.
    pub fn attach(bus: &LocalBus, writer: Box<dyn Write + Send>) -> Self {
        let info = AppInfo {
            version: env!("CARGO_PKG_VERSION").to_string(),
            platform: std::env::consts::OS.to_string(),
        };
        let writer: SharedWriter = Arc::new(Mutex::new(writer));

        let subscriptions = vec![
            bus.subscribe(
                Topic::RequestAppInfo,
                app_info_handler(bus.sender(), info.clone()),
            ),
            bus.subscribe(Topic::ShowApp, show_app_handler(Arc::clone(&writer))),
            bus.subscribe(Topic::SetTaskbarProgress, progress_handler(writer)),
        ];

        debug!(version = %info.version, platform = %info.platform, "terminal host attached");
        Self {
            info,
            _subscriptions: subscriptions,
        }
    }

    /// Metadata this host answers with.
    pub fn info(&self) -> &AppInfo {
        &self.info
    }
}

impl std::fmt::Debug for TerminalHost {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalHost")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

fn app_info_handler(reply: BusSender, info: AppInfo) -> super::Handler {
    Box::new(move |_| reply.send(HostMessage::SetAppInfo(info.clone())))
}

fn show_app_handler(writer: SharedWriter) -> super::Handler {
    Box::new(move |_| {
        info!("window raised");
        write_sequence(&writer, ATTENTION_BELL);
    })
}

fn progress_handler(writer: SharedWriter) -> super::Handler {
    Box::new(move |message| {
        if let HostMessage::SetTaskbarProgress(report) = message {
            write_sequence(&writer, &progress_sequence(*report));
        }
    })
}

fn write_sequence(writer: &SharedWriter, sequence: &str) {
    let mut out = writer.lock().unwrap_or_else(PoisonError::into_inner);
    if let Err(e) = out
        .write_all(sequence.as_bytes())
        .and_then(|()| out.flush())
    {
        warn!(error = %e, "failed to write to terminal");
    }
}

// ============================================================================
// Tests
// ============================================================================
