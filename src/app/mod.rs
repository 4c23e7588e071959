//! The timer window's event loop.
//!
//! [`App`] owns the state machine, the settings panel and the host bus. A
//! single task multiplexes keyboard lines, tick tokens and Ctrl-C; it is the
//! only code that mutates timer state. After every input the loop drains the
//! machine's events into side effects (host messages, notification, alarm),
//! delivers queued host messages and redraws the window.

pub mod input;

use std::io::Write;
use std::sync::{Arc, Mutex, PoisonError};

use anyhow::{Context, Result};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::cli::display::{Display, CLEAR_LINE, HELP_TEXT};
use crate::host::{AppInfo, HostMessage, LocalBus, MessageBus, Subscription, TerminalHost, Topic};
use crate::notification::{NotificationContent, Notifier};
use crate::settings::{SettingsEdit, SettingsError, SettingsPanel};
use crate::sound::{AlarmSound, SoundPlayer};
use crate::store::SettingsStore;
use crate::timer::{TickScheduler, TickToken, TimerError, TimerEvent, TimerMachine};
use crate::types::{Mode, ProgressReport, RunState};

pub use input::{InputError, UiCommand};

/// Whether the loop keeps going after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flow {
    Continue,
    Quit,
}

/// The interactive timer window.
pub struct App {
    machine: TimerMachine,
    events: mpsc::UnboundedReceiver<TimerEvent>,
    panel: SettingsPanel,
    bus: LocalBus,
    _host: TerminalHost,
    _subscriptions: Vec<Subscription>,
    app_info: Arc<Mutex<Option<AppInfo>>>,
    notifier: Option<Box<dyn Notifier>>,
    player: Option<Box<dyn SoundPlayer>>,
    alarm: AlarmSound,
    out: Box<dyn Write>,
}

impl App {
    /// Builds the window over `settings`.
    ///
    /// `bus` must be the bus any notifier posts clicks on. `out` receives the
    /// rendered window and `host_out` the host's control sequences.
    pub fn new(
        settings: SettingsStore,
        scheduler: Box<dyn TickScheduler>,
        bus: LocalBus,
        out: Box<dyn Write>,
        host_out: Box<dyn Write + Send>,
    ) -> Result<Self> {
        let (event_tx, events) = mpsc::unbounded_channel();
        let machine = TimerMachine::new(settings.clone(), scheduler, event_tx)
            .context("failed to initialize timer")?;
        let mut panel = SettingsPanel::new(settings).context("failed to load settings")?;
        panel.sync_with_timer(machine.state());

        let host = TerminalHost::attach(&bus, host_out);

        let app_info = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&app_info);
        let info_sub = bus.subscribe(
            Topic::SetAppInfo,
            Box::new(move |message| {
                if let HostMessage::SetAppInfo(info) = message {
                    *sink.lock().unwrap_or_else(PoisonError::into_inner) = Some(info.clone());
                }
            }),
        );

        Ok(Self {
            machine,
            events,
            panel,
            bus,
            _host: host,
            _subscriptions: vec![info_sub],
            app_info,
            notifier: None,
            player: None,
            alarm: AlarmSound::Chime,
            out,
        })
    }

    /// Posts a notification through `notifier` when a session finishes.
    pub fn with_notifier(mut self, notifier: Box<dyn Notifier>) -> Self {
        self.notifier = Some(notifier);
        self
    }

    /// Plays `alarm` through `player` when a session finishes.
    pub fn with_player(mut self, player: Box<dyn SoundPlayer>, alarm: AlarmSound) -> Self {
        self.player = Some(player);
        self.alarm = alarm;
        self
    }

    /// The state machine, for inspection.
    pub fn machine(&self) -> &TimerMachine {
        &self.machine
    }

    /// The settings panel, for inspection.
    pub fn panel(&self) -> &SettingsPanel {
        &self.panel
    }

    /// App metadata received from the host, once answered.
    pub fn app_info(&self) -> Option<AppInfo> {
        self.app_info
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Requests app metadata and draws the window.
    pub fn startup(&mut self) -> Result<()> {
        self.bus.send(HostMessage::RequestAppInfo);
        self.bus.dispatch_pending();

        let header = Display::header(self.app_info().as_ref());
        self.print(&header)?;
        self.print("type h for help")?;
        self.render()
    }

    /// Runs until `quit`, end of input, or Ctrl-C.
    pub async fn run<R>(mut self, input: R, mut ticks: mpsc::UnboundedReceiver<TickToken>) -> Result<()>
    where
        R: AsyncBufRead + Unpin,
    {
        self.startup()?;

        let mut lines = input.lines();
        let ctrl_c = tokio::signal::ctrl_c();
        tokio::pin!(ctrl_c);

        loop {
            tokio::select! {
                line = lines.next_line() => {
                    let Some(line) = line.context("failed to read input")? else {
                        debug!("input closed");
                        break;
                    };
                    if self.handle_line(&line)? == Flow::Quit {
                        break;
                    }
                }
                Some(token) = ticks.recv() => self.handle_tick(token)?,
                _ = &mut ctrl_c => {
                    debug!("interrupted");
                    break;
                }
            }
        }

        self.shutdown()
    }

    /// Parses and executes one input line.
    pub fn handle_line(&mut self, line: &str) -> Result<Flow> {
        match UiCommand::parse(line) {
            Ok(command) => self.handle_command(command),
            Err(e) => {
                self.print(&e.to_string())?;
                self.render()?;
                Ok(Flow::Continue)
            }
        }
    }

    /// Executes a command and redraws.
    pub fn handle_command(&mut self, command: UiCommand) -> Result<Flow> {
        debug!(?command, "command");
        let outcome = match command {
            UiCommand::Quit => return Ok(Flow::Quit),
            UiCommand::Toggle => self.toggle().map_err(CommandError::from),
            UiCommand::Start => self.machine.start().map_err(CommandError::from),
            UiCommand::Pause => self.machine.pause().map_err(CommandError::from),
            UiCommand::Resume => self.machine.resume().map_err(CommandError::from),
            UiCommand::Restart => self.machine.restart().map_err(CommandError::from),
            UiCommand::Mode(Some(mode)) => self.machine.switch_mode(mode).map_err(CommandError::from),
            UiCommand::Mode(None) => self.machine.toggle_mode().map_err(CommandError::from),
            UiCommand::OpenSettings => self.panel.open().map_err(CommandError::from),
            UiCommand::CloseSettings => {
                self.panel.close();
                Ok(())
            }
            UiCommand::SetDuration { mode, field, raw } => self.edit(|panel| {
                panel.edit_duration_input(mode, field, &raw)
            }),
            UiCommand::Progress(enabled) => {
                self.edit(|panel| panel.set_progress_in_taskbar(enabled))
            }
            UiCommand::Help => {
                self.print(HELP_TEXT)?;
                Ok(())
            }
        };

        match outcome {
            Ok(()) => {}
            Err(CommandError::Timer(TimerError::ChannelClosed)) => {
                return Err(TimerError::ChannelClosed.into());
            }
            Err(e) => {
                warn!(error = %e, "command rejected");
                self.print(&e.to_string())?;
            }
        }

        self.after_input()?;
        Ok(Flow::Continue)
    }

    /// Delivers a tick token to the machine and redraws.
    pub fn handle_tick(&mut self, token: TickToken) -> Result<()> {
        self.machine.handle_tick(token)?;
        self.after_input()
    }

    /// Clears any taskbar indicator left behind and ends the status line.
    pub fn shutdown(&mut self) -> Result<()> {
        if self.machine.progress_enabled() && self.machine.state().run_state.is_in_progress() {
            self.bus
                .send(HostMessage::SetTaskbarProgress(ProgressReport::Clear));
            self.bus.dispatch_pending();
        }
        writeln!(self.out).context("failed to write to terminal")?;
        info!("window closed");
        Ok(())
    }

    fn toggle(&mut self) -> Result<(), TimerError> {
        match self.machine.state().run_state {
            RunState::Idle => self.machine.start(),
            RunState::Running => self.machine.pause(),
            RunState::Paused => self.machine.resume(),
        }
    }

    fn edit<F>(&mut self, apply: F) -> Result<(), CommandError>
    where
        F: FnOnce(&mut SettingsPanel) -> Result<SettingsEdit, SettingsError>,
    {
        let edit = apply(&mut self.panel)?;
        self.machine.apply_edit(&edit)?;
        Ok(())
    }

    fn after_input(&mut self) -> Result<()> {
        self.drain_events()?;
        self.bus.dispatch_pending();
        self.panel.sync_with_timer(self.machine.state());
        self.render()
    }

    fn drain_events(&mut self) -> Result<()> {
        while let Ok(event) = self.events.try_recv() {
            match event {
                TimerEvent::Started { .. } => self.dismiss_notification(),
                TimerEvent::Progress(report) => {
                    self.bus.send(HostMessage::SetTaskbarProgress(report));
                }
                TimerEvent::SessionCompleted { finished, next } => {
                    self.print(&Display::session_finished(finished, next))?;
                    self.on_session_finished(finished);
                }
                _ => {}
            }
        }
        Ok(())
    }

    fn dismiss_notification(&self) {
        if let Some(notifier) = &self.notifier {
            if let Err(e) = notifier.dismiss() {
                warn!(error = %e, hint = e.suggestion(), "notification not dismissed");
            }
        }
    }

    fn on_session_finished(&mut self, finished: Mode) {
        if let Some(notifier) = &self.notifier {
            if let Err(e) = notifier.notify(&NotificationContent::for_finished(finished)) {
                warn!(error = %e, hint = e.suggestion(), "notification failed");
            }
        }

        self.bus.send(HostMessage::ShowApp);

        if let Some(player) = &self.player {
            if let Err(e) = player.play(&self.alarm) {
                warn!(error = %e, "alarm failed");
            }
        }
    }

    fn print(&mut self, text: &str) -> Result<()> {
        write!(self.out, "{CLEAR_LINE}").context("failed to write to terminal")?;
        writeln!(self.out, "{text}").context("failed to write to terminal")?;
        Ok(())
    }

    fn render(&mut self) -> Result<()> {
        if self.panel.is_open() {
            let panel = Display::settings_panel(&self.panel);
            self.print(&panel)?;
        }
        let line = Display::status_line(self.machine.state());
        write!(self.out, "{CLEAR_LINE}{line}").context("failed to write to terminal")?;
        self.out.flush().context("failed to write to terminal")?;
        Ok(())
    }
}

impl std::fmt::Debug for App {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("App")
            .field("machine", &self.machine)
            .field("panel", &self.panel)
            .field("alarm", &self.alarm)
            .finish_non_exhaustive()
    }
}

/// A command that was refused. Printed, never fatal.
#[derive(Debug, thiserror::Error)]
enum CommandError {
    #[error(transparent)]
    Timer(#[from] TimerError),
    #[error(transparent)]
    Settings(#[from] SettingsError),
}

// ============================================================================
// Tests
// ============================================================================
