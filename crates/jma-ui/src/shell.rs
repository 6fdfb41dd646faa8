//! Line-oriented terminal shell.
//!
//! Typed input takes the place of clicks: an office code selects that
//! office, a region code expands or collapses the region. Forecast results
//! arrive from the background service and are polled between inputs.

use std::io::{self, BufRead, Write};
use std::sync::mpsc::{self, Receiver, RecvTimeoutError, TryRecvError};
use std::time::Duration;

use jma_core::{AppError, UiConfig};

use crate::services::{ForecastService, ForecastServiceMessage};
use crate::state::{AppState, Applied};
use crate::views;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

const HELP: &str = "\
  <office code>   show the forecast for an office
  <region code>   expand or collapse a region
  r               reload the current forecast
  ?               show this help
  q               quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Select(String),
    Toggle(String),
    Reload,
    Redraw,
    Help,
    Quit,
}

impl Command {
    /// Interpret one input line against the current region index
    pub fn parse(line: &str, state: &AppState) -> Command {
        match line.trim() {
            "" => Command::Redraw,
            "q" | "quit" | "exit" => Command::Quit,
            "?" | "h" | "help" => Command::Help,
            "r" | "reload" => Command::Reload,
            code if state.index().get(code).is_some() => Command::Toggle(code.to_string()),
            code => Command::Select(code.to_string()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Control {
    Continue,
    Exit,
}

pub struct Shell<W: Write> {
    state: AppState,
    service: ForecastService,
    rx: Receiver<ForecastServiceMessage>,
    ui: UiConfig,
    out: W,
}

impl<W: Write> Shell<W> {
    pub fn new(
        state: AppState,
        service: ForecastService,
        rx: Receiver<ForecastServiceMessage>,
        ui: UiConfig,
        out: W,
    ) -> Self {
        Self {
            state,
            service,
            rx,
            ui,
            out,
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn output(&self) -> &W {
        &self.out
    }

    /// Auto-select the startup office, if any region has one, and draw
    pub fn start(&mut self) -> io::Result<()> {
        match self.state.startup_office().map(|o| o.code.clone()) {
            Some(code) => {
                tracing::info!(office = %code, "Showing startup office");
                self.select(&code);
            }
            None => tracing::info!("No offices in any region; waiting for input"),
        }
        self.draw()
    }

    /// Handle one command
    pub fn handle(&mut self, command: Command) -> io::Result<Control> {
        match command {
            Command::Quit => return Ok(Control::Exit),
            Command::Help => {
                writeln!(self.out, "{}", HELP)?;
                return Ok(Control::Continue);
            }
            Command::Select(code) => self.select(&code),
            Command::Reload => match self.state.selected().map(str::to_string) {
                Some(code) => self.select(&code),
                None => writeln!(self.out, "Nothing selected")?,
            },
            Command::Toggle(code) => {
                self.state.toggle_region(&code);
            }
            Command::Redraw => {}
        }
        self.draw()?;
        Ok(Control::Continue)
    }

    /// Apply any finished fetches. Returns true if the display changed.
    pub fn poll_service(&mut self) -> io::Result<bool> {
        let mut changed = false;
        loop {
            match self.rx.try_recv() {
                Ok(ForecastServiceMessage::FetchDone {
                    generation,
                    office_code,
                    result,
                }) => {
                    let error = result.as_ref().err().cloned();
                    match self.state.apply(generation, result) {
                        Applied::Updated => changed = true,
                        Applied::Stale => {}
                        Applied::Failed => {
                            changed = true;
                            if let Some(e) = error {
                                let app_error = AppError::from(e);
                                writeln!(
                                    self.out,
                                    "! {} ({})",
                                    app_error.user_message(),
                                    office_code
                                )?;
                            }
                        }
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::warn!("Forecast service channel closed");
                    break;
                }
            }
        }

        if changed {
            self.draw()?;
        }
        Ok(changed)
    }

    /// Read commands from `input` until quit or end of input
    pub fn run<R>(mut self, input: R) -> io::Result<()>
    where
        R: BufRead + Send + 'static,
    {
        let (line_tx, line_rx) = mpsc::channel::<io::Result<String>>();
        std::thread::Builder::new()
            .name("jma-input".into())
            .spawn(move || {
                for line in input.lines() {
                    if line_tx.send(line).is_err() {
                        break;
                    }
                }
            })?;

        loop {
            self.poll_service()?;

            match line_rx.recv_timeout(POLL_INTERVAL) {
                Ok(line) => {
                    let command = Command::parse(&line?, &self.state);
                    if self.handle(command)? == Control::Exit {
                        break;
                    }
                }
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    tracing::debug!("Input closed");
                    break;
                }
            }
        }

        self.service.cancel();
        Ok(())
    }

    fn select(&mut self, office_code: &str) {
        let generation = self.state.select_office(office_code);
        self.service.select(office_code, generation);
    }

    fn draw(&mut self) -> io::Result<()> {
        write!(self.out, "{}", views::screen(&self.state, &self.ui))?;
        self.out.flush()
    }
}
