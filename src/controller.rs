// src/controller.rs
//! Owns the lifecycle of one analysis request at a time: input acquisition,
//! submission, rendering of the returned report and its export.
//!
//! The controller is driven by discrete events (submit, import, toggle,
//! export). Every handler takes `&mut self`, so a second submission cannot
//! start while one is in flight. Front ends follow state changes, including
//! the busy phase of a pending submit, through [`AnalysisController::subscribe`].

use std::path::{Path, PathBuf};
use std::time::Duration;

use tokio::sync::watch;

use crate::client::AnalysisApi;
use crate::errors::{AnalyzerError, Result};
use crate::input::{AttachedFile, ImportOrigin, InputSource, InputState};
use crate::models::{Mode, Report};
use crate::preferences::{self, PreferenceStore};

/// File name used for exported reports.
pub const EXPORT_FILENAME: &str = "security_report.json";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Submitting,
}

/// What the output panel currently shows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Output {
    Empty,
    Processing,
    /// Pretty-printed report.
    Report(String),
    /// Human-readable failure message.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Panel {
    phase: Phase,
    output: Output,
    export_enabled: bool,
}

impl Default for Panel {
    fn default() -> Self {
        Self {
            phase: Phase::Idle,
            output: Output::Empty,
            export_enabled: false,
        }
    }
}

/// Snapshot of everything a front end needs to draw the form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewModel {
    pub phase: Phase,
    pub submit_enabled: bool,
    pub busy: bool,
    pub export_enabled: bool,
    pub output: Output,
    pub mode: Mode,
    pub input_text: String,
    pub attached_file: Option<String>,
}

impl Panel {
    fn apply_to(&self, view: &mut ViewModel) {
        let busy = self.phase == Phase::Submitting;
        view.phase = self.phase;
        view.busy = busy;
        view.submit_enabled = !busy;
        view.export_enabled = self.export_enabled;
        view.output = self.output.clone();
    }
}

/// Marks the panel busy for the lifetime of one submission. Dropping it,
/// including when the submit future is abandoned mid-flight, always returns
/// the panel to `Idle`. Every transition is published to subscribers.
struct InFlight<'a> {
    panel: &'a mut Panel,
    views: &'a watch::Sender<ViewModel>,
}

impl<'a> InFlight<'a> {
    fn begin(panel: &'a mut Panel, views: &'a watch::Sender<ViewModel>) -> Self {
        panel.phase = Phase::Submitting;
        panel.output = Output::Processing;
        panel.export_enabled = false;
        let in_flight = Self { panel, views };
        in_flight.publish();
        in_flight
    }

    fn publish(&self) {
        self.views.send_modify(|view| self.panel.apply_to(view));
    }

    fn succeed(&mut self, rendered: String) {
        self.panel.output = Output::Report(rendered);
        self.panel.export_enabled = true;
        self.publish();
    }

    fn fail(&mut self, message: String) {
        self.panel.output = Output::Failed(message);
        self.panel.export_enabled = false;
        self.publish();
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if self.panel.output == Output::Processing {
            log::warn!("Analysis request abandoned before completion");
            self.fail(AnalyzerError::Cancelled.to_string());
        }
        self.panel.phase = Phase::Idle;
        self.publish();
    }
}

pub struct AnalysisController<A, P> {
    api: A,
    prefs: P,
    mode: Mode,
    input: InputState,
    report: Option<Report>,
    session_id: Option<String>,
    panel: Panel,
    views: watch::Sender<ViewModel>,
    request_timeout: Option<Duration>,
}

impl<A: AnalysisApi, P: PreferenceStore> AnalysisController<A, P> {
    /// Creates a controller, restoring the persisted mode from `prefs`.
    pub fn new(api: A, prefs: P) -> Self {
        let mode = preferences::load_mode(&prefs);
        log::debug!("Controller starting in {} mode", mode);
        let (views, _) = watch::channel(ViewModel {
            phase: Phase::Idle,
            submit_enabled: true,
            busy: false,
            export_enabled: false,
            output: Output::Empty,
            mode,
            input_text: String::new(),
            attached_file: None,
        });
        Self {
            api,
            prefs,
            mode,
            input: InputState::default(),
            report: None,
            session_id: None,
            panel: Panel::default(),
            views,
            request_timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.request_timeout = timeout;
        self
    }

    pub fn view(&self) -> ViewModel {
        let mut view = ViewModel {
            phase: Phase::Idle,
            submit_enabled: true,
            busy: false,
            export_enabled: false,
            output: Output::Empty,
            mode: self.mode,
            input_text: self.input.text.clone(),
            attached_file: self.input.file.as_ref().map(|f| f.name.clone()),
        };
        self.panel.apply_to(&mut view);
        view
    }

    /// Receiver that always holds the latest view, updated on every state
    /// change. It is the only way to watch a submission while it is pending.
    pub fn subscribe(&self) -> watch::Receiver<ViewModel> {
        self.views.subscribe()
    }

    fn publish(&self) {
        self.views.send_replace(self.view());
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn report(&self) -> Option<&Report> {
        self.report.as_ref()
    }

    /// Identifier the backend assigned to the last successful analysis.
    pub fn session_id(&self) -> Option<&str> {
        self.session_id.as_deref()
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    pub fn set_input_text(&mut self, text: impl Into<String>) {
        self.input.text = text.into();
        self.publish();
    }

    /// Attaches a file without loading it into the text field.
    pub fn attach_file(&mut self, file: AttachedFile) {
        self.input.file = Some(file);
        self.publish();
    }

    /// Loads a local file into the text field and keeps it attached.
    ///
    /// Dropped files must be plain text; anything else is rejected and the
    /// current input is left untouched.
    pub async fn import_local_file(
        &mut self,
        path: impl AsRef<Path>,
        origin: ImportOrigin,
    ) -> Result<()> {
        self.import_file(AttachedFile::from_path(path), origin).await
    }

    /// Same as [`Self::import_local_file`] for a file whose metadata is
    /// already known.
    pub async fn import_file(&mut self, file: AttachedFile, origin: ImportOrigin) -> Result<()> {
        if origin == ImportOrigin::Drop && !file.is_plain_text() {
            log::warn!("Rejected dropped file '{}' ({:?})", file.name, file.mime);
            return Err(AnalyzerError::RejectedFile { name: file.name });
        }

        let text = file.read_text().await?;
        log::info!("Loaded {} chars from '{}'", text.len(), file.name);
        self.input.text = text;
        self.input.file = Some(file);
        self.publish();
        Ok(())
    }

    /// Sends the current input for analysis and renders the outcome.
    ///
    /// Returns `EmptyInput` without touching the panel or the network when
    /// there is nothing to send. Every other failure is rendered into the
    /// output panel and also returned.
    pub async fn submit(&mut self) -> Result<()> {
        let source = self.input.source()?;
        let mode = self.mode;

        self.report = None;
        let mut in_flight = InFlight::begin(&mut self.panel, &self.views);

        let outcome = request_report(&self.api, source, mode, self.request_timeout).await;
        match outcome {
            Ok(completed) => {
                log::info!(
                    "Analysis completed (session={})",
                    completed.session_id.as_deref().unwrap_or("-")
                );
                in_flight.succeed(completed.rendered);
                self.report = Some(completed.report);
                self.session_id = completed.session_id;
                Ok(())
            }
            Err(e) => {
                log::error!("Error during analysis: {}", e);
                in_flight.fail(e.to_string());
                Err(e)
            }
        }
    }

    /// Writes the held report to `dir/security_report.json`. Returns `None`
    /// when there is no report to export.
    pub async fn export_report(&self, dir: impl AsRef<Path>) -> Result<Option<PathBuf>> {
        let Some(report) = &self.report else {
            log::debug!("Export skipped: no report held");
            return Ok(None);
        };

        let path = dir.as_ref().join(EXPORT_FILENAME);
        tokio::fs::write(&path, report.to_pretty_json()?).await?;
        log::info!("Report exported to {}", path.display());
        Ok(Some(path))
    }

    /// Flips and persists the analysis mode. Only later submissions see it.
    pub fn toggle_mode(&mut self) -> Result<Mode> {
        let next = self.mode.toggled();
        preferences::save_mode(&mut self.prefs, next)?;
        self.mode = next;
        self.publish();
        log::info!("Analysis mode set to {}", next);
        Ok(next)
    }
}

struct CompletedAnalysis {
    report: Report,
    rendered: String,
    session_id: Option<String>,
}

async fn request_report<A: AnalysisApi>(
    api: &A,
    source: InputSource,
    mode: Mode,
    timeout: Option<Duration>,
) -> Result<CompletedAnalysis> {
    let exchange = async {
        let envelope = match &source {
            InputSource::Text(text) => api.analyze_text(text, mode).await?,
            InputSource::File(file) => {
                let upload = file.read_upload().await?;
                api.analyze_upload(&upload, mode).await?
            }
        };
        let report = Report::from_envelope(&envelope)?;
        let rendered = report.to_pretty_json()?;
        Ok::<_, AnalyzerError>(CompletedAnalysis {
            report,
            rendered,
            session_id: envelope.session_id,
        })
    };

    match timeout {
        Some(limit) => tokio::time::timeout(limit, exchange)
            .await
            .map_err(|_| AnalyzerError::Timeout(limit.as_secs()))?,
        None => exchange.await,
    }
}
