use crate::status::{
    Details, PollOutcome, StateLabel, StatusSurface, SurfaceUpdate, Tone,
};
use derivative::Derivative;
use std::sync::mpsc::{Receiver, Sender};

/// Messages sent from the polling thread to the window.
#[derive(Debug, Clone)]
pub enum MonitorEvent {
    Update(SurfaceUpdate),
    Stopped(PollOutcome),
}

#[derive(Clone, Debug, Default, PartialEq)]
pub enum RunPhase {
    #[default]
    Idle,
    Polling,
    Stopped(PollOutcome),
}

/// Everything the results page displays for one polled job.
#[derive(Derivative)]
#[derivative(Debug, Default)]
pub struct PageState {
    pub phase: RunPhase,
    pub progress_width: f64,
    #[derivative(Default(value = "true"))]
    pub progress_active: bool,
    pub state_label: Option<StateLabel>,
    pub response_tone: Tone,
    pub details: Option<Details>,
    pub progress_message: String,
    pub reference: Option<String>,
    pub continue_enabled: bool,
    pub show_markup: bool,
    #[derivative(Debug = "ignore")]
    pub event_receiver: Option<Receiver<MonitorEvent>>,
}

impl PageState {
    pub fn clear(&mut self) {
        *self = PageState::default();
    }

    pub fn is_polling(&self) -> bool {
        matches!(self.phase, RunPhase::Polling)
    }

    /// Fraction in `[0, 1]` for the progress bar widget.
    pub fn progress_fraction(&self) -> f32 {
        (self.progress_width / 100.0).clamp(0.0, 1.0) as f32
    }

    /// Applies every event queued by the polling thread. Returns whether
    /// anything changed.
    pub fn drain_events(&mut self) -> bool {
        let Some(receiver) = self.event_receiver.take() else {
            return false;
        };

        let mut had_updates = false;
        let mut stopped = false;
        while let Ok(event) = receiver.try_recv() {
            had_updates = true;
            match event {
                MonitorEvent::Update(update) => self.apply(update),
                MonitorEvent::Stopped(outcome) => {
                    self.phase = RunPhase::Stopped(outcome);
                    stopped = true;
                }
            }
        }

        if !stopped {
            self.event_receiver = Some(receiver);
        }
        had_updates
    }

    pub fn get_status_text(&self) -> String {
        match &self.phase {
            RunPhase::Idle => String::new(),
            RunPhase::Polling => format!("Polling… {:.0}%", self.progress_width),
            RunPhase::Stopped(outcome) => match outcome {
                PollOutcome::Finished { attempts } => {
                    format!("Finished after {} requests", attempts)
                }
                PollOutcome::Exhausted { attempts } => {
                    format!("Gave up after {} requests", attempts)
                }
                PollOutcome::RequestFailed { attempts, .. } => {
                    format!("Status endpoint unreachable after {} requests", attempts)
                }
                PollOutcome::Malformed { .. } => "Unexpected response from server".to_string(),
                PollOutcome::Cancelled { attempts } => {
                    format!("Stopped by user after {} requests", attempts)
                }
            },
        }
    }
}

impl StatusSurface for PageState {
    fn apply(&mut self, update: SurfaceUpdate) {
        match update {
            SurfaceUpdate::ProgressWidth(width) => self.progress_width = width,
            SurfaceUpdate::ProgressActive(active) => self.progress_active = active,
            SurfaceUpdate::StateLabel(label) => self.state_label = Some(label),
            SurfaceUpdate::ResponseTone(tone) => self.response_tone = tone,
            SurfaceUpdate::Details(details) => self.details = Some(details),
            SurfaceUpdate::ProgressMessage(message) => self.progress_message = message,
            SurfaceUpdate::Reference(reference) => self.reference = Some(reference),
            SurfaceUpdate::ContinueEnabled(enabled) => self.continue_enabled = enabled,
        }
    }
}

/// Forwards surface updates from the polling thread to the window and asks
/// egui to repaint.
pub struct ChannelSurface {
    sender: Sender<MonitorEvent>,
    ctx: Option<egui::Context>,
}

impl ChannelSurface {
    pub fn new(sender: Sender<MonitorEvent>, ctx: Option<egui::Context>) -> Self {
        Self { sender, ctx }
    }

    pub fn stopped(&self, outcome: PollOutcome) {
        self.send(MonitorEvent::Stopped(outcome));
    }

    fn send(&self, event: MonitorEvent) {
        if self.sender.send(event).is_err() {
            tracing::debug!("monitor window closed, dropping update");
        }
        if let Some(ctx) = &self.ctx {
            ctx.request_repaint();
        }
    }
}

impl StatusSurface for ChannelSurface {
    fn apply(&mut self, update: SurfaceUpdate) {
        self.send(MonitorEvent::Update(update));
    }
}
