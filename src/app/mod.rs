mod state;
mod ui;

use crate::config::PollConfig;
use crate::status::{show_failure, HttpStatusSource, PollOutcome, Poller, StateLabel};
use crate::utils::curl_parser::CurlParser;
use eframe::{egui, App};
pub use state::{ChannelSurface, MonitorEvent, PageState, RunPhase};
use std::sync::mpsc as std_mpsc;
use tokio_util::sync::CancellationToken;

/// Desktop window that polls one job and renders its results page.
pub struct StatusMonitor {
    config: PollConfig,
    url_text: String,
    curl_text: String,
    curl_parser: CurlParser,
    state: PageState,
    cancel: Option<CancellationToken>,
    error_message: Option<String>,
}

impl StatusMonitor {
    pub fn new(cc: &eframe::CreationContext<'_>, config: PollConfig) -> Self {
        tracing::info!(url = %config.url, "initializing status monitor");
        let mut monitor = Self {
            url_text: config.url.clone(),
            config,
            curl_text: String::new(),
            curl_parser: CurlParser::new(),
            state: PageState::default(),
            cancel: None,
            error_message: None,
        };
        // The page starts polling as soon as it is shown.
        monitor.start_polling(Some(cc.egui_ctx.clone()));
        monitor
    }

    /// Applies a pasted "Copy as cURL" command to the poll settings.
    pub fn import_curl(&mut self) {
        if let Err(e) = self.curl_parser.parse(&self.curl_text) {
            tracing::warn!(error = %e, "could not parse curl command");
            self.error_message = Some(format!("Error parsing curl command: {}", e));
            return;
        }
        if let Some(url) = self.curl_parser.url.take() {
            self.url_text = url;
        }
        if let Some(headers) = self.curl_parser.headers.take() {
            tracing::info!(headers = headers.len(), "imported request headers");
            self.config = std::mem::take(&mut self.config).with_headers(headers);
        }
        self.error_message = None;
    }

    pub fn start_polling(&mut self, ctx: Option<egui::Context>) {
        self.stop_polling();
        self.state.clear();
        self.error_message = None;

        let config = self.config.clone().with_url(self.url_text.trim());
        let cancel = CancellationToken::new();
        let (sender, receiver) = std_mpsc::channel();
        self.state.event_receiver = Some(receiver);
        self.state.phase = RunPhase::Polling;
        self.cancel = Some(cancel.clone());

        tracing::info!(url = %config.url, "starting poll thread");

        std::thread::spawn(move || {
            let mut surface = ChannelSurface::new(sender, ctx);
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::error!(error = %e, "could not start tokio runtime");
                    let error = format!("could not start runtime: {}", e);
                    show_failure(StateLabel::RequestFailed, error.clone(), &mut surface);
                    surface.stopped(PollOutcome::RequestFailed { attempts: 0, error });
                    return;
                }
            };

            rt.block_on(async {
                let source = HttpStatusSource::from_config(&config);
                let mut poller = Poller::with_cancellation(source, config, cancel);
                let outcome = poller.run(&mut surface).await;
                surface.stopped(outcome);
            });
        });
    }

    pub fn stop_polling(&mut self) {
        if let Some(cancel) = self.cancel.take() {
            tracing::info!("stopping poll thread");
            cancel.cancel();
        }
    }

    /// Hands the stored reference on to the next step.
    pub fn continue_with_reference(&mut self, ctx: &egui::Context) {
        if let Some(reference) = &self.state.reference {
            tracing::info!(reference = %reference, "continuing with stored reference");
            ctx.output_mut(|o| o.copied_text = reference.clone());
            println!("{}", reference);
        }
    }

    pub fn update_state(&mut self, ctx: &egui::Context) {
        if self.state.drain_events() {
            ctx.request_repaint();
        }
        if !self.state.is_polling() {
            self.cancel = None;
        }
    }
}

impl Drop for StatusMonitor {
    fn drop(&mut self) {
        self.stop_polling();
    }
}

impl App for StatusMonitor {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.update_state(ctx);
        self.render(ctx);
    }
}
