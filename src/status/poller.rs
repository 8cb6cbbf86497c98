use super::interpreter::{interpret, show_failure, Continuation};
use super::source::StatusSource;
use super::surface::{StateLabel, StatusSurface, SurfaceUpdate};
use super::types::JobUpdate;
use crate::config::PollConfig;
use crate::error::PollError;
use tokio_util::sync::CancellationToken;

/// How a polling run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PollOutcome {
    /// The job reached a terminal status.
    Finished { attempts: u32 },
    /// The attempt cap was reached before the job finished.
    Exhausted { attempts: u32 },
    /// The status endpoint kept failing.
    RequestFailed { attempts: u32, error: String },
    /// The endpoint answered with something that is not a valid status.
    Malformed { attempts: u32, error: String },
    Cancelled { attempts: u32 },
}

impl PollOutcome {
    pub fn attempts(&self) -> u32 {
        match self {
            PollOutcome::Finished { attempts }
            | PollOutcome::Exhausted { attempts }
            | PollOutcome::RequestFailed { attempts, .. }
            | PollOutcome::Malformed { attempts, .. }
            | PollOutcome::Cancelled { attempts } => *attempts,
        }
    }
}

/// Drives one polling loop: fetch, interpret, wait, repeat.
///
/// Only one request is ever in flight; the delay starts after the previous
/// response has been applied to the surface.
pub struct Poller<S> {
    source: S,
    config: PollConfig,
    cancel: CancellationToken,
}

impl<S: StatusSource> Poller<S> {
    pub fn new(source: S, config: PollConfig) -> Self {
        Self::with_cancellation(source, config, CancellationToken::new())
    }

    pub fn with_cancellation(source: S, config: PollConfig, cancel: CancellationToken) -> Self {
        Self {
            source,
            config,
            cancel,
        }
    }

    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    pub async fn run<T>(&mut self, surface: &mut T) -> PollOutcome
    where
        T: StatusSurface + ?Sized,
    {
        let variant = self.config.variant;
        let mut attempts: u32 = 0;
        let mut transport_failures: u32 = 0;

        tracing::info!(
            url = %self.config.url,
            variant = ?variant,
            max_attempts = ?self.config.max_attempts,
            "polling job status"
        );

        loop {
            if self.cancel.is_cancelled() {
                return cancelled(attempts);
            }

            let fetched = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return cancelled(attempts),
                fetched = self.source.fetch() => fetched,
            };
            attempts += 1;

            match fetched {
                Ok(response) => {
                    transport_failures = 0;
                    tracing::debug!(attempt = attempts, status = %response.status, "status received");

                    let update = match JobUpdate::decode(variant, response) {
                        Ok(update) => update,
                        Err(e) => return malformed(attempts, e.to_string(), surface),
                    };
                    if interpret(variant, update, surface) == Continuation::Complete {
                        tracing::info!(attempts, "job reached a terminal status");
                        return PollOutcome::Finished { attempts };
                    }
                }
                Err(e) if !e.is_transient() => {
                    return malformed(attempts, e.to_string(), surface);
                }
                Err(e) => {
                    transport_failures += 1;
                    tracing::warn!(
                        attempt = attempts,
                        failures = transport_failures,
                        error = %e,
                        "status request failed"
                    );
                    if transport_failures > self.config.max_transport_retries {
                        return request_failed(attempts, e, surface);
                    }
                }
            }

            if let Some(max) = self.config.max_attempts {
                if attempts >= max {
                    tracing::info!(attempts, "attempt limit reached, giving up");
                    surface.apply(SurfaceUpdate::ProgressActive(false));
                    surface.apply(SurfaceUpdate::StateLabel(StateLabel::TimedOut));
                    return PollOutcome::Exhausted { attempts };
                }
            }

            tracing::debug!(attempt = attempts, "trying again");
            tokio::select! {
                biased;
                _ = self.cancel.cancelled() => return cancelled(attempts),
                _ = tokio::time::sleep(self.config.interval) => {}
            }
        }
    }
}

fn cancelled(attempts: u32) -> PollOutcome {
    tracing::info!(attempts, "polling cancelled");
    PollOutcome::Cancelled { attempts }
}

fn malformed<T>(attempts: u32, error: String, surface: &mut T) -> PollOutcome
where
    T: StatusSurface + ?Sized,
{
    tracing::warn!(attempt = attempts, error = %error, "malformed status payload");
    show_failure(
        StateLabel::Failure,
        format!("malformed status payload: {error}"),
        surface,
    );
    PollOutcome::Malformed { attempts, error }
}

fn request_failed<T>(attempts: u32, error: PollError, surface: &mut T) -> PollOutcome
where
    T: StatusSurface + ?Sized,
{
    let error = error.to_string();
    tracing::warn!(attempts, error = %error, "giving up on status endpoint");
    show_failure(StateLabel::RequestFailed, error.clone(), surface);
    PollOutcome::RequestFailed { attempts, error }
}
