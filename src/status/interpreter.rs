use super::surface::{Details, StateLabel, StatusSurface, SurfaceUpdate, Tone};
use super::types::{Completion, JobUpdate, ProgressReport, TaskOutcome};
use crate::config::Variant;

/// Whether the poller should ask again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Continuation {
    Incomplete,
    Complete,
}

impl Continuation {
    pub fn is_incomplete(&self) -> bool {
        matches!(self, Continuation::Incomplete)
    }
}

/// Percentage of the job that is done, clamped to `[0, 100]`.
///
/// A zero or negative total yields 0 rather than a NaN width.
pub fn progress_width(current: f64, total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    let width = 100.0 * current / total;
    if width.is_nan() {
        0.0
    } else {
        width.clamp(0.0, 100.0)
    }
}

/// Applies one validated update to `surface` and reports whether polling
/// should continue.
pub fn interpret<S>(variant: Variant, update: JobUpdate, surface: &mut S) -> Continuation
where
    S: StatusSurface + ?Sized,
{
    match update {
        JobUpdate::Pending => {
            tracing::debug!("job pending");
            Continuation::Incomplete
        }
        JobUpdate::Progress(report) => {
            show_progress(variant, report, surface);
            Continuation::Incomplete
        }
        JobUpdate::Succeeded(Completion::Table(table)) => {
            tracing::info!(
                rows = table.rows.len(),
                columns = table.column_count(),
                "job succeeded"
            );
            surface.apply(SurfaceUpdate::ProgressWidth(100.0));
            surface.apply(SurfaceUpdate::StateLabel(StateLabel::Success));
            surface.apply(SurfaceUpdate::ResponseTone(Tone::Success));
            surface.apply(SurfaceUpdate::Details(Details::Table(table)));
            Continuation::Complete
        }
        JobUpdate::Succeeded(Completion::Task(outcome)) => {
            surface.apply(SurfaceUpdate::ProgressActive(false));
            match outcome {
                TaskOutcome::Failed => {
                    tracing::warn!("task finished with an error");
                    surface.apply(SurfaceUpdate::StateLabel(StateLabel::Failure));
                    surface.apply(SurfaceUpdate::ProgressMessage("Error".to_string()));
                }
                TaskOutcome::Stored { s3_path } => {
                    tracing::info!(s3_path = %s3_path, "task succeeded");
                    surface.apply(SurfaceUpdate::ProgressWidth(100.0));
                    surface.apply(SurfaceUpdate::StateLabel(StateLabel::Success));
                    surface.apply(SurfaceUpdate::ProgressMessage("Finished".to_string()));
                    surface.apply(SurfaceUpdate::Reference(s3_path));
                    surface.apply(SurfaceUpdate::ContinueEnabled(true));
                }
            }
            Continuation::Complete
        }
        JobUpdate::Failed { detail } => {
            tracing::warn!(detail = %detail, "job failed");
            show_failure(StateLabel::Failure, detail, surface);
            Continuation::Complete
        }
    }
}

fn show_progress<S>(variant: Variant, report: ProgressReport, surface: &mut S)
where
    S: StatusSurface + ?Sized,
{
    let width = progress_width(report.current, report.total);
    tracing::debug!(
        current = report.current,
        total = report.total,
        width,
        "job in progress"
    );
    surface.apply(SurfaceUpdate::ProgressWidth(width));
    if variant == Variant::Task {
        surface.apply(SurfaceUpdate::ProgressMessage(
            report.message.unwrap_or_default(),
        ));
    }
}

/// Puts the page into a terminal failure state with `detail` in the details panel.
pub fn show_failure<S>(label: StateLabel, detail: String, surface: &mut S)
where
    S: StatusSurface + ?Sized,
{
    surface.apply(SurfaceUpdate::ProgressActive(false));
    surface.apply(SurfaceUpdate::StateLabel(label));
    surface.apply(SurfaceUpdate::Details(Details::Error(detail)));
}
