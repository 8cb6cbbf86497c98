use super::table::Table;
use v_htmlescape::escape;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateLabel {
    Success,
    Failure,
    TimedOut,
    RequestFailed,
}

impl StateLabel {
    pub fn text(&self) -> &'static str {
        match self {
            StateLabel::Success => "SUCCESS",
            StateLabel::Failure => "FAILURE",
            StateLabel::TimedOut => "TIMED OUT",
            StateLabel::RequestFailed => "REQUEST FAILED",
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, StateLabel::Success)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tone {
    #[default]
    Neutral,
    Success,
}

/// What the details panel shows once a job stops.
#[derive(Debug, Clone, PartialEq)]
pub enum Details {
    Table(Table),
    Error(String),
}

impl Details {
    pub fn to_markup(&self) -> String {
        match self {
            Details::Table(table) => table.to_markup(),
            Details::Error(detail) => {
                format!("<div class=\"alert alert-danger\">{}</div>", escape(detail))
            }
        }
    }
}

/// A single side effect on the results page.
#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceUpdate {
    /// Progress bar width in percent, always within `[0, 100]`.
    ProgressWidth(f64),
    ProgressActive(bool),
    StateLabel(StateLabel),
    ResponseTone(Tone),
    Details(Details),
    ProgressMessage(String),
    /// Hidden reference handed to the next step (the task's `s3_path`).
    Reference(String),
    ContinueEnabled(bool),
}

/// Anything that can display the state of a polled job.
pub trait StatusSurface {
    fn apply(&mut self, update: SurfaceUpdate);
}

impl StatusSurface for Vec<SurfaceUpdate> {
    fn apply(&mut self, update: SurfaceUpdate) {
        self.push(update);
    }
}

impl<S: StatusSurface + ?Sized> StatusSurface for &mut S {
    fn apply(&mut self, update: SurfaceUpdate) {
        (**self).apply(update);
    }
}
