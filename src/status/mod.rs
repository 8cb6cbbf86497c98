mod interpreter;
mod poller;
mod source;
mod surface;
mod table;
mod types;

pub use interpreter::{interpret, progress_width, show_failure, Continuation};
pub use poller::{PollOutcome, Poller};
pub use source::{HttpStatusSource, StatusSource};
pub use surface::{Details, StateLabel, StatusSurface, SurfaceUpdate, Tone};
pub use table::Table;
pub use types::{
    cell_text, is_truthy, Completion, JobUpdate, ProgressReport, StatusResponse, TaskOutcome,
};
