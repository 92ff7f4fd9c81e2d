use std::cell::RefCell;

use indicatif::ProgressBar;
use serde_json::json;

use super::stage::Stage;
use crate::common::progress::{
    clear_bar, create_spinner, finish_spinner_with_failure, finish_spinner_with_success,
};
use crate::ui::prelude::{Level, OutputFormat, emit, get_output_format};

/// Receives a notification whenever the pipeline enters a state.
pub trait ProgressObserver {
    fn stage_started(&self, stage: Stage, description: &str);
}

/// Terminal progress: a spinner per stage in text mode, one event per stage
/// in JSON mode.
pub struct ConsoleProgress {
    format: OutputFormat,
    current: RefCell<Option<(ProgressBar, String)>>,
}

impl ConsoleProgress {
    pub fn new() -> Self {
        Self::with_format(get_output_format())
    }

    pub fn with_format(format: OutputFormat) -> Self {
        Self {
            format,
            current: RefCell::new(None),
        }
    }

    fn finish_current(&self, failed: bool) {
        if let Some((pb, description)) = self.current.borrow_mut().take() {
            if failed {
                finish_spinner_with_failure(pb, description);
            } else {
                finish_spinner_with_success(pb, description);
            }
        }
    }
}

impl Default for ConsoleProgress {
    fn default() -> Self {
        Self::new()
    }
}

impl ProgressObserver for ConsoleProgress {
    fn stage_started(&self, stage: Stage, description: &str) {
        if self.format == OutputFormat::Json {
            let level = if stage == Stage::Failed {
                Level::Error
            } else {
                Level::Info
            };
            emit(
                level,
                "reel.pipeline.stage",
                description,
                Some(json!({ "stage": stage.name() })),
            );
            return;
        }

        self.finish_current(stage == Stage::Failed);
        if !stage.is_terminal() {
            let pb = create_spinner(description.to_string());
            *self.current.borrow_mut() = Some((pb, description.to_string()));
        }
    }
}

impl Drop for ConsoleProgress {
    fn drop(&mut self) {
        if let Some((pb, _)) = self.current.get_mut().take() {
            clear_bar(&pb);
        }
    }
}
