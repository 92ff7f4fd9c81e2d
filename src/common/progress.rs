use std::time::Duration;

use indicatif::{MultiProgress, ProgressBar, ProgressStyle};
use lazy_static::lazy_static;

lazy_static! {
    // Stage spinners and encoder bars share one draw target.
    static ref BARS: MultiProgress = MultiProgress::new();
}

pub fn create_spinner(message: String) -> ProgressBar {
    let pb = BARS.add(ProgressBar::new_spinner());
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        pb.set_style(style.tick_chars("⠁⠉⠙⠚⠒⠂⠂⠒⠲⠴⠤⠄⠄⠤⠠⠠⠤⠦⠖⠒⠐⠐⠒⠓⠋ "));
    }
    pb.set_message(message);
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

/// Bar measured in milliseconds of output media, drawn below any active spinner
pub fn create_progress_bar(total_seconds: f64, message: &'static str) -> ProgressBar {
    let pb = BARS.add(ProgressBar::new((total_seconds * 1000.0) as u64));
    if let Ok(style) = ProgressStyle::default_bar().template(
        "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {percent:>3}% ({eta}) {msg}",
    ) {
        pb.set_style(style.progress_chars("█▉▊▋▌▍▎▏ "));
    }
    pb.enable_steady_tick(Duration::from_millis(100));
    pb.set_message(message);
    pb
}

pub fn clear_bar(pb: &ProgressBar) {
    pb.finish_and_clear();
    BARS.remove(pb);
}

/// Clear the spinner line and print a checkmark line in its place
pub fn finish_spinner_with_success(pb: ProgressBar, message: impl Into<String>) {
    clear_bar(&pb);
    println!("✓ {}", message.into());
}

pub fn finish_spinner_with_failure(pb: ProgressBar, message: impl Into<String>) {
    clear_bar(&pb);
    eprintln!("✗ {}", message.into());
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn progress_bar_counts_milliseconds() {
        let pb = create_progress_bar(2.5, "encoding");
        assert_eq!(pb.length(), Some(2500));
        clear_bar(&pb);
        assert!(pb.is_finished());
    }

    #[test]
    fn spinner_and_bar_can_be_active_together() {
        let spinner = create_spinner("Extracting clip".to_string());
        let bar = create_progress_bar(1.0, "encoding");
        bar.set_position(500);

        assert!(!spinner.is_finished());
        assert_eq!(bar.position(), 500);

        clear_bar(&bar);
        finish_spinner_with_success(spinner.clone(), "Extracting clip");
        assert!(spinner.is_finished());
    }
}
