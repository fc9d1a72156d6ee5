use indicatif::{ProgressBar, ProgressStyle};

const TEMPLATE: &str = "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta}) {msg}";

/// Console progress bar for tile-level work
///
/// Cloning shares the underlying bar, so workers can advance it directly.
#[derive(Clone)]
pub struct ProgressTracker {
    bar: ProgressBar,
}

impl ProgressTracker {
    pub fn new(total: u64, description: &str) -> Self {
        let style = ProgressStyle::default_bar()
            .template(TEMPLATE)
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("#>-");
        let bar = ProgressBar::new(total);
        bar.set_style(style);
        bar.set_message(description.to_string());

        ProgressTracker { bar }
    }

    /// A tracker that counts but never draws
    pub fn hidden(total: u64) -> Self {
        ProgressTracker { bar: ProgressBar::hidden() }.with_length(total)
    }

    /// Visible or hidden depending on `visible`
    pub fn optional(total: u64, description: &str, visible: bool) -> Self {
        if visible {
            Self::new(total, description)
        } else {
            Self::hidden(total)
        }
    }

    fn with_length(self, total: u64) -> Self {
        self.bar.set_length(total);
        self
    }

    pub fn increment(&self, amount: u64) {
        self.bar.inc(amount);
    }

    pub fn position(&self) -> u64 {
        self.bar.position()
    }

    pub fn finish(&self) {
        self.bar.finish_with_message("Completed");
    }

    pub fn set_message(&self, msg: &str) {
        self.bar.set_message(msg.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hidden_tracker_counts() {
        let tracker = ProgressTracker::optional(5, "tiles", false);
        let shared = tracker.clone();
        shared.increment(2);
        tracker.increment(1);
        assert_eq!(tracker.position(), 3);
        tracker.finish();
    }
}
