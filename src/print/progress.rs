use indicatif::ProgressBar;

/// Receives the job percentage after each record.
pub trait ProgressReporter {
    fn report(&self, percent: u8, message: &str);
}

impl ProgressReporter for ProgressBar {
    fn report(&self, percent: u8, message: &str) {
        self.set_position(percent as u64);
        self.set_message(message.to_string());
    }
}

/// Discards progress.
pub struct Silent;

impl ProgressReporter for Silent {
    fn report(&self, _: u8, _: &str) {}
}

/// Percentage complete after record `index` of `total` has been processed.
///
/// Rounds to the nearest percent, but never reports 100 before the last record.
pub fn percent_complete(index: usize, total: usize) -> u8 {
    if total == 0 || index + 1 >= total {
        return 100;
    }
    let percent = (100.0 * (index + 1) as f64 / total as f64).round() as u8;
    percent.min(99)
}
