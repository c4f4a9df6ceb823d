//! Display Helpers
//!
//! Formatting shared by cards, popups and modals.

/// Whole-dollar amount, e.g. `$40`
pub fn dollars(amount: f64) -> String {
    format!("${:.0}", amount)
}

/// Inline width for a progress bar fill
pub fn progress_style(progress: f64) -> String {
    format!("width: {:.1}%", progress.clamp(0.0, 1.0) * 100.0)
}

/// Parser confidence as a rounded percentage
pub fn percent(ratio: f64) -> String {
    format!("{:.0}%", ratio.clamp(0.0, 1.0) * 100.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dollars() {
        assert_eq!(dollars(40.0), "$40");
        assert_eq!(dollars(12.6), "$13");
    }

    #[test]
    fn test_progress_style_clamps() {
        assert_eq!(progress_style(0.8), "width: 80.0%");
        assert_eq!(progress_style(1.7), "width: 100.0%");
        assert_eq!(progress_style(-1.0), "width: 0.0%");
    }

    #[test]
    fn test_percent() {
        assert_eq!(percent(0.834), "83%");
    }
}
