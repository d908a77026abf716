//! Date-window traversal control.

use instalens_core::{DateWindow, PostedAt};

/// Posts at the top of a grid can be pinned and out of date order, so the
/// first few are never used as a stop signal.
pub const GRACE_POSTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WindowDecision {
    /// End traversal before reading anything more from this post.
    pub stop: bool,
    /// Collect this post's comment thread.
    pub extract: bool,
}

/// Decide what to do with the post at `sequence` (1-based).
#[must_use]
pub fn decide(posted_at: &PostedAt, sequence: u32, window: &DateWindow) -> WindowDecision {
    let Some(date) = posted_at.date() else {
        return WindowDecision {
            stop: false,
            extract: false,
        };
    };

    WindowDecision {
        stop: sequence > GRACE_POSTS && date < window.start(),
        extract: window.contains(date),
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;

    use super::*;

    fn window() -> DateWindow {
        DateWindow::parse("2024-01-01", "2024-01-31").unwrap()
    }

    fn at(ts: &str) -> PostedAt {
        PostedAt::Known(DateTime::parse_from_rfc3339(ts).unwrap())
    }

    #[test]
    fn grace_period_never_stops() {
        let old = at("2020-06-01T00:00:00Z");
        for seq in 1..=3 {
            let decision = decide(&old, seq, &window());
            assert!(!decision.stop, "seq {seq} stopped during grace period");
            assert!(!decision.extract);
        }
    }

    #[test]
    fn fourth_post_before_window_stops() {
        let decision = decide(&at("2023-12-31T23:59:59Z"), 4, &window());
        assert!(decision.stop);
    }

    #[test]
    fn unknown_date_never_stops_or_extracts() {
        for seq in [1, 4, 50] {
            assert_eq!(
                decide(&PostedAt::Unknown, seq, &window()),
                WindowDecision {
                    stop: false,
                    extract: false
                }
            );
        }
    }

    #[test]
    fn in_window_bounds_extract() {
        assert!(decide(&at("2024-01-01T00:00:00Z"), 9, &window()).extract);
        assert!(decide(&at("2024-01-31T23:00:00Z"), 9, &window()).extract);
    }

    #[test]
    fn after_window_is_skipped_without_stopping() {
        let decision = decide(&at("2024-02-01T08:00:00Z"), 10, &window());
        assert_eq!(
            decision,
            WindowDecision {
                stop: false,
                extract: false
            }
        );
    }
}
