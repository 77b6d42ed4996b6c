//! Rate limiting for the forwarding target.
//!
//! A Tilt broadcasts several times a second, and every accepted beacon
//! triggers a forwarding pass over the fleet. [`SendWindow`] bounds the
//! dispatch rate to at most one attempt per interval.

use std::time::{Duration, Instant};

/// A single rate-limit timer for outgoing dispatches.
///
/// The timer starts at construction, so the first dispatch becomes eligible
/// only after one full interval has elapsed. Marking the window sent resets
/// the timer regardless of whether the dispatch succeeded, which keeps a
/// failing endpoint from being hammered with retries.
#[derive(Debug)]
pub struct SendWindow {
    /// Minimum time between dispatch attempts
    interval: Duration,
    /// Time of the most recent dispatch attempt
    last_sent: Instant,
}

impl SendWindow {
    /// Create a new window with the specified minimum interval between sends.
    pub fn new(interval: Duration) -> Self {
        SendWindow {
            interval,
            last_sent: Instant::now(),
        }
    }

    /// Whether enough time has passed since the last dispatch attempt.
    pub fn ready(&self) -> bool {
        self.last_sent.elapsed() > self.interval
    }

    /// Record a dispatch attempt, resetting the timer.
    pub fn mark_sent(&mut self) {
        self.last_sent = Instant::now();
    }

    /// Shift the last-sent time into the past so the window reads as ready.
    ///
    /// Test hook; lets dispatch tests run without sleeping out the interval.
    #[cfg(test)]
    pub(crate) fn backdate(&mut self, by: Duration) {
        if let Some(t) = self.last_sent.checked_sub(by) {
            self.last_sent = t;
        }
    }
}

/// Parse a duration from a human-readable string.
///
/// Supports the following suffixes:
/// - `s` or no suffix: seconds
/// - `m`: minutes
/// - `h`: hours
/// - `ms`: milliseconds
pub fn parse_duration(src: &str) -> Result<Duration, String> {
    let src = src.trim();

    if src.is_empty() {
        return Err("empty duration string".to_string());
    }

    if let Some(num) = src.strip_suffix("ms") {
        let millis: u64 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid milliseconds: {}", num))?;
        return Ok(Duration::from_millis(millis));
    }

    if let Some(num) = src.strip_suffix('h') {
        let hours: u64 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid hours: {}", num))?;
        return Ok(Duration::from_secs(hours * 3600));
    }

    if let Some(num) = src.strip_suffix('m') {
        let minutes: u64 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid minutes: {}", num))?;
        return Ok(Duration::from_secs(minutes * 60));
    }

    if let Some(num) = src.strip_suffix('s') {
        let secs: u64 = num
            .trim()
            .parse()
            .map_err(|_| format!("invalid seconds: {}", num))?;
        return Ok(Duration::from_secs(secs));
    }

    // No suffix, treat as seconds
    let secs: u64 = src
        .parse()
        .map_err(|_| format!("invalid duration: {}", src))?;
    Ok(Duration::from_secs(secs))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_not_ready_at_construction() {
        let window = SendWindow::new(Duration::from_secs(3));
        assert!(!window.ready());
    }

    #[test]
    fn test_window_ready_after_interval() {
        let window = SendWindow::new(Duration::from_millis(10));
        assert!(!window.ready());

        std::thread::sleep(Duration::from_millis(15));
        assert!(window.ready());
    }

    #[test]
    fn test_mark_sent_resets_timer() {
        let mut window = SendWindow::new(Duration::from_millis(10));
        std::thread::sleep(Duration::from_millis(15));
        assert!(window.ready());

        window.mark_sent();
        assert!(!window.ready());

        std::thread::sleep(Duration::from_millis(15));
        assert!(window.ready());
    }

    #[test]
    fn test_ready_does_not_reset_timer() {
        let window = SendWindow::new(Duration::from_millis(10));
        std::thread::sleep(Duration::from_millis(15));

        // Checking readiness repeatedly must not consume the window.
        assert!(window.ready());
        assert!(window.ready());
    }

    #[test]
    fn test_backdate_makes_window_ready() {
        let mut window = SendWindow::new(Duration::from_secs(3));
        window.backdate(Duration::from_secs(4));
        assert!(window.ready());
    }

    #[test]
    fn test_parse_duration_seconds() {
        assert_eq!(parse_duration("3s").unwrap(), Duration::from_secs(3));
        assert_eq!(parse_duration("0s").unwrap(), Duration::from_secs(0));
    }

    #[test]
    fn test_parse_duration_minutes_and_hours() {
        assert_eq!(parse_duration("1m").unwrap(), Duration::from_secs(60));
        assert_eq!(parse_duration("2h").unwrap(), Duration::from_secs(7200));
    }

    #[test]
    fn test_parse_duration_milliseconds() {
        assert_eq!(parse_duration("500ms").unwrap(), Duration::from_millis(500));
    }

    #[test]
    fn test_parse_duration_no_suffix() {
        assert_eq!(parse_duration("10").unwrap(), Duration::from_secs(10));
    }

    #[test]
    fn test_parse_duration_with_whitespace() {
        assert_eq!(parse_duration(" 3s ").unwrap(), Duration::from_secs(3));
    }

    #[test]
    fn test_parse_duration_invalid() {
        assert!(parse_duration("").is_err());
        assert!(parse_duration("abc").is_err());
        assert!(parse_duration("-1s").is_err());
    }
}
