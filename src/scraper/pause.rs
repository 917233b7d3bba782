//! Fixed pause between successive race page requests.

use tokio::time::{sleep, Duration};

/// Sleeps a fixed delay before every request except the first
pub struct RequestPause {
    delay: Duration,
    started: bool,
}

impl RequestPause {
    pub fn new(delay: Duration) -> Self {
        Self {
            delay,
            started: false,
        }
    }

    /// Wait before the next request
    pub async fn wait(&mut self) {
        if self.started && !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        self.started = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::time::Instant;

    #[tokio::test(start_paused = true)]
    async fn test_first_request_is_not_delayed() {
        let mut pause = RequestPause::new(Duration::from_millis(500));
        let start = Instant::now();
        pause.wait().await;
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn test_following_requests_are_delayed() {
        let mut pause = RequestPause::new(Duration::from_millis(500));
        let start = Instant::now();
        for _ in 0..3 {
            pause.wait().await;
        }
        assert!(start.elapsed() >= Duration::from_millis(1000));
        assert!(start.elapsed() < Duration::from_millis(1500));
    }
}
