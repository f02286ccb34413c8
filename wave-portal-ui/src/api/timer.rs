use std::time::Duration;

use async_trait::async_trait;
use wave_portal::Timer;

/// Timer on the browser event loop
#[derive(Debug, Clone, Copy, Default)]
pub struct GlooTimer;

#[async_trait(?Send)]
impl Timer for GlooTimer {
    async fn sleep(&self, duration: Duration) {
        gloo_timers::future::sleep(duration).await;
    }
}
