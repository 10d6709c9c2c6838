use crate::core::metrics::get_metrics;
use std::time::Instant;

/// Tracks one in-flight upstream call.
///
/// When the inbound connection goes away, hyper drops the handler future,
/// which drops the pending reqwest future and abandons the outbound call.
/// The guard lives inside that future, so its `Drop` runs at the same moment
/// and records the abandonment unless the call was marked complete first.
pub struct UpstreamCallGuard {
    request_id: String,
    model: String,
    started: Instant,
    completed: bool,
}

impl UpstreamCallGuard {
    pub fn new(request_id: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            model: model.into(),
            started: Instant::now(),
            completed: false,
        }
    }

    /// Mark the call as finished (with any outcome).
    pub fn mark_completed(&mut self) {
        self.completed = true;
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn elapsed_secs(&self) -> f64 {
        self.started.elapsed().as_secs_f64()
    }
}

impl Drop for UpstreamCallGuard {
    fn drop(&mut self) {
        if self.completed {
            return;
        }
        get_metrics().upstream_abandoned.inc();
        tracing::info!(
            request_id = %self.request_id,
            model = %self.model,
            elapsed_secs = self.elapsed_secs(),
            "Client disconnected - upstream call abandoned"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    #[test]
    #[serial]
    fn test_completed_guard_does_not_count() {
        let metrics = get_metrics();
        let before = metrics.upstream_abandoned.get();
        {
            let mut guard = UpstreamCallGuard::new("req-1", "model");
            guard.mark_completed();
            assert!(guard.is_completed());
        }
        assert_eq!(metrics.upstream_abandoned.get(), before);
    }

    #[test]
    #[serial]
    fn test_dropped_guard_counts_abandonment() {
        let metrics = get_metrics();
        let before = metrics.upstream_abandoned.get();
        {
            let _guard = UpstreamCallGuard::new("req-2", "model");
        }
        assert_eq!(metrics.upstream_abandoned.get(), before + 1);
    }
}
