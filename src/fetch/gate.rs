use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tracing::trace;

use super::FetchError;

/// Admission control for remote fetches
///
/// Bounds the number of simultaneous requests and delays every request by a
/// fixed interval before it is issued. The delay is per request, not a shared
/// clock, so it spaces out requests that queue on the semaphore but does not
/// cap a burst of already-admitted ones.
#[derive(Debug, Clone)]
pub struct AdmissionGate {
    permits: Option<Arc<Semaphore>>,
    min_interval: Duration,
}

/// Held for the duration of one remote fetch
#[derive(Debug)]
pub struct Admission {
    _permit: Option<OwnedSemaphorePermit>,
}

impl AdmissionGate {
    /// `max_concurrent == 0` disables the concurrency limit.
    pub fn new(max_concurrent: usize, min_interval: Duration) -> Self {
        let permits = (max_concurrent > 0).then(|| Arc::new(Semaphore::new(max_concurrent)));
        Self {
            permits,
            min_interval,
        }
    }

    pub fn unlimited() -> Self {
        Self::new(0, Duration::ZERO)
    }

    pub fn available_permits(&self) -> Option<usize> {
        self.permits.as_ref().map(|s| s.available_permits())
    }

    /// Wait for a slot, then sleep out the pacing interval.
    pub async fn admit(&self) -> Result<Admission, FetchError> {
        let permit = match &self.permits {
            Some(semaphore) => {
                trace!(available = ?self.available_permits(), "Waiting for admission");
                let permit = Arc::clone(semaphore)
                    .acquire_owned()
                    .await
                    .map_err(|e| FetchError::RequestFailed(e.to_string()))?;
                Some(permit)
            }
            None => None,
        };

        if !self.min_interval.is_zero() {
            trace!(interval = ?self.min_interval, "Pacing remote fetch");
            tokio::time::sleep(self.min_interval).await;
        }

        Ok(Admission { _permit: permit })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    #[tokio::test]
    async fn test_permits_are_released_on_drop() {
        let gate = AdmissionGate::new(2, Duration::ZERO);
        assert_eq!(gate.available_permits(), Some(2));

        let first = gate.admit().await.unwrap();
        let second = gate.admit().await.unwrap();
        assert_eq!(gate.available_permits(), Some(0));

        drop(first);
        assert_eq!(gate.available_permits(), Some(1));
        drop(second);
        assert_eq!(gate.available_permits(), Some(2));
    }

    #[tokio::test]
    async fn test_gate_blocks_when_full() {
        let gate = AdmissionGate::new(1, Duration::ZERO);
        let held = gate.admit().await.unwrap();

        let waiting = tokio::time::timeout(Duration::from_millis(50), gate.admit()).await;
        assert!(waiting.is_err());

        drop(held);
        assert!(gate.admit().await.is_ok());
    }

    #[tokio::test]
    async fn test_unlimited_gate_has_no_semaphore() {
        let gate = AdmissionGate::unlimited();
        assert_eq!(gate.available_permits(), None);

        let admissions: Vec<_> = futures_admit(&gate, 16).await;
        assert_eq!(admissions.len(), 16);
    }

    #[tokio::test]
    async fn test_min_interval_delays_each_request() {
        let gate = AdmissionGate::new(0, Duration::from_millis(30));
        let started = Instant::now();

        gate.admit().await.unwrap();
        gate.admit().await.unwrap();

        assert!(started.elapsed() >= Duration::from_millis(60));
    }

    async fn futures_admit(gate: &AdmissionGate, n: usize) -> Vec<Admission> {
        let mut admissions = Vec::with_capacity(n);
        for _ in 0..n {
            admissions.push(gate.admit().await.unwrap());
        }
        admissions
    }
}
