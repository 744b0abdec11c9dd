use std::sync::OnceLock;
use tokio::sync::Notify;

/// Single-assignment cell holding the first failure of a run
///
/// Only the first [`record`](Self::record) is kept; later ones are dropped.
#[derive(Debug)]
pub(crate) struct ErrorSlot<E> {
    cell: OnceLock<E>,
    ready: Notify,
}

impl<E: Clone> ErrorSlot<E> {
    pub(crate) fn new() -> Self {
        Self {
            cell: OnceLock::new(),
            ready: Notify::new(),
        }
    }

    /// Store `err` unless a failure is already recorded. Returns whether it was stored.
    pub(crate) fn record(&self, err: E) -> bool {
        let stored = self.cell.set(err).is_ok();
        if stored {
            // notify_one keeps a permit if nobody is waiting yet
            self.ready.notify_one();
        }
        stored
    }

    pub(crate) fn get(&self) -> Option<&E> {
        self.cell.get()
    }

    /// Wait until a failure has been recorded.
    pub(crate) async fn wait(&self) -> E {
        loop {
            if let Some(err) = self.cell.get() {
                return err.clone();
            }
            self.ready.notified().await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[test]
    fn test_first_record_wins() {
        let slot = ErrorSlot::new();
        assert!(slot.record("first"));
        assert!(!slot.record("second"));
        assert_eq!(slot.get(), Some(&"first"));
    }

    #[tokio::test]
    async fn test_wait_after_record() {
        let slot = ErrorSlot::new();
        slot.record(7);
        assert_eq!(slot.wait().await, 7);
    }

    #[tokio::test]
    async fn test_wait_before_record() {
        let slot = Arc::new(ErrorSlot::new());

        let waiter = tokio::spawn({
            let slot = Arc::clone(&slot);
            async move { slot.wait().await }
        });
        tokio::time::sleep(Duration::from_millis(10)).await;
        slot.record("late");

        assert_eq!(waiter.await.unwrap(), "late");
    }

    #[tokio::test]
    async fn test_wait_pends_while_empty() {
        let slot: ErrorSlot<u8> = ErrorSlot::new();
        let result = tokio::time::timeout(Duration::from_millis(20), slot.wait()).await;
        assert!(result.is_err());
    }
}
