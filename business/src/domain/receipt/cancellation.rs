use std::sync::Arc;

use tokio::sync::watch;

/// Caller-held handle for cancelling a running batch.
///
/// Clones share the same state; cancelling is permanent.
#[derive(Debug, Clone)]
pub struct BatchCancellation {
    sender: Arc<watch::Sender<bool>>,
}

impl BatchCancellation {
    pub fn new() -> Self {
        let (sender, _) = watch::channel(false);
        Self {
            sender: Arc::new(sender),
        }
    }

    pub fn cancel(&self) {
        self.sender.send_replace(true);
    }

    pub fn is_cancelled(&self) -> bool {
        *self.sender.borrow()
    }

    /// Resolves once `cancel` has been called on any clone.
    pub async fn cancelled(&self) {
        let mut receiver = self.sender.subscribe();
        // The sender lives as long as `self`, so this cannot observe a closed channel.
        let _ = receiver.wait_for(|cancelled| *cancelled).await;
    }
}

impl Default for BatchCancellation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn should_start_not_cancelled() {
        assert!(!BatchCancellation::new().is_cancelled());
    }

    #[tokio::test]
    async fn should_wake_waiters_on_other_clones() {
        let cancellation = BatchCancellation::new();
        let waiter = cancellation.clone();

        let handle = tokio::spawn(async move { waiter.cancelled().await });
        cancellation.cancel();

        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .expect("waiter should be released")
            .unwrap();
        assert!(cancellation.is_cancelled());
    }

    #[tokio::test]
    async fn should_resolve_immediately_when_already_cancelled() {
        let cancellation = BatchCancellation::new();
        cancellation.cancel();

        tokio::time::timeout(Duration::from_millis(100), cancellation.cancelled())
            .await
            .expect("already cancelled");
    }
}
