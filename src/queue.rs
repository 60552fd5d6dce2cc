use std::future::Future;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, warn};

/// Retry policy applied by a queue worker around its handler.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// Delay before the next attempt, doubling per failed attempt.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
        }
    }
}

/// Fire-and-forget task queue. A dedicated worker drains the channel and
/// runs the handler under the retry policy; exhausted tasks are logged and
/// dropped. There is no return channel to the enqueuing caller.
#[derive(Clone)]
pub struct TaskQueue<T> {
    name: &'static str,
    tx: mpsc::UnboundedSender<T>,
}

impl<T: Send + Clone + 'static> TaskQueue<T> {
    pub fn start<F, Fut>(name: &'static str, retry: RetryPolicy, handler: F) -> Self
    where
        F: Fn(T) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = anyhow::Result<()>> + Send + 'static,
    {
        let (tx, mut rx) = mpsc::unbounded_channel::<T>();

        tokio::spawn(async move {
            while let Some(task) = rx.recv().await {
                let mut attempt = 1;
                loop {
                    match handler(task.clone()).await {
                        Ok(()) => break,
                        Err(e) if attempt < retry.max_attempts => {
                            let delay = retry.delay_for(attempt);
                            warn!(
                                "{} task failed (attempt {}/{}), retrying in {:?}: {:?}",
                                name, attempt, retry.max_attempts, delay, e
                            );
                            tokio::time::sleep(delay).await;
                            attempt += 1;
                        }
                        Err(e) => {
                            error!(
                                "{} task dropped after {} attempts: {:?}",
                                name, retry.max_attempts, e
                            );
                            break;
                        }
                    }
                }
            }
        });

        Self { name, tx }
    }

    pub fn enqueue(&self, task: T) {
        if self.tx.send(task).is_err() {
            error!("{} queue worker is gone, task dropped", self.name);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn test_retry_delays_double() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(100),
        };
        assert_eq!(policy.delay_for(1), Duration::from_millis(100));
        assert_eq!(policy.delay_for(2), Duration::from_millis(200));
        assert_eq!(policy.delay_for(3), Duration::from_millis(400));
    }

    #[tokio::test]
    async fn test_tasks_are_processed() {
        let counter = Arc::new(AtomicU32::new(0));
        let seen = counter.clone();
        let queue = TaskQueue::start(
            "test",
            RetryPolicy::default(),
            move |n: u32| {
                let seen = seen.clone();
                async move {
                    seen.fetch_add(n, Ordering::SeqCst);
                    Ok(())
                }
            },
        );

        queue.enqueue(1);
        queue.enqueue(2);
        queue.enqueue(3);

        tokio::time::timeout(Duration::from_secs(1), async {
            while counter.load(Ordering::SeqCst) < 6 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("tasks not processed in time");
    }

    #[tokio::test]
    async fn test_failing_task_is_retried_then_succeeds() {
        let attempts = Arc::new(AtomicU32::new(0));
        let seen = attempts.clone();
        let queue = TaskQueue::start(
            "test",
            RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::from_millis(1),
            },
            move |_: ()| {
                let seen = seen.clone();
                async move {
                    if seen.fetch_add(1, Ordering::SeqCst) < 2 {
                        anyhow::bail!("transient failure");
                    }
                    Ok(())
                }
            },
        );

        queue.enqueue(());

        tokio::time::timeout(Duration::from_secs(1), async {
            while attempts.load(Ordering::SeqCst) < 3 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("task not retried in time");
    }

    #[tokio::test]
    async fn test_exhausted_task_is_dropped_and_queue_keeps_draining() {
        let attempts = Arc::new(AtomicU32::new(0));
        let seen = attempts.clone();
        let queue = TaskQueue::start(
            "test",
            RetryPolicy {
                max_attempts: 3,
                base_delay: Duration::from_millis(1),
            },
            move |n: u32| {
                let seen = seen.clone();
                async move {
                    seen.fetch_add(1, Ordering::SeqCst);
                    if n == 0 {
                        anyhow::bail!("permanent failure");
                    }
                    Ok(())
                }
            },
        );

        queue.enqueue(0);
        queue.enqueue(1);

        // 3 failed attempts for the first task, then one success for the second.
        tokio::time::timeout(Duration::from_secs(1), async {
            while attempts.load(Ordering::SeqCst) < 4 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("queue stalled after exhausted task");
    }
}
