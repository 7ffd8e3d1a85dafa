use parking_lot::Mutex;
use std::collections::VecDeque;
use tokio::sync::Notify;
use crate::core::error::{Error, ErrorKind, Result};

type DrainedCallback = Box<dyn FnOnce() + Send>;

struct QueueState<T> {
    items: VecDeque<T>,
    ended: bool,
    drained: bool,
    on_drained: Option<DrainedCallback>,
}

/// Unbounded FIFO between synchronous producers and one async consumer.
///
/// `push` never blocks. `next` waits until an item arrives or the queue is
/// ended, and returns `None` once everything pushed before `end` has been
/// taken.
pub struct AsyncQueue<T> {
    state: Mutex<QueueState<T>>,
    notify: Notify,
}

impl<T> Default for AsyncQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> AsyncQueue<T> {
    pub fn new() -> Self {
        AsyncQueue {
            state: Mutex::new(QueueState {
                items: VecDeque::new(),
                ended: false,
                drained: false,
                on_drained: None,
            }),
            notify: Notify::new(),
        }
    }

    /// Fails once the queue has been ended.
    pub fn push(&self, item: T) -> Result<()> {
        {
            let mut state = self.state.lock();
            if state.ended {
                return Err(Error::new(
                    ErrorKind::InvalidState,
                    "push onto a queue that has already been ended",
                ));
            }
            state.items.push_back(item);
        }
        self.notify.notify_one();
        Ok(())
    }

    /// Marks the end of the items. Ending twice is a no-op.
    pub fn end(&self) {
        {
            let mut state = self.state.lock();
            if state.ended {
                return;
            }
            state.ended = true;
        }
        self.notify.notify_one();
    }

    pub async fn next(&self) -> Option<T> {
        loop {
            let notified = self.notify.notified();

            // Some(callback) once the end has been reached
            let finished = {
                let mut state = self.state.lock();
                if let Some(item) = state.items.pop_front() {
                    return Some(item);
                }
                if state.ended {
                    state.drained = true;
                    Some(state.on_drained.take())
                } else {
                    None
                }
            };

            if let Some(callback) = finished {
                if let Some(callback) = callback {
                    callback();
                }
                return None;
            }

            notified.await;
        }
    }

    /// Runs `callback` once, when the consumer first observes the end.
    pub fn on_drained(&self, callback: impl FnOnce() + Send + 'static) {
        let mut state = self.state.lock();
        if state.drained {
            drop(state);
            callback();
        } else {
            state.on_drained = Some(Box::new(callback));
        }
    }

    pub fn is_ended(&self) -> bool {
        self.state.lock().ended
    }

    pub fn is_drained(&self) -> bool {
        self.state.lock().drained
    }

    pub fn len(&self) -> usize {
        self.state.lock().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::thread;

    #[tokio::test]
    async fn test_items_come_out_in_order() {
        let queue = AsyncQueue::new();
        queue.push(1).unwrap();
        queue.push(2).unwrap();
        queue.end();

        assert_eq!(queue.next().await, Some(1));
        assert_eq!(queue.next().await, Some(2));
        assert_eq!(queue.next().await, None);
        assert_eq!(queue.next().await, None);
    }

    #[tokio::test]
    async fn test_push_after_end_fails() {
        let queue = AsyncQueue::new();
        queue.end();
        queue.end();
        let err = queue.push("late").unwrap_err();
        assert!(err.is(ErrorKind::InvalidState));
    }

    #[tokio::test]
    async fn test_consumer_waits_for_producer_thread() {
        let queue = Arc::new(AsyncQueue::new());
        let producer = queue.clone();

        let handle = thread::spawn(move || {
            for i in 0..100 {
                producer.push(i).unwrap();
            }
            producer.end();
        });

        let mut received = Vec::new();
        while let Some(item) = queue.next().await {
            received.push(item);
        }
        handle.join().unwrap();

        assert_eq!(received, (0..100).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_drained_fires_once() {
        let queue = AsyncQueue::new();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = fired.clone();
        queue.on_drained(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        });

        queue.push(()).unwrap();
        queue.end();
        assert!(queue.next().await.is_some());
        assert_eq!(fired.load(Ordering::SeqCst), 0);

        assert!(queue.next().await.is_none());
        assert!(queue.next().await.is_none());
        assert_eq!(fired.load(Ordering::SeqCst), 1);
        assert!(queue.is_drained());
    }
}
