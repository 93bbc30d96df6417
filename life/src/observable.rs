// observable.rs - Latest-value fan-out for board, speed and enablement signals

use tokio::sync::broadcast::{self, error::RecvError, error::TryRecvError};

/// Updates retained for subscribers that have not caught up yet.
pub const BACKLOG: usize = 16;

/// Holds the latest value and pushes every update to each live subscriber.
///
/// A new subscriber receives the current value first, then later updates in
/// publish order. At most [`BACKLOG`] updates are held back for a slow
/// subscriber; one that falls further behind skips to the oldest retained
/// update.
#[derive(Debug)]
pub struct Observable<T> {
    value: T,
    tx: broadcast::Sender<T>,
}

impl<T: Clone> Observable<T> {
    pub fn new(value: T) -> Self {
        let (tx, _) = broadcast::channel(BACKLOG);
        Self { value, tx }
    }

    pub fn get(&self) -> &T {
        &self.value
    }

    pub fn subscribe(&mut self) -> Subscription<T> {
        Subscription {
            current: Some(self.value.clone()),
            rx: self.tx.subscribe(),
        }
    }

    pub fn set(&mut self, value: T) {
        self.value = value;
        self.publish();
    }

    /// Mutates the held value in place, then publishes it.
    pub fn update<R>(&mut self, f: impl FnOnce(&mut T) -> R) -> R {
        let out = f(&mut self.value);
        self.publish();
        out
    }

    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }

    fn publish(&mut self) {
        // Err only means nobody is subscribed.
        let _ = self.tx.send(self.value.clone());
    }
}

/// Receiving end of an [`Observable`].
#[derive(Debug)]
pub struct Subscription<T> {
    current: Option<T>,
    rx: broadcast::Receiver<T>,
}

impl<T: Clone> Subscription<T> {
    /// Next value, or `None` once the observable is gone and the backlog drained.
    pub async fn recv(&mut self) -> Option<T> {
        if let Some(value) = self.current.take() {
            return Some(value);
        }
        loop {
            match self.rx.recv().await {
                Ok(value) => return Some(value),
                Err(RecvError::Lagged(skipped)) => {
                    tracing::debug!(skipped, "slow subscriber skipped updates");
                }
                Err(RecvError::Closed) => return None,
            }
        }
    }

    /// Next queued value without waiting.
    pub fn try_recv(&mut self) -> Option<T> {
        if let Some(value) = self.current.take() {
            return Some(value);
        }
        loop {
            match self.rx.try_recv() {
                Ok(value) => return Some(value),
                Err(TryRecvError::Lagged(_)) => continue,
                Err(TryRecvError::Empty | TryRecvError::Closed) => return None,
            }
        }
    }

    /// Drains the backlog and returns the most recent value, if any was queued.
    pub fn latest(&mut self) -> Option<T> {
        self.drain().pop()
    }

    /// Everything queued right now, oldest first.
    pub fn drain(&mut self) -> Vec<T> {
        std::iter::from_fn(|| self.try_recv()).collect()
    }
}
