use crate::cell::ValueCell;
use crate::error::{Error, ErrorKind, Result};
use crate::source::ValueSource;
use log::*;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;
use tokio::task::{self, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

/// Periodically installs a freshly generated value into the shared cell.
///
/// The refresh task is the only writer of the cell. A tick whose generation
/// fails is skipped; the previously published value stays in place.
pub struct RefreshTask<S: ValueSource> {
    source: Arc<Mutex<S>>,
    blocking: bool,
    cell: Arc<ValueCell<S::Value>>,
    period: Duration,
    shutdown: CancellationToken,
}

impl<S: ValueSource> RefreshTask<S> {
    pub fn new(
        source: S,
        cell: Arc<ValueCell<S::Value>>,
        period: Duration,
        shutdown: CancellationToken,
    ) -> Self {
        Self {
            blocking: source.is_blocking(),
            source: Arc::new(Mutex::new(source)),
            cell,
            period,
            shutdown,
        }
    }

    /// Generates and installs one value right away, outside the schedule.
    pub async fn prime(&self) -> Result<bool> {
        let value = self.generate().await?;
        self.cell.set(value)
    }

    pub fn spawn(self) -> JoinHandle<()> {
        tokio::spawn(self.run())
    }

    /// Ticks every `period` until shutdown. The first tick fires one full
    /// period after the task starts.
    pub async fn run(self) {
        let mut ticker = time::interval_at(Instant::now() + self.period, self.period);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!("Refresh task started, period {:?}", self.period);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                _ = ticker.tick() => self.tick().await,
            }
        }

        info!("Refresh task stopped");
    }

    async fn tick(&self) {
        let value = match self.generate().await {
            Ok(value) => value,
            Err(e) => {
                warn!("Skipping refresh tick: {e}");
                return;
            }
        };

        match self.cell.set(value) {
            Ok(true) => {
                if let Some(snapshot) = self.cell.get() {
                    debug!("Publisher: {}", snapshot.data());
                }
            }
            Ok(false) => trace!("Refresh produced the current value again"),
            Err(e) => warn!("Skipping refresh tick: {e}"),
        }
    }

    async fn generate(&self) -> Result<S::Value> {
        if !self.blocking {
            return lock(&self.source).next_value();
        }

        let source = Arc::clone(&self.source);
        task::spawn_blocking(move || lock(&source).next_value())
            .await
            .map_err(|e| Error {
                source: Some(Box::new(e)),
                error_kind: ErrorKind::Generation("value source did not complete".to_string()),
            })?
    }
}

// A source that panicked mid-generation is still usable for the next tick.
fn lock<S>(source: &Mutex<S>) -> MutexGuard<'_, S> {
    source.lock().unwrap_or_else(PoisonError::into_inner)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Manager;
    use futures::StreamExt;
    use std::collections::VecDeque;
    use std::pin::pin;
    use tokio::time::{sleep, timeout};

    /// Replays a fixed list of outcomes, then reports exhaustion.
    struct Scripted {
        outcomes: VecDeque<Option<&'static str>>,
        blocking: bool,
    }

    impl Scripted {
        fn values(values: &[&'static str]) -> Self {
            Self {
                outcomes: values.iter().copied().map(Some).collect(),
                blocking: false,
            }
        }

        /// `None` entries fail generation for that tick.
        fn outcomes(outcomes: &[Option<&'static str>]) -> Self {
            Self {
                outcomes: outcomes.iter().copied().collect(),
                blocking: false,
            }
        }

        fn blocking(mut self) -> Self {
            self.blocking = true;
            self
        }
    }

    impl ValueSource for Scripted {
        type Value = &'static str;

        fn next_value(&mut self) -> Result<&'static str> {
            match self.outcomes.pop_front() {
                Some(Some(value)) => Ok(value),
                Some(None) => Err(Error::generation("scripted failure")),
                None => Err(Error::exhausted()),
            }
        }

        fn is_blocking(&self) -> bool {
            self.blocking
        }
    }

    struct PanicsOnce {
        panicked: bool,
    }

    impl ValueSource for PanicsOnce {
        type Value = u64;

        fn next_value(&mut self) -> Result<u64> {
            if !self.panicked {
                self.panicked = true;
                panic!("value source blew up");
            }
            Ok(1)
        }

        fn is_blocking(&self) -> bool {
            true
        }
    }

    fn task<S: ValueSource>(
        source: S,
        cell: &Arc<ValueCell<S::Value>>,
        shutdown: &CancellationToken,
    ) -> RefreshTask<S> {
        RefreshTask::new(
            source,
            Arc::clone(cell),
            Duration::from_secs(1),
            shutdown.clone(),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn test_repeated_value_is_published_once() {
        let shutdown = CancellationToken::new();
        let cell = Arc::new(ValueCell::new());
        let manager = Manager::new(Arc::clone(&cell), shutdown.clone());
        let mut stream = pin!(manager.open_session().into_stream());

        let handle = task(Scripted::values(&["A", "B", "B", "C"]), &cell, &shutdown).spawn();

        let mut received = Vec::new();
        for _ in 0..3 {
            received.push(*stream.next().await.unwrap().value());
        }
        assert_eq!(received, vec!["A", "B", "C"]);

        // The source is exhausted now; later ticks are skipped.
        assert!(timeout(Duration::from_secs(10), stream.next()).await.is_err());

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test(start_paused = true)]
    async fn test_first_tick_waits_a_full_period() {
        let shutdown = CancellationToken::new();
        let cell = Arc::new(ValueCell::new());
        let _handle = task(Scripted::values(&["A"]), &cell, &shutdown).spawn();

        sleep(Duration::from_millis(500)).await;
        assert!(cell.get().is_none());

        sleep(Duration::from_millis(1000)).await;
        assert_eq!(cell.get().unwrap().value(), &"A");
    }

    #[tokio::test(start_paused = true)]
    async fn test_failed_generation_keeps_previous_value() {
        let shutdown = CancellationToken::new();
        let cell = Arc::new(ValueCell::new());
        let _handle = task(
            Scripted::outcomes(&[Some("A"), None, Some("B")]),
            &cell,
            &shutdown,
        )
        .spawn();

        sleep(Duration::from_millis(1500)).await;
        assert_eq!(cell.get().unwrap().value(), &"A");

        sleep(Duration::from_millis(1000)).await;
        assert_eq!(cell.get().unwrap().value(), &"A");

        sleep(Duration::from_millis(1000)).await;
        assert_eq!(cell.get().unwrap().value(), &"B");
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_the_task() {
        let shutdown = CancellationToken::new();
        let cell = Arc::new(ValueCell::new());
        let handle = task(Scripted::values(&["A", "B"]), &cell, &shutdown).spawn();

        shutdown.cancel();
        timeout(Duration::from_secs(5), handle)
            .await
            .expect("refresh task should stop on shutdown")
            .unwrap();

        sleep(Duration::from_secs(5)).await;
        assert!(cell.get().is_none());
    }

    #[tokio::test]
    async fn test_prime_installs_a_value_immediately() {
        let shutdown = CancellationToken::new();
        let cell = Arc::new(ValueCell::new());
        let refresh = task(Scripted::values(&["A"]), &cell, &shutdown);

        assert!(refresh.prime().await.unwrap());
        assert_eq!(cell.get().unwrap().value(), &"A");

        let err = refresh.prime().await.unwrap_err();
        assert_eq!(err.error_kind, ErrorKind::Exhausted);
        assert_eq!(cell.get().unwrap().value(), &"A");
    }

    #[tokio::test]
    async fn test_blocking_source_runs_off_the_scheduler() {
        let shutdown = CancellationToken::new();
        let cell = Arc::new(ValueCell::new());
        let refresh = RefreshTask::new(
            Scripted::values(&["A", "B"]).blocking(),
            Arc::clone(&cell),
            Duration::from_millis(10),
            shutdown.clone(),
        );
        let manager = Manager::new(Arc::clone(&cell), shutdown.clone());
        let mut stream = pin!(manager.open_session().into_stream());
        let handle = refresh.spawn();

        let first = timeout(Duration::from_secs(5), stream.next()).await.unwrap();
        let second = timeout(Duration::from_secs(5), stream.next()).await.unwrap();
        assert_eq!(first.unwrap().value(), &"A");
        assert_eq!(second.unwrap().value(), &"B");

        shutdown.cancel();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn test_panicking_blocking_source_only_skips_a_tick() {
        let shutdown = CancellationToken::new();
        let cell = Arc::new(ValueCell::new());
        let refresh = task(PanicsOnce { panicked: false }, &cell, &shutdown);

        let err = refresh.prime().await.unwrap_err();
        assert!(matches!(err.error_kind, ErrorKind::Generation(_)));
        assert!(cell.get().is_none());

        assert!(refresh.prime().await.unwrap());
        assert_eq!(cell.get().unwrap().value(), &1);
    }
}
