use std::panic::{self, AssertUnwindSafe};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};

use tokio::runtime::Handle;
use tokio::time::sleep;
use tracing::{debug, error, warn};

use super::{Lane, NotificationStore, ProcessorState, QueueOptions, QueueTiming};
use crate::domain::{Notification, RecipientKey, SupportKind};
use crate::error::DeliveryError;
use crate::observability::QueueSnapshot;
use crate::ports::DeliverySink;

/// Per-recipient support-notification scheduler.
///
/// Each recipient gets at most one processor task. The processor waits the
/// settle delay once, then repeatedly pops the next notification (test lane
/// first), hands it to the delivery callback, and sleeps for the kind's
/// display duration plus the notification space delay. When both lanes are
/// empty it removes the recipient's entry and exits.
///
/// Cheap to clone; clones share the same store and callback slot.
///
/// Processors run on the current Tokio runtime at `enqueue` time, or on the
/// runtime that was current when the queue was constructed. With neither,
/// the notification cannot be scheduled: it is dropped and logged at
/// `error` instead of panicking.
///
/// # 使用例
/// ```ignore
/// let queue = SupportNotificationQueue::new(QueueTiming::default());
/// queue.set_delivery_callback(|key, n| {
///     println!("{key}: {} {}", n.amount, n.symbol);
///     Ok(())
/// });
/// queue.enqueue("0xstreamer", notification);
/// ```
#[derive(Clone)]
pub struct SupportNotificationQueue {
    inner: Arc<Shared>,
}

struct Shared {
    store: NotificationStore,
    runtime: Option<Handle>,
    timing: QueueTiming,
    sink: RwLock<Option<Arc<dyn DeliverySink>>>,
    processors_started: AtomicU64,
}

impl SupportNotificationQueue {
    pub fn new(timing: QueueTiming) -> Self {
        Self {
            inner: Arc::new(Shared {
                store: NotificationStore::new(),
                runtime: Handle::try_current().ok(),
                timing,
                sink: RwLock::new(None),
                processors_started: AtomicU64::new(0),
            }),
        }
    }

    pub fn with_options(options: &QueueOptions) -> Self {
        Self::new(QueueTiming::from_options(options))
    }

    pub fn timing(&self) -> &QueueTiming {
        &self.inner.timing
    }

    /// Queue a regular alert for `recipient`.
    ///
    /// Never blocks and never panics. May spawn the recipient's processor;
    /// see the type-level docs for which runtime it lands on.
    pub fn enqueue(&self, recipient: impl Into<RecipientKey>, notification: Notification) {
        self.push(recipient.into(), notification, Lane::Main);
    }

    /// Queue a test alert; it is shown before any pending regular alert.
    pub fn enqueue_test(&self, recipient: impl Into<RecipientKey>, notification: Notification) {
        self.push(recipient.into(), notification, Lane::Test);
    }

    /// Register the delivery callback. Last registration wins; takes effect
    /// from the next delivery, including for processors already draining.
    pub fn set_delivery_callback<F>(&self, callback: F)
    where
        F: Fn(&RecipientKey, &Notification) -> Result<(), DeliveryError> + Send + Sync + 'static,
    {
        self.set_delivery_sink(Arc::new(callback));
    }

    pub fn set_delivery_sink(&self, sink: Arc<dyn DeliverySink>) {
        let mut slot = self
            .inner
            .sink
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        *slot = Some(sink);
    }

    pub fn processor_state(&self, recipient: &str) -> ProcessorState {
        self.inner.store.state(recipient)
    }

    pub fn snapshot(&self) -> QueueSnapshot {
        let mut snapshot = self.inner.store.snapshot();
        snapshot.processors_started = self.inner.processors_started.load(Ordering::Relaxed);
        snapshot
    }

    fn push(&self, recipient: RecipientKey, notification: Notification, lane: Lane) {
        let kind = notification.kind;
        if self.inner.store.append(&recipient, notification, lane) {
            let Some(runtime) = Handle::try_current().ok().or_else(|| self.inner.runtime.clone())
            else {
                let dropped = self.inner.store.discard(&recipient);
                error!(recipient = %recipient, dropped, "no tokio runtime to run the processor on");
                return;
            };
            self.inner.processors_started.fetch_add(1, Ordering::Relaxed);
            debug!(recipient = %recipient, ?lane, ?kind, "starting processor");
            let shared = Arc::clone(&self.inner);
            runtime.spawn(async move {
                shared.drain(recipient).await;
            });
        } else {
            debug!(recipient = %recipient, ?lane, ?kind, "appended to running processor");
        }
    }
}

impl Shared {
    async fn drain(&self, recipient: RecipientKey) {
        // 呼び出し元（HTTP ハンドラなど）が先にレスポンスを返せるように待つ
        sleep(self.timing.settle_delay).await;
        self.store.mark_draining(&recipient);

        // 毎回 store を見直すので、待機中に積まれた通知もこの processor が拾う
        while let Some(notification) = self.store.pop_next(&recipient) {
            self.deliver(&recipient, &notification);

            if notification.kind == SupportKind::Unknown {
                debug!(recipient = %recipient, "unknown kind, using normal duration");
            }
            sleep(self.timing.display_duration(notification.kind)).await;
            sleep(self.timing.notification_space_delay).await;
        }

        debug!(recipient = %recipient, "queue drained, processor retired");
    }

    fn deliver(&self, recipient: &RecipientKey, notification: &Notification) {
        let sink = self
            .sink
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone();
        let Some(sink) = sink else {
            warn!(recipient = %recipient, "no delivery callback registered, notification dropped");
            return;
        };

        match panic::catch_unwind(AssertUnwindSafe(|| sink.deliver(recipient, notification))) {
            Ok(Ok(())) => {
                debug!(recipient = %recipient, kind = ?notification.kind, "notification delivered");
            }
            Ok(Err(e)) => {
                warn!(recipient = %recipient, error = %e, "delivery callback failed");
            }
            Err(_) => {
                error!(recipient = %recipient, "delivery callback panicked");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;
    use tokio::time::Instant;

    const SETTLE: Duration = Duration::from_millis(100);
    const NORMAL: Duration = Duration::from_millis(180);
    const VIDEO: Duration = Duration::from_millis(250);
    const ADS: Duration = Duration::from_millis(400);
    const GAP: Duration = Duration::from_millis(100);

    fn timing() -> QueueTiming {
        QueueTiming {
            settle_delay: SETTLE,
            normal_duration: NORMAL,
            video_duration: VIDEO,
            ads_duration: ADS,
            notification_space_delay: GAP,
        }
    }

    fn note(kind: SupportKind, message: &str) -> Notification {
        let mut n = Notification::sample(kind, None);
        n.message = message.to_string();
        n
    }

    type Log = Arc<Mutex<Vec<(String, String, Instant)>>>;

    fn recording(queue: &SupportNotificationQueue) -> Log {
        let log: Log = Arc::default();
        let sink = log.clone();
        queue.set_delivery_callback(move |key, n| {
            sink.lock()
                .unwrap()
                .push((key.to_string(), n.message.clone(), Instant::now()));
            Ok(())
        });
        log
    }

    fn assert_near(actual: Duration, expected: Duration) {
        assert!(
            actual >= expected && actual < expected + Duration::from_millis(5),
            "expected ~{expected:?}, got {actual:?}"
        );
    }

    fn messages(log: &Log) -> Vec<String> {
        log.lock().unwrap().iter().map(|(_, m, _)| m.clone()).collect()
    }

    #[tokio::test(start_paused = true)]
    async fn single_notification_is_delivered_after_settle() {
        let queue = SupportNotificationQueue::new(timing());
        let log = recording(&queue);
        let start = Instant::now();

        queue.enqueue_test("a", note(SupportKind::Normal, "hello"));
        assert_eq!(queue.processor_state("a"), ProcessorState::Running);

        sleep(SETTLE + Duration::from_millis(25)).await;

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].0, "a");
        assert_near(log[0].2 - start, SETTLE);
    }

    #[tokio::test(start_paused = true)]
    async fn state_moves_from_running_to_draining_to_not_running() {
        let queue = SupportNotificationQueue::new(timing());
        let _log = recording(&queue);

        queue.enqueue("a", note(SupportKind::Normal, "1"));
        assert_eq!(queue.processor_state("a"), ProcessorState::Running);

        sleep(SETTLE + Duration::from_millis(1)).await;
        assert_eq!(queue.processor_state("a"), ProcessorState::Draining);

        sleep(NORMAL + GAP).await;
        assert_eq!(queue.processor_state("a"), ProcessorState::NotRunning);
        assert!(queue.snapshot().is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn unknown_kind_waits_normal_duration() {
        let queue = SupportNotificationQueue::new(timing());
        let log = recording(&queue);

        queue.enqueue("a", note(SupportKind::Unknown, "odd"));
        queue.enqueue("a", note(SupportKind::Normal, "next"));
        sleep(Duration::from_secs(2)).await;

        let log = log.lock().unwrap();
        assert_eq!(log.len(), 2);
        assert_near(log[1].2 - log[0].2, NORMAL + GAP);
    }

    #[tokio::test(start_paused = true)]
    async fn failing_callback_does_not_stop_the_drain() {
        let queue = SupportNotificationQueue::new(timing());
        let seen: Arc<Mutex<Vec<String>>> = Arc::default();
        let sink = seen.clone();
        queue.set_delivery_callback(move |_, n| {
            sink.lock().unwrap().push(n.message.clone());
            if n.message == "bad" {
                return Err(DeliveryError::Other("boom".into()));
            }
            Ok(())
        });

        queue.enqueue("a", note(SupportKind::Normal, "bad"));
        queue.enqueue("a", note(SupportKind::Normal, "good"));
        sleep(Duration::from_secs(2)).await;

        assert_eq!(*seen.lock().unwrap(), vec!["bad", "good"]);
        assert!(queue.snapshot().is_idle());
    }

    #[tokio::test(start_paused = true)]
    async fn panicking_callback_does_not_stop_the_drain() {
        let queue = SupportNotificationQueue::new(timing());
        let seen: Arc<Mutex<Vec<String>>> = Arc::default();
        let sink = seen.clone();
        queue.set_delivery_callback(move |_, n| {
            if n.message == "explode" {
                panic!("malformed payload");
            }
            sink.lock().unwrap().push(n.message.clone());
            Ok(())
        });

        queue.enqueue("a", note(SupportKind::Normal, "explode"));
        queue.enqueue("a", note(SupportKind::Normal, "after"));
        sleep(Duration::from_secs(2)).await;

        assert_eq!(*seen.lock().unwrap(), vec!["after"]);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_callback_still_paces_and_cleans_up() {
        let queue = SupportNotificationQueue::new(timing());
        queue.enqueue("a", note(SupportKind::Ads, "nobody listening"));

        sleep(SETTLE + ADS).await;
        assert!(queue.processor_state("a").is_active());

        sleep(GAP + Duration::from_millis(1)).await;
        assert_eq!(queue.processor_state("a"), ProcessorState::NotRunning);
    }

    #[tokio::test(start_paused = true)]
    async fn callback_can_be_replaced_mid_drain() {
        let queue = SupportNotificationQueue::new(timing());
        let first = recording(&queue);

        queue.enqueue("a", note(SupportKind::Normal, "1"));
        queue.enqueue("a", note(SupportKind::Normal, "2"));
        sleep(SETTLE + Duration::from_millis(10)).await;

        let second = recording(&queue);
        sleep(Duration::from_secs(1)).await;

        assert_eq!(messages(&first), vec!["1"]);
        assert_eq!(messages(&second), vec!["2"]);
    }

    #[test]
    fn enqueue_without_any_runtime_drops_instead_of_panicking() {
        let queue = SupportNotificationQueue::new(timing());
        queue.enqueue("a", note(SupportKind::Normal, "lost"));

        assert_eq!(queue.processor_state("a"), ProcessorState::NotRunning);
        let snap = queue.snapshot();
        assert!(snap.is_idle());
        assert_eq!(snap.processors_started, 0);
    }

    #[test]
    fn enqueue_from_plain_thread_uses_construction_runtime() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_time()
            .build()
            .unwrap();
        let queue = runtime.block_on(async {
            SupportNotificationQueue::new(QueueTiming {
                settle_delay: Duration::from_millis(5),
                normal_duration: Duration::from_millis(1),
                video_duration: Duration::from_millis(1),
                ads_duration: Duration::from_millis(1),
                notification_space_delay: Duration::from_millis(1),
            })
        });
        let log = recording(&queue);

        let producer = queue.clone();
        std::thread::spawn(move || producer.enqueue("a", note(SupportKind::Normal, "from thread")))
            .join()
            .unwrap();
        assert_eq!(queue.processor_state("a"), ProcessorState::Running);

        runtime.block_on(async {
            while !queue.snapshot().is_idle() {
                sleep(Duration::from_millis(5)).await;
            }
        });
        assert_eq!(messages(&log), vec!["from thread"]);
    }

    #[tokio::test(start_paused = true)]
    async fn snapshot_counts_lanes() {
        let queue = SupportNotificationQueue::new(timing());
        let _log = recording(&queue);

        queue.enqueue("a", note(SupportKind::Normal, "m"));
        queue.enqueue_test("a", note(SupportKind::Normal, "t"));
        queue.enqueue("b", note(SupportKind::Normal, "m"));

        let snap = queue.snapshot();
        assert_eq!(snap.active_recipients, 2);
        assert_eq!(snap.pending_test, 1);
        assert_eq!(snap.pending_main, 2);
        assert_eq!(snap.pending(), 3);
        assert_eq!(snap.processors_started, 2);
    }
}
