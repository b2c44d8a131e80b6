use alarm_alerting::{
    AlertError, AlertEvent, AlertService, AlertingConfig, DispatchConfig, QuotaPolicy,
};
use alarm_notify::{DisabledNotifier, Notifier, NotifyError};
use alarm_storage::{
    AlertFilter, AlertPage, AlertRecord, AlertStore, AlertUpdate, InMemoryAlertStore, NewAlert,
    PageRequest, StorageError,
};
use alarm_telemetry::metrics;
use async_trait::async_trait;
use chrono::{DateTime, Duration as ChronoDuration, NaiveDate, TimeZone, Utc};
use domain::{AlertLabels, Clock, ManualClock};
use std::future::Future;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::Semaphore;

/// 记录调用次数，前 `fail_first` 次返回失败。
#[derive(Default)]
struct CountingNotifier {
    calls: AtomicUsize,
    fail_first: AtomicUsize,
}

impl CountingNotifier {
    fn failing_first(n: usize) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail_first: AtomicUsize::new(n),
        }
    }

    fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Notifier for CountingNotifier {
    async fn send(&self, _alert: &AlertRecord) -> Result<(), NotifyError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let remaining = self.fail_first.load(Ordering::SeqCst);
        if remaining > 0 {
            self.fail_first.fetch_sub(1, Ordering::SeqCst);
            return Err(NotifyError::Status(500));
        }
        Ok(())
    }
}

/// 投递阻塞在闸门上，直到测试放行。
struct GatedNotifier {
    started: AtomicUsize,
    gate: Semaphore,
}

#[async_trait]
impl Notifier for GatedNotifier {
    async fn send(&self, _alert: &AlertRecord) -> Result<(), NotifyError> {
        self.started.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|err| NotifyError::Config(err.to_string()))?;
        permit.forget();
        Ok(())
    }
}

/// 配额相关的条件更新失败，其余操作委托给内存存储。
struct FaultyStore {
    inner: InMemoryAlertStore,
    fail_reserve: bool,
}

impl FaultyStore {
    fn new(fail_reserve: bool) -> Self {
        Self {
            inner: InMemoryAlertStore::new(),
            fail_reserve,
        }
    }
}

#[async_trait]
impl AlertStore for FaultyStore {
    async fn find_active(&self, fingerprint: &str) -> Result<Option<AlertRecord>, StorageError> {
        self.inner.find_active(fingerprint).await
    }

    async fn find_by_id(&self, alert_id: i64) -> Result<Option<AlertRecord>, StorageError> {
        self.inner.find_by_id(alert_id).await
    }

    async fn upsert(&self, alert: NewAlert) -> Result<AlertRecord, StorageError> {
        self.inner.upsert(alert).await
    }

    async fn update_alert(
        &self,
        alert_id: i64,
        update: AlertUpdate,
    ) -> Result<Option<AlertRecord>, StorageError> {
        self.inner.update_alert(alert_id, update).await
    }

    async fn soft_delete(&self, alert_id: i64, now: DateTime<Utc>) -> Result<bool, StorageError> {
        self.inner.soft_delete(alert_id, now).await
    }

    async fn soft_delete_batch(
        &self,
        alert_ids: &[i64],
        now: DateTime<Utc>,
    ) -> Result<u64, StorageError> {
        self.inner.soft_delete_batch(alert_ids, now).await
    }

    async fn list_alerts(
        &self,
        filter: &AlertFilter,
        page: PageRequest,
    ) -> Result<AlertPage, StorageError> {
        self.inner.list_alerts(filter, page).await
    }

    async fn reserve_notification(
        &self,
        alert_id: i64,
        daily_limit: i64,
        today: NaiveDate,
    ) -> Result<bool, StorageError> {
        if self.fail_reserve {
            return Err(StorageError::new("reserve failed"));
        }
        self.inner
            .reserve_notification(alert_id, daily_limit, today)
            .await
    }

    async fn mark_notify_pending(&self, alert_id: i64) -> Result<bool, StorageError> {
        if self.fail_reserve {
            return Err(StorageError::new("mark pending failed"));
        }
        self.inner.mark_notify_pending(alert_id).await
    }

    async fn confirm_notification(&self, _alert_id: i64) -> Result<bool, StorageError> {
        Err(StorageError::new("confirm failed"))
    }

    async fn rollback_notification(&self, _alert_id: i64) -> Result<bool, StorageError> {
        Err(StorageError::new("rollback failed"))
    }
}

fn faulty_service(
    store: Arc<FaultyStore>,
    notifier: Arc<dyn Notifier>,
    daily_limit: i64,
) -> AlertService {
    AlertService::new(
        store,
        notifier,
        Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
        )),
        AlertingConfig {
            quota: limit(daily_limit),
            dispatch: DispatchConfig::default(),
        },
    )
}

fn compensation_failures() -> u64 {
    metrics().snapshot().compensation_failure
}

struct Harness {
    store: Arc<InMemoryAlertStore>,
    clock: Arc<ManualClock>,
    service: AlertService,
}

fn harness(notifier: Arc<dyn Notifier>, policy: QuotaPolicy, dispatch: DispatchConfig) -> Harness {
    let store = Arc::new(InMemoryAlertStore::new());
    let clock = Arc::new(ManualClock::new(
        Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
    ));
    let service = AlertService::new(
        store.clone(),
        notifier,
        clock.clone(),
        AlertingConfig {
            quota: policy,
            dispatch,
        },
    );
    Harness {
        store,
        clock,
        service,
    }
}

fn limit(daily_limit: i64) -> QuotaPolicy {
    QuotaPolicy {
        daily_limit,
        resolved_bypass: false,
    }
}

fn event(status: &str) -> AlertEvent {
    AlertEvent {
        status: status.to_string(),
        starts_at: "2024-05-01T08:00:00Z".to_string(),
        ends_at: None,
        annotations: Default::default(),
        labels: AlertLabels {
            alert_involved_object_kind: "Pod".to_string(),
            alert_involved_object_name: "web-0".to_string(),
            alert_indicator: "cpu_usage".to_string(),
            alert_indicator_comparison: ">".to_string(),
            alert_indicator_threshold: "80".to_string(),
            severity: "Critical".to_string(),
            ..AlertLabels::default()
        },
    }
}

async fn wait_for<F, Fut>(mut check: F)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = bool>,
{
    for _ in 0..300 {
        if check().await {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached in time");
}

async fn current(store: &InMemoryAlertStore, alert_id: i64) -> AlertRecord {
    store
        .find_by_id(alert_id)
        .await
        .expect("query")
        .expect("alert")
}

#[tokio::test]
async fn repeated_ingestion_converges_on_one_record() {
    let notifier = Arc::new(CountingNotifier::default());
    let h = harness(notifier, limit(0), DispatchConfig::default());

    let first = h.service.ingest(event("firing")).await.expect("ingest");
    let second = h.service.ingest(event("resolved")).await.expect("ingest");
    assert_eq!(first.alert_id, second.alert_id);
    assert_eq!(first.fingerprint, second.fingerprint);
    assert_eq!(second.alert_count, 2);

    let page = h
        .service
        .list_alerts(AlertFilter::default(), PageRequest::default())
        .await
        .expect("list");
    assert_eq!(page.total, 1);
}

#[tokio::test]
async fn invalid_event_does_not_write() {
    let notifier = Arc::new(CountingNotifier::default());
    let h = harness(notifier.clone(), limit(0), DispatchConfig::default());

    let mut bad = event("firing");
    bad.starts_at = "not-a-time".to_string();
    let err = h.service.ingest(bad).await.expect_err("invalid");
    assert!(matches!(err, AlertError::Validation(_)));

    let page = h
        .store
        .list_alerts(&AlertFilter::default(), PageRequest::default())
        .await
        .expect("list");
    assert_eq!(page.total, 0);
    assert_eq!(notifier.calls(), 0);
}

#[tokio::test]
async fn daily_limit_caps_notifications() {
    let notifier = Arc::new(CountingNotifier::default());
    let h = harness(notifier.clone(), limit(3), DispatchConfig::default());

    let mut alert_id = 0;
    for _ in 0..5 {
        alert_id = h.service.ingest(event("firing")).await.expect("ingest").alert_id;
    }

    wait_for(|| async { notifier.calls() == 3 }).await;
    let store = h.store.clone();
    wait_for(|| {
        let store = store.clone();
        async move { !current(&store, alert_id).await.notify_pending }
    })
    .await;

    let record = current(&h.store, alert_id).await;
    assert_eq!(record.alert_count, 5);
    assert_eq!(record.daily_notify_count, 3);
    assert_eq!(record.last_notify_date, Some(h.clock.today()));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(notifier.calls(), 3);
}

#[tokio::test]
async fn failed_send_returns_quota() {
    let notifier = Arc::new(CountingNotifier::failing_first(1));
    let h = harness(notifier.clone(), limit(1), DispatchConfig::default());

    let alert_id = h.service.ingest(event("firing")).await.expect("ingest").alert_id;
    wait_for(|| async { notifier.calls() == 1 }).await;
    let store = h.store.clone();
    wait_for(|| {
        let store = store.clone();
        async move { current(&store, alert_id).await.daily_notify_count == 0 }
    })
    .await;
    let record = current(&h.store, alert_id).await;
    assert!(record.notify_pending);

    h.service.ingest(event("firing")).await.expect("ingest");
    wait_for(|| async { notifier.calls() == 2 }).await;
    let store = h.store.clone();
    wait_for(|| {
        let store = store.clone();
        async move { !current(&store, alert_id).await.notify_pending }
    })
    .await;
    let record = current(&h.store, alert_id).await;
    assert_eq!(record.daily_notify_count, 1);
    assert_eq!(record.alert_count, 2);
}

#[tokio::test]
async fn unlimited_quota_never_counts() {
    let notifier = Arc::new(CountingNotifier::default());
    let h = harness(notifier.clone(), limit(0), DispatchConfig::default());

    let mut alert_id = 0;
    for _ in 0..5 {
        alert_id = h.service.ingest(event("firing")).await.expect("ingest").alert_id;
    }
    wait_for(|| async { notifier.calls() == 5 }).await;

    let record = current(&h.store, alert_id).await;
    assert_eq!(record.daily_notify_count, 0);
    assert!(record.last_notify_date.is_none());
}

#[tokio::test]
async fn quota_resets_on_new_day() {
    let notifier = Arc::new(CountingNotifier::default());
    let h = harness(notifier.clone(), limit(1), DispatchConfig::default());

    let alert_id = h.service.ingest(event("firing")).await.expect("ingest").alert_id;
    h.service.ingest(event("firing")).await.expect("ingest");
    wait_for(|| async { notifier.calls() == 1 }).await;
    let first_day = h.clock.today();
    assert_eq!(current(&h.store, alert_id).await.daily_notify_count, 1);

    h.clock.advance(ChronoDuration::days(1));
    h.service.ingest(event("firing")).await.expect("ingest");
    wait_for(|| async { notifier.calls() == 2 }).await;

    let record = current(&h.store, alert_id).await;
    assert_eq!(record.daily_notify_count, 1);
    assert_eq!(record.last_notify_date, first_day.succ_opt());
}

#[tokio::test]
async fn resolved_bypass_does_not_consume_quota() {
    let notifier = Arc::new(CountingNotifier::default());
    let h = harness(
        notifier.clone(),
        QuotaPolicy {
            daily_limit: 1,
            resolved_bypass: true,
        },
        DispatchConfig::default(),
    );

    let alert_id = h.service.ingest(event("firing")).await.expect("ingest").alert_id;
    h.service.ingest(event("resolved")).await.expect("ingest");
    wait_for(|| async { notifier.calls() == 2 }).await;
    assert_eq!(current(&h.store, alert_id).await.daily_notify_count, 1);

    h.service.ingest(event("firing")).await.expect("ingest");
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(notifier.calls(), 2);
}

#[tokio::test]
async fn full_queue_rolls_back_reservation() {
    let notifier = Arc::new(GatedNotifier {
        started: AtomicUsize::new(0),
        gate: Semaphore::new(0),
    });
    let h = harness(
        notifier.clone(),
        limit(10),
        DispatchConfig {
            workers: 1,
            queue_capacity: 1,
        },
    );

    let alert_id = h.service.ingest(event("firing")).await.expect("ingest").alert_id;
    wait_for(|| async { notifier.started.load(Ordering::SeqCst) == 1 }).await;

    // worker 阻塞在第一次投递上：第二个任务入队，第三个被拒绝
    h.service.ingest(event("firing")).await.expect("ingest");
    let third = h.service.ingest(event("firing")).await.expect("ingest");
    assert_eq!(third.alert_count, 3);

    let record = current(&h.store, alert_id).await;
    assert_eq!(record.daily_notify_count, 2);
    assert!(record.notify_pending);

    notifier.gate.add_permits(10);
    wait_for(|| async { notifier.started.load(Ordering::SeqCst) == 2 }).await;
    let store = h.store.clone();
    wait_for(|| {
        let store = store.clone();
        async move { !current(&store, alert_id).await.notify_pending }
    })
    .await;
}

#[tokio::test]
async fn disabled_channel_keeps_alert_pending() {
    let h = harness(Arc::new(DisabledNotifier), limit(1), DispatchConfig::default());

    let alert_id = h.service.ingest(event("firing")).await.expect("ingest").alert_id;
    let store = h.store.clone();
    wait_for(|| {
        let store = store.clone();
        async move { current(&store, alert_id).await.daily_notify_count == 0 }
    })
    .await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    let record = current(&h.store, alert_id).await;
    assert!(record.notify_pending);
    assert_eq!(record.daily_notify_count, 0);
}

#[tokio::test]
async fn reserve_error_skips_dispatch_but_ingests() {
    let notifier = Arc::new(CountingNotifier::default());
    let store = Arc::new(FaultyStore::new(true));
    let service = faulty_service(store.clone(), notifier.clone(), 3);

    let record = service.ingest(event("firing")).await.expect("ingest");
    assert_eq!(record.alert_count, 1);
    let again = service.ingest(event("firing")).await.expect("ingest");
    assert_eq!(again.alert_id, record.alert_id);
    assert_eq!(again.alert_count, 2);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(notifier.calls(), 0);
    let stored = store
        .find_by_id(record.alert_id)
        .await
        .expect("query")
        .expect("alert");
    assert_eq!(stored.daily_notify_count, 0);
}

#[tokio::test]
async fn confirm_error_is_counted_and_keeps_pending() {
    let notifier = Arc::new(CountingNotifier::default());
    let store = Arc::new(FaultyStore::new(false));
    let service = faulty_service(store.clone(), notifier.clone(), 3);
    let before = compensation_failures();

    let record = service.ingest(event("firing")).await.expect("ingest");
    wait_for(|| async { notifier.calls() == 1 }).await;
    wait_for(|| async { compensation_failures() > before }).await;

    let stored = store
        .find_by_id(record.alert_id)
        .await
        .expect("query")
        .expect("alert");
    assert!(stored.notify_pending);
    assert_eq!(stored.daily_notify_count, 1);
}

#[tokio::test]
async fn rollback_error_is_counted() {
    let notifier = Arc::new(CountingNotifier::failing_first(1));
    let store = Arc::new(FaultyStore::new(false));
    let service = faulty_service(store.clone(), notifier.clone(), 3);
    let before = compensation_failures();

    let record = service.ingest(event("firing")).await.expect("ingest");
    wait_for(|| async { notifier.calls() == 1 }).await;
    wait_for(|| async { compensation_failures() > before }).await;

    let stored = store
        .find_by_id(record.alert_id)
        .await
        .expect("query")
        .expect("alert");
    assert!(stored.notify_pending);
    assert_eq!(stored.daily_notify_count, 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn concurrent_ingestion_respects_quota() {
    let notifier = Arc::new(CountingNotifier::default());
    let h = harness(notifier.clone(), limit(3), DispatchConfig::default());
    let service = Arc::new(h.service.clone());

    let mut handles = Vec::new();
    for _ in 0..24 {
        let service = service.clone();
        handles.push(tokio::spawn(async move { service.ingest(event("firing")).await }));
    }
    let mut alert_ids = Vec::new();
    for handle in handles {
        alert_ids.push(handle.await.expect("join").expect("ingest").alert_id);
    }
    alert_ids.dedup();
    assert_eq!(alert_ids.len(), 1);

    wait_for(|| async { notifier.calls() == 3 }).await;
    let record = current(&h.store, alert_ids[0]).await;
    assert_eq!(record.alert_count, 24);
    assert_eq!(record.daily_notify_count, 3);

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(notifier.calls(), 3);
}

#[tokio::test]
async fn management_operations() {
    let notifier = Arc::new(CountingNotifier::default());
    let h = harness(notifier, limit(0), DispatchConfig::default());

    let created = h.service.ingest(event("firing")).await.expect("ingest");
    let fetched = h.service.get_alert(created.alert_id).await.expect("get");
    assert_eq!(fetched.fingerprint, created.fingerprint);

    let mut change = event("resolved");
    change.labels.severity = "Low".to_string();
    change.ends_at = Some("2024-05-01T09:00:00Z".to_string());
    let updated = h
        .service
        .update_alert(created.alert_id, change)
        .await
        .expect("update");
    assert_eq!(updated.fingerprint, created.fingerprint);
    assert_eq!(updated.labels.severity, "Low");
    assert!(updated.ends_at.is_some());

    let page = h
        .service
        .list_alerts(
            AlertFilter {
                status: Some("resolved".to_string()),
                severity: Some(String::new()),
            },
            PageRequest::new(0, 0),
        )
        .await
        .expect("list");
    assert_eq!(page.total, 1);

    h.service.delete_alert(created.alert_id).await.expect("delete");
    h.service.delete_alert(created.alert_id).await.expect("delete twice");
    assert!(matches!(
        h.service.get_alert(created.alert_id).await,
        Err(AlertError::NotFound(_))
    ));
    assert!(matches!(
        h.service.update_alert(created.alert_id, event("firing")).await,
        Err(AlertError::NotFound(_))
    ));
    assert!(matches!(
        h.service.delete_alerts(&[]).await,
        Err(AlertError::Validation(_))
    ));

    let recreated = h.service.ingest(event("firing")).await.expect("ingest");
    assert_ne!(recreated.alert_id, created.alert_id);
    assert_eq!(recreated.alert_count, 1);
    assert_eq!(
        h.service
            .delete_alerts(&[recreated.alert_id, created.alert_id])
            .await
            .expect("batch"),
        1
    );
}
