//! Recommendation flow integration tests
//!
//! Cooldown gate + service over a real sled store in a temp directory.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Duration, TimeZone, Utc};
use growmonitor::recommendation::{
    CooldownGate, GeneratorError, RecommendationGenerator, RecommendationService,
};
use growmonitor::storage::{CooldownStore, SledStore, StoreError};
use growmonitor::types::{
    format_remaining, AggregateSummary, CooldownRecord, Derived, GateState,
    RecommendationContext, RecommendationOutcome, StatusSnapshot,
};

struct EchoGenerator {
    calls: AtomicUsize,
}

#[async_trait]
impl RecommendationGenerator for EchoGenerator {
    async fn generate(&self, context: &RecommendationContext) -> Result<String, GeneratorError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let vpd = context.snapshot.vpd;
        Ok(format!("VPD is {vpd} kPa"))
    }

    fn backend_name(&self) -> &'static str {
        "echo"
    }
}

fn noon() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 6, 1, 12, 0, 0).unwrap()
}

fn context(user: &str) -> RecommendationContext {
    RecommendationContext {
        user_id: user.to_string(),
        snapshot: StatusSnapshot {
            temperature: Some(25.0),
            humidity: Some(50.0),
            vpd: Derived::Value(1.58),
            dew_point: Derived::Value(13.84),
            temperature_window: AggregateSummary::absent("va_temperature"),
            humidity_window: AggregateSummary::absent("va_humidity"),
        },
        note: Some("flowering week 3".into()),
    }
}

fn service(store: &Arc<SledStore>, generator: &Arc<EchoGenerator>) -> RecommendationService {
    RecommendationService::new(
        CooldownGate::default(),
        store.clone(),
        store.clone(),
        generator.clone(),
    )
}

#[tokio::test]
async fn grant_then_cooldown_then_grant_again() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SledStore::open(dir.path()).unwrap());
    let generator = Arc::new(EchoGenerator {
        calls: AtomicUsize::new(0),
    });
    let svc = service(&store, &generator);

    let first = svc.request(&context("alice"), noon()).await.unwrap();
    let RecommendationOutcome::Granted(record) = first else {
        panic!("first request should be granted");
    };
    assert_eq!(record.message, "VPD is 1.58 kPa");
    assert_eq!(record.timestamp, "2026-06-01T12:00:00.000Z");

    let later = noon() + Duration::hours(23);
    match svc.request(&context("alice"), later).await.unwrap() {
        RecommendationOutcome::CoolingDown { until, remaining } => {
            assert_eq!(until, noon() + Duration::hours(24));
            assert_eq!(format_remaining(remaining), "1h 0m 0s");
        }
        other => panic!("expected cooldown, got {other:?}"),
    }
    assert_eq!(generator.calls.load(Ordering::SeqCst), 1);

    // Other users are unaffected
    assert!(svc.state("bob", later).unwrap().is_available());

    let next_day = noon() + Duration::hours(25);
    let again = svc.request(&context("alice"), next_day).await.unwrap();
    assert!(matches!(again, RecommendationOutcome::Granted(_)));
    assert_eq!(svc.history("alice", 10).unwrap().len(), 2);
}

#[tokio::test]
async fn cooldown_persists_across_reopen() {
    let dir = tempfile::tempdir().unwrap();
    {
        let store = Arc::new(SledStore::open(dir.path()).unwrap());
        let generator = Arc::new(EchoGenerator {
            calls: AtomicUsize::new(0),
        });
        service(&store, &generator)
            .request(&context("alice"), noon())
            .await
            .unwrap();
    }

    let store = SledStore::open(dir.path()).unwrap();
    let state = CooldownGate::default()
        .check(&store, "alice", noon() + Duration::minutes(30))
        .unwrap();
    assert!(matches!(state, GateState::CoolingDown { .. }));
}

#[tokio::test]
async fn corrupt_timestamp_blocks_request() {
    let dir = tempfile::tempdir().unwrap();
    let store = Arc::new(SledStore::open(dir.path()).unwrap());
    store
        .put_cooldown(&CooldownRecord {
            user_id: "alice".into(),
            last_timestamp: "not-a-date".into(),
        })
        .unwrap();
    let generator = Arc::new(EchoGenerator {
        calls: AtomicUsize::new(0),
    });
    let svc = service(&store, &generator);

    assert!(matches!(
        svc.state("alice", noon()),
        Err(StoreError::InvalidTimestamp { .. })
    ));
    assert!(svc.request(&context("alice"), noon()).await.is_err());
    assert_eq!(generator.calls.load(Ordering::SeqCst), 0);
    let stored = CooldownStore::get(store.as_ref(), "alice").unwrap().unwrap();
    assert_eq!(stored.last_timestamp, "not-a-date");
}
