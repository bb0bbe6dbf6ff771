//! The audit trail service.

use std::sync::Arc;

use common::Clock;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::entry::{AuditAction, AuditLogEntry};
use crate::log::AuditLogStore;
use crate::principal::{PrincipalResolver, SYSTEM_ACTOR};

/// Records auditable changes on key aggregates.
///
/// One generic service covers every aggregate type: snapshots are produced
/// structurally from the aggregate's `Serialize` impl rather than by a
/// bespoke snapshotter per type. All failure modes degrade — an entry with
/// a missing side is written instead of failing, and a failed log write is
/// logged and swallowed so the business mutation it describes stands.
pub struct AuditTrail {
    store: Arc<dyn AuditLogStore>,
    resolver: Arc<dyn PrincipalResolver>,
    clock: Arc<dyn Clock>,
}

impl AuditTrail {
    /// Creates an audit trail over the given log store, principal resolver
    /// and clock.
    pub fn new(
        store: Arc<dyn AuditLogStore>,
        resolver: Arc<dyn PrincipalResolver>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            store,
            resolver,
            clock,
        }
    }

    /// Produces a flat field-name → value mapping of the aggregate's
    /// current state.
    ///
    /// On conversion failure this returns an empty mapping: audit capture
    /// must never block the primary write, so an uninformative snapshot is
    /// preferred over an error.
    pub fn snapshot<T: Serialize>(&self, value: &T) -> Map<String, Value> {
        match serde_json::to_value(value) {
            Ok(Value::Object(map)) => map,
            Ok(_) => {
                tracing::warn!("audit snapshot did not produce an object");
                metrics::counter!("audit_snapshot_failures").increment(1);
                Map::new()
            }
            Err(err) => {
                tracing::warn!(error = %err, "failed to build audit snapshot");
                metrics::counter!("audit_snapshot_failures").increment(1);
                Map::new()
            }
        }
    }

    /// Records an `INSERT` entry for a newly persisted aggregate.
    ///
    /// `old_values` is always absent on the creation path.
    pub async fn record_creation<T: Serialize>(
        &self,
        table_name: &str,
        record_id: i64,
        new_value: &T,
    ) {
        self.record(
            table_name,
            record_id,
            AuditAction::Insert,
            None,
            to_json(new_value),
        )
        .await;
    }

    /// Records an `UPDATE` entry from a pre-mutation snapshot and the
    /// persisted post-state.
    ///
    /// The two sides are serialized independently: if one fails, only that
    /// side is written as absent. An empty pre-snapshot is stored as an
    /// empty object, not as absent.
    pub async fn record_update<T: Serialize>(
        &self,
        table_name: &str,
        record_id: i64,
        old_values: Map<String, Value>,
        new_value: &T,
    ) {
        self.record(
            table_name,
            record_id,
            AuditAction::Update,
            Some(Value::Object(old_values)),
            to_json(new_value),
        )
        .await;
    }

    async fn record(
        &self,
        table_name: &str,
        record_id: i64,
        action: AuditAction,
        old_values: Option<Value>,
        new_values: Option<Value>,
    ) {
        let entry = AuditLogEntry {
            id: None,
            table_name: table_name.to_string(),
            record_id,
            action,
            old_values,
            new_values,
            actor: self.resolve_actor(),
            changed_at: self.clock.now(),
        };

        match self.store.append(entry).await {
            Ok(_) => {
                metrics::counter!("audit_entries_written").increment(1);
            }
            Err(err) => {
                // Audit is best-effort: the primary write already
                // succeeded, so this must not propagate.
                metrics::counter!("audit_write_failures").increment(1);
                tracing::warn!(
                    error = %err,
                    table = table_name,
                    record_id,
                    "failed to write audit entry"
                );
            }
        }
    }

    fn resolve_actor(&self) -> String {
        self.resolver
            .current_actor()
            .filter(|name| !name.trim().is_empty())
            .unwrap_or_else(|| SYSTEM_ACTOR.to_string())
    }
}

fn to_json<T: Serialize>(value: &T) -> Option<Value> {
    match serde_json::to_value(value) {
        Ok(v) => Some(v),
        Err(err) => {
            tracing::warn!(error = %err, "failed to serialize audit payload");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::log::{AuditStoreError, InMemoryAuditLog};
    use crate::principal::{StaticPrincipal, SystemPrincipal};
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use common::FixedClock;
    use serde::ser::Error as _;

    #[derive(Serialize)]
    struct Sample {
        name: &'static str,
        count: u32,
    }

    struct Exploding;

    impl Serialize for Exploding {
        fn serialize<S: serde::Serializer>(&self, _: S) -> Result<S::Ok, S::Error> {
            Err(S::Error::custom("boom"))
        }
    }

    struct FailingLog;

    #[async_trait]
    impl AuditLogStore for FailingLog {
        async fn append(&self, _: AuditLogEntry) -> Result<AuditLogEntry, AuditStoreError> {
            Err(AuditStoreError::Backend("disk full".to_string()))
        }

        async fn find_by_record(
            &self,
            _: &str,
            _: i64,
        ) -> Result<Vec<AuditLogEntry>, AuditStoreError> {
            Ok(vec![])
        }

        async fn find_all(&self) -> Result<Vec<AuditLogEntry>, AuditStoreError> {
            Ok(vec![])
        }
    }

    fn clock() -> Arc<FixedClock> {
        Arc::new(FixedClock::at(
            Utc.with_ymd_and_hms(2025, 6, 1, 12, 0, 0).unwrap(),
        ))
    }

    fn trail(log: Arc<dyn AuditLogStore>, resolver: Arc<dyn PrincipalResolver>) -> AuditTrail {
        AuditTrail::new(log, resolver, clock())
    }

    #[test]
    fn snapshot_flattens_fields() {
        let service = trail(Arc::new(InMemoryAuditLog::new()), Arc::new(SystemPrincipal));
        let map = service.snapshot(&Sample {
            name: "Rex",
            count: 2,
        });

        assert_eq!(map["name"], "Rex");
        assert_eq!(map["count"], 2);
    }

    #[test]
    fn snapshot_degrades_to_empty_map() {
        let service = trail(Arc::new(InMemoryAuditLog::new()), Arc::new(SystemPrincipal));

        assert!(service.snapshot(&Exploding).is_empty());
        // a non-object value degrades the same way
        assert!(service.snapshot(&42).is_empty());
    }

    #[tokio::test]
    async fn record_creation_has_no_old_values() {
        let log = Arc::new(InMemoryAuditLog::new());
        let service = trail(log.clone(), Arc::new(SystemPrincipal));

        service
            .record_creation("patients", 7, &Sample { name: "Rex", count: 1 })
            .await;

        let entries = log.find_by_record("patients", 7).await.unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].action, AuditAction::Insert);
        assert_eq!(entries[0].old_values, None);
        assert_eq!(entries[0].new_values.as_ref().unwrap()["name"], "Rex");
        assert_eq!(entries[0].changed_at, clock().now());
    }

    #[tokio::test]
    async fn record_update_keeps_both_snapshots() {
        let log = Arc::new(InMemoryAuditLog::new());
        let service = trail(log.clone(), Arc::new(SystemPrincipal));

        let before = service.snapshot(&Sample { name: "Rex", count: 1 });
        service
            .record_update("patients", 7, before, &Sample { name: "Max", count: 1 })
            .await;

        let entries = log.find_by_record("patients", 7).await.unwrap();
        assert_eq!(entries[0].action, AuditAction::Update);
        assert_eq!(entries[0].old_values.as_ref().unwrap()["name"], "Rex");
        assert_eq!(entries[0].new_values.as_ref().unwrap()["name"], "Max");
    }

    #[tokio::test]
    async fn record_update_degrades_one_side_independently() {
        let log = Arc::new(InMemoryAuditLog::new());
        let service = trail(log.clone(), Arc::new(SystemPrincipal));

        let before = service.snapshot(&Sample { name: "Rex", count: 1 });
        service.record_update("patients", 7, before, &Exploding).await;

        let entries = log.find_by_record("patients", 7).await.unwrap();
        assert!(entries[0].old_values.is_some());
        assert_eq!(entries[0].new_values, None);
    }

    #[tokio::test]
    async fn empty_pre_snapshot_is_stored_as_empty_object() {
        let log = Arc::new(InMemoryAuditLog::new());
        let service = trail(log.clone(), Arc::new(SystemPrincipal));

        service
            .record_update("patients", 7, Map::new(), &Sample { name: "Max", count: 1 })
            .await;

        let entries = log.find_by_record("patients", 7).await.unwrap();
        assert_eq!(entries[0].old_values, Some(serde_json::json!({})));
    }

    #[tokio::test]
    async fn unauthenticated_context_records_system_actor() {
        let log = Arc::new(InMemoryAuditLog::new());
        let service = trail(log.clone(), Arc::new(SystemPrincipal));

        service
            .record_creation("owners", 1, &Sample { name: "Jane", count: 0 })
            .await;

        let entries = log.find_all().await.unwrap();
        assert_eq!(entries[0].actor, SYSTEM_ACTOR);
    }

    #[tokio::test]
    async fn authenticated_context_records_principal_verbatim() {
        let log = Arc::new(InMemoryAuditLog::new());
        let service = trail(log.clone(), Arc::new(StaticPrincipal::named("dr.smith")));

        service
            .record_creation("owners", 1, &Sample { name: "Jane", count: 0 })
            .await;

        let entries = log.find_all().await.unwrap();
        assert_eq!(entries[0].actor, "dr.smith");
    }

    #[tokio::test]
    async fn blank_principal_name_falls_back_to_system() {
        let log = Arc::new(InMemoryAuditLog::new());
        let service = trail(log.clone(), Arc::new(StaticPrincipal::named("   ")));

        service
            .record_creation("owners", 1, &Sample { name: "Jane", count: 0 })
            .await;

        let entries = log.find_all().await.unwrap();
        assert_eq!(entries[0].actor, SYSTEM_ACTOR);
    }

    #[tokio::test]
    async fn failed_log_write_is_swallowed() {
        let service = trail(Arc::new(FailingLog), Arc::new(SystemPrincipal));

        // must not panic or propagate
        service
            .record_creation("owners", 1, &Sample { name: "Jane", count: 0 })
            .await;
    }
}
