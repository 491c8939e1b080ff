//! Periodic repair work: subscription counters and orphaned stored assets.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use sea_orm::prelude::Expr;
use sea_orm::*;
use tracing::{error, info, warn};
use vidhub_common::retry::calculate_backoff;
use vidhub_common::{AssetKey, AssetKind, AssetStore};

use crate::config::MaintenanceConfig;
use crate::entity::orphaned_asset;

const RETRY_BASE_MS: u64 = 60_000;
const RETRY_MAX_MS: u64 = 6 * 60 * 60 * 1000;
const SWEEP_BATCH: u64 = 100;

/// Run the maintenance loop as a background task.
pub async fn run_maintenance(
    db: DatabaseConnection,
    assets: Arc<dyn AssetStore>,
    config: MaintenanceConfig,
) {
    info!(
        interval_secs = config.interval_secs,
        max_asset_delete_attempts = config.max_asset_delete_attempts,
        "Starting maintenance task"
    );

    let mut interval = tokio::time::interval(Duration::from_secs(std::cmp::Ord::max(config.interval_secs, 1)));

    loop {
        interval.tick().await;

        match reconcile_counters(&db).await {
            Ok(0) => {}
            Ok(repaired) => info!(repaired, "Repaired drifted subscription counters"),
            Err(e) => error!(error = %e, "Counter reconciliation failed"),
        }

        match sweep_orphaned_assets(&db, assets.as_ref(), config.max_asset_delete_attempts).await {
            Ok(report) if report.is_empty() => {}
            Ok(report) => info!(
                deleted = report.deleted,
                failed = report.failed,
                abandoned = report.abandoned,
                "Swept orphaned assets"
            ),
            Err(e) => error!(error = %e, "Orphaned asset sweep failed"),
        }
    }
}

// Only rows whose stored counters differ from the true counts are written.
const RECONCILE_COUNTERS_SQL: &str = r#"
UPDATE "user" AS u
SET subscribers_count = c.subscribers,
    channels_subscribed_to_count = c.subscriptions
FROM (
    SELECT x.id,
           (SELECT COUNT(*) FROM "subscription" s WHERE s.channel_id = x.id)::BIGINT AS subscribers,
           (SELECT COUNT(*) FROM "subscription" s WHERE s.subscriber_id = x.id)::BIGINT AS subscriptions
    FROM "user" x
) AS c
WHERE u.id = c.id
  AND (u.subscribers_count <> c.subscribers OR u.channels_subscribed_to_count <> c.subscriptions)
"#;

/// Reset every user's subscription counters to the counted truth.
/// Returns the number of users that were repaired.
pub async fn reconcile_counters<C: ConnectionTrait>(db: &C) -> Result<u64, DbErr> {
    let result = db
        .execute_raw(Statement::from_string(
            DbBackend::Postgres,
            RECONCILE_COUNTERS_SQL,
        ))
        .await?;
    Ok(result.rows_affected())
}

/// Outcome of one orphaned-asset sweep.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SweepReport {
    pub deleted: u64,
    pub failed: u64,
    /// Failures that used up the last attempt.
    pub abandoned: u64,
}

impl SweepReport {
    pub fn is_empty(&self) -> bool {
        self.deleted == 0 && self.failed == 0 && self.abandoned == 0
    }
}

/// Delay before the next attempt after `attempts` failed ones.
pub fn retry_delay(attempts: i32) -> chrono::Duration {
    let delay = calculate_backoff(std::cmp::Ord::max(attempts, 1) as u32, RETRY_BASE_MS, RETRY_MAX_MS);
    chrono::Duration::from_std(delay).unwrap_or(chrono::Duration::milliseconds(RETRY_MAX_MS as i64))
}

/// Retry due deletions from `orphaned_asset`.
pub async fn sweep_orphaned_assets(
    db: &DatabaseConnection,
    assets: &dyn AssetStore,
    max_attempts: i32,
) -> Result<SweepReport, DbErr> {
    let due = orphaned_asset::Entity::find()
        .filter(orphaned_asset::Column::NextAttemptAt.lte(Utc::now()))
        .filter(orphaned_asset::Column::Attempts.lt(max_attempts))
        .order_by_asc(orphaned_asset::Column::NextAttemptAt)
        .limit(SWEEP_BATCH)
        .all(db)
        .await?;

    let mut report = SweepReport::default();

    for orphan in due {
        let target = AssetKind::from_str(&orphan.kind)
            .and_then(|kind| AssetKey::parse(&orphan.key).map(|key| (key, kind)));
        let (key, kind) = match target {
            Ok(target) => target,
            Err(e) => {
                warn!(key = %orphan.key, kind = %orphan.kind, error = %e, "Dropping unparseable orphaned asset");
                orphaned_asset::Entity::delete_by_id(orphan.id).exec(db).await?;
                continue;
            }
        };

        match assets.delete(&key, kind).await {
            Ok(_) => {
                orphaned_asset::Entity::delete_by_id(orphan.id).exec(db).await?;
                report.deleted += 1;
            }
            Err(e) => {
                let attempts = orphan.attempts + 1;
                orphaned_asset::Entity::update_many()
                    .col_expr(orphaned_asset::Column::Attempts, Expr::value(attempts))
                    .col_expr(orphaned_asset::Column::LastError, Expr::value(Some(e.to_string())))
                    .col_expr(
                        orphaned_asset::Column::NextAttemptAt,
                        Expr::value(Utc::now() + retry_delay(attempts)),
                    )
                    .filter(orphaned_asset::Column::Id.eq(orphan.id.as_str()))
                    .exec(db)
                    .await?;

                if attempts >= max_attempts {
                    warn!(key = %orphan.key, %kind, attempts, error = %e, "Giving up on orphaned asset");
                    report.abandoned += 1;
                } else {
                    report.failed += 1;
                }
            }
        }
    }

    Ok(report)
}
