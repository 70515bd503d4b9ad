use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, QueryFilter, Set, TransactionError,
    TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;

use crate::db::DbPool;
use crate::entities::stage_entrance;
use crate::errors::ServiceError;

/// One requested exit: a folio and how many pallets leave it.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
pub struct ExitItem {
    pub folio: i32,
    pub quantity: i32,
}

/// Per-item outcome of a batch exit. Business-rule failures are captured
/// here as data; they never abort the batch.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExitOutcome {
    pub folio: String,
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_platforms: Option<i32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub current_platforms: Option<i32>,
}

impl ExitOutcome {
    fn failure(folio: i32, message: String) -> Self {
        Self {
            folio: folio.to_string(),
            success: false,
            message,
            previous_platforms: None,
            current_platforms: None,
        }
    }
}

/// Result of one batch exit call.
#[derive(Debug, Serialize, ToSchema)]
pub struct ExitBatchOutcome {
    pub total_items: usize,
    pub succeeded: usize,
    pub failed: usize,
    pub results: Vec<ExitOutcome>,
    /// Exit timestamp shared by every item processed in this call.
    pub exit_date: NaiveDateTime,
}

/// Applies batches of exit requests against stage entrances.
pub struct ExitService {
    db: Arc<DbPool>,
}

impl ExitService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    /// Process a batch of exit requests inside a single transaction.
    ///
    /// Entrances with pallets remaining are read once at batch start. The
    /// snapshot is decremented in memory as items succeed, so several items
    /// targeting the same folio consume serially within the batch instead of
    /// re-spending a stale count. Individual business-rule failures are
    /// recorded and the rest of the batch still commits; only unexpected
    /// database errors roll the whole batch back.
    #[instrument(skip(self, items), fields(item_count = items.len()))]
    pub async fn process_exits(
        &self,
        items: Vec<ExitItem>,
        now: NaiveDateTime,
    ) -> Result<ExitBatchOutcome, ServiceError> {
        if items.is_empty() {
            return Err(ServiceError::ValidationError(
                "no exit items provided".to_string(),
            ));
        }

        let outcome = self
            .db
            .transaction::<_, ExitBatchOutcome, ServiceError>(move |txn| {
                Box::pin(async move {
                    let mut folios: Vec<i32> = Vec::new();
                    for item in &items {
                        if !folios.contains(&item.folio) {
                            folios.push(item.folio);
                        }
                    }

                    let snapshot = stage_entrance::Entity::find()
                        .filter(stage_entrance::Column::Folio.is_in(folios))
                        .filter(stage_entrance::Column::Platforms.gt(0))
                        .all(txn)
                        .await?;

                    // folio -> (entrance id, pallets still available in this batch)
                    let mut available: HashMap<i32, (i32, i32)> = snapshot
                        .into_iter()
                        .filter_map(|se| se.folio.map(|folio| (folio, (se.id, se.platforms))))
                        .collect();

                    let mut results = Vec::with_capacity(items.len());
                    for item in &items {
                        let Some((id, remaining)) = available.get_mut(&item.folio) else {
                            results.push(ExitOutcome::failure(
                                item.folio,
                                "folio not found or no pallets available".to_string(),
                            ));
                            continue;
                        };

                        if item.quantity < 1 {
                            results.push(ExitOutcome::failure(
                                item.folio,
                                format!("requested quantity ({}) must be positive", item.quantity),
                            ));
                            continue;
                        }

                        if item.quantity > *remaining {
                            results.push(ExitOutcome::failure(
                                item.folio,
                                format!(
                                    "requested quantity ({}) exceeds available pallets ({})",
                                    item.quantity, remaining
                                ),
                            ));
                            continue;
                        }

                        let previous = *remaining;
                        let current = previous - item.quantity;

                        let update = stage_entrance::ActiveModel {
                            id: Set(*id),
                            platforms: Set(current),
                            exit_date: Set(Some(now)),
                            updated_at: Set(Some(now)),
                            ..Default::default()
                        };
                        update.update(txn).await?;

                        *remaining = current;
                        results.push(ExitOutcome {
                            folio: item.folio.to_string(),
                            success: true,
                            message: format!("exit processed: {} pallets", item.quantity),
                            previous_platforms: Some(previous),
                            current_platforms: Some(current),
                        });
                    }

                    let succeeded = results.iter().filter(|r| r.success).count();
                    let failed = results.len() - succeeded;

                    Ok(ExitBatchOutcome {
                        total_items: results.len(),
                        succeeded,
                        failed,
                        results,
                        exit_date: now,
                    })
                })
            })
            .await
            .map_err(|err| match err {
                TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
                TransactionError::Transaction(service_err) => service_err,
            })?;

        info!(
            succeeded = outcome.succeeded,
            failed = outcome.failed,
            "exit batch processed"
        );
        Ok(outcome)
    }
}
