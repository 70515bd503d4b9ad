use std::collections::HashMap;
use std::sync::Arc;

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, EntityTrait, PaginatorTrait, QueryFilter, Set,
    TransactionError, TransactionTrait,
};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};
use utoipa::ToSchema;
use validator::Validate;

use crate::db::DbPool;
use crate::entities::{stage_entrance, stage_entrance_part_number};
use crate::errors::ServiceError;
use crate::services::costs::{DEFAULT_DAILY_STORAGE, DEFAULT_ENTRANCE_FEE};
use crate::services::{load_rate_tables, rate_for};

// Request inputs

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PartNumberInput {
    pub part_number: String,
    pub quantity: i32,
}

/// Body of create and full-update requests.
#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
pub struct EntranceInput {
    #[validate(required(message = "folio is required"))]
    pub folio: Option<i32>,

    #[validate(required(message = "entry date is required"))]
    pub entry_date: Option<NaiveDateTime>,

    /// Pallet count on intake; defaults to 1 when omitted.
    #[serde(default)]
    pub platforms: Option<i32>,

    #[validate(length(min = 1, message = "at least one part-number line is required"))]
    pub part_numbers: Vec<PartNumberInput>,
}

// Read models

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct PartNumberLine {
    pub part_number: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EntranceSummary {
    pub id: i32,
    pub folio: Option<i32>,
    pub part_numbers: Vec<PartNumberLine>,
    pub total_pieces: i32,
    pub platforms: i32,
    pub entry_date: Option<NaiveDateTime>,
    pub exit_date: Option<NaiveDateTime>,
    pub entrance_fee: Decimal,
    pub storage_cost: Decimal,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PartNumberLineDetail {
    pub id: i32,
    pub part_number: String,
    pub quantity: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct EntranceDetail {
    pub id: i32,
    pub folio: Option<i32>,
    pub total_pieces: i32,
    pub platforms: i32,
    pub entry_date: Option<NaiveDateTime>,
    pub exit_date: Option<NaiveDateTime>,
    pub created_at: NaiveDateTime,
    pub updated_at: Option<NaiveDateTime>,
    pub part_numbers: Vec<PartNumberLineDetail>,
    pub id_storage_cost: Option<i32>,
    pub id_entrance_fee: Option<i32>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PartNumberFolioEntry {
    pub folio: Option<i32>,
    pub part_number: String,
    pub platforms: i32,
    pub total_pieces: i32,
    pub entry_date: Option<NaiveDateTime>,
    pub exit_date: Option<NaiveDateTime>,
    pub part_numbers: Vec<PartNumberLine>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct PartNumberSearchGroup {
    pub part_number: String,
    pub folios: Vec<PartNumberFolioEntry>,
    pub total_platforms: i32,
    pub total_pieces: i32,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FolioEntranceEntry {
    pub folio: Option<i32>,
    pub platforms: i32,
    pub total_pieces: i32,
    pub entry_date: Option<NaiveDateTime>,
    pub exit_date: Option<NaiveDateTime>,
    pub part_numbers: Vec<PartNumberLine>,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FolioGroup {
    pub folio: Option<i32>,
    pub entrances: Vec<FolioEntranceEntry>,
    pub total_platforms: i32,
    pub total_pieces: i32,
}

/// Outstanding quantity of one part number across all active entrances.
#[derive(Debug, Serialize, ToSchema)]
pub struct AccumulatedPartNumber {
    pub part_number: String,
    pub total_quantity: i64,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct FolioSearchResponse {
    pub folio_results: Vec<FolioGroup>,
    pub accumulated_part_numbers: Vec<AccumulatedPartNumber>,
}

/// CRUD and search operations over stage entrances and their lines.
pub struct EntranceService {
    db: Arc<DbPool>,
}

impl EntranceService {
    pub fn new(db: Arc<DbPool>) -> Self {
        Self { db }
    }

    #[instrument(skip(self))]
    pub async fn list(&self) -> Result<Vec<EntranceSummary>, ServiceError> {
        let db = &*self.db;
        let rows = stage_entrance::Entity::find()
            .find_with_related(stage_entrance_part_number::Entity)
            .all(db)
            .await?;
        let rates = load_rate_tables(db).await?;

        Ok(rows
            .into_iter()
            .map(|(se, lines)| EntranceSummary {
                id: se.id,
                folio: se.folio,
                part_numbers: lines
                    .into_iter()
                    .map(|line| PartNumberLine {
                        part_number: line.part_number,
                        quantity: line.quantity,
                    })
                    .collect(),
                total_pieces: se.total_pieces,
                platforms: se.platforms,
                entry_date: se.entry_date,
                exit_date: se.exit_date,
                entrance_fee: rate_for(&rates.entrance_fees, se.id_entrance_fee)
                    .unwrap_or(DEFAULT_ENTRANCE_FEE),
                storage_cost: rate_for(&rates.storage_rates, se.id_storage_cost)
                    .unwrap_or(DEFAULT_DAILY_STORAGE),
            })
            .collect())
    }

    #[instrument(skip(self))]
    pub async fn get(&self, id: i32) -> Result<EntranceDetail, ServiceError> {
        let db = &*self.db;
        let Some((se, lines)) = stage_entrance::Entity::find_by_id(id)
            .find_with_related(stage_entrance_part_number::Entity)
            .all(db)
            .await?
            .into_iter()
            .next()
        else {
            return Err(ServiceError::NotFound(format!("entrance {id} not found")));
        };

        Ok(EntranceDetail {
            id: se.id,
            folio: se.folio,
            total_pieces: se.total_pieces,
            platforms: se.platforms,
            entry_date: se.entry_date,
            exit_date: se.exit_date,
            created_at: se.created_at,
            updated_at: se.updated_at,
            part_numbers: lines
                .into_iter()
                .map(|line| PartNumberLineDetail {
                    id: line.id,
                    part_number: line.part_number,
                    quantity: line.quantity,
                })
                .collect(),
            id_storage_cost: se.id_storage_cost,
            id_entrance_fee: se.id_entrance_fee,
        })
    }

    /// Create an entrance with its lines. The folio must not already be in
    /// use; total pieces is the sum of line quantities.
    #[instrument(skip(self, input))]
    pub async fn create(
        &self,
        input: EntranceInput,
        now: NaiveDateTime,
    ) -> Result<i32, ServiceError> {
        let (folio, entry_date, platforms, lines) = prepare_input(input)?;

        let id = self
            .db
            .transaction::<_, i32, ServiceError>(move |txn| {
                Box::pin(async move {
                    let folio_exists = stage_entrance::Entity::find()
                        .filter(stage_entrance::Column::Folio.eq(folio))
                        .count(txn)
                        .await?
                        > 0;
                    if folio_exists {
                        return Err(ServiceError::InvalidOperation(format!(
                            "folio {folio} already exists"
                        )));
                    }

                    let total_pieces: i32 = lines.iter().map(|line| line.quantity).sum();

                    let entrance = stage_entrance::ActiveModel {
                        folio: Set(Some(folio)),
                        platforms: Set(platforms),
                        total_pieces: Set(total_pieces),
                        id_storage_cost: Set(Some(1)),
                        id_entrance_fee: Set(Some(1)),
                        entry_date: Set(Some(entry_date)),
                        exit_date: Set(None),
                        created_at: Set(now),
                        updated_at: Set(None),
                        ..Default::default()
                    }
                    .insert(txn)
                    .await?;

                    insert_lines(txn, entrance.id, &lines, now).await?;
                    Ok(entrance.id)
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        info!(id, folio, "entrance created");
        Ok(id)
    }

    /// Replace folio, entry date and lines of an existing entrance.
    #[instrument(skip(self, input))]
    pub async fn update(
        &self,
        id: i32,
        input: EntranceInput,
        now: NaiveDateTime,
    ) -> Result<i32, ServiceError> {
        let (folio, entry_date, _, lines) = prepare_input(input)?;

        self.db
            .transaction::<_, (), ServiceError>(move |txn| {
                Box::pin(async move {
                    let entrance = stage_entrance::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("entrance {id} not found"))
                        })?;

                    let folio_taken = stage_entrance::Entity::find()
                        .filter(stage_entrance::Column::Folio.eq(folio))
                        .filter(stage_entrance::Column::Id.ne(id))
                        .count(txn)
                        .await?
                        > 0;
                    if folio_taken {
                        return Err(ServiceError::InvalidOperation(format!(
                            "folio {folio} already in use by another record"
                        )));
                    }

                    let total_pieces: i32 = lines.iter().map(|line| line.quantity).sum();

                    let mut active: stage_entrance::ActiveModel = entrance.into();
                    active.folio = Set(Some(folio));
                    active.total_pieces = Set(total_pieces);
                    active.entry_date = Set(Some(entry_date));
                    active.updated_at = Set(Some(now));
                    active.update(txn).await?;

                    stage_entrance_part_number::Entity::delete_many()
                        .filter(stage_entrance_part_number::Column::StageEntranceId.eq(id))
                        .exec(txn)
                        .await?;
                    insert_lines(txn, id, &lines, now).await?;
                    Ok(())
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        info!(id, folio, "entrance updated");
        Ok(id)
    }

    /// Directly set the pallet count and exit date of one entrance. The new
    /// count must not exceed the current one.
    #[instrument(skip(self))]
    pub async fn update_exits(
        &self,
        id: i32,
        platforms: i32,
        exit_date: Option<NaiveDateTime>,
        now: NaiveDateTime,
    ) -> Result<(), ServiceError> {
        if platforms < 0 {
            return Err(ServiceError::ValidationError(
                "pallet count must be non-negative".to_string(),
            ));
        }

        let db = &*self.db;
        let entrance = stage_entrance::Entity::find_by_id(id)
            .one(db)
            .await?
            .ok_or_else(|| ServiceError::NotFound(format!("entrance {id} not found")))?;

        if platforms > entrance.platforms {
            return Err(ServiceError::InvalidOperation(format!(
                "new pallet count ({platforms}) cannot exceed the current one ({})",
                entrance.platforms
            )));
        }

        let mut active: stage_entrance::ActiveModel = entrance.into();
        active.platforms = Set(platforms);
        active.exit_date = Set(exit_date);
        active.updated_at = Set(Some(now));
        active.update(db).await?;

        info!(id, platforms, "exit record updated");
        Ok(())
    }

    /// Hard delete an entrance together with its lines.
    #[instrument(skip(self))]
    pub async fn delete(&self, id: i32) -> Result<(), ServiceError> {
        self.db
            .transaction::<_, (), ServiceError>(move |txn| {
                Box::pin(async move {
                    let entrance = stage_entrance::Entity::find_by_id(id)
                        .one(txn)
                        .await?
                        .ok_or_else(|| {
                            ServiceError::NotFound(format!("entrance {id} not found"))
                        })?;

                    stage_entrance_part_number::Entity::delete_many()
                        .filter(stage_entrance_part_number::Column::StageEntranceId.eq(id))
                        .exec(txn)
                        .await?;
                    stage_entrance::Entity::delete_by_id(entrance.id)
                        .exec(txn)
                        .await?;
                    Ok(())
                })
            })
            .await
            .map_err(unwrap_transaction_error)?;

        info!(id, "entrance deleted");
        Ok(())
    }

    /// Entrances with pallets remaining whose lines match the given part
    /// number fragment, grouped by part number.
    #[instrument(skip(self))]
    pub async fn search_by_part_number(
        &self,
        text: &str,
    ) -> Result<Vec<PartNumberSearchGroup>, ServiceError> {
        let db = &*self.db;
        let matches = stage_entrance_part_number::Entity::find()
            .find_also_related(stage_entrance::Entity)
            .filter(stage_entrance_part_number::Column::PartNumber.contains(text))
            .filter(stage_entrance::Column::Platforms.gt(0))
            .all(db)
            .await?;

        let pairs: Vec<_> = matches
            .into_iter()
            .filter_map(|(line, se)| se.map(|se| (line, se)))
            .collect();
        if pairs.is_empty() {
            return Ok(Vec::new());
        }

        let entrance_ids: Vec<i32> = {
            let mut ids: Vec<i32> = pairs.iter().map(|(_, se)| se.id).collect();
            ids.sort_unstable();
            ids.dedup();
            ids
        };
        let lines_by_entrance = self.lines_for(&entrance_ids).await?;

        // Group by matched part number, preserving first-seen order.
        let mut order: Vec<String> = Vec::new();
        let mut groups: HashMap<String, PartNumberSearchGroup> = HashMap::new();
        for (line, se) in pairs {
            let group = groups
                .entry(line.part_number.clone())
                .or_insert_with(|| {
                    order.push(line.part_number.clone());
                    PartNumberSearchGroup {
                        part_number: line.part_number.clone(),
                        folios: Vec::new(),
                        total_platforms: 0,
                        total_pieces: 0,
                    }
                });
            group.total_platforms += se.platforms;
            group.total_pieces += line.quantity;
            group.folios.push(PartNumberFolioEntry {
                folio: se.folio,
                part_number: line.part_number.clone(),
                platforms: se.platforms,
                total_pieces: se.total_pieces,
                entry_date: se.entry_date,
                exit_date: se.exit_date,
                part_numbers: lines_by_entrance.get(&se.id).cloned().unwrap_or_default(),
            });
        }

        Ok(order
            .into_iter()
            .filter_map(|part_number| groups.remove(&part_number))
            .collect())
    }

    /// Entrances for one folio plus the system-wide active inventory
    /// snapshot.
    #[instrument(skip(self))]
    pub async fn search_by_folio(&self, folio: i32) -> Result<FolioSearchResponse, ServiceError> {
        let db = &*self.db;
        let rows = stage_entrance::Entity::find()
            .filter(stage_entrance::Column::Folio.eq(folio))
            .find_with_related(stage_entrance_part_number::Entity)
            .all(db)
            .await?;

        let folio_results = if rows.is_empty() {
            Vec::new()
        } else {
            let mut total_platforms = 0;
            let mut total_pieces = 0;
            let mut entrances = Vec::with_capacity(rows.len());
            for (se, lines) in rows {
                total_platforms += se.platforms;
                total_pieces += se.total_pieces;
                entrances.push(FolioEntranceEntry {
                    folio: se.folio,
                    platforms: se.platforms,
                    total_pieces: se.total_pieces,
                    entry_date: se.entry_date,
                    exit_date: se.exit_date,
                    part_numbers: lines
                        .into_iter()
                        .map(|line| PartNumberLine {
                            part_number: line.part_number,
                            quantity: line.quantity,
                        })
                        .collect(),
                });
            }
            vec![FolioGroup {
                folio: Some(folio),
                entrances,
                total_platforms,
                total_pieces,
            }]
        };

        Ok(FolioSearchResponse {
            folio_results,
            accumulated_part_numbers: self.accumulated_part_numbers().await?,
        })
    }

    /// Outstanding quantity per part number across all active entrances
    /// (no exit date, pallets remaining), independent of any period.
    #[instrument(skip(self))]
    pub async fn accumulated_part_numbers(
        &self,
    ) -> Result<Vec<AccumulatedPartNumber>, ServiceError> {
        let db = &*self.db;
        let active = stage_entrance::Entity::find()
            .filter(stage_entrance::Column::ExitDate.is_null())
            .filter(stage_entrance::Column::Platforms.gt(0))
            .find_with_related(stage_entrance_part_number::Entity)
            .all(db)
            .await?;

        let mut totals: std::collections::BTreeMap<String, i64> = Default::default();
        for (_, lines) in active {
            for line in lines {
                *totals.entry(line.part_number).or_default() += i64::from(line.quantity);
            }
        }

        Ok(totals
            .into_iter()
            .map(|(part_number, total_quantity)| AccumulatedPartNumber {
                part_number,
                total_quantity,
            })
            .collect())
    }

    async fn lines_for(
        &self,
        entrance_ids: &[i32],
    ) -> Result<HashMap<i32, Vec<PartNumberLine>>, ServiceError> {
        let db = &*self.db;
        let lines = stage_entrance_part_number::Entity::find()
            .filter(
                stage_entrance_part_number::Column::StageEntranceId
                    .is_in(entrance_ids.iter().copied()),
            )
            .all(db)
            .await?;

        let mut by_entrance: HashMap<i32, Vec<PartNumberLine>> = HashMap::new();
        for line in lines {
            by_entrance
                .entry(line.stage_entrance_id)
                .or_default()
                .push(PartNumberLine {
                    part_number: line.part_number,
                    quantity: line.quantity,
                });
        }
        Ok(by_entrance)
    }
}

/// Normalize and check an input body: folio and entry date present, pallet
/// count non-negative, lines trimmed, non-empty and with non-negative
/// quantities.
fn prepare_input(
    input: EntranceInput,
) -> Result<(i32, NaiveDateTime, i32, Vec<PartNumberInput>), ServiceError> {
    let folio = input
        .folio
        .ok_or_else(|| ServiceError::ValidationError("folio is required".to_string()))?;
    let entry_date = input
        .entry_date
        .ok_or_else(|| ServiceError::ValidationError("entry date is required".to_string()))?;
    let platforms = input.platforms.unwrap_or(1);
    if platforms < 0 {
        return Err(ServiceError::ValidationError(
            "pallet count must be non-negative".to_string(),
        ));
    }
    if input.part_numbers.is_empty() {
        return Err(ServiceError::ValidationError(
            "at least one part-number line is required".to_string(),
        ));
    }

    let mut lines = Vec::with_capacity(input.part_numbers.len());
    for line in input.part_numbers {
        let part_number = line.part_number.trim().to_string();
        if part_number.is_empty() {
            return Err(ServiceError::ValidationError(
                "part number must not be empty".to_string(),
            ));
        }
        if line.quantity < 0 {
            return Err(ServiceError::ValidationError(format!(
                "quantity for part number {part_number} must be non-negative"
            )));
        }
        lines.push(PartNumberInput {
            part_number,
            quantity: line.quantity,
        });
    }

    Ok((folio, entry_date, platforms, lines))
}

async fn insert_lines(
    txn: &sea_orm::DatabaseTransaction,
    entrance_id: i32,
    lines: &[PartNumberInput],
    now: NaiveDateTime,
) -> Result<(), ServiceError> {
    let models: Vec<stage_entrance_part_number::ActiveModel> = lines
        .iter()
        .map(|line| stage_entrance_part_number::ActiveModel {
            stage_entrance_id: Set(entrance_id),
            part_number: Set(line.part_number.clone()),
            quantity: Set(line.quantity),
            created_at: Set(now),
            ..Default::default()
        })
        .collect();
    stage_entrance_part_number::Entity::insert_many(models)
        .exec(txn)
        .await?;
    Ok(())
}

fn unwrap_transaction_error(err: TransactionError<ServiceError>) -> ServiceError {
    match err {
        TransactionError::Connection(db_err) => ServiceError::DatabaseError(db_err),
        TransactionError::Transaction(service_err) => service_err,
    }
}
