pub mod costs;
pub mod entrances;
pub mod exits;
pub mod export;
pub mod reports;

use std::collections::HashMap;

use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, EntityTrait};

use crate::entities::{entrance_fee, storage_cost};
use crate::errors::ServiceError;

/// In-memory snapshot of the two rate tables, loaded once per request.
pub(crate) struct RateTables {
    pub entrance_fees: HashMap<i32, Option<Decimal>>,
    pub storage_rates: HashMap<i32, Option<Decimal>>,
}

pub(crate) async fn load_rate_tables<C: ConnectionTrait>(
    db: &C,
) -> Result<RateTables, ServiceError> {
    let entrance_fees = entrance_fee::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|row| (row.id, row.cost))
        .collect();
    let storage_rates = storage_cost::Entity::find()
        .all(db)
        .await?
        .into_iter()
        .map(|row| (row.id, row.cost))
        .collect();
    Ok(RateTables {
        entrance_fees,
        storage_rates,
    })
}

/// Resolve a referenced rate; `None` means the caller falls back to the
/// hard-coded default.
pub(crate) fn rate_for(rates: &HashMap<i32, Option<Decimal>>, id: Option<i32>) -> Option<Decimal> {
    id.and_then(|id| rates.get(&id).copied().flatten())
}
