//! Pure cost rules for staging-yard billing.
//!
//! All functions are stateless. Callers capture one timestamp per request and
//! pass it in, so every cost computed within a request sees the same clock.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use crate::config::StorageAccrual;

/// Fee applied to both entrance and exit when no rate row is referenced.
pub const DEFAULT_ENTRANCE_FEE: Decimal = dec!(67.50);

/// Per-pallet-per-day storage rate applied when no rate row is referenced.
pub const DEFAULT_DAILY_STORAGE: Decimal = dec!(133);

const MILLIS_PER_DAY: i64 = 86_400_000;

/// Days a record has spent in storage, rounded up to the next whole day.
///
/// Returns 0 when the entry date is absent. When the exit date is absent the
/// elapsed time runs to `now`.
pub fn days_in_storage(
    entry: Option<NaiveDateTime>,
    exit: Option<NaiveDateTime>,
    now: NaiveDateTime,
) -> i64 {
    let Some(entry) = entry else {
        return 0;
    };
    let end = exit.unwrap_or(now);
    let millis = (end - entry).num_milliseconds();
    if millis <= 0 {
        0
    } else {
        (millis + MILLIS_PER_DAY - 1) / MILLIS_PER_DAY
    }
}

/// Flat fee charged on entrance.
pub fn entrance_cost(rate: Option<Decimal>) -> Decimal {
    rate.unwrap_or(DEFAULT_ENTRANCE_FEE)
}

/// Flat fee charged once the record has exited. Reuses the entrance rate;
/// there is no separate exit rate.
pub fn exit_cost(rate: Option<Decimal>, has_exited: bool) -> Decimal {
    if has_exited {
        rate.unwrap_or(DEFAULT_ENTRANCE_FEE)
    } else {
        Decimal::ZERO
    }
}

/// Storage fee for one record under the given accrual policy.
///
/// `Continuous` charges days-in-storage x daily rate x pallet count.
/// `EndOfPeriod` charges the daily rate x pallet count exactly once, and only
/// for records still open when the reporting period has already closed.
pub fn storage_cost(
    policy: StorageAccrual,
    entry: Option<NaiveDateTime>,
    exit: Option<NaiveDateTime>,
    daily_rate: Option<Decimal>,
    platforms: i32,
    period_end: NaiveDateTime,
    now: NaiveDateTime,
) -> Decimal {
    let rate = daily_rate.unwrap_or(DEFAULT_DAILY_STORAGE);
    match policy {
        StorageAccrual::Continuous => {
            Decimal::from(days_in_storage(entry, exit, now)) * rate * Decimal::from(platforms)
        }
        StorageAccrual::EndOfPeriod => {
            if exit.is_none() && now >= period_end {
                rate * Decimal::from(platforms)
            } else {
                Decimal::ZERO
            }
        }
    }
}

/// Sum of the three cost components.
pub fn total_cost(entrance: Decimal, exit: Decimal, storage: Decimal) -> Decimal {
    entrance + exit + storage
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rstest::rstest;

    fn dt(y: i32, m: u32, d: u32, h: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(h, min, 0)
            .unwrap()
    }

    #[test]
    fn days_is_zero_without_entry_date() {
        assert_eq!(days_in_storage(None, None, dt(2025, 3, 10, 12, 0)), 0);
    }

    #[rstest]
    #[case(dt(2025, 3, 1, 10, 0), dt(2025, 3, 1, 10, 0), 0)] // same instant
    #[case(dt(2025, 3, 1, 10, 0), dt(2025, 3, 1, 10, 1), 1)] // any fraction rounds up
    #[case(dt(2025, 3, 1, 10, 0), dt(2025, 3, 2, 10, 0), 1)] // exactly one day
    #[case(dt(2025, 3, 1, 10, 0), dt(2025, 3, 2, 10, 1), 2)]
    #[case(dt(2025, 3, 1, 0, 0), dt(2025, 3, 31, 23, 59), 31)]
    fn days_round_up_to_whole_days(
        #[case] entry: NaiveDateTime,
        #[case] exit: NaiveDateTime,
        #[case] expected: i64,
    ) {
        assert_eq!(
            days_in_storage(Some(entry), Some(exit), dt(2025, 6, 1, 0, 0)),
            expected
        );
    }

    #[test]
    fn open_record_runs_to_now() {
        let entry = dt(2025, 3, 1, 8, 0);
        let now = dt(2025, 3, 4, 9, 0);
        assert_eq!(days_in_storage(Some(entry), None, now), 4);
    }

    #[test]
    fn fees_fall_back_to_defaults() {
        assert_eq!(entrance_cost(None), DEFAULT_ENTRANCE_FEE);
        assert_eq!(entrance_cost(Some(dec!(80))), dec!(80));
        assert_eq!(exit_cost(None, true), DEFAULT_ENTRANCE_FEE);
        assert_eq!(exit_cost(Some(dec!(80)), true), dec!(80));
        assert_eq!(exit_cost(Some(dec!(80)), false), Decimal::ZERO);
    }

    #[test]
    fn continuous_accrual_multiplies_days_rate_pallets() {
        let entry = dt(2025, 3, 1, 0, 0);
        let exit = dt(2025, 3, 4, 0, 0);
        let cost = storage_cost(
            StorageAccrual::Continuous,
            Some(entry),
            Some(exit),
            Some(dec!(10)),
            5,
            dt(2025, 3, 31, 23, 59),
            dt(2025, 6, 1, 0, 0),
        );
        // 3 days x 10 x 5 pallets
        assert_eq!(cost, dec!(150));
    }

    #[test]
    fn end_of_period_charges_open_records_once() {
        let entry = dt(2025, 3, 1, 0, 0);
        let period_end = dt(2025, 3, 31, 23, 59);

        // Still open, period closed: one flat charge per pallet.
        let charged = storage_cost(
            StorageAccrual::EndOfPeriod,
            Some(entry),
            None,
            None,
            2,
            period_end,
            dt(2025, 4, 15, 0, 0),
        );
        assert_eq!(charged, DEFAULT_DAILY_STORAGE * Decimal::from(2));

        // Exited before the report: nothing.
        let exited = storage_cost(
            StorageAccrual::EndOfPeriod,
            Some(entry),
            Some(dt(2025, 3, 10, 0, 0)),
            None,
            2,
            period_end,
            dt(2025, 4, 15, 0, 0),
        );
        assert_eq!(exited, Decimal::ZERO);

        // Period not yet closed: nothing.
        let open_period = storage_cost(
            StorageAccrual::EndOfPeriod,
            Some(entry),
            None,
            None,
            2,
            period_end,
            dt(2025, 3, 20, 0, 0),
        );
        assert_eq!(open_period, Decimal::ZERO);
    }

    #[test]
    fn total_is_component_sum() {
        assert_eq!(
            total_cost(dec!(67.50), dec!(67.50), dec!(133)),
            dec!(268.00)
        );
    }
}
