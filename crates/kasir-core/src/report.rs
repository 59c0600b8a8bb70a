//! # Sales Reports
//!
//! Aggregation of sold line items into per-period totals.
//!
//! ## Aggregation Flow
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                                                                         │
//! │  SoldLineItem[] ──► filter start ≤ timestamp ≤ end                      │
//! │                          │                                              │
//! │                          ├──► Σ quantity_sold            = quantity     │
//! │                          ├──► Σ qty × unit_price_at_sale = revenue      │
//! │                          ├──► Σ qty × cost_lookup(item)  = cost         │
//! │                          └──► revenue − cost             = profit       │
//! │                                                                         │
//! │  A day/week/month/year report is the same call with another window.   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Cost comes from the product's *current* purchase price, looked up when
//! the report is generated. A missing product counts as zero cost.

use chrono::{DateTime, Datelike, Days, Duration, FixedOffset, Months, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashSet};
use ts_rs::TS;

use crate::error::{CoreResult, ValidationError};
use crate::money::Money;
use crate::types::{RestockPurchase, SoldLineItem};

// =============================================================================
// Report Window
// =============================================================================

/// An inclusive `[start, end]` time range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ReportWindow {
    #[ts(as = "String")]
    pub start: DateTime<Utc>,
    #[ts(as = "String")]
    pub end: DateTime<Utc>,
}

impl ReportWindow {
    /// A caller-chosen range. `start` must not be after `end`.
    pub fn custom(start: DateTime<Utc>, end: DateTime<Utc>) -> CoreResult<Self> {
        if start > end {
            return Err(ValidationError::InvalidFormat {
                field: "period".to_string(),
                reason: "start is after end".to_string(),
            }
            .into());
        }
        Ok(ReportWindow { start, end })
    }

    #[inline]
    pub fn contains(&self, timestamp: DateTime<Utc>) -> bool {
        self.start <= timestamp && timestamp <= self.end
    }
}

/// Calendar period shapes offered by the dashboard filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "snake_case")]
pub enum ReportPeriod {
    Day,
    /// Monday to Sunday.
    Week,
    Month,
    Year,
}

impl ReportPeriod {
    /// The period containing `date`, in the store's local `offset`.
    ///
    /// The window ends one nanosecond before the next period starts, so
    /// consecutive windows never overlap and never leave a gap.
    ///
    /// ```rust
    /// use chrono::{FixedOffset, NaiveDate};
    /// use kasir_core::report::ReportPeriod;
    ///
    /// let wib = FixedOffset::east_opt(7 * 3600).unwrap();
    /// let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap();
    /// let window = ReportPeriod::Month.window_containing(date, wib);
    /// assert_eq!(window.start.to_rfc3339(), "2024-12-31T17:00:00+00:00");
    /// ```
    pub fn window_containing(self, date: NaiveDate, offset: FixedOffset) -> ReportWindow {
        let first = match self {
            ReportPeriod::Day => date,
            ReportPeriod::Week => {
                date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
            }
            ReportPeriod::Month => date - Duration::days(i64::from(date.day0())),
            ReportPeriod::Year => date - Duration::days(i64::from(date.ordinal0())),
        };
        let next = match self {
            ReportPeriod::Day => first + Duration::days(1),
            ReportPeriod::Week => first + Duration::days(7),
            ReportPeriod::Month => first + Months::new(1),
            ReportPeriod::Year => first + Months::new(12),
        };

        ReportWindow {
            start: local_midnight(first, offset),
            end: local_midnight(next, offset) - Duration::nanoseconds(1),
        }
    }
}

fn local_midnight(date: NaiveDate, offset: FixedOffset) -> DateTime<Utc> {
    let local = date.and_time(chrono::NaiveTime::MIN);
    (local - Duration::seconds(i64::from(offset.local_minus_utc()))).and_utc()
}

// =============================================================================
// Period Report
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct PeriodReport {
    pub window: ReportWindow,
    pub total_quantity: i64,
    pub total_revenue: Money,
    pub total_cost: Money,
    pub total_profit: Money,
    /// Distinct transactions with at least one line in the window.
    pub transaction_count: usize,
}

/// Sums the items sold within `[period_start, period_end]`.
///
/// `cost_lookup` resolves the current per-piece cost of an item's product;
/// `None` (product deleted or renamed) counts as zero.
///
/// ```rust
/// use chrono::{TimeZone, Utc};
/// use kasir_core::report::aggregate;
/// use kasir_core::{Money, SoldLineItem};
///
/// let sold = vec![SoldLineItem {
///     transaction_id: "tx-1".into(),
///     product_id: Some("p1".into()),
///     product_name: "Teh Pucuk".into(),
///     quantity_sold: 5,
///     unit_price_at_sale: Money::from_rupiah(1000),
///     timestamp: Utc.with_ymd_and_hms(2025, 1, 1, 9, 0, 0).unwrap(),
/// }];
/// let report = aggregate(
///     &sold,
///     Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
///     Utc.with_ymd_and_hms(2025, 1, 1, 23, 59, 59).unwrap(),
///     |_| Some(Money::from_rupiah(600)),
/// );
/// assert_eq!(report.total_profit.rupiah(), 2000);
/// ```
pub fn aggregate<F>(
    items: &[SoldLineItem],
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
    cost_lookup: F,
) -> PeriodReport
where
    F: Fn(&SoldLineItem) -> Option<Money>,
{
    let window = ReportWindow {
        start: period_start,
        end: period_end,
    };

    let mut total_quantity = 0;
    let mut total_revenue = Money::zero();
    let mut total_cost = Money::zero();
    let mut transactions = HashSet::new();

    for item in items.iter().filter(|item| window.contains(item.timestamp)) {
        total_quantity += item.quantity_sold;
        total_revenue += item.revenue();
        total_cost += cost_lookup(item)
            .unwrap_or_default()
            .multiply_quantity(item.quantity_sold);
        transactions.insert(item.transaction_id.as_str());
    }

    PeriodReport {
        window,
        total_quantity,
        total_revenue,
        total_cost,
        total_profit: total_revenue - total_cost,
        transaction_count: transactions.len(),
    }
}

/// [`aggregate`] over a [`ReportWindow`].
pub fn aggregate_window<F>(items: &[SoldLineItem], window: ReportWindow, cost_lookup: F) -> PeriodReport
where
    F: Fn(&SoldLineItem) -> Option<Money>,
{
    aggregate(items, window.start, window.end, cost_lookup)
}

// =============================================================================
// Monthly Breakdown
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct MonthlyReport {
    /// e.g. "Januari 2025"
    pub label: String,
    pub month: u32,
    pub report: PeriodReport,
}

const MONTH_NAMES: [&str; 12] = [
    "Januari",
    "Februari",
    "Maret",
    "April",
    "Mei",
    "Juni",
    "Juli",
    "Agustus",
    "September",
    "Oktober",
    "November",
    "Desember",
];

/// One report per calendar month of `year`, January first.
pub fn monthly_breakdown<F>(
    items: &[SoldLineItem],
    year: i32,
    offset: FixedOffset,
    cost_lookup: F,
) -> Vec<MonthlyReport>
where
    F: Fn(&SoldLineItem) -> Option<Money>,
{
    (1..=12u32)
        .filter_map(|month| NaiveDate::from_ymd_opt(year, month, 1).map(|first| (month, first)))
        .map(|(month, first)| {
            let window = ReportPeriod::Month.window_containing(first, offset);
            MonthlyReport {
                label: format!("{} {}", MONTH_NAMES[(month - 1) as usize], year),
                month,
                report: aggregate_window(items, window, &cost_lookup),
            }
        })
        .collect()
}

// =============================================================================
// Daily Breakdown
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct DailyReport {
    /// e.g. "7 Jan"
    pub label: String,
    #[ts(as = "String")]
    pub date: NaiveDate,
    pub report: PeriodReport,
}

/// One report per store-local day, `days` days starting at `from`.
///
/// Feeds the dashboard sales chart.
pub fn daily_breakdown<F>(
    items: &[SoldLineItem],
    from: NaiveDate,
    days: u32,
    offset: FixedOffset,
    cost_lookup: F,
) -> Vec<DailyReport>
where
    F: Fn(&SoldLineItem) -> Option<Money>,
{
    (0..u64::from(days))
        .map_while(|step| from.checked_add_days(Days::new(step)))
        .map(|date| {
            let window = ReportPeriod::Day.window_containing(date, offset);
            let month: String = MONTH_NAMES[date.month0() as usize].chars().take(3).collect();
            DailyReport {
                label: format!("{} {}", date.day(), month),
                date,
                report: aggregate_window(items, window, &cost_lookup),
            }
        })
        .collect()
}

// =============================================================================
// Best Sellers
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
#[serde(rename_all = "camelCase")]
pub struct ProductSales {
    pub product_name: String,
    pub quantity_sold: i64,
    pub revenue: Money,
}

/// Best sellers in the window by quantity, ties broken by name.
pub fn top_products(
    items: &[SoldLineItem],
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
    limit: usize,
) -> Vec<ProductSales> {
    let window = ReportWindow {
        start: period_start,
        end: period_end,
    };

    let mut by_name: BTreeMap<&str, ProductSales> = BTreeMap::new();
    for item in items.iter().filter(|item| window.contains(item.timestamp)) {
        let entry = by_name
            .entry(item.product_name.as_str())
            .or_insert_with(|| ProductSales {
                product_name: item.product_name.clone(),
                quantity_sold: 0,
                revenue: Money::zero(),
            });
        entry.quantity_sold += item.quantity_sold;
        entry.revenue += item.revenue();
    }

    let mut ranked: Vec<ProductSales> = by_name.into_values().collect();
    ranked.sort_by(|a, b| {
        b.quantity_sold
            .cmp(&a.quantity_sold)
            .then_with(|| a.product_name.cmp(&b.product_name))
    });
    ranked.truncate(limit);
    ranked
}

/// Total restock spending dated within the window.
pub fn total_restock_spend(
    purchases: &[RestockPurchase],
    period_start: DateTime<Utc>,
    period_end: DateTime<Utc>,
) -> Money {
    purchases
        .iter()
        .filter(|purchase| period_start <= purchase.date && purchase.date <= period_end)
        .map(|purchase| purchase.amount)
        .sum()
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(day: u32, hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, day, hour, 0, 0).unwrap()
    }

    fn sold(tx: &str, name: &str, qty: i64, price: i64, timestamp: DateTime<Utc>) -> SoldLineItem {
        SoldLineItem {
            transaction_id: tx.to_string(),
            product_id: Some(format!("id-{}", name)),
            product_name: name.to_string(),
            quantity_sold: qty,
            unit_price_at_sale: Money::from_rupiah(price),
            timestamp,
        }
    }

    fn cost_600(_: &SoldLineItem) -> Option<Money> {
        Some(Money::from_rupiah(600))
    }

    #[test]
    fn test_two_day_window() {
        let items = vec![
            sold("tx-1", "Teh Pucuk", 5, 1000, at(1, 10)),
            sold("tx-2", "Teh Pucuk", 3, 1000, at(2, 15)),
        ];

        let report = aggregate(&items, at(1, 0), at(2, 23), cost_600);
        assert_eq!(report.total_quantity, 8);
        assert_eq!(report.total_revenue.rupiah(), 8000);
        assert_eq!(report.total_cost.rupiah(), 4800);
        assert_eq!(report.total_profit.rupiah(), 3200);
        assert_eq!(report.transaction_count, 2);
    }

    #[test]
    fn test_window_is_inclusive_at_both_ends() {
        let items = vec![
            sold("tx-1", "Aqua", 1, 3000, at(1, 0)),
            sold("tx-2", "Aqua", 1, 3000, at(1, 12)),
            sold("tx-3", "Aqua", 1, 3000, at(1, 13)),
        ];

        let report = aggregate(&items, at(1, 0), at(1, 12), cost_600);
        assert_eq!(report.total_quantity, 2);
    }

    #[test]
    fn test_missing_cost_counts_as_zero() {
        let items = vec![sold("tx-1", "Discontinued", 2, 5000, at(3, 9))];

        let report = aggregate(&items, at(1, 0), at(31, 0), |_| None);
        assert_eq!(report.total_cost, Money::zero());
        assert_eq!(report.total_profit.rupiah(), 10000);
    }

    #[test]
    fn test_aggregate_is_additive_over_disjoint_windows() {
        let items: Vec<SoldLineItem> = (1..=20)
            .map(|i| {
                sold(
                    &format!("tx-{}", i),
                    "Kopi Kapal Api",
                    i,
                    2500,
                    at(1 + (i as u32 % 10), (i as u32 * 5) % 24),
                )
            })
            .collect();

        let a = at(1, 0);
        let b = at(5, 12);
        let c = at(12, 0);
        let left = aggregate(&items, a, b, cost_600);
        let right = aggregate(&items, b + Duration::nanoseconds(1), c, cost_600);
        let whole = aggregate(&items, a, c, cost_600);

        assert_eq!(left.total_quantity + right.total_quantity, whole.total_quantity);
        assert_eq!(left.total_revenue + right.total_revenue, whole.total_revenue);
        assert_eq!(left.total_profit + right.total_profit, whole.total_profit);
    }

    #[test]
    fn test_transaction_count_is_distinct() {
        let items = vec![
            sold("tx-1", "Aqua", 1, 3000, at(1, 9)),
            sold("tx-1", "Teh Pucuk", 2, 4000, at(1, 9)),
            sold("tx-2", "Aqua", 1, 3000, at(1, 10)),
        ];
        let report = aggregate(&items, at(1, 0), at(1, 23), cost_600);
        assert_eq!(report.transaction_count, 2);
    }

    #[test]
    fn test_period_windows() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 15).unwrap(); // Wednesday

        let day = ReportPeriod::Day.window_containing(date, utc);
        assert_eq!(day.start, Utc.with_ymd_and_hms(2025, 1, 15, 0, 0, 0).unwrap());
        assert_eq!(
            day.end,
            Utc.with_ymd_and_hms(2025, 1, 16, 0, 0, 0).unwrap() - Duration::nanoseconds(1)
        );

        let week = ReportPeriod::Week.window_containing(date, utc);
        assert_eq!(week.start, Utc.with_ymd_and_hms(2025, 1, 13, 0, 0, 0).unwrap());

        let month = ReportPeriod::Month.window_containing(date, utc);
        assert_eq!(month.start, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert!(month.contains(Utc.with_ymd_and_hms(2025, 1, 31, 23, 59, 59).unwrap()));
        assert!(!month.contains(Utc.with_ymd_and_hms(2025, 2, 1, 0, 0, 0).unwrap()));

        let year = ReportPeriod::Year.window_containing(date, utc);
        assert_eq!(year.start, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
        assert!(year.contains(Utc.with_ymd_and_hms(2025, 12, 31, 23, 0, 0).unwrap()));
    }

    #[test]
    fn test_local_offset_shifts_window() {
        let wib = FixedOffset::east_opt(7 * 3600).unwrap();
        let date = NaiveDate::from_ymd_opt(2025, 1, 2).unwrap();

        let day = ReportPeriod::Day.window_containing(date, wib);
        assert_eq!(day.start, Utc.with_ymd_and_hms(2025, 1, 1, 17, 0, 0).unwrap());
    }

    #[test]
    fn test_custom_window_rejects_reversed_range() {
        assert!(ReportWindow::custom(at(2, 0), at(1, 0)).is_err());
        assert!(ReportWindow::custom(at(1, 0), at(1, 0)).is_ok());
    }

    #[test]
    fn test_monthly_breakdown() {
        let items = vec![
            sold("tx-1", "Aqua", 4, 3000, at(10, 9)),
            sold("tx-2", "Aqua", 1, 3000, Utc.with_ymd_and_hms(2025, 3, 5, 9, 0, 0).unwrap()),
        ];
        let utc = FixedOffset::east_opt(0).unwrap();

        let months = monthly_breakdown(&items, 2025, utc, cost_600);
        assert_eq!(months.len(), 12);
        assert_eq!(months[0].label, "Januari 2025");
        assert_eq!(months[0].report.total_quantity, 4);
        assert_eq!(months[1].report.total_quantity, 0);
        assert_eq!(months[2].report.total_quantity, 1);
        assert_eq!(months[11].label, "Desember 2025");
    }

    #[test]
    fn test_daily_breakdown() {
        let items = vec![
            sold("tx-1", "Aqua", 2, 3000, at(1, 9)),
            sold("tx-2", "Aqua", 3, 3000, at(3, 20)),
            sold("tx-3", "Aqua", 1, 3000, at(9, 9)),
        ];
        let wib = FixedOffset::east_opt(7 * 3600).unwrap();
        let from = NaiveDate::from_ymd_opt(2025, 1, 1).unwrap();

        let week = daily_breakdown(&items, from, 7, wib, cost_600);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].label, "1 Jan");
        assert_eq!(week[6].label, "7 Jan");
        assert_eq!(week[0].report.total_quantity, 2);
        assert_eq!(week[0].report.total_profit.rupiah(), 4800);
        // 20:00 UTC on the 3rd is already the 4th in WIB
        assert_eq!(week[2].report.total_quantity, 0);
        assert_eq!(week[3].report.total_quantity, 3);
        assert_eq!(
            week.iter().map(|day| day.report.total_quantity).sum::<i64>(),
            5
        );

        assert!(daily_breakdown(&items, from, 0, wib, cost_600).is_empty());
    }

    #[test]
    fn test_daily_labels_cross_months() {
        let utc = FixedOffset::east_opt(0).unwrap();
        let from = NaiveDate::from_ymd_opt(2025, 7, 31).unwrap();

        let days = daily_breakdown(&[], from, 2, utc, cost_600);
        assert_eq!(days[0].label, "31 Jul");
        assert_eq!(days[1].label, "1 Agu");
        assert_eq!(days[1].report.total_quantity, 0);
    }

    #[test]
    fn test_top_products() {
        let items = vec![
            sold("tx-1", "Aqua 600ml", 3, 3000, at(1, 9)),
            sold("tx-2", "Indomie Goreng", 5, 3500, at(1, 9)),
            sold("tx-3", "Aqua 600ml", 2, 3000, at(1, 10)),
            sold("tx-4", "Teh Pucuk", 1, 4000, at(1, 11)),
        ];

        let top = top_products(&items, at(1, 0), at(1, 23), 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].product_name, "Aqua 600ml");
        assert_eq!(top[0].quantity_sold, 5);
        assert_eq!(top[0].revenue.rupiah(), 15000);
        assert_eq!(top[1].product_name, "Indomie Goreng");
    }

    #[test]
    fn test_total_restock_spend() {
        let purchase = |day, amount| RestockPurchase {
            id: format!("r-{}", day),
            date: at(day, 8),
            amount: Money::from_rupiah(amount),
            note: String::new(),
        };
        let purchases = vec![purchase(1, 250000), purchase(2, 100000), purchase(9, 75000)];

        assert_eq!(
            total_restock_spend(&purchases, at(1, 0), at(3, 0)).rupiah(),
            350000
        );
    }
}
