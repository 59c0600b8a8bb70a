//! # Report Repository
//!
//! Loads sold line items and current costs, then hands them to the pure
//! aggregation in [`kasir_core::report`].
//!
//! ```text
//! sold_line_items(start, end) ──┐
//!                               ├──► report::aggregate ──► PeriodReport
//! current_costs() ──► lookup ───┘
//! ```

use chrono::{DateTime, Days, FixedOffset, NaiveDate, Utc};
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;
use crate::repository::product::ProductRepository;
use crate::repository::restock::RestockRepository;
use crate::repository::transaction::TransactionRepository;
use kasir_core::report::{self, DailyReport, MonthlyReport, ProductSales};
use kasir_core::{Money, PeriodReport, ReportPeriod, ReportWindow};

#[derive(Debug, Clone)]
pub struct ReportRepository {
    products: ProductRepository,
    transactions: TransactionRepository,
    restocks: RestockRepository,
}

impl ReportRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ReportRepository {
            products: ProductRepository::new(pool.clone()),
            transactions: TransactionRepository::new(pool.clone()),
            restocks: RestockRepository::new(pool),
        }
    }

    /// Quantity, revenue, cost and profit for `[start, end]`, costed at
    /// today's purchase prices.
    pub async fn period_report(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DbResult<PeriodReport> {
        let items = self.transactions.sold_line_items(start, end).await?;
        let costs = self.products.current_costs().await?;

        let summary = report::aggregate(&items, start, end, |item| costs.lookup(item));

        debug!(
            start = %start,
            end = %end,
            quantity = summary.total_quantity,
            revenue = %summary.total_revenue,
            "Built period report"
        );
        Ok(summary)
    }

    pub async fn window_report(&self, window: ReportWindow) -> DbResult<PeriodReport> {
        self.period_report(window.start, window.end).await
    }

    /// Report for the day/week/month/year containing `date`.
    pub async fn report_for(
        &self,
        period: ReportPeriod,
        date: NaiveDate,
        offset: FixedOffset,
    ) -> DbResult<PeriodReport> {
        self.window_report(period.window_containing(date, offset))
            .await
    }

    /// One report per month of `year`.
    pub async fn monthly_breakdown(
        &self,
        year: i32,
        offset: FixedOffset,
    ) -> DbResult<Vec<MonthlyReport>> {
        let Some(first_day) = NaiveDate::from_ymd_opt(year, 1, 1) else {
            return Ok(Vec::new());
        };
        let window = ReportPeriod::Year.window_containing(first_day, offset);

        let items = self
            .transactions
            .sold_line_items(window.start, window.end)
            .await?;
        let costs = self.products.current_costs().await?;

        Ok(report::monthly_breakdown(&items, year, offset, |item| {
            costs.lookup(item)
        }))
    }

    /// One report per day for `days` days from `from`, for the dashboard chart.
    pub async fn daily_breakdown(
        &self,
        from: NaiveDate,
        days: u32,
        offset: FixedOffset,
    ) -> DbResult<Vec<DailyReport>> {
        let Some(last_day) = days
            .checked_sub(1)
            .and_then(|span| from.checked_add_days(Days::new(u64::from(span))))
        else {
            return Ok(Vec::new());
        };
        let start = ReportPeriod::Day.window_containing(from, offset).start;
        let end = ReportPeriod::Day.window_containing(last_day, offset).end;

        let items = self.transactions.sold_line_items(start, end).await?;
        let costs = self.products.current_costs().await?;

        Ok(report::daily_breakdown(&items, from, days, offset, |item| {
            costs.lookup(item)
        }))
    }

    pub async fn top_products(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        limit: usize,
    ) -> DbResult<Vec<ProductSales>> {
        let items = self.transactions.sold_line_items(start, end).await?;
        Ok(report::top_products(&items, start, end, limit))
    }

    /// Supplier spending dated within `[start, end]`.
    pub async fn restock_spend(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> DbResult<Money> {
        let purchases = self.restocks.list_between(start, end).await?;
        Ok(report::total_restock_spend(&purchases, start, end))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
