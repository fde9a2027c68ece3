//! Dashboard aggregation for the bookkeeping tool.
//!
//! Pure derivations over the record store's current contents: totals and
//! margin, the monthly income/expense series behind the bar chart, the
//! upcoming-reservations list and the month-name filter of the reservations
//! table. Nothing is cached; every call recomputes from the slices it is given.

use chrono::{Datelike, NaiveDate};
use log::debug;
use shared::{Expense, FinancialTotals, MonthlySummary, Reservation};
use std::collections::BTreeMap;
use std::sync::Arc;

use crate::domain::calendar::month_name;
use crate::domain::clock::Clock;
use crate::domain::value::{amount_of, parse_date};

/// Number of reservations shown in the "upcoming" card
pub const DEFAULT_UPCOMING_LIMIT: usize = 3;

#[derive(Clone)]
pub struct DashboardService {
    clock: Arc<dyn Clock>,
    upcoming_limit: usize,
}

impl DashboardService {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            upcoming_limit: DEFAULT_UPCOMING_LIMIT,
        }
    }

    pub fn with_upcoming_limit(mut self, limit: usize) -> Self {
        self.upcoming_limit = limit;
        self
    }

    pub fn upcoming_limit(&self) -> usize {
        self.upcoming_limit
    }

    /// Totals shown on the summary cards
    pub fn compute_totals(&self, reservations: &[Reservation], expenses: &[Expense]) -> FinancialTotals {
        let paid: Vec<&Reservation> = reservations.iter().filter(|r| r.paid).collect();
        let total_income: f64 = paid.iter().map(|r| amount_of(&r.value)).sum();
        let total_expenses: f64 = expenses.iter().map(|e| amount_of(&e.value)).sum();
        let total_profit = total_income - total_expenses;

        let margin_pct = if total_income > 0.0 {
            round_half_up(total_profit / total_income * 100.0)
        } else {
            0
        };

        debug!(
            "Totals: income {:.2} from {} paid reservations, expenses {:.2} from {} records, margin {}%",
            total_income,
            paid.len(),
            total_expenses,
            expenses.len(),
            margin_pct
        );

        FinancialTotals {
            total_income,
            total_expenses,
            total_profit,
            margin_pct,
            paid_reservations: paid.len(),
            expense_count: expenses.len(),
        }
    }

    /// Income, expense and profit per calendar month, in chronological order.
    ///
    /// A reservation opens its month even when unpaid, but only paid ones add
    /// income. Records whose date does not parse are skipped.
    pub fn compute_monthly_series(&self, reservations: &[Reservation], expenses: &[Expense]) -> Vec<MonthlySummary> {
        let mut buckets: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();

        for reservation in reservations {
            match parse_date(&reservation.date) {
                Some(date) => {
                    let bucket = buckets.entry((date.year(), date.month())).or_insert((0.0, 0.0));
                    if reservation.paid {
                        bucket.0 += amount_of(&reservation.value);
                    }
                }
                None => debug!("Skipping reservation {} with unparseable date '{}'", reservation.id, reservation.date),
            }
        }

        for expense in expenses {
            match parse_date(&expense.date) {
                Some(date) => {
                    let bucket = buckets.entry((date.year(), date.month())).or_insert((0.0, 0.0));
                    bucket.1 += amount_of(&expense.value);
                }
                None => debug!("Skipping expense {} with unparseable date '{}'", expense.id, expense.date),
            }
        }

        buckets
            .into_iter()
            .map(|((year, month), (income, expense))| MonthlySummary {
                year,
                month,
                period_label: period_label(year, month),
                income,
                expense,
                profit: income - expense,
            })
            .collect()
    }

    /// Reservations checking in on or after `reference`, soonest first,
    /// truncated to `limit`
    pub fn filter_upcoming(&self, reservations: &[Reservation], reference: NaiveDate, limit: usize) -> Vec<Reservation> {
        let mut upcoming: Vec<(NaiveDate, &Reservation)> = reservations
            .iter()
            .filter_map(|r| parse_date(&r.date).map(|date| (date, r)))
            .filter(|(date, _)| *date >= reference)
            .collect();

        upcoming.sort_by_key(|(date, _)| *date);

        upcoming
            .into_iter()
            .take(limit)
            .map(|(_, r)| r.clone())
            .collect()
    }

    /// Upcoming reservations relative to the clock's current date
    pub fn upcoming_reservations(&self, reservations: &[Reservation]) -> Vec<Reservation> {
        self.filter_upcoming(reservations, self.clock.today(), self.upcoming_limit)
    }

    /// Case-insensitive substring match of `query` against the pt-BR month
    /// name of each reservation's check-in date. A blank query keeps everything.
    pub fn filter_by_month_name(&self, reservations: &[Reservation], query: &str) -> Vec<Reservation> {
        let query = query.trim().to_lowercase();
        if query.is_empty() {
            return reservations.to_vec();
        }

        reservations
            .iter()
            .filter(|r| {
                parse_date(&r.date)
                    .map(|date| month_name(date.month()).to_lowercase().contains(&query))
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    /// Largest absolute bar height in the series, used to scale charts.
    /// Never below 1.0 so an all-zero series still draws.
    pub fn chart_scale(&self, series: &[MonthlySummary]) -> f64 {
        series
            .iter()
            .flat_map(|m| [m.income.abs(), m.expense.abs(), m.profit.abs()])
            .fold(1.0, f64::max)
    }
}

/// Month/year label used as the chart's x axis ("03/2025")
pub fn period_label(year: i32, month: u32) -> String {
    format!("{:02}/{}", month, year)
}

/// Round half towards positive infinity, the way the dashboard has always
/// displayed margins (-2.5 → -2, 2.5 → 3)
fn round_half_up(value: f64) -> i64 {
    (value + 0.5).floor() as i64
}
