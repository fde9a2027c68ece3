//! Calendar domain logic for the bookkeeping tool.
//!
//! Builds the day-by-day occupancy view of a month from the reservation list
//! and holds the date arithmetic the presentation layer needs (month lengths,
//! first weekday, navigation, pt-BR month names).

use chrono::{Datelike, NaiveDate};
use log::{debug, warn};
use shared::{CalendarDay, CalendarDayType, CalendarMonth, Reservation};
use std::sync::Arc;

use crate::domain::clock::Clock;
use crate::domain::errors::{DomainError, DomainResult};
use crate::domain::value::parse_date;

const MONTH_NAMES: [&str; 12] = [
    "Janeiro", "Fevereiro", "Março", "Abril", "Maio", "Junho",
    "Julho", "Agosto", "Setembro", "Outubro", "Novembro", "Dezembro",
];

/// pt-BR name of a month number (1-12)
pub fn month_name(month: u32) -> &'static str {
    match month {
        1..=12 => MONTH_NAMES[(month - 1) as usize],
        _ => "Mês inválido",
    }
}

/// Inclusive stay interval of a reservation; a missing check-out means a
/// single-day stay. `None` when the check-in date does not parse.
pub fn stay_interval(reservation: &Reservation) -> Option<(NaiveDate, NaiveDate)> {
    let start = parse_date(&reservation.date)?;
    let end = match reservation.end_date.as_deref() {
        Some(raw) => parse_date(raw).unwrap_or_else(|| {
            debug!("Reservation {} has unparseable check-out '{}', using check-in", reservation.id, raw);
            start
        }),
        None => start,
    };
    Some((start, end))
}

/// Calendar service that handles all calendar-related business logic
#[derive(Clone)]
pub struct CalendarService {
    clock: Arc<dyn Clock>,
}

impl CalendarService {
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self { clock }
    }

    /// Occupancy view of the given month.
    ///
    /// The view starts with one padding cell per weekday before day 1, then
    /// one cell per day. A day is occupied when it falls inside any
    /// reservation's inclusive stay interval; inverted intervals cover nothing.
    pub fn build_month_view(&self, reservations: &[Reservation], year: i32, month: u32) -> DomainResult<CalendarMonth> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::InvalidMonth(month));
        }

        let days_in_month = self.days_in_month(month, year);
        let first_day = self.first_day_of_month(month, year)?;

        let intervals: Vec<(u64, NaiveDate, NaiveDate)> = reservations
            .iter()
            .filter_map(|r| match stay_interval(r) {
                Some((start, end)) if end < start => {
                    warn!(
                        "Reservation {} ('{}') checks out {} before it checks in {}; ignoring for occupancy",
                        r.id, r.name, end, start
                    );
                    None
                }
                Some((start, end)) => Some((r.id, start, end)),
                None => {
                    debug!("Reservation {} has unparseable check-in '{}'", r.id, r.date);
                    None
                }
            })
            .collect();

        let mut days = Vec::with_capacity((first_day + days_in_month) as usize);

        for _ in 0..first_day {
            days.push(CalendarDay {
                day: 0,
                day_type: CalendarDayType::PaddingBefore,
                has_occupancy: false,
                reservation_ids: Vec::new(),
            });
        }

        for day in 1..=days_in_month {
            let reservation_ids: Vec<u64> = match NaiveDate::from_ymd_opt(year, month, day) {
                Some(date) => intervals
                    .iter()
                    .filter(|(_, start, end)| *start <= date && date <= *end)
                    .map(|(id, _, _)| *id)
                    .collect(),
                None => Vec::new(),
            };

            days.push(CalendarDay {
                day,
                day_type: CalendarDayType::MonthDay,
                has_occupancy: !reservation_ids.is_empty(),
                reservation_ids,
            });
        }

        debug!(
            "Built calendar for {}/{}: {} padding cells, {} occupied days",
            month,
            year,
            first_day,
            days.iter().filter(|d| d.has_occupancy).count()
        );

        Ok(CalendarMonth {
            month,
            year,
            first_day_of_week: first_day,
            days,
        })
    }

    /// Occupancy view of the clock's current month
    pub fn current_month_view(&self, reservations: &[Reservation]) -> DomainResult<CalendarMonth> {
        let (month, year) = self.current_month();
        self.build_month_view(reservations, year, month)
    }

    /// (month, year) of the clock's current date
    pub fn current_month(&self) -> (u32, i32) {
        let today = self.clock.today();
        (today.month(), today.year())
    }

    /// Get the number of days in a given month and year
    pub fn days_in_month(&self, month: u32, year: i32) -> u32 {
        match month {
            2 => if self.is_leap_year(year) { 29 } else { 28 },
            4 | 6 | 9 | 11 => 30,
            _ => 31,
        }
    }

    pub fn is_leap_year(&self, year: i32) -> bool {
        year % 4 == 0 && (year % 100 != 0 || year % 400 == 0)
    }

    /// Weekday of the first day of the month (0 = Sunday .. 6 = Saturday)
    pub fn first_day_of_month(&self, month: u32, year: i32) -> DomainResult<u32> {
        if !(1..=12).contains(&month) {
            return Err(DomainError::InvalidMonth(month));
        }
        NaiveDate::from_ymd_opt(year, month, 1)
            .map(|date| date.weekday().num_days_from_sunday())
            .ok_or(DomainError::YearOutOfRange(year))
    }

    pub fn month_name(&self, month: u32) -> &'static str {
        month_name(month)
    }

    /// "10/06/2025"; unparseable input is returned unchanged
    pub fn format_date_for_display(&self, date_str: &str) -> String {
        match parse_date(date_str) {
            Some(date) => date.format("%d/%m/%Y").to_string(),
            None => date_str.to_string(),
        }
    }

    pub fn previous_month(&self, month: u32, year: i32) -> (u32, i32) {
        if month <= 1 {
            (12, year.saturating_sub(1))
        } else {
            (month - 1, year)
        }
    }

    pub fn next_month(&self, month: u32, year: i32) -> (u32, i32) {
        if month >= 12 {
            (1, year.saturating_add(1))
        } else {
            (month + 1, year)
        }
    }
}
