//! Month grid with occupied days in brackets.

use shared::{CalendarDayType, CalendarMonth, Reservation};

const WEEKDAYS: [&str; 7] = ["Dom", "Seg", "Ter", "Qua", "Qui", "Sex", "Sáb"];

/// "Junho 2025" header, weekday row, then one line per week. Occupied days
/// render as `[10]`, free days as ` 10 `.
pub fn render_calendar(month: &CalendarMonth, month_name: &str) -> String {
    let mut out = format!("{} {}\n", month_name, month.year);

    let header: String = WEEKDAYS.iter().map(|d| format!(" {}", d)).collect();
    out.push_str(&header);
    out.push('\n');

    let mut line = String::new();
    for (i, day) in month.days.iter().enumerate() {
        let cell = match day.day_type {
            CalendarDayType::PaddingBefore => "    ".to_string(),
            CalendarDayType::MonthDay if day.has_occupancy => format!("[{:>2}]", day.day),
            CalendarDayType::MonthDay => format!(" {:>2} ", day.day),
        };
        line.push_str(&cell);

        if (i + 1) % 7 == 0 {
            out.push_str(line.trim_end());
            out.push('\n');
            line.clear();
        }
    }
    if !line.is_empty() {
        out.push_str(line.trim_end());
        out.push('\n');
    }

    out
}

/// Guests staying at some point of the month, in calendar order
pub fn render_occupants(month: &CalendarMonth, reservations: &[Reservation]) -> Vec<String> {
    let mut lines = Vec::new();
    let mut seen = Vec::new();

    for day in month.month_days() {
        for id in &day.reservation_ids {
            if seen.contains(id) {
                continue;
            }
            seen.push(*id);

            if let Some(r) = reservations.iter().find(|r| r.id == *id) {
                let last_day = month
                    .month_days()
                    .filter(|d| d.reservation_ids.contains(id))
                    .map(|d| d.day)
                    .max()
                    .unwrap_or(day.day);
                lines.push(format!("{:>2}-{:>2}  {}", day.day, last_day, r.name));
            }
        }
    }

    lines
}
