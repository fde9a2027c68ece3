//! Text rendering of the backend's views.

pub mod calendar;
pub mod chart;
pub mod table;

use shared::{Expense, FinancialTotals, MonthlySummary, Reservation};
use sitio_backend::domain::value::amount_of;

use table::Table;

/// "R$ 1234.50"
pub fn money(currency: &str, amount: f64) -> String {
    format!("{} {:.2}", currency, amount)
}

pub fn render_totals(totals: &FinancialTotals, currency: &str) -> String {
    let mut table = Table::new(&["Receita", "Despesas", "Lucro", "Margem"])
        .right_aligned(0)
        .right_aligned(1)
        .right_aligned(2)
        .right_aligned(3);
    table.push_row(vec![
        money(currency, totals.total_income),
        money(currency, totals.total_expenses),
        money(currency, totals.total_profit),
        format!("{}%", totals.margin_pct),
    ]);
    format!(
        "{}{} reservas pagas, {} despesas\n",
        table, totals.paid_reservations, totals.expense_count
    )
}

pub fn render_monthly(series: &[MonthlySummary], currency: &str) -> String {
    let mut table = Table::new(&["Período", "Receita", "Despesa", "Lucro"])
        .right_aligned(1)
        .right_aligned(2)
        .right_aligned(3);
    for month in series {
        table.push_row(vec![
            month.period_label.clone(),
            money(currency, month.income),
            money(currency, month.expense),
            money(currency, month.profit),
        ]);
    }
    table.to_string()
}

/// `display_date` turns stored dates into "dd/mm/yyyy"
pub fn render_reservations(
    reservations: &[Reservation],
    currency: &str,
    display_date: impl Fn(&str) -> String,
) -> String {
    let mut table = Table::new(&["Id", "Hóspede", "Entrada", "Saída", "Valor", "Pago"]).right_aligned(4);
    for r in reservations {
        table.push_row(vec![
            r.id.to_string(),
            r.name.clone(),
            display_date(&r.date),
            r.end_date.as_deref().map(&display_date).unwrap_or_default(),
            money(currency, amount_of(&r.value)),
            if r.paid { "Sim" } else { "Não" }.to_string(),
        ]);
    }
    table.to_string()
}

pub fn render_expenses(expenses: &[Expense], currency: &str, display_date: impl Fn(&str) -> String) -> String {
    let mut table = Table::new(&["Id", "Descrição", "Data", "Categoria", "Valor"]).right_aligned(4);
    for e in expenses {
        table.push_row(vec![
            e.id.to_string(),
            e.description.clone(),
            display_date(&e.date),
            e.category.label().to_string(),
            money(currency, amount_of(&e.value)),
        ]);
    }
    table.to_string()
}
