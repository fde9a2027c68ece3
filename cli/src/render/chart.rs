//! Monthly income/expense/profit bars, as text for the dashboard and as an
//! SVG file for `sitio chart`.

use anyhow::{anyhow, Result};
use plotters::prelude::*;
use shared::MonthlySummary;
use std::path::Path;

use super::money;

/// Width in characters of a full-scale text bar
pub const BAR_WIDTH: usize = 30;

const INCOME_COLOR: RGBColor = RGBColor(34, 197, 94);
const EXPENSE_COLOR: RGBColor = RGBColor(239, 68, 68);
const PROFIT_COLOR: RGBColor = RGBColor(59, 130, 246);

/// Number of bar characters for `value` when `scale` fills [`BAR_WIDTH`]
pub fn bar_length(value: f64, scale: f64) -> usize {
    if scale <= 0.0 || !value.is_finite() {
        return 0;
    }
    let length = (value.abs() / scale * BAR_WIDTH as f64).round() as usize;
    length.min(BAR_WIDTH)
}

pub fn render_text_chart(series: &[MonthlySummary], scale: f64, currency: &str) -> String {
    let mut out = String::new();

    for month in series {
        let rows = [
            ("Receita", month.income, '█'),
            ("Despesa", month.expense, '▓'),
            ("Lucro", month.profit, '░'),
        ];
        for (i, (label, value, glyph)) in rows.iter().enumerate() {
            let period = if i == 0 { month.period_label.as_str() } else { "" };
            let length = bar_length(*value, scale);
            let bar: String = std::iter::repeat(*glyph).take(length).collect();
            out.push_str(&format!(
                "{:<8} {:<8} {}{} {}\n",
                period,
                label,
                bar,
                " ".repeat(BAR_WIDTH - length),
                money(currency, *value)
            ));
        }
    }

    out
}

fn draw_err<E: std::fmt::Display>(e: E) -> anyhow::Error {
    anyhow!("failed to draw chart: {}", e)
}

/// Grouped bar chart of the monthly series written to `path` as SVG
pub fn write_svg_chart(series: &[MonthlySummary], scale: f64, path: &Path) -> Result<()> {
    if series.is_empty() {
        return Err(anyhow!("no monthly data to chart"));
    }

    let root = SVGBackend::new(path, (900, 420)).into_drawing_area();
    root.fill(&WHITE).map_err(draw_err)?;

    let lowest = series
        .iter()
        .flat_map(|m| [m.income, m.expense, m.profit])
        .fold(0.0_f64, f64::min);
    let y_min = if lowest < 0.0 { lowest * 1.1 } else { 0.0 };
    let y_max = scale * 1.1;

    let mut chart = ChartBuilder::on(&root)
        .caption("Receitas e despesas por mês", ("sans-serif", 20))
        .margin(15)
        .x_label_area_size(30)
        .y_label_area_size(70)
        .build_cartesian_2d(0.0..series.len() as f64, y_min..y_max)
        .map_err(draw_err)?;

    chart
        .configure_mesh()
        .disable_x_mesh()
        .x_label_formatter(&|_| String::new())
        .y_label_formatter(&|v| format!("{:.0}", v))
        .label_style(("sans-serif", 12, &RGBColor(102, 126, 234)))
        .axis_style(&RGBColor(230, 230, 230))
        .bold_line_style(&RGBColor(245, 245, 245))
        .light_line_style(&RGBColor(250, 250, 250))
        .draw()
        .map_err(draw_err)?;

    let bars = [
        (0usize, INCOME_COLOR, "Receita"),
        (1, EXPENSE_COLOR, "Despesa"),
        (2, PROFIT_COLOR, "Lucro"),
    ];
    for (offset, color, label) in bars {
        chart
            .draw_series(series.iter().enumerate().map(move |(i, m)| {
                let value = match offset {
                    0 => m.income,
                    1 => m.expense,
                    _ => m.profit,
                };
                let x0 = i as f64 + 0.1 + offset as f64 * 0.27;
                Rectangle::new([(x0, 0.0), (x0 + 0.25, value)], color.filled())
            }))
            .map_err(draw_err)?
            .label(label)
            .legend(move |(x, y)| Rectangle::new([(x, y - 5), (x + 10, y + 5)], color.filled()));
    }

    chart
        .draw_series(series.iter().enumerate().map(|(i, m)| {
            Text::new(m.period_label.clone(), (i as f64 + 0.3, y_min), ("sans-serif", 12))
        }))
        .map_err(draw_err)?;

    chart
        .configure_series_labels()
        .background_style(&WHITE.mix(0.8))
        .border_style(&BLACK)
        .draw()
        .map_err(draw_err)?;

    root.present().map_err(draw_err)?;
    Ok(())
}
