//! Command handlers. Each one reads from or mutates the backend and writes
//! its report to `out`; prompts read from `input`.

use anyhow::{bail, Result};
use log::info;
use shared::{ExpenseDraft, ReservationDraft};
use sitio_backend::domain::value::amount_of;
use sitio_backend::domain::DomainError;
use sitio_backend::{Backend, KeyValueStorage};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

use crate::args::{Command, ExpenseCommand, ReservationCommand, ThemeAction};
use crate::render::{self, calendar, chart, money};

pub fn run<S, R, W>(command: Command, backend: &mut Backend<S>, input: &mut R, out: &mut W) -> Result<()>
where
    S: KeyValueStorage,
    R: BufRead,
    W: Write,
{
    match command {
        Command::Dashboard => dashboard(backend, out),
        Command::Reservations(cmd) => reservations(cmd, backend, input, out),
        Command::Expenses(cmd) => expenses(cmd, backend, input, out),
        Command::Calendar { year, month, prev, next } => show_calendar(backend, year, month, prev, next, out),
        Command::Chart { out: path } => export_chart(backend, &path, out),
        Command::Export { dir, csv } => export(backend, dir.as_deref(), csv, out),
        Command::Import { file } => import(backend, &file, out),
        Command::Theme { action } => theme(backend, action, out),
    }
}

fn dashboard<S: KeyValueStorage, W: Write>(backend: &Backend<S>, out: &mut W) -> Result<()> {
    let records = &backend.records;
    let currency = backend.config.currency_symbol.as_str();
    let dashboard = &backend.dashboard_service;

    writeln!(
        out,
        "Sítio do Toninho (tema {})\n",
        if records.dark_mode() { "escuro" } else { "claro" }
    )?;

    let totals = dashboard.compute_totals(records.reservations(), records.expenses());
    write!(out, "{}", render::render_totals(&totals, currency))?;

    let series = dashboard.compute_monthly_series(records.reservations(), records.expenses());
    writeln!(out, "\nResumo mensal")?;
    if series.is_empty() {
        writeln!(out, "Nenhum lançamento ainda.")?;
    } else {
        write!(out, "{}", render::render_monthly(&series, currency))?;
        writeln!(out)?;
        write!(out, "{}", chart::render_text_chart(&series, dashboard.chart_scale(&series), currency))?;
    }

    writeln!(out, "\nPróximas reservas")?;
    let upcoming = dashboard.upcoming_reservations(records.reservations());
    if upcoming.is_empty() {
        writeln!(out, "Nenhuma reserva futura.")?;
    }
    for r in upcoming {
        writeln!(
            out,
            "{}  {}  {}{}",
            backend.calendar_service.format_date_for_display(&r.date),
            r.name,
            money(currency, amount_of(&r.value)),
            if r.paid { "" } else { "  (a receber)" }
        )?;
    }
    Ok(())
}

fn reservations<S, R, W>(command: ReservationCommand, backend: &mut Backend<S>, input: &mut R, out: &mut W) -> Result<()>
where
    S: KeyValueStorage,
    R: BufRead,
    W: Write,
{
    match command {
        ReservationCommand::List { month } => {
            let all = backend.records.reservations();
            let shown = match month.as_deref() {
                Some(query) => backend.dashboard_service.filter_by_month_name(all, query),
                None => all.to_vec(),
            };
            if shown.is_empty() {
                writeln!(out, "Nenhuma reserva encontrada.")?;
                return Ok(());
            }
            let calendar_service = &backend.calendar_service;
            write!(
                out,
                "{}",
                render::render_reservations(&shown, &backend.config.currency_symbol, |d| {
                    calendar_service.format_date_for_display(d)
                })
            )?;
        }
        ReservationCommand::Add {
            name,
            date,
            end_date,
            value,
            paid,
        } => {
            let reservation = backend.records.add_reservation(ReservationDraft {
                name,
                date,
                end_date,
                value,
                paid,
            })?;
            writeln!(out, "Reserva {} adicionada para {}.", reservation.id, reservation.name)?;
        }
        ReservationCommand::Edit {
            id,
            name,
            date,
            end_date,
            value,
            paid,
        } => {
            let existing = backend
                .records
                .find_reservation(id)
                .ok_or(DomainError::ReservationNotFound(id))?;

            let mut draft = ReservationDraft::from(existing);
            if let Some(name) = name {
                draft.name = name;
            }
            if let Some(date) = date {
                draft.date = date;
            }
            if let Some(end_date) = end_date {
                draft.end_date = Some(end_date);
            }
            if let Some(value) = value {
                draft.value = value;
            }
            if let Some(paid) = paid {
                draft.paid = paid;
            }

            let updated = backend.records.update_reservation(id, draft)?;
            writeln!(out, "Reserva {} atualizada ({}).", updated.id, updated.name)?;
        }
        ReservationCommand::Delete { id, yes } => {
            let name = match backend.records.find_reservation(id) {
                Some(r) => r.name.clone(),
                None => bail!("reservation {} not found", id),
            };
            if !yes && !confirm(&format!("Excluir a reserva de {}?", name), input, out)? {
                writeln!(out, "Cancelado.")?;
                return Ok(());
            }
            backend.records.delete_reservation(id);
            writeln!(out, "Reserva {} excluída.", id)?;
        }
    }
    Ok(())
}

fn expenses<S, R, W>(command: ExpenseCommand, backend: &mut Backend<S>, input: &mut R, out: &mut W) -> Result<()>
where
    S: KeyValueStorage,
    R: BufRead,
    W: Write,
{
    match command {
        ExpenseCommand::List => {
            let expenses = backend.records.expenses();
            if expenses.is_empty() {
                writeln!(out, "Nenhuma despesa registrada.")?;
                return Ok(());
            }
            let calendar_service = &backend.calendar_service;
            write!(
                out,
                "{}",
                render::render_expenses(expenses, &backend.config.currency_symbol, |d| {
                    calendar_service.format_date_for_display(d)
                })
            )?;
        }
        ExpenseCommand::Add {
            description,
            date,
            value,
            category,
        } => {
            let expense = backend.records.add_expense(ExpenseDraft {
                description,
                date,
                value,
                category,
            })?;
            writeln!(out, "Despesa {} adicionada ({}).", expense.id, expense.category)?;
        }
        ExpenseCommand::Delete { id, yes } => {
            let description = match backend.records.find_expense(id) {
                Some(e) => e.description.clone(),
                None => bail!("expense {} not found", id),
            };
            if !yes && !confirm(&format!("Excluir a despesa \"{}\"?", description), input, out)? {
                writeln!(out, "Cancelado.")?;
                return Ok(());
            }
            backend.records.delete_expense(id);
            writeln!(out, "Despesa {} excluída.", id)?;
        }
    }
    Ok(())
}

fn show_calendar<S: KeyValueStorage, W: Write>(
    backend: &Backend<S>,
    year: Option<i32>,
    month: Option<u32>,
    prev: bool,
    next: bool,
    out: &mut W,
) -> Result<()> {
    let service = &backend.calendar_service;
    let (current_month, current_year) = service.current_month();
    let month = month.unwrap_or(current_month);
    let year = year.unwrap_or(current_year);
    if !(1..=12).contains(&month) {
        return Err(DomainError::InvalidMonth(month).into());
    }

    let (month, year) = if prev {
        service.previous_month(month, year)
    } else if next {
        service.next_month(month, year)
    } else {
        (month, year)
    };

    let reservations = backend.records.reservations();
    let view = service.build_month_view(reservations, year, month)?;

    write!(out, "{}", calendar::render_calendar(&view, service.month_name(month)))?;
    let occupants = calendar::render_occupants(&view, reservations);
    if !occupants.is_empty() {
        writeln!(out)?;
        for line in occupants {
            writeln!(out, "{}", line)?;
        }
    }
    Ok(())
}

fn export_chart<S: KeyValueStorage, W: Write>(backend: &Backend<S>, path: &Path, out: &mut W) -> Result<()> {
    let dashboard = &backend.dashboard_service;
    let series = dashboard.compute_monthly_series(backend.records.reservations(), backend.records.expenses());

    chart::write_svg_chart(&series, dashboard.chart_scale(&series), path)?;
    info!("Wrote chart for {} periods to {:?}", series.len(), path);
    writeln!(out, "Gráfico salvo em {}", path.display())?;
    Ok(())
}

fn export<S: KeyValueStorage, W: Write>(backend: &Backend<S>, dir: Option<&str>, csv: bool, out: &mut W) -> Result<()> {
    let service = &backend.export_service;
    let directory = match dir {
        Some(dir) => service.sanitize_path(dir),
        None => backend
            .config
            .export_directory
            .clone()
            .unwrap_or_else(|| PathBuf::from(".")),
    };

    let records = &backend.records;
    let path = service.export_to_path(records.reservations(), records.expenses(), &directory)?;
    writeln!(out, "Backup salvo em {}", path.display())?;

    if csv {
        for path in service.export_csv(records.reservations(), records.expenses(), &directory)? {
            writeln!(out, "Planilha salva em {}", path.display())?;
        }
    }
    Ok(())
}

fn import<S: KeyValueStorage, W: Write>(backend: &mut Backend<S>, file: &Path, out: &mut W) -> Result<()> {
    let summary = backend.export_service.import_from_path(&mut backend.records, file)?;

    match summary.reservations {
        Some(count) => writeln!(out, "{} reservas importadas.", count)?,
        None => writeln!(out, "Reservas mantidas (ausentes no arquivo).")?,
    }
    match summary.expenses {
        Some(count) => writeln!(out, "{} despesas importadas.", count)?,
        None => writeln!(out, "Despesas mantidas (ausentes no arquivo).")?,
    }
    Ok(())
}

fn theme<S: KeyValueStorage, W: Write>(backend: &mut Backend<S>, action: Option<ThemeAction>, out: &mut W) -> Result<()> {
    let dark = match action {
        None => backend.records.dark_mode(),
        Some(ThemeAction::Toggle) => backend.records.toggle_dark_mode(),
        Some(ThemeAction::Dark) => {
            backend.records.set_dark_mode(true);
            true
        }
        Some(ThemeAction::Light) => {
            backend.records.set_dark_mode(false);
            false
        }
    };
    writeln!(out, "Tema: {}", if dark { "escuro" } else { "claro" })?;
    Ok(())
}

/// Ask a yes/no question; anything but "s"/"sim"/"y"/"yes" declines
fn confirm<R: BufRead, W: Write>(prompt: &str, input: &mut R, out: &mut W) -> Result<bool> {
    write!(out, "{} [s/N] ", prompt)?;
    out.flush()?;

    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim().to_lowercase().as_str(), "s" | "sim" | "y" | "yes"))
}
