use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// A booked stay at the property.
///
/// Field names follow the backup file layout (`endDate` is camelCase), so
/// documents exported by older versions of the tool load unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reservation {
    /// Creation timestamp in epoch milliseconds, unique within the store
    pub id: u64,
    /// Guest name
    pub name: String,
    /// Check-in date (YYYY-MM-DD)
    pub date: String,
    /// Check-out date (YYYY-MM-DD); absent means a single-day stay
    #[serde(
        rename = "endDate",
        default,
        deserialize_with = "empty_string_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub end_date: Option<String>,
    /// Normalized decimal text, e.g. "350" or "120.5"
    #[serde(deserialize_with = "string_or_number")]
    pub value: String,
    pub paid: bool,
}

/// A dated, categorized outgoing cost.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: u64,
    pub description: String,
    /// Date of the expense (YYYY-MM-DD)
    pub date: String,
    #[serde(deserialize_with = "string_or_number")]
    pub value: String,
    pub category: ExpenseCategory,
}

/// Fixed set of expense categories, serialized with their pt-BR labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExpenseCategory {
    #[serde(rename = "Manutenção")]
    Manutencao,
    #[serde(rename = "Piscina")]
    Piscina,
    #[serde(rename = "Limpeza")]
    Limpeza,
    #[serde(rename = "Jardinagem")]
    Jardinagem,
    #[serde(rename = "Outros")]
    Outros,
}

impl ExpenseCategory {
    pub const ALL: [ExpenseCategory; 5] = [
        ExpenseCategory::Manutencao,
        ExpenseCategory::Piscina,
        ExpenseCategory::Limpeza,
        ExpenseCategory::Jardinagem,
        ExpenseCategory::Outros,
    ];

    /// Display label, identical to the serialized form
    pub fn label(&self) -> &'static str {
        match self {
            ExpenseCategory::Manutencao => "Manutenção",
            ExpenseCategory::Piscina => "Piscina",
            ExpenseCategory::Limpeza => "Limpeza",
            ExpenseCategory::Jardinagem => "Jardinagem",
            ExpenseCategory::Outros => "Outros",
        }
    }
}

impl Default for ExpenseCategory {
    fn default() -> Self {
        ExpenseCategory::Manutencao
    }
}

impl fmt::Display for ExpenseCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExpenseCategory {
    type Err = ExpenseCategoryError;

    /// Case-insensitive; "manutencao" is accepted for keyboards without accents
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        match wanted.as_str() {
            "manutenção" | "manutencao" => Ok(ExpenseCategory::Manutencao),
            "piscina" => Ok(ExpenseCategory::Piscina),
            "limpeza" => Ok(ExpenseCategory::Limpeza),
            "jardinagem" => Ok(ExpenseCategory::Jardinagem),
            "outros" => Ok(ExpenseCategory::Outros),
            _ => Err(ExpenseCategoryError::Unknown(s.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ExpenseCategoryError {
    Unknown(String),
}

impl fmt::Display for ExpenseCategoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExpenseCategoryError::Unknown(value) => write!(
                f,
                "Unknown expense category '{}'. Expected one of: Manutenção, Piscina, Limpeza, Jardinagem, Outros",
                value
            ),
        }
    }
}

impl std::error::Error for ExpenseCategoryError {}

/// Form input for creating or editing a reservation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReservationDraft {
    pub name: String,
    pub date: String,
    pub end_date: Option<String>,
    /// Raw text as typed; normalized on commit
    pub value: String,
    pub paid: bool,
}

impl From<&Reservation> for ReservationDraft {
    fn from(reservation: &Reservation) -> Self {
        Self {
            name: reservation.name.clone(),
            date: reservation.date.clone(),
            end_date: reservation.end_date.clone(),
            value: reservation.value.clone(),
            paid: reservation.paid,
        }
    }
}

/// Form input for creating an expense
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ExpenseDraft {
    pub description: String,
    pub date: String,
    pub value: String,
    pub category: ExpenseCategory,
}

/// Dashboard summary figures
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinancialTotals {
    /// Sum over paid reservations only
    pub total_income: f64,
    pub total_expenses: f64,
    pub total_profit: f64,
    /// Rounded profit margin in percent; 0 when there is no income
    pub margin_pct: i64,
    pub paid_reservations: usize,
    pub expense_count: usize,
}

/// One bucket of the monthly income/expense series
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    /// "MM/YYYY"
    pub period_label: String,
    pub income: f64,
    pub expense: f64,
    pub profit: f64,
}

/// Type of calendar cell for explicit rendering logic
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub enum CalendarDayType {
    /// Empty padding cell before the first day of the month
    PaddingBefore,
    /// Actual day within the month
    MonthDay,
}

/// A single cell of the month view
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarDay {
    /// Day of month; 0 for padding cells
    pub day: u32,
    pub day_type: CalendarDayType,
    pub has_occupancy: bool,
    /// Reservations whose stay covers this day
    pub reservation_ids: Vec<u64>,
}

/// Occupancy view of one calendar month
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CalendarMonth {
    pub month: u32,
    pub year: i32,
    /// Weekday of day 1 (0 = Sunday .. 6 = Saturday); also the padding count
    pub first_day_of_week: u32,
    pub days: Vec<CalendarDay>,
}

impl CalendarMonth {
    /// Iterate the real days of the month, skipping padding
    pub fn month_days(&self) -> impl Iterator<Item = &CalendarDay> {
        self.days
            .iter()
            .filter(|day| day.day_type == CalendarDayType::MonthDay)
    }

    pub fn occupied_days(&self) -> Vec<u32> {
        self.month_days()
            .filter(|day| day.has_occupancy)
            .map(|day| day.day)
            .collect()
    }
}

/// Backup file contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExportDocument {
    pub reservations: Vec<Reservation>,
    pub expenses: Vec<Expense>,
    /// ISO-8601 timestamp of the export
    #[serde(rename = "exportDate")]
    pub export_date: String,
}

/// What an import actually replaced; `None` means the field was ignored
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImportSummary {
    pub reservations: Option<usize>,
    pub expenses: Option<usize>,
}

fn empty_string_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value: Option<String> = Option::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

/// Some older backups stored values as JSON numbers
fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(match Raw::deserialize(deserializer)? {
        Raw::Text(text) => text,
        Raw::Number(number) => number.to_string(),
    })
}
