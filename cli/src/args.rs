use clap::{Parser, Subcommand, ValueEnum};
use shared::ExpenseCategory;
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "sitio", version, about = "Controle financeiro do Sítio do Toninho")]
pub struct Cli {
    /// Diretório de dados (padrão: $SITIO_DATA_DIR ou o diretório de dados do sistema)
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum Command {
    /// Resumo financeiro, gráfico mensal e próximas reservas
    Dashboard,

    /// Reservas
    #[command(subcommand)]
    Reservations(ReservationCommand),

    /// Despesas
    #[command(subcommand)]
    Expenses(ExpenseCommand),

    /// Calendário de ocupação do mês
    Calendar {
        #[arg(long)]
        year: Option<i32>,
        /// Mês (1-12)
        #[arg(long)]
        month: Option<u32>,
        /// Mostra o mês anterior ao escolhido
        #[arg(long, conflicts_with = "next")]
        prev: bool,
        /// Mostra o mês seguinte ao escolhido
        #[arg(long)]
        next: bool,
    },

    /// Gera o gráfico mensal em SVG
    Chart {
        #[arg(long)]
        out: PathBuf,
    },

    /// Exporta um backup JSON
    Export {
        /// Diretório de destino (padrão: export_directory do config.yaml ou o diretório atual)
        #[arg(long)]
        dir: Option<String>,
        /// Também exporta planilhas CSV
        #[arg(long)]
        csv: bool,
    },

    /// Importa um backup JSON, substituindo os dados atuais
    Import { file: PathBuf },

    /// Mostra ou altera o tema
    Theme {
        #[arg(value_enum)]
        action: Option<ThemeAction>,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ReservationCommand {
    List {
        /// Filtra pelo nome do mês, ex. "jun"
        #[arg(long)]
        month: Option<String>,
    },
    Add {
        #[arg(long)]
        name: String,
        /// Entrada (AAAA-MM-DD)
        #[arg(long)]
        date: String,
        /// Saída (AAAA-MM-DD)
        #[arg(long)]
        end_date: Option<String>,
        #[arg(long)]
        value: String,
        #[arg(long)]
        paid: bool,
    },
    Edit {
        id: u64,
        #[arg(long)]
        name: Option<String>,
        #[arg(long)]
        date: Option<String>,
        /// Vazio remove a data de saída
        #[arg(long)]
        end_date: Option<String>,
        #[arg(long)]
        value: Option<String>,
        #[arg(long)]
        paid: Option<bool>,
    },
    Delete {
        id: u64,
        /// Não pede confirmação
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Subcommand, Debug, PartialEq)]
pub enum ExpenseCommand {
    List,
    Add {
        #[arg(long)]
        description: String,
        #[arg(long)]
        date: String,
        #[arg(long)]
        value: String,
        /// Manutenção, Piscina, Limpeza, Jardinagem ou Outros
        #[arg(long, default_value_t = ExpenseCategory::Manutencao)]
        category: ExpenseCategory,
    },
    Delete {
        id: u64,
        #[arg(long, short)]
        yes: bool,
    },
}

#[derive(Copy, Clone, Debug, PartialEq, ValueEnum)]
pub enum ThemeAction {
    Toggle,
    Dark,
    Light,
}
