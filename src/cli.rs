use crate::models::TableKind;
use crate::tables::ItemFields;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Command-line client for the NefroBD laboratory inventory and time clock
#[derive(Parser, Debug)]
#[command(
    name = "nefrobd_client",
    version = env!("CARGO_PKG_VERSION"),
    about = "Log in, manage inventory tables and record time clock entries on a NefroBD server",
    long_about = None
)]
pub struct Cli {
    /// Server base URL (overrides NEFRO_BASE_URL / NEFRO_ENV)
    #[arg(global = true, long = "base-url")]
    pub base_url: Option<String>,

    /// Request timeout in milliseconds
    #[arg(global = true, long = "timeout-ms")]
    pub timeout_ms: Option<u64>,

    /// Session file holding the logged-in user
    #[arg(global = true, long = "session")]
    pub session: Option<PathBuf>,

    /// Directory where exported files are written
    #[arg(global = true, long = "download-dir")]
    pub download_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Log in and remember the user
    Login {
        username: String,
        #[arg(long = "password")]
        password: String,
    },

    /// Create a new account
    Register {
        username: String,
        email: String,
        #[arg(long = "password")]
        password: String,
        #[arg(long = "confirm")]
        confirm: String,
    },

    /// Forget the stored user
    Logout,

    /// Print the stored user
    Whoami,

    /// Inventory tables
    Tables {
        #[command(subcommand)]
        action: TableAction,
    },

    /// Time clock entries
    Ponto {
        #[command(subcommand)]
        action: PontoAction,
    },

    /// Reset a password using the security phrase
    ResetPassword {
        #[arg(long = "email")]
        email: String,
        #[arg(long = "new-password")]
        new_password: String,
        #[arg(long = "confirm")]
        confirm: String,
        #[arg(long = "phrase")]
        phrase: String,
    },

    /// Type out a random quote
    Quote,
}

#[derive(Subcommand, Debug)]
pub enum TableAction {
    /// List existing tables
    List,

    /// Create a table
    Create {
        name: String,
        #[arg(long = "kind", help = "Table type: anticorpo or estoque")]
        kind: TableKind,
    },

    /// Delete a table
    Delete { name: String },

    /// Download a table as CSV
    Export { name: String },

    /// Show the items of a table
    Items { name: String },

    /// Add an item to a table as the logged-in user
    AddItem {
        name: String,
        #[command(flatten)]
        fields: ItemArgs,
    },

    /// Delete an item from a table by id
    DeleteItem { name: String, id: String },
}

/// Item fields; stock tables use `--item`, `--infos` and `--quantidade`,
/// antibody tables the rest.
#[derive(Args, Debug, Default)]
pub struct ItemArgs {
    #[arg(long = "item")]
    pub item: Option<String>,
    #[arg(long = "infos")]
    pub infos: Option<String>,
    #[arg(long = "quantidade")]
    pub quantidade: Option<f64>,
    #[arg(long = "codigo")]
    pub codigo: Option<String>,
    #[arg(long = "alvo")]
    pub alvo: Option<String>,
    #[arg(long = "host")]
    pub host: Option<String>,
    #[arg(long = "conjugado")]
    pub conjugado: Option<String>,
    #[arg(long = "marca")]
    pub marca: Option<String>,
    #[arg(long = "aliquotas")]
    pub aliquotas: Option<f64>,
    #[arg(long = "vials")]
    pub vials: Option<f64>,
}

impl From<ItemArgs> for ItemFields {
    fn from(args: ItemArgs) -> Self {
        Self {
            item: args.item.unwrap_or_default(),
            infos: args.infos.unwrap_or_default(),
            quantidade: args.quantidade,
            codigo: args.codigo.unwrap_or_default(),
            alvo: args.alvo.unwrap_or_default(),
            host: args.host.unwrap_or_default(),
            conjugado: args.conjugado.unwrap_or_default(),
            marca: args.marca.unwrap_or_default(),
            aliquotas: args.aliquotas,
            vials: args.vials,
        }
    }
}

#[derive(Subcommand, Debug)]
pub enum PontoAction {
    /// Record an entry (date defaults to today)
    Register {
        #[arg(long = "date", help = "YYYY-MM-DD, not after today")]
        date: Option<String>,
        #[arg(long = "arrival", help = "HH:MM")]
        arrival: String,
        #[arg(long = "departure", help = "HH:MM")]
        departure: Option<String>,
    },

    /// Download the logged-in user's entries as CSV
    Export,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_ponto_register_with_global_flags() {
        let cli = Cli::try_parse_from([
            "nefrobd_client",
            "ponto",
            "register",
            "--arrival",
            "08:00",
            "--base-url",
            "http://127.0.0.1:5500",
        ])
        .unwrap();

        assert_eq!(cli.base_url.as_deref(), Some("http://127.0.0.1:5500"));
        match cli.command {
            Commands::Ponto {
                action: PontoAction::Register { date, arrival, departure },
            } => {
                assert_eq!(date, None);
                assert_eq!(arrival, "08:00");
                assert_eq!(departure, None);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn table_kind_is_validated() {
        assert!(Cli::try_parse_from(["nefrobd_client", "tables", "create", "x", "--kind", "freezer"]).is_err());
        let cli =
            Cli::try_parse_from(["nefrobd_client", "tables", "create", "x", "--kind", "estoque"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Tables {
                action: TableAction::Create { kind: TableKind::Estoque, .. }
            }
        ));
    }

    #[test]
    fn add_item_collects_stock_fields() {
        let cli = Cli::try_parse_from([
            "nefrobd_client",
            "tables",
            "add-item",
            "Plastics",
            "--item",
            "Tips",
            "--quantidade",
            "12.5",
        ])
        .unwrap();

        let Commands::Tables {
            action: TableAction::AddItem { name, fields },
        } = cli.command
        else {
            panic!("unexpected command");
        };
        assert_eq!(name, "Plastics");
        let fields = ItemFields::from(fields);
        assert_eq!(fields.item, "Tips");
        assert_eq!(fields.quantidade, Some(12.5));
        assert_eq!(fields.codigo, "");
    }
}
