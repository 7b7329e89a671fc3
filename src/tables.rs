use crate::api::ApiReply;
use crate::auth::report_request_error;
use crate::cell_editor::EditableTable;
use crate::download::save_download;
use crate::errors::{ClientError, ClientResult, ValidationError};
use crate::modal::{Key, KeyOutcome, Modal};
use crate::models::{NewAnticorpoItem, NewEstoqueItem, NewItem, TableItems, TableKind};
use crate::state::AppState;
use crate::ui::{TableListing, messages};
use std::path::PathBuf;
use tracing::{error, info};

const FOCUSABLE: [&str; 5] = [
    "nome_tabela",
    "tipo_anticorpo",
    "tipo_estoque",
    "criar_tabela",
    "fechar_popup",
];

/// A table whose items have been loaded, with its rows editable in place.
#[derive(Debug, Clone)]
pub struct OpenTable {
    pub name: String,
    pub items: TableItems,
    pub editor: EditableTable,
}

/// Field values of the add-item form. Which ones are used depends on the
/// type of the open table; quantities left blank are sent as zero.
#[derive(Debug, Clone, Default)]
pub struct ItemFields {
    pub item: String,
    pub infos: String,
    pub quantidade: Option<f64>,
    pub codigo: String,
    pub alvo: String,
    pub host: String,
    pub conjugado: String,
    pub marca: String,
    pub aliquotas: Option<f64>,
    pub vials: Option<f64>,
}

impl ItemFields {
    pub fn build(self, kind: TableKind) -> Result<NewItem, ValidationError> {
        match kind {
            TableKind::Estoque => {
                let item = self.item.trim();
                if item.is_empty() {
                    return Err(ValidationError::MissingItemField("item"));
                }
                Ok(NewItem::Estoque(NewEstoqueItem {
                    item: item.to_string(),
                    infos: self.infos.trim().to_string(),
                    quantidade: self.quantidade.unwrap_or(0.0),
                }))
            }
            TableKind::Anticorpo => {
                let codigo = self.codigo.trim();
                if codigo.is_empty() {
                    return Err(ValidationError::MissingItemField("codigo"));
                }
                Ok(NewItem::Anticorpo(NewAnticorpoItem {
                    codigo: codigo.to_string(),
                    alvo: self.alvo.trim().to_string(),
                    host: self.host.trim().to_string(),
                    conjugado: self.conjugado.trim().to_string(),
                    marca: self.marca.trim().to_string(),
                    aliquotas: self.aliquotas.unwrap_or(0.0),
                    vials: self.vials.unwrap_or(0.0),
                }))
            }
        }
    }
}

/// New-table popup, the listing of existing tables and the table currently
/// opened for viewing its items.
pub struct TableManager {
    state: AppState,
    popup: Modal,
    pub name: String,
    pub kind: Option<TableKind>,
    listing: Option<TableListing>,
    opened: Option<OpenTable>,
}

impl TableManager {
    pub fn new(state: AppState) -> Self {
        Self {
            state,
            popup: Modal::new("nova_tabela"),
            name: String::new(),
            kind: None,
            listing: None,
            opened: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.popup.is_open()
    }

    pub fn popup(&self) -> &Modal {
        &self.popup
    }

    /// `None` until the first refresh.
    pub fn listing(&self) -> Option<&TableListing> {
        self.listing.as_ref()
    }

    pub fn opened(&self) -> Option<&OpenTable> {
        self.opened.as_ref()
    }

    pub fn opened_mut(&mut self) -> Option<&mut OpenTable> {
        self.opened.as_mut()
    }

    pub fn open(&mut self) {
        self.popup.open(FOCUSABLE.iter().map(|id| id.to_string()).collect());
    }

    pub fn close(&mut self) {
        self.popup.close();
        self.name.clear();
    }

    pub fn handle_key(&mut self, key: Key) -> KeyOutcome {
        let outcome = self.popup.handle_key(key);
        if outcome == KeyOutcome::CloseRequested {
            self.close();
        }
        outcome
    }

    pub async fn create(&mut self) -> ClientResult<()> {
        let surface = self.state.surface.clone();
        let nome = self.name.trim().to_string();

        let validated = if nome.is_empty() {
            Err(ValidationError::MissingTableName)
        } else {
            self.kind.ok_or(ValidationError::MissingTableType)
        };
        let tipo = match validated {
            Ok(tipo) => tipo,
            Err(err) => {
                surface.alert(&err.to_string());
                return Err(err.into());
            }
        };

        match self.state.api.create_table(&nome, tipo).await {
            Ok(ApiReply::Success(_)) => {
                info!("created {} table {nome}", tipo.as_str());
                surface.alert(messages::TABLE_CREATED);
                self.close();
                self.refresh().await;
                Ok(())
            }
            Ok(ApiReply::Failure { status, message }) => {
                let err = ClientError::application(status, message);
                surface.alert(&err.user_message(messages::TABLE_CREATE_FAILED));
                Err(err)
            }
            Err(err) => {
                report_request_error(surface.as_ref(), &err, messages::TIMEOUT);
                Err(err)
            }
        }
    }

    /// Reloads the listing; the outcome is rendered rather than returned as
    /// an error.
    pub async fn refresh(&mut self) -> &TableListing {
        self.show(TableListing::Loading);

        let listing = match self.state.api.list_tables().await {
            Ok(ApiReply::Success(tables)) if tables.is_empty() => TableListing::Empty,
            Ok(ApiReply::Success(tables)) => {
                TableListing::Tables(tables.into_iter().map(|t| t.table_name).collect())
            }
            Ok(ApiReply::Failure { status, .. }) => {
                error!("table listing failed with status {status}");
                TableListing::Failed(messages::TABLES_FAILED.to_string())
            }
            Err(err) if err.is_timeout() => {
                TableListing::Failed(messages::TABLES_TIMEOUT.to_string())
            }
            Err(err) => {
                error!("table listing failed: {err}");
                TableListing::Failed(messages::TABLES_FAILED.to_string())
            }
        };

        self.show(listing)
    }

    pub async fn delete(&mut self, nome: &str) -> ClientResult<()> {
        let surface = self.state.surface.clone();
        match self.state.api.delete_table(nome).await {
            Ok(ApiReply::Success(_)) => {
                info!("deleted table {nome}");
                surface.alert(messages::TABLE_DELETED);
                self.refresh().await;
                Ok(())
            }
            Ok(ApiReply::Failure { status, message }) => {
                let err = ClientError::application(status, message);
                surface.alert(&err.user_message(messages::TABLE_DELETE_FAILED));
                Err(err)
            }
            Err(err) => {
                report_request_error(surface.as_ref(), &err, messages::TIMEOUT);
                Err(err)
            }
        }
    }

    /// Downloads a table as `<nome>.csv` into the download directory.
    pub async fn export(&self, nome: &str) -> ClientResult<PathBuf> {
        let surface = self.state.surface();
        let reply = match self.state.api.export_table(nome).await {
            Ok(reply) => reply,
            Err(err) => {
                report_request_error(surface, &err, messages::TIMEOUT);
                return Err(err);
            }
        };

        if !reply.status.is_success() {
            let text = reply.text();
            let detail = if text.trim().is_empty() {
                format!("status {}", reply.status.as_u16())
            } else {
                text
            };
            surface.alert(&format!("{}: {detail}", messages::EXPORT_FAILED));
            return Err(ClientError::application(reply.status.as_u16(), Some(detail)));
        }

        save_download(&self.state.download_dir, &format!("{nome}.csv"), &reply.bytes).await
    }

    /// Loads the items of `nome` and makes it the open table.
    pub async fn open_table(&mut self, nome: &str) -> ClientResult<&OpenTable> {
        let surface = self.state.surface.clone();
        let items = match self.state.api.list_items(nome).await {
            Ok(ApiReply::Success(items)) => items,
            Ok(ApiReply::Failure { status, message }) => {
                let err = ClientError::application(status, message);
                surface.alert(&err.user_message(messages::ITEMS_FAILED));
                return Err(err);
            }
            Err(err) => {
                report_request_error(surface.as_ref(), &err, messages::TIMEOUT);
                return Err(err);
            }
        };

        let opened = self.opened.insert(OpenTable {
            name: nome.to_string(),
            editor: EditableTable::new(items.rows()),
            items,
        });
        surface.render_items(&opened.name, opened.items.columns(), opened.editor.rows());
        Ok(&*opened)
    }

    /// Adds an item to the open table as the logged-in user, then reloads it.
    pub async fn add_item(&mut self, fields: ItemFields) -> ClientResult<()> {
        let surface = self.state.surface.clone();
        let usuario = self.state.session.current_user().await;
        let prepared = match (&self.opened, usuario) {
            (None, _) => Err(ValidationError::NoTableOpen),
            (Some(_), None) => Err(ValidationError::NotLoggedIn),
            (Some(opened), Some(usuario)) => fields
                .build(opened.items.kind())
                .map(|item| (opened.name.clone(), usuario, item)),
        };
        let (nome, usuario, item) = match prepared {
            Ok(prepared) => prepared,
            Err(err) => {
                surface.alert(&err.to_string());
                return Err(err.into());
            }
        };

        match self.state.api.insert_item(&nome, &usuario, &item).await {
            Ok(ApiReply::Success(_)) => {
                info!("added {} item to {nome}", item.kind().as_str());
                surface.alert(messages::ITEM_ADDED);
                self.open_table(&nome).await?;
                Ok(())
            }
            Ok(ApiReply::Failure { status, message }) => {
                let err = ClientError::application(status, message);
                surface.alert(&err.user_message(messages::ITEM_ADD_FAILED));
                Err(err)
            }
            Err(err) => {
                report_request_error(surface.as_ref(), &err, messages::TIMEOUT);
                Err(err)
            }
        }
    }

    /// Deletes the item whose id displays as `id` from the open table.
    pub async fn delete_item(&mut self, id: &str) -> ClientResult<()> {
        let surface = self.state.surface.clone();
        let target = match &self.opened {
            None => Err(ValidationError::NoTableOpen),
            Some(opened) => opened
                .items
                .ids()
                .into_iter()
                .find(|item_id| item_id.to_string() == id.trim())
                .map(|item_id| (opened.name.clone(), item_id.clone(), opened.items.kind()))
                .ok_or_else(|| ValidationError::UnknownItem(id.trim().to_string())),
        };
        let (nome, item_id, tipo) = match target {
            Ok(target) => target,
            Err(err) => {
                surface.alert(&err.to_string());
                return Err(err.into());
            }
        };

        match self.state.api.delete_item(&nome, &item_id, tipo).await {
            Ok(ApiReply::Success(_)) => {
                info!("deleted item {item_id} from {nome}");
                surface.alert(messages::ITEM_DELETED);
                self.open_table(&nome).await?;
                Ok(())
            }
            Ok(ApiReply::Failure { status, message }) => {
                let err = ClientError::application(status, message);
                surface.alert(&err.user_message(messages::ITEM_DELETE_FAILED));
                Err(err)
            }
            Err(err) => {
                report_request_error(surface.as_ref(), &err, messages::TIMEOUT);
                Err(err)
            }
        }
    }

    fn show(&mut self, listing: TableListing) -> &TableListing {
        self.state.surface.render_tables(&listing);
        self.listing.insert(listing)
    }
}
