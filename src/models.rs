use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
pub struct LoginRequest<'a> {
    pub username: &'a str,
    pub senha: &'a str,
}

#[derive(Debug, Serialize)]
pub struct RegisterRequest<'a> {
    pub username: &'a str,
    pub email: &'a str,
    pub senha: &'a str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    Anticorpo,
    Estoque,
}

impl TableKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Anticorpo => "anticorpo",
            Self::Estoque => "estoque",
        }
    }
}

impl std::str::FromStr for TableKind {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "anticorpo" => Ok(Self::Anticorpo),
            "estoque" => Ok(Self::Estoque),
            other => Err(format!("unknown table type '{other}'")),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct CreateTableRequest<'a> {
    pub nome: &'a str,
    pub tipo: TableKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableDescriptor {
    pub table_name: String,
}

#[derive(Debug, Deserialize)]
pub struct TableList {
    pub tabelas: Vec<TableDescriptor>,
}

/// One time-clock entry as sent to `/api/ponto`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PontoRecord {
    pub usuario: String,
    pub data: NaiveDate,
    pub entrada: String,
    pub saida: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ResetPasswordRequest<'a> {
    pub email: &'a str,
    pub nova_senha: &'a str,
    pub key_phrase: &'a str,
}

#[derive(Debug, Deserialize)]
pub struct LoginPayload {
    pub user: String,
}

/// Item ids are text in stock tables and integers in antibody tables.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemId {
    Number(i64),
    Text(String),
}

impl std::fmt::Display for ItemId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number(id) => write!(f, "{id}"),
            Self::Text(id) => f.write_str(id),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstoqueItem {
    pub id: ItemId,
    pub item: String,
    #[serde(default)]
    pub infos: Option<String>,
    pub quantidade: f64,
    pub data_modificacao: String,
    pub nome_usuario: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnticorpoItem {
    pub id: ItemId,
    pub codigo: String,
    pub nome: String,
    pub alvo: String,
    pub host: String,
    pub conjugado: String,
    pub marca: String,
    pub aliquotas: f64,
    pub vials: f64,
    pub data_modificacao: String,
    pub nome_usuario: String,
}

/// Contents of one table, tagged by its `table_type`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "table_type", content = "items", rename_all = "lowercase")]
pub enum TableItems {
    Anticorpo(Vec<AnticorpoItem>),
    Estoque(Vec<EstoqueItem>),
}

impl TableItems {
    pub fn kind(&self) -> TableKind {
        match self {
            Self::Anticorpo(_) => TableKind::Anticorpo,
            Self::Estoque(_) => TableKind::Estoque,
        }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        match self {
            Self::Anticorpo(_) => &[
                "id", "codigo", "nome", "alvo", "host", "conjugado", "marca", "aliquotas",
                "vials", "data_modificacao", "nome_usuario",
            ],
            Self::Estoque(_) => &[
                "id", "item", "infos", "quantidade", "data_modificacao", "nome_usuario",
            ],
        }
    }

    pub fn ids(&self) -> Vec<&ItemId> {
        match self {
            Self::Anticorpo(items) => items.iter().map(|item| &item.id).collect(),
            Self::Estoque(items) => items.iter().map(|item| &item.id).collect(),
        }
    }

    /// One row of display text per item, id first.
    pub fn rows(&self) -> Vec<Vec<String>> {
        match self {
            Self::Anticorpo(items) => items
                .iter()
                .map(|item| {
                    vec![
                        item.id.to_string(),
                        item.codigo.clone(),
                        item.nome.clone(),
                        item.alvo.clone(),
                        item.host.clone(),
                        item.conjugado.clone(),
                        item.marca.clone(),
                        item.aliquotas.to_string(),
                        item.vials.to_string(),
                        item.data_modificacao.clone(),
                        item.nome_usuario.clone(),
                    ]
                })
                .collect(),
            Self::Estoque(items) => items
                .iter()
                .map(|item| {
                    vec![
                        item.id.to_string(),
                        item.item.clone(),
                        item.infos.clone().unwrap_or_default(),
                        item.quantidade.to_string(),
                        item.data_modificacao.clone(),
                        item.nome_usuario.clone(),
                    ]
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewEstoqueItem {
    pub item: String,
    pub infos: String,
    pub quantidade: f64,
}

/// New antibody row. Its name travels in the request's `nome` key, which the
/// server also reads as the table name, so it always equals the table name.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewAnticorpoItem {
    pub codigo: String,
    pub alvo: String,
    pub host: String,
    pub conjugado: String,
    pub marca: String,
    pub aliquotas: f64,
    pub vials: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum NewItem {
    Anticorpo(NewAnticorpoItem),
    Estoque(NewEstoqueItem),
}

impl NewItem {
    pub fn kind(&self) -> TableKind {
        match self {
            Self::Anticorpo(_) => TableKind::Anticorpo,
            Self::Estoque(_) => TableKind::Estoque,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct InsertItemRequest<'a> {
    pub nome: &'a str,
    pub tipo: TableKind,
    pub usuario: &'a str,
    #[serde(flatten)]
    pub item: &'a NewItem,
}

#[derive(Debug, Serialize)]
pub struct DeleteItemRequest<'a> {
    pub nome: &'a str,
    pub item_id: &'a ItemId,
    pub tipo: TableKind,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ponto_record_serializes_missing_departure_as_null() {
        let record = PontoRecord {
            usuario: "alice".into(),
            data: NaiveDate::from_ymd_opt(2026, 1, 5).unwrap(),
            entrada: "08:30".into(),
            saida: None,
        };
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "usuario": "alice",
                "data": "2026-01-05",
                "entrada": "08:30",
                "saida": null
            })
        );
    }

    #[test]
    fn table_items_follow_table_type() {
        let items: TableItems = serde_json::from_value(serde_json::json!({
            "table_type": "estoque",
            "items": [{
                "id": "042137", "item": "Gloves", "infos": null, "quantidade": 3.0,
                "data_modificacao": "2026-01-05 09:00:00", "nome_usuario": "alice"
            }]
        }))
        .unwrap();

        assert_eq!(items.kind(), TableKind::Estoque);
        assert_eq!(items.ids(), vec![&ItemId::Text("042137".into())]);
        assert_eq!(
            items.rows(),
            vec![vec![
                "042137".to_string(),
                "Gloves".into(),
                "".into(),
                "3".into(),
                "2026-01-05 09:00:00".into(),
                "alice".into()
            ]]
        );
        assert_eq!(items.columns().len(), items.rows()[0].len());
    }

    #[test]
    fn antibody_ids_may_be_numbers() {
        let items: TableItems = serde_json::from_value(serde_json::json!({
            "table_type": "anticorpo",
            "items": [{
                "id": 42137, "codigo": "AB-1", "nome": "Abs", "alvo": "CD4", "host": "mouse",
                "conjugado": "FITC", "marca": "Acme", "aliquotas": 2.0, "vials": 1.5,
                "data_modificacao": "2026-01-05 09:00:00", "nome_usuario": "alice"
            }]
        }))
        .unwrap();

        assert_eq!(items.ids(), vec![&ItemId::Number(42137)]);
        assert_eq!(items.rows()[0][0], "42137");
        assert_eq!(items.rows()[0][8], "1.5");
        assert_eq!(items.columns().len(), items.rows()[0].len());
    }

    #[test]
    fn insert_request_flattens_item_fields() {
        let item = NewItem::Estoque(NewEstoqueItem {
            item: "Tips".into(),
            infos: "200ul".into(),
            quantidade: 10.0,
        });
        let request = InsertItemRequest {
            nome: "Plastics",
            tipo: item.kind(),
            usuario: "alice",
            item: &item,
        };
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({
                "nome": "Plastics", "tipo": "estoque", "usuario": "alice",
                "item": "Tips", "infos": "200ul", "quantidade": 10.0
            })
        );
    }

    #[test]
    fn table_kind_parses_radio_values() {
        assert_eq!("Anticorpo".parse::<TableKind>(), Ok(TableKind::Anticorpo));
        assert_eq!("estoque".parse::<TableKind>(), Ok(TableKind::Estoque));
        assert!("freezer".parse::<TableKind>().is_err());
    }
}
