//! Typed endpoints of the NefroBD API.
//!
//! Every JSON reply is decoded explicitly into [`ApiReply`]: a call only
//! counts as successful when the transport status is 2xx *and* the body
//! carries `"status": "success"`. Bodies that are not JSON objects, or that
//! claim success without the payload the endpoint promises, are rejected as
//! [`ClientError::InvalidResponse`].

use crate::client::{JsonReply, RawReply, RequestClient};
use crate::errors::{ClientError, ClientResult};
use crate::models::{
    CreateTableRequest, DeleteItemRequest, InsertItemRequest, ItemId, LoginPayload, LoginRequest,
    NewItem, PontoRecord, RegisterRequest, ResetPasswordRequest, TableDescriptor, TableItems,
    TableKind, TableList,
};
use reqwest::Method;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Clone, PartialEq)]
pub enum ApiReply<T> {
    Success(T),
    Failure { status: u16, message: Option<String> },
}

impl<T> ApiReply<T> {
    pub fn into_result(self) -> ClientResult<T> {
        match self {
            Self::Success(payload) => Ok(payload),
            Self::Failure { status, message } => Err(ClientError::application(status, message)),
        }
    }
}

/// Decodes a `{status, message, ...}` envelope, deserializing the success
/// payload from the same object.
pub fn decode_status<T: DeserializeOwned>(reply: JsonReply) -> ClientResult<ApiReply<T>> {
    let status = reply.status.as_u16();
    let Value::Object(map) = &reply.body else {
        return Err(ClientError::InvalidResponse(format!(
            "expected a JSON object, got {}",
            reply.body
        )));
    };

    let app_status = map.get("status").and_then(Value::as_str);
    if !reply.status.is_success() || app_status != Some("success") {
        let message = map
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
        return Ok(ApiReply::Failure { status, message });
    }

    serde_json::from_value(reply.body)
        .map(ApiReply::Success)
        .map_err(|err| ClientError::InvalidResponse(err.to_string()))
}

/// Decodes a body that carries no `status` field on success; a non-2xx
/// transport status is the only failure signal.
pub fn decode_payload<T: DeserializeOwned>(reply: JsonReply) -> ClientResult<ApiReply<T>> {
    if !reply.status.is_success() {
        let message = reply
            .body
            .get("message")
            .and_then(Value::as_str)
            .map(str::to_string);
        return Ok(ApiReply::Failure {
            status: reply.status.as_u16(),
            message,
        });
    }

    serde_json::from_value(reply.body)
        .map(ApiReply::Success)
        .map_err(|err| ClientError::InvalidResponse(err.to_string()))
}

/// Decodes the table listing.
pub fn decode_listing(reply: JsonReply) -> ClientResult<ApiReply<Vec<TableDescriptor>>> {
    Ok(match decode_payload::<TableList>(reply)? {
        ApiReply::Success(list) => ApiReply::Success(list.tabelas),
        ApiReply::Failure { status, message } => ApiReply::Failure { status, message },
    })
}

/// Success payload for endpoints that return nothing beyond the status.
#[derive(Debug, Clone, PartialEq, serde::Deserialize)]
pub struct Ack {}

#[derive(Debug, Clone)]
pub struct ApiClient {
    requests: RequestClient,
}

impl ApiClient {
    pub fn new(requests: RequestClient) -> Self {
        Self { requests }
    }

    pub async fn login(&self, username: &str, senha: &str) -> ClientResult<ApiReply<String>> {
        let body = LoginRequest { username, senha };
        let reply = self
            .requests
            .request(Method::POST, "/api/login", Some(&body))
            .await?;
        Ok(match decode_status::<LoginPayload>(reply)? {
            ApiReply::Success(payload) => ApiReply::Success(payload.user),
            ApiReply::Failure { status, message } => ApiReply::Failure { status, message },
        })
    }

    pub async fn register(&self, username: &str, email: &str, senha: &str) -> ClientResult<ApiReply<Ack>> {
        let body = RegisterRequest {
            username,
            email,
            senha,
        };
        let reply = self
            .requests
            .request(Method::POST, "/api/register", Some(&body))
            .await?;
        decode_status(reply)
    }

    pub async fn create_table(&self, nome: &str, tipo: TableKind) -> ClientResult<ApiReply<Ack>> {
        let body = CreateTableRequest { nome, tipo };
        let reply = self
            .requests
            .request(Method::POST, "/api/criar_tabela", Some(&body))
            .await?;
        decode_status(reply)
    }

    pub async fn list_tables(&self) -> ClientResult<ApiReply<Vec<TableDescriptor>>> {
        let reply = self
            .requests
            .request::<()>(Method::GET, "/api/categorias", None)
            .await?;
        decode_listing(reply)
    }

    pub async fn delete_table(&self, nome: &str) -> ClientResult<ApiReply<Ack>> {
        let reply = self
            .requests
            .request::<()>(Method::DELETE, &table_path(nome), None)
            .await?;
        decode_status(reply)
    }

    pub async fn export_table(&self, nome: &str) -> ClientResult<RawReply> {
        self.requests
            .download("/api/tabela/export", &[("nome", nome)])
            .await
    }

    pub async fn list_items(&self, nome: &str) -> ClientResult<ApiReply<TableItems>> {
        let path = format!("/api/tabela?nome={}", urlencoding::encode(nome));
        let reply = self
            .requests
            .request::<()>(Method::GET, &path, None)
            .await?;
        decode_payload(reply)
    }

    pub async fn insert_item(
        &self,
        nome: &str,
        usuario: &str,
        item: &NewItem,
    ) -> ClientResult<ApiReply<Ack>> {
        let body = InsertItemRequest {
            nome,
            tipo: item.kind(),
            usuario,
            item,
        };
        let reply = self
            .requests
            .request(Method::POST, "/api/tabela", Some(&body))
            .await?;
        decode_status(reply)
    }

    pub async fn delete_item(
        &self,
        nome: &str,
        item_id: &ItemId,
        tipo: TableKind,
    ) -> ClientResult<ApiReply<Ack>> {
        let body = DeleteItemRequest {
            nome,
            item_id,
            tipo,
        };
        let reply = self
            .requests
            .request(Method::DELETE, "/api/tabela/item", Some(&body))
            .await?;
        decode_status(reply)
    }

    pub async fn submit_ponto(&self, record: &PontoRecord) -> ClientResult<ApiReply<Ack>> {
        let reply = self
            .requests
            .request(Method::POST, "/api/ponto", Some(record))
            .await?;
        decode_status(reply)
    }

    pub async fn export_ponto(&self, usuario: &str) -> ClientResult<RawReply> {
        self.requests
            .download("/api/exportar_ponto", &[("usuario", usuario)])
            .await
    }

    pub async fn reset_password(
        &self,
        email: &str,
        nova_senha: &str,
        key_phrase: &str,
    ) -> ClientResult<ApiReply<Ack>> {
        let body = ResetPasswordRequest {
            email,
            nova_senha,
            key_phrase,
        };
        let reply = self
            .requests
            .request(Method::POST, "/api/reset_password", Some(&body))
            .await?;
        decode_status(reply)
    }
}

fn table_path(nome: &str) -> String {
    format!("/api/tabelas/{}", urlencoding::encode(nome))
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;
    use serde_json::json;

    fn reply(status: u16, body: Value) -> JsonReply {
        JsonReply {
            status: StatusCode::from_u16(status).unwrap(),
            body,
        }
    }

    #[test]
    fn ok_transport_with_failed_status_is_a_failure() {
        let decoded: ApiReply<Ack> =
            decode_status(reply(200, json!({"status": "fail", "message": "nope"}))).unwrap();
        assert_eq!(
            decoded,
            ApiReply::Failure {
                status: 200,
                message: Some("nope".into())
            }
        );
    }

    #[test]
    fn error_transport_with_success_status_is_a_failure() {
        let decoded: ApiReply<Ack> = decode_status(reply(500, json!({"status": "success"}))).unwrap();
        assert!(matches!(decoded, ApiReply::Failure { status: 500, message: None }));
    }

    #[test]
    fn success_without_promised_payload_is_invalid() {
        let err = decode_status::<LoginPayload>(reply(200, json!({"status": "success"}))).unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }

    #[test]
    fn non_object_body_is_invalid() {
        let err = decode_status::<Ack>(reply(200, json!(["success"]))).unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }

    #[test]
    fn listing_without_tables_key_is_invalid() {
        let err = decode_listing(reply(200, json!({}))).unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));

        let ok = decode_listing(reply(200, json!({"tabelas": [{"table_name": "freezer"}]}))).unwrap();
        assert_eq!(
            ok,
            ApiReply::Success(vec![TableDescriptor {
                table_name: "freezer".into()
            }])
        );
    }

    #[test]
    fn missing_table_items_report_server_message() {
        let decoded = decode_payload::<TableItems>(reply(
            404,
            json!({"status": "error", "message": "Table not found."}),
        ))
        .unwrap();
        assert_eq!(
            decoded,
            ApiReply::Failure {
                status: 404,
                message: Some("Table not found.".into())
            }
        );

        let err = decode_payload::<TableItems>(reply(200, json!({"items": []}))).unwrap_err();
        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }

    #[test]
    fn table_path_is_percent_encoded() {
        assert_eq!(table_path("anti corpo/1"), "/api/tabelas/anti%20corpo%2F1");
        assert_eq!(table_path("Café"), "/api/tabelas/Caf%C3%A9");
    }
}
