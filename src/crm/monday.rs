//! monday.com GraphQL client.

use reqwest::Client;
use serde_json::{json, Map, Value};
use std::time::Duration;

use super::{BoardApi, BoardSchema, CreateItem, CrmFault};

pub const DEFAULT_API_URL: &str = "https://api.monday.com/v2";
const API_VERSION: &str = "2024-01";

const SCHEMA_QUERY: &str = "query ($board: [ID!]) { boards(ids: $board) { columns { id title type } groups { id title } } }";
const CREATE_ITEM: &str = "mutation ($board: ID!, $group: String, $name: String!) { create_item(board_id: $board, group_id: $group, item_name: $name) { id } }";
const CREATE_ITEM_WITH_VALUES: &str = "mutation ($board: ID!, $group: String, $name: String!, $values: JSON) { create_item(board_id: $board, group_id: $group, item_name: $name, column_values: $values) { id } }";
const CREATE_UPDATE: &str =
    "mutation ($item: ID!, $body: String!) { create_update(item_id: $item, body: $body) { id } }";

#[derive(Clone)]
pub struct MondayClient {
    api_url: String,
    token: String,
    client: Client,
    timeout: Duration,
}

impl MondayClient {
    pub fn new(token: String) -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token,
            client: Client::new(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_api_url(mut self, url: impl Into<String>) -> Self {
        self.api_url = url.into();
        self
    }

    pub fn with_timeout(mut self, secs: u64) -> Self {
        self.timeout = Duration::from_secs(secs);
        self
    }

    /// POST one GraphQL document and return its `data` object.
    async fn graphql(&self, query: &str, variables: Value) -> Result<Value, CrmFault> {
        let body = json!({ "query": query, "variables": variables });
        let rsp = self
            .client
            .post(&self.api_url)
            .timeout(self.timeout)
            .header("Authorization", &self.token)
            .header("API-Version", API_VERSION)
            .json(&body)
            .send()
            .await
            .map_err(|e| CrmFault::Transport(e.to_string()))?;

        let status = rsp.status();
        let text = rsp
            .text()
            .await
            .map_err(|e| CrmFault::Transport(e.to_string()))?;
        if !status.is_success() {
            return Err(CrmFault::Rejected(format!("HTTP {status}: {text}")));
        }

        let parsed: Value =
            serde_json::from_str(&text).map_err(|e| CrmFault::MalformedResponse(e.to_string()))?;
        extract_data(parsed)
    }
}

/// Pull `data` out of a GraphQL envelope, turning error fields into faults.
pub(crate) fn extract_data(mut envelope: Value) -> Result<Value, CrmFault> {
    if let Some(errors) = envelope.get("errors").and_then(Value::as_array) {
        if !errors.is_empty() {
            let msgs: Vec<String> = errors
                .iter()
                .map(|e| {
                    e.get("message")
                        .and_then(Value::as_str)
                        .map(str::to_string)
                        .unwrap_or_else(|| e.to_string())
                })
                .collect();
            return Err(CrmFault::Rejected(msgs.join("; ")));
        }
    }
    if let Some(msg) = envelope.get("error_message").and_then(Value::as_str) {
        return Err(CrmFault::Rejected(msg.to_string()));
    }
    match envelope.get_mut("data").map(Value::take) {
        Some(data) if !data.is_null() => Ok(data),
        _ => Err(CrmFault::MalformedResponse("missing data".to_string())),
    }
}

fn id_at(data: &Value, field: &str) -> Result<String, CrmFault> {
    let id = data.get(field).and_then(|v| v.get("id"));
    match id {
        Some(Value::String(s)) => Ok(s.clone()),
        Some(Value::Number(n)) => Ok(n.to_string()),
        _ => Err(CrmFault::MalformedResponse(format!("no {field}.id in response"))),
    }
}

#[async_trait::async_trait]
impl BoardApi for MondayClient {
    async fn fetch_schema(&self, board_id: u64) -> Result<BoardSchema, CrmFault> {
        let data = self
            .graphql(SCHEMA_QUERY, json!({ "board": [board_id.to_string()] }))
            .await?;
        let board = data
            .get("boards")
            .and_then(Value::as_array)
            .and_then(|b| b.first())
            .cloned()
            .ok_or_else(|| CrmFault::Rejected(format!("board {board_id} not found")))?;
        serde_json::from_value(board).map_err(|e| CrmFault::MalformedResponse(e.to_string()))
    }

    async fn create_item(&self, req: &CreateItem) -> Result<String, CrmFault> {
        let mut vars = Map::new();
        vars.insert("board".into(), Value::String(req.board_id.to_string()));
        vars.insert("name".into(), Value::String(req.item_name.clone()));
        if let Some(group) = &req.group_id {
            vars.insert("group".into(), Value::String(group.clone()));
        }
        let query = match &req.column_values {
            Some(values) => {
                vars.insert("values".into(), Value::String(values.clone()));
                CREATE_ITEM_WITH_VALUES
            }
            None => CREATE_ITEM,
        };
        let data = self.graphql(query, Value::Object(vars)).await?;
        id_at(&data, "create_item")
    }

    async fn create_update(&self, item_id: &str, body: &str) -> Result<String, CrmFault> {
        let data = self
            .graphql(CREATE_UPDATE, json!({ "item": item_id, "body": body }))
            .await?;
        id_at(&data, "create_update")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_is_extracted() {
        let env = json!({"data": {"create_item": {"id": "123"}}});
        let data = extract_data(env).unwrap();
        assert_eq!(id_at(&data, "create_item").unwrap(), "123");
    }

    #[test]
    fn graphql_errors_are_rejections() {
        let env = json!({"errors": [{"message": "Column not found"}, {"message": "bad value"}]});
        assert_eq!(
            extract_data(env),
            Err(CrmFault::Rejected("Column not found; bad value".into()))
        );
        let env = json!({"error_message": "Not Authenticated", "status_code": 401});
        assert_eq!(
            extract_data(env),
            Err(CrmFault::Rejected("Not Authenticated".into()))
        );
    }

    #[test]
    fn missing_data_is_malformed() {
        assert!(matches!(
            extract_data(json!({"data": null})),
            Err(CrmFault::MalformedResponse(_))
        ));
        let data = json!({"create_item": {}});
        assert!(matches!(
            id_at(&data, "create_item"),
            Err(CrmFault::MalformedResponse(_))
        ));
    }

    #[test]
    fn numeric_ids_are_stringified() {
        let data = json!({"create_update": {"id": 987}});
        assert_eq!(id_at(&data, "create_update").unwrap(), "987");
    }

    #[test]
    fn builder_overrides_defaults() {
        let c = MondayClient::new("tok".into());
        assert_eq!(c.api_url, DEFAULT_API_URL);
        assert_eq!(c.timeout, Duration::from_secs(30));
        let c = c.with_timeout(5).with_api_url("http://localhost:9/v2");
        assert_eq!(c.timeout, Duration::from_secs(5));
        assert_eq!(c.api_url, "http://localhost:9/v2");
    }
}
