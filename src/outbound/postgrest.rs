use async_trait::async_trait;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde::Deserialize;
use serde_json::json;
use tracing::debug;

use super::{DataService, ListOptions, QueryError};
use crate::{
    filter::{Operator, PackFilter, QueryDescriptor, Value},
    inventory::{Id, ItemRecord, Movement, NamedRef, NewItem, ResultRow, Status, ITEM_COLUMNS},
};

const APP_USER_AGENT: &str = concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION"),);
const PACK_BY_IDS: &str = "quick_pack_by_ids";
const PACK_BY_FILTERS: &str = "quick_pack_filter";

/// Client for a PostgREST database with an object storage bucket for photos.
pub(crate) struct RestClient {
    client: Client,
    base_url: String,
    api_key: String,
    photo_bucket: String,
}

impl RestClient {
    pub(crate) fn new(base_url: &str, api_key: &str, photo_bucket: &str) -> Result<Self, QueryError> {
        let client = Client::builder().user_agent(APP_USER_AGENT).build()?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            api_key: api_key.to_string(),
            photo_bucket: photo_bucket.to_string(),
        })
    }

    fn request(&self, method: Method, url: String) -> RequestBuilder {
        self.client
            .request(method, url)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
    }

    fn table(&self, method: Method, table: &str) -> RequestBuilder {
        self.request(method, format!("{}/rest/v1/{table}", self.base_url))
    }

    fn rpc(&self, procedure: &str) -> RequestBuilder {
        self.request(
            Method::POST,
            format!("{}/rest/v1/rpc/{procedure}", self.base_url),
        )
    }

    fn public_url(&self, path: &str) -> String {
        format!(
            "{}/storage/v1/object/public/{}/{path}",
            self.base_url, self.photo_bucket
        )
    }

    async fn named(
        &self,
        table: &str,
        parent: Option<(&str, &str)>,
    ) -> Result<Vec<NamedRef>, QueryError> {
        let mut query = vec![
            ("select", "id,name".to_string()),
            ("order", "name".to_string()),
        ];
        if let Some((column, id)) = parent {
            query.push((column, format!("eq.{id}")));
        }
        Ok(send(self.table(Method::GET, table).query(&query))
            .await?
            .json()
            .await?)
    }
}

#[async_trait]
impl DataService for RestClient {
    async fn execute(
        &self,
        descriptor: &QueryDescriptor,
        options: ListOptions,
    ) -> Result<Vec<ItemRecord>, QueryError> {
        let query = list_params(descriptor, options);
        debug!(?query, "listing items");
        Ok(send(self.table(Method::GET, "items").query(&query))
            .await?
            .json()
            .await?)
    }

    async fn item(&self, id: &str) -> Result<Option<ItemRecord>, QueryError> {
        let query = [
            ("select", ITEM_COLUMNS.to_string()),
            ("id", format!("eq.{id}")),
            ("limit", "1".to_string()),
        ];
        let items: Vec<ItemRecord> = send(self.table(Method::GET, "items").query(&query))
            .await?
            .json()
            .await?;
        Ok(items.into_iter().next())
    }

    async fn pack_by_ids(&self, ids: &[Id]) -> Result<Vec<ResultRow>, QueryError> {
        Ok(send(self.rpc(PACK_BY_IDS).json(&json!({ "ids": ids })))
            .await?
            .json()
            .await?)
    }

    async fn pack_by_filters(&self, filter: &PackFilter) -> Result<Vec<ResultRow>, QueryError> {
        Ok(send(self.rpc(PACK_BY_FILTERS).json(filter))
            .await?
            .json()
            .await?)
    }

    async fn set_status(&self, ids: &[Id], status: Status) -> Result<(), QueryError> {
        if ids.is_empty() {
            return Ok(());
        }
        let request = self
            .table(Method::PATCH, "items")
            .query(&[("id", format!("in.{}", in_list(ids)))])
            .header("Prefer", "return=minimal")
            .json(&json!({ "status": status }));
        send(request).await?;
        Ok(())
    }

    async fn record_movements(&self, movements: &[Movement]) -> Result<(), QueryError> {
        if movements.is_empty() {
            return Ok(());
        }
        let request = self
            .table(Method::POST, "movements")
            .header("Prefer", "return=minimal")
            .json(movements);
        send(request).await?;
        Ok(())
    }

    async fn insert_item(&self, item: &NewItem) -> Result<ItemRecord, QueryError> {
        let request = self
            .table(Method::POST, "items")
            .query(&[("select", ITEM_COLUMNS)])
            .header("Prefer", "return=representation")
            .json(item);
        let inserted: Vec<ItemRecord> = send(request).await?.json().await?;
        inserted
            .into_iter()
            .next()
            .ok_or(QueryError::Missing("inserted item"))
    }

    async fn upload_photo(
        &self,
        path: &str,
        content_type: Option<&str>,
        bytes: Vec<u8>,
    ) -> Result<String, QueryError> {
        let url = format!(
            "{}/storage/v1/object/{}/{path}",
            self.base_url, self.photo_bucket
        );
        let request = self
            .request(Method::POST, url)
            .header("x-upsert", "false")
            .header(
                "content-type",
                content_type.unwrap_or("application/octet-stream"),
            )
            .body(bytes);
        send(request).await?;
        Ok(self.public_url(path))
    }

    async fn people(&self) -> Result<Vec<NamedRef>, QueryError> {
        self.named("people", None).await
    }

    async fn places(&self) -> Result<Vec<NamedRef>, QueryError> {
        self.named("places", None).await
    }

    async fn containers(&self, place_id: &str) -> Result<Vec<NamedRef>, QueryError> {
        self.named("containers", Some(("place_id", place_id))).await
    }

    async fn slots(&self, container_id: &str) -> Result<Vec<NamedRef>, QueryError> {
        self.named("slots", Some(("container_id", container_id)))
            .await
    }
}

async fn send(request: RequestBuilder) -> Result<Response, QueryError> {
    let response = request.send().await?;
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(QueryError::Backend {
        status: status.as_u16(),
        message: error_message(&body),
    })
}

/// Extracts the human-readable part of a PostgREST or storage error body.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        message: Option<String>,
        error: Option<String>,
    }

    serde_json::from_str::<ErrorBody>(body)
        .ok()
        .and_then(|parsed| parsed.message.or(parsed.error))
        .unwrap_or_else(|| body.to_string())
}

fn list_params(descriptor: &QueryDescriptor, options: ListOptions) -> Vec<(&'static str, String)> {
    let mut query = vec![("select", ITEM_COLUMNS.to_string())];
    query.extend(filter_params(descriptor));
    if options.order_by_recency_descending {
        query.push(("order", "updated_at.desc".to_string()));
    }
    if let Some(limit) = options.limit {
        query.push(("limit", limit.to_string()));
    }
    query
}

/// One query parameter per predicate, in descriptor order.
fn filter_params(descriptor: &QueryDescriptor) -> Vec<(&'static str, String)> {
    descriptor
        .predicates
        .iter()
        .map(|predicate| {
            let value = match predicate.operator {
                Operator::Equals => format!("eq.{}", plain(&predicate.value)),
                Operator::SubstringCaseInsensitive => {
                    format!("ilike.*{}*", plain(&predicate.value))
                }
                Operator::ContainsAllOf => format!("cs.{}", array_literal(&predicate.value)),
            };
            (predicate.field.as_str(), value)
        })
        .collect()
}

fn plain(value: &Value) -> String {
    match value {
        Value::Text(text) => text.clone(),
        Value::Tags(tags) => tags.join(","),
    }
}

fn quote(element: &str) -> String {
    format!(
        "\"{}\"",
        element.replace('\\', "\\\\").replace('"', "\\\"")
    )
}

/// `{"a","b"}`, the array literal accepted by `cs.`.
fn array_literal(value: &Value) -> String {
    let elements: Vec<String> = match value {
        Value::Text(text) => vec![quote(text)],
        Value::Tags(tags) => tags.iter().map(|tag| quote(tag)).collect(),
    };
    format!("{{{}}}", elements.join(","))
}

/// `("a","b")`, the list accepted by `in.`.
fn in_list(ids: &[Id]) -> String {
    let elements: Vec<String> = ids.iter().map(|id| quote(id)).collect();
    format!("({})", elements.join(","))
}
