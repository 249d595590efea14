//! In-memory REST backend.
//!
//! Serves `/{collection}` and `/{collection}/{id}` the way json-server
//! does, and lets tests inject failures, latency and connectivity loss.
//!
//! List queries understand:
//!
//! - `q` / `search`: case-insensitive substring over every string field
//! - `sort`: a storefront sort key (`price_asc`, `newest`, ...)
//! - `page` + `limit` (or `_page` + `_limit`): pagination; `_limit` alone truncates
//! - `field_gte`, `field_lte`, `field_ne`: comparisons
//! - `field=value`: equality, repeated keys are OR-ed

use crate::{FetchError, Method, Request, Response, Transport};
use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Map, Value};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;
use storefront_commerce::search::SortOption;

const RESERVED_PARAMS: [&str; 8] = ["q", "search", "sort", "page", "limit", "_page", "_limit", "_sort"];

#[derive(Debug, Clone)]
struct Failure {
    method: Method,
    path: String,
    status: u16,
    remaining: Option<u32>,
}

#[derive(Debug, Default)]
struct MockState {
    collections: BTreeMap<String, Vec<Value>>,
    failures: Vec<Failure>,
    delays: Vec<(Method, String, Duration)>,
    offline: bool,
    log: Vec<(Method, String)>,
    next_id: u64,
}

/// Shared in-memory backend; clones see the same data.
#[derive(Debug, Clone, Default)]
pub struct MockBackend {
    state: Arc<Mutex<MockState>>,
}

impl MockBackend {
    /// Create a backend with empty `products`, `categories`, `cart` and
    /// `favorites` collections.
    pub fn new() -> Self {
        let backend = Self::default();
        {
            let mut state = backend.state.lock();
            for name in ["products", "categories", "cart", "favorites"] {
                state.collections.insert(name.to_string(), Vec::new());
            }
            state.next_id = 1000;
        }
        backend
    }

    /// Append a record to a collection.
    pub fn insert(&self, collection: &str, record: Value) {
        self.state
            .lock()
            .collections
            .entry(collection.to_string())
            .or_default()
            .push(record);
    }

    /// Serialize and append each record.
    pub fn seed<T: serde::Serialize>(&self, collection: &str, records: &[T]) {
        for record in records {
            // Storefront types always serialize to JSON.
            if let Ok(value) = serde_json::to_value(record) {
                self.insert(collection, value);
            }
        }
    }

    /// Current contents of a collection.
    pub fn collection(&self, collection: &str) -> Vec<Value> {
        self.state
            .lock()
            .collections
            .get(collection)
            .cloned()
            .unwrap_or_default()
    }

    /// Answer every `method path` request with `status`.
    pub fn fail(&self, method: Method, path: &str, status: u16) {
        self.push_failure(method, path, status, None);
    }

    /// Answer the next `times` matching requests with `status`.
    pub fn fail_times(&self, method: Method, path: &str, status: u16, times: u32) {
        self.push_failure(method, path, status, Some(times));
    }

    fn push_failure(&self, method: Method, path: &str, status: u16, remaining: Option<u32>) {
        self.state.lock().failures.push(Failure {
            method,
            path: path.to_string(),
            status,
            remaining,
        });
    }

    /// Remove all injected failures.
    pub fn clear_failures(&self) {
        self.state.lock().failures.clear();
    }

    /// Make every request fail before reaching the server.
    pub fn set_offline(&self, offline: bool) {
        self.state.lock().offline = offline;
    }

    /// Hold the next matching request for `delay` before answering.
    pub fn delay_next(&self, method: Method, path: &str, delay: Duration) {
        self.state
            .lock()
            .delays
            .push((method, path.to_string(), delay));
    }

    /// Every request seen so far as `(method, path)`.
    pub fn requests(&self) -> Vec<(Method, String)> {
        self.state.lock().log.clone()
    }

    /// How many `method path` requests were seen.
    pub fn request_count(&self, method: Method, path: &str) -> usize {
        self.state
            .lock()
            .log
            .iter()
            .filter(|(m, p)| *m == method && p == path)
            .count()
    }

    fn take_delay(state: &mut MockState, method: Method, path: &str) -> Option<Duration> {
        let index = state
            .delays
            .iter()
            .position(|(m, p, _)| *m == method && p == path)?;
        Some(state.delays.remove(index).2)
    }

    fn take_failure(state: &mut MockState, method: Method, path: &str) -> Option<u16> {
        let index = state
            .failures
            .iter()
            .position(|f| f.method == method && f.path == path && f.remaining != Some(0))?;
        let failure = &mut state.failures[index];
        if let Some(remaining) = failure.remaining.as_mut() {
            *remaining -= 1;
        }
        Some(failure.status)
    }

    fn handle(&self, request: &Request, path: &str) -> Response {
        let mut state = self.state.lock();
        if let Some(status) = Self::take_failure(&mut state, request.method, path) {
            return Response::json_value(status, &json!({ "message": crate::reason_phrase(status) }));
        }

        let segments: Vec<&str> = path.trim_matches('/').split('/').collect();
        let (name, id) = match segments.as_slice() {
            [name] if !name.is_empty() => (*name, None),
            [name, id] => (*name, Some(*id)),
            _ => return not_found(),
        };

        let next_id = state.next_id;
        let Some(records) = state.collections.get_mut(name) else {
            return not_found();
        };

        match (request.method, id) {
            (Method::Get, None) => Response::json_value(200, &Value::Array(list(records, &request.query))),
            (Method::Get, Some(id)) => match find(records, id) {
                Some(index) => Response::json_value(200, &records[index]),
                None => not_found(),
            },
            (Method::Post, None) => {
                let mut record = match request.json_body::<Value>() {
                    Ok(Some(Value::Object(map))) => map,
                    _ => return Response::json_value(400, &json!({ "message": "Bad Request" })),
                };
                let assigned = !record.contains_key("id");
                if assigned {
                    record.insert("id".to_string(), Value::from(next_id));
                } else if record
                    .get("id")
                    .and_then(id_string)
                    .is_some_and(|id| find(records, &id).is_some())
                {
                    return Response::json_value(500, &json!({ "message": "Insert failed, duplicate id" }));
                }
                let record = Value::Object(record);
                records.push(record.clone());
                if assigned {
                    state.next_id += 1;
                }
                Response::json_value(201, &record)
            }
            (Method::Patch | Method::Put, Some(id)) => {
                let Some(index) = find(records, id) else {
                    return not_found();
                };
                let patch = match request.json_body::<Value>() {
                    Ok(Some(Value::Object(map))) => map,
                    _ => return Response::json_value(400, &json!({ "message": "Bad Request" })),
                };
                let original_id = records[index].get("id").cloned();
                let target = &mut records[index];
                if request.method == Method::Put {
                    *target = Value::Object(Map::new());
                }
                if let Value::Object(fields) = target {
                    fields.extend(patch);
                    if let Some(original_id) = original_id {
                        fields.insert("id".to_string(), original_id);
                    }
                }
                Response::json_value(200, &records[index])
            }
            (Method::Delete, Some(id)) => match find(records, id) {
                Some(index) => {
                    records.remove(index);
                    Response::json_value(200, &json!({}))
                }
                None => not_found(),
            },
            _ => Response::json_value(404, &json!({})),
        }
    }
}

#[async_trait]
impl Transport for MockBackend {
    async fn send(&self, request: Request) -> Result<Response, FetchError> {
        let path = request.path().to_string();
        let (offline, delay) = {
            let mut state = self.state.lock();
            state.log.push((request.method, path.clone()));
            let delay = Self::take_delay(&mut state, request.method, &path);
            (state.offline, delay)
        };

        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        if offline {
            return Err(FetchError::Network("connection refused".to_string()));
        }
        Ok(self.handle(&request, &path))
    }
}

fn not_found() -> Response {
    Response::json_value(404, &json!({}))
}

fn id_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

fn find(records: &[Value], id: &str) -> Option<usize> {
    records
        .iter()
        .position(|r| r.get("id").and_then(id_string).as_deref() == Some(id))
}

fn scalar_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

fn number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.parse().ok(),
        _ => None,
    }
}

fn contains_text(value: &Value, needle: &str) -> bool {
    match value {
        Value::String(s) => s.to_lowercase().contains(needle),
        Value::Array(items) => items.iter().any(|v| contains_text(v, needle)),
        Value::Object(map) => map.values().any(|v| contains_text(v, needle)),
        _ => false,
    }
}

fn list(records: &[Value], query: &[(String, String)]) -> Vec<Value> {
    let value_of = |key: &str| query.iter().find(|(k, _)| k == key).map(|(_, v)| v.as_str());

    let mut equality: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for (key, value) in query {
        let is_operator = key.ends_with("_gte") || key.ends_with("_lte") || key.ends_with("_ne");
        if !RESERVED_PARAMS.contains(&key.as_str()) && !is_operator {
            equality.entry(key.as_str()).or_default().push(value.as_str());
        }
    }

    let needle = value_of("q")
        .or_else(|| value_of("search"))
        .map(str::to_lowercase)
        .filter(|n| !n.is_empty());

    let mut selected: Vec<Value> = records
        .iter()
        .filter(|record| {
            let field = |name: &str| record.get(name);

            let equal = equality.iter().all(|(name, wanted)| {
                field(*name)
                    .and_then(scalar_string)
                    .is_some_and(|actual| wanted.contains(&actual.as_str()))
            });
            let compared = query.iter().all(|(key, value)| {
                let bound: Option<f64> = value.parse().ok();
                if let Some(name) = key.strip_suffix("_gte") {
                    field(name).and_then(number).zip(bound).is_some_and(|(a, b)| a >= b)
                } else if let Some(name) = key.strip_suffix("_lte") {
                    field(name).and_then(number).zip(bound).is_some_and(|(a, b)| a <= b)
                } else if let Some(name) = key.strip_suffix("_ne") {
                    field(name).and_then(scalar_string).as_deref() != Some(value.as_str())
                } else {
                    true
                }
            });
            let matches_text = needle
                .as_deref()
                .map_or(true, |needle| contains_text(record, needle));

            equal && compared && matches_text
        })
        .cloned()
        .collect();

    if let Some(sort) = value_of("sort").map(SortOption::parse) {
        sort_records(&mut selected, sort);
    }

    let limit = value_of("limit")
        .or_else(|| value_of("_limit"))
        .and_then(|l| l.parse::<usize>().ok());
    let page = value_of("page")
        .or_else(|| value_of("_page"))
        .and_then(|p| p.parse::<usize>().ok());

    match (page, limit) {
        (Some(page), Some(limit)) if page >= 1 => selected
            .into_iter()
            .skip((page - 1) * limit)
            .take(limit)
            .collect(),
        (Some(_), Some(_)) => Vec::new(),
        (None, Some(limit)) => selected.into_iter().take(limit).collect(),
        _ => selected,
    }
}

fn sort_records(records: &mut [Value], sort: SortOption) {
    let num = |r: &Value, field: &str| r.get(field).and_then(number).unwrap_or(0.0);
    let text = |r: &Value, field: &str| {
        r.get(field)
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_lowercase()
    };
    match sort {
        SortOption::NameAsc => records.sort_by_key(|r| text(r, "name")),
        SortOption::NameDesc => records.sort_by(|a, b| text(b, "name").cmp(&text(a, "name"))),
        SortOption::PriceAsc => records.sort_by(|a, b| num(a, "price").total_cmp(&num(b, "price"))),
        SortOption::PriceDesc => records.sort_by(|a, b| num(b, "price").total_cmp(&num(a, "price"))),
        SortOption::RatingDesc => {
            records.sort_by(|a, b| num(b, "rating").total_cmp(&num(a, "rating")))
        }
        SortOption::Newest => {
            records.sort_by(|a, b| text(b, "createdAt").cmp(&text(a, "createdAt")))
        }
        SortOption::Unsorted => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::RequestBuilder;

    fn get(path: &str, query: &[(&str, &str)]) -> Request {
        let mut builder = RequestBuilder::new(Method::Get, format!("http://mock{}", path));
        for (k, v) in query {
            builder = builder.query(*k, *v);
        }
        builder.build()
    }

    fn seeded() -> MockBackend {
        let mock = MockBackend::new();
        mock.insert("products", json!({"id": "1", "name": "Lamp", "price": 30, "category": "home", "brand": "Lumo", "stock": 0}));
        mock.insert("products", json!({"id": "2", "name": "Chair", "price": 120, "category": "home", "brand": "Sitz", "stock": 4}));
        mock.insert("products", json!({"id": "3", "name": "Ball", "price": 15, "category": "sports", "brand": "Kick", "stock": 9}));
        mock
    }

    async fn ids(mock: &MockBackend, request: Request) -> Vec<String> {
        let response = mock.send(request).await.unwrap();
        let records: Vec<Value> = response.json().unwrap();
        records
            .iter()
            .filter_map(|r| r.get("id").and_then(id_string))
            .collect()
    }

    #[tokio::test]
    async fn test_equality_and_operators() {
        let mock = seeded();
        assert_eq!(ids(&mock, get("/products", &[("category", "home")])).await, vec!["1", "2"]);
        assert_eq!(
            ids(&mock, get("/products", &[("category", "home"), ("category", "sports")])).await,
            vec!["1", "2", "3"]
        );
        assert_eq!(ids(&mock, get("/products", &[("price_gte", "20"), ("price_lte", "100")])).await, vec!["1"]);
        assert_eq!(ids(&mock, get("/products", &[("id_ne", "2"), ("_limit", "1")])).await, vec!["1"]);
    }

    #[tokio::test]
    async fn test_search_sort_and_page() {
        let mock = seeded();
        assert_eq!(ids(&mock, get("/products", &[("q", "LUMO")])).await, vec!["1"]);
        assert_eq!(
            ids(&mock, get("/products", &[("sort", "price_desc"), ("page", "1"), ("limit", "2")])).await,
            vec!["2", "1"]
        );
        assert!(ids(&mock, get("/products", &[("page", "0"), ("limit", "2")])).await.is_empty());
    }

    #[tokio::test]
    async fn test_crud() {
        let mock = MockBackend::new();
        let post = RequestBuilder::new(Method::Post, "/cart")
            .json(&json!({"productId": "1", "quantity": 2, "price": 10.0}))
            .unwrap()
            .build();
        let created: Value = mock.send(post).await.unwrap().json().unwrap();
        let id = id_string(&created["id"]).unwrap();

        let patch = RequestBuilder::new(Method::Patch, format!("/cart/{}", id))
            .json(&json!({"quantity": 5}))
            .unwrap()
            .build();
        let updated: Value = mock.send(patch).await.unwrap().json().unwrap();
        assert_eq!(updated["quantity"], 5);
        assert_eq!(updated["productId"], "1");

        let delete = RequestBuilder::new(Method::Delete, format!("/cart/{}", id)).build();
        assert_eq!(mock.send(delete.clone()).await.unwrap().status, 200);
        assert_eq!(mock.send(delete).await.unwrap().status, 404);
        assert!(mock.collection("cart").is_empty());
    }

    #[tokio::test]
    async fn test_duplicate_id_is_rejected() {
        let mock = MockBackend::new();
        let post = RequestBuilder::new(Method::Post, "/favorites")
            .json(&json!({"id": "fav_1", "productId": "1"}))
            .unwrap()
            .build();
        assert_eq!(mock.send(post.clone()).await.unwrap().status, 201);
        assert_eq!(mock.send(post).await.unwrap().status, 500);
    }

    #[tokio::test]
    async fn test_fail_times_then_recovers() {
        let mock = seeded();
        mock.fail_times(Method::Get, "/products", 503, 1);
        assert_eq!(mock.send(get("/products", &[])).await.unwrap().status, 503);
        assert_eq!(mock.send(get("/products", &[])).await.unwrap().status, 200);
        assert_eq!(mock.request_count(Method::Get, "/products"), 2);
    }

    #[tokio::test]
    async fn test_offline() {
        let mock = seeded();
        mock.set_offline(true);
        assert!(matches!(
            mock.send(get("/products", &[])).await,
            Err(FetchError::Network(_))
        ));
    }
}
