#![allow(dead_code)]

use serde_json::{Map, Value, json};
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use wiremock::matchers::path_regex;
use wiremock::{Mock, MockServer, Request, Respond, ResponseTemplate};

const PREFIX: &str = "/provider/automation/";

#[derive(Default)]
struct Store {
    next_id: u64,
    collections: BTreeMap<String, BTreeMap<u64, Value>>,
}

impl Store {
    fn insert(&mut self, collection: &str, mut entity: Value) -> Value {
        self.next_id += 1;
        let id = self.next_id;
        entity["id"] = json!(id);
        self.collections
            .entry(collection.to_string())
            .or_default()
            .insert(id, entity.clone());
        entity
    }

    fn collection(&mut self, collection: &str) -> &mut BTreeMap<u64, Value> {
        self.collections.entry(collection.to_string()).or_default()
    }
}

/// In-memory Instellar automation API
#[derive(Clone, Default)]
pub struct FakeInstellar {
    store: Arc<Mutex<Store>>,
}

impl FakeInstellar {
    pub async fn start() -> (MockServer, FakeInstellar) {
        let server = MockServer::start().await;
        let fake = FakeInstellar::default();
        Mock::given(path_regex(r"^/provider/automation/"))
            .respond_with(fake.clone())
            .mount(&server)
            .await;
        (server, fake)
    }

    /// Number of live entities in a collection
    pub fn count(&self, collection: &str) -> usize {
        let mut store = self.store.lock().unwrap();
        store.collection(collection).len()
    }

    pub fn entity(&self, collection: &str, id: u64) -> Option<Value> {
        let mut store = self.store.lock().unwrap();
        store.collection(collection).get(&id).cloned()
    }

    fn handle(&self, method: &str, segments: &[&str], body: &Value) -> Option<Value> {
        let mut store = self.store.lock().unwrap();

        match (method, segments) {
            ("POST", ["clusters"]) => {
                let p = &body["cluster"];
                Some(store.insert(
                    "clusters",
                    json!({
                        "name": p["name"],
                        "slug": p["name"],
                        "provider": p["provider"],
                        "region": p["region"],
                        "endpoint": p["credential_endpoint"],
                        "current_state": "connecting"
                    }),
                ))
            }
            ("POST", ["components"]) => {
                let p = &body["component"];
                let c = &p["credential"];
                Some(store.insert(
                    "components",
                    json!({
                        "slug": p["name"],
                        "current_state": "active",
                        "provider": p["provider"],
                        "driver": p["driver"],
                        "version": p["version"],
                        "cluster_ids": p["cluster_ids"],
                        "channels": p["channels"],
                        "credential": {
                            "username": c["username"],
                            "resource": c["resource"],
                            "host": c["host"],
                            "port": c["port"],
                            "secure": c["secure"]
                        }
                    }),
                ))
            }
            ("POST", ["storages"]) => {
                let p = &body["storage"];
                Some(store.insert(
                    "storages",
                    json!({
                        "current_state": "active",
                        "host": p["host"],
                        "bucket": p["bucket"],
                        "region": p["region"],
                        "credential_access_key_id": p["credential_access_key_id"]
                    }),
                ))
            }
            ("POST", ["clusters", cluster_id, "nodes"]) => {
                let cluster_id = parent(&mut store, cluster_id)?;
                let p = &body["node"];
                Some(store.insert(
                    "nodes",
                    json!({
                        "slug": p["slug"],
                        "cluster_id": cluster_id,
                        "public_ip": p["public_ip"],
                        "current_state": "created"
                    }),
                ))
            }
            ("POST", ["clusters", cluster_id, "balancers"]) => {
                let cluster_id = parent(&mut store, cluster_id)?;
                let p = &body["balancer"];
                Some(store.insert(
                    "balancers",
                    json!({
                        "name": p["name"],
                        "address": p["address"],
                        "cluster_id": cluster_id,
                        "current_state": "active"
                    }),
                ))
            }
            ("POST", ["clusters", cluster_id, "uplinks"]) => {
                let cluster_id = parent(&mut store, cluster_id)?;
                let nodes: Vec<Value> = store
                    .collection("nodes")
                    .values()
                    .filter(|node| node["cluster_id"] == json!(cluster_id))
                    .map(|node| node["slug"].clone())
                    .collect();
                let p = &body["uplink"];
                Some(store.insert(
                    "uplinks",
                    json!({
                        "channel_slug": p["channel_slug"],
                        "kit_slug": p["kit_slug"],
                        "cluster_id": cluster_id,
                        "installation_id": 1000 + cluster_id,
                        "current_state": "pending",
                        "nodes": nodes
                    }),
                ))
            }
            ("PATCH", ["clusters", cluster_id, "nodes", slug]) => {
                let cluster_id: u64 = cluster_id.parse().ok()?;
                let node = store.collection("nodes").values_mut().find(|node| {
                    node["cluster_id"] == json!(cluster_id) && node["slug"] == json!(slug)
                })?;
                node["public_ip"] = body["node"]["public_ip"].clone();
                node["current_state"] = json!("syncing");
                Some(node.clone())
            }
            ("GET", [collection, id]) => {
                let id: u64 = id.parse().ok()?;
                store.collection(collection).get(&id).cloned()
            }
            ("PATCH", [collection, id]) => {
                let id: u64 = id.parse().ok()?;
                let key = singular(collection)?;
                let entity = store.collection(collection).get_mut(&id)?;
                if let Some(params) = body[key].as_object() {
                    patch(entity, params);
                }
                Some(entity.clone())
            }
            ("DELETE", [collection, id]) => {
                let id: u64 = id.parse().ok()?;
                store.collection(collection).remove(&id).map(|_| Value::Null)
            }
            _ => None,
        }
    }
}

fn parent(store: &mut Store, cluster_id: &str) -> Option<u64> {
    let cluster_id: u64 = cluster_id.parse().ok()?;
    store
        .collection("clusters")
        .contains_key(&cluster_id)
        .then_some(cluster_id)
}

fn singular(collection: &str) -> Option<&'static str> {
    match collection {
        "clusters" => Some("cluster"),
        "components" => Some("component"),
        "balancers" => Some("balancer"),
        "storages" => Some("storage"),
        "uplinks" => Some("uplink"),
        _ => None,
    }
}

fn patch(entity: &mut Value, params: &Map<String, Value>) {
    for (key, value) in params {
        match key.as_str() {
            "credential_endpoint" => entity["endpoint"] = value.clone(),
            "credential_secret_access_key" => {}
            _ => entity[key.as_str()] = value.clone(),
        }
    }
}

impl Respond for FakeInstellar {
    fn respond(&self, request: &Request) -> ResponseTemplate {
        let authorized = request
            .headers
            .get("authorization")
            .and_then(|value| value.to_str().ok())
            .is_some_and(|value| value.starts_with("Bearer ") && value.len() > 7);
        if !authorized {
            return ResponseTemplate::new(401).set_body_json(json!({ "errors": "unauthorized" }));
        }

        let path = request.url.path().strip_prefix(PREFIX).unwrap_or_default();
        let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        let body: Value = serde_json::from_slice(&request.body).unwrap_or(Value::Null);
        let method = request.method.as_str();

        match self.handle(method, &segments, &body) {
            Some(Value::Null) => ResponseTemplate::new(204),
            Some(entity) => {
                let status = if method == "POST" { 201 } else { 200 };
                ResponseTemplate::new(status)
                    .set_body_json(json!({ "data": { "attributes": entity } }))
            }
            None => ResponseTemplate::new(404).set_body_json(json!({ "errors": "not found" })),
        }
    }
}
