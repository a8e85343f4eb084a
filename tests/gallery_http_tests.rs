use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Method, Request, StatusCode, header},
};
use gallery_catalog::{
    BatchRouter, ClusterSnapshot, ClusterState, GalleryId, InProcessForwarder, ServerAddress,
    gallery::{
        GalleryRepository, GalleryState, InMemoryGalleryRepository, build_router,
        ensure_local_gallery,
    },
};
use serde_json::{Value, json};
use tower::ServiceExt;

struct TestCluster {
    forwarder: InProcessForwarder,
    servers: BTreeMap<GalleryId, ServerAddress>,
    nodes: BTreeMap<GalleryId, Router>,
}

impl TestCluster {
    fn node(&self, id: GalleryId) -> &Router {
        &self.nodes[&id]
    }
}

/// Three gallery servers wired together in-process, gallery `n` on server `n`.
async fn cluster(leader_id: GalleryId) -> TestCluster {
    let forwarder = InProcessForwarder::new();
    let servers = (1..=3)
        .map(|id| {
            let address = ServerAddress::parse(&format!("http://gallery-{id}.test:8080"))
                .expect("address should parse");
            (id, address)
        })
        .collect::<BTreeMap<_, _>>();

    let mut nodes = BTreeMap::new();
    for id in 1..=3 {
        let repo: Arc<dyn GalleryRepository> = Arc::new(InMemoryGalleryRepository::new());
        ensure_local_gallery(repo.as_ref(), id, &format!("gallery-{id}"))
            .await
            .expect("local gallery should initialize");

        let snapshot = ClusterSnapshot::new(id, leader_id, servers.clone())
            .expect("snapshot should be valid");
        let state = GalleryState::new(
            Arc::new(ClusterState::new(snapshot)),
            BatchRouter::new(Arc::new(forwarder.clone())),
            repo,
        );
        let router = build_router(state);
        forwarder
            .register_peer(&servers[&id], router.clone())
            .await
            .expect("peer should register");
        nodes.insert(id, router);
    }

    TestCluster {
        forwarder,
        servers,
        nodes,
    }
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    payload: Option<Value>,
) -> (StatusCode, Option<String>, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match payload {
        Some(payload) => builder
            .header("content-type", "application/json")
            .body(Body::from(payload.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("response expected");
    let status = response.status();
    let location = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
        .map(str::to_string);
    let body = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("response body should be readable");

    if body.is_empty() {
        return (status, location, Value::Null);
    }

    let json = serde_json::from_slice::<Value>(&body).expect("body should be valid JSON");
    (status, location, json)
}

fn art(name: &str, creator: &str) -> Value {
    json!({ "name": name, "creator": creator })
}

#[tokio::test]
async fn healthcheck_answers_ok() {
    let cluster = cluster(1).await;
    let (status, _, body) = send(cluster.node(1), Method::GET, "/health", None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["message"], "ok");
}

#[tokio::test]
async fn leader_write_batch_lands_on_every_gallery() {
    let cluster = cluster(1).await;

    let (status, _, body) = send(
        cluster.node(1),
        Method::POST,
        "/galleries/batch/arts",
        Some(json!([
            { "id": 1, "artList": [art("Sunflowers", "Van Gogh")] },
            { "id": 2, "artList": [art("Guernica", "Picasso")] },
            { "id": 3, "artList": [art("The Kiss", "Klimt")] },
        ])),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let entries = body.as_array().expect("batch body should be an array");
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0]["id"], 1);
    assert_eq!(entries[1]["id"], 2);
    assert_eq!(entries[1]["artList"][0]["name"], "Guernica");
    assert_eq!(entries[2]["artList"][0]["creator"], "Klimt");

    let (status, _, stored) = send(cluster.node(2), Method::GET, "/galleries/2/arts", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(stored.as_array().map(Vec::len), Some(1));
    assert_eq!(stored[0]["name"], "Guernica");
}

#[tokio::test]
async fn follower_write_batch_redirects_to_leader_untouched() {
    let cluster = cluster(1).await;

    let (status, location, _) = send(
        cluster.node(2),
        Method::POST,
        "/galleries/batch/arts",
        Some(json!([{ "id": 2, "artList": [art("Guernica", "Picasso")] }])),
    )
    .await;

    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(
        location.as_deref(),
        Some("http://gallery-1.test:8080/galleries/batch/arts")
    );

    let (_, _, stored) = send(cluster.node(2), Method::GET, "/galleries/2/arts", None).await;
    assert_eq!(stored, json!([]));
}

#[tokio::test]
async fn replace_batch_overwrites_art_lists() {
    let cluster = cluster(1).await;
    let batch = "/galleries/batch/arts";

    send(
        cluster.node(1),
        Method::POST,
        batch,
        Some(json!([{ "id": 3, "artList": [art("a", "x"), art("b", "x")] }])),
    )
    .await;
    let (status, _, body) = send(
        cluster.node(1),
        Method::PUT,
        batch,
        Some(json!([{ "id": 3, "artList": [art("c", "y")] }])),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["artList"].as_array().map(Vec::len), Some(1));
    assert_eq!(body[0]["artList"][0]["name"], "c");
}

#[tokio::test]
async fn read_batch_aggregates_local_and_peer_galleries() {
    let cluster = cluster(1).await;

    let (status, _, body) = send(
        cluster.node(2),
        Method::GET,
        "/galleries/batch?ids=3,2,9,1",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    let ids = body
        .as_array()
        .expect("batch body should be an array")
        .iter()
        .map(|gallery| gallery["id"].as_i64().expect("gallery should have id"))
        .collect::<Vec<_>>();
    assert_eq!(ids, vec![3, 2, 1]);
    assert_eq!(body[0]["name"], "gallery-3");
}

#[tokio::test]
async fn read_arts_batch_returns_each_art_list() {
    let cluster = cluster(1).await;
    send(
        cluster.node(3),
        Method::POST,
        "/galleries/3/arts",
        Some(json!([art("Nighthawks", "Hopper")])),
    )
    .await;

    let (status, _, body) = send(
        cluster.node(1),
        Method::GET,
        "/galleries/batch/arts?ids=1,3",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0], json!([]));
    assert_eq!(body[1][0]["name"], "Nighthawks");
}

#[tokio::test]
async fn unreachable_peer_yields_placeholder_entry() {
    let cluster = cluster(1).await;
    let removed = cluster
        .forwarder
        .remove_peer(&cluster.servers[&3])
        .await
        .expect("peer removal should succeed");
    assert!(removed);

    let (status, _, body) = send(
        cluster.node(1),
        Method::GET,
        "/galleries/batch?ids=1,3,2",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["id"], 1);
    assert_eq!(body[1], "Failed call to Gallery ID: 3");
    assert_eq!(body[2]["id"], 2);
}

#[tokio::test]
async fn single_gallery_requests_redirect_to_owner() {
    let cluster = cluster(1).await;

    let (status, location, _) = send(cluster.node(1), Method::GET, "/galleries/2", None).await;
    assert_eq!(status, StatusCode::TEMPORARY_REDIRECT);
    assert_eq!(location.as_deref(), Some("http://gallery-2.test:8080/galleries/2"));

    let (status, _, body) = send(cluster.node(1), Method::GET, "/galleries/7", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "not_found");
}

#[tokio::test]
async fn malformed_id_list_is_bad_request() {
    let cluster = cluster(1).await;

    let (status, _, body) = send(
        cluster.node(1),
        Method::GET,
        "/galleries/batch?ids=1,x",
        None,
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "bad_request");
}

#[tokio::test]
async fn leader_change_lets_former_follower_accept_writes() {
    let cluster = cluster(1).await;

    let (status, _, body) = send(
        cluster.node(2),
        Method::PUT,
        "/cluster/leader",
        Some(json!({ "leader_id": 2 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["leader_id"], 2);
    assert_eq!(body["local_id"], 2);

    let (status, _, body) = send(
        cluster.node(2),
        Method::POST,
        "/galleries/batch/arts",
        Some(json!([{ "id": 2, "artList": [art("Guernica", "Picasso")] }])),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["artList"][0]["name"], "Guernica");

    let (status, _, _) = send(
        cluster.node(2),
        Method::PUT,
        "/cluster/leader",
        Some(json!({ "leader_id": 9 })),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn server_directory_can_be_replaced() {
    let cluster = cluster(1).await;

    let (status, _, body) = send(
        cluster.node(1),
        Method::PUT,
        "/cluster/servers",
        Some(json!({ "servers": {
            "1": "http://gallery-1.test:8080",
            "2": "http://gallery-2.test:8080"
        } })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["servers"].as_object().map(|servers| servers.len()), Some(2));

    let (_, _, body) = send(
        cluster.node(1),
        Method::GET,
        "/galleries/batch?ids=1,2,3",
        None,
    )
    .await;
    assert_eq!(body.as_array().map(Vec::len), Some(2));

    let (_, _, view) = send(cluster.node(1), Method::GET, "/cluster", None).await;
    assert_eq!(view["servers"]["2"], "http://gallery-2.test:8080");
}
