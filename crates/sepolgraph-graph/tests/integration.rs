//! Integration tests for sepolgraph-graph against a live Neo4j instance.
//!
//! Run with: cargo test --package sepolgraph-graph --test integration -- --ignored
//!
//! Skipped automatically if Neo4j is not available.

use std::sync::atomic::{AtomicUsize, Ordering};

use sepolgraph_core::{Allows, Class, Object, Subject};
use sepolgraph_graph::{Endpoint, GraphClient, GraphConfig, GraphError, PolicyStore};

static COUNTER: AtomicUsize = AtomicUsize::new(0);

async fn connect_or_skip() -> Option<GraphClient> {
    let config = GraphConfig::default();
    match GraphClient::connect(&config).await {
        Ok(client) => Some(client),
        Err(e) => {
            eprintln!("Skipping integration test (Neo4j not available): {e}");
            None
        }
    }
}

/// Node names unique to one test so runs don't collide.
fn unique(name: &str) -> String {
    let n = COUNTER.fetch_add(1, Ordering::SeqCst);
    format!("itest-{}-{n}-{name}", std::process::id())
}

async fn cleanup(client: &GraphClient, names: &[&str]) {
    let names: Vec<String> = names.iter().map(|n| n.to_string()).collect();
    let q = neo4rs::query("MATCH (n) WHERE n.name IN $names DETACH DELETE n")
        .param("names", names);
    let _ = client.run(q).await;
}

fn make_subject(name: &str, domain: &str) -> Subject {
    Subject {
        name: name.to_string(),
        kind: Some("process".to_string()),
        domain: Some(domain.to_string()),
        attributes: Some(vec!["create".to_string(), "destroy".to_string()]),
    }
}

fn make_object(name: &str) -> Object {
    Object {
        name: name.to_string(),
        kind: Some("file".to_string()),
        class: Some("file".to_string()),
        attributes: Some(vec![]),
    }
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_schema_is_idempotent() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    client.create_constraints().await.unwrap();
    client.create_constraints().await.unwrap();
    client.create_indexes().await.unwrap();
    client.create_indexes().await.unwrap();

    let rows = client
        .query_rows(neo4rs::query(
            "SHOW CONSTRAINTS YIELD name
             WHERE name IN ['subject_name', 'object_name', 'class_name']
             RETURN name",
        ))
        .await
        .unwrap();
    assert_eq!(rows.len(), 3);
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_subject_upsert_is_idempotent() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let name = unique("init");
    cleanup(&client, &[&name]).await;

    client
        .upsert_subjects(&[make_subject(&name, "kernel")])
        .await
        .unwrap();
    client
        .upsert_subjects(&[make_subject(&name, "init_t")])
        .await
        .unwrap();

    let q = neo4rs::query("MATCH (n:Subject {name: $name}) RETURN count(n) AS cnt")
        .param("name", name.clone());
    let row = client.query_one(q).await.unwrap().unwrap();
    assert_eq!(row.get::<i64>("cnt").unwrap(), 1);

    let subject = client.get_subject(&name).await.unwrap().unwrap();
    assert_eq!(subject.domain.as_deref(), Some("init_t"));
    assert_eq!(
        subject.attributes,
        Some(vec!["create".to_string(), "destroy".to_string()])
    );

    cleanup(&client, &[&name]).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_absent_attribute_removes_property() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let name = unique("file");
    cleanup(&client, &[&name]).await;

    let class = Class {
        name: name.clone(),
        permissions: Some(vec!["read".to_string(), "write".to_string()]),
        description: Some("regular file".to_string()),
    };
    client.upsert_classes(&[class]).await.unwrap();

    let bare = Class {
        name: name.clone(),
        permissions: Some(vec![]),
        description: None,
    };
    client.upsert_classes(&[bare]).await.unwrap();

    let stored = client.get_class(&name).await.unwrap().unwrap();
    assert_eq!(stored.description, None);
    assert_eq!(stored.permissions, Some(vec![]));

    cleanup(&client, &[&name]).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_allows_edge_upsert() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let subject = unique("init");
    let object = unique("passwd");
    cleanup(&client, &[&subject, &object]).await;

    client
        .upsert_subjects(&[make_subject(&subject, "kernel")])
        .await
        .unwrap();
    client.upsert_objects(&[make_object(&object)]).await.unwrap();

    let mut edge = Allows {
        subject: subject.clone(),
        object: object.clone(),
        permissions: Some(vec!["read".to_string()]),
        conditions: Some(vec![]),
    };
    client.upsert_allows(&edge).await.unwrap();
    edge.permissions = Some(vec!["read".to_string(), "write".to_string()]);
    client.upsert_allows(&edge).await.unwrap();

    let q = neo4rs::query(
        "MATCH (:Subject {name: $s})-[r:ALLOWS]->(:Object {name: $o}) RETURN count(r) AS cnt",
    )
    .param("s", subject.clone())
    .param("o", object.clone());
    let row = client.query_one(q).await.unwrap().unwrap();
    assert_eq!(row.get::<i64>("cnt").unwrap(), 1);

    let stored = client.get_allows(&subject, &object).await.unwrap().unwrap();
    assert_eq!(
        stored.permissions,
        Some(vec!["read".to_string(), "write".to_string()])
    );
    assert_eq!(stored.conditions, Some(vec![]));

    cleanup(&client, &[&subject, &object]).await;
}

#[tokio::test]
#[ignore = "requires live Neo4j"]
async fn test_allows_edge_missing_endpoint() {
    let Some(client) = connect_or_skip().await else {
        return;
    };
    let subject = unique("init");
    let object = unique("shadow");
    cleanup(&client, &[&subject, &object]).await;

    client
        .upsert_subjects(&[make_subject(&subject, "kernel")])
        .await
        .unwrap();

    let edge = Allows {
        subject: subject.clone(),
        object: object.clone(),
        permissions: Some(vec!["read".to_string()]),
        conditions: Some(vec![]),
    };
    let err = client.upsert_allows(&edge).await.unwrap_err();
    assert!(matches!(
        err,
        GraphError::MissingEndpoint {
            missing: Endpoint::Object,
            ..
        }
    ));
    assert!(client.get_object(&object).await.unwrap().is_none());

    cleanup(&client, &[&subject, &object]).await;
}
