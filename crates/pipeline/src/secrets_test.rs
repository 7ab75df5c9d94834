//! Redaction stage tests

use crier_model::corev1::{self, Container, EnvVar, PodSpec};
use crier_model::{Change, Entry, Informer, PersistentVolume};
use tokio::sync::mpsc;

use super::{Secrets, REDACTED};

fn pod_with_env(env: Vec<(&str, &str)>) -> corev1::Pod {
    corev1::Pod {
        metadata: corev1::ObjectMeta {
            uid: Some("p1".into()),
            ..Default::default()
        },
        spec: Some(PodSpec {
            containers: vec![Container {
                name: "app".into(),
                env: Some(
                    env.into_iter()
                        .map(|(name, value)| EnvVar {
                            name: name.into(),
                            value: Some(value.into()),
                            ..Default::default()
                        })
                        .collect(),
                ),
                ..Default::default()
            }],
            ..Default::default()
        }),
        ..Default::default()
    }
}

fn env_values(entry: &Entry) -> Vec<(String, Option<String>)> {
    let change = entry.informer().unwrap().pod().unwrap();
    let pod = change.latest().unwrap();
    pod.spec.as_ref().unwrap().containers[0]
        .env
        .as_ref()
        .unwrap()
        .iter()
        .map(|var| (var.name.clone(), var.value.clone()))
        .collect()
}

// ============================================================================
// Scrub
// ============================================================================

#[test]
fn test_scrub_redacts_matching_names() {
    let mut entry = Entry::new(Informer::must_new(Change::add(pod_with_env(vec![
        ("DB_PASSWORD", "hunter2"),
        ("API_TOKEN", "abc"),
        ("tls_cert_path", "/etc/tls"),
        ("GREETING", "hi"),
    ]))));

    Secrets::scrub(&mut entry);

    assert_eq!(
        env_values(&entry),
        vec![
            ("DB_PASSWORD".into(), Some(REDACTED.into())),
            ("API_TOKEN".into(), Some(REDACTED.into())),
            ("tls_cert_path".into(), Some(REDACTED.into())),
            ("GREETING".into(), Some("hi".into())),
        ]
    );
}

#[test]
fn test_scrub_matches_case_insensitively() {
    let mut entry = Entry::new(Informer::must_new(Change::add(pod_with_env(vec![
        ("jwt_signing_key", "x"),
        ("Secret", "y"),
        ("PWD", "z"),
    ]))));

    Secrets::scrub(&mut entry);

    for (_, value) in env_values(&entry) {
        assert_eq!(value.as_deref(), Some(REDACTED));
    }
}

#[test]
fn test_scrub_redacts_latest_state_of_update() {
    let old = pod_with_env(vec![("DB_PASSWORD", "old-secret")]);
    let new = pod_with_env(vec![("DB_PASSWORD", "new-secret")]);
    let mut entry = Entry::new(Informer::must_new(Change::update(new, old)));

    Secrets::scrub(&mut entry);

    assert_eq!(
        env_values(&entry),
        vec![("DB_PASSWORD".into(), Some(REDACTED.into()))]
    );
}

#[test]
fn test_scrub_leaves_non_pod_entries_alone() {
    let node = corev1::Node {
        metadata: corev1::ObjectMeta {
            uid: Some("n1".into()),
            ..Default::default()
        },
        ..Default::default()
    };
    let mut entry = Entry::new(Informer::must_new(Change::add(node.clone())));
    let before = entry.clone();

    Secrets::scrub(&mut entry);
    assert_eq!(entry, before);

    let pv = corev1::PersistentVolume {
        metadata: corev1::ObjectMeta {
            uid: Some("v1".into()),
            ..Default::default()
        },
        ..Default::default()
    };
    let mut entry = Entry::new(PersistentVolume::must_new(Change::add(pv)));
    let before = entry.clone();

    Secrets::scrub(&mut entry);
    assert_eq!(entry, before);
}

#[test]
fn test_scrub_pod_without_spec_or_env() {
    let pod = corev1::Pod {
        metadata: corev1::ObjectMeta {
            uid: Some("p1".into()),
            ..Default::default()
        },
        ..Default::default()
    };
    let mut entry = Entry::new(Informer::must_new(Change::add(pod)));
    let before = entry.clone();

    Secrets::scrub(&mut entry);
    assert_eq!(entry, before);
}

// ============================================================================
// Stage loop
// ============================================================================

#[tokio::test]
async fn test_run_forwards_in_order_and_closes_output() {
    let (in_tx, in_rx) = mpsc::channel(8);
    let (out_tx, mut out_rx) = mpsc::channel(8);
    tokio::spawn(Secrets::new().run(in_rx, out_tx));

    for uid in ["a", "b", "c"] {
        let mut pod = pod_with_env(vec![("password", "x")]);
        pod.metadata.uid = Some(uid.into());
        in_tx
            .send(Entry::new(Informer::must_new(Change::add(pod))))
            .await
            .unwrap();
    }
    drop(in_tx);

    let mut seen = Vec::new();
    while let Some(entry) = out_rx.recv().await {
        assert_eq!(
            env_values(&entry)[0].1.as_deref(),
            Some(REDACTED),
            "entry left the stage unredacted"
        );
        seen.push(entry.uid().as_str().to_string());
    }

    // FIFO order preserved; channel closed after input closed.
    assert_eq!(seen, vec!["a", "b", "c"]);
}
