//! Batcher tests

use std::time::Duration;

use crier_model::corev1;
use crier_model::{Change, ChangeType, Entry, EntryType, Informer, PersistentVolume, Uid};
use tokio::sync::mpsc;
use tokio::time::timeout;

use super::Batcher;
use crate::error::PipelineError;

const WINDOW: Duration = Duration::from_millis(50);

fn pod(uid: &str, name: &str) -> corev1::Pod {
    corev1::Pod {
        metadata: corev1::ObjectMeta {
            uid: Some(uid.into()),
            name: Some(name.into()),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn node(uid: &str) -> corev1::Node {
    corev1::Node {
        metadata: corev1::ObjectMeta {
            uid: Some(uid.into()),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn pv(uid: &str) -> corev1::PersistentVolume {
    corev1::PersistentVolume {
        metadata: corev1::ObjectMeta {
            uid: Some(uid.into()),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn spawn_batcher(
    window: Duration,
) -> (
    mpsc::Sender<Entry>,
    mpsc::Receiver<crate::Batches>,
    std::sync::Arc<crate::BatcherMetrics>,
) {
    let batcher = Batcher::new(window).unwrap();
    let metrics = batcher.metrics();
    let (in_tx, in_rx) = mpsc::channel(64);
    let (out_tx, out_rx) = mpsc::channel(4);
    tokio::spawn(batcher.run(in_rx, out_tx));
    (in_tx, out_rx, metrics)
}

#[test]
fn test_new_rejects_zero_window() {
    assert!(matches!(
        Batcher::new(Duration::ZERO),
        Err(PipelineError::ZeroWindow)
    ));
}

#[tokio::test]
async fn test_dedup_same_uid_within_window() {
    let (in_tx, mut out_rx, _) = spawn_batcher(WINDOW);

    // Add then two updates for the same pod inside one window.
    let add = Entry::new(Informer::must_new(Change::add(pod("p1", "a"))));
    let up1 = Entry::new(Informer::must_new(Change::update(
        pod("p1", "b"),
        pod("p1", "a"),
    )));
    let up2 = Entry::new(Informer::must_new(Change::update(
        pod("p1", "c"),
        pod("p1", "b"),
    )));
    for entry in [add, up1, up2] {
        in_tx.send(entry).await.unwrap();
    }

    let batches = timeout(Duration::from_secs(1), out_rx.recv())
        .await
        .unwrap()
        .unwrap();

    // Exactly one entry survives: the last update.
    let batch = batches.get(EntryType::Informer).unwrap();
    assert_eq!(batch.len(), 1);
    let entry = batch.get(&Uid::new("p1")).unwrap();
    assert_eq!(entry.change_type(), ChangeType::Update);
    assert_eq!(entry.object().unwrap().name(), Some("c"));
}

#[tokio::test]
async fn test_add_then_delete_collapses_to_delete() {
    let (in_tx, mut out_rx, _) = spawn_batcher(WINDOW);

    let add = Entry::new(Informer::must_new(Change::add(node("n1"))));
    let delete = Entry::new(Informer::must_new(Change::delete(node("n1"))));
    in_tx.send(add).await.unwrap();
    in_tx.send(delete).await.unwrap();

    let batches = timeout(Duration::from_secs(1), out_rx.recv())
        .await
        .unwrap()
        .unwrap();

    let batch = batches.get(EntryType::Informer).unwrap();
    assert_eq!(batch.len(), 1);
    assert_eq!(
        batch.get(&Uid::new("n1")).unwrap().change_type(),
        ChangeType::Delete
    );
}

#[tokio::test]
async fn test_mixed_entry_types_batch_separately() {
    let (in_tx, mut out_rx, _) = spawn_batcher(WINDOW);

    in_tx
        .send(Entry::new(Informer::must_new(Change::add(pod("p1", "a")))))
        .await
        .unwrap();
    in_tx
        .send(Entry::new(PersistentVolume::must_new(Change::add(pv("v1")))))
        .await
        .unwrap();

    let batches = timeout(Duration::from_secs(1), out_rx.recv())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(batches.len(), 2);
    assert_eq!(batches.get(EntryType::Informer).unwrap().len(), 1);
    assert_eq!(batches.get(EntryType::PersistentVolume).unwrap().len(), 1);
}

#[tokio::test]
async fn test_empty_window_emits_nothing() {
    let (_in_tx, mut out_rx, _) = spawn_batcher(WINDOW);

    // Several windows pass with no input; nothing may be emitted.
    let got = timeout(WINDOW * 4, out_rx.recv()).await;
    assert!(got.is_err(), "empty window emitted a batch");
}

#[tokio::test]
async fn test_entry_without_uid_dropped() {
    let (in_tx, mut out_rx, metrics) = spawn_batcher(WINDOW);

    let no_uid = Entry::new(Informer::must_new(Change::add(corev1::Pod::default())));
    in_tx.send(no_uid).await.unwrap();
    in_tx
        .send(Entry::new(Informer::must_new(Change::add(pod("p1", "a")))))
        .await
        .unwrap();

    let batches = timeout(Duration::from_secs(1), out_rx.recv())
        .await
        .unwrap()
        .unwrap();

    assert_eq!(batches.entry_count(), 1);
    assert_eq!(metrics.entries_dropped(), 1);
    assert_eq!(metrics.entries_received(), 1);
}

#[tokio::test]
async fn test_successive_windows_emit_separately() {
    let (in_tx, mut out_rx, metrics) = spawn_batcher(WINDOW);

    in_tx
        .send(Entry::new(Informer::must_new(Change::add(pod("p1", "a")))))
        .await
        .unwrap();
    let first = timeout(Duration::from_secs(1), out_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(first.get(EntryType::Informer).unwrap().get(&Uid::new("p1")).is_some());

    in_tx
        .send(Entry::new(Informer::must_new(Change::add(pod("p2", "b")))))
        .await
        .unwrap();
    let second = timeout(Duration::from_secs(1), out_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(second.get(EntryType::Informer).unwrap().get(&Uid::new("p2")).is_some());
    assert!(second.get(EntryType::Informer).unwrap().get(&Uid::new("p1")).is_none());

    assert_eq!(metrics.batches_emitted(), 2);
}

#[tokio::test]
async fn test_input_closure_closes_output_and_discards_pending() {
    // Long window so the pending entry cannot be emitted before close.
    let (in_tx, mut out_rx, _) = spawn_batcher(Duration::from_secs(60));

    in_tx
        .send(Entry::new(Informer::must_new(Change::add(pod("p1", "a")))))
        .await
        .unwrap();
    drop(in_tx);

    // Output closes promptly; the pending window is discarded, not flushed.
    let got = timeout(Duration::from_secs(1), out_rx.recv()).await;
    assert_eq!(got.unwrap(), None);
}

#[tokio::test]
async fn test_recycled_batches_reused() {
    let batcher = Batcher::new(WINDOW).unwrap();
    let recycler = batcher.recycler();
    let (in_tx, in_rx) = mpsc::channel(8);
    let (out_tx, mut out_rx) = mpsc::channel(4);
    tokio::spawn(batcher.run(in_rx, out_tx));

    in_tx
        .send(Entry::new(Informer::must_new(Change::add(pod("p1", "a")))))
        .await
        .unwrap();
    let batches = timeout(Duration::from_secs(1), out_rx.recv())
        .await
        .unwrap()
        .unwrap();

    // The consumer contract: recycle after reading.
    recycler.recycle(std::sync::Arc::new(batches));

    // The pipeline keeps working on recycled maps.
    in_tx
        .send(Entry::new(Informer::must_new(Change::add(pod("p2", "b")))))
        .await
        .unwrap();
    let next = timeout(Duration::from_secs(1), out_rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert_eq!(next.entry_count(), 1);
    assert!(next.get(EntryType::Informer).unwrap().get(&Uid::new("p2")).is_some());
}
