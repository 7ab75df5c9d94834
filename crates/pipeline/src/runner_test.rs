//! Runner tests

use std::time::Duration;

use async_trait::async_trait;
use crier_model::corev1::{self, Container, EnvVar, PodSpec};
use crier_model::{Change, Entry, EntryType, Informer, Uid};
use tokio::sync::mpsc;
use tokio::time::timeout;

use super::{Options, Runner};
use crate::error::{BoxError, PipelineError};
use crate::reader::Reader;
use crate::{EntrySender, REDACTED};

const WINDOW: Duration = Duration::from_millis(50);

fn pod(uid: &str) -> corev1::Pod {
    corev1::Pod {
        metadata: corev1::ObjectMeta {
            uid: Some(uid.into()),
            ..Default::default()
        },
        ..Default::default()
    }
}

fn pod_entry(uid: &str) -> Entry {
    Entry::new(Informer::must_new(Change::add(pod(uid))))
}

/// Reader that publishes a fixed set of entries when run
struct FakeReader {
    out: Option<EntrySender>,
    entries: Vec<Entry>,
    started: bool,
    fail_run: bool,
}

impl FakeReader {
    fn new(entries: Vec<Entry>) -> Self {
        Self {
            out: None,
            entries,
            started: false,
            fail_run: false,
        }
    }

    fn failing() -> Self {
        let mut reader = Self::new(Vec::new());
        reader.fail_run = true;
        reader
    }
}

#[async_trait]
impl Reader for FakeReader {
    fn set_out(&mut self, out: EntrySender) -> Result<(), BoxError> {
        if self.started {
            return Err("set_out called after run".into());
        }
        self.out = Some(out);
        Ok(())
    }

    async fn run(&mut self) -> Result<(), BoxError> {
        if self.started {
            return Err("run called twice".into());
        }
        if self.fail_run {
            return Err("reader failed to connect".into());
        }
        let Some(out) = self.out.clone() else {
            return Err("run called before set_out".into());
        };
        self.started = true;

        let entries = std::mem::take(&mut self.entries);
        tokio::spawn(async move {
            for entry in entries {
                if out.send(entry).await.is_err() {
                    break;
                }
            }
        });
        Ok(())
    }
}

fn new_runner(options: Options) -> (Runner, EntrySender) {
    let (input_tx, input_rx) = mpsc::channel(64);
    let runner = Runner::new(input_tx.clone(), input_rx, WINDOW, options).unwrap();
    (runner, input_tx)
}

// ============================================================================
// Registration and startup rules
// ============================================================================

#[tokio::test]
async fn test_add_processor_after_start_fails() {
    let (mut runner, _input) = new_runner(Options::default());
    let (tx, _rx) = mpsc::channel(4);
    runner.add_processor("audit", tx).unwrap();
    runner.start().await.unwrap();

    let (tx2, _rx2) = mpsc::channel(4);
    assert!(matches!(
        runner.add_processor("late", tx2),
        Err(PipelineError::RegisterAfterStart)
    ));
}

#[tokio::test]
async fn test_start_twice_fails() {
    let (mut runner, _input) = new_runner(Options::default());
    let (tx, _rx) = mpsc::channel(4);
    runner.add_processor("audit", tx).unwrap();

    runner.start().await.unwrap();
    assert!(matches!(
        runner.start().await,
        Err(PipelineError::AlreadyStarted)
    ));
}

#[tokio::test]
async fn test_start_without_processors_fails() {
    let (mut runner, _input) = new_runner(Options::default());
    assert!(matches!(
        runner.start().await,
        Err(PipelineError::NoRoutes)
    ));
}

#[tokio::test]
async fn test_failing_reader_propagates_from_start() {
    let (mut runner, _input) = new_runner(Options::default());
    let (tx, _rx) = mpsc::channel(4);
    runner.add_processor("audit", tx).unwrap();
    runner.add_reader(Box::new(FakeReader::failing())).await.unwrap();

    let err = runner.start().await.unwrap_err();
    assert!(matches!(err, PipelineError::Reader(_)));
    assert!(err.to_string().contains("failed to connect"));
}

// ============================================================================
// Data flow
// ============================================================================

#[tokio::test]
async fn test_entries_flow_from_reader_to_processor() {
    let (mut runner, _input) = new_runner(Options::default());
    let (tx, mut rx) = mpsc::channel(4);
    runner.add_processor("audit", tx).unwrap();
    runner
        .add_reader(Box::new(FakeReader::new(vec![
            pod_entry("p1"),
            pod_entry("p2"),
        ])))
        .await
        .unwrap();
    runner.start().await.unwrap();

    let batches = timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    let batch = batches.get(EntryType::Informer).unwrap();
    assert_eq!(batch.len(), 2);
    assert!(batch.get(&Uid::new("p1")).is_some());
    assert!(batch.get(&Uid::new("p2")).is_some());
}

#[tokio::test]
async fn test_reader_added_after_start_runs_immediately() {
    let (mut runner, _input) = new_runner(Options::default());
    let (tx, mut rx) = mpsc::channel(4);
    runner.add_processor("audit", tx).unwrap();
    runner.start().await.unwrap();

    // Staggered reader: registered after start, runs right away.
    runner
        .add_reader(Box::new(FakeReader::new(vec![pod_entry("late")])))
        .await
        .unwrap();

    let batches = timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    assert!(batches
        .get(EntryType::Informer)
        .unwrap()
        .get(&Uid::new("late"))
        .is_some());
}

#[tokio::test]
async fn test_redaction_applies_inside_pipeline() {
    let (mut runner, input) = new_runner(Options::default());
    let (tx, mut rx) = mpsc::channel(4);
    runner.add_processor("audit", tx).unwrap();
    runner.start().await.unwrap();

    let mut leaky = pod("p1");
    leaky.spec = Some(PodSpec {
        containers: vec![Container {
            name: "app".into(),
            env: Some(vec![EnvVar {
                name: "DB_PASSWORD".into(),
                value: Some("hunter2".into()),
                ..Default::default()
            }]),
            ..Default::default()
        }],
        ..Default::default()
    });
    input
        .send(Entry::new(Informer::must_new(Change::add(leaky))))
        .await
        .unwrap();

    let batches = timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    let entry = batches
        .get(EntryType::Informer)
        .unwrap()
        .get(&Uid::new("p1"))
        .unwrap();
    let pod = entry.informer().unwrap().pod().unwrap().latest().unwrap();
    let env = pod.spec.as_ref().unwrap().containers[0].env.as_ref().unwrap();
    assert_eq!(env[0].value.as_deref(), Some(REDACTED));
}

#[tokio::test]
async fn test_pre_processors_run_before_redaction() {
    let relabel = |entry: &mut Entry| -> Result<(), BoxError> {
        let change = entry.informer_mut().unwrap().pod_mut().unwrap();
        change.latest_mut().unwrap().metadata.name = Some("stamped".into());
        Ok(())
    };

    let (mut runner, input) = new_runner(Options::default().with_pre_processor(relabel));
    let (tx, mut rx) = mpsc::channel(4);
    runner.add_processor("audit", tx).unwrap();
    runner.start().await.unwrap();

    input.send(pod_entry("p1")).await.unwrap();

    let batches = timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .unwrap();
    let entry = batches
        .get(EntryType::Informer)
        .unwrap()
        .get(&Uid::new("p1"))
        .unwrap();
    assert_eq!(entry.object().unwrap().name(), Some("stamped"));
}

// ============================================================================
// Shutdown
// ============================================================================

#[tokio::test]
async fn test_dropping_runner_and_readers_closes_processors() {
    let (mut runner, input) = new_runner(Options::default());
    let (tx, mut rx) = mpsc::channel(4);
    runner.add_processor("audit", tx).unwrap();
    runner.start().await.unwrap();

    input.send(pod_entry("p1")).await.unwrap();
    assert!(timeout(Duration::from_secs(1), rx.recv())
        .await
        .unwrap()
        .is_some());

    // Close the shared input: the only senders are the test handle and the
    // runner itself.
    drop(input);
    drop(runner);

    let closed = timeout(Duration::from_secs(1), async {
        while rx.recv().await.is_some() {}
    })
    .await;
    assert!(closed.is_ok(), "processor channel did not close");
}
