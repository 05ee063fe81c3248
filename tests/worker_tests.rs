// Push worker: one cycle per tick written to the sink, clean shutdown

mod common;

use common::{FakeCgroups, FakeInspector, FakeSource, RecordingSink, W_OUTPUT, collector, unavailable};
use logged_users_exporter::error::Dataset;
use logged_users_exporter::push::PushSink;
use logged_users_exporter::render::FieldValue;
use logged_users_exporter::worker::{WorkerConfig, WorkerDeps, push_once, spawn};
use std::sync::Arc;
use std::time::Duration;

const IO_OUTPUT: &str = "42 be/4 bob 12.50 K/s 3.00 K/s ?unavailable? sleep 10";
const PS_OUTPUT: &str = "bob        42  1.5  20000  4000 sleep 10";

fn docker_cgroups() -> (FakeCgroups, FakeInspector) {
    (
        FakeCgroups::default().with(42, "0::/docker/abc123\n"),
        FakeInspector::default().with("abc123", "myapp"),
    )
}

#[tokio::test]
async fn push_once_writes_every_dataset() {
    let (cgroups, inspector) = docker_cgroups();
    let collector = collector(FakeSource::new(W_OUTPUT, IO_OUTPUT, PS_OUTPUT), cgroups, inspector);
    let sink = RecordingSink::default();

    let written = push_once(&collector, &sink).await;

    // count + one session + one io + one mem/cpu
    assert_eq!(written, 4);
    let batches = sink.batches.lock().unwrap();
    assert_eq!(batches.len(), 1);
    let measurements: Vec<&str> = batches[0].iter().map(|p| p.measurement).collect();
    assert_eq!(
        measurements,
        vec![
            "logged_in_users",
            "logged_in_user",
            "process_read_write_in_KB",
            "process_mem_cpu"
        ]
    );
    assert_eq!(batches[0][0].fields, vec![("number_of_users", FieldValue::Integer(1))]);

    let io_line = batches[0][2].to_line_protocol();
    assert!(io_line.starts_with(
        "process_read_write_in_KB,hostname=web1,os=linux,os_version=6.8.0,process_id=42,username=bob,command=sleep\\ 10,container_name=myapp,container_id=abc123 read=12.5,write=3 "
    ));
}

#[tokio::test]
async fn push_once_skips_failed_dataset() {
    let (cgroups, inspector) = docker_cgroups();
    let mut source = FakeSource::new(W_OUTPUT, IO_OUTPUT, PS_OUTPUT);
    source.process_mem_cpu = Err(unavailable(Dataset::ProcessMemCpu));
    let collector = collector(source, cgroups, inspector);
    let sink = RecordingSink::default();

    let written = push_once(&collector, &sink).await;

    assert_eq!(written, 3);
    let batches = sink.batches.lock().unwrap();
    assert!(batches[0].iter().all(|p| p.measurement != "process_mem_cpu"));
}

#[tokio::test]
async fn push_once_reports_nothing_written_when_sink_rejects() {
    let (cgroups, inspector) = docker_cgroups();
    let collector = collector(FakeSource::new(W_OUTPUT, IO_OUTPUT, PS_OUTPUT), cgroups, inspector);
    let sink = RecordingSink {
        fail: true,
        ..Default::default()
    };

    assert_eq!(push_once(&collector, &sink).await, 0);
    assert_eq!(sink.batches.lock().unwrap().len(), 1);
}

#[tokio::test]
async fn worker_spawn_ticks_and_shuts_down() {
    let (cgroups, inspector) = docker_cgroups();
    let collector = Arc::new(collector(
        FakeSource::new(W_OUTPUT, IO_OUTPUT, PS_OUTPUT),
        cgroups,
        inspector,
    ));
    let sink = Arc::new(RecordingSink::default());
    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();

    let handle = spawn(
        WorkerDeps {
            collector,
            sink: sink.clone() as Arc<dyn PushSink>,
            shutdown_rx,
        },
        WorkerConfig { interval_secs: 1 },
    );

    // First tick fires immediately.
    let mut waited = Duration::ZERO;
    while sink.batches.lock().unwrap().is_empty() && waited < Duration::from_secs(5) {
        tokio::time::sleep(Duration::from_millis(20)).await;
        waited += Duration::from_millis(20);
    }
    assert!(!sink.batches.lock().unwrap().is_empty());

    shutdown_tx.send(()).unwrap();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .expect("worker did not stop")
        .unwrap();
}
