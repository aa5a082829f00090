//! Aggregation emits structured events through the JSONL layer.

use std::io::{self, Write};
use std::sync::{Arc, Mutex};

use lc_core::logging::{event_names, JsonlLayer};
use lc_core::{aggregate, Cell, EventFrame, WeekStart};
use tracing_subscriber::layer::SubscriberExt;

#[derive(Clone)]
struct SharedBuf(Arc<Mutex<Vec<u8>>>);

impl Write for SharedBuf {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.0.lock().unwrap().write(buf)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

fn capture(f: impl FnOnce()) -> Vec<serde_json::Value> {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::registry().with(JsonlLayer::new(SharedBuf(buffer.clone())));
    tracing::subscriber::with_default(subscriber, f);

    let bytes = buffer.lock().unwrap().clone();
    String::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).expect("valid json line"))
        .collect()
}

#[test]
fn test_aggregation_events_logged() {
    let frame = EventFrame::from_rows(
        ["ts"],
        vec![
            vec![Cell::from("2023-01-02 09:00:00")],
            vec![Cell::Null],
            vec![Cell::from("garbage")],
        ],
    )
    .unwrap();

    let lines = capture(|| {
        aggregate(&frame, &[], "ts", 60, WeekStart::Monday, true).unwrap();
    });

    let names: Vec<&str> = lines.iter().filter_map(|l| l["event"].as_str()).collect();
    assert_eq!(
        names,
        vec![
            event_names::AGGREGATE_STARTED,
            event_names::AGGREGATE_ROWS_DROPPED,
            event_names::AGGREGATE_FINISHED
        ]
    );

    let dropped = &lines[1];
    assert_eq!(dropped["level"], "warn");
    assert_eq!(dropped["fields"]["null_timestamps"], 1);
    assert_eq!(dropped["fields"]["unparseable_timestamps"], 1);

    let finished = &lines[2];
    assert_eq!(finished["fields"]["used_rows"], 1);
    assert_eq!(finished["fields"]["groups"], 1);
}
