//! Writes deliveries and reindex requests to stdout as JSON lines.

use std::io::Write;

use async_trait::async_trait;
use correlation::{
    EventConsumer, HeadRevisions, Navigator, OwnerName, PushHeadEvent, Reindexer, RepositoryName,
    Source,
};
use serde_json::{json, Value};
use tracing::warn;

/// Stdout-backed [`EventConsumer`] and [`Reindexer`].
#[derive(Debug, Default)]
pub struct JsonLineSink;

impl JsonLineSink {
    fn emit(&self, record: &Value) {
        let mut stdout = std::io::stdout().lock();
        if let Err(error) = serde_json::to_writer(&mut stdout, record)
            .map_err(std::io::Error::from)
            .and_then(|()| writeln!(stdout))
        {
            warn!(%error, "Failed to write delivery record");
        }
    }
}

/// Heads sorted by name so that output is stable.
fn heads_json(heads: HeadRevisions) -> Value {
    let mut entries: Vec<_> = heads.into_inner().into_iter().collect();
    entries.sort_by(|(a, _), (b, _)| a.name().cmp(b.name()));
    Value::Array(
        entries
            .into_iter()
            .map(|(head, revision)| {
                json!({
                    "head": head,
                    "revision": revision.map(|r| r.hash),
                })
            })
            .collect(),
    )
}

fn event_json(event: &PushHeadEvent) -> Value {
    json!({
        "delivery_id": event.delivery_id(),
        "kind": event.kind(),
        "variant": event.variant(),
        "origin": event.origin(),
    })
}

#[async_trait]
impl EventConsumer for JsonLineSink {
    async fn on_navigator_event(&self, navigator: &Navigator, event: &PushHeadEvent) {
        self.emit(&json!({
            "delivery": "navigator",
            "event": event_json(event),
            "watcher": navigator,
            "source_name": event.source_name(),
        }));
    }

    async fn on_source_heads(&self, source: &Source, event: &PushHeadEvent, heads: HeadRevisions) {
        self.emit(&json!({
            "delivery": "source",
            "event": event_json(event),
            "watcher": source,
            "heads": heads_json(heads),
        }));
    }
}

#[async_trait]
impl Reindexer for JsonLineSink {
    async fn reindex(&self, owner: &OwnerName, repository: &RepositoryName) {
        self.emit(&json!({
            "reindex": { "owner": owner, "repository": repository },
        }));
    }
}
