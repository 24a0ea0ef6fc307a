use crate::catalog::Catalog;
use crate::errors::TapError;
use crate::singer::{Message, MessageWriter};
use crate::types::StreamId;
use crate::wordpress::{HandlerRegistry, WordPressClient};
use chrono::Utc;
use futures::TryStreamExt;
use tracing::info;

/// Records written per synced stream, in sync order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SyncSummary {
    pub streams: Vec<(StreamId, usize)>,
}

impl SyncSummary {
    pub fn records_for(&self, stream: StreamId) -> Option<usize> {
        self.streams
            .iter()
            .find(|(id, _)| *id == stream)
            .map(|(_, count)| *count)
    }

    pub fn total(&self) -> usize {
        self.streams.iter().map(|(_, count)| count).sum()
    }
}

/// Syncs every selected stream of `catalog`.
///
/// For each selected stream the schema is written once, then one record message
/// per cleaned record. Unselected streams are skipped without any request. The
/// first error aborts the sync.
pub async fn sync<W: MessageWriter>(
    client: &WordPressClient,
    handlers: &HandlerRegistry,
    catalog: &Catalog,
    writer: &mut W,
) -> Result<SyncSummary, TapError> {
    info!("Sync");
    let mut summary = SyncSummary::default();

    for entry in catalog.selected_streams() {
        let stream: StreamId = entry.tap_stream_id.parse()?;
        let handler = handlers.get(stream)?;
        info!("Syncing stream: {}", entry.tap_stream_id);

        writer.write_message(&Message::schema(
            &entry.tap_stream_id,
            entry.schema.clone(),
            entry.key_properties.clone(),
        ))?;

        let mut records = client.records(handler);
        let mut count = 0;
        while let Some(record) = records.try_next().await? {
            writer.write_message(&Message::record(&entry.tap_stream_id, record, Utc::now()))?;
            count += 1;
        }

        info!(stream = %stream, records = count, "Finished syncing stream");
        summary.streams.push((stream, count));
    }

    Ok(summary)
}
