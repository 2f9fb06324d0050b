//! Building songs from video references.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc::UnboundedSender;

use super::lookup::{extract_video_id, thumbnail_url, VideoLookup};
use crate::error::Result;

static NEXT_SONG_ID: AtomicU64 = AtomicU64::new(1);

#[derive(Clone, Debug, PartialEq)]
pub struct Song {
    pub id: u64,
    pub title: String,
    pub artist: String,
    pub youtube_id: String,
    pub thumbnail: String,
    /// Display label; the real length comes from the widget once loaded.
    pub duration: String,
}

impl Song {
    pub fn new(youtube_id: &str, title: String, artist: String) -> Self {
        Self {
            id: NEXT_SONG_ID.fetch_add(1, Ordering::Relaxed),
            title,
            artist,
            youtube_id: youtube_id.to_string(),
            thumbnail: thumbnail_url(youtube_id),
            duration: "0:00".into(),
        }
    }
}

#[derive(Debug, Default)]
pub struct CatalogLoad {
    pub songs: Vec<Song>,
    /// `(reference, reason)` for every entry that was skipped.
    pub failures: Vec<(String, String)>,
}

#[derive(Debug)]
pub enum CatalogMessage {
    Loaded(CatalogLoad),
    Added(Song),
    AddFailed { reference: String, reason: String },
}

pub async fn resolve(lookup: &dyn VideoLookup, reference: &str) -> Result<Song> {
    let id = extract_video_id(reference)?;
    let info = lookup.lookup(&id).await?;
    Ok(Song::new(&id, info.title, info.author))
}

/// Resolves `references` one at a time, in order, skipping failures.
pub async fn load_catalog(lookup: &dyn VideoLookup, references: &[String]) -> CatalogLoad {
    let mut load = CatalogLoad::default();
    for reference in references {
        match resolve(lookup, reference).await {
            Ok(song) => {
                tracing::debug!(title = %song.title, "resolved catalog entry");
                load.songs.push(song);
            }
            Err(e) => {
                tracing::warn!(reference = %reference, error = %e, "skipping catalog entry");
                load.failures.push((reference.clone(), e.to_string()));
            }
        }
    }
    tracing::info!(
        loaded = load.songs.len(),
        skipped = load.failures.len(),
        "catalog loaded"
    );
    load
}

pub fn spawn_catalog(
    lookup: Arc<dyn VideoLookup>,
    references: Vec<String>,
    tx: UnboundedSender<CatalogMessage>,
) {
    tokio::spawn(async move {
        let load = load_catalog(lookup.as_ref(), &references).await;
        let _ = tx.send(CatalogMessage::Loaded(load));
    });
}

pub fn spawn_add(lookup: Arc<dyn VideoLookup>, reference: String, tx: UnboundedSender<CatalogMessage>) {
    tokio::spawn(async move {
        let msg = match resolve(lookup.as_ref(), &reference).await {
            Ok(song) => CatalogMessage::Added(song),
            Err(e) => {
                tracing::warn!(reference = %reference, error = %e, "could not add song");
                CatalogMessage::AddFailed {
                    reference,
                    reason: e.to_string(),
                }
            }
        };
        let _ = tx.send(msg);
    });
}
