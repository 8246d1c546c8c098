//! Snapshot Writer
//!
//! Persists the public round snapshot to disk after every mutating operation
//! so a crashed process can be inspected or recovered. A single writer task
//! drains an mpsc channel, which preserves the order snapshots were handed
//! over in; a newer snapshot is never overwritten by an older one.
//!
//! The unrevealed seed is never part of the snapshot (it is not in any public
//! view before reveal), so a crash during the locking phase loses the seed
//! and the round has to be reset.

use std::path::{Path, PathBuf};

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::game::PublicRound;

/// Queue depth between the engine and the writer task. Snapshots are small;
/// if the disk falls this far behind, dropping the newest one is preferable
/// to blocking an engine operation.
const SNAPSHOT_QUEUE_DEPTH: usize = 64;

/// Handle to the background snapshot writer.
pub struct SnapshotWriter {
    tx: mpsc::Sender<PublicRound>,
    handle: JoinHandle<()>,
}

impl SnapshotWriter {
    /// Spawn the writer task persisting to `path`.
    ///
    /// Pass the returned sender to
    /// [`RoundEngine::with_snapshot_channel`](crate::game::RoundEngine::with_snapshot_channel).
    pub fn spawn(path: PathBuf) -> Self {
        let (tx, rx) = mpsc::channel(SNAPSHOT_QUEUE_DEPTH);
        let handle = tokio::spawn(run_writer(path, rx));
        Self { tx, handle }
    }

    /// Sender half for the engine.
    pub fn sender(&self) -> mpsc::Sender<PublicRound> {
        self.tx.clone()
    }

    /// Drop the sender and wait for pending snapshots to hit the disk.
    ///
    /// Completes only once every clone handed out by [`sender`](Self::sender)
    /// has also been dropped.
    pub async fn shutdown(self) {
        drop(self.tx);
        let _ = self.handle.await;
    }
}

/// Drain the channel in order, writing each snapshot as it arrives.
async fn run_writer(path: PathBuf, mut rx: mpsc::Receiver<PublicRound>) {
    while let Some(snap) = rx.recv().await {
        if let Err(e) = write_snapshot(&path, &snap).await {
            // Persistence failure must not abort the in-memory transition.
            warn!(path = %path.display(), "snapshot write failed: {e}");
        } else {
            debug!(round = snap.round_id, status = %snap.status, "snapshot written");
        }
    }
    debug!("snapshot writer stopped");
}

/// Serialize one snapshot and write it to `path`.
async fn write_snapshot(path: &Path, snap: &PublicRound) -> anyhow::Result<()> {
    let json = serde_json::to_vec_pretty(snap)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::RoundEngine;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("gift_dice_{}_{}.json", name, std::process::id()))
    }

    #[tokio::test]
    async fn test_write_snapshot_round_trips() {
        let path = temp_path("roundtrip");
        let snap = RoundEngine::new().snapshot().await;
        write_snapshot(&path, &snap).await.unwrap();

        let bytes = tokio::fs::read(&path).await.unwrap();
        let parsed: PublicRound = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(parsed.round_id, snap.round_id);
        assert_eq!(parsed.status, snap.status);
        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_writer_persists_latest_in_order() {
        let path = temp_path("order");
        let writer = SnapshotWriter::spawn(path.clone());

        let engine = RoundEngine::new().with_snapshot_channel(writer.sender());
        engine.join(1, "a".into(), 5.0).await.unwrap();
        engine.join(2, "b".into(), 5.0).await.unwrap();
        engine.reset().await.unwrap();

        drop(engine);
        writer.shutdown().await;

        let bytes = tokio::fs::read(&path).await.unwrap();
        let parsed: PublicRound = serde_json::from_slice(&bytes).unwrap();
        // The last mutation was the reset to round 2.
        assert_eq!(parsed.round_id, 2);
        assert!(parsed.players.is_empty());
        tokio::fs::remove_file(&path).await.unwrap();
    }

    #[tokio::test]
    async fn test_unrevealed_seed_never_persisted() {
        let path = temp_path("seed");
        let writer = SnapshotWriter::spawn(path.clone());

        let engine = RoundEngine::new().with_snapshot_channel(writer.sender());
        engine.join(1, "a".into(), 5.0).await.unwrap();
        engine.join(2, "b".into(), 5.0).await.unwrap();
        engine.lock_with_seed("super-secret".into()).await.unwrap();

        drop(engine);
        writer.shutdown().await;

        let bytes = tokio::fs::read(&path).await.unwrap();
        assert!(!String::from_utf8(bytes).unwrap().contains("super-secret"));
        tokio::fs::remove_file(&path).await.unwrap();
    }
}
