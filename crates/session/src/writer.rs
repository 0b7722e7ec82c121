//! Background save scheduling
//!
//! Two strategies, picked by [`SaveMode`]:
//! - detached: every save is its own blocking task. Saves may finish in any
//!   order and whichever finishes last is what the store holds.
//! - serialized: one writer task drains a queue, coalescing everything queued
//!   to the newest state, with at most one write in flight.
//!
//! Write failures are logged by the persistence adapter and never retried.

use setlist_config::SaveMode;
use setlist_core::PlaylistState;
use setlist_storage::PlaylistPersistence;
use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;

pub(crate) enum SaveWriter {
    Detached(DetachedSaves),
    Serialized(SerializedSaves),
}

impl SaveWriter {
    pub(crate) fn spawn(mode: SaveMode, persistence: PlaylistPersistence, runtime: Handle) -> Self {
        match mode {
            SaveMode::FireAndForget => Self::Detached(DetachedSaves {
                persistence,
                runtime,
                pending: Vec::new(),
            }),
            SaveMode::Serialized => Self::Serialized(SerializedSaves::spawn(persistence, &runtime)),
        }
    }

    pub(crate) fn mode(&self) -> SaveMode {
        match self {
            Self::Detached(_) => SaveMode::FireAndForget,
            Self::Serialized(_) => SaveMode::Serialized,
        }
    }

    /// Queues a save of `state`; never blocks the caller
    pub(crate) fn schedule(&mut self, state: PlaylistState) {
        match self {
            Self::Detached(saves) => saves.schedule(state),
            Self::Serialized(saves) => saves.schedule(state),
        }
    }

    /// Waits until every save scheduled so far has finished
    pub(crate) async fn flush(&mut self) {
        match self {
            Self::Detached(saves) => saves.flush().await,
            Self::Serialized(saves) => saves.flush().await,
        }
    }
}

pub(crate) struct DetachedSaves {
    persistence: PlaylistPersistence,
    runtime: Handle,
    pending: Vec<JoinHandle<()>>,
}

impl DetachedSaves {
    fn schedule(&mut self, state: PlaylistState) {
        self.pending.retain(|handle| !handle.is_finished());

        let persistence = self.persistence.clone();
        let handle = self
            .runtime
            .spawn_blocking(move || persistence.save_or_log(&state));
        self.pending.push(handle);
    }

    async fn flush(&mut self) {
        for handle in self.pending.drain(..) {
            if let Err(e) = handle.await {
                log::error!("Save task did not complete: {}", e);
            }
        }
    }
}

enum WriterMessage {
    Save(PlaylistState),
    Flush(oneshot::Sender<()>),
}

pub(crate) struct SerializedSaves {
    sender: mpsc::UnboundedSender<WriterMessage>,
    _worker: JoinHandle<()>,
}

impl SerializedSaves {
    fn spawn(persistence: PlaylistPersistence, runtime: &Handle) -> Self {
        let (sender, receiver) = mpsc::unbounded_channel();
        let worker = runtime.spawn(run_writer(persistence, receiver));
        Self {
            sender,
            _worker: worker,
        }
    }

    fn schedule(&mut self, state: PlaylistState) {
        if self.sender.send(WriterMessage::Save(state)).is_err() {
            log::error!("Playlist writer has stopped, dropping save");
        }
    }

    async fn flush(&mut self) {
        let (done_tx, done_rx) = oneshot::channel();
        if self.sender.send(WriterMessage::Flush(done_tx)).is_err() {
            log::error!("Playlist writer has stopped, nothing to flush");
            return;
        }
        if done_rx.await.is_err() {
            log::error!("Playlist writer stopped before flushing");
        }
    }
}

/// Writer loop; exits once every sender is dropped and the queue is drained
async fn run_writer(
    persistence: PlaylistPersistence,
    mut receiver: mpsc::UnboundedReceiver<WriterMessage>,
) {
    while let Some(message) = receiver.recv().await {
        let mut latest = None;
        let mut waiters = Vec::new();
        let mut coalesced = 0usize;

        let mut next = Some(message);
        while let Some(message) = next {
            match message {
                WriterMessage::Save(state) => {
                    if latest.replace(state).is_some() {
                        coalesced += 1;
                    }
                }
                WriterMessage::Flush(waiter) => waiters.push(waiter),
            }
            next = receiver.try_recv().ok();
        }

        if coalesced > 0 {
            log::debug!("Coalesced {} queued saves", coalesced);
        }

        if let Some(state) = latest {
            let persistence = persistence.clone();
            let result =
                tokio::task::spawn_blocking(move || persistence.save_or_log(&state)).await;
            if let Err(e) = result {
                log::error!("Save task did not complete: {}", e);
            }
        }

        for waiter in waiters {
            let _ = waiter.send(());
        }
    }

    log::debug!("Playlist writer stopped");
}
