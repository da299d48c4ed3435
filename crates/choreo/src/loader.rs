use crate::item::{ImageRef, ItemId};
use async_channel::{Receiver, Sender};
use parking_lot::Mutex;
use std::collections::HashSet;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use thiserror::Error;
use tokio::runtime::Handle;

/// Turns an image reference into something paintable. Runs on a blocking
/// worker thread, never on the tick thread.
pub trait Decoder: Send + Sync + 'static {
    type Texture: Send + 'static;

    fn decode(&self, image: &ImageRef) -> Result<Self::Texture, LoadError>;
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum LoadError {
    #[error("image not found: {0}")]
    NotFound(ImageRef),
    #[error("failed to read {image}: {reason}")]
    Io { image: ImageRef, reason: String },
    #[error("failed to decode {image}: {reason}")]
    Decode { image: ImageRef, reason: String },
    #[error("decoder panicked on {0}")]
    Panicked(ImageRef),
}

#[derive(Debug, Clone, PartialEq)]
pub enum TextureState<T> {
    Pending,
    Ready(T),
    Failed(LoadError),
}

impl<T> TextureState<T> {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }

    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, Self::Failed(_))
    }

    pub fn texture(&self) -> Option<&T> {
        match self {
            Self::Ready(t) => Some(t),
            _ => None,
        }
    }
}

struct Slot<T> {
    image: ImageRef,
    ticket: u64,
    state: TextureState<T>,
}

struct Completion<T> {
    slot: ItemId,
    ticket: u64,
    result: Result<T, LoadError>,
}

/// One texture slot per card, filled asynchronously.
///
/// Every request gets a fresh ticket. A completion is applied by [`poll`] only
/// if its ticket is still the slot's current one, so superseded loads are
/// dropped without any explicit cancellation. There is no retry and no
/// timeout.
///
/// [`poll`]: ResourceLoader::poll
pub struct ResourceLoader<D: Decoder> {
    decoder: Arc<D>,
    runtime: Handle,
    slots: Vec<Slot<D::Texture>>,
    next_ticket: u64,
    // Tickets still worth decoding; workers skip anything missing from here.
    live: Arc<Mutex<HashSet<u64>>>,
    tx: Sender<Completion<D::Texture>>,
    rx: Receiver<Completion<D::Texture>>,
}

impl<D: Decoder> ResourceLoader<D> {
    pub fn new(decoder: D, runtime: Handle) -> Self {
        let (tx, rx) = async_channel::unbounded();
        Self {
            decoder: Arc::new(decoder),
            runtime,
            slots: Vec::new(),
            next_ticket: 0,
            live: Arc::new(Mutex::new(HashSet::new())),
            tx,
            rx,
        }
    }

    /// Replaces every slot with one per image and starts loading them all.
    pub fn reset(&mut self, images: &[ImageRef]) {
        self.live.lock().clear();
        let slots = images
            .iter()
            .map(|image| Slot {
                image: image.clone(),
                ticket: self.issue_ticket(),
                state: TextureState::Pending,
            })
            .collect();
        self.slots = slots;

        for i in 0..self.slots.len() {
            self.spawn(ItemId::new(i));
        }
    }

    /// Points an existing slot at a new image. Returns `false` if the slot
    /// does not exist.
    pub fn request(&mut self, slot: ItemId, image: ImageRef) -> bool {
        let ticket = self.issue_ticket();
        let Some(entry) = self.slots.get_mut(slot.index()) else {
            return false;
        };
        self.live.lock().remove(&entry.ticket);
        *entry = Slot {
            image,
            ticket,
            state: TextureState::Pending,
        };
        self.spawn(slot);
        true
    }

    /// Applies finished loads. Call at the start of a tick.
    pub fn poll(&mut self) -> usize {
        let mut applied = 0;
        while let Ok(done) = self.rx.try_recv() {
            self.live.lock().remove(&done.ticket);
            match self.slots.get_mut(done.slot.index()) {
                Some(slot) if slot.ticket == done.ticket => {
                    slot.state = match done.result {
                        Ok(texture) => TextureState::Ready(texture),
                        Err(e) => {
                            log::warn!("Failed to load image {}: {}", slot.image, e);
                            TextureState::Failed(e)
                        }
                    };
                    applied += 1;
                }
                _ => log::debug!("Dropping stale load for slot {}", done.slot),
            }
        }
        applied
    }

    pub fn state(&self, slot: ItemId) -> Option<&TextureState<D::Texture>> {
        self.slots.get(slot.index()).map(|s| &s.state)
    }

    pub fn image(&self, slot: ItemId) -> Option<&ImageRef> {
        self.slots.get(slot.index()).map(|s| &s.image)
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn pending(&self) -> usize {
        self.slots.iter().filter(|s| s.state.is_pending()).count()
    }

    fn issue_ticket(&mut self) -> u64 {
        self.next_ticket += 1;
        self.next_ticket
    }

    fn spawn(&self, slot: ItemId) {
        let Some(entry) = self.slots.get(slot.index()) else {
            return;
        };
        let (ticket, image) = (entry.ticket, entry.image.clone());
        self.live.lock().insert(ticket);

        let decoder = Arc::clone(&self.decoder);
        let live = Arc::clone(&self.live);
        let tx = self.tx.clone();

        self.runtime.spawn_blocking(move || {
            if !live.lock().contains(&ticket) {
                return;
            }
            let result = panic::catch_unwind(AssertUnwindSafe(|| decoder.decode(&image)))
                .unwrap_or_else(|_| Err(LoadError::Panicked(image.clone())));
            let _ = tx.send_blocking(Completion {
                slot,
                ticket,
                result,
            });
        });
    }
}
