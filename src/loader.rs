// SPDX-License-Identifier: MIT
// SPDX-FileCopyrightText: 2025 Huang Rui <vowstar@gmail.com>

//! Background loading of board records and schematic bitmaps.
//!
//! Work runs on a spawned thread and reports back over an `mpsc` channel that
//! the owner polls once per frame. Every job carries a [`CancelToken`];
//! starting a new job cancels the previous one and its result is never
//! delivered, even when it completes.

use image::RgbaImage;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use crate::compose::create_scaled_thumbnail;
use crate::data::{BoardData, BoardKey, BoardSource, SchematicRecord};
use crate::error::{Result, ViewerError};

#[derive(Debug, Clone, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }

    /// `Err(Interrupted)` once cancelled, for use with `?` inside jobs.
    pub fn check(&self) -> Result<()> {
        if self.is_cancelled() {
            Err(ViewerError::Interrupted)
        } else {
            Ok(())
        }
    }
}

/// Decodes an image file into RGBA8.
pub fn decode_image(path: &Path) -> Result<RgbaImage> {
    let image = image::open(path).map_err(|source| ViewerError::Image {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgba8())
}

/// One schematic with its pre-scaled thumbnail.
#[derive(Debug, Clone)]
pub struct DecodedSchematic {
    pub record: SchematicRecord,
    pub image_path: PathBuf,
    /// `None` when the image could not be decoded.
    pub thumbnail: Option<RgbaImage>,
    /// Full-resolution pixel size, `(0, 0)` when unknown.
    pub original_size: (u32, u32),
}

#[derive(Debug, Clone)]
pub struct LoadedBoard {
    pub key: BoardKey,
    pub data: BoardData,
    pub schematics: Vec<DecodedSchematic>,
}

/// A decoded full-resolution schematic bitmap.
#[derive(Debug, Clone)]
pub struct FullResImage {
    pub name: String,
    pub image: RgbaImage,
}

/// Loads board records and decodes every schematic thumbnail.
///
/// A schematic whose image fails to decode is kept without a bitmap; its
/// siblings still load.
pub fn load_board(
    source: &dyn BoardSource,
    key: &BoardKey,
    thumbnail_max_width: u32,
    token: &CancelToken,
) -> Result<LoadedBoard> {
    let data = source.load_board(key)?;
    let mut schematics = Vec::with_capacity(data.schematics.len());

    for record in &data.schematics {
        token.check()?;

        let image_path = source.resolve_image(key, &record.image_file);
        let (thumbnail, original_size) = if record.image_file.trim().is_empty() {
            log::warn!("[WARN] Schematic {} has no image file", record.name);
            (None, (0, 0))
        } else {
            match decode_image(&image_path) {
                Ok(full) => {
                    let size = full.dimensions();
                    (Some(create_scaled_thumbnail(&full, thumbnail_max_width)), size)
                }
                Err(e) => {
                    log::warn!("[WARN] {e}");
                    (None, (0, 0))
                }
            }
        };

        schematics.push(DecodedSchematic {
            record: record.clone(),
            image_path,
            thumbnail,
            original_size,
        });
    }

    Ok(LoadedBoard {
        key: key.clone(),
        data,
        schematics,
    })
}

/// Decodes one full-resolution schematic.
pub fn load_full_res(name: &str, path: &Path, token: &CancelToken) -> Result<FullResImage> {
    token.check()?;
    log::info!("[LOAD] Decoding schematic {name}: {}", path.display());
    let image = decode_image(path)?;
    token.check()?;
    Ok(FullResImage {
        name: name.to_string(),
        image,
    })
}

struct PendingJob<T> {
    generation: u64,
    token: CancelToken,
    receiver: mpsc::Receiver<(u64, Result<T>)>,
    started: Instant,
}

/// Runs at most one job of a kind at a time; newer jobs supersede older ones.
pub struct BackgroundLoader<T> {
    name: &'static str,
    generation: u64,
    pending: Option<PendingJob<T>>,
}

impl<T: Send + 'static> BackgroundLoader<T> {
    pub fn new(name: &'static str) -> Self {
        Self {
            name,
            generation: 0,
            pending: None,
        }
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn is_loading(&self) -> bool {
        self.pending.is_some()
    }

    /// Cancels the running job, if any, and starts `job` on a new thread.
    pub fn start<F>(&mut self, job: F)
    where
        F: FnOnce(&CancelToken) -> Result<T> + Send + 'static,
    {
        self.cancel();
        self.generation += 1;

        let generation = self.generation;
        let token = CancelToken::new();
        let (tx, rx) = mpsc::channel();

        let worker_token = token.clone();
        thread::spawn(move || {
            let result = job(&worker_token);
            if !worker_token.is_cancelled() {
                let _ = tx.send((generation, result));
            }
        });

        self.pending = Some(PendingJob {
            generation,
            token,
            receiver: rx,
            started: Instant::now(),
        });
    }

    /// Cancels the running job. Its result, if it still arrives, is dropped.
    pub fn cancel(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.token.cancel();
            log::debug!(
                "Cancelled {} load #{} after {:?}",
                self.name,
                pending.generation,
                pending.started.elapsed()
            );
        }
    }

    /// Non-blocking poll. `Some` exactly once per job that was not superseded.
    pub fn try_recv(&mut self) -> Option<Result<T>> {
        let pending = self.pending.as_ref()?;
        match pending.receiver.try_recv() {
            Ok(message) => self.accept(message),
            Err(mpsc::TryRecvError::Empty) => None,
            Err(mpsc::TryRecvError::Disconnected) => self.interrupted(),
        }
    }

    /// Blocking poll with a timeout.
    pub fn wait(&mut self, timeout: Duration) -> Option<Result<T>> {
        let pending = self.pending.as_ref()?;
        match pending.receiver.recv_timeout(timeout) {
            Ok(message) => self.accept(message),
            Err(mpsc::RecvTimeoutError::Timeout) => None,
            Err(mpsc::RecvTimeoutError::Disconnected) => self.interrupted(),
        }
    }

    fn accept(&mut self, (generation, result): (u64, Result<T>)) -> Option<Result<T>> {
        let pending = self.pending.take()?;
        if generation != self.generation || pending.token.is_cancelled() {
            log::debug!("Dropped stale {} load #{generation}", self.name);
            return None;
        }
        Some(result)
    }

    fn interrupted(&mut self) -> Option<Result<T>> {
        self.pending.take()?;
        Some(Err(ViewerError::Interrupted))
    }
}

impl<T> Drop for BackgroundLoader<T> {
    fn drop(&mut self) {
        if let Some(pending) = self.pending.take() {
            pending.token.cancel();
        }
    }
}
