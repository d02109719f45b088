//! Notify-based file watcher for font asset hot-reload
//!
//! Feeds changed paths back to the asset server, which reloads the fonts
//! depending on them (description files, face files, sprite sheets alike).

use ember_asset::FileWatcher;
use notify::{Event, EventKind, RecursiveMode, Watcher};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

/// Debounced filesystem watcher
pub struct NotifyWatcher {
    watcher: notify::RecommendedWatcher,
    rx: crossbeam_channel::Receiver<notify::Result<Event>>,
    /// Suppresses the duplicate events editors emit per save
    debounce: HashMap<PathBuf, Instant>,
    debounce_duration: Duration,
}

impl NotifyWatcher {
    /// Create a watcher; call `watch` to add directories
    pub fn new() -> Result<Self, String> {
        let (tx, rx) = crossbeam_channel::unbounded();

        let watcher = notify::recommended_watcher(move |res| {
            let _ = tx.send(res);
        })
        .map_err(|e| format!("Failed to create file watcher: {}", e))?;

        Ok(Self {
            watcher,
            rx,
            debounce: HashMap::new(),
            debounce_duration: Duration::from_millis(100),
        })
    }

    fn accept(&mut self, path: &Path) -> bool {
        let now = Instant::now();
        match self.debounce.get(path) {
            Some(last) if now.duration_since(*last) < self.debounce_duration => false,
            _ => {
                self.debounce.insert(path.to_path_buf(), now);
                true
            }
        }
    }
}

impl FileWatcher for NotifyWatcher {
    fn watch(&mut self, path: &str) -> bool {
        match self.watcher.watch(Path::new(path), RecursiveMode::Recursive) {
            Ok(()) => true,
            Err(e) => {
                log::warn!("Failed to watch {}: {}", path, e);
                false
            }
        }
    }

    fn unwatch(&mut self, path: &str) -> bool {
        self.watcher.unwatch(Path::new(path)).is_ok()
    }

    fn poll(&mut self) -> Vec<String> {
        let mut changed = Vec::new();

        while let Ok(event) = self.rx.try_recv() {
            let event = match event {
                Ok(e) => e,
                Err(e) => {
                    log::warn!("File watcher error: {}", e);
                    continue;
                }
            };

            if !matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_)) {
                continue;
            }

            for path in event.paths {
                if self.accept(&path) {
                    changed.push(path.to_string_lossy().into_owned());
                }
            }
        }

        changed
    }
}
