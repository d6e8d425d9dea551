//! # Scene file watching
//!
//! Watches the directory holding a scene file (editors often replace the
//! file rather than writing it in place) and re-runs `check` whenever an
//! event touches the file. Load and query errors are logged and the watch
//! continues, so a half-edited file does not end the session.

use std::io;
use std::path::Path;
use std::sync::mpsc;

use anyhow::{anyhow, Result};
use notify::{Event, RecursiveMode, Watcher as NotifyWatcher};
use proxima::report;
use scene::SceneFile;
use tracing::{error, info};

/// Blocks until the watcher shuts down.
pub fn run(scene_path: &Path, no_self: bool) -> Result<()> {
    let (tx, rx) = mpsc::channel::<notify::Result<Event>>();
    let mut watcher =
        notify::recommended_watcher(tx).map_err(|e| anyhow!("Failed to create file watcher: {e}"))?;

    let directory = match scene_path.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };
    watcher
        .watch(directory, RecursiveMode::NonRecursive)
        .map_err(|e| anyhow!("Failed to watch {}: {e}", directory.display()))?;
    info!("Watching {}", scene_path.display());

    recheck(scene_path, no_self);
    for result in rx {
        match result {
            Ok(event) if touches(&event, scene_path) => recheck(scene_path, no_self),
            Ok(_) => {}
            Err(e) => error!("File watcher error: {e:?}"),
        }
    }
    Ok(())
}

fn touches(event: &Event, scene_path: &Path) -> bool {
    if !event.kind.is_modify() && !event.kind.is_create() {
        return false;
    }
    event
        .paths
        .iter()
        .any(|path| path.file_name() == scene_path.file_name())
}

fn recheck(scene_path: &Path, no_self: bool) {
    let outcome = SceneFile::load(scene_path)
        .and_then(SceneFile::into_scene)
        .and_then(|mut scene| {
            let self_collision = report::self_collision(&scene, no_self);
            report::check(&mut scene, self_collision, &mut io::stdout().lock())
        });
    match outcome {
        Ok(valid) => info!(valid, "Scene re-checked"),
        Err(e) => error!("Scene check failed: {e:#}"),
    }
}
