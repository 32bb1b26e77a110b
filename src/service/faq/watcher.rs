//! Hot-reload of the FAQ file.
//!
//! Uses the `notify` crate to watch the directory containing the FAQ file
//! (editors often replace a file instead of writing it in place), and
//! reloads the [`FaqStore`] whenever an event touches the file.

use std::path::{Path, PathBuf};

use anyhow::Context;
use notify::{Config, Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher};
use tracing::{debug, error, info, instrument};

use crate::base::types::Res;

use super::FaqStore;

/// Watches the FAQ file for as long as it is alive.
pub struct FaqWatcher {
    _watcher: RecommendedWatcher,
    path: PathBuf,
}

impl FaqWatcher {
    /// Start watching `path`, reloading `store` on every change.
    #[instrument(name = "FaqWatcher::start", skip(store))]
    pub fn start(path: &Path, store: FaqStore) -> Res<Self> {
        let path = std::path::absolute(path).with_context(|| format!("Failed to resolve FAQ path `{}`", path.display()))?;
        let dir = path.parent().map(Path::to_path_buf).unwrap_or_else(|| PathBuf::from("."));

        let target = path.clone();
        let mut watcher = RecommendedWatcher::new(
            move |res: Result<Event, notify::Error>| match res {
                Ok(event) => handle_event(&event, &target, &store),
                Err(e) => error!("FAQ watcher error: {}", e),
            },
            Config::default(),
        )?;

        watcher.watch(&dir, RecursiveMode::NonRecursive)?;

        info!("Watching `{}` for FAQ changes.", path.display());

        Ok(Self { _watcher: watcher, path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Drop for FaqWatcher {
    fn drop(&mut self) {
        debug!("Stopped watching `{}`.", self.path.display());
    }
}

/// Whether `event` should trigger a reload of `target`.
fn is_relevant(event: &Event, target: &Path) -> bool {
    let changed = matches!(event.kind, EventKind::Create(_) | EventKind::Modify(_));

    changed && event.paths.iter().any(|p| p.file_name() == target.file_name())
}

fn handle_event(event: &Event, target: &Path, store: &FaqStore) {
    if !is_relevant(event, target) {
        return;
    }

    // A file mid-write can briefly fail to parse; the next event picks up the final content.
    match store.reload(target) {
        Ok(count) => info!("Reloaded {} FAQ keywords from `{}`.", count, target.display()),
        Err(e) => error!("Keeping the previous FAQ table, reload failed: {:#}", e),
    }
}

#[cfg(test)]
mod tests {
    use notify::event::{AccessKind, CreateKind, ModifyKind};

    use super::*;

    fn event(kind: EventKind, path: &str) -> Event {
        Event::new(kind).add_path(PathBuf::from(path))
    }

    #[test]
    fn only_changes_to_the_faq_file_are_relevant() {
        let target = Path::new("/srv/bot/faq.json");

        assert!(is_relevant(&event(EventKind::Modify(ModifyKind::Any), "/srv/bot/faq.json"), target));
        assert!(is_relevant(&event(EventKind::Create(CreateKind::File), "/srv/bot/faq.json"), target));
        assert!(!is_relevant(&event(EventKind::Modify(ModifyKind::Any), "/srv/bot/other.json"), target));
        assert!(!is_relevant(&event(EventKind::Access(AccessKind::Any), "/srv/bot/faq.json"), target));
    }

    #[test]
    fn relevant_event_reloads_store() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("faq.json");
        std::fs::write(&path, r#"[{"questions": ["deploy"], "answer": "v1"}]"#).unwrap();

        let store = FaqStore::from_file(&path).unwrap();
        std::fs::write(&path, r#"[{"questions": ["deploy"], "answer": "v2"}]"#).unwrap();

        handle_event(&event(EventKind::Modify(ModifyKind::Any), path.to_str().unwrap()), &path, &store);

        assert_eq!(store.current().get("deploy"), Some("v2"));
    }
}
