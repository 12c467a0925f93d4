//! Chat history saved between `astroguide chat` sessions

use crate::client::Conversation;
use anyhow::Context;
use std::path::{Path, PathBuf};

/// File name used under `~/.astroguide/`
pub const HISTORY_FILE_NAME: &str = "chat_history.json";

/// `$HOME/.astroguide/chat_history.json`, or the working directory without `HOME`
pub fn default_history_path() -> PathBuf {
    let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
    PathBuf::from(home).join(".astroguide").join(HISTORY_FILE_NAME)
}

/// JSON file holding the turns of the interactive session
#[derive(Debug, Clone)]
pub struct HistoryFile {
    path: PathBuf,
}

impl HistoryFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Saved conversation, or an empty one when nothing was saved yet
    pub fn load(&self) -> anyhow::Result<Conversation> {
        if !self.path.exists() {
            return Ok(Conversation::default());
        }

        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("reading {}", self.path.display()))?;
        serde_json::from_str(&content)
            .with_context(|| format!("parsing {}", self.path.display()))
    }

    pub fn save(&self, conversation: &Conversation) -> anyhow::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("creating {}", parent.display()))?;
        }

        let content = serde_json::to_string_pretty(conversation)?;
        std::fs::write(&self.path, content)
            .with_context(|| format!("writing {}", self.path.display()))
    }

    /// Delete the saved conversation
    pub fn remove(&self) -> anyhow::Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e).with_context(|| format!("removing {}", self.path.display())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use astro_core::ChatRole;
    use tempfile::tempdir;

    #[test]
    fn test_history_survives_restart() {
        let dir = tempdir().unwrap();
        let file = HistoryFile::new(dir.path().join("nested").join(HISTORY_FILE_NAME));

        let mut conversation = Conversation::default();
        conversation.record("What is Europa?", "A moon of Jupiter.");
        file.save(&conversation).unwrap();

        let restored = file.load().unwrap();
        assert_eq!(restored.len(), 2);

        let request = restored.request("Does it have an ocean?", "beginner");
        assert_eq!(request.history[0].role, ChatRole::User);
        assert_eq!(request.history[0].content, "What is Europa?");
        assert_eq!(request.history[1].role, ChatRole::Assistant);
        assert_eq!(request.history[1].content, "A moon of Jupiter.");
    }

    #[test]
    fn test_saved_as_turn_array() {
        let dir = tempdir().unwrap();
        let file = HistoryFile::new(dir.path().join(HISTORY_FILE_NAME));

        let mut conversation = Conversation::default();
        conversation.record("Hi", "Hello, ask me about space.");
        file.save(&conversation).unwrap();

        let raw: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(file.path()).unwrap()).unwrap();
        assert_eq!(
            raw,
            serde_json::json!([
                {"role": "user", "content": "Hi"},
                {"role": "assistant", "content": "Hello, ask me about space."}
            ])
        );
    }

    #[test]
    fn test_missing_file_loads_empty() {
        let dir = tempdir().unwrap();
        let file = HistoryFile::new(dir.path().join(HISTORY_FILE_NAME));

        assert_eq!(file.load().unwrap().len(), 0);
        assert!(file.remove().is_ok());
    }

    #[test]
    fn test_remove_deletes_saved_history() {
        let dir = tempdir().unwrap();
        let file = HistoryFile::new(dir.path().join(HISTORY_FILE_NAME));

        let mut conversation = Conversation::default();
        conversation.record("q", "a");
        file.save(&conversation).unwrap();
        assert!(file.path().exists());

        file.remove().unwrap();
        assert!(!file.path().exists());
        assert_eq!(file.load().unwrap().len(), 0);
    }

    #[test]
    fn test_corrupt_file_is_an_error() {
        let dir = tempdir().unwrap();
        let file = HistoryFile::new(dir.path().join(HISTORY_FILE_NAME));
        std::fs::write(file.path(), "not json").unwrap();

        assert!(file.load().is_err());
    }
}
