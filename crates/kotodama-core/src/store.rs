//! File-backed stores for brand voices, target profiles, and generation history.
//!
//! Layout under `~/.kotodama/`:
//! - `brand_voices/{safe_id}.json`: one pretty-printed `BrandVoice` per file
//! - `profiles/{safe_id}.json`: one pretty-printed `UserProfile` per file
//! - `history.jsonl`: one `GeneratedTweet` per line, oldest first

use std::io::{BufRead, Write};
use std::marker::PhantomData;
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::types::{BrandVoice, GeneratedTweet, UserProfile};
use crate::utils;

// ─────────────────────────────────────────────
// Store traits
// ─────────────────────────────────────────────

/// Supplies brand voices by id. Read-only from the generation layer.
pub trait BrandVoiceStore: Send + Sync {
    fn get_voice(&self, id: &str) -> std::io::Result<Option<BrandVoice>>;
    fn save_voice(&self, voice: &BrandVoice) -> std::io::Result<()>;
    fn list_voices(&self) -> std::io::Result<Vec<BrandVoice>>;
    fn delete_voice(&self, id: &str) -> std::io::Result<bool>;
}

/// Supplies target profiles by id; the analyzer writes back through it.
pub trait ProfileStore: Send + Sync {
    fn get_profile(&self, id: &str) -> std::io::Result<Option<UserProfile>>;
    fn save_profile(&self, profile: &UserProfile) -> std::io::Result<()>;
    fn list_profiles(&self) -> std::io::Result<Vec<UserProfile>>;
}

/// Something with a stable string id.
pub trait Record: Serialize + DeserializeOwned {
    fn record_id(&self) -> &str;
}

impl Record for BrandVoice {
    fn record_id(&self) -> &str {
        &self.id
    }
}

impl Record for UserProfile {
    fn record_id(&self) -> &str {
        &self.id
    }
}

// ─────────────────────────────────────────────
// JsonFileStore
// ─────────────────────────────────────────────

/// One JSON file per record in a directory.
pub struct JsonFileStore<T> {
    dir: PathBuf,
    _marker: PhantomData<fn() -> T>,
}

impl<T> std::fmt::Debug for JsonFileStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonFileStore").field("dir", &self.dir).finish()
    }
}

impl<T: Record> JsonFileStore<T> {
    /// Open (and create) a store rooted at `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> std::io::Result<Self> {
        let dir = dir.into();
        std::fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            _marker: PhantomData,
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{}.json", utils::safe_filename(id)))
    }

    pub fn get(&self, id: &str) -> std::io::Result<Option<T>> {
        let path = self.path_for(id);
        if !path.exists() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)?;
        let record = serde_json::from_str(&content)
            .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
        Ok(Some(record))
    }

    pub fn save(&self, record: &T) -> std::io::Result<()> {
        let path = self.path_for(record.record_id());
        let json = serde_json::to_string_pretty(record).map_err(std::io::Error::other)?;
        std::fs::write(&path, json)?;
        debug!(id = record.record_id(), path = %path.display(), "record saved");
        Ok(())
    }

    /// All readable records, sorted by id. Unparseable files are skipped.
    pub fn list(&self) -> std::io::Result<Vec<T>> {
        let mut records = Vec::new();
        for entry in std::fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let parsed = std::fs::read_to_string(&path)
                .map_err(|e| e.to_string())
                .and_then(|c| serde_json::from_str::<T>(&c).map_err(|e| e.to_string()));
            match parsed {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping unreadable record {}: {}", path.display(), e),
            }
        }
        records.sort_by(|a, b| a.record_id().cmp(b.record_id()));
        Ok(records)
    }

    /// Returns `true` if the record existed.
    pub fn delete(&self, id: &str) -> std::io::Result<bool> {
        let path = self.path_for(id);
        if path.exists() {
            std::fs::remove_file(path)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

impl JsonFileStore<BrandVoice> {
    /// Store at `~/.kotodama/brand_voices/`.
    pub fn brand_voices() -> std::io::Result<Self> {
        Self::new(utils::get_brand_voices_path())
    }
}

impl JsonFileStore<UserProfile> {
    /// Store at `~/.kotodama/profiles/`.
    pub fn profiles() -> std::io::Result<Self> {
        Self::new(utils::get_profiles_path())
    }
}

impl BrandVoiceStore for JsonFileStore<BrandVoice> {
    /// Falls back to the built-in default voice for [`BrandVoice::DEFAULT_ID`].
    fn get_voice(&self, id: &str) -> std::io::Result<Option<BrandVoice>> {
        match self.get(id)? {
            Some(voice) => Ok(Some(voice)),
            None if id == BrandVoice::DEFAULT_ID => Ok(Some(BrandVoice::default_voice())),
            None => Ok(None),
        }
    }

    fn save_voice(&self, voice: &BrandVoice) -> std::io::Result<()> {
        let mut voice = voice.clone();
        if self.path_for(&voice.id).exists() {
            voice.updated_at = chrono::Utc::now();
        }
        self.save(&voice)
    }

    fn list_voices(&self) -> std::io::Result<Vec<BrandVoice>> {
        self.list()
    }

    fn delete_voice(&self, id: &str) -> std::io::Result<bool> {
        self.delete(id)
    }
}

impl ProfileStore for JsonFileStore<UserProfile> {
    fn get_profile(&self, id: &str) -> std::io::Result<Option<UserProfile>> {
        self.get(id)
    }

    fn save_profile(&self, profile: &UserProfile) -> std::io::Result<()> {
        self.save(profile)
    }

    fn list_profiles(&self) -> std::io::Result<Vec<UserProfile>> {
        self.list()
    }
}

// ─────────────────────────────────────────────
// HistoryLog
// ─────────────────────────────────────────────

/// Append-only JSONL log of generated posts.
#[derive(Debug)]
pub struct HistoryLog {
    path: PathBuf,
}

impl HistoryLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Log at `~/.kotodama/history.jsonl`.
    pub fn default_location() -> Self {
        Self::new(utils::get_history_path())
    }

    pub fn append(&self, record: &GeneratedTweet) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        let line = serde_json::to_string(record).map_err(std::io::Error::other)?;
        writeln!(file, "{line}")
    }

    /// The last `limit` records, oldest first. Corrupt lines are skipped.
    pub fn recent(&self, limit: usize) -> std::io::Result<Vec<GeneratedTweet>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let file = std::fs::File::open(&self.path)?;
        let mut records = Vec::new();
        for line in std::io::BufReader::new(file).lines() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            match serde_json::from_str::<GeneratedTweet>(&line) {
                Ok(record) => records.push(record),
                Err(e) => warn!("Skipping corrupt history line: {}", e),
            }
        }
        let skip = records.len().saturating_sub(limit);
        Ok(records.split_off(skip))
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────
