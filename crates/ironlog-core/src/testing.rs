//! In-memory port implementations for unit tests.

use std::collections::BTreeMap;
use std::future::Future;
use std::hash::{DefaultHasher, Hash, Hasher};
use std::io;
use std::path::{Path, PathBuf};
use std::pin::Pin;
use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use ironlog_types::error::RepositoryError;
use ironlog_types::memory::{JournalMemoryEntry, RankedExcerpt};

use proptest::prelude::*;

use crate::memory::embedder::Embedder;
use crate::memory::trigger::IndexTrigger;
use crate::memory::vector::JournalVectorStore;
use crate::service::fs::FileSystem;
use crate::service::hash::ContentHasher;

fn not_found(path: &Path) -> io::Error {
    io::Error::new(io::ErrorKind::NotFound, path.display().to_string())
}

/// Filesystem held in a map. Every write advances a logical clock that
/// serves as the modification time, so two writes never share an mtime.
#[derive(Default)]
pub struct InMemoryFileSystem {
    state: Mutex<MemoryFsState>,
}

#[derive(Default)]
struct MemoryFsState {
    files: BTreeMap<PathBuf, (String, i64)>,
    clock: i64,
}

impl InMemoryFileSystem {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contents(&self, path: &Path) -> Option<String> {
        let state = self.state.lock().unwrap();
        state.files.get(path).map(|(content, _)| content.clone())
    }

    pub fn put(&self, path: &Path, content: &str) {
        let mut state = self.state.lock().unwrap();
        state.clock += 1;
        let mtime = state.clock;
        state
            .files
            .insert(path.to_path_buf(), (content.to_string(), mtime));
    }
}

impl FileSystem for InMemoryFileSystem {
    async fn write_file(&self, path: &Path, content: &str) -> Result<(), io::Error> {
        self.put(path, content);
        Ok(())
    }

    async fn append_file(&self, path: &Path, content: &str) -> Result<(), io::Error> {
        let mut state = self.state.lock().unwrap();
        state.clock += 1;
        let mtime = state.clock;
        let entry = state.files.get_mut(path).ok_or_else(|| not_found(path))?;
        entry.0.push_str(content);
        entry.1 = mtime;
        Ok(())
    }

    async fn read_file(&self, path: &Path) -> Result<String, io::Error> {
        self.contents(path).ok_or_else(|| not_found(path))
    }

    async fn create_dir_all(&self, _path: &Path) -> Result<(), io::Error> {
        Ok(())
    }

    async fn exists(&self, path: &Path) -> bool {
        let state = self.state.lock().unwrap();
        state.files.contains_key(path) || state.files.keys().any(|p| p.starts_with(path))
    }

    async fn remove_file(&self, path: &Path) -> Result<(), io::Error> {
        let mut state = self.state.lock().unwrap();
        state
            .files
            .remove(path)
            .map(|_| ())
            .ok_or_else(|| not_found(path))
    }

    async fn modified_millis(&self, path: &Path) -> Result<i64, io::Error> {
        let state = self.state.lock().unwrap();
        state
            .files
            .get(path)
            .map(|(_, mtime)| *mtime)
            .ok_or_else(|| not_found(path))
    }

    async fn list_dir(&self, path: &Path) -> Result<Vec<PathBuf>, io::Error> {
        let state = self.state.lock().unwrap();
        Ok(state
            .files
            .keys()
            .filter(|p| p.parent() == Some(path))
            .cloned()
            .collect())
    }
}

/// Deterministic, non-cryptographic hasher.
pub struct TestHasher;

impl ContentHasher for TestHasher {
    fn compute_hash(&self, content: &str) -> String {
        let mut hasher = DefaultHasher::new();
        content.hash(&mut hasher);
        format!("{:016x}", hasher.finish())
    }
}

/// Embedder that records every batch and returns bag-of-letters vectors,
/// so texts sharing letters score as similar.
#[derive(Default)]
pub struct RecordingEmbedder {
    batches: Mutex<Vec<Vec<String>>>,
    fail: AtomicBool,
    calls: AtomicUsize,
}

pub const TEST_DIMENSION: usize = 26;

impl RecordingEmbedder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn batches(&self) -> Vec<Vec<String>> {
        self.batches.lock().unwrap().clone()
    }

    pub fn vector_for(text: &str) -> Vec<f32> {
        let mut v = vec![0.0_f32; TEST_DIMENSION];
        for c in text.to_ascii_lowercase().chars() {
            if c.is_ascii_lowercase() {
                v[(c as u8 - b'a') as usize] += 1.0;
            }
        }
        v
    }
}

impl Embedder for RecordingEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RepositoryError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.fail.load(Ordering::SeqCst) {
            return Err(RepositoryError::Query("embedding service offline".to_string()));
        }
        self.batches.lock().unwrap().push(texts.to_vec());
        Ok(texts.iter().map(|t| Self::vector_for(t)).collect())
    }

    fn model_name(&self) -> &str {
        "test-letters"
    }

    fn dimension(&self) -> usize {
        TEST_DIMENSION
    }
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let dot: f32 = a.iter().zip(b).map(|(x, y)| x * y).sum();
    let na = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let nb = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if na == 0.0 || nb == 0.0 {
        0.0
    } else {
        dot / (na * nb)
    }
}

/// Vector store backed by a map, with exact cosine search.
#[derive(Default)]
pub struct InMemoryVectorStore {
    entries: Mutex<BTreeMap<String, (JournalMemoryEntry, Vec<f32>)>>,
    deleted: Mutex<Vec<String>>,
    fail_search: AtomicBool,
}

impl InMemoryVectorStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ids(&self) -> Vec<String> {
        self.entries.lock().unwrap().keys().cloned().collect()
    }

    pub fn text_of(&self, id: &str) -> Option<String> {
        self.entries
            .lock()
            .unwrap()
            .get(id)
            .map(|(entry, _)| entry.text.clone())
    }

    /// Ids passed to `delete_ids`, in call order.
    pub fn deleted_ids(&self) -> Vec<String> {
        self.deleted.lock().unwrap().clone()
    }

    pub fn set_search_failing(&self, fail: bool) {
        self.fail_search.store(fail, Ordering::SeqCst);
    }
}

impl JournalVectorStore for InMemoryVectorStore {
    async fn upsert(
        &self,
        entries: &[JournalMemoryEntry],
        embeddings: &[Vec<f32>],
    ) -> Result<(), RepositoryError> {
        let mut map = self.entries.lock().unwrap();
        for (entry, embedding) in entries.iter().zip(embeddings) {
            map.insert(entry.id.clone(), (entry.clone(), embedding.clone()));
        }
        Ok(())
    }

    async fn delete_ids(&self, ids: &[String]) -> Result<(), RepositoryError> {
        let mut map = self.entries.lock().unwrap();
        for id in ids {
            map.remove(id);
        }
        self.deleted.lock().unwrap().extend(ids.iter().cloned());
        Ok(())
    }

    async fn delete_campaign(&self, campaign_id: &str) -> Result<u64, RepositoryError> {
        let mut map = self.entries.lock().unwrap();
        let before = map.len();
        map.retain(|_, (entry, _)| entry.campaign_id != campaign_id);
        Ok((before - map.len()) as u64)
    }

    async fn search(
        &self,
        campaign_id: &str,
        query_embedding: &[f32],
        limit: usize,
        min_score: f32,
    ) -> Result<Vec<RankedExcerpt>, RepositoryError> {
        if self.fail_search.load(Ordering::SeqCst) {
            return Err(RepositoryError::Connection);
        }
        let map = self.entries.lock().unwrap();
        let mut hits: Vec<RankedExcerpt> = map
            .values()
            .filter(|(entry, _)| entry.campaign_id == campaign_id)
            .map(|(entry, embedding)| RankedExcerpt {
                entry: entry.clone(),
                score: cosine(query_embedding, embedding),
            })
            .filter(|hit| hit.score >= min_score)
            .collect();
        hits.sort_by(|a, b| b.score.total_cmp(&a.score));
        hits.truncate(limit);
        Ok(hits)
    }

    async fn count(&self, campaign_id: &str) -> Result<u64, RepositoryError> {
        let map = self.entries.lock().unwrap();
        Ok(map
            .values()
            .filter(|(entry, _)| entry.campaign_id == campaign_id)
            .count() as u64)
    }
}

/// Trigger that records requests instead of acting on them.
#[derive(Default)]
pub struct RecordingTrigger {
    events: Mutex<Vec<String>>,
}

impl RecordingTrigger {
    pub fn events(&self) -> Vec<String> {
        self.events.lock().unwrap().clone()
    }
}

impl IndexTrigger for RecordingTrigger {
    fn request_index(&self, campaign_id: &str) {
        self.events.lock().unwrap().push(format!("request:{campaign_id}"));
    }

    fn warm_index(&self, campaign_id: &str) {
        self.events.lock().unwrap().push(format!("warm:{campaign_id}"));
    }

    fn forget_campaign<'a>(
        &'a self,
        campaign_id: &'a str,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        self.events.lock().unwrap().push(format!("forget:{campaign_id}"));
        Box::pin(std::future::ready(()))
    }
}

/// Narrative sections built from the line shapes the block parser
/// distinguishes, including stray and unterminated player tags.
pub fn arb_narrative_section() -> impl Strategy<Value = String> {
    let line = prop_oneof![
        Just(""),
        Just("<player>"),
        Just("</player>"),
        Just("> **Face Danger** (+edge): Weak Hit"),
        Just("> A quoted line of prose"),
        Just("Rain drums on the ridge."),
    ];
    prop::collection::vec(line, 0..40).prop_map(|lines| lines.join("\n"))
}
