#![allow(dead_code)]

use anyhow::{Result, anyhow};
use async_trait::async_trait;
use chrono::Utc;
use std::collections::{BTreeMap, VecDeque};
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use tincan::commands::Prompt;
use tincan::models::FileEntry;
use tincan::services::storage::StorageService;

/// In-memory bucket. Keeps call counts so tests can assert that no request
/// was made.
pub struct MockStorageService {
    bucket: String,
    files: Mutex<BTreeMap<String, Vec<u8>>>,
    fail_delete_of: Mutex<Option<String>>,
    pub calls: AtomicUsize,
    pub deletes: AtomicUsize,
}

impl MockStorageService {
    pub fn new() -> Self {
        Self {
            bucket: "test-bucket".to_string(),
            files: Mutex::new(BTreeMap::new()),
            fail_delete_of: Mutex::new(None),
            calls: AtomicUsize::new(0),
            deletes: AtomicUsize::new(0),
        }
    }

    pub fn with_files(files: &[(&str, &[u8])]) -> Self {
        let mock = Self::new();
        {
            let mut stored = mock.files.lock().unwrap();
            for (key, data) in files {
                stored.insert(key.to_string(), data.to_vec());
            }
        }
        mock
    }

    /// Makes `delete` fail for `key`.
    pub fn fail_delete_of(&self, key: &str) {
        *self.fail_delete_of.lock().unwrap() = Some(key.to_string());
    }

    pub fn contains(&self, key: &str) -> bool {
        self.files.lock().unwrap().contains_key(key)
    }

    pub fn content(&self, key: &str) -> Option<Vec<u8>> {
        self.files.lock().unwrap().get(key).cloned()
    }

    pub fn len(&self) -> usize {
        self.files.lock().unwrap().len()
    }

    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    fn record(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl StorageService for MockStorageService {
    fn bucket(&self) -> &str {
        &self.bucket
    }

    async fn put(&self, local_path: &Path, key: &str) -> Result<()> {
        self.record();
        let data = tokio::fs::read(local_path).await?;
        self.files.lock().unwrap().insert(key.to_string(), data);
        Ok(())
    }

    async fn get(&self, key: &str, local_path: &Path) -> Result<()> {
        self.record();
        let data = self
            .files
            .lock()
            .unwrap()
            .get(key)
            .cloned()
            .ok_or_else(|| anyhow!("NoSuchKey: {}", key))?;
        tokio::fs::write(local_path, data).await?;
        Ok(())
    }

    async fn list_all(&self) -> Result<Vec<FileEntry>> {
        self.record();
        let files = self
            .files
            .lock()
            .unwrap()
            .iter()
            .map(|(key, data)| FileEntry {
                name: key.clone(),
                size: data.len() as i64,
                last_modified: Some(Utc::now()),
            })
            .collect();
        Ok(files)
    }

    async fn delete(&self, key: &str) -> Result<()> {
        self.record();
        if self.fail_delete_of.lock().unwrap().as_deref() == Some(key) {
            return Err(anyhow!("AccessDenied"));
        }
        self.deletes.fetch_add(1, Ordering::SeqCst);
        self.files.lock().unwrap().remove(key);
        Ok(())
    }
}

/// Answers confirmations from a script and records the questions.
pub struct ScriptedPrompt {
    answers: VecDeque<bool>,
    pub questions: Vec<String>,
}

impl ScriptedPrompt {
    pub fn answering(answers: &[bool]) -> Self {
        Self {
            answers: answers.iter().copied().collect(),
            questions: Vec::new(),
        }
    }
}

impl Prompt for ScriptedPrompt {
    fn confirm(&mut self, question: &str) -> Result<bool> {
        self.questions.push(question.to_string());
        self.answers
            .pop_front()
            .ok_or_else(|| anyhow!("unexpected prompt: {}", question))
    }
}

pub fn output_text(out: Vec<u8>) -> String {
    String::from_utf8(out).unwrap()
}
