//! Scripted collaborators for pipeline tests.

use std::collections::VecDeque;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use futures::StreamExt;
use vibe_auth::{AuthError, TokenProvider};
use vibe_core::{HubUrl, PublishMetadata};
use vibe_hub::{
    ActionResponse, ConversionEvent, ConversionStatus, ConversionStream, FromUrlRequest,
    FromUrlResponse, HubApi, HubError, HubSession, UploadFile, UploadResponse, VibeInfo,
};

use crate::archive::{Archive, Archiver};
use crate::error::PublishError;

/// How `conversion_events` behaves.
pub enum StreamScript {
    /// Opening the stream fails.
    Refused,
    /// Yield these items, then end.
    Items(Vec<Result<ConversionEvent, HubError>>),
    /// Never yield anything.
    Hang,
}

/// Hub fake. Every call is appended to `calls` in order.
pub struct FakeHub {
    pub calls: Mutex<Vec<String>>,
    pub upload_dids: Mutex<Vec<Option<String>>>,
    pub upload_names: Mutex<Vec<String>>,
    pub from_url_requests: Mutex<Vec<serde_json::Value>>,
    pub published_metadata: Mutex<Vec<PublishMetadata>>,
    pub did: String,
    pub upload_status: String,
    pub stream: Mutex<Option<StreamScript>>,
    pub polls: Mutex<VecDeque<Result<ConversionStatus, HubError>>>,
    pub action: Mutex<ActionResponse>,
    pub owner: String,
}

impl Default for FakeHub {
    fn default() -> Self {
        Self {
            calls: Mutex::default(),
            upload_dids: Mutex::default(),
            upload_names: Mutex::default(),
            from_url_requests: Mutex::default(),
            published_metadata: Mutex::default(),
            did: "d1".into(),
            upload_status: "COMPLETED".into(),
            stream: Mutex::new(Some(StreamScript::Items(vec![Ok(ConversionEvent::Completed)]))),
            polls: Mutex::default(),
            action: Mutex::new(ActionResponse {
                success: true,
                error: None,
            }),
            owner: "u1".into(),
        }
    }
}

impl FakeHub {
    pub fn pending() -> Self {
        Self {
            upload_status: "PENDING".into(),
            ..Self::default()
        }
    }

    pub fn with_stream(self, script: StreamScript) -> Self {
        *self.stream.lock().unwrap() = Some(script);
        self
    }

    pub fn with_polls(self, statuses: &[&str]) -> Self {
        let polls = statuses
            .iter()
            .map(|s| {
                Ok(ConversionStatus {
                    status: (*s).to_string(),
                    message: None,
                })
            })
            .collect();
        *self.polls.lock().unwrap() = polls;
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn count(&self, name: &str) -> usize {
        self.calls().iter().filter(|c| *c == name).count()
    }

    fn log(&self, name: &str) {
        self.calls.lock().unwrap().push(name.to_string());
    }
}

#[async_trait]
impl HubApi for FakeHub {
    async fn upload(
        &self,
        _session: &HubSession,
        file: &UploadFile,
        did: Option<&str>,
    ) -> Result<UploadResponse, HubError> {
        self.log("upload");
        assert!(file.path.exists(), "upload file must exist while uploading");
        self.upload_dids.lock().unwrap().push(did.map(str::to_string));
        self.upload_names.lock().unwrap().push(file.file_name.clone());
        Ok(UploadResponse {
            did: did.map_or_else(|| self.did.clone(), str::to_string),
            status: self.upload_status.clone(),
        })
    }

    async fn create_from_url(
        &self,
        _session: &HubSession,
        request: &FromUrlRequest,
    ) -> Result<FromUrlResponse, HubError> {
        self.log("from_url");
        self.from_url_requests
            .lock()
            .unwrap()
            .push(serde_json::to_value(request).unwrap());
        Ok(FromUrlResponse {
            did: self.did.clone(),
        })
    }

    async fn conversion_events(
        &self,
        _session: &HubSession,
        _did: &str,
    ) -> Result<ConversionStream, HubError> {
        self.log("stream");
        match self.stream.lock().unwrap().take() {
            None | Some(StreamScript::Refused) => {
                Err(HubError::Stream("connection refused".into()))
            }
            Some(StreamScript::Items(items)) => Ok(futures::stream::iter(items).boxed()),
            Some(StreamScript::Hang) => Ok(futures::stream::pending().boxed()),
        }
    }

    async fn conversion_status(
        &self,
        _session: &HubSession,
        _did: &str,
    ) -> Result<ConversionStatus, HubError> {
        self.log("poll");
        self.polls.lock().unwrap().pop_front().unwrap_or_else(|| {
            Ok(ConversionStatus {
                status: "PENDING".into(),
                message: None,
            })
        })
    }

    async fn publish(
        &self,
        _session: &HubSession,
        _did: &str,
        metadata: &PublishMetadata,
    ) -> Result<ActionResponse, HubError> {
        self.log("publish");
        self.published_metadata.lock().unwrap().push(metadata.clone());
        Ok(self.action.lock().unwrap().clone())
    }

    async fn vibe_info(&self, _session: &HubSession, _did: &str) -> Result<VibeInfo, HubError> {
        self.log("info");
        Ok(VibeInfo {
            user_did: self.owner.clone(),
            url: None,
        })
    }
}

#[derive(Default)]
pub struct FakeAuth {
    pub calls: AtomicUsize,
}

#[async_trait]
impl TokenProvider for FakeAuth {
    async fn access_token(&self, _hub: &HubUrl) -> Result<String, AuthError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok("token".into())
    }
}

/// Writes a dummy archive of `size` bytes and counts releases.
pub struct CountingArchiver {
    pub archived: AtomicUsize,
    pub released: Arc<AtomicUsize>,
    size: usize,
    staging: tempfile::TempDir,
}

impl CountingArchiver {
    pub fn new(size: usize) -> Self {
        Self {
            archived: AtomicUsize::new(0),
            released: Arc::new(AtomicUsize::new(0)),
            size,
            staging: tempfile::TempDir::new().unwrap(),
        }
    }

    pub fn released(&self) -> usize {
        self.released.load(Ordering::SeqCst)
    }
}

impl Archiver for CountingArchiver {
    fn archive(&self, _dir: &Path) -> Result<Archive, PublishError> {
        let n = self.archived.fetch_add(1, Ordering::SeqCst);
        let path = self.staging.path().join(format!("archive-{n}.zip"));
        std::fs::write(&path, vec![0u8; self.size]).map_err(|e| PublishError::Archive(e.to_string()))?;
        let released = Arc::clone(&self.released);
        let cleanup = path.clone();
        Ok(Archive::new(path, move || {
            released.fetch_add(1, Ordering::SeqCst);
            let _ = std::fs::remove_file(cleanup);
        }))
    }
}
