// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers: mock collaborators and content fixtures.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::Utc;
use folio_core::{
    Checklist, ChecklistItem, ChecklistSection, Content, Flashcard, FlashcardDeck, PracticeGuide,
};

use crate::auth::{AuthProvider, CurrentUser};
use crate::config::SyncConfig;
use crate::library::LibraryStore;
use crate::payload::ContentPublishPayload;
use crate::remote::{
    PublishResponse, RemoteApi, RemoteError, RemoteFuture, SharedContentDetail, UpdateResponse,
};
use crate::service::ContentSyncService;
use crate::storage::Storage;
use crate::visibility::VisibilityService;

/// A call observed by [`MockRemote`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RemoteCall {
    Publish { public_id: String },
    Update { public_id: String },
    Unpublish { public_id: String },
    Fetch { public_id: String },
}

#[derive(Default)]
struct MockRemoteState {
    /// Error returned by every call while set.
    failure: Option<RemoteError>,
    /// Error returned by the next `budget` calls only.
    failure_budget: Option<(RemoteError, usize)>,
    calls: Vec<RemoteCall>,
    /// Payloads received by publish and update calls, in order.
    payloads: Vec<ContentPublishPayload>,
    shared: HashMap<String, SharedContentDetail>,
    delay: Option<Duration>,
}

/// In-memory backend that records calls and answers per its configuration.
#[derive(Default)]
pub struct MockRemote {
    state: Mutex<MockRemoteState>,
}

impl MockRemote {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every subsequent call fail with `err`.
    pub fn fail_with(&self, err: RemoteError) {
        self.state.lock().unwrap().failure = Some(err);
    }

    /// Make only the next `count` calls fail with `err`.
    pub fn fail_next(&self, err: RemoteError, count: usize) {
        self.state.lock().unwrap().failure_budget = Some((err, count));
    }

    /// Make every subsequent call succeed.
    pub fn succeed(&self) {
        let mut state = self.state.lock().unwrap();
        state.failure = None;
        state.failure_budget = None;
    }

    /// Delay every call, to keep passes in flight.
    pub fn set_delay(&self, delay: Duration) {
        self.state.lock().unwrap().delay = Some(delay);
    }

    /// Make a published item available to `fetch_public_content`.
    pub fn add_shared(&self, detail: SharedContentDetail) {
        self.state
            .lock()
            .unwrap()
            .shared
            .insert(detail.public_id.clone(), detail);
    }

    pub fn calls(&self) -> Vec<RemoteCall> {
        self.state.lock().unwrap().calls.clone()
    }

    pub fn payloads(&self) -> Vec<ContentPublishPayload> {
        self.state.lock().unwrap().payloads.clone()
    }

    pub fn last_payload(&self) -> Option<ContentPublishPayload> {
        self.state.lock().unwrap().payloads.last().cloned()
    }

    pub fn publish_calls(&self) -> usize {
        self.calls()
            .iter()
            .filter(|c| matches!(c, RemoteCall::Publish { .. }))
            .count()
    }

    /// Record the call and return the configured delay and failure.
    fn begin(&self, call: RemoteCall) -> (Option<Duration>, Option<RemoteError>) {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        let budgeted = match state.failure_budget.take() {
            Some((err, remaining)) if remaining > 0 => {
                state.failure_budget = Some((err.clone(), remaining - 1));
                Some(err)
            }
            _ => None,
        };
        (state.delay, budgeted.or_else(|| state.failure.clone()))
    }
}

async fn settle(delay: Option<Duration>, failure: Option<RemoteError>) -> Result<(), RemoteError> {
    if let Some(delay) = delay {
        tokio::time::sleep(delay).await;
    }
    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

impl RemoteApi for MockRemote {
    fn publish_content<'a>(
        &'a self,
        payload: &'a ContentPublishPayload,
    ) -> RemoteFuture<'a, PublishResponse> {
        let (delay, failure) = self.begin(RemoteCall::Publish {
            public_id: payload.public_id.clone(),
        });
        self.state.lock().unwrap().payloads.push(payload.clone());
        Box::pin(async move {
            settle(delay, failure).await?;
            Ok(PublishResponse {
                id: format!("srv-{}", payload.public_id),
                public_id: payload.public_id.clone(),
                published_at: Utc::now(),
                author_username: payload.author_username.clone(),
                can_fork: payload.can_fork,
            })
        })
    }

    fn unpublish_content<'a>(&'a self, public_id: &'a str) -> RemoteFuture<'a, ()> {
        let (delay, failure) = self.begin(RemoteCall::Unpublish {
            public_id: public_id.to_string(),
        });
        Box::pin(settle(delay, failure))
    }

    fn update_published_content<'a>(
        &'a self,
        public_id: &'a str,
        payload: &'a ContentPublishPayload,
    ) -> RemoteFuture<'a, UpdateResponse> {
        let (delay, failure) = self.begin(RemoteCall::Update {
            public_id: public_id.to_string(),
        });
        self.state.lock().unwrap().payloads.push(payload.clone());
        Box::pin(async move {
            settle(delay, failure).await?;
            Ok(UpdateResponse {
                id: format!("srv-{public_id}"),
                public_id: public_id.to_string(),
                updated_at: Utc::now(),
            })
        })
    }

    fn fetch_public_content<'a>(
        &'a self,
        public_id: &'a str,
    ) -> RemoteFuture<'a, SharedContentDetail> {
        let (delay, failure) = self.begin(RemoteCall::Fetch {
            public_id: public_id.to_string(),
        });
        let found = self.state.lock().unwrap().shared.get(public_id).cloned();
        Box::pin(async move {
            settle(delay, failure).await?;
            found.ok_or_else(|| RemoteError::Server {
                status: 404,
                message: format!("no shared content '{public_id}'"),
            })
        })
    }
}

/// Auth provider with a switchable signed-in state.
pub struct MockAuth {
    authenticated: AtomicBool,
    loaded: AtomicBool,
    load_calls: AtomicUsize,
    ensure_calls: AtomicUsize,
    user: CurrentUser,
}

impl MockAuth {
    pub fn signed_in(username: &str) -> Self {
        MockAuth {
            authenticated: AtomicBool::new(true),
            loaded: AtomicBool::new(false),
            load_calls: AtomicUsize::new(0),
            ensure_calls: AtomicUsize::new(0),
            user: CurrentUser {
                id: format!("user-{username}"),
                username: username.to_string(),
            },
        }
    }

    pub fn sign_out(&self) {
        self.authenticated.store(false, Ordering::SeqCst);
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }

    /// Calls to `ensure_current_user_loaded`, including ones answered from cache.
    pub fn ensure_calls(&self) -> usize {
        self.ensure_calls.load(Ordering::SeqCst)
    }

    pub fn user_id(&self) -> &str {
        &self.user.id
    }
}

impl AuthProvider for MockAuth {
    fn is_authenticated(&self) -> bool {
        self.authenticated.load(Ordering::SeqCst)
    }

    fn current_user(&self) -> Option<CurrentUser> {
        self.loaded
            .load(Ordering::SeqCst)
            .then(|| self.user.clone())
    }

    fn ensure_current_user_loaded(&self) -> RemoteFuture<'_, CurrentUser> {
        self.ensure_calls.fetch_add(1, Ordering::SeqCst);
        Box::pin(async move {
            if !self.is_authenticated() {
                return Err(RemoteError::Server {
                    status: 401,
                    message: "unauthorized".to_string(),
                });
            }
            if !self.loaded.swap(true, Ordering::SeqCst) {
                self.load_calls.fetch_add(1, Ordering::SeqCst);
            }
            Ok(self.user.clone())
        })
    }
}

/// A fully wired engine over an in-memory store.
pub struct Harness {
    pub storage: Storage,
    pub remote: Arc<MockRemote>,
    pub auth: Arc<MockAuth>,
    pub library: Arc<LibraryStore>,
    pub sync: Arc<ContentSyncService<MockRemote>>,
    pub visibility: VisibilityService<MockRemote, MockAuth>,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_storage(Storage::open_in_memory().unwrap())
    }

    /// Wire a fresh engine (and a fresh library cache) over `storage`.
    pub fn with_storage(storage: Storage) -> Self {
        let remote = Arc::new(MockRemote::new());
        let auth = Arc::new(MockAuth::signed_in("alice"));
        let library = Arc::new(LibraryStore::new(storage.clone()));
        let sync = Arc::new(ContentSyncService::new(
            storage.clone(),
            Arc::clone(&remote),
            &SyncConfig::default(),
        ));
        let visibility =
            VisibilityService::new(Arc::clone(&library), Arc::clone(&sync), Arc::clone(&auth));
        Harness {
            storage,
            remote,
            auth,
            library,
            sync,
            visibility,
        }
    }

    /// Create a valid checklist owned by the signed-in user.
    pub async fn checklist(&self, title: &str) -> String {
        let meta = self
            .library
            .create_checklist(self.auth.user_id(), make_checklist(title, 2), vec![], "en")
            .await
            .unwrap();
        meta.id
    }
}

pub fn make_checklist(title: &str, items: usize) -> Checklist {
    Checklist {
        id: String::new(),
        title: title.to_string(),
        description: format!("{title} description"),
        sections: vec![ChecklistSection {
            id: "section-1".to_string(),
            title: "Steps".to_string(),
            items: (1..=items)
                .map(|n| ChecklistItem {
                    id: format!("item-{n}"),
                    title: format!("Step {n}"),
                    notes: None,
                    is_required: n == 1,
                })
                .collect(),
        }],
    }
}

pub fn make_guide(title: &str, markdown: &str) -> PracticeGuide {
    PracticeGuide {
        id: String::new(),
        title: title.to_string(),
        description: String::new(),
        markdown: markdown.to_string(),
    }
}

pub fn make_deck(title: &str, cards: usize) -> FlashcardDeck {
    FlashcardDeck {
        id: String::new(),
        title: title.to_string(),
        description: String::new(),
        cards: (1..=cards)
            .map(|n| Flashcard {
                id: format!("card-{n}"),
                front: format!("Q{n}"),
                back: format!("A{n}"),
            })
            .collect(),
    }
}

/// A shared checklist as the backend would return it.
pub fn make_shared_checklist(public_id: &str, sections: usize, items: usize) -> SharedContentDetail {
    let content = Content::Checklist(Checklist {
        id: format!("remote-{public_id}"),
        title: "Shared".to_string(),
        description: String::new(),
        sections: (1..=sections)
            .map(|s| ChecklistSection {
                id: format!("rs-{s}"),
                title: format!("Section {s}"),
                items: (1..=items)
                    .map(|i| ChecklistItem {
                        id: format!("ri-{s}-{i}"),
                        title: format!("Item {s}.{i}"),
                        notes: Some("note".to_string()),
                        is_required: false,
                    })
                    .collect(),
            })
            .collect(),
    });
    SharedContentDetail {
        id: format!("srv-{public_id}"),
        public_id: public_id.to_string(),
        title: "Packing list".to_string(),
        description: "Shared by bob".to_string(),
        content_type: "checklist".to_string(),
        content_data: content.body_json().unwrap(),
        tags: vec!["travel".to_string()],
        language: "en".to_string(),
        author_username: "bob".to_string(),
        can_fork: true,
        forked_from_id: None,
        published_at: Some(Utc::now()),
    }
}
