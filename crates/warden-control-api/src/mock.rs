//! Recording mocks for testing

use async_trait::async_trait;
use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use warden_api::SessionStatus;
use warden_util::SessionId;

use crate::{ControlError, ControlResult, Notifier, SessionController, TerminateOutcome};

/// Mock session controller
///
/// Status queries walk a scripted sequence; the last status repeats forever.
/// Sessions terminated through the mock report `Terminated` afterwards.
pub struct MockController {
    script: Mutex<VecDeque<SessionStatus>>,
    status_calls: AtomicUsize,
    terminate_calls: Mutex<Vec<SessionId>>,
    terminated: Mutex<HashSet<SessionId>>,

    /// Configure status queries to fail
    pub fail_status: Arc<Mutex<bool>>,

    /// Configure termination to fail
    pub fail_terminate: Arc<Mutex<bool>>,
}

impl MockController {
    /// A controller whose sessions are immediately ready
    pub fn new() -> Self {
        Self::with_statuses(vec![SessionStatus::Ready])
    }

    pub fn with_statuses(statuses: Vec<SessionStatus>) -> Self {
        let mut script: VecDeque<_> = statuses.into();
        if script.is_empty() {
            script.push_back(SessionStatus::Ready);
        }

        Self {
            script: Mutex::new(script),
            status_calls: AtomicUsize::new(0),
            terminate_calls: Mutex::new(Vec::new()),
            terminated: Mutex::new(HashSet::new()),
            fail_status: Arc::new(Mutex::new(false)),
            fail_terminate: Arc::new(Mutex::new(false)),
        }
    }

    /// Pretend a session was already stopped elsewhere
    pub fn mark_terminated(&self, session_id: &SessionId) {
        self.terminated.lock().unwrap().insert(session_id.clone());
    }

    pub fn status_calls(&self) -> usize {
        self.status_calls.load(Ordering::SeqCst)
    }

    /// Every termination request received, including failed ones
    pub fn terminate_calls(&self) -> Vec<SessionId> {
        self.terminate_calls.lock().unwrap().clone()
    }

    pub fn is_terminated(&self, session_id: &SessionId) -> bool {
        self.terminated.lock().unwrap().contains(session_id)
    }
}

impl Default for MockController {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SessionController for MockController {
    async fn session_status(&self, session_id: &SessionId) -> ControlResult<SessionStatus> {
        self.status_calls.fetch_add(1, Ordering::SeqCst);

        if *self.fail_status.lock().unwrap() {
            return Err(ControlError::service("GetSession", "Mock status failure"));
        }

        if self.is_terminated(session_id) {
            return Ok(SessionStatus::Terminated);
        }

        let mut script = self.script.lock().unwrap();
        let status = if script.len() > 1 {
            script.pop_front()
        } else {
            script.front().copied()
        };
        Ok(status.unwrap_or(SessionStatus::Ready))
    }

    async fn terminate(&self, session_id: &SessionId) -> ControlResult<TerminateOutcome> {
        self.terminate_calls.lock().unwrap().push(session_id.clone());

        if *self.fail_terminate.lock().unwrap() {
            return Err(ControlError::service("DeleteSession", "Mock terminate failure"));
        }

        if self.terminated.lock().unwrap().insert(session_id.clone()) {
            Ok(TerminateOutcome::Terminated)
        } else {
            Ok(TerminateOutcome::AlreadyTerminated)
        }
    }
}

/// A message captured by [`MockNotifier`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub subject: String,
    pub body: String,
}

/// Mock notifier that records every publish attempt
pub struct MockNotifier {
    published: Mutex<Vec<PublishedMessage>>,
    attempts: AtomicUsize,

    /// Configure publish to fail
    pub fail_publish: Arc<Mutex<bool>>,
}

impl MockNotifier {
    pub fn new() -> Self {
        Self {
            published: Mutex::new(Vec::new()),
            attempts: AtomicUsize::new(0),
            fail_publish: Arc::new(Mutex::new(false)),
        }
    }

    /// Successfully published messages
    pub fn published(&self) -> Vec<PublishedMessage> {
        self.published.lock().unwrap().clone()
    }

    /// Publish calls, including failed ones
    pub fn attempts(&self) -> usize {
        self.attempts.load(Ordering::SeqCst)
    }
}

impl Default for MockNotifier {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Notifier for MockNotifier {
    async fn publish(&self, topic: &str, subject: &str, body: &str) -> ControlResult<()> {
        self.attempts.fetch_add(1, Ordering::SeqCst);

        if *self.fail_publish.lock().unwrap() {
            return Err(ControlError::service("Publish", "Mock publish failure"));
        }

        self.published.lock().unwrap().push(PublishedMessage {
            topic: topic.to_string(),
            subject: subject.to_string(),
            body: body.to_string(),
        });
        Ok(())
    }
}
