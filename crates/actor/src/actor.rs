//! Single-namespace uniqueness actor.
//!
//! A [`UniquenessActor`] owns the command receiver for one namespace and is
//! driven by exactly one tokio task. Commands are handled to completion in
//! arrival order, so the read-test-insert in `check_and_lock` can never
//! interleave with another command on the same namespace. Callers talk to
//! the task through a cloneable [`ActorHandle`].

use std::sync::Arc;

use salereg_core::lock::{LockError, LockOutcome, LockStorage};
use tokio::sync::{mpsc, oneshot};
use tokio_util::sync::CancellationToken;

/// Reply channel carried by every command.
type CommandResponder<T> = oneshot::Sender<Result<T, LockError>>;

/// Commands accepted by a [`UniquenessActor`].
#[derive(Debug)]
pub enum LockCommand {
    CheckAndLock {
        key: String,
        resp: CommandResponder<LockOutcome>,
    },
    Unlock {
        key: String,
        resp: CommandResponder<()>,
    },
}

/// The serialized owner of one namespace's lock set.
pub struct UniquenessActor {
    namespace: String,
    storage: Arc<dyn LockStorage>,
    receiver: mpsc::Receiver<LockCommand>,
}

impl UniquenessActor {
    /// Create an actor and the handle used to reach it.
    ///
    /// `capacity` bounds the mailbox; senders wait when it is full.
    pub fn new(
        namespace: impl Into<String>,
        storage: Arc<dyn LockStorage>,
        capacity: usize,
    ) -> (Self, ActorHandle) {
        let namespace = namespace.into();
        let (sender, receiver) = mpsc::channel(capacity.max(1));

        let actor = Self {
            namespace: namespace.clone(),
            storage,
            receiver,
        };
        let handle = ActorHandle {
            namespace: Arc::from(namespace.as_str()),
            sender,
        };

        (actor, handle)
    }

    /// Process commands until every handle is dropped or `cancel` fires.
    ///
    /// On cancellation the mailbox is closed and commands already queued are
    /// still answered before the task exits.
    pub async fn run(mut self, cancel: CancellationToken) {
        tracing::debug!(namespace = %self.namespace, "Uniqueness actor started");

        loop {
            tokio::select! {
                command = self.receiver.recv() => match command {
                    Some(command) => self.handle_command(command).await,
                    None => {
                        tracing::debug!(namespace = %self.namespace, "All handles dropped, actor stopping");
                        return;
                    }
                },
                () = cancel.cancelled() => break,
            }
        }

        self.receiver.close();
        let mut drained = 0usize;
        while let Some(command) = self.receiver.recv().await {
            self.handle_command(command).await;
            drained += 1;
        }
        tracing::debug!(namespace = %self.namespace, drained, "Uniqueness actor shut down");
    }

    async fn handle_command(&self, command: LockCommand) {
        match command {
            LockCommand::CheckAndLock { key, resp } => {
                let result = self.check_and_lock(&key).await;
                let _ = resp.send(result);
            }
            LockCommand::Unlock { key, resp } => {
                let result = self.unlock(&key).await;
                let _ = resp.send(result);
            }
        }
    }

    async fn check_and_lock(&self, key: &str) -> Result<LockOutcome, LockError> {
        if key.is_empty() {
            return Err(LockError::InvalidIdentifier);
        }

        if self.storage.contains(&self.namespace, key).await? {
            return Ok(LockOutcome::AlreadyLocked);
        }

        // A `false` here means another process sharing the storage got there
        // first; that is still a lost race, not an error.
        if self.storage.insert(&self.namespace, key).await? {
            tracing::debug!(namespace = %self.namespace, key, "Lock acquired");
            Ok(LockOutcome::LockedNew)
        } else {
            Ok(LockOutcome::AlreadyLocked)
        }
    }

    async fn unlock(&self, key: &str) -> Result<(), LockError> {
        if key.is_empty() {
            return Err(LockError::InvalidIdentifier);
        }

        self.storage.remove(&self.namespace, key).await?;
        tracing::debug!(namespace = %self.namespace, key, "Lock released");
        Ok(())
    }
}

/// Cloneable sender side of a [`UniquenessActor`].
#[derive(Debug, Clone)]
pub struct ActorHandle {
    namespace: Arc<str>,
    sender: mpsc::Sender<LockCommand>,
}

impl ActorHandle {
    /// True once the actor task has stopped accepting commands.
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    pub async fn check_and_lock(&self, key: &str) -> Result<LockOutcome, LockError> {
        self.request(|resp| LockCommand::CheckAndLock {
            key: key.to_string(),
            resp,
        })
        .await
    }

    pub async fn unlock(&self, key: &str) -> Result<(), LockError> {
        self.request(|resp| LockCommand::Unlock {
            key: key.to_string(),
            resp,
        })
        .await
    }

    async fn request<T>(
        &self,
        build: impl FnOnce(CommandResponder<T>) -> LockCommand,
    ) -> Result<T, LockError> {
        let (resp, reply) = oneshot::channel();

        self.sender.send(build(resp)).await.map_err(|_| {
            LockError::Unavailable(format!("actor for namespace '{}' is stopped", self.namespace))
        })?;

        reply.await.map_err(|_| {
            LockError::Unavailable(format!(
                "actor for namespace '{}' dropped the request",
                self.namespace
            ))
        })?
    }
}
