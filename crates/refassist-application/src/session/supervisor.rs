//! Per-session actor that serializes interactions.
//!
//! `SessionSupervisor` owns exactly one `ConversationSession`, but never
//! touches it directly: the session lives inside a worker task that drains a
//! FIFO queue of utterances. Each utterance runs the state machine to
//! completion before the next one reads the state, so the
//! "read state, compute, write state" sequence is never concurrent. Help
//! requests share the queue but skip the authentication gate, since they
//! never reach the service.
//!
//! Outside the worker, three signals reach the session:
//! - cancellation, through the in-flight interaction's `CancellationToken`
//! - authentication, through a `watch` channel the worker waits on
//! - replay, through a `watch` channel carrying the latest `SessionSnapshot`

use crate::conversation::{self, ConversationDeps, InteractionScope};
use refassist_core::messenger::SessionMessenger;
use refassist_core::session::{ConversationSession, ConversationState, SessionSnapshot};
use refassist_core::{RefAssistError, Result};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use tokio::sync::{mpsc, oneshot, watch};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// Completion handle for one queued utterance.
///
/// Dropping it does not cancel the interaction.
#[derive(Debug)]
pub struct InteractionHandle {
    receiver: oneshot::Receiver<Result<ConversationState>>,
}

impl InteractionHandle {
    /// Waits for the interaction and returns the state the session moved to.
    pub async fn wait(self) -> Result<ConversationState> {
        self.receiver.await.map_err(|_| {
            RefAssistError::internal("session was disposed before the interaction ran")
        })?
    }
}

enum Job {
    Utterance(String),
    Help,
}

struct QueuedInteraction {
    job: Job,
    reply: oneshot::Sender<Result<ConversationState>>,
}

/// The interaction currently running, as seen from outside the worker.
struct InFlight {
    state: ConversationState,
    cancel: CancellationToken,
}

type InFlightSlot = Arc<Mutex<Option<InFlight>>>;

fn lock(slot: &InFlightSlot) -> MutexGuard<'_, Option<InFlight>> {
    slot.lock().unwrap_or_else(PoisonError::into_inner)
}

pub struct SessionSupervisor {
    session_id: String,
    queue: mpsc::UnboundedSender<QueuedInteraction>,
    authenticated: watch::Sender<bool>,
    snapshots: Arc<watch::Sender<SessionSnapshot>>,
    in_flight: InFlightSlot,
    shutdown: CancellationToken,
}

impl SessionSupervisor {
    /// Starts the worker task for `session`.
    ///
    /// Must be called from within a tokio runtime.
    pub fn spawn(
        session: ConversationSession,
        deps: ConversationDeps,
        messenger: SessionMessenger,
    ) -> Self {
        let session_id = session.session_id().to_string();
        let (queue, queue_rx) = mpsc::unbounded_channel();
        let (authenticated, authenticated_rx) = watch::channel(!session.is_authenticating);
        let snapshots = Arc::new(watch::channel(session.snapshot(false)).0);
        let in_flight: InFlightSlot = Arc::new(Mutex::new(None));
        let shutdown = CancellationToken::new();

        let worker = Worker {
            session,
            deps,
            messenger,
            authenticated: authenticated_rx,
            snapshots: snapshots.clone(),
            in_flight: in_flight.clone(),
            shutdown: shutdown.clone(),
        };
        tokio::spawn(worker.run(queue_rx));

        tracing::debug!(%session_id, "[SessionSupervisor] Spawned");

        Self {
            session_id,
            queue,
            authenticated,
            snapshots,
            in_flight,
            shutdown,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// Queues an utterance. Returns immediately; the caller may await or drop
    /// the handle.
    pub fn send(&self, input: impl Into<String>) -> InteractionHandle {
        self.enqueue(Job::Utterance(input.into()))
    }

    /// Queues a help request behind any pending utterances.
    pub fn help(&self) -> InteractionHandle {
        self.enqueue(Job::Help)
    }

    fn enqueue(&self, job: Job) -> InteractionHandle {
        let (reply, receiver) = oneshot::channel();
        // A closed queue drops `reply`, which the handle reports as an error.
        if self.queue.send(QueuedInteraction { job, reply }).is_err() {
            tracing::warn!(session_id = %self.session_id, "[SessionSupervisor] Send after dispose");
        }
        InteractionHandle { receiver }
    }

    /// Cancels the running interaction if its state owns a remote job.
    ///
    /// Returns whether anything was cancelled.
    pub fn cancel(&self) -> bool {
        let in_flight = lock(&self.in_flight);
        match in_flight.as_ref() {
            Some(running) if running.state.is_cancellable() => {
                tracing::info!(
                    session_id = %self.session_id,
                    state = %running.state,
                    "[SessionSupervisor] Cancelling in-flight interaction"
                );
                running.cancel.cancel();
                true
            }
            _ => false,
        }
    }

    /// Gates new interactions on authentication.
    ///
    /// While unauthenticated, queued utterances wait; the interaction already
    /// running is left alone.
    pub fn auth_changed(&self, authenticated: bool) {
        self.authenticated.send_replace(authenticated);
        self.snapshots
            .send_modify(|snapshot| snapshot.is_authenticating = !authenticated);
        tracing::debug!(
            session_id = %self.session_id,
            authenticated,
            "[SessionSupervisor] Authentication changed"
        );
    }

    /// Latest published view of the session. Never waits on an interaction.
    pub fn snapshot(&self) -> SessionSnapshot {
        self.snapshots.borrow().clone()
    }

    /// Subscribes to snapshot updates, for replaying progress into another view.
    pub fn subscribe(&self) -> watch::Receiver<SessionSnapshot> {
        self.snapshots.subscribe()
    }

    pub fn state(&self) -> ConversationState {
        self.snapshots.borrow().state
    }

    /// Cancels any in-flight work and stops the worker. Queued utterances are
    /// dropped.
    pub fn dispose(&self) {
        tracing::debug!(session_id = %self.session_id, "[SessionSupervisor] Disposing");
        self.shutdown.cancel();
    }

    pub fn is_disposed(&self) -> bool {
        self.shutdown.is_cancelled()
    }
}

impl Drop for SessionSupervisor {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

struct Worker {
    session: ConversationSession,
    deps: ConversationDeps,
    messenger: SessionMessenger,
    authenticated: watch::Receiver<bool>,
    snapshots: Arc<watch::Sender<SessionSnapshot>>,
    in_flight: InFlightSlot,
    shutdown: CancellationToken,
}

impl Worker {
    async fn run(mut self, mut queue: mpsc::UnboundedReceiver<QueuedInteraction>) {
        loop {
            let queued = tokio::select! {
                biased;
                _ = self.shutdown.cancelled() => break,
                queued = queue.recv() => match queued {
                    Some(queued) => queued,
                    None => break,
                },
            };

            let result = match &queued.job {
                Job::Utterance(input) => {
                    if !self.wait_for_auth().await {
                        break;
                    }
                    self.run_interaction(input).await
                }
                Job::Help => Ok(self.run_help()),
            };
            // The caller may have dropped the handle.
            let _ = queued.reply.send(result);
        }

        tracing::debug!(
            session_id = %self.session.session_id(),
            "[SessionSupervisor] Worker stopped"
        );
    }

    /// Blocks until authenticated. Returns false if the session shut down first.
    async fn wait_for_auth(&mut self) -> bool {
        let authenticated = *self.authenticated.borrow();
        if authenticated {
            return true;
        }

        self.session.is_authenticating = true;
        self.publish(false);
        tracing::info!(
            session_id = %self.session.session_id(),
            "[SessionSupervisor] Waiting for authentication"
        );

        let restored = tokio::select! {
            _ = self.shutdown.cancelled() => false,
            restored = wait_until_authenticated(&mut self.authenticated) => restored,
        };

        self.session.is_authenticating = false;
        restored
    }

    async fn run_interaction(&mut self, input: &str) -> Result<ConversationState> {
        let state = self.session.state;
        let cancel = self.shutdown.child_token();
        *lock(&self.in_flight) = Some(InFlight {
            state,
            cancel: cancel.clone(),
        });
        self.publish(true);

        let span = tracing::info_span!(
            "interaction",
            session_id = %self.session.session_id(),
            state = %state
        );
        let scope = InteractionScope {
            deps: &self.deps,
            messenger: &self.messenger,
            cancel: &cancel,
        };
        let result = conversation::interact(state, input, self.session.context.clone(), &scope)
            .instrument(span)
            .await;

        *lock(&self.in_flight) = None;

        let outcome = match result {
            Ok(transition) => {
                tracing::info!(
                    session_id = %self.session.session_id(),
                    from = %state,
                    to = %transition.state,
                    "[SessionSupervisor] Transition"
                );
                self.session.state = transition.state;
                self.session.context = transition.context;
                Ok(transition.state)
            }
            Err(err) => {
                tracing::error!(
                    session_id = %self.session.session_id(),
                    state = %state,
                    error = %err,
                    "[SessionSupervisor] Interaction rejected"
                );
                Err(err)
            }
        };

        self.publish(false);
        outcome
    }

    fn run_help(&mut self) -> ConversationState {
        let from = self.session.state;
        // Nothing remote runs, so there is nothing to cancel.
        let cancel = CancellationToken::new();
        let scope = InteractionScope {
            deps: &self.deps,
            messenger: &self.messenger,
            cancel: &cancel,
        };
        let transition = conversation::help(self.session.context.clone(), &scope);
        tracing::info!(
            session_id = %self.session.session_id(),
            from = %from,
            to = %transition.state,
            "[SessionSupervisor] Help"
        );
        self.session.state = transition.state;
        self.session.context = transition.context;
        self.publish(false);
        transition.state
    }

    fn publish(&self, busy: bool) {
        let mut snapshot = self.session.snapshot(busy);
        snapshot.is_authenticating = !*self.authenticated.borrow();
        self.snapshots.send_replace(snapshot);
    }
}

async fn wait_until_authenticated(receiver: &mut watch::Receiver<bool>) -> bool {
    receiver.wait_for(|authenticated| *authenticated).await.is_ok()
}

#[cfg(test)]
#[path = "supervisor_test.rs"]
mod tests;
