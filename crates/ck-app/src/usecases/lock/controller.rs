//! Lock controller.
//!
//! The controller is the only writer of [`LockState`]. Every transition
//! funnels through it, and derived state is always refreshed from the
//! store after a mutating call rather than assumed from the call's own
//! success.

use std::sync::Arc;

use tokio::sync::{watch, Mutex};
use tracing::{debug, info, info_span, Instrument};

use ck_core::ports::{SecureStorePort, StoreError};
use ck_core::{LockState, MasterPassword};

/// Errors produced by lock transitions, tagged with the transition that
/// failed.
#[derive(Debug, thiserror::Error)]
pub enum LockError {
    #[error("lock state query failed: {0}")]
    Query(#[source] StoreError),

    #[error("unlock failed: {0}")]
    Unlock(#[source] StoreError),

    #[error("password change failed: {0}")]
    ChangePassword(#[source] StoreError),

    #[error("first-run acknowledgement failed: {0}")]
    FirstRunAck(#[source] StoreError),
}

impl LockError {
    /// True when the failure means the supplied password was rejected,
    /// as opposed to the store being unreachable.
    pub fn is_invalid_password(&self) -> bool {
        matches!(self, LockError::Unlock(StoreError::InvalidPassword))
    }
}

/// State machine mediating all access to the store's lock state.
///
/// ## Behavior
///
/// - `initialize` queries the store and implicitly unlocks an unprotected
///   store with the empty password, so unprotected stores are always open
///   before any dependent component proceeds.
/// - `unlock` while already unlocked and `change_password` while locked
///   are silent no-ops: expected races between UI intent and
///   already-current state, not errors.
/// - After a successful `unlock`/`change_password` the affected flags are
///   re-queried from the store, which remains authoritative.
///
/// Transitions are serialized by one mutex held across each transition's
/// store round-trips, so at most one unlock/change is in flight.
pub struct LockController {
    store: Arc<dyn SecureStorePort>,
    state: Mutex<LockState>,
    watch_tx: watch::Sender<LockState>,
}

impl LockController {
    pub fn new(store: Arc<dyn SecureStorePort>) -> Self {
        let (watch_tx, _) = watch::channel(LockState::default());
        Self {
            store,
            state: Mutex::new(LockState::default()),
            watch_tx,
        }
    }

    /// Current state snapshot.
    pub async fn state(&self) -> LockState {
        *self.state.lock().await
    }

    /// Subscribe to state transitions.
    ///
    /// The receiver always yields the latest snapshot first.
    pub fn subscribe(&self) -> watch::Receiver<LockState> {
        self.watch_tx.subscribe()
    }

    /// Query the store and settle the initial lock state.
    ///
    /// If the store reports locked but unprotected, an implicit unlock
    /// with the empty password is performed and `locked` re-queried, so
    /// dependent initialization never observes a closed unprotected
    /// store.
    pub async fn initialize(&self) -> Result<LockState, LockError> {
        let span = info_span!("usecase.lock.initialize");

        async {
            let mut state = self.state.lock().await;

            let mut next = LockState {
                locked: self.store.is_locked().await.map_err(LockError::Query)?,
                protected: self.store.is_protected().await.map_err(LockError::Query)?,
                first_run: self.store.is_first_run().await.map_err(LockError::Query)?,
            };

            if next.locked && !next.protected {
                info!("store is unprotected, performing implicit unlock");
                self.store
                    .unlock(&MasterPassword::empty())
                    .await
                    .map_err(LockError::Unlock)?;
                next.locked = self.store.is_locked().await.map_err(LockError::Query)?;
            }

            *state = next;
            self.watch_tx.send_replace(next);

            info!(
                locked = next.locked,
                protected = next.protected,
                first_run = next.first_run,
                "lock state initialized"
            );
            Ok(next)
        }
        .instrument(span)
        .await
    }

    /// Attempt to unlock the store.
    ///
    /// A no-op returning the current state when already unlocked. On
    /// success the returned snapshot reflects a fresh store query; the
    /// caller decides what to do once `locked` is confirmed false. On
    /// failure the state is left untouched and the error propagates.
    pub async fn unlock(&self, password: &MasterPassword) -> Result<LockState, LockError> {
        let span = info_span!("usecase.lock.unlock");

        async {
            let mut state = self.state.lock().await;

            if !state.locked {
                debug!("store already unlocked, ignoring unlock request");
                return Ok(*state);
            }

            self.store.unlock(password).await.map_err(LockError::Unlock)?;

            state.locked = self.store.is_locked().await.map_err(LockError::Query)?;
            state.protected = self.store.is_protected().await.map_err(LockError::Query)?;
            self.watch_tx.send_replace(*state);

            info!(locked = state.locked, "unlock completed");
            Ok(*state)
        }
        .instrument(span)
        .await
    }

    /// Change the master password, or remove protection with the empty
    /// password.
    ///
    /// A no-op returning the current state while the store is locked.
    /// `protected` is re-queried afterwards regardless of the password's
    /// emptiness. Anything whose encryption key changed must be reloaded
    /// by the caller after this returns.
    pub async fn change_password(
        &self,
        new_password: &MasterPassword,
    ) -> Result<LockState, LockError> {
        let span = info_span!("usecase.lock.change_password");

        async {
            let mut state = self.state.lock().await;

            if state.locked {
                debug!("store is locked, ignoring password change request");
                return Ok(*state);
            }

            self.store
                .change_password(new_password)
                .await
                .map_err(LockError::ChangePassword)?;

            state.protected = self.store.is_protected().await.map_err(LockError::Query)?;
            self.watch_tx.send_replace(*state);

            info!(protected = state.protected, "password change completed");
            Ok(*state)
        }
        .instrument(span)
        .await
    }

    /// Durably record that the first-run flow finished.
    ///
    /// Valid in any lock state. The store operation is a set-to-false,
    /// so repeated calls are harmless.
    pub async fn complete_first_run(&self) -> Result<LockState, LockError> {
        let span = info_span!("usecase.lock.complete_first_run");

        async {
            let mut state = self.state.lock().await;

            self.store
                .mark_first_run_complete()
                .await
                .map_err(LockError::FirstRunAck)?;

            state.first_run = self.store.is_first_run().await.map_err(LockError::Query)?;
            self.watch_tx.send_replace(*state);

            Ok(*state)
        }
        .instrument(span)
        .await
    }
}
