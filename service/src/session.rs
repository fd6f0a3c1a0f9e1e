//! Shared [`Session`] store.

use tokio::sync::watch;

use crate::domain::Session;

/// Single-writer store of the current [`Session`], broadcasting every
/// change to its subscribers.
///
/// Commands of the owning [`Service`] are the only writers; everything else
/// observes through [`SessionStore::snapshot`] or
/// [`SessionStore::subscribe`].
///
/// [`Service`]: crate::Service
#[derive(Clone, Debug)]
pub struct SessionStore(watch::Sender<Session>);

impl SessionStore {
    /// Creates a new [`SessionStore`] holding an unchecked anonymous
    /// [`Session`].
    pub(crate) fn new() -> Self {
        Self(watch::Sender::new(Session::default()))
    }

    /// Returns a snapshot of the current [`Session`].
    #[must_use]
    pub fn snapshot(&self) -> Session {
        *self.0.borrow()
    }

    /// Subscribes to [`Session`] changes.
    ///
    /// The returned [`watch::Receiver`] yields the current [`Session`]
    /// immediately and every distinct change afterwards. Dropping it
    /// unsubscribes.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.0.subscribe()
    }

    /// Replaces the current [`Session`], notifying subscribers if it
    /// differs from the stored one.
    pub(crate) fn set(&self, session: Session) {
        _ = self.0.send_if_modified(|current| {
            let changed = *current != session;
            *current = session;
            changed
        });
    }

    /// Resets the store to a checked anonymous [`Session`].
    ///
    /// Used on sign-out: subscribers observe the anonymous state before
    /// any remote call resolves.
    pub(crate) fn reset(&self) {
        self.set(Session::anonymous());
    }
}

#[cfg(test)]
mod spec {
    use crate::domain::{user::Role, Session};

    use super::SessionStore;

    #[tokio::test]
    async fn starts_unchecked_and_anonymous() {
        let store = SessionStore::new();

        let snapshot = store.snapshot();
        assert!(!snapshot.checked);
        assert!(!snapshot.is_authenticated());
        assert_eq!(snapshot.role, Role::Tenant);
    }

    #[tokio::test]
    async fn subscribers_observe_changes() {
        let store = SessionStore::new();
        let mut rx = store.subscribe();

        let session =
            Session::authenticated(user_id(), Role::Admin);
        store.set(session);

        rx.changed().await.unwrap();
        assert_eq!(*rx.borrow_and_update(), session);
    }

    #[tokio::test]
    async fn identical_updates_are_not_rebroadcast() {
        let store = SessionStore::new();
        store.set(Session::anonymous());

        let mut rx = store.subscribe();
        store.set(Session::anonymous());

        assert!(!rx.has_changed().unwrap());
    }

    #[tokio::test]
    async fn reset_yields_checked_anonymous_session() {
        let store = SessionStore::new();
        store.set(Session::authenticated(user_id(), Role::Tenant));

        store.reset();

        let snapshot = store.snapshot();
        assert!(snapshot.checked);
        assert!(!snapshot.is_authenticated());
    }

    fn user_id() -> crate::domain::user::Id {
        "6b3f1a50-8a9a-4d5c-9a3f-2b1c6d7e8f90".parse().unwrap()
    }
}
