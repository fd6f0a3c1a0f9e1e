//! Session lifecycle tests against a scripted identity provider.

use std::{cell::RefCell, collections::HashMap, rc::Rc};

use common::operations::{By, Insert, Select, Start};
use futures::stream::{self, LocalBoxStream, StreamExt as _};
use secrecy::SecretBox;
use service::{
    command::{
        create_user_session, CreateUserSession, DestroyUserSession,
        InitializeSession,
    },
    domain::{
        user::{self, Role},
        Profile, Session,
    },
    infra::{
        auth::{self, AuthChange, AuthProvider, AuthSession},
        database, Database,
    },
    Command as _, Service,
};
use tracerr::Traced;

/// Scripted identity provider and profile store.
#[derive(Clone, Debug, Default)]
struct Stub(Rc<RefCell<State>>);

#[derive(Debug, Default)]
struct State {
    /// Provider-side session, as a persisted client would see it.
    auth: Option<AuthSession>,

    /// Whether credentialed calls must fail.
    reject_credentials: bool,

    /// Whether `sign_out` must fail.
    failing_sign_out: bool,

    /// Whether profile lookups must fail.
    failing_profiles: bool,

    /// Stored profiles.
    profiles: HashMap<user::Id, Profile>,

    /// Number of profile inserts performed.
    profile_inserts: u32,

    /// Queued authentication changes to stream.
    changes: Vec<AuthChange>,
}

impl AuthProvider for Stub {
    async fn current_session(
        &self,
    ) -> Result<Option<AuthSession>, Traced<auth::Error>> {
        Ok(self.0.borrow().auth.clone())
    }

    async fn sign_in(
        &self,
        email: &user::Email,
        _: &SecretBox<user::Password>,
    ) -> Result<AuthSession, Traced<auth::Error>> {
        let mut state = self.0.borrow_mut();
        if state.reject_credentials {
            return Err(tracerr::new!(auth::Error::WrongCredentials));
        }
        let session = AuthSession {
            user_id: tenant_id(),
            email: email.clone(),
        };
        state.auth = Some(session.clone());
        Ok(session)
    }

    async fn sign_up(
        &self,
        email: &user::Email,
        password: &SecretBox<user::Password>,
    ) -> Result<AuthSession, Traced<auth::Error>> {
        self.sign_in(email, password).await
    }

    async fn sign_out(&self) -> Result<(), Traced<auth::Error>> {
        let mut state = self.0.borrow_mut();
        state.auth = None;
        if state.failing_sign_out {
            return Err(tracerr::new!(auth::Error::Rejected(
                "revocation failed".into(),
            )));
        }
        Ok(())
    }

    async fn reset_password(
        &self,
        _: &user::Email,
    ) -> Result<(), Traced<auth::Error>> {
        Ok(())
    }

    fn changes(&self) -> LocalBoxStream<'static, AuthChange> {
        let queued = std::mem::take(&mut self.0.borrow_mut().changes);
        stream::iter(queued).chain(stream::pending()).boxed_local()
    }
}

impl Database<Select<By<Option<Profile>, user::Id>>> for Stub {
    type Ok = Option<Profile>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Profile>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let state = self.0.borrow();
        if state.failing_profiles {
            return Err(tracerr::new!(database::Error::Rest(
                service::infra::rest::Error::Malformed(
                    "store unavailable".into(),
                ),
            )));
        }
        Ok(state.profiles.get(&by.into_inner()).cloned())
    }
}

impl Database<Insert<Profile>> for Stub {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(profile): Insert<Profile>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.0.borrow_mut();
        state.profile_inserts += 1;
        drop(state.profiles.insert(profile.user_id, profile));
        Ok(())
    }
}

fn service(stub: &Stub) -> Service<Stub> {
    let (service, _bg) = Service::new(service::Config::default(), stub.clone());
    service
}

fn tenant_id() -> user::Id {
    "3f9b5fbe-6f51-4df3-8f4d-6f9b2b1c5a77".parse().unwrap()
}

fn auth_session() -> AuthSession {
    AuthSession {
        user_id: tenant_id(),
        email: "juan@example.com".parse().unwrap(),
    }
}

fn password() -> SecretBox<user::Password> {
    SecretBox::new(Box::new("secret-password".parse().unwrap()))
}

#[tokio::test]
async fn initializes_to_checked_anonymous_without_provider_session() {
    let stub = Stub::default();
    let service = service(&stub);

    let session = service.execute(InitializeSession).await.unwrap();

    assert_eq!(session, Session::anonymous());
    assert_eq!(service.sessions().snapshot(), Session::anonymous());
}

#[tokio::test]
async fn creates_missing_profile_with_default_role_on_initialization() {
    let stub = Stub::default();
    stub.0.borrow_mut().auth = Some(auth_session());
    let service = service(&stub);

    let session = service.execute(InitializeSession).await.unwrap();

    assert_eq!(
        session,
        Session::authenticated(tenant_id(), Role::Tenant),
    );
    assert_eq!(stub.0.borrow().profile_inserts, 1);
    assert_eq!(
        stub.0.borrow().profiles[&tenant_id()].role,
        Role::Tenant,
    );
}

#[tokio::test]
async fn respects_existing_admin_profile_on_initialization() {
    let stub = Stub::default();
    {
        let mut state = stub.0.borrow_mut();
        state.auth = Some(auth_session());
        let mut profile = Profile::new(tenant_id());
        profile.role = Role::Admin;
        drop(state.profiles.insert(tenant_id(), profile));
    }
    let service = service(&stub);

    let session = service.execute(InitializeSession).await.unwrap();

    assert_eq!(session, Session::authenticated(tenant_id(), Role::Admin));
    assert_eq!(stub.0.borrow().profile_inserts, 0);
}

#[tokio::test]
async fn degrades_to_tenant_role_when_the_profile_store_is_down() {
    let stub = Stub::default();
    {
        let mut state = stub.0.borrow_mut();
        state.auth = Some(auth_session());
        state.failing_profiles = true;
    }
    let service = service(&stub);

    let session = service.execute(InitializeSession).await.unwrap();

    assert_eq!(session, Session::authenticated(tenant_id(), Role::Tenant));
    assert!(session.checked);
}

#[tokio::test]
async fn sign_in_resolves_role_but_wrong_credentials_surface() {
    let stub = Stub::default();
    let service = service(&stub);

    let session = service
        .execute(CreateUserSession {
            email: "juan@example.com".parse().unwrap(),
            password: password(),
        })
        .await
        .unwrap();
    assert_eq!(session, Session::authenticated(tenant_id(), Role::Tenant));

    stub.0.borrow_mut().reject_credentials = true;
    let e = service
        .execute(CreateUserSession {
            email: "juan@example.com".parse().unwrap(),
            password: password(),
        })
        .await
        .unwrap_err();
    assert!(matches!(
        e.as_ref(),
        create_user_session::ExecutionError::WrongCredentials,
    ));
}

#[tokio::test]
async fn sign_out_resets_the_store_even_when_revocation_fails() {
    let stub = Stub::default();
    {
        let mut state = stub.0.borrow_mut();
        state.auth = Some(auth_session());
        state.failing_sign_out = true;
    }
    let service = service(&stub);
    _ = service.execute(InitializeSession).await.unwrap();
    assert!(service.sessions().snapshot().is_authenticated());

    assert!(service.execute(DestroyUserSession).await.is_err());
    assert_eq!(service.sessions().snapshot(), Session::anonymous());
}

#[tokio::test]
async fn relays_provider_changes_into_the_session_store() {
    let stub = Stub::default();
    stub.0.borrow_mut().changes = vec![
        AuthChange::SignedIn(auth_session()),
        AuthChange::SignedOut,
    ];
    let (service, _bg) =
        Service::new(service::Config::default(), stub.clone());

    let mut sessions = service.sessions().subscribe();
    let local = tokio::task::LocalSet::new();
    local
        .run_until(async {
            let relay = tokio::task::spawn_local({
                let service = service.clone();
                async move {
                    service
                        .execute(Start(service::task::RelayAuthChanges))
                        .await
                }
            });

            // Rapid consecutive events coalesce on the watch channel,
            // so only the final state is guaranteed to be observed.
            sessions.changed().await.unwrap();
            while *sessions.borrow_and_update() != Session::anonymous() {
                sessions.changed().await.unwrap();
            }
            assert_eq!(stub.0.borrow().profile_inserts, 1);

            relay.abort();
        })
        .await;
}
