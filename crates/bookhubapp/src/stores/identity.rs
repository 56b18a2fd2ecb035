//! Session and account management.
//!
//! Login checks the two built-in demo accounts first, then the registered
//! users. The session holds the password-free [`User`] projection and is
//! persisted under `session.user`, so it survives restarts.

use crate::config::RolePolicy;
use crate::error::{BookhubError, Result};
use crate::model::{new_id, RegisterUser, Role, User, UserPatch, UserRecord};
use crate::store::{load_json, save_json, StorageBackend, SESSION_KEY, USERS_KEY};
use chrono::Utc;
use tracing::{info, warn};

struct DemoAccount {
    id: &'static str,
    email: &'static str,
    password: &'static str,
    name: &'static str,
    role: Role,
}

const DEMO_ACCOUNTS: [DemoAccount; 2] = [
    DemoAccount {
        id: "admin-1",
        email: "admin@bookhub.com",
        password: "admin123",
        name: "Admin User",
        role: Role::Admin,
    },
    DemoAccount {
        id: "user-1",
        email: "user@test.com",
        password: "password123",
        name: "Test User",
        role: Role::User,
    },
];

impl DemoAccount {
    fn user(&self) -> User {
        User {
            id: self.id.to_string(),
            email: self.email.to_string(),
            name: self.name.to_string(),
            role: self.role,
            created_at: None,
        }
    }
}

pub struct IdentityStore<B: StorageBackend> {
    backend: B,
    policy: RolePolicy,
    session: Option<User>,
    users: Vec<UserRecord>,
}

impl<B: StorageBackend> IdentityStore<B> {
    /// Rehydrate the session and the registered users from `backend`.
    pub fn load(backend: B, policy: RolePolicy) -> Result<Self> {
        let session: Option<User> = load_json(&backend, SESSION_KEY)?;
        let users: Vec<UserRecord> = load_json(&backend, USERS_KEY)?.unwrap_or_default();
        Ok(Self {
            backend,
            policy,
            session,
            users,
        })
    }

    pub fn current_user(&self) -> Option<&User> {
        self.session.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.is_some()
    }

    pub fn is_admin(&self) -> bool {
        self.session.as_ref().is_some_and(User::is_admin)
    }

    pub fn registered_users(&self) -> &[UserRecord] {
        &self.users
    }

    pub fn login(&mut self, email: &str, password: &str) -> Result<Role> {
        let user = DEMO_ACCOUNTS
            .iter()
            .find(|demo| demo.email == email && demo.password == password)
            .map(DemoAccount::user)
            .or_else(|| {
                self.users
                    .iter()
                    .find(|record| record.user.email == email && record.password == password)
                    .map(|record| record.user.clone())
            });

        let Some(user) = user else {
            warn!(email, "login rejected");
            return Err(BookhubError::InvalidCredentials);
        };

        let role = user.role;
        self.start_session(user)?;
        info!(email, %role, "logged in");
        Ok(role)
    }

    /// Register a new account and log it in.
    pub fn register(&mut self, input: RegisterUser) -> Result<User> {
        if self.users.iter().any(|record| record.user.email == input.email) {
            return Err(BookhubError::EmailAlreadyExists(input.email));
        }

        let role = match self.policy {
            RolePolicy::EmailHeuristic if input.email.contains("admin") => Role::Admin,
            RolePolicy::EmailHeuristic | RolePolicy::UserOnly => Role::User,
        };
        let user = User {
            id: new_id(),
            email: input.email,
            name: input.name,
            role,
            created_at: Some(Utc::now()),
        };

        let mut users = self.users.clone();
        users.push(UserRecord {
            user: user.clone(),
            password: input.password,
        });
        save_json(&self.backend, USERS_KEY, &users)?;
        self.users = users;

        self.start_session(user.clone())?;
        info!(user_id = %user.id, %role, "registered");
        Ok(user)
    }

    pub fn logout(&mut self) -> Result<()> {
        self.backend.remove(SESSION_KEY)?;
        if let Some(user) = self.session.take() {
            info!(user_id = %user.id, "logged out");
        }
        Ok(())
    }

    /// Merge `patch` into the logged-in user. The matching registration
    /// record is updated too, so the change survives the next login.
    pub fn update_user(&mut self, patch: &UserPatch) -> Result<User> {
        let current = self.session.as_ref().ok_or(BookhubError::NoActiveSession)?;

        if let Some(email) = &patch.email {
            let taken = self
                .users
                .iter()
                .any(|record| &record.user.email == email && record.user.id != current.id);
            if taken {
                return Err(BookhubError::EmailAlreadyExists(email.clone()));
            }
        }

        let mut updated = current.clone();
        patch.apply(&mut updated);

        let users = match self.users.iter().position(|r| r.user.id == updated.id) {
            Some(pos) => {
                let mut users = self.users.clone();
                patch.apply(&mut users[pos].user);
                save_json(&self.backend, USERS_KEY, &users)?;
                Some(users)
            }
            None => None,
        };

        // The record and the session move together or not at all.
        if let Err(e) = save_json(&self.backend, SESSION_KEY, &updated) {
            if users.is_some() {
                if let Err(restore) = save_json(&self.backend, USERS_KEY, &self.users) {
                    warn!(error = %restore, "could not restore users after failed profile update");
                }
            }
            return Err(e);
        }

        if let Some(users) = users {
            self.users = users;
        }
        self.session = Some(updated.clone());
        info!(user_id = %updated.id, "profile updated");
        Ok(updated)
    }

    /// Assign `role` to a registered user. Only administrators may do this.
    pub fn set_role(&mut self, user_id: &str, role: Role) -> Result<()> {
        if !self.is_admin() {
            return Err(BookhubError::Forbidden(
                "only administrators can assign roles".to_string(),
            ));
        }
        let pos = self
            .users
            .iter()
            .position(|record| record.user.id == user_id)
            .ok_or_else(|| BookhubError::not_found("User", user_id))?;

        let mut users = self.users.clone();
        users[pos].user.role = role;
        save_json(&self.backend, USERS_KEY, &users)?;
        self.users = users;
        info!(user_id, %role, "role assigned");
        Ok(())
    }

    fn start_session(&mut self, user: User) -> Result<()> {
        save_json(&self.backend, SESSION_KEY, &user)?;
        self.session = Some(user);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::mem_backend::MemBackend;
    use std::rc::Rc;

    fn store() -> IdentityStore<Rc<MemBackend>> {
        IdentityStore::load(Rc::new(MemBackend::new()), RolePolicy::EmailHeuristic).unwrap()
    }

    fn registration(email: &str) -> RegisterUser {
        RegisterUser {
            name: "Reader".into(),
            email: email.into(),
            password: "hunter2".into(),
        }
    }

    #[test]
    fn demo_admin_logs_in_as_admin() {
        let mut store = store();
        let role = store.login("admin@bookhub.com", "admin123").unwrap();
        assert_eq!(role, Role::Admin);
        assert!(store.is_admin());
        assert_eq!(store.current_user().unwrap().id, "admin-1");
    }

    #[test]
    fn demo_user_logs_in_as_user() {
        let mut store = store();
        assert_eq!(
            store.login("user@test.com", "password123").unwrap(),
            Role::User
        );
        assert!(store.is_authenticated());
        assert!(!store.is_admin());
    }

    #[test]
    fn wrong_credentials_leave_session_unchanged() {
        let mut store = store();
        store.login("user@test.com", "password123").unwrap();

        let err = store.login("x@x.com", "wrong").unwrap_err();
        assert!(matches!(err, BookhubError::InvalidCredentials));
        assert_eq!(store.current_user().unwrap().email, "user@test.com");
    }

    #[test]
    fn demo_password_must_match() {
        let mut store = store();
        assert!(store.login("admin@bookhub.com", "nope").is_err());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn register_logs_in_and_allows_later_login() {
        let mut store = store();
        let user = store.register(registration("reader@example.com")).unwrap();
        assert_eq!(user.role, Role::User);
        assert!(user.created_at.is_some());
        assert_eq!(store.current_user(), Some(&user));

        store.logout().unwrap();
        assert!(!store.is_authenticated());

        assert_eq!(
            store.login("reader@example.com", "hunter2").unwrap(),
            Role::User
        );
        assert!(store.login("Reader@example.com", "hunter2").is_err());
    }

    #[test]
    fn duplicate_email_is_rejected_without_changes() {
        let mut store = store();
        store.register(registration("reader@example.com")).unwrap();
        let before = store.registered_users().to_vec();

        let err = store
            .register(registration("reader@example.com"))
            .unwrap_err();
        assert!(matches!(err, BookhubError::EmailAlreadyExists(_)));
        assert_eq!(store.registered_users(), before.as_slice());
    }

    #[test]
    fn email_heuristic_assigns_admin() {
        let mut store = store();
        let user = store.register(registration("shop-admin@example.com")).unwrap();
        assert_eq!(user.role, Role::Admin);
    }

    #[test]
    fn user_only_policy_ignores_email() {
        let mut store =
            IdentityStore::load(Rc::new(MemBackend::new()), RolePolicy::UserOnly).unwrap();
        let user = store.register(registration("shop-admin@example.com")).unwrap();
        assert_eq!(user.role, Role::User);
    }

    #[test]
    fn session_never_contains_password() {
        let backend = Rc::new(MemBackend::new());
        let mut store = IdentityStore::load(Rc::clone(&backend), RolePolicy::UserOnly).unwrap();
        store.register(registration("reader@example.com")).unwrap();

        let raw = backend.get(SESSION_KEY).unwrap().unwrap();
        assert!(!raw.contains("hunter2"));
        let users_raw = backend.get(USERS_KEY).unwrap().unwrap();
        assert!(users_raw.contains("hunter2"));
    }

    #[test]
    fn session_is_rehydrated() {
        let backend = Rc::new(MemBackend::new());
        let mut first = IdentityStore::load(Rc::clone(&backend), RolePolicy::UserOnly).unwrap();
        first.login("admin@bookhub.com", "admin123").unwrap();

        let second = IdentityStore::load(Rc::clone(&backend), RolePolicy::UserOnly).unwrap();
        assert_eq!(second.current_user(), first.current_user());

        let mut third = second;
        third.logout().unwrap();
        let fourth = IdentityStore::load(backend, RolePolicy::UserOnly).unwrap();
        assert!(fourth.current_user().is_none());
    }

    #[test]
    fn update_user_requires_session() {
        let mut store = store();
        let patch = UserPatch {
            name: Some("New".into()),
            ..Default::default()
        };
        assert!(matches!(
            store.update_user(&patch),
            Err(BookhubError::NoActiveSession)
        ));
    }

    #[test]
    fn update_user_writes_through_to_record() {
        let mut store = store();
        store.register(registration("reader@example.com")).unwrap();
        let patch = UserPatch {
            name: Some("Renamed".into()),
            ..Default::default()
        };
        let updated = store.update_user(&patch).unwrap();
        assert_eq!(updated.name, "Renamed");

        store.logout().unwrap();
        store.login("reader@example.com", "hunter2").unwrap();
        assert_eq!(store.current_user().unwrap().name, "Renamed");
    }

    #[test]
    fn update_user_rejects_taken_email() {
        let mut store = store();
        store.register(registration("first@example.com")).unwrap();
        store.register(registration("second@example.com")).unwrap();
        let patch = UserPatch {
            email: Some("first@example.com".into()),
            ..Default::default()
        };
        assert!(matches!(
            store.update_user(&patch),
            Err(BookhubError::EmailAlreadyExists(_))
        ));
        assert_eq!(store.current_user().unwrap().email, "second@example.com");
    }

    #[test]
    fn set_role_requires_admin() {
        let mut store = store();
        let user = store.register(registration("reader@example.com")).unwrap();
        assert!(matches!(
            store.set_role(&user.id, Role::Admin),
            Err(BookhubError::Forbidden(_))
        ));

        store.login("admin@bookhub.com", "admin123").unwrap();
        store.set_role(&user.id, Role::Admin).unwrap();
        assert_eq!(
            store.login("reader@example.com", "hunter2").unwrap(),
            Role::Admin
        );
    }

    #[test]
    fn set_role_unknown_user() {
        let mut store = store();
        store.login("admin@bookhub.com", "admin123").unwrap();
        assert!(matches!(
            store.set_role("ghost", Role::Admin),
            Err(BookhubError::NotFound { .. })
        ));
    }

    #[test]
    fn failed_write_keeps_registration_out() {
        let backend = Rc::new(MemBackend::new());
        let mut store = IdentityStore::load(Rc::clone(&backend), RolePolicy::UserOnly).unwrap();
        backend.set_simulate_write_error(true);

        let err = store.register(registration("reader@example.com")).unwrap_err();
        assert!(!err.is_business());
        assert!(store.registered_users().is_empty());
        assert!(!store.is_authenticated());
    }

    #[test]
    fn failed_session_write_keeps_profile_consistent() {
        let backend = Rc::new(MemBackend::new());
        let mut store = IdentityStore::load(Rc::clone(&backend), RolePolicy::UserOnly).unwrap();
        let user = store.register(registration("reader@example.com")).unwrap();

        backend.set_failing_key(Some(SESSION_KEY));
        let patch = UserPatch {
            name: Some("Renamed".into()),
            ..Default::default()
        };
        assert!(store.update_user(&patch).is_err());
        backend.set_failing_key(None);

        assert_eq!(store.current_user().unwrap().name, "Reader");
        assert_eq!(store.registered_users()[0].user.name, "Reader");

        let mut reloaded = IdentityStore::load(backend, RolePolicy::UserOnly).unwrap();
        assert_eq!(reloaded.current_user().unwrap().name, "Reader");
        assert_eq!(reloaded.registered_users()[0].user, user);
        reloaded.logout().unwrap();
        reloaded.login("reader@example.com", "hunter2").unwrap();
        assert_eq!(reloaded.current_user().unwrap().name, "Reader");
    }
}
