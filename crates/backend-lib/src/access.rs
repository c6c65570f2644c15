// ============================
// crates/backend-lib/src/access.rs
// ============================
//! Role-gated access control: view dispatch and operation guards.
use std::sync::Arc;

use dashgate_common::{Role, View};
use tracing::warn;

use crate::error::AppError;
use crate::session::Session;
use crate::store::CredentialStore;

/// Decides which view a session sees and which operations it may call.
///
/// The guards here are the explicit form of rules the predecessor UI
/// only implied (a disabled self-row in the admin list); the store is
/// consulted so a stale session role cannot bypass them.
pub struct AccessController {
    store: Arc<dyn CredentialStore>,
}

impl AccessController {
    pub fn new(store: Arc<dyn CredentialStore>) -> Self {
        Self { store }
    }

    pub(crate) fn store(&self) -> &dyn CredentialStore {
        self.store.as_ref()
    }

    // A logged-in session with an unrecognised persisted role is a
    // terminal display-only state: logout is the only action left.
    fn ensure_actionable(actor: &Session) -> Result<(), AppError> {
        if actor.logged_in && actor.role.is_none() {
            return Err(AppError::Forbidden(
                "this account's role is unrecognised; only logout is permitted".to_string(),
            ));
        }
        Ok(())
    }

    /// Dispatch table from session state to view.
    ///
    /// Analysts land on the password view, same as viewers; the
    /// analytics view stays unreachable (see `View::Analytics`).
    pub fn view_for(&self, session: &Session) -> View {
        if !session.logged_in {
            return View::Login;
        }
        match session.role {
            Some(Role::Admin) => View::AdminDashboard,
            Some(Role::Analyst) | Some(Role::Viewer) => View::PasswordChange,
            None => View::UnknownRoleError,
        }
    }

    /// Registration guard: only an admin may assign a role other than
    /// viewer. Unauthenticated self-registration is allowed but forced
    /// to viewer.
    pub fn authorize_register(&self, actor: &Session, requested: Role) -> Result<(), AppError> {
        Self::ensure_actionable(actor)?;
        if actor.is_admin() || requested == Role::Viewer {
            return Ok(());
        }
        Err(AppError::Forbidden(
            "only an administrator may assign that role".to_string(),
        ))
    }

    /// Role-update guard: admin actor, never on oneself, and never in a
    /// way that leaves the store without an admin.
    pub fn authorize_role_update(
        &self,
        actor: &Session,
        target: &str,
        new_role: Role,
    ) -> Result<(), AppError> {
        Self::ensure_actionable(actor)?;
        if !actor.is_admin() {
            return Err(AppError::Forbidden(
                "only an administrator may change roles".to_string(),
            ));
        }
        if actor.username == target {
            // Lockout protection; the old UI disabled the self-row.
            return Err(AppError::Forbidden(
                "administrators may not change their own role".to_string(),
            ));
        }

        let record = self
            .store
            .find(target)?
            .ok_or_else(|| AppError::UserNotFound(target.to_string()))?;

        // The session role may be stale, so the last-admin check works
        // off the store, not off the actor.
        if record.role == Role::Admin.as_str()
            && new_role != Role::Admin
            && self.store.count_admins()? <= 1
        {
            warn!(user = target, "refused demotion of the last admin");
            return Err(AppError::Forbidden(
                "cannot demote the last remaining administrator".to_string(),
            ));
        }
        Ok(())
    }

    /// Password-change guard: self-service, or any target for an admin.
    pub fn authorize_password_change(
        &self,
        actor: &Session,
        target: &str,
    ) -> Result<(), AppError> {
        Self::ensure_actionable(actor)?;
        if actor.logged_in && (actor.username == target || actor.is_admin()) {
            return Ok(());
        }
        Err(AppError::Forbidden(
            "you may only change your own password".to_string(),
        ))
    }

    /// Listing users is an admin-dashboard operation.
    pub fn authorize_list(&self, actor: &Session) -> Result<(), AppError> {
        Self::ensure_actionable(actor)?;
        if actor.is_admin() {
            return Ok(());
        }
        Err(AppError::Forbidden(
            "only an administrator may list users".to_string(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::SqliteStore;

    fn controller_with_store() -> (AccessController, Arc<SqliteStore>) {
        let store = Arc::new(SqliteStore::open_in_memory().unwrap());
        store.initialize().unwrap();
        (AccessController::new(store.clone()), store)
    }

    fn logged_in(username: &str, role: Option<Role>) -> Session {
        Session {
            logged_in: true,
            username: username.to_string(),
            role,
        }
    }

    #[test]
    fn dispatch_follows_the_role_table() {
        let (access, _store) = controller_with_store();
        assert_eq!(access.view_for(&Session::default()), View::Login);
        assert_eq!(
            access.view_for(&logged_in("root", Some(Role::Admin))),
            View::AdminDashboard
        );
        assert_eq!(
            access.view_for(&logged_in("a", Some(Role::Analyst))),
            View::PasswordChange
        );
        assert_eq!(
            access.view_for(&logged_in("v", Some(Role::Viewer))),
            View::PasswordChange
        );
        assert_eq!(
            access.view_for(&logged_in("legacy", None)),
            View::UnknownRoleError
        );
    }

    #[test]
    fn non_admin_may_only_register_viewers() {
        let (access, _store) = controller_with_store();
        let anonymous = Session::default();
        assert!(access.authorize_register(&anonymous, Role::Viewer).is_ok());
        assert!(access.authorize_register(&anonymous, Role::Admin).is_err());

        let viewer = logged_in("v", Some(Role::Viewer));
        assert!(access.authorize_register(&viewer, Role::Analyst).is_err());

        let admin = logged_in("root", Some(Role::Admin));
        assert!(access.authorize_register(&admin, Role::Admin).is_ok());
    }

    #[test]
    fn admin_cannot_change_own_role() {
        let (access, store) = controller_with_store();
        store.register("root", "hash", Role::Admin).unwrap();
        let admin = logged_in("root", Some(Role::Admin));
        let err = access
            .authorize_role_update(&admin, "root", Role::Viewer)
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn last_admin_cannot_be_demoted_even_by_a_stale_admin_session() {
        let (access, store) = controller_with_store();
        store.register("root", "hash", Role::Admin).unwrap();
        // "ghost" was an admin once; its session is stale.
        let ghost = logged_in("ghost", Some(Role::Admin));
        let err = access
            .authorize_role_update(&ghost, "root", Role::Viewer)
            .unwrap_err();
        assert!(matches!(err, AppError::Forbidden(_)));
    }

    #[test]
    fn demoting_one_of_two_admins_is_allowed() {
        let (access, store) = controller_with_store();
        store.register("root", "hash", Role::Admin).unwrap();
        store.register("root2", "hash", Role::Admin).unwrap();
        let admin = logged_in("root", Some(Role::Admin));
        assert!(access
            .authorize_role_update(&admin, "root2", Role::Analyst)
            .is_ok());
    }

    #[test]
    fn role_update_on_missing_user_is_not_found() {
        let (access, store) = controller_with_store();
        store.register("root", "hash", Role::Admin).unwrap();
        let admin = logged_in("root", Some(Role::Admin));
        let err = access
            .authorize_role_update(&admin, "nobody", Role::Viewer)
            .unwrap_err();
        assert!(matches!(err, AppError::UserNotFound(_)));
    }

    #[test]
    fn unknown_role_session_may_do_nothing_but_log_out() {
        let (access, store) = controller_with_store();
        store.register("other", "hash", Role::Admin).unwrap();
        // Logged in, but the persisted role was outside the known set.
        let stranded = logged_in("legacy", None);

        assert!(matches!(
            access.authorize_password_change(&stranded, "legacy"),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            access.authorize_register(&stranded, Role::Viewer),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            access.authorize_role_update(&stranded, "other", Role::Viewer),
            Err(AppError::Forbidden(_))
        ));
        assert!(matches!(
            access.authorize_list(&stranded),
            Err(AppError::Forbidden(_))
        ));

        // An anonymous session is not in that state and may still
        // self-register as a viewer.
        assert!(access
            .authorize_register(&Session::default(), Role::Viewer)
            .is_ok());
    }

    #[test]
    fn password_change_is_self_or_admin() {
        let (access, _store) = controller_with_store();
        let viewer = logged_in("alice", Some(Role::Viewer));
        assert!(access.authorize_password_change(&viewer, "alice").is_ok());
        assert!(access.authorize_password_change(&viewer, "bob").is_err());

        let admin = logged_in("root", Some(Role::Admin));
        assert!(access.authorize_password_change(&admin, "bob").is_ok());

        assert!(access
            .authorize_password_change(&Session::default(), "alice")
            .is_err());
    }
}
