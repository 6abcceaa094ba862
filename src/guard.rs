use crate::models::Role;
use crate::session::Session;

/// Where a command wants to send the user instead of running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Landing,
    Login,
    Home,
    OrganizationDashboard,
    EmployeeDashboard,
}

impl Route {
    /// What to type next, printed when a command is refused.
    pub fn hint(&self) -> &'static str {
        match self {
            Route::Landing => "This command is not available for your account. Try `inkaranya feed`.",
            Route::Login => "You need to log in first: `inkaranya login <email>`",
            Route::Home => "You are already logged in. Try `inkaranya dashboard`.",
            Route::OrganizationDashboard => {
                "You are logged in as an organization. Try `inkaranya dashboard`."
            }
            Route::EmployeeDashboard => "You are logged in as an employee. Try `inkaranya dashboard`.",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Guard {
    Protected,
    Role(Role),
    Public,
    Index,
    Home,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Pending,
    Allow,
    Redirect(Route),
}

impl Guard {
    pub fn check(&self, session: &Session) -> Access {
        if session.loading() {
            return Access::Pending;
        }
        let role = session.role();
        match (self, role) {
            (Guard::Protected, None) | (Guard::Role(_), None) => Access::Redirect(Route::Login),
            (Guard::Role(required), Some(role)) if *required != role => {
                Access::Redirect(Route::Landing)
            }
            (Guard::Public, Some(Role::Organization)) => {
                Access::Redirect(Route::OrganizationDashboard)
            }
            (Guard::Public, Some(Role::Employee)) => Access::Redirect(Route::EmployeeDashboard),
            (Guard::Index, Some(_)) => Access::Redirect(Route::Home),
            (Guard::Home, None) => Access::Redirect(Route::Landing),
            _ => Access::Allow,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{stub_service, success};
    use serde_json::json;

    fn signed_in(role: &str) -> Session {
        let (api, transport, _) = stub_service();
        transport.push_json(
            200,
            success(json!({
                "token": "t",
                "user": { "_id": "u1", "email": "a@b.c", "role": role }
            })),
        );
        let mut session = Session::new(api);
        session.init();
        session.login("a@b.c", "pw");
        session
    }

    fn signed_out() -> Session {
        let (api, _, _) = stub_service();
        let mut session = Session::new(api);
        session.init();
        session
    }

    #[test]
    fn test_pending_while_loading() {
        let (api, _, _) = stub_service();
        let session = Session::new(api);
        assert_eq!(Guard::Protected.check(&session), Access::Pending);
        assert_eq!(Guard::Public.check(&session), Access::Pending);
    }

    #[test]
    fn test_protected_requires_login() {
        assert_eq!(
            Guard::Protected.check(&signed_out()),
            Access::Redirect(Route::Login)
        );
        assert_eq!(Guard::Protected.check(&signed_in("employee")), Access::Allow);
    }

    #[test]
    fn test_role_guard_redirects_wrong_role_to_landing() {
        let guard = Guard::Role(Role::Organization);
        assert_eq!(guard.check(&signed_in("organization")), Access::Allow);
        assert_eq!(
            guard.check(&signed_in("employee")),
            Access::Redirect(Route::Landing)
        );
        assert_eq!(guard.check(&signed_out()), Access::Redirect(Route::Login));
    }

    #[test]
    fn test_public_sends_signed_in_users_to_their_dashboard() {
        assert_eq!(Guard::Public.check(&signed_out()), Access::Allow);
        assert_eq!(
            Guard::Public.check(&signed_in("organization")),
            Access::Redirect(Route::OrganizationDashboard)
        );
        assert_eq!(
            Guard::Public.check(&signed_in("employee")),
            Access::Redirect(Route::EmployeeDashboard)
        );
    }

    #[test]
    fn test_index_and_home() {
        assert_eq!(Guard::Index.check(&signed_out()), Access::Allow);
        assert_eq!(
            Guard::Index.check(&signed_in("employee")),
            Access::Redirect(Route::Home)
        );
        assert_eq!(
            Guard::Home.check(&signed_out()),
            Access::Redirect(Route::Landing)
        );
        assert_eq!(Guard::Home.check(&signed_in("employee")), Access::Allow);
    }
}
