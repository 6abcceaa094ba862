use serde_json::Value;
use tracing::{info, warn};

use crate::api::ApiService;
use crate::error::ApiError;
use crate::models::{AuthData, Profile, RegisterRequest, Role, User};

#[derive(Debug, Clone)]
pub enum AuthOutcome {
    Success(User),
    Failure(String),
}

impl AuthOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, AuthOutcome::Success(_))
    }
}

/// Who is signed in. Created once per run and handed by reference to every
/// command that needs it.
pub struct Session {
    api: ApiService,
    user: Option<User>,
    profile: Option<Profile>,
    loading: bool,
    error: Option<String>,
}

impl Session {
    pub fn new(api: ApiService) -> Self {
        Self {
            api,
            user: None,
            profile: None,
            loading: true,
            error: None,
        }
    }

    pub fn api(&self) -> &ApiService {
        &self.api
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|u| u.role)
    }

    pub fn is_organization(&self) -> bool {
        self.role() == Some(Role::Organization)
    }

    pub fn is_employee(&self) -> bool {
        self.role() == Some(Role::Employee)
    }

    /// Restores the session from a stored token. Any failure means "signed
    /// out" and the token is discarded.
    pub fn init(&mut self) {
        if self.api.get_token().is_some() {
            match self.api.current_user().and_then(|data| self.adopt(data)) {
                Ok(()) => {
                    if let Some(user) = &self.user {
                        info!(email = %user.email, role = user.role.as_str(), "session restored");
                    }
                }
                Err(e) => {
                    warn!(error = %e, "stored session rejected, discarding token");
                    self.clear();
                    if let Err(e) = self.api.remove_token() {
                        warn!(error = %e, "failed to remove stored token");
                    }
                }
            }
        }
        self.loading = false;
    }

    pub fn login(&mut self, email: &str, password: &str) -> AuthOutcome {
        self.error = None;
        self.loading = true;
        let result = self.api.login(email, password).and_then(|data| self.establish(data));
        self.loading = false;
        self.outcome(result, "login")
    }

    pub fn register(&mut self, request: &RegisterRequest) -> AuthOutcome {
        self.error = None;
        self.loading = true;
        let result = self
            .api
            .register(request)
            .and_then(|data| self.establish(data));
        self.loading = false;
        self.outcome(result, "register")
    }

    /// Best-effort server logout; local state is cleared regardless.
    pub fn logout(&mut self) {
        if let Err(e) = self.api.logout() {
            warn!(error = %e, "server logout failed");
        }
        self.clear();
        if let Err(e) = self.api.remove_token() {
            warn!(error = %e, "failed to remove stored token");
        }
        info!("logged out");
    }

    pub fn update_profile(&mut self, changes: &Value) -> Result<&Profile, ApiError> {
        self.error = None;
        let role = self
            .role()
            .ok_or_else(|| ApiError::validation("Log in before updating your profile."))?;

        let result = match role {
            Role::Employee => self.api.update_employee_profile(changes),
            Role::Organization => self.api.update_organization_profile(changes),
        }
        .and_then(|data| {
            let value = data.get("profile").cloned().unwrap_or(data);
            Profile::decode(role, value)
        });

        match result {
            Ok(profile) => Ok(self.profile.insert(profile)),
            Err(e) => {
                self.error = Some(e.to_string());
                Err(e)
            }
        }
    }

    pub fn clear_error(&mut self) {
        self.error = None;
    }

    fn establish(&mut self, data: AuthData) -> Result<User, ApiError> {
        let token = data
            .token
            .clone()
            .ok_or_else(|| ApiError::Decode("server did not return a token".to_string()))?;
        // adopt() only assigns once decoding succeeded, so a failure here
        // leaves user and profile as they were.
        if let Err(e) = self.api.set_token(&token).and_then(|()| self.adopt(data)) {
            if let Err(e) = self.api.remove_token() {
                warn!(error = %e, "failed to remove stored token");
            }
            return Err(e);
        }
        self.user
            .clone()
            .ok_or_else(|| ApiError::Decode("server did not return a user".to_string()))
    }

    fn adopt(&mut self, data: AuthData) -> Result<(), ApiError> {
        let profile = match data.profile {
            Some(Value::Null) | None => None,
            Some(value) => Some(Profile::decode(data.user.role, value)?),
        };
        self.user = Some(data.user);
        self.profile = profile;
        Ok(())
    }

    fn outcome(&mut self, result: Result<User, ApiError>, action: &str) -> AuthOutcome {
        match result {
            Ok(user) => {
                info!(email = %user.email, role = user.role.as_str(), action, "authenticated");
                AuthOutcome::Success(user)
            }
            Err(e) => {
                warn!(error = %e, action, "authentication failed");
                let message = e.to_string();
                self.error = Some(message.clone());
                AuthOutcome::Failure(message)
            }
        }
    }

    fn clear(&mut self) {
        self.user = None;
        self.profile = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::TokenStore;
    use crate::api::testing::{StubTransport, stub_service, success};
    use crate::models::RegisterDetails;
    use serde_json::json;
    use std::sync::Arc;

    fn employee_auth(token: &str) -> Value {
        success(json!({
            "token": token,
            "user": { "_id": "u1", "email": "jane@x.com", "role": "employee" },
            "profile": { "personalInfo": { "firstName": "Jane", "lastName": "Doe" } }
        }))
    }

    #[test]
    fn test_login_with_invalid_credentials_leaves_session_empty() {
        let (api, transport, tokens) = stub_service();
        transport.push_json(401, json!({ "status": "error", "message": "Invalid credentials" }));
        let mut session = Session::new(api);
        session.init();

        let outcome = session.login("jane@x.com", "wrong");
        assert!(!outcome.is_success());
        assert!(session.user().is_none());
        assert!(session.profile().is_none());
        assert_eq!(session.error(), Some("Invalid credentials"));
        assert!(!session.is_authenticated());
        assert!(!session.loading());
        assert_eq!(tokens.get_token(), None);
    }

    #[test]
    fn test_login_success_stores_user_profile_and_token() {
        let (api, transport, tokens) = stub_service();
        transport.push_json(200, employee_auth("tok1"));
        let mut session = Session::new(api);

        assert!(session.login("jane@x.com", "pw").is_success());
        assert!(session.is_authenticated());
        assert!(session.is_employee());
        assert!(!session.is_organization());
        assert_eq!(session.profile().unwrap().display_name(), "Jane Doe");
        assert_eq!(tokens.get_token().as_deref(), Some("tok1"));
    }

    struct ReadOnlyTokens;

    impl TokenStore for ReadOnlyTokens {
        fn get_token(&self) -> Option<String> {
            None
        }

        fn set_token(&self, _token: &str) -> Result<(), ApiError> {
            Err(ApiError::Storage("read-only".to_string()))
        }

        fn remove_token(&self) -> Result<(), ApiError> {
            Ok(())
        }
    }

    #[test]
    fn test_login_stays_signed_out_when_token_cannot_be_saved() {
        let transport = Arc::new(StubTransport::default());
        transport.push_json(200, employee_auth("tok1"));
        let mut session = Session::new(ApiService::new(transport, Arc::new(ReadOnlyTokens)));

        let outcome = session.login("jane@x.com", "pw");
        assert!(!outcome.is_success());
        assert!(!session.is_authenticated());
        assert!(session.profile().is_none());
        assert!(session.error().is_some());
    }

    #[test]
    fn test_register_persists_token_like_login() {
        let (api, transport, tokens) = stub_service();
        transport.push_json(
            201,
            success(json!({
                "token": "tok2",
                "user": { "_id": "u2", "email": "hr@acme.in", "role": "organization" },
                "profile": { "name": "Acme" }
            })),
        );
        let mut session = Session::new(api);
        let request = RegisterRequest {
            email: "hr@acme.in".to_string(),
            password: "pw".to_string(),
            role: Role::Organization,
            details: RegisterDetails::Organization {
                name: "Acme".to_string(),
                description: String::new(),
                industry: "Technology".to_string(),
                size: "11-50".to_string(),
            },
        };

        assert!(session.register(&request).is_success());
        assert!(session.is_organization());
        assert_eq!(tokens.get_token().as_deref(), Some("tok2"));
    }

    #[test]
    fn test_logout_clears_everything_even_when_server_fails() {
        let (api, transport, tokens) = stub_service();
        transport.push_json(200, employee_auth("tok1"));
        let mut session = Session::new(api);
        session.login("jane@x.com", "pw");

        transport.push_transport_error("connection reset");
        session.logout();

        assert!(session.user().is_none());
        assert!(session.profile().is_none());
        assert_eq!(tokens.get_token(), None);
    }

    #[test]
    fn test_init_restores_session_from_token() {
        let (api, transport, tokens) = stub_service();
        tokens.set_token("tok1").unwrap();
        transport.push_json(200, employee_auth("tok1"));
        let mut session = Session::new(api);
        assert!(session.loading());

        session.init();
        assert!(!session.loading());
        assert!(session.is_employee());
        assert_eq!(transport.last_request().path, "/auth/me");
    }

    #[test]
    fn test_init_discards_rejected_token() {
        let (api, transport, tokens) = stub_service();
        tokens.set_token("expired").unwrap();
        transport.push_json(401, json!({ "status": "error", "message": "Token expired" }));
        let mut session = Session::new(api);

        session.init();
        assert!(!session.loading());
        assert!(!session.is_authenticated());
        assert_eq!(tokens.get_token(), None);
        assert_eq!(session.error(), None);
    }

    #[test]
    fn test_init_without_token_makes_no_request() {
        let (api, transport, _) = stub_service();
        let mut session = Session::new(api);
        session.init();
        assert!(transport.requests().is_empty());
        assert!(!session.loading());
    }

    #[test]
    fn test_update_profile_routes_by_role() {
        let (api, transport, _) = stub_service();
        transport.push_json(200, employee_auth("tok1"));
        let mut session = Session::new(api);
        session.login("jane@x.com", "pw");

        transport.push_json(
            200,
            success(json!({ "profile": { "personalInfo": { "firstName": "Janet", "lastName": "Doe" } } })),
        );
        let profile = session
            .update_profile(&json!({ "personalInfo": { "firstName": "Janet" } }))
            .unwrap();
        assert_eq!(profile.display_name(), "Janet Doe");
        assert_eq!(transport.last_request().path, "/employees/profile");
    }
}
