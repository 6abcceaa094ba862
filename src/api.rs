use percent_encoding::{AsciiSet, NON_ALPHANUMERIC, utf8_percent_encode};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tracing::{debug, warn};

use crate::error::ApiError;
use crate::models::{
    Application, ApplicationEnvelope, ApplicationList, ApplicationStatus, AuthData, Envelope,
    Interest, InterviewDetails, Opportunity, OpportunityEnvelope, OpportunityList,
    RecommendationList, RegisterRequest, ResponseStatus, Skill,
};

const GENERIC_FAILURE: &str = "Request failed";

/// Everything but RFC 3986 unreserved characters gets escaped.
const COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

/// Escapes a caller-supplied id so it stays a single path segment.
pub fn segment(value: &str) -> String {
    utf8_percent_encode(value, COMPONENT).to_string()
}

// --- Transport seam ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Put => "PUT",
            Method::Delete => "DELETE",
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<Value>,
    pub bearer: Option<String>,
}

impl ApiRequest {
    /// Path plus encoded query string, e.g. `/opportunities?type=internship`.
    /// Used for logging; the HTTP transport hands the pairs to reqwest.
    pub fn endpoint(&self) -> String {
        if self.query.is_empty() {
            return self.path.clone();
        }
        let query = self
            .query
            .iter()
            .map(|(k, v)| {
                format!(
                    "{}={}",
                    utf8_percent_encode(k, COMPONENT),
                    utf8_percent_encode(v, COMPONENT)
                )
            })
            .collect::<Vec<_>>()
            .join("&");
        format!("{}?{}", self.path, query)
    }
}

#[derive(Debug, Clone)]
pub struct RawResponse {
    pub status: u16,
    pub body: String,
}

impl RawResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}

pub trait Transport: Send + Sync {
    fn send(&self, request: &ApiRequest) -> Result<RawResponse, ApiError>;
}

pub struct HttpTransport {
    base_url: String,
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(base_url: &str, timeout: Option<Duration>) -> Result<Self, ApiError> {
        let mut builder = reqwest::blocking::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder.build()?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            client,
        })
    }
}

impl Transport for HttpTransport {
    fn send(&self, request: &ApiRequest) -> Result<RawResponse, ApiError> {
        let url = format!("{}{}", self.base_url, request.path);
        let mut builder = match request.method {
            Method::Get => self.client.get(&url),
            Method::Post => self.client.post(&url),
            Method::Put => self.client.put(&url),
            Method::Delete => self.client.delete(&url),
        };
        if !request.query.is_empty() {
            builder = builder.query(&request.query);
        }
        if let Some(token) = &request.bearer {
            builder = builder.bearer_auth(token);
        }
        if let Some(body) = &request.body {
            builder = builder.json(body);
        }

        let response = builder.send()?;
        let status = response.status().as_u16();
        let body = response.text()?;
        Ok(RawResponse { status, body })
    }
}

// --- Token storage ---

pub trait TokenStore: Send + Sync {
    fn get_token(&self) -> Option<String>;
    fn set_token(&self, token: &str) -> Result<(), ApiError>;
    fn remove_token(&self) -> Result<(), ApiError>;
}

/// Keeps the bearer token in a single file. This is the only state the client
/// persists between runs.
pub struct FileTokenStore {
    path: PathBuf,
}

impl FileTokenStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl TokenStore for FileTokenStore {
    fn get_token(&self) -> Option<String> {
        let token = std::fs::read_to_string(&self.path).ok()?;
        let token = token.trim();
        if token.is_empty() {
            None
        } else {
            Some(token.to_string())
        }
    }

    fn set_token(&self, token: &str) -> Result<(), ApiError> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&self.path, token)?;
        Ok(())
    }

    fn remove_token(&self) -> Result<(), ApiError> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[derive(Default)]
pub struct MemoryTokenStore {
    token: Mutex<Option<String>>,
}

impl MemoryTokenStore {
    pub fn with_token(token: &str) -> Self {
        Self {
            token: Mutex::new(Some(token.to_string())),
        }
    }
}

impl TokenStore for MemoryTokenStore {
    fn get_token(&self) -> Option<String> {
        self.token.lock().ok().and_then(|t| t.clone())
    }

    fn set_token(&self, token: &str) -> Result<(), ApiError> {
        let mut slot = self
            .token
            .lock()
            .map_err(|_| ApiError::Storage("token lock poisoned".to_string()))?;
        *slot = Some(token.to_string());
        Ok(())
    }

    fn remove_token(&self) -> Result<(), ApiError> {
        let mut slot = self
            .token
            .lock()
            .map_err(|_| ApiError::Storage("token lock poisoned".to_string()))?;
        *slot = None;
        Ok(())
    }
}

// --- Request bodies ---

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatusUpdate<'a> {
    pub status: ApplicationStatus,
    pub note: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interview_data: Option<&'a InterviewDetails>,
}

/// Ordered query parameters. Empty values are the caller's business: the
/// filter types decide what to leave out.
pub type Query = Vec<(String, String)>;

// --- API service ---

/// Single point of HTTP access to the backend.
#[derive(Clone)]
pub struct ApiService {
    transport: Arc<dyn Transport>,
    tokens: Arc<dyn TokenStore>,
}

impl ApiService {
    pub fn new(transport: Arc<dyn Transport>, tokens: Arc<dyn TokenStore>) -> Self {
        Self { transport, tokens }
    }

    pub fn get_token(&self) -> Option<String> {
        self.tokens.get_token()
    }

    pub fn set_token(&self, token: &str) -> Result<(), ApiError> {
        self.tokens.set_token(token)
    }

    pub fn remove_token(&self) -> Result<(), ApiError> {
        self.tokens.remove_token()
    }

    /// Sends one request and unwraps the `{status, message, data}` envelope.
    pub fn request(
        &self,
        method: Method,
        path: &str,
        query: Query,
        body: Option<Value>,
    ) -> Result<Envelope<Value>, ApiError> {
        let request = ApiRequest {
            method,
            path: path.to_string(),
            query,
            body,
            bearer: self.tokens.get_token(),
        };
        debug!(method = method.as_str(), endpoint = %request.endpoint(), "api request");

        let response = self.transport.send(&request).map_err(|e| {
            warn!(method = method.as_str(), path, error = %e, "api request failed");
            e
        })?;

        let parsed: Result<Envelope<Value>, _> = serde_json::from_str(&response.body);

        if !response.is_success() {
            let message = parsed
                .ok()
                .and_then(|env| env.message)
                .filter(|m| !m.is_empty())
                .unwrap_or_else(|| GENERIC_FAILURE.to_string());
            warn!(method = method.as_str(), path, status = response.status, %message, "api error response");
            return Err(ApiError::Server {
                status: response.status,
                message,
            });
        }

        let envelope = parsed.map_err(|e| ApiError::Decode(e.to_string()))?;
        if envelope.status == ResponseStatus::Error {
            return Err(ApiError::Server {
                status: response.status,
                message: envelope
                    .message
                    .unwrap_or_else(|| GENERIC_FAILURE.to_string()),
            });
        }
        Ok(envelope)
    }

    fn call<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        query: Query,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let envelope = self.request(method, path, query, body)?;
        let data = envelope
            .data
            .ok_or_else(|| ApiError::Decode(format!("missing data in response to {}", path)))?;
        serde_json::from_value(data).map_err(|e| ApiError::Decode(e.to_string()))
    }

    fn call_or_default<T: DeserializeOwned + Default>(
        &self,
        method: Method,
        path: &str,
        query: Query,
        body: Option<Value>,
    ) -> Result<T, ApiError> {
        let envelope = self.request(method, path, query, body)?;
        match envelope.data {
            Some(Value::Null) | None => Ok(T::default()),
            Some(data) => serde_json::from_value(data).map_err(|e| ApiError::Decode(e.to_string())),
        }
    }

    fn body<T: Serialize>(value: &T) -> Result<Option<Value>, ApiError> {
        serde_json::to_value(value)
            .map(Some)
            .map_err(|e| ApiError::Decode(e.to_string()))
    }

    // --- Authentication ---

    pub fn register(&self, request: &RegisterRequest) -> Result<AuthData, ApiError> {
        self.call(Method::Post, "/auth/register", vec![], Self::body(request)?)
    }

    pub fn login(&self, email: &str, password: &str) -> Result<AuthData, ApiError> {
        self.call(
            Method::Post,
            "/auth/login",
            vec![],
            Some(json!({ "email": email, "password": password })),
        )
    }

    /// Tells the server the session is over. The local token is the caller's
    /// to clear.
    pub fn logout(&self) -> Result<(), ApiError> {
        self.request(Method::Post, "/auth/logout", vec![], None)?;
        Ok(())
    }

    pub fn current_user(&self) -> Result<AuthData, ApiError> {
        self.call(Method::Get, "/auth/me", vec![], None)
    }

    // --- Organizations ---

    pub fn organization_dashboard(&self) -> Result<Value, ApiError> {
        self.call_or_default(Method::Get, "/organizations/dashboard", vec![], None)
    }

    pub fn organization_profile(&self) -> Result<Value, ApiError> {
        self.call_or_default(Method::Get, "/organizations/profile", vec![], None)
    }

    pub fn update_organization_profile(&self, profile: &Value) -> Result<Value, ApiError> {
        self.call_or_default(
            Method::Put,
            "/organizations/profile",
            vec![],
            Some(profile.clone()),
        )
    }

    pub fn organization_opportunities(&self, query: Query) -> Result<OpportunityList, ApiError> {
        self.call_or_default(Method::Get, "/organizations/opportunities", query, None)
    }

    pub fn organization(&self, organization_id: &str) -> Result<Value, ApiError> {
        self.call_or_default(
            Method::Get,
            &format!("/organizations/{}", segment(organization_id)),
            vec![],
            None,
        )
    }

    pub fn organization_applications(&self, query: Query) -> Result<ApplicationList, ApiError> {
        self.call_or_default(Method::Get, "/organizations/applications", query, None)
    }

    // --- Employees ---

    pub fn employee_dashboard(&self) -> Result<Value, ApiError> {
        self.call_or_default(Method::Get, "/employees/dashboard", vec![], None)
    }

    pub fn employee_profile(&self) -> Result<Value, ApiError> {
        self.call_or_default(Method::Get, "/employees/profile", vec![], None)
    }

    pub fn update_employee_profile(&self, profile: &Value) -> Result<Value, ApiError> {
        self.call_or_default(Method::Put, "/employees/profile", vec![], Some(profile.clone()))
    }

    pub fn employee_opportunities(&self, query: Query) -> Result<OpportunityList, ApiError> {
        self.call_or_default(Method::Get, "/employees/opportunities", query, None)
    }

    pub fn employee_applications(&self, query: Query) -> Result<ApplicationList, ApiError> {
        self.call_or_default(Method::Get, "/employees/applications", query, None)
    }

    pub fn employee_recommendations(&self) -> Result<RecommendationList, ApiError> {
        self.call_or_default(Method::Get, "/employees/recommendations", vec![], None)
    }

    // --- Opportunities ---

    pub fn opportunities(&self, query: Query) -> Result<OpportunityList, ApiError> {
        self.call_or_default(Method::Get, "/opportunities", query, None)
    }

    pub fn opportunity(&self, id: &str) -> Result<Opportunity, ApiError> {
        let path = format!("/opportunities/{}", segment(id));
        let envelope: OpportunityEnvelope =
            self.call_or_default(Method::Get, &path, vec![], None)?;
        envelope
            .opportunity
            .ok_or_else(|| ApiError::Decode(format!("opportunity {} missing from response", id)))
    }

    pub fn create_opportunity(&self, payload: &Value) -> Result<Value, ApiError> {
        self.call_or_default(Method::Post, "/opportunities", vec![], Some(payload.clone()))
    }

    pub fn update_opportunity(&self, id: &str, payload: &Value) -> Result<Value, ApiError> {
        self.call_or_default(
            Method::Put,
            &format!("/opportunities/{}", segment(id)),
            vec![],
            Some(payload.clone()),
        )
    }

    pub fn delete_opportunity(&self, id: &str) -> Result<(), ApiError> {
        let path = format!("/opportunities/{}", segment(id));
        self.request(Method::Delete, &path, vec![], None)?;
        Ok(())
    }

    // --- Applications ---

    pub fn submit_application(&self, submission: &Value) -> Result<Option<Application>, ApiError> {
        let envelope: ApplicationEnvelope = self.call_or_default(
            Method::Post,
            "/applications",
            vec![],
            Some(submission.clone()),
        )?;
        Ok(envelope.application)
    }

    pub fn application(&self, id: &str) -> Result<Application, ApiError> {
        let path = format!("/applications/{}", segment(id));
        let envelope: ApplicationEnvelope =
            self.call_or_default(Method::Get, &path, vec![], None)?;
        envelope
            .application
            .ok_or_else(|| ApiError::Decode(format!("application {} missing from response", id)))
    }

    pub fn applications(&self, query: Query) -> Result<ApplicationList, ApiError> {
        self.call_or_default(Method::Get, "/applications", query, None)
    }

    /// `interview_data` is merged into the body only when supplied.
    pub fn update_application_status(
        &self,
        application_id: &str,
        status: ApplicationStatus,
        note: Option<&str>,
        interview_data: Option<&InterviewDetails>,
    ) -> Result<Option<Application>, ApiError> {
        let body = StatusUpdate {
            status,
            note,
            interview_data,
        };
        let envelope: ApplicationEnvelope = self.call_or_default(
            Method::Put,
            &format!("/applications/{}/status", segment(application_id)),
            vec![],
            Self::body(&body)?,
        )?;
        Ok(envelope.application)
    }

    pub fn withdraw_application(&self, application_id: &str) -> Result<Option<Application>, ApiError> {
        let envelope: ApplicationEnvelope = self.call_or_default(
            Method::Put,
            &format!("/applications/{}/withdraw", segment(application_id)),
            vec![],
            None,
        )?;
        Ok(envelope.application)
    }

    // --- Matching ---

    pub fn matching_candidates(&self, opportunity_id: &str, query: Query) -> Result<Value, ApiError> {
        self.call_or_default(
            Method::Get,
            &format!("/matching/opportunities/{}/candidates", segment(opportunity_id)),
            query,
            None,
        )
    }

    pub fn matching_opportunities(&self, employee_id: &str, query: Query) -> Result<Value, ApiError> {
        self.call_or_default(
            Method::Get,
            &format!("/matching/employees/{}/opportunities", segment(employee_id)),
            query,
            None,
        )
    }

    pub fn matching_analytics(&self) -> Result<Value, ApiError> {
        self.call_or_default(Method::Get, "/matching/analytics", vec![], None)
    }

    // --- Recommendations ---

    pub fn recommended_opportunities(&self, query: Query) -> Result<RecommendationList, ApiError> {
        self.call_or_default(Method::Get, "/recommendations/opportunities", query, None)
    }

    pub fn recommended_employees(&self, query: Query) -> Result<Value, ApiError> {
        self.call_or_default(Method::Get, "/recommendations/employees", query, None)
    }

    pub fn update_employee_skills(
        &self,
        skills: &[Skill],
        interests: &[Interest],
    ) -> Result<Value, ApiError> {
        self.call_or_default(
            Method::Post,
            "/recommendations/update-skills",
            vec![],
            Some(json!({ "skills": skills, "interests": interests })),
        )
    }

    pub fn update_organization_requirements(
        &self,
        requirements: &Value,
        culture: &Value,
    ) -> Result<Value, ApiError> {
        self.call_or_default(
            Method::Post,
            "/recommendations/update-requirements",
            vec![],
            Some(json!({ "requirements": requirements, "culture": culture })),
        )
    }

    pub fn match_score(&self, employee_id: &str, organization_id: &str) -> Result<Value, ApiError> {
        self.call_or_default(
            Method::Get,
            &format!(
                "/recommendations/match-score/{}/{}",
                segment(employee_id),
                segment(organization_id)
            ),
            vec![],
            None,
        )
    }

    pub fn health_check(&self) -> Result<Envelope<Value>, ApiError> {
        self.request(Method::Get, "/health", vec![], None)
    }
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::VecDeque;

    /// Replays canned responses in order and records every request it sees.
    #[derive(Default)]
    pub struct StubTransport {
        responses: Mutex<VecDeque<Result<RawResponse, ApiError>>>,
        requests: Mutex<Vec<ApiRequest>>,
    }

    impl StubTransport {
        pub fn push_json(&self, status: u16, body: Value) {
            self.responses.lock().unwrap().push_back(Ok(RawResponse {
                status,
                body: body.to_string(),
            }));
        }

        pub fn push_raw(&self, status: u16, body: &str) {
            self.responses.lock().unwrap().push_back(Ok(RawResponse {
                status,
                body: body.to_string(),
            }));
        }

        pub fn push_transport_error(&self, message: &str) {
            self.responses
                .lock()
                .unwrap()
                .push_back(Err(ApiError::Transport(message.to_string())));
        }

        pub fn requests(&self) -> Vec<ApiRequest> {
            self.requests.lock().unwrap().clone()
        }

        pub fn last_request(&self) -> ApiRequest {
            self.requests
                .lock()
                .unwrap()
                .last()
                .cloned()
                .expect("no request was sent")
        }
    }

    impl Transport for StubTransport {
        fn send(&self, request: &ApiRequest) -> Result<RawResponse, ApiError> {
            self.requests.lock().unwrap().push(request.clone());
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or_else(|| Err(ApiError::Transport("no stubbed response".to_string())))
        }
    }

    pub fn stub_service() -> (ApiService, Arc<StubTransport>, Arc<MemoryTokenStore>) {
        let transport = Arc::new(StubTransport::default());
        let tokens = Arc::new(MemoryTokenStore::default());
        let api = ApiService::new(transport.clone(), tokens.clone());
        (api, transport, tokens)
    }

    pub fn success(data: Value) -> Value {
        json!({ "status": "success", "data": data })
    }
}
