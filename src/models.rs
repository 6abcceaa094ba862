use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::ApiError;

// --- Users and profiles ---

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Organization,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Organization => "organization",
            Role::Employee => "employee",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    pub email: String,
    pub role: Role,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeePersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub phone: String,
    pub date_of_birth: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillLevel {
    Beginner,
    #[default]
    Intermediate,
    Advanced,
    Expert,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SkillCategory {
    #[default]
    Technical,
    Soft,
    Language,
    Other,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Skill {
    pub name: String,
    #[serde(default)]
    pub level: SkillLevel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<SkillCategory>,
    #[serde(default)]
    pub years_of_experience: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterestCategory {
    Technology,
    Business,
    Design,
    Marketing,
    Science,
    Arts,
    Sports,
    Travel,
    Food,
    Music,
    Gaming,
    Fitness,
    Education,
    Environment,
    SocialImpact,
    #[default]
    Other,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterestLevel {
    Casual,
    #[default]
    Moderate,
    Passionate,
    Professional,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Interest {
    pub name: String,
    #[serde(default)]
    pub category: InterestCategory,
    #[serde(default)]
    pub level: InterestLevel,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeeProfile {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub personal_info: EmployeePersonalInfo,
    pub skills: Vec<Skill>,
    pub interests: Vec<Interest>,
    pub location: Address,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizationProfile {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub description: String,
    pub industry: String,
    pub size: String,
    pub location: Address,
    pub website: Option<String>,
}

/// The profile shape is dictated by the user's role.
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum Profile {
    Organization(OrganizationProfile),
    Employee(EmployeeProfile),
}

impl Profile {
    pub fn decode(role: Role, value: Value) -> Result<Self, ApiError> {
        let profile = match role {
            Role::Organization => Profile::Organization(
                serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))?,
            ),
            Role::Employee => Profile::Employee(
                serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))?,
            ),
        };
        Ok(profile)
    }

    pub fn role(&self) -> Role {
        match self {
            Profile::Organization(_) => Role::Organization,
            Profile::Employee(_) => Role::Employee,
        }
    }

    pub fn as_employee(&self) -> Option<&EmployeeProfile> {
        match self {
            Profile::Employee(p) => Some(p),
            Profile::Organization(_) => None,
        }
    }

    pub fn display_name(&self) -> String {
        match self {
            Profile::Organization(org) => org.name.clone(),
            Profile::Employee(emp) => format!(
                "{} {}",
                emp.personal_info.first_name, emp.personal_info.last_name
            )
            .trim()
            .to_string(),
        }
    }
}

/// Payload of a successful login, register or "who am I" call.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthData {
    #[serde(default)]
    pub token: Option<String>,
    pub user: User,
    #[serde(default)]
    pub profile: Option<Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub role: Role,
    #[serde(flatten)]
    pub details: RegisterDetails,
}

#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum RegisterDetails {
    #[serde(rename_all = "camelCase")]
    Employee {
        first_name: String,
        last_name: String,
        phone: String,
    },
    Organization {
        name: String,
        description: String,
        industry: String,
        size: String,
    },
}

// --- Opportunities ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LocationType {
    Remote,
    #[default]
    OnSite,
    Hybrid,
}

impl LocationType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LocationType::Remote => "remote",
            LocationType::OnSite => "on-site",
            LocationType::Hybrid => "hybrid",
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OpportunityLocation {
    #[serde(rename = "type")]
    pub kind: LocationType,
    pub address: Option<String>,
    pub city: Option<String>,
    pub state: Option<String>,
    pub country: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Compensation {
    #[serde(rename = "type")]
    pub kind: String,
    pub amount: Option<f64>,
    pub currency: Option<String>,
    pub benefits: Vec<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Schedule {
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub hours_per_week: Option<u32>,
    pub duration: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RequiredSkill {
    pub name: String,
    pub level: Option<String>,
    pub required: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Requirements {
    pub skills: Vec<RequiredSkill>,
    pub experience: Option<Value>,
    pub education: Option<Value>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationWindow {
    pub deadline: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Logo {
    pub url: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizationSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub name: String,
    pub industry: String,
    pub size: String,
    pub location: Address,
    pub logo: Option<Logo>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct OpportunityMetrics {
    pub views: u64,
    pub applications: u64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Opportunity {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    pub description: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    pub location: OpportunityLocation,
    pub compensation: Compensation,
    pub schedule: Schedule,
    pub requirements: Requirements,
    pub benefits: Vec<String>,
    pub application: ApplicationWindow,
    pub organization: Option<OrganizationSummary>,
    pub status: Option<String>,
    pub metrics: OpportunityMetrics,
    pub created_at: Option<String>,
    pub updated_at: Option<String>,
}

impl Opportunity {
    pub fn organization_name(&self) -> &str {
        self.organization
            .as_ref()
            .map(|o| o.name.as_str())
            .unwrap_or("Unknown organization")
    }

    /// Address of the posting, falling back to the organization's city/state.
    pub fn location_display(&self) -> String {
        if let Some(address) = self.location.address.as_deref().filter(|a| !a.is_empty()) {
            return address.to_string();
        }
        if let Some(city) = self.location.city.as_deref().filter(|c| !c.is_empty()) {
            return city.to_string();
        }
        match &self.organization {
            Some(org) if !org.location.city.is_empty() => {
                format!("{}, {}", org.location.city, org.location.state)
            }
            _ => self.location.kind.as_str().to_string(),
        }
    }
}

// --- Applications ---

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PersonalInfo {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub country: String,
    pub date_of_birth: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EducationEntry {
    pub institution: String,
    pub degree: String,
    pub field_of_study: String,
    pub start_date: String,
    pub end_date: String,
    pub is_current: bool,
    pub gpa: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExperienceEntry {
    pub title: String,
    pub company: String,
    pub location: String,
    pub start_date: String,
    pub end_date: String,
    pub is_current: bool,
    pub description: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum WorkMode {
    Remote,
    OnSite,
    #[default]
    Hybrid,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Availability {
    pub start_date: String,
    pub hours_per_week: u32,
    pub work_mode: WorkMode,
}

impl Default for Availability {
    fn default() -> Self {
        Self {
            start_date: String::new(),
            hours_per_week: 40,
            work_mode: WorkMode::Hybrid,
        }
    }
}

/// A document attached to an application: either a local file chosen in the
/// wizard or a stored file the server hands back with a URL.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DocumentRef {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Documents {
    pub resume: Option<DocumentRef>,
    #[serde(alias = "coverLetter")]
    pub cover_letter_file: Option<DocumentRef>,
    pub portfolio: String,
    pub linkedin: String,
    pub github: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AdditionalInfo {
    pub why_interested: String,
    pub relevant_experience: String,
    pub questions: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApplicationStatus {
    Submitted,
    Reviewing,
    Shortlisted,
    #[serde(alias = "interview-scheduled")]
    Interview,
    Accepted,
    Rejected,
    Withdrawn,
}

impl ApplicationStatus {
    pub const ALL: [ApplicationStatus; 7] = [
        ApplicationStatus::Submitted,
        ApplicationStatus::Reviewing,
        ApplicationStatus::Shortlisted,
        ApplicationStatus::Interview,
        ApplicationStatus::Accepted,
        ApplicationStatus::Rejected,
        ApplicationStatus::Withdrawn,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Submitted => "submitted",
            ApplicationStatus::Reviewing => "reviewing",
            ApplicationStatus::Shortlisted => "shortlisted",
            ApplicationStatus::Interview => "interview",
            ApplicationStatus::Accepted => "accepted",
            ApplicationStatus::Rejected => "rejected",
            ApplicationStatus::Withdrawn => "withdrawn",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            ApplicationStatus::Accepted | ApplicationStatus::Rejected | ApplicationStatus::Withdrawn
        )
    }
}

impl std::fmt::Display for ApplicationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ApplicationStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "submitted" => Ok(ApplicationStatus::Submitted),
            "reviewing" => Ok(ApplicationStatus::Reviewing),
            "shortlisted" => Ok(ApplicationStatus::Shortlisted),
            "interview" | "interview-scheduled" => Ok(ApplicationStatus::Interview),
            "accepted" => Ok(ApplicationStatus::Accepted),
            "rejected" => Ok(ApplicationStatus::Rejected),
            "withdrawn" => Ok(ApplicationStatus::Withdrawn),
            other => Err(format!(
                "Unknown status '{}'. Expected one of: submitted, reviewing, shortlisted, \
                 interview, accepted, rejected, withdrawn",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ApplicationNote {
    pub note: String,
    pub added_by: Option<String>,
    pub added_at: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InterviewType {
    #[default]
    Video,
    Phone,
    InPerson,
}

impl InterviewType {
    pub fn as_str(&self) -> &'static str {
        match self {
            InterviewType::Video => "video",
            InterviewType::Phone => "phone",
            InterviewType::InPerson => "in-person",
        }
    }
}

impl std::str::FromStr for InterviewType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "video" => Ok(InterviewType::Video),
            "phone" => Ok(InterviewType::Phone),
            "in-person" | "in person" | "inperson" => Ok(InterviewType::InPerson),
            other => Err(format!(
                "Unknown interview type '{}'. Expected video, phone or in-person",
                other
            )),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InterviewStatus {
    #[default]
    Scheduled,
    Completed,
    Cancelled,
}

fn default_duration() -> u32 {
    60
}

/// Interview scheduling data carried as a first-class field of an application.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InterviewDetails {
    #[serde(default)]
    pub date: String,
    #[serde(default)]
    pub time: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub datetime: Option<String>,
    #[serde(default = "default_duration")]
    pub duration: u32,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<InterviewType>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meeting_link: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default)]
    pub interviewer: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub interviewer_email: Option<String>,
    #[serde(default)]
    pub status: InterviewStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scheduled_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeeSummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub personal_info: EmployeePersonalInfo,
    pub skills: Vec<Skill>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OpportunitySummary {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    pub title: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub category: String,
    pub organization: Option<OrganizationSummary>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Application {
    #[serde(rename = "_id", alias = "id")]
    pub id: String,
    #[serde(default)]
    pub employee: Option<EmployeeSummary>,
    #[serde(default)]
    pub opportunity: Option<OpportunitySummary>,
    #[serde(default)]
    pub organization: Option<OrganizationSummary>,
    pub status: ApplicationStatus,
    #[serde(default)]
    pub personal_info: PersonalInfo,
    #[serde(default)]
    pub education: Vec<EducationEntry>,
    #[serde(default)]
    pub experience: Vec<ExperienceEntry>,
    #[serde(default)]
    pub skills: Vec<Skill>,
    #[serde(default)]
    pub cover_letter: String,
    #[serde(default)]
    pub availability: Availability,
    #[serde(default)]
    pub documents: Documents,
    #[serde(default)]
    pub additional_info: AdditionalInfo,
    #[serde(default)]
    pub notes: Vec<ApplicationNote>,
    #[serde(default)]
    pub interview_data: Option<InterviewDetails>,
    #[serde(default)]
    pub submitted_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub updated_at: Option<String>,
}

impl Application {
    pub fn applicant_name(&self) -> String {
        let info = &self.personal_info;
        let name = format!("{} {}", info.first_name, info.last_name);
        if !name.trim().is_empty() {
            return name.trim().to_string();
        }
        match &self.employee {
            Some(emp) => format!(
                "{} {}",
                emp.personal_info.first_name, emp.personal_info.last_name
            )
            .trim()
            .to_string(),
            None => "Unknown applicant".to_string(),
        }
    }

    pub fn opportunity_title(&self) -> &str {
        self.opportunity
            .as_ref()
            .map(|o| o.title.as_str())
            .unwrap_or("Unknown opportunity")
    }

    pub fn organization_name(&self) -> Option<&str> {
        self.organization
            .as_ref()
            .or_else(|| self.opportunity.as_ref().and_then(|o| o.organization.as_ref()))
            .map(|o| o.name.as_str())
    }
}

// --- Recommendations ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchScores {
    pub overall: f64,
    pub skills: f64,
    pub interests: f64,
    pub location: f64,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Recommendation {
    pub opportunity: Opportunity,
    #[serde(default)]
    pub scores: MatchScores,
    #[serde(default)]
    pub match_reasons: Vec<String>,
}

// --- Response envelopes ---

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    #[default]
    Success,
    Error,
    #[serde(other)]
    Unknown,
}

/// `{status, message?, data}` wrapper every endpoint responds with.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub status: ResponseStatus,
    #[serde(default)]
    pub message: Option<String>,
    pub data: Option<T>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub page: u32,
    pub limit: u32,
    pub total: u64,
    pub pages: u32,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OpportunityList {
    pub opportunities: Vec<Opportunity>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct OpportunityEnvelope {
    pub opportunity: Option<Opportunity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApplicationList {
    pub applications: Vec<Application>,
    pub pagination: Option<Pagination>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ApplicationEnvelope {
    pub application: Option<Application>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RecommendationList {
    pub recommendations: Vec<Recommendation>,
}
