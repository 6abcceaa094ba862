use serde::Deserialize;
use serde_json::Value;
use tracing::{info, warn};

use crate::api::ApiService;
use crate::error::ApiError;
use crate::models::{Application, Opportunity, OrganizationProfile, Role};
use crate::notify::{Notification, Notifier};

const MISSING_ORGANIZATION_PROFILE: &str = "Organization profile not found";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeeStats {
    pub total_applications: u64,
    pub pending_applications: u64,
    pub shortlisted_applications: u64,
    pub accepted_applications: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct EmployeeDashboard {
    pub stats: EmployeeStats,
    pub recent_applications: Vec<Application>,
    pub recommended_opportunities: Vec<Opportunity>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizationStats {
    pub total_opportunities: u64,
    pub active_opportunities: u64,
    pub total_applications: u64,
    pub pending_applications: u64,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OrganizationDashboard {
    pub organization: Option<OrganizationProfile>,
    pub stats: OrganizationStats,
    pub recent_applications: Vec<Application>,
    pub opportunities_with_stats: Vec<Opportunity>,
}

#[derive(Debug, Clone)]
pub enum DashboardData {
    Employee(EmployeeDashboard),
    Organization(OrganizationDashboard),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Overview,
    Applications,
    Opportunities,
    Recommendations,
    Profile,
    Analytics,
}

impl Tab {
    pub fn for_role(role: Role) -> &'static [Tab] {
        match role {
            Role::Employee => &[
                Tab::Overview,
                Tab::Applications,
                Tab::Opportunities,
                Tab::Recommendations,
                Tab::Profile,
            ],
            Role::Organization => &[
                Tab::Overview,
                Tab::Opportunities,
                Tab::Applications,
                Tab::Analytics,
            ],
        }
    }

    pub fn title(&self) -> &'static str {
        match self {
            Tab::Overview => "Overview",
            Tab::Applications => "Applications",
            Tab::Opportunities => "Opportunities",
            Tab::Recommendations => "Recommendations",
            Tab::Profile => "Profile & Skills",
            Tab::Analytics => "Analytics",
        }
    }
}

impl std::str::FromStr for Tab {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "overview" => Ok(Tab::Overview),
            "applications" => Ok(Tab::Applications),
            "opportunities" => Ok(Tab::Opportunities),
            "recommendations" => Ok(Tab::Recommendations),
            "profile" => Ok(Tab::Profile),
            "analytics" => Ok(Tab::Analytics),
            other => Err(format!("Unknown tab '{}'", other)),
        }
    }
}

/// A role's dashboard plus which tab is showing. Tab switches never refetch
/// the summary; the employee opportunities list loads on first visit.
pub struct DashboardView {
    role: Role,
    tab: Tab,
    pub data: Option<DashboardData>,
    pub browse: Option<Vec<Opportunity>>,
}

impl DashboardView {
    pub fn load(api: &ApiService, role: Role, notifier: &dyn Notifier) -> Self {
        let data = match role {
            Role::Employee => load_employee(api).map(DashboardData::Employee),
            Role::Organization => load_organization(api).map(DashboardData::Organization),
        };
        let data = match data {
            Ok(data) => {
                info!(role = role.as_str(), "dashboard loaded");
                Some(data)
            }
            Err(e) => {
                warn!(role = role.as_str(), error = %e, "failed to fetch dashboard data");
                notifier.notify(Notification::from_error("Error", &e));
                None
            }
        };
        Self {
            role,
            tab: Tab::Overview,
            data,
            browse: None,
        }
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn tab(&self) -> Tab {
        self.tab
    }

    /// Switches tab. Returns false for a tab this role does not have.
    pub fn select(&mut self, tab: Tab, api: &ApiService, notifier: &dyn Notifier) -> bool {
        if !Tab::for_role(self.role).contains(&tab) {
            return false;
        }
        self.tab = tab;
        if self.role == Role::Employee && tab == Tab::Opportunities && self.browse.is_none() {
            match api.employee_opportunities(vec![]) {
                Ok(list) => self.browse = Some(list.opportunities),
                Err(e) => {
                    warn!(error = %e, "failed to fetch opportunities");
                    notifier.notify(Notification::from_error("Error", &e));
                }
            }
        }
        true
    }
}

fn load_employee(api: &ApiService) -> Result<EmployeeDashboard, ApiError> {
    decode(api.employee_dashboard()?)
}

/// A missing organization profile is a normal state for a fresh account.
fn load_organization(api: &ApiService) -> Result<OrganizationDashboard, ApiError> {
    match api.organization_dashboard() {
        Ok(value) => decode(value),
        Err(e) if e.to_string().contains(MISSING_ORGANIZATION_PROFILE) => {
            info!("organization profile missing, showing empty dashboard");
            Ok(OrganizationDashboard::default())
        }
        Err(e) => Err(e),
    }
}

fn decode<T: serde::de::DeserializeOwned + Default>(value: Value) -> Result<T, ApiError> {
    if value.is_null() {
        return Ok(T::default());
    }
    serde_json::from_value(value).map_err(|e| ApiError::Decode(e.to_string()))
}
