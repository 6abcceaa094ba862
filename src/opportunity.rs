use serde_json::{Value, json};
use tracing::{info, warn};

use crate::api::ApiService;
use crate::error::ApiError;
use crate::models::{LocationType, Opportunity};
use crate::notify::{Notification, Notifier};

/// What an organization fills in to post an opportunity. Text fields are
/// taken as typed; `to_payload` shapes them for the server.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OpportunityDraft {
    pub title: String,
    pub description: String,
    pub kind: String,
    pub category: String,
    pub location: String,
    pub duration: String,
    pub start_date: String,
    pub end_date: String,
    pub requirements: String,
    pub benefits: String,
    pub skills: Vec<String>,
    pub is_paid: bool,
    pub application_deadline: String,
}

impl OpportunityDraft {
    /// Seeds the edit form from a stored opportunity.
    pub fn from_opportunity(opp: &Opportunity) -> Self {
        let location = match opp.location.kind {
            LocationType::Remote => "Remote".to_string(),
            LocationType::Hybrid => "Hybrid".to_string(),
            LocationType::OnSite => opp
                .location
                .city
                .clone()
                .or_else(|| opp.location.address.clone())
                .unwrap_or_default(),
        };
        let requirements = opp
            .requirements
            .experience
            .as_ref()
            .and_then(|e| e.get("required"))
            .and_then(Value::as_array)
            .map(|lines| {
                lines
                    .iter()
                    .filter_map(Value::as_str)
                    .collect::<Vec<_>>()
                    .join(", ")
            })
            .unwrap_or_default();

        Self {
            title: opp.title.clone(),
            description: opp.description.clone(),
            kind: opp.kind.clone(),
            category: opp.category.clone(),
            location,
            duration: opp.schedule.duration.clone().unwrap_or_default(),
            start_date: day(opp.schedule.start_date.as_deref()),
            end_date: day(opp.schedule.end_date.as_deref()),
            requirements,
            benefits: opp.compensation.benefits.join(", "),
            skills: opp.requirements.skills.iter().map(|s| s.name.clone()).collect(),
            is_paid: opp.compensation.kind == "paid",
            application_deadline: day(opp.application.deadline.as_deref()),
        }
    }

    /// Adds a skill unless it is blank or already listed.
    pub fn add_skill(&mut self, skill: &str) -> bool {
        let skill = skill.trim();
        if skill.is_empty() || self.skills.iter().any(|s| s == skill) {
            return false;
        }
        self.skills.push(skill.to_string());
        true
    }

    pub fn remove_skill(&mut self, skill: &str) {
        self.skills.retain(|s| s != skill);
    }

    pub fn location_type(&self) -> &'static str {
        let location = self.location.to_lowercase();
        if location.contains("remote") {
            "remote"
        } else if location.contains("hybrid") {
            "hybrid"
        } else {
            "on-site"
        }
    }

    pub fn validate(&self) -> Result<(), ApiError> {
        let required = [
            ("Title", &self.title),
            ("Description", &self.description),
            ("Type", &self.kind),
            ("Category", &self.category),
            ("Location", &self.location),
        ];
        for (label, value) in required {
            if value.trim().is_empty() {
                return Err(ApiError::validation(format!("{} is required.", label)));
            }
        }
        Ok(())
    }

    pub fn to_payload(&self) -> Value {
        let requirements = if self.requirements.trim().is_empty() {
            "No specific requirements"
        } else {
            self.requirements.trim()
        };
        let benefits: Vec<&str> = if self.benefits.trim().is_empty() {
            Vec::new()
        } else {
            vec![self.benefits.trim()]
        };
        let end_date = if self.end_date.is_empty() {
            Value::Null
        } else {
            Value::String(self.end_date.clone())
        };

        json!({
            "title": self.title,
            "description": self.description,
            "type": self.kind,
            "category": self.category,
            "location": {
                "type": self.location_type(),
                "city": self.location,
                "country": "Not specified",
            },
            "schedule": {
                "startDate": self.start_date,
                "endDate": end_date,
                "duration": self.duration,
            },
            "requirements": {
                "skills": self.skills.iter().map(|name| json!({
                    "name": name,
                    "level": "intermediate",
                    "required": true,
                })).collect::<Vec<_>>(),
                "experience": {
                    "minYears": 0,
                    "required": [requirements],
                },
            },
            "compensation": {
                "type": if self.is_paid { "paid" } else { "unpaid" },
                "benefits": benefits,
            },
            "application": {
                "deadline": self.application_deadline,
                "process": [{
                    "step": "Application Review",
                    "description": "Submit application through platform",
                    "estimatedTime": "1-2 weeks",
                }],
            },
            "status": "active",
            "visibility": "public",
        })
    }
}

/// `YYYY-MM-DD` part of a stored timestamp.
fn day(raw: Option<&str>) -> String {
    let raw = raw.unwrap_or_default();
    raw.get(..10).unwrap_or(raw).to_string()
}

pub fn create(api: &ApiService, draft: &OpportunityDraft, notifier: &dyn Notifier) -> bool {
    if let Err(e) = draft.validate() {
        notifier.notify(Notification::from_error("Error", &e));
        return false;
    }
    match api.create_opportunity(&draft.to_payload()) {
        Ok(_) => {
            info!(title = %draft.title, "opportunity created");
            notifier.notify(Notification::success(
                "Opportunity Created",
                "Opportunity created successfully!",
            ));
            true
        }
        Err(e) => {
            warn!(title = %draft.title, error = %e, "failed to create opportunity");
            notifier.notify(Notification::from_error("Error", &e));
            false
        }
    }
}

pub fn update(
    api: &ApiService,
    id: &str,
    draft: &OpportunityDraft,
    notifier: &dyn Notifier,
) -> bool {
    if let Err(e) = draft.validate() {
        notifier.notify(Notification::from_error("Error", &e));
        return false;
    }
    match api.update_opportunity(id, &draft.to_payload()) {
        Ok(_) => {
            info!(id, "opportunity updated");
            notifier.notify(Notification::success(
                "Opportunity Updated",
                "Opportunity updated successfully!",
            ));
            true
        }
        Err(e) => {
            warn!(id, error = %e, "failed to update opportunity");
            notifier.notify(Notification::from_error("Error", &e));
            false
        }
    }
}

pub fn delete(api: &ApiService, id: &str, notifier: &dyn Notifier) -> bool {
    match api.delete_opportunity(id) {
        Ok(()) => {
            info!(id, "opportunity deleted");
            notifier.notify(Notification::success(
                "Opportunity Deleted",
                "Opportunity deleted successfully!",
            ));
            true
        }
        Err(e) => {
            warn!(id, error = %e, "failed to delete opportunity");
            notifier.notify(Notification::from_error("Error", &e));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::Method;
    use crate::api::testing::{stub_service, success};
    use crate::notify::Level;
    use crate::notify::testing::RecordingNotifier;

    fn draft() -> OpportunityDraft {
        OpportunityDraft {
            title: "Rust Intern".to_string(),
            description: "Write parsers".to_string(),
            kind: "internship".to_string(),
            category: "technology".to_string(),
            location: "Pune (Hybrid)".to_string(),
            ..OpportunityDraft::default()
        }
    }

    #[test]
    fn test_location_type_inference() {
        let mut d = draft();
        assert_eq!(d.location_type(), "hybrid");
        d.location = "Remote, India".to_string();
        assert_eq!(d.location_type(), "remote");
        d.location = "Bengaluru".to_string();
        assert_eq!(d.location_type(), "on-site");
    }

    #[test]
    fn test_payload_shape() {
        let mut d = draft();
        d.add_skill(" Rust ");
        d.add_skill("Rust");
        d.add_skill("");
        d.is_paid = true;
        d.benefits = "Stipend".to_string();
        let payload = d.to_payload();

        assert_eq!(payload["location"]["type"], "hybrid");
        assert_eq!(payload["location"]["city"], "Pune (Hybrid)");
        assert_eq!(payload["requirements"]["skills"].as_array().unwrap().len(), 1);
        assert_eq!(payload["requirements"]["skills"][0]["level"], "intermediate");
        assert_eq!(
            payload["requirements"]["experience"]["required"][0],
            "No specific requirements"
        );
        assert_eq!(payload["compensation"]["type"], "paid");
        assert_eq!(payload["compensation"]["benefits"][0], "Stipend");
        assert!(payload["schedule"]["endDate"].is_null());
        assert_eq!(payload["status"], "active");
        assert_eq!(payload["visibility"], "public");
    }

    #[test]
    fn test_draft_from_stored_opportunity() {
        let opp: Opportunity = serde_json::from_value(json!({
            "_id": "o1",
            "title": "Field Volunteer",
            "type": "volunteer",
            "category": "non-profit",
            "location": { "type": "on-site", "city": "Nagpur" },
            "schedule": { "startDate": "2024-06-01T00:00:00.000Z", "duration": "3 months" },
            "requirements": {
                "skills": [{ "name": "Hindi", "required": true }],
                "experience": { "minYears": 0, "required": ["Two weekends a month"] }
            },
            "compensation": { "type": "unpaid", "benefits": ["Certificate", "Meals"] },
            "application": { "deadline": "2024-05-20" }
        }))
        .unwrap();

        let d = OpportunityDraft::from_opportunity(&opp);
        assert_eq!(d.location, "Nagpur");
        assert_eq!(d.start_date, "2024-06-01");
        assert_eq!(d.end_date, "");
        assert_eq!(d.requirements, "Two weekends a month");
        assert_eq!(d.benefits, "Certificate, Meals");
        assert_eq!(d.skills, vec!["Hindi"]);
        assert!(!d.is_paid);
        assert_eq!(d.location_type(), "on-site");
    }

    #[test]
    fn test_missing_title_blocks_create() {
        let (api, transport, _) = stub_service();
        let notifier = RecordingNotifier::default();
        let d = OpportunityDraft {
            title: String::new(),
            ..draft()
        };
        assert!(!create(&api, &d, &notifier));
        assert!(transport.requests().is_empty());
        assert_eq!(notifier.last().unwrap().message, "Title is required.");
    }

    #[test]
    fn test_create_posts_payload() {
        let (api, transport, _) = stub_service();
        transport.push_json(201, success(json!({ "opportunity": { "_id": "o1" } })));
        let notifier = RecordingNotifier::default();
        assert!(create(&api, &draft(), &notifier));
        let request = transport.last_request();
        assert_eq!(request.method, Method::Post);
        assert_eq!(request.path, "/opportunities");
        assert_eq!(notifier.last().unwrap().level, Level::Success);
    }

    #[test]
    fn test_delete_failure_notifies() {
        let (api, transport, _) = stub_service();
        transport.push_json(403, json!({ "status": "error", "message": "Not your opportunity" }));
        let notifier = RecordingNotifier::default();
        assert!(!delete(&api, "o1", &notifier));
        assert_eq!(notifier.last().unwrap().message, "Not your opportunity");
    }
}
