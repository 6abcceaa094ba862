use serde::de::DeserializeOwned;
use tracing::{info, warn};

use crate::api::{ApiService, Query};
use crate::error::ApiError;
use crate::feed::ALL;
use crate::models::{Interest, Recommendation, Skill};
use crate::notify::{Notification, Notifier};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum MatchBand {
    Low,
    Fair,
    Good,
    Excellent,
}

impl MatchBand {
    /// Thresholds are inclusive: 80, 60 and 40.
    pub fn from_score(score: f64) -> Self {
        if score >= 80.0 {
            MatchBand::Excellent
        } else if score >= 60.0 {
            MatchBand::Good
        } else if score >= 40.0 {
            MatchBand::Fair
        } else {
            MatchBand::Low
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            MatchBand::Excellent => "Excellent Match",
            MatchBand::Good => "Good Match",
            MatchBand::Fair => "Fair Match",
            MatchBand::Low => "Low Match",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationFilters {
    pub kind: String,
    pub category: String,
    pub location: String,
}

impl Default for RecommendationFilters {
    fn default() -> Self {
        Self {
            kind: ALL.to_string(),
            category: ALL.to_string(),
            location: ALL.to_string(),
        }
    }
}

impl RecommendationFilters {
    pub fn to_query(&self) -> Query {
        [
            ("type", &self.kind),
            ("category", &self.category),
            ("location", &self.location),
        ]
        .into_iter()
        .filter(|(_, value)| !value.is_empty() && value.as_str() != ALL)
        .map(|(key, value)| (key.to_string(), value.clone()))
        .collect()
    }
}

pub fn fetch_recommendations(
    api: &ApiService,
    filters: &RecommendationFilters,
    notifier: &dyn Notifier,
) -> Vec<Recommendation> {
    match api.recommended_opportunities(filters.to_query()) {
        Ok(list) => {
            info!(count = list.recommendations.len(), "recommendations loaded");
            list.recommendations
        }
        Err(e) => {
            warn!(error = %e, "failed to fetch recommendations");
            notifier.notify(Notification::error("Error", e.to_string()));
            Vec::new()
        }
    }
}

/// Parses one of the lowercase wire values ("advanced", "social-impact")
/// into its enum.
pub fn parse_choice<T: DeserializeOwned>(value: &str) -> Result<T, ApiError> {
    serde_json::from_value(serde_json::Value::String(value.trim().to_lowercase()))
        .map_err(|_| ApiError::validation(format!("'{}' is not a valid choice", value)))
}

/// The employee's skills and interests, edited locally and saved in one call.
#[derive(Debug, Clone, Default)]
pub struct SkillsEditor {
    pub skills: Vec<Skill>,
    pub interests: Vec<Interest>,
}

impl SkillsEditor {
    pub fn new(skills: Vec<Skill>, interests: Vec<Interest>) -> Self {
        Self { skills, interests }
    }

    /// Returns false when the name is blank or already present.
    pub fn add_skill(&mut self, skill: Skill) -> bool {
        let name = skill.name.trim();
        if name.is_empty() || self.skills.iter().any(|s| s.name.eq_ignore_ascii_case(name)) {
            return false;
        }
        self.skills.push(Skill {
            name: name.to_string(),
            ..skill
        });
        true
    }

    pub fn remove_skill(&mut self, index: usize) -> Option<Skill> {
        (index < self.skills.len()).then(|| self.skills.remove(index))
    }

    pub fn add_interest(&mut self, interest: Interest) -> bool {
        let name = interest.name.trim();
        if name.is_empty()
            || self
                .interests
                .iter()
                .any(|i| i.name.eq_ignore_ascii_case(name))
        {
            return false;
        }
        self.interests.push(Interest {
            name: name.to_string(),
            ..interest
        });
        true
    }

    pub fn remove_interest(&mut self, index: usize) -> Option<Interest> {
        (index < self.interests.len()).then(|| self.interests.remove(index))
    }

    pub fn save(&self, api: &ApiService, notifier: &dyn Notifier) -> bool {
        match api.update_employee_skills(&self.skills, &self.interests) {
            Ok(_) => {
                info!(
                    skills = self.skills.len(),
                    interests = self.interests.len(),
                    "skills and interests saved"
                );
                notifier.notify(Notification::success(
                    "Success",
                    "Skills and interests updated successfully!",
                ));
                true
            }
            Err(e) => {
                warn!(error = %e, "failed to save skills and interests");
                notifier.notify(Notification::error("Error", e.to_string()));
                false
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{stub_service, success};
    use crate::models::{InterestCategory, SkillLevel};
    use crate::notify::Level;
    use crate::notify::testing::RecordingNotifier;
    use serde_json::json;

    #[test]
    fn test_score_bands() {
        assert_eq!(MatchBand::from_score(85.0).label(), "Excellent Match");
        assert_eq!(MatchBand::from_score(65.0).label(), "Good Match");
        assert_eq!(MatchBand::from_score(45.0).label(), "Fair Match");
        assert_eq!(MatchBand::from_score(10.0).label(), "Low Match");
    }

    #[test]
    fn test_score_thresholds_are_inclusive() {
        assert_eq!(MatchBand::from_score(80.0), MatchBand::Excellent);
        assert_eq!(MatchBand::from_score(79.9), MatchBand::Good);
        assert_eq!(MatchBand::from_score(60.0), MatchBand::Good);
        assert_eq!(MatchBand::from_score(40.0), MatchBand::Fair);
        assert_eq!(MatchBand::from_score(39.0), MatchBand::Low);
    }

    #[test]
    fn test_filters_drop_all() {
        let mut filters = RecommendationFilters::default();
        assert!(filters.to_query().is_empty());
        filters.location = "remote".to_string();
        assert_eq!(
            filters.to_query(),
            vec![("location".to_string(), "remote".to_string())]
        );
    }

    #[test]
    fn test_add_skill_dedups_and_trims() {
        let mut editor = SkillsEditor::default();
        assert!(editor.add_skill(Skill {
            name: " Rust ".to_string(),
            level: SkillLevel::Advanced,
            ..Skill::default()
        }));
        assert!(!editor.add_skill(Skill {
            name: "rust".to_string(),
            ..Skill::default()
        }));
        assert!(!editor.add_skill(Skill::default()));
        assert_eq!(editor.skills.len(), 1);
        assert_eq!(editor.skills[0].name, "Rust");
        assert!(editor.remove_skill(3).is_none());
        assert!(editor.remove_skill(0).is_some());
    }

    #[test]
    fn test_parse_choice() {
        let level: SkillLevel = parse_choice("Expert").unwrap();
        assert_eq!(level, SkillLevel::Expert);
        let category: InterestCategory = parse_choice("social-impact").unwrap();
        assert_eq!(category, InterestCategory::SocialImpact);
        assert!(parse_choice::<SkillLevel>("guru").is_err());
    }

    #[test]
    fn test_save_posts_skills_and_interests() {
        let (api, transport, _) = stub_service();
        transport.push_json(200, success(json!({})));
        let notifier = RecordingNotifier::default();
        let mut editor = SkillsEditor::default();
        editor.add_skill(Skill {
            name: "Rust".to_string(),
            ..Skill::default()
        });
        editor.add_interest(Interest {
            name: "Open source".to_string(),
            ..Interest::default()
        });

        assert!(editor.save(&api, &notifier));
        let request = transport.last_request();
        assert_eq!(request.path, "/recommendations/update-skills");
        let body = request.body.unwrap();
        assert_eq!(body["skills"][0]["name"], "Rust");
        assert_eq!(body["interests"][0]["category"], "other");
        assert_eq!(notifier.last().unwrap().level, Level::Success);
    }

    #[test]
    fn test_fetch_failure_notifies() {
        let (api, transport, _) = stub_service();
        transport.push_json(500, json!({ "status": "error" }));
        let notifier = RecordingNotifier::default();
        let recs = fetch_recommendations(&api, &RecommendationFilters::default(), &notifier);
        assert!(recs.is_empty());
        assert_eq!(notifier.last().unwrap().message, "Request failed");
    }
}
