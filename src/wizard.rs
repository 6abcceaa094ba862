use serde::Serialize;
use serde_json::json;
use std::path::Path;
use tracing::{info, warn};

use crate::api::ApiService;
use crate::error::ApiError;
use crate::models::{
    AdditionalInfo, Availability, DocumentRef, Documents, EducationEntry, ExperienceEntry,
    PersonalInfo, Profile, Skill, WorkMode,
};
use crate::notify::{Notification, Notifier};
use crate::session::Session;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    PersonalInfo = 1,
    Education = 2,
    Experience = 3,
    Documents = 4,
    CoverLetter = 5,
    Availability = 6,
}

impl Step {
    pub const ALL: [Step; 6] = [
        Step::PersonalInfo,
        Step::Education,
        Step::Experience,
        Step::Documents,
        Step::CoverLetter,
        Step::Availability,
    ];

    pub fn number(&self) -> u8 {
        *self as u8
    }

    pub fn title(&self) -> &'static str {
        match self {
            Step::PersonalInfo => "Personal Information",
            Step::Education => "Education",
            Step::Experience => "Work Experience",
            Step::Documents => "Documents & Links",
            Step::CoverLetter => "Cover Letter",
            Step::Availability => "Availability & Summary",
        }
    }

    pub fn next(&self) -> Step {
        Step::ALL
            .get(self.number() as usize)
            .copied()
            .unwrap_or(Step::Availability)
    }

    pub fn prev(&self) -> Step {
        match self.number() {
            1 => Step::PersonalInfo,
            n => Step::ALL[(n - 2) as usize],
        }
    }
}

/// Everything the wizard collects, in the shape the server stores it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApplicationData {
    pub personal_info: PersonalInfo,
    pub education: Vec<EducationEntry>,
    pub experience: Vec<ExperienceEntry>,
    pub skills: Vec<Skill>,
    pub cover_letter: String,
    pub availability: Availability,
    pub documents: Documents,
    pub additional_info: AdditionalInfo,
}

impl Default for ApplicationData {
    fn default() -> Self {
        Self {
            personal_info: PersonalInfo::default(),
            education: vec![EducationEntry::default()],
            experience: vec![ExperienceEntry::default()],
            skills: Vec::new(),
            cover_letter: String::new(),
            availability: Availability::default(),
            documents: Documents::default(),
            additional_info: AdditionalInfo::default(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersonalField {
    FirstName,
    LastName,
    Email,
    Phone,
    Address,
    City,
    State,
    Country,
    DateOfBirth,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EducationField {
    Institution(String),
    Degree(String),
    FieldOfStudy(String),
    StartDate(String),
    EndDate(String),
    IsCurrent(bool),
    Gpa(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExperienceField {
    Title(String),
    Company(String),
    Location(String),
    StartDate(String),
    EndDate(String),
    IsCurrent(bool),
    Description(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AvailabilityField {
    StartDate(String),
    HoursPerWeek(u32),
    WorkMode(WorkMode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkField {
    Portfolio,
    Linkedin,
    Github,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdditionalField {
    WhyInterested,
    RelevantExperience,
    Questions,
}

#[derive(Debug, Clone, PartialEq)]
pub enum FormAction {
    Next,
    Prev,
    GoTo(Step),
    SetPersonal(PersonalField, String),
    SetEducation(usize, EducationField),
    SetExperience(usize, ExperienceField),
    AddEducation,
    RemoveEducation(usize),
    AddExperience,
    RemoveExperience(usize),
    SetCoverLetter(String),
    SetAvailability(AvailabilityField),
    SetLink(LinkField, String),
    SetAdditional(AdditionalField, String),
    AttachResume(String),
    AttachCoverLetterFile(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmitOutcome {
    Submitted,
    Invalid,
    Failed,
    Cancelled,
}

/// The six-step application form for one opportunity.
pub struct ApplicationForm {
    pub opportunity_id: String,
    pub opportunity_title: String,
    step: Step,
    data: ApplicationData,
    closed: bool,
}

impl ApplicationForm {
    pub fn new(opportunity_id: &str, opportunity_title: &str) -> Self {
        Self {
            opportunity_id: opportunity_id.to_string(),
            opportunity_title: opportunity_title.to_string(),
            step: Step::PersonalInfo,
            data: ApplicationData::default(),
            closed: false,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn data(&self) -> &ApplicationData {
        &self.data
    }

    pub fn is_closed(&self) -> bool {
        self.closed
    }

    /// Seeds the personal section and skills from whoever is signed in.
    /// Fields the user already typed are left alone.
    pub fn prefill(&mut self, session: &Session) {
        let info = &mut self.data.personal_info;
        if let Some(user) = session.user() {
            fill(&mut info.email, &user.email);
        }
        if let Some(employee) = session.profile().and_then(Profile::as_employee) {
            let personal = &employee.personal_info;
            fill(&mut info.first_name, &personal.first_name);
            fill(&mut info.last_name, &personal.last_name);
            fill(&mut info.phone, &personal.phone);
            fill(&mut info.address, &employee.location.address);
            fill(&mut info.city, &employee.location.city);
            fill(&mut info.state, &employee.location.state);
            fill(&mut info.country, &employee.location.country);
            if let Some(dob) = &personal.date_of_birth {
                fill(&mut info.date_of_birth, dob);
            }
            if self.data.skills.is_empty() {
                self.data.skills = employee.skills.clone();
            }
        }
    }

    pub fn can_remove_education(&self) -> bool {
        self.data.education.len() > 1
    }

    pub fn can_remove_experience(&self) -> bool {
        self.data.experience.len() > 1
    }

    pub fn dispatch(&mut self, action: FormAction) {
        match action {
            FormAction::Next => self.step = self.step.next(),
            FormAction::Prev => self.step = self.step.prev(),
            FormAction::GoTo(step) => self.step = step,
            FormAction::SetPersonal(field, value) => {
                let info = &mut self.data.personal_info;
                let slot = match field {
                    PersonalField::FirstName => &mut info.first_name,
                    PersonalField::LastName => &mut info.last_name,
                    PersonalField::Email => &mut info.email,
                    PersonalField::Phone => &mut info.phone,
                    PersonalField::Address => &mut info.address,
                    PersonalField::City => &mut info.city,
                    PersonalField::State => &mut info.state,
                    PersonalField::Country => &mut info.country,
                    PersonalField::DateOfBirth => &mut info.date_of_birth,
                };
                *slot = value;
            }
            FormAction::SetEducation(index, field) => {
                if let Some(entry) = self.data.education.get_mut(index) {
                    set_education(entry, field);
                }
            }
            FormAction::SetExperience(index, field) => {
                if let Some(entry) = self.data.experience.get_mut(index) {
                    set_experience(entry, field);
                }
            }
            FormAction::AddEducation => self.data.education.push(EducationEntry::default()),
            FormAction::RemoveEducation(index) => {
                if self.can_remove_education() && index < self.data.education.len() {
                    self.data.education.remove(index);
                }
            }
            FormAction::AddExperience => self.data.experience.push(ExperienceEntry::default()),
            FormAction::RemoveExperience(index) => {
                if self.can_remove_experience() && index < self.data.experience.len() {
                    self.data.experience.remove(index);
                }
            }
            FormAction::SetCoverLetter(text) => self.data.cover_letter = text,
            FormAction::SetAvailability(field) => {
                let availability = &mut self.data.availability;
                match field {
                    AvailabilityField::StartDate(date) => availability.start_date = date,
                    AvailabilityField::HoursPerWeek(hours) => availability.hours_per_week = hours,
                    AvailabilityField::WorkMode(mode) => availability.work_mode = mode,
                }
            }
            FormAction::SetLink(field, value) => {
                let docs = &mut self.data.documents;
                match field {
                    LinkField::Portfolio => docs.portfolio = value,
                    LinkField::Linkedin => docs.linkedin = value,
                    LinkField::Github => docs.github = value,
                }
            }
            FormAction::SetAdditional(field, value) => {
                let extra = &mut self.data.additional_info;
                match field {
                    AdditionalField::WhyInterested => extra.why_interested = value,
                    AdditionalField::RelevantExperience => extra.relevant_experience = value,
                    AdditionalField::Questions => extra.questions = value,
                }
            }
            FormAction::AttachResume(path) => self.data.documents.resume = Some(document(&path)),
            FormAction::AttachCoverLetterFile(path) => {
                self.data.documents.cover_letter_file = Some(document(&path))
            }
        }
    }

    /// Submit-time checks. The resume stays optional.
    pub fn validate(&self) -> Result<(), ApiError> {
        let info = &self.data.personal_info;
        if info.first_name.trim().is_empty() || info.last_name.trim().is_empty() {
            return Err(ApiError::validation("Please fill in your first and last name."));
        }
        if self.data.cover_letter.trim().is_empty() {
            return Err(ApiError::validation("Please write a cover letter."));
        }
        Ok(())
    }

    /// Sends the whole form in one request. On failure the form stays open
    /// with every field intact.
    pub fn submit(&mut self, api: &ApiService, notifier: &dyn Notifier) -> SubmitOutcome {
        if let Err(e) = self.validate() {
            notifier.notify(Notification::from_error("Application Failed", &e));
            return SubmitOutcome::Invalid;
        }

        let body = json!({
            "opportunityId": self.opportunity_id,
            "applicationData": self.data,
        });

        match api.submit_application(&body) {
            Ok(_) => {
                info!(opportunity = %self.opportunity_id, "application submitted");
                self.closed = true;
                notifier.notify(Notification::success(
                    "Application Submitted!",
                    format!(
                        "Your application for {} has been submitted successfully.",
                        self.opportunity_title
                    ),
                ));
                SubmitOutcome::Submitted
            }
            Err(e) => {
                warn!(opportunity = %self.opportunity_id, error = %e, "application submit failed");
                notifier.notify(Notification::from_error("Application Failed", &e));
                SubmitOutcome::Failed
            }
        }
    }

    /// Review text shown on the last step.
    pub fn summary(&self) -> String {
        let d = &self.data;
        let info = &d.personal_info;
        let mut lines = vec![
            format!("Applying for: {}", self.opportunity_title),
            format!("Name: {} {}", info.first_name, info.last_name),
            format!("Email: {}", info.email),
        ];
        if !info.phone.is_empty() {
            lines.push(format!("Phone: {}", info.phone));
        }

        let education: Vec<_> = d
            .education
            .iter()
            .filter(|e| !e.institution.is_empty())
            .map(|e| format!("  {} at {}", e.degree, e.institution))
            .collect();
        lines.push(format!("Education: {} entr{}", education.len(), if education.len() == 1 { "y" } else { "ies" }));
        lines.extend(education);

        let experience: Vec<_> = d
            .experience
            .iter()
            .filter(|e| !e.company.is_empty())
            .map(|e| format!("  {} at {}", e.title, e.company))
            .collect();
        lines.push(format!("Experience: {} entr{}", experience.len(), if experience.len() == 1 { "y" } else { "ies" }));
        lines.extend(experience);

        if !d.skills.is_empty() {
            let names: Vec<_> = d.skills.iter().map(|s| s.name.as_str()).collect();
            lines.push(format!("Skills: {}", names.join(", ")));
        }
        lines.push(format!(
            "Resume: {}",
            d.documents
                .resume
                .as_ref()
                .map(|r| r.name.as_str())
                .unwrap_or("not attached")
        ));
        lines.push(format!(
            "Cover letter: {} characters",
            d.cover_letter.trim().chars().count()
        ));
        let start = if d.availability.start_date.is_empty() {
            "flexible"
        } else {
            d.availability.start_date.as_str()
        };
        lines.push(format!(
            "Availability: from {}, {} hours/week, {}",
            start,
            d.availability.hours_per_week,
            work_mode_label(d.availability.work_mode)
        ));
        lines.join("\n")
    }
}

pub fn work_mode_label(mode: WorkMode) -> &'static str {
    match mode {
        WorkMode::Remote => "remote",
        WorkMode::OnSite => "on-site",
        WorkMode::Hybrid => "hybrid",
    }
}

fn fill(slot: &mut String, value: &str) {
    if slot.is_empty() && !value.is_empty() {
        *slot = value.to_string();
    }
}

fn document(path: &str) -> DocumentRef {
    let name = Path::new(path)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string());
    DocumentRef {
        name,
        url: None,
        path: Some(path.to_string()),
    }
}

fn set_education(entry: &mut EducationEntry, field: EducationField) {
    match field {
        EducationField::Institution(v) => entry.institution = v,
        EducationField::Degree(v) => entry.degree = v,
        EducationField::FieldOfStudy(v) => entry.field_of_study = v,
        EducationField::StartDate(v) => entry.start_date = v,
        EducationField::EndDate(v) => entry.end_date = v,
        EducationField::IsCurrent(current) => {
            entry.is_current = current;
            if current {
                entry.end_date.clear();
            }
        }
        EducationField::Gpa(v) => entry.gpa = v,
    }
}

fn set_experience(entry: &mut ExperienceEntry, field: ExperienceField) {
    match field {
        ExperienceField::Title(v) => entry.title = v,
        ExperienceField::Company(v) => entry.company = v,
        ExperienceField::Location(v) => entry.location = v,
        ExperienceField::StartDate(v) => entry.start_date = v,
        ExperienceField::EndDate(v) => entry.end_date = v,
        ExperienceField::IsCurrent(current) => {
            entry.is_current = current;
            if current {
                entry.end_date.clear();
            }
        }
        ExperienceField::Description(v) => entry.description = v,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{stub_service, success};
    use crate::notify::Level;
    use crate::notify::testing::RecordingNotifier;
    use serde_json::json;

    fn filled_form() -> ApplicationForm {
        let mut form = ApplicationForm::new("opp1", "Rust Intern");
        form.dispatch(FormAction::SetPersonal(PersonalField::FirstName, "Jane".into()));
        form.dispatch(FormAction::SetPersonal(PersonalField::LastName, "Doe".into()));
        form.dispatch(FormAction::SetCoverLetter("I like Rust.".into()));
        form
    }

    #[test]
    fn test_step_navigation_clamps() {
        let mut form = ApplicationForm::new("opp1", "Rust Intern");
        form.dispatch(FormAction::Prev);
        assert_eq!(form.step(), Step::PersonalInfo);
        for _ in 0..10 {
            form.dispatch(FormAction::Next);
        }
        assert_eq!(form.step(), Step::Availability);
        assert_eq!(form.step().number(), 6);
        form.dispatch(FormAction::Prev);
        assert_eq!(form.step(), Step::CoverLetter);
    }

    #[test]
    fn test_remove_never_empties_entry_lists() {
        let mut form = ApplicationForm::new("opp1", "Rust Intern");
        assert!(!form.can_remove_education());
        form.dispatch(FormAction::RemoveEducation(0));
        assert_eq!(form.data().education.len(), 1);

        form.dispatch(FormAction::AddExperience);
        form.dispatch(FormAction::SetExperience(1, ExperienceField::Company("Acme".into())));
        assert!(form.can_remove_experience());
        form.dispatch(FormAction::RemoveExperience(0));
        assert_eq!(form.data().experience.len(), 1);
        assert_eq!(form.data().experience[0].company, "Acme");
        form.dispatch(FormAction::RemoveExperience(0));
        assert_eq!(form.data().experience.len(), 1);
    }

    #[test]
    fn test_current_position_clears_end_date() {
        let mut form = ApplicationForm::new("opp1", "Rust Intern");
        form.dispatch(FormAction::SetEducation(0, EducationField::EndDate("2023-06".into())));
        form.dispatch(FormAction::SetEducation(0, EducationField::IsCurrent(true)));
        assert!(form.data().education[0].is_current);
        assert!(form.data().education[0].end_date.is_empty());
    }

    #[test]
    fn test_empty_cover_letter_never_reaches_network() {
        let (api, transport, _) = stub_service();
        let notifier = RecordingNotifier::default();
        let mut form = filled_form();
        form.dispatch(FormAction::SetCoverLetter("   ".into()));

        assert_eq!(form.submit(&api, &notifier), SubmitOutcome::Invalid);
        assert!(transport.requests().is_empty());
        let note = notifier.last().unwrap();
        assert_eq!(note.title, "Validation Error");
        assert_eq!(note.message, "Please write a cover letter.");
        assert!(!form.is_closed());
    }

    #[test]
    fn test_missing_name_is_a_validation_error() {
        let form = ApplicationForm::new("opp1", "Rust Intern");
        let err = form.validate().unwrap_err();
        assert_eq!(err.to_string(), "Please fill in your first and last name.");
    }

    #[test]
    fn test_resume_is_optional() {
        assert!(filled_form().validate().is_ok());
    }

    #[test]
    fn test_successful_submit_closes_and_notifies() {
        let (api, transport, _) = stub_service();
        transport.push_json(201, success(json!({ "application": { "_id": "a1", "status": "submitted" } })));
        let notifier = RecordingNotifier::default();
        let mut form = filled_form();
        form.dispatch(FormAction::AttachResume("/home/jane/cv.pdf".into()));

        assert_eq!(form.submit(&api, &notifier), SubmitOutcome::Submitted);
        assert!(form.is_closed());

        let request = transport.last_request();
        assert_eq!(request.path, "/applications");
        let body = request.body.unwrap();
        assert_eq!(body["opportunityId"], "opp1");
        assert_eq!(body["applicationData"]["personalInfo"]["firstName"], "Jane");
        assert_eq!(body["applicationData"]["documents"]["resume"]["name"], "cv.pdf");
        assert_eq!(body["applicationData"]["availability"]["hoursPerWeek"], 40);

        let note = notifier.last().unwrap();
        assert_eq!(note.level, Level::Success);
        assert_eq!(
            note.message,
            "Your application for Rust Intern has been submitted successfully."
        );
    }

    #[test]
    fn test_failed_submit_keeps_data_and_stays_open() {
        let (api, transport, _) = stub_service();
        transport.push_json(400, json!({ "status": "error", "message": "You have already applied" }));
        let notifier = RecordingNotifier::default();
        let mut form = filled_form();
        let before = form.data().clone();

        assert_eq!(form.submit(&api, &notifier), SubmitOutcome::Failed);
        assert!(!form.is_closed());
        assert_eq!(form.data(), &before);
        let note = notifier.last().unwrap();
        assert_eq!(note.title, "Application Failed");
        assert_eq!(note.message, "You have already applied");
    }

    #[test]
    fn test_prefill_from_employee_session() {
        let (api, transport, _) = stub_service();
        transport.push_json(
            200,
            success(json!({
                "token": "t",
                "user": { "_id": "u1", "email": "jane@x.com", "role": "employee" },
                "profile": {
                    "personalInfo": { "firstName": "Jane", "lastName": "Doe", "phone": "555" },
                    "location": { "city": "Pune", "country": "India" },
                    "skills": [{ "name": "Rust", "level": "advanced" }]
                }
            })),
        );
        let mut session = Session::new(api);
        session.login("jane@x.com", "pw");

        let mut form = ApplicationForm::new("opp1", "Rust Intern");
        form.dispatch(FormAction::SetPersonal(PersonalField::Phone, "777".into()));
        form.prefill(&session);

        let info = &form.data().personal_info;
        assert_eq!(info.email, "jane@x.com");
        assert_eq!(info.first_name, "Jane");
        assert_eq!(info.phone, "777");
        assert_eq!(info.city, "Pune");
        assert_eq!(form.data().skills.len(), 1);
    }

    #[test]
    fn test_summary_mentions_key_fields() {
        let mut form = filled_form();
        form.dispatch(FormAction::SetEducation(0, EducationField::Institution("IIT".into())));
        form.dispatch(FormAction::SetEducation(0, EducationField::Degree("BTech".into())));
        let summary = form.summary();
        assert!(summary.contains("Name: Jane Doe"));
        assert!(summary.contains("BTech at IIT"));
        assert!(summary.contains("Resume: not attached"));
        assert!(summary.contains("40 hours/week, hybrid"));
    }
}
