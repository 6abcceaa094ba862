use std::io::{self, BufRead, Stdout, StdinLock, Write};
use std::path::Path;

use serde_json::{Value, json};

use crate::api::ApiService;
use crate::models::{Application, InterviewType, Profile, WorkMode};
use crate::notify::{Notification, Notifier};
use crate::opportunity::OpportunityDraft;
use crate::recommend::parse_choice;
use crate::status::{self, InterviewForm};
use crate::wizard::{
    AdditionalField, ApplicationForm, AvailabilityField, EducationField, ExperienceField,
    FormAction, LinkField, PersonalField, Step, SubmitOutcome, work_mode_label,
};

/// Line-oriented questions over any reader/writer pair. Enter keeps the
/// value in brackets, `-` clears it.
pub struct Prompter<R, W> {
    input: R,
    output: W,
    eof: bool,
}

impl Prompter<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R: BufRead, W: Write> Prompter<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self {
            input,
            output,
            eof: false,
        }
    }

    pub fn at_eof(&self) -> bool {
        self.eof
    }

    pub fn say(&mut self, text: &str) -> io::Result<()> {
        writeln!(self.output, "{}", text)
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            self.eof = true;
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
    }

    pub fn ask(&mut self, label: &str, current: &str) -> io::Result<String> {
        if current.is_empty() {
            write!(self.output, "{}: ", label)?;
        } else {
            write!(self.output, "{} [{}]: ", label, current)?;
        }
        self.output.flush()?;
        let answer = match self.read_line()? {
            Some(line) => line.trim().to_string(),
            None => return Ok(current.to_string()),
        };
        Ok(match answer.as_str() {
            "" => current.to_string(),
            "-" => String::new(),
            _ => answer,
        })
    }

    pub fn confirm(&mut self, label: &str, default: bool) -> io::Result<bool> {
        let hint = if default { "Y/n" } else { "y/N" };
        write!(self.output, "{} [{}]: ", label, hint)?;
        self.output.flush()?;
        let answer = self.read_line()?.unwrap_or_default().trim().to_lowercase();
        Ok(match answer.as_str() {
            "y" | "yes" => true,
            "n" | "no" => false,
            _ => default,
        })
    }

    /// Reads lines until one containing only `.`. Nothing entered keeps the
    /// current text.
    pub fn ask_multiline(&mut self, label: &str, current: &str) -> io::Result<String> {
        writeln!(self.output, "{} (end with a line containing only '.')", label)?;
        if !current.is_empty() {
            writeln!(self.output, "Current text:\n{}", current)?;
        }
        let mut lines = Vec::new();
        while let Some(line) = self.read_line()? {
            if line.trim() == "." {
                break;
            }
            lines.push(line);
        }
        if lines.is_empty() {
            Ok(current.to_string())
        } else {
            Ok(lines.join("\n").trim().to_string())
        }
    }
}

// --- Application wizard ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardExit {
    Confirmed,
    Cancelled,
}

/// Walks the form step by step until the user submits or cancels from the
/// summary.
pub fn run_wizard<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    form: &mut ApplicationForm,
) -> io::Result<WizardExit> {
    p.say(&format!("Applying for {}", form.opportunity_title))?;
    p.say("Enter keeps the value in brackets, '-' clears it.")?;
    loop {
        let step = form.step();
        p.say(&format!("\n--- Step {} of 6: {} ---", step.number(), step.title()))?;
        match step {
            Step::PersonalInfo => personal_step(p, form)?,
            Step::Education => education_step(p, form)?,
            Step::Experience => experience_step(p, form)?,
            Step::Documents => documents_step(p, form)?,
            Step::CoverLetter => cover_letter_step(p, form)?,
            Step::Availability => {
                availability_step(p, form)?;
                p.say(&format!("\n{}\n", form.summary()))?;
                let choice = p.ask("[s]ubmit, [b]ack, step number, or [c]ancel", "s")?;
                if p.at_eof() {
                    return Ok(WizardExit::Cancelled);
                }
                match choice.to_lowercase().as_str() {
                    "s" | "submit" => return Ok(WizardExit::Confirmed),
                    "c" | "cancel" => return Ok(WizardExit::Cancelled),
                    "b" | "back" => form.dispatch(FormAction::Prev),
                    other => match other.parse::<usize>().ok().and_then(|n| Step::ALL.get(n.wrapping_sub(1))) {
                        Some(step) => form.dispatch(FormAction::GoTo(*step)),
                        None => p.say("Unrecognised choice, showing the last step again.")?,
                    },
                }
                continue;
            }
        }
        if p.at_eof() {
            return Ok(WizardExit::Cancelled);
        }
        form.dispatch(FormAction::Next);
    }
}

/// Wizard plus submission. A failed submit offers another pass with every
/// answer kept.
pub fn apply_flow<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    form: &mut ApplicationForm,
    api: &ApiService,
    notifier: &dyn Notifier,
) -> io::Result<SubmitOutcome> {
    loop {
        if run_wizard(p, form)? == WizardExit::Cancelled {
            p.say("Application cancelled.")?;
            return Ok(SubmitOutcome::Cancelled);
        }
        let outcome = form.submit(api, notifier);
        if outcome == SubmitOutcome::Submitted {
            return Ok(outcome);
        }
        if !p.confirm("Edit your answers and try again?", true)? || p.at_eof() {
            return Ok(outcome);
        }
    }
}

fn personal_step<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    form: &mut ApplicationForm,
) -> io::Result<()> {
    let info = form.data().personal_info.clone();
    let fields = [
        (PersonalField::FirstName, "First name", info.first_name),
        (PersonalField::LastName, "Last name", info.last_name),
        (PersonalField::Email, "Email", info.email),
        (PersonalField::Phone, "Phone", info.phone),
        (PersonalField::Address, "Address", info.address),
        (PersonalField::City, "City", info.city),
        (PersonalField::State, "State", info.state),
        (PersonalField::Country, "Country", info.country),
        (PersonalField::DateOfBirth, "Date of birth (YYYY-MM-DD)", info.date_of_birth),
    ];
    for (field, label, current) in fields {
        let value = p.ask(label, &current)?;
        form.dispatch(FormAction::SetPersonal(field, value));
    }
    Ok(())
}

fn education_step<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    form: &mut ApplicationForm,
) -> io::Result<()> {
    let mut i = 0;
    while i < form.data().education.len() && !p.at_eof() {
        p.say(&format!("Education #{}", i + 1))?;
        let entry = form.data().education[i].clone();
        let set = |form: &mut ApplicationForm, field| form.dispatch(FormAction::SetEducation(i, field));

        set(form, EducationField::Institution(p.ask("  Institution", &entry.institution)?));
        set(form, EducationField::Degree(p.ask("  Degree", &entry.degree)?));
        set(form, EducationField::FieldOfStudy(p.ask("  Field of study", &entry.field_of_study)?));
        set(form, EducationField::StartDate(p.ask("  Start date", &entry.start_date)?));
        let current = p.confirm("  Currently studying here?", entry.is_current)?;
        set(form, EducationField::IsCurrent(current));
        if !current {
            set(form, EducationField::EndDate(p.ask("  End date", &entry.end_date)?));
        }
        set(form, EducationField::Gpa(p.ask("  GPA", &entry.gpa)?));

        i += 1;
        if i == form.data().education.len() && p.confirm("Add another education entry?", false)? {
            form.dispatch(FormAction::AddEducation);
        }
    }
    if form.can_remove_education() {
        let answer = p.ask("Remove education entry number (Enter to keep all)", "")?;
        if let Some(n) = answer.parse::<usize>().ok().filter(|n| *n >= 1) {
            form.dispatch(FormAction::RemoveEducation(n - 1));
        }
    }
    Ok(())
}

fn experience_step<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    form: &mut ApplicationForm,
) -> io::Result<()> {
    let mut i = 0;
    while i < form.data().experience.len() && !p.at_eof() {
        p.say(&format!("Experience #{}", i + 1))?;
        let entry = form.data().experience[i].clone();
        let set = |form: &mut ApplicationForm, field| form.dispatch(FormAction::SetExperience(i, field));

        set(form, ExperienceField::Title(p.ask("  Job title", &entry.title)?));
        set(form, ExperienceField::Company(p.ask("  Company", &entry.company)?));
        set(form, ExperienceField::Location(p.ask("  Location", &entry.location)?));
        set(form, ExperienceField::StartDate(p.ask("  Start date", &entry.start_date)?));
        let current = p.confirm("  Currently working here?", entry.is_current)?;
        set(form, ExperienceField::IsCurrent(current));
        if !current {
            set(form, ExperienceField::EndDate(p.ask("  End date", &entry.end_date)?));
        }
        set(form, ExperienceField::Description(p.ask("  Description", &entry.description)?));

        i += 1;
        if i == form.data().experience.len() && p.confirm("Add another experience entry?", false)? {
            form.dispatch(FormAction::AddExperience);
        }
    }
    if form.can_remove_experience() {
        let answer = p.ask("Remove experience entry number (Enter to keep all)", "")?;
        if let Some(n) = answer.parse::<usize>().ok().filter(|n| *n >= 1) {
            form.dispatch(FormAction::RemoveExperience(n - 1));
        }
    }
    Ok(())
}

fn documents_step<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    form: &mut ApplicationForm,
) -> io::Result<()> {
    let docs = form.data().documents.clone();
    let resume = docs.resume.and_then(|d| d.path).unwrap_or_default();
    let path = p.ask("Resume file (optional)", &resume)?;
    if !path.is_empty() && path != resume {
        if Path::new(&path).is_file() {
            form.dispatch(FormAction::AttachResume(path));
        } else {
            p.say(&format!("No file at {}, resume not attached.", path))?;
        }
    }

    let letter = docs.cover_letter_file.and_then(|d| d.path).unwrap_or_default();
    let path = p.ask("Cover letter file (optional)", &letter)?;
    if !path.is_empty() && path != letter {
        if Path::new(&path).is_file() {
            form.dispatch(FormAction::AttachCoverLetterFile(path));
        } else {
            p.say(&format!("No file at {}, cover letter file not attached.", path))?;
        }
    }

    for (field, label, current) in [
        (LinkField::Portfolio, "Portfolio URL", docs.portfolio),
        (LinkField::Linkedin, "LinkedIn URL", docs.linkedin),
        (LinkField::Github, "GitHub URL", docs.github),
    ] {
        let value = p.ask(label, &current)?;
        form.dispatch(FormAction::SetLink(field, value));
    }
    Ok(())
}

fn cover_letter_step<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    form: &mut ApplicationForm,
) -> io::Result<()> {
    let letter = p.ask_multiline("Cover letter", &form.data().cover_letter.clone())?;
    form.dispatch(FormAction::SetCoverLetter(letter));

    let extra = form.data().additional_info.clone();
    for (field, label, current) in [
        (AdditionalField::WhyInterested, "Why are you interested?", extra.why_interested),
        (AdditionalField::RelevantExperience, "Relevant experience", extra.relevant_experience),
        (AdditionalField::Questions, "Questions for the organization", extra.questions),
    ] {
        let value = p.ask(label, &current)?;
        form.dispatch(FormAction::SetAdditional(field, value));
    }
    Ok(())
}

fn availability_step<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    form: &mut ApplicationForm,
) -> io::Result<()> {
    let availability = form.data().availability.clone();
    let start = p.ask("Available from (YYYY-MM-DD)", &availability.start_date)?;
    form.dispatch(FormAction::SetAvailability(AvailabilityField::StartDate(start)));

    let hours = p.ask("Hours per week", &availability.hours_per_week.to_string())?;
    match hours.parse() {
        Ok(hours) => form.dispatch(FormAction::SetAvailability(AvailabilityField::HoursPerWeek(hours))),
        Err(_) => p.say("Hours must be a whole number, keeping the previous value.")?,
    }

    let mode = p.ask(
        "Work mode (remote, on-site, hybrid)",
        work_mode_label(availability.work_mode),
    )?;
    match parse_choice::<WorkMode>(&mode) {
        Ok(mode) => form.dispatch(FormAction::SetAvailability(AvailabilityField::WorkMode(mode))),
        Err(_) => p.say("Unknown work mode, keeping the previous value.")?,
    }
    Ok(())
}

// --- Interview scheduling ---

pub fn interview_form<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    previous: &InterviewForm,
) -> io::Result<InterviewForm> {
    let mut form = previous.clone();
    form.date = p.ask("Date (YYYY-MM-DD)", &form.date)?;
    form.time = p.ask("Time (HH:MM)", &form.time)?;
    form.duration = p.ask("Duration in minutes", &form.duration)?;
    let kind = p.ask("Type (video, phone, in-person)", form.kind.as_str())?;
    form.kind = kind.parse::<InterviewType>().unwrap_or(form.kind);
    if form.kind == InterviewType::InPerson {
        form.location = p.ask("Location", &form.location)?;
    } else {
        form.meeting_link = p.ask("Meeting link", &form.meeting_link)?;
    }
    form.interviewer = p.ask("Interviewer", &form.interviewer)?;
    form.interviewer_email = p.ask("Interviewer email", &form.interviewer_email)?;
    form.notes = p.ask("Notes for the candidate", &form.notes)?;
    Ok(form)
}

/// Asks for interview details until they validate or the user gives up,
/// then schedules the interview.
pub fn schedule_flow<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    api: &ApiService,
    application: &Application,
    notifier: &dyn Notifier,
) -> io::Result<bool> {
    p.say(&format!(
        "Scheduling an interview with {} for {}",
        application.applicant_name(),
        application.opportunity_title()
    ))?;
    let mut form = InterviewForm::default();
    loop {
        form = interview_form(p, &form)?;
        let result = form
            .validate()
            .and_then(|details| status::schedule_interview(api, application, &details));
        match result {
            Ok(()) => {
                notifier.notify(Notification::success(
                    "Interview Scheduled",
                    format!(
                        "Interview with {} is scheduled for {} at {}.",
                        application.applicant_name(),
                        form.date.trim(),
                        form.time.trim()
                    ),
                ));
                return Ok(true);
            }
            Err(e) => {
                notifier.notify(Notification::from_error("Scheduling Failed", &e));
                if p.at_eof() || !p.confirm("Try again?", true)? {
                    return Ok(false);
                }
            }
        }
    }
}

// --- Opportunity drafts ---

pub fn opportunity_draft<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    previous: &OpportunityDraft,
) -> io::Result<OpportunityDraft> {
    let mut draft = previous.clone();
    draft.title = p.ask("Title", &draft.title)?;
    draft.description = p.ask_multiline("Description", &draft.description)?;
    draft.kind = p.ask(
        "Type (full-time, part-time, contract, internship, volunteer)",
        &draft.kind,
    )?;
    draft.category = p.ask("Category", &draft.category)?;
    draft.location = p.ask("Location (city, or 'Remote' / 'Hybrid')", &draft.location)?;
    draft.duration = p.ask("Duration", &draft.duration)?;
    draft.start_date = p.ask("Start date (YYYY-MM-DD)", &draft.start_date)?;
    draft.end_date = p.ask("End date (YYYY-MM-DD, optional)", &draft.end_date)?;
    draft.requirements = p.ask("Requirements", &draft.requirements)?;
    draft.benefits = p.ask("Benefits", &draft.benefits)?;
    let skills = p.ask("Skills (comma separated)", &draft.skills.join(", "))?;
    draft.skills.clear();
    for skill in skills.split(',') {
        draft.add_skill(skill);
    }
    draft.is_paid = p.confirm("Is this a paid opportunity?", draft.is_paid)?;
    draft.application_deadline = p.ask("Application deadline (YYYY-MM-DD)", &draft.application_deadline)?;
    Ok(draft)
}

// --- Profile ---

/// Asks for the editable profile fields and returns them in the shape the
/// role's profile endpoint expects.
pub fn profile_changes<R: BufRead, W: Write>(
    p: &mut Prompter<R, W>,
    profile: &Profile,
) -> io::Result<Value> {
    let changes = match profile {
        Profile::Employee(emp) => {
            let info = &emp.personal_info;
            json!({
                "personalInfo": {
                    "firstName": p.ask("First name", &info.first_name)?,
                    "lastName": p.ask("Last name", &info.last_name)?,
                    "phone": p.ask("Phone", &info.phone)?,
                },
                "location": {
                    "city": p.ask("City", &emp.location.city)?,
                    "state": p.ask("State", &emp.location.state)?,
                    "country": p.ask("Country", &emp.location.country)?,
                },
            })
        }
        Profile::Organization(org) => json!({
            "name": p.ask("Organization name", &org.name)?,
            "description": p.ask_multiline("Description", &org.description)?,
            "industry": p.ask("Industry", &org.industry)?,
            "size": p.ask("Size", &org.size)?,
            "website": p.ask("Website", org.website.as_deref().unwrap_or_default())?,
        }),
    };
    Ok(changes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{stub_service, success};
    use crate::models::ApplicationStatus;
    use crate::notify::testing::RecordingNotifier;
    use serde_json::json;
    use std::io::Cursor;

    fn prompter(script: &str) -> Prompter<Cursor<Vec<u8>>, Vec<u8>> {
        Prompter::new(Cursor::new(script.as_bytes().to_vec()), Vec::new())
    }

    const PERSONAL: &str = "Jane\nDoe\njane@x.com\n555\n\nPune\nMH\nIndia\n\n";
    const EDUCATION: &str = "IIT\nBTech\nCS\n2019\nn\n2023\n8.5\nn\n";
    const EXPERIENCE: &str = "Intern\nAcme\nRemote\n2022\ny\nParsers\nn\n";
    const DOCUMENTS: &str = "\n\n\n\nhttps://github.com/jane\n";
    const LETTER: &str = "Dear team,\nI like Rust.\n.\nCompilers\n\n\n";
    const AVAILABILITY: &str = "2024-06-01\n30\nremote\n";

    #[test]
    fn test_ask_keeps_and_clears() {
        let mut p = prompter("\n-\nnew\n");
        assert_eq!(p.ask("Name", "old").unwrap(), "old");
        assert_eq!(p.ask("Name", "old").unwrap(), "");
        assert_eq!(p.ask("Name", "old").unwrap(), "new");
        assert_eq!(p.ask("Name", "old").unwrap(), "old");
        assert!(p.at_eof());
    }

    #[test]
    fn test_full_wizard_pass() {
        let script = [PERSONAL, EDUCATION, EXPERIENCE, DOCUMENTS, LETTER, AVAILABILITY, "s\n"].concat();
        let mut p = prompter(&script);
        let mut form = ApplicationForm::new("opp1", "Rust Intern");

        assert_eq!(run_wizard(&mut p, &mut form).unwrap(), WizardExit::Confirmed);
        let data = form.data();
        assert_eq!(data.personal_info.first_name, "Jane");
        assert_eq!(data.personal_info.city, "Pune");
        assert_eq!(data.education[0].end_date, "2023");
        assert!(data.experience[0].is_current);
        assert_eq!(data.documents.github, "https://github.com/jane");
        assert_eq!(data.cover_letter, "Dear team,\nI like Rust.");
        assert_eq!(data.additional_info.why_interested, "Compilers");
        assert_eq!(data.availability.hours_per_week, 30);
        assert_eq!(data.availability.work_mode, WorkMode::Remote);
        assert!(form.validate().is_ok());
    }

    #[test]
    fn test_jump_back_from_summary() {
        // Go back to step 5, keep the letter, then confirm again.
        let script = [
            PERSONAL, EDUCATION, EXPERIENCE, DOCUMENTS, LETTER, AVAILABILITY,
            "5\n", ".\nReally compilers\n\n\n", "\n\n\n", "s\n",
        ]
        .concat();
        let mut p = prompter(&script);
        let mut form = ApplicationForm::new("opp1", "Rust Intern");

        assert_eq!(run_wizard(&mut p, &mut form).unwrap(), WizardExit::Confirmed);
        assert_eq!(form.data().cover_letter, "Dear team,\nI like Rust.");
        assert_eq!(form.data().additional_info.why_interested, "Really compilers");
        assert_eq!(form.data().availability.hours_per_week, 30);
    }

    #[test]
    fn test_wizard_cancels_on_eof() {
        let mut p = prompter("Jane\n");
        let mut form = ApplicationForm::new("opp1", "Rust Intern");
        assert_eq!(run_wizard(&mut p, &mut form).unwrap(), WizardExit::Cancelled);
        assert_eq!(form.data().personal_info.first_name, "Jane");
    }

    #[test]
    fn test_apply_flow_submits_once() {
        let (api, transport, _) = stub_service();
        transport.push_json(201, success(json!({ "application": { "_id": "a1", "status": "submitted" } })));
        let notifier = RecordingNotifier::default();
        let script = [PERSONAL, EDUCATION, EXPERIENCE, DOCUMENTS, LETTER, AVAILABILITY, "s\n"].concat();
        let mut p = prompter(&script);
        let mut form = ApplicationForm::new("opp1", "Rust Intern");

        let outcome = apply_flow(&mut p, &mut form, &api, &notifier).unwrap();
        assert_eq!(outcome, SubmitOutcome::Submitted);
        assert_eq!(transport.requests().len(), 1);
        assert!(form.is_closed());
    }

    fn application(status: &str) -> Application {
        serde_json::from_value(json!({
            "_id": "app1",
            "status": status,
            "personalInfo": { "firstName": "Jane", "lastName": "Doe" },
            "opportunity": { "_id": "o1", "title": "Rust Intern" }
        }))
        .unwrap()
    }

    #[test]
    fn test_schedule_flow_retries_after_invalid_time() {
        let (api, transport, _) = stub_service();
        transport.push_json(200, success(json!({ "application": { "_id": "app1", "status": "interview" } })));
        let notifier = RecordingNotifier::default();
        let script = concat!(
            "2024-05-01\n2pm\n45\nvideo\nhttps://x\nJane\njane@x.com\n\n",
            "y\n",
            "\n14:00\n\n\n\n\n\n\n",
        );
        let mut p = prompter(script);

        assert!(schedule_flow(&mut p, &api, &application("shortlisted"), &notifier).unwrap());
        assert_eq!(notifier.count(), 2);
        assert_eq!(notifier.last().unwrap().title, "Interview Scheduled");

        let body = transport.last_request().body.unwrap();
        assert_eq!(body["status"], "interview");
        assert_eq!(body["interviewData"]["duration"], 45);
        assert_eq!(body["interviewData"]["meetingLink"], "https://x");
        assert!(body["note"].as_str().unwrap().starts_with("INTERVIEW SCHEDULED:"));
    }

    #[test]
    fn test_schedule_flow_refuses_terminal_application() {
        let (api, transport, _) = stub_service();
        let notifier = RecordingNotifier::default();
        let script = "2024-05-01\n14:00\n\n\n\nJane\n\n\nn\n";
        let mut p = prompter(script);
        let app = application("rejected");
        assert_eq!(app.status, ApplicationStatus::Rejected);

        assert!(!schedule_flow(&mut p, &api, &app, &notifier).unwrap());
        assert!(transport.requests().is_empty());
        assert_eq!(notifier.last().unwrap().title, "Validation Error");
    }

    #[test]
    fn test_opportunity_draft_prompts() {
        let script = "Rust Intern\nWrite parsers\n.\ninternship\ntechnology\nRemote\n3 months\n2024-06-01\n\n\nStipend\nRust, Git, rust\ny\n2024-05-15\n";
        let mut p = prompter(script);
        let draft = opportunity_draft(&mut p, &OpportunityDraft::default()).unwrap();
        assert_eq!(draft.title, "Rust Intern");
        assert_eq!(draft.description, "Write parsers");
        assert_eq!(draft.location_type(), "remote");
        assert_eq!(draft.skills, vec!["Rust", "Git", "rust"]);
        assert!(draft.is_paid);
        assert!(draft.validate().is_ok());
    }

    #[test]
    fn test_profile_changes_keep_unedited_fields() {
        let profile = Profile::decode(
            crate::models::Role::Employee,
            json!({
                "personalInfo": { "firstName": "Jane", "lastName": "Doe", "phone": "555" },
                "location": { "city": "Pune" }
            }),
        )
        .unwrap();
        let mut p = prompter("\nSmith\n-\n\nMH\nIndia\n");
        let changes = profile_changes(&mut p, &profile).unwrap();
        assert_eq!(changes["personalInfo"]["firstName"], "Jane");
        assert_eq!(changes["personalInfo"]["lastName"], "Smith");
        assert_eq!(changes["personalInfo"]["phone"], "");
        assert_eq!(changes["location"]["city"], "Pune");
        assert_eq!(changes["location"]["country"], "India");
    }
}
