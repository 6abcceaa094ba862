use chrono::{Local, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::info;

use crate::api::ApiService;
use crate::error::ApiError;
use crate::models::{
    Application, ApplicationStatus, InterviewDetails, InterviewStatus, InterviewType, Role,
};

pub const INTERVIEW_MARKER: &str = "INTERVIEW SCHEDULED:";

static NOTE_LINE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\s*(Date|Time|Duration|Type|Location|Meeting Link|Interviewer|Notes):\s*(.*?)\s*$")
        .expect("valid interview note pattern")
});

static INTERVIEWER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(.*?)\s*\((.*)\)\s*$").expect("valid interviewer pattern"));

// --- Transitions ---

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewAction {
    Review,
    Shortlist,
    ScheduleInterview,
    Accept,
    Reject,
    Withdraw,
}

impl ReviewAction {
    pub fn label(&self) -> &'static str {
        match self {
            ReviewAction::Review => "review",
            ReviewAction::Shortlist => "shortlist",
            ReviewAction::ScheduleInterview => "schedule an interview for",
            ReviewAction::Accept => "accept",
            ReviewAction::Reject => "reject",
            ReviewAction::Withdraw => "withdraw",
        }
    }

    pub fn target(&self) -> ApplicationStatus {
        match self {
            ReviewAction::Review => ApplicationStatus::Reviewing,
            ReviewAction::Shortlist => ApplicationStatus::Shortlisted,
            ReviewAction::ScheduleInterview => ApplicationStatus::Interview,
            ReviewAction::Accept => ApplicationStatus::Accepted,
            ReviewAction::Reject => ApplicationStatus::Rejected,
            ReviewAction::Withdraw => ApplicationStatus::Withdrawn,
        }
    }

    /// Maps a requested target status back to the action that produces it.
    pub fn for_target(status: ApplicationStatus) -> Option<Self> {
        match status {
            ApplicationStatus::Reviewing => Some(ReviewAction::Review),
            ApplicationStatus::Shortlisted => Some(ReviewAction::Shortlist),
            ApplicationStatus::Interview => Some(ReviewAction::ScheduleInterview),
            ApplicationStatus::Accepted => Some(ReviewAction::Accept),
            ApplicationStatus::Rejected => Some(ReviewAction::Reject),
            ApplicationStatus::Withdrawn => Some(ReviewAction::Withdraw),
            ApplicationStatus::Submitted => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("Cannot {} an application that is {}", .action.label(), .from)]
pub struct TransitionError {
    pub from: ApplicationStatus,
    pub action: ReviewAction,
}

/// Client-side transition table. The server re-validates every request.
pub fn transition(
    from: ApplicationStatus,
    action: ReviewAction,
) -> Result<ApplicationStatus, TransitionError> {
    use ApplicationStatus::*;

    let allowed = match action {
        ReviewAction::Review => matches!(from, Submitted),
        ReviewAction::Shortlist => matches!(from, Submitted | Reviewing),
        ReviewAction::ScheduleInterview => {
            matches!(from, Submitted | Reviewing | Shortlisted | Interview)
        }
        ReviewAction::Accept | ReviewAction::Reject | ReviewAction::Withdraw => !from.is_terminal(),
    };

    if allowed {
        Ok(action.target())
    } else {
        Err(TransitionError { from, action })
    }
}

pub fn available_actions(status: ApplicationStatus, role: Role) -> Vec<ReviewAction> {
    let candidates: &[ReviewAction] = match role {
        Role::Organization => &[
            ReviewAction::Review,
            ReviewAction::Shortlist,
            ReviewAction::ScheduleInterview,
            ReviewAction::Accept,
            ReviewAction::Reject,
        ],
        Role::Employee => &[ReviewAction::Withdraw],
    };
    candidates
        .iter()
        .copied()
        .filter(|action| transition(status, *action).is_ok())
        .collect()
}

pub fn status_label(status: ApplicationStatus) -> &'static str {
    match status {
        ApplicationStatus::Submitted => "Submitted",
        ApplicationStatus::Reviewing => "Reviewing",
        ApplicationStatus::Shortlisted => "Shortlisted",
        ApplicationStatus::Interview => "Interview",
        ApplicationStatus::Accepted => "Accepted",
        ApplicationStatus::Rejected => "Rejected",
        ApplicationStatus::Withdrawn => "Withdrawn",
    }
}

/// Validates the move locally, then asks the server to make it. Interview
/// scheduling goes through [`schedule_interview`] instead. Returns the
/// server's copy of the application when the response carries one.
pub fn apply_review(
    api: &ApiService,
    application: &Application,
    action: ReviewAction,
    note: Option<&str>,
) -> Result<Option<Application>, ApiError> {
    if action == ReviewAction::ScheduleInterview {
        return Err(ApiError::validation(
            "Interviews need a date, time and interviewer. Use the scheduling form.",
        ));
    }
    let next = transition(application.status, action)?;

    let returned = if action == ReviewAction::Withdraw {
        api.withdraw_application(&application.id)?
    } else {
        api.update_application_status(&application.id, next, note, None)?
    };
    info!(application = %application.id, from = %application.status, requested = %next, "status update accepted");
    Ok(returned)
}

/// The server owns an application's status: take its copy, fetching one when
/// the update response left it out.
pub fn refreshed(
    api: &ApiService,
    application_id: &str,
    returned: Option<Application>,
) -> Result<Application, ApiError> {
    match returned {
        Some(application) => Ok(application),
        None => api.application(application_id),
    }
}

pub fn schedule_interview(
    api: &ApiService,
    application: &Application,
    details: &InterviewDetails,
) -> Result<(), ApiError> {
    transition(application.status, ReviewAction::ScheduleInterview)?;
    let note = format_interview_note(details);
    api.update_application_status(
        &application.id,
        ApplicationStatus::Interview,
        Some(&note),
        Some(details),
    )?;
    info!(application = %application.id, date = %details.date, time = %details.time, "interview scheduled");
    Ok(())
}

// --- Interview scheduling form ---

#[derive(Debug, Clone)]
pub struct InterviewForm {
    pub date: String,
    pub time: String,
    pub duration: String,
    pub kind: InterviewType,
    pub location: String,
    pub meeting_link: String,
    pub notes: String,
    pub interviewer: String,
    pub interviewer_email: String,
}

impl Default for InterviewForm {
    fn default() -> Self {
        Self {
            date: String::new(),
            time: String::new(),
            duration: "60".to_string(),
            kind: InterviewType::Video,
            location: String::new(),
            meeting_link: String::new(),
            notes: String::new(),
            interviewer: String::new(),
            interviewer_email: String::new(),
        }
    }
}

impl InterviewForm {
    pub fn validate(&self) -> Result<InterviewDetails, ApiError> {
        let date = NaiveDate::parse_from_str(self.date.trim(), "%Y-%m-%d")
            .map_err(|_| ApiError::validation("Interview date must look like 2024-05-01."))?;
        let time = NaiveTime::parse_from_str(self.time.trim(), "%H:%M")
            .map_err(|_| ApiError::validation("Interview time must look like 14:00."))?;
        let duration: u32 = self
            .duration
            .trim()
            .parse()
            .ok()
            .filter(|d| *d > 0)
            .ok_or_else(|| ApiError::validation("Duration must be a positive number of minutes."))?;
        if self.interviewer.trim().is_empty() {
            return Err(ApiError::validation("Please name the interviewer."));
        }
        if self.kind == InterviewType::InPerson && self.location.trim().is_empty() {
            return Err(ApiError::validation("In-person interviews need a location."));
        }

        let naive = date.and_time(time);
        let datetime = Local
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc).to_rfc3339_opts(SecondsFormat::Millis, true))
            .unwrap_or_else(|| naive.format("%Y-%m-%dT%H:%M:%S").to_string());

        Ok(InterviewDetails {
            date: date.format("%Y-%m-%d").to_string(),
            time: time.format("%H:%M").to_string(),
            datetime: Some(datetime),
            duration,
            kind: Some(self.kind),
            location: non_empty(&self.location),
            meeting_link: non_empty(&self.meeting_link),
            notes: non_empty(&self.notes),
            interviewer: self.interviewer.trim().to_string(),
            interviewer_email: non_empty(&self.interviewer_email),
            status: InterviewStatus::Scheduled,
            scheduled_at: None,
        })
    }
}

fn non_empty(value: &str) -> Option<String> {
    let value = value.trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

// --- Legacy note format ---

/// Renders interview details in the note format older servers only understand.
pub fn format_interview_note(details: &InterviewDetails) -> String {
    let kind = details.kind.unwrap_or_default();
    let place = if kind == InterviewType::InPerson {
        format!("Location: {}", details.location.as_deref().unwrap_or(""))
    } else {
        format!("Meeting Link: {}", details.meeting_link.as_deref().unwrap_or(""))
    };
    format!(
        "{}\nDate: {}\nTime: {}\nDuration: {} minutes\nType: {}\n{}\nInterviewer: {} ({})\nNotes: {}",
        INTERVIEW_MARKER,
        details.date,
        details.time,
        details.duration,
        kind.as_str(),
        place,
        details.interviewer,
        details.interviewer_email.as_deref().unwrap_or(""),
        details.notes.as_deref().unwrap_or("")
    )
}

/// Recovers interview details from a note. Missing lines fall back to
/// defaults; this never fails.
pub fn parse_interview_note(text: &str, added_at: Option<&str>) -> InterviewDetails {
    let mut details = InterviewDetails {
        duration: 60,
        status: InterviewStatus::Scheduled,
        scheduled_at: added_at.map(str::to_string),
        ..Default::default()
    };

    for line in text.lines() {
        let Some(caps) = NOTE_LINE.captures(line) else {
            continue;
        };
        let value = caps[2].trim();
        match &caps[1] {
            "Date" => details.date = value.to_string(),
            "Time" => details.time = value.to_string(),
            "Duration" => {
                details.duration = value
                    .split_whitespace()
                    .next()
                    .and_then(|d| d.parse().ok())
                    .unwrap_or(60);
            }
            "Type" => details.kind = value.parse().ok(),
            "Location" => details.location = non_empty(value),
            "Meeting Link" => details.meeting_link = non_empty(value),
            "Interviewer" => {
                if let Some(parts) = INTERVIEWER.captures(value) {
                    details.interviewer = parts[1].trim().to_string();
                    details.interviewer_email = non_empty(&parts[2]);
                } else {
                    details.interviewer = value.to_string();
                }
            }
            "Notes" => details.notes = non_empty(value),
            _ => {}
        }
    }

    details
}

/// Interview details for an application: the dedicated field when present,
/// otherwise whatever the scheduling note carries.
pub fn interview_for(application: &Application) -> Option<InterviewDetails> {
    if let Some(details) = &application.interview_data {
        return Some(details.clone());
    }
    application
        .notes
        .iter()
        .find(|n| n.note.contains(INTERVIEW_MARKER))
        .map(|n| parse_interview_note(&n.note, n.added_at.as_deref()))
}

pub fn interviews(applications: &[Application]) -> Vec<(&Application, InterviewDetails)> {
    applications
        .iter()
        .filter(|app| app.status == ApplicationStatus::Interview)
        .filter_map(|app| interview_for(app).map(|details| (app, details)))
        .collect()
}
