mod api;
mod config;
mod dashboard;
mod display;
mod error;
mod feed;
mod guard;
mod models;
mod notify;
mod opportunity;
mod prompt;
mod recommend;
mod session;
mod status;
mod tui;
mod wizard;

use anyhow::{Context, Result, bail};
use clap::{Args, Parser, Subcommand};
use std::fs::OpenOptions;
use std::sync::{Arc, Mutex};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use api::{ApiService, FileTokenStore, HttpTransport};
use config::Config;
use dashboard::{DashboardData, DashboardView, Tab};
use display::{compensation, format_optional_date, truncate, wrap};
use feed::{FeedFilters, FeedState, FilterKind, SortBy};
use guard::{Access, Guard};
use models::{
    Application, ApplicationStatus, Interest, InterestCategory, InterestLevel, Opportunity,
    Profile, RegisterDetails, RegisterRequest, Role, Skill, SkillCategory, SkillLevel,
};
use notify::{Notification, Notifier, TerminalNotifier};
use opportunity::OpportunityDraft;
use prompt::Prompter;
use recommend::{MatchBand, RecommendationFilters, SkillsEditor};
use session::{AuthOutcome, Session};
use status::ReviewAction;
use wizard::{ApplicationForm, SubmitOutcome};

#[derive(Parser)]
#[command(name = "inkaranya")]
#[command(about = "Find opportunities, apply, and review applications on Inkaranya")]
struct Cli {
    /// API base URL (overrides config and INKARANYA_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    /// Log at debug level
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in and remember the session
    Login {
        /// Account email
        email: String,

        /// Password (asked for when omitted)
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Create an account
    Register {
        /// Account email
        email: String,

        /// Account type (employee, organization)
        #[arg(short, long, default_value = "employee", value_parser = parse_role)]
        role: Role,
    },

    /// Log out and forget the stored token
    Logout,

    /// Show the signed-in account
    Whoami,

    /// Show or edit your profile
    Profile {
        /// Edit the profile interactively
        #[arg(short, long)]
        edit: bool,
    },

    /// List opportunities
    Feed {
        #[command(flatten)]
        filters: FeedArgs,
    },

    /// Browse opportunities interactively
    Browse {
        #[command(flatten)]
        filters: FeedArgs,
    },

    /// Show one opportunity
    Show {
        /// Opportunity ID
        id: String,
    },

    /// Apply to an opportunity
    Apply {
        /// Opportunity ID
        id: String,
    },

    /// List your applications (or those received, for organizations)
    Applications {
        /// Filter by status
        #[arg(short, long)]
        status: Option<ApplicationStatus>,
    },

    /// Review applications interactively
    Review {
        /// Only show applications with this status
        #[arg(short, long)]
        status: Option<ApplicationStatus>,
    },

    /// Move an application to a new status
    Status {
        /// Application ID
        id: String,

        /// Target status (reviewing, shortlisted, accepted, rejected)
        status: ApplicationStatus,

        /// Note for the applicant
        #[arg(short, long)]
        note: Option<String>,
    },

    /// Schedule an interview for an application
    Schedule {
        /// Application ID
        id: String,
    },

    /// Withdraw one of your applications
    Withdraw {
        /// Application ID
        id: String,
    },

    /// List scheduled interviews
    Interviews,

    /// Show your dashboard
    Dashboard {
        /// Tab to show (overview, applications, opportunities, recommendations, profile, analytics)
        #[arg(short, long, default_value = "overview")]
        tab: Tab,
    },

    /// Show recommended opportunities
    Recommendations {
        /// Filter by type
        #[arg(short = 't', long = "type", default_value = feed::ALL)]
        kind: String,

        /// Filter by category
        #[arg(short, long, default_value = feed::ALL)]
        category: String,

        /// Filter by location (remote, on-site, hybrid)
        #[arg(short, long, default_value = feed::ALL)]
        location: String,

        /// Open the interactive view
        #[arg(long = "tui")]
        interactive: bool,
    },

    /// Manage your skills and interests
    Skills {
        #[command(subcommand)]
        command: SkillsCommands,
    },

    /// Manage your organization's opportunities
    Opportunity {
        #[command(subcommand)]
        command: OpportunityCommands,
    },

    /// Check that the API is reachable
    Health,
}

#[derive(Args)]
struct FeedArgs {
    /// Search title and description
    #[arg(short, long)]
    search: Option<String>,

    /// Filter by type (full-time, part-time, contract, internship, volunteer)
    #[arg(short = 't', long = "type")]
    kind: Option<String>,

    /// Filter by category
    #[arg(short, long)]
    category: Option<String>,

    /// Filter by location (remote, on-site, hybrid)
    #[arg(short, long)]
    location: Option<String>,

    /// Filter by industry
    #[arg(short, long)]
    industry: Option<String>,

    /// Sort order (recent, popular, salary, deadline)
    #[arg(long, default_value = "recent")]
    sort: SortBy,
}

impl FeedArgs {
    fn into_filters(self) -> FeedFilters {
        let mut filters = FeedFilters {
            search: self.search.unwrap_or_default(),
            sort_by: self.sort,
            ..FeedFilters::default()
        };
        for (kind, value) in [
            (FilterKind::Type, self.kind),
            (FilterKind::Category, self.category),
            (FilterKind::Location, self.location),
            (FilterKind::Industry, self.industry),
        ] {
            if let Some(value) = value {
                filters.set(kind, &value);
            }
        }
        filters
    }
}

#[derive(Subcommand)]
enum SkillsCommands {
    /// List your skills and interests
    List,

    /// Add a skill
    Add {
        /// Skill name
        name: String,

        /// Level (beginner, intermediate, advanced, expert)
        #[arg(short, long, default_value = "intermediate")]
        level: String,

        /// Category (technical, soft, language, other)
        #[arg(short, long, default_value = "technical")]
        category: String,

        /// Years of experience
        #[arg(short, long, default_value = "0")]
        years: u32,
    },

    /// Remove a skill by its number in `skills list`
    Remove {
        /// Skill number
        index: usize,
    },

    /// Add an interest
    Interest {
        /// Interest name
        name: String,

        /// Category (technology, business, design, social-impact, ...)
        #[arg(short, long, default_value = "other")]
        category: String,

        /// Level (casual, moderate, passionate, professional)
        #[arg(short, long, default_value = "moderate")]
        level: String,
    },

    /// Remove an interest by its number in `skills list`
    Uninterest {
        /// Interest number
        index: usize,
    },
}

#[derive(Subcommand)]
enum OpportunityCommands {
    /// List your posted opportunities
    List,

    /// Post a new opportunity
    Create,

    /// Edit an opportunity
    Update {
        /// Opportunity ID
        id: String,
    },

    /// Delete an opportunity
    Delete {
        /// Opportunity ID
        id: String,

        /// Skip the confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

fn parse_role(value: &str) -> Result<Role, String> {
    recommend::parse_choice(value).map_err(|e| e.to_string())
}

fn init_logging(config: &Config, verbose: bool) -> Result<()> {
    if let Some(dir) = config.log_file.parent() {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create log directory: {}", dir.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("Failed to open log file: {}", config.log_file.display()))?;

    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();
    Ok(())
}

/// Prints where to go instead when the session may not run this command.
fn allowed(guard: Guard, session: &Session) -> bool {
    match guard.check(session) {
        Access::Allow => true,
        Access::Redirect(route) => {
            println!("{}", route.hint());
            false
        }
        Access::Pending => {
            println!("Still checking your session. Try again.");
            false
        }
    }
}

fn role_of(session: &Session) -> Result<Role> {
    session.role().context("Not logged in")
}

fn print_opportunities(opportunities: &[Opportunity]) {
    println!(
        "{:<26} {:<30} {:<20} {:<12} {:<10}",
        "ID", "TITLE", "ORGANIZATION", "TYPE", "LOCATION"
    );
    println!("{}", "-".repeat(102));
    for opp in opportunities {
        println!(
            "{:<26} {:<30} {:<20} {:<12} {:<10}",
            opp.id,
            truncate(&opp.title, 28),
            truncate(opp.organization_name(), 18),
            opp.kind,
            opp.location.kind.as_str()
        );
    }
}

fn print_applications(applications: &[Application], role: Role) {
    let who = match role {
        Role::Organization => "APPLICANT",
        Role::Employee => "ORGANIZATION",
    };
    println!(
        "{:<26} {:<12} {:<30} {:<22} {:<12}",
        "ID", "STATUS", "OPPORTUNITY", who, "SUBMITTED"
    );
    println!("{}", "-".repeat(106));
    for app in applications {
        let other = match role {
            Role::Organization => app.applicant_name(),
            Role::Employee => app.organization_name().unwrap_or("-").to_string(),
        };
        println!(
            "{:<26} {:<12} {:<30} {:<22} {:<12}",
            app.id,
            status::status_label(app.status),
            truncate(app.opportunity_title(), 28),
            truncate(&other, 20),
            format_optional_date(app.submitted_at.as_deref().or(app.created_at.as_deref()))
        );
    }
}

fn print_opportunity(opp: &Opportunity) {
    println!("{}", opp.title);
    println!("Organization: {}", opp.organization_name());
    println!("Type: {}  Category: {}", opp.kind, opp.category);
    println!("Location: {} ({})", opp.location_display(), opp.location.kind.as_str());
    println!("Compensation: {}", compensation(&opp.compensation));
    if let Some(duration) = &opp.schedule.duration {
        println!("Duration: {}", duration);
    }
    if opp.schedule.start_date.is_some() {
        println!(
            "Dates: {} to {}",
            format_optional_date(opp.schedule.start_date.as_deref()),
            format_optional_date(opp.schedule.end_date.as_deref())
        );
    }
    println!(
        "Deadline: {}",
        format_optional_date(opp.application.deadline.as_deref())
    );
    println!(
        "Views: {}  Applications: {}",
        opp.metrics.views, opp.metrics.applications
    );
    if !opp.requirements.skills.is_empty() {
        let skills: Vec<&str> = opp
            .requirements
            .skills
            .iter()
            .map(|s| s.name.as_str())
            .collect();
        println!("Skills: {}", skills.join(", "));
    }
    if !opp.description.is_empty() {
        println!("\n{}", wrap(&opp.description, 80));
    }
}

fn print_dashboard(view: &DashboardView) {
    println!("== {} ==", view.tab().title());
    let Some(data) = &view.data else {
        println!("No dashboard data available.");
        return;
    };
    match (data, view.tab()) {
        (DashboardData::Employee(d), Tab::Overview) => {
            println!("Total applications:       {}", d.stats.total_applications);
            println!("Pending:                  {}", d.stats.pending_applications);
            println!("Shortlisted:              {}", d.stats.shortlisted_applications);
            println!("Accepted:                 {}", d.stats.accepted_applications);
            if !d.recent_applications.is_empty() {
                println!("\nRecent applications:");
                print_applications(&d.recent_applications, Role::Employee);
            }
        }
        (DashboardData::Employee(d), Tab::Applications) => {
            print_applications(&d.recent_applications, Role::Employee)
        }
        (DashboardData::Employee(d), Tab::Recommendations) => {
            print_opportunities(&d.recommended_opportunities)
        }
        (DashboardData::Employee(_), Tab::Opportunities) => match &view.browse {
            Some(opportunities) => print_opportunities(opportunities),
            None => println!("Opportunities could not be loaded."),
        },
        (DashboardData::Organization(d), Tab::Overview) => {
            if let Some(org) = &d.organization {
                println!("{} ({})", org.name, org.industry);
            } else {
                println!("Complete your organization profile to start posting.");
            }
            println!("Total opportunities:      {}", d.stats.total_opportunities);
            println!("Active opportunities:     {}", d.stats.active_opportunities);
            println!("Total applications:       {}", d.stats.total_applications);
            println!("Pending applications:     {}", d.stats.pending_applications);
        }
        (DashboardData::Organization(d), Tab::Opportunities) => {
            print_opportunities(&d.opportunities_with_stats)
        }
        (DashboardData::Organization(d), Tab::Applications) => {
            print_applications(&d.recent_applications, Role::Organization)
        }
        (DashboardData::Organization(d), Tab::Analytics) => {
            println!("{:<30} {:>8} {:>14}", "OPPORTUNITY", "VIEWS", "APPLICATIONS");
            println!("{}", "-".repeat(54));
            for opp in &d.opportunities_with_stats {
                println!(
                    "{:<30} {:>8} {:>14}",
                    truncate(&opp.title, 28),
                    opp.metrics.views,
                    opp.metrics.applications
                );
            }
        }
        _ => println!("Nothing to show on this tab."),
    }
}

fn print_skills(editor: &SkillsEditor) {
    if editor.skills.is_empty() {
        println!("No skills yet.");
    } else {
        println!("Skills:");
        for (i, skill) in editor.skills.iter().enumerate() {
            println!(
                "  {}. {} ({:?}, {} yrs)",
                i + 1,
                skill.name,
                skill.level,
                skill.years_of_experience
            );
        }
    }
    if editor.interests.is_empty() {
        println!("No interests yet.");
    } else {
        println!("Interests:");
        for (i, interest) in editor.interests.iter().enumerate() {
            println!(
                "  {}. {} ({:?}, {:?})",
                i + 1,
                interest.name,
                interest.category,
                interest.level
            );
        }
    }
}

fn print_profile(profile: &Profile) {
    match profile {
        Profile::Employee(emp) => {
            println!("Name: {}", profile.display_name());
            println!("Phone: {}", emp.personal_info.phone);
            println!("City: {}", emp.location.city);
            println!("Skills: {}", emp.skills.len());
            println!("Interests: {}", emp.interests.len());
        }
        Profile::Organization(org) => {
            println!("Name: {}", org.name);
            println!("Industry: {}", org.industry);
            println!("Size: {}", org.size);
            if let Some(website) = &org.website {
                println!("Website: {}", website);
            }
            if !org.description.is_empty() {
                println!("\n{}", wrap(&org.description, 80));
            }
        }
    }
}

/// Applies one skills subcommand to the editor. True when the lists changed
/// and need saving.
fn edit_skills(editor: &mut SkillsEditor, command: SkillsCommands) -> Result<bool> {
    let changed = match command {
        SkillsCommands::List => {
            print_skills(editor);
            false
        }
        SkillsCommands::Add {
            name,
            level,
            category,
            years,
        } => {
            let skill = Skill {
                name: name.clone(),
                level: recommend::parse_choice::<SkillLevel>(&level)?,
                category: Some(recommend::parse_choice::<SkillCategory>(&category)?),
                years_of_experience: years,
            };
            let added = editor.add_skill(skill);
            if !added {
                println!("'{}' is already in your skills.", name.trim());
            }
            added
        }
        SkillsCommands::Remove { index } => {
            if editor.remove_skill(position(index)?).is_none() {
                bail!("No skill number {}", index);
            }
            true
        }
        SkillsCommands::Interest {
            name,
            category,
            level,
        } => {
            let interest = Interest {
                name: name.clone(),
                category: recommend::parse_choice::<InterestCategory>(&category)?,
                level: recommend::parse_choice::<InterestLevel>(&level)?,
            };
            let added = editor.add_interest(interest);
            if !added {
                println!("'{}' is already in your interests.", name.trim());
            }
            added
        }
        SkillsCommands::Uninterest { index } => {
            if editor.remove_interest(position(index)?).is_none() {
                bail!("No interest number {}", index);
            }
            true
        }
    };
    Ok(changed)
}

/// Ids on the command line are 1-based.
fn position(index: usize) -> Result<usize> {
    index.checked_sub(1).context("Numbers start at 1")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load()?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }
    init_logging(&config, cli.verbose)?;
    info!(api_url = %config.api_url, "starting");

    let transport = HttpTransport::new(&config.api_url, config.timeout())?;
    let tokens = FileTokenStore::new(&config.token_file);
    let api = ApiService::new(Arc::new(transport), Arc::new(tokens));
    let mut session = Session::new(api.clone());
    session.init();

    let notifier = TerminalNotifier;

    match cli.command {
        Commands::Login { email, password } => {
            if !allowed(Guard::Public, &session) {
                return Ok(());
            }
            let password = match password {
                Some(password) => password,
                None => Prompter::stdio().ask("Password", "")?,
            };
            match session.login(&email, &password) {
                AuthOutcome::Success(user) => {
                    println!("Logged in as {} ({}).", user.email, user.role.as_str())
                }
                AuthOutcome::Failure(message) => {
                    notifier.notify(Notification::error("Login Failed", message))
                }
            }
        }

        Commands::Register { email, role } => {
            if !allowed(Guard::Public, &session) {
                return Ok(());
            }
            let mut p = Prompter::stdio();
            let password = p.ask("Password", "")?;
            let confirm = p.ask("Confirm password", "")?;
            if password != confirm {
                notifier.notify(Notification::error("Registration Failed", "Passwords do not match"));
                return Ok(());
            }
            let details = match role {
                Role::Employee => RegisterDetails::Employee {
                    first_name: p.ask("First name", "")?,
                    last_name: p.ask("Last name", "")?,
                    phone: p.ask("Phone", "")?,
                },
                Role::Organization => RegisterDetails::Organization {
                    name: p.ask("Organization name", "")?,
                    description: p.ask_multiline("Description", "")?,
                    industry: p.ask("Industry", "")?,
                    size: p.ask("Size (1-10, 11-50, 51-200, 201-500, 500+)", "1-10")?,
                },
            };
            let request = RegisterRequest {
                email,
                password,
                role,
                details,
            };
            match session.register(&request) {
                AuthOutcome::Success(user) => println!(
                    "Welcome to Inkaranya! Registered {} as {}.",
                    user.email,
                    user.role.as_str()
                ),
                AuthOutcome::Failure(message) => {
                    notifier.notify(Notification::error("Registration Failed", message))
                }
            }
        }

        Commands::Logout => {
            if !allowed(Guard::Protected, &session) {
                return Ok(());
            }
            session.logout();
            println!("Logged out.");
        }

        Commands::Whoami => {
            if !allowed(Guard::Protected, &session) {
                return Ok(());
            }
            if let Some(user) = session.user() {
                println!("Email: {}", user.email);
                println!("Role: {}", user.role.as_str());
            }
            if let Some(profile) = session.profile() {
                println!("Name: {}", profile.display_name());
            }
        }

        Commands::Profile { edit } => {
            if !allowed(Guard::Protected, &session) {
                return Ok(());
            }
            if edit {
                let changes = match session.profile() {
                    Some(profile) => prompt::profile_changes(&mut Prompter::stdio(), profile)?,
                    None => bail!("No profile found for this account"),
                };
                if let Err(e) = session.update_profile(&changes) {
                    notifier.notify(Notification::from_error("Update Failed", &e));
                    return Ok(());
                }
                notifier.notify(Notification::success("Profile Updated", "Your profile was saved."));
            }
            match session.profile() {
                Some(profile) => print_profile(profile),
                None => println!("No profile found for this account."),
            }
        }

        Commands::Feed { filters } => {
            let mut feed = FeedState::new(filters.into_filters());
            if feed.fetch(&api, &notifier) {
                if feed.opportunities.is_empty() {
                    println!("No opportunities found. Try adjusting your filters.");
                } else {
                    print_opportunities(&feed.opportunities);
                    if let Some(total) = feed.total {
                        println!("\n{} of {} opportunities", feed.opportunities.len(), total);
                    }
                }
            }
        }

        Commands::Browse { filters } => {
            tui::run_feed(&api, filters.into_filters())?;
        }

        Commands::Show { id } => {
            let Some(opp) = notify::reported(&notifier, "Load Failed", api.opportunity(&id)) else {
                return Ok(());
            };
            print_opportunity(&opp);
        }

        Commands::Apply { id } => {
            if !allowed(Guard::Role(Role::Employee), &session) {
                return Ok(());
            }
            let Some(opp) = notify::reported(&notifier, "Load Failed", api.opportunity(&id)) else {
                return Ok(());
            };
            let mut form = ApplicationForm::new(&opp.id, &opp.title);
            form.prefill(&session);
            let mut p = Prompter::stdio();
            if prompt::apply_flow(&mut p, &mut form, &api, &notifier)? == SubmitOutcome::Submitted {
                println!("Track it with `inkaranya applications`.");
            }
        }

        Commands::Applications { status } => {
            if !allowed(Guard::Protected, &session) {
                return Ok(());
            }
            let role = role_of(&session)?;
            let query = status
                .map(|s| vec![("status".to_string(), s.as_str().to_string())])
                .unwrap_or_default();
            let loaded = match role {
                Role::Organization => api.organization_applications(query),
                Role::Employee => api.employee_applications(query),
            };
            let Some(list) = notify::reported(&notifier, "Load Failed", loaded) else {
                return Ok(());
            };
            if list.applications.is_empty() {
                println!("No applications found.");
            } else {
                print_applications(&list.applications, role);
            }
        }

        Commands::Review { status } => {
            if !allowed(Guard::Protected, &session) {
                return Ok(());
            }
            tui::run_review(&api, role_of(&session)?, status, &notifier)?;
        }

        Commands::Status { id, status, note } => {
            if !allowed(Guard::Role(Role::Organization), &session) {
                return Ok(());
            }
            let Some(action) = ReviewAction::for_target(status) else {
                bail!("Applications cannot be moved back to {}", status);
            };
            if action == ReviewAction::ScheduleInterview {
                println!("Use `inkaranya schedule {}` to set up an interview.", id);
                return Ok(());
            }
            let Some(app) = notify::reported(&notifier, "Load Failed", api.application(&id)) else {
                return Ok(());
            };
            match status::apply_review(&api, &app, action, note.as_deref()) {
                Ok(returned) => {
                    let message = match status::refreshed(&api, &app.id, returned) {
                        Ok(fresh) => format!(
                            "{} is now {}",
                            fresh.applicant_name(),
                            status::status_label(fresh.status)
                        ),
                        Err(e) => {
                            warn!(application = %app.id, error = %e, "failed to reload application");
                            format!("{}'s application was updated", app.applicant_name())
                        }
                    };
                    notifier.notify(Notification::success("Status Updated", message));
                }
                Err(e) => notifier.notify(Notification::from_error("Update Failed", &e)),
            }
        }

        Commands::Schedule { id } => {
            if !allowed(Guard::Role(Role::Organization), &session) {
                return Ok(());
            }
            let Some(app) = notify::reported(&notifier, "Load Failed", api.application(&id)) else {
                return Ok(());
            };
            let mut p = Prompter::stdio();
            prompt::schedule_flow(&mut p, &api, &app, &notifier)?;
        }

        Commands::Withdraw { id } => {
            if !allowed(Guard::Role(Role::Employee), &session) {
                return Ok(());
            }
            let Some(app) = notify::reported(&notifier, "Load Failed", api.application(&id)) else {
                return Ok(());
            };
            let mut p = Prompter::stdio();
            if !p.confirm(
                &format!("Withdraw your application to {}?", app.opportunity_title()),
                false,
            )? {
                return Ok(());
            }
            match status::apply_review(&api, &app, ReviewAction::Withdraw, None) {
                Ok(_) => notifier.notify(Notification::success(
                    "Application Withdrawn",
                    format!("Your application to {} was withdrawn.", app.opportunity_title()),
                )),
                Err(e) => notifier.notify(Notification::from_error("Withdraw Failed", &e)),
            }
        }

        Commands::Interviews => {
            if !allowed(Guard::Protected, &session) {
                return Ok(());
            }
            let role = role_of(&session)?;
            let loaded = match role {
                Role::Organization => api.organization_applications(vec![]),
                Role::Employee => api.employee_applications(vec![]),
            };
            let Some(list) = notify::reported(&notifier, "Load Failed", loaded) else {
                return Ok(());
            };
            let scheduled = status::interviews(&list.applications);
            if scheduled.is_empty() {
                println!("No interviews scheduled.");
            } else {
                println!(
                    "{:<12} {:<6} {:<10} {:<24} {:<28} {:<20}",
                    "DATE", "TIME", "TYPE", "WITH", "OPPORTUNITY", "INTERVIEWER"
                );
                println!("{}", "-".repeat(104));
                for (app, details) in scheduled {
                    let with = match role {
                        Role::Organization => app.applicant_name(),
                        Role::Employee => app.organization_name().unwrap_or("-").to_string(),
                    };
                    println!(
                        "{:<12} {:<6} {:<10} {:<24} {:<28} {:<20}",
                        details.date,
                        details.time,
                        details.kind.unwrap_or_default().as_str(),
                        truncate(&with, 22),
                        truncate(app.opportunity_title(), 26),
                        truncate(&details.interviewer, 18)
                    );
                }
            }
        }

        Commands::Dashboard { tab } => {
            if !allowed(Guard::Protected, &session) {
                return Ok(());
            }
            let role = role_of(&session)?;
            let mut view = DashboardView::load(&api, role, &notifier);
            if !view.select(tab, &api, &notifier) {
                let names: Vec<&str> = Tab::for_role(role).iter().map(Tab::title).collect();
                println!("Available tabs: {}", names.join(", "));
                return Ok(());
            }
            print_dashboard(&view);
        }

        Commands::Recommendations {
            kind,
            category,
            location,
            interactive,
        } => {
            if !allowed(Guard::Role(Role::Employee), &session) {
                return Ok(());
            }
            let filters = RecommendationFilters {
                kind,
                category,
                location,
            };
            if interactive {
                tui::run_recommendations(&api, filters)?;
                return Ok(());
            }
            let recommendations = recommend::fetch_recommendations(&api, &filters, &notifier);
            if recommendations.is_empty() {
                println!("No recommendations yet. Add skills with `inkaranya skills add`.");
            } else {
                println!(
                    "{:<26} {:>5} {:<16} {:<30} {:<20}",
                    "ID", "SCORE", "MATCH", "TITLE", "ORGANIZATION"
                );
                println!("{}", "-".repeat(101));
                for rec in &recommendations {
                    println!(
                        "{:<26} {:>4.0}% {:<16} {:<30} {:<20}",
                        rec.opportunity.id,
                        rec.scores.overall,
                        MatchBand::from_score(rec.scores.overall).label(),
                        truncate(&rec.opportunity.title, 28),
                        truncate(rec.opportunity.organization_name(), 18)
                    );
                }
            }
        }

        Commands::Skills { command } => {
            if !allowed(Guard::Role(Role::Employee), &session) {
                return Ok(());
            }
            let mut editor = match session.profile().and_then(|p| p.as_employee()) {
                Some(profile) => SkillsEditor::new(profile.skills.clone(), profile.interests.clone()),
                None => SkillsEditor::default(),
            };
            let changed = edit_skills(&mut editor, command)?;
            if changed && editor.save(&api, &notifier) {
                print_skills(&editor);
            }
        }

        Commands::Opportunity { command } => {
            if !allowed(Guard::Role(Role::Organization), &session) {
                return Ok(());
            }
            match command {
                OpportunityCommands::List => {
                    let loaded = api.organization_opportunities(vec![]);
                    let Some(list) = notify::reported(&notifier, "Load Failed", loaded) else {
                        return Ok(());
                    };
                    if list.opportunities.is_empty() {
                        println!("No opportunities posted yet.");
                    } else {
                        print_opportunities(&list.opportunities);
                    }
                }
                OpportunityCommands::Create => {
                    let mut p = Prompter::stdio();
                    let mut draft = OpportunityDraft::default();
                    loop {
                        draft = prompt::opportunity_draft(&mut p, &draft)?;
                        if opportunity::create(&api, &draft, &notifier)
                            || p.at_eof()
                            || !p.confirm("Edit and try again?", true)?
                        {
                            break;
                        }
                    }
                }
                OpportunityCommands::Update { id } => {
                    let Some(existing) =
                        notify::reported(&notifier, "Load Failed", api.opportunity(&id))
                    else {
                        return Ok(());
                    };
                    let mut p = Prompter::stdio();
                    let mut draft = OpportunityDraft::from_opportunity(&existing);
                    loop {
                        draft = prompt::opportunity_draft(&mut p, &draft)?;
                        if opportunity::update(&api, &id, &draft, &notifier)
                            || p.at_eof()
                            || !p.confirm("Edit and try again?", true)?
                        {
                            break;
                        }
                    }
                }
                OpportunityCommands::Delete { id, yes } => {
                    if !yes {
                        let mut p = Prompter::stdio();
                        if !p.confirm(&format!("Delete opportunity {}?", id), false)? {
                            return Ok(());
                        }
                    }
                    opportunity::delete(&api, &id, &notifier);
                }
            }
        }

        Commands::Health => match api.health_check() {
            Ok(envelope) => println!(
                "API at {} is up: {}",
                config.api_url,
                envelope.message.unwrap_or_else(|| "OK".to_string())
            ),
            Err(e) => notifier.notify(Notification::error(
                "API Unreachable",
                format!("{}: {}", config.api_url, e),
            )),
        },
    }

    Ok(())
}
