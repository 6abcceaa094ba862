use anyhow::Result;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::cell::RefCell;
use std::io::stdout;
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread;
use std::time::Duration;
use tracing::{debug, error, info, warn};

use crate::api::{ApiService, Query};
use crate::display::{compensation, format_optional_date, truncate, wrap};
use crate::error::ApiError;
use crate::feed::{self, FeedFilters, FeedState, FilterKind};
use crate::models::{Application, ApplicationStatus, Opportunity, OpportunityList, Recommendation, Role};
use crate::notify::{self, Level, Notification, Notifier, TerminalNotifier};
use crate::prompt::{self, Prompter};
use crate::recommend::{self, MatchBand, RecommendationFilters};
use crate::status::{self, ReviewAction, TransitionError};

type Backend = CrosstermBackend<std::io::Stdout>;
type FetchResult = (u64, Result<OpportunityList, ApiError>);

const POLL: Duration = Duration::from_millis(150);

pub fn status_color(status: ApplicationStatus) -> Color {
    match status {
        ApplicationStatus::Submitted => Color::Blue,
        ApplicationStatus::Reviewing => Color::Yellow,
        ApplicationStatus::Shortlisted => Color::Cyan,
        ApplicationStatus::Interview => Color::Magenta,
        ApplicationStatus::Accepted => Color::Green,
        ApplicationStatus::Rejected => Color::Red,
        ApplicationStatus::Withdrawn => Color::DarkGray,
    }
}

pub fn band_color(band: MatchBand) -> Color {
    match band {
        MatchBand::Excellent => Color::Green,
        MatchBand::Good => Color::Yellow,
        MatchBand::Fair => Color::LightRed,
        MatchBand::Low => Color::Red,
    }
}

/// Keeps the latest notification for the footer; printing would tear the
/// alternate screen.
#[derive(Default)]
struct StatusLine {
    current: RefCell<Option<Notification>>,
}

impl Notifier for StatusLine {
    fn notify(&self, notification: Notification) {
        match notification.level {
            Level::Success => info!(title = %notification.title, message = %notification.message, "notification"),
            Level::Error => error!(title = %notification.title, message = %notification.message, "notification"),
        }
        *self.current.borrow_mut() = Some(notification);
    }
}

impl StatusLine {
    fn line(&self) -> Line<'static> {
        match self.current.borrow().as_ref() {
            Some(n) => {
                let color = match n.level {
                    Level::Success => Color::Green,
                    Level::Error => Color::Red,
                };
                Line::from(Span::styled(
                    format!(" {}: {}", n.title, n.message),
                    Style::default().fg(color),
                ))
            }
            None => Line::from(""),
        }
    }
}

fn enter() -> Result<Terminal<Backend>> {
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout()))?)
}

fn leave() -> Result<()> {
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}

/// Main area on top, then a filter line and a status/help line.
fn frame_layout(area: Rect) -> (Rect, Rect, Rect, Rect) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1), Constraint::Length(1)])
        .split(area);
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(35), Constraint::Percentage(65)])
        .split(rows[0]);
    (cols[0], cols[1], rows[1], rows[2])
}

fn render_detail(frame: &mut Frame, area: Rect, text: Text<'static>, scroll: u16) {
    let widget = Paragraph::new(text)
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false })
        .scroll((scroll, 0));
    frame.render_widget(widget, area);
}

fn render_footer(frame: &mut Frame, area: Rect, status: &StatusLine, help: &'static str) {
    let line = status.line();
    if line.width() > 0 {
        frame.render_widget(Paragraph::new(line), area);
    } else {
        frame.render_widget(
            Paragraph::new(help).style(Style::default().fg(Color::DarkGray)),
            area,
        );
    }
}

fn bold(text: impl Into<String>) -> Line<'static> {
    Line::from(Span::styled(
        text.into(),
        Style::default().add_modifier(Modifier::BOLD),
    ))
}

fn dim(text: impl Into<String>) -> Line<'static> {
    Line::from(Span::styled(text.into(), Style::default().fg(Color::DarkGray)))
}

fn opportunity_lines(opp: &Opportunity, lines: &mut Vec<Line<'static>>) {
    lines.push(bold(opp.title.clone()));
    lines.push(Line::from(format!("at {}", opp.organization_name())));
    lines.push(Line::from(format!(
        "{} | {} | {}",
        if opp.kind.is_empty() { "-" } else { opp.kind.as_str() },
        if opp.category.is_empty() { "-" } else { opp.category.as_str() },
        opp.location.kind.as_str()
    )));
    lines.push(Line::from(format!("Location: {}", opp.location_display())));
    lines.push(Line::from(format!("Compensation: {}", compensation(&opp.compensation))));
    if let Some(hours) = opp.schedule.hours_per_week {
        lines.push(Line::from(format!("Hours/week: {}", hours)));
    }
    lines.push(Line::from(format!(
        "Deadline: {}",
        format_optional_date(opp.application.deadline.as_deref())
    )));
    lines.push(dim(format!(
        "{} views, {} applications, posted {}",
        opp.metrics.views,
        opp.metrics.applications,
        format_optional_date(opp.created_at.as_deref())
    )));
    lines.push(Line::from(""));

    if !opp.requirements.skills.is_empty() {
        lines.push(bold("Skills"));
        for skill in &opp.requirements.skills {
            let marker = if skill.required { "*" } else { " " };
            lines.push(Line::from(format!(
                "  {} {} {}",
                marker,
                skill.name,
                skill.level.as_deref().map(|l| format!("({})", l)).unwrap_or_default()
            )));
        }
        lines.push(Line::from(""));
    }

    if !opp.description.is_empty() {
        lines.push(bold("Description"));
        for line in wrap(&opp.description, 70).lines() {
            lines.push(Line::from(format!("  {}", line)));
        }
        lines.push(Line::from(""));
    }

    let benefits: Vec<&str> = opp
        .benefits
        .iter()
        .chain(opp.compensation.benefits.iter())
        .map(String::as_str)
        .collect();
    if !benefits.is_empty() {
        lines.push(bold("Benefits"));
        lines.push(Line::from(format!("  {}", benefits.join(", "))));
        lines.push(Line::from(""));
    }

    lines.push(dim(format!("Apply with: inkaranya apply {}", opp.id)));
}

// --- Opportunity feed ---

struct FeedApp {
    feed: FeedState,
    selected: usize,
    scroll_offset: u16,
    search: Option<String>,
    status: StatusLine,
}

impl FeedApp {
    fn new(filters: FeedFilters) -> Self {
        Self {
            feed: FeedState::new(filters),
            selected: 0,
            scroll_offset: 0,
            search: None,
            status: StatusLine::default(),
        }
    }

    fn current(&self) -> Option<&Opportunity> {
        self.feed.opportunities.get(self.selected)
    }

    fn next(&mut self) {
        if self.selected + 1 < self.feed.opportunities.len() {
            self.selected += 1;
            self.scroll_offset = 0;
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
        }
    }

    /// Starts a fetch on a worker thread; the result comes back through `tx`.
    fn refresh(&mut self, api: &ApiService, tx: &Sender<FetchResult>) {
        let ticket = self.feed.begin_fetch();
        debug!(generation = ticket.generation, "feed fetch started");
        let api = api.clone();
        let tx = tx.clone();
        thread::spawn(move || {
            let result = api.opportunities(ticket.query);
            let _ = tx.send((ticket.generation, result));
        });
    }

    fn receive(&mut self, rx: &Receiver<FetchResult>) {
        while let Ok((generation, result)) = rx.try_recv() {
            if self.feed.commit(generation, result, &self.status) {
                self.selected = self
                    .selected
                    .min(self.feed.opportunities.len().saturating_sub(1));
                self.scroll_offset = 0;
            }
        }
    }

    fn filter_summary(&self) -> String {
        let f = &self.feed.filters;
        let search = match &self.search {
            Some(buffer) => format!("/{}_", buffer),
            None if f.search.is_empty() => "-".to_string(),
            None => f.search.clone(),
        };
        format!(
            " search: {}  type: {}  category: {}  location: {}  industry: {}  sort: {}",
            search,
            f.kind,
            f.category,
            f.location,
            f.industry,
            f.sort_by.as_str()
        )
    }
}

pub fn run_feed(api: &ApiService, filters: FeedFilters) -> Result<()> {
    let (tx, rx) = mpsc::channel();
    let mut app = FeedApp::new(filters);
    app.refresh(api, &tx);

    let mut terminal = enter()?;
    let result = feed_loop(&mut terminal, &mut app, api, &tx, &rx);
    leave()?;

    result
}

fn feed_loop(
    terminal: &mut Terminal<Backend>,
    app: &mut FeedApp,
    api: &ApiService,
    tx: &Sender<FetchResult>,
    rx: &Receiver<FetchResult>,
) -> Result<()> {
    let mut list_state = ListState::default();

    loop {
        app.receive(rx);
        list_state.select((!app.feed.opportunities.is_empty()).then_some(app.selected));
        terminal.draw(|frame| draw_feed(frame, app, &mut list_state))?;

        if !event::poll(POLL)? {
            continue;
        }
        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }

        if let Some(buffer) = &mut app.search {
            match key.code {
                KeyCode::Enter => {
                    let text = std::mem::take(buffer);
                    app.search = None;
                    app.feed.filters.search = text;
                    app.refresh(api, tx);
                }
                KeyCode::Esc => app.search = None,
                KeyCode::Backspace => {
                    buffer.pop();
                }
                KeyCode::Char(c) => buffer.push(c),
                _ => {}
            }
            continue;
        }

        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Down | KeyCode::Char('j') => app.next(),
            KeyCode::Up | KeyCode::Char('k') => app.prev(),
            KeyCode::Char('J') | KeyCode::PageDown => {
                app.scroll_offset = app.scroll_offset.saturating_add(3)
            }
            KeyCode::Char('K') | KeyCode::PageUp => {
                app.scroll_offset = app.scroll_offset.saturating_sub(3)
            }
            KeyCode::Char('/') => app.search = Some(app.feed.filters.search.clone()),
            KeyCode::Char('t') => {
                app.feed.filters.cycle(FilterKind::Type);
                app.refresh(api, tx);
            }
            KeyCode::Char('c') => {
                app.feed.filters.cycle(FilterKind::Category);
                app.refresh(api, tx);
            }
            KeyCode::Char('l') => {
                app.feed.filters.cycle(FilterKind::Location);
                app.refresh(api, tx);
            }
            KeyCode::Char('i') => {
                app.feed.filters.cycle(FilterKind::Industry);
                app.refresh(api, tx);
            }
            KeyCode::Char('s') => {
                app.feed.filters.sort_by = app.feed.filters.sort_by.next();
                app.refresh(api, tx);
            }
            KeyCode::Char('x') => {
                app.feed.filters.clear();
                app.refresh(api, tx);
            }
            KeyCode::Char('r') => app.refresh(api, tx),
            _ => {}
        }
    }
    Ok(())
}

fn draw_feed(frame: &mut Frame, app: &FeedApp, list_state: &mut ListState) {
    let (left, right, filters, footer) = frame_layout(frame.area());

    let items: Vec<ListItem> = app
        .feed
        .opportunities
        .iter()
        .map(|opp| {
            ListItem::new(format!(
                "{} | {}",
                truncate(&opp.title, 32),
                truncate(opp.organization_name(), 20)
            ))
        })
        .collect();

    let count = match app.feed.total {
        Some(total) => format!("{} of {}", app.feed.opportunities.len(), total),
        None => app.feed.opportunities.len().to_string(),
    };
    let loading = if app.feed.loading { " loading..." } else { "" };
    let list = List::new(items)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" Opportunities ({}){} ", count, loading)),
        )
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, left, list_state);

    let detail = match app.current() {
        Some(opp) => {
            let mut lines = Vec::new();
            opportunity_lines(opp, &mut lines);
            Text::from(lines)
        }
        None if app.feed.loading => Text::raw("Loading opportunities..."),
        None => Text::raw("No opportunities match these filters. Press x to clear them."),
    };
    render_detail(frame, right, detail, app.scroll_offset);

    frame.render_widget(
        Paragraph::new(app.filter_summary()).style(Style::default().fg(Color::Cyan)),
        filters,
    );
    render_footer(
        frame,
        footer,
        &app.status,
        " j/k:navigate  J/K:scroll  /:search  t/c/l/i:filters  s:sort  x:clear  r:refresh  q:quit",
    );
}

// --- Applications review ---

struct ReviewApp {
    applications: Vec<Application>,
    role: Role,
    selected: usize,
    scroll_offset: u16,
    status: StatusLine,
}

impl ReviewApp {
    fn current(&self) -> Option<&Application> {
        self.applications.get(self.selected)
    }

    fn next(&mut self) {
        if self.selected + 1 < self.applications.len() {
            self.selected += 1;
            self.scroll_offset = 0;
        }
    }

    fn prev(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.scroll_offset = 0;
        }
    }

    /// Checks the move against the role's actions before asking the server.
    fn allowed(&self, action: ReviewAction) -> Option<&Application> {
        let app = self.current()?;
        if status::available_actions(app.status, self.role).contains(&action) {
            Some(app)
        } else {
            let refusal = TransitionError {
                from: app.status,
                action,
            };
            self.status
                .notify(Notification::error("Not Allowed", refusal.to_string()));
            None
        }
    }

    fn act(&mut self, api: &ApiService, action: ReviewAction) {
        let Some(app) = self.allowed(action) else {
            return;
        };
        let id = app.id.clone();
        let name = app.applicant_name();
        match status::apply_review(api, app, action, None) {
            Ok(returned) => {
                if self.sync_row(api, &id, returned) {
                    let now = self.applications[self.selected].status;
                    self.status.notify(Notification::success(
                        "Status Updated",
                        format!("{} is now {}", name, status::status_label(now)),
                    ));
                }
            }
            Err(e) => self.status.notify(Notification::from_error("Update Failed", &e)),
        }
    }

    /// Swaps the selected row for the server's copy. False when that copy
    /// could not be loaded; the row is left as it was.
    fn sync_row(&mut self, api: &ApiService, id: &str, returned: Option<Application>) -> bool {
        match status::refreshed(api, id, returned) {
            Ok(fresh) => {
                self.applications[self.selected] = fresh;
                true
            }
            Err(e) => {
                warn!(application = %id, error = %e, "failed to reload application");
                self.status.notify(Notification::from_error("Refresh Failed", &e));
                false
            }
        }
    }
}

pub fn run_review(
    api: &ApiService,
    role: Role,
    status: Option<ApplicationStatus>,
    notifier: &dyn Notifier,
) -> Result<()> {
    let query: Query = status
        .map(|s| vec![("status".to_string(), s.as_str().to_string())])
        .unwrap_or_default();
    let loaded = match role {
        Role::Organization => api.organization_applications(query),
        Role::Employee => api.employee_applications(query),
    };
    let Some(list) = notify::reported(notifier, "Load Failed", loaded) else {
        return Ok(());
    };
    if list.applications.is_empty() {
        println!("No applications found.");
        return Ok(());
    }

    let mut app = ReviewApp {
        applications: list.applications,
        role,
        selected: 0,
        scroll_offset: 0,
        status: StatusLine::default(),
    };

    let mut terminal = enter()?;
    let result = review_loop(&mut terminal, &mut app, api);
    leave()?;

    result
}

fn review_loop(terminal: &mut Terminal<Backend>, app: &mut ReviewApp, api: &ApiService) -> Result<()> {
    let mut list_state = ListState::default();
    list_state.select(Some(0));

    loop {
        list_state.select(Some(app.selected));
        terminal.draw(|frame| draw_review(frame, app, &mut list_state))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Down | KeyCode::Char('j') => app.next(),
            KeyCode::Up | KeyCode::Char('k') => app.prev(),
            KeyCode::Char('J') | KeyCode::PageDown => {
                app.scroll_offset = app.scroll_offset.saturating_add(3)
            }
            KeyCode::Char('K') | KeyCode::PageUp => {
                app.scroll_offset = app.scroll_offset.saturating_sub(3)
            }
            KeyCode::Char('v') => app.act(api, ReviewAction::Review),
            KeyCode::Char('s') => app.act(api, ReviewAction::Shortlist),
            KeyCode::Char('a') => app.act(api, ReviewAction::Accept),
            KeyCode::Char('x') => app.act(api, ReviewAction::Reject),
            KeyCode::Char('w') => app.act(api, ReviewAction::Withdraw),
            KeyCode::Char('i') => {
                let Some(application) = app.allowed(ReviewAction::ScheduleInterview).cloned() else {
                    continue;
                };
                // The scheduling form is line-oriented, so step out of the
                // alternate screen while it runs.
                leave()?;
                let scheduled = {
                    let mut prompter = Prompter::stdio();
                    prompt::schedule_flow(&mut prompter, api, &application, &TerminalNotifier)?
                };
                enable_raw_mode()?;
                stdout().execute(EnterAlternateScreen)?;
                terminal.clear()?;
                if scheduled && app.sync_row(api, &application.id, None) {
                    app.status.notify(Notification::success(
                        "Interview Scheduled",
                        format!("Interview set for {}", application.applicant_name()),
                    ));
                }
            }
            _ => {}
        }
    }
    Ok(())
}

fn draw_review(frame: &mut Frame, app: &ReviewApp, list_state: &mut ListState) {
    let (left, right, counts, footer) = frame_layout(frame.area());

    let items: Vec<ListItem> = app
        .applications
        .iter()
        .map(|a| {
            let label = match app.role {
                Role::Organization => a.applicant_name(),
                Role::Employee => a.opportunity_title().to_string(),
            };
            ListItem::new(Line::from(vec![
                Span::styled(
                    format!("{:<12}", status::status_label(a.status)),
                    Style::default().fg(status_color(a.status)),
                ),
                Span::raw(format!(
                    "{} | {}",
                    truncate(&label, 22),
                    truncate(a.opportunity_title(), 20)
                )),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(
            " Applications ({}) ",
            app.applications.len()
        )))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, left, list_state);

    render_detail(frame, right, application_detail(app), app.scroll_offset);

    let summary: Vec<String> = ApplicationStatus::ALL
        .iter()
        .map(|s| {
            let n = app.applications.iter().filter(|a| a.status == *s).count();
            format!("{} {}", status::status_label(*s), n)
        })
        .collect();
    frame.render_widget(
        Paragraph::new(format!(" {}", summary.join("  "))).style(Style::default().fg(Color::Cyan)),
        counts,
    );

    let help = match app.role {
        Role::Organization => {
            " j/k:navigate  J/K:scroll  v:review s:shortlist i:interview a:accept x:reject  q:quit"
        }
        Role::Employee => " j/k:navigate  J/K:scroll  w:withdraw  q:quit",
    };
    render_footer(frame, footer, &app.status, help);
}

fn action_key(action: ReviewAction) -> char {
    match action {
        ReviewAction::Review => 'v',
        ReviewAction::Shortlist => 's',
        ReviewAction::ScheduleInterview => 'i',
        ReviewAction::Accept => 'a',
        ReviewAction::Reject => 'x',
        ReviewAction::Withdraw => 'w',
    }
}

fn application_detail(app: &ReviewApp) -> Text<'static> {
    let Some(a) = app.current() else {
        return Text::raw("No application selected");
    };
    let mut lines: Vec<Line<'static>> = Vec::new();

    lines.push(bold(a.applicant_name()));
    lines.push(Line::from(format!("for {}", a.opportunity_title())));
    if let Some(org) = a.organization_name() {
        lines.push(Line::from(format!("at {}", org)));
    }
    lines.push(Line::from(Span::styled(
        format!("Status: {}", status::status_label(a.status)),
        Style::default().fg(status_color(a.status)),
    )));
    lines.push(dim(format!(
        "Submitted {}",
        format_optional_date(a.submitted_at.as_deref().or(a.created_at.as_deref()))
    )));

    let actions: Vec<String> = status::available_actions(a.status, app.role)
        .into_iter()
        .map(|action| format!("{}:{}", action_key(action), action.label()))
        .collect();
    if actions.is_empty() {
        lines.push(dim("No further actions"));
    } else {
        lines.push(dim(format!("Actions: {}", actions.join("  "))));
    }
    lines.push(Line::from(""));

    let info = &a.personal_info;
    lines.push(bold("Contact"));
    for (label, value) in [("Email", &info.email), ("Phone", &info.phone), ("City", &info.city)] {
        if !value.is_empty() {
            lines.push(Line::from(format!("  {}: {}", label, value)));
        }
    }
    lines.push(Line::from(""));

    if let Some(details) = status::interview_for(a) {
        lines.push(Line::from(Span::styled(
            "Interview",
            Style::default().fg(Color::Magenta).add_modifier(Modifier::BOLD),
        )));
        lines.push(Line::from(format!(
            "  {} at {} ({} min, {})",
            details.date,
            details.time,
            details.duration,
            details.kind.unwrap_or_default().as_str()
        )));
        if let Some(place) = details.location.as_ref().or(details.meeting_link.as_ref()) {
            lines.push(Line::from(format!("  {}", place)));
        }
        lines.push(Line::from(format!("  with {}", details.interviewer)));
        lines.push(Line::from(""));
    }

    if !a.skills.is_empty() {
        let names: Vec<&str> = a.skills.iter().map(|s| s.name.as_str()).collect();
        lines.push(bold("Skills"));
        lines.push(Line::from(format!("  {}", names.join(", "))));
        lines.push(Line::from(""));
    }

    let education: Vec<_> = a.education.iter().filter(|e| !e.institution.is_empty()).collect();
    if !education.is_empty() {
        lines.push(bold("Education"));
        for e in education {
            lines.push(Line::from(format!("  {} {}, {}", e.degree, e.field_of_study, e.institution)));
        }
        lines.push(Line::from(""));
    }

    let experience: Vec<_> = a.experience.iter().filter(|e| !e.company.is_empty()).collect();
    if !experience.is_empty() {
        lines.push(bold("Experience"));
        for e in experience {
            let end = if e.is_current { "present" } else { e.end_date.as_str() };
            lines.push(Line::from(format!("  {} at {} ({} - {})", e.title, e.company, e.start_date, end)));
        }
        lines.push(Line::from(""));
    }

    if !a.cover_letter.is_empty() {
        lines.push(bold("Cover Letter"));
        for line in wrap(&a.cover_letter, 70).lines() {
            lines.push(Line::from(format!("  {}", line)));
        }
        lines.push(Line::from(""));
    }

    let notes: Vec<_> = a
        .notes
        .iter()
        .filter(|n| !n.note.contains(status::INTERVIEW_MARKER))
        .collect();
    if !notes.is_empty() {
        lines.push(bold("Notes"));
        for n in notes {
            lines.push(Line::from(format!(
                "  [{}] {}",
                format_optional_date(n.added_at.as_deref()),
                n.note
            )));
        }
    }

    Text::from(lines)
}

// --- Recommendations ---

struct RecommendationsApp {
    recommendations: Vec<Recommendation>,
    filters: RecommendationFilters,
    selected: usize,
    scroll_offset: u16,
    status: StatusLine,
}

impl RecommendationsApp {
    fn reload(&mut self, api: &ApiService) {
        self.recommendations = recommend::fetch_recommendations(api, &self.filters, &self.status);
        self.selected = 0;
        self.scroll_offset = 0;
    }
}

pub fn run_recommendations(api: &ApiService, filters: RecommendationFilters) -> Result<()> {
    let mut app = RecommendationsApp {
        recommendations: Vec::new(),
        filters,
        selected: 0,
        scroll_offset: 0,
        status: StatusLine::default(),
    };
    app.reload(api);

    let mut terminal = enter()?;
    let result = recommendations_loop(&mut terminal, &mut app, api);
    leave()?;

    result
}

fn recommendations_loop(
    terminal: &mut Terminal<Backend>,
    app: &mut RecommendationsApp,
    api: &ApiService,
) -> Result<()> {
    let mut list_state = ListState::default();

    loop {
        list_state.select((!app.recommendations.is_empty()).then_some(app.selected));
        terminal.draw(|frame| draw_recommendations(frame, app, &mut list_state))?;

        let Event::Key(key) = event::read()? else {
            continue;
        };
        if key.kind != KeyEventKind::Press {
            continue;
        }
        match key.code {
            KeyCode::Char('q') | KeyCode::Esc => break,
            KeyCode::Down | KeyCode::Char('j') => {
                if app.selected + 1 < app.recommendations.len() {
                    app.selected += 1;
                    app.scroll_offset = 0;
                }
            }
            KeyCode::Up | KeyCode::Char('k') => {
                app.selected = app.selected.saturating_sub(1);
                app.scroll_offset = 0;
            }
            KeyCode::Char('J') | KeyCode::PageDown => {
                app.scroll_offset = app.scroll_offset.saturating_add(3)
            }
            KeyCode::Char('K') | KeyCode::PageUp => {
                app.scroll_offset = app.scroll_offset.saturating_sub(3)
            }
            KeyCode::Char('t') => {
                app.filters.kind = feed::next_option(feed::TYPES, &app.filters.kind).to_string();
                app.reload(api);
            }
            KeyCode::Char('c') => {
                app.filters.category =
                    feed::next_option(feed::CATEGORIES, &app.filters.category).to_string();
                app.reload(api);
            }
            KeyCode::Char('l') => {
                app.filters.location =
                    feed::next_option(feed::LOCATIONS, &app.filters.location).to_string();
                app.reload(api);
            }
            KeyCode::Char('r') => app.reload(api),
            _ => {}
        }
    }
    Ok(())
}

fn score_span(label: &str, score: f64) -> Span<'static> {
    let text = if label.is_empty() {
        format!("{:>3.0}%", score)
    } else {
        format!("{} {:.0}%", label, score)
    };
    Span::styled(
        text,
        Style::default().fg(band_color(MatchBand::from_score(score))),
    )
}

fn draw_recommendations(frame: &mut Frame, app: &RecommendationsApp, list_state: &mut ListState) {
    let (left, right, filters, footer) = frame_layout(frame.area());

    let items: Vec<ListItem> = app
        .recommendations
        .iter()
        .map(|rec| {
            ListItem::new(Line::from(vec![
                score_span("", rec.scores.overall),
                Span::raw(format!(" {}", truncate(&rec.opportunity.title, 30))),
            ]))
        })
        .collect();
    let list = List::new(items)
        .block(Block::default().borders(Borders::ALL).title(format!(
            " Recommended ({}) ",
            app.recommendations.len()
        )))
        .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
        .highlight_symbol("> ");
    frame.render_stateful_widget(list, left, list_state);

    let detail = match app.recommendations.get(app.selected) {
        Some(rec) => {
            let band = MatchBand::from_score(rec.scores.overall);
            let mut lines = vec![
                Line::from(Span::styled(
                    format!("{} ({:.0}%)", band.label(), rec.scores.overall),
                    Style::default().fg(band_color(band)).add_modifier(Modifier::BOLD),
                )),
                Line::from(vec![
                    score_span("Skills", rec.scores.skills),
                    Span::raw("  "),
                    score_span("Interests", rec.scores.interests),
                    Span::raw("  "),
                    score_span("Location", rec.scores.location),
                ]),
            ];
            for reason in &rec.match_reasons {
                lines.push(Line::from(format!("  + {}", reason)));
            }
            lines.push(Line::from(""));
            opportunity_lines(&rec.opportunity, &mut lines);
            Text::from(lines)
        }
        None => Text::raw(
            "No recommendations yet. Try adjusting your filters or add skills with `inkaranya skills`.",
        ),
    };
    render_detail(frame, right, detail, app.scroll_offset);

    frame.render_widget(
        Paragraph::new(format!(
            " type: {}  category: {}  location: {}",
            app.filters.kind, app.filters.category, app.filters.location
        ))
        .style(Style::default().fg(Color::Cyan)),
        filters,
    );
    render_footer(
        frame,
        footer,
        &app.status,
        " j/k:navigate  J/K:scroll  t/c/l:filters  r:refresh  q:quit",
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{stub_service, success};
    use serde_json::json;

    fn review_app(statuses: &[&str], role: Role) -> ReviewApp {
        let applications = statuses
            .iter()
            .enumerate()
            .map(|(i, s)| {
                serde_json::from_value(json!({
                    "_id": format!("app{}", i),
                    "status": s,
                    "personalInfo": { "firstName": "Applicant", "lastName": i.to_string() }
                }))
                .unwrap()
            })
            .collect();
        ReviewApp {
            applications,
            role,
            selected: 0,
            scroll_offset: 0,
            status: StatusLine::default(),
        }
    }

    #[test]
    fn test_review_action_updates_local_status() {
        let (api, transport, _) = stub_service();
        transport.push_json(200, success(json!({ "application": { "_id": "app0", "status": "shortlisted" } })));
        let mut app = review_app(&["submitted"], Role::Organization);

        app.act(&api, ReviewAction::Shortlist);
        assert_eq!(app.applications[0].status, ApplicationStatus::Shortlisted);
        let body = transport.last_request().body.unwrap();
        assert_eq!(body["status"], "shortlisted");
        assert_eq!(app.status.current.borrow().as_ref().unwrap().title, "Status Updated");
    }

    #[test]
    fn test_review_row_shows_the_status_the_server_returned() {
        let (api, transport, _) = stub_service();
        transport.push_json(
            200,
            success(json!({ "application": {
                "_id": "app0",
                "status": "reviewing",
                "notes": [{ "note": "Needs a second look" }]
            } })),
        );
        let mut app = review_app(&["reviewing"], Role::Organization);

        app.act(&api, ReviewAction::Shortlist);
        assert_eq!(transport.requests().len(), 1);
        assert_eq!(app.applications[0].status, ApplicationStatus::Reviewing);
        assert_eq!(app.applications[0].notes.len(), 1);
        let seen = app.status.current.borrow();
        assert_eq!(seen.as_ref().unwrap().message, "Applicant 0 is now Reviewing");
    }

    #[test]
    fn test_failed_reload_leaves_row_and_reports() {
        let (api, transport, _) = stub_service();
        transport.push_json(200, success(json!({})));
        transport.push_transport_error("connection reset");
        let mut app = review_app(&["submitted"], Role::Organization);

        app.act(&api, ReviewAction::Review);
        assert_eq!(transport.requests().len(), 2);
        assert_eq!(app.applications[0].status, ApplicationStatus::Submitted);
        let seen = app.status.current.borrow();
        assert_eq!(seen.as_ref().unwrap().title, "Refresh Failed");
    }

    #[test]
    fn test_review_refuses_illegal_move_without_request() {
        let (api, transport, _) = stub_service();
        let mut app = review_app(&["accepted"], Role::Organization);

        app.act(&api, ReviewAction::Reject);
        assert!(transport.requests().is_empty());
        assert_eq!(app.applications[0].status, ApplicationStatus::Accepted);
        let seen = app.status.current.borrow();
        assert_eq!(seen.as_ref().unwrap().title, "Not Allowed");
    }

    #[test]
    fn test_organizations_cannot_withdraw() {
        let (api, transport, _) = stub_service();
        let mut app = review_app(&["submitted"], Role::Organization);
        app.act(&api, ReviewAction::Withdraw);
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_employee_withdraw_uses_withdraw_endpoint() {
        let (api, transport, _) = stub_service();
        transport.push_json(200, success(json!({})));
        transport.push_json(
            200,
            success(json!({ "application": { "_id": "app0", "status": "withdrawn" } })),
        );
        let mut app = review_app(&["reviewing"], Role::Employee);
        app.act(&api, ReviewAction::Withdraw);
        let paths: Vec<String> = transport.requests().into_iter().map(|r| r.path).collect();
        assert_eq!(paths, vec!["/applications/app0/withdraw", "/applications/app0"]);
        assert_eq!(app.applications[0].status, ApplicationStatus::Withdrawn);
    }

    #[test]
    fn test_server_rejection_keeps_status() {
        let (api, transport, _) = stub_service();
        transport.push_json(409, json!({ "status": "error", "message": "Application already closed" }));
        let mut app = review_app(&["reviewing"], Role::Organization);
        app.act(&api, ReviewAction::Accept);
        assert_eq!(app.applications[0].status, ApplicationStatus::Reviewing);
        let seen = app.status.current.borrow();
        assert_eq!(seen.as_ref().unwrap().message, "Application already closed");
    }

    #[test]
    fn test_feed_receive_drops_stale_worker_results() {
        let (tx, rx) = mpsc::channel();
        let mut app = FeedApp::new(FeedFilters::default());
        let old = app.feed.begin_fetch();
        let new = app.feed.begin_fetch();
        let list = |title: &str| -> OpportunityList {
            serde_json::from_value(json!({ "opportunities": [{ "_id": title, "title": title }] })).unwrap()
        };
        tx.send((new.generation, Ok(list("fresh")))).unwrap();
        tx.send((old.generation, Ok(list("stale")))).unwrap();

        app.receive(&rx);
        assert_eq!(app.current().unwrap().title, "fresh");
        assert!(!app.feed.loading);
    }

    #[test]
    fn test_colors_follow_bands() {
        assert_eq!(band_color(MatchBand::from_score(85.0)), Color::Green);
        assert_eq!(band_color(MatchBand::from_score(10.0)), Color::Red);
        assert_eq!(status_color(ApplicationStatus::Rejected), Color::Red);
    }
}
