use tracing::{debug, info};

use crate::api::{ApiService, Query};
use crate::error::ApiError;
use crate::models::{Opportunity, OpportunityList};
use crate::notify::{Notification, Notifier};

pub const ALL: &str = "all";

pub const TYPES: &[&str] = &[ALL, "full-time", "part-time", "contract", "internship", "volunteer"];
pub const CATEGORIES: &[&str] = &[
    ALL,
    "technology",
    "business",
    "design",
    "marketing",
    "education",
    "healthcare",
    "non-profit",
];
pub const LOCATIONS: &[&str] = &[ALL, "remote", "on-site", "hybrid"];
pub const INDUSTRIES: &[&str] = &[
    ALL,
    "Technology",
    "Finance",
    "Healthcare",
    "Education",
    "Entertainment",
    "Automotive",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortBy {
    #[default]
    Recent,
    Popular,
    Salary,
    Deadline,
}

impl SortBy {
    pub const ALL: [SortBy; 4] = [SortBy::Recent, SortBy::Popular, SortBy::Salary, SortBy::Deadline];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortBy::Recent => "recent",
            SortBy::Popular => "popular",
            SortBy::Salary => "salary",
            SortBy::Deadline => "deadline",
        }
    }

    pub fn next(&self) -> SortBy {
        let i = SortBy::ALL.iter().position(|s| s == self).unwrap_or(0);
        SortBy::ALL[(i + 1) % SortBy::ALL.len()]
    }
}

impl std::str::FromStr for SortBy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SortBy::ALL
            .into_iter()
            .find(|sort| sort.as_str() == s.trim().to_lowercase())
            .ok_or_else(|| format!("Unknown sort '{}'. Expected recent, popular, salary or deadline", s))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterKind {
    Type,
    Category,
    Location,
    Industry,
}

impl FilterKind {
    pub fn options(&self) -> &'static [&'static str] {
        match self {
            FilterKind::Type => TYPES,
            FilterKind::Category => CATEGORIES,
            FilterKind::Location => LOCATIONS,
            FilterKind::Industry => INDUSTRIES,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            FilterKind::Type => "type",
            FilterKind::Category => "category",
            FilterKind::Location => "location",
            FilterKind::Industry => "industry",
        }
    }
}

/// The value after `current` in `options`, wrapping around. Unknown values
/// restart at the first option.
pub fn next_option(options: &'static [&'static str], current: &str) -> &'static str {
    match options.iter().position(|o| *o == current) {
        Some(i) => options[(i + 1) % options.len()],
        None => options.first().copied().unwrap_or(ALL),
    }
}

/// Feed search state. A filter equal to `"all"` is not sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedFilters {
    pub search: String,
    pub kind: String,
    pub category: String,
    pub location: String,
    pub industry: String,
    pub sort_by: SortBy,
}

impl Default for FeedFilters {
    fn default() -> Self {
        Self {
            search: String::new(),
            kind: ALL.to_string(),
            category: ALL.to_string(),
            location: ALL.to_string(),
            industry: ALL.to_string(),
            sort_by: SortBy::Recent,
        }
    }
}

impl FeedFilters {
    pub fn get(&self, filter: FilterKind) -> &str {
        match filter {
            FilterKind::Type => &self.kind,
            FilterKind::Category => &self.category,
            FilterKind::Location => &self.location,
            FilterKind::Industry => &self.industry,
        }
    }

    pub fn set(&mut self, filter: FilterKind, value: &str) {
        let slot = match filter {
            FilterKind::Type => &mut self.kind,
            FilterKind::Category => &mut self.category,
            FilterKind::Location => &mut self.location,
            FilterKind::Industry => &mut self.industry,
        };
        *slot = if value.is_empty() { ALL.to_string() } else { value.to_string() };
    }

    /// Steps a filter to its next known value, wrapping back to "all".
    pub fn cycle(&mut self, filter: FilterKind) {
        let next = next_option(filter.options(), self.get(filter));
        self.set(filter, next);
    }

    /// Resets search and filters. The sort order is kept.
    pub fn clear(&mut self) {
        let sort_by = self.sort_by;
        *self = Self {
            sort_by,
            ..Self::default()
        };
    }

    pub fn to_query(&self) -> Query {
        let mut query = Query::new();
        let search = self.search.trim();
        if !search.is_empty() {
            query.push(("search".to_string(), search.to_string()));
        }
        for (key, value) in [
            ("type", &self.kind),
            ("category", &self.category),
            ("location", &self.location),
            ("industry", &self.industry),
        ] {
            if !value.is_empty() && value != ALL {
                query.push((key.to_string(), value.clone()));
            }
        }
        query.push(("sortBy".to_string(), self.sort_by.as_str().to_string()));
        query
    }
}

/// Identifies one fetch. Only the newest ticket may land.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub query: Query,
}

#[derive(Debug, Default)]
pub struct FeedState {
    pub filters: FeedFilters,
    pub opportunities: Vec<Opportunity>,
    pub total: Option<u64>,
    pub loading: bool,
    pub error: Option<String>,
    generation: u64,
}

impl FeedState {
    pub fn new(filters: FeedFilters) -> Self {
        Self {
            filters,
            ..Self::default()
        }
    }

    pub fn begin_fetch(&mut self) -> FetchTicket {
        self.generation += 1;
        self.loading = true;
        FetchTicket {
            generation: self.generation,
            query: self.filters.to_query(),
        }
    }

    /// Applies a fetch result if it belongs to the latest ticket. Returns
    /// whether it was applied.
    pub fn commit(
        &mut self,
        generation: u64,
        result: Result<OpportunityList, ApiError>,
        notifier: &dyn Notifier,
    ) -> bool {
        if generation != self.generation {
            debug!(generation, latest = self.generation, "dropping stale feed response");
            return false;
        }
        self.loading = false;
        match result {
            Ok(list) => {
                info!(count = list.opportunities.len(), "feed loaded");
                self.total = list.pagination.map(|p| p.total);
                self.opportunities = list.opportunities;
                self.error = None;
            }
            Err(e) => {
                let message = match e.to_string() {
                    m if m.is_empty() => "Failed to fetch opportunities".to_string(),
                    m => m,
                };
                self.error = Some(message.clone());
                notifier.notify(Notification::error("Error", message));
            }
        }
        true
    }

    /// One synchronous round trip, for the line-oriented commands.
    pub fn fetch(&mut self, api: &ApiService, notifier: &dyn Notifier) -> bool {
        let ticket = self.begin_fetch();
        let result = api.opportunities(ticket.query);
        self.commit(ticket.generation, result, notifier)
    }

    pub fn latest_generation(&self) -> u64 {
        self.generation
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::testing::{stub_service, success};
    use crate::notify::testing::RecordingNotifier;
    use serde_json::json;

    fn list(titles: &[&str]) -> OpportunityList {
        serde_json::from_value(json!({
            "opportunities": titles.iter().map(|t| json!({ "_id": t, "title": t })).collect::<Vec<_>>()
        }))
        .unwrap()
    }

    #[test]
    fn test_default_query_only_sorts() {
        let query = FeedFilters::default().to_query();
        assert_eq!(query, vec![("sortBy".to_string(), "recent".to_string())]);
    }

    #[test]
    fn test_query_skips_all_sentinels_and_blank_search() {
        let mut filters = FeedFilters::default();
        filters.search = "  rust ".to_string();
        filters.set(FilterKind::Type, "internship");
        filters.set(FilterKind::Industry, "Finance");
        filters.sort_by = SortBy::Deadline;
        let keys: Vec<_> = filters
            .to_query()
            .into_iter()
            .map(|(k, v)| format!("{}={}", k, v))
            .collect();
        assert_eq!(
            keys,
            vec!["search=rust", "type=internship", "industry=Finance", "sortBy=deadline"]
        );
    }

    #[test]
    fn test_clear_keeps_sort() {
        let mut filters = FeedFilters::default();
        filters.search = "design".to_string();
        filters.set(FilterKind::Location, "remote");
        filters.sort_by = SortBy::Popular;
        filters.clear();
        assert_eq!(filters.search, "");
        assert_eq!(filters.location, ALL);
        assert_eq!(filters.sort_by, SortBy::Popular);
    }

    #[test]
    fn test_cycle_wraps_to_all() {
        let mut filters = FeedFilters::default();
        for _ in 0..LOCATIONS.len() {
            filters.cycle(FilterKind::Location);
        }
        assert_eq!(filters.location, ALL);
        filters.cycle(FilterKind::Location);
        assert_eq!(filters.location, "remote");
    }

    #[test]
    fn test_stale_response_is_dropped() {
        let notifier = RecordingNotifier::default();
        let mut state = FeedState::default();
        let first = state.begin_fetch();
        state.filters.set(FilterKind::Type, "contract");
        let second = state.begin_fetch();

        assert!(state.commit(second.generation, Ok(list(&["new"])), &notifier));
        assert!(!state.commit(first.generation, Ok(list(&["old"])), &notifier));
        assert_eq!(state.opportunities.len(), 1);
        assert_eq!(state.opportunities[0].title, "new");
        assert!(!state.loading);
    }

    #[test]
    fn test_failed_fetch_notifies_and_keeps_results() {
        let notifier = RecordingNotifier::default();
        let mut state = FeedState::default();
        let ticket = state.begin_fetch();
        state.commit(ticket.generation, Ok(list(&["a", "b"])), &notifier);

        let ticket = state.begin_fetch();
        state.commit(
            ticket.generation,
            Err(ApiError::Transport("connection refused".to_string())),
            &notifier,
        );
        assert_eq!(state.opportunities.len(), 2);
        assert!(state.error.is_some());
        assert_eq!(notifier.last().unwrap().title, "Error");
    }

    #[test]
    fn test_fetch_sends_filters() {
        let (api, transport, _) = stub_service();
        transport.push_json(
            200,
            success(json!({ "opportunities": [{ "_id": "o1", "title": "Rust Intern" }], "pagination": { "total": 1 } })),
        );
        let notifier = RecordingNotifier::default();
        let mut state = FeedState::default();
        state.filters.set(FilterKind::Category, "technology");

        assert!(state.fetch(&api, &notifier));
        assert_eq!(state.total, Some(1));
        let request = transport.last_request();
        assert_eq!(request.path, "/opportunities");
        assert!(request.query.contains(&("category".to_string(), "technology".to_string())));
        assert_eq!(notifier.count(), 0);
    }
}
