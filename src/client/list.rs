//! List controllers: paginated, sorted, filtered views over one entity type.
//!
//! The URL's query parameters are the single source of truth. External
//! navigation re-derives the whole view state through [`derive_state`];
//! user-initiated page/sort/filter changes emit a fresh parameter list for
//! the host to navigate with, which re-enters the same derivation path.

use crate::config::ITEMS_PER_PAGE;

use super::{ClientError, EntityPage, EntityService, ListQuery, RestEntity};

/// Query parameter carrying the 1-based page number.
pub const PAGE_PARAM: &str = "page";

/// Query parameter carrying `"<field>,<asc|desc>"`.
pub const SORT_PARAM: &str = "sort";

/// Sort predicate plus direction.
#[derive(Debug, Clone, PartialEq)]
pub struct SortState {
    pub predicate: String,
    pub ascending: bool,
}

impl SortState {
    pub fn new(predicate: &str, ascending: bool) -> Self {
        SortState {
            predicate: predicate.to_string(),
            ascending,
        }
    }

    /// Wire form of the sort: empty when the predicate is empty, otherwise
    /// exactly one `"<field>,ASC|DESC"` string.
    pub fn query_value(&self) -> Vec<String> {
        if self.predicate.is_empty() {
            return Vec::new();
        }
        vec![format!(
            "{},{}",
            self.predicate,
            if self.ascending { "ASC" } else { "DESC" }
        )]
    }

    /// Navigation form of the sort, as written to the URL.
    fn param_value(&self) -> String {
        format!(
            "{},{}",
            self.predicate,
            if self.ascending { "asc" } else { "desc" }
        )
    }

    fn parse(value: &str) -> Self {
        let (predicate, direction) = value.split_once(',').unwrap_or((value, "asc"));
        SortState {
            predicate: predicate.to_string(),
            ascending: !direction.eq_ignore_ascii_case("desc"),
        }
    }
}

/// One active filter: a `<field>.<op>` name plus its values.
#[derive(Debug, Clone, PartialEq)]
pub struct FilterOption {
    pub name: String,
    pub values: Vec<String>,
}

/// The active filter set of a list view.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterOptions(pub Vec<FilterOption>);

impl FilterOptions {
    /// Collect every non-reserved query parameter into filter options,
    /// grouping repeated keys.
    pub fn from_params(params: &[(String, String)]) -> Self {
        let mut options: Vec<FilterOption> = Vec::new();
        for (key, value) in params {
            if key == PAGE_PARAM || key == SORT_PARAM || key == "size" {
                continue;
            }
            match options.iter_mut().find(|o| o.name == *key) {
                Some(option) => option.values.push(value.clone()),
                None => options.push(FilterOption {
                    name: key.clone(),
                    values: vec![value.clone()],
                }),
            }
        }
        FilterOptions(options)
    }

    pub fn to_params(&self) -> Vec<(String, String)> {
        self.0
            .iter()
            .flat_map(|o| o.values.iter().map(|v| (o.name.clone(), v.clone())))
            .collect()
    }
}

/// View state of a list view, derived from navigation parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ListState {
    /// 1-based page number shown in the view.
    pub page: i64,
    pub sort: SortState,
    pub filters: FilterOptions,
}

/// Derive the full view state from navigation query parameters, falling back
/// to page 1 and the route-provided default sort.
pub fn derive_state(params: &[(String, String)], default_sort: &SortState) -> ListState {
    let page = params
        .iter()
        .find(|(k, _)| k == PAGE_PARAM)
        .and_then(|(_, v)| v.parse::<i64>().ok())
        .unwrap_or(1);

    let sort = params
        .iter()
        .find(|(k, _)| k == SORT_PARAM)
        .map(|(_, v)| SortState::parse(v))
        .unwrap_or_else(|| default_sort.clone());

    ListState {
        page,
        sort,
        filters: FilterOptions::from_params(params),
    }
}

/// Controller for one entity list view.
pub struct ListController<E: RestEntity> {
    service: EntityService<E>,
    default_sort: SortState,
    /// Extra scoping parameters merged into every query, e.g. a parent
    /// identifier equality filter.
    scope: Vec<(String, String)>,
    pub state: ListState,
    pub items: Vec<E>,
    pub total_items: i64,
    load_sequence: u64,
}

impl<E: RestEntity> ListController<E> {
    pub fn new(service: EntityService<E>, default_sort: SortState) -> Self {
        let state = ListState {
            page: 1,
            sort: default_sort.clone(),
            filters: FilterOptions::default(),
        };
        Self {
            service,
            default_sort,
            scope: Vec::new(),
            state,
            items: Vec::new(),
            total_items: 0,
            load_sequence: 0,
        }
    }

    /// Scope every query of this controller, e.g. `boardId.equals=<id>` for
    /// a board's card list.
    pub fn scoped(mut self, params: Vec<(String, String)>) -> Self {
        self.scope = params;
        self
    }

    /// Re-derive state from navigation parameters and re-query.
    pub async fn handle_navigation(
        &mut self,
        params: &[(String, String)],
    ) -> Result<(), ClientError> {
        self.state = derive_state(params, &self.default_sort);
        self.load().await
    }

    /// The wire query for the current state: 0-based page, fixed page size,
    /// sort and filters, plus the scope parameters.
    pub fn wire_query(&self) -> ListQuery {
        let mut filters = self.state.filters.to_params();
        filters.extend(self.scope.iter().cloned());
        ListQuery {
            page: Some(self.state.page - 1),
            size: Some(ITEMS_PER_PAGE),
            sort: self.state.sort.query_value(),
            filters,
        }
    }

    /// Issue the query for the current state and apply the response unless a
    /// newer load has started since.
    pub async fn load(&mut self) -> Result<(), ClientError> {
        let sequence = self.begin_load();
        let query = self.wire_query();
        let page = self.service.query(&query).await?;
        self.apply(sequence, page);
        Ok(())
    }

    /// Start a load and return its sequence number.
    pub fn begin_load(&mut self) -> u64 {
        self.load_sequence += 1;
        self.load_sequence
    }

    /// Apply a response for the given load. Responses from superseded loads
    /// are discarded so a stale response cannot overwrite newer state.
    pub fn apply(&mut self, sequence: u64, page: EntityPage<E>) -> bool {
        if sequence != self.load_sequence {
            return false;
        }
        self.total_items = page.total_count;
        self.items = page.items;
        true
    }

    /// Query parameters for navigating to another page.
    pub fn page_navigation(&self, page: i64) -> Vec<(String, String)> {
        self.navigation(page, &self.state.sort, &self.state.filters)
    }

    /// Query parameters for sorting by a predicate. Re-selecting the current
    /// predicate flips the direction.
    pub fn sort_navigation(&self, predicate: &str) -> Vec<(String, String)> {
        let sort = if predicate == self.state.sort.predicate {
            SortState::new(predicate, !self.state.sort.ascending)
        } else {
            SortState::new(predicate, true)
        };
        self.navigation(self.state.page, &sort, &self.state.filters)
    }

    /// Query parameters for a changed filter set; jumps back to page 1.
    pub fn filter_navigation(&self, filters: &FilterOptions) -> Vec<(String, String)> {
        self.navigation(1, &self.state.sort, filters)
    }

    fn navigation(
        &self,
        page: i64,
        sort: &SortState,
        filters: &FilterOptions,
    ) -> Vec<(String, String)> {
        let mut params = vec![(PAGE_PARAM.to_string(), page.to_string())];
        if !sort.predicate.is_empty() {
            params.push((SORT_PARAM.to_string(), sort.param_value()));
        }
        params.extend(filters.to_params());
        params
    }
}
