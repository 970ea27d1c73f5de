//! List view controller: derives the filtered, sorted, paginated view of
//! the store and keeps its controls mirrored in the URL query.
//!
//! The derived view is recomputed from scratch whenever the list or a control
//! changes:
//!
//! ```text
//! store snapshot → search → role → favorites → sort → page
//! ```
//!
//! Rows keep the record's store index so row actions address the right
//! record even when the view is filtered or reordered.

use std::cmp::Ordering;

use crate::monster::model::{Monster, Role};
use crate::monster::store::{MonsterStore, Subscription};

pub const DEFAULT_PAGE_SIZE: usize = 10;

// ── Sort option ────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    Name,
    Role,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// A `key-direction` pair such as `name-asc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortOption {
    pub key: SortKey,
    pub direction: SortDirection,
}

impl SortOption {
    pub const NAME_ASC: SortOption = SortOption { key: SortKey::Name, direction: SortDirection::Asc };
    pub const NAME_DESC: SortOption = SortOption { key: SortKey::Name, direction: SortDirection::Desc };
    pub const ROLE_ASC: SortOption = SortOption { key: SortKey::Role, direction: SortDirection::Asc };

    /// Order the `s` shortcut steps through.
    pub const CYCLE: [SortOption; 3] = [Self::NAME_ASC, Self::NAME_DESC, Self::ROLE_ASC];

    pub fn parse(s: &str) -> Option<SortOption> {
        let (key, direction) = s.split_once('-')?;
        let key = match key {
            "name" => SortKey::Name,
            "role" => SortKey::Role,
            _ => return None,
        };
        let direction = match direction {
            "asc" => SortDirection::Asc,
            "desc" => SortDirection::Desc,
            _ => return None,
        };
        Some(SortOption { key, direction })
    }

    pub fn as_str(&self) -> &'static str {
        match (self.key, self.direction) {
            (SortKey::Name, SortDirection::Asc) => "name-asc",
            (SortKey::Name, SortDirection::Desc) => "name-desc",
            (SortKey::Role, SortDirection::Asc) => "role-asc",
            (SortKey::Role, SortDirection::Desc) => "role-desc",
        }
    }

    /// Next option in the shortcut cycle. Options outside the cycle restart it.
    pub fn next(&self) -> SortOption {
        match Self::CYCLE.iter().position(|o| o == self) {
            Some(i) => Self::CYCLE[(i + 1) % Self::CYCLE.len()],
            None => Self::CYCLE[0],
        }
    }
}

impl Default for SortOption {
    fn default() -> Self {
        Self::NAME_ASC
    }
}

// ── View state ─────────────────────────────────────────────────────

/// User-controlled view inputs, restorable from the URL query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewState {
    pub search: String,
    /// `None` is the "all" sentinel.
    pub role: Option<String>,
    pub favorites_only: bool,
    pub sort: SortOption,
    /// 1-based.
    pub page: usize,
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            search: String::new(),
            role: None,
            favorites_only: false,
            sort: SortOption::default(),
            page: 1,
        }
    }
}

impl ViewState {
    /// Build from decoded query pairs. Missing or invalid values use defaults.
    pub fn from_query(params: &[(String, String)]) -> Self {
        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| k == key)
                .map(|(_, v)| v.as_str())
        };
        Self {
            search: get("search").unwrap_or("").to_string(),
            role: get("role")
                .filter(|r| !r.is_empty() && *r != "all")
                .map(str::to_string),
            favorites_only: get("favorites") == Some("true"),
            sort: get("sort").and_then(SortOption::parse).unwrap_or_default(),
            page: get("page")
                .and_then(|p| p.parse::<usize>().ok())
                .filter(|p| *p >= 1)
                .unwrap_or(1),
        }
    }

    /// Query pairs for the current state. Defaults are omitted.
    pub fn to_query(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if !self.search.is_empty() {
            pairs.push(("search", self.search.clone()));
        }
        if let Some(role) = &self.role {
            pairs.push(("role", role.clone()));
        }
        if self.favorites_only {
            pairs.push(("favorites", "true".to_string()));
        }
        if self.sort != SortOption::default() {
            pairs.push(("sort", self.sort.as_str().to_string()));
        }
        if self.page > 1 {
            pairs.push(("page", self.page.to_string()));
        }
        pairs
    }
}

// ── Derivation pipeline ────────────────────────────────────────────

/// A record as shown in the view, tagged with its store position.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub index: usize,
    pub monster: Monster,
}

pub fn rows(monsters: &[Monster]) -> Vec<Row> {
    monsters
        .iter()
        .cloned()
        .enumerate()
        .map(|(index, monster)| Row { index, monster })
        .collect()
}

/// Case-insensitive substring match on name. Blank terms match everything.
pub fn filter_by_search(rows: Vec<Row>, term: &str) -> Vec<Row> {
    let term = term.trim().to_lowercase();
    if term.is_empty() {
        return rows;
    }
    rows.into_iter()
        .filter(|r| r.monster.name.to_lowercase().contains(&term))
        .collect()
}

/// Exact role match. `None` is "all".
pub fn filter_by_role(rows: Vec<Row>, role: Option<&str>) -> Vec<Row> {
    match role {
        None => rows,
        Some(role) => rows.into_iter().filter(|r| r.monster.role == role).collect(),
    }
}

pub fn filter_favorites(rows: Vec<Row>, favorites_only: bool) -> Vec<Row> {
    if !favorites_only {
        return rows;
    }
    rows.into_iter().filter(|r| r.monster.favorite).collect()
}

/// Stable sort on the lowercased field.
pub fn sort_rows(mut rows: Vec<Row>, sort: SortOption) -> Vec<Row> {
    let field = |r: &Row| -> String {
        match sort.key {
            SortKey::Name => r.monster.name.to_lowercase(),
            SortKey::Role => r.monster.role.to_lowercase(),
        }
    };
    rows.sort_by(|a, b| {
        let ord: Ordering = field(a).cmp(&field(b));
        match sort.direction {
            SortDirection::Asc => ord,
            SortDirection::Desc => ord.reverse(),
        }
    });
    rows
}

/// One page of the sorted rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page {
    pub rows: Vec<Row>,
    /// Clamped to `[1, total_pages]`, or 1 when nothing matched.
    pub number: usize,
    pub total_pages: usize,
    pub total_rows: usize,
}

pub fn paginate(rows: Vec<Row>, requested: usize, page_size: usize) -> Page {
    let page_size = page_size.max(1);
    let total_rows = rows.len();
    let total_pages = total_rows.div_ceil(page_size);
    let number = requested.clamp(1, total_pages.max(1));
    let rows = rows
        .into_iter()
        .skip((number - 1) * page_size)
        .take(page_size)
        .collect();
    Page {
        rows,
        number,
        total_pages,
        total_rows,
    }
}

/// Run the full pipeline.
pub fn derive(monsters: &[Monster], state: &ViewState, page_size: usize) -> Page {
    let filtered = filter_by_search(rows(monsters), &state.search);
    let filtered = filter_by_role(filtered, state.role.as_deref());
    let filtered = filter_favorites(filtered, state.favorites_only);
    paginate(sort_rows(filtered, state.sort), state.page, page_size)
}

// ── Role counts ────────────────────────────────────────────────────

/// Per-role totals over the unfiltered list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RoleCounts([usize; 5]);

impl RoleCounts {
    pub fn tally(monsters: &[Monster]) -> Self {
        let mut counts = [0; 5];
        for kind in monsters.iter().filter_map(Monster::role_kind) {
            counts[kind as usize] += 1;
        }
        RoleCounts(counts)
    }

    pub fn get(&self, role: Role) -> usize {
        self.0[role as usize]
    }
}

// ── Keyboard shortcuts ─────────────────────────────────────────────

/// What had keyboard focus when the key was pressed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyTarget {
    /// Upper-case tag name, e.g. `INPUT`.
    pub tag: String,
    pub content_editable: bool,
}

impl KeyTarget {
    /// Keys typed into form fields or editable content never trigger shortcuts.
    pub fn is_editable(&self) -> bool {
        self.content_editable
            || matches!(self.tag.to_ascii_uppercase().as_str(), "INPUT" | "TEXTAREA" | "SELECT")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shortcut {
    NewMonster,
    RandomMonster,
    RandomTeam,
    CycleSort,
    ToggleFavorites,
}

impl Shortcut {
    pub fn from_key(key: &str, target: &KeyTarget) -> Option<Shortcut> {
        if target.is_editable() {
            return None;
        }
        match key.to_lowercase().as_str() {
            "n" => Some(Shortcut::NewMonster),
            "r" => Some(Shortcut::RandomMonster),
            "t" => Some(Shortcut::RandomTeam),
            "s" => Some(Shortcut::CycleSort),
            "f" => Some(Shortcut::ToggleFavorites),
            _ => None,
        }
    }
}

// ── Controller ─────────────────────────────────────────────────────

/// A live list view over the store.
pub struct ListView {
    state: ViewState,
    monsters: Vec<Monster>,
    subscription: Subscription,
    page_size: usize,
    page: Page,
    counts: RoleCounts,
}

impl ListView {
    /// Subscribe to the store and pull its current list.
    pub fn open(store: &mut MonsterStore, state: ViewState, page_size: usize) -> Self {
        let subscription = store.subscribe();
        let monsters = store.list();
        let mut view = Self {
            state,
            counts: RoleCounts::tally(&monsters),
            monsters,
            subscription,
            page_size,
            page: Page {
                rows: Vec::new(),
                number: 1,
                total_pages: 0,
                total_rows: 0,
            },
        };
        view.recompute();
        view
    }

    /// Pick up the latest broadcast list, if the store changed.
    pub fn refresh(&mut self) -> bool {
        match self.subscription.latest() {
            Some(monsters) => {
                self.counts = RoleCounts::tally(&monsters);
                self.monsters = monsters;
                self.recompute();
                true
            }
            None => false,
        }
    }

    pub fn set_search(&mut self, term: &str) {
        self.state.search = term.to_string();
        self.control_changed();
    }

    /// `"all"` or an empty value clears the filter.
    pub fn set_role(&mut self, role: &str) {
        self.state.role = (!role.is_empty() && role != "all").then(|| role.to_string());
        self.control_changed();
    }

    pub fn set_favorites_only(&mut self, favorites_only: bool) {
        self.state.favorites_only = favorites_only;
        self.control_changed();
    }

    pub fn toggle_favorites(&mut self) {
        self.set_favorites_only(!self.state.favorites_only);
    }

    pub fn set_sort(&mut self, sort: SortOption) {
        self.state.sort = sort;
        self.control_changed();
    }

    pub fn cycle_sort(&mut self) {
        self.set_sort(self.state.sort.next());
    }

    pub fn go_to_page(&mut self, page: usize) {
        self.state.page = page.max(1);
        self.recompute();
    }

    pub fn state(&self) -> &ViewState {
        &self.state
    }

    pub fn page(&self) -> &Page {
        &self.page
    }

    pub fn counts(&self) -> RoleCounts {
        self.counts
    }

    /// Full unfiltered list, as export sees it.
    pub fn monsters(&self) -> &[Monster] {
        &self.monsters
    }

    /// Filters and sort changes restart from the first page.
    fn control_changed(&mut self) {
        self.state.page = 1;
        self.recompute();
    }

    fn recompute(&mut self) {
        self.page = derive(&self.monsters, &self.state, self.page_size);
        self.state.page = self.page.number;
    }
}
