//! `/api/monsters` routes: the list view and every list-level action.
//!
//! Every list response is rendered the same way: open a `ListView` on the
//! store (subscribing to its change stream), run the action, pick up the
//! broadcast, then render. The view state travels with each request, in the
//! query for GETs and in the body for POSTs (`hx-include="#list-controls"`).
//!
//! Query/body parameters for the view: `search`, `role`, `favorites`,
//! `sort`, `page`. A control change also sends `changed={control}`, which
//! restarts the view on page 1.

use futures::executor::block_on;

use crate::monster::confirm::{Answered, ConfirmDialog, DELETE_PROMPT, REMOVE_ALL_PROMPT};
use crate::monster::model::Role;
use crate::monster::store::MonsterStore;
use crate::monster::view::{KeyTarget, ListView, Row, Shortcut, SortOption, ViewState};
use crate::routes::fragments::{confirm_dialog, error_span, sync_url, toast};
use crate::routes::session::require_login;
use crate::routes::util::{encode_query, escape_html, get_param, parse_form_body, parse_query};
use crate::state::with_app_mut;

/// Address-bar path the list lives at.
pub const LIST_PATH: &str = "/mine";

/// Run `action` against the store with a live view open, then render.
/// An `Err` message is shown above the list; the store is left as the
/// action left it.
pub(crate) fn render_with<F>(state: ViewState, action: F) -> String
where
    F: FnOnce(&mut MonsterStore, &mut ListView) -> Result<(), String>,
{
    with_app_mut(|app| {
        let mut view = ListView::open(&mut app.store, state, app.config.page_size);
        let result = action(&mut app.store, &mut view);
        view.refresh();
        let notice = app.store.take_notice();
        render_list(&view, notice, result.err())
    })
}

fn parse_index(id: &str) -> Result<usize, String> {
    id.parse::<usize>()
        .map_err(|_| format!("Invalid monster id: {}", id))
}

// ── GET /api/monsters ──────────────────────────────────────────────

/// Handle GET /api/monsters?search=&role=&favorites=&sort=&page=&changed=
pub fn handle_list_get(query: &str) -> String {
    if let Some(redirect) = require_login() {
        return redirect;
    }
    let params = parse_query(query);
    let state = ViewState::from_query(&params);
    let changed = get_param(&params, "changed").unwrap_or("").to_string();

    render_with(state.clone(), |_, view| {
        match changed.as_str() {
            "search" => view.set_search(&state.search),
            "role" => view.set_role(state.role.as_deref().unwrap_or("all")),
            "favorites" => view.set_favorites_only(state.favorites_only),
            "sort" => view.set_sort(state.sort),
            _ => {}
        }
        Ok(())
    })
}

// ── POST /api/monsters/{id}/favorite ───────────────────────────────

pub fn handle_favorite_post(id: &str, body: &str) -> String {
    if let Some(redirect) = require_login() {
        return redirect;
    }
    let state = ViewState::from_query(&parse_form_body(body));
    render_with(state, |store, _| {
        let index = parse_index(id)?;
        store.toggle_favorite(index).map(|_| ()).map_err(|e| e.to_string())
    })
}

// ── POST /api/monsters/{id}/delete ─────────────────────────────────

/// Handle POST /api/monsters/{id}/delete
/// Without `confirm` the confirmation dialog is returned; `confirm=yes`
/// deletes, anything else cancels.
pub fn handle_delete_post(id: &str, body: &str) -> String {
    if let Some(redirect) = require_login() {
        return redirect;
    }
    let params = parse_form_body(body);
    let state = ViewState::from_query(&params);
    let Some(answer) = Answered::from_param(get_param(&params, "confirm")) else {
        return confirm_dialog(
            DELETE_PROMPT,
            &format!("/api/monsters/{}/delete", id),
            &state.to_query(),
        );
    };
    render_with(state, |store, _| {
        let index = parse_index(id)?;
        block_on(store.remove(index, &answer))
            .map(|_| ())
            .map_err(|e| e.to_string())
    })
}

// ── POST /api/monsters/random ──────────────────────────────────────

pub fn handle_random_post(body: &str) -> String {
    if let Some(redirect) = require_login() {
        return redirect;
    }
    let state = ViewState::from_query(&parse_form_body(body));
    render_with(state, |store, _| {
        store.add_random(&mut rand::thread_rng());
        Ok(())
    })
}

// ── POST /api/monsters/team ────────────────────────────────────────

pub fn handle_team_post(body: &str) -> String {
    if let Some(redirect) = require_login() {
        return redirect;
    }
    let state = ViewState::from_query(&parse_form_body(body));
    render_with(state, |store, _| {
        store
            .create_random_team(&mut rand::thread_rng())
            .map_err(|e| e.to_string())
    })
}

// ── POST /api/monsters/unfavorite ──────────────────────────────────

pub fn handle_unfavorite_post(body: &str) -> String {
    if let Some(redirect) = require_login() {
        return redirect;
    }
    let state = ViewState::from_query(&parse_form_body(body));
    render_with(state, |store, _| {
        store.unfavorite_all();
        Ok(())
    })
}

// ── POST /api/monsters/clear ───────────────────────────────────────

/// Handle POST /api/monsters/clear: confirm-gated remove-all.
pub fn handle_clear_post(body: &str) -> String {
    if let Some(redirect) = require_login() {
        return redirect;
    }
    let params = parse_form_body(body);
    let state = ViewState::from_query(&params);
    let Some(answer) = Answered::from_param(get_param(&params, "confirm")) else {
        return confirm_dialog(REMOVE_ALL_PROMPT, "/api/monsters/clear", &state.to_query());
    };
    render_with(state, |store, _| {
        if block_on(answer.confirm(REMOVE_ALL_PROMPT)) {
            store.remove_all();
        }
        Ok(())
    })
}

// ── POST /api/monsters/keys ────────────────────────────────────────

/// Handle POST /api/monsters/keys
/// Body: key={event.key}&target={tagName}&editable={true|false} plus the
/// view state.
pub fn handle_keys_post(body: &str) -> String {
    if let Some(redirect) = require_login() {
        return redirect;
    }
    let params = parse_form_body(body);
    let state = ViewState::from_query(&params);
    let target = KeyTarget {
        tag: get_param(&params, "target").unwrap_or("").to_string(),
        content_editable: get_param(&params, "editable") == Some("true"),
    };
    let shortcut = Shortcut::from_key(get_param(&params, "key").unwrap_or(""), &target);
    log::debug!("shortcut {:?}", shortcut);

    match shortcut {
        Some(Shortcut::NewMonster) => {
            crate::routes::form::render_new(&encode_query(&state.to_query()))
        }
        Some(Shortcut::RandomMonster) => render_with(state, |store, _| {
            store.add_random(&mut rand::thread_rng());
            Ok(())
        }),
        Some(Shortcut::RandomTeam) => render_with(state, |store, _| {
            store
                .create_random_team(&mut rand::thread_rng())
                .map_err(|e| e.to_string())
        }),
        Some(Shortcut::CycleSort) => render_with(state, |_, view| {
            view.cycle_sort();
            Ok(())
        }),
        Some(Shortcut::ToggleFavorites) => render_with(state, |_, view| {
            view.toggle_favorites();
            Ok(())
        }),
        None => render_with(state, |_, _| Ok(())),
    }
}

// ── Rendering ──────────────────────────────────────────────────────

fn render_list(view: &ListView, notice: Option<&str>, error: Option<String>) -> String {
    let state = view.state();
    let page = view.page();
    let query = encode_query(&state.to_query());
    let mut html = String::with_capacity(8192);

    html.push_str(r#"<section id="monster-list" class="max-w-3xl mx-auto p-4">"#);
    html.push_str(&format!(
        r#"<h2 id="list-header" tabindex="-1" class="text-xl font-bold mb-2">My Monsters <span class="text-slate-500 text-sm">({} shown of {})</span></h2>"#,
        page.total_rows,
        view.monsters().len()
    ));

    render_role_counts(&mut html, view);
    render_controls(&mut html, state);
    render_toolbar(&mut html, &query);

    if let Some(message) = error {
        html.push_str(&format!(r#"<div class="my-2">{}</div>"#, error_span(&message)));
    }

    if page.rows.is_empty() {
        html.push_str(r#"<p class="text-slate-500 text-center my-8">No monsters match.</p>"#);
    } else {
        html.push_str(r#"<ul class="grid gap-2">"#);
        for row in &page.rows {
            render_row(&mut html, row, &query);
        }
        html.push_str("</ul>");
    }

    render_pagination(&mut html, state, page.number, page.total_pages);

    // Keyboard shortcuts, filtered client-side as well so typing never posts.
    html.push_str(
        r##"<div hx-post="/api/monsters/keys" hx-trigger="keydown[!event.target.closest('input,textarea,select,[contenteditable]')] from:body" hx-target="#monster-app" hx-swap="innerHTML" hx-include="#list-controls" hx-vals='js:{key: event.key, target: event.target.tagName, editable: event.target.isContentEditable}'></div>"##,
    );
    html.push_str("</section>");

    if let Some(message) = notice {
        html.push_str(&toast(message));
    }
    html.push_str(&sync_url(LIST_PATH, &query));
    html
}

fn render_role_counts(html: &mut String, view: &ListView) {
    let counts = view.counts();
    html.push_str(r#"<div class="flex flex-wrap gap-2 mb-3 text-xs">"#);
    for role in Role::ALL {
        html.push_str(&format!(
            r#"<span class="rounded-full bg-slate-100 px-2 py-1" data-role="{}">{}: <strong>{}</strong></span>"#,
            role.as_str(),
            role.label(),
            counts.get(role)
        ));
    }
    html.push_str("</div>");
}

fn render_controls(html: &mut String, state: &ViewState) {
    html.push_str(
        r##"<form id="list-controls" class="flex flex-wrap gap-2 items-center mb-3" hx-target="#monster-app" hx-swap="innerHTML" onsubmit="return false">"##,
    );
    html.push_str(&format!(
        r##"<input type="search" name="search" value="{}" placeholder="Search by name" class="border rounded px-2 py-1 text-sm" hx-get="/api/monsters" hx-trigger="keyup changed delay:300ms" hx-include="#list-controls" hx-vals='{{"changed":"search"}}'>"##,
        escape_html(&state.search)
    ));

    html.push_str(
        r##"<select name="role" class="border rounded px-2 py-1 text-sm" hx-get="/api/monsters" hx-trigger="change" hx-include="#list-controls" hx-vals='{"changed":"role"}'>"##,
    );
    let selected_role = state.role.as_deref();
    html.push_str(&format!(
        r#"<option value="all"{}>All roles</option>"#,
        if selected_role.is_none() { " selected" } else { "" }
    ));
    for role in Role::ALL {
        html.push_str(&format!(
            r#"<option value="{}"{}>{}</option>"#,
            role.as_str(),
            if selected_role == Some(role.as_str()) { " selected" } else { "" },
            role.label()
        ));
    }
    html.push_str("</select>");

    html.push_str(&format!(
        r##"<label class="text-sm flex items-center gap-1"><input type="checkbox" name="favorites" value="true"{} hx-get="/api/monsters" hx-trigger="change" hx-include="#list-controls" hx-vals='{{"changed":"favorites"}}'> Favorites only</label>"##,
        if state.favorites_only { " checked" } else { "" }
    ));

    html.push_str(
        r##"<select name="sort" class="border rounded px-2 py-1 text-sm" hx-get="/api/monsters" hx-trigger="change" hx-include="#list-controls" hx-vals='{"changed":"sort"}'>"##,
    );
    let mut options: Vec<SortOption> = SortOption::CYCLE.to_vec();
    if !options.contains(&state.sort) {
        options.push(state.sort);
    }
    for option in options {
        html.push_str(&format!(
            r#"<option value="{}"{}>{}</option>"#,
            option.as_str(),
            if option == state.sort { " selected" } else { "" },
            sort_label(option)
        ));
    }
    html.push_str("</select>");

    html.push_str(&format!(
        r#"<input type="hidden" name="page" value="{}">"#,
        state.page
    ));
    html.push_str("</form>");
}

fn sort_label(option: SortOption) -> &'static str {
    match option.as_str() {
        "name-asc" => "Name A–Z",
        "name-desc" => "Name Z–A",
        "role-asc" => "Role A–Z",
        _ => "Role Z–A",
    }
}

fn render_toolbar(html: &mut String, query: &str) {
    let suffix = if query.is_empty() {
        String::new()
    } else {
        format!("?{}", query)
    };
    html.push_str(r#"<div class="flex flex-wrap gap-2 mb-3 text-sm">"#);
    html.push_str(&format!(
        r##"<button class="rounded bg-emerald-600 text-white px-3 py-1" hx-get="/api/monsters/new{}" hx-target="#monster-app" title="n">New</button>"##,
        escape_html(&suffix)
    ));
    for (path, label, key) in [
        ("/api/monsters/random", "Random", "r"),
        ("/api/monsters/team", "Random team", "t"),
        ("/api/monsters/unfavorite", "Unfavorite all", ""),
        ("/api/monsters/clear", "Remove all", ""),
    ] {
        html.push_str(&format!(
            r##"<button class="rounded border border-slate-300 px-3 py-1" hx-post="{}" hx-include="#list-controls" hx-target="#monster-app" title="{}">{}</button>"##,
            path, key, label
        ));
    }
    html.push_str(
        r##"<button class="rounded border border-slate-300 px-3 py-1" hx-get="/api/monsters/export" hx-target="#download-sink" hx-swap="innerHTML">Export</button>"##,
    );
    html.push_str(
        r#"<label class="rounded border border-slate-300 px-3 py-1 cursor-pointer">Import<input type="file" accept="application/json,.json" class="hidden" onchange="monsterBridge.importFile(this, '#list-controls')"></label>"#,
    );
    html.push_str(r#"<div id="download-sink" class="hidden"></div>"#);
    html.push_str("</div>");
}

fn render_row(html: &mut String, row: &Row, query: &str) {
    let m = &row.monster;
    let i = row.index;
    let edit_query = if query.is_empty() {
        String::new()
    } else {
        format!("?{}", query)
    };
    let dup_query = if query.is_empty() {
        "?duplicate=true".to_string()
    } else {
        format!("?{}&duplicate=true", query)
    };

    html.push_str(&format!(
        r#"<li class="border rounded p-3 flex items-start gap-3" data-index="{}">"#,
        i
    ));
    html.push_str(&format!(
        r##"<button class="text-xl leading-none" aria-label="Toggle favorite" hx-post="/api/monsters/{}/favorite" hx-include="#list-controls" hx-target="#monster-app">{}</button>"##,
        i,
        if m.favorite { "★" } else { "☆" }
    ));
    html.push_str(r#"<div class="flex-1">"#);
    html.push_str(&format!(
        r#"<p class="font-semibold">{}</p><p class="text-sm text-slate-600">{}</p>"#,
        escape_html(&m.name),
        escape_html(&m.description)
    ));
    if !m.role.is_empty() {
        html.push_str(&format!(
            r#"<span class="text-xs uppercase tracking-wide text-slate-500">{}</span>"#,
            escape_html(&m.role)
        ));
    }
    html.push_str("</div>");
    html.push_str(r#"<div class="flex gap-2 text-sm">"#);
    html.push_str(&format!(
        r##"<button class="underline" hx-get="/api/monsters/{}/edit{}" hx-target="#monster-app">Edit</button>"##,
        i,
        escape_html(&edit_query)
    ));
    html.push_str(&format!(
        r##"<button class="underline" hx-get="/api/monsters/{}/edit{}" hx-target="#monster-app">Duplicate</button>"##,
        i,
        escape_html(&dup_query)
    ));
    html.push_str(&format!(
        r##"<button class="underline text-red-700" hx-post="/api/monsters/{}/delete" hx-include="#list-controls" hx-target="#monster-app">Delete</button>"##,
        i
    ));
    html.push_str("</div></li>");
}

fn render_pagination(html: &mut String, state: &ViewState, current: usize, total: usize) {
    if total <= 1 {
        return;
    }
    html.push_str(r#"<nav class="flex justify-center gap-1 mt-4" aria-label="Pages">"#);
    for n in 1..=total {
        let page_state = ViewState {
            page: n,
            ..state.clone()
        };
        let q = encode_query(&page_state.to_query());
        let href = if q.is_empty() {
            "/api/monsters".to_string()
        } else {
            format!("/api/monsters?{}", q)
        };
        let class = if n == current {
            "bg-slate-800 text-white"
        } else {
            "border border-slate-300"
        };
        html.push_str(&format!(
            r##"<button class="rounded px-2 py-1 text-sm {}" hx-get="{}" hx-target="#monster-app"{}>{}</button>"##,
            class,
            escape_html(&href),
            if n == current { r#" aria-current="page""# } else { "" },
            n
        ));
    }
    html.push_str("</nav>");
}
