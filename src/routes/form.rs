//! Monster form routes: create, edit and duplicate.
//!
//! - `GET  /api/monsters/new`              → empty create form
//! - `GET  /api/monsters/{id}/edit`        → edit form, or duplicate form with `duplicate=true`
//! - `POST /api/monsters`                  → save a create/duplicate form
//! - `POST /api/monsters/{id}`             → save an edit form
//!
//! Forms carry the list's query in a hidden `return` field so saving or
//! cancelling lands back on the same filtered page.

use crate::error::ValidationError;
use crate::monster::form::{FormMode, FormValues, MonsterForm, SubmitError};
use crate::monster::model::Role;
use crate::monster::view::ViewState;
use crate::routes::fragments::{error_span, sync_url};
use crate::routes::monsters::{LIST_PATH, render_with};
use crate::routes::session::require_login;
use crate::routes::util::{encode_query, escape_html, get_param, parse_form_body, parse_query};
use crate::state::{with_app, with_app_mut};

/// The list query to return to, without form-only parameters.
fn return_query(params: &[(String, String)]) -> String {
    encode_query(&ViewState::from_query(params).to_query())
}

// ── GET /api/monsters/new ──────────────────────────────────────────

pub fn handle_new_get(query: &str) -> String {
    if let Some(redirect) = require_login() {
        return redirect;
    }
    render_new(&return_query(&parse_query(query)))
}

/// Empty create form returning to `return_to`.
pub fn render_new(return_to: &str) -> String {
    let form = MonsterForm {
        mode: FormMode::Create,
        values: FormValues::default(),
    };
    render_form(&form, &[], return_to)
}

// ── GET /api/monsters/{id}/edit ────────────────────────────────────

/// Handle GET /api/monsters/{id}/edit?duplicate=true
pub fn handle_edit_get(id: &str, query: &str) -> String {
    if let Some(redirect) = require_login() {
        return redirect;
    }
    let params = parse_query(query);
    let Ok(index) = id.parse::<usize>() else {
        return error_span(&format!("Invalid monster id: {}", id));
    };
    let duplicate = get_param(&params, "duplicate") == Some("true");
    let mode = FormMode::from_params(Some(index), duplicate);

    match with_app(|app| MonsterForm::open(mode, &app.store)) {
        Ok(form) => render_form(&form, &[], &return_query(&params)),
        Err(e) => error_span(&e.to_string()),
    }
}

// ── POST /api/monsters ─────────────────────────────────────────────

/// Handle POST /api/monsters
/// Body: name, description, favorite, role, return, and for duplicates
/// `mode=duplicate&source={index}`.
pub fn handle_create_post(body: &str) -> String {
    if let Some(redirect) = require_login() {
        return redirect;
    }
    let params = parse_form_body(body);
    let mode = match (get_param(&params, "mode"), get_param(&params, "source")) {
        (Some("duplicate"), Some(source)) => match source.parse() {
            Ok(i) => FormMode::Duplicate(i),
            Err(_) => FormMode::Create,
        },
        _ => FormMode::Create,
    };
    submit(mode, &params)
}

// ── POST /api/monsters/{id} ────────────────────────────────────────

pub fn handle_update_post(id: &str, body: &str) -> String {
    if let Some(redirect) = require_login() {
        return redirect;
    }
    let Ok(index) = id.parse::<usize>() else {
        return error_span(&format!("Invalid monster id: {}", id));
    };
    submit(FormMode::Edit(index), &parse_form_body(body))
}

fn values_from(params: &[(String, String)]) -> FormValues {
    FormValues {
        name: get_param(params, "name").unwrap_or("").to_string(),
        description: get_param(params, "description").unwrap_or("").to_string(),
        favorite: matches!(get_param(params, "favorite"), Some("true") | Some("on")),
        role: get_param(params, "role").unwrap_or("").to_string(),
    }
}

fn submit(mode: FormMode, params: &[(String, String)]) -> String {
    let form = MonsterForm {
        mode,
        values: values_from(params),
    };
    let return_to = get_param(params, "return").unwrap_or("").to_string();

    match with_app_mut(|app| form.clone().submit(&mut app.store)) {
        Ok(()) => render_with(ViewState::from_query(&parse_query(&return_to)), |_, _| Ok(())),
        Err(SubmitError::Invalid(errors)) => render_form(&form, &errors, &return_to),
        Err(SubmitError::Store(e)) => {
            log::warn!("form save failed: {}", e);
            let mut html = error_span(&e.to_string());
            html.push_str(&render_with(ViewState::from_query(&parse_query(&return_to)), |_, _| Ok(())));
            html
        }
    }
}

// ── Rendering ──────────────────────────────────────────────────────

fn field_errors(errors: &[ValidationError], field: &str) -> String {
    errors
        .iter()
        .filter(|e| e.field() == field)
        .map(|e| format!(r#"<p class="text-xs text-red-700">{}</p>"#, e))
        .collect()
}

fn render_form(form: &MonsterForm, errors: &[ValidationError], return_to: &str) -> String {
    let (title, action, address) = match form.mode {
        FormMode::Create => ("New Monster".to_string(), "/api/monsters".to_string(), format!("{}/new", LIST_PATH)),
        FormMode::Edit(i) => (
            "Edit Monster".to_string(),
            format!("/api/monsters/{}", i),
            format!("{}/{}/edit", LIST_PATH, i),
        ),
        FormMode::Duplicate(i) => (
            "Duplicate Monster".to_string(),
            "/api/monsters".to_string(),
            format!("{}/{}/edit", LIST_PATH, i),
        ),
    };
    let values = &form.values;
    let mut html = String::with_capacity(4096);

    html.push_str(&format!(
        r##"<form class="max-w-lg mx-auto p-4 grid gap-3" hx-post="{}" hx-target="#monster-app" hx-swap="innerHTML">"##,
        action
    ));
    html.push_str(&format!(r#"<h2 class="text-xl font-bold">{}</h2>"#, title));

    html.push_str(&format!(
        r#"<label class="grid gap-1 text-sm">Name<input type="text" name="name" value="{}" required autofocus class="border rounded px-2 py-1"></label>{}"#,
        escape_html(&values.name),
        field_errors(errors, "name")
    ));
    html.push_str(&format!(
        r#"<label class="grid gap-1 text-sm">Description<textarea name="description" rows="3" required class="border rounded px-2 py-1">{}</textarea></label>{}"#,
        escape_html(&values.description),
        field_errors(errors, "description")
    ));
    html.push_str(&format!(
        r#"<label class="flex items-center gap-2 text-sm"><input type="checkbox" name="favorite" value="true"{}> Favorite</label>"#,
        if values.favorite { " checked" } else { "" }
    ));

    html.push_str(r#"<label class="grid gap-1 text-sm">Role<select name="role" class="border rounded px-2 py-1">"#);
    html.push_str(&format!(
        r#"<option value=""{}>None</option>"#,
        if values.role.is_empty() { " selected" } else { "" }
    ));
    for role in Role::ALL {
        html.push_str(&format!(
            r#"<option value="{}"{}>{}</option>"#,
            role.as_str(),
            if values.role == role.as_str() { " selected" } else { "" },
            role.label()
        ));
    }
    if !values.role.is_empty() && Role::parse(&values.role).is_none() {
        html.push_str(&format!(
            r#"<option value="{0}" selected>{0}</option>"#,
            escape_html(&values.role)
        ));
    }
    html.push_str("</select></label>");

    if let FormMode::Duplicate(i) = form.mode {
        html.push_str(&format!(
            r#"<input type="hidden" name="mode" value="duplicate"><input type="hidden" name="source" value="{}">"#,
            i
        ));
    }
    html.push_str(&format!(
        r#"<input type="hidden" name="return" value="{}">"#,
        escape_html(return_to)
    ));

    let cancel = if return_to.is_empty() {
        "/api/monsters".to_string()
    } else {
        format!("/api/monsters?{}", return_to)
    };
    html.push_str(r#"<div class="flex gap-2 justify-end">"#);
    html.push_str(&format!(
        r##"<button type="button" class="px-4 py-2 rounded border border-slate-300" hx-get="{}" hx-target="#monster-app">Cancel</button>"##,
        escape_html(&cancel)
    ));
    html.push_str(
        r#"<button type="submit" class="px-4 py-2 rounded bg-emerald-600 text-white">Save</button>"#,
    );
    html.push_str("</div></form>");
    html.push_str(&sync_url(&address, return_to));
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::state::reset_app;

    fn logged_in() {
        reset_app(Config::default());
        with_app_mut(|app| app.session.login("bob@bob.com", "Test123").unwrap());
    }

    fn names() -> Vec<String> {
        with_app(|app| app.store.list().into_iter().map(|m| m.name).collect())
    }

    #[test]
    fn new_form_requires_login() {
        reset_app(Config::default());
        assert!(handle_new_get("").contains(r#"hx-get="/api/session""#));
    }

    #[test]
    fn new_form_keeps_list_query() {
        logged_in();
        let html = handle_new_get("?search=bat&page=2");
        assert!(html.contains("New Monster"));
        assert!(html.contains(r#"name="return" value="search=bat&amp;page=2""#));
    }

    #[test]
    fn edit_form_prefills() {
        logged_in();
        let html = handle_edit_get("1", "");
        assert!(html.contains("Edit Monster"));
        assert!(html.contains(r#"value="Swamp Creature""#));
        assert!(html.contains(r#"hx-post="/api/monsters/1""#));
        assert!(html.contains(r#"<option value="medic" selected>"#));
    }

    #[test]
    fn duplicate_form_posts_as_new() {
        logged_in();
        let html = handle_edit_get("0", "?duplicate=true&role=soldier");
        assert!(html.contains("Duplicate Monster"));
        assert!(html.contains(r#"hx-post="/api/monsters""#));
        assert!(html.contains(r#"name="source" value="0""#));
        assert!(html.contains(r#"name="return" value="role=soldier""#));
        assert!(html.contains(" checked"));
    }

    #[test]
    fn edit_missing_record_errors() {
        logged_in();
        assert!(handle_edit_get("9", "").contains("no monster at index 9"));
        assert!(handle_edit_get("x", "").contains("Invalid monster id"));
    }

    #[test]
    fn create_saves_and_returns_to_list() {
        logged_in();
        let html = handle_create_post("name=Imp&description=Tiny.&role=thief&return=search%3Dimp");
        assert!(html.contains("Monster added"));
        assert!(html.contains(r#""/mine?search=imp""#));
        assert_eq!(names(), ["Vampire", "Swamp Creature", "Imp"]);
    }

    #[test]
    fn create_duplicate_name_rerenders_with_error() {
        logged_in();
        let html = handle_create_post("name=+vampire+&description=Again.");
        assert!(html.contains("already exists"));
        assert!(html.contains(r#"value=" vampire ""#));
        assert_eq!(names().len(), 2);
    }

    #[test]
    fn create_reports_every_missing_field() {
        logged_in();
        let html = handle_create_post("name=&description=");
        assert!(html.contains("Name is required"));
        assert!(html.contains("Description is required"));
    }

    #[test]
    fn duplicate_submit_rejects_unchanged_name() {
        logged_in();
        let html = handle_create_post("name=Vampire&description=Bites.&mode=duplicate&source=0");
        assert!(html.contains("already exists"));
        let html = handle_create_post("name=Vampire+II&description=Bites.&favorite=true&mode=duplicate&source=0");
        assert!(html.contains("Monster added"));
        assert_eq!(names().len(), 3);
        assert!(with_app(|app| app.store.get(2).unwrap().favorite));
    }

    #[test]
    fn update_keeps_own_name() {
        logged_in();
        let html = handle_update_post("0", "name=Vampire&description=Still+bites.&role=mage");
        assert!(html.contains("Monster updated"));
        let m = with_app(|app| app.store.get(0).unwrap());
        assert_eq!(m.description, "Still bites.");
        assert_eq!(m.role, "mage");
        assert!(!m.favorite);
    }

    #[test]
    fn update_vanished_record_shows_error() {
        logged_in();
        let html = handle_update_post("5", "name=Ghost&description=Gone.");
        assert!(html.contains("no monster at index 5"));
        assert_eq!(names().len(), 2);
    }
}
