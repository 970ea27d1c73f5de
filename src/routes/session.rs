//! `/api/session` routes: login screen, login/logout, and the guard used by
//! every protected route.

use crate::routes::fragments::login_redirect;
use crate::routes::util::{escape_html, get_param, parse_form_body};
use crate::state::{with_app, with_app_mut};

/// Route guard: `Some(redirect)` when the caller must log in first.
pub fn require_login() -> Option<String> {
    if with_app(|app| app.session.is_authenticated()) {
        None
    } else {
        log::debug!("guard: anonymous request redirected to login");
        Some(login_redirect())
    }
}

// ── GET /api/session ───────────────────────────────────────────────

/// Login form when anonymous, session banner when logged in.
pub fn handle_get(_query: &str) -> String {
    if with_app(|app| app.session.is_authenticated()) {
        render_banner()
    } else {
        render_login_form("", false)
    }
}

// ── POST /api/session/login ────────────────────────────────────────

/// Handle POST /api/session/login
/// Body: username={u}&password={p}
pub fn handle_login_post(body: &str) -> String {
    let params = parse_form_body(body);
    let username = get_param(&params, "username").unwrap_or("");
    let password = get_param(&params, "password").unwrap_or("");

    match with_app_mut(|app| app.session.login(username, password)) {
        Ok(()) => enter_list(),
        Err(e) => {
            log::debug!("login form rejected: {}", e);
            render_login_form(username, true)
        }
    }
}

// ── POST /api/session/logout ───────────────────────────────────────

pub fn handle_logout_post(_body: &str) -> String {
    with_app_mut(|app| app.session.logout());
    let mut html = render_login_form("", false);
    html.push_str(r#"<script>history.replaceState(null, '', '/');</script>"#);
    html
}

// ── Rendering ──────────────────────────────────────────────────────

/// Load the list view and move the address bar to it.
fn enter_list() -> String {
    r##"<div hx-get="/api/monsters" hx-trigger="load" hx-target="#monster-app" hx-swap="innerHTML"></div>
<script>history.pushState(null, '', '/mine');</script>"##
        .to_string()
}

fn render_banner() -> String {
    let mut html = String::with_capacity(512);
    html.push_str(r#"<div class="flex items-center gap-3 text-sm">"#);
    html.push_str(r#"<span class="text-slate-600">Signed in</span>"#);
    html.push_str(
        r##"<button class="underline text-slate-700" hx-post="/api/session/logout" hx-target="#monster-app" hx-swap="innerHTML">Log out</button>"##,
    );
    html.push_str("</div>");
    html
}

fn render_login_form(username: &str, failed: bool) -> String {
    let mut html = String::with_capacity(2048);
    html.push_str(
        r##"<form class="max-w-sm mx-auto mt-16 grid gap-3" hx-post="/api/session/login" hx-target="#monster-app" hx-swap="innerHTML">"##,
    );
    html.push_str(r#"<h1 class="text-2xl font-bold text-center">Monster Manager</h1>"#);
    if failed {
        html.push_str(
            r#"<p class="text-sm text-red-700 text-center" role="alert">Invalid login, please try again.</p>"#,
        );
    }
    html.push_str(&format!(
        r#"<label class="grid gap-1 text-sm">Email<input type="email" name="username" value="{}" required class="border rounded px-2 py-1"></label>"#,
        escape_html(username)
    ));
    html.push_str(
        r#"<label class="grid gap-1 text-sm">Password<input type="password" name="password" required class="border rounded px-2 py-1"></label>"#,
    );
    html.push_str(
        r#"<button type="submit" class="bg-slate-800 text-white rounded px-4 py-2">Log in</button>"#,
    );
    html.push_str("</form>");
    html
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::state::reset_app;

    #[test]
    fn anonymous_get_shows_form() {
        reset_app(Config::default());
        let html = handle_get("");
        assert!(html.contains(r#"name="password""#));
        assert!(require_login().is_some());
    }

    #[test]
    fn login_success_enters_list() {
        reset_app(Config::default());
        let html = handle_login_post("username=bob%40bob.com&password=Test123");
        assert!(html.contains("/api/monsters"));
        assert!(html.contains("/mine"));
        assert!(require_login().is_none());
        assert!(handle_get("").contains("Log out"));
        reset_app(Config::default());
    }

    #[test]
    fn login_failure_reports_and_clears() {
        reset_app(Config::default());
        handle_login_post("username=bob%40bob.com&password=Test123");
        let html = handle_login_post("username=bob%40bob.com&password=nope");
        assert!(html.contains("Invalid login"));
        assert!(html.contains("bob@bob.com"));
        assert!(require_login().is_some());
        reset_app(Config::default());
    }

    #[test]
    fn logout_returns_to_entry() {
        reset_app(Config::default());
        handle_login_post("username=bob%40bob.com&password=Test123");
        let html = handle_logout_post("");
        assert!(html.contains("Log in"));
        assert!(require_login().is_some());
        reset_app(Config::default());
    }
}
