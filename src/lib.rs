//! Monster list in-browser WASM server.
//!
//! Exports `handle_request(method, path, query, body)` for the page bridge
//! to call. Uses `matchit` for URL routing, the same router engine that
//! powers Axum. Responses are HTML fragments for HTMX to swap in.
//!
//! Storage lives in JavaScript (`localStorage`), so the bridge hydrates an
//! in-WASM mirror once at startup with `hydrate_storage`, and after every
//! request applies whatever `drain_storage_writes` returns.

use std::collections::BTreeMap;

use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod logging;
pub mod monster;
pub mod routes;
pub mod session;
pub mod state;
pub mod storage;

use config::Config;

/// Install the panic hook and logger, then rebuild app state.
///
/// # Arguments
/// * `config_json`: JSON object overriding `Config` fields. Empty for defaults.
#[wasm_bindgen]
pub fn init(config_json: &str) {
    console_error_panic_hook::set_once();
    let config = Config::from_json(config_json);
    logging::init(config.level_filter());
    log::info!("monster server starting (page size {})", config.page_size);
    state::reset_app(config);
}

/// Seed the storage mirror from a JSON object of `localStorage` entries.
/// `null` or anything that is not a string-to-string object marks storage as
/// unavailable, so the store falls back to its defaults.
#[wasm_bindgen]
pub fn hydrate_storage(entries_json: &str) {
    let entries = match serde_json::from_str::<Option<BTreeMap<String, String>>>(entries_json) {
        Ok(entries) => entries,
        Err(e) => {
            log::warn!("storage snapshot unreadable, running without storage: {}", e);
            None
        }
    };
    log::debug!(
        "hydrating storage with {} entries",
        entries.as_ref().map_or(0, |e| e.len())
    );
    state::hydrate(entries);
}

/// JSON array of pending `localStorage` writes, oldest first.
#[wasm_bindgen]
pub fn drain_storage_writes() -> String {
    let writes = state::drain_writes();
    serde_json::to_string(&writes).unwrap_or_else(|e| {
        log::error!("storage writes not serializable: {}", e);
        "[]".to_string()
    })
}

/// Process an HTTP-like request and return an HTML fragment.
///
/// Called from JavaScript via wasm-bindgen.
///
/// # Arguments
/// * `method`: HTTP method ("GET" or "POST")
/// * `path`: URL path (e.g., "/api/monsters/3/edit")
/// * `query`: Query string (e.g., "?search=bat&page=2")
/// * `body`: URL-encoded form body. Empty string for GET requests.
///
/// # Returns
/// An HTML string fragment suitable for HTMX to swap into the DOM.
#[wasm_bindgen]
pub fn handle_request(method: &str, path: &str, query: &str, body: &str) -> String {
    // matchit compiles route patterns into a radix tree; static segments win
    // over `{id}` where they overlap.
    let mut router = matchit::Router::new();

    router.insert("/api/session", "session").ok();
    router.insert("/api/session/login", "login").ok();
    router.insert("/api/session/logout", "logout").ok();

    router.insert("/api/monsters", "monsters").ok();
    router.insert("/api/monsters/new", "new").ok();
    router.insert("/api/monsters/random", "random").ok();
    router.insert("/api/monsters/team", "team").ok();
    router.insert("/api/monsters/unfavorite", "unfavorite").ok();
    router.insert("/api/monsters/clear", "clear").ok();
    router.insert("/api/monsters/export", "export").ok();
    router.insert("/api/monsters/import", "import").ok();
    router.insert("/api/monsters/keys", "keys").ok();

    router.insert("/api/monsters/{id}", "monster").ok();
    router.insert("/api/monsters/{id}/edit", "edit").ok();
    router.insert("/api/monsters/{id}/favorite", "favorite").ok();
    router.insert("/api/monsters/{id}/delete", "delete").ok();

    let Ok(matched) = router.at(path) else {
        log::debug!("{} {} -> 404", method, path);
        return not_found();
    };
    let route = *matched.value;
    let id = matched.params.get("id").unwrap_or("");
    log::debug!("{} {} -> {}", method, path, route);

    match (route, method) {
        ("session", "GET") => routes::session::handle_get(query),
        ("login", "POST") => routes::session::handle_login_post(body),
        ("logout", "POST") => routes::session::handle_logout_post(body),

        ("monsters", "GET") => routes::monsters::handle_list_get(query),
        ("monsters", "POST") => routes::form::handle_create_post(body),
        ("new", "GET") => routes::form::handle_new_get(query),
        ("random", "POST") => routes::monsters::handle_random_post(body),
        ("team", "POST") => routes::monsters::handle_team_post(body),
        ("unfavorite", "POST") => routes::monsters::handle_unfavorite_post(body),
        ("clear", "POST") => routes::monsters::handle_clear_post(body),
        ("export", "GET") => routes::transfer::handle_export_get(query),
        ("import", "POST") => routes::transfer::handle_import_post(body),
        ("keys", "POST") => routes::monsters::handle_keys_post(body),

        ("monster", "POST") => routes::form::handle_update_post(id, body),
        ("edit", "GET") => routes::form::handle_edit_get(id, query),
        ("favorite", "POST") => routes::monsters::handle_favorite_post(id, body),
        ("delete", "POST") => routes::monsters::handle_delete_post(id, body),

        _ => method_not_allowed(),
    }
}

fn not_found() -> String {
    r#"<span class="text-red-700">404 — route not found</span>"#.to_string()
}

fn method_not_allowed() -> String {
    r#"<span class="text-red-700">405 — method not allowed</span>"#.to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{reset_app, with_app};

    fn login() {
        reset_app(Config::default());
        handle_request("POST", "/api/session/login", "", "username=bob%40bob.com&password=Test123");
    }

    #[test]
    fn returns_404_for_unknown_route() {
        let html = handle_request("GET", "/api/nonexistent", "", "");
        assert!(html.contains("404"));
    }

    #[test]
    fn returns_405_for_wrong_method() {
        assert!(handle_request("DELETE", "/api/monsters", "", "").contains("405"));
        assert!(handle_request("GET", "/api/monsters/clear", "", "").contains("405"));
        assert!(handle_request("GET", "/api/monsters/0/delete", "", "").contains("405"));
    }

    #[test]
    fn protected_routes_redirect_when_anonymous() {
        reset_app(Config::default());
        for (method, path) in [
            ("GET", "/api/monsters"),
            ("GET", "/api/monsters/new"),
            ("GET", "/api/monsters/0/edit"),
            ("POST", "/api/monsters/0/favorite"),
            ("GET", "/api/monsters/export"),
        ] {
            let html = handle_request(method, path, "", "");
            assert!(html.contains(r#"hx-get="/api/session""#), "{} {}", method, path);
        }
    }

    #[test]
    fn static_segments_beat_id() {
        login();
        let html = handle_request("GET", "/api/monsters/new", "", "");
        assert!(html.contains("New Monster"));
        let html = handle_request("POST", "/api/monsters/random", "", "");
        assert!(html.contains("Random monster added"));
    }

    #[test]
    fn routes_edit_and_update() {
        login();
        let html = handle_request("GET", "/api/monsters/1/edit", "?duplicate=true", "");
        assert!(html.contains("Duplicate Monster"));
        let html = handle_request(
            "POST",
            "/api/monsters/1",
            "",
            "name=Swamp+Thing&description=Damp.&role=medic",
        );
        assert!(html.contains("Swamp Thing"));
        assert_eq!(with_app(|app| app.store.get(1).unwrap().name), "Swamp Thing");
    }

    #[test]
    fn hydrate_restores_list_and_session() {
        reset_app(Config::default());
        hydrate_storage(
            r#"{"auth_logged_in":"true","monster_list":"[{\"name\":\"Imp\",\"description\":\"Tiny.\",\"favorite\":true,\"role\":\"thief\"}]"}"#,
        );
        let html = handle_request("GET", "/api/monsters", "", "");
        assert!(html.contains(">Imp<"));
        assert!(!html.contains("Vampire"));
        assert_eq!(drain_storage_writes(), "[]");
    }

    #[test]
    fn hydrate_without_storage_uses_defaults() {
        reset_app(Config::default());
        hydrate_storage("null");
        with_app(|app| assert_eq!(app.store.len(), 2));
        hydrate_storage("not json");
        with_app(|app| assert!(!app.session.is_authenticated()));
    }

    #[test]
    fn mutations_queue_storage_writes() {
        reset_app(Config::default());
        hydrate_storage("{}");
        drain_storage_writes();
        handle_request("POST", "/api/session/login", "", "username=bob%40bob.com&password=Test123");
        handle_request("POST", "/api/monsters/0/favorite", "", "");
        let writes: serde_json::Value = serde_json::from_str(&drain_storage_writes()).unwrap();
        let writes = writes.as_array().unwrap();
        assert_eq!(writes.len(), 2);
        assert_eq!(writes[0]["key"], "auth_logged_in");
        assert_eq!(writes[0]["value"], "true");
        assert_eq!(writes[1]["op"], "set");
        assert_eq!(writes[1]["key"], "monster_list");
        assert_eq!(drain_storage_writes(), "[]");

        handle_request("POST", "/api/session/logout", "", "");
        let writes = drain_storage_writes();
        assert!(writes.contains(r#""op":"remove""#));
    }

    #[test]
    fn init_applies_config() {
        init(r#"{"page_size": 1, "log_level": "off"}"#);
        handle_request("POST", "/api/session/login", "", "username=bob%40bob.com&password=Test123");
        let html = handle_request("GET", "/api/monsters", "", "");
        assert!(html.contains(r#"aria-label="Pages""#));
        reset_app(Config::default());
    }
}
