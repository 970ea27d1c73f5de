//! Monster list export and import.
//!
//! Export hands the page a script that downloads the full list as
//! `monsters.json`. Import receives the file text from the page bridge as
//! `payload`, and replaces the list only after the user confirms.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use futures::executor::block_on;

use crate::monster::confirm::{Answered, ConfirmDialog, IMPORT_PROMPT};
use crate::monster::transfer::{export_json, parse_list};
use crate::monster::view::ViewState;
use crate::routes::fragments::confirm_dialog;
use crate::routes::monsters::render_with;
use crate::routes::session::require_login;
use crate::routes::util::{get_param, parse_form_body};
use crate::state::with_app;

/// Download file name.
pub const EXPORT_FILE: &str = "monsters.json";

// ── GET /api/monsters/export ───────────────────────────────────────

/// Handle GET /api/monsters/export
/// Always the whole list, regardless of the current filters.
pub fn handle_export_get(_query: &str) -> String {
    if let Some(redirect) = require_login() {
        return redirect;
    }
    let json = with_app(|app| export_json(&app.store.list()));
    // base64 keeps quotes and newlines out of the inline script.
    let encoded = STANDARD.encode(json.as_bytes());
    log::info!("exporting {} bytes of monster data", json.len());
    format!(
        r#"<script>
(function() {{
  var bin = atob('{data}');
  var bytes = new Uint8Array(bin.length);
  for (var i = 0; i < bin.length; i++) bytes[i] = bin.charCodeAt(i);
  var b = new Blob([bytes], {{type: 'application/json'}});
  var a = document.createElement('a');
  a.href = URL.createObjectURL(b);
  a.download = '{file}';
  a.click();
  URL.revokeObjectURL(a.href);
}})();
</script>"#,
        data = encoded,
        file = EXPORT_FILE
    )
}

// ── POST /api/monsters/import ──────────────────────────────────────

/// Handle POST /api/monsters/import
/// Body: payload={file text}&confirm=yes|no plus the view state.
/// A payload that is not a JSON array is dropped without a message.
pub fn handle_import_post(body: &str) -> String {
    if let Some(redirect) = require_login() {
        return redirect;
    }
    let params = parse_form_body(body);
    let state = ViewState::from_query(&params);
    let payload = get_param(&params, "payload").unwrap_or("");

    let monsters = match parse_list(payload) {
        Ok(monsters) => monsters,
        Err(e) => {
            log::warn!("import ignored: {}", e);
            return render_with(state, |_, _| Ok(()));
        }
    };

    let Some(answer) = Answered::from_param(get_param(&params, "confirm")) else {
        let mut carry = state.to_query();
        carry.push(("payload", payload.to_string()));
        return confirm_dialog(IMPORT_PROMPT, "/api/monsters/import", &carry);
    };

    render_with(state, |store, _| {
        if block_on(answer.confirm(IMPORT_PROMPT)) {
            log::info!("importing {} monsters", monsters.len());
            store.set_all(monsters);
        }
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::monster::model::default_monsters;
    use crate::routes::util::percent_encode;
    use crate::state::{reset_app, with_app_mut};

    fn logged_in() {
        reset_app(Config::default());
        with_app_mut(|app| app.session.login("bob@bob.com", "Test123").unwrap());
    }

    fn import_body(payload: &str, extra: &str) -> String {
        format!("payload={}{}", percent_encode(payload), extra)
    }

    #[test]
    fn export_requires_login() {
        reset_app(Config::default());
        assert!(!handle_export_get("").contains("atob"));
    }

    #[test]
    fn export_embeds_whole_list() {
        logged_in();
        let html = handle_export_get("?search=nothing-matches");
        assert!(html.contains("monsters.json"));
        let start = html.find("atob('").unwrap() + 6;
        let end = start + html[start..].find('\'').unwrap();
        let bytes = STANDARD.decode(&html[start..end]).unwrap();
        let list = parse_list(std::str::from_utf8(&bytes).unwrap()).unwrap();
        assert_eq!(list, default_monsters());
    }

    #[test]
    fn import_asks_before_replacing() {
        logged_in();
        let payload = r#"[{"name":"Imp","description":"Tiny.","favorite":false,"role":"thief"}]"#;
        let html = handle_import_post(&import_body(payload, "&search=i"));
        assert!(html.contains(IMPORT_PROMPT));
        assert!(html.contains(r#"name="payload""#));
        assert!(html.contains(r#"name="search" value="i""#));
        assert_eq!(with_app(|app| app.store.len()), 2);
    }

    #[test]
    fn import_confirmed_replaces_list() {
        logged_in();
        let payload = r#"[{"name":"Imp","description":"Tiny."}]"#;
        let html = handle_import_post(&import_body(payload, "&confirm=yes"));
        assert!(html.contains("Monsters imported"));
        let list = with_app(|app| app.store.list());
        assert_eq!(list.len(), 1);
        assert_eq!(list[0].name, "Imp");
        assert!(!list[0].favorite);
    }

    #[test]
    fn import_declined_keeps_list() {
        logged_in();
        handle_import_post(&import_body("[]", "&confirm=no"));
        assert_eq!(with_app(|app| app.store.list()), default_monsters());
    }

    #[test]
    fn malformed_import_is_ignored() {
        logged_in();
        for payload in ["not json", r#"{"name":"Imp"}"#, ""] {
            let html = handle_import_post(&import_body(payload, "&confirm=yes"));
            assert!(!html.contains(IMPORT_PROMPT));
            assert!(html.contains("Vampire"));
        }
        assert_eq!(with_app(|app| app.store.list()), default_monsters());
    }
}
