//! Small HTML fragments shared by several routes: errors, toasts, the
//! confirmation dialog and the login redirect.

use crate::routes::util::escape_html;

/// Snackbar display time hint for the front end.
pub const TOAST_MS: u32 = 2000;

pub fn error_span(message: &str) -> String {
    format!(
        r#"<span class="text-red-700">{}</span>"#,
        escape_html(message)
    )
}

/// Transient notice shown after a mutation.
pub fn toast(message: &str) -> String {
    format!(
        r#"<div class="fixed bottom-4 left-1/2 -translate-x-1/2 bg-slate-800 text-white text-sm rounded px-4 py-2 shadow-lg" role="status" data-toast-ms="{}">{}</div>"#,
        TOAST_MS,
        escape_html(message)
    )
}

/// Confirmation dialog. Yes/No re-post `action` with `confirm=yes|no` plus
/// any `carry` fields (e.g. the view query or the import payload).
pub fn confirm_dialog(prompt: &str, action: &str, carry: &[(&str, String)]) -> String {
    let mut html = String::with_capacity(1024);
    html.push_str(
        r#"<div class="fixed inset-0 bg-black/40 flex items-center justify-center" role="dialog" aria-modal="true">"#,
    );
    html.push_str(r#"<div class="bg-white rounded-lg shadow-xl p-6 w-[390px]">"#);
    html.push_str(&format!(
        r#"<p class="mb-4 text-slate-800">{}</p>"#,
        escape_html(prompt)
    ));
    html.push_str(&format!(
        r##"<form hx-post="{}" hx-target="#monster-app" hx-swap="innerHTML" class="flex justify-end gap-2">"##,
        escape_html(action)
    ));
    for (name, value) in carry {
        html.push_str(&format!(
            r#"<input type="hidden" name="{}" value="{}">"#,
            escape_html(name),
            escape_html(value)
        ));
    }
    html.push_str(
        r#"<button type="submit" name="confirm" value="no" class="px-4 py-2 rounded border border-slate-300">No</button>"#,
    );
    html.push_str(
        r#"<button type="submit" name="confirm" value="yes" class="px-4 py-2 rounded bg-red-600 text-white" autofocus>Yes</button>"#,
    );
    html.push_str("</form></div></div>");
    html
}

/// Returned instead of protected content when nobody is logged in.
pub fn login_redirect() -> String {
    r##"<div hx-get="/api/session" hx-trigger="load" hx-target="#monster-app" hx-swap="innerHTML"></div>
<script>history.replaceState(null, '', '/');</script>"##
        .to_string()
}

/// Mirror the list view's query into the address bar. `query` must already
/// be percent-encoded.
pub fn sync_url(path: &str, query: &str) -> String {
    let url = if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query)
    };
    format!(
        r#"<script>history.replaceState(null, '', {});</script>"#,
        serde_json::to_string(&url).unwrap_or_else(|_| "'/'".to_string())
    )
}
