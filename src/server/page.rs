//! The one HTML page the demo serves.

use serde::Serialize;

/// Everything the index page shows, computed fresh per request.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FortunePage {
    pub fortune: Option<String>,
    pub connected: bool,
    pub app_version: Option<String>,
    pub app_env: Option<String>,
}

impl FortunePage {
    pub fn render(&self) -> String {
        let body = match (&self.fortune, self.connected) {
            (Some(text), _) => format!("<blockquote class=\"fortune\">{}</blockquote>", escape_html(text)),
            (None, true) => "<p class=\"empty\">No fortune available yet.</p>".to_string(),
            (None, false) => "<p class=\"empty\">The fortune database is unavailable.</p>".to_string(),
        };
        let status = if self.connected {
            "<span class=\"status ok\">Connected to the database</span>"
        } else {
            "<span class=\"status down\">Not connected to the database</span>"
        };

        format!(
            r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Fortune</title>
<style>
body {{ font-family: sans-serif; max-width: 40rem; margin: 4rem auto; color: #222; }}
.fortune {{ white-space: pre-wrap; font-size: 1.3rem; border-left: 4px solid #888; padding-left: 1rem; }}
.status.ok {{ color: #2a7a2a; }}
.status.down {{ color: #b22; }}
footer {{ margin-top: 3rem; font-size: 0.8rem; color: #666; }}
</style>
</head>
<body>
{body}
<footer>
{status}<br>
Version: {version} &middot; Environment: {env}
</footer>
</body>
</html>
"#,
            body = body,
            status = status,
            version = escape_html(self.app_version.as_deref().unwrap_or("unknown")),
            env = escape_html(self.app_env.as_deref().unwrap_or("unknown")),
        )
    }
}

pub fn escape_html(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
