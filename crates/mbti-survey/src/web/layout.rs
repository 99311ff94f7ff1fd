use super::flash::Flash;

/// Per-request data every page shell needs.
#[derive(Debug, Clone, Default)]
pub struct PageContext {
    pub username: Option<String>,
    pub flash: Option<Flash>,
}

impl PageContext {
    pub fn new(username: Option<String>, flash: Option<Flash>) -> Self {
        Self { username, flash }
    }
}

const STYLE: &str = "body{font-family:sans-serif;max-width:860px;margin:0 auto;padding:1rem;color:#222}\
nav a{margin-right:1rem}\
.flash{padding:.6rem 1rem;border-radius:4px;margin:1rem 0}\
.flash-success{background:#e6f4ea}.flash-info{background:#e8f0fe}\
.flash-warning{background:#fef7e0}.flash-error{background:#fce8e6}\
.question{margin:1.2rem 0}.question label{margin-right:.8rem}\
table{border-collapse:collapse}td,th{border:1px solid #ccc;padding:.3rem .6rem}\
.pager a{margin-right:1rem}";

/// Wraps page content in the shared document shell. `body` must already be
/// escaped markup.
pub fn render_page(title: &str, context: &PageContext, body: &str) -> String {
    let nav = match &context.username {
        Some(username) => format!(
            r#"<a href="/">Home</a><a href="/test">Take the test</a><a href="/result">My result</a><a href="/users/password">Change password</a><a href="/users/logout">Log out ({})</a>"#,
            escape_html(username)
        ),
        None => r#"<a href="/">Home</a><a href="/users/login">Log in</a><a href="/users/register">Register</a>"#
            .to_string(),
    };

    let flash = context
        .flash
        .as_ref()
        .map(|flash| {
            format!(
                r#"<div class="flash flash-{}">{}</div>"#,
                flash.level,
                escape_html(&flash.message)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} · MBTI Survey</title>
<style>{STYLE}</style>
</head>
<body>
<nav>{nav}</nav>
{flash}
<main>
{body}
</main>
</body>
</html>"#,
        title = escape_html(title),
    )
}

pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
