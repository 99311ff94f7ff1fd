use crate::web::escape_html;

fn error_block(error: Option<&str>) -> String {
    error
        .map(|message| format!(r#"<p class="flash flash-error">{}</p>"#, escape_html(message)))
        .unwrap_or_default()
}

pub fn register_form(error: Option<&str>, username: &str, email: &str) -> String {
    format!(
        r#"<h1>Create an account</h1>
{error}
<form method="post" action="/users/register">
<p><label>Username <input name="username" value="{username}" required></label></p>
<p><label>Email <input name="email" type="email" value="{email}"></label></p>
<p><label>Password <input name="password" type="password" required></label></p>
<p><label>Confirm password <input name="confirm_password" type="password" required></label></p>
<p><button type="submit">Register</button></p>
</form>
<p>Already registered? <a href="/users/login">Log in</a></p>"#,
        error = error_block(error),
        username = escape_html(username),
        email = escape_html(email),
    )
}

pub fn login_form(error: Option<&str>, username: &str, next: Option<&str>) -> String {
    let next = next
        .map(|next| {
            format!(
                r#"<input type="hidden" name="next" value="{}">"#,
                escape_html(next)
            )
        })
        .unwrap_or_default();

    format!(
        r#"<h1>Log in</h1>
{error}
<form method="post" action="/users/login">
{next}
<p><label>Username <input name="username" value="{username}" required></label></p>
<p><label>Password <input name="password" type="password" required></label></p>
<p><button type="submit">Log in</button></p>
</form>
<p>No account yet? <a href="/users/register">Register</a></p>"#,
        error = error_block(error),
        username = escape_html(username),
    )
}

pub fn password_form(error: Option<&str>) -> String {
    format!(
        r#"<h1>Change password</h1>
{error}
<form method="post" action="/users/password">
<p><label>New password <input name="password" type="password" required></label></p>
<p><label>Confirm new password <input name="confirm_password" type="password" required></label></p>
<p><button type="submit">Change password</button></p>
</form>"#,
        error = error_block(error),
    )
}
