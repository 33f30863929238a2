//! Inline HTML pages. Every value that originates outside the app is escaped.

use services::auth::Profile;

/// Escape text for inclusion in HTML element content or a quoted attribute
pub fn escape_html(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const RETURN_LINK: &str = r#"<p>Return to the <a href="/protected/user">User Page</a>.</p>"#;

pub fn home(login_url: &str) -> String {
    format!(
        r#"<html>
  <head>
    <title>OAuth Authcode Sample</title>
  </head>
  <body>
    <h2>Welcome to the OAuth Authcode Home Page</h2>
    <p>We don't know who you are.  Please <a href="{}">log in</a>.</p>
  </body>
</html>"#,
        escape_html(login_url)
    )
}

pub fn unauthorized() -> String {
    format!(
        r#"<html>
  <head>
    <title>Unauthorized</title>
  </head>
  <body>
    <h2>Unauthorized</h2>
    <p>You are unauthorized to access page.</p>
    <hr/>
    {RETURN_LINK}
  </body>
</html>"#
    )
}

pub fn access() -> String {
    format!(
        r#"<html>
  <head>
    <title>Access Page</title>
  </head>
  <body>
    <h2>You have successfully reached the Access Page</h2>
    <p>This page requires either the <code>test.access</code> or <code>test.admin</code> scope.</p>
    <hr/>
    {RETURN_LINK}
  </body>
</html>"#
    )
}

pub fn admin() -> String {
    format!(
        r#"<html>
  <head>
    <title>Admin Page</title>
  </head>
  <body>
    <h2>You have successfully reached the Admin Page</h2>
    <p>This page requires the <code>test.admin</code> scope.</p>
    <hr/>
    {RETURN_LINK}
  </body>
</html>"#
    )
}

fn profile_rows(profile: &Profile) -> String {
    profile
        .iter()
        .map(|(key, value)| {
            let value = match value {
                serde_json::Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            format!(
                "<tr><td>{}</td><td>{}</td></tr>",
                escape_html(key),
                escape_html(&value)
            )
        })
        .collect()
}

fn scope_items(scopes: &[String]) -> String {
    scopes
        .iter()
        .map(|scope| format!("<li>{}</li>", escape_html(scope)))
        .collect()
}

pub fn user(profile: &Profile, scopes: &[String]) -> String {
    format!(
        r#"<html>
  <head>
    <title>OAuth Authcode User Page</title>
  </head>
  <body>
    <h2>Welcome to the OAuth Authcode Profile Page</h2>
    <h3>Profile Data</h3>
    <table>
      {}
    </table>
    <h3>Scopes</h3>
    <ul>
      {}
    </ul>
    <hr/>
    <p>Visit the <a href="/protected/access">Access Page</a>.</p>
    <p>Visit the <a href="/protected/admin">Admin Page</a>.</p>
    <p>Invoke a secured <a href="/protected/backing">Backing Service</a>.</p>
  </body>
</html>"#,
        profile_rows(profile),
        scope_items(scopes)
    )
}

pub fn backing_service(payload: &str) -> String {
    format!(
        r#"<html>
  <head>
    <title>Invoke Backing Service</title>
  </head>
  <body>
    <h2>Results from backing service:</h2>
    <blockquote>
      {}
    </blockquote>
    <hr/>
    {RETURN_LINK}
  </body>
</html>"#,
        escape_html(payload)
    )
}
