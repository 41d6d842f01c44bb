use minijinja::{Environment, context};
use tracing::error;

use crate::summarize::models::Dialect;

pub fn init_templates() -> Result<Environment<'static>, minijinja::Error> {
    let mut env = Environment::new();

    // Register built-in templates
    env.add_template("index.html", include_str!("../../templates/index.html"))?;

    // Add filters
    env.add_filter("json", |value: minijinja::value::Value| {
        serde_json::to_string(&value).unwrap_or_else(|_| "null".to_string())
    });

    Ok(env)
}

/// Renders the chat page with the dialect selector preset to `selected`.
pub fn render_index(env: &Environment, user_name: &str, selected: Dialect) -> String {
    let dialects: Vec<_> = Dialect::ALL
        .iter()
        .map(|d| {
            context! {
                value => d.as_str(),
                label => d.label(),
                selected => *d == selected,
            }
        })
        .collect();

    let result = env.get_template("index.html").and_then(|tmpl| {
        tmpl.render(context! {
            title => "NL Chat",
            user_name => user_name,
            dialects => dialects,
        })
    });

    match result {
        Ok(html) => html,
        Err(e) => {
            error!("Template render error: {}", e);
            format!("<h1>Template Error</h1><p>{}</p>", e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_lists_every_dialect() {
        let env = init_templates().unwrap();
        let html = render_index(&env, "RD", Dialect::Redshift);

        for dialect in Dialect::ALL {
            assert!(html.contains(&format!("value=\"{}\"", dialect.as_str())));
            assert!(html.contains(dialect.label()));
        }
        assert!(html.contains(r#"<option value="redshift" selected>"#));
        assert!(html.contains("RD"));
    }

    #[test]
    fn index_carries_role_and_stop_button() {
        let env = init_templates().unwrap();
        let html = render_index(&env, "RD", Dialect::Sqlite);

        assert!(html.contains(r#"<div class="user-role">Engineer</div>"#));
        assert!(html.contains(r#"class="stop""#));
        assert!(html.contains("Generating..."));
    }
}
