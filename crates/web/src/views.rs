//! Template rendering.
//!
//! Templates are compiled into the binary at build time and rendered with
//! tera. Dotted view names resolve to file paths (`reportes.crear` becomes
//! `reportes/crear.html`), and page views are wrapped in a layout that
//! receives the inner markup as the `content` variable.
//!
//! Escaping happens here, at the output boundary: handlers store raw
//! validated strings and tera auto-escapes every `.html` template.

use std::collections::HashMap;

use tera::{Context, Tera, Value};

use ecocusco_db::models::user::User;

use crate::session::Session;

/// Default layout for full pages.
pub const MAIN_LAYOUT: &str = "layouts.main";

/// Compiled template engine. Built once at startup and shared via
/// [`crate::state::AppState`].
pub struct ViewEngine {
    tera: Tera,
}

impl ViewEngine {
    pub fn new() -> Result<Self, tera::Error> {
        let mut tera = Tera::default();
        tera.add_raw_templates(vec![
            ("layouts/main.html", include_str!("../templates/layouts/main.html")),
            ("partials/flashes.html", include_str!("../templates/partials/flashes.html")),
            ("home.html", include_str!("../templates/home.html")),
            ("dashboard.html", include_str!("../templates/dashboard.html")),
            ("estadisticas.html", include_str!("../templates/estadisticas.html")),
            ("auth/login.html", include_str!("../templates/auth/login.html")),
            ("auth/register.html", include_str!("../templates/auth/register.html")),
            ("auth/logout.html", include_str!("../templates/auth/logout.html")),
            ("auth/forgot.html", include_str!("../templates/auth/forgot.html")),
            ("auth/reset.html", include_str!("../templates/auth/reset.html")),
            ("reportes/index.html", include_str!("../templates/reportes/index.html")),
            ("reportes/crear.html", include_str!("../templates/reportes/crear.html")),
            ("reportes/editar.html", include_str!("../templates/reportes/editar.html")),
            ("reportes/show.html", include_str!("../templates/reportes/show.html")),
            ("errores/404.html", include_str!("../templates/errores/404.html")),
            ("errores/500.html", include_str!("../templates/errores/500.html")),
        ])?;
        tera.register_function("asset", asset_url);
        Ok(ViewEngine { tera })
    }

    /// Render a single view by dotted name.
    pub fn render(&self, view: &str, context: &Context) -> Result<String, tera::Error> {
        self.tera.render(&resolve(view), context)
    }

    /// Render `view`, then render `layout` with the result bound as the
    /// `content` variable (marked safe -- it is already escaped markup).
    pub fn render_with_layout(
        &self,
        view: &str,
        context: &Context,
        layout: &str,
    ) -> Result<String, tera::Error> {
        let content = self.render(view, context)?;
        let mut layout_context = context.clone();
        layout_context.insert("content", &content);
        self.tera.render(&resolve(layout), &layout_context)
    }
}

/// `reportes.crear` -> `reportes/crear.html`
fn resolve(view: &str) -> String {
    format!("{}.html", view.replace('.', "/"))
}

/// Template helper: `asset(path="css/app.css")` -> `/static/css/app.css`.
fn asset_url(args: &HashMap<String, Value>) -> tera::Result<Value> {
    let path = args
        .get("path")
        .and_then(Value::as_str)
        .ok_or_else(|| tera::Error::msg("asset() requires a 'path' argument"))?;
    Ok(Value::String(format!("/static/{}", path.trim_start_matches('/'))))
}

/// Context with every key the layout expects, all empty. Error pages and
/// tests build on this without a session.
pub fn base_context() -> Context {
    let mut ctx = Context::new();
    ctx.insert("flashes", &Vec::<crate::session::Flash>::new());
    ctx.insert("errors", &HashMap::<String, Vec<String>>::new());
    ctx.insert("old", &HashMap::<String, String>::new());
    ctx.insert("auth_name", &Option::<String>::None);
    ctx.insert("is_admin", &false);
    ctx.insert("csrf_token", "");
    ctx
}

/// Context for a full page render.
///
/// This consumes the session's one-shot state (flashes, stored errors, old
/// input) -- build it exactly once per request, or later reads will see
/// nothing. That is the contract, not a bug: a notice is shown once.
pub fn page_context(session: &Session, user: Option<&User>) -> Context {
    let mut ctx = base_context();
    ctx.insert("flashes", &session.take_flashes());
    ctx.insert("errors", &session.take_errors());
    ctx.insert("old", &session.take_old_input());
    ctx.insert(
        "auth_name",
        &user.map(|u| u.nombre.clone()).or_else(|| session.user_name()),
    );
    ctx.insert("is_admin", &user.map(|u| u.is_admin).unwrap_or(false));
    ctx.insert("csrf_token", &session.csrf_token());
    ctx
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dotted_names_resolve_to_paths() {
        assert_eq!(resolve("reportes.crear"), "reportes/crear.html");
        assert_eq!(resolve("home"), "home.html");
    }

    #[test]
    fn engine_compiles_all_templates() {
        ViewEngine::new().expect("all embedded templates should compile");
    }

    #[test]
    fn layout_wraps_inner_content() {
        let engine = ViewEngine::new().unwrap();
        let mut ctx = base_context();
        ctx.insert("titulo", "EcoCusco");
        let html = engine
            .render_with_layout("errores.404", &ctx, MAIN_LAYOUT)
            .expect("render should succeed");
        assert!(html.contains("<!DOCTYPE html>"));
        assert!(html.contains("404"));
    }

    #[test]
    fn html_is_escaped_at_the_output_boundary() {
        let engine = ViewEngine::new().unwrap();
        let mut ctx = base_context();
        ctx.insert("titulo", "EcoCusco");
        ctx.insert(
            "flashes",
            &vec![crate::session::Flash {
                kind: "info".to_string(),
                message: "<script>alert(1)</script>".to_string(),
            }],
        );
        let html = engine
            .render_with_layout("errores.404", &ctx, MAIN_LAYOUT)
            .unwrap();
        assert!(!html.contains("<script>alert(1)</script>"));
        assert!(html.contains("&lt;script&gt;"));
    }

    #[test]
    fn asset_helper_builds_static_urls() {
        let engine = ViewEngine::new().unwrap();
        let mut ctx = base_context();
        ctx.insert("titulo", "EcoCusco");
        let html = engine
            .render_with_layout("errores.404", &ctx, MAIN_LAYOUT)
            .unwrap();
        assert!(html.contains("/static/css/app.css"));
    }
}
