//! Page rendering.
//!
//! Templates are compiled into the binary and loaded into one `minijinja`
//! environment at startup. `.html` templates are auto-escaped.

use axum::response::Html;
use minijinja::Environment;
use serde::Serialize;

use crate::error::ServerError;

const TEMPLATES: &[(&str, &str)] = &[
    ("base.html", include_str!("../templates/base.html")),
    ("_field_errors.html", include_str!("../templates/_field_errors.html")),
    ("_task_form.html", include_str!("../templates/_task_form.html")),
    ("index.html", include_str!("../templates/index.html")),
    ("tasks.html", include_str!("../templates/tasks.html")),
    ("create_task.html", include_str!("../templates/create_task.html")),
    ("edit.html", include_str!("../templates/edit.html")),
    ("sign_up.html", include_str!("../templates/sign_up.html")),
    ("sign_in.html", include_str!("../templates/sign_in.html")),
    ("profile.html", include_str!("../templates/profile.html")),
    ("password_change.html", include_str!("../templates/password_change.html")),
];

pub struct Views {
    env: Environment<'static>,
}

impl std::fmt::Debug for Views {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Views({} templates)", TEMPLATES.len())
    }
}

impl Views {
    pub fn new() -> Result<Self, minijinja::Error> {
        let mut env = Environment::new();
        for (name, source) in TEMPLATES {
            env.add_template(name, source)?;
        }
        Ok(Self { env })
    }

    pub fn render<S: Serialize>(&self, name: &str, ctx: S) -> Result<Html<String>, ServerError> {
        let html = self.env.get_template(name)?.render(ctx)?;
        Ok(Html(html))
    }
}
