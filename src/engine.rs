use tera::{Context, Tera};

use crate::error::Result;

/// Name under which the built-in commit table is registered, so that other
/// templates can `{% include %}` it
pub const TABLE_TEMPLATE: &str = "gitlog/table.html";

/// The built-in HTML table fragment
pub const TABLE_SOURCE: &str = include_str!("../templates/table.html");
/// The built-in full HTML document, which includes the table
pub const DOCUMENT_SOURCE: &str = include_str!("../templates/document.html");

/// Renders a template source against a context.
pub trait TemplateEngine {
    fn render(&mut self, context: &Context, source: &str) -> Result<String>;
}

/// A `TemplateEngine` backed by its own `tera::Tera` instance.
///
/// Auto-escaping is off; templates use the `escape` filter where needed.
///
/// # Example
///
/// ```
/// # use gitlog::{TeraEngine, TemplateEngine};
/// let mut engine = TeraEngine::new().unwrap();
/// let mut context = tera::Context::new();
/// context.insert("currentBranch", "[main]");
///
/// assert_eq!(
///     "Branch: [main]",
///     engine.render(&context, "Branch: {{ currentBranch }}").unwrap()
/// );
/// ```
pub struct TeraEngine {
    tera: Tera,
}

impl TeraEngine {
    pub fn new() -> Result<TeraEngine> {
        let mut tera = Tera::default();
        tera.autoescape_on(vec![]);
        tera.add_raw_template(TABLE_TEMPLATE, TABLE_SOURCE)?;
        Ok(TeraEngine { tera })
    }
}

impl TemplateEngine for TeraEngine {
    fn render(&mut self, context: &Context, source: &str) -> Result<String> {
        self.tera.render_str(source, context).map_err(Into::into)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_templates_compile() {
        let mut engine = TeraEngine::new().unwrap();
        let mut context = Context::new();
        context.insert("currentBranch", "[main]");
        context.insert("commits", &Vec::<String>::new());

        let table = engine.render(&context, TABLE_SOURCE).unwrap();
        assert!(table.trim_start().starts_with("<table"));

        let document = engine.render(&context, DOCUMENT_SOURCE).unwrap();
        assert!(document.trim_start().starts_with("<!DOCTYPE html>"));
        assert!(document.contains("<table"));
    }

    #[test]
    fn engines_are_independent() {
        let mut context = Context::new();
        context.insert("x", &1);
        let mut a = TeraEngine::new().unwrap();
        let mut b = TeraEngine::new().unwrap();
        assert_eq!("1", a.render(&context, "{{ x }}").unwrap());
        assert_eq!("1", b.render(&context, "{{ x }}").unwrap());
    }

    #[test]
    fn syntax_error_is_reported() {
        let mut engine = TeraEngine::new().unwrap();
        assert!(engine.render(&Context::new(), "{% for %}").is_err());
    }
}
