//! View rendering: binding scopes, capture sinks, and template lookup.

use crate::error::ViewError;
use std::collections::{BTreeMap, HashMap};
use std::fmt::Write;

pub use serde_json::Value;

/// The variable bindings handed to a view.
pub type Vars = BTreeMap<String, Value>;

/// The reserved self-reference key, which is never stored as a view variable.
pub const SELF_KEY: &str = "this";

/// The binding scope a template evaluates in.
///
/// A scope owns its own copy of the bindings. A template may read, overwrite, add, or remove
/// bindings freely; the scope is dropped once rendering finishes, so none of that is visible to
/// the [`ResponseBuffer`](crate::ResponseBuffer) that supplied the variables.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Scope {
	vars: Vars,
}

impl Scope {
	/// Creates a scope holding a copy of `vars`.
	pub fn new(vars: &Vars) -> Self {
		Self { vars: vars.clone() }
	}

	/// Looks up a binding.
	pub fn get(&self, name: &str) -> Option<&Value> {
		self.vars.get(name)
	}

	/// Looks up a binding for modification.
	pub fn get_mut(&mut self, name: &str) -> Option<&mut Value> {
		self.vars.get_mut(name)
	}

	/// Binds `name` to `value`, returning the previous value if there was one.
	pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
		self.vars.insert(name.into(), value.into())
	}

	/// Removes a binding.
	pub fn remove(&mut self, name: &str) -> Option<Value> {
		self.vars.remove(name)
	}

	/// Iterates over the bindings in name order.
	pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
		self.vars.iter().map(|(k, v)| (k.as_str(), v))
	}
}

/// An accumulating sink that collects everything a template writes.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct Capture {
	buffer: String,
}

impl Capture {
	/// Creates an empty sink.
	pub fn new() -> Self {
		Self::default()
	}

	/// Returns what has been written so far.
	pub fn as_str(&self) -> &str {
		&self.buffer
	}

	/// Consumes the sink and returns what was written.
	pub fn into_string(self) -> String {
		self.buffer
	}
}

impl Write for Capture {
	fn write_str(&mut self, s: &str) -> std::fmt::Result {
		self.buffer.push_str(s);
		Ok(())
	}
}

/// Something that can evaluate the view found at a path.
///
/// The renderer writes the view's output into `out` as a side effect of evaluation, resolving
/// variable names against `scope`.
pub trait Render {
	/// Evaluates the view at `path`.
	///
	/// # Errors
	/// This function returns an error if no view exists at `path` or if evaluating it fails.
	fn render(&self, path: &str, scope: &mut Scope, out: &mut Capture) -> Result<(), ViewError>;
}

impl<F> Render for F
where
	F: Fn(&str, &mut Scope, &mut Capture) -> Result<(), ViewError>,
{
	fn render(&self, path: &str, scope: &mut Scope, out: &mut Capture) -> Result<(), ViewError> {
		self(path, scope, out)
	}
}

/// A single registered template.
pub type Template = Box<dyn Fn(&mut Scope, &mut Capture) -> Result<(), ViewError>>;

/// A registry of templates keyed by view path.
#[derive(Default)]
pub struct Views {
	templates: HashMap<String, Template>,
}

impl Views {
	/// Creates an empty registry.
	pub fn new() -> Self {
		Self::default()
	}

	/// Registers `template` under `path`, replacing any earlier template at the same path.
	pub fn insert<F>(&mut self, path: impl Into<String>, template: F)
	where
		F: Fn(&mut Scope, &mut Capture) -> Result<(), ViewError> + 'static,
	{
		let _ = self.templates.insert(path.into(), Box::new(template));
	}

	/// Returns whether a template is registered under `path`.
	pub fn contains(&self, path: &str) -> bool {
		self.templates.contains_key(path)
	}
}

impl Render for Views {
	fn render(&self, path: &str, scope: &mut Scope, out: &mut Capture) -> Result<(), ViewError> {
		match self.templates.get(path) {
			Some(template) => template(scope, out),
			None => Err(ViewError::NotFound(path.to_owned())),
		}
	}
}

impl std::fmt::Debug for Views {
	fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
		let mut paths: Vec<&str> = self.templates.keys().map(String::as_str).collect();
		paths.sort_unstable();
		f.debug_struct("Views").field("paths", &paths).finish()
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use serde_json::json;

	/// Tests that a scope is a copy of the variables it was built from.
	#[test]
	fn test_scope_is_copy() {
		let mut vars = Vars::new();
		let _ = vars.insert("x".to_owned(), json!(10));
		let mut scope = Scope::new(&vars);
		let _ = scope.set("x", 11);
		let _ = scope.set("y", "new");
		assert_eq!(scope.get("x"), Some(&json!(11)));
		assert_eq!(vars.get("x"), Some(&json!(10)));
		assert!(!vars.contains_key("y"));
	}

	/// Tests looking up registered and unregistered templates.
	#[test]
	fn test_views_lookup() {
		let mut views = Views::new();
		views.insert("hello", |scope: &mut Scope, out: &mut Capture| {
			let name = scope.get("name").and_then(Value::as_str).unwrap_or("nobody");
			write!(out, "Hello, {name}!")?;
			Ok(())
		});
		assert!(views.contains("hello"));

		let mut vars = Vars::new();
		let _ = vars.insert("name".to_owned(), json!("world"));
		let mut out = Capture::new();
		views
			.render("hello", &mut Scope::new(&vars), &mut out)
			.unwrap();
		assert_eq!(out.as_str(), "Hello, world!");

		match views.render("missing", &mut Scope::default(), &mut Capture::new()) {
			Err(ViewError::NotFound(path)) => assert_eq!(path, "missing"),
			other => panic!("Expected NotFound, got {other:?}"),
		}
	}

	/// Tests that a plain closure works as a renderer.
	#[test]
	fn test_closure_render() {
		let render = |path: &str, _: &mut Scope, out: &mut Capture| -> Result<(), ViewError> {
			out.write_str(path)?;
			Ok(())
		};
		let mut out = Capture::new();
		render
			.render("a/b.html", &mut Scope::default(), &mut out)
			.unwrap();
		assert_eq!(out.into_string(), "a/b.html");
	}
}
