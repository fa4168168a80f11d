use crate::error::{Error, ViewError};
use crate::log::{debug, info, warning};
use crate::op::{HeaderOp, SetCookie, SetHeader};
use crate::transport::Transport;
use crate::view::{Capture, Render, Scope, Value, Vars, SELF_KEY};
use std::fmt::{Debug, Formatter};

/// The callback run as the last step of [`send`](ResponseBuffer::send).
pub type PostSendHook = Box<dyn FnMut(&ResponseBuffer)>;

/// A response under construction whose side effects are deferred until it is sent.
///
/// Request-handling code records header and cookie operations, names a view, and supplies the
/// view's variables, in any order. None of this touches the transport. A single call to
/// [`send`](Self::send) then:
/// 1. renders the view into a string,
/// 2. replays the recorded operations against the transport in recording order,
/// 3. writes the rendered body to the transport in one call, and
/// 4. runs the post-send hook, if any, with the buffer itself.
///
/// A buffer can be sent only once; a second call fails with [`Error::AlreadySent`].
#[derive(Default)]
pub struct ResponseBuffer {
	/// The recorded operations, in commit order.
	header_ops: Vec<HeaderOp>,

	/// The path of the view to render, if any.
	view: Option<String>,

	/// The variables bound into the view's scope.
	vars: Vars,

	/// The callback to run after the body has been written.
	post_send_hook: Option<PostSendHook>,

	/// Whether commit has begun.
	sent: bool,
}

impl ResponseBuffer {
	/// Creates an empty buffer.
	pub fn new() -> Self {
		Self::default()
	}

	/// Sets the path of the view to render.
	///
	/// The path is not checked here; a missing view is reported when rendering.
	pub fn set_view(&mut self, path: impl Into<String>) {
		let path = path.into();
		debug!("view set to {:?}", path);
		self.view = Some(path);
	}

	/// Unsets the view, so that the body is empty.
	pub fn clear_view(&mut self) {
		self.view = None;
	}

	/// Returns the path of the view to render.
	pub fn view(&self) -> Option<&str> {
		self.view.as_deref()
	}

	/// Replaces the view variables with `vars`.
	///
	/// Earlier variables are discarded, not merged. A binding named [`SELF_KEY`] is dropped.
	pub fn set_vars<I, K>(&mut self, vars: I)
	where
		I: IntoIterator<Item = (K, Value)>,
		K: Into<String>,
	{
		self.vars = vars
			.into_iter()
			.map(|(k, v)| (k.into(), v))
			.filter(|(k, _)| k != SELF_KEY)
			.collect();
	}

	/// Returns the view variables.
	pub fn vars(&self) -> &Vars {
		&self.vars
	}

	/// Records a header operation.
	pub fn add_header(&mut self, header: SetHeader) {
		debug!("recorded header {:?}", header.line());
		self.header_ops.push(HeaderOp::Header(header));
	}

	/// Records a cookie whose value will be percent-encoded.
	///
	/// Recording cannot fail, so this always returns `true`.
	pub fn add_cookie(&mut self, cookie: SetCookie) -> bool {
		debug!("recorded cookie {:?}", cookie.name());
		self.header_ops.push(HeaderOp::Cookie(cookie));
		true
	}

	/// Records a cookie whose value will be written verbatim.
	///
	/// Recording cannot fail, so this always returns `true`.
	pub fn add_raw_cookie(&mut self, cookie: SetCookie) -> bool {
		debug!("recorded raw cookie {:?}", cookie.name());
		self.header_ops.push(HeaderOp::RawCookie(cookie));
		true
	}

	/// Returns the recorded operations, in the order in which they will be committed.
	pub fn header_ops(&self) -> &[HeaderOp] {
		&self.header_ops
	}

	/// Sets the callback to run after the body has been written.
	///
	/// The callback receives the buffer itself, so it can inspect what was sent.
	pub fn set_post_send_hook<F: FnMut(&Self) + 'static>(&mut self, hook: F) {
		self.post_send_hook = Some(Box::new(hook));
	}

	/// Returns the post-send callback.
	///
	/// While the callback is running, this returns `None`.
	pub fn post_send_hook(&self) -> Option<&PostSendHook> {
		self.post_send_hook.as_ref()
	}

	/// Returns whether [`send`](Self::send) has begun committing this buffer.
	pub fn is_sent(&self) -> bool {
		self.sent
	}

	/// Renders the view and returns its output.
	///
	/// If no view is set, or the view path is empty, this returns an empty string without
	/// consulting `views`. Otherwise the
	/// view is evaluated in a fresh [`Scope`] holding a copy of the variables, so anything the view
	/// does to its bindings is discarded afterwards.
	///
	/// # Errors
	/// This function returns whatever error `views` reports. Partial output is discarded.
	pub fn render_view<R: Render + ?Sized>(&self, views: &R) -> Result<String, ViewError> {
		let path = match self.view.as_deref() {
			Some(path) if !path.is_empty() => path,
			_ => return Ok(String::new()),
		};
		let mut scope = Scope::new(&self.vars);
		let mut out = Capture::new();
		views.render(path, &mut scope, &mut out)?;
		Ok(out.into_string())
	}

	/// Replays the recorded operations against `transport`, in recording order.
	///
	/// # Errors
	/// This function stops at and returns the first error reported by `transport`. Operations
	/// before the failing one have already been applied.
	pub fn commit_headers<T: Transport + ?Sized>(&self, transport: &mut T) -> std::io::Result<()> {
		for op in &self.header_ops {
			op.apply(transport)?;
		}
		Ok(())
	}

	/// Runs the post-send callback, if there is one.
	pub fn call_post_send_hook(&mut self) {
		if let Some(mut hook) = self.post_send_hook.take() {
			hook(&*self);
			self.post_send_hook = Some(hook);
		}
	}

	/// Commits the response.
	///
	/// The view is rendered first; only if that succeeds are the recorded operations replayed
	/// against `transport`, followed by the body and then the post-send callback.
	///
	/// # Errors
	/// This function returns:
	/// * [`Error::AlreadySent`] if the buffer was already sent, without touching `transport`
	/// * [`Error::View`] if rendering fails, in which case nothing reaches `transport` and the
	///   buffer is not marked as sent
	/// * [`Error::Transport`] if `transport` fails, in which case some operations may already have
	///   been applied and the buffer is marked as sent
	pub fn send<R, T>(&mut self, views: &R, transport: &mut T) -> Result<(), Error>
	where
		R: Render + ?Sized,
		T: Transport + ?Sized,
	{
		if self.sent {
			warning!("response already sent");
			return Err(Error::AlreadySent);
		}
		let body = self.render_view(views)?;
		self.sent = true;
		info!(
			"sending response: {} header operations, {} body bytes",
			self.header_ops.len(),
			body.len()
		);
		self.commit_headers(transport)?;
		transport.write(body.as_bytes())?;
		self.call_post_send_hook();
		Ok(())
	}
}

impl Debug for ResponseBuffer {
	fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
		f.debug_struct("ResponseBuffer")
			.field("header_ops", &self.header_ops)
			.field("view", &self.view)
			.field("vars", &self.vars)
			.field("post_send_hook", &self.post_send_hook.as_ref().map(|_| ".."))
			.field("sent", &self.sent)
			.finish()
	}
}
