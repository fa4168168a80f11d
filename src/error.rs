//! Errors that originate inside `deferred-response` or `httparse`.
//!
//! Recording an operation into a [`ResponseBuffer`](crate::ResponseBuffer) never fails. Everything
//! that can go wrong happens at one of three other points: while constructing an operation (an
//! invalid header line or cookie name, reported as [`InvalidHeader`] or [`InvalidCookie`]), while
//! rendering the view (reported as [`ViewError`]), or while the transport applies the committed
//! operations (reported as [`std::io::Error`], with a [`Rejected`] inner error when the built-in
//! [`Wire`](crate::transport::wire::Wire) transport refuses an operation). [`Error`] gathers the
//! latter two, plus the single-use violation, for [`send`](crate::ResponseBuffer::send).

use std::fmt::{Display, Formatter};

/// The ways in which a header line or header field can be invalid.
#[derive(Debug, PartialEq)]
pub enum InvalidHeader {
	/// `httparse` rejected the line.
	Parse(httparse::Error),

	/// The line contains a carriage return or line feed.
	NewLine,

	/// The header value is not valid UTF-8.
	NotUtf8(std::str::Utf8Error),

	/// The header name is not a token.
	Name,

	/// The header value contains a forbidden byte or starts or ends with whitespace.
	Value,

	/// The status code is outside the range 100 through 999.
	StatusCode(u16),

	/// The line ended before a complete status line or field was seen.
	Incomplete,
}

impl Display for InvalidHeader {
	fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
		match self {
			Self::Parse(inner) => inner.fmt(f),
			Self::NewLine => write!(f, "Header line contains a newline"),
			Self::NotUtf8(inner) => write!(f, "Header value is not UTF-8: {inner}"),
			Self::Name => write!(f, "Header name is not a token"),
			Self::Value => write!(f, "Header value is not a valid field value"),
			Self::StatusCode(code) => write!(f, "Status code {code} is out of range"),
			Self::Incomplete => write!(f, "Header line is incomplete"),
		}
	}
}

impl std::error::Error for InvalidHeader {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::Parse(inner) => Some(inner),
			Self::NotUtf8(inner) => Some(inner),
			Self::NewLine | Self::Name | Self::Value | Self::StatusCode(_) | Self::Incomplete => {
				None
			}
		}
	}
}

impl From<httparse::Error> for InvalidHeader {
	fn from(inner: httparse::Error) -> Self {
		Self::Parse(inner)
	}
}

impl From<std::str::Utf8Error> for InvalidHeader {
	fn from(inner: std::str::Utf8Error) -> Self {
		Self::NotUtf8(inner)
	}
}

/// The ways in which a cookie can be invalid.
#[derive(Debug, Eq, PartialEq)]
pub enum InvalidCookie {
	/// The cookie name is empty or contains one of ```=,; \t\r\n\x0B\x0C```.
	Name,

	/// The path or domain attribute contains one of ```,; \t\r\n\x0B\x0C```.
	Attribute,
}

impl Display for InvalidCookie {
	fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
		match self {
			Self::Name => write!(f, "Cookie name is empty or contains a forbidden character"),
			Self::Attribute => write!(f, "Cookie attribute contains a forbidden character"),
		}
	}
}

impl std::error::Error for InvalidCookie {}

/// The ways in which rendering a view can fail.
#[derive(Debug)]
pub enum ViewError {
	/// No template is registered under the view path.
	NotFound(String),

	/// Writing into the capture sink failed.
	Format(std::fmt::Error),

	/// The template itself reported a failure.
	Evaluation(Box<dyn std::error::Error + Send + Sync>),
}

impl ViewError {
	/// Wraps an arbitrary template failure.
	pub fn evaluation<E: Into<Box<dyn std::error::Error + Send + Sync>>>(inner: E) -> Self {
		Self::Evaluation(inner.into())
	}
}

impl Display for ViewError {
	fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
		match self {
			Self::NotFound(path) => write!(f, "View {path:?} not found"),
			Self::Format(inner) => inner.fmt(f),
			Self::Evaluation(inner) => write!(f, "View evaluation failed: {inner}"),
		}
	}
}

impl std::error::Error for ViewError {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::NotFound(_) => None,
			Self::Format(inner) => Some(inner),
			Self::Evaluation(inner) => Some(inner.as_ref()),
		}
	}
}

impl From<std::fmt::Error> for ViewError {
	fn from(inner: std::fmt::Error) -> Self {
		Self::Format(inner)
	}
}

/// The reasons the [`Wire`](crate::transport::wire::Wire) transport refuses an operation.
#[derive(Debug, Eq, PartialEq)]
pub enum Rejected {
	/// The response head has already been written, so headers and cookies can no longer change.
	HeadersSent,

	/// A raw cookie value contains one of ```,; \t\r\n\x0B\x0C```.
	RawCookieValue,

	/// The head declared the length of the body already written, so no more body can follow.
	BodySent,
}

impl Display for Rejected {
	fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
		match self {
			Self::HeadersSent => write!(f, "Headers already sent"),
			Self::RawCookieValue => write!(f, "Raw cookie value contains a forbidden character"),
			Self::BodySent => write!(f, "Body already sent with a computed length"),
		}
	}
}

impl std::error::Error for Rejected {}

/// The error returned by [`send`](crate::ResponseBuffer::send).
#[derive(Debug)]
pub enum Error {
	/// `send` was already called on this buffer.
	AlreadySent,

	/// The view could not be rendered. Nothing was committed to the transport.
	View(ViewError),

	/// The transport failed while applying a header operation or writing the body. Some
	/// operations may already have been applied.
	Transport(std::io::Error),
}

impl Display for Error {
	fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
		match self {
			Self::AlreadySent => write!(f, "Response already sent"),
			Self::View(inner) => inner.fmt(f),
			Self::Transport(inner) => inner.fmt(f),
		}
	}
}

impl std::error::Error for Error {
	fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
		match self {
			Self::AlreadySent => None,
			Self::View(inner) => Some(inner),
			Self::Transport(inner) => Some(inner),
		}
	}
}

impl From<ViewError> for Error {
	fn from(inner: ViewError) -> Self {
		Self::View(inner)
	}
}

impl From<std::io::Error> for Error {
	fn from(inner: std::io::Error) -> Self {
		Self::Transport(inner)
	}
}

impl From<InvalidHeader> for std::io::Error {
	fn from(inner: InvalidHeader) -> Self {
		Self::new(std::io::ErrorKind::InvalidInput, inner)
	}
}

impl From<InvalidCookie> for std::io::Error {
	fn from(inner: InvalidCookie) -> Self {
		Self::new(std::io::ErrorKind::InvalidInput, inner)
	}
}

impl From<Rejected> for std::io::Error {
	fn from(inner: Rejected) -> Self {
		let kind = match inner {
			Rejected::HeadersSent | Rejected::BodySent => std::io::ErrorKind::Other,
			Rejected::RawCookieValue => std::io::ErrorKind::InvalidInput,
		};
		Self::new(kind, inner)
	}
}

impl From<Error> for std::io::Error {
	fn from(inner: Error) -> Self {
		match inner {
			Error::Transport(inner) => inner,
			other => Self::new(std::io::ErrorKind::Other, other),
		}
	}
}

#[cfg(test)]
mod test {
	use super::*;

	/// Tests that a rejection keeps its detail when converted to an I/O error.
	#[test]
	fn test_rejected_into_io() {
		let e: std::io::Error = Rejected::HeadersSent.into();
		assert_eq!(e.kind(), std::io::ErrorKind::Other);
		assert_eq!(
			e.get_ref().and_then(|e| e.downcast_ref::<Rejected>()),
			Some(&Rejected::HeadersSent)
		);
	}

	/// Tests that a transport error passes through `Error` unmodified.
	#[test]
	fn test_transport_passthrough() {
		let inner = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "gone");
		let e: std::io::Error = Error::from(inner).into();
		assert_eq!(e.kind(), std::io::ErrorKind::BrokenPipe);
		assert_eq!(format!("{e}"), "gone");
	}

	/// Tests the source chain of a view evaluation failure.
	#[test]
	fn test_view_source() {
		use std::error::Error as _;
		let e = Error::from(ViewError::evaluation("template blew up"));
		assert_eq!(format!("{e}"), "View evaluation failed: template blew up");
		assert!(e.source().is_some());
	}
}
