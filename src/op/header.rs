use crate::error::InvalidHeader;
use crate::util::{is_field_value, is_token, reason_phrase};
use std::fmt::{Display, Formatter};

/// An HTTP status line.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct StatusLine {
	/// The HTTP minor version number.
	///
	/// For example, for HTTP/1.0, this is zero; for HTTP/1.1, this is 1.
	pub minor_version: u8,

	/// The status code.
	pub code: u16,

	/// The reason phrase.
	pub reason: String,
}

impl StatusLine {
	/// Builds an HTTP/1.1 status line with the canonical reason phrase for `code`.
	///
	/// # Errors
	/// This function returns [`InvalidHeader::StatusCode`] if `code` is not a three-digit number.
	pub fn new(code: u16) -> Result<Self, InvalidHeader> {
		if !(100..=999).contains(&code) {
			return Err(InvalidHeader::StatusCode(code));
		}
		Ok(Self {
			minor_version: 1,
			code,
			reason: reason_phrase(code).to_owned(),
		})
	}
}

impl Default for StatusLine {
	fn default() -> Self {
		Self {
			minor_version: 1,
			code: 200,
			reason: reason_phrase(200).to_owned(),
		}
	}
}

impl Display for StatusLine {
	fn fmt(&self, f: &mut Formatter<'_>) -> Result<(), std::fmt::Error> {
		write!(f, "HTTP/1.{} {}", self.minor_version, self.code)?;
		if !self.reason.is_empty() {
			write!(f, " {}", self.reason)?;
		}
		Ok(())
	}
}

/// The content of a header operation: either a status line or a single header field.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HeaderLine {
	/// Replaces the response status line.
	Status(StatusLine),

	/// Sets a header field.
	Field {
		/// The field name, as given.
		name: String,

		/// The field value.
		value: String,
	},
}

/// A buffered header operation.
///
/// This is the typed counterpart of a raw header line plus the two flags that go with it: whether
/// a field replaces earlier fields of the same name, and an optional status code to force at the
/// same time.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetHeader {
	line: HeaderLine,
	replace: bool,
	status: Option<u16>,
}

impl SetHeader {
	/// Builds a header field operation.
	///
	/// # Errors
	/// This function returns an error if `name` is not a token or if `value` is not a valid field
	/// value (a valid field value does not contain any bytes 0x00 through 0x08, 0x0A through 0x1F,
	/// or 0x7F, and does not start or end with a space or tab).
	pub fn field(name: impl Into<String>, value: impl Into<String>) -> Result<Self, InvalidHeader> {
		let name = name.into();
		let value = value.into();
		if !is_token(&name) {
			return Err(InvalidHeader::Name);
		}
		if !is_field_value(value.as_bytes()) {
			return Err(InvalidHeader::Value);
		}
		Ok(Self::from(HeaderLine::Field { name, value }))
	}

	/// Builds a status line operation for `code`.
	///
	/// # Errors
	/// This function returns [`InvalidHeader::StatusCode`] if `code` is not a three-digit number.
	pub fn status(code: u16) -> Result<Self, InvalidHeader> {
		Ok(Self::from(HeaderLine::Status(StatusLine::new(code)?)))
	}

	/// Parses a raw header line.
	///
	/// A line starting with `HTTP/` is a status line such as `HTTP/1.1 404 Not Found`; any other
	/// line is a header field such as `Content-Type: text/plain`. The line must not contain a line
	/// terminator.
	///
	/// Only HTTP/1.0 and HTTP/1.1 status lines are accepted; `HTTP/2 200` and the like are
	/// rejected, since the response is serialized as HTTP/1.x.
	///
	/// # Errors
	/// This function returns an error if the line contains a carriage return or line feed, or if
	/// it is not a well-formed status line or header field.
	pub fn parse(line: &str) -> Result<Self, InvalidHeader> {
		if line.bytes().any(|b| b == b'\r' || b == b'\n') {
			return Err(InvalidHeader::NewLine);
		}
		let mut framed = String::with_capacity(line.len() + 4);
		framed.push_str(line);
		framed.push_str("\r\n\r\n");

		if line.starts_with("HTTP/") {
			let mut headers = [httparse::EMPTY_HEADER; 0];
			let mut resp = httparse::Response::new(&mut headers);
			if resp.parse(framed.as_bytes())?.is_partial() {
				return Err(InvalidHeader::Incomplete);
			}
			let status = match (resp.version, resp.code, resp.reason) {
				(Some(minor_version), Some(code), Some(reason)) => StatusLine {
					minor_version,
					code,
					reason: reason.to_owned(),
				},
				_ => return Err(InvalidHeader::Incomplete),
			};
			if !(100..=999).contains(&status.code) {
				return Err(InvalidHeader::StatusCode(status.code));
			}
			Ok(Self::from(HeaderLine::Status(status)))
		} else {
			let mut headers = [httparse::EMPTY_HEADER; 1];
			match httparse::parse_headers(framed.as_bytes(), &mut headers)? {
				httparse::Status::Complete((_, [header])) => {
					let value = std::str::from_utf8(header.value)?;
					Self::field(header.name, value)
				}
				_ => Err(InvalidHeader::Incomplete),
			}
		}
	}

	/// Sets whether a field replaces earlier fields with the same name (the default) or is added
	/// alongside them.
	#[must_use]
	pub fn replace(mut self, replace: bool) -> Self {
		self.replace = replace;
		self
	}

	/// Forces the response status code to `code` when this operation is applied.
	///
	/// # Errors
	/// This function returns [`InvalidHeader::StatusCode`] if `code` is not a three-digit number.
	pub fn with_status(mut self, code: u16) -> Result<Self, InvalidHeader> {
		if !(100..=999).contains(&code) {
			return Err(InvalidHeader::StatusCode(code));
		}
		self.status = Some(code);
		Ok(self)
	}

	/// Returns the status line or field.
	pub fn line(&self) -> &HeaderLine {
		&self.line
	}

	/// Returns whether a field replaces earlier fields with the same name.
	pub fn replaces(&self) -> bool {
		self.replace
	}

	/// Returns the forced status code, if any.
	pub fn forced_status(&self) -> Option<u16> {
		self.status
	}
}

impl From<HeaderLine> for SetHeader {
	fn from(line: HeaderLine) -> Self {
		Self {
			line,
			replace: true,
			status: None,
		}
	}
}

impl std::str::FromStr for SetHeader {
	type Err = InvalidHeader;

	fn from_str(line: &str) -> Result<Self, Self::Err> {
		Self::parse(line)
	}
}
