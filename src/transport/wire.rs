use crate::error::Rejected;
use crate::op::{HeaderLine, SetCookie, SetHeader, StatusLine};
use crate::util::is_cookie_separator;
use std::io::{Result, Write};
use std::time::SystemTime;

/// A [`Transport`](super::Transport) that serializes an HTTP/1.1 response into a byte sink.
///
/// Header operations only modify an in-memory status line and field list until the first call to
/// [`write`](super::Transport::write). At that point the response head is written to the sink,
/// followed by the body; from then on the head is frozen and further header or cookie operations
/// fail with [`Rejected::HeadersSent`].
///
/// Unless the caller set `Content-Length` or `Transfer-Encoding`, the head declares the length of
/// the first write as the body length, and any later write fails with [`Rejected::BodySent`].
/// No length is declared for 1xx and 204 responses, which have no body.
///
/// The `Sink` type parameter is the destination of the serialized bytes. A `Vec<u8>` is typical,
/// with the result later pushed to a socket via [`flush`](super::flush).
#[derive(Debug)]
pub struct Wire<Sink: Write> {
	/// The destination.
	sink: Sink,

	/// The status line to send.
	status: StatusLine,

	/// The header fields to send, in order.
	fields: Vec<(String, String)>,

	/// Whether the head has been written to the sink.
	head_sent: bool,

	/// Whether the head declared a length computed from the first write.
	length_computed: bool,

	/// A fixed time used for cookie `Max-Age` calculations, or `None` to use the current time.
	clock: Option<SystemTime>,
}

impl<Sink: Write> Wire<Sink> {
	/// Creates a transport writing into `sink`, starting from a `200 OK` status.
	pub fn new(sink: Sink) -> Self {
		Self {
			sink,
			status: StatusLine::default(),
			fields: Vec::new(),
			head_sent: false,
			length_computed: false,
			clock: None,
		}
	}

	/// Fixes the time used to compute cookie `Max-Age` attributes.
	#[must_use]
	pub fn with_clock(mut self, now: SystemTime) -> Self {
		self.clock = Some(now);
		self
	}

	/// Returns the status line as it currently stands.
	pub fn status(&self) -> &StatusLine {
		&self.status
	}

	/// Returns the header fields as they currently stand.
	pub fn fields(&self) -> &[(String, String)] {
		&self.fields
	}

	/// Returns whether the response head has been written.
	pub fn head_sent(&self) -> bool {
		self.head_sent
	}

	/// Writes the response head if it has not been written yet, and returns the sink.
	///
	/// # Errors
	/// This function returns an error if writing to the sink fails.
	pub fn finish(mut self) -> Result<Sink> {
		if !self.head_sent {
			self.send_head(0)?;
		}
		Ok(self.sink)
	}

	fn check_open(&self) -> Result<()> {
		if self.head_sent {
			Err(Rejected::HeadersSent.into())
		} else {
			Ok(())
		}
	}

	fn set_status_code(&mut self, code: u16) {
		if self.status.code != code {
			// The reason phrase belongs to the old code.
			self.status = StatusLine {
				minor_version: self.status.minor_version,
				..StatusLine::new(code).unwrap_or_default()
			};
		}
	}

	fn push_cookie(&mut self, cookie: &SetCookie, encode: bool) {
		let now = self.clock.unwrap_or_else(SystemTime::now);
		self.fields
			.push(("Set-Cookie".to_owned(), cookie.header_value(encode, now)));
	}

	fn has_field(&self, name: &str) -> bool {
		self.fields
			.iter()
			.any(|(n, _)| n.eq_ignore_ascii_case(name))
	}

	/// Writes the status line, the fields, and the blank line.
	fn send_head(&mut self, body_length: usize) -> Result<()> {
		let mut head = Vec::new();
		writeln_crlf(&mut head, format_args!("{}", self.status))?;
		for (name, value) in &self.fields {
			writeln_crlf(&mut head, format_args!("{name}: {value}"))?;
		}
		let bodiless = (100..=199).contains(&self.status.code) || self.status.code == 204;
		if !self.has_field("Content-Length") && !self.has_field("Transfer-Encoding") {
			if !bodiless {
				writeln_crlf(&mut head, format_args!("Content-Length: {body_length}"))?;
			}
			self.length_computed = true;
		}
		head.extend_from_slice(b"\r\n");
		self.sink.write_all(&head)?;
		self.head_sent = true;
		Ok(())
	}
}

fn writeln_crlf(out: &mut Vec<u8>, args: std::fmt::Arguments<'_>) -> Result<()> {
	out.write_fmt(args)?;
	out.extend_from_slice(b"\r\n");
	Ok(())
}

impl<Sink: Write> super::Transport for Wire<Sink> {
	fn set_header(&mut self, header: &SetHeader) -> Result<()> {
		self.check_open()?;
		match header.line() {
			HeaderLine::Status(status) => self.status = status.clone(),
			HeaderLine::Field { name, value } => {
				if header.replaces() {
					self.fields.retain(|(n, _)| !n.eq_ignore_ascii_case(name));
				}
				self.fields.push((name.clone(), value.clone()));
				// A redirect target implies a redirect status unless one was already chosen.
				if name.eq_ignore_ascii_case("Location")
					&& header.forced_status().is_none()
					&& self.status.code != 201
					&& !(300..=399).contains(&self.status.code)
				{
					self.set_status_code(302);
				}
			}
		}
		if let Some(code) = header.forced_status() {
			self.set_status_code(code);
		}
		Ok(())
	}

	fn set_cookie(&mut self, cookie: &SetCookie) -> Result<()> {
		self.check_open()?;
		self.push_cookie(cookie, true);
		Ok(())
	}

	fn set_raw_cookie(&mut self, cookie: &SetCookie) -> Result<()> {
		self.check_open()?;
		if cookie.value().bytes().any(is_cookie_separator) {
			return Err(Rejected::RawCookieValue.into());
		}
		self.push_cookie(cookie, false);
		Ok(())
	}

	fn write(&mut self, body: &[u8]) -> Result<()> {
		if !self.head_sent {
			self.send_head(body.len())?;
		} else if self.length_computed {
			return Err(Rejected::BodySent.into());
		}
		self.sink.write_all(body)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use crate::transport::Transport;
	use std::time::{Duration, UNIX_EPOCH};

	fn header(line: &str) -> SetHeader {
		SetHeader::parse(line).unwrap()
	}

	/// Tests the smallest possible response.
	#[test]
	fn test_empty() {
		let sink = Wire::new(Vec::new()).finish().unwrap();
		assert_eq!(sink, &b"HTTP/1.1 200 OK\r\nContent-Length: 0\r\n\r\n"[..]);
	}

	/// Tests fields, a status line, and a body.
	#[test]
	fn test_basic() {
		let mut w = Wire::new(Vec::new());
		w.set_header(&header("HTTP/1.1 404 Not Found")).unwrap();
		w.set_header(&header("Content-Type: text/plain")).unwrap();
		w.write(b"nope").unwrap();
		assert!(w.head_sent());
		let sink = w.finish().unwrap();
		assert_eq!(
			sink,
			&b"HTTP/1.1 404 Not Found\r\nContent-Type: text/plain\r\nContent-Length: 4\r\n\r\nnope"[..]
		);
	}

	/// Tests replacing and appending fields.
	#[test]
	fn test_replace() {
		let mut w = Wire::new(Vec::new());
		w.set_header(&header("X-A: 1")).unwrap();
		w.set_header(&header("x-a: 2")).unwrap();
		w.set_header(&header("X-A: 3").replace(false)).unwrap();
		assert_eq!(
			w.fields(),
			&[
				("x-a".to_owned(), "2".to_owned()),
				("X-A".to_owned(), "3".to_owned()),
			][..]
		);
	}

	/// Tests the implicit redirect status.
	#[test]
	fn test_location() {
		let mut w = Wire::new(Vec::new());
		w.set_header(&header("Location: /elsewhere")).unwrap();
		assert_eq!(w.status().code, 302);
		assert_eq!(w.status().reason, "Found");

		let mut w = Wire::new(Vec::new());
		w.set_header(&header("HTTP/1.1 301 Moved Permanently")).unwrap();
		w.set_header(&header("Location: /elsewhere")).unwrap();
		assert_eq!(w.status().code, 301);

		let mut w = Wire::new(Vec::new());
		w.set_header(&header("Location: /elsewhere").with_status(303).unwrap())
			.unwrap();
		assert_eq!(w.status().code, 303);
	}

	/// Tests that an explicit length or chunked encoding suppresses the computed length.
	#[test]
	fn test_explicit_length() {
		let mut w = Wire::new(Vec::new());
		w.set_header(&header("Transfer-Encoding: chunked")).unwrap();
		w.write(b"").unwrap();
		assert_eq!(
			w.finish().unwrap(),
			&b"HTTP/1.1 200 OK\r\nTransfer-Encoding: chunked\r\n\r\n"[..]
		);
	}

	/// Tests encoded and raw cookies.
	#[test]
	fn test_cookies() {
		let now = UNIX_EPOCH + Duration::from_secs(1_000_000);
		let mut w = Wire::new(Vec::new()).with_clock(now);
		let c = SetCookie::new("a", "x y").unwrap();
		w.set_cookie(&c).unwrap();
		w.set_raw_cookie(&SetCookie::new("b", "x%20y").unwrap())
			.unwrap();
		let e = w.set_raw_cookie(&c).unwrap_err();
		assert_eq!(e.kind(), std::io::ErrorKind::InvalidInput);
		assert_eq!(
			w.fields(),
			&[
				("Set-Cookie".to_owned(), "a=x%20y".to_owned()),
				("Set-Cookie".to_owned(), "b=x%20y".to_owned()),
			][..]
		);
	}

	/// Tests that the head cannot change once written.
	#[test]
	fn test_headers_sent() {
		let mut w = Wire::new(Vec::new());
		w.write(b"body").unwrap();
		let e = w.set_header(&header("X-Late: 1")).unwrap_err();
		assert_eq!(
			e.get_ref().and_then(|e| e.downcast_ref::<Rejected>()),
			Some(&Rejected::HeadersSent)
		);
		let e = w.set_cookie(&SetCookie::new("late", "1").unwrap()).unwrap_err();
		assert_eq!(e.kind(), std::io::ErrorKind::Other);
	}

	/// Tests that a second write cannot exceed the length declared by the first.
	#[test]
	fn test_computed_length_single_write() {
		let mut w = Wire::new(Vec::new());
		w.write(b"abcd").unwrap();
		let e = w.write(b"efgh").unwrap_err();
		assert_eq!(
			e.get_ref().and_then(|e| e.downcast_ref::<Rejected>()),
			Some(&Rejected::BodySent)
		);
		assert_eq!(
			w.finish().unwrap(),
			&b"HTTP/1.1 200 OK\r\nContent-Length: 4\r\n\r\nabcd"[..]
		);
	}

	/// Tests that an explicit length lets the caller write the body in pieces.
	#[test]
	fn test_explicit_length_multi_write() {
		let mut w = Wire::new(Vec::new());
		w.set_header(&header("Content-Length: 8")).unwrap();
		w.write(b"abcd").unwrap();
		w.write(b"efgh").unwrap();
		assert_eq!(
			w.finish().unwrap(),
			&b"HTTP/1.1 200 OK\r\nContent-Length: 8\r\n\r\nabcdefgh"[..]
		);
	}

	/// Tests that no length is declared for responses that have no body.
	#[test]
	fn test_bodiless_status() {
		let mut w = Wire::new(Vec::new());
		w.set_header(&SetHeader::status(204).unwrap()).unwrap();
		w.write(b"").unwrap();
		assert_eq!(w.finish().unwrap(), &b"HTTP/1.1 204 No Content\r\n\r\n"[..]);

		let mut w = Wire::new(Vec::new());
		w.set_header(&header("HTTP/1.1 103 Early Hints")).unwrap();
		assert_eq!(w.finish().unwrap(), &b"HTTP/1.1 103 Early Hints\r\n\r\n"[..]);
	}
}
