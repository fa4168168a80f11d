use crate::error::InvalidCookie;
use crate::util::{is_cookie_attribute, is_cookie_name};
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use std::fmt::Write as _;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Every byte except the RFC 3986 unreserved characters is encoded in a cookie value.
const COOKIE_VALUE_ENCODE_SET: &AsciiSet = &NON_ALPHANUMERIC
	.remove(b'-')
	.remove(b'.')
	.remove(b'_')
	.remove(b'~');

/// The value of the `SameSite` cookie attribute.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum SameSite {
	/// `SameSite=Strict`.
	Strict,

	/// `SameSite=Lax`.
	Lax,

	/// `SameSite=None`.
	None,
}

impl SameSite {
	fn as_str(self) -> &'static str {
		match self {
			Self::Strict => "Strict",
			Self::Lax => "Lax",
			Self::None => "None",
		}
	}
}

/// A buffered cookie.
///
/// The same type serves both encoded and raw cookies; which one it is depends on whether it was
/// recorded with [`add_cookie`](crate::ResponseBuffer::add_cookie) or
/// [`add_raw_cookie`](crate::ResponseBuffer::add_raw_cookie).
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SetCookie {
	name: String,
	value: String,
	expires: Option<SystemTime>,
	path: Option<String>,
	domain: Option<String>,
	secure: bool,
	http_only: bool,
	same_site: Option<SameSite>,
}

impl SetCookie {
	/// Builds a session cookie with no attributes.
	///
	/// An empty `value` produces a cookie that deletes any existing cookie of the same name.
	///
	/// # Errors
	/// This function returns [`InvalidCookie::Name`] if `name` is empty or contains any of
	/// ```=,; \t\r\n\x0B\x0C```.
	pub fn new(name: impl Into<String>, value: impl Into<String>) -> Result<Self, InvalidCookie> {
		let name = name.into();
		if !is_cookie_name(&name) {
			return Err(InvalidCookie::Name);
		}
		Ok(Self {
			name,
			value: value.into(),
			expires: None,
			path: None,
			domain: None,
			secure: false,
			http_only: false,
			same_site: None,
		})
	}

	/// Sets the expiry time.
	#[must_use]
	pub fn expires(mut self, at: SystemTime) -> Self {
		self.expires = Some(at);
		self
	}

	/// Sets the path attribute.
	///
	/// # Errors
	/// This function returns [`InvalidCookie::Attribute`] if `path` contains any of
	/// ```,; \t\r\n\x0B\x0C```.
	pub fn path(mut self, path: impl Into<String>) -> Result<Self, InvalidCookie> {
		let path = path.into();
		if !is_cookie_attribute(&path) {
			return Err(InvalidCookie::Attribute);
		}
		self.path = Some(path);
		Ok(self)
	}

	/// Sets the domain attribute.
	///
	/// # Errors
	/// This function returns [`InvalidCookie::Attribute`] if `domain` contains any of
	/// ```,; \t\r\n\x0B\x0C```.
	pub fn domain(mut self, domain: impl Into<String>) -> Result<Self, InvalidCookie> {
		let domain = domain.into();
		if !is_cookie_attribute(&domain) {
			return Err(InvalidCookie::Attribute);
		}
		self.domain = Some(domain);
		Ok(self)
	}

	/// Sets the secure flag.
	#[must_use]
	pub fn secure(mut self, secure: bool) -> Self {
		self.secure = secure;
		self
	}

	/// Sets the `HttpOnly` flag.
	#[must_use]
	pub fn http_only(mut self, http_only: bool) -> Self {
		self.http_only = http_only;
		self
	}

	/// Sets the `SameSite` attribute.
	#[must_use]
	pub fn same_site(mut self, same_site: SameSite) -> Self {
		self.same_site = Some(same_site);
		self
	}

	/// Returns the cookie name.
	pub fn name(&self) -> &str {
		&self.name
	}

	/// Returns the cookie value, unencoded.
	pub fn value(&self) -> &str {
		&self.value
	}

	/// Serializes the cookie as the value of a `Set-Cookie` header.
	///
	/// If `encode` is true, the value is percent-encoded; otherwise it is written as-is. `now` is
	/// the time against which `Max-Age` is computed.
	pub fn header_value(&self, encode: bool, now: SystemTime) -> String {
		let mut ret = String::new();
		ret.push_str(&self.name);
		ret.push('=');
		if self.value.is_empty() {
			// Deletion: a placeholder value that expired one second after the epoch.
			let epoch = UNIX_EPOCH + Duration::from_secs(1);
			let _ = write!(
				ret,
				"deleted; expires={}; Max-Age=0",
				httpdate::fmt_http_date(epoch)
			);
		} else {
			if encode {
				let encoded = utf8_percent_encode(&self.value, COOKIE_VALUE_ENCODE_SET);
				let _ = write!(ret, "{encoded}");
			} else {
				ret.push_str(&self.value);
			}
			if let Some(expires) = self.expires {
				let max_age = expires.duration_since(now).map_or(0, |d| d.as_secs());
				let _ = write!(
					ret,
					"; expires={}; Max-Age={max_age}",
					httpdate::fmt_http_date(expires)
				);
			}
		}
		if let Some(path) = &self.path {
			ret.push_str("; path=");
			ret.push_str(path);
		}
		if let Some(domain) = &self.domain {
			ret.push_str("; domain=");
			ret.push_str(domain);
		}
		if self.secure {
			ret.push_str("; secure");
		}
		if self.http_only {
			ret.push_str("; HttpOnly");
		}
		if let Some(same_site) = self.same_site {
			ret.push_str("; SameSite=");
			ret.push_str(same_site.as_str());
		}
		ret
	}
}

#[cfg(test)]
mod test {
	use super::*;

	fn at(secs: u64) -> SystemTime {
		UNIX_EPOCH + Duration::from_secs(secs)
	}

	/// Tests a bare session cookie, encoded and raw.
	#[test]
	fn test_session() {
		let c = SetCookie::new("greeting", "hello world").unwrap();
		assert_eq!(c.header_value(true, at(0)), "greeting=hello%20world");
		assert_eq!(c.header_value(false, at(0)), "greeting=hello world");
	}

	/// Tests that only unreserved characters survive encoding of the value.
	#[test]
	fn test_value_encoding() {
		let encoded = |value: &str| {
			SetCookie::new("k", value)
				.unwrap()
				.header_value(true, at(0))
		};
		assert_eq!(encoded("abc-XYZ_0.9~"), "k=abc-XYZ_0.9~");
		assert_eq!(encoded("a b;c"), "k=a%20b%3Bc");
		assert_eq!(encoded("é"), "k=%C3%A9");
	}

	/// Tests that every attribute is written, in order.
	#[test]
	fn test_attributes() {
		let c = SetCookie::new("sid", "abc")
			.unwrap()
			.expires(at(784_111_777 + 3600))
			.path("/app")
			.unwrap()
			.domain("example.com")
			.unwrap()
			.secure(true)
			.http_only(true)
			.same_site(SameSite::Lax);
		assert_eq!(
			c.header_value(true, at(784_111_777)),
			"sid=abc; expires=Sun, 06 Nov 1994 09:49:37 GMT; Max-Age=3600; path=/app; domain=example.com; secure; HttpOnly; SameSite=Lax"
		);
	}

	/// Tests that an expiry in the past yields a zero `Max-Age`.
	#[test]
	fn test_expired() {
		let c = SetCookie::new("old", "x").unwrap().expires(at(10));
		assert_eq!(
			c.header_value(true, at(20)),
			"old=x; expires=Thu, 01 Jan 1970 00:00:10 GMT; Max-Age=0"
		);
	}

	/// Tests that an empty value deletes the cookie.
	#[test]
	fn test_delete() {
		let c = SetCookie::new("sid", "").unwrap().path("/").unwrap();
		assert_eq!(
			c.header_value(true, at(1000)),
			"sid=deleted; expires=Thu, 01 Jan 1970 00:00:01 GMT; Max-Age=0; path=/"
		);
	}

	/// Tests name and attribute validation.
	#[test]
	fn test_validation() {
		assert_eq!(SetCookie::new("", "v"), Err(InvalidCookie::Name));
		assert_eq!(SetCookie::new("a=b", "v"), Err(InvalidCookie::Name));
		assert_eq!(
			SetCookie::new("a", "v").unwrap().path("/a;b"),
			Err(InvalidCookie::Attribute)
		);
		assert_eq!(
			SetCookie::new("a", "v").unwrap().domain("a b"),
			Err(InvalidCookie::Attribute)
		);
	}
}
