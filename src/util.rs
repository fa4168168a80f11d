pub mod io;

/// Checks whether a byte is a `tchar` (token character).
pub fn is_tchar(b: u8) -> bool {
	b.is_ascii_alphanumeric()
		|| b == b'!'
		|| b == b'#'
		|| b == b'$'
		|| b == b'%'
		|| b == b'&'
		|| b == b'\''
		|| b == b'*'
		|| b == b'+'
		|| b == b'-'
		|| b == b'.'
		|| b == b'^'
		|| b == b'_'
		|| b == b'`'
		|| b == b'|'
		|| b == b'~'
}

/// Checks whether a string is a token.
pub fn is_token(name: &str) -> bool {
	!name.is_empty() && name.bytes().all(is_tchar)
}

/// Checks whether a byte can legally appear in an HTTP header value.
pub fn is_field_vchar(b: u8) -> bool {
	b == b'\t' || (b >= 0x20 && b != 0x7F)
}

/// Checks whether a sequence of bytes is a valid HTTP header value.
pub fn is_field_value(value: &[u8]) -> bool {
	match (value.first(), value.last()) {
		(Some(&first), Some(&last)) => {
			first != b' '
				&& first != b'\t'
				&& last != b' '
				&& last != b'\t'
				&& value.iter().all(|b| is_field_vchar(*b))
		}
		_ => true,
	}
}

/// Checks whether a byte may not appear in a cookie path, domain, or raw value.
pub fn is_cookie_separator(b: u8) -> bool {
	matches!(b, b',' | b';' | b' ' | b'\t' | b'\r' | b'\n' | 0x0B | 0x0C)
}

/// Checks whether a string is usable as a cookie name.
pub fn is_cookie_name(name: &str) -> bool {
	!name.is_empty() && !name.bytes().any(|b| b == b'=' || is_cookie_separator(b))
}

/// Checks whether a string contains no cookie separators.
pub fn is_cookie_attribute(value: &str) -> bool {
	!value.bytes().any(is_cookie_separator)
}

/// Returns the canonical reason phrase for a status code, or the empty string if there is none.
pub fn reason_phrase(code: u16) -> &'static str {
	match code {
		100 => "Continue",
		101 => "Switching Protocols",
		200 => "OK",
		201 => "Created",
		202 => "Accepted",
		203 => "Non-Authoritative Information",
		204 => "No Content",
		205 => "Reset Content",
		206 => "Partial Content",
		300 => "Multiple Choices",
		301 => "Moved Permanently",
		302 => "Found",
		303 => "See Other",
		304 => "Not Modified",
		307 => "Temporary Redirect",
		308 => "Permanent Redirect",
		400 => "Bad Request",
		401 => "Unauthorized",
		403 => "Forbidden",
		404 => "Not Found",
		405 => "Method Not Allowed",
		406 => "Not Acceptable",
		409 => "Conflict",
		410 => "Gone",
		411 => "Length Required",
		412 => "Precondition Failed",
		413 => "Content Too Large",
		415 => "Unsupported Media Type",
		422 => "Unprocessable Content",
		429 => "Too Many Requests",
		500 => "Internal Server Error",
		501 => "Not Implemented",
		502 => "Bad Gateway",
		503 => "Service Unavailable",
		504 => "Gateway Timeout",
		_ => "",
	}
}
