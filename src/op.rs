//! Recorded header-like operations.

pub mod cookie;
pub mod header;

pub use cookie::{SameSite, SetCookie};
pub use header::{HeaderLine, SetHeader, StatusLine};

/// One recorded operation, replayed against a [`Transport`](crate::Transport) at commit time.
///
/// The operations of a [`ResponseBuffer`](crate::ResponseBuffer) are kept in the order in which
/// they were recorded, and that order is the order in which they are committed.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum HeaderOp {
	/// Sets a header field or the status line.
	Header(SetHeader),

	/// Sets a cookie whose value is percent-encoded on the wire.
	Cookie(SetCookie),

	/// Sets a cookie whose value is written to the wire verbatim.
	RawCookie(SetCookie),
}

impl HeaderOp {
	/// Dispatches this operation to the matching transport primitive.
	///
	/// # Errors
	/// This function returns whatever error the transport primitive returns.
	pub fn apply<T: crate::Transport + ?Sized>(&self, transport: &mut T) -> std::io::Result<()> {
		match self {
			Self::Header(header) => transport.set_header(header),
			Self::Cookie(cookie) => transport.set_cookie(cookie),
			Self::RawCookie(cookie) => transport.set_raw_cookie(cookie),
		}
	}
}
