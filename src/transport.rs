//! The transport that committed operations are applied to.

pub mod wire;

use crate::op::{SetCookie, SetHeader};
use futures_io::AsyncWrite;
use std::io::Result;
use std::pin::Pin;

/// The primitives a [`ResponseBuffer`](crate::ResponseBuffer) commits into.
///
/// During [`send`](crate::ResponseBuffer::send), each recorded operation is passed to exactly one
/// of `set_header`, `set_cookie`, or `set_raw_cookie`, in recording order, and then the rendered
/// body is passed to `write` in a single call.
pub trait Transport {
	/// Applies a header operation.
	///
	/// # Errors
	/// An implementation returns an error if it cannot apply the operation.
	fn set_header(&mut self, header: &SetHeader) -> Result<()>;

	/// Applies a cookie whose value should be encoded.
	///
	/// # Errors
	/// An implementation returns an error if it cannot apply the operation.
	fn set_cookie(&mut self, cookie: &SetCookie) -> Result<()>;

	/// Applies a cookie whose value should be written verbatim.
	///
	/// # Errors
	/// An implementation returns an error if it cannot apply the operation.
	fn set_raw_cookie(&mut self, cookie: &SetCookie) -> Result<()>;

	/// Writes body bytes.
	///
	/// # Errors
	/// An implementation returns an error if the bytes cannot be written.
	fn write(&mut self, body: &[u8]) -> Result<()>;
}

/// Writes committed response bytes to an asynchronous socket and flushes it.
///
/// This is the usual last step after committing a [`ResponseBuffer`](crate::ResponseBuffer) into
/// a [`Wire`](wire::Wire) over a `Vec<u8>`: the buffer is committed synchronously, and the
/// resulting bytes are then pushed out over a socket that implements
/// [`AsyncWrite`](futures_io::AsyncWrite).
///
/// # Errors
/// This function returns an error if writing to or flushing `socket` fails.
pub async fn flush<Socket: AsyncWrite + ?Sized>(
	data: &[u8],
	mut socket: Pin<&mut Socket>,
) -> Result<()> {
	use crate::util::io::AsyncWriteExt as _;
	socket.as_mut().write_all(data).await?;
	socket.as_mut().flush().await
}
