use futures_core::ready;
use futures_io::AsyncWrite;
use std::future::Future;
use std::io::Result;
use std::pin::Pin;
use std::task::{Context, Poll};

/// A set of additional utility functions available on any type implementing `AsyncWrite`.
pub trait AsyncWriteExt: AsyncWrite {
	/// Writes a block of bytes to the writeable.
	///
	/// This function performs repeated writes into the writeable until the entire requested data
	/// has been written. A write that accepts zero bytes of a non-empty block is reported as
	/// [`WriteZero`](std::io::ErrorKind::WriteZero).
	fn write_all<'a>(self: Pin<&'a mut Self>, data: &'a [u8]) -> WriteAllFuture<'a, Self> {
		WriteAllFuture { sink: self, data }
	}

	/// Flushes the writeable.
	fn flush(self: Pin<&mut Self>) -> FlushFuture<'_, Self> {
		FlushFuture { sink: self }
	}
}

impl<W: AsyncWrite + ?Sized> AsyncWriteExt for W {}

/// A future that writes all of an array to an `AsyncWrite`.
#[derive(Debug)]
pub struct WriteAllFuture<'a, T: AsyncWrite + ?Sized> {
	sink: Pin<&'a mut T>,
	data: &'a [u8],
}

impl<T: AsyncWrite + ?Sized> Future for WriteAllFuture<'_, T> {
	type Output = Result<()>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		while !self.data.is_empty() {
			let data = self.data;
			let bytes_written = ready!(self.sink.as_mut().poll_write(cx, data))?;
			if bytes_written == 0 {
				return Poll::Ready(Err(std::io::ErrorKind::WriteZero.into()));
			}
			self.data = &self.data[bytes_written..];
		}
		Ok(()).into()
	}
}

/// A future that flushes an `AsyncWrite`.
#[derive(Debug)]
pub struct FlushFuture<'a, T: AsyncWrite + ?Sized> {
	sink: Pin<&'a mut T>,
}

impl<T: AsyncWrite + ?Sized> Future for FlushFuture<'_, T> {
	type Output = Result<()>;

	fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
		self.sink.as_mut().poll_flush(cx)
	}
}

#[cfg(test)]
mod test {
	use super::*;
	use futures_executor::block_on;

	/// A sink that accepts at most `chunk` bytes per write and counts flushes.
	struct Test {
		v: Vec<u8>,
		chunk: usize,
		flushes: usize,
	}

	impl AsyncWrite for Test {
		fn poll_write(
			mut self: Pin<&mut Self>,
			_cx: &mut Context<'_>,
			data: &[u8],
		) -> Poll<Result<usize>> {
			let n = std::cmp::min(self.chunk, data.len());
			self.v.extend_from_slice(&data[..n]);
			Ok(n).into()
		}

		fn poll_flush(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<()>> {
			self.flushes += 1;
			Ok(()).into()
		}

		fn poll_close(self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Result<()>> {
			panic!("Should not be called");
		}
	}

	/// Tests calling `write_all` on a sink that accepts unlimited data at a time.
	#[test]
	fn test_write_all_fast() {
		let mut t = Test {
			v: vec![],
			chunk: usize::MAX,
			flushes: 0,
		};
		block_on(async { Pin::new(&mut t).write_all(b"abcdefgh").await }).unwrap();
		assert_eq!(t.v.as_slice(), b"abcdefgh");
	}

	/// Tests calling `write_all` on a sink that accepts data only one byte at a time.
	#[test]
	fn test_write_all_slow() {
		let mut t = Test {
			v: vec![],
			chunk: 1,
			flushes: 0,
		};
		block_on(async { Pin::new(&mut t).write_all(b"abcdefgh").await }).unwrap();
		assert_eq!(t.v.as_slice(), b"abcdefgh");
	}

	/// Tests calling `write_all` on a sink that stops accepting data.
	#[test]
	fn test_write_all_zero() {
		let mut t = Test {
			v: vec![],
			chunk: 0,
			flushes: 0,
		};
		let e = block_on(async { Pin::new(&mut t).write_all(b"abcdefgh").await }).unwrap_err();
		assert_eq!(e.kind(), std::io::ErrorKind::WriteZero);
	}

	/// Tests calling `flush`.
	#[test]
	fn test_flush() {
		let mut t = Test {
			v: vec![],
			chunk: 1,
			flushes: 0,
		};
		block_on(async { Pin::new(&mut t).flush().await }).unwrap();
		assert_eq!(t.flushes, 1);
	}
}
