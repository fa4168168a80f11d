#![forbid(unsafe_code)]
#![warn(future_incompatible, nonstandard_style, rust_2018_idioms, unused)]
#![warn(
	deprecated_in_future,
	missing_debug_implementations,
	missing_docs,
	trivial_casts,
	trivial_numeric_casts,
	unused_import_braces,
	unused_qualifications,
	unused_results
)]
#![warn(clippy::pedantic, clippy::cargo)]
// Recording methods take their operations by value so the log owns them.
#![allow(clippy::needless_pass_by_value)]

//! Deferred HTTP Response Buffer
//!
//! This crate provides [`ResponseBuffer`], which collects everything a request handler wants to
//! say in its response—status line, header fields, cookies, and a view with its variables—without
//! producing any output. When the handler is done, [`ResponseBuffer::send`] commits the response
//! in a fixed order: the view is rendered to a string, the recorded header and cookie operations
//! are replayed against a [`Transport`] in the order they were recorded, the body is written, and
//! finally an optional post-send hook runs with the buffer itself.
//!
//! The crate does not render templates or talk to sockets itself. Views are evaluated by any
//! [`Render`](view::Render) implementation (for example a [`Views`](view::Views) registry), and
//! operations are applied by any [`Transport`] implementation (for example
//! [`Wire`](transport::wire::Wire), which serializes an HTTP/1.1 response into a byte sink whose
//! contents can then be pushed to an asynchronous socket with [`transport::flush`]).
//!
//! # Example
//! ```
//! use deferred_response::transport::wire::Wire;
//! use deferred_response::view::{Capture, Scope, Value, Views};
//! use deferred_response::{ResponseBuffer, SetCookie, SetHeader};
//! use std::fmt::Write as _;
//!
//! let mut views = Views::new();
//! views.insert("greeting", |scope: &mut Scope, out: &mut Capture| {
//!		let name = scope.get("name").and_then(Value::as_str).unwrap_or("stranger");
//!		write!(out, "Hello, {name}!")?;
//!		Ok(())
//! });
//!
//! let mut response = ResponseBuffer::new();
//! response.set_view("greeting");
//! response.set_vars([("name", Value::from("world"))]);
//! response.add_header(SetHeader::parse("Content-Type: text/plain").unwrap());
//! response.add_raw_cookie(SetCookie::new("visited", "1").unwrap());
//!
//! let mut wire = Wire::new(Vec::new());
//! response.send(&views, &mut wire).unwrap();
//! assert_eq!(
//!		wire.finish().unwrap(),
//!		&b"HTTP/1.1 200 OK\r\nContent-Type: text/plain\r\nSet-Cookie: visited=1\r\nContent-Length: 13\r\n\r\nHello, world!"[..],
//! );
//! ```

mod buffer;
pub mod error;
mod log;
pub mod op;
pub mod transport;
mod util;
pub mod view;

pub use buffer::{PostSendHook, ResponseBuffer};
pub use error::Error;
pub use op::{HeaderOp, SetCookie, SetHeader};
pub use transport::Transport;
