//! Core error and trap types for the proxy runtime.
//!
//! This crate provides the vocabulary shared by every component:
//!
//! - [`JsError`] - an error with an [`ErrorKind`] and message
//! - [`JsResult`] - the result type of every object-model operation
//! - [`Trap`] - names of the interceptable operations
//!
//! # Examples
//!
//! ```
//! use core_types::{ErrorKind, JsError, Trap};
//!
//! let error = JsError::invalid_handler("ProxyHandler.get must be a Function");
//! assert_eq!(error.kind, ErrorKind::InvalidHandlerError);
//!
//! assert_eq!(Trap::from_handler_key("enumerate"), Some(Trap::Enumerate));
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

mod error;
mod trap;

pub use error::{ErrorKind, JsError, JsResult};
pub use trap::Trap;
