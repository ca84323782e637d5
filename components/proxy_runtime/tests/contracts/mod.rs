//! Contract tests for proxy_runtime
//!
//! These tests exercise the public surface end to end: handler objects,
//! default fallbacks, prototype integration, locking and invocation.

mod support;

mod inheritance_tests;
mod locking_tests;
mod native_handler_tests;
