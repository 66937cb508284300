// Copyright 2026 Open Nexus OS Contributors
// SPDX-License-Identifier: Apache-2.0

//! Fatal contract assertions for the port layer.
//!
//! `port_assert!` is active only in builds with `debug_assertions`; release
//! builds compile the check out and the condition is never evaluated. A failed
//! assertion is logged through the diagnostics facade and then panics.

/// Emits the failure message and panics.
#[cold]
#[track_caller]
pub fn report_failure(message: &str) -> ! {
    log_error!(target: "assert", "PORT: fail: {}", message);
    panic!("port assertion failed: {}", message);
}

#[cold]
#[track_caller]
pub fn report_failure_fmt(args: core::fmt::Arguments<'_>) -> ! {
    log_error!(target: "assert", "PORT: fail: {}", args);
    panic!("port assertion failed: {}", args);
}

/// Asserts a port contract in debug builds.
#[macro_export]
macro_rules! port_assert {
    ($cond:expr $(,)?) => {
        if cfg!(debug_assertions) && !$cond {
            $crate::assert::report_failure(concat!("assertion failed: ", stringify!($cond)));
        }
    };
    ($cond:expr, $($arg:tt)+) => {
        if cfg!(debug_assertions) && !$cond {
            $crate::assert::report_failure_fmt(format_args!($($arg)+));
        }
    };
}
