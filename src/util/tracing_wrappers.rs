// Copyright (c) the DCT block codec authors. All rights reserved.
//
// Use of this source code is governed by a BSD-style
// license that can be found in the LICENSE file.

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace, warn};

// Borrows every field value of an event so that variables only used for
// logging still count as used.
#[cfg(not(feature = "tracing"))]
macro_rules! noop_fields {
    () => {};
    ($name:ident = ?$value:expr $(, $($rest:tt)*)?) => {
        let _ = &$value;
        $($crate::util::tracing_wrappers::noop_fields!($($rest)*);)?
    };
    ($name:ident = %$value:expr $(, $($rest:tt)*)?) => {
        let _ = &$value;
        $($crate::util::tracing_wrappers::noop_fields!($($rest)*);)?
    };
    ($name:ident = $value:expr $(, $($rest:tt)*)?) => {
        let _ = &$value;
        $($crate::util::tracing_wrappers::noop_fields!($($rest)*);)?
    };
    (?$value:ident $(, $($rest:tt)*)?) => {
        let _ = &$value;
        $($crate::util::tracing_wrappers::noop_fields!($($rest)*);)?
    };
    (%$value:ident $(, $($rest:tt)*)?) => {
        let _ = &$value;
        $($crate::util::tracing_wrappers::noop_fields!($($rest)*);)?
    };
    ($value:ident $(, $($rest:tt)*)?) => {
        let _ = &$value;
        $($crate::util::tracing_wrappers::noop_fields!($($rest)*);)?
    };
    ($message:literal $(, $arg:expr)* $(,)?) => {
        let _ = ($(&$arg,)*);
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! noop_debug {
    ($($arg:tt)*) => {{
        $crate::util::tracing_wrappers::noop_fields!($($arg)*);
    }};
}

#[cfg(not(feature = "tracing"))]
macro_rules! noop_trace {
    ($($arg:tt)*) => {{
        $crate::util::tracing_wrappers::noop_fields!($($arg)*);
    }};
}

#[cfg(not(feature = "tracing"))]
macro_rules! noop_warn {
    ($($arg:tt)*) => {{
        $crate::util::tracing_wrappers::noop_fields!($($arg)*);
    }};
}

#[cfg(not(feature = "tracing"))]
#[allow(unused_imports)]
pub(crate) use {noop_debug as debug, noop_fields, noop_trace as trace, noop_warn as warn};

#[cfg(all(test, not(feature = "tracing")))]
mod test {
    use test_log::test;

    use super::*;

    #[test]
    fn events_accept_tracing_field_syntax() {
        let index = 3usize;
        let err = "failed";
        let marker = Some(0xd9u8);
        let pos = 7usize;
        debug!(index, "plain field");
        trace!(?marker, pos = pos + 1, "debug and assigned fields");
        warn!(%err, "display field");
        debug!(pos = pos, marker = ?marker, "assigned debug field");
        trace!("message only");
        warn!("message with {} argument", index);
    }
}
