//! Browser console diagnostics.
//!
//! On wasm32 the macros forward to `web_sys::console`; on native targets the
//! arguments are type-checked and discarded so the pure modules stay testable.

#[cfg(target_arch = "wasm32")]
#[macro_export]
macro_rules! console_log {
    ($($arg:tt)*) => {
        ::web_sys::console::log_1(&format!($($arg)*).into())
    };
}

#[cfg(not(target_arch = "wasm32"))]
#[macro_export]
macro_rules! console_log {
    ($($arg:tt)*) => {
        if false {
            let _ = format!($($arg)*);
        }
    };
}

#[cfg(target_arch = "wasm32")]
#[macro_export]
macro_rules! console_warn {
    ($($arg:tt)*) => {
        ::web_sys::console::warn_1(&format!($($arg)*).into())
    };
}

#[cfg(not(target_arch = "wasm32"))]
#[macro_export]
macro_rules! console_warn {
    ($($arg:tt)*) => {
        if false {
            let _ = format!($($arg)*);
        }
    };
}

#[cfg(target_arch = "wasm32")]
#[macro_export]
macro_rules! console_error {
    ($($arg:tt)*) => {
        ::web_sys::console::error_1(&format!($($arg)*).into())
    };
}

#[cfg(not(target_arch = "wasm32"))]
#[macro_export]
macro_rules! console_error {
    ($($arg:tt)*) => {
        if false {
            let _ = format!($($arg)*);
        }
    };
}
