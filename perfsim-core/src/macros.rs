#[macro_export]
/// Generates a String similar to output of `dbg` but without printing
macro_rules! format_dbg {
    ($dbg_expr:expr) => {
        format!(
            "[{}:{}] {}: {:?}",
            file!(),
            line!(),
            stringify!($dbg_expr),
            $dbg_expr
        )
    };
    () => {
        format!("[{}:{}]", file!(), line!())
    };
}

#[macro_export]
/// Logs at `warn` level when the `logging` feature is enabled, otherwise
/// compiles to nothing
macro_rules! log_warn {
    ($($arg:tt)+) => {
        #[cfg(feature = "logging")]
        log::warn!($($arg)+);
    };
}

#[macro_export]
/// Logs at `debug` level when the `logging` feature is enabled, otherwise
/// compiles to nothing
macro_rules! log_debug {
    ($($arg:tt)+) => {
        #[cfg(feature = "logging")]
        log::debug!($($arg)+);
    };
}
