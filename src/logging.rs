//! Logging for the audio bindings.
//!
//! Everything goes through the `log` facade; the host application installs
//! whatever logger it wants. `LogLevel` keeps the integer levels the C
//! surface passes in.

/// Log levels matching the C enum
#[repr(i32)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Nothing = 0,
    User = 1,
    Error = 2,
    Warning = 3,
    Info = 4,
    Debug = 5,
    All = 6,
}

impl LogLevel {
    /// Create a LogLevel from an integer
    pub fn from_i32(level: i32) -> Self {
        match level {
            0 => LogLevel::Nothing,
            1 => LogLevel::User,
            2 => LogLevel::Error,
            3 => LogLevel::Warning,
            4 => LogLevel::Info,
            5 => LogLevel::Debug,
            6 => LogLevel::All,
            _ => LogLevel::Info,
        }
    }

    /// Get the integer representation for the C interface
    pub fn as_i32(&self) -> i32 {
        *self as i32
    }

    pub fn to_filter(self) -> log::LevelFilter {
        match self {
            LogLevel::Nothing => log::LevelFilter::Off,
            LogLevel::User | LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warning => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::All => log::LevelFilter::Trace,
        }
    }
}

/// Cap the global log level. Installing a logger is up to the host.
pub fn init_logging(level: LogLevel) {
    log::set_max_level(level.to_filter());
}

/// Convenience macro for errors
#[macro_export]
macro_rules! log_error {
    ($($arg:tt)*) => {
        $crate::__log::error!(target: "oal", $($arg)*)
    };
}

/// Convenience macro for warnings
#[macro_export]
macro_rules! log_warning {
    ($($arg:tt)*) => {
        $crate::__log::warn!(target: "oal", $($arg)*)
    };
}

/// Convenience macro for info messages
#[macro_export]
macro_rules! log_info {
    ($($arg:tt)*) => {
        $crate::__log::info!(target: "oal", $($arg)*)
    };
}

/// Convenience macro for debug messages
#[macro_export]
macro_rules! log_debug {
    ($($arg:tt)*) => {
        $crate::__log::debug!(target: "oal", $($arg)*)
    };
}
