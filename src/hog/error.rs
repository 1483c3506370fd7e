#[derive(Debug, thiserror::Error)]
pub enum Error {
    // --------------------------------- startup errors --------------------------------------------
    #[error("register SIGTERM handler: {0}")]
    SignalRegister(std::io::Error),
    #[error("invalid hog max: {0}")]
    InvalidCeiling(String),

    // --------------------------------- output errors ---------------------------------------------
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Process exit status reported for this error.
    pub fn exit_code(&self) -> i32 {
        1
    }
}

#[macro_export]
macro_rules! _error {
    ($log_fn: path, $res: expr) => {
        match $res {
            Ok(value) => Some(value),
            Err(e) => {
                $log_fn!(target: "memhog", "{:#}", e);
                None
            }
        }
    };
    ($log_fn: path, $res: expr, $msg: tt) => {
        match $res {
            Ok(value) => Some(value),
            Err(e) => {
                $log_fn!(target: "memhog", concat!($msg, " {:#}"), e);
                None
            }
        }
    };
}

/// Transforms `Result` into `Option` and logs an error if it occurs.
#[macro_export]
macro_rules! weak_error {
    ($res: expr) => {
        $crate::_error!(log::warn, $res)
    };
    ($res: expr, $msg: tt) => {
        $crate::_error!(log::warn, $res, $msg)
    };
}

/// Transforms `Result` into `Option` and put error into debug logs if it occurs.
#[macro_export]
macro_rules! muted_error {
    ($res: expr) => {
        $crate::_error!(log::debug, $res)
    };
    ($res: expr, $msg: tt) => {
        $crate::_error!(log::debug, $res, $msg)
    };
}
