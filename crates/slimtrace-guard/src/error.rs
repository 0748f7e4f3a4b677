use std::fmt;

#[derive(Debug)]
pub enum Error {
    Io(std::io::Error),
    Core(slimtrace_core::Error),
    Team(slimtrace_team::Error),
    Watch(notify::Error),
    /// Another guard process already holds the lock for this session.
    LockHeld(u32),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(err) => write!(f, "io error: {err}"),
            Error::Core(err) => write!(f, "core error: {err}"),
            Error::Team(err) => write!(f, "team error: {err}"),
            Error::Watch(err) => write!(f, "watch error: {err}"),
            Error::LockHeld(pid) => write!(f, "guard already running for this session (pid {pid})"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(err) => Some(err),
            Error::Core(err) => Some(err),
            Error::Team(err) => Some(err),
            Error::Watch(err) => Some(err),
            Error::LockHeld(_) => None,
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io(err)
    }
}

impl From<slimtrace_core::Error> for Error {
    fn from(err: slimtrace_core::Error) -> Self {
        Error::Core(err)
    }
}

impl From<slimtrace_team::Error> for Error {
    fn from(err: slimtrace_team::Error) -> Self {
        Error::Team(err)
    }
}

impl From<notify::Error> for Error {
    fn from(err: notify::Error) -> Self {
        Error::Watch(err)
    }
}

pub type Result<T> = std::result::Result<T, Error>;
