use std::fmt;

#[derive(Debug)]
pub enum Error {
    UnknownStrategy(String),
    UnknownPrescription(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::UnknownStrategy(name) => write!(f, "unknown strategy: {name}"),
            Error::UnknownPrescription(name) => write!(f, "unknown prescription: {name}"),
        }
    }
}

impl std::error::Error for Error {}

pub type Result<T> = std::result::Result<T, Error>;
