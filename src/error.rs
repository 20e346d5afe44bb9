use std::convert::Infallible;
use std::error::Error as StdError;
use std::fmt::Result as FmtResult;
use std::fmt::{Display, Formatter};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::result::Result as StdResult;

type BoxedSource = Option<Box<dyn StdError + Send + Sync>>;

/// Possible errors that can occur while decoding or encoding Photosynth data.
#[derive(Debug)]
#[non_exhaustive]
pub enum Error {
    /// The data is invalid and does not conform with the expected format.
    Invalid { reason: String, source: BoxedSource },
    /// Something went wrong while reading data.
    /// Typically this is caused by an IO error outside the library.
    Read { reason: String, source: BoxedSource },
    /// Something went wrong while writing data.
    Write { reason: String, source: BoxedSource },
    /// An unexpected internal issue occured.
    Internal { reason: String, source: BoxedSource },
    /// A binary point cloud fragment carries an unsupported version number.
    Version { major: u16, minor: u16 },
    /// The input ended in the middle of a record.
    Truncated { reason: String },
    /// The vector part of a camera quaternion has a squared norm above one.
    Quaternion { x: f64, y: f64, z: f64 },
    /// A required input file does not exist.
    MissingFile { path: PathBuf },
    /// A PLY header could not be parsed.
    Header { reason: String },
}

impl Error {
    /// Creates an invalid data error from text.
    pub fn invalid<T>(reason: impl Into<String>) -> Result<T> {
        Err(Error::Invalid {
            reason: reason.into(),
            source: None,
        })
    }

    /// Creates an internal error from text.
    pub fn internal<T>(reason: impl Into<String>) -> Result<T> {
        Err(Error::Internal {
            reason: reason.into(),
            source: None,
        })
    }

    /// Creates a malformed header error from text.
    pub fn header<T>(reason: impl Into<String>) -> Result<T> {
        Err(Error::Header {
            reason: reason.into(),
        })
    }

    /// Returns true for errors caused by the contents of a single fragment, camera or file.
    /// The conversion pipeline logs these and continues with a gap.
    /// IO failures and internal errors are not recoverable.
    pub fn is_recoverable(&self) -> bool {
        !matches!(
            self,
            Error::Read { .. } | Error::Write { .. } | Error::Internal { .. }
        )
    }
}

/// Maps a failed file access to `Error::MissingFile` or `Error::Read`.
pub(crate) fn missing_or_read(path: &Path, error: std::io::Error) -> Error {
    if error.kind() == ErrorKind::NotFound {
        Error::MissingFile {
            path: path.to_path_buf(),
        }
    } else {
        Error::Read {
            reason: format!("Unable to read {}", path.display()),
            source: Some(Box::new(error)),
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter) -> FmtResult {
        match self {
            Error::Invalid { reason, .. } => write!(f, "Invalid data: {reason}"),
            Error::Read { reason, .. } => write!(f, "Failed to read: {reason}"),
            Error::Write { reason, .. } => write!(f, "Failed to write: {reason}"),
            Error::Internal { reason, .. } => write!(f, "Internal error: {reason}"),
            Error::Version { major, minor } => {
                write!(f, "Unsupported fragment version {major}.{minor}")
            }
            Error::Truncated { reason } => write!(f, "Unexpected end of data: {reason}"),
            Error::Quaternion { x, y, z } => write!(
                f,
                "Quaternion vector part ({x}, {y}, {z}) does not describe a rotation"
            ),
            Error::MissingFile { path } => write!(f, "Missing file: {}", path.display()),
            Error::Header { reason } => write!(f, "Malformed PLY header: {reason}"),
        }
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match self {
            Error::Invalid { source, .. }
            | Error::Read { source, .. }
            | Error::Write { source, .. }
            | Error::Internal { source, .. } => source
                .as_ref()
                .map(|s| s.as_ref() as &(dyn StdError + 'static)),
            _ => None,
        }
    }
}

pub type Result<T> = StdResult<T, Error>;

/// Helper trait for types that can be converted into an Error.
pub trait Converter<T, E> {
    fn read_err<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    fn write_err<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    fn invalid_err<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;

    fn internal_err<C>(self, context: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static;
}

/// Create an library Error from std Error instances.
impl<T, E> Converter<T, E> for StdResult<T, E>
where
    E: StdError + Send + Sync + 'static,
{
    fn read_err<C>(self, reason: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        match self {
            Ok(ok) => Ok(ok),
            Err(error) => {
                let eof = (&error as &(dyn StdError + 'static))
                    .downcast_ref::<std::io::Error>()
                    .is_some_and(|e| e.kind() == ErrorKind::UnexpectedEof);
                if eof {
                    Err(Error::Truncated {
                        reason: reason.to_string(),
                    })
                } else {
                    Err(Error::Read {
                        reason: reason.to_string(),
                        source: Some(Box::new(error)),
                    })
                }
            }
        }
    }

    fn write_err<C>(self, reason: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        match self {
            Ok(ok) => Ok(ok),
            Err(error) => Err(Error::Write {
                reason: reason.to_string(),
                source: Some(Box::new(error)),
            }),
        }
    }

    fn invalid_err<C>(self, reason: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        match self {
            Ok(ok) => Ok(ok),
            Err(error) => Err(Error::Invalid {
                reason: reason.to_string(),
                source: Some(Box::new(error)),
            }),
        }
    }

    fn internal_err<C>(self, reason: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        match self {
            Ok(ok) => Ok(ok),
            Err(error) => Err(Error::Internal {
                reason: reason.to_string(),
                source: Some(Box::new(error)),
            }),
        }
    }
}

/// Create an library Error from Option instances.
impl<T> Converter<T, Infallible> for Option<T> {
    fn read_err<C>(self, reason: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        match self {
            Some(ok) => Ok(ok),
            None => Err(Error::Read {
                reason: reason.to_string(),
                source: None,
            }),
        }
    }

    fn write_err<C>(self, reason: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        match self {
            Some(ok) => Ok(ok),
            None => Err(Error::Write {
                reason: reason.to_string(),
                source: None,
            }),
        }
    }

    fn invalid_err<C>(self, reason: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        match self {
            Some(ok) => Ok(ok),
            None => Err(Error::Invalid {
                reason: reason.to_string(),
                source: None,
            }),
        }
    }

    fn internal_err<C>(self, reason: C) -> Result<T>
    where
        C: Display + Send + Sync + 'static,
    {
        match self {
            Some(ok) => Ok(ok),
            None => Err(Error::Internal {
                reason: reason.to_string(),
                source: None,
            }),
        }
    }
}
