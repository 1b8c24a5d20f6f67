use thiserror::Error;

/// Reasons a raw response frame is rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame must be 32 bytes, got {0}")]
    FrameTooShort(usize),
    #[error("frame does not start with 0x42 0x4D")]
    BadSync,
    #[error("checksum mismatch: calculated {calculated:#06X}, received {received:#06X}")]
    ChecksumMismatch { calculated: u16, received: u16 },
}

/// Failures reported by a [`Transport`](crate::Transport).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum TransportError {
    #[error("serial i/o failure")]
    Io,
    #[error("receive deadline elapsed")]
    Timeout,
}

/// Why a single receive attempt produced no frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ReadFailure {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Transport(#[from] TransportError),
}

/// Everything a session operation can fail with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    #[error(transparent)]
    Frame(#[from] FrameError),
    #[error(transparent)]
    Transport(#[from] TransportError),
    #[error("unrecognized command mode")]
    InvalidMode,
    #[error("no valid frame after {attempts} read attempts, last failure: {last}")]
    ReadAttemptsExhausted { attempts: u8, last: ReadFailure },
    #[error("reading sink rejected the record")]
    RecordFailure,
}

impl Error {
    /// Malformed frames and invalid commands: discard and retry the cycle.
    ///
    /// A read that ran out of attempts is classified by its last failure.
    pub fn is_protocol(&self) -> bool {
        matches!(
            self,
            Error::Frame(_)
                | Error::InvalidMode
                | Error::ReadAttemptsExhausted {
                    last: ReadFailure::Frame(_),
                    ..
                }
        )
    }

    /// I/O problems and receive deadlines.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Error::Transport(_)
                | Error::ReadAttemptsExhausted {
                    last: ReadFailure::Transport(_),
                    ..
                }
        )
    }
}

impl From<ReadFailure> for Error {
    fn from(failure: ReadFailure) -> Self {
        match failure {
            ReadFailure::Frame(e) => Error::Frame(e),
            ReadFailure::Transport(e) => Error::Transport(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_classification() {
        assert!(Error::from(FrameError::BadSync).is_protocol());
        assert!(Error::InvalidMode.is_protocol());
        assert!(Error::from(TransportError::Timeout).is_transport());
        assert!(!Error::RecordFailure.is_protocol());
        assert!(!Error::RecordFailure.is_transport());
    }

    #[test]
    fn test_exhausted_reads_follow_last_failure() {
        let checksum = Error::ReadAttemptsExhausted {
            attempts: 5,
            last: FrameError::ChecksumMismatch {
                calculated: 1,
                received: 2,
            }
            .into(),
        };
        assert!(checksum.is_protocol());
        assert!(!checksum.is_transport());

        let timeout = Error::ReadAttemptsExhausted {
            attempts: 5,
            last: TransportError::Timeout.into(),
        };
        assert!(timeout.is_transport());
        assert!(!timeout.is_protocol());
    }
}
