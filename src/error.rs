use core::fmt;

/// Possible errors from the DHT11 driver.
#[derive(Debug, PartialEq, Eq)]
pub enum DhtError<E> {
    /// Timed out waiting for a pin state change.
    Timeout,
    /// The sensor did not pull the line low after the start signal.
    NoResponse,
    /// Checksum did not match the received data.
    ChecksumMismatch,
    /// Error from the GPIO pin (input/output).
    PinError(E),
}

impl<E> DhtError<E> {
    /// Collapses the error into the flat [`Status`] code stored on the driver.
    pub fn status(&self) -> Status {
        match self {
            DhtError::Timeout => Status::Timeout,
            DhtError::NoResponse => Status::NoResponse,
            DhtError::ChecksumMismatch => Status::ChecksumMismatch,
            DhtError::PinError(_) => Status::PinFault,
        }
    }
}

impl<E> From<E> for DhtError<E> {
    fn from(value: E) -> Self {
        Self::PinError(value)
    }
}

impl<E: fmt::Debug> fmt::Display for DhtError<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DhtError::PinError(e) => write!(f, "{}: {e:?}", Status::PinFault),
            other => fmt::Display::fmt(&other.status(), f),
        }
    }
}

/// Outcome of the most recent transaction, as stored on the driver handle.
///
/// The ordinals are stable; new codes are only ever appended.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum Status {
    /// Transaction succeeded and the stored reading was updated.
    Ok = 0,
    /// A required line transition did not occur within the timeout window.
    Timeout = 1,
    /// The sensor did not acknowledge the start signal.
    NoResponse = 2,
    /// All 40 bits were sampled but the checksum byte disagrees.
    ChecksumMismatch = 3,
    /// The GPIO driver reported an error.
    PinFault = 4,
}

impl Status {
    /// Number of status codes.
    ///
    /// Always one past the ordinal of the last variant; see [`Status::ordinal`].
    pub const COUNT: usize = Status::PinFault.ordinal() + 1;

    /// Every status code, in ordinal order.
    pub const ALL: [Status; Status::COUNT] = [
        Status::Ok,
        Status::Timeout,
        Status::NoResponse,
        Status::ChecksumMismatch,
        Status::PinFault,
    ];

    /// Stable position of this status in [`Status::ALL`] and the message table.
    ///
    /// New variants take the next free ordinal and become the new last
    /// variant in [`Status::COUNT`].
    pub const fn ordinal(self) -> usize {
        match self {
            Status::Ok => 0,
            Status::Timeout => 1,
            Status::NoResponse => 2,
            Status::ChecksumMismatch => 3,
            Status::PinFault => 4,
        }
    }

    /// Returns the status with the given ordinal, if there is one.
    pub const fn from_ordinal(ordinal: u8) -> Option<Status> {
        if (ordinal as usize) < Self::COUNT {
            Some(Self::ALL[ordinal as usize])
        } else {
            None
        }
    }

    /// Human-readable message for this status.
    pub const fn message(self) -> &'static str {
        match self {
            Status::Ok => "OK",
            Status::Timeout => "TIMEOUT",
            Status::NoResponse => "ERROR",
            Status::ChecksumMismatch => "CHECKSUM MISMATCH",
            Status::PinFault => "PIN FAULT",
        }
    }

    /// Returns `true` for [`Status::Ok`].
    pub const fn is_ok(self) -> bool {
        matches!(self, Status::Ok)
    }
}

// `ALL` lists every status at its own ordinal, and no ordinal reaches past `COUNT`.
const _: () = {
    let mut i = 0;
    while i < Status::COUNT {
        assert!(Status::ALL[i].ordinal() == i);
        assert!(Status::ALL[i] as usize == i);
        i += 1;
    }
};

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Looks up the human-readable message for `status`.
pub const fn error_message(status: Status) -> &'static str {
    status.message()
}
