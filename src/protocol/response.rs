//! Response definitions
//!
//! Represents the fixed-layout envelope returned for every handled request.

/// Maximum payload carried by a response
pub const MAX_DATA_LEN: usize = 100;

/// Response status byte: 0 is success, negative is failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Status(i8);

impl Status {
    pub const OK: Status = Status(0);
    pub const FAILURE: Status = Status(-1);

    /// Wrap a raw status code read from the wire
    pub fn from_code(code: i8) -> Self {
        Status(code)
    }

    /// The raw status code
    pub fn code(self) -> i8 {
        self.0
    }

    pub fn is_success(self) -> bool {
        self.0 == 0
    }
}

/// A response to send to the client
///
/// The payload never exceeds [`MAX_DATA_LEN`]; constructors truncate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    status: Status,
    data: Vec<u8>,
}

impl Response {
    /// Create a response, truncating `data` to the envelope limit
    pub fn new(status: Status, data: impl Into<Vec<u8>>) -> Self {
        let mut data = data.into();
        data.truncate(MAX_DATA_LEN);
        Self { status, data }
    }

    /// Create a success response carrying `data`
    pub fn ok(data: impl Into<Vec<u8>>) -> Self {
        Self::new(Status::OK, data)
    }

    /// Create a success response with no payload
    pub fn ok_empty() -> Self {
        Self::new(Status::OK, Vec::new())
    }

    /// Create a failure response (`status = -1`, empty payload)
    pub fn failure() -> Self {
        Self::new(Status::FAILURE, Vec::new())
    }

    pub fn status(&self) -> Status {
        self.status
    }

    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Payload bytes
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Number of payload bytes, as carried in the length field
    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn into_data(self) -> Vec<u8> {
        self.data
    }
}
