//! Results of high-level operations
//!
//! Insert failures are ordinary values rather than errors so callers can
//! branch on collision versus other causes without error-driven control flow.

use std::fmt;

use crate::message::{Response, headers, types};

/// A freshly generated signed-subspace key pair
#[derive(Clone, PartialEq, Eq)]
pub struct KeyPair {
    public_key: String,
    private_key: String,
}

impl KeyPair {
    pub fn new(public_key: impl Into<String>, private_key: impl Into<String>) -> Self {
        Self {
            public_key: public_key.into(),
            private_key: private_key.into(),
        }
    }

    /// The request URI, used to fetch content inserted under this pair
    pub fn public_key(&self) -> &str {
        &self.public_key
    }

    /// The insert URI, needed to write under this pair
    pub fn private_key(&self) -> &str {
        &self.private_key
    }
}

impl fmt::Debug for KeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("KeyPair")
            .field("public_key", &self.public_key)
            .field("private_key", &"<redacted>")
            .finish()
    }
}

/// Cause codes carried by a failed insert
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InsertErrorCode {
    InvalidUri,
    BucketError,
    InternalError,
    RejectedOverload,
    RouteNotFound,
    FatalErrorsInBlocks,
    TooManyRetriesInBlocks,
    RouteReallyNotFound,
    /// Different content is already stored under the name
    Collision,
    Cancelled,
    Other(u32),
    /// The response carried no readable code
    Unknown,
}

impl InsertErrorCode {
    pub const fn from_code(code: u32) -> Self {
        match code {
            1 => Self::InvalidUri,
            2 => Self::BucketError,
            3 => Self::InternalError,
            4 => Self::RejectedOverload,
            5 => Self::RouteNotFound,
            6 => Self::FatalErrorsInBlocks,
            7 => Self::TooManyRetriesInBlocks,
            8 => Self::RouteReallyNotFound,
            9 => Self::Collision,
            10 => Self::Cancelled,
            other => Self::Other(other),
        }
    }

    pub const fn code(self) -> Option<u32> {
        match self {
            Self::InvalidUri => Some(1),
            Self::BucketError => Some(2),
            Self::InternalError => Some(3),
            Self::RejectedOverload => Some(4),
            Self::RouteNotFound => Some(5),
            Self::FatalErrorsInBlocks => Some(6),
            Self::TooManyRetriesInBlocks => Some(7),
            Self::RouteReallyNotFound => Some(8),
            Self::Collision => Some(9),
            Self::Cancelled => Some(10),
            Self::Other(code) => Some(code),
            Self::Unknown => None,
        }
    }

    pub const fn is_collision(self) -> bool {
        matches!(self, Self::Collision)
    }
}

/// Details of a rejected insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertFailure {
    code: InsertErrorCode,
    message_type: String,
    description: Option<String>,
}

impl InsertFailure {
    /// Classify a non-success reply to an insert.
    ///
    /// Only `PutFailed` carries insert cause codes. Other replies such as
    /// `ProtocolError` number their codes differently and map to
    /// [`InsertErrorCode::Unknown`].
    pub fn from_response(response: &Response) -> Self {
        let code = match response.code() {
            Some(Ok(code)) if response.is_type(types::PUT_FAILED) => {
                InsertErrorCode::from_code(code)
            }
            _ => InsertErrorCode::Unknown,
        };
        Self {
            code,
            message_type: response.message_type().to_string(),
            description: response
                .header(headers::CODE_DESCRIPTION)
                .map(ToString::to_string),
        }
    }

    pub fn code(&self) -> InsertErrorCode {
        self.code
    }

    pub fn is_collision(&self) -> bool {
        self.code.is_collision()
    }

    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }
}

impl fmt::Display for InsertFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({:?})", self.message_type, self.code)?;
        if let Some(description) = &self.description {
            write!(f, ": {description}")?;
        }
        Ok(())
    }
}

/// Result of a single insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InsertOutcome {
    Success,
    Failed(InsertFailure),
}

impl InsertOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success)
    }

    pub fn failure(&self) -> Option<&InsertFailure> {
        match self {
            Self::Success => None,
            Self::Failed(failure) => Some(failure),
        }
    }
}

/// Cause codes carried by a failed fetch that the client acts on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchErrorCode {
    TooManyPathComponents,
    PermanentRedirect,
    Other(u32),
}

impl FetchErrorCode {
    pub const fn from_code(code: u32) -> Self {
        match code {
            11 => Self::TooManyPathComponents,
            27 => Self::PermanentRedirect,
            other => Self::Other(other),
        }
    }

    /// Both codes mean the node knows a replacement name for the content
    pub const fn is_redirect(self) -> bool {
        matches!(self, Self::TooManyPathComponents | Self::PermanentRedirect)
    }
}

/// A fetch the node answered with something other than data or a redirect
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchFailure {
    name: String,
    code: Option<FetchErrorCode>,
    response: Response,
}

impl FetchFailure {
    pub fn new(name: impl Into<String>, response: Response) -> Self {
        let code = response
            .code()
            .and_then(Result::ok)
            .map(FetchErrorCode::from_code);
        Self {
            name: name.into(),
            code,
            response,
        }
    }

    /// Name the failing request was issued for
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn code(&self) -> Option<FetchErrorCode> {
        self.code
    }

    pub fn description(&self) -> Option<&str> {
        self.response.header(headers::CODE_DESCRIPTION)
    }

    /// The node's original response
    pub fn response(&self) -> &Response {
        &self.response
    }

    pub fn into_response(self) -> Response {
        self.response
    }
}

impl fmt::Display for FetchFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Fetch of {} failed with {}",
            self.name,
            self.response.message_type()
        )?;
        if let Some(code) = self.response.header(headers::CODE) {
            write!(f, " (code {code})")?;
        }
        if let Some(description) = self.description() {
            write!(f, ": {description}")?;
        }
        Ok(())
    }
}

/// Why a slot insert stopped without claiming a slot
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotAbort {
    /// The node rejected the insert for a reason other than a collision
    Rejected(InsertFailure),
    /// The payload could not be read or cannot be replayed
    BadInput(String),
    /// Every slot up to the largest representable one collided
    Exhausted,
}

/// Result of a slot-allocating insert
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SlotInsertOutcome {
    /// The payload now lives at this slot
    Inserted { slot: u32 },
    /// No slot was claimed; `slot` is the last one attempted
    Aborted { slot: u32, reason: SlotAbort },
}

impl SlotInsertOutcome {
    /// The claimed slot, or `None` for the failure sentinel
    pub fn slot(&self) -> Option<u32> {
        match self {
            Self::Inserted { slot } => Some(*slot),
            Self::Aborted { .. } => None,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_code_mapping() {
        assert!(InsertErrorCode::from_code(9).is_collision());
        assert_eq!(InsertErrorCode::from_code(5), InsertErrorCode::RouteNotFound);
        assert_eq!(InsertErrorCode::from_code(42), InsertErrorCode::Other(42));
        for code in 1..=12 {
            assert_eq!(InsertErrorCode::from_code(code).code(), Some(code));
        }
        assert_eq!(InsertErrorCode::Unknown.code(), None);
    }

    #[test]
    fn test_insert_failure_from_response() {
        let response = Response::new(types::PUT_FAILED)
            .with_header(headers::CODE, "9")
            .with_header(headers::CODE_DESCRIPTION, "Insert collided");
        let failure = InsertFailure::from_response(&response);
        assert!(failure.is_collision());
        assert_eq!(failure.description(), Some("Insert collided"));
        assert_eq!(failure.to_string(), "PutFailed (Collision): Insert collided");

        let failure = InsertFailure::from_response(&Response::new(types::PROTOCOL_ERROR));
        assert_eq!(failure.code(), InsertErrorCode::Unknown);
        assert!(!failure.is_collision());
    }

    #[test]
    fn test_foreign_code_numbering_is_not_a_collision() {
        for message_type in [types::PROTOCOL_ERROR, types::IDENTIFIER_COLLISION] {
            let response = Response::new(message_type).with_header(headers::CODE, "9");
            let failure = InsertFailure::from_response(&response);
            assert_eq!(failure.code(), InsertErrorCode::Unknown);
            assert!(!failure.is_collision());
            assert_eq!(failure.message_type(), message_type);
        }
    }

    #[test]
    fn test_fetch_redirect_codes() {
        assert!(FetchErrorCode::from_code(27).is_redirect());
        assert!(FetchErrorCode::from_code(11).is_redirect());
        assert!(!FetchErrorCode::from_code(13).is_redirect());
    }

    #[test]
    fn test_fetch_failure_display() {
        let response = Response::new(types::GET_FAILED)
            .with_header(headers::CODE, "13")
            .with_header(headers::CODE_DESCRIPTION, "Data not found");
        let failure = FetchFailure::new("KSK@missing", response);
        assert_eq!(failure.code(), Some(FetchErrorCode::Other(13)));
        assert_eq!(
            failure.to_string(),
            "Fetch of KSK@missing failed with GetFailed (code 13): Data not found"
        );
    }

    #[test]
    fn test_key_pair_debug_hides_private_key() {
        let pair = KeyPair::new("SSK@public/", "SSK@secret/");
        let debug = format!("{pair:?}");
        assert!(debug.contains("SSK@public/"));
        assert!(!debug.contains("SSK@secret/"));
    }
}
