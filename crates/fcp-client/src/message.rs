//! FCP request and response messages
//!
//! Messages are treated as opaque header maps with an optional attached
//! payload. Framing them onto the wire is the connection's job; this module
//! only knows the verbs, header names and response types the high-level
//! operations rely on.

use bytes::Bytes;
use std::collections::HashMap;
use std::fmt;
use std::num::ParseIntError;

/// Header names used by the high-level operations
pub mod headers {
    pub const URI: &str = "URI";
    pub const RETURN_TYPE: &str = "ReturnType";
    pub const PERSISTENCE: &str = "Persistence";
    pub const IDENTIFIER: &str = "Identifier";
    pub const CODE: &str = "Code";
    pub const CODE_DESCRIPTION: &str = "CodeDescription";
    pub const REDIRECT_URI: &str = "RedirectURI";
    pub const INSERT_URI: &str = "InsertURI";
    pub const REQUEST_URI: &str = "RequestURI";
    pub const DATA_LENGTH: &str = "DataLength";

    /// `ReturnType` value asking the node to send the data over the connection
    pub const RETURN_DIRECT: &str = "direct";

    /// `Persistence` value tying the request to the connection's lifetime
    pub const PERSIST_CONNECTION: &str = "connection";
}

/// Response message types
pub mod types {
    pub const ALL_DATA: &str = "AllData";
    pub const GET_FAILED: &str = "GetFailed";
    pub const DATA_FOUND: &str = "DataFound";
    pub const PUT_SUCCESSFUL: &str = "PutSuccessful";
    pub const PUT_FAILED: &str = "PutFailed";
    pub const URI_GENERATED: &str = "URIGenerated";
    pub const SSK_KEYPAIR: &str = "SSKKeypair";
    pub const SIMPLE_PROGRESS: &str = "SimpleProgress";
    pub const PROTOCOL_ERROR: &str = "ProtocolError";
    pub const IDENTIFIER_COLLISION: &str = "IdentifierCollision";
}

/// Messages that end a request. Anything else correlated to a request is a
/// status update.
const TERMINAL_TYPES: &[&str] = &[
    types::ALL_DATA,
    types::GET_FAILED,
    types::PUT_SUCCESSFUL,
    types::PUT_FAILED,
    types::SSK_KEYPAIR,
    types::PROTOCOL_ERROR,
    types::IDENTIFIER_COLLISION,
];

/// Request verbs understood by the node
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verb {
    /// Fetch the content stored under a name
    ClientGet,
    /// Generate a fresh signed-subspace key pair
    GenerateSsk,
    /// Insert content under a name
    ClientPut,
}

impl Verb {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ClientGet => "ClientGet",
            Self::GenerateSsk => "GenerateSSK",
            Self::ClientPut => "ClientPut",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Outgoing message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Request {
    verb: Verb,
    headers: HashMap<String, String>,
    data: Option<Bytes>,
}

impl Request {
    pub fn new(verb: Verb) -> Self {
        Self {
            verb,
            headers: HashMap::new(),
            data: None,
        }
    }

    pub fn verb(&self) -> Verb {
        self.verb
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    pub fn set_header(&mut self, name: impl Into<String>, value: impl Into<String>) -> &mut Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Attach a payload, replacing any previous one
    pub fn set_data(&mut self, data: Bytes) -> &mut Self {
        self.headers
            .insert(headers::DATA_LENGTH.to_string(), data.len().to_string());
        self.data = Some(data);
        self
    }

    pub fn data(&self) -> Option<&Bytes> {
        self.data.as_ref()
    }
}

/// Incoming message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Response {
    message_type: String,
    headers: HashMap<String, String>,
    data: Option<Bytes>,
}

impl Response {
    pub fn new(message_type: impl Into<String>) -> Self {
        Self {
            message_type: message_type.into(),
            headers: HashMap::new(),
            data: None,
        }
    }

    #[must_use]
    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    #[must_use]
    pub fn with_data(mut self, data: impl Into<Bytes>) -> Self {
        self.data = Some(data.into());
        self
    }

    pub fn message_type(&self) -> &str {
        &self.message_type
    }

    /// Case-insensitive type comparison, matching how nodes are known to vary
    /// the capitalisation of message names.
    pub fn is_type(&self, message_type: &str) -> bool {
        self.message_type.eq_ignore_ascii_case(message_type)
    }

    /// Whether this message ends its request
    pub fn is_terminal(&self) -> bool {
        TERMINAL_TYPES.iter().any(|t| self.is_type(t))
    }

    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).map(String::as_str)
    }

    pub fn headers(&self) -> &HashMap<String, String> {
        &self.headers
    }

    /// Numeric failure code, if the response carries one
    pub fn code(&self) -> Option<Result<u32, ParseIntError>> {
        self.header(headers::CODE).map(|c| c.trim().parse())
    }

    pub fn data(&self) -> Option<&Bytes> {
        self.data.as_ref()
    }

    /// Take ownership of the attached payload
    pub fn into_data(self) -> Option<Bytes> {
        self.data
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn test_progress_messages_are_not_terminal() {
        for t in [types::SIMPLE_PROGRESS, types::DATA_FOUND, types::URI_GENERATED] {
            assert!(!Response::new(t).is_terminal(), "{t} should not be terminal");
        }
        for t in TERMINAL_TYPES {
            assert!(Response::new(*t).is_terminal());
        }
    }

    #[test]
    fn test_type_matching_ignores_case() {
        let response = Response::new("alldata");
        assert!(response.is_type(types::ALL_DATA));
        assert!(response.is_terminal());
    }

    #[test]
    fn test_code_parsing() {
        assert!(Response::new(types::GET_FAILED).code().is_none());

        let response = Response::new(types::GET_FAILED).with_header(headers::CODE, " 27 ");
        assert_eq!(response.code().expect("code present").expect("numeric"), 27);

        let response = Response::new(types::GET_FAILED).with_header(headers::CODE, "moved");
        assert!(response.code().expect("code present").is_err());
    }

    #[test]
    fn test_set_data_records_length() {
        let mut request = Request::new(Verb::ClientPut);
        request.set_data(Bytes::from_static(b"hello"));
        assert_eq!(request.header(headers::DATA_LENGTH), Some("5"));
        assert_eq!(request.data().map(Bytes::len), Some(5));
    }
}
