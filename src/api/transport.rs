//! The `request` primitive every resource client delegates to.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;

use crate::api::LogoError;

/// A single request/response round trip against the Logo Objects API.
///
/// `path` is relative to the API root, query string included
/// (e.g. `salesOffers/42?expandLevel=full`).
#[async_trait]
pub trait Transport: Send + Sync {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Value, LogoError>;
}

/// Decode a response body the way the API returns it
///
/// Empty bodies become `Null`, JSON is parsed, anything else
/// (XML exports, plain text) is passed through as a string.
pub fn decode_body(bytes: &[u8]) -> Value {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Value::Null;
    }
    serde_json::from_slice(bytes)
        .unwrap_or_else(|_| Value::String(String::from_utf8_lossy(bytes).into_owned()))
}

#[cfg(test)]
pub(crate) mod mock {
    use super::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// A call seen by [`RecordingTransport`].
    #[derive(Debug, Clone, PartialEq)]
    pub struct RecordedCall {
        pub method: Method,
        pub path: String,
        pub body: Option<Value>,
    }

    /// Records every call and replies with queued responses (or `Null`).
    #[derive(Debug, Default)]
    pub struct RecordingTransport {
        calls: Mutex<Vec<RecordedCall>>,
        responses: Mutex<VecDeque<Result<Value, LogoError>>>,
    }

    impl RecordingTransport {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn respond_with(self, value: Value) -> Self {
            self.responses.lock().unwrap().push_back(Ok(value));
            self
        }

        pub fn fail_with(self, error: LogoError) -> Self {
            self.responses.lock().unwrap().push_back(Err(error));
            self
        }

        pub fn calls(&self) -> Vec<RecordedCall> {
            self.calls.lock().unwrap().clone()
        }

        pub fn last_call(&self) -> RecordedCall {
            self.calls().pop().expect("no request was made")
        }
    }

    #[async_trait]
    impl Transport for RecordingTransport {
        async fn request(
            &self,
            method: Method,
            path: &str,
            body: Option<&Value>,
        ) -> Result<Value, LogoError> {
            self.calls.lock().unwrap().push(RecordedCall {
                method,
                path: path.to_string(),
                body: body.cloned(),
            });
            self.responses
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(Value::Null))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_empty_body() {
        assert_eq!(decode_body(b""), Value::Null);
        assert_eq!(decode_body(b"  \n"), Value::Null);
    }

    #[test]
    fn test_decode_json_body() {
        assert_eq!(
            decode_body(br#"{"CODE":"B-01","INTERNAL_REFERENCE":7}"#),
            json!({"CODE": "B-01", "INTERNAL_REFERENCE": 7})
        );
    }

    #[test]
    fn test_decode_xml_body_passes_through() {
        let xml = "<BANK_CREDITS><BANK_CREDIT/></BANK_CREDITS>";
        assert_eq!(decode_body(xml.as_bytes()), Value::String(xml.to_string()));
    }
}
