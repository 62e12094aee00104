//! Request descriptor types.
//!
//! # Design
//! A `RequestDescriptor` is plain data: the caller fills it in, hands it to a
//! `TransportSession`, and never sees sockets or wire bytes. All fields use
//! owned types so descriptors can be built from prompts, JSON files, or test
//! vectors without lifetime concerns.

use std::fmt;

use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Port used when a descriptor leaves `port` unset (or sets it to 0).
pub const DEFAULT_PORT: u16 = 80;

/// Ordered header mapping.
///
/// Names are unique and compared exactly (case-sensitive). Inserting an
/// existing name replaces its value but keeps its original position, so the
/// serialized order is the order in which names were first inserted.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Headers {
    entries: Vec<(String, String)>,
}

impl Headers {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or overwrite `name`. Returns the previous value, if any.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<String>) -> Option<String> {
        let name = name.into();
        let value = value.into();
        match self.entries.iter_mut().find(|(k, _)| *k == name) {
            Some((_, existing)) => Some(std::mem::replace(existing, value)),
            None => {
                self.entries.push((name, value));
                None
            }
        }
    }

    pub fn get(&self, name: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> Extend<(K, V)> for Headers {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (name, value) in iter {
            self.insert(name, value);
        }
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Headers {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut headers = Headers::new();
        headers.extend(iter);
        headers
    }
}

impl Serialize for Headers {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (name, value) in &self.entries {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Headers {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        struct HeadersVisitor;

        impl<'de> Visitor<'de> for HeadersVisitor {
            type Value = Headers;

            fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str("a map of header names to string values")
            }

            fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Headers, A::Error> {
                let mut headers = Headers::new();
                while let Some((name, value)) = access.next_entry::<String, String>()? {
                    headers.insert(name, value);
                }
                Ok(headers)
            }
        }

        deserializer.deserialize_map(HeadersVisitor)
    }
}

/// Everything needed to send one HTTP/1.1 request.
///
/// `body` distinguishes "no body" (`None`, no `Content-Length`) from an empty
/// body (`Some("")`, `Content-Length: 0`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestDescriptor {
    pub hostname: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,
    #[serde(default)]
    pub path: String,
    pub method: String,
    #[serde(default, skip_serializing_if = "Headers::is_empty")]
    pub headers: Headers,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<String>,
}

impl RequestDescriptor {
    pub fn new(hostname: impl Into<String>, method: impl Into<String>) -> Self {
        Self {
            hostname: hostname.into(),
            port: None,
            path: String::new(),
            method: method.into(),
            headers: Headers::new(),
            body: None,
        }
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = path.into();
        self
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name, value);
        self
    }

    pub fn with_body(mut self, body: impl Into<String>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// The port actually dialed: `port`, or `DEFAULT_PORT` when unset or 0.
    pub fn effective_port(&self) -> u16 {
        self.port.filter(|p| *p != 0).unwrap_or(DEFAULT_PORT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_keeps_first_position_and_last_value() {
        let mut headers = Headers::new();
        headers.insert("A", "1");
        headers.insert("B", "2");
        assert_eq!(headers.insert("A", "3"), Some("1".to_string()));

        let pairs: Vec<_> = headers.iter().collect();
        assert_eq!(pairs, vec![("A", "3"), ("B", "2")]);
        assert_eq!(headers.len(), 2);
    }

    #[test]
    fn header_names_are_case_sensitive() {
        let headers: Headers = [("Accept", "a"), ("accept", "b")].into_iter().collect();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("Accept"), Some("a"));
        assert_eq!(headers.get("accept"), Some("b"));
        assert_eq!(headers.get("ACCEPT"), None);
    }

    #[test]
    fn effective_port_defaults_to_80() {
        let descriptor = RequestDescriptor::new("example.com", "GET");
        assert_eq!(descriptor.effective_port(), 80);
        assert_eq!(descriptor.clone().with_port(0).effective_port(), 80);
        assert_eq!(descriptor.with_port(8080).effective_port(), 8080);
    }

    #[test]
    fn builder_sets_every_field() {
        let descriptor = RequestDescriptor::new("example.com", "POST")
            .with_port(8080)
            .with_path("/submit")
            .with_header("X-A", "1")
            .with_body("a=1");
        assert_eq!(descriptor.hostname, "example.com");
        assert_eq!(descriptor.port, Some(8080));
        assert_eq!(descriptor.path, "/submit");
        assert_eq!(descriptor.method, "POST");
        assert_eq!(descriptor.headers.get("X-A"), Some("1"));
        assert_eq!(descriptor.body.as_deref(), Some("a=1"));
    }

    #[test]
    fn headers_serialize_in_insertion_order() {
        let headers: Headers = [("Zeta", "1"), ("Alpha", "2")].into_iter().collect();
        let json = serde_json::to_string(&headers).unwrap();
        assert_eq!(json, r#"{"Zeta":"1","Alpha":"2"}"#);
    }

    #[test]
    fn headers_deserialize_in_document_order() {
        let headers: Headers = serde_json::from_str(r#"{"Zeta":"1","Alpha":"2"}"#).unwrap();
        let names: Vec<_> = headers.iter().map(|(k, _)| k).collect();
        assert_eq!(names, vec!["Zeta", "Alpha"]);
    }

    #[test]
    fn headers_reject_non_string_values() {
        let result: Result<Headers, _> = serde_json::from_str(r#"{"X":1}"#);
        assert!(result.is_err());
    }

    #[test]
    fn descriptor_defaults_optional_fields() {
        let descriptor: RequestDescriptor =
            serde_json::from_str(r#"{"hostname":"example.com","method":"GET"}"#).unwrap();
        assert_eq!(descriptor, RequestDescriptor::new("example.com", "GET"));
    }

    #[test]
    fn descriptor_keeps_empty_body_distinct_from_none() {
        let descriptor: RequestDescriptor =
            serde_json::from_str(r#"{"hostname":"h","method":"POST","body":""}"#).unwrap();
        assert_eq!(descriptor.body.as_deref(), Some(""));
    }

    #[test]
    fn descriptor_serialization_skips_unset_fields() {
        let json = serde_json::to_value(RequestDescriptor::new("example.com", "GET")).unwrap();
        assert!(json.get("port").is_none());
        assert!(json.get("headers").is_none());
        assert!(json.get("body").is_none());
        assert_eq!(json["path"], "");
    }
}
