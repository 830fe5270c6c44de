// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Routing of `(content-type, payload)` pairs handed over by the transport.

use super::dictionary::decode_dictionary;
use crate::dynamic::DynamicValue;
use crate::error::{BridgeError, Result};
use std::fmt;

/// Content types this subsystem accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContentType {
    /// `application/dictionary+xml`
    Dictionary,
    /// `application/xml`, passed through untouched.
    Xml,
}

impl ContentType {
    pub const DICTIONARY_XML: &'static str = "application/dictionary+xml";
    pub const XML: &'static str = "application/xml";

    /// Parse a media type. Parameters (`; charset=...`) are ignored and the
    /// comparison is case-insensitive.
    pub fn parse(content_type: &str) -> Result<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim();
        if essence.eq_ignore_ascii_case(Self::DICTIONARY_XML) {
            Ok(Self::Dictionary)
        } else if essence.eq_ignore_ascii_case(Self::XML) {
            Ok(Self::Xml)
        } else {
            Err(BridgeError::UnsupportedContentType(content_type.to_string()))
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Dictionary => Self::DICTIONARY_XML,
            Self::Xml => Self::XML,
        }
    }
}

impl fmt::Display for ContentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A routed payload.
#[derive(Debug, Clone, PartialEq)]
pub enum DecodedPayload {
    Dictionary(DynamicValue),
    Xml(String),
}

/// Route a transport payload by content type.
pub fn decode_message(content_type: &str, payload: &str, max_depth: usize) -> Result<DecodedPayload> {
    let content_type = ContentType::parse(content_type).map_err(|e| {
        log::warn!("[codec] rejecting payload: {}", e);
        e
    })?;
    match content_type {
        ContentType::Dictionary => decode_dictionary(payload, max_depth).map(DecodedPayload::Dictionary),
        ContentType::Xml => Ok(DecodedPayload::Xml(payload.to_string())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        assert_eq!(
            ContentType::parse("application/dictionary+xml").expect("dict"),
            ContentType::Dictionary
        );
        assert_eq!(
            ContentType::parse("Application/XML; charset=utf-8").expect("xml"),
            ContentType::Xml
        );
        assert!(matches!(
            ContentType::parse("application/json"),
            Err(BridgeError::UnsupportedContentType(t)) if t == "application/json"
        ));
        assert!(ContentType::parse("").is_err());
    }

    #[test]
    fn test_routing() {
        let payload = r#"<dictionary><entry key="n" type="System.Int64">7</entry></dictionary>"#;
        match decode_message("application/dictionary+xml", payload, 4).expect("dict") {
            DecodedPayload::Dictionary(value) => {
                assert_eq!(value.get_field("n"), Some(&DynamicValue::I64(7)));
            }
            other => panic!("expected dictionary, got {:?}", other),
        }

        assert_eq!(
            decode_message("application/xml", "<anything/>", 4).expect("xml"),
            DecodedPayload::Xml("<anything/>".into())
        );
        assert!(decode_message("text/plain", payload, 4).is_err());
    }
}
