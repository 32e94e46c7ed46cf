//! Wire encoders for request bodies.
//!
//! Form bodies use `application/x-www-form-urlencoded`; multipart bodies use
//! `multipart/form-data` with a random boundary. JSON payloads are written by
//! `serde_json` in one of three [`JsonEncoding`] modes.

use std::io;

use serde::Serialize;
use serde_json::ser::{Formatter, PrettyFormatter};
use url::form_urlencoded;
use uuid::Uuid;

use crate::http::{Body, Part};

pub const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Body bytes ready for the transport, plus the content type they imply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedBody {
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl Body {
    /// Encode with a freshly generated multipart boundary.
    pub fn encode(&self) -> EncodedBody {
        self.encode_with_boundary(&Uuid::new_v4().simple().to_string())
    }

    pub fn encode_with_boundary(&self, boundary: &str) -> EncodedBody {
        match self {
            Body::Empty => EncodedBody {
                content_type: None,
                bytes: Vec::new(),
            },
            Body::Raw(raw) => EncodedBody {
                content_type: None,
                bytes: raw.clone().into_bytes(),
            },
            Body::Form(fields) => EncodedBody {
                content_type: Some(FORM_CONTENT_TYPE.to_string()),
                bytes: encode_form(fields).into_bytes(),
            },
            Body::Multipart(parts) => EncodedBody {
                content_type: Some(format!("multipart/form-data; boundary={boundary}")),
                bytes: encode_multipart(parts, boundary),
            },
        }
    }
}

pub fn encode_form(fields: &[(String, String)]) -> String {
    form_urlencoded::Serializer::new(String::new())
        .extend_pairs(fields)
        .finish()
}

pub fn encode_multipart(parts: &[Part], boundary: &str) -> Vec<u8> {
    let mut out = Vec::new();
    for part in parts {
        out.extend_from_slice(format!("--{boundary}\r\n").as_bytes());
        let mut disposition = format!(
            "Content-Disposition: form-data; name=\"{}\"",
            escape_quoted(&part.name)
        );
        if let Some(filename) = &part.filename {
            disposition.push_str(&format!("; filename=\"{}\"", escape_quoted(filename)));
        }
        out.extend_from_slice(disposition.as_bytes());
        out.extend_from_slice(b"\r\n");
        if part.filename.is_some() {
            out.extend_from_slice(b"Content-Type: application/octet-stream\r\n");
        }
        out.extend_from_slice(b"\r\n");
        out.extend_from_slice(&part.contents);
        out.extend_from_slice(b"\r\n");
    }
    out.extend_from_slice(format!("--{boundary}--\r\n").as_bytes());
    out
}

fn escape_quoted(s: &str) -> String {
    s.replace('"', "%22").replace('\r', "%0D").replace('\n', "%0A")
}

/// How a structured JSON payload is written.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JsonEncoding {
    /// Compact, non-ASCII characters written verbatim.
    #[default]
    Unescaped,
    /// Compact, non-ASCII characters written as `\uXXXX` escapes.
    EscapeUnicode,
    /// Indented, non-ASCII characters written verbatim.
    Pretty,
}

pub fn encode_json<T: Serialize + ?Sized>(
    value: &T,
    encoding: JsonEncoding,
) -> Result<String, serde_json::Error> {
    match encoding {
        JsonEncoding::Unescaped => serde_json::to_string(value),
        JsonEncoding::Pretty => {
            let mut buf = Vec::new();
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::new());
            value.serialize(&mut ser)?;
            Ok(into_utf8(buf))
        }
        JsonEncoding::EscapeUnicode => {
            let mut buf = Vec::new();
            let mut ser = serde_json::Serializer::with_formatter(&mut buf, AsciiFormatter);
            value.serialize(&mut ser)?;
            Ok(into_utf8(buf))
        }
    }
}

// serde_json only ever writes valid UTF-8.
fn into_utf8(buf: Vec<u8>) -> String {
    String::from_utf8(buf).unwrap_or_else(|e| String::from_utf8_lossy(e.as_bytes()).into_owned())
}

/// Compact formatter that escapes every non-ASCII character.
struct AsciiFormatter;

impl Formatter for AsciiFormatter {
    fn write_string_fragment<W>(&mut self, writer: &mut W, fragment: &str) -> io::Result<()>
    where
        W: ?Sized + io::Write,
    {
        let mut start = 0;
        for (i, ch) in fragment.char_indices() {
            if ch.is_ascii() {
                continue;
            }
            writer.write_all(fragment[start..i].as_bytes())?;
            let mut units = [0u16; 2];
            for unit in ch.encode_utf16(&mut units) {
                write!(writer, "\\u{unit:04x}")?;
            }
            start = i + ch.len_utf8();
        }
        writer.write_all(fragment[start..].as_bytes())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn form_body_is_urlencoded() {
        let body = Body::Form(vec![
            ("a".to_string(), "b".to_string()),
            ("msg".to_string(), "hello world&more".to_string()),
        ]);
        let encoded = body.encode();
        assert_eq!(encoded.content_type.as_deref(), Some(FORM_CONTENT_TYPE));
        assert_eq!(encoded.bytes, b"a=b&msg=hello+world%26more");
    }

    #[test]
    fn raw_body_is_sent_verbatim_without_content_type() {
        let encoded = Body::Raw("raw-text".to_string()).encode();
        assert_eq!(encoded.content_type, None);
        assert_eq!(encoded.bytes, b"raw-text");
    }

    #[test]
    fn multipart_body_layout() {
        let parts = vec![
            Part {
                name: "file".to_string(),
                contents: b"PNG".to_vec(),
                filename: Some("a.png".to_string()),
            },
            Part::text("field", "value"),
        ];
        let encoded = Body::Multipart(parts).encode_with_boundary("XYZ");
        assert_eq!(
            encoded.content_type.as_deref(),
            Some("multipart/form-data; boundary=XYZ")
        );
        let expected = "--XYZ\r\n\
            Content-Disposition: form-data; name=\"file\"; filename=\"a.png\"\r\n\
            Content-Type: application/octet-stream\r\n\
            \r\n\
            PNG\r\n\
            --XYZ\r\n\
            Content-Disposition: form-data; name=\"field\"\r\n\
            \r\n\
            value\r\n\
            --XYZ--\r\n";
        assert_eq!(String::from_utf8(encoded.bytes).unwrap(), expected);
    }

    #[test]
    fn multipart_names_escape_quotes() {
        let bytes = encode_multipart(&[Part::text("a\"b", "x")], "B");
        let text = String::from_utf8(bytes).unwrap();
        assert!(text.contains("name=\"a%22b\""));
    }

    #[test]
    fn generated_boundaries_differ() {
        let body = Body::Multipart(vec![Part::text("a", "b")]);
        assert_ne!(body.encode().content_type, body.encode().content_type);
    }

    #[test]
    fn json_unescaped_keeps_non_ascii() {
        let out = encode_json(&json!({"text": "识别"}), JsonEncoding::Unescaped).unwrap();
        assert_eq!(out, r#"{"text":"识别"}"#);
    }

    #[test]
    fn json_escape_unicode_writes_ascii_only() {
        let out = encode_json(&json!({"text": "é😀\n"}), JsonEncoding::EscapeUnicode).unwrap();
        assert_eq!(out, r#"{"text":"\u00e9\ud83d\ude00\n"}"#);
        assert!(out.is_ascii());
    }

    #[test]
    fn json_pretty_is_indented() {
        let out = encode_json(&json!({"k": "v"}), JsonEncoding::Pretty).unwrap();
        assert_eq!(out, "{\n  \"k\": \"v\"\n}");
    }
}
