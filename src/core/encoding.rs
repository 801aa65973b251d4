//! Strict codec registry keyed by encoding label.
//!
//! Every codec either decodes the whole input or fails; no replacement
//! characters are ever produced. `encoding_rs` follows the WHATWG label table,
//! which folds `latin1` and `ascii` into windows-1252 and fills its undefined
//! slots with C1 controls, so those three are handled here.

use encoding_rs::{Encoding, UTF_16BE, UTF_16LE, WINDOWS_1252};

/// Bytes left undefined by windows-1252
const CP1252_UNDEFINED: [u8; 5] = [0x81, 0x8D, 0x8F, 0x90, 0x9D];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Codec {
    Utf8,
    Latin1,
    Windows1252,
    Ascii,
    /// BOM-sniffed UTF-16, little-endian when no BOM is present
    Utf16,
    Whatwg(&'static Encoding),
}

/// Lowercases and folds `_` and spaces into `-`.
pub fn normalize_label(label: &str) -> String {
    label
        .trim()
        .chars()
        .map(|c| match c {
            '_' | ' ' => '-',
            c => c.to_ascii_lowercase(),
        })
        .collect()
}

impl Codec {
    pub fn for_label(label: &str) -> Option<Codec> {
        let normalized = normalize_label(label);
        let codec = match normalized.as_str() {
            "utf-8" | "utf8" => Codec::Utf8,
            "latin1" | "latin-1" | "iso-8859-1" | "iso8859-1" | "iso88591" | "iso-8859-1:1987"
            | "l1" | "cp819" | "ibm819" | "csisolatin1" | "iso-ir-100" => Codec::Latin1,
            "cp1252" | "windows-1252" | "x-cp1252" => Codec::Windows1252,
            "ascii" | "us-ascii" | "ansi-x3.4-1968" => Codec::Ascii,
            "utf-16" | "utf16" => Codec::Utf16,
            other => {
                let enc = Encoding::for_label(label.trim().as_bytes())
                    .or_else(|| Encoding::for_label(other.as_bytes()))?;
                // Never hand out the lenient WHATWG windows-1252
                if enc == WINDOWS_1252 {
                    Codec::Windows1252
                } else {
                    Codec::Whatwg(enc)
                }
            }
        };
        Some(codec)
    }

    pub fn name(&self) -> &'static str {
        match self {
            Codec::Utf8 => "utf-8",
            Codec::Latin1 => "iso-8859-1",
            Codec::Windows1252 => "windows-1252",
            Codec::Ascii => "ascii",
            Codec::Utf16 => "utf-16",
            Codec::Whatwg(enc) => enc.name(),
        }
    }

    /// Decodes all of `data`, or returns `None` on the first malformed sequence.
    pub fn decode(&self, data: &[u8]) -> Option<String> {
        match self {
            Codec::Utf8 => std::str::from_utf8(data).ok().map(str::to_owned),
            Codec::Latin1 => Some(data.iter().map(|&b| char::from(b)).collect()),
            Codec::Windows1252 => {
                if data.iter().any(|b| CP1252_UNDEFINED.contains(b)) {
                    return None;
                }
                strict(WINDOWS_1252, data)
            }
            Codec::Ascii => {
                if data.is_ascii() {
                    // ASCII is a subset of UTF-8
                    std::str::from_utf8(data).ok().map(str::to_owned)
                } else {
                    None
                }
            }
            Codec::Utf16 => match data {
                [0xFF, 0xFE, rest @ ..] => strict(UTF_16LE, rest),
                [0xFE, 0xFF, rest @ ..] => strict(UTF_16BE, rest),
                _ => strict(UTF_16LE, data),
            },
            Codec::Whatwg(enc) => strict(*enc, data),
        }
    }
}

fn strict(encoding: &'static Encoding, data: &[u8]) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(data)
        .map(|text| text.into_owned())
}
