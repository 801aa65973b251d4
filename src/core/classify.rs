//! Binary/text heuristic over a bounded prefix of the input.
//!
//! Two checks run in order: a table of magic signatures, then the ratio of
//! control bytes (below 32, excluding tab, LF and CR) in the sample.

use super::types::{ContentKind, MagicSignature};

pub const DEFAULT_SAMPLE_SIZE: usize = 1024;
pub const DEFAULT_CONTROL_THRESHOLD: f64 = 0.3;

const BUILTIN_SIGNATURES: &[(&str, &[u8])] = &[
    ("pdf", b"%PDF-"),
    ("zip", b"PK\x03\x04"),
    ("png", b"\x89PNG"),
    ("jpeg", b"\xFF\xD8\xFF"),
    ("gzip", b"\x1f\x8b"),
];

pub fn builtin_signatures() -> Vec<MagicSignature> {
    BUILTIN_SIGNATURES
        .iter()
        .map(|(name, prefix)| MagicSignature::new(*name, *prefix))
        .collect()
}

#[inline]
fn is_control_byte(b: u8) -> bool {
    b < 32 && !matches!(b, b'\t' | b'\n' | b'\r')
}

/// Tunable content-type classifier
#[derive(Debug, Clone)]
pub struct Classifier {
    pub sample_size: usize,
    /// Fraction of control bytes above which the sample counts as binary
    pub control_threshold: f64,
    pub signatures: Vec<MagicSignature>,
}

impl Default for Classifier {
    fn default() -> Self {
        Self {
            sample_size: DEFAULT_SAMPLE_SIZE,
            control_threshold: DEFAULT_CONTROL_THRESHOLD,
            signatures: builtin_signatures(),
        }
    }
}

impl Classifier {
    pub fn with_sample_size(mut self, sample_size: usize) -> Self {
        self.sample_size = sample_size;
        self
    }

    pub fn with_control_threshold(mut self, threshold: f64) -> Self {
        self.control_threshold = threshold;
        self
    }

    pub fn with_signature(mut self, signature: MagicSignature) -> Self {
        self.signatures.push(signature);
        self
    }

    pub fn sample<'a>(&self, data: &'a [u8]) -> &'a [u8] {
        &data[..data.len().min(self.sample_size)]
    }

    /// First signature the sample starts with, if any.
    pub fn matching_signature(&self, data: &[u8]) -> Option<&MagicSignature> {
        let sample = self.sample(data);
        self.signatures.iter().find(|sig| sig.matches(sample))
    }

    pub fn control_bytes(&self, data: &[u8]) -> usize {
        self.sample(data)
            .iter()
            .filter(|&&b| is_control_byte(b))
            .count()
    }

    pub fn classify(&self, data: &[u8]) -> ContentKind {
        let sample = self.sample(data);

        if self.signatures.iter().any(|sig| sig.matches(sample)) {
            return ContentKind::Binary;
        }

        let control = sample.iter().filter(|&&b| is_control_byte(b)).count();
        if control as f64 > sample.len() as f64 * self.control_threshold {
            ContentKind::Binary
        } else {
            ContentKind::Text
        }
    }
}

/// Classifies with the default threshold and signature table.
pub fn classify(data: &[u8], sample_size: usize) -> ContentKind {
    Classifier::default()
        .with_sample_size(sample_size)
        .classify(data)
}

/// Shorthand for [`classify`] with a 1024 byte sample.
pub fn guess_content_type(data: &[u8]) -> ContentKind {
    classify(data, DEFAULT_SAMPLE_SIZE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signatures_win_over_content() {
        let mut pdf = b"%PDF-1.4".to_vec();
        pdf.extend(std::iter::repeat_n(b'a', 4096));
        assert_eq!(guess_content_type(&pdf), ContentKind::Binary);

        for (_, prefix) in BUILTIN_SIGNATURES {
            let mut data = prefix.to_vec();
            data.extend_from_slice(b" plain readable text follows");
            assert_eq!(guess_content_type(&data), ContentKind::Binary, "{:?}", prefix);
        }
    }

    #[test]
    fn test_plain_text() {
        assert_eq!(guess_content_type(b"Hello, world!\n"), ContentKind::Text);
        assert_eq!(
            guess_content_type(b"col1\tcol2\r\nval1\tval2\r\n"),
            ContentKind::Text
        );
    }

    #[test]
    fn test_every_printable_ascii_byte_is_text() {
        let mut all: Vec<u8> = (0x20..=0x7E).collect();
        all.extend_from_slice(b"\t\n\r");
        assert_eq!(guess_content_type(&all), ContentKind::Text);

        // each byte alone and as a full sample
        for &b in &all {
            assert_eq!(guess_content_type(&[b]), ContentKind::Text, "{:#04x}", b);
            assert_eq!(guess_content_type(&[b; 1024]), ContentKind::Text, "{:#04x}", b);
        }
    }

    #[test]
    fn test_empty_is_text() {
        assert_eq!(guess_content_type(b""), ContentKind::Text);
        assert_eq!(classify(b"", 0), ContentKind::Text);
    }

    #[test]
    fn test_threshold_boundary() {
        // 3 of 10 is exactly 30%: not above the threshold
        let at = b"\x01\x02\x03abcdefg";
        assert_eq!(guess_content_type(at), ContentKind::Text);

        // 4 of 10 is above it
        let above = b"\x01\x02\x03\x04abcdef";
        assert_eq!(guess_content_type(above), ContentKind::Binary);
    }

    #[test]
    fn test_whitespace_controls_ignored() {
        let data = b"\t\t\t\n\n\n\r\r\rx";
        assert_eq!(guess_content_type(data), ContentKind::Text);
        assert_eq!(Classifier::default().control_bytes(data), 0);
    }

    #[test]
    fn test_only_sample_is_inspected() {
        let mut data = vec![b'a'; 16];
        data.extend(std::iter::repeat_n(0u8, 64));
        assert_eq!(classify(&data, 16), ContentKind::Text);
        assert_eq!(classify(&data, 80), ContentKind::Binary);
    }

    #[test]
    fn test_custom_threshold_and_signature() {
        let classifier = Classifier::default().with_control_threshold(0.5);
        assert_eq!(classifier.classify(b"\x01\x02\x03\x04abcdef"), ContentKind::Text);

        let classifier = Classifier::default().with_signature(MagicSignature::new("elf", b"\x7fELF".to_vec()));
        assert_eq!(classifier.classify(b"\x7fELF text"), ContentKind::Binary);
        assert_eq!(
            classifier.matching_signature(b"\x7fELF").map(|s| s.name.as_str()),
            Some("elf")
        );
    }

    #[test]
    fn test_signature_longer_than_sample() {
        // A truncated sample cannot contain the full prefix
        assert_eq!(classify(b"%PDF-1.4", 3), ContentKind::Text);
    }
}
