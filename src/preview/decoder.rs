use base64::Engine;
use base64::alphabet;
use base64::engine::{DecodePaddingMode, GeneralPurpose, GeneralPurposeConfig};

use super::PreviewError;

/// Standard alphabet with the leniency of browser `atob`: padding optional,
/// non-zero trailing bits ignored.
const LENIENT: GeneralPurpose = GeneralPurpose::new(
    &alphabet::STANDARD,
    GeneralPurposeConfig::new()
        .with_decode_padding_mode(DecodePaddingMode::Indifferent)
        .with_decode_allow_trailing_bits(true),
);

/// Decode a compiler payload into raw document bytes.
///
/// ASCII whitespace is skipped so wrapped output decodes as well.
pub fn decode(payload: &str) -> Result<Vec<u8>, PreviewError> {
    let compact: String = payload
        .chars()
        .filter(|c| !c.is_ascii_whitespace())
        .collect();

    LENIENT
        .decode(compact.as_bytes())
        .map_err(|e| PreviewError::MalformedPayload(e.to_string()))
}
