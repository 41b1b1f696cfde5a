//! Carrier segment estimation.
//!
//! Informational only: nothing gates on the estimate.

use serde::Serialize;

/// GSM 03.38 basic character set.
const GSM7_BASIC: &str = "@£$¥èéùìòÇ\nØø\rÅåΔ_ΦΓΛΩΠΨΣΘΞÆæßÉ !\"#¤%&'()*+,-./0123456789:;<=>?\
¡ABCDEFGHIJKLMNOPQRSTUVWXYZÄÖÑÜ§¿abcdefghijklmnopqrstuvwxyzäöñüà";

/// GSM 03.38 extension table; each costs an escape plus the character.
const GSM7_EXTENDED: &str = "^{}\\[~]|€\u{000C}";

const GSM7_SINGLE: usize = 160;
const GSM7_MULTI: usize = 153;
const UCS2_SINGLE: usize = 70;
const UCS2_MULTI: usize = 67;

/// Encoding a carrier would pick for a body.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SmsEncoding {
    /// Restricted 7-bit alphabet.
    Gsm7,
    /// 16-bit fallback for anything outside GSM-7.
    Ucs2,
}

/// Result of [`estimate_segments`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SegmentInfo {
    pub encoding: SmsEncoding,
    /// Encoded length in septets (GSM-7) or UTF-16 code units (UCS-2).
    pub units: usize,
    pub segments: usize,
}

/// Estimate how many carrier segments `text` occupies.
///
/// A single segment holds 160 GSM-7 septets or 70 UCS-2 units; once split,
/// each part loses room to the concatenation header (153 / 67).
pub fn estimate_segments(text: &str) -> SegmentInfo {
    let gsm_units = text.chars().try_fold(0usize, |acc, c| {
        if GSM7_BASIC.contains(c) {
            Some(acc + 1)
        } else if GSM7_EXTENDED.contains(c) {
            Some(acc + 2)
        } else {
            None
        }
    });

    let (encoding, units, single, multi) = match gsm_units {
        Some(units) => (SmsEncoding::Gsm7, units, GSM7_SINGLE, GSM7_MULTI),
        None => (
            SmsEncoding::Ucs2,
            text.encode_utf16().count(),
            UCS2_SINGLE,
            UCS2_MULTI,
        ),
    };

    let segments = match units {
        0 => 0,
        n if n <= single => 1,
        n => n.div_ceil(multi),
    };

    SegmentInfo {
        encoding,
        units,
        segments,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_text() {
        let info = estimate_segments("");
        assert_eq!(info.encoding, SmsEncoding::Gsm7);
        assert_eq!(info.segments, 0);
    }

    #[test]
    fn test_gsm7_thresholds() {
        assert_eq!(estimate_segments(&"a".repeat(160)).segments, 1);
        assert_eq!(estimate_segments(&"a".repeat(161)).segments, 2);
        assert_eq!(estimate_segments(&"a".repeat(306)).segments, 2);
        assert_eq!(estimate_segments(&"a".repeat(307)).segments, 3);
    }

    #[test]
    fn test_gsm7_extension_counts_double() {
        let info = estimate_segments("{}");
        assert_eq!(info.encoding, SmsEncoding::Gsm7);
        assert_eq!(info.units, 4);

        let text = format!("{}{}", "a".repeat(159), "\u{20AC}");
        assert_eq!(estimate_segments(&text).segments, 2);
    }

    #[test]
    fn test_ucs2_thresholds() {
        let info = estimate_segments(&"\u{4F60}".repeat(70));
        assert_eq!(info.encoding, SmsEncoding::Ucs2);
        assert_eq!(info.segments, 1);
        assert_eq!(estimate_segments(&"\u{4F60}".repeat(71)).segments, 2);
        assert_eq!(estimate_segments(&"\u{4F60}".repeat(134)).segments, 2);
        assert_eq!(estimate_segments(&"\u{4F60}".repeat(135)).segments, 3);
    }

    #[test]
    fn test_single_smart_quote_forces_ucs2() {
        let info = estimate_segments("it\u{2019}s fine");
        assert_eq!(info.encoding, SmsEncoding::Ucs2);
        assert_eq!(info.units, 9);
    }

    #[test]
    fn test_emoji_uses_surrogate_pairs() {
        let info = estimate_segments("\u{1F600}");
        assert_eq!(info.encoding, SmsEncoding::Ucs2);
        assert_eq!(info.units, 2);
    }
}
