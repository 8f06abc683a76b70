use tracing::trace;

use crate::error::ColorError;

/// Default channel shift used for hover/pressed shades.
pub const DEFAULT_SHADE_AMOUNT: u8 = 20;

/// Returns true iff `value` is `#` followed by exactly six hex digits (either case).
///
/// The input is not normalized; callers keep the original string.
pub fn is_valid(value: &str) -> bool {
    let Some(digits) = value.strip_prefix('#') else {
        return false;
    };
    digits.len() == 6 && digits.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Raise every channel by `amount`, saturating at 255. Output is lowercase `#rrggbb`.
pub fn lighten(color: &str, amount: u8) -> Result<String, ColorError> {
    shift(color, |c| c.saturating_add(amount))
}

/// Lower every channel by `amount`, saturating at 0. Output is lowercase `#rrggbb`.
pub fn darken(color: &str, amount: u8) -> Result<String, ColorError> {
    shift(color, |c| c.saturating_sub(amount))
}

fn shift(color: &str, f: impl Fn(u8) -> u8) -> Result<String, ColorError> {
    let [r, g, b] = decode(color)?;
    let out = encode([f(r), f(g), f(b)]);
    trace!(target: "desk_controller::color", from = %color, to = %out, "shifted color");
    Ok(out)
}

fn decode(color: &str) -> Result<[u8; 3], ColorError> {
    if !is_valid(color) {
        return Err(ColorError::InvalidColorFormat(color.to_string()));
    }
    let channel = |i: usize| {
        u8::from_str_radix(&color[1 + i * 2..3 + i * 2], 16)
            .map_err(|_| ColorError::InvalidColorFormat(color.to_string()))
    };
    Ok([channel(0)?, channel(1)?, channel(2)?])
}

fn encode([r, g, b]: [u8; 3]) -> String {
    format!("#{r:02x}{g:02x}{b:02x}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_six_hex_digits_in_any_case() {
        assert!(is_valid("#5E81AC"));
        assert!(is_valid("#5e81ac"));
        assert!(is_valid("#000000"));
    }

    #[test]
    fn rejects_malformed_colors() {
        assert!(!is_valid("5E81AC"));
        assert!(!is_valid("#5E81A"));
        assert!(!is_valid("#5E81AC0"));
        assert!(!is_valid("#GGGGGG"));
        assert!(!is_valid(""));
        assert!(!is_valid("#"));
    }

    #[test]
    fn lighten_and_darken_shift_each_channel() {
        assert_eq!(lighten("#000000", 20).unwrap(), "#141414");
        assert_eq!(darken("#ffffff", 20).unwrap(), "#ebebeb");
        assert_eq!(lighten("#88C0D0", 20).unwrap(), "#9cd4e4");
    }

    #[test]
    fn channels_clamp_independently() {
        assert_eq!(lighten("#ffffff", 50).unwrap(), "#ffffff");
        assert_eq!(darken("#000000", 50).unwrap(), "#000000");
        assert_eq!(lighten("#f01000", 20).unwrap(), "#ff2414");
        assert_eq!(darken("#f01000", 20).unwrap(), "#dc0000");
    }

    #[test]
    fn transforms_reject_unvalidated_input() {
        assert_eq!(
            lighten("red", 20),
            Err(ColorError::InvalidColorFormat("red".into()))
        );
        assert!(darken("#12345", 20).is_err());
    }
}
