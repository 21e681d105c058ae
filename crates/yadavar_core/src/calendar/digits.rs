//! Digit glyph normalization.

const PERSIAN_ZERO: u32 = 0x06F0;
const ARABIC_INDIC_ZERO: u32 = 0x0660;

/// Maps every Persian (`۰-۹`) and Arabic-Indic (`٠-٩`) digit to ASCII.
///
/// All other characters pass through unchanged, so the output has the same
/// number of chars as the input.
pub fn normalize_digits(text: &str) -> String {
    text.chars().map(ascii_digit_for).collect()
}

/// Renders ASCII digits with Persian glyphs, for user-facing text.
pub fn persian_digits(text: &str) -> String {
    text.chars()
        .map(|ch| match ch.to_digit(10) {
            Some(value) if ch.is_ascii_digit() => {
                char::from_u32(PERSIAN_ZERO + value).unwrap_or(ch)
            }
            _ => ch,
        })
        .collect()
}

fn ascii_digit_for(ch: char) -> char {
    let code = ch as u32;
    let offset = if (PERSIAN_ZERO..PERSIAN_ZERO + 10).contains(&code) {
        code - PERSIAN_ZERO
    } else if (ARABIC_INDIC_ZERO..ARABIC_INDIC_ZERO + 10).contains(&code) {
        code - ARABIC_INDIC_ZERO
    } else {
        return ch;
    };
    char::from_digit(offset, 10).unwrap_or(ch)
}

#[cfg(test)]
mod tests {
    use super::{normalize_digits, persian_digits};

    #[test]
    fn maps_every_persian_and_arabic_indic_digit() {
        let persian = "۰۱۲۳۴۵۶۷۸۹";
        let arabic = "٠١٢٣٤٥٦٧٨٩";
        assert_eq!(normalize_digits(persian), "0123456789");
        assert_eq!(normalize_digits(arabic), "0123456789");
    }

    #[test]
    fn leaves_other_characters_untouched() {
        let text = "ساعت 9:30 abc ٫ ،";
        assert_eq!(normalize_digits(text), text);
    }

    #[test]
    fn mixed_scripts_normalize_together() {
        assert_eq!(normalize_digits("۱4٠۲/۱0/1١"), "1402/10/11");
    }

    #[test]
    fn persian_digits_reverses_ascii_digits_only() {
        assert_eq!(persian_digits("09:30 a"), "۰۹:۳۰ a");
    }
}
