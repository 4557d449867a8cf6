use std::borrow::Cow;
use std::iter::Peekable;
use std::str::Chars;

/// Longest item name accepted from the command line, in characters.
pub const MAX_ITEM_NAME_CHARS: usize = 200;

fn is_stripped_control(c: char) -> bool {
    c == '\x7f' || (c < ' ' && c != '\t' && c != '\n' && c != '\r')
}

/// Strip terminal control characters and ANSI escape sequences.
///
/// Item names come back from a shared server and are printed straight to the
/// terminal, so CSI (`ESC [ ... final`) and OSC (`ESC ] ... BEL|ST`) sequences
/// are dropped along with C0 controls and DEL. Tab, newline and CR survive.
///
/// Returns `Cow::Borrowed` when there is nothing to strip.
pub fn strip_control_chars(s: &str) -> Cow<'_, str> {
    if !s.chars().any(|c| c == '\x1b' || is_stripped_control(c)) {
        return Cow::Borrowed(s);
    }

    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '\x1b' => skip_escape(&mut chars),
            c if is_stripped_control(c) => {}
            c => out.push(c),
        }
    }
    Cow::Owned(out)
}

fn skip_escape(chars: &mut Peekable<Chars<'_>>) {
    match chars.peek() {
        Some('[') => {
            chars.next();
            for c in chars.by_ref() {
                if ('\x40'..='\x7e').contains(&c) {
                    break;
                }
            }
        }
        Some(']') => {
            chars.next();
            while let Some(c) = chars.next() {
                if c == '\x07' {
                    break;
                }
                if c == '\x1b' && chars.peek() == Some(&'\\') {
                    chars.next();
                    break;
                }
            }
        }
        _ => {}
    }
}

/// Normalize user input into an item name.
///
/// Controls are stripped, whitespace runs collapse to one space, and the
/// result is capped at [`MAX_ITEM_NAME_CHARS`]. `None` if nothing is left.
pub fn clean_item_name(raw: &str) -> Option<String> {
    let stripped = strip_control_chars(raw);
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    if collapsed.is_empty() {
        return None;
    }
    Some(collapsed.chars().take(MAX_ITEM_NAME_CHARS).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_clean_text_returns_borrowed() {
        let input = "Vollmilch 3,5% – 1 l";
        let result = strip_control_chars(input);
        assert!(matches!(result, Cow::Borrowed(_)));
        assert_eq!(result, input);
    }

    #[test]
    fn test_strip_preserves_tabs_newlines_cr() {
        let input = "eggs\nmilk\tbread\r\n";
        assert!(matches!(strip_control_chars(input), Cow::Borrowed(_)));
    }

    #[test]
    fn test_strip_removes_c0_and_del() {
        assert_eq!(strip_control_chars("br\x00e\x07ad\x7f"), "bread");
    }

    #[test]
    fn test_strip_ansi_color_codes() {
        assert_eq!(strip_control_chars("\x1b[31mTomatoes\x1b[0m"), "Tomatoes");
    }

    #[test]
    fn test_strip_osc_title_sequences() {
        assert_eq!(strip_control_chars("\x1b]0;pwned\x07Salt"), "Salt");
        assert_eq!(strip_control_chars("\x1b]0;pwned\x1b\\Salt"), "Salt");
    }

    #[test]
    fn test_strip_bare_and_trailing_esc() {
        assert_eq!(strip_control_chars("Rice\x1b"), "Rice");
        assert_eq!(strip_control_chars("Ri\x1bce"), "Rice");
        assert_eq!(strip_control_chars("Rice\x1b["), "Rice");
    }

    #[test]
    fn test_clean_item_name_collapses_whitespace() {
        assert_eq!(
            clean_item_name("  whole \t wheat\n bread ").as_deref(),
            Some("whole wheat bread")
        );
    }

    #[test]
    fn test_clean_item_name_rejects_blank() {
        assert_eq!(clean_item_name(""), None);
        assert_eq!(clean_item_name(" \n\t "), None);
        assert_eq!(clean_item_name("\x1b[1m\x1b[0m"), None);
    }

    #[test]
    fn test_clean_item_name_caps_length_on_char_boundary() {
        let long = "ä".repeat(MAX_ITEM_NAME_CHARS + 10);
        let cleaned = clean_item_name(&long).unwrap();
        assert_eq!(cleaned.chars().count(), MAX_ITEM_NAME_CHARS);
    }
}
