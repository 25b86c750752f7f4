//! Command and feature name normalization
//!
//! Simple command names end up as button labels on the remote, which only
//! accepts a limited character set and length. Names are transliterated to
//! that set, upper-cased and truncated.

/// Maximum length of a simple command name
pub const MAX_COMMAND_NAME_LEN: usize = 20;

/// Punctuation allowed in simple command names besides letters and digits
pub const ALLOWED_PUNCTUATION: &str = "/_.:+#*°@%()?-";

/// Normalize a simple command name
///
/// Whitespace becomes `_`, common accented Latin letters are transliterated,
/// any other character outside the allowed set is dropped. The result is
/// upper-cased and cut to [`MAX_COMMAND_NAME_LEN`] characters.
pub fn normalize_command_name(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());

    for c in raw.trim().chars() {
        if c.is_whitespace() {
            out.push('_');
        } else if c.is_ascii_alphanumeric() || ALLOWED_PUNCTUATION.contains(c) {
            out.push(c);
        } else if let Some(t) = transliterate(c) {
            out.push_str(t);
        }
    }

    out.to_uppercase()
        .chars()
        .take(MAX_COMMAND_NAME_LEN)
        .collect()
}

/// Feature names are stored with a capital first letter (`on` → `On`)
pub fn title_case(name: &str) -> String {
    let lower = name.trim().to_lowercase();
    let mut chars = lower.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn transliterate(c: char) -> Option<&'static str> {
    let t = match c {
        'ä' => "ae",
        'ö' => "oe",
        'ü' => "ue",
        'Ä' => "Ae",
        'Ö' => "Oe",
        'Ü' => "Ue",
        'ß' => "ss",
        'à' | 'á' | 'â' | 'ã' | 'å' => "a",
        'À' | 'Á' | 'Â' | 'Ã' | 'Å' => "A",
        'è' | 'é' | 'ê' | 'ë' => "e",
        'È' | 'É' | 'Ê' | 'Ë' => "E",
        'ì' | 'í' | 'î' | 'ï' => "i",
        'Ì' | 'Í' | 'Î' | 'Ï' => "I",
        'ò' | 'ó' | 'ô' | 'õ' | 'ø' => "o",
        'Ò' | 'Ó' | 'Ô' | 'Õ' | 'Ø' => "O",
        'ù' | 'ú' | 'û' => "u",
        'Ù' | 'Ú' | 'Û' => "U",
        'ç' => "c",
        'Ç' => "C",
        'ñ' => "n",
        'Ñ' => "N",
        'æ' => "ae",
        'Æ' => "AE",
        _ => return None,
    };
    Some(t)
}
