/// XML 1.0 allows tab, newline, carriage return and everything from U+0020 up
/// except the surrogate block and U+FFFE/U+FFFF.
fn is_valid_xml_char(c: char) -> bool {
    matches!(
        c as u32,
        0x09 | 0x0A | 0x0D | 0x20..=0xD7FF | 0xE000..=0xFFFD | 0x10000..=0x10FFFF
    )
}

/// Escapes text for use in element content or a double-quoted attribute,
/// dropping characters XML cannot carry.
pub fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars().filter(|&c| is_valid_xml_char(c)) {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&apos;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

/// Optional `fill-opacity`/`stroke-opacity` style attribute. Fully opaque
/// values emit nothing so the common case stays short.
pub fn opacity_attr(name: &str, alpha: f32) -> String {
    if alpha >= 1.0 {
        String::new()
    } else {
        format!(r#" {name}="{:.2}""#, alpha.max(0.0))
    }
}
