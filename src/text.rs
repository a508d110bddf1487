// 📝 Rich text → plain text
// Descriptions in the store are HTML fragments from a WYSIWYG editor. Sheets
// get a markdown-flavoured plain text version: paragraphs, bullet lists and
// bold/italic markers survive, everything else is stripped.

/// Convert an HTML fragment to markdown-flavoured plain text
pub fn html_to_text(html: &str) -> String {
    let mut out = String::with_capacity(html.len());
    let mut chars = html.char_indices().peekable();

    while let Some((i, ch)) = chars.next() {
        if ch == '<' && starts_tag(&html[i + 1..]) {
            let rest = &html[i..];
            let Some(end) = rest.find('>') else {
                // Unterminated tag: drop the remainder
                break;
            };
            push_tag(&mut out, &rest[1..end]);
            // Skip the tag body
            while let Some(&(j, _)) = chars.peek() {
                if j > i + end {
                    break;
                }
                chars.next();
            }
        } else {
            out.push(ch);
        }
    }

    tidy(&decode_entities(&out))
}

/// Convert an optional fragment, returning `None` when nothing is left
pub fn convert_optional(html: Option<&str>) -> Option<String> {
    let text = html_to_text(html?);
    if text.is_empty() {
        None
    } else {
        Some(text)
    }
}

fn starts_tag(rest: &str) -> bool {
    matches!(rest.chars().next(), Some(c) if c.is_ascii_alphabetic() || c == '/' || c == '!')
}

fn push_tag(out: &mut String, tag: &str) {
    let closing = tag.starts_with('/');
    let name: String = tag
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();

    match name.as_str() {
        "br" => out.push('\n'),
        "p" | "div" | "ul" | "ol" | "table" | "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => {
            out.push_str("\n\n")
        }
        "tr" => out.push('\n'),
        "td" | "th" if closing => out.push(' '),
        "li" if !closing => out.push_str("\n- "),
        "strong" | "b" => out.push_str("**"),
        "em" | "i" => out.push('_'),
        _ => {}
    }
}

fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(pos) = rest.find('&') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];

        let decoded = rest.find(';').filter(|&end| end <= 10).and_then(|end| {
            let entity = &rest[1..end];
            decode_entity(entity).map(|c| (c, end))
        });

        match decoded {
            Some((c, end)) => {
                out.push(c);
                rest = &rest[end + 1..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }

    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "nbsp" => Some(' '),
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "rsquo" | "lsquo" => Some('\''),
        "rdquo" | "ldquo" => Some('"'),
        "ndash" => Some('–'),
        "mdash" => Some('—'),
        _ => {
            let code = entity.strip_prefix('#')?;
            let hex = code.strip_prefix('x').or_else(|| code.strip_prefix('X'));
            let value = match hex {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => code.parse().ok()?,
            };
            char::from_u32(value)
        }
    }
}

/// Collapse whitespace inside lines and keep at most one blank line in a row
fn tidy(s: &str) -> String {
    let mut lines: Vec<String> = Vec::new();
    let mut blank_run = 0;

    for line in s.lines() {
        let mut collapsed = String::with_capacity(line.len());
        let mut prev_space = false;
        for ch in line.chars() {
            if ch.is_whitespace() {
                if !prev_space {
                    collapsed.push(' ');
                    prev_space = true;
                }
            } else {
                collapsed.push(ch);
                prev_space = false;
            }
        }
        let collapsed = collapsed.trim().to_string();

        if collapsed.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        lines.push(collapsed);
    }

    lines.join("\n").trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_plain_text_unchanged() {
        assert_eq!(html_to_text("Payable per semester"), "Payable per semester");
        assert_eq!(html_to_text("  spaced   out  "), "spaced out");
    }

    #[test]
    fn test_paragraphs_and_breaks() {
        let html = "<p>First line</p><p>Second<br>line</p>";
        assert_eq!(html_to_text(html), "First line\n\nSecond\nline");
    }

    #[test]
    fn test_lists_and_emphasis() {
        let html = "<ul><li>Lab fee</li><li><strong>Hostel</strong> deposit</li></ul>";
        assert_eq!(html_to_text(html), "- Lab fee\n- **Hostel** deposit");
    }

    #[test]
    fn test_entities() {
        assert_eq!(html_to_text("A&amp;B&nbsp;&lt;3&gt;"), "A&B <3>");
        assert_eq!(html_to_text("caf&#233; &#x41;"), "café A");
        assert_eq!(html_to_text("fish & chips"), "fish & chips");
    }

    #[test]
    fn test_bare_angle_bracket_kept() {
        assert_eq!(html_to_text("score < 5"), "score < 5");
    }

    #[test]
    fn test_convert_optional() {
        assert_eq!(convert_optional(None), None);
        assert_eq!(convert_optional(Some("<p></p>")), None);
        assert_eq!(convert_optional(Some("<p>x</p>")), Some("x".to_string()));
    }
}
