// Just enough HTML handling to get at the visible text of a MyBus page.
// Not a general parser: no DOM, no implied tags, no encoding sniffing.

use crate::entities;

/// Text content of the page, one trimmed block per text run between tags,
/// empty blocks dropped, joined with newlines. Comments and the bodies of
/// `<script>` and `<style>` elements are not visible text.
pub fn visible_text(html: &str) -> String {
    let mut blocks = vec![];
    let mut rest = html;

    while let Some(lt) = next_markup(rest) {
        push_block(&mut blocks, &rest[..lt]);
        rest = &rest[lt..];

        if rest.starts_with("<!--") {
            rest = match rest.find("-->") {
                Some(end) => &rest[end + 3..],
                None => "",
            };
            continue;
        }

        let end = tag_end(rest);
        let tag = &rest[..end];
        rest = &rest[end..];

        if let Some(name) = raw_text_element(tag) {
            // Everything up to the closing tag is script/style source.
            rest = match find_ci(rest, &format!("</{}", name)) {
                Some(close) => &rest[close..],
                None => "",
            };
        }
    }
    push_block(&mut blocks, rest);

    return blocks.join("\n");
}

fn push_block(blocks: &mut Vec<String>, raw: &str) {
    let decoded = decode_entities(raw);
    let trimmed = decoded.trim();
    if !trimmed.is_empty() {
        blocks.push(trimmed.to_string());
    }
}

// A '<' only opens markup when followed by a tag name, '/', '!' or '?';
// otherwise it's literal text, as in "< 1 MIN".
fn next_markup(s: &str) -> Option<usize> {
    let bytes = s.as_bytes();
    let mut from = 0;
    while let Some(rel) = s[from..].find('<') {
        let idx = from + rel;
        match bytes.get(idx + 1) {
            Some(c) if c.is_ascii_alphabetic() || *c == b'/' || *c == b'!' || *c == b'?' => return Some(idx),
            _ => from = idx + 1,
        }
    }
    return None;
}

// Index just past the '>' closing the tag at the start of `s`. A quote only
// opens a quoted value when it comes right after '=' (whitespace allowed), so
// `<img alt=Bob's>` still ends at its '>'.
fn tag_end(s: &str) -> usize {
    let mut quote: Option<u8> = None;
    let mut prev = b'<';
    for (i, b) in s.bytes().enumerate().skip(1) {
        match quote {
            Some(q) => {
                if b == q {
                    quote = None;
                    prev = b;
                }
            },
            None => match b {
                b'\'' | b'"' if prev == b'=' => quote = Some(b),
                b'>' => return i + 1,
                _ if b.is_ascii_whitespace() => {},
                _ => prev = b,
            },
        }
    }
    return s.len();
}

fn raw_text_element(tag: &str) -> Option<&'static str> {
    if tag.starts_with("</") || tag.ends_with("/>") {
        return None;
    }
    let name: String = tag[1..].chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect();
    match name.as_str() {
        "script" => return Some("script"),
        "style" => return Some("style"),
        _ => return None,
    }
}

// ASCII lowercasing keeps byte offsets stable, so the index is valid in `s`.
fn find_ci(s: &str, needle: &str) -> Option<usize> {
    return s.to_ascii_lowercase().find(&needle.to_ascii_lowercase());
}

pub fn decode_entities(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut rest = s;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp + 1..];

        match decode_reference(rest) {
            Some((c, used)) => {
                out.push(c);
                rest = &rest[used..];
            },
            None => out.push('&'),
        }
    }
    out.push_str(rest);

    return out;
}

// Decodes the reference following an '&'. Returns the character and how many
// bytes of `s` it used, including any ';'.
fn decode_reference(s: &str) -> Option<(char, usize)> {
    if let Some(num) = s.strip_prefix('#') {
        let (radix, digits_from) = match num.as_bytes().first() {
            Some(b'x') | Some(b'X') => (16, 2),
            _ => (10, 1),
        };
        let digits: &str = &s[digits_from..];
        let len = digits.bytes().take_while(|b| (*b as char).is_digit(radix)).count();
        if len == 0 {
            return None;
        }
        let c = u32::from_str_radix(&digits[..len], radix).ok()
            .filter(|&n| n != 0)
            .and_then(std::char::from_u32)
            .unwrap_or('\u{FFFD}');
        let used = digits_from + len;
        return Some((c, if s[used..].starts_with(';') { used + 1 } else { used }));
    }

    let len = s.bytes().take_while(|b| b.is_ascii_alphanumeric()).count();
    let run = &s[..len];
    if len == 0 {
        return None;
    }

    if s[len..].starts_with(';') {
        if let Some(c) = entities::lookup(run) {
            return Some((c, len + 1));
        }
    }

    return entities::lookup_legacy_prefix(run).map(|(len, c)| (c, len));
}

#[cfg(test)]
mod tests {
    use super::{decode_entities, visible_text};

    #[test]
    fn blocks_are_trimmed_and_joined() {
        let html = "<html><body><p>  #126 </p>\n<p></p><b>To</b> 126 NEW YORK <span>13 MIN</span></body></html>";
        assert_eq!(visible_text(html), "#126\nTo\n126 NEW YORK\n13 MIN");
    }

    #[test]
    fn skips_scripts_styles_and_comments() {
        let html = r#"<!DOCTYPE html><head><style>p > b { color: red }</style>
            <SCRIPT type="text/javascript">if (a < b) { x = "</p>"; }</SCRIPT></head>
            <body><!-- #1 To NOWHERE 5 MIN -->visible</body>"#;
        assert_eq!(visible_text(html), "visible");
    }

    #[test]
    fn quoted_gt_does_not_end_tag() {
        let html = r#"<a title="a > b" href = 'x>y'>link</a>"#;
        assert_eq!(visible_text(html), "link");
    }

    #[test]
    fn stray_quote_does_not_swallow_page() {
        assert_eq!(visible_text("<img alt=Bob's><p>#22 To 22 HOBOKEN DUE</p>"), "#22 To 22 HOBOKEN DUE");
        assert_eq!(visible_text(r#"<td class=x"y>5 MIN</td>"#), "5 MIN");
    }

    #[test]
    fn literal_less_than_is_text() {
        assert_eq!(visible_text("<td>< 1 MIN</td>"), "< 1 MIN");
        assert_eq!(visible_text("<td>&lt; 1 MIN</td>"), "< 1 MIN");
    }

    #[test]
    fn entities() {
        assert_eq!(decode_entities("A&amp;B&nbsp;&#35;22 &#x3C;1"), "A&B\u{a0}#22 <1");
        assert_eq!(decode_entities("R&D &bogus; &"), "R&D &bogus; &");
    }

    #[test]
    fn named_entities_beyond_markup_characters() {
        assert_eq!(decode_entities("JOURNAL SQ &ndash; PATH"), "JOURNAL SQ \u{2013} PATH");
        assert_eq!(decode_entities("Caf&eacute; &rarr; Pier&nbsp;A"), "Caf\u{e9} \u{2192} Pier\u{a0}A");
        assert_eq!(decode_entities("&hellip;&mdash;&rsquo;"), "\u{2026}\u{2014}\u{2019}");
    }

    #[test]
    fn legacy_entities_without_semicolon() {
        assert_eq!(decode_entities("AT&ampT"), "AT&T");
        assert_eq!(decode_entities("11TH&nbspST"), "11TH\u{a0}ST");
        assert_eq!(decode_entities("&#35 &#x41"), "# A");
        assert_eq!(decode_entities("&ndash no semicolon"), "&ndash no semicolon");
    }
}
