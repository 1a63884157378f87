//! HTML-to-text conversion for messages that carry no `text/plain` body.

/// Elements whose whole content is dropped.
const HIDDEN_ELEMENTS: [&str; 3] = ["script", "style", "head"];

/// Elements that start or end a line of text.
const BLOCK_ELEMENTS: [&str; 14] = [
    "br", "p", "div", "tr", "li", "ul", "ol", "table", "h1", "h2", "h3", "h4", "h5", "h6",
];

/// Convert an HTML body to readable plain text.
///
/// Tags are stripped, block elements become line breaks, the common named
/// entities are decoded and runs of blank lines collapse to one.
pub fn html_to_text(html: &str) -> String {
    let mut visible = html.to_string();
    for element in HIDDEN_ELEMENTS {
        visible = remove_element(&visible, element);
    }

    let mut text = String::with_capacity(visible.len());
    let mut rest = visible.as_str();
    while let Some(open) = rest.find('<') {
        text.push_str(&rest[..open]);
        let Some(close) = rest[open..].find('>') else {
            rest = "";
            break;
        };
        if is_block_tag(&rest[open + 1..open + close]) {
            text.push('\n');
        }
        rest = &rest[open + close + 1..];
    }
    text.push_str(rest);

    collapse_blank_lines(&decode_entities(&text))
}

/// Drop every `<element ...>...</element>` block, matching the name case-insensitively.
fn remove_element(html: &str, element: &str) -> String {
    // ASCII lowercasing keeps byte offsets identical to `html`.
    let lower = html.to_ascii_lowercase();
    let open = format!("<{element}");
    let close = format!("</{element}>");

    let mut out = String::with_capacity(html.len());
    let mut pos = 0;
    while let Some(start) = lower[pos..].find(&open).map(|i| i + pos) {
        out.push_str(&html[pos..start]);
        match lower[start..].find(&close) {
            Some(end) => pos = start + end + close.len(),
            None => return out,
        }
    }
    out.push_str(&html[pos..]);
    out
}

fn is_block_tag(tag: &str) -> bool {
    let name: String = tag
        .trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase();
    BLOCK_ELEMENTS.contains(&name.as_str())
}

fn decode_entities(text: &str) -> String {
    text.replace("&nbsp;", " ")
        .replace("&#160;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}

fn collapse_blank_lines(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut prev_blank = false;
    for line in text.lines().map(str::trim) {
        if line.is_empty() {
            if !prev_blank {
                out.push('\n');
            }
            prev_blank = true;
        } else {
            out.push_str(line);
            out.push('\n');
            prev_blank = false;
        }
    }
    out.trim().to_string()
}
