// ─── Directory Index Listing ───
// The server exposes each asset folder as an autoindex page. File names are
// the `href`s of the anchors inside the page's `<pre>` block.

use std::sync::LazyLock;

use regex::Regex;

static PRE_BLOCK: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<pre[^>]*>(.*?)</pre>").expect("pre block pattern is valid")
});
static ANCHOR_HREF: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?is)<a\s[^>]*?href\s*=\s*(?:"([^"]*)"|'([^']*)'|([^\s>]+))"#)
        .expect("anchor pattern is valid")
});
static NUMERIC_ENTITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"&#(?:[xX]([0-9a-fA-F]{1,6})|([0-9]{1,7}));").expect("entity pattern is valid")
});

/// Extract the decoded file names from a directory index page.
///
/// Sort links (`?C=N;O=D`) and absolute links (`/`, the parent directory on
/// most servers) are dropped. Pages without a `<pre>` block list nothing.
pub fn parse_listing(html: &str) -> Vec<String> {
    PRE_BLOCK
        .captures_iter(html)
        .filter_map(|block| block.get(1))
        .flat_map(|block| ANCHOR_HREF.captures_iter(block.as_str()))
        .filter_map(|caps| caps.get(1).or(caps.get(2)).or(caps.get(3)))
        .map(|href| unescape_html(href.as_str()))
        .filter(|href| !href.starts_with('?') && !href.starts_with('/'))
        .map(|href| percent_decode(&href))
        .collect()
}

/// Decode `%XX` escapes. A `+` stays a literal plus (paths are not form
/// data), and malformed escapes are kept as written.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            if let (Some(hi), Some(lo)) = (hex_value(bytes[i + 1]), hex_value(bytes[i + 2])) {
                out.push(hi << 4 | lo);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

/// Named entities plus `&#NN;` / `&#xHH;`. `&amp;` goes last so an escaped
/// entity decodes only once.
fn unescape_html(value: &str) -> String {
    let numeric = NUMERIC_ENTITY.replace_all(value, |caps: &regex::Captures<'_>| {
        let code = match (caps.get(1), caps.get(2)) {
            (Some(hex), _) => u32::from_str_radix(hex.as_str(), 16).ok(),
            (_, Some(dec)) => dec.as_str().parse().ok(),
            _ => None,
        };
        code.and_then(char::from_u32)
            .map(String::from)
            .unwrap_or_else(|| caps[0].to_string())
    });
    numeric
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
        .replace("&amp;", "&")
}
