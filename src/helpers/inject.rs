//! HTML tag injection
//!
//! Plain text insertion, not an HTML parse. Calling twice injects twice.

fn escape_attr(value: &str) -> String {
    value.replace('&', "&amp;").replace('"', "&quot;")
}

/// Byte offset of `tag` in `html`, ignoring ASCII case
fn find_tag(html: &str, tag: &str, last: bool) -> Option<usize> {
    let lower = html.to_ascii_lowercase();
    if last {
        lower.rfind(tag)
    } else {
        lower.find(tag)
    }
}

/// Insert a stylesheet link before `</head>`, or at the start when the
/// document has no head
pub fn inject_stylesheet(html: &str, href: &str) -> String {
    let tag = format!(r#"<link rel="stylesheet" href="{}">"#, escape_attr(href));
    match find_tag(html, "</head>", false) {
        Some(at) => format!("{}{}\n{}", &html[..at], tag, &html[at..]),
        None => format!("{}\n{}", tag, html),
    }
}

/// Insert a module script before `</body>`, or at the end when the document
/// has no body
pub fn inject_script(html: &str, src: &str) -> String {
    let tag = format!(
        r#"<script type="module" src="{}"></script>"#,
        escape_attr(src)
    );
    match find_tag(html, "</body>", true) {
        Some(at) => format!("{}{}\n{}", &html[..at], tag, &html[at..]),
        None => format!("{}\n{}", html, tag),
    }
}
