// src/listing.rs

// dependencies
use crate::fs::{FileInfo, Metadata};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};

// characters escaped when a file name becomes an href
const HREF: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// Renders the HTML index page for a directory's entries.
pub fn render_listing(mut entries: Vec<Metadata>) -> String {
    entries.sort_by(|a, b| a.name().cmp(b.name()));

    let mut page = String::from(
        "<!doctype html>\n<meta name=\"viewport\" content=\"width=device-width\">\n<pre>\n",
    );
    for entry in &entries {
        let mut name = entry.name().to_string();
        if entry.is_dir() {
            name.push('/');
        }

        let mut href = utf8_percent_encode(&name, HREF).to_string();
        // a colon in the first segment would read as a URL scheme
        if href.contains(':') {
            href.insert_str(0, "./");
        }

        page.push_str(&format!(
            "<a href=\"{}\">{}</a>\n",
            escape_html(&href),
            escape_html(&name)
        ));
    }
    page.push_str("</pre>\n");
    page
}

fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&#34;"),
            '\'' => escaped.push_str("&#39;"),
            other => escaped.push(other),
        }
    }
    escaped
}
