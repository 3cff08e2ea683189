pub mod pages;

pub use pages::{about, contact, error_page, index, training, IndexContext, ResultView};

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape_html(input: &str) -> String {
    let mut escaped = String::with_capacity(input.len());
    for c in input.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#x27;"),
            _ => escaped.push(c),
        }
    }
    escaped
}

const STYLE: &str = r#"
body { font-family: sans-serif; margin: 0; background: #f7f5ef; color: #2d2a24; }
nav { background: #6b8e23; padding: 0.75rem 1.5rem; }
nav a { color: #fff; margin-right: 1.25rem; text-decoration: none; font-weight: bold; }
main { max-width: 860px; margin: 2rem auto; padding: 0 1rem; }
.flash { background: #fde2e1; border: 1px solid #e0a3a0; padding: 0.75rem; margin-bottom: 1rem; }
.result img { max-width: 320px; border: 1px solid #ccc; }
table { border-collapse: collapse; width: 100%; }
th, td { border: 1px solid #c9c4b5; padding: 0.5rem; text-align: left; vertical-align: top; }
"#;

pub(crate) fn layout(title: &str, body: &str) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
<meta charset="utf-8">
<meta name="viewport" content="width=device-width, initial-scale=1">
<title>{title} | Poultry Disease Detection</title>
<style>{STYLE}</style>
</head>
<body>
<nav>
<a href="/">Home</a>
<a href="/training">Training</a>
<a href="/about">About</a>
<a href="/contact">Contact</a>
</nav>
<main>
{body}
</main>
</body>
</html>
"#,
        title = escape_html(title),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html(r#"<script>alert("x&y")</script>"#),
            "&lt;script&gt;alert(&quot;x&amp;y&quot;)&lt;/script&gt;"
        );
        assert_eq!(escape_html("hen's.png"), "hen&#x27;s.png");
    }

    #[test]
    fn layout_wraps_body_and_escapes_title() {
        let html = layout("<About>", "<p>hello</p>");
        assert!(html.contains("<title>&lt;About&gt; | Poultry Disease Detection</title>"));
        assert!(html.contains("<p>hello</p>"));
    }
}
