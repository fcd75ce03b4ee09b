//! HTML rendering for the upload page

use std::fmt::Write;

use crate::transfer::{Conversion, IMAGE_FIELD};

/// Route the upload form posts to
pub const CONVERT_ROUTE: &str = "/convert";

/// Everything the upload page can show besides the form itself
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Page {
    pub error: Option<String>,
    pub original_base64: Option<String>,
    pub depth_base64: Option<String>,
}

impl Page {
    pub fn with_error(message: impl Into<String>) -> Self {
        Self {
            error: Some(message.into()),
            ..Self::default()
        }
    }
}

impl From<Conversion> for Page {
    fn from(conversion: Conversion) -> Self {
        Self {
            error: None,
            original_base64: Some(conversion.original_base64),
            depth_base64: Some(conversion.depth_base64),
        }
    }
}

const HEAD: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="utf-8">
  <title>Pseudo-3D Depth Viewer</title>
  <style>
    body { font-family: sans-serif; margin: 2rem; }
    .error { color: #b00020; }
    .results { display: flex; gap: 2rem; flex-wrap: wrap; }
    .results img { max-width: 480px; }
  </style>
</head>
<body>
  <h1>Pseudo-3D Depth Viewer</h1>
"#;

const TAIL: &str = "</body>\n</html>\n";

/// Render the full page
pub fn render(page: &Page) -> String {
    let mut html = String::from(HEAD);

    // Writing into a String never fails
    let _ = writeln!(
        html,
        r#"  <form action="{CONVERT_ROUTE}" method="post" enctype="multipart/form-data">
    <input type="file" name="{IMAGE_FIELD}" accept="image/*" required>
    <button type="submit">Convert</button>
  </form>"#
    );

    if let Some(error) = &page.error {
        let _ = writeln!(html, r#"  <p class="error">{}</p>"#, escape(error));
    }

    if page.original_base64.is_some() || page.depth_base64.is_some() {
        html.push_str("  <div class=\"results\">\n");
        if let Some(original) = &page.original_base64 {
            push_figure(&mut html, "Original", original);
        }
        if let Some(depth) = &page.depth_base64 {
            push_figure(&mut html, "Pseudo-3D depth", depth);
        }
        html.push_str("  </div>\n");
    }

    html.push_str(TAIL);
    html
}

fn push_figure(html: &mut String, caption: &str, base64_png: &str) {
    let _ = writeln!(
        html,
        r#"    <figure>
      <img src="data:image/png;base64,{base64_png}" alt="{caption}">
      <figcaption>{caption}</figcaption>
    </figure>"#
    );
}

/// Escape text for use in HTML element content and attribute values
pub fn escape(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_page_has_only_the_form() {
        let html = render(&Page::default());

        assert!(html.contains(r#"action="/convert""#));
        assert!(html.contains(r#"enctype="multipart/form-data""#));
        assert!(html.contains(r#"name="image""#));
        assert!(!html.contains("class=\"error\""));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn error_message_is_escaped() {
        let html = render(&Page::with_error("Processing failed: <script>&"));

        assert!(html.contains("Processing failed: &lt;script&gt;&amp;"));
        assert!(!html.contains("<script>"));
    }

    #[test]
    fn images_are_embedded_as_data_uris() {
        let page = Page::from(Conversion {
            original_base64: "T1JJRw==".into(),
            depth_base64: "REVQVEg=".into(),
            dimensions: (1, 1),
        });
        let html = render(&page);

        assert!(html.contains(r#"src="data:image/png;base64,T1JJRw==""#));
        assert!(html.contains(r#"src="data:image/png;base64,REVQVEg=""#));
        assert!(html.find("T1JJRw==").unwrap() < html.find("REVQVEg=").unwrap());
    }

    #[test]
    fn escape_leaves_plain_text_alone() {
        assert_eq!(escape("No image uploaded"), "No image uploaded");
        assert_eq!(escape(r#"a"b'c"#), "a&quot;b&#x27;c");
    }
}
