//! HTML composition: Markdown → self-contained printable page.
//!
//! ## Why rewrite diagram fences?
//!
//! Mermaid only picks up `<div class="mermaid">` containers. A fenced
//! ```` ```mermaid ```` block would otherwise come out of the Markdown
//! renderer as `<pre><code class="language-mermaid">` and print as source
//! text. The rewrite happens on the parser's event stream, so the diagram
//! source never goes through the code-block renderer at all.
//!
//! ## Readiness protocol
//!
//! The browser prints once its virtual time budget is spent, so the page has
//! to settle inside that budget. The inline script sets
//! `window.mermaidReady`:
//!
//! * immediately, when the page has no diagram containers;
//! * a short settle delay after the last container gains an `<svg>` child,
//!   checked every `poll_interval_ms`;
//! * from a per-container deadline (`render_timeout_ms`) that counts a
//!   container as done even if it never renders, so a broken diagram or an
//!   unreachable CDN cannot stall the document.

use crate::config::ComposeOptions;
use crate::pipeline::style::PDF_CSS;
use pulldown_cmark::{html, CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd};

/// Fence info-string language that marks a diagram block.
pub const DIAGRAM_LANGUAGE: &str = "mermaid";

/// A composed page plus what the composer saw on the way.
#[derive(Debug, Clone)]
pub struct ComposedHtml {
    pub html: String,
    /// Number of `<div class="mermaid">` containers in the body.
    pub diagrams: usize,
}

/// Compose a complete HTML document for `markdown`.
///
/// `title` ends up in `<title>` (escaped). Pure function, no I/O.
pub fn compose_html(markdown: &str, title: &str, options: &ComposeOptions) -> ComposedHtml {
    let (body, diagrams) = markdown_to_html(markdown);
    let css = options.stylesheet.as_deref().unwrap_or(PDF_CSS);

    let html = format!(
        r#"<!DOCTYPE html>
<html lang="{lang}">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title}</title>
    <script src="{library}"></script>
    <style>
{css}
    </style>
</head>
<body>
{body}
    <script>
{script}
    </script>
</body>
</html>
"#,
        lang = html_escape::encode_double_quoted_attribute(&options.lang),
        title = html_escape::encode_text(title),
        library = html_escape::encode_double_quoted_attribute(&options.diagram_library_url),
        css = css,
        body = body,
        script = readiness_script(options),
    );

    ComposedHtml { html, diagrams }
}

/// Render Markdown to an HTML fragment.
///
/// Soft line breaks become `<br />`; tables, footnotes, strikethrough and task
/// lists are enabled. Diagram fences become `<div class="mermaid">` with the
/// source HTML-escaped. Returns the fragment and the diagram count.
pub fn markdown_to_html(markdown: &str) -> (String, usize) {
    let mut options = Options::empty();
    options.insert(Options::ENABLE_TABLES);
    options.insert(Options::ENABLE_FOOTNOTES);
    options.insert(Options::ENABLE_STRIKETHROUGH);
    options.insert(Options::ENABLE_TASKLISTS);

    let mut diagrams = 0;
    // Source of the diagram fence currently being collected, if any.
    let mut diagram: Option<String> = None;
    let mut events: Vec<Event> = Vec::new();

    for event in Parser::new_ext(markdown, options) {
        match event {
            Event::Start(Tag::CodeBlock(CodeBlockKind::Fenced(ref info)))
                if is_diagram_fence(info) =>
            {
                diagram = Some(String::new());
            }
            Event::Text(ref text) if diagram.is_some() => {
                if let Some(source) = diagram.as_mut() {
                    source.push_str(text);
                }
            }
            Event::End(TagEnd::CodeBlock) if diagram.is_some() => {
                let source = diagram.take().unwrap_or_default();
                diagrams += 1;
                events.push(Event::Html(CowStr::from(format!(
                    "<div class=\"mermaid\">{}</div>\n",
                    html_escape::encode_text(&source)
                ))));
            }
            Event::SoftBreak => events.push(Event::HardBreak),
            other => events.push(other),
        }
    }

    let mut out = String::with_capacity(markdown.len() * 3 / 2);
    html::push_html(&mut out, events.into_iter());
    (out, diagrams)
}

fn is_diagram_fence(info: &str) -> bool {
    info.split_whitespace().next() == Some(DIAGRAM_LANGUAGE)
}

/// The inline script that initialises Mermaid and drives `window.mermaidReady`.
pub fn readiness_script(options: &ComposeOptions) -> String {
    // A JSON string literal is a valid JS string literal. `<` is escaped so
    // the value cannot close the inline <script>.
    let theme = serde_json::to_string(&options.diagram_theme)
        .unwrap_or_else(|_| "\"default\"".to_string())
        .replace('<', "\\u003c");

    READINESS_SCRIPT
        .replace("__THEME__", &theme)
        .replace("__POLL_MS__", &options.poll_interval_ms.to_string())
        .replace("__SETTLE_MS__", &options.settle_delay_ms.to_string())
        .replace("__TIMEOUT_MS__", &options.render_timeout_ms.to_string())
}

const READINESS_SCRIPT: &str = r#"        if (window.mermaid) {
            mermaid.initialize({
                startOnLoad: true,
                theme: __THEME__,
                securityLevel: 'loose'
            });
        }

        (function () {
            var containers = document.querySelectorAll('.mermaid');
            var total = containers.length;

            if (total === 0) {
                window.mermaidReady = true;
                return;
            }

            var settled = 0;
            containers.forEach(function (container) {
                var done = false;

                var poll = setInterval(function () {
                    if (!done && container.querySelector('svg')) {
                        done = true;
                        clearInterval(poll);
                        settled++;
                        if (settled === total) {
                            setTimeout(function () {
                                window.mermaidReady = true;
                            }, __SETTLE_MS__);
                        }
                    }
                }, __POLL_MS__);

                setTimeout(function () {
                    if (done) {
                        return;
                    }
                    done = true;
                    clearInterval(poll);
                    settled++;
                    if (settled === total) {
                        window.mermaidReady = true;
                    }
                }, __TIMEOUT_MS__);
            });
        })();"#;

#[cfg(test)]
mod tests {
    use super::*;

    const READY: &str = "window.mermaidReady = true";

    fn compose(md: &str) -> ComposedHtml {
        compose_html(md, "doc", &ComposeOptions::default())
    }

    #[test]
    fn soft_breaks_become_hard_breaks() {
        let (html, _) = markdown_to_html("line one\nline two\n");
        assert!(html.contains("line one<br />"), "got: {html}");
        assert!(html.contains("line two"), "got: {html}");
    }

    #[test]
    fn tables_are_rendered() {
        let (html, _) = markdown_to_html("| a | b |\n|---|---|\n| 1 | 2 |\n");
        assert!(html.contains("<table>"), "got: {html}");
        assert!(html.contains("<td>1</td>"), "got: {html}");
    }

    #[test]
    fn mermaid_fence_becomes_container() {
        let md = "# Flow\n\n```mermaid\ngraph TD\n  A-->B\n```\n";
        let (html, diagrams) = markdown_to_html(md);
        assert_eq!(diagrams, 1);
        assert!(
            html.contains("<div class=\"mermaid\">graph TD\n  A--&gt;B\n</div>"),
            "got: {html}"
        );
        assert!(!html.contains("language-mermaid"), "got: {html}");
        assert!(!html.contains("<pre>"), "got: {html}");
    }

    #[test]
    fn other_fences_stay_code_blocks() {
        let md = "```rust\nfn main() {}\n```\n\n```mermaidish\nx\n```\n";
        let (html, diagrams) = markdown_to_html(md);
        assert_eq!(diagrams, 0);
        assert!(html.contains("<pre><code class=\"language-rust\">"), "got: {html}");
        assert!(html.contains("language-mermaidish"), "got: {html}");
    }

    #[test]
    fn fence_info_after_language_is_ignored() {
        let (html, diagrams) = markdown_to_html("```mermaid title=x\npie\n```\n");
        assert_eq!(diagrams, 1);
        assert!(html.contains("<div class=\"mermaid\">pie\n</div>"), "got: {html}");
    }

    #[test]
    fn diagram_source_is_escaped() {
        let (html, _) = markdown_to_html("```mermaid\nA[\"<b>x</b>\"] --> B\n```\n");
        assert!(html.contains("&lt;b&gt;x&lt;/b&gt;"), "got: {html}");
    }

    #[test]
    fn document_shell_embeds_library_style_and_body() {
        let out = compose("Hello *world*");
        assert!(out.html.starts_with("<!DOCTYPE html>"));
        assert!(out.html.contains(
            "<script src=\"https://cdn.jsdelivr.net/npm/mermaid/dist/mermaid.min.js\"></script>"
        ));
        assert!(out.html.contains(PDF_CSS));
        assert!(out.html.contains("<p>Hello <em>world</em></p>"));
        assert!(out.html.contains("<title>doc</title>"));
        assert!(out.html.contains("mermaid.initialize"));
    }

    #[test]
    fn title_is_escaped() {
        let out = compose_html("x", "a <b> & c", &ComposeOptions::default());
        assert!(out.html.contains("<title>a &lt;b&gt; &amp; c</title>"));
    }

    #[test]
    fn custom_stylesheet_replaces_default() {
        let options = ComposeOptions {
            stylesheet: Some("body { color: red; }".into()),
            ..ComposeOptions::default()
        };
        let out = compose_html("x", "t", &options);
        assert!(out.html.contains("body { color: red; }"));
        assert!(!out.html.contains("size: A4;"));
    }

    #[test]
    fn readiness_without_diagrams_precedes_poll_loop() {
        let out = compose("no diagrams here");
        assert_eq!(out.diagrams, 0);
        let script = readiness_script(&ComposeOptions::default());
        let ready = script.find(READY).unwrap();
        let first_interval = script.find("setInterval").unwrap();
        assert!(ready < first_interval);
        // The early readiness sits in the zero-container branch and returns.
        let branch = &script[script.find("if (total === 0)").unwrap()..first_interval];
        assert!(branch.contains(READY));
        assert!(branch.contains("return;"));
    }

    #[test]
    fn timeout_handler_forces_readiness() {
        let options = ComposeOptions {
            render_timeout_ms: 7_500,
            ..ComposeOptions::default()
        };
        let script = readiness_script(&options);
        let deadline = script.find("}, 7500);").expect("timeout registered");
        let handler_start = script[..deadline].rfind("setTimeout(function () {").unwrap();
        let handler = &script[handler_start..deadline];
        assert!(handler.contains("clearInterval(poll)"));
        assert!(handler.contains(READY));
    }

    #[test]
    fn poll_interval_and_settle_delay_are_configurable() {
        let options = ComposeOptions {
            poll_interval_ms: 250,
            settle_delay_ms: 50,
            diagram_theme: "dark".into(),
            ..ComposeOptions::default()
        };
        let script = readiness_script(&options);
        assert!(script.contains("}, 250);"));
        assert!(script.contains("}, 50);"));
        assert!(script.contains("theme: \"dark\""));
        assert!(!script.contains("__"));
    }

    #[test]
    fn theme_cannot_break_out_of_string() {
        let options = ComposeOptions {
            diagram_theme: "x'; alert(1); '".into(),
            ..ComposeOptions::default()
        };
        let script = readiness_script(&options);
        assert!(script.contains(r#"theme: "x'; alert(1); '""#));
    }

    #[test]
    fn theme_cannot_close_the_script_element() {
        let options = ComposeOptions {
            diagram_theme: "</script><script>alert(1)</script>".into(),
            ..ComposeOptions::default()
        };
        let page = compose_html("# t", "t", &options).html;
        assert_eq!(page.matches("</script>").count(), 2, "got: {page}");
        assert!(page.contains(r#"theme: "\u003c/script>\u003cscript>alert(1)\u003c/script>""#));
    }
}
