//! The print stylesheet embedded in every composed page.

/// A4 print stylesheet applied verbatim to every document.
pub const PDF_CSS: &str = r#"
@page {
    size: A4;
    margin: 2.5cm 2cm;
}

body {
    font-family: 'DejaVu Sans', Arial, sans-serif;
    font-size: 11pt;
    line-height: 1.6;
    color: #333;
    padding: 0;
    max-width: 100%;
}

h1 {
    font-size: 24pt;
    color: #1a1a1a;
    margin-top: 30pt;
    margin-bottom: 15pt;
    page-break-after: avoid;
    border-bottom: 2px solid #333;
    padding-bottom: 10pt;
}

h2 {
    font-size: 18pt;
    color: #2a2a2a;
    margin-top: 25pt;
    margin-bottom: 12pt;
    page-break-after: avoid;
}

h3 {
    font-size: 14pt;
    color: #3a3a3a;
    margin-top: 20pt;
    margin-bottom: 10pt;
    page-break-after: avoid;
}

h4 {
    font-size: 12pt;
    color: #4a4a4a;
    margin-top: 15pt;
    margin-bottom: 8pt;
    page-break-after: avoid;
}

p {
    margin-bottom: 10pt;
    text-align: justify;
}

ul, ol {
    margin-bottom: 10pt;
    padding-left: 25pt;
}

li {
    margin-bottom: 5pt;
}

code {
    font-family: 'DejaVu Sans Mono', 'Courier New', monospace;
    font-size: 9pt;
    background-color: #f5f5f5;
    padding: 2pt 4pt;
    border-radius: 3pt;
}

pre {
    background-color: #f5f5f5;
    border: 1px solid #ddd;
    border-radius: 5pt;
    padding: 10pt;
    margin: 15pt 0;
    overflow-x: auto;
    page-break-inside: avoid;
}

pre code {
    background-color: transparent;
    padding: 0;
}

table {
    width: 100%;
    border-collapse: collapse;
    margin: 15pt 0;
    page-break-inside: avoid;
}

th, td {
    border: 1px solid #ddd;
    padding: 8pt;
    text-align: left;
}

th {
    background-color: #f0f0f0;
    font-weight: bold;
}

blockquote {
    border-left: 4px solid #ddd;
    padding-left: 15pt;
    margin: 15pt 0;
    color: #666;
    font-style: italic;
}

.mermaid {
    text-align: center;
    margin: 20pt 0;
    page-break-inside: avoid;
}

@media print {
    body {
        print-color-adjust: exact;
        -webkit-print-color-adjust: exact;
    }
}
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stylesheet_targets_a4_and_diagram_containers() {
        assert!(PDF_CSS.contains("size: A4;"));
        assert!(PDF_CSS.contains(".mermaid {"));
        assert!(PDF_CSS.contains("print-color-adjust: exact;"));
    }
}
