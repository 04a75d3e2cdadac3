use crate::document::{Block, LessonDocument, Section, Shade, Subsection, TextStyle};

const STYLE: &str = r#"
        * { box-sizing: border-box; }
        body {
            font-family: Aptos, 'Segoe UI', Roboto, sans-serif;
            font-size: 11pt;
            line-height: 1.5;
            color: #0f172a;
            margin: 0;
            padding: 24px;
        }
        .lesson-plan { max-width: 900px; margin: 0 auto; }
        .lesson-plan h1 { font-size: 18pt; text-transform: uppercase; margin: 0; }
        .lesson-plan .subtitle { font-size: 10pt; color: #475569; margin: 4px 0 16px; }
        .meta { width: 100%; border-collapse: collapse; margin-bottom: 24px; }
        .meta td { border: 1px solid #0f172a; padding: 6px 8px; }
        .section { margin-top: 24px; }
        .section h2 { color: #fff; padding: 6px 10px; font-size: 12pt; text-transform: uppercase; }
        .shade-dark h2 { background: #000; }
        .shade-highlight h2 { background: #1e3a8a; }
        .subsection { margin: 12px 0 12px 24px; }
        .subsection h3 { font-size: 11pt; text-transform: uppercase; margin: 0; }
        .subsection .sub-subtitle { font-size: 8pt; color: #94a3b8; text-transform: uppercase; }
        .body { white-space: pre-wrap; }
        .emphasis { font-style: italic; }
        .missing { color: #b91c1c; font-style: italic; }
        .caption { font-size: 9pt; font-weight: 700; text-transform: uppercase; color: #64748b; }
        pre.assessment { font-family: 'Cascadia Mono', Consolas, monospace; white-space: pre-wrap; background: #f8fafc; padding: 16px; }
        blockquote { margin: 0; padding: 16px; background: #eef2ff; font-style: italic; }
        .warnings { background: #fff3cd; border: 1px solid #ffc107; padding: 8px; font-size: 9pt; }
        .signatures { display: flex; gap: 24px; margin-top: 48px; text-align: center; }
        .signatures div { flex: 1; border-top: 2px solid #0f172a; padding-top: 6px; }
        .disclaimer { font-size: 8pt; font-style: italic; color: #666; margin-top: 32px; }
        .actions { display: flex; gap: 8px; margin-bottom: 16px; }
        @media print {
            body { padding: 0; }
            .no-print { display: none !important; }
            .section { page-break-inside: avoid; }
        }
"#;

/// Escapes & < > " ' for safe inclusion in markup.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

fn style_class(style: TextStyle) -> &'static str {
    match style {
        TextStyle::Plain => "body",
        TextStyle::Emphasis => "body emphasis",
        TextStyle::Placeholder => "body missing",
    }
}

fn push_list(html: &mut String, tag: &str, caption: &Option<String>, items: &[String]) {
    if let Some(c) = caption {
        html.push_str(&format!("<div class=\"caption\">{}</div>\n", escape_html(c)));
    }
    html.push_str(&format!("<{tag}>\n"));
    for item in items {
        html.push_str(&format!("<li>{}</li>\n", escape_html(item)));
    }
    html.push_str(&format!("</{tag}>\n"));
}

fn push_block(html: &mut String, block: &Block) {
    match block {
        Block::Paragraph { text, style } => html.push_str(&format!(
            "<p class=\"{}\">{}</p>\n",
            style_class(*style),
            escape_html(text)
        )),
        Block::Field { label, text, style } => html.push_str(&format!(
            "<p><strong>{}:</strong> <span class=\"{}\">{}</span></p>\n",
            escape_html(label),
            style_class(*style),
            escape_html(text)
        )),
        Block::BulletList { caption, items } => push_list(html, "ul", caption, items),
        Block::NumberedList { caption, items } => push_list(html, "ol", caption, items),
        Block::Preformatted { text } => html.push_str(&format!(
            "<pre class=\"assessment\">{}</pre>\n",
            escape_html(text)
        )),
        Block::Quote { caption, text } => {
            html.push_str("<blockquote>\n");
            html.push_str(&format!("<div class=\"caption\">{}</div>\n", escape_html(caption)));
            html.push_str(&format!("<p class=\"body\">\"{}\"</p>\n", escape_html(text)));
            html.push_str("</blockquote>\n");
        }
    }
}

fn push_subsection(html: &mut String, sub: &Subsection) {
    html.push_str("<div class=\"subsection\">\n");
    if !sub.title.is_empty() {
        let heading = match &sub.label {
            Some(label) => format!("{}. {}", label, sub.title),
            None => sub.title.clone(),
        };
        html.push_str(&format!("<h3>{}</h3>\n", escape_html(&heading)));
    }
    if let Some(subtitle) = &sub.subtitle {
        html.push_str(&format!(
            "<div class=\"sub-subtitle\">{}</div>\n",
            escape_html(subtitle)
        ));
    }
    for block in &sub.blocks {
        push_block(html, block);
    }
    html.push_str("</div>\n");
}

fn push_section(html: &mut String, section: &Section) {
    let shade = match section.shade {
        Shade::Dark => "shade-dark",
        Shade::Highlight => "shade-highlight",
    };
    html.push_str(&format!("<section class=\"section {shade}\">\n"));
    html.push_str(&format!(
        "<h2>{}. {}</h2>\n",
        section.index,
        escape_html(&section.title)
    ));
    for sub in &section.subsections {
        push_subsection(html, sub);
    }
    html.push_str("</section>\n");
}

/// The lesson as an embeddable `<article>`.
pub fn html_fragment(doc: &LessonDocument) -> String {
    let mut html = String::new();
    html.push_str("<article class=\"lesson-plan\">\n");
    html.push_str(&format!("<h1>{}</h1>\n", escape_html(&doc.title)));
    html.push_str(&format!(
        "<p class=\"subtitle\">{}</p>\n",
        escape_html(doc.subtitle)
    ));

    if !doc.warnings.is_empty() {
        html.push_str("<div class=\"warnings no-print\">\n<strong>Review:</strong>\n<ul>\n");
        for w in &doc.warnings {
            html.push_str(&format!("<li>{}</li>\n", escape_html(w)));
        }
        html.push_str("</ul>\n</div>\n");
    }

    // Four cells on the first row, two wide cells on the second.
    html.push_str("<table class=\"meta\">\n<tr>");
    for (i, field) in doc.metadata.iter().enumerate() {
        if i == 4 {
            html.push_str("</tr>\n<tr>");
        }
        let span = if i >= 4 { " colspan=\"2\"" } else { "" };
        html.push_str(&format!(
            "<td{}><strong>{}:</strong> {}</td>",
            span,
            escape_html(field.label),
            escape_html(&field.value)
        ));
    }
    html.push_str("</tr>\n</table>\n");

    for section in &doc.sections {
        push_section(&mut html, section);
    }

    html.push_str("<div class=\"signatures\">\n");
    for sig in &doc.signatures {
        html.push_str(&format!(
            "<div><strong>{}</strong><br>{}</div>\n",
            escape_html(sig.caption),
            escape_html(sig.role)
        ));
    }
    html.push_str("</div>\n");
    html.push_str(&format!(
        "<p class=\"disclaimer\">{}</p>\n",
        escape_html(doc.disclaimer)
    ));
    html.push_str("</article>\n");
    html
}

/// Standalone page for the browser print dialog. Action chrome is hidden on paper.
pub fn print_page(doc: &LessonDocument) -> String {
    let mut html = String::new();
    html.push_str(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>"#,
    );
    html.push_str(&escape_html(&doc.title));
    html.push_str("</title>\n    <style>");
    html.push_str(STYLE);
    html.push_str("    </style>\n</head>\n<body>\n");
    html.push_str(
        "<nav class=\"actions no-print\">\n\
         <button data-action=\"exportDocx\">Microsoft Word</button>\n\
         <button data-action=\"print\">Print Document</button>\n\
         <button data-action=\"copyText\">Copy Text Content</button>\n\
         <span>AI content must be reviewed for curriculum accuracy before submission.</span>\n\
         </nav>\n",
    );
    html.push_str(&html_fragment(doc));
    html.push_str("</body>\n</html>");
    html
}

fn push_text_block(out: &mut String, block: &Block) {
    match block {
        Block::Paragraph { text, .. } | Block::Preformatted { text } => {
            out.push_str(text);
            out.push('\n');
        }
        Block::Field { label, text, .. } => out.push_str(&format!("{label}: {text}\n")),
        Block::BulletList { caption, items } => {
            if let Some(c) = caption {
                out.push_str(&format!("{c}:\n"));
            }
            for item in items {
                out.push_str(&format!("\u{2022} {item}\n"));
            }
        }
        Block::NumberedList { caption, items } => {
            if let Some(c) = caption {
                out.push_str(&format!("{c}:\n"));
            }
            for (i, item) in items.iter().enumerate() {
                out.push_str(&format!("{}. {}\n", i + 1, item));
            }
        }
        Block::Quote { caption, text } => out.push_str(&format!("{caption}:\n\"{text}\"\n")),
    }
}

/// Plain-text rendering, in reading order, for the clipboard.
pub fn plain_text(doc: &LessonDocument) -> String {
    let mut out = String::new();
    out.push_str(&doc.title);
    out.push('\n');
    out.push_str(doc.subtitle);
    out.push_str("\n\n");
    for field in &doc.metadata {
        out.push_str(&format!("{}: {}\n", field.label, field.value));
    }

    for section in &doc.sections {
        out.push_str(&format!("\n{}. {}\n", section.index, section.title.to_uppercase()));
        for sub in &section.subsections {
            if !sub.title.is_empty() {
                match &sub.label {
                    Some(label) => out.push_str(&format!("\n{}. {}\n", label, sub.title)),
                    None => out.push_str(&format!("\n{}\n", sub.title)),
                }
            }
            if let Some(subtitle) = &sub.subtitle {
                out.push_str(subtitle);
                out.push('\n');
            }
            for block in &sub.blocks {
                push_text_block(&mut out, block);
            }
        }
    }

    out.push('\n');
    for sig in &doc.signatures {
        out.push_str(&format!("{} {}\n", sig.caption, sig.role));
    }
    out.push('\n');
    out.push_str(doc.disclaimer);
    out.push('\n');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::MISSING_CONTENT;
    use crate::generate::{cell_payload, parse_plan_text};
    use crate::plan::{FourAsProcedure, GenerationRequest, Procedure};

    fn cell_doc(model: &str) -> LessonDocument {
        let plan = parse_plan_text(&cell_payload(model).to_string(), &GenerationRequest::default())
            .expect("plan");
        LessonDocument::from_plan(&plan)
    }

    #[test]
    fn escapes_markup() {
        assert_eq!(escape_html("<script>"), "&lt;script&gt;");
        assert_eq!(escape_html("Tom & Jerry's"), "Tom &amp; Jerry&#39;s");
    }

    #[test]
    fn fragment_lists_sections_in_order() {
        let html = html_fragment(&cell_doc("MATATAG Standard"));
        let positions: Vec<usize> = [
            "<h2>I. ",
            "<h2>II. ",
            "<h2>III. ",
            "<h2>IV. ",
            "<h2>V. ",
        ]
        .iter()
        .map(|h| html.find(h).expect("section heading"))
        .collect();
        assert!(positions.windows(2).all(|w| w[0] < w[1]));
        assert!(html.contains("QUIZ: THE CELL"));
        assert!(html.contains("--- ANSWER KEY ---"));
        assert!(html.contains("Integration Idea by Jade N. Bucatcat"));
    }

    #[test]
    fn missing_step_renders_placeholder() {
        let mut plan = parse_plan_text(
            &cell_payload("4As Model").to_string(),
            &GenerationRequest::default(),
        )
        .expect("plan");
        plan.procedure = Procedure::FourAs(FourAsProcedure::default());
        let doc = LessonDocument::from_plan(&plan);
        let html = html_fragment(&doc);
        assert_eq!(
            html.matches(&format!("<p class=\"body missing\">{MISSING_CONTENT}</p>")).count(),
            4
        );
        assert_eq!(plain_text(&doc).matches(MISSING_CONTENT).count(), 4);
    }

    #[test]
    fn absent_five_e_block_renders_five_placeholders() {
        let mut payload = cell_payload("5E Model");
        payload["procedures"]
            .as_object_mut()
            .expect("procedures")
            .remove("fiveE");
        let plan = parse_plan_text(&payload.to_string(), &GenerationRequest::default())
            .expect("plan");
        let html = html_fragment(&LessonDocument::from_plan(&plan));
        assert_eq!(
            html.matches(&format!("<p class=\"body missing\">{MISSING_CONTENT}</p>")).count(),
            5
        );
        assert!(html.contains("Engage"));
        assert!(!html.contains("Activating Prior Knowledge"));
        assert!(!html.contains("Cell puzzle."));
    }

    #[test]
    fn print_page_hides_actions() {
        let page = print_page(&cell_doc("5E Model"));
        assert!(page.starts_with("<!DOCTYPE html>"));
        assert!(page.contains("@media print"));
        assert!(page.contains(".no-print { display: none !important; }"));
        assert!(page.contains("<nav class=\"actions no-print\">"));
        assert!(page.contains("<article class=\"lesson-plan\">"));
    }

    #[test]
    fn plain_text_keeps_quiz_layout() {
        let doc = cell_doc("5E Model");
        let text = plain_text(&doc);
        assert!(text.starts_with("DETAILED LESSON PLAN IN SCIENCE\n"));
        assert!(text.contains("\nV. JADE'S CREATIVE SPARK\n"));
        assert!(text.contains("1. What is the control center of the cell?\n   a. Nucleus\n"));
        assert!(text.contains("a. Engage\nShow a magnified photo of cork.\n"));
    }
}
