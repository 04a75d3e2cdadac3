use crate::document::{Block, LessonDocument, Section, Subsection, TextStyle};
use anyhow::Context;
use quick_xml::events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event};
use quick_xml::Writer;
use regex::Regex;
use std::borrow::Cow;
use std::io::{Cursor, Write};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use zip::write::FileOptions;
use zip::{CompressionMethod, ZipWriter};

pub const DEFAULT_FONT: &str = "Aptos";
pub const FILE_SUFFIX: &str = "_MATATAG_Lesson_Plan.docx";

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/></Types>"#;

const PACKAGE_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/></Relationships>"#;

const WORD_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

#[derive(Debug, Clone, Copy, Default)]
struct RunStyle<'a> {
    bold: bool,
    italic: bool,
    /// Half-points.
    size: Option<u32>,
    color: Option<&'a str>,
}

impl<'a> RunStyle<'a> {
    fn bold() -> Self {
        Self { bold: true, ..Self::default() }
    }

    fn for_text(style: TextStyle) -> Self {
        match style {
            TextStyle::Plain => Self::default(),
            TextStyle::Emphasis => Self { italic: true, ..Self::default() },
            TextStyle::Placeholder => Self {
                italic: true,
                color: Some("B91C1C"),
                ..Self::default()
            },
        }
    }
}

#[derive(Debug, Clone, Copy, Default)]
struct ParaStyle<'a> {
    center: bool,
    before: Option<u32>,
    after: Option<u32>,
    shading: Option<&'a str>,
    top_border: bool,
}

struct DocWriter<'f> {
    w: Writer<Cursor<Vec<u8>>>,
    font: &'f str,
}

impl<'f> DocWriter<'f> {
    fn new(font: &'f str) -> Self {
        Self {
            w: Writer::new(Cursor::new(Vec::new())),
            font,
        }
    }

    fn start(&mut self, tag: &str, attrs: &[(&str, &str)]) -> anyhow::Result<()> {
        let el = BytesStart::new(tag).with_attributes(attrs.iter().copied());
        self.w.write_event(Event::Start(el))?;
        Ok(())
    }

    fn end(&mut self, tag: &str) -> anyhow::Result<()> {
        self.w.write_event(Event::End(BytesEnd::new(tag)))?;
        Ok(())
    }

    fn empty(&mut self, tag: &str, attrs: &[(&str, &str)]) -> anyhow::Result<()> {
        let el = BytesStart::new(tag).with_attributes(attrs.iter().copied());
        self.w.write_event(Event::Empty(el))?;
        Ok(())
    }

    /// One `w:r`; embedded newlines become `w:br`.
    fn run(&mut self, text: &str, style: RunStyle<'_>) -> anyhow::Result<()> {
        self.start("w:r", &[])?;
        self.start("w:rPr", &[])?;
        let font = self.font;
        self.empty(
            "w:rFonts",
            &[("w:ascii", font), ("w:hAnsi", font), ("w:cs", font)],
        )?;
        if style.bold {
            self.empty("w:b", &[])?;
        }
        if style.italic {
            self.empty("w:i", &[])?;
        }
        if let Some(color) = style.color {
            self.empty("w:color", &[("w:val", color)])?;
        }
        if let Some(size) = style.size {
            let size = size.to_string();
            self.empty("w:sz", &[("w:val", size.as_str())])?;
        }
        self.end("w:rPr")?;

        for (i, line) in text.split('\n').enumerate() {
            if i > 0 {
                self.empty("w:br", &[])?;
            }
            self.start("w:t", &[("xml:space", "preserve")])?;
            self.w.write_event(Event::Text(BytesText::new(&xml_text(line))))?;
            self.end("w:t")?;
        }
        self.end("w:r")
    }

    fn paragraph(&mut self, para: ParaStyle<'_>, runs: &[(&str, RunStyle<'_>)]) -> anyhow::Result<()> {
        self.start("w:p", &[])?;
        self.start("w:pPr", &[])?;
        if para.top_border {
            self.start("w:pBdr", &[])?;
            self.empty(
                "w:top",
                &[("w:val", "single"), ("w:sz", "4"), ("w:space", "1"), ("w:color", "000000")],
            )?;
            self.end("w:pBdr")?;
        }
        if let Some(fill) = para.shading {
            self.empty("w:shd", &[("w:val", "clear"), ("w:color", "auto"), ("w:fill", fill)])?;
        }
        if para.before.is_some() || para.after.is_some() {
            let before = para.before.unwrap_or(0).to_string();
            let after = para.after.unwrap_or(0).to_string();
            self.empty("w:spacing", &[("w:before", before.as_str()), ("w:after", after.as_str())])?;
        }
        if para.center {
            self.empty("w:jc", &[("w:val", "center")])?;
        }
        self.end("w:pPr")?;
        for (text, style) in runs {
            self.run(text, *style)?;
        }
        self.end("w:p")
    }

    fn spacer(&mut self, before: u32) -> anyhow::Result<()> {
        self.paragraph(
            ParaStyle { before: Some(before), ..ParaStyle::default() },
            &[],
        )
    }

    fn cell(&mut self, span: Option<u32>, para: ParaStyle<'_>, runs: &[(&str, RunStyle<'_>)]) -> anyhow::Result<()> {
        self.start("w:tc", &[])?;
        self.start("w:tcPr", &[])?;
        if let Some(span) = span {
            let span = span.to_string();
            self.empty("w:gridSpan", &[("w:val", span.as_str())])?;
        }
        self.end("w:tcPr")?;
        self.paragraph(para, runs)?;
        self.end("w:tc")
    }

    fn table_start(&mut self, columns: usize, borders: bool) -> anyhow::Result<()> {
        self.start("w:tbl", &[])?;
        self.start("w:tblPr", &[])?;
        self.empty("w:tblW", &[("w:w", "5000"), ("w:type", "pct")])?;
        let val = if borders { "single" } else { "none" };
        self.start("w:tblBorders", &[])?;
        for edge in ["w:top", "w:left", "w:bottom", "w:right", "w:insideH", "w:insideV"] {
            self.empty(edge, &[("w:val", val), ("w:sz", "4"), ("w:color", "000000")])?;
        }
        self.end("w:tblBorders")?;
        self.end("w:tblPr")?;
        self.start("w:tblGrid", &[])?;
        let width = (9360 / columns).to_string();
        for _ in 0..columns {
            self.empty("w:gridCol", &[("w:w", width.as_str())])?;
        }
        self.end("w:tblGrid")
    }

    fn into_bytes(self) -> Vec<u8> {
        self.w.into_inner().into_inner()
    }
}

fn write_metadata(dw: &mut DocWriter<'_>, doc: &LessonDocument) -> anyhow::Result<()> {
    dw.table_start(4, true)?;
    for row in [&doc.metadata[..doc.metadata.len().min(4)], &doc.metadata[doc.metadata.len().min(4)..]] {
        if row.is_empty() {
            continue;
        }
        let span = if row.len() < 4 { Some((4 / row.len()) as u32) } else { None };
        dw.start("w:tr", &[])?;
        for field in row {
            let label = format!("{}:", field.label);
            let value = format!(" {}", field.value);
            dw.cell(
                span,
                ParaStyle::default(),
                &[(label.as_str(), RunStyle::bold()), (value.as_str(), RunStyle::default())],
            )?;
        }
        dw.end("w:tr")?;
    }
    dw.end("w:tbl")
}

fn write_block(dw: &mut DocWriter<'_>, block: &Block) -> anyhow::Result<()> {
    let plain = ParaStyle::default();
    match block {
        Block::Paragraph { text, style } => {
            dw.paragraph(plain, &[(text.as_str(), RunStyle::for_text(*style))])
        }
        Block::Field { label, text, style } => {
            let label = format!("{label}:");
            let text = format!(" {text}");
            dw.paragraph(
                plain,
                &[(label.as_str(), RunStyle::bold()), (text.as_str(), RunStyle::for_text(*style))],
            )
        }
        Block::BulletList { caption, items } => {
            if let Some(c) = caption {
                dw.paragraph(plain, &[(format!("{c}:").as_str(), RunStyle::bold())])?;
            }
            for item in items {
                dw.paragraph(plain, &[(format!("\u{2022} {item}").as_str(), RunStyle::default())])?;
            }
            Ok(())
        }
        Block::NumberedList { caption, items } => {
            if let Some(c) = caption {
                dw.paragraph(plain, &[(format!("{c}:").as_str(), RunStyle::bold())])?;
            }
            for (i, item) in items.iter().enumerate() {
                dw.paragraph(plain, &[(format!("{}. {}", i + 1, item).as_str(), RunStyle::default())])?;
            }
            Ok(())
        }
        Block::Preformatted { text } => dw.paragraph(plain, &[(text.as_str(), RunStyle::default())]),
        Block::Quote { caption, text } => {
            dw.paragraph(
                ParaStyle { before: Some(200), ..plain },
                &[(format!("{caption}:").as_str(), RunStyle::bold())],
            )?;
            dw.paragraph(plain, &[(text.as_str(), RunStyle::for_text(TextStyle::Emphasis))])
        }
    }
}

fn write_subsection(dw: &mut DocWriter<'_>, sub: &Subsection) -> anyhow::Result<()> {
    if !sub.title.is_empty() {
        let heading = match &sub.label {
            Some(label) => format!("{}. {}", label, sub.title),
            None => format!("{}:", sub.title),
        };
        dw.paragraph(
            ParaStyle { before: Some(200), ..ParaStyle::default() },
            &[(heading.as_str(), RunStyle::bold())],
        )?;
    }
    if let Some(subtitle) = &sub.subtitle {
        dw.paragraph(
            ParaStyle::default(),
            &[(subtitle.as_str(), RunStyle { size: Some(16), color: Some("64748B"), ..RunStyle::default() })],
        )?;
    }
    for block in &sub.blocks {
        write_block(dw, block)?;
    }
    Ok(())
}

fn write_section(dw: &mut DocWriter<'_>, section: &Section) -> anyhow::Result<()> {
    dw.spacer(400)?;
    let heading = format!("{}. {}", section.index, section.title.to_uppercase());
    dw.paragraph(
        ParaStyle { shading: Some(section.shade.hex()), ..ParaStyle::default() },
        &[(heading.as_str(), RunStyle { bold: true, color: Some("FFFFFF"), ..RunStyle::default() })],
    )?;
    for sub in &section.subsections {
        write_subsection(dw, sub)?;
    }
    Ok(())
}

fn write_signatures(dw: &mut DocWriter<'_>, doc: &LessonDocument) -> anyhow::Result<()> {
    dw.table_start(doc.signatures.len().max(1), false)?;
    dw.start("w:tr", &[])?;
    for sig in &doc.signatures {
        let role = format!("\n{}", sig.role);
        dw.cell(
            None,
            ParaStyle { center: true, top_border: true, ..ParaStyle::default() },
            &[
                (sig.caption, RunStyle::bold()),
                (role.as_str(), RunStyle { size: Some(16), ..RunStyle::default() }),
            ],
        )?;
    }
    dw.end("w:tr")?;
    dw.end("w:tbl")
}

fn document_xml(doc: &LessonDocument, font: &str) -> anyhow::Result<Vec<u8>> {
    let mut dw = DocWriter::new(font);
    dw.w
        .write_event(Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), Some("yes"))))?;
    dw.start("w:document", &[("xmlns:w", WORD_NS)])?;
    dw.start("w:body", &[])?;

    dw.paragraph(
        ParaStyle { center: true, ..ParaStyle::default() },
        &[(doc.title.as_str(), RunStyle { bold: true, size: Some(28), ..RunStyle::default() })],
    )?;
    dw.paragraph(
        ParaStyle { center: true, after: Some(400), ..ParaStyle::default() },
        &[(doc.subtitle, RunStyle { size: Some(20), ..RunStyle::default() })],
    )?;
    write_metadata(&mut dw, doc)?;

    for section in &doc.sections {
        write_section(&mut dw, section)?;
    }

    dw.spacer(800)?;
    write_signatures(&mut dw, doc)?;
    dw.spacer(600)?;
    dw.paragraph(
        ParaStyle::default(),
        &[(
            doc.disclaimer,
            RunStyle { italic: true, size: Some(16), color: Some("666666"), ..RunStyle::default() },
        )],
    )?;

    dw.start("w:sectPr", &[])?;
    dw.empty("w:pgSz", &[("w:w", "12240"), ("w:h", "15840")])?;
    dw.empty(
        "w:pgMar",
        &[("w:top", "1440"), ("w:right", "1440"), ("w:bottom", "1440"), ("w:left", "1440")],
    )?;
    dw.end("w:sectPr")?;

    dw.end("w:body")?;
    dw.end("w:document")?;
    Ok(dw.into_bytes())
}

// Characters XML 1.0 cannot carry at all, escaped or not.
fn xml_forbidden(c: char) -> bool {
    ((c as u32) < 0x20 && !matches!(c, '\t' | '\n' | '\r'))
        || matches!(c, '\u{FFFE}' | '\u{FFFF}')
}

fn xml_text(text: &str) -> Cow<'_, str> {
    if text.chars().any(xml_forbidden) {
        Cow::Owned(text.chars().filter(|c| !xml_forbidden(*c)).collect())
    } else {
        Cow::Borrowed(text)
    }
}

fn core_xml(doc: &LessonDocument) -> String {
    let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ");
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{title}</dc:title><dc:subject>{topic}</dc:subject><dc:creator>MATATAG AI Intelligence</dc:creator><dcterms:created xsi:type="dcterms:W3CDTF">{now}</dcterms:created><dcterms:modified xsi:type="dcterms:W3CDTF">{now}</dcterms:modified></cp:coreProperties>"#,
        title = quick_xml::escape::escape(xml_text(&doc.title).as_ref()),
        topic = quick_xml::escape::escape(xml_text(&doc.topic).as_ref()),
        now = now,
    )
}

/// Serializes the document as a WordprocessingML package.
pub fn build_docx(doc: &LessonDocument, font: &str) -> anyhow::Result<Vec<u8>> {
    let body = document_xml(doc, font).context("failed to write document.xml")?;

    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let opts = FileOptions::default().compression_method(CompressionMethod::Deflated);
    let core = core_xml(doc);
    let parts: [(&str, &[u8]); 4] = [
        ("[Content_Types].xml", CONTENT_TYPES.as_bytes()),
        ("_rels/.rels", PACKAGE_RELS.as_bytes()),
        ("docProps/core.xml", core.as_bytes()),
        ("word/document.xml", &body),
    ];
    for (name, bytes) in parts {
        zip.start_file(name, opts)
            .with_context(|| format!("failed to start {name} entry"))?;
        zip.write_all(bytes)
            .with_context(|| format!("failed to write {name} entry"))?;
    }
    let cursor = zip.finish().context("failed to finalize docx package")?;
    Ok(cursor.into_inner())
}

fn whitespace_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\s+").expect("static regex"))
}

/// Longest file stem kept from the topic, in bytes.
const MAX_STEM_BYTES: usize = 150;

/// `<topic, whitespace runs as _>_MATATAG_Lesson_Plan.docx`; path separators never survive.
pub fn export_file_name(topic: &str) -> String {
    let stem = whitespace_runs().replace_all(topic, "_");
    let stem: String = stem
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    let mut end = stem.len().min(MAX_STEM_BYTES);
    while !stem.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}{FILE_SUFFIX}", &stem[..end])
}

/// Writes the package under `out_dir`. The final name only appears once every byte is on disk.
pub fn export_docx(doc: &LessonDocument, font: &str, out_dir: &Path) -> anyhow::Result<PathBuf> {
    let bytes = build_docx(doc, font)?;
    std::fs::create_dir_all(out_dir)
        .with_context(|| format!("failed to create directory {}", out_dir.to_string_lossy()))?;

    let file_name = export_file_name(&doc.topic);
    let final_path = out_dir.join(&file_name);
    let tmp_path = out_dir.join(format!(".{file_name}.partial"));
    std::fs::write(&tmp_path, &bytes)
        .with_context(|| format!("failed to write {}", tmp_path.to_string_lossy()))?;
    if let Err(e) = std::fs::rename(&tmp_path, &final_path) {
        let _ = std::fs::remove_file(&tmp_path);
        return Err(e).with_context(|| {
            format!("failed to move export into place at {}", final_path.to_string_lossy())
        });
    }
    Ok(final_path)
}
