//! PowerPoint (PPTX) writer
//!
//! Produces a minimal PresentationML package: one master, one blank layout,
//! one theme, and one slide per [`Slide`]. Every slide gets a title text box
//! and, when it has body lines, a bulleted text box. Entry order and entry
//! timestamps are fixed so identical decks produce identical bytes.

use super::markdown::{parse_deck, Deck, Slide, SlideKind};
use super::theme::PresentationTheme;
use crate::error::{Result, SyllaboError};
use std::fmt::Write as _;
use std::io::{Cursor, Write};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, DateTime, ZipWriter};

const NS_A: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const NS_R: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const NS_P: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const NS_REL: &str = "http://schemas.openxmlformats.org/package/2006/relationships";
const REL_TYPE: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const XML_DECL: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#;

// 16:9 slide in EMU
const SLIDE_CX: i64 = 12_192_000;
const SLIDE_CY: i64 = 6_858_000;
const MARGIN: i64 = 457_200;

/// Encode a markdown slide outline as a PPTX package
pub fn encode_presentation(markdown: &str, theme: &PresentationTheme) -> Result<Vec<u8>> {
    let deck = parse_deck(markdown);
    tracing::debug!(
        slides = deck.slides.len(),
        theme = theme.name,
        "Encoding presentation"
    );
    write_deck(&deck, theme)
}

/// Write an already parsed deck
pub fn write_deck(deck: &Deck, theme: &PresentationTheme) -> Result<Vec<u8>> {
    let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
    let options = SimpleFileOptions::default()
        .compression_method(CompressionMethod::Deflated)
        .last_modified_time(DateTime::default())
        .unix_permissions(0o644);

    let slide_count = deck.slides.len();
    let title = deck.title.as_deref().unwrap_or("Presentation");

    let mut parts: Vec<(String, String)> = vec![
        ("[Content_Types].xml".to_string(), content_types(slide_count)),
        ("_rels/.rels".to_string(), root_rels()),
        ("docProps/core.xml".to_string(), core_props(title)),
        ("docProps/app.xml".to_string(), app_props(slide_count)),
        ("ppt/presentation.xml".to_string(), presentation(slide_count)),
        (
            "ppt/_rels/presentation.xml.rels".to_string(),
            presentation_rels(slide_count),
        ),
        (
            "ppt/slideMasters/slideMaster1.xml".to_string(),
            slide_master(theme),
        ),
        (
            "ppt/slideMasters/_rels/slideMaster1.xml.rels".to_string(),
            relationships(&[
                ("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml"),
                ("rId2", "theme", "../theme/theme1.xml"),
            ]),
        ),
        (
            "ppt/slideLayouts/slideLayout1.xml".to_string(),
            slide_layout(),
        ),
        (
            "ppt/slideLayouts/_rels/slideLayout1.xml.rels".to_string(),
            relationships(&[("rId1", "slideMaster", "../slideMasters/slideMaster1.xml")]),
        ),
        ("ppt/theme/theme1.xml".to_string(), theme_xml(theme)),
    ];

    for (i, slide) in deck.slides.iter().enumerate() {
        let n = i + 1;
        parts.push((format!("ppt/slides/slide{}.xml", n), slide_xml(slide, theme)));
        parts.push((
            format!("ppt/slides/_rels/slide{}.xml.rels", n),
            relationships(&[("rId1", "slideLayout", "../slideLayouts/slideLayout1.xml")]),
        ));
    }

    for (name, xml) in parts {
        zip.start_file(name.as_str(), options)?;
        zip.write_all(xml.as_bytes())
            .map_err(|e| SyllaboError::write_failed(&name, e))?;
    }

    let cursor = zip.finish()?;
    Ok(cursor.into_inner())
}

/// Escape text for XML content and attributes, dropping disallowed controls
pub(crate) fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' => out.push(' '),
            c if (c as u32) < 0x20 => {}
            c => out.push(c),
        }
    }
    out
}

fn content_types(slide_count: usize) -> String {
    let mut xml = format!(
        r#"{}<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/ppt/presentation.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"/><Override PartName="/ppt/slideMasters/slideMaster1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideMaster+xml"/><Override PartName="/ppt/slideLayouts/slideLayout1.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slideLayout+xml"/><Override PartName="/ppt/theme/theme1.xml" ContentType="application/vnd.openxmlformats-officedocument.theme+xml"/><Override PartName="/docProps/core.xml" ContentType="application/vnd.openxmlformats-package.core-properties+xml"/><Override PartName="/docProps/app.xml" ContentType="application/vnd.openxmlformats-officedocument.extended-properties+xml"/>"#,
        XML_DECL
    );
    for n in 1..=slide_count {
        let _ = write!(
            xml,
            r#"<Override PartName="/ppt/slides/slide{}.xml" ContentType="application/vnd.openxmlformats-officedocument.presentationml.slide+xml"/>"#,
            n
        );
    }
    xml.push_str("</Types>");
    xml
}

fn root_rels() -> String {
    format!(
        r#"{}<Relationships xmlns="{}"><Relationship Id="rId1" Type="{}/officeDocument" Target="ppt/presentation.xml"/><Relationship Id="rId2" Type="http://schemas.openxmlformats.org/package/2006/relationships/metadata/core-properties" Target="docProps/core.xml"/><Relationship Id="rId3" Type="{}/extended-properties" Target="docProps/app.xml"/></Relationships>"#,
        XML_DECL, NS_REL, REL_TYPE, REL_TYPE
    )
}

/// Relationships part from `(id, type suffix, target)` triples
fn relationships(entries: &[(&str, &str, &str)]) -> String {
    let mut xml = format!(r#"{}<Relationships xmlns="{}">"#, XML_DECL, NS_REL);
    for (id, kind, target) in entries {
        let _ = write!(
            xml,
            r#"<Relationship Id="{}" Type="{}/{}" Target="{}"/>"#,
            id, REL_TYPE, kind, target
        );
    }
    xml.push_str("</Relationships>");
    xml
}

fn core_props(title: &str) -> String {
    format!(
        r#"{}<cp:coreProperties xmlns:cp="http://schemas.openxmlformats.org/package/2006/metadata/core-properties" xmlns:dc="http://purl.org/dc/elements/1.1/" xmlns:dcterms="http://purl.org/dc/terms/" xmlns:xsi="http://www.w3.org/2001/XMLSchema-instance"><dc:title>{}</dc:title><dc:creator>syllabo</dc:creator></cp:coreProperties>"#,
        XML_DECL,
        escape_xml(title)
    )
}

fn app_props(slide_count: usize) -> String {
    format!(
        r#"{}<Properties xmlns="http://schemas.openxmlformats.org/officeDocument/2006/extended-properties"><Application>syllabo</Application><Slides>{}</Slides></Properties>"#,
        XML_DECL, slide_count
    )
}

fn presentation(slide_count: usize) -> String {
    let mut ids = String::new();
    for i in 0..slide_count {
        let _ = write!(
            ids,
            r#"<p:sldId id="{}" r:id="rId{}"/>"#,
            256 + i,
            i + 3
        );
    }
    format!(
        r#"{}<p:presentation xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" saveSubsetFonts="1"><p:sldMasterIdLst><p:sldMasterId id="2147483648" r:id="rId1"/></p:sldMasterIdLst><p:sldIdLst>{}</p:sldIdLst><p:sldSz cx="{}" cy="{}"/><p:notesSz cx="{}" cy="{}"/></p:presentation>"#,
        XML_DECL, NS_A, NS_R, NS_P, ids, SLIDE_CX, SLIDE_CY, SLIDE_CY, SLIDE_CX
    )
}

fn presentation_rels(slide_count: usize) -> String {
    let slide_targets: Vec<(String, String)> = (1..=slide_count)
        .map(|n| (format!("rId{}", n + 2), format!("slides/slide{}.xml", n)))
        .collect();

    let mut entries: Vec<(&str, &str, &str)> = vec![
        ("rId1", "slideMaster", "slideMasters/slideMaster1.xml"),
        ("rId2", "theme", "theme/theme1.xml"),
    ];
    for (id, target) in &slide_targets {
        entries.push((id.as_str(), "slide", target.as_str()));
    }
    relationships(&entries)
}

const EMPTY_GROUP: &str = r#"<p:nvGrpSpPr><p:cNvPr id="1" name=""/><p:cNvGrpSpPr/><p:nvPr/></p:nvGrpSpPr><p:grpSpPr/>"#;

fn slide_master(theme: &PresentationTheme) -> String {
    format!(
        r#"{}<p:sldMaster xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld><p:bg><p:bgPr><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:effectLst/></p:bgPr></p:bg><p:spTree>{}</p:spTree></p:cSld><p:clrMap bg1="lt1" tx1="dk1" bg2="lt2" tx2="dk2" accent1="accent1" accent2="accent2" accent3="accent3" accent4="accent4" accent5="accent5" accent6="accent6" hlink="hlink" folHlink="folHlink"/><p:sldLayoutIdLst><p:sldLayoutId id="2147483649" r:id="rId1"/></p:sldLayoutIdLst></p:sldMaster>"#,
        XML_DECL, NS_A, NS_R, NS_P, theme.background, EMPTY_GROUP
    )
}

fn slide_layout() -> String {
    format!(
        r#"{}<p:sldLayout xmlns:a="{}" xmlns:r="{}" xmlns:p="{}" type="blank" preserve="1"><p:cSld name="Blank"><p:spTree>{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sldLayout>"#,
        XML_DECL, NS_A, NS_R, NS_P, EMPTY_GROUP
    )
}

fn theme_xml(theme: &PresentationTheme) -> String {
    let color = |tag: &str, value: &str| format!(r#"<a:{0}><a:srgbClr val="{1}"/></a:{0}>"#, tag, value);
    let colors = [
        color("dk1", "000000"),
        color("lt1", "FFFFFF"),
        color("dk2", theme.title_color),
        color("lt2", theme.background),
        color("accent1", theme.accent),
        color("accent2", theme.title_color),
        color("accent3", theme.body_color),
        color("accent4", theme.accent),
        color("accent5", theme.title_color),
        color("accent6", theme.body_color),
        color("hlink", theme.accent),
        color("folHlink", theme.title_color),
    ]
    .concat();

    let font = format!(
        r#"<a:latin typeface="{}"/><a:ea typeface=""/><a:cs typeface=""/>"#,
        escape_xml(theme.font)
    );
    let solid = r#"<a:solidFill><a:schemeClr val="phClr"/></a:solidFill>"#;
    let fills = solid.repeat(3);
    let lines: String = [6350, 12700, 19050]
        .iter()
        .map(|w| format!(r#"<a:ln w="{}">{}</a:ln>"#, w, solid))
        .collect();
    let effects = r#"<a:effectStyle><a:effectLst/></a:effectStyle>"#.repeat(3);

    format!(
        r#"{decl}<a:theme xmlns:a="{ns}" name="{name}"><a:themeElements><a:clrScheme name="{name}">{colors}</a:clrScheme><a:fontScheme name="{name}"><a:majorFont>{font}</a:majorFont><a:minorFont>{font}</a:minorFont></a:fontScheme><a:fmtScheme name="{name}"><a:fillStyleLst>{fills}</a:fillStyleLst><a:lnStyleLst>{lines}</a:lnStyleLst><a:effectStyleLst>{effects}</a:effectStyleLst><a:bgFillStyleLst>{fills}</a:bgFillStyleLst></a:fmtScheme></a:themeElements></a:theme>"#,
        decl = XML_DECL,
        ns = NS_A,
        name = theme.name,
        colors = colors,
        font = font,
        fills = fills,
        lines = lines,
        effects = effects,
    )
}

struct TextBox<'a> {
    id: u32,
    name: &'a str,
    x: i64,
    y: i64,
    cx: i64,
    cy: i64,
}

fn run(text: &str, size: u32, bold: bool, color: &str, font: &str) -> String {
    format!(
        r#"<a:r><a:rPr lang="es-ES" sz="{}" b="{}" dirty="0"><a:solidFill><a:srgbClr val="{}"/></a:solidFill><a:latin typeface="{}"/></a:rPr><a:t>{}</a:t></a:r>"#,
        size,
        if bold { 1 } else { 0 },
        color,
        escape_xml(font),
        escape_xml(text)
    )
}

fn shape(frame: &TextBox<'_>, paragraphs: &str) -> String {
    format!(
        r#"<p:sp><p:nvSpPr><p:cNvPr id="{}" name="{}"/><p:cNvSpPr txBox="1"/><p:nvPr/></p:nvSpPr><p:spPr><a:xfrm><a:off x="{}" y="{}"/><a:ext cx="{}" cy="{}"/></a:xfrm><a:prstGeom prst="rect"><a:avLst/></a:prstGeom><a:noFill/></p:spPr><p:txBody><a:bodyPr wrap="square" rtlCol="0"><a:normAutofit/></a:bodyPr><a:lstStyle/>{}</p:txBody></p:sp>"#,
        frame.id, frame.name, frame.x, frame.y, frame.cx, frame.cy, paragraphs
    )
}

fn slide_xml(slide: &Slide, theme: &PresentationTheme) -> String {
    let width = SLIDE_CX - 2 * MARGIN;
    let mut shapes = String::new();

    match slide.kind {
        SlideKind::Title => {
            let title = format!(
                r#"<a:p><a:pPr algn="ctr"/>{}</a:p>"#,
                run(&slide.title, 4400, true, theme.title_color, theme.font)
            );
            shapes.push_str(&shape(
                &TextBox {
                    id: 2,
                    name: "Title",
                    x: MARGIN,
                    y: 2_057_400,
                    cx: width,
                    cy: 1_371_600,
                },
                &title,
            ));
            if !slide.bullets.is_empty() {
                let subtitle: String = slide
                    .bullets
                    .iter()
                    .map(|line| {
                        format!(
                            r#"<a:p><a:pPr algn="ctr"/>{}</a:p>"#,
                            run(line, 2400, false, theme.body_color, theme.font)
                        )
                    })
                    .collect();
                shapes.push_str(&shape(
                    &TextBox {
                        id: 3,
                        name: "Subtitle",
                        x: MARGIN,
                        y: 3_543_300,
                        cx: width,
                        cy: 1_600_200,
                    },
                    &subtitle,
                ));
            }
        }
        SlideKind::Content => {
            let title = format!(
                "<a:p>{}</a:p>",
                run(&slide.title, 3600, true, theme.title_color, theme.font)
            );
            shapes.push_str(&shape(
                &TextBox {
                    id: 2,
                    name: "Title",
                    x: MARGIN,
                    y: 342_900,
                    cx: width,
                    cy: 1_143_000,
                },
                &title,
            ));
            if !slide.bullets.is_empty() {
                let size = if slide.bullets.len() > 7 { 1600 } else { 2000 };
                let body: String = slide
                    .bullets
                    .iter()
                    .map(|line| {
                        format!(
                            r#"<a:p><a:pPr marL="342900" indent="-342900"><a:buClr><a:srgbClr val="{}"/></a:buClr><a:buFont typeface="Arial"/><a:buChar char="&#8226;"/></a:pPr>{}</a:p>"#,
                            theme.accent,
                            run(line, size, false, theme.body_color, theme.font)
                        )
                    })
                    .collect();
                shapes.push_str(&shape(
                    &TextBox {
                        id: 3,
                        name: "Body",
                        x: MARGIN,
                        y: 1_600_200,
                        cx: width,
                        cy: SLIDE_CY - 1_600_200 - MARGIN,
                    },
                    &body,
                ));
            }
        }
    }

    format!(
        r#"{}<p:sld xmlns:a="{}" xmlns:r="{}" xmlns:p="{}"><p:cSld><p:spTree>{}{}</p:spTree></p:cSld><p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr></p:sld>"#,
        XML_DECL, NS_A, NS_R, NS_P, EMPTY_GROUP, shapes
    )
}
