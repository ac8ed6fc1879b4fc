//! Markdown slide outline parsing

/// Title given to slides that have no heading of their own
pub const DEFAULT_SLIDE_TITLE: &str = "Overview";

/// A parsed slide deck
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Deck {
    /// Text of the leading H1, if any
    pub title: Option<String>,
    pub slides: Vec<Slide>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SlideKind {
    /// Opening slide built from the deck's H1
    Title,
    Content,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slide {
    pub kind: SlideKind,
    pub title: String,
    /// Body lines with list and emphasis markers removed
    pub bullets: Vec<String>,
}

impl Slide {
    fn content(title: &str) -> Self {
        let title = title.trim();
        Self {
            kind: SlideKind::Content,
            title: if title.is_empty() {
                DEFAULT_SLIDE_TITLE.to_string()
            } else {
                title.to_string()
            },
            bullets: Vec::new(),
        }
    }
}

/// Heading level and text of a markdown ATX heading line
fn heading(line: &str) -> Option<(usize, &str)> {
    let trimmed = line.trim_start();
    let level = trimmed.chars().take_while(|c| *c == '#').count();
    if level == 0 || level > 6 {
        return None;
    }
    let rest = &trimmed[level..];
    if rest.is_empty() || rest.starts_with(' ') || rest.starts_with('\t') {
        Some((level, rest.trim().trim_end_matches('#').trim()))
    } else {
        None
    }
}

/// Strip list markers, quote markers and inline emphasis from a body line
pub fn clean_line(line: &str) -> Option<String> {
    let mut text = line.trim();

    let is_rule = text.len() >= 3 && text.chars().all(|c| matches!(c, '-' | '*' | '_'));
    if is_rule || matches!(text, "-" | "*" | "+" | ">") {
        return None;
    }
    if let Some((_, heading_text)) = heading(text) {
        text = heading_text;
    }
    for marker in ["- ", "* ", "+ ", "> "] {
        if let Some(rest) = text.strip_prefix(marker) {
            text = rest.trim_start();
            break;
        }
    }
    let digits = text.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits > 0 {
        let rest = &text[digits..];
        if let Some(rest) = rest.strip_prefix(". ").or_else(|| rest.strip_prefix(") ")) {
            text = rest.trim_start();
        }
    }

    let cleaned = text.replace("**", "").replace("__", "").replace('`', "");
    let cleaned = cleaned.trim();
    if cleaned.is_empty() {
        None
    } else {
        Some(cleaned.to_string())
    }
}

fn is_fence(line: &str) -> bool {
    let trimmed = line.trim_start();
    trimmed.starts_with("```") || trimmed.starts_with("~~~")
}

/// Split a markdown outline into slides.
///
/// - A leading H1 becomes the deck title and an implicit title slide; text
///   between it and the first H2 becomes that slide's subtitle.
/// - Every H2 (and any later H1) starts a new slide.
/// - Text before the first H2 in a document without an H1 becomes a slide
///   titled [`DEFAULT_SLIDE_TITLE`]; a document without headings therefore
///   yields a single slide holding all of its text.
/// - No slide is dropped, including slides with no body.
pub fn parse_deck(markdown: &str) -> Deck {
    let mut title: Option<String> = None;
    let mut title_lines: Vec<String> = Vec::new();
    let mut preamble: Vec<String> = Vec::new();
    let mut slides: Vec<Slide> = Vec::new();
    let mut current: Option<Slide> = None;
    let mut seen_content = false;

    for line in markdown.lines() {
        if is_fence(line) {
            continue;
        }

        match heading(line) {
            Some((1, text)) if title.is_none() && !seen_content && current.is_none() => {
                title = Some(text.to_string());
                seen_content = true;
            }
            Some((1, text)) | Some((2, text)) => {
                if let Some(slide) = current.take() {
                    slides.push(slide);
                }
                current = Some(Slide::content(text));
                seen_content = true;
            }
            _ => {
                let Some(cleaned) = clean_line(line) else {
                    continue;
                };
                seen_content = true;
                match current.as_mut() {
                    Some(slide) => slide.bullets.push(cleaned),
                    None if title.is_some() => title_lines.push(cleaned),
                    None => preamble.push(cleaned),
                }
            }
        }
    }
    if let Some(slide) = current.take() {
        slides.push(slide);
    }

    let mut deck_slides = Vec::with_capacity(slides.len() + 1);
    if let Some(ref deck_title) = title {
        deck_slides.push(Slide {
            kind: SlideKind::Title,
            title: if deck_title.is_empty() {
                DEFAULT_SLIDE_TITLE.to_string()
            } else {
                deck_title.clone()
            },
            bullets: title_lines,
        });
    }
    if !preamble.is_empty() || (title.is_none() && slides.is_empty()) {
        let mut slide = Slide::content("");
        slide.bullets = preamble;
        deck_slides.push(slide);
    }
    deck_slides.extend(slides);

    Deck {
        title: title.filter(|t| !t.is_empty()),
        slides: deck_slides,
    }
}

/// Render markdown as plain text lines for document layout, dropping the
/// leading H1 (used as the document title instead).
pub fn to_plain_text(markdown: &str) -> String {
    let mut lines = Vec::new();
    let mut skipped_title = false;

    for line in markdown.lines() {
        if is_fence(line) {
            continue;
        }
        if let Some((level, text)) = heading(line) {
            if level == 1 && !skipped_title && lines.iter().all(|l: &String| l.is_empty()) {
                skipped_title = true;
                continue;
            }
            if !lines.last().map(|l: &String| l.is_empty()).unwrap_or(true) {
                lines.push(String::new());
            }
            lines.push(text.replace("**", ""));
            continue;
        }

        let trimmed = line.trim();
        if trimmed.is_empty() {
            lines.push(String::new());
            continue;
        }
        let is_bullet = ["- ", "* ", "+ "].iter().any(|m| trimmed.starts_with(m));
        let text = if is_bullet {
            clean_line(trimmed).map(|t| format!("• {}", t))
        } else {
            Some(
                trimmed
                    .replace("**", "")
                    .replace("__", "")
                    .replace('`', ""),
            )
        };
        if let Some(text) = text {
            lines.push(text);
        }
    }

    while lines.first().map(|l| l.is_empty()).unwrap_or(false) {
        lines.remove(0);
    }
    lines.join("\n").trim_end().to_string()
}
