//! Minimal PDF export backend.
//!
//! `BasicPdfRenderer` writes an uncompressed PDF 1.4 file with the standard
//! Helvetica fonts on A4 landscape pages. The standard fonts only cover
//! WinAnsi, so characters outside Latin-1 are printed as `?`.

use std::fmt::{Debug, Write};

use super::{generated_line, period_line};
use crate::errors::ServiceError;
use crate::i18n::Msg;
use crate::reports::document::ReportDocument;

/// Turns a report document into PDF bytes.
pub trait PdfRenderer: Send + Sync + Debug {
    fn render(&self, doc: &ReportDocument) -> Result<Vec<u8>, ServiceError>;
}

const PAGE_WIDTH: f32 = 842.0;
const PAGE_HEIGHT: f32 = 595.0;
const MARGIN: f32 = 36.0;
const ROW_HEIGHT: f32 = 13.0;
const BODY_SIZE: f32 = 8.0;
const FOOTER_SPACE: f32 = 24.0;

const REGULAR: &str = "F1";
const BOLD: &str = "F2";

#[derive(Debug, Clone, Copy, Default)]
pub struct BasicPdfRenderer;

impl PdfRenderer for BasicPdfRenderer {
    fn render(&self, doc: &ReportDocument) -> Result<Vec<u8>, ServiceError> {
        if doc.columns.is_empty() {
            return Err(ServiceError::RenderError(
                "report has no columns to print".to_string(),
            ));
        }
        let pages = layout_pages(doc);
        Ok(assemble(&pages, &doc.title))
    }
}

/// Escapes text for a PDF literal string in WinAnsi encoding.
pub fn encode_text(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '(' | ')' | '\\' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            '\u{a0}'..='\u{ff}' => {
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            '\t' | '\n' | '\r' => out.push(' '),
            _ => out.push('?'),
        }
    }
    out
}

/// Cuts `text` to what fits in `width` points at `size`, marking the cut.
fn fit(text: &str, width: f32, size: f32) -> String {
    // Helvetica averages about half an em per glyph
    let max_chars = ((width - 4.0) / (size * 0.5)).max(1.0) as usize;
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let keep = max_chars.saturating_sub(2);
    let mut cut: String = text.chars().take(keep).collect();
    cut.push_str("..");
    cut
}

#[derive(Default)]
struct PageWriter {
    ops: String,
}

impl PageWriter {
    fn text(&mut self, font: &str, size: f32, x: f32, y: f32, text: &str) {
        let _ = writeln!(
            self.ops,
            "BT /{} {} Tf {:.2} {:.2} Td ({}) Tj ET",
            font,
            size,
            x,
            y,
            encode_text(text)
        );
    }

    fn rule(&mut self, y: f32) {
        let _ = writeln!(
            self.ops,
            "0.5 w {:.2} {:.2} m {:.2} {:.2} l S",
            MARGIN,
            y,
            PAGE_WIDTH - MARGIN,
            y
        );
    }
}

fn layout_pages(doc: &ReportDocument) -> Vec<String> {
    let locale = doc.locale;
    let top = PAGE_HEIGHT - MARGIN;
    let bottom = MARGIN + FOOTER_SPACE;
    let col_width = (PAGE_WIDTH - 2.0 * MARGIN) / doc.columns.len() as f32;

    let table_header = |page: &mut PageWriter, y: f32| -> f32 {
        for (i, column) in doc.columns.iter().enumerate() {
            let x = MARGIN + i as f32 * col_width;
            page.text(BOLD, BODY_SIZE, x + 2.0, y, &fit(&column.label, col_width, BODY_SIZE));
        }
        page.rule(y - 3.0);
        y - ROW_HEIGHT
    };

    let mut pages = Vec::new();
    let mut page = PageWriter::default();
    let mut y = top - 16.0;

    page.text(BOLD, 16.0, MARGIN, y, &doc.title);
    y -= 18.0;
    page.text(REGULAR, 9.0, MARGIN, y, &period_line(doc));
    y -= 12.0;
    page.text(REGULAR, 9.0, MARGIN, y, &generated_line(doc));
    y -= 18.0;

    if let Some(kpis) = &doc.kpis {
        page.text(BOLD, 10.0, MARGIN, y, locale.text(Msg::Kpis));
        y -= 13.0;
        for kpi in kpis {
            let line = format!("{}: {}", kpi.label, kpi.value.display());
            page.text(REGULAR, 9.0, MARGIN + 8.0, y, &fit(&line, PAGE_WIDTH - 2.0 * MARGIN, 9.0));
            y -= 12.0;
        }
        y -= 8.0;
    }

    y = table_header(&mut page, y);

    if doc.rows.is_empty() {
        page.text(REGULAR, 9.0, MARGIN + 2.0, y, locale.text(Msg::NoRows));
    }

    for row in &doc.rows {
        if y < bottom {
            pages.push(std::mem::take(&mut page.ops));
            y = table_header(&mut page, top - BODY_SIZE);
        }
        for (i, column) in doc.columns.iter().enumerate() {
            let x = MARGIN + i as f32 * col_width;
            let cell = ReportDocument::cell(row, &column.key);
            page.text(REGULAR, BODY_SIZE, x + 2.0, y, &fit(&cell, col_width, BODY_SIZE));
        }
        y -= ROW_HEIGHT;
    }
    pages.push(page.ops);

    let total = pages.len();
    let footer_label = format!(
        "{} / {}: {}",
        doc.title,
        locale.text(Msg::TotalRows),
        doc.pagination.total
    );
    pages
        .into_iter()
        .enumerate()
        .map(|(i, mut ops)| {
            let mut footer = PageWriter::default();
            footer.text(REGULAR, 8.0, MARGIN, MARGIN, &fit(&footer_label, 500.0, 8.0));
            footer.text(
                REGULAR,
                8.0,
                PAGE_WIDTH - MARGIN - 90.0,
                MARGIN,
                &format!("{} {} {} {}", locale.text(Msg::Page), i + 1, locale.text(Msg::Of), total),
            );
            ops.push_str(&footer.ops);
            ops
        })
        .collect()
}

/// Serializes page content streams into a complete PDF file with an xref table.
fn assemble(pages: &[String], title: &str) -> Vec<u8> {
    let first_page_obj = 5;
    let info_obj = first_page_obj + 2 * pages.len();
    let kids: Vec<String> = (0..pages.len())
        .map(|i| format!("{} 0 R", first_page_obj + 2 * i))
        .collect();

    let mut objects: Vec<String> = vec![
        "<< /Type /Catalog /Pages 2 0 R >>".to_string(),
        format!(
            "<< /Type /Pages /Kids [{}] /Count {} >>",
            kids.join(" "),
            pages.len()
        ),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica /Encoding /WinAnsiEncoding >>"
            .to_string(),
        "<< /Type /Font /Subtype /Type1 /BaseFont /Helvetica-Bold /Encoding /WinAnsiEncoding >>"
            .to_string(),
    ];
    for (i, content) in pages.iter().enumerate() {
        let content_obj = first_page_obj + 2 * i + 1;
        objects.push(format!(
            "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
             /Resources << /Font << /{} 3 0 R /{} 4 0 R >> >> /Contents {} 0 R >>",
            PAGE_WIDTH, PAGE_HEIGHT, REGULAR, BOLD, content_obj
        ));
        objects.push(format!(
            "<< /Length {} >>\nstream\n{}endstream",
            content.len(),
            content
        ));
    }
    objects.push(format!(
        "<< /Title ({}) /Producer (k9ops-api) >>",
        encode_text(title)
    ));

    let mut out = String::from("%PDF-1.4\n");
    let mut offsets = Vec::with_capacity(objects.len());
    for (i, body) in objects.iter().enumerate() {
        offsets.push(out.len());
        let _ = write!(out, "{} 0 obj\n{}\nendobj\n", i + 1, body);
    }

    let xref_at = out.len();
    let _ = write!(out, "xref\n0 {}\n0000000000 65535 f \n", objects.len() + 1);
    for offset in offsets {
        let _ = write!(out, "{:010} 00000 n \n", offset);
    }
    let _ = write!(
        out,
        "trailer\n<< /Size {} /Root 1 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
        objects.len() + 1,
        info_obj,
        xref_at
    );

    out.into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::i18n::Locale;
    use crate::reports::render::fixtures::document;

    fn render(rows: usize, kpis: bool) -> String {
        let bytes = BasicPdfRenderer.render(&document(Locale::En, rows, kpis)).unwrap();
        String::from_utf8(bytes).expect("output is ASCII")
    }

    fn page_count(pdf: &str) -> usize {
        pdf.matches("/Type /Page /Parent").count()
    }

    #[test]
    fn text_is_escaped_for_winansi() {
        assert_eq!(encode_text("a(b)\\c"), "a\\(b\\)\\\\c");
        assert_eq!(encode_text("Café"), "Caf\\351");
        assert_eq!(encode_text("كلب"), "???");
    }

    #[test]
    fn long_cells_are_cut() {
        assert_eq!(fit("short", 100.0, 8.0), "short");
        let cut = fit(&"x".repeat(100), 50.0, 8.0);
        assert!(cut.ends_with(".."));
        assert!(cut.len() < 20);
    }

    #[test]
    fn small_report_is_one_page() {
        let pdf = render(3, true);
        assert!(pdf.starts_with("%PDF-1.4\n"));
        assert!(pdf.ends_with("%%EOF\n"));
        assert_eq!(page_count(&pdf), 1);
        assert!(pdf.contains("/Count 1"));
        assert!(pdf.contains("(Rex 2)"));
        assert!(pdf.contains("(Total visits: 3)"));
        assert!(pdf.contains("(Page 1 of 1)"));
    }

    #[test]
    fn long_report_spans_pages() {
        let pdf = render(200, false);
        let pages = page_count(&pdf);
        assert!(pages > 1);
        assert!(pdf.contains(&format!("/Count {}", pages)));
        assert!(pdf.contains(&format!("(Page {} of {})", pages, pages)));
        assert!(pdf.contains("(Rex 199)"));
    }

    #[test]
    fn xref_points_at_objects() {
        let pdf = render(1, false);
        let start: usize = pdf
            .rsplit("startxref\n")
            .next()
            .and_then(|tail| tail.lines().next())
            .and_then(|n| n.parse().ok())
            .unwrap();
        assert!(pdf[start..].starts_with("xref\n"));

        let first_entry = pdf[start..].lines().nth(3).unwrap();
        let offset: usize = first_entry[..10].parse().unwrap();
        assert!(pdf[offset..].starts_with("1 0 obj"));
    }

    #[test]
    fn empty_report_prints_placeholder() {
        let pdf = render(0, false);
        assert_eq!(page_count(&pdf), 1);
        assert!(pdf.contains("(No records for the selected period)"));
    }
}
