use std::fmt::Write;

use super::{generated_line, period_line};
use crate::i18n::Msg;
use crate::reports::document::ReportDocument;

const STYLE: &str = "body{font-family:Arial,Helvetica,sans-serif;margin:24px;color:#222}\
h1{font-size:20px;margin:0 0 4px}\
.meta{color:#555;font-size:13px;margin:2px 0}\
.kpis{display:flex;flex-wrap:wrap;gap:12px;margin:16px 0}\
.kpi{border:1px solid #ccd;border-radius:6px;padding:8px 12px;min-width:140px}\
.kpi .label{font-size:12px;color:#555}\
.kpi .value{font-size:18px;font-weight:bold}\
table{border-collapse:collapse;width:100%;font-size:13px}\
th,td{border:1px solid #ccd;padding:4px 6px;text-align:start}\
th{background:#eef}\
.empty{padding:16px;color:#777}\
footer{margin-top:12px;font-size:12px;color:#555}";

/// Escapes text for use in HTML element content and quoted attributes.
pub fn escape_html(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// Renders a standalone HTML page for the report.
pub fn render_html(doc: &ReportDocument) -> String {
    let locale = doc.locale;
    let dir = if locale.is_rtl() { "rtl" } else { "ltr" };
    let mut html = String::with_capacity(4096 + doc.rows.len() * 256);

    // Writing to a String cannot fail
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html lang=\"{}\" dir=\"{}\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n",
        locale.code(),
        dir,
        escape_html(&doc.title),
        STYLE
    );

    let _ = write!(
        html,
        "<header>\n<h1>{}</h1>\n<p class=\"meta\">{}</p>\n<p class=\"meta\">{}</p>\n</header>\n",
        escape_html(&doc.title),
        escape_html(&period_line(doc)),
        escape_html(&generated_line(doc))
    );

    if let Some(kpis) = &doc.kpis {
        let _ = write!(
            html,
            "<section class=\"kpis\" aria-label=\"{}\">\n",
            escape_html(locale.text(Msg::Kpis))
        );
        for kpi in kpis {
            let _ = write!(
                html,
                "<div class=\"kpi\" data-key=\"{}\"><div class=\"label\">{}</div><div class=\"value\">{}</div></div>\n",
                escape_html(&kpi.key),
                escape_html(&kpi.label),
                escape_html(&kpi.value.display())
            );
        }
        html.push_str("</section>\n");
    }

    html.push_str("<table>\n<thead><tr>");
    for column in &doc.columns {
        let _ = write!(html, "<th>{}</th>", escape_html(&column.label));
    }
    html.push_str("</tr></thead>\n<tbody>\n");

    if doc.rows.is_empty() {
        let _ = write!(
            html,
            "<tr><td class=\"empty\" colspan=\"{}\">{}</td></tr>\n",
            doc.columns.len().max(1),
            escape_html(locale.text(Msg::NoRows))
        );
    }
    for row in &doc.rows {
        html.push_str("<tr>");
        for column in &doc.columns {
            let _ = write!(
                html,
                "<td>{}</td>",
                escape_html(&ReportDocument::cell(row, &column.key))
            );
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");

    let p = &doc.pagination;
    let _ = write!(
        html,
        "<footer>{} {} {} {} &middot; {}: {}</footer>\n</body>\n</html>\n",
        escape_html(locale.text(Msg::Page)),
        p.page,
        escape_html(locale.text(Msg::Of)),
        p.total_pages.max(1),
        escape_html(locale.text(Msg::TotalRows)),
        p.total
    );

    html
}
