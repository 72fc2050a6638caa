use std::fmt::Write as _;

use chrono::NaiveDateTime;
use optistock_core::{FieldKey, StockRecord};
use serde::{Deserialize, Serialize};

use crate::escape::escape_html;
use crate::table::{display_value, result_count_label};

/// Which half of the stock a printable list covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExportKind {
    Available,
    Sold,
}

impl ExportKind {
    pub fn title(self) -> &'static str {
        match self {
            ExportKind::Available => "Listado de DISPONIBLES",
            ExportKind::Sold => "Listado de VENDIDOS",
        }
    }
}

impl std::str::FromStr for ExportKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "disponibles" | "disponible" | "available" => Ok(ExportKind::Available),
            "vendidos" | "vendido" | "sold" => Ok(ExportKind::Sold),
            other => Err(format!("Unknown export: '{other}'")),
        }
    }
}

enum Align {
    Left,
    Right,
}

const PRINT_COLUMNS: [(&str, FieldKey, Align); 10] = [
    ("N°", FieldKey::NAnteojo, Align::Left),
    ("Marca", FieldKey::Marca, Align::Left),
    ("Modelo", FieldKey::Modelo, Align::Left),
    ("Color", FieldKey::Color, Align::Left),
    ("Familia", FieldKey::Familia, Align::Left),
    ("Calibre", FieldKey::Calibre, Align::Right),
    ("Precio", FieldKey::Precio, Align::Right),
    ("Ingreso", FieldKey::FechaIngreso, Align::Left),
    ("Venta", FieldKey::FechaVenta, Align::Left),
    ("Vendedor", FieldKey::Vendedor, Align::Left),
];

const PRINT_STYLE: &str = "
  body{ font-family: system-ui, -apple-system, Segoe UI, Roboto, Arial; margin:24px; color:#111827; }
  h1{ margin:0 0 6px 0; font-size:18px; }
  .muted{ color:#6b7280; font-size:12px; margin-bottom:14px; }
  table{ width:100%; border-collapse:collapse; font-size:12px; }
  th,td{ border-bottom:1px solid #e5e7eb; padding:6px 8px; }
  thead th{ background:#f8fafc; }
  .r{ text-align:right; }
  @media print{ @page { size:A4; margin:14mm; } }
";

fn align_class(align: &Align) -> &'static str {
    match align {
        Align::Left => "",
        Align::Right => " class=\"r\"",
    }
}

/// Printable table body: header row plus one escaped row per record.
pub fn render_table(rows: &[&StockRecord]) -> String {
    let mut html = String::from("<table>\n<thead><tr>");
    for (label, _, align) in &PRINT_COLUMNS {
        let _ = write!(html, "<th{}>{}</th>", align_class(align), escape_html(label));
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for record in rows {
        html.push_str("<tr>");
        for (_, key, align) in &PRINT_COLUMNS {
            let value = display_value(record, *key);
            let _ = write!(html, "<td{}>{}</td>", align_class(align), escape_html(&value));
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>");
    html
}

/// Standalone document that opens the print dialog on load and closes
/// itself shortly after.
pub fn render_printable(rows: &[&StockRecord], kind: ExportKind, generated_at: NaiveDateTime) -> String {
    let title = kind.title();
    let stamp = generated_at.format("%-d/%-m/%Y, %H:%M:%S");
    format!(
        "<!doctype html><html><head>\n<meta charset=\"utf-8\">\n<title>{title}</title>\n\
         <style>{PRINT_STYLE}</style>\n</head><body>\n\
         <h1>{title}</h1>\n<div class=\"muted\">{stamp} · {count}</div>\n{table}\n\
         <script>window.onload=()=>{{ window.print(); setTimeout(()=>window.close(), 500); }};</script>\n\
         </body></html>\n",
        count = result_count_label(rows.len()),
        table = render_table(rows),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, 5)
            .unwrap()
            .and_hms_opt(14, 5, 9)
            .unwrap()
    }

    fn record(n: &str, marca: &str) -> StockRecord {
        StockRecord {
            n_anteojo: n.to_string(),
            marca: marca.to_string(),
            calibre: "52".to_string(),
            precio: "25000".to_string(),
            codigo_barras: "7790001".to_string(),
            ..StockRecord::default()
        }
    }

    #[test]
    fn export_kind_titles_and_parsing() {
        assert_eq!("disponibles".parse::<ExportKind>().unwrap(), ExportKind::Available);
        assert_eq!("VENDIDOS".parse::<ExportKind>().unwrap(), ExportKind::Sold);
        assert!("todos".parse::<ExportKind>().is_err());
        assert_eq!(ExportKind::Sold.title(), "Listado de VENDIDOS");
    }

    #[test]
    fn table_has_fixed_columns_and_escapes() {
        let a = record("1", "<b>Vulk</b>");
        let html = render_table(&[&a]);
        assert!(html.contains("<th>N°</th><th>Marca</th>"));
        assert!(html.contains("<th class=\"r\">Precio</th>"));
        assert!(html.contains("<td>&lt;b&gt;Vulk&lt;/b&gt;</td>"));
        assert!(html.contains("<td class=\"r\">$ 25.000</td>"));
        assert!(!html.contains("7790001"));
    }

    #[test]
    fn printable_document() {
        let a = record("1", "Vulk");
        let b = record("2", "Oakley");
        let html = render_printable(&[&a, &b], ExportKind::Available, at());
        assert!(html.starts_with("<!doctype html>"));
        assert!(html.contains("<title>Listado de DISPONIBLES</title>"));
        assert!(html.contains("5/3/2024, 14:05:09 · 2 resultados"));
        assert!(html.contains("window.print()"));
        assert_eq!(html.matches("<tr>").count(), 3);
    }

    #[test]
    fn printable_document_empty() {
        let html = render_printable(&[], ExportKind::Sold, at());
        assert!(html.contains("0 resultados"));
        assert!(html.contains("<tbody>\n</tbody>"));
    }
}
