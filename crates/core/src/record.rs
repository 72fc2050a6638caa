use serde::{Deserialize, Serialize};
use std::fmt;

use crate::fold::fold;

/// Canonical column of an inventory record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKey {
    NAnteojo,
    Marca,
    Modelo,
    Color,
    Familia,
    CristalColor,
    Calibre,
    Armazon,
    Fabrica,
    Vendedor,
    CodigoBarras,
    Observaciones,
    Precio,
    FechaIngreso,
    FechaVenta,
}

/// How values of a field compare when sorting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Numeric,
    Date,
    Text,
}

impl FieldKey {
    pub const ALL: [FieldKey; 15] = [
        FieldKey::NAnteojo,
        FieldKey::Marca,
        FieldKey::Modelo,
        FieldKey::Color,
        FieldKey::Familia,
        FieldKey::CristalColor,
        FieldKey::Calibre,
        FieldKey::Armazon,
        FieldKey::Fabrica,
        FieldKey::Vendedor,
        FieldKey::CodigoBarras,
        FieldKey::Observaciones,
        FieldKey::Precio,
        FieldKey::FechaIngreso,
        FieldKey::FechaVenta,
    ];

    /// Fields concatenated into the free-text search index, in index order.
    pub const SEARCHABLE: [FieldKey; 9] = [
        FieldKey::NAnteojo,
        FieldKey::Marca,
        FieldKey::Modelo,
        FieldKey::Color,
        FieldKey::Familia,
        FieldKey::CristalColor,
        FieldKey::Calibre,
        FieldKey::CodigoBarras,
        FieldKey::Vendedor,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            FieldKey::NAnteojo => "n_anteojo",
            FieldKey::Marca => "marca",
            FieldKey::Modelo => "modelo",
            FieldKey::Color => "color",
            FieldKey::Familia => "familia",
            FieldKey::CristalColor => "cristal_color",
            FieldKey::Calibre => "calibre",
            FieldKey::Armazon => "armazon",
            FieldKey::Fabrica => "fabrica",
            FieldKey::Vendedor => "vendedor",
            FieldKey::CodigoBarras => "codigo_barras",
            FieldKey::Observaciones => "observaciones",
            FieldKey::Precio => "precio",
            FieldKey::FechaIngreso => "fecha_ingreso",
            FieldKey::FechaVenta => "fecha_venta",
        }
    }

    pub fn kind(self) -> FieldKind {
        match self {
            FieldKey::NAnteojo | FieldKey::Calibre | FieldKey::Precio => FieldKind::Numeric,
            FieldKey::FechaIngreso | FieldKey::FechaVenta => FieldKind::Date,
            _ => FieldKind::Text,
        }
    }
}

impl fmt::Display for FieldKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for FieldKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        FieldKey::ALL
            .into_iter()
            .find(|k| k.as_str() == wanted)
            .ok_or_else(|| format!("Unknown field: '{}'", s.trim()))
    }
}

/// One inventory item normalized to the fixed internal field set.
///
/// Every value is kept as text exactly as the sheet delivered it (after
/// trimming); numeric and date interpretation happens at comparison and
/// display time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StockRecord {
    pub n_anteojo: String,
    pub marca: String,
    pub modelo: String,
    pub color: String,
    pub familia: String,
    pub cristal_color: String,
    pub calibre: String,
    pub armazon: String,
    pub fabrica: String,
    pub vendedor: String,
    pub codigo_barras: String,
    pub observaciones: String,
    pub precio: String,
    pub fecha_ingreso: String,
    pub fecha_venta: String,
}

impl StockRecord {
    pub fn get(&self, key: FieldKey) -> &str {
        match key {
            FieldKey::NAnteojo => &self.n_anteojo,
            FieldKey::Marca => &self.marca,
            FieldKey::Modelo => &self.modelo,
            FieldKey::Color => &self.color,
            FieldKey::Familia => &self.familia,
            FieldKey::CristalColor => &self.cristal_color,
            FieldKey::Calibre => &self.calibre,
            FieldKey::Armazon => &self.armazon,
            FieldKey::Fabrica => &self.fabrica,
            FieldKey::Vendedor => &self.vendedor,
            FieldKey::CodigoBarras => &self.codigo_barras,
            FieldKey::Observaciones => &self.observaciones,
            FieldKey::Precio => &self.precio,
            FieldKey::FechaIngreso => &self.fecha_ingreso,
            FieldKey::FechaVenta => &self.fecha_venta,
        }
    }

    fn slot_mut(&mut self, key: FieldKey) -> &mut String {
        match key {
            FieldKey::NAnteojo => &mut self.n_anteojo,
            FieldKey::Marca => &mut self.marca,
            FieldKey::Modelo => &mut self.modelo,
            FieldKey::Color => &mut self.color,
            FieldKey::Familia => &mut self.familia,
            FieldKey::CristalColor => &mut self.cristal_color,
            FieldKey::Calibre => &mut self.calibre,
            FieldKey::Armazon => &mut self.armazon,
            FieldKey::Fabrica => &mut self.fabrica,
            FieldKey::Vendedor => &mut self.vendedor,
            FieldKey::CodigoBarras => &mut self.codigo_barras,
            FieldKey::Observaciones => &mut self.observaciones,
            FieldKey::Precio => &mut self.precio,
            FieldKey::FechaIngreso => &mut self.fecha_ingreso,
            FieldKey::FechaVenta => &mut self.fecha_venta,
        }
    }

    /// Store `value` under `key`. An empty value never overwrites a
    /// non-empty one, so a blank duplicate column cannot erase data.
    pub fn set(&mut self, key: FieldKey, value: impl Into<String>) {
        let value = value.into();
        let slot = self.slot_mut(key);
        if value.is_empty() && !slot.is_empty() {
            return;
        }
        *slot = value;
    }

    /// A record counts as sold once it carries any sale date.
    pub fn is_sold(&self) -> bool {
        !self.fecha_venta.trim().is_empty()
    }

    pub fn has_numbered_item(&self) -> bool {
        self.n_anteojo.chars().any(|c| c.is_ascii_digit())
    }

    pub fn has_identifying_info(&self) -> bool {
        [&self.marca, &self.modelo, &self.color, &self.codigo_barras]
            .iter()
            .any(|v| !v.trim().is_empty())
    }

    /// Retention rule applied after normalization: keep rows with a
    /// digit-bearing item number or at least one identifying attribute.
    pub fn is_retained(&self) -> bool {
        self.has_numbered_item() || self.has_identifying_info()
    }

    /// Lower-cased, diacritic-folded concatenation of the searchable fields.
    pub fn search_text(&self) -> String {
        let joined = FieldKey::SEARCHABLE
            .iter()
            .map(|k| self.get(*k))
            .collect::<Vec<_>>()
            .join(" ");
        fold(&joined)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(n: &str, marca: &str) -> StockRecord {
        StockRecord {
            n_anteojo: n.to_string(),
            marca: marca.to_string(),
            ..StockRecord::default()
        }
    }

    #[test]
    fn field_key_round_trips_through_str() {
        for key in FieldKey::ALL {
            assert_eq!(key.as_str().parse::<FieldKey>().unwrap(), key);
        }
        assert!("precio_lista".parse::<FieldKey>().is_err());
    }

    #[test]
    fn field_key_serde_names_match_as_str() {
        let json = serde_json::to_string(&FieldKey::CristalColor).unwrap();
        assert_eq!(json, "\"cristal_color\"");
    }

    #[test]
    fn field_kinds() {
        assert_eq!(FieldKey::Precio.kind(), FieldKind::Numeric);
        assert_eq!(FieldKey::Calibre.kind(), FieldKind::Numeric);
        assert_eq!(FieldKey::FechaVenta.kind(), FieldKind::Date);
        assert_eq!(FieldKey::Marca.kind(), FieldKind::Text);
    }

    #[test]
    fn set_does_not_erase_with_blank() {
        let mut r = StockRecord::default();
        r.set(FieldKey::Marca, "RAY-BAN");
        r.set(FieldKey::Marca, "");
        assert_eq!(r.marca, "RAY-BAN");
        r.set(FieldKey::Marca, "OAKLEY");
        assert_eq!(r.marca, "OAKLEY");
    }

    #[test]
    fn retention_accepts_number_or_identity() {
        assert!(record("A-12", "").is_retained());
        assert!(record("", "VULK").is_retained());
        assert!(!record("s/n", "").is_retained());
        assert!(!record("", "   ").is_retained());
    }

    #[test]
    fn sold_means_non_blank_sale_date() {
        let mut r = record("1", "X");
        assert!(!r.is_sold());
        r.fecha_venta = "  ".to_string();
        assert!(!r.is_sold());
        r.fecha_venta = "5/3/24".to_string();
        assert!(r.is_sold());
    }

    #[test]
    fn search_text_is_folded() {
        let mut r = record("0123", "ÓPTICA Niño");
        r.observaciones = "not indexed".to_string();
        let text = r.search_text();
        assert!(text.contains("0123"));
        assert!(text.contains("optica nino"));
        assert!(!text.contains("indexed"));
    }

    #[test]
    fn missing_fields_deserialize_as_empty() {
        let r: StockRecord = serde_json::from_str(r#"{"n_anteojo":"7"}"#).unwrap();
        assert_eq!(r.n_anteojo, "7");
        assert_eq!(r.precio, "");
    }
}
