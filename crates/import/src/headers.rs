use std::collections::HashMap;
use std::sync::OnceLock;

use optistock_core::{fold_header, FieldKey};

/// Sheet column names seen in the wild, as typed by staff. Entries are
/// folded on first use, so accents and spacing here are cosmetic.
const SYNONYMS: &[(&str, FieldKey)] = &[
    ("N ANTEOJO", FieldKey::NAnteojo),
    ("N° ANTEOJO", FieldKey::NAnteojo),
    ("Nº ANTEOJO", FieldKey::NAnteojo),
    ("N ANTEOJOS", FieldKey::NAnteojo),
    ("NUMERO", FieldKey::NAnteojo),
    ("NÚMERO", FieldKey::NAnteojo),
    ("MARCA", FieldKey::Marca),
    ("MODELO", FieldKey::Modelo),
    ("COLOR", FieldKey::Color),
    ("ARMAZÓN", FieldKey::Armazon),
    ("FAMILIA", FieldKey::Familia),
    ("CRISTAL", FieldKey::CristalColor),
    ("CRISTAL / COLOR", FieldKey::CristalColor),
    ("COLOR CRISTAL", FieldKey::CristalColor),
    ("CALIBRE", FieldKey::Calibre),
    ("PRECIO PÚBLICO", FieldKey::Precio),
    ("PRECIO PÚBLICO (LISTA)", FieldKey::Precio),
    ("FECHA INGRESO", FieldKey::FechaIngreso),
    ("FECHA DE INGRESO", FieldKey::FechaIngreso),
    ("INGRESO", FieldKey::FechaIngreso),
    ("FECHA DE VENTA", FieldKey::FechaVenta),
    ("FECHA VENTA", FieldKey::FechaVenta),
    ("VENTA", FieldKey::FechaVenta),
    ("VENDEDOR", FieldKey::Vendedor),
    ("CÓDIGO DE BARRAS", FieldKey::CodigoBarras),
    ("OBSERVACIONES", FieldKey::Observaciones),
    ("FÁBRICA", FieldKey::Fabrica),
];

fn table() -> &'static HashMap<String, FieldKey> {
    static TABLE: OnceLock<HashMap<String, FieldKey>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let mut map: HashMap<String, FieldKey> = SYNONYMS
            .iter()
            .map(|(header, key)| (fold_header(header), *key))
            .collect();
        // Already-canonical payloads use the internal names as headers.
        for key in FieldKey::ALL {
            map.insert(fold_header(key.as_str()), key);
        }
        map
    })
}

/// Resolve a raw sheet header to its canonical field, or `None` when the
/// column is not one we track.
pub fn map_header(raw: &str) -> Option<FieldKey> {
    table().get(&fold_header(raw)).copied()
}

/// Resolution of one header row, computed once per payload.
#[derive(Debug, Clone, Default)]
pub struct HeaderMap {
    columns: Vec<Option<FieldKey>>,
}

impl HeaderMap {
    pub fn new<S: AsRef<str>>(headers: &[S]) -> Self {
        Self {
            columns: headers.iter().map(|h| map_header(h.as_ref())).collect(),
        }
    }

    pub fn column(&self, index: usize) -> Option<FieldKey> {
        self.columns.get(index).copied().flatten()
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    pub fn mapped_count(&self) -> usize {
        self.columns.iter().filter(|c| c.is_some()).count()
    }
}
