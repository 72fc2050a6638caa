use optistock_core::{digits_only, fold, StockRecord};
use serde::{Deserialize, Serialize};

use crate::tokens::Query;

/// Sale status selector. `All` disables the filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusFilter {
    #[default]
    All,
    Available,
    Sold,
}

impl StatusFilter {
    pub fn matches(self, record: &StockRecord) -> bool {
        match self {
            StatusFilter::All => true,
            StatusFilter::Available => !record.is_sold(),
            StatusFilter::Sold => record.is_sold(),
        }
    }
}

impl std::str::FromStr for StatusFilter {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "" | "all" | "todos" => Ok(StatusFilter::All),
            "disponible" | "disponibles" | "available" => Ok(StatusFilter::Available),
            "vendido" | "vendidos" | "sold" => Ok(StatusFilter::Sold),
            other => Err(format!("Unknown status filter: '{other}'")),
        }
    }
}

/// Category (familia) selector, case- and accent-insensitive substring.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter(Option<String>);

impl CategoryFilter {
    pub fn any() -> Self {
        Self(None)
    }

    /// Blank, `all`, `todas` and `todos` mean "no filter".
    pub fn new(raw: &str) -> Self {
        let folded = fold(raw.trim());
        match folded.as_str() {
            "" | "all" | "todas" | "todos" => Self(None),
            _ => Self(Some(folded)),
        }
    }

    pub fn is_any(&self) -> bool {
        self.0.is_none()
    }

    pub fn matches(&self, record: &StockRecord) -> bool {
        match &self.0 {
            None => true,
            Some(wanted) => fold(record.familia.trim()).contains(wanted.as_str()),
        }
    }
}

/// Item number comparison form: digits only, leading zeros dropped, so
/// `"0123"`, `"A-123"` and `"123"` compare equal.
pub fn item_number_key(raw: &str) -> String {
    let digits = digits_only(raw);
    let trimmed = digits.trim_start_matches('0');
    if trimmed.is_empty() && !digits.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Everything the table is filtered by.
#[derive(Debug, Clone, Default)]
pub struct Filter {
    pub query: Query,
    pub category: CategoryFilter,
    pub status: StatusFilter,
}

impl Filter {
    pub fn new(query: &str, category: &str, status: StatusFilter) -> Self {
        Self {
            query: Query::parse(query),
            category: CategoryFilter::new(category),
            status,
        }
    }

    pub fn with_status(&self, status: StatusFilter) -> Self {
        Self {
            status,
            ..self.clone()
        }
    }
}

struct Compiled {
    exact: Vec<String>,
    free: Vec<String>,
}

impl Compiled {
    fn from(query: &Query) -> Self {
        Self {
            exact: query.exact_numbers.iter().map(|n| item_number_key(n)).collect(),
            free: query
                .free_tokens
                .iter()
                .map(|t| fold(t))
                .filter(|t| !t.is_empty())
                .collect(),
        }
    }
}

/// The current record set together with its precomputed search index.
#[derive(Debug, Clone, Default)]
pub struct Inventory {
    records: Vec<StockRecord>,
    index: Vec<String>,
}

impl Inventory {
    pub fn new(records: Vec<StockRecord>) -> Self {
        let index = records.iter().map(StockRecord::search_text).collect();
        Self { records, index }
    }

    pub fn records(&self) -> &[StockRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records passing every part of `filter`, in stored order.
    ///
    /// Exact item numbers must all equal the record's number; free tokens
    /// must all occur somewhere in the folded search text.
    pub fn filter(&self, filter: &Filter) -> Vec<&StockRecord> {
        let compiled = Compiled::from(&filter.query);
        self.records
            .iter()
            .zip(&self.index)
            .filter(|(record, haystack)| {
                if !compiled.exact.is_empty() {
                    let number = item_number_key(&record.n_anteojo);
                    if !compiled.exact.iter().all(|x| *x == number) {
                        return false;
                    }
                }
                compiled.free.iter().all(|t| haystack.contains(t.as_str()))
                    && filter.category.matches(record)
                    && filter.status.matches(record)
            })
            .map(|(record, _)| record)
            .collect()
    }

    /// Distinct non-blank categories, upper-cased and sorted.
    pub fn categories(&self) -> Vec<String> {
        let mut out: Vec<String> = self
            .records
            .iter()
            .map(|r| r.familia.trim().to_uppercase())
            .filter(|f| !f.is_empty())
            .collect();
        out.sort();
        out.dedup();
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(n: &str, marca: &str, familia: &str, venta: &str) -> StockRecord {
        StockRecord {
            n_anteojo: n.to_string(),
            marca: marca.to_string(),
            familia: familia.to_string(),
            fecha_venta: venta.to_string(),
            ..StockRecord::default()
        }
    }

    fn inventory() -> Inventory {
        Inventory::new(vec![
            rec("123", "ÓPTICA PROPIA", "Receta", ""),
            rec("0123", "Ray-Ban", "Sol", "5/3/24"),
            rec("1234", "Vulk", "Sol", ""),
            rec("77", "Niño Lentes", "Receta Niños", "1/2/2024"),
        ])
    }

    fn numbers(rows: &[&StockRecord]) -> Vec<String> {
        rows.iter().map(|r| r.n_anteojo.clone()).collect()
    }

    #[test]
    fn empty_filter_returns_everything_in_order() {
        let inv = inventory();
        let rows = inv.filter(&Filter::new("", "all", StatusFilter::All));
        assert_eq!(numbers(&rows), vec!["123", "0123", "1234", "77"]);
    }

    #[test]
    fn exact_number_compares_digits() {
        let inv = inventory();
        let rows = inv.filter(&Filter::new("#123", "", StatusFilter::All));
        assert_eq!(numbers(&rows), vec!["123", "0123"]);
    }

    #[test]
    fn conflicting_exact_numbers_match_nothing() {
        let inv = inventory();
        assert!(inv.filter(&Filter::new("#123 #77", "", StatusFilter::All)).is_empty());
    }

    #[test]
    fn free_token_ignores_accents_and_case() {
        let inv = inventory();
        let rows = inv.filter(&Filter::new("optica", "", StatusFilter::All));
        assert_eq!(numbers(&rows), vec!["123"]);
        let rows = inv.filter(&Filter::new("NINO", "", StatusFilter::All));
        assert_eq!(numbers(&rows), vec!["77"]);
    }

    #[test]
    fn free_tokens_are_anded() {
        let inv = inventory();
        assert_eq!(numbers(&inv.filter(&Filter::new("ray sol", "", StatusFilter::All))), vec!["0123"]);
        assert!(inv.filter(&Filter::new("ray vulk", "", StatusFilter::All)).is_empty());
    }

    #[test]
    fn bare_number_is_substring_search() {
        let inv = inventory();
        let rows = inv.filter(&Filter::new("123", "", StatusFilter::All));
        assert_eq!(numbers(&rows), vec!["123", "0123", "1234"]);
    }

    #[test]
    fn category_is_case_insensitive_substring() {
        let inv = inventory();
        let rows = inv.filter(&Filter::new("", "receta", StatusFilter::All));
        assert_eq!(numbers(&rows), vec!["123", "77"]);
        let rows = inv.filter(&Filter::new("", "SOL", StatusFilter::All));
        assert_eq!(numbers(&rows), vec!["0123", "1234"]);
    }

    #[test]
    fn status_filters_partition_the_set() {
        let inv = inventory();
        let available = inv.filter(&Filter::new("", "", StatusFilter::Available));
        let sold = inv.filter(&Filter::new("", "", StatusFilter::Sold));
        assert_eq!(available.len() + sold.len(), inv.len());
        assert!(available.iter().all(|r| !r.is_sold()));
        assert!(sold.iter().all(|r| r.is_sold()));
        for r in &available {
            assert!(!sold.iter().any(|s| std::ptr::eq(*s, *r)));
        }
    }

    #[test]
    fn status_filter_from_str() {
        assert_eq!("".parse::<StatusFilter>().unwrap(), StatusFilter::All);
        assert_eq!("DISPONIBLE".parse::<StatusFilter>().unwrap(), StatusFilter::Available);
        assert_eq!("vendido".parse::<StatusFilter>().unwrap(), StatusFilter::Sold);
        assert_eq!("sold".parse::<StatusFilter>().unwrap(), StatusFilter::Sold);
        assert!("reservado".parse::<StatusFilter>().is_err());
    }

    #[test]
    fn category_sentinels() {
        assert!(CategoryFilter::new("").is_any());
        assert!(CategoryFilter::new("Todas").is_any());
        assert!(!CategoryFilter::new("sol").is_any());
    }

    #[test]
    fn item_number_key_forms() {
        assert_eq!(item_number_key("0123"), "123");
        assert_eq!(item_number_key("A-1.23"), "123");
        assert_eq!(item_number_key("000"), "0");
        assert_eq!(item_number_key("s/n"), "");
    }

    #[test]
    fn categories_are_distinct_and_sorted() {
        assert_eq!(inventory().categories(), vec!["RECETA", "RECETA NIÑOS", "SOL"]);
    }
}
