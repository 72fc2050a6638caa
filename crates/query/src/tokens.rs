use optistock_core::re;

re!(re_token, r#""[^"]+"|\S+"#);
re!(re_tagged_number, r"^[#@](\d+)$");
re!(re_quoted_number, r#"^"(\d+)"$"#);

/// A search box entry split into its token classes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Digits from `#123`, `@123` or `"123"`; matched against item numbers.
    pub exact_numbers: Vec<String>,
    /// Everything else, quotes removed; matched as substrings.
    pub free_tokens: Vec<String>,
    /// What the highlighter should mark in the rendered rows.
    pub highlight_tokens: Vec<String>,
}

fn strip_quotes(s: &str) -> &str {
    let s = s.strip_prefix(['"', '\'']).unwrap_or(s);
    s.strip_suffix(['"', '\'']).unwrap_or(s)
}

impl Query {
    /// Split on whitespace, keeping `"quoted phrases"` together.
    pub fn parse(raw: &str) -> Self {
        let mut query = Query::default();
        for m in re_token().find_iter(raw.trim()) {
            let part = m.as_str();
            let exact = re_tagged_number()
                .captures(part)
                .or_else(|| re_quoted_number().captures(part));
            if let Some(c) = exact {
                query.exact_numbers.push(c[1].to_string());
                query.highlight_tokens.push(c[1].to_string());
                continue;
            }
            let text = strip_quotes(part).trim();
            if text.is_empty() {
                continue;
            }
            query.free_tokens.push(text.to_string());
            query.highlight_tokens.push(text.to_string());
        }
        query
    }

    pub fn is_empty(&self) -> bool {
        self.exact_numbers.is_empty() && self.free_tokens.is_empty()
    }
}
