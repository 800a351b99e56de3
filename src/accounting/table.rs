use std::collections::HashSet;

/// A decoded input sheet: cleaned column names plus raw cell text.
///
/// Rows may be shorter than the header; missing cells read as blank.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
}

impl RawTable {
    pub fn new<H: Into<String>>(headers: Vec<H>, rows: Vec<Vec<String>>) -> RawTable {
        let headers = clean_headers(headers.into_iter().map(Into::into).collect());
        RawTable { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<String>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name.trim())
    }
}

pub fn cell(row: &[String], column: usize) -> &str {
    row.get(column).map(|c| c.as_str()).unwrap_or("")
}

/// Trims every header and renames repeats to `name_1`, `name_2`, ... in
/// order of appearance, skipping suffixes already taken by another header.
pub fn clean_headers(headers: Vec<String>) -> Vec<String> {
    let trimmed: Vec<String> = headers.iter().map(|h| h.trim().to_string()).collect();
    let mut taken: HashSet<String> = HashSet::new();
    let mut cleaned = Vec::with_capacity(trimmed.len());

    for (idx, name) in trimmed.iter().enumerate() {
        if taken.insert(name.clone()) {
            cleaned.push(name.clone());
            continue;
        }

        let mut suffix = 1;
        let unique = loop {
            let candidate = format!("{}_{}", name, suffix);
            // A later header literally named `candidate` keeps its own name.
            let reserved = trimmed[idx + 1..].contains(&candidate);
            if !reserved && !taken.contains(&candidate) {
                break candidate;
            }
            suffix += 1;
        };
        taken.insert(unique.clone());
        cleaned.push(unique);
    }

    cleaned
}
