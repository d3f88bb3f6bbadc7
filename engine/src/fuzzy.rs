//! Approximate substring matching.
//!
//! A pattern matches a field when some substring of the field is within a
//! small edit distance of the pattern. Where that substring sits in the field
//! does not affect the result, so a hit at the end of a long title is as good
//! as one at the start.

/// Best alignment of a pattern against one field
#[derive(Debug, Clone, PartialEq)]
pub struct FuzzyMatch {
    /// Edit operations needed to turn the pattern into the matched substring
    pub errors: usize,
    /// `errors / pattern length`; 0.0 is an exact substring hit
    pub score: f32,
    /// Char ranges `[start, end)` of the field that matched pattern chars exactly
    pub spans: Vec<(usize, usize)>,
}

/// Edit distance table for pattern (rows) against text (columns) where
/// row 0 is free at every column, so matches may start anywhere.
struct Table {
    cols: usize,
    cells: Vec<usize>,
}

impl Table {
    fn build(pattern: &[char], text: &[char]) -> Self {
        let cols = text.len() + 1;
        let mut cells = vec![0usize; (pattern.len() + 1) * cols];
        for i in 1..=pattern.len() {
            cells[i * cols] = i;
            for j in 1..=text.len() {
                let cost = usize::from(pattern[i - 1] != text[j - 1]);
                let diagonal = cells[(i - 1) * cols + j - 1] + cost;
                let skip_pattern = cells[(i - 1) * cols + j] + 1;
                let skip_text = cells[i * cols + j - 1] + 1;
                cells[i * cols + j] = diagonal.min(skip_pattern).min(skip_text);
            }
        }
        Table { cols, cells }
    }

    fn at(&self, i: usize, j: usize) -> usize {
        self.cells[i * self.cols + j]
    }
}

/// Match a normalised pattern against lowercased field chars.
///
/// Returns `None` for an empty pattern. Otherwise returns the best
/// alignment, choosing the earliest end position among equally good ones.
pub fn fuzzy_match(pattern: &[char], text: &[char]) -> Option<FuzzyMatch> {
    if pattern.is_empty() {
        return None;
    }
    let m = pattern.len();

    if text.is_empty() {
        return Some(FuzzyMatch {
            errors: m,
            score: 1.0,
            spans: Vec::new(),
        });
    }

    let table = Table::build(pattern, text);

    let (end, errors) = (1..=text.len())
        .map(|j| (j, table.at(m, j)))
        .min_by_key(|&(j, errors)| (errors, j))?;

    let spans = trace_spans(&table, pattern, text, end);

    Some(FuzzyMatch {
        errors,
        score: errors as f32 / m as f32,
        spans,
    })
}

/// Walk the table back from `(m, end)` and collect runs of exact char matches
fn trace_spans(table: &Table, pattern: &[char], text: &[char], end: usize) -> Vec<(usize, usize)> {
    let mut matched = Vec::new();
    let (mut i, mut j) = (pattern.len(), end);

    while i > 0 && j > 0 {
        let here = table.at(i, j);
        let equal = pattern[i - 1] == text[j - 1];
        if equal && table.at(i - 1, j - 1) == here {
            matched.push(j - 1);
            i -= 1;
            j -= 1;
        } else if !equal && table.at(i - 1, j - 1) + 1 == here {
            i -= 1;
            j -= 1;
        } else if table.at(i, j - 1) + 1 == here {
            j -= 1;
        } else {
            i -= 1;
        }
    }

    matched.reverse();
    runs(&matched)
}

/// Collapse sorted positions into half-open runs
fn runs(positions: &[usize]) -> Vec<(usize, usize)> {
    let mut spans: Vec<(usize, usize)> = Vec::new();
    for &pos in positions {
        match spans.last_mut() {
            Some((_, end)) if *end == pos => *end = pos + 1,
            _ => spans.push((pos, pos + 1)),
        }
    }
    spans
}
