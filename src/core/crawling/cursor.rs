use std::collections::HashSet;

/// Per-run position in a provider's history.
#[derive(Debug, Clone, Default)]
pub struct CrawlCursor {
    /// Year of the most recent page that named one; incident timestamps carry none.
    pub year: Option<i32>,
    /// Consecutive pages without a single incident row.
    pub empty_pages: usize,
    seen_issues: HashSet<String>,
}

impl CrawlCursor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Folds in what the next page listed.
    pub fn advance(&mut self, year: Option<i32>, had_any_incident: bool) {
        if year.is_some() {
            self.year = year;
        }
        self.empty_pages = if had_any_incident {
            0
        } else {
            self.empty_pages + 1
        };
    }

    /// History is assumed to end after `limit` incident-free pages in a row.
    /// This is a heuristic: a provider with a longer quiet stretch ends the crawl early.
    /// A limit of zero disables the rule.
    pub fn reached_end(&self, limit: usize) -> bool {
        limit > 0 && self.empty_pages >= limit
    }

    /// Records `issue`; false if it was already seen this run.
    pub fn claim_issue(&mut self, issue: &str) -> bool {
        self.seen_issues.insert(issue.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_resets_on_content() {
        let mut cursor = CrawlCursor::new();
        cursor.advance(Some(2019), false);
        cursor.advance(Some(2019), false);
        assert_eq!(cursor.empty_pages, 2);
        assert!(!cursor.reached_end(3));

        cursor.advance(Some(2019), true);
        assert_eq!(cursor.empty_pages, 0);

        cursor.advance(None, false);
        cursor.advance(None, false);
        cursor.advance(None, false);
        assert!(cursor.reached_end(3));
        assert_eq!(cursor.year, Some(2019), "year carries over pages without one");
    }

    #[test]
    fn test_zero_limit_never_stops() {
        let mut cursor = CrawlCursor::new();
        for _ in 1..=10 {
            cursor.advance(None, false);
        }
        assert!(!cursor.reached_end(0));
    }

    #[test]
    fn test_claim_issue() {
        let mut cursor = CrawlCursor::new();
        assert!(cursor.claim_issue("abc"));
        assert!(!cursor.claim_issue("abc"));
        assert!(cursor.claim_issue("def"));
    }
}
