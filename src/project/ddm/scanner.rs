use super::DdmError;

/// Forward-only cursor over the lines of a DDM listing.
#[derive(Clone, Debug)]
pub struct LinewiseTextScanner {
    lines: Vec<String>,
    current: usize,
}

impl LinewiseTextScanner {
    /// Fails when there are no lines: there is no empty DDM.
    pub fn new<I, S>(lines: I) -> Result<Self, DdmError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let lines: Vec<String> = lines.into_iter().map(Into::into).collect();
        if lines.is_empty() {
            return Err(DdmError::EmptyInput);
        }
        Ok(Self { lines, current: 0 })
    }

    pub fn peek(&self) -> Option<&str> {
        self.peek_at(0)
    }

    /// The line `offset` lines ahead of the current one.
    pub fn peek_at(&self, offset: usize) -> Option<&str> {
        self.lines.get(self.current + offset).map(String::as_str)
    }

    pub fn advance(&mut self) {
        if !self.is_at_end() {
            self.current += 1;
        }
    }

    pub fn is_at_end(&self) -> bool {
        self.current >= self.lines.len()
    }

    /// 1-indexed number of the current line.
    pub fn line_number(&self) -> usize {
        self.current + 1
    }

    pub fn skip_blank_lines(&mut self) {
        while self.peek().is_some_and(|line| line.trim().is_empty()) {
            self.advance();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_lines_fail_at_construction() {
        let err = LinewiseTextScanner::new(Vec::<String>::new()).expect_err("no lines");
        assert_eq!(err, DdmError::EmptyInput);
        assert!(LinewiseTextScanner::new("".lines()).is_err());
    }

    #[test]
    fn test_peek_and_advance() {
        let mut scanner = LinewiseTextScanner::new(["one", "two", "three"]).expect("lines");
        assert_eq!(scanner.peek(), Some("one"));
        assert_eq!(scanner.peek_at(2), Some("three"));
        assert_eq!(scanner.peek_at(3), None);

        scanner.advance();
        assert_eq!(scanner.peek(), Some("two"));
        assert_eq!(scanner.line_number(), 2);

        scanner.advance();
        scanner.advance();
        assert!(scanner.is_at_end());
        assert_eq!(scanner.peek(), None);

        scanner.advance();
        assert!(scanner.is_at_end());
    }

    #[test]
    fn test_skip_blank_lines() {
        let mut scanner = LinewiseTextScanner::new(["", "   ", "text"]).expect("lines");
        scanner.skip_blank_lines();
        assert_eq!(scanner.peek(), Some("text"));
    }
}
