use thiserror::Error;

/// Delimiters used when none are supplied: space, tab, newline, carriage return, form feed.
pub const DEFAULT_DELIMITERS: &str = " \t\n\r\x0c";

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenizerError {
    #[error("no tokens remain (consumed {consumed} of {length} bytes)")]
    Exhausted { consumed: usize, length: usize },
}

/// Splits a borrowed string into runs of non-delimiter characters.
///
/// Runs of delimiters collapse, so no empty tokens are produced. The default
/// delimiter set is fixed at construction; [`StringTokenizer::next_token_with`]
/// overrides it for a single extraction only.
///
/// Extracting a token also consumes the one delimiter that ended it, which is
/// then available from [`StringTokenizer::last_delimiter`]. A later call with a
/// different delimiter set never sees that character.
#[derive(Debug, Clone)]
pub struct StringTokenizer<'a> {
    source: &'a str,
    position: usize,
    delimiters: Vec<char>,
    last_delimiter: Option<char>,
}

impl<'a> StringTokenizer<'a> {
    pub fn new(source: &'a str) -> Self {
        Self::with_delimiters(source, DEFAULT_DELIMITERS)
    }

    pub fn with_delimiters(source: &'a str, delimiters: &str) -> Self {
        Self {
            source,
            position: 0,
            delimiters: delimiters.chars().collect(),
            last_delimiter: None,
        }
    }

    pub fn has_more_tokens(&self) -> bool {
        skip_delimiters(self.remainder(), &self.delimiters).is_some()
    }

    pub fn next_token(&mut self) -> Result<&'a str, TokenizerError> {
        let delimiters = std::mem::take(&mut self.delimiters);
        let token = self.extract(&delimiters);
        self.delimiters = delimiters;
        token
    }

    /// Extracts the next token using `delimiters` for this call only.
    pub fn next_token_with(&mut self, delimiters: &str) -> Result<&'a str, TokenizerError> {
        let delimiters: Vec<char> = delimiters.chars().collect();
        self.extract(&delimiters)
    }

    /// Number of tokens left under the default delimiters. Does not consume input.
    pub fn count(&self) -> usize {
        let mut rest = self.remainder();
        let mut count = 0;
        while let Some(start) = skip_delimiters(rest, &self.delimiters) {
            count += 1;
            let after = &rest[start..];
            let end = after
                .find(|c: char| self.delimiters.contains(&c))
                .unwrap_or(after.len());
            rest = &after[end..];
        }
        count
    }

    /// Unconsumed input, including any leading delimiters.
    pub fn remainder(&self) -> &'a str {
        &self.source[self.position..]
    }

    /// The delimiter that terminated the most recent token, if any.
    pub fn last_delimiter(&self) -> Option<char> {
        self.last_delimiter
    }

    fn extract(&mut self, delimiters: &[char]) -> Result<&'a str, TokenizerError> {
        let rest = self.remainder();
        let start = skip_delimiters(rest, delimiters).ok_or(TokenizerError::Exhausted {
            consumed: self.position,
            length: self.source.len(),
        })?;
        let after = &rest[start..];
        let (token, consumed) = match after.char_indices().find(|(_, c)| delimiters.contains(c)) {
            Some((end, delimiter)) => {
                self.last_delimiter = Some(delimiter);
                (&after[..end], start + end + delimiter.len_utf8())
            }
            None => {
                self.last_delimiter = None;
                (after, rest.len())
            }
        };
        self.position += consumed;
        Ok(token)
    }
}

/// Byte offset of the first non-delimiter character in `input`.
fn skip_delimiters(input: &str, delimiters: &[char]) -> Option<usize> {
    input
        .char_indices()
        .find(|(_, c)| !delimiters.contains(c))
        .map(|(index, _)| index)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_delimiters() {
        let mut tokenizer = StringTokenizer::new("First\tSecond\tThird");

        assert!(tokenizer.has_more_tokens());
        assert_eq!(tokenizer.next_token().unwrap(), "First");
        assert!(tokenizer.has_more_tokens());
        assert_eq!(tokenizer.next_token().unwrap(), "Second");
        assert!(tokenizer.has_more_tokens());
        assert_eq!(tokenizer.next_token().unwrap(), "Third");
        assert!(!tokenizer.has_more_tokens());
    }

    #[test]
    fn test_specified_delimiters() {
        let mut tokenizer = StringTokenizer::with_delimiters("First,Second,Third", ",");

        assert_eq!(tokenizer.next_token().unwrap(), "First");
        assert_eq!(tokenizer.next_token().unwrap(), "Second");
        assert_eq!(tokenizer.next_token().unwrap(), "Third");
        assert!(!tokenizer.has_more_tokens());
    }

    #[test]
    fn test_repeated_prefix() {
        let mut tokenizer = StringTokenizer::new("First\tFirstly\tThird");

        assert_eq!(tokenizer.next_token().unwrap(), "First");
        assert_eq!(tokenizer.next_token().unwrap(), "Firstly");
        assert_eq!(tokenizer.next_token().unwrap(), "Third");
        assert!(!tokenizer.has_more_tokens());
    }

    #[test]
    fn test_override_is_one_shot() {
        let mut tokenizer = StringTokenizer::new("First,more\tSecond,Third");

        assert_eq!(tokenizer.next_token().unwrap(), "First,more");
        assert!(tokenizer.has_more_tokens());
        assert_eq!(tokenizer.next_token_with(",").unwrap(), "Second");
        assert_eq!(tokenizer.last_delimiter(), Some(','));
        assert!(tokenizer.has_more_tokens());
        assert_eq!(tokenizer.next_token().unwrap(), "Third");
        assert_eq!(tokenizer.last_delimiter(), None);
        assert!(!tokenizer.has_more_tokens());
    }

    #[test]
    fn test_terminating_delimiter_is_consumed() {
        let mut tokenizer = StringTokenizer::new("a,b");
        assert_eq!(tokenizer.next_token_with(",").unwrap(), "a");
        assert_eq!(tokenizer.last_delimiter(), Some(','));
        assert_eq!(tokenizer.remainder(), "b");
        assert_eq!(tokenizer.next_token().unwrap(), "b");
    }

    #[test]
    fn test_count_does_not_consume() {
        let mut tokenizer = StringTokenizer::new("First\tSecond\tThird");

        assert_eq!(tokenizer.count(), 3);
        tokenizer.next_token().unwrap();
        assert_eq!(tokenizer.count(), 2);
        tokenizer.next_token().unwrap();
        assert_eq!(tokenizer.count(), 1);
        assert_eq!(tokenizer.next_token().unwrap(), "Third");
        assert_eq!(tokenizer.count(), 0);
    }

    #[test]
    fn test_delimiter_runs_collapse() {
        let mut tokenizer = StringTokenizer::with_delimiters(",,a,,,b,", ",");
        assert_eq!(tokenizer.count(), 2);
        assert_eq!(tokenizer.next_token().unwrap(), "a");
        assert_eq!(tokenizer.next_token().unwrap(), "b");
        assert!(!tokenizer.has_more_tokens());
    }

    #[test]
    fn test_remainder_after_single_delimiter() {
        let mut tokenizer = StringTokenizer::new("key  = 'value'");
        assert_eq!(tokenizer.next_token_with(" =").unwrap(), "key");
        assert_eq!(tokenizer.last_delimiter(), Some(' '));
        assert_eq!(tokenizer.remainder(), " = 'value'");
    }

    #[test]
    fn test_exhausted() {
        let mut tokenizer = StringTokenizer::new("  \t ");
        assert!(!tokenizer.has_more_tokens());
        assert!(matches!(
            tokenizer.next_token(),
            Err(TokenizerError::Exhausted { consumed: 0, length: 4 })
        ));
    }
}
