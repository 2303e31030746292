use crate::args::ArgsError;

/// Forward-only cursor over a borrowed argument vector.
///
/// Remembers the last token it handed out so the caller can point at it
/// when parsing fails.
#[derive(Debug)]
pub struct ArgsIterator<'a, S: AsRef<str>> {
    args: &'a [S],
    pos: usize,
    current: &'a str,
}

impl<'a, S: AsRef<str>> ArgsIterator<'a, S> {
    pub fn new(args: &'a [S]) -> Self {
        Self {
            args,
            pos: 0,
            current: "",
        }
    }

    /// Steps over one token without recording it. Used to drop the program name.
    pub fn skip_one(&mut self) -> bool {
        if self.pos < self.args.len() {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    /// Like `next`, but running out of tokens is a `MissingValue` error.
    pub fn take_next(&mut self) -> Result<&'a str, ArgsError> {
        self.next().ok_or(ArgsError::MissingValue)
    }

    /// The token most recently returned by `next` or `take_next`.
    pub fn current(&self) -> &'a str {
        self.current
    }
}

impl<'a, S: AsRef<str>> Iterator for ArgsIterator<'a, S> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        let arg = self.args.get(self.pos)?.as_ref();
        self.pos += 1;
        self.current = arg;
        Some(arg)
    }
}
