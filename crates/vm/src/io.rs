//! Runtime I/O: the line source READ consumes and the output sinks WRITE,
//! DPRINT and BREAK emit to.

use std::io::{BufRead, Write};

/// A line-oriented input source.
pub trait LineSource {
    /// Next line without its line terminator, or `None` at end of input.
    fn read_line(&mut self) -> Option<String>;
}

/// Adapts any [`BufRead`]. A read error counts as end of input.
#[derive(Debug)]
pub struct BufReadSource<R> {
    reader: R,
}

impl<R: BufRead> BufReadSource<R> {
    pub fn new(reader: R) -> Self {
        Self { reader }
    }
}

impl<R: BufRead> LineSource for BufReadSource<R> {
    fn read_line(&mut self) -> Option<String> {
        let mut line = String::new();
        match self.reader.read_line(&mut line) {
            Ok(0) | Err(_) => None,
            Ok(_) => {
                if line.ends_with('\n') {
                    line.pop();
                    if line.ends_with('\r') {
                        line.pop();
                    }
                }
                Some(line)
            }
        }
    }
}

/// The three channels a run talks to.
pub struct Io<'a> {
    pub input: &'a mut dyn LineSource,
    /// Program output (WRITE).
    pub output: &'a mut dyn Write,
    /// Diagnostics (DPRINT, BREAK).
    pub diagnostics: &'a mut dyn Write,
}

impl<'a> Io<'a> {
    pub fn new(
        input: &'a mut dyn LineSource,
        output: &'a mut dyn Write,
        diagnostics: &'a mut dyn Write,
    ) -> Self {
        Self {
            input,
            output,
            diagnostics,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_line_terminators() {
        let mut source = BufReadSource::new("one\ntwo\r\n\nlast".as_bytes());
        assert_eq!(source.read_line().as_deref(), Some("one"));
        assert_eq!(source.read_line().as_deref(), Some("two"));
        assert_eq!(source.read_line().as_deref(), Some(""));
        assert_eq!(source.read_line().as_deref(), Some("last"));
        assert_eq!(source.read_line(), None);
        assert_eq!(source.read_line(), None);
    }

    #[test]
    fn empty_input() {
        let mut source = BufReadSource::new(std::io::empty());
        assert_eq!(source.read_line(), None);
    }
}
