//! Line-by-line parsing of log streams.

use crate::compiler::CompiledTemplate;
use crate::error::Result;
use crate::record::Record;
use std::io::{BufRead, BufReader, Read};
use tracing::debug;

/// Counters kept while reading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ReadStats {
    /// Non-blank lines handed to the template.
    pub lines: usize,
    pub matched: usize,
    pub unmatched: usize,
}

/// A reader that parses a log stream line by line with a compiled template.
///
/// Lines that do not match yield an empty [`Record`] and reading continues;
/// only I/O failures are reported as errors.
#[derive(Debug)]
pub struct Reader<R: Read> {
    /// The underlying buffered reader.
    reader: BufReader<R>,
    template: CompiledTemplate,
    stats: ReadStats,
}

impl<R: Read> Reader<R> {
    /// Create a new reader over `input`.
    ///
    /// # Example
    ///
    /// ```rust
    /// use rsytmpl::{CompiledTemplate, Reader};
    /// use std::io::Cursor;
    ///
    /// let template = CompiledTemplate::new("counter", "%NUM% %msg%", None)?;
    /// let reader = Reader::new(Cursor::new("1 one\nnot a number\n3 three\n"), template);
    ///
    /// let records = reader.collect_all()?;
    /// assert_eq!(records.len(), 3);
    /// assert!(records[1].is_empty());
    /// # Ok::<(), rsytmpl::Error>(())
    /// ```
    pub fn new(input: R, template: CompiledTemplate) -> Self {
        Self {
            reader: BufReader::new(input),
            template,
            stats: ReadStats::default(),
        }
    }

    /// Get a reference to the compiled template.
    pub fn template(&self) -> &CompiledTemplate {
        &self.template
    }

    /// Counters so far.
    pub fn stats(&self) -> ReadStats {
        self.stats
    }

    /// Read and parse the next non-blank line.
    ///
    /// # Returns
    ///
    /// - `None` at end of input
    /// - `Some(Ok(record))` for every line, with an empty record when it did not match
    /// - `Some(Err(error))` on an I/O error
    pub fn read(&mut self) -> Option<Result<Record>> {
        let mut line = String::new();

        loop {
            line.clear();
            match self.reader.read_line(&mut line) {
                Ok(0) => return None,
                Ok(_) => {
                    if line.ends_with('\n') {
                        line.pop();
                        if line.ends_with('\r') {
                            line.pop();
                        }
                    }

                    if line.trim().is_empty() {
                        debug!("Skipping blank line");
                        continue;
                    }

                    let record = self.template.parse(&line);
                    self.stats.lines += 1;
                    if record.is_empty() {
                        self.stats.unmatched += 1;
                    } else {
                        self.stats.matched += 1;
                    }
                    return Some(Ok(record));
                }
                Err(e) => return Some(Err(e.into())),
            }
        }
    }

    /// Collect all records into a vector.
    pub fn collect_all(mut self) -> Result<Vec<Record>> {
        let mut records = Vec::new();

        while let Some(result) = self.read() {
            records.push(result?);
        }

        Ok(records)
    }

    /// Process records one by one with a closure, without collecting them.
    ///
    /// Unmatched lines are passed on as empty records.
    pub fn process_records<F, E>(&mut self, mut f: F) -> std::result::Result<ReadStats, E>
    where
        F: FnMut(&Record) -> std::result::Result<(), E>,
        E: From<crate::error::Error>,
    {
        while let Some(result) = self.read() {
            let record = result?;
            f(&record)?;
        }
        Ok(self.stats)
    }
}

impl<R: Read> Iterator for Reader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        self.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{self, Cursor};

    fn docker() -> CompiledTemplate {
        CompiledTemplate::new(
            "DockerCLog",
            "%TIMESTAMP% %NUM% %bracket% %bracket% %bracket% %msg%",
            None,
        )
        .unwrap()
    }

    const DOCKER_LOG: &str = "2021-03-04T10:11:12.345678Z 0 [System] [MY-010116] [Server] Starting
2021-03-04T10:11:13.000001Z 1 [Warning] [MY-011810] [Server] Insecure configuration
";

    #[test]
    fn test_reader_basic() {
        let mut reader = Reader::new(Cursor::new(DOCKER_LOG), docker());

        let record = reader.read().unwrap().unwrap();
        assert_eq!(record.field("NUM").unwrap(), "0");
        assert_eq!(record.field("bracket").unwrap(), "[System]");
        assert_eq!(record.field("bracket1").unwrap(), "[MY-010116]");
        assert_eq!(record.field("bracket2").unwrap(), "[Server]");
        assert_eq!(record.field("msg").unwrap(), "Starting");

        assert!(reader.read().unwrap().is_ok());
        assert!(reader.read().is_none());
        assert_eq!(
            reader.stats(),
            ReadStats {
                lines: 2,
                matched: 2,
                unmatched: 0
            }
        );
    }

    #[test]
    fn test_unmatched_lines_do_not_stop_the_stream() {
        let data = format!("garbage line\n\n{}", DOCKER_LOG);
        let mut reader = Reader::new(Cursor::new(data), docker());

        let records: Vec<Record> = reader.by_ref().map(|r| r.unwrap()).collect();
        assert_eq!(records.len(), 3);
        assert!(records[0].is_empty());
        assert_eq!(records[2].field("NUM").unwrap(), "1");
        assert_eq!(reader.stats().unmatched, 1);
        assert_eq!(reader.stats().matched, 2);
    }

    #[test]
    fn test_crlf_lines() {
        let reader = Reader::new(
            Cursor::new("2021-03-04 10:11:12 7 [a] [b] [c] x\r\n"),
            docker(),
        );
        let records = reader.collect_all().unwrap();
        assert_eq!(records[0].field("msg").unwrap(), "x");
    }

    #[test]
    fn test_process_records() {
        let mut reader = Reader::new(Cursor::new(DOCKER_LOG), docker());
        let mut ids = Vec::new();
        let stats = reader
            .process_records(|record| -> Result<()> {
                ids.push(record.int_field("NUM")?);
                Ok(())
            })
            .unwrap();
        assert_eq!(ids, vec![0, 1]);
        assert_eq!(stats.matched, 2);
    }

    struct FailingRead;

    impl Read for FailingRead {
        fn read(&mut self, _buf: &mut [u8]) -> io::Result<usize> {
            Err(io::Error::new(io::ErrorKind::Other, "boom"))
        }
    }

    #[test]
    fn test_io_error_surfaces() {
        let mut reader = Reader::new(FailingRead, docker());
        assert!(matches!(
            reader.read(),
            Some(Err(crate::error::Error::Io { .. }))
        ));
    }
}
