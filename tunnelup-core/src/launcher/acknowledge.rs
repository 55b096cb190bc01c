//! User acknowledgment after the tunnel exits

use std::io::{self, BufRead, Write};

/// Prompt shown after the closing notice
pub const ACK_PROMPT: &str = "Press Enter to close...";

/// Blocks until the user acknowledges the closing notice
pub trait Acknowledge {
    /// Show `notice` and wait for one acknowledgment
    fn acknowledge(&mut self, notice: &str) -> io::Result<()>;
}

/// Acknowledger reading one line from a reader (stdin by default)
///
/// End of input counts as acknowledgment so a closed stdin cannot hang the
/// launcher.
pub struct ConsoleAcknowledger<R, W> {
    reader: R,
    writer: W,
}

impl ConsoleAcknowledger<io::BufReader<io::Stdin>, io::Stdout> {
    /// Acknowledger bound to the process's stdin and stdout
    pub fn stdio() -> Self {
        Self::new(io::BufReader::new(io::stdin()), io::stdout())
    }
}

impl<R: BufRead, W: Write> ConsoleAcknowledger<R, W> {
    pub fn new(reader: R, writer: W) -> Self {
        Self { reader, writer }
    }

    /// Give back the writer, e.g. to inspect what was printed
    pub fn into_writer(self) -> W {
        self.writer
    }
}

impl<R: BufRead, W: Write> Acknowledge for ConsoleAcknowledger<R, W> {
    fn acknowledge(&mut self, notice: &str) -> io::Result<()> {
        writeln!(self.writer)?;
        writeln!(self.writer, "{}", notice)?;
        write!(self.writer, "{}", ACK_PROMPT)?;
        self.writer.flush()?;

        let mut line = String::new();
        self.reader.read_line(&mut line)?;
        Ok(())
    }
}
