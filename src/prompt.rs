use std::io::{self, BufRead, Write};
use std::path::PathBuf;

/// Asks the user for a directory. `None` means the prompt was cancelled.
pub trait DirectoryPrompt {
    fn select_directory(&mut self, message: &str) -> Option<PathBuf>;
}

impl<P: DirectoryPrompt + ?Sized> DirectoryPrompt for &mut P {
    fn select_directory(&mut self, message: &str) -> Option<PathBuf> {
        (**self).select_directory(message)
    }
}

/// Line-based prompt; EOF or an empty line cancels.
pub struct ConsolePrompt<R, W> {
    input: R,
    output: W,
}

impl ConsolePrompt<io::StdinLock<'static>, io::Stderr> {
    pub fn stdio() -> Self {
        ConsolePrompt::new(io::stdin().lock(), io::stderr())
    }
}

impl<R: BufRead, W: Write> ConsolePrompt<R, W> {
    pub fn new(input: R, output: W) -> Self {
        ConsolePrompt { input, output }
    }

    fn ask(&mut self, message: &str) -> io::Result<String> {
        write!(self.output, "{message}\n> ")?;
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_string())
    }
}

impl<R: BufRead, W: Write> DirectoryPrompt for ConsolePrompt<R, W> {
    fn select_directory(&mut self, message: &str) -> Option<PathBuf> {
        match self.ask(message) {
            Ok(line) if !line.is_empty() => Some(PathBuf::from(line)),
            Ok(_) => None,
            Err(e) => {
                tracing::error!("failed to read directory from console: {e}");
                None
            }
        }
    }
}
