use anyhow::{anyhow, Result};
use std::io::{self, BufRead, StdinLock, Stdout, Write};

/// Line-oriented questions on a terminal, or anything shaped like one.
pub struct Prompt<R, W> {
    input: R,
    output: W,
}

impl Prompt<StdinLock<'static>, Stdout> {
    pub fn stdio() -> Self {
        Self::new(io::stdin().lock(), io::stdout())
    }
}

impl<R, W> Prompt<R, W>
where
    R: BufRead,
    W: Write,
{
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    /// Empty input takes `default`; without one it is an error.
    pub fn text(&mut self, label: &str, default: Option<&str>) -> Result<String> {
        let answer = self.ask(label, default)?;
        match (answer.is_empty(), default) {
            (false, _) => Ok(answer),
            (true, Some(default)) => Ok(default.to_owned()),
            (true, None) => Err(anyhow!("{label} cannot be empty")),
        }
    }

    pub fn year(&mut self, label: &str, default: i32) -> Result<i32> {
        let answer = self.text(label, Some(&default.to_string()))?;
        answer
            .parse()
            .map_err(|_| anyhow!("Please enter a valid number, not `{answer}`"))
    }

    fn ask(&mut self, label: &str, default: Option<&str>) -> Result<String> {
        match default {
            Some(default) => write!(self.output, "{label} [{default}]: ")?,
            None => write!(self.output, "{label}: ")?,
        }
        self.output.flush()?;

        let mut line = String::new();
        self.input.read_line(&mut line)?;
        Ok(line.trim().to_owned())
    }
}
