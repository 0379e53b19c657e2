use std::fs::OpenOptions;
use std::io::{self, Write};
use std::path::PathBuf;
use uuid::Uuid;

/// Talks to the Actions runner through workflow commands on stdout and the
/// `GITHUB_OUTPUT` file.
pub struct GitHubActions<W> {
    out: W,
    output_file: Option<PathBuf>,
}

impl GitHubActions<io::Stdout> {
    pub fn from_env() -> GitHubActions<io::Stdout> {
        GitHubActions::new(
            io::stdout(),
            std::env::var_os("GITHUB_OUTPUT")
                .filter(|path| !path.is_empty())
                .map(PathBuf::from),
        )
    }
}

impl<W: Write> GitHubActions<W> {
    pub fn new(out: W, output_file: Option<PathBuf>) -> GitHubActions<W> {
        GitHubActions { out, output_file }
    }

    /// Registers `value` with the runner so it is masked in all later logs.
    pub fn set_secret(&mut self, value: &str) -> io::Result<()> {
        writeln!(self.out, "::add-mask::{}", escape_data(value))
    }

    pub fn set_output(&mut self, name: &str, value: &str) -> io::Result<()> {
        match &self.output_file {
            Some(path) => {
                let delimiter = format!("ghadelimiter_{}", Uuid::new_v4());
                let mut file = OpenOptions::new().append(true).create(true).open(path)?;
                write!(file, "{}<<{}\n{}\n{}\n", name, delimiter, value, delimiter)
            }
            None => {
                writeln!(self.out)?;
                writeln!(self.out, "::set-output name={}::{}", name, escape_data(value))
            }
        }
    }

    pub fn info(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "{}", message)
    }

    pub fn set_failed(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.out, "::error::{}", escape_data(message))
    }
}

fn escape_data(value: &str) -> String {
    value
        .replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}
