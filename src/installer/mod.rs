//! Package installer abstraction
//!
//! The build only knows two operations: install from the network with a
//! reusable download cache, or install from a local vendor directory
//! without network access. How dependencies are resolved is up to the
//! implementation.

mod pip;

pub use pip::PipInstaller;

use crate::error::PipLayersResult;
use async_trait::async_trait;
use std::path::Path;
use tokio::io::{AsyncBufReadExt, BufReader};

/// Installs the dependencies listed in a requirements file
#[async_trait]
pub trait PackageInstaller: Send + Sync {
    /// Install into `location`, keeping downloads and builds under `cache_dir`
    async fn install(
        &self,
        requirements: &Path,
        location: &Path,
        cache_dir: &Path,
    ) -> PipLayersResult<()>;

    /// Install into `location` using only the artifacts in `vendor_dir`
    async fn install_vendor(
        &self,
        requirements: &Path,
        location: &Path,
        vendor_dir: &Path,
    ) -> PipLayersResult<()>;
}

/// Max number of output lines to include in installer error messages.
const ERROR_TAIL_LINES: usize = 50;

/// Keep the last `ERROR_TAIL_LINES` lines of installer output for errors.
pub(crate) fn error_tail(lines: &[String]) -> String {
    let start = lines.len().saturating_sub(ERROR_TAIL_LINES);
    lines[start..].join("\n")
}

/// Stream stdout+stderr from a child process, calling `on_output` for each line.
///
/// Returns all collected output lines for error reporting.
pub(crate) async fn stream_child_output(
    child: &mut tokio::process::Child,
    on_output: &(dyn Fn(&str) + Send + Sync),
) -> Vec<String> {
    let mut stdout_reader = child.stdout.take().map(|s| BufReader::new(s).lines());
    let mut stderr_reader = child.stderr.take().map(|s| BufReader::new(s).lines());

    let mut all_output = Vec::new();
    let mut stdout_done = stdout_reader.is_none();
    let mut stderr_done = stderr_reader.is_none();

    while !stderr_done || !stdout_done {
        tokio::select! {
            line = next_line(&mut stdout_reader), if !stdout_done => {
                match line {
                    Some(line) => {
                        on_output(&line);
                        all_output.push(line);
                    }
                    None => stdout_done = true,
                }
            }
            line = next_line(&mut stderr_reader), if !stderr_done => {
                match line {
                    Some(line) => {
                        on_output(&line);
                        all_output.push(line);
                    }
                    None => stderr_done = true,
                }
            }
        }
    }

    all_output
}

async fn next_line<R>(reader: &mut Option<tokio::io::Lines<BufReader<R>>>) -> Option<String>
where
    R: tokio::io::AsyncRead + Unpin,
{
    match reader {
        Some(lines) => lines.next_line().await.ok().flatten(),
        None => None,
    }
}
