//! pip-backed package installer
//!
//! Runs `<python> -m pip install --user` with `PYTHONUSERBASE` pointing at
//! the target layer, streaming pip's output into the build log.

use crate::error::{PipLayersError, PipLayersResult};
use crate::installer::{error_tail, stream_child_output, PackageInstaller};
use crate::ui;
use async_trait::async_trait;
use std::ffi::OsString;
use std::path::Path;
use std::process::Stdio;
use tokio::process::Command;
use tracing::debug;

/// Package installer that shells out to pip
#[derive(Debug, Clone)]
pub struct PipInstaller {
    python: String,
    extra_args: Vec<String>,
}

impl PipInstaller {
    /// Create an installer using the given interpreter
    pub fn new(python: impl Into<String>) -> Self {
        Self {
            python: python.into(),
            extra_args: Vec::new(),
        }
    }

    /// Append arguments to every pip invocation
    pub fn with_extra_args(mut self, args: Vec<String>) -> Self {
        self.extra_args = args;
        self
    }

    /// Arguments for a networked install
    fn install_args(&self, requirements: &Path, cache_dir: &Path) -> Vec<OsString> {
        let mut args = self.base_args(requirements);
        args.push(flag("--cache-dir=", cache_dir));
        self.finish_args(args)
    }

    /// Arguments for an offline install from a vendor directory
    fn vendor_args(&self, requirements: &Path, vendor_dir: &Path) -> Vec<OsString> {
        let mut args = self.base_args(requirements);
        args.push("--no-index".into());
        args.push(flag("--find-links=", vendor_dir));
        self.finish_args(args)
    }

    fn base_args(&self, requirements: &Path) -> Vec<OsString> {
        vec![
            "-m".into(),
            "pip".into(),
            "install".into(),
            "--requirement".into(),
            requirements.as_os_str().to_os_string(),
            "--ignore-installed".into(),
            "--exists-action=w".into(),
        ]
    }

    fn finish_args(&self, mut args: Vec<OsString>) -> Vec<OsString> {
        args.push("--compile".into());
        args.push("--user".into());
        args.push("--disable-pip-version-check".into());
        args.extend(self.extra_args.iter().map(OsString::from));
        args
    }

    /// Run pip and turn a non-zero exit into an installer failure
    async fn run(
        &self,
        args: Vec<OsString>,
        requirements: &Path,
        location: &Path,
    ) -> PipLayersResult<()> {
        let command_line = format!(
            "{} {}",
            self.python,
            args.iter()
                .map(|a| a.to_string_lossy())
                .collect::<Vec<_>>()
                .join(" ")
        );
        debug!("Executing: {}", command_line);

        let mut command = Command::new(&self.python);
        command
            .args(&args)
            .env("PYTHONUSERBASE", location)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        if let Some(dir) = requirements.parent().filter(|d| !d.as_os_str().is_empty()) {
            command.current_dir(dir);
        }

        let mut child = command
            .spawn()
            .map_err(|e| PipLayersError::command_failed(command_line.clone(), e))?;

        let output = stream_child_output(&mut child, &ui::step_info).await;

        let status = child
            .wait()
            .await
            .map_err(|e| PipLayersError::command_failed(command_line.clone(), e))?;

        if status.success() {
            Ok(())
        } else {
            Err(PipLayersError::installer(command_line, error_tail(&output)))
        }
    }
}

impl Default for PipInstaller {
    fn default() -> Self {
        Self::new("python")
    }
}

#[async_trait]
impl PackageInstaller for PipInstaller {
    async fn install(
        &self,
        requirements: &Path,
        location: &Path,
        cache_dir: &Path,
    ) -> PipLayersResult<()> {
        let args = self.install_args(requirements, cache_dir);
        self.run(args, requirements, location).await
    }

    async fn install_vendor(
        &self,
        requirements: &Path,
        location: &Path,
        vendor_dir: &Path,
    ) -> PipLayersResult<()> {
        let args = self.vendor_args(requirements, vendor_dir);
        self.run(args, requirements, location).await
    }
}

fn flag(prefix: &str, path: &Path) -> OsString {
    let mut arg = OsString::from(prefix);
    arg.push(path.as_os_str());
    arg
}
