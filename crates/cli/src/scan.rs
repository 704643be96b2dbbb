use std::io;
use std::path::Path;
use std::process::Command;

use tempfile::NamedTempFile;

/// Run `ncdu -e -x -o <tmp> [--exclude PATTERN] <dir>` and hand back the
/// temp file holding the export. The file is deleted on drop, so the caller
/// must keep it alive until the load is done.
pub fn run_ncdu(dir: &Path, exclude: Option<&str>) -> io::Result<NamedTempFile> {
    if !dir.is_dir() {
        return Err(io::Error::other(format!(
            "{} is not a directory, or is not readable",
            dir.display()
        )));
    }

    let output = tempfile::Builder::new()
        .prefix("ncdu_")
        .suffix(".json")
        .tempfile()?;

    let mut cmd = Command::new("ncdu");
    cmd.arg("-e").arg("-x").arg("-o").arg(output.path());
    if let Some(pattern) = exclude {
        cmd.arg("--exclude").arg(pattern);
    }
    cmd.arg(dir);

    tracing::info!("scanning {} with ncdu", dir.display());
    let status = cmd.status()?;
    if !status.success() {
        return Err(io::Error::other(format!("ncdu exited with {status}")));
    }
    tracing::info!("scan of {} finished", dir.display());
    Ok(output)
}
