use anyhow::{Result, bail};

/// Split a `KEY=VALUE` argument, both sides must be non-empty
pub fn parse_key_value(arg: &str, flag: &str) -> Result<(String, String)> {
    match arg.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() && !value.trim().is_empty() => {
            Ok((key.trim().to_string(), value.trim().to_string()))
        }
        _ => bail!("Invalid value '{arg}' for --{flag}, expected KEY=VALUE"),
    }
}

/// Workspace-relative path argument with any trailing `/` removed. Paths
/// leaving the workspace are rejected.
pub fn normalize_path_arg(path: &str) -> Result<String> {
    if path.starts_with("..") {
        bail!("Path must be within the workspace: {path}");
    }
    if path.starts_with('/') {
        bail!("Path must be relative to the workspace root: {path}");
    }
    Ok(path.trim_end_matches('/').to_string())
}
