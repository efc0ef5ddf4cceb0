use std::{io::Write, path::Path, time::Duration};

use tempfile::NamedTempFile;

use crate::{Params, Result};

use super::{show, Context};

/// `ping` sends 5 echo requests a second apart, which outlasts the usual timeout
const PING_EXTRA_TIME: Duration = Duration::from_secs(6);

pub(super) async fn ping(ctx: &Context, params: &Params) -> Result<String> {
    let target = params.require("target")?;
    let client = ctx
        .client
        .clone()
        .with_timeout(ctx.config.timeout() + PING_EXTRA_TIME);
    Ok(client
        .execute(&format!("ping {} repeat 5", target))
        .await
        .text)
}

/// `write memory`: saves the regenerated configuration script to the
/// export path
pub(super) async fn write_memory(ctx: &Context, _params: &Params) -> Result<String> {
    let config = show::running_config(ctx).await?;
    let content = config.render_export(&chrono::Local::now());
    save(&ctx.config.export_path, &content)?;
    log::info!("cmd: configuration saved to {}", ctx.config.export_path.display());
    Ok("Building configuration...\n[OK]\n".into())
}

/// Writes `content` to a fresh temp file next to `path` and renames it
/// into place
fn save(path: &Path, content: &str) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    std::fs::create_dir_all(dir)?;
    let mut file = NamedTempFile::new_in(dir)?;
    file.write_all(content.as_bytes())?;
    file.persist(path).map_err(|err| err.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_replaces_symlink() {
        let dir = tempfile::TempDir::new().unwrap();
        let victim = dir.path().join("victim");
        std::fs::write(&victim, "precious").unwrap();
        let path = dir.path().join("startup.conf");
        std::os::unix::fs::symlink(&victim, &path).unwrap();

        save(&path, "end\n").unwrap();
        assert_eq!(std::fs::read_to_string(&victim).unwrap(), "precious");
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "end\n");
        // nothing else left behind
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[test]
    fn test_save_creates_parent() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("etc").join("vpp").join("startup.conf");
        save(&path, "end\n").unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "end\n");
    }
}
