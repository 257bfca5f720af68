//! Build-from-source mode: clone, check out, run the build, pick a jar.

use std::path::{Path, PathBuf};

use mcmm_core::ProviderError;
use mcmm_core::providers::NameFilter;
use serde::{Deserialize, Serialize};
use tokio::process::Command;
use tracing::{debug, info, warn};

/// How to build a jar from a repository.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct CompileSpec {
    /// Branch (or any ref) to check out after cloning.
    pub branch: String,
    /// Program and arguments, run from the repository root without a shell.
    pub command: Vec<String>,
    /// Directory, relative to the repository root, holding the built jars.
    pub dir: String,
    /// Applied to jar file names in `dir`.
    #[serde(flatten)]
    pub filter: NameFilter,
}

/// Clone `url` into the cache, build it and move the selected jar next to
/// the checkout. The checkout is removed afterwards.
pub(crate) async fn build(
    url: &str,
    repo: &str,
    spec: &CompileSpec,
    cache_dir: &Path,
) -> Result<PathBuf, ProviderError> {
    let (program, args) = spec
        .command
        .split_first()
        .ok_or_else(|| ProviderError::invalid_metadata("'compile.command' is empty"))?;

    // Deterministic so a previous failed build is replaced, not accumulated.
    let checkout = cache_dir.join(format!("{}-build", repo.replace('/', "-")));
    remove_checkout(&checkout);

    let result = async {
        run(
            Command::new("git").arg("clone").arg(url).arg(&checkout),
            "git clone",
        )
        .await?;
        run(
            Command::new("git")
                .arg("checkout")
                .arg(&spec.branch)
                .current_dir(&checkout),
            "git checkout",
        )
        .await?;
        info!(repo, command = ?spec.command, "Building mod from source");
        run(
            Command::new(program).args(args).current_dir(&checkout),
            program,
        )
        .await?;

        let jar = select_jar(&checkout.join(&spec.dir), &spec.filter)?;
        let file_name = jar
            .file_name()
            .ok_or_else(|| ProviderError::failed("built jar has no file name"))?;
        let out_file = cache_dir.join(file_name);
        std::fs::rename(&jar, &out_file)?;
        Ok(out_file)
    }
    .await;

    remove_checkout(&checkout);
    result
}

async fn run(command: &mut Command, what: &str) -> Result<(), ProviderError> {
    debug!(?command, "Running");
    let status = command
        .status()
        .await
        .map_err(|e| ProviderError::failed(format!("Failed to run {what}: {e}")))?;
    if !status.success() {
        return Err(ProviderError::failed(format!("{what} exited with {status}")));
    }
    Ok(())
}

/// First `*.jar` in `dir`, by file name, that passes `filter`.
fn select_jar(dir: &Path, filter: &NameFilter) -> Result<PathBuf, ProviderError> {
    let mut jars: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.extension().is_some_and(|ext| ext == "jar"))
        .filter(|path| {
            path.file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|name| filter.matches(name))
        })
        .collect();
    jars.sort();
    jars.into_iter().next().ok_or_else(|| {
        ProviderError::no_matching_artifact(format!("no matching jar in {}", dir.display()))
    })
}

fn remove_checkout(checkout: &Path) {
    if checkout.exists()
        && let Err(e) = std::fs::remove_dir_all(checkout)
    {
        warn!(path = %checkout.display(), error = %e, "Could not remove build checkout");
    }
}
