use std::path::{Path, PathBuf};

use async_trait::async_trait;
use path_absolutize::Absolutize;
use tracing::debug;

use crate::error::BridgeError;

/// Extensions probed when a request omits one, and for `index.*` directory
/// resolution.
static EXTENSIONS: &[&str] = &["js", "mjs", "ts", "json", "css", "scss"];

/// Resolution engine contract: turn a request string into an absolute file
/// path, starting from `base_dir` and optionally searching `search_paths`
/// instead.
#[async_trait]
pub trait ResolveEngine: Send + Sync {
    async fn resolve(
        &self,
        base_dir: &Path,
        request: &str,
        search_paths: &[PathBuf],
    ) -> Result<PathBuf, BridgeError>;
}

/// Filesystem-backed engine implementing the usual conventions: exact file,
/// extension probing, `index.*` directories, then each search path in turn.
#[derive(Debug, Default)]
pub struct FsResolver;

impl FsResolver {
    async fn probe(&self, candidate: &Path) -> Option<PathBuf> {
        let candidate = absolutize(candidate);

        if is_file(&candidate).await {
            return Some(candidate);
        }

        if candidate.extension().is_none() {
            for ext in EXTENSIONS {
                let path = candidate.with_extension(ext);
                if is_file(&path).await {
                    return Some(path);
                }
            }
        }

        if is_dir(&candidate).await {
            for ext in EXTENSIONS {
                let path = candidate.join(format!("index.{ext}"));
                if is_file(&path).await {
                    return Some(path);
                }
            }
        }

        None
    }
}

#[async_trait]
impl ResolveEngine for FsResolver {
    async fn resolve(
        &self,
        base_dir: &Path,
        request: &str,
        search_paths: &[PathBuf],
    ) -> Result<PathBuf, BridgeError> {
        if search_paths.is_empty() {
            if let Some(found) = self.probe(&base_dir.join(request)).await {
                return Ok(found);
            }
        } else {
            for root in search_paths {
                if let Some(found) = self.probe(&root.join(request)).await {
                    return Ok(found);
                }
            }
        }

        Err(BridgeError::Resolution {
            request: request.to_string(),
            dir: base_dir.to_path_buf(),
        })
    }
}

/// Decides how a request should be resolved and runs it through the engine.
///
/// Relative requests resolve against the requesting directory only; bare
/// specifiers go through the configured search paths when any are set, and
/// fall back to plain relative resolution otherwise.
pub async fn resolve_request(
    engine: &dyn ResolveEngine,
    request: &str,
    resolve_dir: &Path,
    search_paths: &[PathBuf],
) -> Result<PathBuf, BridgeError> {
    if request.contains('!') {
        return Err(BridgeError::Unsupported(format!(
            "cannot load '{request}': inline loaders are not supported"
        )));
    }

    let relative = request.starts_with("./") || request.starts_with("../");
    if relative || search_paths.is_empty() {
        debug!("resolving '{request}' against {}", resolve_dir.display());
        return engine.resolve(resolve_dir, request, &[]).await;
    }

    debug!("resolving '{request}' through {} search paths", search_paths.len());
    engine.resolve(resolve_dir, request, search_paths).await
}

fn absolutize(path: &Path) -> PathBuf {
    path.absolutize()
        .map(|p| p.into_owned())
        .unwrap_or_else(|_| path.to_path_buf())
}

async fn is_file(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_file())
        .unwrap_or(false)
}

async fn is_dir(path: &Path) -> bool {
    tokio::fs::metadata(path)
        .await
        .map(|m| m.is_dir())
        .unwrap_or(false)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::sync::Mutex;

    fn fixture() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.js"), "x=1").unwrap();
        fs::create_dir_all(dir.path().join("pkg")).unwrap();
        fs::write(dir.path().join("pkg/index.ts"), "export {}").unwrap();
        fs::create_dir_all(dir.path().join("shared")).unwrap();
        fs::write(dir.path().join("shared/util.js"), "u").unwrap();
        dir
    }

    #[tokio::test]
    async fn exact_file_resolves() {
        let dir = fixture();
        let found = FsResolver
            .resolve(dir.path(), "./a.js", &[])
            .await
            .unwrap();
        assert_eq!(found, dir.path().join("a.js"));
    }

    #[tokio::test]
    async fn missing_extension_is_probed() {
        let dir = fixture();
        let found = FsResolver.resolve(dir.path(), "./a", &[]).await.unwrap();
        assert_eq!(found, dir.path().join("a.js"));
    }

    #[tokio::test]
    async fn directory_resolves_through_index_convention() {
        let dir = fixture();
        let found = FsResolver.resolve(dir.path(), "./pkg", &[]).await.unwrap();
        assert_eq!(found, dir.path().join("pkg/index.ts"));
    }

    #[tokio::test]
    async fn parent_traversal_is_normalized() {
        let dir = fixture();
        let found = FsResolver
            .resolve(&dir.path().join("pkg"), "../a.js", &[])
            .await
            .unwrap();
        assert_eq!(found, dir.path().join("a.js"));
    }

    #[tokio::test]
    async fn search_paths_are_consulted_in_order() {
        let dir = fixture();
        let empty = dir.path().join("pkg");
        let found = FsResolver
            .resolve(
                dir.path(),
                "util",
                &[empty, dir.path().join("shared")],
            )
            .await
            .unwrap();
        assert_eq!(found, dir.path().join("shared/util.js"));
    }

    #[tokio::test]
    async fn unresolved_request_names_the_searched_directory() {
        let dir = fixture();
        let err = FsResolver
            .resolve(dir.path(), "./nope.js", &[])
            .await
            .unwrap_err();
        match err {
            BridgeError::Resolution { request, dir: searched } => {
                assert_eq!(request, "./nope.js");
                assert_eq!(searched, dir.path());
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    /// Records the search paths each call received.
    struct RecordingEngine {
        calls: Mutex<Vec<Vec<PathBuf>>>,
    }

    #[async_trait]
    impl ResolveEngine for RecordingEngine {
        async fn resolve(
            &self,
            _base_dir: &Path,
            request: &str,
            search_paths: &[PathBuf],
        ) -> Result<PathBuf, BridgeError> {
            self.calls.lock().unwrap().push(search_paths.to_vec());
            Ok(PathBuf::from(format!("/resolved/{request}")))
        }
    }

    #[tokio::test]
    async fn relative_requests_never_consult_search_paths() {
        let engine = RecordingEngine {
            calls: Mutex::new(Vec::new()),
        };
        let configured = vec![PathBuf::from("/modules")];

        resolve_request(&engine, "./x", Path::new("/src"), &configured)
            .await
            .unwrap();
        resolve_request(&engine, "../x", Path::new("/src"), &configured)
            .await
            .unwrap();
        resolve_request(&engine, "bare", Path::new("/src"), &configured)
            .await
            .unwrap();

        let calls = engine.calls.lock().unwrap();
        assert_eq!(*calls, vec![vec![], vec![], configured.clone()]);
    }

    #[tokio::test]
    async fn bare_specifier_without_search_paths_acts_like_relative() {
        let dir = fixture();
        let found = resolve_request(&FsResolver, "a.js", dir.path(), &[])
            .await
            .unwrap();
        assert_eq!(found, dir.path().join("a.js"));
    }

    #[tokio::test]
    async fn inline_loader_syntax_is_rejected() {
        let engine = RecordingEngine {
            calls: Mutex::new(Vec::new()),
        };
        let err = resolve_request(&engine, "raw!./a.js", Path::new("/src"), &[])
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Unsupported(_)));
        assert!(engine.calls.lock().unwrap().is_empty());
    }
}
