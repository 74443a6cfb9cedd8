use anyhow::Context;
use globset::{GlobBuilder, GlobMatcher};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Expand `--file` arguments into concrete input files.
///
/// Directories are walked recursively in file-name order; everything else is
/// passed through untouched so the loader can report missing paths itself.
pub fn resolve_paths(inputs: &[PathBuf], file_glob: Option<&str>) -> anyhow::Result<Vec<PathBuf>> {
    let matcher = match file_glob {
        Some(g) => Some(compile_glob(g)?),
        None => None,
    };
    let mut out: Vec<PathBuf> = Vec::new();
    for p in inputs {
        if p.is_dir() {
            let before = out.len();
            out.extend(walk_dir(p, matcher.as_ref()));
            log::debug!("{}: {} file(s) selected", p.to_string_lossy(), out.len() - before);
        } else {
            out.push(p.clone());
        }
    }
    Ok(out)
}

fn compile_glob(pattern: &str) -> anyhow::Result<GlobMatcher> {
    let glob = GlobBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .with_context(|| format!("invalid --glob pattern {:?}", pattern))?;
    Ok(glob.compile_matcher())
}

fn walk_dir(root: &Path, matcher: Option<&GlobMatcher>) -> Vec<PathBuf> {
    let mut files = Vec::new();
    for de in WalkDir::new(root).follow_links(false).sort_by_file_name().into_iter() {
        let de = match de {
            Ok(d) => d,
            Err(e) => { log::warn!("Skipping unreadable entry under {}: {}", root.to_string_lossy(), e); continue }
        };
        if !de.file_type().is_file() { continue; }
        if let Some(m) = matcher {
            if !m.is_match(de.file_name()) { continue; }
        }
        files.push(de.into_path());
    }
    files
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_is_expanded_sorted_and_globbed() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.log"), "").unwrap();
        std::fs::write(dir.path().join("a.LOG"), "").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "").unwrap();
        std::fs::create_dir(dir.path().join("sub")).unwrap();
        std::fs::write(dir.path().join("sub").join("c.log"), "").unwrap();

        let files = resolve_paths(&[dir.path().to_path_buf()], Some("*.log")).unwrap();
        let names: Vec<String> = files.iter().map(|p| p.file_name().unwrap().to_string_lossy().into_owned()).collect();
        assert_eq!(names, vec!["a.LOG", "b.log", "c.log"]);

        let all = resolve_paths(&[dir.path().to_path_buf()], None).unwrap();
        assert_eq!(all.len(), 4);
    }

    #[test]
    fn plain_and_missing_paths_pass_through_in_order() {
        let inputs = vec![PathBuf::from("missing-2.log"), PathBuf::from("missing-1.log")];
        assert_eq!(resolve_paths(&inputs, None).unwrap(), inputs);
    }

    #[test]
    fn bad_glob_is_an_error() {
        let err = resolve_paths(&[], Some("[unclosed")).unwrap_err();
        assert!(format!("{:#}", err).contains("invalid --glob pattern"));
    }
}
