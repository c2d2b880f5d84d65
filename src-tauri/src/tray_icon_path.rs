use std::path::{Path, PathBuf};

const ICON_FILE: &str = "icon.png";
const SYSTEM_ICON_PATH: &str = "/usr/share/pixmaps/polywhale.png";

/// Ordered icon locations: packaged resources, unpacked resources, local build output, system.
pub fn icon_candidates(resource_dir: Option<&Path>, manifest_dir: &Path) -> Vec<PathBuf> {
    let mut candidates = Vec::with_capacity(4);
    if let Some(resource_dir) = resource_dir {
        candidates.push(resource_dir.join(ICON_FILE));
        candidates.push(resource_dir.join("icons").join(ICON_FILE));
    }
    candidates.push(manifest_dir.join("icons").join(ICON_FILE));
    candidates.push(PathBuf::from(SYSTEM_ICON_PATH));
    candidates
}

pub fn first_existing_path(candidates: &[PathBuf]) -> Option<&Path> {
    candidates
        .iter()
        .map(PathBuf::as_path)
        .find(|path| path.is_file())
}

#[cfg(test)]
mod tests {
    use std::fs;

    use super::*;

    #[test]
    fn icon_candidates_are_ordered_packaged_first() {
        let candidates = icon_candidates(Some(Path::new("/opt/pw/res")), Path::new("/src/pw"));
        assert_eq!(
            candidates,
            vec![
                PathBuf::from("/opt/pw/res/icon.png"),
                PathBuf::from("/opt/pw/res/icons/icon.png"),
                PathBuf::from("/src/pw/icons/icon.png"),
                PathBuf::from(SYSTEM_ICON_PATH),
            ]
        );
    }

    #[test]
    fn icon_candidates_skip_resource_paths_when_unavailable() {
        let candidates = icon_candidates(None, Path::new("/src/pw"));
        assert_eq!(candidates[0], PathBuf::from("/src/pw/icons/icon.png"));
        assert_eq!(candidates.len(), 2);
    }

    #[test]
    fn first_existing_path_picks_earliest_present_file() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let unpacked = temp.path().join("icons").join(ICON_FILE);
        fs::create_dir_all(unpacked.parent().expect("parent")).expect("create icons dir");
        fs::write(&unpacked, b"png").expect("write icon");
        let build_output = temp.path().join("build.png");
        fs::write(&build_output, b"png").expect("write icon");

        let candidates = vec![
            temp.path().join(ICON_FILE),
            unpacked.clone(),
            build_output,
        ];
        assert_eq!(first_existing_path(&candidates), Some(unpacked.as_path()));
    }

    #[test]
    fn first_existing_path_returns_none_when_nothing_exists() {
        let temp = tempfile::tempdir().expect("create temp dir");
        let candidates = vec![temp.path().join("a.png"), temp.path().join("b.png")];
        assert_eq!(first_existing_path(&candidates), None);
    }
}
