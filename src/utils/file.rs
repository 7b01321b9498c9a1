use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use log::debug;
use crate::utils::utils::generate_random_suffix;

pub const SUPPORTED_EXTENSIONS: &[&str] = &["doc", "docx"];
pub const TARGET_EXTENSION: &str = "pdf";

/// 檔名以 .doc 或 .docx 結尾（不分大小寫），單獨名為 .docx 的檔案也算
pub fn is_supported_document(path: &Path) -> bool {
    let name = match path.file_name() {
        Some(name) => name.to_string_lossy().to_lowercase(),
        None => return false,
    };
    SUPPORTED_EXTENSIONS
        .iter()
        .any(|ext| name.ends_with(&format!(".{}", ext)))
}

/// 同目錄、同檔名，副檔名換成 .pdf
pub fn derive_output_path(input_path: &Path) -> PathBuf {
    input_path.with_extension(TARGET_EXTENSION)
}

/// 目標所在目錄必須存在且可寫入；沒有目錄部分時檢查目前工作目錄
pub fn is_writable_destination(path: &Path) -> bool {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent.to_path_buf(),
        _ => match std::env::current_dir() {
            Ok(cwd) => cwd,
            Err(_) => return false,
        },
    };
    if !dir.is_dir() {
        debug!("輸出目錄不存在：{}", dir.display());
        return false;
    }
    // 以實際建立探測檔判斷權限，唯讀屬性在部分平台上不可靠
    match tempfile::Builder::new().prefix(".write_check").tempfile_in(&dir) {
        Ok(_) => true,
        Err(e) => {
            debug!("輸出目錄不可寫入：{}，{}", dir.display(), e);
            false
        }
    }
}

pub fn create_scratch_dir() -> io::Result<PathBuf> {
    create_scratch_dir_in(&std::env::current_dir()?)
}

pub fn create_scratch_dir_in(root: &Path) -> io::Result<PathBuf> {
    let scratch = root.join(format!("temp_{}", generate_random_suffix(32)));
    fs::create_dir_all(&scratch)?;
    debug!("建立暫存目錄：{}", scratch.display());
    Ok(scratch)
}

/// 路徑不存在時不做任何事
pub fn remove_scratch_dir(path: &Path) -> io::Result<()> {
    match fs::remove_dir_all(path) {
        Ok(()) => {
            debug!("已清理暫存目錄：{}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

pub fn file_name_of(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn recognises_word_extensions_in_any_case() {
        assert!(is_supported_document(Path::new("report.docx")));
        assert!(is_supported_document(Path::new("legacy.DOC")));
        assert!(is_supported_document(Path::new("dir/Mixed.DocX")));
        assert!(!is_supported_document(Path::new("report.pdf")));
        assert!(!is_supported_document(Path::new("report.docx.bak")));
        assert!(!is_supported_document(Path::new("docx")));
        assert!(!is_supported_document(Path::new("")));
    }

    #[test]
    fn bare_extension_names_are_documents() {
        assert!(is_supported_document(Path::new(".docx")));
        assert!(is_supported_document(Path::new("inbox/.DOC")));
        assert!(!is_supported_document(Path::new("inbox/.pdf")));
        assert!(!is_supported_document(Path::new("inbox/")));
    }

    #[test]
    fn output_path_keeps_directory_and_stem() {
        assert_eq!(derive_output_path(Path::new("docs/report.docx")), PathBuf::from("docs/report.pdf"));
        assert_eq!(derive_output_path(Path::new("/abs/q1.v2.DOC")), PathBuf::from("/abs/q1.v2.pdf"));
        assert_eq!(derive_output_path(Path::new("plain.doc")), PathBuf::from("plain.pdf"));
    }

    #[test]
    fn writable_destination_requires_existing_directory() {
        let dir = tempfile::tempdir().unwrap();
        assert!(is_writable_destination(&dir.path().join("out.pdf")));
        assert!(!is_writable_destination(&dir.path().join("missing").join("out.pdf")));

        let file = dir.path().join("not_a_dir");
        fs::write(&file, b"x").unwrap();
        assert!(!is_writable_destination(&file.join("out.pdf")));
    }

    #[test]
    fn bare_file_name_checks_working_directory() {
        assert!(is_writable_destination(Path::new("out.pdf")));
    }

    #[cfg(unix)]
    #[test]
    fn read_only_directory_is_not_writable() {
        use std::os::unix::fs::PermissionsExt;
        // root 不受權限位元限制
        if unsafe { libc::geteuid() } == 0 {
            return;
        }
        let dir = tempfile::tempdir().unwrap();
        let locked = dir.path().join("locked");
        fs::create_dir(&locked).unwrap();
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o555)).unwrap();

        let writable = is_writable_destination(&locked.join("out.pdf"));

        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).unwrap();
        assert!(!writable);
        assert_eq!(fs::read_dir(&locked).unwrap().count(), 0);
    }

    #[test]
    fn write_check_leaves_no_file() {
        let dir = tempfile::tempdir().unwrap();
        assert!(is_writable_destination(&dir.path().join("out.pdf")));
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 0);
    }

    #[test]
    fn scratch_dir_lifecycle() {
        let root = tempfile::tempdir().unwrap();
        let scratch = create_scratch_dir_in(root.path()).unwrap();
        assert!(scratch.is_dir());
        assert!(scratch.file_name().unwrap().to_string_lossy().starts_with("temp_"));
        fs::write(scratch.join("intermediate.pdf"), b"%PDF").unwrap();

        remove_scratch_dir(&scratch).unwrap();
        assert!(!scratch.exists());
        remove_scratch_dir(&scratch).unwrap();
    }

    #[test]
    fn default_scratch_dir_lives_in_working_directory() {
        let scratch = create_scratch_dir().unwrap();
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(scratch.parent(), Some(cwd.as_path()));
        let name = scratch.file_name().unwrap().to_string_lossy().to_string();
        assert_eq!(name.len(), "temp_".len() + 32);
        assert!(scratch.is_dir());

        remove_scratch_dir(&scratch).unwrap();
        assert!(!scratch.exists());
    }

    #[test]
    fn scratch_dirs_are_unique() {
        let root = tempfile::tempdir().unwrap();
        let a = create_scratch_dir_in(root.path()).unwrap();
        let b = create_scratch_dir_in(root.path()).unwrap();
        assert_ne!(a, b);
    }
}
