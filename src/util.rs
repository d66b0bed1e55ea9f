use std::fs::{self, ReadDir};
use std::io;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

pub fn read_file(path: &Path) -> io::Result<String> {
    fs::read_to_string(path)
}

// Regular files from a directory listing whose extension is exactly `md`,
// sorted by file name so that loads are deterministic.
pub fn markdown_files(entries: ReadDir) -> io::Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for result in entries {
        let entry = result?;
        let path = entry.path();
        if entry.file_type()?.is_file()
            && path.extension().and_then(|e| e.to_str()) == Some(crate::parser::MARKDOWN_EXTENSION)
        {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

// Recursively copies the contents of `src` into `dst`, creating directories
// as needed.
pub fn copy_dir(src: &Path, dst: &Path) -> io::Result<()> {
    for result in WalkDir::new(src) {
        let entry = result?;
        // strip_prefix can't fail since every entry lives under `src`
        let relative = entry.path().strip_prefix(src).unwrap_or(entry.path());
        let target = dst.join(relative);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}
