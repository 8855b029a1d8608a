use std::path::{Path, PathBuf};

/// Name of the transcripts file inside a book folder
pub const TRANSCRIPTS_FILE: &str = "transcripts.txt";

/// Name of the output file written beside it
pub const OUTPUT_FILE: &str = "output.txt";

/// One `<root>/<speaker>/<book>/transcripts.txt` batch
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BookJob {
    pub speaker: String,
    pub book_id: String,
    pub transcripts: PathBuf,
    pub output: PathBuf,
}

/// Find every book folder holding a transcripts file, sorted by path.
///
/// # Errors
///
/// Returns the IO error if `root` or a speaker folder cannot be listed.
pub fn discover_folder(root: &Path) -> Result<Vec<BookJob>, std::io::Error> {
    let mut jobs = Vec::new();

    for speaker in sorted_subdirs(root)? {
        for book in sorted_subdirs(&speaker)? {
            let transcripts = book.join(TRANSCRIPTS_FILE);
            if !transcripts.is_file() {
                continue;
            }
            let (Some(speaker_name), Some(book_id)) = (dir_name(&speaker), dir_name(&book)) else {
                continue;
            };
            jobs.push(BookJob {
                speaker: speaker_name,
                book_id,
                output: book.join(OUTPUT_FILE),
                transcripts,
            });
        }
    }

    Ok(jobs)
}

fn sorted_subdirs(dir: &Path) -> Result<Vec<PathBuf>, std::io::Error> {
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.is_dir() {
            dirs.push(path);
        }
    }
    dirs.sort();
    Ok(dirs)
}

fn dir_name(path: &Path) -> Option<String> {
    path.file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_discover_folder() {
        let root = tempfile::tempdir().unwrap();
        for (speaker, book, with_transcripts) in [
            ("bob", "200", true),
            ("alice", "100", true),
            ("alice", "101", false),
        ] {
            let dir = root.path().join(speaker).join(book);
            std::fs::create_dir_all(&dir).unwrap();
            if with_transcripts {
                std::fs::write(dir.join(TRANSCRIPTS_FILE), "alice_100_1\tola\n").unwrap();
            }
        }
        std::fs::write(root.path().join("notes.txt"), "ignored").unwrap();

        let jobs = discover_folder(root.path()).unwrap();
        assert_eq!(jobs.len(), 2);
        assert_eq!(jobs[0].speaker, "alice");
        assert_eq!(jobs[0].book_id, "100");
        assert_eq!(jobs[0].output, root.path().join("alice/100/output.txt"));
        assert_eq!(jobs[1].book_id, "200");
    }

    #[test]
    fn test_discover_missing_root() {
        assert!(discover_folder(Path::new("/nonexistent/phrase-aligner-root")).is_err());
    }
}
