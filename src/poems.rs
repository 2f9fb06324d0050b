//! Poems are plain markdown files; the first `# ` heading is the title.

use std::path::Path;

use crate::error::Result;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Poem {
    pub id: usize,
    pub title: String,
    pub text: String,
}

pub fn parse_poem(id: usize, raw: &str) -> Poem {
    let heading = raw.lines().enumerate().find_map(|(i, line)| {
        let rest = line.strip_prefix('#')?;
        let title = rest.strip_prefix(|c: char| c.is_whitespace())?.trim();
        Some((i, title.to_string()))
    });
    match heading {
        Some((at, title)) => {
            let text: Vec<&str> = raw
                .lines()
                .enumerate()
                .filter(|(i, _)| *i != at)
                .map(|(_, line)| line)
                .collect();
            Poem {
                id,
                title,
                text: text.join("\n").trim().to_string(),
            }
        }
        None => Poem {
            id,
            title: "Untitled".into(),
            text: raw.trim().to_string(),
        },
    }
}

/// Loads every `*.md` in `dir`, ordered by file name. A missing directory
/// is just an empty collection.
pub fn load_poems(dir: &Path) -> Result<Vec<Poem>> {
    let entries = match std::fs::read_dir(dir) {
        Ok(e) => e,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::debug!(dir = %dir.display(), "no poems directory");
            return Ok(Vec::new());
        }
        Err(e) => return Err(e.into()),
    };

    let mut paths: Vec<_> = entries
        .filter_map(|e| e.ok())
        .map(|e| e.path())
        .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "md"))
        .collect();
    paths.sort();

    let mut poems = Vec::with_capacity(paths.len());
    for path in paths {
        match std::fs::read_to_string(&path) {
            Ok(raw) => poems.push(parse_poem(poems.len() + 1, &raw)),
            Err(e) => tracing::warn!(path = %path.display(), error = %e, "skipping unreadable poem"),
        }
    }
    tracing::info!(count = poems.len(), "poems loaded");
    Ok(poems)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn heading_becomes_title() {
        let poem = parse_poem(3, "# Evening\n\nThe light goes soft\nand so do I.\n");
        assert_eq!(poem.id, 3);
        assert_eq!(poem.title, "Evening");
        assert_eq!(poem.text, "The light goes soft\nand so do I.");
    }

    #[test]
    fn heading_may_follow_other_lines() {
        let poem = parse_poem(1, "for you\n#   Late Bloom  \nstill here");
        assert_eq!(poem.title, "Late Bloom");
        assert_eq!(poem.text, "for you\nstill here");
    }

    #[test]
    fn subheadings_and_tags_are_not_titles() {
        let poem = parse_poem(1, "## Part one\n#hashtag\nwords");
        assert_eq!(poem.title, "Untitled");
        assert_eq!(poem.text, "## Part one\n#hashtag\nwords");
    }

    #[test]
    fn loads_markdown_sorted_by_name() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("b.md"), "# Second\ntwo").unwrap();
        std::fs::write(dir.path().join("a.md"), "# First\none").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "# Ignored").unwrap();

        let poems = load_poems(dir.path()).unwrap();
        let titles: Vec<_> = poems.iter().map(|p| (p.id, p.title.as_str())).collect();
        assert_eq!(titles, [(1, "First"), (2, "Second")]);
    }

    #[test]
    fn missing_directory_is_empty() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_poems(&dir.path().join("nope")).unwrap().is_empty());
    }
}
