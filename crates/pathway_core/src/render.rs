//! Plain-text rendering of a learning list.
//!
//! Groups catalog words by (step, level) under a rank-range header and lists
//! special words at the end. Callers decide where the text goes (clipboard,
//! stdout, a message); this module only formats.

use crate::rank::StepLevel;
use crate::views::LearningEntry;

/// Render a student's learning list for sharing.
///
/// ```text
/// Currently Learning — Amir
///
/// Step 3 - Level 2 (Ranks 221–240):
/// river, mountain
///
/// Special Words:
/// petrichor
/// ```
pub fn render_learning_list(student: &str, entries: &[LearningEntry]) -> String {
    if entries.is_empty() {
        return format!("No learning words found for {}.", student);
    }

    let mut lines = vec![format!("Currently Learning — {}", student)];

    let mut current_bucket: Option<StepLevel> = None;
    let mut bucket_words: Vec<&str> = Vec::new();
    let mut special_words: Vec<&str> = Vec::new();

    let flush = |bucket: Option<StepLevel>, words: &mut Vec<&str>, lines: &mut Vec<String>| {
        if let Some(sl) = bucket {
            if !words.is_empty() {
                lines.push(String::new());
                lines.push(format!(
                    "Step {} - Level {} (Ranks {}–{}):",
                    sl.step,
                    sl.level,
                    sl.first_rank(),
                    sl.last_rank()
                ));
                lines.push(words.join(", "));
                words.clear();
            }
        }
    };

    for entry in entries {
        match (entry.step, entry.level) {
            (Some(step), Some(level)) => {
                let bucket = StepLevel { step, level };
                if current_bucket != Some(bucket) {
                    flush(current_bucket, &mut bucket_words, &mut lines);
                    current_bucket = Some(bucket);
                }
                bucket_words.push(&entry.word);
            }
            _ => special_words.push(&entry.word),
        }
    }
    flush(current_bucket, &mut bucket_words, &mut lines);

    if !special_words.is_empty() {
        lines.push(String::new());
        lines.push("Special Words:".to_string());
        lines.push(special_words.join(", "));
    }

    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::student_words::WordStatus;

    fn entry(word: &str, bucket: Option<(u32, u32)>) -> LearningEntry {
        LearningEntry {
            id: 0,
            word: word.to_string(),
            step: bucket.map(|(s, _)| s),
            level: bucket.map(|(_, l)| l),
            status: WordStatus::Learning,
            special: bucket.is_none(),
        }
    }

    #[test]
    fn test_empty_list() {
        assert_eq!(
            render_learning_list("Amir", &[]),
            "No learning words found for Amir."
        );
    }

    #[test]
    fn test_grouped_output() {
        let entries = vec![
            entry("cat", Some((1, 1))),
            entry("dog", Some((1, 1))),
            entry("river", Some((3, 2))),
            entry("petrichor", None),
        ];
        let out = render_learning_list("Amir", &entries);
        assert_eq!(
            out,
            "Currently Learning — Amir\n\
             \n\
             Step 1 - Level 1 (Ranks 1–20):\n\
             cat, dog\n\
             \n\
             Step 3 - Level 2 (Ranks 221–240):\n\
             river\n\
             \n\
             Special Words:\n\
             petrichor"
        );
    }

    #[test]
    fn test_specials_only() {
        let entries = vec![entry("petrichor", None)];
        let out = render_learning_list("Yumi", &entries);
        assert!(out.starts_with("Currently Learning — Yumi"));
        assert!(out.contains("Special Words:\npetrichor"));
        assert!(!out.contains("Step"));
    }
}
