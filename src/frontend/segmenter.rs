use std::borrow::Cow;
use std::collections::HashSet;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::thread;

use super::error::FrontendError;

/// Joins the syllables of one orthographic word.
pub const WORD_JOINER: char = '_';

/// Splits normalized text into orthographic words by inserting explicit
/// boundary markers.
///
/// Segmentation is best effort: callers treat any error as "leave the text
/// unsegmented".
pub trait Segmenter: Send + Sync {
    fn segment(&self, text: &str) -> Result<String, FrontendError>;
}

/// Dictionary-driven maximal-matching segmenter.
///
/// Input is split on whitespace into syllables. At each position the longest
/// run of syllables that forms a lexicon word (up to `max_word_syllables`) is
/// joined with [`WORD_JOINER`]; syllables that start no known word pass
/// through alone. Whitespace between words is kept as written. Matching is
/// case-insensitive.
#[derive(Debug, Clone, Default)]
pub struct LexiconSegmenter {
    words: HashSet<String>,
    max_word_syllables: usize,
}

impl LexiconSegmenter {
    pub fn new<I, S>(words: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut lexicon = Self::default();
        for word in words {
            lexicon.insert(word.as_ref());
        }
        lexicon
    }

    /// Load a lexicon with one word per line. Blank lines and lines starting
    /// with `#` are skipped.
    pub fn load(path: &Path) -> Result<Self, FrontendError> {
        let content = std::fs::read_to_string(path)?;
        let lexicon = Self::new(
            content
                .lines()
                .map(str::trim)
                .filter(|line| !line.is_empty() && !line.starts_with('#')),
        );
        log::info!(
            "Loaded {} lexicon words from {}",
            lexicon.len(),
            path.display()
        );
        Ok(lexicon)
    }

    pub fn insert(&mut self, word: &str) {
        let syllables: Vec<String> = word
            .split(|c: char| c.is_whitespace() || c == WORD_JOINER)
            .filter(|s| !s.is_empty())
            .map(|s| super::normalizer::compose(&s.to_lowercase()))
            .collect();
        if syllables.len() < 2 {
            return;
        }
        self.max_word_syllables = self.max_word_syllables.max(syllables.len());
        self.words.insert(syllables.join(" "));
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    fn longest_match(&self, syllables: &[&str]) -> usize {
        let limit = self.max_word_syllables.min(syllables.len());
        for n in (2..=limit).rev() {
            let candidate = syllables[..n]
                .iter()
                .map(|s| s.to_lowercase())
                .collect::<Vec<_>>()
                .join(" ");
            if self.words.contains(&candidate) {
                return n;
            }
        }
        1
    }
}

impl Segmenter for LexiconSegmenter {
    fn segment(&self, text: &str) -> Result<String, FrontendError> {
        // (whitespace before the syllable, syllable)
        let mut pieces: Vec<(&str, &str)> = Vec::new();
        let mut rest = text;
        let trailing = loop {
            let trimmed = rest.trim_start();
            let gap = &rest[..rest.len() - trimmed.len()];
            if trimmed.is_empty() {
                break gap;
            }
            let end = trimmed.find(char::is_whitespace).unwrap_or(trimmed.len());
            pieces.push((gap, &trimmed[..end]));
            rest = &trimmed[end..];
        };

        let syllables: Vec<&str> = pieces.iter().map(|&(_, syllable)| syllable).collect();
        let mut out = String::with_capacity(text.len());
        let mut start = 0;
        while start < pieces.len() {
            let n = self.longest_match(&syllables[start..]);
            let (gap, first) = pieces[start];
            out.push_str(gap);
            out.push_str(first);
            for &(_, syllable) in &pieces[start + 1..start + n] {
                out.push(WORD_JOINER);
                out.push_str(syllable);
            }
            start += n;
        }
        out.push_str(trailing);
        Ok(out)
    }
}

/// Segmenter backed by an external word tokenizer process.
///
/// The text is written to the program's stdin as one newline-terminated line
/// and the segmented line is read back from stdout.
#[derive(Debug, Clone)]
pub struct CommandSegmenter {
    pub bin_path: PathBuf,
    pub args: Vec<String>,
}

impl CommandSegmenter {
    pub fn new(bin_path: impl Into<PathBuf>) -> Self {
        Self {
            bin_path: bin_path.into(),
            args: Vec::new(),
        }
    }

    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args = args.into_iter().map(Into::into).collect();
        self
    }

    fn spawn(&self) -> Result<Child, FrontendError> {
        Command::new(&self.bin_path)
            .args(&self.args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| match e.kind() {
                io::ErrorKind::NotFound => {
                    FrontendError::SegmenterNotFound(self.bin_path.display().to_string())
                }
                _ => FrontendError::Io(e),
            })
    }

    /// Feed `input` to the program and collect its stdout.
    ///
    /// Stdin is written from a scoped thread while this thread drains stdout
    /// and stderr, so a program that streams its output cannot fill the pipe
    /// and stall on input of any size.
    fn run(&self, input: &str) -> Result<String, FrontendError> {
        let mut child = self.spawn()?;
        let stdin = child.stdin.take();
        // Line-oriented tools may hold back the last token without a terminator.
        let payload = terminate_line(input);

        let (output, fed) = thread::scope(|scope| {
            let feeder = scope.spawn(|| -> io::Result<()> {
                match stdin {
                    // Dropping the handle at the end closes the pipe.
                    Some(mut stdin) => stdin.write_all(payload.as_bytes()),
                    None => Ok(()),
                }
            });
            let output = child.wait_with_output();
            let fed = feeder
                .join()
                .unwrap_or_else(|_| Err(io::Error::other("stdin writer panicked")));
            (output, fed)
        });
        let output = output?;

        if !output.status.success() {
            return Err(FrontendError::Segmentation(format!(
                "{} exited with code {:?}: {}",
                self.bin_path.display(),
                output.status.code(),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        if let Err(e) = fed {
            return Err(FrontendError::Segmentation(format!(
                "{} stopped reading its input: {e}",
                self.bin_path.display()
            )));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Segmenter for CommandSegmenter {
    fn segment(&self, text: &str) -> Result<String, FrontendError> {
        if text.is_empty() {
            return Ok(String::new());
        }
        let output = self.run(&text.replace(['\n', '\r'], " "))?;
        Ok(output.lines().collect::<Vec<_>>().join(" ").trim().to_string())
    }
}

fn terminate_line(input: &str) -> Cow<'_, str> {
    if input.ends_with('\n') {
        Cow::Borrowed(input)
    } else {
        Cow::Owned(format!("{input}\n"))
    }
}

#[cfg(test)]
mod tests {
    use super::{terminate_line, CommandSegmenter, LexiconSegmenter, Segmenter};
    use crate::frontend::FrontendError;
    use std::io::Write;
    use std::process::Command;

    fn lexicon() -> LexiconSegmenter {
        LexiconSegmenter::new([
            "Hà Nội",
            "thành phố",
            "Hồ Chí Minh",
            "Việt Nam",
            "xin chào",
        ])
    }

    #[test]
    fn joins_known_multi_syllable_words() {
        let out = lexicon().segment("Xin chào thành phố Hồ Chí Minh").unwrap();
        assert_eq!(out, "Xin_chào thành_phố Hồ_Chí_Minh");
    }

    #[test]
    fn prefers_the_longest_word() {
        let lexicon = LexiconSegmenter::new(["Hồ Chí", "Hồ Chí Minh"]);
        assert_eq!(lexicon.segment("Hồ Chí Minh").unwrap(), "Hồ_Chí_Minh");
    }

    #[test]
    fn leaves_unknown_syllables_alone() {
        let out = lexicon().segment("tôi yêu Việt Nam").unwrap();
        assert_eq!(out, "tôi yêu Việt_Nam");
    }

    #[test]
    fn segmentation_is_idempotent() {
        let once = lexicon().segment("Hà Nội và thành phố Hồ Chí Minh").unwrap();
        let twice = lexicon().segment(&once).unwrap();
        assert_eq!(once, twice);
    }

    #[test]
    fn keeps_whitespace_between_words() {
        let out = lexicon().segment("  Hà   Nội\tvà  Việt Nam \n").unwrap();
        assert_eq!(out, "  Hà_Nội\tvà  Việt_Nam \n");
        assert_eq!(lexicon().segment(" \t ").unwrap(), " \t ");
        assert_eq!(lexicon().segment("").unwrap(), "");
    }

    #[test]
    fn single_syllable_entries_are_ignored() {
        let lexicon = LexiconSegmenter::new(["một", "", "hai ba"]);
        assert_eq!(lexicon.len(), 1);
    }

    #[test]
    fn loads_lexicon_file_skipping_comments() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "# Vietnamese words").unwrap();
        writeln!(file, "Hà Nội").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "việt nam").unwrap();
        let lexicon = LexiconSegmenter::load(file.path()).unwrap();
        assert_eq!(lexicon.len(), 2);
        assert_eq!(lexicon.segment("Việt Nam").unwrap(), "Việt_Nam");
    }

    #[test]
    fn appends_trailing_newline_for_stdin() {
        assert_eq!(terminate_line("Hà Nội"), "Hà Nội\n");
        assert_eq!(terminate_line("Hà Nội\n"), "Hà Nội\n");
    }

    #[test]
    fn missing_binary_reports_not_found() {
        let segmenter = CommandSegmenter::new("definitely-not-a-real-segmenter-binary");
        match segmenter.segment("xin chào") {
            Err(FrontendError::SegmenterNotFound(bin)) => {
                assert!(bin.contains("definitely-not-a-real-segmenter-binary"))
            }
            other => panic!("expected SegmenterNotFound, got {other:?}"),
        }
    }

    #[test]
    fn echoes_through_external_command() {
        // Skip when `cat` is unavailable in the execution environment.
        if Command::new("cat").arg("--version").output().is_err() {
            return;
        }

        let segmenter = CommandSegmenter::new("cat");
        assert_eq!(segmenter.segment("xin chào").unwrap(), "xin chào");
        assert_eq!(segmenter.segment("").unwrap(), "");
    }

    #[test]
    fn streams_input_larger_than_a_pipe_buffer() {
        if Command::new("cat").arg("--version").output().is_err() {
            return;
        }

        let input = "xin chào ".repeat(40_000);
        assert!(input.len() > 64 * 1024);
        let segmenter = CommandSegmenter::new("cat");
        assert_eq!(segmenter.segment(&input).unwrap(), input.trim());
    }

    #[test]
    fn failing_command_reports_segmentation_error() {
        if Command::new("false").output().is_err() {
            return;
        }

        let segmenter = CommandSegmenter::new("false");
        assert!(matches!(
            segmenter.segment("xin chào"),
            Err(FrontendError::Segmentation(_))
        ));
    }
}
