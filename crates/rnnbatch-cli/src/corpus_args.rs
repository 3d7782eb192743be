use std::io::BufRead;

use rnnbatch::{Corpus, Document, SequenceOptions};

use crate::input_output::open_reader;

/// Corpus and sequence argument group.
#[derive(clap::Args, Debug)]
pub struct CorpusArgs {
    /// Corpus files, one document per line; "-" may be used to indicate stdin.
    #[arg(required = true)]
    pub files: Vec<String>,

    /// Lines are `label<TAB>text`; labels become the context input.
    #[arg(long)]
    pub context: bool,

    /// A textgenrnn `config.json` providing the sequence options.
    #[arg(long, default_value = None)]
    pub config: Option<String>,

    /// Override the input row width.
    #[arg(long, default_value = None)]
    pub max_length: Option<usize>,

    /// Tokenize on whitespace instead of characters.
    #[arg(long)]
    pub word_level: bool,

    /// Treat each document as one continuous text, without meta tokens.
    #[arg(long)]
    pub single_text: bool,
}

impl CorpusArgs {
    /// Resolve the sequence options: config file first, then flags.
    pub fn sequence_options(&self) -> Result<SequenceOptions, Box<dyn std::error::Error>> {
        let mut options = match &self.config {
            Some(path) => {
                log::info!("config: {path}");
                SequenceOptions::load_json_path(path)?
            }
            None => SequenceOptions::default(),
        };
        if let Some(max_length) = self.max_length {
            options = options.with_max_length(max_length);
        }
        if self.word_level {
            options = options.with_word_level(true);
        }
        if self.single_text {
            options = options.with_single_text(true);
        }
        options.validate()?;
        Ok(options)
    }

    /// Read every non-blank line of every file.
    fn read_lines(&self) -> Result<Vec<(String, usize, String)>, Box<dyn std::error::Error>> {
        let mut lines = Vec::new();
        for (idx, path) in self.files.iter().enumerate() {
            log::info!("{idx}: {path}");
            let reader = open_reader(path)?;
            for (line_no, line) in reader.lines().enumerate() {
                let line = line?;
                if line.trim().is_empty() {
                    continue;
                }
                lines.push((path.clone(), line_no + 1, line));
            }
        }
        log::info!("documents: {}", lines.len());
        Ok(lines)
    }

    /// Load an unlabeled corpus.
    pub fn load_corpus(
        &self,
        options: &SequenceOptions,
    ) -> Result<Corpus, Box<dyn std::error::Error>> {
        let lines = self.read_lines()?;
        Ok(Corpus::from_texts(
            lines.iter().map(|(_, _, text)| text),
            options,
        ))
    }

    /// Load a corpus of `label<TAB>text` lines.
    pub fn load_labeled_corpus(
        &self,
        options: &SequenceOptions,
    ) -> Result<Corpus<String>, Box<dyn std::error::Error>> {
        let mut documents = Vec::new();
        let mut labels = Vec::new();
        for (path, line_no, line) in self.read_lines()? {
            let Some((label, text)) = parse_labeled_line(&line) else {
                return Err(format!("{path}:{line_no}: expected `label<TAB>text`").into());
            };
            labels.push(label.to_string());
            documents.push(Document::from_text(text, options.word_level()));
        }
        Ok(Corpus::new(documents).with_context_labels(labels)?)
    }
}

/// Split a `label<TAB>text` line.
fn parse_labeled_line(line: &str) -> Option<(&str, &str)> {
    line.split_once('\t')
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use tempdir::TempDir;

    use super::*;

    fn args(
        files: Vec<String>,
        context: bool,
    ) -> CorpusArgs {
        CorpusArgs {
            files,
            context,
            config: None,
            max_length: Some(5),
            word_level: false,
            single_text: false,
        }
    }

    #[test]
    fn test_parse_labeled_line() {
        assert_eq!(parse_labeled_line("pos\tgreat day"), Some(("pos", "great day")));
        assert_eq!(parse_labeled_line("a\tb\tc"), Some(("a", "b\tc")));
        assert_eq!(parse_labeled_line("no label"), None);
    }

    #[test]
    fn test_load_corpora() {
        let dir = TempDir::new("rnnbatch_cli").unwrap();
        let path = dir.path().join("corpus.tsv");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(file, "x\thello").unwrap();
        writeln!(file).unwrap();
        writeln!(file, "y\tworld").unwrap();
        drop(file);

        let files = vec![path.to_string_lossy().to_string()];

        let plain = args(files.clone(), false);
        let options = plain.sequence_options().unwrap();
        assert_eq!(options.max_length(), 5);
        let corpus = plain.load_corpus(&options).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(corpus.documents()[0].len(), "x\thello".len());

        let labeled = args(files, true);
        let corpus = labeled.load_labeled_corpus(&options).unwrap();
        assert_eq!(corpus.len(), 2);
        assert_eq!(
            corpus.context_labels(),
            Some(&["x".to_string(), "y".to_string()][..])
        );
        assert_eq!(corpus.documents()[1], Document::from_chars("world"));
    }

    #[test]
    fn test_missing_label_is_an_error() {
        let dir = TempDir::new("rnnbatch_cli").unwrap();
        let path = dir.path().join("corpus.tsv");
        std::fs::write(&path, "x\thello\nunlabeled\n").unwrap();

        let labeled = args(vec![path.to_string_lossy().to_string()], true);
        let options = labeled.sequence_options().unwrap();
        let err = labeled.load_labeled_corpus(&options).unwrap_err();
        assert!(err.to_string().contains(":2:"));
    }
}
