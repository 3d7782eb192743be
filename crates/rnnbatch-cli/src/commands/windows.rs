use std::io::Write;

use rnnbatch::{
    options::{DEFAULT_BATCH_SIZE, steps_per_epoch},
    windows::WindowIndex,
};

use crate::{LogArgs, corpus_args::CorpusArgs, input_output::OutputArgs};

/// Args for the windows command.
#[derive(clap::Args, Debug)]
pub struct WindowsArgs {
    #[clap(flatten)]
    pub logging: LogArgs,

    #[command(flatten)]
    corpus: CorpusArgs,

    /// Share of windows kept for training; the rest is held out for validation.
    #[arg(long, default_value = "1.0")]
    train_fraction: f64,

    /// Batch size used to report steps per epoch.
    #[arg(long, default_value_t = DEFAULT_BATCH_SIZE)]
    batch_size: usize,

    /// Random seed for the split; OS entropy when absent.
    #[arg(long, default_value = None)]
    seed: Option<u64>,

    #[command(flatten)]
    output: OutputArgs,
}

/// The JSON report.
#[derive(Debug, PartialEq, serde::Serialize)]
struct WindowReport {
    documents: usize,
    tokens: usize,
    windows: usize,
    train: usize,
    validation: usize,
    train_steps: usize,
    validation_steps: usize,
}

impl WindowReport {
    fn new(
        documents: usize,
        tokens: usize,
        windows: usize,
        (train, validation): (WindowIndex, WindowIndex),
        batch_size: usize,
    ) -> Self {
        Self {
            documents,
            tokens,
            windows,
            train: train.len(),
            validation: validation.len(),
            train_steps: steps_per_epoch(train.len(), batch_size),
            validation_steps: steps_per_epoch(validation.len(), batch_size),
        }
    }
}

impl WindowsArgs {
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.init()?;

        let sequence_options = self.corpus.sequence_options()?;
        let (documents, tokens, index) = if self.corpus.context {
            let corpus = self.corpus.load_labeled_corpus(&sequence_options)?;
            let index = WindowIndex::build(&corpus, &sequence_options);
            (corpus.len(), corpus.total_tokens(), index)
        } else {
            let corpus = self.corpus.load_corpus(&sequence_options)?;
            let index = WindowIndex::build(&corpus, &sequence_options);
            (corpus.len(), corpus.total_tokens(), index)
        };
        let windows = index.len();

        let mut rng = rnnbatch::batching::batcher_rng(self.seed);
        let report = WindowReport::new(
            documents,
            tokens,
            windows,
            index.split(self.train_fraction, &mut rng),
            self.batch_size,
        );

        let mut writer = self.output.open_writer()?;
        serde_json::to_writer(&mut writer, &report)?;
        writeln!(writer)?;
        writer.flush()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rnnbatch::{Corpus, Document, SequenceOptions};

    use super::*;

    #[test]
    fn test_window_report() {
        let corpus = Corpus::new(vec![Document::from_chars("hello"), Document::from_chars("")]);
        let options = SequenceOptions::new(4);
        let index = WindowIndex::build(&corpus, &options);
        assert_eq!(index.len(), 6 + 1);

        let mut rng = rnnbatch::batching::batcher_rng(Some(3));
        let report = WindowReport::new(
            corpus.len(),
            corpus.total_tokens(),
            index.len(),
            index.split(0.5, &mut rng),
            2,
        );
        assert_eq!(
            report,
            WindowReport {
                documents: 2,
                tokens: 5,
                windows: 7,
                train: 4,
                validation: 3,
                train_steps: 2,
                validation_steps: 1,
            }
        );
    }
}
