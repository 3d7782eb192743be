use std::{io::Write, sync::Arc};

use rnnbatch::{
    Batch,
    BatchStrategy,
    BatchStream,
    BatcherOptions,
    Corpus,
    SequenceOptions,
    TextVocab,
    options::steps_per_epoch,
    types::ContextType,
    vocab::{OovPolicy, io::load_vocab_json_path},
    windows::WindowIndex,
};

use crate::{LogArgs, corpus_args::CorpusArgs, input_output::OutputArgs};

/// Args for the batches command.
#[derive(clap::Args, Debug)]
pub struct BatchesArgs {
    #[clap(flatten)]
    pub logging: LogArgs,

    #[command(flatten)]
    corpus: CorpusArgs,

    /// A textgenrnn `vocab.json` (`{"token": id}`).
    #[arg(long)]
    vocab: String,

    /// The meta token marking document boundaries.
    #[arg(long, default_value = rnnbatch::vocab::DEFAULT_META_TOKEN)]
    meta_token: String,

    /// Encode unknown prefix tokens as padding instead of dropping them.
    #[arg(long)]
    pad_oov: bool,

    /// Batch generation strategy: "documents" or "windows".
    #[arg(long, default_value_t = BatchStrategy::Windows)]
    strategy: BatchStrategy,

    /// Rows per batch.
    #[arg(long, default_value = "128")]
    batch_size: usize,

    /// Random seed; OS entropy when absent.
    #[arg(long, default_value = None)]
    seed: Option<u64>,

    /// Number of batches to draw.
    #[arg(long, default_value = "10")]
    count: usize,

    /// Suppress empty epoch-end batches.
    #[arg(long)]
    skip_empty_remainders: bool,

    #[command(flatten)]
    output: OutputArgs,
}

/// One JSON summary line.
#[derive(Debug, serde::Serialize)]
struct BatchSummary {
    batch: usize,
    epoch: usize,
    rows: usize,
    max_length: usize,
    num_classes: usize,
    pad_fraction: f64,
    context_rows: Option<usize>,
    sample_prefix: Option<Vec<String>>,
    sample_target: Option<String>,
}

impl BatchSummary {
    fn new<C: ContextType>(
        index: usize,
        batch: &Batch<u32, C>,
        vocab: &TextVocab<u32>,
    ) -> Self {
        let (rows, max_length) = batch.inputs.dim();
        let cells = rows * max_length;
        let pads = batch.inputs.iter().filter(|&&id| id == 0).count();

        let sample_prefix = (rows > 0).then(|| {
            vocab
                .decode(&batch.inputs.row(0).to_vec())
                .into_iter()
                .map(String::from)
                .collect()
        });
        let sample_target = batch
            .target_ids()
            .first()
            .and_then(|&idx| u32::try_from(idx).ok())
            .and_then(|id| vocab.token(id))
            .map(String::from);

        Self {
            batch: index,
            epoch: batch.epoch,
            rows,
            max_length,
            num_classes: batch.targets.ncols(),
            pad_fraction: if cells == 0 {
                0.0
            } else {
                pads as f64 / cells as f64
            },
            context_rows: batch.context.as_ref().map(Vec::len),
            sample_prefix,
            sample_target,
        }
    }
}

impl BatchesArgs {
    pub fn run(&self) -> Result<(), Box<dyn std::error::Error>> {
        self.logging.init()?;

        let sequence_options = self.corpus.sequence_options()?;
        let vocab = Arc::new(self.load_vocab()?);
        log::info!(
            "vocabulary: {} tokens, {} classes",
            vocab.len(),
            vocab.num_classes()
        );

        let options = BatcherOptions::new(self.batch_size)
            .with_seed(self.seed)
            .with_emit_empty_remainder(!self.skip_empty_remainders);

        if self.corpus.context {
            let corpus = self.corpus.load_labeled_corpus(&sequence_options)?;
            self.write_summaries(Arc::new(corpus), vocab, &sequence_options, options)
        } else {
            let corpus = self.corpus.load_corpus(&sequence_options)?;
            self.write_summaries(Arc::new(corpus), vocab, &sequence_options, options)
        }
    }

    fn load_vocab(&self) -> Result<TextVocab<u32>, Box<dyn std::error::Error>> {
        log::info!("vocab: {}", self.vocab);
        let policy = if self.pad_oov {
            OovPolicy::Pad
        } else {
            OovPolicy::Drop
        };
        Ok(load_vocab_json_path::<u32, _>(&self.vocab)?
            .with_meta_token(&self.meta_token)
            .with_oov_policy(policy))
    }

    fn write_summaries<C: ContextType>(
        &self,
        corpus: Arc<Corpus<C>>,
        vocab: Arc<TextVocab<u32>>,
        sequence_options: &SequenceOptions,
        options: BatcherOptions,
    ) -> Result<(), Box<dyn std::error::Error>> {
        let examples = WindowIndex::build(&corpus, sequence_options).len();
        log::info!(
            "examples per epoch: {examples}; steps per epoch: {}",
            steps_per_epoch(examples, options.batch_size())
        );

        let mut stream = BatchStream::new(
            self.strategy,
            corpus,
            vocab.clone(),
            sequence_options,
            options,
        )?;

        if let Some(path) = &self.output.output {
            log::info!("output: {path}");
        }
        let mut writer = self.output.open_writer()?;
        for index in 0..self.count {
            let batch = stream.next_batch();
            serde_json::to_writer(&mut writer, &BatchSummary::new(index, &batch, &vocab))?;
            writeln!(writer)?;
        }
        writer.flush()?;

        log::info!("{:?}", stream.stats());
        Ok(())
    }
}
