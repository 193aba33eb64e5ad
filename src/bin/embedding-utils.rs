use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use itertools::Itertools;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use embedding_utils::files::read_txt;
use embedding_utils::prelude::*;
use embedding_utils::preprocess::{process_text, ProcessOptions};

#[derive(Parser)]
#[command(name = "embedding-utils")]
#[command(about = "Convert, inspect, and merge GloVe and fastText embeddings")]
#[command(version)]
struct Cli {
    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert embeddings between formats
    Convert {
        /// Input embeddings
        input: PathBuf,

        /// Output embeddings
        output: PathBuf,

        /// Input format
        #[arg(short, long, value_enum, default_value = "glove")]
        from: EmbeddingFormat,

        /// Output format
        #[arg(short, long, value_enum, default_value = "fasttext")]
        to: EmbeddingFormat,

        /// Dimensionality of GloVe input (default: from the file name)
        #[arg(short, long)]
        dims: Option<usize>,
    },

    /// Print the tokens of a text that have no embedding
    Oov {
        /// Embeddings
        vectors: PathBuf,

        /// Text file
        text: PathBuf,

        /// Embedding format
        #[arg(short, long, value_enum, default_value = "glove")]
        from: EmbeddingFormat,

        /// Dimensionality of GloVe input (default: from the file name)
        #[arg(short, long)]
        dims: Option<usize>,

        /// Do not remove stopwords from the text
        #[arg(long)]
        keep_stopwords: bool,

        /// Print every unknown token once
        #[arg(short, long)]
        unique: bool,
    },

    /// Add or replace the vectors of GloVe embeddings
    Merge {
        /// Embeddings to update
        base: PathBuf,

        /// Embeddings with new vectors
        update: PathBuf,

        /// Output embeddings
        output: PathBuf,

        /// Dimensionality (default: from the file name)
        #[arg(short, long)]
        dims: Option<usize>,
    },
}

#[derive(Clone, Copy, Debug, Eq, PartialEq, ValueEnum)]
enum EmbeddingFormat {
    /// Text without header
    Glove,

    /// Text with a shape header (.vec)
    Fasttext,

    /// Binary word/vector pairs
    Binary,
}

type TextEmbeddings = Embeddings<SimpleVocab, NdArray>;

fn main() -> Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| format!("embedding_utils={}", log_level).into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    match cli.command {
        Commands::Convert {
            input,
            output,
            from,
            to,
            dims,
        } => {
            let embeddings = read_embeddings(&input, from, dims)?;
            write_embeddings(embeddings, &output, to)
        }
        Commands::Oov {
            vectors,
            text,
            from,
            dims,
            keep_stopwords,
            unique,
        } => print_oov(&vectors, &text, from, dims, keep_stopwords, unique),
        Commands::Merge {
            base,
            update,
            output,
            dims,
        } => merge(&base, &update, &output, dims),
    }
}

fn read_embeddings(
    path: &Path,
    format: EmbeddingFormat,
    dims: Option<usize>,
) -> Result<TextEmbeddings> {
    if !path.is_file() {
        bail!("Embeddings file '{}' does not exist", path.display());
    }

    let embeddings = match format {
        EmbeddingFormat::Glove => {
            let config = GloVeConfig {
                dims,
                vocab_size: None,
            };
            GloVe::open(path, config)?.into_embeddings()
        }
        EmbeddingFormat::Fasttext => FastText::open(path)?.into_embeddings(),
        EmbeddingFormat::Binary => {
            let config = GloVeConfig {
                dims,
                vocab_size: None,
            };
            GloVe::open_binary(path, config)?.into_embeddings()
        }
    };

    info!(
        words = embeddings.len(),
        dims = embeddings.dims(),
        "Read embeddings"
    );

    Ok(embeddings)
}

fn write_embeddings(
    embeddings: TextEmbeddings,
    path: &Path,
    format: EmbeddingFormat,
) -> Result<()> {
    match format {
        EmbeddingFormat::Glove => GloVe::from_embeddings(embeddings, None).save_vectors(path),
        EmbeddingFormat::Fasttext => FastText::from_embeddings(embeddings).save_vectors(path),
        EmbeddingFormat::Binary => GloVe::from_embeddings(embeddings, None).save_binary(path),
    }
    .with_context(|| format!("Cannot write embeddings to '{}'", path.display()))
}

fn print_oov(
    vectors: &Path,
    text: &Path,
    format: EmbeddingFormat,
    dims: Option<usize>,
    keep_stopwords: bool,
    unique: bool,
) -> Result<()> {
    let embeddings = read_embeddings(vectors, format, dims)
        .with_context(|| format!("Cannot read embeddings from '{}'", vectors.display()))?;

    let lines =
        read_txt(text).with_context(|| format!("Cannot read text from '{}'", text.display()))?;
    let options = ProcessOptions {
        remove_stopwords: !keep_stopwords,
        ..ProcessOptions::default()
    };
    let tokens = process_text(&lines.join("\n"), options);

    let oov = embeddings.oov_tokens(&tokens);
    info!(tokens = tokens.len(), oov = oov.len(), "Unknown tokens");

    if unique {
        for token in oov.iter().unique() {
            println!("{}", token);
        }
    } else {
        for token in &oov {
            println!("{}", token);
        }
    }

    Ok(())
}

fn merge(base: &Path, update: &Path, output: &Path, dims: Option<usize>) -> Result<()> {
    let mut glove = GloVe::from_embeddings(
        read_embeddings(base, EmbeddingFormat::Glove, dims)
            .with_context(|| format!("Cannot read embeddings from '{}'", base.display()))?,
        None,
    );
    let updates = read_embeddings(update, EmbeddingFormat::Glove, dims)
        .with_context(|| format!("Cannot read embeddings from '{}'", update.display()))?;

    glove
        .add_replace_vectors(
            updates
                .iter()
                .map(|(word, embedding)| (word, embedding.to_owned())),
        )
        .context("Cannot merge embeddings")?;

    glove
        .save_vectors(output)
        .with_context(|| format!("Cannot write embeddings to '{}'", output.display()))
}
