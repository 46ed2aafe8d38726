//! Software seed search.
//!
//! Reference BLASTN flow run entirely on the host: split the query into
//! overlapping k-mers, find every exact occurrence of each k-mer in every
//! subject sequence, extend each occurrence with [`SeedExtender`], then
//! filter and rank the resulting high-scoring segment pairs.

use serde::Serialize;
use tracing::{debug, info};

use super::extend::{Alignment, SeedExtender, SeedFrame};
use crate::common::ExtendError;
use crate::config::SearchConfig;

/// Exact k-mer match between the query and one subject.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct WordHit {
    /// Index of the subject sequence in the database.
    pub subject: usize,
    /// Offset of the k-mer in the query.
    pub query_pos: usize,
    /// Offset of the match in the subject.
    pub subject_pos: usize,
}

/// High-scoring segment pair.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Hsp {
    /// Seed the pair was extended from.
    pub hit: WordHit,
    /// Extension result.
    pub alignment: Alignment,
    /// Percentage of aligned positions that match.
    pub identity: f64,
}

/// Host-side k-mer seed search.
#[derive(Clone, Copy, Debug, Default)]
pub struct SeedSearch {
    extender: SeedExtender,
    config: SearchConfig,
}

impl SeedSearch {
    /// Creates a search with the given extender and parameters.
    pub const fn new(extender: SeedExtender, config: SearchConfig) -> Self {
        Self { extender, config }
    }

    /// Overlapping k-mers of `query`, in query order.
    pub fn words<'a>(&self, query: &'a [u8]) -> Vec<&'a [u8]> {
        if self.config.kmer == 0 {
            return Vec::new();
        }
        query.windows(self.config.kmer).collect()
    }

    /// Every exact k-mer occurrence, ordered by subject, then query word, then subject offset.
    pub fn word_hits(&self, query: &[u8], database: &[Vec<u8>]) -> Vec<WordHit> {
        let words = self.words(query);
        let mut hits = Vec::new();
        for (subject, seq) in database.iter().enumerate() {
            for (query_pos, word) in words.iter().enumerate() {
                hits.extend(
                    seq.windows(word.len())
                        .enumerate()
                        .filter(|(_, candidate)| candidate == word)
                        .map(|(subject_pos, _)| WordHit {
                            subject,
                            query_pos,
                            subject_pos,
                        }),
                );
            }
        }
        hits
    }

    /// Finds and extends every word hit.
    ///
    /// # Errors
    ///
    /// Propagates [`ExtendError`] from the extender.
    pub fn search(&self, query: &[u8], database: &[Vec<u8>]) -> Result<Vec<Hsp>, ExtendError> {
        let hits = self.word_hits(query, database);
        info!(
            words = self.words(query).len(),
            subjects = database.len(),
            hits = hits.len(),
            "seed search"
        );

        hits.into_iter()
            .map(|hit| {
                let subject = &database[hit.subject];
                let alignment = self.extender.extend(
                    query,
                    subject,
                    SeedFrame::Absolute {
                        q_start: hit.query_pos,
                        d_start: hit.subject_pos,
                    },
                )?;
                let identity = identity(query, subject, &alignment);
                debug!(?hit, score = alignment.score, identity, "hsp");
                Ok(Hsp {
                    hit,
                    alignment,
                    identity,
                })
            })
            .collect()
    }

    /// HSPs scoring strictly above the configured minimum.
    pub fn filter(&self, hsps: &[Hsp]) -> Vec<Hsp> {
        hsps.iter()
            .filter(|hsp| hsp.alignment.score > self.config.min_score)
            .copied()
            .collect()
    }

    /// All HSPs tied at the highest score, in input order.
    pub fn best(hsps: &[Hsp]) -> Vec<Hsp> {
        let Some(max) = hsps.iter().map(|hsp| hsp.alignment.score).max() else {
            return Vec::new();
        };
        hsps.iter()
            .filter(|hsp| hsp.alignment.score == max)
            .copied()
            .collect()
    }
}

/// Percentage of matching positions in the aligned window, or 0 for an empty window.
pub fn identity(query: &[u8], subject: &[u8], alignment: &Alignment) -> f64 {
    if alignment.length == 0 {
        return 0.0;
    }
    let q = query.iter().skip(alignment.q_start).take(alignment.length);
    let s = subject.iter().skip(alignment.d_start).take(alignment.length);
    let matches = q.zip(s).filter(|(a, b)| a == b).count();
    matches as f64 / alignment.length as f64 * 100.0
}
