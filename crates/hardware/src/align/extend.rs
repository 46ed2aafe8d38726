//! Ungapped X-drop seed extension.
//!
//! Extends a seed pair outwards one symbol at a time, right side first, then
//! left, scoring `+match_score` per match and `-mismatch_penalty` per mismatch.
//! Every step whose running score reaches the best seen so far (`>=`, so later
//! windows win ties) records the current window. Extension stops when neither
//! side can move or the score falls more than `threshold` below the best.
//!
//! Two coordinate frames are supported:
//! - [`SeedFrame::Absolute`]: seeds index the full sequences and each sequence
//!   is bounded by its own length.
//! - [`SeedFrame::Window`]: both sequences were pre-sliced so the seed sits at
//!   `hit_pos` in each, and both are bounded by `seq_len`. Results are mapped
//!   back to absolute coordinates.

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::seq::unpack;
use super::window::SeedWindow;
use crate::common::ExtendError;
use crate::config::ExtendConfig;

/// Where a seed sits and how the extension is bounded.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize, Serialize)]
pub enum SeedFrame {
    /// Seeds in top-level sequence coordinates.
    Absolute {
        /// Seed offset in the query.
        q_start: usize,
        /// Seed offset in the database.
        d_start: usize,
    },
    /// Seeds relative to a hit position inside a pre-sliced window.
    Window {
        /// Absolute seed offset in the query.
        q_start: usize,
        /// Absolute seed offset in the database.
        d_start: usize,
        /// Seed offset inside both sliced sequences.
        hit_pos: usize,
        /// Usable length of both sliced sequences.
        seq_len: usize,
    },
}

/// Best ungapped extension found from a seed.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Deserialize, Serialize)]
pub struct Alignment {
    /// Best running score reached.
    pub score: i32,
    /// Symbols covered by the best window, or 0 for an empty extension.
    pub length: usize,
    /// First query symbol of the best window.
    pub q_start: usize,
    /// First database symbol of the best window.
    pub d_start: usize,
}

/// Best window seen by the extension loop.
#[derive(Clone, Copy, Debug)]
struct Best {
    score: i32,
    q_l: isize,
    q_r: isize,
    d_l: isize,
    d_r: isize,
}

/// Seed-extension engine.
///
/// Stateless between calls apart from its scoring parameters.
///
/// # Example
///
/// ```
/// use blastn_xcel_core::align::{SeedExtender, SeedFrame};
///
/// let extender = SeedExtender::default();
/// let query = [0, 1, 2, 3, 0, 1];
/// let database = [0, 1, 2, 3, 0, 1];
/// let aln = extender
///     .extend(&query, &database, SeedFrame::Absolute { q_start: 3, d_start: 3 })
///     .unwrap_or_default();
/// assert_eq!(aln.score, 6);
/// assert_eq!(aln.length, 6);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SeedExtender {
    params: ExtendConfig,
}

impl SeedExtender {
    /// Creates an extender with the given scoring.
    ///
    /// Parameters are expected to pass [`ExtendConfig::validate`]; out-of-range
    /// values saturate the running score instead of overflowing.
    pub const fn new(params: ExtendConfig) -> Self {
        Self { params }
    }

    /// Scoring parameters in use.
    pub const fn params(&self) -> &ExtendConfig {
        &self.params
    }

    /// Extends the seed described by `frame`.
    ///
    /// An empty extension (`length == 0`) is a valid result.
    ///
    /// # Errors
    ///
    /// Returns [`ExtendError::SeedOutOfRange`] if a seed lies past the end of
    /// its sequence or a window is longer than the supplied sequences,
    /// [`ExtendError::HitBeyondStart`] if a window's hit position exceeds an
    /// absolute seed, and [`ExtendError::AsymmetricSpan`] if the best window
    /// covers different spans in the two sequences.
    pub fn extend(
        &self,
        query: &[u8],
        database: &[u8],
        frame: SeedFrame,
    ) -> Result<Alignment, ExtendError> {
        let aln = match frame {
            SeedFrame::Absolute { q_start, d_start } => {
                check_seed(q_start, query.len())?;
                check_seed(d_start, database.len())?;

                let initial = Best {
                    score: 0,
                    q_l: q_start as isize,
                    q_r: q_start as isize,
                    d_l: d_start as isize,
                    d_r: d_start as isize,
                };
                let best = self.run(
                    query,
                    database,
                    (query.len(), database.len()),
                    (q_start, d_start),
                    initial,
                )?;

                let length = if best.q_r == best.q_l {
                    0
                } else {
                    (best.q_r - best.q_l + 1) as usize
                };
                Alignment {
                    score: best.score,
                    length,
                    q_start: best.q_l as usize,
                    d_start: best.d_l as usize,
                }
            }
            SeedFrame::Window {
                q_start,
                d_start,
                hit_pos,
                seq_len,
            } => {
                check_seed(seq_len, query.len().min(database.len()))?;
                check_seed(hit_pos, seq_len)?;
                for start in [q_start, d_start] {
                    if hit_pos > start {
                        warn!(hit_pos, start, "window hit beyond seed");
                        return Err(ExtendError::HitBeyondStart { hit_pos, start });
                    }
                }

                let hit = hit_pos as isize;
                let initial = Best {
                    score: 0,
                    q_l: hit,
                    q_r: hit - 1,
                    d_l: hit,
                    d_r: hit - 1,
                };
                let mut best = self.run(
                    query,
                    database,
                    (seq_len, seq_len),
                    (hit_pos, hit_pos),
                    initial,
                )?;

                let length = if best.q_l == hit && best.q_r == hit - 1 {
                    best.q_l = hit;
                    best.d_l = hit;
                    0
                } else {
                    (best.q_r - best.q_l + 1) as usize
                };
                Alignment {
                    score: best.score,
                    length,
                    q_start: q_start - (hit_pos - best.q_l as usize),
                    d_start: d_start - (hit_pos - best.d_l as usize),
                }
            }
        };

        debug!(
            score = aln.score,
            length = aln.length,
            q_start = aln.q_start,
            d_start = aln.d_start,
            "extended {frame:?}"
        );
        Ok(aln)
    }

    /// Extends two packed 16-symbol words from absolute seeds.
    ///
    /// # Errors
    ///
    /// As for [`SeedExtender::extend`]; seeds must be at most 16.
    pub fn extend_packed(
        &self,
        query: u32,
        database: u32,
        q_start: usize,
        d_start: usize,
    ) -> Result<Alignment, ExtendError> {
        self.extend(
            &unpack(query),
            &unpack(database),
            SeedFrame::Absolute { q_start, d_start },
        )
    }

    /// Extends a sliced window in the window frame.
    ///
    /// # Errors
    ///
    /// As for [`SeedExtender::extend`].
    pub fn extend_window(&self, window: &SeedWindow) -> Result<Alignment, ExtendError> {
        self.extend(&unpack(window.query), &unpack(window.database), window.frame())
    }

    /// Score contribution of one aligned symbol pair.
    const fn pair(&self, a: u8, b: u8) -> i32 {
        if a == b {
            self.params.match_score
        } else {
            0i32.saturating_sub(self.params.mismatch_penalty)
        }
    }

    /// Runs the extension loop.
    ///
    /// `limits` are the exclusive right bounds of query and database; both
    /// left bounds are 0. `seeds` are the starting pointers.
    fn run(
        &self,
        query: &[u8],
        database: &[u8],
        limits: (usize, usize),
        seeds: (usize, usize),
        initial: Best,
    ) -> Result<Best, ExtendError> {
        let (q_lim, d_lim) = (limits.0 as isize, limits.1 as isize);
        let (mut q_l, mut d_l) = (seeds.0 as isize, seeds.1 as isize);
        let (mut q_r, mut d_r) = (q_l - 1, d_l - 1);
        let mut score: i32 = 0;
        let mut best = initial;

        loop {
            let mut extended = false;

            if q_r + 1 < q_lim && d_r + 1 < d_lim {
                q_r += 1;
                d_r += 1;
                let step = self.pair(query[q_r as usize], database[d_r as usize]);
                score = score.saturating_add(step);
                extended = true;
            }

            if q_l > 0 && d_l > 0 {
                q_l -= 1;
                d_l -= 1;
                let step = self.pair(query[q_l as usize], database[d_l as usize]);
                score = score.saturating_add(step);
                extended = true;
            }

            if !extended {
                break;
            }

            if score >= best.score {
                best = Best {
                    score,
                    q_l,
                    q_r,
                    d_l,
                    d_r,
                };
            }

            if best.score.saturating_sub(score) > self.params.threshold {
                break;
            }
        }

        let query_span = best.q_r - best.q_l;
        let database_span = best.d_r - best.d_l;
        if query_span != database_span {
            warn!(query_span, database_span, "asymmetric extension window");
            return Err(ExtendError::AsymmetricSpan {
                query_span,
                database_span,
            });
        }
        Ok(best)
    }
}

/// A seed may sit one past the last symbol, where only the left side extends.
fn check_seed(seed: usize, len: usize) -> Result<(), ExtendError> {
    if seed > len {
        warn!(seed, len, "seed out of range");
        Err(ExtendError::SeedOutOfRange { seed, len })
    } else {
        Ok(())
    }
}
