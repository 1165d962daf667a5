//! Match driver
//!
//! Recognition folds derivative and compaction over the input:
//!
//! ```text
//! g := compact(grammar)
//! for token in input: g := compact(D_token g)
//! accepted := nullable(g)
//! ```
//!
//! Between steps the driver reclaims the nodes earlier steps orphaned, see
//! [`crate::collect`].

use crate::grammar::{Grammar, NodeId};
use log::{debug, log_enabled, trace, Level};
use std::fmt;

/// Young-generation size that triggers the first collection
pub const DEFAULT_COLLECT_THRESHOLD: usize = 4096;

/// Knobs for the match driver.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchConfig {
    /// Collect orphaned nodes once this many have been allocated since the
    /// match started (`None` disables collection)
    pub collect_threshold: Option<usize>,

    /// Log the grammar size before and after every compaction at debug level
    pub trace_sizes: bool,
}

impl MatchConfig {
    pub fn new() -> Self {
        MatchConfig {
            collect_threshold: Some(DEFAULT_COLLECT_THRESHOLD),
            trace_sizes: false,
        }
    }

    pub fn with_collect_threshold(mut self, threshold: Option<usize>) -> Self {
        self.collect_threshold = threshold;
        self
    }

    pub fn with_trace_sizes(mut self, trace_sizes: bool) -> Self {
        self.trace_sizes = trace_sizes;
        self
    }
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of running the driver over a whole input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Match {
    /// Grammar of what may still follow the consumed input
    pub residual: NodeId,
    /// Whether the input as a whole is in the language
    pub accepted: bool,
}

impl<T: PartialEq + fmt::Debug> Grammar<T> {
    /// Recognize `tokens` against `start` with the default configuration.
    pub fn match_tokens<I>(&mut self, start: NodeId, tokens: I) -> Match
    where
        I: IntoIterator<Item = T>,
    {
        self.match_with(&MatchConfig::default(), start, tokens)
    }

    /// Recognize `tokens` against `start`.
    ///
    /// Nodes that existed before the call are never reclaimed, so `start`
    /// and any other id the caller holds stay valid. The returned residual
    /// is valid until the next collection.
    pub fn match_with<I>(&mut self, config: &MatchConfig, start: NodeId, tokens: I) -> Match
    where
        I: IntoIterator<Item = T>,
    {
        let watermark = self.node_count();
        let mut limit = config.collect_threshold;
        let trace_sizes = config.trace_sizes && log_enabled!(Level::Debug);

        let mut g = self.compact(start);
        if trace_sizes {
            debug!("start: {} nodes after compaction", self.size(g));
        }

        for (step, token) in tokens.into_iter().enumerate() {
            if g == self.null() {
                debug!("step {}: grammar is null, rejecting without reading further", step);
                break;
            }
            trace!("step {}: token {:?}", step, token);

            let derived = self.derivative(g, &token);
            if trace_sizes {
                let before = self.size(derived);
                g = self.compact(derived);
                debug!("step {}: {} nodes derived, {} after compaction", step, before, self.size(g));
            } else {
                g = self.compact(derived);
            }

            if let Some(threshold) = limit {
                if self.node_count() - watermark > threshold {
                    let mut roots = [g];
                    self.collect_garbage(watermark, &mut roots);
                    g = roots[0];
                    // a live graph bigger than the threshold would otherwise
                    // be collected after every step
                    limit = Some(threshold.max(2 * (self.node_count() - watermark)));
                }
            }
        }

        let accepted = self.nullable(g);
        debug!("match finished: accepted = {}", accepted);
        Match { residual: g, accepted }
    }
}

impl Grammar<char> {
    /// Recognize the characters of `input` against `start`.
    pub fn match_str(&mut self, start: NodeId, input: &str) -> Match {
        self.match_tokens(start, input.chars())
    }

    /// [`match_str`](Grammar::match_str) with an explicit configuration.
    pub fn match_str_with(&mut self, config: &MatchConfig, start: NodeId, input: &str) -> Match {
        self.match_with(config, start, input.chars())
    }
}
