//! Segmentation engine for electrochemical cycler time series.
//!
//! This crate contains:
//! - Record/Series: the canonical per-row schema every import normalizes into
//! - Regime classification and segment building over an immutable series
//! - Query parsing: request strings like `"cc 1.67A"` or `"cv, rest"`
//! - Chain resolution, rest adjacency and elapsed-time re-zeroing

mod adjacency;
mod builder;
mod chain;
mod condition;
mod config;
mod error;
mod normalize;
pub mod query;
mod record;
pub mod regime;
mod segment;
mod segmenter;

pub use adjacency::{RestNeighbors, extend_with_rest, find_rest, rest_neighbors};
pub use builder::build;
pub use chain::{ChainMatch, ChainOrder, resolve};
pub use condition::{Condition, Interval};
pub use config::{SegmentConfig, Tolerance};
pub use error::SegmentError;
pub use normalize::{ResetTime, SegmentTable};
pub use query::parse;
pub use record::{Record, Series, SeriesSummary};
pub use regime::{Polarity, Quantity, Regime, UnknownRegime, classify_row};
pub use segment::{Segment, SegmentCollection};
pub use segmenter::{RequestOutcome, Segmenter};
