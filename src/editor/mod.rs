//! Element bookkeeping for the editor
//!
//! This module holds the published set of detected elements, the interval
//! index used to query it, and the scheduling of background re-parses.

mod range_index;
mod store;

pub use range_index::RangeIndex;
pub use store::{
    parse_snapshot, EditOutcome, ElementSet, ElementStore, ParseState, TextEdit,
};
