//! Choosing which account or credit card money comes from or goes to.

mod core;
mod picker;
mod ranking;
mod selector;

pub use core::{
    FundingSource, FundingSourceId, FundingSourceKind, MAX_NAME_LENGTH, MIN_NAME_LENGTH, Timestamp,
    combine_sources, validate_name,
};
pub use picker::{
    FUNDING_SOURCE_PICKER_ID, PickerPurpose, build_selector, candidate_sources,
    funding_source_picker_view, get_funding_source_picker, get_ranked_funding_sources,
    load_funding_sources,
};
pub use ranking::{normalize_threshold, rank};
pub use selector::FundingSourceSelector;
