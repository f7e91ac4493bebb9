pub mod group;
pub mod match_view;
pub mod raw_match;
pub mod status;
pub mod wire;
