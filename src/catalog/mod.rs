pub mod matcher;
pub mod normalize;
pub mod record;
pub mod store;

pub use self::{
    matcher::{matches, matches_any, Matcher},
    normalize::normalize,
    record::{Record, RecordBuilder, TextField, VoiceLink},
    store::RecordStore,
};
