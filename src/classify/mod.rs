mod record;
mod sections;

pub use record::HormoneRecord;
pub use sections::{categorize_text, HeaderSet, Segment};
