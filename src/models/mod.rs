pub mod loaders;
pub mod metadata;
pub mod paper;
pub mod question;

pub use loaders::{load_paper_request, load_source_metadata, scan_source_files};
pub use metadata::{Difficulty, MetaOverrides, QuestionMeta};
pub use paper::{PaperHeader, PaperRequest, Selection};
pub use question::{OptionLabel, QuestionDraft, QuestionRecord, FALLBACK_EXPLANATION, NO_EXPLANATION};
