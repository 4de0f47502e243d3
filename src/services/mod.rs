pub mod paper_builder;
pub mod pdf_reader;
pub mod question_bank;
pub mod warn_writer;

pub use paper_builder::{render_answer_key, render_question_paper, select, select_by_ids, select_random, write_paper, PaperFiles};
pub use pdf_reader::{reader_for, DocumentSummary, LopdfReader, PageReader, PlainTextReader};
pub use question_bank::{
    bank_stats, export_bank, export_txt, render_bank_listing, BankState, BankStats, ExportFormat, IdCheck,
    InMemoryQuestionBank, JsonQuestionBank, QuestionPatch, QuestionRepository,
};
pub use warn_writer::WarnWriter;
