pub mod toml_loader;

pub use toml_loader::{load_paper_request, load_source_metadata, load_structured_file, scan_source_files, sidecar_path};
