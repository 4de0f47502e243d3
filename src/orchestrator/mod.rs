//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层负责批量处理和流程调度，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `batch_processor` - 批量文件处理器
//! - 管理应用生命周期（初始化、运行）
//! - 扫描源文件夹（Vec<PathBuf>）
//! - 控制并发数量（Semaphore + spawn_blocking）
//! - 持有题库，每批结束后按文件顺序导入
//! - 输出全局统计信息
//!
//! ### `file_processor` - 单个文件处理器
//! - 把一个文件交给 ExtractionFlow
//! - 把抽取结果导入题库
//! - 输出单个文件的统计信息
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<PathBuf>)
//!     ↓
//! file_processor (处理单个文件)
//!     ↓
//! workflow::ExtractionFlow (读取 → 抽取 → 元数据 → 警告)
//!     ↓
//! services (能力层：pdf_reader / question_bank / warn_writer)
//!     ↓
//! extraction (纯函数核心)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一职责**：batch_processor 管批量，file_processor 管单个
//! 2. **资源隔离**：只有编排层持有题库
//! 3. **向下依赖**：编排层 → workflow → services → extraction

pub mod batch_processor;
pub mod file_processor;

// 重新导出主要类型
pub use batch_processor::{App, ProcessingStats};
pub use file_processor::{import_outcome, process_file, ImportStats};
