//! # MCQ Paper
//!
//! 从 PDF / 文本试卷中抽取选择题，存入题库，再组成新的试卷和答案解析
//!
//! ## 架构设计
//!
//! 本系统采用分层架构：
//!
//! ### ① 抽取核心（Extraction）
//! - `extraction/` - 纯函数：文本 → 行分类 → 状态机组装 → 校验
//! - 格式混乱的输入不会报错，只会产生续行或校验失败的题目
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `PageReader` - 逐页读取 PDF / TXT
//! - `QuestionRepository` - 题库存取
//! - `paper_builder` - 选题、生成试卷与答案
//! - `WarnWriter` - 写 warn.txt 能力
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一个文件"的完整处理流程
//! - `FileCtx` - 上下文封装（文件序号 + 路径 + 元数据）
//! - `ExtractionFlow` - 流程编排（读取 → 抽取 → 元数据 → 警告）
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/batch_processor` - 批量文件处理器，管理并发和题库
//! - `orchestrator/file_processor` - 单个文件处理器，导入题库
//!
//! ## 模块结构

pub mod config;
pub mod error;
pub mod extraction;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AppError, AppResult};
pub use extraction::{
    extract_from_pages, extract_questions, extract_with_policy, ExtractionResult, ExtractionSource, ExtractionStatus,
    ParsePolicy,
};
pub use models::{Difficulty, OptionLabel, QuestionMeta, QuestionRecord};
pub use orchestrator::{App, ProcessingStats};
pub use services::{InMemoryQuestionBank, JsonQuestionBank, QuestionRepository};
pub use workflow::{ExtractionFlow, FileCtx, FileOutcome, ProcessResult};
