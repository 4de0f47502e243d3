use std::path::{Path, PathBuf};

use anyhow::Result;
use clap::{Parser, Subcommand};
use mcq_paper::config::Config;
use mcq_paper::error::{AppError, AppResult, BankError, PaperError};
use mcq_paper::extraction::{validate, ParsePolicy};
use mcq_paper::models::loaders::load_structured_file;
use mcq_paper::models::{
    load_paper_request, Difficulty, MetaOverrides, PaperHeader, PaperRequest, QuestionRecord, Selection,
};
use mcq_paper::orchestrator::{import_outcome, process_file, App};
use mcq_paper::services::{
    bank_stats, export_bank, paper_builder, render_bank_listing, ExportFormat, JsonQuestionBank, QuestionPatch,
    QuestionRepository,
};
use mcq_paper::utils::logging;
use mcq_paper::workflow::{ExtractionFlow, FileCtx};

/// 选择题抽取与组卷工具
#[derive(Parser)]
#[command(name = "mcq_paper", version, about)]
struct Cli {
    /// 显示详细日志
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// 从单个 PDF / TXT 文件抽取题目
    Extract {
        file: PathBuf,
        #[arg(long)]
        subject: Option<String>,
        #[arg(long)]
        chapter: Option<String>,
        #[arg(long)]
        difficulty: Option<Difficulty>,
        /// line | block
        #[arg(long)]
        policy: Option<ParsePolicy>,
        /// 抽取后导入题库
        #[arg(long)]
        import: bool,
        /// 以 JSON 输出抽取结果
        #[arg(long)]
        json: bool,
    },
    /// 批量抽取文件夹中的全部文件并导入题库
    Batch {
        #[arg(long)]
        folder: Option<String>,
    },
    /// 题库管理
    Bank {
        #[command(subcommand)]
        action: BankAction,
    },
    /// 从题库组卷，生成试卷与答案解析
    Paper {
        #[arg(long)]
        college: Option<String>,
        #[arg(long)]
        exam: Option<String>,
        #[arg(long)]
        date: Option<String>,
        /// 题库ID，逗号分隔
        #[arg(long, value_delimiter = ',', conflicts_with = "random")]
        ids: Vec<u32>,
        /// 随机抽取的题目数量
        #[arg(long)]
        random: Option<usize>,
        /// TOML 组卷请求文件，命令行参数优先
        #[arg(long)]
        request: Option<PathBuf>,
        /// 输出目录，默认取配置
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum BankAction {
    /// 列出题目
    List {
        #[arg(long)]
        subject: Option<String>,
    },
    /// 从 JSON / TOML 文件录入一道题目
    Add { file: PathBuf },
    /// 用 JSON / TOML 文件中的字段修改题目
    Update { id: u32, file: PathBuf },
    /// 删除题目
    Delete { id: u32 },
    /// 按科目和难度统计
    Stats {
        /// 以 JSON 输出
        #[arg(long)]
        json: bool,
    },
    /// 导出题库
    Export {
        path: PathBuf,
        /// txt | csv | json
        #[arg(long, default_value_t = ExportFormat::Txt)]
        format: ExportFormat,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // 加载配置
    let mut config = Config::try_from_env()?;
    config.verbose_logging |= cli.verbose;

    // 初始化日志
    logging::init(config.verbose_logging);

    match cli.command {
        Command::Extract {
            file,
            subject,
            chapter,
            difficulty,
            policy,
            import,
            json,
        } => {
            let overrides = MetaOverrides {
                subject,
                chapter,
                difficulty,
            };
            Ok(run_extract(&config, file, overrides, policy, import, json)?)
        }
        Command::Batch { folder } => {
            if let Some(folder) = folder {
                config.source_folder = folder;
            }
            let stats = App::initialize(config).await?.run().await?;
            println!("{}", serde_json::to_string_pretty(&stats)?);
            Ok(())
        }
        Command::Bank { action } => Ok(run_bank(&config, action)?),
        Command::Paper {
            college,
            exam,
            date,
            ids,
            random,
            request,
            output,
        } => {
            let mut paper_request = match request {
                Some(path) => load_paper_request(&path).await?,
                None => PaperRequest::default(),
            };
            if let Some(college) = college {
                paper_request.college = college;
            }
            if let Some(exam) = exam {
                paper_request.exam = exam;
            }
            if date.is_some() {
                paper_request.date = date;
            }
            if !ids.is_empty() {
                paper_request.ids = ids;
                paper_request.random = None;
            }
            if random.is_some() {
                paper_request.random = random;
            }

            let output_dir = output.unwrap_or_else(|| PathBuf::from(&config.output_dir));
            Ok(run_paper(&config, &paper_request, &output_dir)?)
        }
    }
}

fn run_extract(
    config: &Config,
    file: PathBuf,
    overrides: MetaOverrides,
    policy: Option<ParsePolicy>,
    import: bool,
    json: bool,
) -> AppResult<()> {
    let flow = ExtractionFlow::new(config).with_policy(policy.unwrap_or(config.parse_policy));
    let ctx = FileCtx::new(1, file).with_overrides(overrides);
    let outcome = process_file(&flow, &ctx)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&outcome.result)?);
    } else {
        let records: Vec<_> = outcome.result.records.iter().collect();
        println!("{}", render_bank_listing(&records));
        println!("{}", outcome.result.message());
    }

    if import {
        let mut bank = JsonQuestionBank::open(&config.bank_file)?;
        let stats = import_outcome(&mut bank, &outcome, config.import_valid_only)?;
        println!("已导入 {} 道题目: {:?}", stats.imported(), stats.ids);
    }

    Ok(())
}

fn run_bank(config: &Config, action: BankAction) -> AppResult<()> {
    let mut bank = JsonQuestionBank::open(&config.bank_file)?;

    match action {
        BankAction::List { subject } => {
            let questions = match subject.as_deref() {
                Some(subject) => bank.by_subject(subject),
                None => bank.all(),
            };
            println!("{}", render_bank_listing(&questions));
            println!("共 {} 道题目", questions.len());
        }
        BankAction::Add { file } => {
            let mut question: QuestionRecord = load_structured_file(&file)?;
            if question.meta.is_none() {
                question.meta = Some(config.default_meta());
            }
            for issue in validate(&question).issues {
                tracing::warn!("⚠️ {}: {}", file.display(), issue);
            }
            let id = bank.add(question)?;
            println!("已录入题目 {}", id);
        }
        BankAction::Update { id, file } => {
            let patch = QuestionPatch::from_file(&file)?;
            if !bank.update(id, patch)? {
                return Err(BankError::UnknownId { id }.into());
            }
            println!("已修改题目 {}", id);
        }
        BankAction::Delete { id } => {
            if !bank.delete(id)? {
                return Err(BankError::UnknownId { id }.into());
            }
            println!("已删除题目 {}", id);
        }
        BankAction::Stats { json } => {
            let stats = bank_stats(&bank, &config.default_meta());
            if json {
                println!("{}", serde_json::to_string_pretty(&stats)?);
            } else {
                print!("{}", stats);
            }
        }
        BankAction::Export { path, format } => {
            let count = export_bank(&bank, &path, format)?;
            println!("已导出 {} 道题目: {}", count, path.display());
        }
    }

    Ok(())
}

fn run_paper(config: &Config, request: &PaperRequest, output_dir: &Path) -> AppResult<()> {
    let header: PaperHeader = request.header();
    if header.college.is_empty() {
        return Err(PaperError::MissingCollege.into());
    }
    if header.exam.is_empty() {
        return Err(PaperError::MissingExam.into());
    }

    let bank = JsonQuestionBank::open(&config.bank_file)?;
    let selection = request.selection();
    if let Selection::Ids(ids) = &selection {
        if ids.is_empty() {
            return Err(AppError::other("请通过 --ids 或 --random 指定题目"));
        }
    }

    let questions = paper_builder::select(&bank, &selection)?;
    let files = paper_builder::write_paper(output_dir, &header, &questions, chrono::Local::now())?;

    println!("试卷: {}", files.question_paper.display());
    println!("答案: {}", files.answer_key.display());
    Ok(())
}
