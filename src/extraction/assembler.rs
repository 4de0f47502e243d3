//! 题目组装状态机
//!
//! 状态只有两个：`Idle`（没有打开的题目）和 `Open`（正在填充字段）。
//!
//! | 行类别 | Idle | Open |
//! |---|---|---|
//! | 题号行 | 打开新题 | 定稿当前题，再打开新题 |
//! | 选项行 | 忽略 | `options[label] = text`，后写覆盖前写 |
//! | 答案行 | 忽略 | 覆盖答案 |
//! | 解析行 | 忽略 | 覆盖解析 |
//! | 续行 | 忽略 | 忽略（多行题干、折行选项不合并） |
//!
//! 定稿（flush）时没有任何选项的题目直接丢弃；ID 按输出顺序从 1 递增，
//! 与原文中的题号无关。

use tracing::trace;

use crate::extraction::classifier::LineKind;
use crate::models::{QuestionDraft, QuestionRecord};

#[derive(Debug, Default)]
enum AssemblerState {
    #[default]
    Idle,
    Open(QuestionDraft),
}

/// 组装结果
#[derive(Debug, Default)]
pub struct AssemblyOutput {
    pub records: Vec<QuestionRecord>,
    /// 因为没有选项而被丢弃的题目数
    pub discarded: usize,
}

/// 逐行组装题目
#[derive(Debug, Default)]
pub struct QuestionAssembler {
    state: AssemblerState,
    records: Vec<QuestionRecord>,
    discarded: usize,
}

impl QuestionAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// 是否有打开的题目
    pub fn is_open(&self) -> bool {
        matches!(self.state, AssemblerState::Open(_))
    }

    /// 已定稿的题目数
    pub fn emitted(&self) -> usize {
        self.records.len()
    }

    /// 输入一行
    pub fn feed(&mut self, kind: LineKind<'_>) {
        if let LineKind::QuestionStart { number, text } = kind {
            self.flush();
            trace!("打开题目 (原题号 {}): {}", number, text);
            self.state = AssemblerState::Open(QuestionDraft::new(text));
            return;
        }

        let AssemblerState::Open(draft) = &mut self.state else {
            trace!("没有打开的题目，忽略 {} 行", kind.name());
            return;
        };

        match kind {
            LineKind::Option { label, text } => {
                draft.options.insert(label, text.to_string());
            }
            LineKind::AnswerMarker { label } => {
                draft.correct_answer = Some(label);
            }
            LineKind::ExplanationMarker { text } => {
                draft.explanation = Some(text.to_string());
            }
            LineKind::Continuation { .. } | LineKind::QuestionStart { .. } => {}
        }
    }

    /// 输入结束，定稿最后一道题
    pub fn finish(mut self) -> AssemblyOutput {
        self.flush();
        AssemblyOutput {
            records: self.records,
            discarded: self.discarded,
        }
    }

    fn flush(&mut self) {
        if let AssemblerState::Open(draft) = std::mem::take(&mut self.state) {
            if draft.has_options() {
                let id = self.records.len() as u32 + 1;
                self.records.push(draft.into_record(id));
            } else {
                trace!("题目没有任何选项，丢弃: {}", draft.question_text);
                self.discarded += 1;
            }
        }
    }
}

/// 组装一串已分类的行
pub fn assemble<'a>(kinds: impl IntoIterator<Item = LineKind<'a>>) -> AssemblyOutput {
    let mut assembler = QuestionAssembler::new();
    for kind in kinds {
        assembler.feed(kind);
    }
    assembler.finish()
}
