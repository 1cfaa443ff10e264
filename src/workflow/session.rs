//! 会话状态机 - 流程层
//!
//! 核心职责：把整个会话收敛到一个显式状态容器里
//!
//! 状态转换全部是 (状态, 事件) → 新状态 的纯函数，不在 UI 回调里
//! 零散地改状态。每个状态只携带自己合法的数据：Review 必然有方案，
//! Idle 必然没有。
//!
//! 转换图：
//! 1. Idle → Planning（提交非空主题）
//! 2. Planning → Review（方案生成成功）/ Planning → Idle（失败，保留错误文案）
//! 3. Review → Generating（批准）/ Review → Idle（取消）
//! 4. Generating → Finished（所有章节都已尝试，成功或兜底）

use tracing::debug;

use crate::models::{BookPlan, ChapterContent, CoverImage};

/// 章节生成失败时写入的固定兜底文案
pub const CHAPTER_FALLBACK_TEXT: &str = "Erro ao gerar este capítulo. Tente novamente.";

/// 会话阶段
///
/// 每个变体只携带该阶段合法的数据
#[derive(Debug, Clone)]
pub enum SessionState {
    /// 落地页，可能带上一次失败的错误文案
    Idle { error: Option<String> },
    /// 方案生成中
    Planning { topic: String },
    /// 方案评审
    Review { plan: BookPlan },
    /// 逐章生成中
    Generating {
        plan: BookPlan,
        chapters: Vec<ChapterContent>,
    },
    /// 全部章节已完成
    Finished {
        plan: BookPlan,
        chapters: Vec<ChapterContent>,
    },
}

/// 会话事件
#[derive(Debug, Clone)]
pub enum SessionEvent {
    /// 用户提交了非空主题
    TopicSubmitted { topic: String },
    /// 方案生成成功
    PlanReady(BookPlan),
    /// 方案生成失败，携带展示用的错误文案
    PlanFailed(String),
    /// 用户取消评审
    Cancelled,
    /// 用户批准方案，开始生成
    Approved,
    /// 单章生成结束（成功正文或失败文案）
    ChapterFinished {
        index: usize,
        result: Result<String, String>,
    },
    /// 顺序循环跑完了所有章节
    AllChaptersDone,
    /// 开始新项目
    Reset,
}

/// 当前查看的内容
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChapterView {
    /// 封面与简介
    Cover,
    /// 某一章（从 0 开始）
    Chapter(usize),
}

/// 会话
///
/// 持有状态机、封面图和当前查看位置。封面独立于章节状态，
/// 什么时候到就什么时候挂上，缺失是合法的"加载中"
pub struct Session {
    state: SessionState,
    cover: Option<CoverImage>,
    current_view: ChapterView,
}

impl Session {
    /// 创建新会话（落地页）
    pub fn new() -> Self {
        Self {
            state: SessionState::Idle { error: None },
            cover: None,
            current_view: ChapterView::Cover,
        }
    }

    /// 应用一个事件，推进状态机
    pub fn apply(&mut self, event: SessionEvent) {
        // 批准和重置会连带清掉上一本书的封面和查看位置
        match &event {
            SessionEvent::Approved | SessionEvent::Reset => {
                self.cover = None;
                self.current_view = ChapterView::Cover;
            }
            _ => {}
        }

        let state = std::mem::replace(&mut self.state, SessionState::Idle { error: None });
        self.state = transition(state, event);
    }

    /// 当前状态
    pub fn state(&self) -> &SessionState {
        &self.state
    }

    /// 当前方案（Review / Generating / Finished 阶段）
    pub fn plan(&self) -> Option<&BookPlan> {
        match &self.state {
            SessionState::Review { plan }
            | SessionState::Generating { plan, .. }
            | SessionState::Finished { plan, .. } => Some(plan),
            _ => None,
        }
    }

    /// 章节记录（Generating / Finished 阶段）
    pub fn chapters(&self) -> Option<&[ChapterContent]> {
        match &self.state {
            SessionState::Generating { chapters, .. }
            | SessionState::Finished { chapters, .. } => Some(chapters),
            _ => None,
        }
    }

    /// 生成进度 (已完成, 总数)
    ///
    /// 分母取方案的实际章节数
    pub fn progress(&self) -> Option<(usize, usize)> {
        let chapters = self.chapters()?;
        let completed = chapters.iter().filter(|c| c.is_complete).count();
        Some((completed, chapters.len()))
    }

    pub fn is_finished(&self) -> bool {
        matches!(self.state, SessionState::Finished { .. })
    }

    /// 挂上封面图
    pub fn set_cover(&mut self, cover: CoverImage) {
        self.cover = Some(cover);
    }

    pub fn cover(&self) -> Option<&CoverImage> {
        self.cover.as_ref()
    }

    /// 当前查看位置
    pub fn current_view(&self) -> ChapterView {
        self.current_view
    }

    /// 切换查看位置
    ///
    /// 只有已完成或正在生成的章节可以查看；还没轮到的章节一律拒绝，
    /// 查看位置不变。返回是否切换成功。
    pub fn select_view(&mut self, view: ChapterView) -> bool {
        let Some(chapters) = self.chapters() else {
            return false;
        };

        let allowed = match view {
            ChapterView::Cover => true,
            ChapterView::Chapter(index) => chapters
                .get(index)
                .map(|c| c.is_complete || c.is_generating)
                .unwrap_or(false),
        };

        if allowed {
            self.current_view = view;
        } else {
            debug!("拒绝切换到未就绪的章节: {:?}", view);
        }

        allowed
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

/// 纯函数状态转换
///
/// 非法的 (状态, 事件) 组合不改变状态
pub fn transition(state: SessionState, event: SessionEvent) -> SessionState {
    match (state, event) {
        (SessionState::Idle { .. }, SessionEvent::TopicSubmitted { topic })
            if !topic.trim().is_empty() =>
        {
            SessionState::Planning { topic }
        }

        (SessionState::Planning { .. }, SessionEvent::PlanReady(plan)) => {
            SessionState::Review { plan }
        }

        (SessionState::Planning { .. }, SessionEvent::PlanFailed(message)) => SessionState::Idle {
            error: Some(message),
        },

        (SessionState::Review { .. }, SessionEvent::Cancelled) => SessionState::Idle { error: None },

        (SessionState::Review { plan }, SessionEvent::Approved) => {
            // 批量创建全部章节记录：generating=true, complete=false, 正文为空
            let chapters = plan
                .chapters
                .iter()
                .enumerate()
                .map(|(i, outline)| ChapterContent::pending(i, &outline.title))
                .collect();
            SessionState::Generating { plan, chapters }
        }

        (
            SessionState::Generating { plan, mut chapters },
            SessionEvent::ChapterFinished { index, result },
        ) => {
            // 按索引读-改-写，不触碰其他条目；每个索引只终结一次
            if let Some(entry) = chapters
                .iter_mut()
                .find(|c| c.index == index && !c.is_complete)
            {
                entry.finish(result.unwrap_or_else(|_| CHAPTER_FALLBACK_TEXT.to_string()));
            }
            SessionState::Generating { plan, chapters }
        }

        (SessionState::Generating { plan, chapters }, SessionEvent::AllChaptersDone) => {
            // 只有每个索引都终结后才能进入 Finished
            if chapters.iter().all(|c| c.is_complete) {
                SessionState::Finished { plan, chapters }
            } else {
                SessionState::Generating { plan, chapters }
            }
        }

        (_, SessionEvent::Reset) => SessionState::Idle { error: None },

        (state, event) => {
            debug!("忽略非法状态转换: {:?}", event_name(&event));
            state
        }
    }
}

fn event_name(event: &SessionEvent) -> &'static str {
    match event {
        SessionEvent::TopicSubmitted { .. } => "TopicSubmitted",
        SessionEvent::PlanReady(_) => "PlanReady",
        SessionEvent::PlanFailed(_) => "PlanFailed",
        SessionEvent::Cancelled => "Cancelled",
        SessionEvent::Approved => "Approved",
        SessionEvent::ChapterFinished { .. } => "ChapterFinished",
        SessionEvent::AllChaptersDone => "AllChaptersDone",
        SessionEvent::Reset => "Reset",
    }
}
