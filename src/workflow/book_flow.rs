//! 生成流程 - 流程层
//!
//! 核心职责：驱动"一本书"的完整生成
//!
//! 两条独立轨道，只在展示层汇合：
//! 1. 封面任务：批准后立刻 spawn，fire-and-forget，失败只记日志
//! 2. 章节循环：严格按索引升序逐章 await，单章失败写入兜底文案后继续
//!
//! 不支持取消：生成一旦开始，在途的网关调用不会被中断

use futures::future::FutureExt;
use std::future::Future;
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::models::{ChapterOutline, CoverImage};
use crate::services::{ChapterService, CoverService};
use crate::workflow::session::{Session, SessionEvent, SessionState};

/// 生成流程
///
/// - 编排封面任务和章节顺序循环
/// - 不持有会话，所有结果通过事件写回调用方的 `Session`
/// - 只依赖业务能力（services）
pub struct BookFlow {
    chapter_service: ChapterService,
    cover_service: CoverService,
    verbose_logging: bool,
}

impl BookFlow {
    /// 创建新的生成流程
    pub fn new(config: &Config) -> Self {
        Self {
            chapter_service: ChapterService::new(config),
            cover_service: CoverService::new(config),
            verbose_logging: config.verbose_logging,
        }
    }

    /// 启动封面生成任务
    ///
    /// 与章节循环同时起跑，但结果什么时候到都不影响章节进度。
    /// 失败只记日志，封面在展示层保持"加载中"。
    pub fn spawn_cover(&self, visual_prompt: &str) -> JoinHandle<Option<CoverImage>> {
        let service = self.cover_service.clone();
        let prompt = visual_prompt.to_string();

        info!("🎨 封面生成任务已启动");

        tokio::spawn(async move {
            match service.generate_cover(&prompt).await {
                Ok(cover) => {
                    info!("🎨 ✓ 封面生成完成 ({} 字节)", cover.bytes.len());
                    Some(cover)
                }
                Err(e) => {
                    warn!("🎨 ⚠️ 封面生成失败（不影响章节生成）: {}", e);
                    None
                }
            }
        })
    }

    /// 如果封面任务已经结束，把结果挂到会话上
    ///
    /// 非阻塞轮询，在章节间隙和阅读循环里随手调用
    pub fn poll_cover(
        session: &mut Session,
        handle: &mut Option<JoinHandle<Option<CoverImage>>>,
    ) {
        let Some(join_handle) = handle else {
            return;
        };

        let Some(joined) = join_handle.now_or_never() else {
            return;
        };
        *handle = None;

        match joined {
            Ok(Some(cover)) => session.set_cover(cover),
            Ok(None) => {} // 失败已经在任务内部记过日志
            Err(e) => error!("封面任务执行失败: {}", e),
        }
    }

    /// 顺序生成全部章节
    ///
    /// 每章 await 到底（成功或兜底）才开始下一章，保证完成顺序
    /// 严格按索引升序。循环结束后把会话推进到 Finished。
    ///
    /// # 参数
    /// - `session`: 必须处于 Generating 阶段
    /// - `after_each`: 每章终结后的回调（刷新进度、轮询封面）
    pub async fn generate_chapters<R>(&self, session: &mut Session, mut after_each: R)
    where
        R: FnMut(&mut Session),
    {
        let SessionState::Generating { plan, .. } = session.state() else {
            warn!("generate_chapters 需要 Generating 阶段的会话");
            return;
        };

        let book_title = plan.title.clone();
        let outlines = plan.chapters.clone();
        let service = self.chapter_service.clone();
        let verbose = self.verbose_logging;

        run_chapter_loop(
            session,
            outlines,
            move |index, outline| {
                let service = service.clone();
                let book_title = book_title.clone();
                async move {
                    let content = service
                        .generate_chapter(&book_title, &outline, index)
                        .await
                        .map_err(|e| e.to_string())?;
                    if verbose {
                        debug!(
                            "第 {} 章正文预览: {}",
                            index + 1,
                            crate::utils::logging::truncate_text(&content, 80)
                        );
                    }
                    Ok(content)
                }
            },
            &mut after_each,
        )
        .await;
    }
}

/// 顺序章节循环
///
/// 与具体的网关调用解耦：`generate` 是任意 "(索引, 大纲) → 正文" 的
/// 异步函数，便于用桩函数验证顺序性和兜底行为。
///
/// 保证：
/// - 章节按索引 0..n 严格顺序终结，绝不并行
/// - 单章失败被当场吞掉，写入兜底文案，循环继续
/// - 循环结束后无条件发出 AllChaptersDone
pub async fn run_chapter_loop<F, Fut, R>(
    session: &mut Session,
    outlines: Vec<ChapterOutline>,
    mut generate: F,
    after_each: &mut R,
) where
    F: FnMut(usize, ChapterOutline) -> Fut,
    Fut: Future<Output = Result<String, String>>,
    R: FnMut(&mut Session),
{
    let total = outlines.len();

    for (index, outline) in outlines.into_iter().enumerate() {
        info!("✍️ 正在生成第 {}/{} 章: {}", index + 1, total, outline.title);

        let result = generate(index, outline).await;

        match &result {
            Ok(_) => info!("✓ 第 {}/{} 章生成完成", index + 1, total),
            Err(e) => error!("❌ 第 {}/{} 章生成失败，写入兜底文案: {}", index + 1, total, e),
        }

        session.apply(SessionEvent::ChapterFinished { index, result });
        after_each(session);
    }

    session.apply(SessionEvent::AllChaptersDone);
    info!("📖 全部 {} 章已尝试完毕", total);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookPlan, ChapterOutline};
    use crate::workflow::session::{ChapterView, CHAPTER_FALLBACK_TEXT};
    use std::sync::{Arc, Mutex};

    fn test_plan(chapter_count: usize) -> BookPlan {
        BookPlan {
            title: "Dieta Low Carb Definitiva".to_string(),
            subtitle: "Emagreça com ciência".to_string(),
            sales_description: "O guia que vende.".to_string(),
            cover_visual_prompt: "Minimalist abstract shapes".to_string(),
            chapters: (0..chapter_count)
                .map(|i| ChapterOutline {
                    title: format!("Capítulo {}", i + 1),
                    outline: "- tópico".to_string(),
                })
                .collect(),
        }
    }

    fn generating_session(chapter_count: usize) -> Session {
        let mut session = Session::new();
        session.apply(SessionEvent::TopicSubmitted {
            topic: "Dieta Low Carb".to_string(),
        });
        session.apply(SessionEvent::PlanReady(test_plan(chapter_count)));
        session.apply(SessionEvent::Approved);
        session
    }

    #[tokio::test]
    async fn test_loop_completes_in_ascending_order() {
        let mut session = generating_session(10);
        let outlines = session.plan().unwrap().chapters.clone();

        let order = Arc::new(Mutex::new(Vec::new()));
        let order_in_gen = order.clone();

        run_chapter_loop(
            &mut session,
            outlines,
            move |index, _outline| {
                let order = order_in_gen.clone();
                async move {
                    order.lock().unwrap().push(index);
                    Ok(format!("texto {}", index))
                }
            },
            &mut |_| {},
        )
        .await;

        assert_eq!(*order.lock().unwrap(), (0..10).collect::<Vec<_>>());
        assert!(session.is_finished());
    }

    #[tokio::test]
    async fn test_loop_survives_single_chapter_failure() {
        let mut session = generating_session(10);
        let outlines = session.plan().unwrap().chapters.clone();

        run_chapter_loop(
            &mut session,
            outlines,
            |index, _outline| async move {
                if index == 3 {
                    Err("erro simulado".to_string())
                } else {
                    Ok(format!("texto {}", index))
                }
            },
            &mut |_| {},
        )
        .await;

        assert!(session.is_finished());
        let chapters = session.chapters().unwrap();
        assert_eq!(chapters[3].content, CHAPTER_FALLBACK_TEXT);
        assert!(chapters[3].is_complete);
        assert_eq!(chapters[4].content, "texto 4");
    }

    #[tokio::test]
    async fn test_after_each_sees_monotonic_progress() {
        let mut session = generating_session(10);
        let outlines = session.plan().unwrap().chapters.clone();

        let mut snapshots = Vec::new();

        run_chapter_loop(
            &mut session,
            outlines,
            |index, _outline| async move { Ok(format!("texto {}", index)) },
            &mut |s: &mut Session| {
                snapshots.push(s.progress().unwrap().0);
            },
        )
        .await;

        assert_eq!(snapshots, (1..=10).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_completed_chapters_viewable_while_generating() {
        let mut session = generating_session(10);
        let outlines = session.plan().unwrap().chapters.clone();

        let mut nav_checks = Vec::new();

        run_chapter_loop(
            &mut session,
            outlines,
            |index, _outline| async move { Ok(format!("texto {}", index)) },
            &mut |s: &mut Session| {
                let (completed, _) = s.progress().unwrap();
                // 刚完成的那章立刻可以查看
                nav_checks.push(s.select_view(ChapterView::Chapter(completed - 1)));
            },
        )
        .await;

        assert!(nav_checks.iter().all(|&ok| ok));
    }

    #[tokio::test]
    async fn test_poll_cover_applies_result_whenever_it_arrives() {
        let mut session = generating_session(10);

        let mut handle = Some(tokio::spawn(async {
            Some(CoverImage {
                bytes: vec![1, 2, 3],
                mime_type: "image/png".to_string(),
            })
        }));

        // 等任务结束后再轮询
        while handle.is_some() && session.cover().is_none() {
            tokio::task::yield_now().await;
            BookFlow::poll_cover(&mut session, &mut handle);
        }

        assert!(session.cover().is_some());
        assert!(handle.is_none());
    }

    #[tokio::test]
    async fn test_poll_cover_failure_keeps_loading_state() {
        let mut session = generating_session(10);

        let mut handle = Some(tokio::spawn(async { None::<CoverImage> }));

        while handle.is_some() {
            tokio::task::yield_now().await;
            BookFlow::poll_cover(&mut session, &mut handle);
        }

        // 失败不是错误状态，封面保持"加载中"（None）
        assert!(session.cover().is_none());
    }
}
