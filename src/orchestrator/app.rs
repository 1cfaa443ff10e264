//! 应用主循环 - 编排层
//!
//! 读取用户输入 → 转成会话事件 → 按状态分发视图。
//! 生成阶段由 BookFlow 驱动：封面任务先起跑，章节循环逐章推进。

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader, Lines, Stdin};
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::models::CoverImage;
use crate::render::{printer, views};
use crate::services::PlanService;
use crate::workflow::{BookFlow, ChapterView, Session, SessionEvent, SessionState};

/// 应用主结构
pub struct App {
    config: Config,
    plan_service: PlanService,
    flow: BookFlow,
}

impl App {
    /// 初始化应用
    pub async fn initialize(config: Config) -> Result<Self> {
        log_startup(&config);

        if config.gemini_api_key.is_empty() {
            warn!("⚠️ GEMINI_API_KEY 未设置，网关调用将会失败");
        }

        Ok(Self {
            plan_service: PlanService::new(&config),
            flow: BookFlow::new(&config),
            config,
        })
    }

    /// 运行应用主逻辑
    pub async fn run(&self) -> Result<()> {
        let mut lines = BufReader::new(tokio::io::stdin()).lines();
        let mut session = Session::new();
        // 封面任务句柄：与章节循环并行，结果什么时候到就什么时候挂上
        let mut cover_handle: Option<JoinHandle<Option<CoverImage>>> = None;

        loop {
            match session.state() {
                SessionState::Idle { error } => {
                    views::render_landing(error.as_deref());

                    let Some(line) = read_line(&mut lines).await? else {
                        break;
                    };
                    let topic = line.trim().to_string();
                    if topic.is_empty() {
                        break;
                    }

                    session.apply(SessionEvent::TopicSubmitted { topic });
                }

                SessionState::Planning { topic } => {
                    let topic = topic.clone();
                    views::render_planning(&topic);

                    match self.plan_service.generate_plan(&topic).await {
                        Ok(plan) => {
                            info!(
                                "✓ 方案生成成功: {} ({} 章)",
                                plan.title,
                                plan.chapter_count()
                            );
                            session.apply(SessionEvent::PlanReady(plan));
                        }
                        Err(e) => {
                            error!("❌ 方案生成失败: {}", e);
                            session.apply(SessionEvent::PlanFailed(e.to_string()));
                        }
                    }
                }

                SessionState::Review { plan } => {
                    views::render_review(plan);

                    let Some(line) = read_line(&mut lines).await? else {
                        break;
                    };
                    match line.trim() {
                        "a" | "A" => session.apply(SessionEvent::Approved),
                        "c" | "C" => session.apply(SessionEvent::Cancelled),
                        _ => {} // 重新显示评审视图
                    }
                }

                SessionState::Generating { plan, .. } => {
                    let visual_prompt = plan.cover_visual_prompt.clone();

                    // 封面与章节同时起跑；封面永远不会阻塞章节进度
                    cover_handle = Some(self.flow.spawn_cover(&visual_prompt));

                    let handle = &mut cover_handle;
                    self.flow
                        .generate_chapters(&mut session, |s| {
                            BookFlow::poll_cover(s, handle);
                            views::render_progress(s);
                        })
                        .await;
                }

                SessionState::Finished { .. } => {
                    // 迟到的封面结果在阅读循环里随手挂上
                    BookFlow::poll_cover(&mut session, &mut cover_handle);

                    let total = session
                        .chapters()
                        .map(|c| c.len())
                        .unwrap_or_default();

                    views::render_current_view(&session);
                    views::render_finished_menu(total);

                    let Some(line) = read_line(&mut lines).await? else {
                        break;
                    };
                    let input = line.trim().to_string();

                    match input.as_str() {
                        "s" | "S" => break,
                        "n" | "N" => {
                            // 重开会话；在途的封面调用不会被取消，只是结果不再被应用
                            cover_handle = None;
                            session.apply(SessionEvent::Reset);
                        }
                        "e" | "E" => self.export(&session),
                        _ => self.navigate(&mut session, &input),
                    }
                }
            }
        }

        info!("👋 会话结束");
        Ok(())
    }

    /// 导出整本书
    fn export(&self, session: &Session) {
        let (Some(plan), Some(chapters)) = (session.plan(), session.chapters()) else {
            return;
        };

        match printer::export_book(
            plan,
            chapters,
            session.cover(),
            &self.config.export_html_file,
        ) {
            Ok(()) => println!(
                "📄 Livro exportado para {} — abra no navegador e imprima.",
                self.config.export_html_file
            ),
            Err(e) => error!("❌ 导出失败: {}", e),
        }
    }

    /// 解析导航输入并切换查看位置
    ///
    /// 未就绪的章节会被会话拒绝，查看位置不变
    fn navigate(&self, session: &mut Session, input: &str) {
        let Ok(number) = input.parse::<usize>() else {
            return;
        };

        let view = if number == 0 {
            ChapterView::Cover
        } else {
            ChapterView::Chapter(number - 1)
        };

        if !session.select_view(view) {
            println!("⚠️ Capítulo {} ainda não disponível.", number);
        }
    }
}

/// 读取一行用户输入（EOF 返回 None）
async fn read_line(lines: &mut Lines<BufReader<Stdin>>) -> Result<Option<String>> {
    Ok(lines.next_line().await?)
}

// ========== 日志辅助函数 ==========

fn log_startup(config: &Config) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - AI 电子书生成模式");
    info!(
        "📊 文本模型: {} / 图片模型: {}",
        config.text_model_name, config.image_model_name
    );
    info!("{}", "=".repeat(60));
}
