//! 终端视图 - 展示层
//!
//! 每个视图都是当前会话状态的纯函数，只负责打印，不改状态。
//! 用户可见的内容是葡萄牙语（书籍的目标语言），诊断日志走 tracing。

use crate::models::{BookPlan, ChapterContent, CoverImage};
use crate::workflow::{ChapterView, Session};

const RULE_WIDTH: usize = 60;

/// 落地页视图
///
/// 显示欢迎语和上一次方案失败的错误（如果有）
pub fn render_landing(error: Option<&str>) {
    println!("\n{}", "=".repeat(RULE_WIDTH));
    println!("📚 AI eBook Publisher");
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("Transforme uma ideia em um infoproduto completo e lucrativo.");
    println!("Crie um livro de 10 capítulos pronto para venda.\n");

    if let Some(message) = error {
        println!("❌ Falha ao gerar o plano do livro.");
        println!("   {}\n", message);
    }

    println!("Sobre o que é o seu livro? (ex: Dieta Low Carb, Marketing Digital...)");
    println!("(linha vazia para sair)");
}

/// 方案生成中视图
pub fn render_planning(topic: &str) {
    println!("\n{}", "─".repeat(RULE_WIDTH));
    println!("⏳ Estruturando seu Best-Seller sobre \"{}\"...", topic);
    println!("   Nossa IA está criando títulos, capítulos e estratégias de venda.");
    println!("{}", "─".repeat(RULE_WIDTH));
}

/// 方案评审视图
pub fn render_review(plan: &BookPlan) {
    println!("\n{}", "=".repeat(RULE_WIDTH));
    println!("📋 Plano do Projeto");
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("\nTítulo Sugerido:");
    println!("  {}", plan.title);
    println!("  {}", plan.subtitle);
    println!("\nCopy de Vendas:");
    println!("  \"{}\"", plan.sales_description);
    println!("\nConceito da Capa:");
    println!("  🖊️ {}", plan.cover_visual_prompt);
    println!("\nEstrutura do Conteúdo ({} Capítulos):", plan.chapter_count());
    for (idx, chapter) in plan.chapters.iter().enumerate() {
        println!("  {:>2}. {}", idx + 1, chapter);
    }
    println!("\n{}", "─".repeat(RULE_WIDTH));
    println!("[a] Aprovar & Gerar Ebook Completo    [c] Cancelar");
}

/// 生成进度视图（每章终结后刷新一次）
pub fn render_progress(session: &Session) {
    let Some((completed, total)) = session.progress() else {
        return;
    };

    let bar = format_progress_bar(completed, total);

    if completed < total {
        println!(
            "{} Gerando Capítulo {} de {}...",
            bar,
            (completed + 1).min(total),
            total
        );
    } else {
        println!("{} Todos os capítulos concluídos.", bar);
    }
}

/// 封面与简介视图
pub fn render_cover_view(plan: &BookPlan, cover: Option<&CoverImage>, generating: bool) {
    println!("\n{}", "=".repeat(RULE_WIDTH));
    println!("📖 {}", plan.title);
    println!("   {}", plan.subtitle);
    println!("{}", "=".repeat(RULE_WIDTH));

    match cover {
        Some(image) => println!(
            "🖼️ Capa pronta: {} ({} KB)",
            image.mime_type,
            image.bytes.len() / 1024
        ),
        None if generating => println!("⏳ Capa ainda em geração..."),
        None => println!("⏳ Capa ainda em geração... (aguardando o gateway)"),
    }

    println!("\nSobre este livro:");
    println!("{}", plan.sales_description);
}

/// 单章视图
pub fn render_chapter(chapter: &ChapterContent) {
    if chapter.is_generating {
        println!(
            "\n⏳ Escrevendo o Capítulo {}...",
            chapter.index + 1
        );
        return;
    }

    println!("\n{}", "=".repeat(RULE_WIDTH));
    println!("Capítulo {}", chapter.index + 1);
    println!("{}", chapter.title);
    println!("{}", "=".repeat(RULE_WIDTH));
    println!("\n{}", chapter.content);
    println!("\n{:^width$}", "***", width = RULE_WIDTH);
}

/// 阅读视图：按当前查看位置分发
pub fn render_current_view(session: &Session) {
    let Some(plan) = session.plan() else {
        return;
    };

    match session.current_view() {
        ChapterView::Cover => {
            render_cover_view(plan, session.cover(), !session.is_finished());
        }
        ChapterView::Chapter(index) => {
            if let Some(chapter) = session.chapters().and_then(|c| c.get(index)) {
                render_chapter(chapter);
            }
        }
    }
}

/// 成书阅读菜单
pub fn render_finished_menu(total_chapters: usize) {
    println!("\n{}", "─".repeat(RULE_WIDTH));
    println!(
        "[0] Capa & Introdução   [1-{}] Capítulo   [e] Exportar PDF / Imprimir   [n] Novo projeto   [s] Sair",
        total_chapters
    );
}

/// 进度条字符串
pub(crate) fn format_progress_bar(completed: usize, total: usize) -> String {
    const BAR_WIDTH: usize = 20;
    let filled = if total == 0 {
        0
    } else {
        completed * BAR_WIDTH / total
    };
    format!(
        "[{}{}] {:>2}/{}",
        "█".repeat(filled),
        "░".repeat(BAR_WIDTH - filled),
        completed,
        total
    )
}
