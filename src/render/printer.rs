//! 打印导出 - 展示层
//!
//! 生成一份适合打印的 HTML 文件：封面页、销售简介页，然后按章节
//! 顺序排版全部已完成章节（章节间强制分页），与屏幕上正在查看哪一章
//! 无关。用户在浏览器里打开后走系统打印流程导出 PDF。
//!
//! Markdown 正文原样嵌入（pre-wrap），不做 DOM 级渲染。

use std::fs;

use tracing::info;

use crate::error::{AppError, AppResult};
use crate::models::{BookPlan, ChapterContent, CoverImage};

/// 导出整本书
///
/// # 参数
/// - `plan`: 书籍方案
/// - `chapters`: 章节记录（只有已完成的会进入导出）
/// - `cover`: 封面图（缺失时导出占位说明）
/// - `path`: 输出文件路径
pub fn export_book(
    plan: &BookPlan,
    chapters: &[ChapterContent],
    cover: Option<&CoverImage>,
    path: &str,
) -> AppResult<()> {
    let html = build_html(plan, chapters, cover);

    fs::write(path, &html).map_err(|e| AppError::export_write_failed(path, e))?;

    info!(
        "📄 已导出 {} 章到 {} ({} KB)",
        chapters.iter().filter(|c| c.is_complete).count(),
        path,
        html.len() / 1024
    );

    Ok(())
}

/// 组装完整的 HTML 文档
pub fn build_html(
    plan: &BookPlan,
    chapters: &[ChapterContent],
    cover: Option<&CoverImage>,
) -> String {
    let mut html = String::with_capacity(64 * 1024);

    html.push_str("<!DOCTYPE html>\n<html lang=\"pt-BR\">\n<head>\n<meta charset=\"utf-8\">\n");
    html.push_str(&format!("<title>{}</title>\n", escape_html(&plan.title)));
    html.push_str(STYLE_SHEET);
    html.push_str("</head>\n<body>\n");

    // 封面页
    html.push_str("<section class=\"page cover\">\n");
    match cover {
        Some(image) => html.push_str(&format!(
            "<img class=\"cover-art\" src=\"{}\" alt=\"Capa\">\n",
            image.to_data_uri()
        )),
        None => html.push_str("<div class=\"cover-placeholder\">Capa em geração</div>\n"),
    }
    html.push_str(&format!("<h1>{}</h1>\n", escape_html(&plan.title)));
    html.push_str(&format!("<h2>{}</h2>\n", escape_html(&plan.subtitle)));
    html.push_str("</section>\n");

    // 简介页
    html.push_str("<section class=\"page intro\">\n");
    html.push_str("<h3>Sobre este livro</h3>\n");
    html.push_str(&format!(
        "<p class=\"sales\">{}</p>\n",
        escape_html(&plan.sales_description)
    ));
    html.push_str("</section>\n");

    // 全部已完成章节，按索引顺序
    for chapter in chapters.iter().filter(|c| c.is_complete) {
        html.push_str("<section class=\"page chapter\">\n");
        html.push_str(&format!(
            "<header><span class=\"kicker\">Capítulo {}</span><h1>{}</h1></header>\n",
            chapter.index + 1,
            escape_html(&chapter.title)
        ));
        html.push_str(&format!(
            "<div class=\"body\">{}</div>\n",
            escape_html(&chapter.content)
        ));
        html.push_str("</section>\n");
    }

    // 元数据页脚
    html.push_str(&format!(
        "<footer>Gerado por eBook AI Publisher — {}</footer>\n",
        chrono::Local::now().format("%d/%m/%Y")
    ));

    html.push_str("</body>\n</html>\n");
    html
}

/// 打印样式：衬线正文、章节间强制分页
const STYLE_SHEET: &str = r#"<style>
body { font-family: Georgia, "Times New Roman", serif; color: #111; margin: 0; }
.page { padding: 4em 3em; page-break-after: always; }
.cover { text-align: center; padding-top: 10em; }
.cover-art { max-width: 60%; }
.cover-placeholder { color: #888; font-style: italic; margin-bottom: 2em; }
.cover h1 { font-size: 2.4em; margin-bottom: 0.2em; }
.cover h2 { font-weight: normal; color: #444; }
.intro .sales { font-size: 1.2em; line-height: 1.7; font-style: italic; }
.chapter header { text-align: center; border-bottom: 2px solid #eee; margin-bottom: 2em; padding-bottom: 1em; }
.chapter .kicker { text-transform: uppercase; letter-spacing: 0.2em; font-size: 0.8em; color: #555; }
.chapter .body { white-space: pre-wrap; line-height: 1.7; }
footer { text-align: center; color: #888; font-size: 0.8em; padding: 2em; }
@media print { footer { page-break-before: avoid; } }
</style>
"#;

/// 最小 HTML 转义
fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ChapterOutline;

    fn test_plan() -> BookPlan {
        BookPlan {
            title: "Dieta Low Carb & Você".to_string(),
            subtitle: "Emagreça com ciência".to_string(),
            sales_description: "O guia que vende.".to_string(),
            cover_visual_prompt: "Minimalist abstract shapes".to_string(),
            chapters: vec![ChapterOutline {
                title: "Fundamentos".to_string(),
                outline: "- tópico".to_string(),
            }],
        }
    }

    fn chapter(index: usize, complete: bool) -> ChapterContent {
        let mut c = ChapterContent::pending(index, format!("Capítulo {}", index + 1));
        if complete {
            c.finish(format!("## Texto {}", index + 1));
        }
        c
    }

    #[test]
    fn test_build_html_includes_completed_chapters_in_order() {
        let chapters = vec![chapter(0, true), chapter(1, true), chapter(2, true)];
        let html = build_html(&test_plan(), &chapters, None);

        let pos1 = html.find("Capítulo 1</h1>").unwrap();
        let pos2 = html.find("Capítulo 2</h1>").unwrap();
        let pos3 = html.find("Capítulo 3</h1>").unwrap();
        assert!(pos1 < pos2 && pos2 < pos3);
    }

    #[test]
    fn test_build_html_excludes_incomplete_chapters() {
        let chapters = vec![chapter(0, true), chapter(1, false)];
        let html = build_html(&test_plan(), &chapters, None);

        assert!(html.contains("Capítulo 1</h1>"));
        assert!(!html.contains("Capítulo 2</h1>"));
        // 封面缺失时导出占位说明
        assert!(html.contains("Capa em geração"));
    }

    #[test]
    fn test_build_html_embeds_cover_as_data_uri() {
        let cover = CoverImage {
            bytes: vec![0x89, 0x50],
            mime_type: "image/png".to_string(),
        };
        let html = build_html(&test_plan(), &[chapter(0, true)], Some(&cover));

        assert!(html.contains("src=\"data:image/png;base64,"));
        assert!(!html.contains("Capa em geração"));
    }

    #[test]
    fn test_build_html_escapes_markup() {
        let html = build_html(&test_plan(), &[], None);
        // 标题里的 & 被转义
        assert!(html.contains("Dieta Low Carb &amp; Você"));
    }

    #[test]
    fn test_build_html_carries_metadata_footer() {
        let html = build_html(&test_plan(), &[], None);
        assert!(html.contains("Gerado por eBook AI Publisher"));
    }
}
