//! Server-side rendering of the chat view.
//!
//! All functions take a [`TranscriptView`] snapshot and produce markup; none
//! of them touch session state. Interactive elements carry `data-action`
//! attributes that the page script dispatches on.

use ragchat_chat::{MessageView, PageWindow, QuickAction, ResultsView, TranscriptView};
use ragchat_core::config::ChatConfig;

use crate::page::{MAIN_MARKER, PAGE_SHELL};

pub const GREETING: &str = "무엇을 도와드릴까요?";
pub const PENDING_TEXT: &str = "응답 대기 중...";
pub const DISCLAIMER: &str = "LLM은 실수를 할 수 있습니다. 중요한 정보는 확인하세요.";
const INPUT_PLACEHOLDER: &str = "메시지를 입력하세요...";
const COLLAPSE_LABEL: &str = "접기 ▲";
const EXPAND_LABEL: &str = "펼치기 ▼";

/// Escape text for use in element content and double-quoted attributes.
pub fn html_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

/// The full page with the main area filled in.
pub fn render_page(view: &TranscriptView, config: &ChatConfig) -> String {
    PAGE_SHELL.replacen(MAIN_MARKER, &render_main(view, config), 1)
}

/// The main area: welcome screen when empty, transcript and input bar otherwise.
pub fn render_main(view: &TranscriptView, config: &ChatConfig) -> String {
    if view.is_empty() {
        return render_welcome();
    }
    let mut out = render_transcript(view, &config.result_link_base);
    out.push_str("<div class=\"input-bar\">");
    out.push_str(&render_composer());
    out.push_str("</div>");
    out
}

fn render_composer() -> String {
    format!(
        "<div class=\"composer\"><textarea data-role=\"input\" rows=\"1\" placeholder=\"{}\"></textarea>\
         <button data-action=\"send\">전송</button></div>",
        INPUT_PLACEHOLDER
    )
}

fn render_welcome() -> String {
    let mut out = String::from("<section class=\"welcome\">");
    out.push_str(&format!(
        "<h2 data-typewriter=\"{}\"><span class=\"typed\"></span><span class=\"cursor\">|</span></h2>",
        GREETING
    ));
    out.push_str(&render_composer());
    out.push_str("<div class=\"quick-actions\">");
    for action in QuickAction::ALL {
        out.push_str(&format!(
            "<button data-action=\"quick\" data-quick=\"{}\">{}</button>",
            action.as_str(),
            action.label()
        ));
    }
    out.push_str("</div>");
    out.push_str(&format!("<p class=\"disclaimer\">{}</p>", DISCLAIMER));
    out.push_str("</section>");
    out
}

// =============================================================================
// Transcript
// =============================================================================

/// Transcript fragment: one block per message, then a scroll anchor.
pub fn render_transcript(view: &TranscriptView, result_link_base: &str) -> String {
    let mut out = String::from("<div class=\"transcript\">");
    for message in &view.messages {
        match message {
            MessageView::User { text, .. } => {
                out.push_str(&format!(
                    "<div class=\"msg user\"><div class=\"bubble\">{}</div></div>",
                    html_escape(text)
                ));
            }
            MessageView::Pending { .. } => {
                out.push_str(&format!(
                    "<div class=\"msg bot\"><div class=\"pending\"><div class=\"spinner\"></div>{}</div></div>",
                    PENDING_TEXT
                ));
            }
            MessageView::Bot { id, text, results, .. } => {
                out.push_str("<div class=\"msg bot\">");
                out.push_str(&format!("<div class=\"bubble\">{}</div>", html_escape(text)));
                if let Some(results) = results {
                    out.push_str(&render_results(&id.to_string(), results, result_link_base));
                }
                out.push_str("</div>");
            }
        }
    }
    out.push_str("<div id=\"transcript-end\"></div></div>");
    out
}

fn render_results(id: &str, results: &ResultsView, result_link_base: &str) -> String {
    let label = if results.expanded { COLLAPSE_LABEL } else { EXPAND_LABEL };
    let mut out = format!(
        "<div class=\"results\"><button class=\"toggle\" data-action=\"toggle\" data-id=\"{}\">{} ({})</button>",
        id, label, results.total
    );
    if results.expanded {
        let base = result_link_base.trim_end_matches('/');
        for item in &results.items {
            out.push_str(&format!(
                "<a class=\"result\" href=\"{}/{}/\" target=\"_blank\" rel=\"noopener noreferrer\">\
                 <div class=\"title\">{}</div>\
                 <div class=\"meta\"><span>ID: {}</span><span>등록일: {}</span></div></a>",
                html_escape(base),
                html_escape(&item.id),
                html_escape(&item.title),
                html_escape(&item.id),
                html_escape(&item.registered_date)
            ));
        }
        if let Some(window) = &results.pagination {
            out.push_str(&render_pagination(id, window));
        }
    }
    out.push_str("</div>");
    out
}

fn page_button(id: &str, page: usize, label: &str, class: &str, disabled: bool) -> String {
    format!(
        "<button class=\"{}\" data-action=\"page\" data-id=\"{}\" data-page=\"{}\"{}>{}</button>",
        class,
        id,
        page,
        if disabled { " disabled" } else { "" },
        label
    )
}

/// Prev, numbered pages, next.
fn render_pagination(id: &str, window: &PageWindow) -> String {
    let mut out = String::from("<nav class=\"pagination\">");
    out.push_str(&page_button(
        id,
        window.current_page.saturating_sub(1).max(1),
        "이전",
        "prev",
        !window.has_prev,
    ));
    for page in 1..=window.page_count {
        let class = if page == window.current_page { "current" } else { "page" };
        out.push_str(&page_button(id, page, &page.to_string(), class, false));
    }
    out.push_str(&page_button(
        id,
        (window.current_page + 1).min(window.page_count),
        "다음",
        "next",
        !window.has_next,
    ));
    out.push_str("</nav>");
    out
}
