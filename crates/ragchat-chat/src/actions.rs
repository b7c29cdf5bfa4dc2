//! Quick-action buttons and the canned text each one submits.

use std::fmt;
use std::str::FromStr;

use serde::Serialize;

use crate::error::ChatError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickAction {
    ImageCreate,
    ImageAnalyze,
    Advice,
    Summary,
    More,
}

impl QuickAction {
    /// All actions in button order.
    pub const ALL: [QuickAction; 5] = [
        QuickAction::ImageCreate,
        QuickAction::ImageAnalyze,
        QuickAction::Advice,
        QuickAction::Summary,
        QuickAction::More,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            QuickAction::ImageCreate => "image_create",
            QuickAction::ImageAnalyze => "image_analyze",
            QuickAction::Advice => "advice",
            QuickAction::Summary => "summary",
            QuickAction::More => "more",
        }
    }

    /// Button caption.
    pub fn label(&self) -> &'static str {
        match self {
            QuickAction::ImageCreate => "이미지 만들기",
            QuickAction::ImageAnalyze => "이미지 분석",
            QuickAction::Advice => "조언 구하기",
            QuickAction::Summary => "텍스트 요약",
            QuickAction::More => "더 보기",
        }
    }

    /// Message submitted when the button is pressed.
    pub fn canned_text(&self) -> &'static str {
        match self {
            QuickAction::ImageCreate => "예제1입니다.",
            QuickAction::ImageAnalyze => "예제2입니다.",
            QuickAction::Advice => "예제3입니다.",
            QuickAction::Summary => "예제4입니다.",
            QuickAction::More => "다른 기능을 알려주세요.",
        }
    }
}

impl FromStr for QuickAction {
    type Err = ChatError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        QuickAction::ALL
            .into_iter()
            .find(|a| a.as_str() == s)
            .ok_or_else(|| ChatError::UnknownAction(s.to_string()))
    }
}

impl fmt::Display for QuickAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
