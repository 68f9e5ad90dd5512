//! User-facing message catalogue.
//!
//! Messages shown to the person selecting a photo. Internal error strings
//! (the `Display` impls) stay in English regardless of locale.

use serde::{Deserialize, Serialize};

/// Display language for user-facing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    #[default]
    En,
    Ja,
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "en" | "en-us" | "en_us" => Ok(Locale::En),
            "ja" | "ja-jp" | "ja_jp" => Ok(Locale::Ja),
            other => Err(format!("unsupported locale: {}", other)),
        }
    }
}

/// Message keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UserMessage {
    FileTooLarge,
    UnsupportedType,
    EmptyFile,
    NormalizationFailed,
    UploadFailed,
    DetectionFailed,
    ConnectionFailed,
}

impl UserMessage {
    pub fn text(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (UserMessage::FileTooLarge, Locale::En) => "Please choose a file of 10 MB or less",
            (UserMessage::FileTooLarge, Locale::Ja) => "ファイルサイズは10MB以下にしてください",
            (UserMessage::UnsupportedType, Locale::En) => "Please choose a JPEG or PNG file",
            (UserMessage::UnsupportedType, Locale::Ja) => {
                "JPEG または PNG ファイルを選択してください"
            }
            (UserMessage::EmptyFile, Locale::En) => "The selected file is empty",
            (UserMessage::EmptyFile, Locale::Ja) => "選択したファイルが空です",
            (UserMessage::NormalizationFailed, Locale::En) => {
                "Could not prepare the photo. Please try again"
            }
            (UserMessage::NormalizationFailed, Locale::Ja) => {
                "写真の読み込みに失敗しました。もう一度お試しください"
            }
            (UserMessage::UploadFailed, Locale::En) => "Photo upload failed",
            (UserMessage::UploadFailed, Locale::Ja) => "写真アップロードに失敗しました",
            (UserMessage::DetectionFailed, Locale::En) => "Face detection failed",
            (UserMessage::DetectionFailed, Locale::Ja) => "顔検出に失敗しました",
            (UserMessage::ConnectionFailed, Locale::En) => "Could not connect to the backend",
            (UserMessage::ConnectionFailed, Locale::Ja) => "バックエンドとの接続に失敗しました",
        }
    }
}
