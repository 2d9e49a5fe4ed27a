//! # Web manifest 与 HTML 片段
//!
//! manifest 的 `icons` 由目录中标记了 `in_manifest` 的条目生成，
//! 目录与 manifest 不会各自漂移。

use serde::{Deserialize, Serialize};

use super::catalog::{self, MANIFEST_FILE_NAME};
use super::FaviconError;

pub const THEME_COLOR: &str = "#ffffff";
pub const BACKGROUND_COLOR: &str = "#ffffff";
pub const TILE_COLOR: &str = "#da532c";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestIcon {
    pub src: String,
    pub sizes: String,
    #[serde(rename = "type")]
    pub mime_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WebManifest {
    pub name: String,
    pub short_name: String,
    pub icons: Vec<ManifestIcon>,
    pub theme_color: String,
    pub background_color: String,
    pub display: String,
}

impl WebManifest {
    pub fn from_catalog() -> Self {
        let icons = catalog::manifest_targets()
            .map(|target| ManifestIcon {
                src: format!("/{}", target.file_name),
                sizes: target.sizes_attr(),
                mime_type: "image/png".to_string(),
            })
            .collect();

        Self {
            name: String::new(),
            short_name: String::new(),
            icons,
            theme_color: THEME_COLOR.to_string(),
            background_color: BACKGROUND_COLOR.to_string(),
            display: "standalone".to_string(),
        }
    }

    /// 2 空格缩进的 UTF-8 JSON。
    pub fn to_json(&self) -> Result<String, FaviconError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| FaviconError::Encode(format!("manifest 序列化失败：{}", e)))
    }
}

/// 引用生成文件的 6 行 HTML 片段（无结尾换行）。
pub fn html_snippet() -> String {
    let touch = catalog::find_target("apple-touch-icon.png");
    let icon32 = catalog::find_target("favicon-32x32.png");
    let icon16 = catalog::find_target("favicon-16x16.png");

    let mut lines = Vec::with_capacity(6);
    if let Some(t) = touch {
        lines.push(format!(
            r#"<link rel="apple-touch-icon" sizes="{}" href="/{}">"#,
            t.sizes_attr(),
            t.file_name
        ));
    }
    for t in [icon32, icon16].into_iter().flatten() {
        lines.push(format!(
            r#"<link rel="icon" type="image/png" sizes="{}" href="/{}">"#,
            t.sizes_attr(),
            t.file_name
        ));
    }
    lines.push(format!(r#"<link rel="manifest" href="/{}">"#, MANIFEST_FILE_NAME));
    lines.push(format!(
        r#"<meta name="msapplication-TileColor" content="{}">"#,
        TILE_COLOR
    ));
    lines.push(format!(r#"<meta name="theme-color" content="{}">"#, THEME_COLOR));

    lines.join("\n")
}
