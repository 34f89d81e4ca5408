//! 縮寫（略称）変換モジュール
//!
//! 工作內容から括弧内の時刻注記を取り除き、
//! ユーザーが編集できる縮寫表で文字列置換して行事曆の件名を作る。

use crate::error::Result;
use crate::types::ShiftRecord;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

lazy_static::lazy_static! {
    /// `(9:00-11:00)` / `(09:00-11:00)` 形式の時刻注記
    static ref TIME_ANNOTATION_RE: Regex = Regex::new(r"\(\d{1,2}:\d{2}-\d{1,2}:\d{2}\)").unwrap();
}

/// 縮寫表の1行
///
/// 表の編集途中で片側が空欄の行も受け付け、適用時に読み飛ばす。
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AbbreviationRule {
    /// 原始關鍵字
    #[serde(default)]
    pub keyword: Option<String>,
    /// 簡化後
    #[serde(default)]
    pub replacement: Option<String>,
}

impl AbbreviationRule {
    pub fn new(keyword: impl Into<String>, replacement: impl Into<String>) -> Self {
        Self {
            keyword: Some(keyword.into()),
            replacement: Some(replacement.into()),
        }
    }

    /// 適用可能な (原始, 簡化後) の組。欠けた行は None
    fn pair(&self) -> Option<(&str, &str)> {
        match (self.keyword.as_deref(), self.replacement.as_deref()) {
            (Some(k), Some(v)) if !k.is_empty() => Some((k, v)),
            _ => None,
        }
    }
}

/// 縮寫表（表の順に適用）
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AbbreviationTable {
    rules: Vec<AbbreviationRule>,
}

impl Default for AbbreviationTable {
    fn default() -> Self {
        Self::pharmacy_preset()
    }
}

impl AbbreviationTable {
    /// 空の縮寫表（時刻注記の除去のみ行う）
    pub fn empty() -> Self {
        Self { rules: Vec::new() }
    }

    pub fn from_rules(rules: Vec<AbbreviationRule>) -> Self {
        Self { rules }
    }

    /// JSON配列から読み込み
    pub fn from_json(json: &str) -> Result<Self> {
        let table: Self = serde_json::from_str(json)?;
        Ok(table)
    }

    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// 藥劑部班表用の既定縮寫表
    fn pharmacy_preset() -> Self {
        let rules = [
            ("調劑複核", "C"),
            ("處方判讀", "判讀"),
            ("藥物諮詢", "諮詢"),
            ("門診藥局調劑", "門診"),
            ("中正 2樓", "中2"),
            ("中正13樓", "中13"),
            ("思源樓", "思源"),
            ("長青樓", "長青"),
            ("抗凝藥師門診", "抗凝門診"),
            ("移植藥師門診", "移植門診"),
            ("中藥局調劑", "中藥局"),
            ("非常班之諮詢與藥動服務", "假日oncall"),
        ]
        .into_iter()
        .map(|(k, v)| AbbreviationRule::new(k, v))
        .collect();

        Self { rules }
    }

    pub fn rules(&self) -> &[AbbreviationRule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// 縮寫を追加（同じ原始關鍵字があれば置き換え、位置は維持）
    pub fn upsert(&mut self, keyword: impl Into<String>, replacement: impl Into<String>) {
        let keyword = keyword.into();
        let replacement = replacement.into();
        match self
            .rules
            .iter_mut()
            .find(|r| r.keyword.as_deref() == Some(keyword.as_str()))
        {
            Some(rule) => rule.replacement = Some(replacement),
            None => self.rules.push(AbbreviationRule::new(keyword, replacement)),
        }
    }

    /// 縮寫を削除。削除したら true
    pub fn remove(&mut self, keyword: &str) -> bool {
        let before = self.rules.len();
        self.rules.retain(|r| r.keyword.as_deref() != Some(keyword));
        self.rules.len() != before
    }

    /// 工作內容 → 簡化後內容
    ///
    /// 置換で時刻注記が再び現れた場合も残さない。
    pub fn simplify(&self, raw_content: &str) -> String {
        let mut simplified = strip_time_annotations(raw_content);

        for rule in &self.rules {
            match rule.pair() {
                Some((keyword, replacement)) => {
                    simplified = simplified.replace(keyword, replacement);
                }
                None => debug!(?rule, "不完全な縮寫行をスキップ"),
            }
        }

        strip_time_annotations(&simplified)
    }

    /// 勤務レコードの display_label を更新
    pub fn apply(&self, records: &mut [ShiftRecord]) {
        for record in records {
            record.display_label = self.simplify(&record.raw_content);
        }
    }
}

/// 括弧内の時刻注記をすべて除去
///
/// 除去で新たに注記が現れる入れ子の場合も、現れなくなるまで繰り返す。
pub fn strip_time_annotations(text: &str) -> String {
    let mut stripped = text.to_string();
    while TIME_ANNOTATION_RE.is_match(&stripped) {
        stripped = TIME_ANNOTATION_RE.replace_all(&stripped, "").into_owned();
    }
    stripped
}

/// 時刻注記を含むか
pub fn has_time_annotation(text: &str) -> bool {
    TIME_ANNOTATION_RE.is_match(text)
}
