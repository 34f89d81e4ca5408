//! 対話入力

use crate::error::{RosterError, Result};
use dialoguer::Input;

/// 班表代號を入力させる（空入力は受け付けない）
pub fn prompt_staff_code() -> Result<String> {
    let input: String = Input::new()
        .with_prompt("班表代號")
        .validate_with(|value: &String| -> std::result::Result<(), &str> {
            if value.trim().is_empty() {
                Err("代號を入力してください")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .map_err(|e| RosterError::Prompt(e.to_string()))?;

    Ok(input.trim().to_string())
}

/// 引数の代號、なければ入力を求める
pub fn resolve_staff_code(code: Option<String>) -> Result<String> {
    match code.map(|c| c.trim().to_string()) {
        Some(code) if !code.is_empty() => Ok(code),
        _ => prompt_staff_code(),
    }
}
