//! Fixed prompts for the Vietnamese bulleted summary.
//!
//! Both the text and the vision path share [`SYSTEM_PROMPT`]; only the user
//! turn differs. Keeping them here lets unit tests inspect the exact wording
//! without a live model.

/// System instruction: always summarise in Vietnamese, clearly, with bullet points.
pub const SYSTEM_PROMPT: &str = "Bạn là một trợ lý AI hữu ích, luôn tóm tắt tài liệu bằng tiếng Việt, rõ ràng và dễ hiểu, sử dụng gạch đầu dòng.";

/// User instruction sent alongside the rendered first page on the vision path.
pub const VISION_USER_PROMPT: &str =
    "Hãy tóm tắt trang PDF này bằng tiếng Việt, dùng gạch đầu dòng.";

/// Build the user turn for the text path.
///
/// The full extracted text is embedded verbatim; nothing is truncated.
pub fn text_user_prompt(text: &str) -> String {
    format!("Hãy tóm tắt tài liệu PDF này:\n\n{}", text)
}
