/// The instruction sent alongside every receipt image.
///
/// Asks the model to list the purchased food items and to propose 3-5
/// simple recipes, answering with JSON shaped like `AnalysisResult`.
///
/// The prompt is loaded from `prompt.txt` at compile time using the
/// `include_str!` macro, making it easy to edit without dealing with
/// Rust string syntax.
pub const RECEIPT_ANALYSIS_PROMPT: &str = include_str!("prompt.txt");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_is_embedded() {
        assert!(!RECEIPT_ANALYSIS_PROMPT.is_empty());
        assert!(RECEIPT_ANALYSIS_PROMPT.contains("food items"));
        assert!(RECEIPT_ANALYSIS_PROMPT.contains("3-5 simple recipes"));
    }

    #[test]
    fn test_prompt_describes_json_shape() {
        assert!(RECEIPT_ANALYSIS_PROMPT.contains("JSON"));
        assert!(RECEIPT_ANALYSIS_PROMPT.contains("\"items\""));
        assert!(RECEIPT_ANALYSIS_PROMPT.contains("\"recipes\""));
        assert!(RECEIPT_ANALYSIS_PROMPT.contains("\"ingredients\""));
        assert!(RECEIPT_ANALYSIS_PROMPT.contains("\"instructions\""));
        assert!(RECEIPT_ANALYSIS_PROMPT.contains("\"usedItems\""));
    }
}
