//! Context assembly for generation prompts

/// Separator placed between retrieved chunks
pub const CONTEXT_SEPARATOR: &str = "\n\n";

/// Join retrieved chunks into one context block, separated by blank lines,
/// keeping their order.
pub fn assemble<S: AsRef<str>>(chunks: &[S]) -> String {
    let mut context = String::with_capacity(
        chunks.iter().map(|c| c.as_ref().len() + CONTEXT_SEPARATOR.len()).sum(),
    );
    for (i, chunk) in chunks.iter().enumerate() {
        if i > 0 {
            context.push_str(CONTEXT_SEPARATOR);
        }
        context.push_str(chunk.as_ref());
    }
    context
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joins_with_blank_line() {
        let chunks = vec!["first passage".to_string(), "second passage".to_string()];
        assert_eq!(assemble(&chunks), "first passage\n\nsecond passage");
    }

    #[test]
    fn test_single_and_empty() {
        assert_eq!(assemble(&["only"]), "only");
        assert_eq!(assemble::<&str>(&[]), "");
    }
}
