/// Render a number as text that parses back to the same value.
///
/// This is the canonical text for numeric literals in formulas and for
/// numeric cell contents. Non-finite values never reach it from parsed input;
/// they are rendered as `#NAN!`/`#INF!` for display only.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        "#INF!".to_string()
    } else if n == 0.0 {
        // Fold -0 into 0.
        "0".to_string()
    } else {
        n.to_string()
    }
}
