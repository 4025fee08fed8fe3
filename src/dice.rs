//! Dice-notation averages. Monster threat and spell damage estimates all
//! run on expectations; the core itself never rolls.

/// Average value of an expression like `2d6+3` or `1d8-1+1d4`.
/// The average of `NdM` is `N * (M + 1) / 2`.
pub fn average(expr: &str) -> f64 {
    let s: String = expr.chars().filter(|c| !c.is_whitespace()).collect();
    let mut sum = 0.0;
    let mut term = String::new();
    let mut sign = 1.0;

    for c in s.chars() {
        if c == '+' || c == '-' {
            if !term.is_empty() {
                sum += sign * term_average(&term);
                term.clear();
            }
            sign = if c == '+' { 1.0 } else { -1.0 };
        } else {
            term.push(c);
        }
    }
    if !term.is_empty() {
        sum += sign * term_average(&term);
    }
    sum
}

fn term_average(term: &str) -> f64 {
    if let Some((count, sides)) = term.split_once('d') {
        let count = if count.is_empty() {
            1
        } else {
            count.parse::<i64>().unwrap_or(0)
        };
        let sides = sides.parse::<i64>().unwrap_or(0);
        return count as f64 * (sides as f64 + 1.0) / 2.0;
    }
    term.parse::<f64>().unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_dice() {
        assert_eq!(average("1d6"), 3.5);
        assert_eq!(average("2d4"), 5.0);
        assert_eq!(average("d8"), 4.5);
    }

    #[test]
    fn modifiers_and_multiple_terms() {
        assert_eq!(average("2d6+3"), 10.0);
        assert_eq!(average("1d8 - 1"), 3.5);
        assert_eq!(average("1d4+1d6+2"), 8.0);
    }

    #[test]
    fn garbage_degrades_to_zero() {
        assert_eq!(average(""), 0.0);
        assert_eq!(average("xdy"), 0.0);
    }
}
