//! Pricing table and cost accounting (§4.5 step 10). Costs are stored as a
//! fixed-point decimal string with 6 fraction digits, matching
//! `ApiUsage.estimatedCost`'s contract (§3).

/// USD per 1M tokens, `(input, output)`.
fn rate_per_million(model: &str) -> (f64, f64) {
    if model.contains("opus") {
        (15.0, 75.0)
    } else if model.contains("perplexity") {
        (0.20, 0.20)
    } else {
        // Sonnet is the default tier (§4.5).
        (3.0, 15.0)
    }
}

/// Computes the cost of `input_tokens`/`output_tokens` against `model`'s
/// rate, formatted as a fixed-point decimal string with 6 fraction digits.
#[must_use]
pub fn estimate_cost(model: &str, input_tokens: u32, output_tokens: u32) -> String {
    let (input_rate, output_rate) = rate_per_million(model);
    let cost =
        (f64::from(input_tokens) / 1_000_000.0) * input_rate + (f64::from(output_tokens) / 1_000_000.0) * output_rate;
    format!("{cost:.6}")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sonnet_pricing() {
        assert_eq!(estimate_cost("claude-sonnet", 1_000_000, 0), "3.000000");
        assert_eq!(estimate_cost("claude-sonnet", 0, 1_000_000), "15.000000");
    }

    #[test]
    fn opus_pricing() {
        assert_eq!(estimate_cost("claude-opus", 1_000_000, 1_000_000), "90.000000");
    }

    #[test]
    fn perplexity_flat_pricing() {
        assert_eq!(estimate_cost("perplexity-small", 1_000_000, 1_000_000), "0.400000");
    }

    #[test]
    fn zero_usage_is_zero_cost() {
        assert_eq!(estimate_cost("claude-sonnet", 0, 0), "0.000000");
    }
}
