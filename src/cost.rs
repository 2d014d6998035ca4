//! Flat per-page cost estimation.

/// Converts page counts to money at a fixed rate per 1000 pages.
///
/// The rate is validated positive by [`crate::config::OcrConfigBuilder::build`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CostEstimator {
    rate_per_thousand_pages: f64,
}

impl CostEstimator {
    pub fn new(rate_per_thousand_pages: f64) -> Self {
        Self {
            rate_per_thousand_pages,
        }
    }

    /// `(pages / 1000) * rate`.
    pub fn estimate(&self, pages: usize) -> f64 {
        (pages as f64 / 1000.0) * self.rate_per_thousand_pages
    }

    /// Banner shown at the start of a run.
    pub fn pricing_info(&self) -> String {
        format!(
            "Current OCR pricing: {} $ per 1000 pages\n\
             Check for updates at: https://mistral.ai/products/la-plateforme#pricing",
            self.rate_per_thousand_pages
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thousand_pages_cost_the_rate() {
        let c = CostEstimator::new(2.5);
        assert_eq!(c.estimate(1000), 2.5);
        assert_eq!(c.estimate(0), 0.0);
    }

    #[test]
    fn two_pages_at_two_dollars() {
        let c = CostEstimator::new(2.0);
        assert!((c.estimate(2) - 0.004).abs() < 1e-12);
        assert_eq!(format!("{:.4}", c.estimate(2)), "0.0040");
    }

    #[test]
    fn monotonic_in_page_count() {
        let c = CostEstimator::new(1.0);
        let costs: Vec<f64> = (0..50).map(|p| c.estimate(p)).collect();
        assert!(costs.windows(2).all(|w| w[0] <= w[1]));
    }

    #[test]
    fn pricing_banner_mentions_rate() {
        assert!(CostEstimator::new(1.5).pricing_info().contains("1.5 $ per 1000 pages"));
    }
}
