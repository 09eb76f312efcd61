use std::fmt;

/// The report printed once every depositor has been funded. The figures are
/// fixed per depositor and aren't read back from the chain.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub struct Summary {
    depositors: usize,
}

impl Summary {
    pub fn new(depositors: usize) -> Self {
        Self { depositors }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let n = self.depositors;
        writeln!(f, "Filled vaults with:")?;
        writeln!(f, "  - USDC: {}k", 91 * n)?;
        writeln!(f, "  - USDT: {}k", 78 * n)?;
        writeln!(f, "  - WETH: {}", 9 * n)?;
        writeln!(f, "  - WBTC: {}", 4 * n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary() {
        assert_eq!(
            Summary::new(3).to_string(),
            "Filled vaults with:\n  - USDC: 273k\n  - USDT: 234k\n  - WETH: 27\n  - WBTC: 12\n"
        );
    }

    #[test]
    fn test_summary_scales_with_depositors() {
        for n in [0, 1, 5, 20] {
            let summary = Summary::new(n).to_string();
            let lines = summary.lines().skip(1).map(str::trim).collect::<Vec<_>>();
            assert_eq!(
                lines,
                vec![
                    format!("- USDC: {}k", 91 * n),
                    format!("- USDT: {}k", 78 * n),
                    format!("- WETH: {}", 9 * n),
                    format!("- WBTC: {}", 4 * n),
                ]
            );
        }
    }
}
