use smartcity::Label;

/// Counters over all flows of a run
///
/// Partial summaries of disjoint sets of flows can be added up in any order.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct RunSummary {
    pub total_flows: u64,
    /// Flows the oracle decided to block
    pub blocked_flows: u64,
    pub normal_flows: u64,
    pub attack_flows: u64,
}

impl RunSummary {
    /// Summary of a single judged flow
    pub fn verdict(should_block: bool) -> Self {
        Self {
            total_flows: 1,
            blocked_flows: u64::from(should_block),
            ..Self::default()
        }
    }

    /// Summary of a single labeled flow
    pub fn labeled(label: Label) -> Self {
        Self {
            total_flows: 1,
            normal_flows: u64::from(label == Label::Benign),
            attack_flows: u64::from(label == Label::Attack),
            ..Self::default()
        }
    }

    /// Percentage of blocked flows, 0 for an empty run
    pub fn protection_rate(&self) -> f64 {
        if self.total_flows == 0 {
            0.0
        } else {
            self.blocked_flows as f64 / self.total_flows as f64 * 100.0
        }
    }
}

impl std::ops::AddAssign for RunSummary {
    fn add_assign(&mut self, rhs: Self) {
        self.total_flows += rhs.total_flows;
        self.blocked_flows += rhs.blocked_flows;
        self.normal_flows += rhs.normal_flows;
        self.attack_flows += rhs.attack_flows;
    }
}

impl std::ops::Add for RunSummary {
    type Output = Self;

    fn add(mut self, rhs: Self) -> Self::Output {
        self += rhs;
        self
    }
}

impl std::iter::Sum for RunSummary {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::default(), |acc, summary| acc + summary)
    }
}
