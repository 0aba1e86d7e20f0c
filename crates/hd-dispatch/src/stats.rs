//! Running delivery statistics shared by every ticket of a run.

/// Observed bay waits and discharge durations, in completion order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DeliveryStats {
    /// Time from end of site prep until the unloading bay was granted.
    pub waits:         Vec<f64>,
    /// Time spent holding the unloading bay.
    pub discharges:    Vec<f64>,
    /// Time from loader request until grant (only with loading bays on).
    pub loading_waits: Vec<f64>,
}

impl DeliveryStats {
    pub fn mean_wait(&self) -> Option<f64> {
        mean(&self.waits)
    }

    pub fn mean_discharge(&self) -> Option<f64> {
        mean(&self.discharges)
    }

    pub fn total_wait(&self) -> f64 {
        self.waits.iter().sum()
    }
}

pub fn mean(xs: &[f64]) -> Option<f64> {
    if xs.is_empty() {
        None
    } else {
        Some(xs.iter().sum::<f64>() / xs.len() as f64)
    }
}

/// Population standard deviation.
pub fn std_dev(xs: &[f64]) -> Option<f64> {
    let m = mean(xs)?;
    let var = xs.iter().map(|x| (x - m).powi(2)).sum::<f64>() / xs.len() as f64;
    Some(var.sqrt())
}
