#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UvLevel {
    Low,
    Moderate,
    High,
    Extreme,
}

impl UvLevel {
    #[must_use]
    pub fn from_index(uv: f32) -> Self {
        if uv >= 8.0 {
            Self::Extreme
        } else if uv >= 6.0 {
            Self::High
        } else if uv >= 3.0 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
            Self::Extreme => "Extreme",
        }
    }
}

#[must_use]
pub fn uv_advice(uv: Option<f32>) -> String {
    let Some(uv) = uv.filter(|v| v.is_finite()) else {
        return "UV: unavailable".to_string();
    };
    let level = UvLevel::from_index(uv);
    match level {
        UvLevel::High | UvLevel::Extreme => {
            format!("UV: {uv} ({}) — sunscreen recommended.", level.label())
        }
        UvLevel::Low | UvLevel::Moderate => format!("UV: {uv} ({})", level.label()),
    }
}
