use serde::{Deserialize, Serialize};

/// Тип упаковки
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PackagingType {
    /// Индивидуальная
    #[default]
    Individual,
    /// Транспортная
    Transport,
}

impl PackagingType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PackagingType::Individual => "individual",
            PackagingType::Transport => "transport",
        }
    }
}

/// Особенности упаковки
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PackagingFeature {
    /// Клеевой клапан
    GluedValve,
    /// Отрывная лента
    TearTape,
}

/// Упорядочить и убрать повторы
pub fn normalize_features(mut features: Vec<PackagingFeature>) -> Vec<PackagingFeature> {
    features.sort();
    features.dedup();
    features
}
