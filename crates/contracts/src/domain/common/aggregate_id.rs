use serde::{de::DeserializeOwned, Serialize};
use std::hash::Hash;

/// Трейт для типов идентификаторов агрегатов
///
/// Идентификаторы приходят из внешних источников (каталог, deep-link параметры)
/// в строковом виде, поэтому каждый ID умеет разбирать себя из строки.
pub trait AggregateId:
    Clone + PartialEq + Eq + Hash + Serialize + DeserializeOwned + std::fmt::Debug
{
    /// Преобразовать ID в строку
    fn as_string(&self) -> String;

    /// Создать ID из строки
    fn from_string(s: &str) -> Result<Self, String>;

    /// Разобрать необязательный строковый параметр: пустая строка считается отсутствием значения
    fn from_optional(s: Option<&str>) -> Result<Option<Self>, String> {
        match s.map(str::trim) {
            None | Some("") => Ok(None),
            Some(value) => Self::from_string(value).map(Some),
        }
    }
}

impl AggregateId for uuid::Uuid {
    fn as_string(&self) -> String {
        ToString::to_string(self)
    }

    fn from_string(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s).map_err(|e| format!("Invalid UUID: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn test_from_optional_treats_blank_as_none() {
        assert_eq!(Uuid::from_optional(None), Ok(None));
        assert_eq!(Uuid::from_optional(Some("  ")), Ok(None));
        assert!(Uuid::from_optional(Some("not-a-uuid")).is_err());

        let id = Uuid::from_u128(7);
        assert_eq!(Uuid::from_optional(Some(&id.to_string())), Ok(Some(id)));
    }
}
