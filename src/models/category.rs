//! Category model and the fixed category vocabulary

use serde::{Deserialize, Serialize};
use sqlx::{Decode, Encode, FromRow, Postgres};
use utoipa::ToSchema;

/// The closed set of shelf categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CategoryName {
    Fiction,
    NonFiction,
    Science,
    History,
    Biography,
    Mystery,
    Fantasy,
    Romance,
    Technology,
    Art,
    Childrens,
    SelfHelp,
    Travel,
}

impl CategoryName {
    pub fn as_str(&self) -> &'static str {
        match self {
            CategoryName::Fiction => "FICTION",
            CategoryName::NonFiction => "NON_FICTION",
            CategoryName::Science => "SCIENCE",
            CategoryName::History => "HISTORY",
            CategoryName::Biography => "BIOGRAPHY",
            CategoryName::Mystery => "MYSTERY",
            CategoryName::Fantasy => "FANTASY",
            CategoryName::Romance => "ROMANCE",
            CategoryName::Technology => "TECHNOLOGY",
            CategoryName::Art => "ART",
            CategoryName::Childrens => "CHILDRENS",
            CategoryName::SelfHelp => "SELF_HELP",
            CategoryName::Travel => "TRAVEL",
        }
    }
}

impl std::fmt::Display for CategoryName {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for CategoryName {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_uppercase().as_str() {
            "FICTION" => Ok(CategoryName::Fiction),
            "NON_FICTION" => Ok(CategoryName::NonFiction),
            "SCIENCE" => Ok(CategoryName::Science),
            "HISTORY" => Ok(CategoryName::History),
            "BIOGRAPHY" => Ok(CategoryName::Biography),
            "MYSTERY" => Ok(CategoryName::Mystery),
            "FANTASY" => Ok(CategoryName::Fantasy),
            "ROMANCE" => Ok(CategoryName::Romance),
            "TECHNOLOGY" => Ok(CategoryName::Technology),
            "ART" => Ok(CategoryName::Art),
            "CHILDRENS" => Ok(CategoryName::Childrens),
            "SELF_HELP" => Ok(CategoryName::SelfHelp),
            "TRAVEL" => Ok(CategoryName::Travel),
            _ => Err(format!("Invalid category name: {}", s)),
        }
    }
}

// SQLx conversion for CategoryName (stored as TEXT)
impl sqlx::Type<Postgres> for CategoryName {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <String as sqlx::Type<Postgres>>::type_info()
    }
}

impl<'r> Decode<'r, Postgres> for CategoryName {
    fn decode(value: sqlx::postgres::PgValueRef<'r>) -> Result<Self, sqlx::error::BoxDynError> {
        let s: String = Decode::<Postgres>::decode(value)?;
        s.parse().map_err(|e: String| e.into())
    }
}

impl Encode<'_, Postgres> for CategoryName {
    fn encode_by_ref(&self, buf: &mut sqlx::postgres::PgArgumentBuffer) -> sqlx::encode::IsNull {
        let s: String = self.as_str().to_string();
        <String as Encode<Postgres>>::encode(s, buf)
    }
}

/// Category model from database
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, ToSchema)]
pub struct Category {
    pub id: i32,
    pub name: CategoryName,
}

/// Create category request
#[derive(Debug, Deserialize, ToSchema)]
pub struct CreateCategory {
    pub name: CategoryName,
}

/// Update category request
#[derive(Debug, Deserialize, ToSchema)]
pub struct UpdateCategory {
    pub name: CategoryName,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_exactly_the_original_names() {
        let names = [
            "FICTION",
            "NON_FICTION",
            "SCIENCE",
            "HISTORY",
            "BIOGRAPHY",
            "MYSTERY",
            "FANTASY",
            "ROMANCE",
            "TECHNOLOGY",
            "ART",
            "CHILDRENS",
            "SELF_HELP",
            "TRAVEL",
        ];
        for name in names {
            let parsed: CategoryName = name.parse().unwrap();
            assert_eq!(parsed.as_str(), name);
        }
        assert!("POETRY".parse::<CategoryName>().is_err());
    }

    #[test]
    fn serde_uses_wire_names() {
        let json = serde_json::to_string(&CategoryName::NonFiction).unwrap();
        assert_eq!(json, "\"NON_FICTION\"");
        let back: CategoryName = serde_json::from_str("\"SELF_HELP\"").unwrap();
        assert_eq!(back, CategoryName::SelfHelp);
    }
}
