use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::Resource;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Nationality {
    Usa,
    Brazil,
}

impl Nationality {
    pub fn label(&self) -> &'static str {
        match self {
            Nationality::Usa => "United States",
            Nationality::Brazil => "Brazil",
        }
    }
}

impl fmt::Display for Nationality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: i64,
    pub name: String,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub nationality: Option<Nationality>,
}

impl Actor {
    /// Age in whole years on `today`, if the birthday is known
    pub fn age_on(&self, today: NaiveDate) -> Option<u32> {
        self.birthday.and_then(|b| today.years_since(b))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActorInput {
    pub name: String,
    #[serde(default)]
    pub birthday: Option<NaiveDate>,
    #[serde(default)]
    pub nationality: Option<Nationality>,
}

impl Resource for Actor {
    const PATH: &'static str = "actors";
    type Input = ActorInput;

    fn id(&self) -> i64 {
        self.id
    }

    fn to_input(&self) -> ActorInput {
        ActorInput {
            name: self.name.clone(),
            birthday: self.birthday,
            nationality: self.nationality,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_actor() {
        let json = r#"{"id": 3, "name": "Fernanda Montenegro", "birthday": "1929-10-16", "nationality": "BRAZIL"}"#;
        let actor: Actor = serde_json::from_str(json).expect("Failed to parse actor JSON");
        assert_eq!(actor.name, "Fernanda Montenegro");
        assert_eq!(actor.nationality, Some(Nationality::Brazil));
        assert_eq!(actor.birthday, NaiveDate::from_ymd_opt(1929, 10, 16));

        let today = NaiveDate::from_ymd_opt(2026, 10, 15).unwrap();
        assert_eq!(actor.age_on(today), Some(96));
    }

    #[test]
    fn test_parse_actor_with_nulls() {
        let json = r#"{"id": 4, "name": "Unknown", "birthday": null, "nationality": null}"#;
        let actor: Actor = serde_json::from_str(json).unwrap();
        assert_eq!(actor.birthday, None);
        assert_eq!(actor.nationality, None);
        assert_eq!(actor.age_on(NaiveDate::MAX), None);
    }

    #[test]
    fn test_actor_input_serializes_api_codes() {
        let input = ActorInput {
            name: "Tom Hanks".to_string(),
            birthday: NaiveDate::from_ymd_opt(1956, 7, 9),
            nationality: Some(Nationality::Usa),
        };
        let json = serde_json::to_value(&input).unwrap();
        assert_eq!(json["nationality"], "USA");
        assert_eq!(json["birthday"], "1956-07-09");
    }
}
