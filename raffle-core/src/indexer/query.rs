use crate::types::RoundRecord;
use ethers::types::U256;
use serde::{Deserialize, Deserializer};

/// Latest round by id, newest first.
pub const LATEST_ROUND_QUERY: &str = "query {
    games(orderBy: id, orderDirection: desc, first: 1) {
        id
        winner
        players
        entryFee
        maxPlayers
    }
}";

#[derive(Debug, Deserialize)]
pub(crate) struct GraphResponse<T> {
    pub data: Option<T>,
    #[serde(default)]
    pub errors: Vec<GraphError>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphError {
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GamesData {
    pub games: Vec<GameEntity>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct GameEntity {
    pub id: String,
    pub winner: Option<String>,
    #[serde(default)]
    pub players: Option<Vec<String>>,
    #[serde(deserialize_with = "big_int")]
    pub entry_fee: U256,
    #[serde(deserialize_with = "small_int")]
    pub max_players: u32,
}

impl From<GameEntity> for RoundRecord {
    fn from(entity: GameEntity) -> Self {
        Self {
            id: entity.id,
            winner: entity.winner.filter(|w| !w.is_empty()),
            players: entity.players.unwrap_or_default(),
            entry_fee: entity.entry_fee,
            max_players: entity.max_players,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumberOrString {
    Number(u64),
    Text(String),
}

/// BigInt scalars arrive as decimal strings.
fn big_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<U256, D::Error> {
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => Ok(U256::from(n)),
        NumberOrString::Text(s) => {
            U256::from_dec_str(s.trim())
                .map_err(|e| serde::de::Error::custom(format!("invalid BigInt '{}': {}", s, e)))
        }
    }
}

fn small_int<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u32, D::Error> {
    match NumberOrString::deserialize(deserializer)? {
        NumberOrString::Number(n) => u32::try_from(n).map_err(serde::de::Error::custom),
        NumberOrString::Text(s) => s
            .trim()
            .parse()
            .map_err(|e| serde::de::Error::custom(format!("invalid Int '{}': {}", s, e))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_graph_scalars() {
        let json = r#"{
            "data": {
                "games": [{
                    "id": "7",
                    "winner": null,
                    "players": ["0xaaa", "0xbbb"],
                    "entryFee": "10000000000000000",
                    "maxPlayers": 3
                }]
            }
        }"#;
        let response: GraphResponse<GamesData> = serde_json::from_str(json).unwrap();
        assert!(response.errors.is_empty());

        let entity = response.data.unwrap().games.into_iter().next().unwrap();
        let record = RoundRecord::from(entity);
        assert_eq!(record.id, "7");
        assert_eq!(record.entry_fee, U256::exp10(16));
        assert_eq!(record.max_players, 3);
        assert_eq!(record.players, vec!["0xaaa", "0xbbb"]);
        assert!(!record.has_winner());
    }

    #[test]
    fn test_null_players_and_string_max() {
        let json = r#"{
            "id": "2",
            "winner": "0xWinner",
            "players": null,
            "entryFee": 5,
            "maxPlayers": "4"
        }"#;
        let record: RoundRecord = serde_json::from_str::<GameEntity>(json).unwrap().into();
        assert!(record.players.is_empty());
        assert_eq!(record.max_players, 4);
        assert_eq!(record.winner.as_deref(), Some("0xWinner"));
    }
}
