//! Test assertion helpers - fluent API for verifying test expectations
#![allow(dead_code)] // Test utilities may not all be used in every test

use serde_json::Value;

use super::setup::{conn, TestSetup};

// ============================================================================
// Assertion Helpers
// ============================================================================

pub struct MessageAssertion<'a> {
    setup: &'a TestSetup,
    players: Vec<String>,
}

impl<'a> MessageAssertion<'a> {
    /// Create an assertion for all players in the setup
    pub fn for_all_players(setup: &'a TestSetup) -> Self {
        Self {
            setup,
            players: setup.players.clone(),
        }
    }

    /// Create an assertion for specific players
    pub fn for_players(setup: &'a TestSetup, players: Vec<&str>) -> Self {
        Self {
            setup,
            players: players.into_iter().map(|s| s.to_string()).collect(),
        }
    }

    /// Assert that every player's next frame is an event of this type
    /// (consumes it) and that they all received the same payload
    pub async fn received_event(self, expected_type: &str) -> EventContent {
        let mut payloads = vec![];

        for player in &self.players {
            let frame = self
                .setup
                .mock_conn_manager
                .consume_message_for(&conn(player))
                .await;
            let frame = frame.unwrap_or_else(|| {
                panic!("{} should have received a {} event", player, expected_type)
            });

            let payload: Value = serde_json::from_str(&frame).unwrap();
            assert_eq!(
                payload["type"], expected_type,
                "{} received the wrong event: {}",
                player, frame
            );
            payloads.push(payload);
        }

        for (i, payload) in payloads.iter().enumerate().skip(1) {
            assert_eq!(
                payload, &payloads[0],
                "{} payload differs from {}",
                self.players[i], self.players[0]
            );
        }

        EventContent {
            payload: payloads.into_iter().next().unwrap_or(Value::Null),
        }
    }

    /// Assert a sequence of events, in order
    pub async fn received_events(self, expected_types: &[&str]) -> Vec<EventContent> {
        let mut contents = vec![];
        for expected in expected_types {
            let players: Vec<&str> = self.players.iter().map(String::as_str).collect();
            contents.push(
                MessageAssertion::for_players(self.setup, players)
                    .received_event(expected)
                    .await,
            );
        }
        contents
    }

    /// Assert that players have no unread messages
    pub async fn received_no_messages(self) {
        for player in &self.players {
            let messages = self
                .setup
                .mock_conn_manager
                .get_messages_for(&conn(player))
                .await;
            assert!(
                messages.is_empty(),
                "{} should not have received any messages, got {:?}",
                player,
                messages
            );
        }
    }

    /// Count unread events of a type without consuming anything
    pub async fn count_of(self, event_type: &str) -> Vec<usize> {
        let mut counts = vec![];
        for player in &self.players {
            let messages = self
                .setup
                .mock_conn_manager
                .get_messages_for(&conn(player))
                .await;
            counts.push(
                messages
                    .iter()
                    .filter_map(|m| serde_json::from_str::<Value>(m).ok())
                    .filter(|v| v["type"] == event_type)
                    .count(),
            );
        }
        counts
    }
}

pub struct EventContent {
    pub payload: Value,
}

impl EventContent {
    pub fn field(&self, key: &str) -> &Value {
        &self.payload[key]
    }

    pub fn str_field(&self, key: &str) -> &str {
        self.payload[key]
            .as_str()
            .unwrap_or_else(|| panic!("{} should be a string in {}", key, self.payload))
    }

    pub fn verify_message(&self, expected: &str) -> &Self {
        assert_eq!(self.str_field("message"), expected);
        self
    }

    pub fn verify_roster(&self, expected: &[&str]) -> &Self {
        let players: Vec<&str> = self.payload["players"]
            .as_array()
            .expect("players should be an array")
            .iter()
            .map(|p| p.as_str().expect("roster entries are pseudos"))
            .collect();
        assert_eq!(players, expected);
        self
    }

    pub fn verify_current_player(&self, expected: &str) -> &Self {
        assert_eq!(self.str_field("currentPlayer"), expected);
        self
    }

    /// Value of the card on top of the discard pile
    pub fn top_discard_value(&self) -> i64 {
        self.payload["discardPile"]
            .as_array()
            .and_then(|pile| pile.last())
            .and_then(|card| card["value"].as_i64())
            .expect("discard pile should have a top card")
    }

    /// Cards of one player's hand from a `players` snapshot
    pub fn hand_of(&self, pseudo: &str) -> Vec<Value> {
        self.payload["players"]
            .as_array()
            .and_then(|players| players.iter().find(|p| p["pseudo"] == pseudo))
            .and_then(|p| p["hand"].as_array().cloned())
            .unwrap_or_else(|| panic!("no hand for {} in {}", pseudo, self.payload))
    }
}
