//! Realtime Subscription
//!
//! Phoenix-style channel over WebSocket mirroring the team's partition of
//! the entry table. Established once a session exists; torn down on
//! sign-out or unmount.

use std::cell::Cell;
use std::rc::Rc;

use gloo_timers::callback::Interval;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{CloseEvent, MessageEvent, WebSocket};

use super::{ApiError, Supabase};
use crate::models::Entry;

const HEARTBEAT_MS: u32 = 30_000;

/// One row change in the team's partition
#[derive(Debug, Clone, PartialEq)]
pub enum EntryChange {
    Insert(Entry),
    Update(Entry),
    /// Delete notifications only carry the old row's id.
    Delete { id: i64 },
}

/// Live channel handle. Dropping it cancels the heartbeat; `close`
/// shuts the socket down.
pub struct RealtimeSubscription {
    socket: WebSocket,
    _heartbeat: Interval,
    _on_open: Closure<dyn FnMut()>,
    _on_message: Closure<dyn FnMut(MessageEvent)>,
    _on_close: Closure<dyn FnMut(CloseEvent)>,
}

impl RealtimeSubscription {
    pub fn close(&self) {
        let _ = self.socket.close();
    }
}

impl Supabase {
    /// Subscribe to insert/update/delete notifications for the team's rows.
    pub fn subscribe_entries(
        &self,
        on_change: impl Fn(EntryChange) + 'static,
    ) -> Result<RealtimeSubscription, ApiError> {
        let url = format!(
            "{}?apikey={}&vsn=1.0.0",
            self.config.realtime_url(),
            self.config.anon_key
        );
        let socket = WebSocket::new(&url)
            .map_err(|e| ApiError::Network(format!("websocket open failed: {e:?}")))?;

        let message_ref = Rc::new(Cell::new(1u64));

        // Join the team topic as soon as the socket is up.
        let topic = format!("realtime:entries-{}", self.config.team_id);
        let join = join_frame(&topic, &self.config.team_id, message_ref.get());
        message_ref.set(message_ref.get() + 1);
        let open_socket = socket.clone();
        let on_open = Closure::<dyn FnMut()>::new(move || {
            web_sys::console::log_1(&format!("[REALTIME] joining {}", open_socket.url()).into());
            let _ = open_socket.send_with_str(&join);
        });
        socket.set_onopen(Some(on_open.as_ref().unchecked_ref()));

        let on_message = Closure::<dyn FnMut(MessageEvent)>::new(move |ev: MessageEvent| {
            let Some(text) = ev.data().as_string() else {
                return;
            };
            if let Some(change) = parse_change(&text) {
                on_change(change);
            }
        });
        socket.set_onmessage(Some(on_message.as_ref().unchecked_ref()));

        let on_close = Closure::<dyn FnMut(CloseEvent)>::new(move |ev: CloseEvent| {
            web_sys::console::log_1(&format!("[REALTIME] channel closed ({})", ev.code()).into());
        });
        socket.set_onclose(Some(on_close.as_ref().unchecked_ref()));

        // Keep the channel alive the Phoenix way.
        let heartbeat_socket = socket.clone();
        let heartbeat = Interval::new(HEARTBEAT_MS, move || {
            let frame = heartbeat_frame(message_ref.get());
            message_ref.set(message_ref.get() + 1);
            let _ = heartbeat_socket.send_with_str(&frame);
        });

        Ok(RealtimeSubscription {
            socket,
            _heartbeat: heartbeat,
            _on_open: on_open,
            _on_message: on_message,
            _on_close: on_close,
        })
    }
}

fn join_frame(topic: &str, team_id: &str, message_ref: u64) -> String {
    serde_json::json!({
        "topic": topic,
        "event": "phx_join",
        "payload": {
            "config": {
                "postgres_changes": [{
                    "event": "*",
                    "schema": "public",
                    "table": "check_entries",
                    "filter": format!("team_id=eq.{team_id}"),
                }]
            }
        },
        "ref": message_ref.to_string(),
    })
    .to_string()
}

fn heartbeat_frame(message_ref: u64) -> String {
    serde_json::json!({
        "topic": "phoenix",
        "event": "heartbeat",
        "payload": {},
        "ref": message_ref.to_string(),
    })
    .to_string()
}

/// Pull a row change out of one frame. Anything that isn't a
/// postgres_changes notification (join acks, heartbeat replies) is skipped
/// silently; a notification whose record doesn't decode is logged and
/// dropped.
fn parse_change(text: &str) -> Option<EntryChange> {
    let frame: serde_json::Value = serde_json::from_str(text).ok()?;
    if frame.get("event")?.as_str()? != "postgres_changes" {
        return None;
    }
    let data = frame.get("payload")?.get("data")?;
    match data.get("type")?.as_str()? {
        "INSERT" => decode_record(data.get("record")?).map(EntryChange::Insert),
        "UPDATE" => decode_record(data.get("record")?).map(EntryChange::Update),
        "DELETE" => {
            let id = data.get("old_record")?.get("id")?.as_i64()?;
            Some(EntryChange::Delete { id })
        }
        _ => None,
    }
}

fn decode_record(record: &serde_json::Value) -> Option<Entry> {
    match serde_json::from_value::<Entry>(record.clone()) {
        Ok(entry) => Some(entry),
        Err(err) => {
            warn(format!("[REALTIME] undecodable record: {err}"));
            None
        }
    }
}

fn warn(message: String) {
    #[cfg(target_arch = "wasm32")]
    web_sys::console::warn_1(&message.into());
    #[cfg(not(target_arch = "wasm32"))]
    let _ = message;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ItemType;

    fn record(id: i64) -> serde_json::Value {
        serde_json::json!({
            "id": id,
            "team_id": "demo-team",
            "category": "철골공사",
            "item_type": "견적조건",
            "review_text": "구조도면 누락",
            "shared_at": null,
            "author_name": "이길재",
            "note": null,
            "link_url": null,
            "attachments": [],
            "created_by": "gilee05@gsenc.com",
            "created_at": "2024-05-01T09:00:00+00:00",
            "updated_at": "2024-05-01T09:00:00+00:00"
        })
    }

    fn frame(data: serde_json::Value) -> String {
        serde_json::json!({
            "topic": "realtime:entries-demo-team",
            "event": "postgres_changes",
            "payload": {"ids": [1], "data": data},
            "ref": null
        })
        .to_string()
    }

    #[test]
    fn insert_frame_parses_into_entry() {
        let text = frame(serde_json::json!({"type": "INSERT", "record": record(5)}));
        match parse_change(&text) {
            Some(EntryChange::Insert(entry)) => {
                assert_eq!(entry.id, 5);
                assert_eq!(entry.item_type, ItemType::QuotationTerms);
            }
            other => panic!("expected insert, got {other:?}"),
        }
    }

    #[test]
    fn delete_frame_only_needs_the_old_id() {
        let text = frame(serde_json::json!({
            "type": "DELETE",
            "old_record": {"id": 42}
        }));
        assert_eq!(parse_change(&text), Some(EntryChange::Delete { id: 42 }));
    }

    #[test]
    fn join_ack_frames_are_skipped() {
        let ack = serde_json::json!({
            "topic": "realtime:entries-demo-team",
            "event": "phx_reply",
            "payload": {"status": "ok", "response": {}},
            "ref": "1"
        })
        .to_string();
        assert_eq!(parse_change(&ack), None);
    }

    #[test]
    fn undecodable_record_is_dropped() {
        let text = frame(serde_json::json!({"type": "UPDATE", "record": {"id": "not-a-number"}}));
        assert_eq!(parse_change(&text), None);
    }

    #[test]
    fn join_frame_scopes_the_filter_to_the_team() {
        let frame: serde_json::Value =
            serde_json::from_str(&join_frame("realtime:entries-demo-team", "demo-team", 1)).unwrap();
        assert_eq!(frame["event"], "phx_join");
        assert_eq!(
            frame["payload"]["config"]["postgres_changes"][0]["filter"],
            "team_id=eq.demo-team"
        );
        assert_eq!(
            frame["payload"]["config"]["postgres_changes"][0]["table"],
            "check_entries"
        );
    }
}
