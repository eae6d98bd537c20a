//! Items data model
//!
//! The fixed todo records served by the items endpoint, plus the echo entry
//! carrying the request URL back to the caller.

use serde::Serialize;

/// Fixed demo record
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Item {
    pub id: u32,
    pub name: &'static str,
}

/// Echo of the URL the client requested
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EchoEntry {
    pub url: String,
}

/// One element of the items response array.
///
/// The array mixes two record shapes: three `Item`s followed by one
/// `EchoEntry`. Serialized untagged so each element shows only its own fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum ItemsEntry {
    Item(Item),
    Echo(EchoEntry),
}

const FIXED_ITEMS: [Item; 3] = [
    Item {
        id: 1,
        name: "Buy groceries",
    },
    Item {
        id: 2,
        name: "Finish SvelteKit project",
    },
    Item {
        id: 3,
        name: "Walk the dog",
    },
];

/// The three literal items, in response order
pub const fn fixed_items() -> [Item; 3] {
    FIXED_ITEMS
}

/// Build the response sequence: fixed items followed by the URL echo.
///
/// The URL is embedded verbatim.
pub fn items_payload(url: &str) -> Vec<ItemsEntry> {
    fixed_items()
        .into_iter()
        .map(ItemsEntry::Item)
        .chain(std::iter::once(ItemsEntry::Echo(EchoEntry {
            url: url.to_string(),
        })))
        .collect()
}

/// Serialize the payload for `url` as compact JSON
pub fn render_items(url: &str) -> Result<String, serde_json::Error> {
    serde_json::to_string(&items_payload(url))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::{json, Value};

    #[test]
    fn test_fixed_items_order() {
        let items = fixed_items();
        let ids: Vec<u32> = items.iter().map(|i| i.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(items[0].name, "Buy groceries");
        assert_eq!(items[1].name, "Finish SvelteKit project");
        assert_eq!(items[2].name, "Walk the dog");
    }

    #[test]
    fn test_payload_appends_echo_last() {
        let payload = items_payload("http://localhost/api/v1/items");
        assert_eq!(payload.len(), 4);
        assert!(payload[..3].iter().all(|e| matches!(e, ItemsEntry::Item(_))));
        assert_eq!(
            payload[3],
            ItemsEntry::Echo(EchoEntry {
                url: "http://localhost/api/v1/items".to_string()
            })
        );
    }

    #[test]
    fn test_render_exact_body() {
        let body = render_items("https://example.com/api/v1/items?x=1").unwrap();
        assert_eq!(
            body,
            r#"[{"id":1,"name":"Buy groceries"},{"id":2,"name":"Finish SvelteKit project"},{"id":3,"name":"Walk the dog"},{"url":"https://example.com/api/v1/items?x=1"}]"#
        );
    }

    #[test]
    fn test_render_parses_as_expected_array() {
        let url = "http://127.0.0.1:8080/api/v1/items?a=1&b=two#frag";
        let parsed: Value = serde_json::from_str(&render_items(url).unwrap()).unwrap();
        assert_eq!(
            parsed,
            json!([
                {"id": 1, "name": "Buy groceries"},
                {"id": 2, "name": "Finish SvelteKit project"},
                {"id": 3, "name": "Walk the dog"},
                {"url": url}
            ])
        );
    }

    #[test]
    fn test_url_is_echoed_verbatim() {
        // Quotes and backslashes are escaped by JSON, not altered
        let url = r#"http://h/p?q="x"\y"#;
        let parsed: Value = serde_json::from_str(&render_items(url).unwrap()).unwrap();
        assert_eq!(parsed[3]["url"], url);

        let parsed: Value = serde_json::from_str(&render_items("").unwrap()).unwrap();
        assert_eq!(parsed[3], json!({"url": ""}));
    }

    #[test]
    fn test_render_is_idempotent() {
        let url = "http://example.com/api/v1/items";
        let first = render_items(url).unwrap();
        for _ in 0..10 {
            assert_eq!(render_items(url).unwrap(), first);
        }
    }
}
