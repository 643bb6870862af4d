//! Request payloads and Notion payload mapping.
//!
//! The mapping functions here are pure: they translate the simplified input
//! records into the JSON shapes the Notion API expects, independent of any
//! transport.

use serde::Deserialize;
use serde_json::{json, Map, Value};

/// Body of a database creation request.
#[derive(Debug, Clone, Deserialize)]
pub struct CreateDatabaseRequest {
    /// Database title
    #[serde(default)]
    pub name: Option<String>,
}

/// Page inputs shared by creation and update.
///
/// Every field is optional; an absent field leaves the corresponding remote
/// property untouched rather than clearing it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageFields {
    /// Page title
    #[serde(default)]
    pub title: Option<String>,
    /// Due date (ISO 8601 date string, relayed as-is)
    #[serde(default)]
    pub due_date: Option<String>,
    /// Priority select option name
    #[serde(default)]
    pub priority: Option<String>,
    /// Status option name, matched against the remote status options
    #[serde(default)]
    pub status: Option<String>,
    /// Text for the "description" toggle section
    #[serde(default)]
    pub description: Option<String>,
    /// Text for the "ticket" toggle section
    #[serde(default)]
    pub ticket: Option<String>,
    /// Checkbox items appended to the page
    #[serde(default)]
    pub todo_list: Option<Vec<TodoItem>>,
}

/// A single checkbox entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TodoItem {
    /// Checkbox text
    #[serde(default)]
    pub text: String,
    /// Checked state
    #[serde(default)]
    pub checked: bool,
}

/// Map page inputs to Notion property updates.
///
/// Only fields present in the input produce a property; the title gets no
/// placeholder here (creation applies its own default before calling this).
#[must_use]
pub fn page_properties(fields: &PageFields) -> Map<String, Value> {
    let mut properties = Map::new();

    if let Some(title) = &fields.title {
        properties.insert(
            "Name".to_string(),
            json!({ "title": [text_run(title)] }),
        );
    }
    if let Some(due_date) = &fields.due_date {
        properties.insert("Due Date".to_string(), json!({ "date": { "start": due_date } }));
    }
    if let Some(priority) = &fields.priority {
        properties.insert("Priority".to_string(), json!({ "select": { "name": priority } }));
    }
    if let Some(status) = &fields.status {
        properties.insert("Status".to_string(), json!({ "status": { "name": status } }));
    }

    properties
}

/// Fixed property schema applied to every created database.
#[must_use]
pub fn database_schema() -> Value {
    json!({
        "Name": { "title": {} },
        "Description": { "rich_text": {} },
        "Status": {
            "select": {
                "options": [
                    { "name": "Pending", "color": "yellow" },
                    { "name": "In Progress", "color": "blue" },
                    { "name": "Done", "color": "green" }
                ]
            }
        },
        "Created": { "date": {} },
        "Value": { "number": { "format": "number" } }
    })
}

/// Content block kinds this service manages on a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContentBlock {
    /// Toggle section labeled "ticket" with one paragraph of text
    Ticket(String),
    /// Toggle section labeled "description" with one paragraph of text
    Description(String),
    /// Checkbox item
    Todo {
        /// Checkbox text
        text: String,
        /// Checked state
        checked: bool,
    },
}

impl ContentBlock {
    /// Build the block list for a page from its inputs.
    ///
    /// Fixed order: ticket, then description, then one todo per entry.
    /// Empty ticket/description texts and empty todo lists contribute
    /// nothing.
    #[must_use]
    pub fn from_fields(fields: &PageFields) -> Vec<Self> {
        let mut blocks = Vec::new();

        if let Some(ticket) = fields.ticket.as_deref().filter(|t| !t.is_empty()) {
            blocks.push(Self::Ticket(ticket.to_string()));
        }
        if let Some(description) = fields.description.as_deref().filter(|d| !d.is_empty()) {
            blocks.push(Self::Description(description.to_string()));
        }
        if let Some(todo_list) = &fields.todo_list {
            for item in todo_list {
                blocks.push(Self::Todo {
                    text: item.text.clone(),
                    checked: item.checked,
                });
            }
        }

        blocks
    }

    /// Serialize this block into the Notion block object shape.
    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Ticket(text) => toggle_block("ticket", text),
            Self::Description(text) => toggle_block("description", text),
            Self::Todo { text, checked } => json!({
                "object": "block",
                "type": "to_do",
                "to_do": {
                    "rich_text": [text_run(text)],
                    "checked": checked
                }
            }),
        }
    }
}

/// Whether a listed child block was written by this service and should be
/// replaced on update.
///
/// Checkbox blocks are always ours; toggle blocks only when labeled
/// "ticket" or "description" (case-insensitive). Everything else is left
/// untouched.
#[must_use]
pub fn is_managed_block(block: &Value) -> bool {
    match block.get("type").and_then(Value::as_str) {
        Some("to_do") => true,
        Some("toggle") => toggle_label(block).is_some_and(|label| {
            label.eq_ignore_ascii_case("ticket") || label.eq_ignore_ascii_case("description")
        }),
        _ => false,
    }
}

/// First rich text run of a toggle block, as rendered text.
fn toggle_label(block: &Value) -> Option<&str> {
    let run = block.get("toggle")?.get("rich_text")?.get(0)?;
    run.get("plain_text")
        .and_then(Value::as_str)
        .or_else(|| {
            run.get("text")
                .and_then(|t| t.get("content"))
                .and_then(Value::as_str)
        })
}

fn text_run(content: &str) -> Value {
    json!({ "type": "text", "text": { "content": content } })
}

fn toggle_block(label: &str, body: &str) -> Value {
    json!({
        "object": "block",
        "type": "toggle",
        "toggle": {
            "rich_text": [text_run(label)],
            "children": [{
                "object": "block",
                "type": "paragraph",
                "paragraph": { "rich_text": [text_run(body)] }
            }]
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn maps_present_optional_properties() {
        let fields = PageFields {
            title: Some("Task".to_string()),
            due_date: Some("2025-01-01".to_string()),
            priority: Some("High".to_string()),
            status: Some("Open".to_string()),
            ..PageFields::default()
        };

        let properties = page_properties(&fields);

        assert_eq!(properties.len(), 4);
        assert_eq!(
            properties["Due Date"],
            json!({ "date": { "start": "2025-01-01" } })
        );
        assert_eq!(properties["Priority"], json!({ "select": { "name": "High" } }));
        assert_eq!(properties["Status"], json!({ "status": { "name": "Open" } }));
        assert_eq!(
            properties["Name"],
            json!({ "title": [{ "type": "text", "text": { "content": "Task" } }] })
        );
    }

    #[test]
    fn omits_absent_properties() {
        let fields = PageFields {
            title: Some("Task".to_string()),
            ..PageFields::default()
        };

        let properties = page_properties(&fields);

        assert_eq!(properties.len(), 1);
        assert!(properties.contains_key("Name"));
    }

    #[test]
    fn empty_input_maps_to_no_properties() {
        assert!(page_properties(&PageFields::default()).is_empty());
    }

    #[test]
    fn builds_blocks_in_fixed_order() {
        let fields = PageFields {
            ticket: Some("PROJ-42".to_string()),
            description: Some("Fix the flaky import".to_string()),
            todo_list: Some(vec![
                TodoItem {
                    text: "Buy milk".to_string(),
                    checked: true,
                },
                TodoItem {
                    text: "Call Bob".to_string(),
                    checked: false,
                },
            ]),
            ..PageFields::default()
        };

        let blocks = ContentBlock::from_fields(&fields);

        assert_eq!(blocks.len(), 4);
        assert_eq!(blocks[0], ContentBlock::Ticket("PROJ-42".to_string()));
        assert_eq!(
            blocks[1],
            ContentBlock::Description("Fix the flaky import".to_string())
        );
        assert_eq!(
            blocks[2],
            ContentBlock::Todo {
                text: "Buy milk".to_string(),
                checked: true,
            }
        );
        assert_eq!(
            blocks[3],
            ContentBlock::Todo {
                text: "Call Bob".to_string(),
                checked: false,
            }
        );
    }

    #[test]
    fn skips_empty_sections_and_lists() {
        let fields = PageFields {
            ticket: Some(String::new()),
            todo_list: Some(vec![]),
            ..PageFields::default()
        };

        assert!(ContentBlock::from_fields(&fields).is_empty());
    }

    #[test]
    fn todo_fields_default_when_absent() {
        let fields: PageFields = serde_json::from_str(
            r#"{"todo_list":[{"text":"Buy milk","checked":true},{"text":"Call Bob"},{}]}"#,
        )
        .unwrap();

        let blocks = ContentBlock::from_fields(&fields);

        assert_eq!(blocks.len(), 3);
        assert_eq!(
            blocks[1],
            ContentBlock::Todo {
                text: "Call Bob".to_string(),
                checked: false,
            }
        );
        assert_eq!(
            blocks[2],
            ContentBlock::Todo {
                text: String::new(),
                checked: false,
            }
        );
    }

    #[test]
    fn toggle_block_shape() {
        let block = ContentBlock::Ticket("PROJ-42".to_string()).to_json();

        assert_eq!(block["type"], "toggle");
        assert_eq!(block["toggle"]["rich_text"][0]["text"]["content"], "ticket");
        assert_eq!(
            block["toggle"]["children"][0]["paragraph"]["rich_text"][0]["text"]["content"],
            "PROJ-42"
        );
    }

    #[test]
    fn todo_block_shape() {
        let block = ContentBlock::Todo {
            text: "Buy milk".to_string(),
            checked: true,
        }
        .to_json();

        assert_eq!(block["type"], "to_do");
        assert_eq!(block["to_do"]["rich_text"][0]["text"]["content"], "Buy milk");
        assert_eq!(block["to_do"]["checked"], true);
    }

    #[test]
    fn managed_block_matching() {
        let todo = json!({ "id": "b1", "type": "to_do", "to_do": { "checked": false } });
        let ticket = json!({
            "id": "b2",
            "type": "toggle",
            "toggle": { "rich_text": [{ "plain_text": "Ticket" }] }
        });
        let notes = json!({
            "id": "b3",
            "type": "toggle",
            "toggle": { "rich_text": [{ "plain_text": "Notes" }] }
        });
        let paragraph = json!({ "id": "b4", "type": "paragraph", "paragraph": {} });

        assert!(is_managed_block(&todo));
        assert!(is_managed_block(&ticket));
        assert!(!is_managed_block(&notes));
        assert!(!is_managed_block(&paragraph));
    }

    #[test]
    fn managed_block_label_falls_back_to_text_content() {
        let block = json!({
            "type": "toggle",
            "toggle": { "rich_text": [{ "type": "text", "text": { "content": "DESCRIPTION" } }] }
        });

        assert!(is_managed_block(&block));
    }

    #[test]
    fn managed_block_ignores_empty_toggle() {
        let block = json!({ "type": "toggle", "toggle": { "rich_text": [] } });

        assert!(!is_managed_block(&block));
    }

    #[test]
    fn database_schema_has_fixed_properties() {
        let schema = database_schema();

        for key in ["Name", "Description", "Status", "Created", "Value"] {
            assert!(schema.get(key).is_some(), "missing property {key}");
        }

        let options = schema["Status"]["select"]["options"].as_array().unwrap();
        let names: Vec<&str> = options
            .iter()
            .map(|o| o["name"].as_str().unwrap())
            .collect();
        assert_eq!(names, vec!["Pending", "In Progress", "Done"]);
    }
}
