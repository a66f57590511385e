use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::sheet::ValueType;

/// A named configuration binding one provider, client, recipient and
/// default-parameter set together. The four ref fields are names resolved
/// against their collections, never owning pointers.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Profile {
    id: u32,
    name: String,
    params: String,
    provider: String,
    client: String,
    recipient: String,
}

impl Profile {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn params_ref(&self) -> &str {
        &self.params
    }

    pub fn provider_ref(&self) -> &str {
        &self.provider
    }

    pub fn client_ref(&self) -> &str {
        &self.client
    }

    pub fn recipient_ref(&self) -> &str {
        &self.recipient
    }
}

/// A labeled value with an optional sheet location and a display type. An
/// item without a location is never written to the sheet; it exists for
/// templating and reference only.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataItem {
    label: String,
    #[serde(default)]
    value: String,
    #[serde(default)]
    location: String,
    #[serde(rename = "type", default)]
    value_type: ValueType,
}

impl DataItem {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub fn location(&self) -> Option<&str> {
        (!self.location.is_empty()).then_some(self.location.as_str())
    }

    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    /// Only items with both a location and a value land on the sheet.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        !self.location.is_empty() && !self.value.is_empty()
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Provider {
    id: u32,
    name: String,
    #[serde(rename = "datas")]
    items: Vec<DataItem>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Client {
    id: u32,
    name: String,
    #[serde(rename = "datas")]
    items: Vec<DataItem>,
}

macro_rules! impl_data_items {
    ($($name:ty),+) => {
        $(
            impl $name {
                pub fn name(&self) -> &str {
                    &self.name
                }

                pub fn items(&self) -> &[DataItem] {
                    &self.items
                }

                pub fn item(&self, label: &str) -> Option<&DataItem> {
                    self.items.iter().find(|item| item.label() == label)
                }
            }
        )+
    };
}

impl_data_items!(Provider, Client);

/// Who the invoice is mailed to. `subject` and `body` may contain
/// `{{...}}` placeholder tokens, resolved at send time against the profile.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Recipient {
    id: u32,
    name: String,
    #[serde(default)]
    description: String,
    email: String,
    subject: String,
    body: String,
}

impl Recipient {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn email(&self) -> &str {
        &self.email
    }

    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn body(&self) -> &str {
        &self.body
    }
}

/// Default values and cell bindings for the recurring invoice fields.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DefaultParam {
    id: u32,
    name: String,
    #[serde(default)]
    description: String,
    invoice_date: DataItem,
    invoice_number: DataItem,
    iteration: Iteration,
}

impl DefaultParam {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn invoice_date(&self) -> &DataItem {
        &self.invoice_date
    }

    pub fn invoice_number(&self) -> &DataItem {
        &self.invoice_number
    }

    pub fn iteration(&self) -> &Iteration {
        &self.iteration
    }
}

/// The repeating line-item block: a column binding per field and the first
/// writable row.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Iteration {
    start_row: u32,
    date: IterationField,
    unit: IterationField,
    rate: IterationField,
    description: IterationField,
    amount: IterationField,
    gst_code: IterationField,
}

impl Iteration {
    pub fn start_row(&self) -> u32 {
        self.start_row
    }

    pub fn date(&self) -> &IterationField {
        &self.date
    }

    pub fn unit(&self) -> &IterationField {
        &self.unit
    }

    pub fn rate(&self) -> &IterationField {
        &self.rate
    }

    pub fn description(&self) -> &IterationField {
        &self.description
    }

    pub fn amount(&self) -> &IterationField {
        &self.amount
    }

    pub fn gst_code(&self) -> &IterationField {
        &self.gst_code
    }
}

/// One column of the iteration block. The stored default may be a number or
/// a string depending on the field, so it stays a raw JSON value until the
/// orchestrator knows which shape it needs.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct IterationField {
    column: String,
    #[serde(default)]
    value: Option<Value>,
}

impl IterationField {
    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn default_number(&self) -> Option<f64> {
        match &self.value {
            Some(Value::Number(n)) => n.as_f64(),
            Some(Value::String(s)) => s.parse().ok(),
            _ => None,
        }
    }

    pub fn default_text(&self) -> Option<String> {
        match &self.value {
            Some(Value::String(s)) => Some(s.clone()),
            Some(Value::Number(n)) => Some(n.to_string()),
            _ => None,
        }
    }
}
