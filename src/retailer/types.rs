use serde::Deserialize;
use serde_json::Value;
use std::fmt;

/// The response body did not have the expected shape.
#[derive(Debug)]
pub enum ScheduleError {
    /// Body is not JSON, or a required field is missing or mistyped
    Malformed(serde_json::Error),
    /// `deliveries` is an empty list
    NoDeliveries,
}

impl fmt::Display for ScheduleError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScheduleError::Malformed(e) => write!(f, "Malformed delivery schedule: {}", e),
            ScheduleError::NoDeliveries => write!(f, "Delivery schedule has no deliveries"),
        }
    }
}

impl std::error::Error for ScheduleError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ScheduleError::Malformed(e) => Some(e),
            ScheduleError::NoDeliveries => None,
        }
    }
}

#[derive(Debug, Deserialize)]
struct DeliveriesBody {
    deliveries: Vec<Delivery>,
}

#[derive(Debug, Deserialize)]
struct Delivery {
    params: DeliveryParams,
}

#[derive(Debug, Deserialize)]
struct DeliveryParams {
    matrix: Vec<DeliveryDay>,
}

#[derive(Debug, Deserialize)]
struct DeliveryDay {
    hours: Vec<DeliverySlot>,
}

/// One hour window of the delivery matrix.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct DeliverySlot {
    /// Day and hour label, normally a string.
    #[serde(rename = "deliveryTime", default)]
    pub delivery_time: Value,
    /// Whatever the API reports; judged by [`is_truthy`].
    #[serde(default)]
    pub available: Value,
}

impl DeliverySlot {
    pub fn new(delivery_time: impl Into<String>, available: Value) -> Self {
        Self {
            delivery_time: Value::String(delivery_time.into()),
            available,
        }
    }

    pub fn is_available(&self) -> bool {
        is_truthy(&self.available)
    }

    /// Notification text for this slot, e.g. `Mon 08:00-10:00 :: True`.
    ///
    /// Strings are shown bare, flags as `True`/`False` and anything missing
    /// as `None`.
    pub fn message(&self) -> String {
        format!(
            "{} :: {}",
            display_value(&self.delivery_time),
            display_value(&self.available)
        )
    }
}

/// Delivery schedule as returned by one poll.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DeliverySchedule {
    /// The body's own success flag
    pub ok: bool,
    /// Every hour entry of the first delivery, in response order
    pub slots: Vec<DeliverySlot>,
}

impl DeliverySchedule {
    /// Parses a response body.
    ///
    /// A body not flagged `ok` yields an empty schedule without looking at
    /// the rest of it.
    pub fn from_json(body: &str) -> Result<Self, ScheduleError> {
        let value: Value = serde_json::from_str(body).map_err(ScheduleError::Malformed)?;
        Self::from_value(value)
    }

    pub fn from_value(value: Value) -> Result<Self, ScheduleError> {
        let ok = value.get("ok").is_some_and(is_truthy);
        if !ok {
            return Ok(Self::default());
        }

        let body: DeliveriesBody =
            serde_json::from_value(value).map_err(ScheduleError::Malformed)?;
        let delivery = body
            .deliveries
            .into_iter()
            .next()
            .ok_or(ScheduleError::NoDeliveries)?;

        let slots = delivery
            .params
            .matrix
            .into_iter()
            .flat_map(|day| day.hours)
            .collect();

        Ok(Self { ok, slots })
    }

    pub fn available_slots(&self) -> impl Iterator<Item = &DeliverySlot> {
        self.slots.iter().filter(|slot| slot.is_available())
    }
}

/// JSON truthiness: `false`, `null`, zero, and empty strings, arrays or
/// objects are false; everything else is true.
fn display_value(value: &Value) -> String {
    match value {
        Value::Null => "None".to_string(),
        Value::Bool(true) => "True".to_string(),
        Value::Bool(false) => "False".to_string(),
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

pub fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(a) => !a.is_empty(),
        Value::Object(o) => !o.is_empty(),
    }
}
